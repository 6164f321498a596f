//! # basalt_store - Document storage and asset sources
//!
//! Persists flat record lists produced by `basalt_codec` and resolves
//! the remote locators they reference:
//!
//! - [`DocumentStore`] — the save/load/list/delete seam, with an
//!   in-memory implementation and a remote one speaking minimal HTTP.
//! - [`DirectoryAssetSource`] / [`RemoteAssetSource`] — byte sources
//!   plugged into the codec's resolve context.

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use basalt_codec::Record;

pub mod assets;
pub mod memory;
pub mod remote;

pub use assets::DirectoryAssetSource;
pub use memory::MemoryStore;
pub use remote::{RemoteAssetSource, RemoteStore};

/// Failure of a store operation.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed store payload: {0}")]
    Format(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A listing entry for one saved document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: String,
    pub name: String,
    pub record_count: usize,
}

/// Persistence seam for encoded documents. Operations are async and
/// single-shot; retrying is the caller's concern.
pub trait DocumentStore: Send + Sync {
    /// Persist a record list under a display name; returns the new id.
    fn save<'a>(
        &'a self,
        name: &'a str,
        records: &'a [Record],
    ) -> BoxFuture<'a, StoreResult<String>>;

    fn load<'a>(&'a self, id: &'a str) -> BoxFuture<'a, StoreResult<Vec<Record>>>;

    fn list(&self) -> BoxFuture<'_, StoreResult<Vec<DocumentSummary>>>;

    fn delete<'a>(&'a self, id: &'a str) -> BoxFuture<'a, StoreResult<()>>;
}
