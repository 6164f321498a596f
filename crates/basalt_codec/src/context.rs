//! Resolution context for decoding
//!
//! The synchronous walk never suspends; anything that must fetch bytes
//! (remote raster images, externally hosted payloads) is queued here as a
//! pending operation and driven concurrently after the walk completes.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use parking_lot::RwLock;

use basalt_scene::{ImagePayload, ImageSource, Token};

use crate::error::AssetError;
use crate::record::Record;

/// Byte source for remote locators (raster images, hosted payloads).
pub trait AssetSource: Send + Sync {
    fn fetch<'a>(&'a self, locator: &'a str) -> BoxFuture<'a, Result<Vec<u8>, AssetError>>;
}

/// Source that resolves nothing. Used when a caller decodes a document it
/// knows contains no remote references.
pub struct NullAssetSource;

impl AssetSource for NullAssetSource {
    fn fetch<'a>(&'a self, locator: &'a str) -> BoxFuture<'a, Result<Vec<u8>, AssetError>> {
        Box::pin(async move { Err(AssetError::NotFound(locator.to_string())) })
    }
}

/// In-memory byte source for tests and embedding.
#[derive(Default)]
pub struct MemoryAssetSource {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryAssetSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, locator: impl Into<String>, bytes: Vec<u8>) {
        self.entries.write().insert(locator.into(), bytes);
    }
}

impl AssetSource for MemoryAssetSource {
    fn fetch<'a>(&'a self, locator: &'a str) -> BoxFuture<'a, Result<Vec<u8>, AssetError>> {
        Box::pin(async move {
            self.entries
                .read()
                .get(locator)
                .cloned()
                .ok_or_else(|| AssetError::NotFound(locator.to_string()))
        })
    }
}

/// Layers a fixed set of companion files over an inner source. Used when
/// a composite hosted asset ships its own textures alongside the mesh
/// document.
pub struct OverlaySource {
    files: HashMap<String, Vec<u8>>,
    inner: Arc<dyn AssetSource>,
}

impl OverlaySource {
    pub fn new(files: HashMap<String, Vec<u8>>, inner: Arc<dyn AssetSource>) -> Self {
        Self { files, inner }
    }
}

impl AssetSource for OverlaySource {
    fn fetch<'a>(&'a self, locator: &'a str) -> BoxFuture<'a, Result<Vec<u8>, AssetError>> {
        if let Some(bytes) = self.files.get(locator) {
            let bytes = bytes.clone();
            return Box::pin(async move { Ok(bytes) });
        }
        self.inner.fetch(locator)
    }
}

/// A deferred operation discovered during the synchronous walk.
pub enum PendingOp {
    /// Replace placeholder pixel storage once the source loads. A cube
    /// payload settles only after all six face loads have settled.
    Image {
        payload: ImagePayload,
        source: ImageSource,
    },
    /// Materialize an externally hosted stub and splice it into the node
    /// with the recorded parent token.
    Stub { parent: Token, record: Record },
}

/// Everything a decode pass needs to resolve references.
pub struct ResolveContext {
    pub assets: Arc<dyn AssetSource>,
    pending: Vec<PendingOp>,
}

impl ResolveContext {
    pub fn new(assets: Arc<dyn AssetSource>) -> Self {
        Self {
            assets,
            pending: Vec::new(),
        }
    }

    /// Context that cannot resolve any remote reference.
    pub fn offline() -> Self {
        Self::new(Arc::new(NullAssetSource))
    }

    pub fn queue_image(&mut self, payload: ImagePayload, source: ImageSource) {
        self.pending.push(PendingOp::Image { payload, source });
    }

    pub fn queue_stub(&mut self, parent: Token, record: Record) {
        self.pending.push(PendingOp::Stub { parent, record });
    }

    pub fn take_pending(&mut self) -> Vec<PendingOp> {
        std::mem::take(&mut self.pending)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}
