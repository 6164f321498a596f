//! Error taxonomy for the serialization engine
//!
//! Per-record failures (unknown kinds, missing sub-records, fetch
//! failures, malformed discriminants) are not errors: they are logged and
//! recovered at the point of failure. The types here cover the few
//! conditions that cross an API boundary.

use thiserror::Error;

/// Failure of an asset fetch or payload decode.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum AssetError {
    #[error("asset not found: {0}")]
    NotFound(String),
    #[error("transport error for '{0}': {1}")]
    Transport(String, String),
    #[error("failed to decode '{0}': {1}")]
    Decode(String, String),
}

/// Top-level codec failure. Only the document-level singleton section may
/// surface one of these; in normal operation singletons default instead.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed singleton section: {0}")]
    Singleton(String),
}

pub type CodecResult<T> = Result<T, CodecError>;
