//! Scene document serialization
//!
//! Converts between the live scene graph ([`basalt_scene`]) and a flat,
//! token-linked record list suitable for storage and transport:
//!
//! - [`record`] — the record envelope and the token-indexed table.
//! - [`registry`] — the bundled dispatch tables for geometry, material
//!   and node codecs.
//! - [`converter`] — the document-level encode/decode driver.
//! - [`context`] — the asset-source seam and the pending-operation queue
//!   that keeps the graph walk synchronous.
//!
//! Per-record failures never abort a decode: unknown kinds, malformed
//! payloads and failed fetches warn and resolve to absent.

pub mod context;
pub mod converter;
pub mod effect;
pub mod error;
pub mod external;
pub mod geometry;
pub mod material;
pub mod node;
pub mod record;
pub mod registry;
pub mod texture;

pub use context::{
    AssetSource, MemoryAssetSource, NullAssetSource, OverlaySource, PendingOp, ResolveContext,
};
pub use converter::Converter;
pub use error::{AssetError, CodecError, CodecResult};
pub use external::{locator_of, stub_node, LOCATOR_KEY, LOCATOR_SEPARATOR};
pub use record::{tokens, Envelope, Record, RecordTable, FORMAT_VERSION, GENERATOR};
pub use registry::CodecRegistry;
