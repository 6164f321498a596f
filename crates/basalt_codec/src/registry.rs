//! Codec registry bundle
//!
//! One instance bundles the three dispatch tables and is built once,
//! then passed by reference into the converter. Nothing here is a
//! process-wide global; embedders may hold several registries.

use crate::geometry::GeometryRegistry;
use crate::material::MaterialRegistry;
use crate::node::NodeRegistry;

pub struct CodecRegistry {
    pub geometries: GeometryRegistry,
    pub materials: MaterialRegistry,
    pub nodes: NodeRegistry,
}

impl CodecRegistry {
    pub fn new() -> Self {
        Self {
            geometries: GeometryRegistry::new(),
            materials: MaterialRegistry::new(),
            nodes: NodeRegistry::new(),
        }
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}
