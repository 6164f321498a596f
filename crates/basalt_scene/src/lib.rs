//! # basalt_scene - Live scene graph model
//!
//! The in-memory object graph the basalt editor operates on: spatial
//! nodes, resources (textures, geometries, materials), lights, cameras,
//! audio sources, procedural special effects and the document-level
//! singletons. Serialization lives in `basalt_codec`; this crate is pure
//! data model.

pub mod color;
pub mod document;
pub mod effects;
pub mod geometry;
pub mod material;
pub mod math;
pub mod node;
pub mod texture;
pub mod token;

pub use color::Color;
pub use document::{
    AnimationClip, AnimationGroup, AnimationTrack, AudioListener, EditorConfig, RendererSettings,
    SceneDocument, Script, ShadowType, ToneMapping,
};
pub use effects::{Effect, EmitterParams, FireParams, SkyParams, SmokeParams};
pub use geometry::{Geometry, GeometryParams};
pub use material::{Material, MaterialKind, ShaderParams, TextureSlots, UniformValue};
pub use math::{Euler, EulerOrder, Mat4, Quat, Vec2, Vec3};
pub use node::{
    AudioParams, Background, Fog, Light, LightKind, LightShadow, Node, NodeKind, ShadowMapHandle,
};
pub use texture::{
    ColorSpace, FilterMode, ImageData, ImageHandle, ImagePayload, ImageSource, Texture,
    TextureFormat, WrapMode,
};
pub use token::Token;
