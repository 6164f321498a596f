//! Document-level state
//!
//! Besides the scene graph itself, a saved document carries a handful of
//! singletons: editor configuration, the viewport camera, renderer
//! settings, per-node scripts, animation groups and the audio listener.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::node::Node;
use crate::token::Token;

/// Shadow filtering strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShadowType {
    Basic,
    Pcf,
    #[default]
    PcfSoft,
    Vsm,
}

/// Output tone mapping curve.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToneMapping {
    #[default]
    None,
    Linear,
    Reinhard,
    Cineon,
    AcesFilmic,
}

/// Editor-level configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EditorConfig {
    #[serde(default = "default_true")]
    pub autosave: bool,
    #[serde(default = "default_true")]
    pub show_grid: bool,
    #[serde(default = "default_true")]
    pub show_helpers: bool,
    #[serde(default)]
    pub shadows: bool,
    #[serde(default)]
    pub shadow_type: ShadowType,
}

fn default_true() -> bool {
    true
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            autosave: true,
            show_grid: true,
            show_helpers: true,
            shadows: false,
            shadow_type: ShadowType::default(),
        }
    }
}

/// Renderer settings singleton.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RendererSettings {
    #[serde(default = "default_true")]
    pub antialias: bool,
    #[serde(default = "default_true")]
    pub shadows: bool,
    #[serde(default)]
    pub shadow_type: ShadowType,
    #[serde(default)]
    pub tone_mapping: ToneMapping,
    #[serde(default = "default_exposure")]
    pub tone_mapping_exposure: f32,
    #[serde(default = "default_clear_color")]
    pub clear_color: Color,
}

fn default_exposure() -> f32 {
    1.0
}

fn default_clear_color() -> Color {
    Color::from_hex(0xaaaaaa)
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            antialias: true,
            shadows: true,
            shadow_type: ShadowType::default(),
            tone_mapping: ToneMapping::default(),
            tone_mapping_exposure: 1.0,
            clear_color: default_clear_color(),
        }
    }
}

/// A script attached to a node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub name: String,
    pub source: String,
}

/// One keyframed property track.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationTrack {
    /// Target property path, e.g. `.position[y]`.
    pub property: String,
    pub times: Vec<f32>,
    pub values: Vec<f32>,
}

/// A named set of tracks with a shared duration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    #[serde(default)]
    pub tracks: Vec<AnimationTrack>,
}

/// A group of clips, the unit the playback runtime schedules together.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnimationGroup {
    pub name: String,
    pub clips: Vec<AnimationClip>,
}

/// Audio listener singleton.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AudioListener {
    #[serde(default = "default_volume")]
    pub master_volume: f32,
}

fn default_volume() -> f32 {
    1.0
}

impl Default for AudioListener {
    fn default() -> Self {
        Self { master_volume: 1.0 }
    }
}

/// The live document the editor operates on.
#[derive(Clone, Debug)]
pub struct SceneDocument {
    pub config: EditorConfig,
    /// Viewport camera; always a camera-kind node.
    pub camera: Node,
    pub renderer: RendererSettings,
    /// Scripts keyed by the token of the node they are attached to.
    pub scripts: BTreeMap<Token, Vec<Script>>,
    pub animations: Vec<AnimationGroup>,
    pub listener: Option<AudioListener>,
    /// Graph root; always a scene-kind node.
    pub scene: Node,
}

impl SceneDocument {
    pub fn new() -> Self {
        Self {
            config: EditorConfig::default(),
            camera: Node::default_camera(),
            renderer: RendererSettings::default(),
            scripts: BTreeMap::new(),
            animations: Vec::new(),
            listener: None,
            scene: Node::empty_scene(),
        }
    }
}

impl Default for SceneDocument {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singleton_defaults_from_empty_json() {
        let config: EditorConfig = serde_json::from_str("{}").unwrap();
        assert!(config.autosave);
        assert!(!config.shadows);

        let renderer: RendererSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(renderer.tone_mapping, ToneMapping::None);
        assert_eq!(renderer.clear_color.to_hex(), 0xaaaaaa);
    }

    #[test]
    fn test_shadow_type_wire_names() {
        let json = serde_json::to_string(&ShadowType::PcfSoft).unwrap();
        assert_eq!(json, "\"pcf-soft\"");
    }

    #[test]
    fn test_new_document_shape() {
        let doc = SceneDocument::new();
        assert!(doc.camera.is_camera());
        assert_eq!(doc.scene.kind_tag(), "Scene");
        assert!(doc.listener.is_none());
    }
}
