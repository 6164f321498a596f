//! Material resources
//!
//! One shared set of common fields (color, opacity, blending, texture
//! slots) plus a sum type for the per-kind surface model. Shader-driven
//! kinds carry a uniform map whose values are either a reconstructible
//! color or an opaque value passed through untouched.

use std::collections::BTreeMap;

use crate::color::Color;
use crate::texture::Texture;

/// Blend equation applied when compositing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Blending {
    None,
    #[default]
    Normal,
    Additive,
    Subtractive,
    Multiply,
}

impl Blending {
    pub fn as_str(&self) -> &'static str {
        match self {
            Blending::None => "none",
            Blending::Normal => "normal",
            Blending::Additive => "additive",
            Blending::Subtractive => "subtractive",
            Blending::Multiply => "multiply",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Blending::None),
            "normal" => Some(Blending::Normal),
            "additive" => Some(Blending::Additive),
            "subtractive" => Some(Blending::Subtractive),
            "multiply" => Some(Blending::Multiply),
            _ => None,
        }
    }
}

/// Which faces are rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Side {
    #[default]
    Front,
    Back,
    Double,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Front => "front",
            Side::Back => "back",
            Side::Double => "double",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "front" => Some(Side::Front),
            "back" => Some(Side::Back),
            "double" => Some(Side::Double),
            _ => None,
        }
    }
}

/// A shader uniform value: either a color that must be reconstructed into
/// a live color object, or an opaque value copied as-is.
#[derive(Clone, Debug, PartialEq)]
pub enum UniformValue {
    Color(Color),
    Opaque(serde_json::Value),
}

/// Uniform map and program sources for shader-driven materials.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShaderParams {
    pub vertex_shader: String,
    pub fragment_shader: String,
    pub uniforms: BTreeMap<String, UniformValue>,
}

/// Named texture-slot table shared by every material kind.
#[derive(Clone, Debug, Default)]
pub struct TextureSlots {
    pub map: Option<Texture>,
    pub normal_map: Option<Texture>,
    pub bump_map: Option<Texture>,
    pub displacement_map: Option<Texture>,
    pub roughness_map: Option<Texture>,
    pub metalness_map: Option<Texture>,
    pub alpha_map: Option<Texture>,
    pub env_map: Option<Texture>,
    pub light_map: Option<Texture>,
    pub ao_map: Option<Texture>,
    pub emissive_map: Option<Texture>,
    pub specular_map: Option<Texture>,
    pub gradient_map: Option<Texture>,
    pub matcap: Option<Texture>,
}

impl TextureSlots {
    /// Slot names paired with their contents, in a fixed order.
    pub fn entries(&self) -> [(&'static str, &Option<Texture>); 14] {
        [
            ("map", &self.map),
            ("normalMap", &self.normal_map),
            ("bumpMap", &self.bump_map),
            ("displacementMap", &self.displacement_map),
            ("roughnessMap", &self.roughness_map),
            ("metalnessMap", &self.metalness_map),
            ("alphaMap", &self.alpha_map),
            ("envMap", &self.env_map),
            ("lightMap", &self.light_map),
            ("aoMap", &self.ao_map),
            ("emissiveMap", &self.emissive_map),
            ("specularMap", &self.specular_map),
            ("gradientMap", &self.gradient_map),
            ("matcap", &self.matcap),
        ]
    }

    pub fn slot_mut(&mut self, name: &str) -> Option<&mut Option<Texture>> {
        match name {
            "map" => Some(&mut self.map),
            "normalMap" => Some(&mut self.normal_map),
            "bumpMap" => Some(&mut self.bump_map),
            "displacementMap" => Some(&mut self.displacement_map),
            "roughnessMap" => Some(&mut self.roughness_map),
            "metalnessMap" => Some(&mut self.metalness_map),
            "alphaMap" => Some(&mut self.alpha_map),
            "envMap" => Some(&mut self.env_map),
            "lightMap" => Some(&mut self.light_map),
            "aoMap" => Some(&mut self.ao_map),
            "emissiveMap" => Some(&mut self.emissive_map),
            "specularMap" => Some(&mut self.specular_map),
            "gradientMap" => Some(&mut self.gradient_map),
            "matcap" => Some(&mut self.matcap),
            _ => None,
        }
    }
}

/// Surface model selected per material.
#[derive(Clone, Debug, PartialEq)]
pub enum MaterialKind {
    Basic,
    Lambert {
        emissive: Color,
    },
    Phong {
        specular: Color,
        shininess: f32,
        emissive: Color,
    },
    Standard {
        roughness: f32,
        metalness: f32,
        emissive: Color,
        env_map_intensity: f32,
    },
    Physical {
        roughness: f32,
        metalness: f32,
        emissive: Color,
        clearcoat: f32,
        clearcoat_roughness: f32,
        ior: f32,
        transmission: f32,
    },
    Toon {
        emissive: Color,
    },
    Matcap,
    Depth,
    Normal,
    Distance,
    Shader(ShaderParams),
    RawShader(ShaderParams),
    Shadow,
    Sprite {
        rotation: f32,
    },
    LineBasic {
        linewidth: f32,
    },
    LineDashed {
        linewidth: f32,
        dash_size: f32,
        gap_size: f32,
    },
    Points {
        size: f32,
        size_attenuation: bool,
    },
}

impl MaterialKind {
    /// The declared material kind, used as the codec dispatch key.
    pub fn kind(&self) -> &'static str {
        match self {
            MaterialKind::Basic => "MeshBasicMaterial",
            MaterialKind::Lambert { .. } => "MeshLambertMaterial",
            MaterialKind::Phong { .. } => "MeshPhongMaterial",
            MaterialKind::Standard { .. } => "MeshStandardMaterial",
            MaterialKind::Physical { .. } => "MeshPhysicalMaterial",
            MaterialKind::Toon { .. } => "MeshToonMaterial",
            MaterialKind::Matcap => "MeshMatcapMaterial",
            MaterialKind::Depth => "MeshDepthMaterial",
            MaterialKind::Normal => "MeshNormalMaterial",
            MaterialKind::Distance => "MeshDistanceMaterial",
            MaterialKind::Shader(_) => "ShaderMaterial",
            MaterialKind::RawShader(_) => "RawShaderMaterial",
            MaterialKind::Shadow => "ShadowMaterial",
            MaterialKind::Sprite { .. } => "SpriteMaterial",
            MaterialKind::LineBasic { .. } => "LineBasicMaterial",
            MaterialKind::LineDashed { .. } => "LineDashedMaterial",
            MaterialKind::Points { .. } => "PointsMaterial",
        }
    }
}

/// A live material resource.
#[derive(Clone, Debug)]
pub struct Material {
    pub name: String,
    pub color: Color,
    pub opacity: f32,
    pub transparent: bool,
    pub blending: Blending,
    pub side: Side,
    pub vertex_colors: bool,
    pub depth_test: bool,
    pub depth_write: bool,
    pub wireframe: bool,
    pub flat_shading: bool,
    pub slots: TextureSlots,
    pub kind: MaterialKind,
}

impl Material {
    pub fn new(kind: MaterialKind) -> Self {
        Self {
            name: String::new(),
            color: Color::WHITE,
            opacity: 1.0,
            transparent: false,
            blending: Blending::default(),
            side: Side::default(),
            vertex_colors: false,
            depth_test: true,
            depth_write: true,
            wireframe: false,
            flat_shading: false,
            slots: TextureSlots::default(),
            kind,
        }
    }

    pub fn standard() -> Self {
        Self::new(MaterialKind::Standard {
            roughness: 1.0,
            metalness: 0.0,
            emissive: Color::BLACK,
            env_map_intensity: 1.0,
        })
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_table_is_consistent() {
        let mut m = Material::new(MaterialKind::Basic);
        *m.slots.slot_mut("map").unwrap() = Some(Texture::from_url("a.png"));
        let filled: Vec<&str> = m
            .slots
            .entries()
            .iter()
            .filter(|(_, t)| t.is_some())
            .map(|(n, _)| *n)
            .collect();
        assert_eq!(filled, vec!["map"]);
        assert!(m.slots.slot_mut("unknownSlot").is_none());
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!(Material::standard().kind.kind(), "MeshStandardMaterial");
        assert_eq!(
            Material::new(MaterialKind::RawShader(ShaderParams::default()))
                .kind
                .kind(),
            "RawShaderMaterial"
        );
    }
}
