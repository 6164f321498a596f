//! Special-effect nodes
//!
//! These nodes are procedurally generated: only their generating
//! parameters are ever persisted, and the live subtree (meshes, shader
//! materials, emitter state) is rebuilt from scratch whenever the
//! parameters are applied.

use std::collections::BTreeMap;

use crate::color::Color;
use crate::geometry::{BoxParams, Geometry, GeometryParams, PlaneParams, SphereParams};
use crate::material::{Material, MaterialKind, ShaderParams as ShaderMaterialParams, UniformValue};
use crate::math::Vec3;
use crate::node::{Node, NodeKind};

/// Atmospheric sky dome parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct SkyParams {
    pub turbidity: f32,
    pub rayleigh: f32,
    pub mie_coefficient: f32,
    pub mie_directional_g: f32,
    pub inclination: f32,
    pub azimuth: f32,
    pub distance: f32,
}

impl Default for SkyParams {
    fn default() -> Self {
        Self {
            turbidity: 10.0,
            rayleigh: 2.0,
            mie_coefficient: 0.005,
            mie_directional_g: 0.8,
            inclination: 0.49,
            azimuth: 0.25,
            distance: 4000.0,
        }
    }
}

/// Volumetric fire parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct FireParams {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub color1: Color,
    pub color2: Color,
    pub color3: Color,
    pub iterations: u32,
    pub octaves: u32,
}

impl Default for FireParams {
    fn default() -> Self {
        Self {
            width: 2.0,
            height: 4.0,
            depth: 2.0,
            color1: Color::from_hex(0xffffff),
            color2: Color::from_hex(0xffa000),
            color3: Color::from_hex(0x000000),
            iterations: 20,
            octaves: 3,
        }
    }
}

/// Smoke emitter parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct SmokeParams {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub particle_count: u32,
    pub max_age: f32,
    pub color: Color,
}

impl Default for SmokeParams {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 4.0,
            depth: 1.0,
            particle_count: 200,
            max_age: 3.0,
            color: Color::from_hex(0xdddddd),
        }
    }
}

/// Generic particle emitter parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct EmitterParams {
    pub particle_count: u32,
    pub position_spread: Vec3,
    pub velocity: Vec3,
    pub velocity_spread: Vec3,
    pub size: f32,
    pub lifetime: f32,
    pub color_start: Color,
    pub color_end: Color,
    pub texture_locator: Option<String>,
}

impl Default for EmitterParams {
    fn default() -> Self {
        Self {
            particle_count: 1000,
            position_spread: Vec3::ZERO,
            velocity: Vec3::new(0.0, 1.0, 0.0),
            velocity_spread: Vec3::new(0.5, 0.5, 0.5),
            size: 1.0,
            lifetime: 5.0,
            color_start: Color::WHITE,
            color_end: Color::from_hex(0x0000ff),
            texture_locator: None,
        }
    }
}

/// Parameters of every procedural special-effect kind.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    Sky(SkyParams),
    Fire(FireParams),
    Smoke(SmokeParams),
    ParticleEmitter(EmitterParams),
}

impl Effect {
    /// The declared effect kind, used as the codec dispatch key.
    pub fn kind(&self) -> &'static str {
        match self {
            Effect::Sky(_) => "Sky",
            Effect::Fire(_) => "Fire",
            Effect::Smoke(_) => "Smoke",
            Effect::ParticleEmitter(_) => "ParticleEmitter",
        }
    }

    /// Build the live node for these parameters, procedural subtree
    /// included. The subtree is owned by the effect and never persisted.
    pub fn build(self) -> Node {
        let children = match &self {
            Effect::Sky(p) => vec![sky_dome(p)],
            Effect::Fire(p) => vec![fire_volume(p)],
            Effect::Smoke(p) => vec![smoke_plume(p)],
            Effect::ParticleEmitter(p) => vec![emitter_cloud(p)],
        };
        let name = self.kind().to_string();
        let mut node = Node::named(NodeKind::Effect(self), name);
        node.children = children;
        node
    }
}

fn shader_material(uniforms: BTreeMap<String, UniformValue>) -> Material {
    Material::new(MaterialKind::Shader(ShaderMaterialParams {
        vertex_shader: "varying vec3 vWorldPosition; void main() { /* generated */ }".to_string(),
        fragment_shader: "void main() { /* generated */ }".to_string(),
        uniforms,
    }))
}

fn sky_dome(p: &SkyParams) -> Node {
    let mut uniforms = BTreeMap::new();
    uniforms.insert("turbidity".into(), UniformValue::Opaque(p.turbidity.into()));
    uniforms.insert("rayleigh".into(), UniformValue::Opaque(p.rayleigh.into()));
    uniforms.insert(
        "mieCoefficient".into(),
        UniformValue::Opaque(p.mie_coefficient.into()),
    );
    uniforms.insert(
        "mieDirectionalG".into(),
        UniformValue::Opaque(p.mie_directional_g.into()),
    );
    let geometry = Geometry::build(GeometryParams::Sphere(SphereParams {
        radius: p.distance,
        width_segments: 32,
        height_segments: 15,
    }));
    let mut dome = Node::named(
        NodeKind::Mesh {
            geometry,
            materials: vec![shader_material(uniforms)],
        },
        "SkyDome",
    );
    dome.frustum_culled = false;
    dome
}

fn fire_volume(p: &FireParams) -> Node {
    let mut uniforms = BTreeMap::new();
    uniforms.insert("color1".into(), UniformValue::Color(p.color1));
    uniforms.insert("color2".into(), UniformValue::Color(p.color2));
    uniforms.insert("color3".into(), UniformValue::Color(p.color3));
    uniforms.insert("iterations".into(), UniformValue::Opaque(p.iterations.into()));
    uniforms.insert("octaves".into(), UniformValue::Opaque(p.octaves.into()));
    let geometry = Geometry::build(GeometryParams::Box(BoxParams {
        width: p.width,
        height: p.height,
        depth: p.depth,
        ..BoxParams::default()
    }));
    Node::named(
        NodeKind::Mesh {
            geometry,
            materials: vec![shader_material(uniforms)],
        },
        "FireVolume",
    )
}

fn smoke_plume(p: &SmokeParams) -> Node {
    let mut material = Material::new(MaterialKind::Points {
        size: p.width.max(p.depth) * 0.25,
        size_attenuation: true,
    });
    material.color = p.color;
    material.transparent = true;
    material.opacity = 0.4;
    let geometry = Geometry::build(GeometryParams::Box(BoxParams {
        width: p.width,
        height: p.height,
        depth: p.depth,
        width_segments: p.particle_count.min(64),
        ..BoxParams::default()
    }));
    Node::named(
        NodeKind::Mesh {
            geometry,
            materials: vec![material],
        },
        "SmokePlume",
    )
}

fn emitter_cloud(p: &EmitterParams) -> Node {
    let mut uniforms = BTreeMap::new();
    uniforms.insert("colorStart".into(), UniformValue::Color(p.color_start));
    uniforms.insert("colorEnd".into(), UniformValue::Color(p.color_end));
    uniforms.insert("lifetime".into(), UniformValue::Opaque(p.lifetime.into()));
    uniforms.insert("size".into(), UniformValue::Opaque(p.size.into()));
    let geometry = Geometry::build(GeometryParams::Plane(PlaneParams {
        width_segments: p.particle_count.min(128),
        ..PlaneParams::default()
    }));
    Node::named(
        NodeKind::Mesh {
            geometry,
            materials: vec![shader_material(uniforms)],
        },
        "ParticleCloud",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_generates_subtree() {
        let node = Effect::Sky(SkyParams::default()).build();
        assert_eq!(node.kind_tag(), "Sky");
        assert_eq!(node.children.len(), 1);
        assert_eq!(node.children[0].name, "SkyDome");
    }

    #[test]
    fn test_fire_uniforms_carry_colors() {
        let node = Effect::Fire(FireParams::default()).build();
        let mesh = &node.children[0];
        match &mesh.kind {
            NodeKind::Mesh { materials, .. } => match &materials[0].kind {
                MaterialKind::Shader(params) => {
                    assert!(matches!(
                        params.uniforms.get("color2"),
                        Some(UniformValue::Color(_))
                    ));
                }
                _ => panic!("expected shader material"),
            },
            _ => panic!("expected mesh child"),
        }
    }
}
