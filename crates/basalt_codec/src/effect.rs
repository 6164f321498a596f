//! Special-effect node codecs
//!
//! Effects persist nothing but their generating parameters. Decode always
//! rebuilds the procedural subtree from scratch; a caller-supplied target
//! subtree is discarded, and neither direction walks effect children.

use basalt_scene::effects::*;
use basalt_scene::{Color, Node, NodeKind, Vec3};

use crate::context::ResolveContext;
use crate::record::Record;
use crate::registry::CodecRegistry;

/// Shared encoder for every effect kind; dispatches on the parameters.
pub(crate) fn encode_effect(_registry: &CodecRegistry, node: &Node, rec: &mut Record) {
    let NodeKind::Effect(effect) = &node.kind else { return };
    match effect {
        Effect::Sky(p) => {
            rec.insert("turbidity", p.turbidity);
            rec.insert("rayleigh", p.rayleigh);
            rec.insert("mieCoefficient", p.mie_coefficient);
            rec.insert("mieDirectionalG", p.mie_directional_g);
            rec.insert("inclination", p.inclination);
            rec.insert("azimuth", p.azimuth);
            rec.insert("distance", p.distance);
        }
        Effect::Fire(p) => {
            rec.insert("width", p.width);
            rec.insert("height", p.height);
            rec.insert("depth", p.depth);
            rec.insert_color("color1", p.color1);
            rec.insert_color("color2", p.color2);
            rec.insert_color("color3", p.color3);
            rec.insert("iterations", p.iterations);
            rec.insert("octaves", p.octaves);
        }
        Effect::Smoke(p) => {
            rec.insert("width", p.width);
            rec.insert("height", p.height);
            rec.insert("depth", p.depth);
            rec.insert("particleCount", p.particle_count);
            rec.insert("maxAge", p.max_age);
            rec.insert_color("color", p.color);
        }
        Effect::ParticleEmitter(p) => {
            rec.insert("particleCount", p.particle_count);
            rec.insert_vec3("positionSpread", p.position_spread);
            rec.insert_vec3("velocity", p.velocity);
            rec.insert_vec3("velocitySpread", p.velocity_spread);
            rec.insert("size", p.size);
            rec.insert("lifetime", p.lifetime);
            rec.insert_color("colorStart", p.color_start);
            rec.insert_color("colorEnd", p.color_end);
            if let Some(locator) = &p.texture_locator {
                rec.insert("texture", locator.clone());
            }
        }
    }
}

pub(crate) fn decode_sky(
    _registry: &CodecRegistry,
    rec: &Record,
    _ctx: &mut ResolveContext,
) -> Option<Node> {
    let d = SkyParams::default();
    Some(
        Effect::Sky(SkyParams {
            turbidity: rec.f32_field("turbidity").unwrap_or(d.turbidity),
            rayleigh: rec.f32_field("rayleigh").unwrap_or(d.rayleigh),
            mie_coefficient: rec.f32_field("mieCoefficient").unwrap_or(d.mie_coefficient),
            mie_directional_g: rec
                .f32_field("mieDirectionalG")
                .unwrap_or(d.mie_directional_g),
            inclination: rec.f32_field("inclination").unwrap_or(d.inclination),
            azimuth: rec.f32_field("azimuth").unwrap_or(d.azimuth),
            distance: rec.f32_field("distance").unwrap_or(d.distance),
        })
        .build(),
    )
}

pub(crate) fn decode_fire(
    _registry: &CodecRegistry,
    rec: &Record,
    _ctx: &mut ResolveContext,
) -> Option<Node> {
    let d = FireParams::default();
    Some(
        Effect::Fire(FireParams {
            width: rec.f32_field("width").unwrap_or(d.width),
            height: rec.f32_field("height").unwrap_or(d.height),
            depth: rec.f32_field("depth").unwrap_or(d.depth),
            color1: rec.color_field("color1").unwrap_or(d.color1),
            color2: rec.color_field("color2").unwrap_or(d.color2),
            color3: rec.color_field("color3").unwrap_or(d.color3),
            iterations: rec.u32_field("iterations").unwrap_or(d.iterations),
            octaves: rec.u32_field("octaves").unwrap_or(d.octaves),
        })
        .build(),
    )
}

pub(crate) fn decode_smoke(
    _registry: &CodecRegistry,
    rec: &Record,
    _ctx: &mut ResolveContext,
) -> Option<Node> {
    let d = SmokeParams::default();
    Some(
        Effect::Smoke(SmokeParams {
            width: rec.f32_field("width").unwrap_or(d.width),
            height: rec.f32_field("height").unwrap_or(d.height),
            depth: rec.f32_field("depth").unwrap_or(d.depth),
            particle_count: rec.u32_field("particleCount").unwrap_or(d.particle_count),
            max_age: rec.f32_field("maxAge").unwrap_or(d.max_age),
            color: rec.color_field("color").unwrap_or(d.color),
        })
        .build(),
    )
}

pub(crate) fn decode_particle_emitter(
    _registry: &CodecRegistry,
    rec: &Record,
    _ctx: &mut ResolveContext,
) -> Option<Node> {
    let d = EmitterParams::default();
    Some(
        Effect::ParticleEmitter(EmitterParams {
            particle_count: rec.u32_field("particleCount").unwrap_or(d.particle_count),
            position_spread: rec
                .vec3_field("positionSpread")
                .unwrap_or(Vec3::ZERO),
            velocity: rec.vec3_field("velocity").unwrap_or(d.velocity),
            velocity_spread: rec.vec3_field("velocitySpread").unwrap_or(d.velocity_spread),
            size: rec.f32_field("size").unwrap_or(d.size),
            lifetime: rec.f32_field("lifetime").unwrap_or(d.lifetime),
            color_start: rec.color_field("colorStart").unwrap_or(Color::WHITE),
            color_end: rec.color_field("colorEnd").unwrap_or(d.color_end),
            texture_locator: rec.str_field("texture").map(str::to_string),
        })
        .build(),
    )
}
