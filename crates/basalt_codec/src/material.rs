//! Material codec
//!
//! All material kinds share one base codec for the common fields and the
//! named texture-slot table; the per-kind extras are handled by functions
//! registered in a dispatch table. Shader uniforms are a two-armed union:
//! colors are reconstructed into live values, everything else passes
//! through opaquely.

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;

use basalt_scene::material::*;
use basalt_scene::{Color, Token};

use crate::context::ResolveContext;
use crate::record::Record;
use crate::texture;

pub type MaterialEncodeFn = fn(&Material, &mut Record);
pub type MaterialDecodeFn = fn(&Record) -> Option<MaterialKind>;

/// Per-kind encoder/decoder pairs over the shared base codec.
pub struct MaterialRegistry {
    entries: HashMap<&'static str, (MaterialEncodeFn, MaterialDecodeFn)>,
}

impl MaterialRegistry {
    pub fn new() -> Self {
        let mut entries: HashMap<&'static str, (MaterialEncodeFn, MaterialDecodeFn)> =
            HashMap::new();
        entries.insert("MeshBasicMaterial", (encode_unit, decode_basic));
        entries.insert("MeshLambertMaterial", (encode_lambert, decode_lambert));
        entries.insert("MeshPhongMaterial", (encode_phong, decode_phong));
        entries.insert("MeshStandardMaterial", (encode_standard, decode_standard));
        entries.insert("MeshPhysicalMaterial", (encode_physical, decode_physical));
        entries.insert("MeshToonMaterial", (encode_toon, decode_toon));
        entries.insert("MeshMatcapMaterial", (encode_unit, decode_matcap));
        entries.insert("MeshDepthMaterial", (encode_unit, decode_depth));
        entries.insert("MeshNormalMaterial", (encode_unit, decode_normal));
        entries.insert("MeshDistanceMaterial", (encode_unit, decode_distance));
        entries.insert("ShaderMaterial", (encode_shader, decode_shader));
        entries.insert("RawShaderMaterial", (encode_shader, decode_raw_shader));
        entries.insert("ShadowMaterial", (encode_unit, decode_shadow));
        entries.insert("SpriteMaterial", (encode_sprite, decode_sprite));
        entries.insert("LineBasicMaterial", (encode_line_basic, decode_line_basic));
        entries.insert("LineDashedMaterial", (encode_line_dashed, decode_line_dashed));
        entries.insert("PointsMaterial", (encode_points, decode_points));
        Self { entries }
    }

    /// Encode a live material as an inline resource sub-record.
    pub fn encode(&self, material: &Material) -> Record {
        let mut rec = Record::new(material.kind.kind(), Token::generate());
        encode_base(material, &mut rec);
        if let Some((encode_fn, _)) = self.entries.get(material.kind.kind()) {
            encode_fn(material, &mut rec);
        }
        rec
    }

    /// Decode an inline material sub-record. Unknown kinds warn and yield
    /// nothing; a malformed texture in a slot drops that slot only.
    pub fn decode(&self, record: &Record, ctx: &mut ResolveContext) -> Option<Material> {
        let Some((_, decode_fn)) = self.entries.get(record.kind()) else {
            log::warn!("unknown material kind '{}'; skipping", record.kind());
            return None;
        };
        let kind = decode_fn(record)?;
        let mut material = Material::new(kind);
        decode_base(record, &mut material, ctx);
        Some(material)
    }

    pub fn is_registered(&self, kind: &str) -> bool {
        self.entries.contains_key(kind)
    }
}

impl Default for MaterialRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Shared base codec
// ============================================================================

fn encode_base(material: &Material, rec: &mut Record) {
    rec.insert("name", material.name.clone());
    rec.insert_color("color", material.color);
    rec.insert("opacity", material.opacity);
    rec.insert("transparent", material.transparent);
    rec.insert("blending", material.blending.as_str());
    rec.insert("side", material.side.as_str());
    rec.insert("vertexColors", material.vertex_colors);
    rec.insert("depthTest", material.depth_test);
    rec.insert("depthWrite", material.depth_write);
    rec.insert("wireframe", material.wireframe);
    rec.insert("flatShading", material.flat_shading);
    for (name, slot) in material.slots.entries() {
        if let Some(tex) = slot {
            rec.insert_record(name, texture::encode(tex));
        }
    }
}

fn decode_base(record: &Record, material: &mut Material, ctx: &mut ResolveContext) {
    if let Some(name) = record.str_field("name") {
        material.name = name.to_string();
    }
    if let Some(color) = record.color_field("color") {
        material.color = color;
    }
    material.opacity = record.f32_field("opacity").unwrap_or(1.0);
    material.transparent = record.bool_field("transparent").unwrap_or(false);
    if let Some(b) = record.str_field("blending").and_then(Blending::parse) {
        material.blending = b;
    }
    if let Some(s) = record.str_field("side").and_then(Side::parse) {
        material.side = s;
    }
    material.vertex_colors = record.bool_field("vertexColors").unwrap_or(false);
    material.depth_test = record.bool_field("depthTest").unwrap_or(true);
    material.depth_write = record.bool_field("depthWrite").unwrap_or(true);
    material.wireframe = record.bool_field("wireframe").unwrap_or(false);
    material.flat_shading = record.bool_field("flatShading").unwrap_or(false);

    let slot_names: Vec<&'static str> = material
        .slots
        .entries()
        .iter()
        .map(|(name, _)| *name)
        .collect();
    for name in slot_names {
        let Some(sub) = record.record_field(name) else { continue };
        match texture::decode(&sub, ctx) {
            Some(tex) => {
                if let Some(slot) = material.slots.slot_mut(name) {
                    *slot = Some(tex);
                }
            }
            None => {
                log::warn!(
                    "material '{}' slot '{}' holds a malformed texture; dropping the slot",
                    record.token,
                    name
                );
            }
        }
    }
}

// ============================================================================
// Per-kind extras
// ============================================================================

/// Kinds with no extra fields beyond the base.
fn encode_unit(_material: &Material, _rec: &mut Record) {}

fn decode_basic(_rec: &Record) -> Option<MaterialKind> {
    Some(MaterialKind::Basic)
}

fn decode_matcap(_rec: &Record) -> Option<MaterialKind> {
    Some(MaterialKind::Matcap)
}

fn decode_depth(_rec: &Record) -> Option<MaterialKind> {
    Some(MaterialKind::Depth)
}

fn decode_normal(_rec: &Record) -> Option<MaterialKind> {
    Some(MaterialKind::Normal)
}

fn decode_distance(_rec: &Record) -> Option<MaterialKind> {
    Some(MaterialKind::Distance)
}

fn decode_shadow(_rec: &Record) -> Option<MaterialKind> {
    Some(MaterialKind::Shadow)
}

fn encode_lambert(material: &Material, rec: &mut Record) {
    let MaterialKind::Lambert { emissive } = &material.kind else { return };
    rec.insert_color("emissive", *emissive);
}

fn decode_lambert(rec: &Record) -> Option<MaterialKind> {
    Some(MaterialKind::Lambert {
        emissive: rec.color_field("emissive").unwrap_or(Color::BLACK),
    })
}

fn encode_phong(material: &Material, rec: &mut Record) {
    let MaterialKind::Phong {
        specular,
        shininess,
        emissive,
    } = &material.kind
    else {
        return;
    };
    rec.insert_color("specular", *specular);
    rec.insert("shininess", *shininess);
    rec.insert_color("emissive", *emissive);
}

fn decode_phong(rec: &Record) -> Option<MaterialKind> {
    Some(MaterialKind::Phong {
        specular: rec
            .color_field("specular")
            .unwrap_or(Color::from_hex(0x111111)),
        shininess: rec.f32_field("shininess").unwrap_or(30.0),
        emissive: rec.color_field("emissive").unwrap_or(Color::BLACK),
    })
}

fn encode_standard(material: &Material, rec: &mut Record) {
    let MaterialKind::Standard {
        roughness,
        metalness,
        emissive,
        env_map_intensity,
    } = &material.kind
    else {
        return;
    };
    rec.insert("roughness", *roughness);
    rec.insert("metalness", *metalness);
    rec.insert_color("emissive", *emissive);
    rec.insert("envMapIntensity", *env_map_intensity);
}

fn decode_standard(rec: &Record) -> Option<MaterialKind> {
    Some(MaterialKind::Standard {
        roughness: rec.f32_field("roughness").unwrap_or(1.0),
        metalness: rec.f32_field("metalness").unwrap_or(0.0),
        emissive: rec.color_field("emissive").unwrap_or(Color::BLACK),
        env_map_intensity: rec.f32_field("envMapIntensity").unwrap_or(1.0),
    })
}

fn encode_physical(material: &Material, rec: &mut Record) {
    let MaterialKind::Physical {
        roughness,
        metalness,
        emissive,
        clearcoat,
        clearcoat_roughness,
        ior,
        transmission,
    } = &material.kind
    else {
        return;
    };
    rec.insert("roughness", *roughness);
    rec.insert("metalness", *metalness);
    rec.insert_color("emissive", *emissive);
    rec.insert("clearcoat", *clearcoat);
    rec.insert("clearcoatRoughness", *clearcoat_roughness);
    rec.insert("ior", *ior);
    rec.insert("transmission", *transmission);
}

fn decode_physical(rec: &Record) -> Option<MaterialKind> {
    Some(MaterialKind::Physical {
        roughness: rec.f32_field("roughness").unwrap_or(1.0),
        metalness: rec.f32_field("metalness").unwrap_or(0.0),
        emissive: rec.color_field("emissive").unwrap_or(Color::BLACK),
        clearcoat: rec.f32_field("clearcoat").unwrap_or(0.0),
        clearcoat_roughness: rec.f32_field("clearcoatRoughness").unwrap_or(0.0),
        ior: rec.f32_field("ior").unwrap_or(1.5),
        transmission: rec.f32_field("transmission").unwrap_or(0.0),
    })
}

fn encode_toon(material: &Material, rec: &mut Record) {
    let MaterialKind::Toon { emissive } = &material.kind else { return };
    rec.insert_color("emissive", *emissive);
}

fn decode_toon(rec: &Record) -> Option<MaterialKind> {
    Some(MaterialKind::Toon {
        emissive: rec.color_field("emissive").unwrap_or(Color::BLACK),
    })
}

fn encode_shader(material: &Material, rec: &mut Record) {
    let (MaterialKind::Shader(params) | MaterialKind::RawShader(params)) = &material.kind else {
        return;
    };
    rec.insert("vertexShader", params.vertex_shader.clone());
    rec.insert("fragmentShader", params.fragment_shader.clone());
    let uniforms: serde_json::Map<String, Value> = params
        .uniforms
        .iter()
        .map(|(name, value)| (name.clone(), uniform_value(value)))
        .collect();
    rec.insert("uniforms", Value::Object(uniforms));
}

fn decode_shader_params(rec: &Record) -> ShaderParams {
    let mut params = ShaderParams {
        vertex_shader: rec.str_field("vertexShader").unwrap_or("").to_string(),
        fragment_shader: rec.str_field("fragmentShader").unwrap_or("").to_string(),
        uniforms: BTreeMap::new(),
    };
    if let Some(Value::Object(uniforms)) = rec.get("uniforms") {
        for (name, value) in uniforms {
            match parse_uniform(value) {
                Some(parsed) => {
                    params.uniforms.insert(name.clone(), parsed);
                }
                None => {
                    log::warn!("uniform '{}' is malformed; dropping it", name);
                }
            }
        }
    }
    params
}

fn decode_shader(rec: &Record) -> Option<MaterialKind> {
    Some(MaterialKind::Shader(decode_shader_params(rec)))
}

fn decode_raw_shader(rec: &Record) -> Option<MaterialKind> {
    Some(MaterialKind::RawShader(decode_shader_params(rec)))
}

fn encode_sprite(material: &Material, rec: &mut Record) {
    let MaterialKind::Sprite { rotation } = &material.kind else { return };
    rec.insert("rotation", *rotation);
}

fn decode_sprite(rec: &Record) -> Option<MaterialKind> {
    Some(MaterialKind::Sprite {
        rotation: rec.f32_field("rotation").unwrap_or(0.0),
    })
}

fn encode_line_basic(material: &Material, rec: &mut Record) {
    let MaterialKind::LineBasic { linewidth } = &material.kind else { return };
    rec.insert("linewidth", *linewidth);
}

fn decode_line_basic(rec: &Record) -> Option<MaterialKind> {
    Some(MaterialKind::LineBasic {
        linewidth: rec.f32_field("linewidth").unwrap_or(1.0),
    })
}

fn encode_line_dashed(material: &Material, rec: &mut Record) {
    let MaterialKind::LineDashed {
        linewidth,
        dash_size,
        gap_size,
    } = &material.kind
    else {
        return;
    };
    rec.insert("linewidth", *linewidth);
    rec.insert("dashSize", *dash_size);
    rec.insert("gapSize", *gap_size);
}

fn decode_line_dashed(rec: &Record) -> Option<MaterialKind> {
    Some(MaterialKind::LineDashed {
        linewidth: rec.f32_field("linewidth").unwrap_or(1.0),
        dash_size: rec.f32_field("dashSize").unwrap_or(3.0),
        gap_size: rec.f32_field("gapSize").unwrap_or(1.0),
    })
}

fn encode_points(material: &Material, rec: &mut Record) {
    let MaterialKind::Points {
        size,
        size_attenuation,
    } = &material.kind
    else {
        return;
    };
    rec.insert("size", *size);
    rec.insert("sizeAttenuation", *size_attenuation);
}

fn decode_points(rec: &Record) -> Option<MaterialKind> {
    Some(MaterialKind::Points {
        size: rec.f32_field("size").unwrap_or(1.0),
        size_attenuation: rec.bool_field("sizeAttenuation").unwrap_or(true),
    })
}

// ============================================================================
// Uniform union
// ============================================================================

fn uniform_value(value: &UniformValue) -> Value {
    match value {
        UniformValue::Color(c) => serde_json::json!({ "kind": "color", "value": c.to_css() }),
        UniformValue::Opaque(v) => serde_json::json!({ "kind": "value", "value": v }),
    }
}

fn parse_uniform(value: &Value) -> Option<UniformValue> {
    let obj = value.as_object()?;
    let inner = obj.get("value")?;
    match obj.get("kind")?.as_str()? {
        "color" => Color::parse(inner.as_str()?).map(UniformValue::Color),
        "value" => Some(UniformValue::Opaque(inner.clone())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use basalt_scene::Texture;

    fn roundtrip(material: Material) -> Material {
        let registry = MaterialRegistry::new();
        let rec = registry.encode(&material);
        let mut ctx = ResolveContext::offline();
        registry.decode(&rec, &mut ctx).unwrap()
    }

    #[test]
    fn test_standard_roundtrip() {
        let mut m = Material::standard();
        m.name = "steel".to_string();
        m.color = Color::from_hex(0x336699);
        m.transparent = true;
        m.opacity = 0.5;
        m.kind = MaterialKind::Standard {
            roughness: 0.3,
            metalness: 0.9,
            emissive: Color::from_hex(0x110000),
            env_map_intensity: 2.0,
        };

        let back = roundtrip(m.clone());
        assert_eq!(back.name, "steel");
        assert_eq!(back.color, Color::from_hex(0x336699));
        assert!(back.transparent);
        assert_eq!(back.kind, m.kind);
    }

    #[test]
    fn test_texture_slot_roundtrip() {
        let mut m = Material::new(MaterialKind::Basic);
        m.slots.map = Some(Texture::from_url("diffuse.png"));
        m.slots.env_map = Some(Texture::from_url("env.png"));

        let back = roundtrip(m);
        assert!(back.slots.map.is_some());
        assert!(back.slots.env_map.is_some());
        assert!(back.slots.normal_map.is_none());
        assert_eq!(back.slots.map.unwrap().name, "");
    }

    #[test]
    fn test_shader_uniform_union() {
        let mut uniforms = BTreeMap::new();
        uniforms.insert(
            "tint".to_string(),
            UniformValue::Color(Color::from_hex(0xff8800)),
        );
        uniforms.insert(
            "time".to_string(),
            UniformValue::Opaque(serde_json::json!(1.5)),
        );
        let m = Material::new(MaterialKind::Shader(ShaderParams {
            vertex_shader: "void main() {}".to_string(),
            fragment_shader: "void main() {}".to_string(),
            uniforms,
        }));

        let back = roundtrip(m);
        let MaterialKind::Shader(params) = back.kind else {
            panic!("expected shader kind");
        };
        assert_eq!(
            params.uniforms["tint"],
            UniformValue::Color(Color::from_hex(0xff8800))
        );
        assert_eq!(
            params.uniforms["time"],
            UniformValue::Opaque(serde_json::json!(1.5))
        );
    }

    #[test]
    fn test_malformed_slot_texture_is_dropped() {
        let registry = MaterialRegistry::new();
        let mut m = Material::new(MaterialKind::Basic);
        m.slots.map = Some(Texture::from_url("a.png"));
        let mut rec = registry.encode(&m);

        // Corrupt the slot's image payload.
        let mut bad = Record::new("Texture", "bad");
        bad.insert("image", 42);
        rec.insert_record("map", bad);

        let mut ctx = ResolveContext::offline();
        let back = registry.decode(&rec, &mut ctx).unwrap();
        assert!(back.slots.map.is_none());
    }

    #[test]
    fn test_unknown_kind_yields_none() {
        let registry = MaterialRegistry::new();
        let rec = Record::new("MysteryMaterial", "m");
        let mut ctx = ResolveContext::offline();
        assert!(registry.decode(&rec, &mut ctx).is_none());
    }
}
