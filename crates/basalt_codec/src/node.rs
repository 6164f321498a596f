//! Spatial node codecs
//!
//! One generic envelope codec handles the fields every node shares
//! (pose, flags, annotation bag, children tokens); per-kind functions
//! registered in the dispatch table handle the rest. Decoding applies
//! the envelope onto a fresh instance of the declared kind, or onto a
//! caller-supplied instance via [`apply_envelope`].

use std::collections::HashMap;

use serde_json::Value;

use basalt_scene::node::*;
use basalt_scene::{AnimationClip, Color, EulerOrder, Vec3};

use crate::context::ResolveContext;
use crate::effect;
use crate::external;
use crate::record::Record;
use crate::registry::CodecRegistry;

pub type NodeEncodeFn = fn(&CodecRegistry, &Node, &mut Record);
pub type NodeDecodeFn = fn(&CodecRegistry, &Record, &mut ResolveContext) -> Option<Node>;

/// Dispatch table from generator tag to node codec pair.
pub struct NodeRegistry {
    entries: HashMap<&'static str, (NodeEncodeFn, NodeDecodeFn)>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        let mut entries: HashMap<&'static str, (NodeEncodeFn, NodeDecodeFn)> = HashMap::new();
        entries.insert("Group", (encode_unit, decode_group));
        entries.insert("Bone", (encode_unit, decode_bone));
        entries.insert("Sprite", (encode_sprite, decode_sprite));
        entries.insert("Mesh", (encode_mesh, decode_mesh));
        entries.insert("Scene", (encode_scene, decode_scene));
        entries.insert("PerspectiveCamera", (encode_perspective, decode_perspective));
        entries.insert("OrthographicCamera", (encode_orthographic, decode_orthographic));
        entries.insert("PointLight", (encode_light, decode_point_light));
        entries.insert("DirectionalLight", (encode_light, decode_directional_light));
        entries.insert("SpotLight", (encode_light, decode_spot_light));
        entries.insert("HemisphereLight", (encode_light, decode_hemisphere_light));
        entries.insert("RectAreaLight", (encode_light, decode_rect_area_light));
        entries.insert("Audio", (encode_audio, decode_audio));
        entries.insert("Sky", (effect::encode_effect, effect::decode_sky));
        entries.insert("Fire", (effect::encode_effect, effect::decode_fire));
        entries.insert("Smoke", (effect::encode_effect, effect::decode_smoke));
        entries.insert(
            "ParticleEmitter",
            (effect::encode_effect, effect::decode_particle_emitter),
        );
        entries.insert("External", (encode_unit, external::decode_stub_node));
        Self { entries }
    }

    /// Encode one node as a record. Children are referenced by token;
    /// external and effect subtrees are never descended into, so their
    /// token lists stay empty.
    pub fn encode(&self, registry: &CodecRegistry, node: &Node) -> Record {
        let mut rec = Record::new(node.kind_tag(), node.token.clone());
        encode_envelope(node, &mut rec);
        if !node.is_external() && !node.is_effect() {
            rec.children = node.children.iter().map(|c| c.token.to_string()).collect();
        }
        if let Some((encode_fn, _)) = self.entries.get(node.kind_tag()) {
            encode_fn(registry, node, &mut rec);
        }
        rec
    }

    /// Decode one record into a node, envelope applied. Children are not
    /// resolved here; the converter walks the token list. Unknown kinds
    /// warn and yield nothing.
    pub fn decode(
        &self,
        registry: &CodecRegistry,
        record: &Record,
        ctx: &mut ResolveContext,
    ) -> Option<Node> {
        let Some((_, decode_fn)) = self.entries.get(record.kind()) else {
            log::warn!("unknown node kind '{}'; skipping", record.kind());
            return None;
        };
        let mut node = decode_fn(registry, record, ctx)?;
        apply_envelope(record, &mut node);
        Some(node)
    }

    pub fn is_registered(&self, kind: &str) -> bool {
        self.entries.contains_key(kind)
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Generic envelope
// ============================================================================

fn encode_envelope(node: &Node, rec: &mut Record) {
    rec.insert("name", node.name.clone());
    rec.insert_mat4("matrix", node.matrix);
    rec.insert_vec3("position", node.position);
    rec.insert_vec3(
        "rotation",
        Vec3::new(node.rotation.x, node.rotation.y, node.rotation.z),
    );
    rec.insert("rotationOrder", node.rotation.order.as_str());
    rec.insert_vec3("scale", node.scale);
    rec.insert("visible", node.visible);
    rec.insert("castShadow", node.cast_shadow);
    rec.insert("receiveShadow", node.receive_shadow);
    rec.insert("frustumCulled", node.frustum_culled);
    rec.insert("renderOrder", node.render_order);
    if !node.user_data.is_null() {
        rec.insert("userData", node.user_data.clone());
    }
    if !node.animations.is_empty() {
        if let Ok(clips) = serde_json::to_value(&node.animations) {
            rec.insert("animations", clips);
        }
    }
}

/// Apply the generic envelope fields of `record` onto an existing node.
/// The node's token is taken from the record; kind-specific fields are
/// untouched.
pub fn apply_envelope(record: &Record, node: &mut Node) {
    node.token = record.token.as_str().into();
    if let Some(name) = record.str_field("name") {
        node.name = name.to_string();
    }
    if let Some(order) = record.str_field("rotationOrder").and_then(EulerOrder::parse) {
        node.rotation.order = order;
    }
    if let Some(matrix) = record.mat4_field("matrix") {
        node.apply_matrix(matrix);
    }
    let mut recompose = false;
    if let Some(p) = record.vec3_field("position") {
        node.position = p;
        recompose = true;
    }
    if let Some(r) = record.vec3_field("rotation") {
        node.rotation.x = r.x;
        node.rotation.y = r.y;
        node.rotation.z = r.z;
        recompose = true;
    }
    if let Some(s) = record.vec3_field("scale") {
        node.scale = s;
        recompose = true;
    }
    if recompose {
        node.update_matrix();
    }
    node.visible = record.bool_field("visible").unwrap_or(true);
    node.cast_shadow = record.bool_field("castShadow").unwrap_or(false);
    node.receive_shadow = record.bool_field("receiveShadow").unwrap_or(false);
    node.frustum_culled = record.bool_field("frustumCulled").unwrap_or(true);
    node.render_order = record.i32_field("renderOrder").unwrap_or(0);
    if let Some(bag) = record.get("userData") {
        node.user_data = bag.clone();
    }
    if let Some(clips) = record.get("animations") {
        match serde_json::from_value::<Vec<AnimationClip>>(clips.clone()) {
            Ok(clips) => node.animations = clips,
            Err(e) => log::warn!("node '{}' carries malformed animations: {}", record.token, e),
        }
    }
}

// ============================================================================
// Per-kind codecs
// ============================================================================

fn encode_unit(_registry: &CodecRegistry, _node: &Node, _rec: &mut Record) {}

fn decode_group(_r: &CodecRegistry, _rec: &Record, _ctx: &mut ResolveContext) -> Option<Node> {
    Some(Node::new(NodeKind::Group))
}

fn decode_bone(_r: &CodecRegistry, _rec: &Record, _ctx: &mut ResolveContext) -> Option<Node> {
    Some(Node::new(NodeKind::Bone))
}

fn encode_sprite(registry: &CodecRegistry, node: &Node, rec: &mut Record) {
    let NodeKind::Sprite { material } = &node.kind else { return };
    if let Some(material) = material {
        rec.insert_record("material", registry.materials.encode(material));
    }
}

fn decode_sprite(registry: &CodecRegistry, rec: &Record, ctx: &mut ResolveContext) -> Option<Node> {
    let material = rec
        .record_field("material")
        .and_then(|sub| registry.materials.decode(&sub, ctx));
    Some(Node::new(NodeKind::Sprite { material }))
}

fn encode_mesh(registry: &CodecRegistry, node: &Node, rec: &mut Record) {
    let NodeKind::Mesh { geometry, materials } = &node.kind else { return };
    rec.insert_record("geometry", registry.geometries.encode(geometry));
    match materials.as_slice() {
        [single] => rec.insert_record("material", registry.materials.encode(single)),
        many => rec.insert_records(
            "material",
            many.iter().map(|m| registry.materials.encode(m)).collect(),
        ),
    }
}

fn decode_mesh(registry: &CodecRegistry, rec: &Record, ctx: &mut ResolveContext) -> Option<Node> {
    let Some(geometry) = rec
        .record_field("geometry")
        .and_then(|sub| registry.geometries.decode(&sub))
    else {
        log::warn!("mesh '{}' has no decodable geometry; skipping", rec.token);
        return None;
    };

    // A mesh stores one material or an ordered array of them.
    let materials: Vec<_> = if let Some(sub) = rec.record_field("material") {
        registry.materials.decode(&sub, ctx).into_iter().collect()
    } else if let Some(subs) = rec.records_field("material") {
        subs.iter()
            .filter_map(|sub| registry.materials.decode(sub, ctx))
            .collect()
    } else {
        log::warn!("mesh '{}' has no material; using the default", rec.token);
        vec![Default::default()]
    };
    Some(Node::new(NodeKind::Mesh { geometry, materials }))
}

fn encode_scene(_registry: &CodecRegistry, node: &Node, rec: &mut Record) {
    let NodeKind::Scene { background, fog } = &node.kind else { return };
    match background {
        Background::None => {}
        Background::Color(c) => rec.insert_color("background", *c),
        Background::Texture(t) | Background::CubeTexture(t) => {
            rec.insert_record("background", crate::texture::encode(t));
        }
    }
    match fog {
        Fog::None => {}
        Fog::Linear { color, near, far } => {
            let mut sub = Record::new("LinearFog", basalt_scene::Token::generate());
            sub.insert_color("color", *color);
            sub.insert("near", *near);
            sub.insert("far", *far);
            rec.insert_record("fog", sub);
        }
        Fog::Exponential { color, density } => {
            let mut sub = Record::new("ExponentialFog", basalt_scene::Token::generate());
            sub.insert_color("color", *color);
            sub.insert("density", *density);
            rec.insert_record("fog", sub);
        }
    }
}

fn decode_scene(_registry: &CodecRegistry, rec: &Record, ctx: &mut ResolveContext) -> Option<Node> {
    // The stored shape discriminates the background: a color string, or
    // a texture sub-record whose own kind separates flat from cube.
    let background = match rec.get("background") {
        None => Background::None,
        Some(Value::String(s)) => match Color::parse(s) {
            Some(c) => Background::Color(c),
            None => {
                log::warn!("scene '{}' has a malformed background color; clearing it", rec.token);
                Background::None
            }
        },
        Some(_) => match rec.record_field("background") {
            Some(sub) => {
                let is_cube = sub.kind() == "CubeTexture";
                match crate::texture::decode(&sub, ctx) {
                    Some(tex) if is_cube => Background::CubeTexture(tex),
                    Some(tex) => Background::Texture(tex),
                    None => Background::None,
                }
            }
            None => {
                log::warn!("scene '{}' has a malformed background; clearing it", rec.token);
                Background::None
            }
        },
    };

    let fog = match rec.record_field("fog") {
        None => {
            if rec.get("fog").is_some() {
                log::warn!("scene '{}' has a malformed fog record; clearing it", rec.token);
            }
            Fog::None
        }
        Some(sub) => match sub.kind() {
            "LinearFog" => Fog::Linear {
                color: sub.color_field("color").unwrap_or(Color::WHITE),
                near: sub.f32_field("near").unwrap_or(1.0),
                far: sub.f32_field("far").unwrap_or(1000.0),
            },
            "ExponentialFog" => Fog::Exponential {
                color: sub.color_field("color").unwrap_or(Color::WHITE),
                density: sub.f32_field("density").unwrap_or(0.00025),
            },
            other => {
                log::warn!("scene '{}' has unknown fog kind '{}'; clearing it", rec.token, other);
                Fog::None
            }
        },
    };

    Some(Node::new(NodeKind::Scene { background, fog }))
}

fn encode_perspective(_registry: &CodecRegistry, node: &Node, rec: &mut Record) {
    let NodeKind::PerspectiveCamera {
        fov,
        zoom,
        near,
        far,
        focus,
    } = &node.kind
    else {
        return;
    };
    rec.insert("fov", *fov);
    rec.insert("zoom", *zoom);
    rec.insert("near", *near);
    rec.insert("far", *far);
    rec.insert("focus", *focus);
}

fn decode_perspective(
    _r: &CodecRegistry,
    rec: &Record,
    _ctx: &mut ResolveContext,
) -> Option<Node> {
    Some(Node::new(NodeKind::PerspectiveCamera {
        fov: rec.f32_field("fov").unwrap_or(50.0),
        zoom: rec.f32_field("zoom").unwrap_or(1.0),
        near: rec.f32_field("near").unwrap_or(0.1),
        far: rec.f32_field("far").unwrap_or(2000.0),
        focus: rec.f32_field("focus").unwrap_or(10.0),
    }))
}

fn encode_orthographic(_registry: &CodecRegistry, node: &Node, rec: &mut Record) {
    let NodeKind::OrthographicCamera {
        left,
        right,
        top,
        bottom,
        near,
        far,
        zoom,
    } = &node.kind
    else {
        return;
    };
    rec.insert("left", *left);
    rec.insert("right", *right);
    rec.insert("top", *top);
    rec.insert("bottom", *bottom);
    rec.insert("near", *near);
    rec.insert("far", *far);
    rec.insert("zoom", *zoom);
}

fn decode_orthographic(
    _r: &CodecRegistry,
    rec: &Record,
    _ctx: &mut ResolveContext,
) -> Option<Node> {
    Some(Node::new(NodeKind::OrthographicCamera {
        left: rec.f32_field("left").unwrap_or(-1.0),
        right: rec.f32_field("right").unwrap_or(1.0),
        top: rec.f32_field("top").unwrap_or(1.0),
        bottom: rec.f32_field("bottom").unwrap_or(-1.0),
        near: rec.f32_field("near").unwrap_or(0.1),
        far: rec.f32_field("far").unwrap_or(2000.0),
        zoom: rec.f32_field("zoom").unwrap_or(1.0),
    }))
}

// ============================================================================
// Lights
// ============================================================================

fn encode_shadow(shadow: &LightShadow) -> Value {
    // The GPU-side map handle is runtime state and never persisted.
    serde_json::json!({
        "bias": shadow.bias,
        "radius": shadow.radius,
        "mapWidth": shadow.map_width,
        "mapHeight": shadow.map_height,
        "near": shadow.near,
        "far": shadow.far,
    })
}

/// Apply stored shadow fields onto an existing shadow object. The map
/// handle survives untouched.
fn apply_shadow(value: Option<&Value>, shadow: &mut LightShadow) {
    let Some(obj) = value.and_then(Value::as_object) else { return };
    let f = |key: &str| obj.get(key).and_then(Value::as_f64).map(|v| v as f32);
    let u = |key: &str| obj.get(key).and_then(Value::as_u64).map(|v| v as u32);
    if let Some(v) = f("bias") {
        shadow.bias = v;
    }
    if let Some(v) = f("radius") {
        shadow.radius = v;
    }
    if let Some(v) = u("mapWidth") {
        shadow.map_width = v;
    }
    if let Some(v) = u("mapHeight") {
        shadow.map_height = v;
    }
    if let Some(v) = f("near") {
        shadow.near = v;
    }
    if let Some(v) = f("far") {
        shadow.far = v;
    }
}

fn encode_light(_registry: &CodecRegistry, node: &Node, rec: &mut Record) {
    let NodeKind::Light(light) = &node.kind else { return };
    rec.insert_color("color", light.color);
    rec.insert("intensity", light.intensity);
    match &light.kind {
        LightKind::Point {
            distance,
            decay,
            shadow,
        } => {
            rec.insert("distance", *distance);
            rec.insert("decay", *decay);
            rec.insert("shadow", encode_shadow(shadow));
        }
        LightKind::Directional { shadow } => {
            rec.insert("shadow", encode_shadow(shadow));
        }
        LightKind::Spot {
            distance,
            decay,
            angle,
            penumbra,
            shadow,
        } => {
            rec.insert("distance", *distance);
            rec.insert("decay", *decay);
            rec.insert("angle", *angle);
            rec.insert("penumbra", *penumbra);
            rec.insert("shadow", encode_shadow(shadow));
        }
        LightKind::Hemisphere { ground_color } => {
            rec.insert_color("groundColor", *ground_color);
        }
        LightKind::RectArea { width, height } => {
            rec.insert("width", *width);
            rec.insert("height", *height);
        }
    }
}

fn decode_light_base(rec: &Record, kind: LightKind) -> Node {
    let mut light = Light {
        color: rec.color_field("color").unwrap_or(Color::WHITE),
        intensity: rec.f32_field("intensity").unwrap_or(1.0),
        kind,
    };
    if let Some(shadow) = light.shadow_mut() {
        apply_shadow(rec.get("shadow"), shadow);
    }
    Node::new(NodeKind::Light(light))
}

fn decode_point_light(_r: &CodecRegistry, rec: &Record, _ctx: &mut ResolveContext) -> Option<Node> {
    Some(decode_light_base(
        rec,
        LightKind::Point {
            distance: rec.f32_field("distance").unwrap_or(0.0),
            decay: rec.f32_field("decay").unwrap_or(2.0),
            shadow: LightShadow::default(),
        },
    ))
}

fn decode_directional_light(
    _r: &CodecRegistry,
    rec: &Record,
    _ctx: &mut ResolveContext,
) -> Option<Node> {
    Some(decode_light_base(
        rec,
        LightKind::Directional {
            shadow: LightShadow::default(),
        },
    ))
}

fn decode_spot_light(_r: &CodecRegistry, rec: &Record, _ctx: &mut ResolveContext) -> Option<Node> {
    Some(decode_light_base(
        rec,
        LightKind::Spot {
            distance: rec.f32_field("distance").unwrap_or(0.0),
            decay: rec.f32_field("decay").unwrap_or(2.0),
            angle: rec
                .f32_field("angle")
                .unwrap_or(core::f32::consts::FRAC_PI_3),
            penumbra: rec.f32_field("penumbra").unwrap_or(0.0),
            shadow: LightShadow::default(),
        },
    ))
}

fn decode_hemisphere_light(
    _r: &CodecRegistry,
    rec: &Record,
    _ctx: &mut ResolveContext,
) -> Option<Node> {
    Some(decode_light_base(
        rec,
        LightKind::Hemisphere {
            ground_color: rec.color_field("groundColor").unwrap_or(Color::WHITE),
        },
    ))
}

fn decode_rect_area_light(
    _r: &CodecRegistry,
    rec: &Record,
    _ctx: &mut ResolveContext,
) -> Option<Node> {
    Some(decode_light_base(
        rec,
        LightKind::RectArea {
            width: rec.f32_field("width").unwrap_or(10.0),
            height: rec.f32_field("height").unwrap_or(10.0),
        },
    ))
}

// ============================================================================
// Audio
// ============================================================================

fn encode_audio(_registry: &CodecRegistry, node: &Node, rec: &mut Record) {
    let NodeKind::Audio(params) = &node.kind else { return };
    rec.insert("source", params.source.clone());
    rec.insert("volume", params.volume);
    rec.insert("loop", params.looped);
    rec.insert("autoplay", params.autoplay);
    rec.insert("positional", params.positional);
    rec.insert("refDistance", params.ref_distance);
}

fn decode_audio(_r: &CodecRegistry, rec: &Record, _ctx: &mut ResolveContext) -> Option<Node> {
    Some(Node::new(NodeKind::Audio(AudioParams {
        source: rec.str_field("source").unwrap_or("").to_string(),
        volume: rec.f32_field("volume").unwrap_or(1.0),
        looped: rec.bool_field("loop").unwrap_or(false),
        autoplay: rec.bool_field("autoplay").unwrap_or(false),
        positional: rec.bool_field("positional").unwrap_or(false),
        ref_distance: rec.f32_field("refDistance").unwrap_or(1.0),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use basalt_scene::geometry::SphereParams;
    use basalt_scene::{Geometry, GeometryParams, Material};

    fn roundtrip(node: &Node) -> Node {
        let registry = CodecRegistry::new();
        let rec = registry.nodes.encode(&registry, node);
        let mut ctx = ResolveContext::offline();
        registry.nodes.decode(&registry, &rec, &mut ctx).unwrap()
    }

    #[test]
    fn test_envelope_roundtrip() {
        let mut node = Node::named(NodeKind::Group, "rig");
        node.position = Vec3::new(1.0, 2.0, 3.0);
        node.rotation.y = 0.5;
        node.render_order = 7;
        node.cast_shadow = true;
        node.user_data = serde_json::json!({ "tag": "hero" });
        node.update_matrix();

        let back = roundtrip(&node);
        assert_eq!(back.token, node.token);
        assert_eq!(back.name, "rig");
        assert_eq!(back.position, node.position);
        assert_eq!(back.render_order, 7);
        assert!(back.cast_shadow);
        assert_eq!(back.user_data["tag"], "hero");
    }

    #[test]
    fn test_children_are_tokens_not_nested() {
        let registry = CodecRegistry::new();
        let mut scene = Node::empty_scene();
        let child = Node::named(NodeKind::Group, "child");
        let child_token = child.token.to_string();
        scene.children.push(child);

        let rec = registry.nodes.encode(&registry, &scene);
        assert_eq!(rec.children, vec![child_token]);
        assert!(rec.get("children").is_none());
    }

    #[test]
    fn test_mesh_roundtrip() {
        let geometry = Geometry::build(GeometryParams::Sphere(SphereParams::default()));
        let node = Node::new(NodeKind::Mesh {
            geometry,
            materials: vec![Material::standard(), Material::default()],
        });
        let back = roundtrip(&node);
        match back.kind {
            NodeKind::Mesh { geometry, materials } => {
                assert_eq!(geometry.kind_tag, "SphereGeometry");
                assert_eq!(materials.len(), 2);
            }
            _ => panic!("expected mesh"),
        }
    }

    #[test]
    fn test_mesh_without_geometry_is_absent() {
        let registry = CodecRegistry::new();
        let rec = Record::new("Mesh", "m1");
        let mut ctx = ResolveContext::offline();
        assert!(registry.nodes.decode(&registry, &rec, &mut ctx).is_none());
    }

    #[test]
    fn test_scene_background_discriminants() {
        let mut node = Node::empty_scene();
        node.kind = NodeKind::Scene {
            background: Background::Color(Color::from_hex(0x336699)),
            fog: Fog::Linear {
                color: Color::WHITE,
                near: 2.0,
                far: 60.0,
            },
        };
        let back = roundtrip(&node);
        match back.kind {
            NodeKind::Scene { background, fog } => {
                assert!(matches!(background, Background::Color(c) if c == Color::from_hex(0x336699)));
                assert!(matches!(fog, Fog::Linear { far, .. } if far == 60.0));
            }
            _ => panic!("expected scene"),
        }
    }

    #[test]
    fn test_malformed_fog_clears_to_none() {
        let registry = CodecRegistry::new();
        let scene = Node::empty_scene();
        let mut rec = registry.nodes.encode(&registry, &scene);
        rec.insert("fog", serde_json::json!({ "bogus": true }));
        let mut ctx = ResolveContext::offline();
        let back = registry.nodes.decode(&registry, &rec, &mut ctx).unwrap();
        match back.kind {
            NodeKind::Scene { fog, .. } => assert!(matches!(fog, Fog::None)),
            _ => panic!("expected scene"),
        }
    }

    #[test]
    fn test_spot_light_shadow_roundtrip() {
        let mut light = Light::spot();
        light.intensity = 2.0;
        if let Some(shadow) = light.shadow_mut() {
            shadow.bias = 0.005;
            shadow.map_width = 1024;
            shadow.map = Some(ShadowMapHandle(42));
        }
        let back = roundtrip(&Node::new(NodeKind::Light(light)));
        match back.kind {
            NodeKind::Light(light) => {
                assert_eq!(light.intensity, 2.0);
                match light.kind {
                    LightKind::Spot { shadow, .. } => {
                        assert_eq!(shadow.bias, 0.005);
                        assert_eq!(shadow.map_width, 1024);
                        // The handle is runtime state; a decode starts without one.
                        assert_eq!(shadow.map, None);
                    }
                    _ => panic!("expected spot"),
                }
            }
            _ => panic!("expected light"),
        }
    }

    #[test]
    fn test_unknown_kind_yields_none() {
        let registry = CodecRegistry::new();
        let rec = Record::new("Portal", "p1");
        let mut ctx = ResolveContext::offline();
        assert!(registry.nodes.decode(&registry, &rec, &mut ctx).is_none());
    }
}
