//! Geometry codec
//!
//! Only construction parameters are persisted; the generated vertex
//! buffers are re-derived by running the same constructors on decode.
//! Encode and decode functions are registered per primitive kind in an
//! explicit dispatch table.

use std::collections::HashMap;

use serde_json::Value;

use basalt_scene::geometry::*;
use basalt_scene::Token;

use crate::record::Record;

pub type GeometryEncodeFn = fn(&GeometryRegistry, &Geometry, &mut Record);
pub type GeometryDecodeFn = fn(&GeometryRegistry, &Record) -> Option<Geometry>;

/// Per-kind encoder/decoder pairs, registered once at construction.
pub struct GeometryRegistry {
    entries: HashMap<&'static str, (GeometryEncodeFn, GeometryDecodeFn)>,
}

impl GeometryRegistry {
    pub fn new() -> Self {
        let mut entries: HashMap<&'static str, (GeometryEncodeFn, GeometryDecodeFn)> =
            HashMap::new();
        entries.insert("BoxGeometry", (encode_box, decode_box));
        entries.insert("SphereGeometry", (encode_sphere, decode_sphere));
        entries.insert("CylinderGeometry", (encode_cylinder, decode_cylinder));
        entries.insert("ConeGeometry", (encode_cone, decode_cone));
        entries.insert("CircleGeometry", (encode_circle, decode_circle));
        entries.insert("PlaneGeometry", (encode_plane, decode_plane));
        entries.insert("RingGeometry", (encode_ring, decode_ring));
        entries.insert("TorusGeometry", (encode_torus, decode_torus));
        entries.insert("TorusKnotGeometry", (encode_torus_knot, decode_torus_knot));
        entries.insert("IcosahedronGeometry", (encode_icosahedron, decode_icosahedron));
        entries.insert("PolyhedronGeometry", (encode_polyhedron, decode_polyhedron));
        entries.insert("LatheGeometry", (encode_lathe, decode_lathe));
        entries.insert("TubeGeometry", (encode_tube, decode_tube));
        entries.insert("ExtrudeGeometry", (encode_extrude, decode_extrude));
        entries.insert("ShapeGeometry", (encode_shape, decode_shape));
        entries.insert("TextGeometry", (encode_text, decode_text));
        entries.insert("ParametricGeometry", (encode_parametric, decode_parametric));
        entries.insert("TeapotGeometry", (encode_teapot, decode_teapot));
        entries.insert("InstancedGeometry", (encode_instanced, decode_instanced));
        Self { entries }
    }

    /// Encode a live geometry as an inline resource sub-record.
    pub fn encode(&self, geometry: &Geometry) -> Record {
        let (kind, encode_fn) = match self.entries.get_key_value(geometry.kind_tag.as_str()) {
            Some((kind, (encode_fn, _))) => (*kind, *encode_fn),
            None => {
                // A builder that misreports its tag (the teapot assembler)
                // still dispatches correctly through the declared kind.
                let declared = geometry.params.kind();
                log::warn!(
                    "geometry tag '{}' is not registered; dispatching by declared kind '{}'",
                    geometry.kind_tag,
                    declared
                );
                match self.entries.get_key_value(declared) {
                    Some((kind, (encode_fn, _))) => (*kind, *encode_fn),
                    // Every declared kind is registered above.
                    None => return Record::new(declared, Token::generate()),
                }
            }
        };
        let mut rec = Record::new(kind, Token::generate());
        rec.insert("name", geometry.name.clone());
        encode_fn(self, geometry, &mut rec);
        rec
    }

    /// Decode an inline geometry sub-record. Unknown kinds warn and yield
    /// nothing.
    pub fn decode(&self, record: &Record) -> Option<Geometry> {
        let Some((_, decode_fn)) = self.entries.get(record.kind()) else {
            log::warn!("unknown geometry kind '{}'; skipping", record.kind());
            return None;
        };
        let mut geometry = decode_fn(self, record)?;
        if let Some(name) = record.str_field("name") {
            geometry.name = name.to_string();
        }
        Some(geometry)
    }

    pub fn is_registered(&self, kind: &str) -> bool {
        self.entries.contains_key(kind)
    }
}

impl Default for GeometryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Per-kind codec pairs
// ============================================================================

fn encode_box(_registry: &GeometryRegistry, g: &Geometry, rec: &mut Record) {
    let GeometryParams::Box(p) = &g.params else { return };
    rec.insert("width", p.width);
    rec.insert("height", p.height);
    rec.insert("depth", p.depth);
    rec.insert("widthSegments", p.width_segments);
    rec.insert("heightSegments", p.height_segments);
    rec.insert("depthSegments", p.depth_segments);
}

fn decode_box(_registry: &GeometryRegistry, rec: &Record) -> Option<Geometry> {
    let d = BoxParams::default();
    Some(Geometry::build(GeometryParams::Box(BoxParams {
        width: rec.f32_field("width").unwrap_or(d.width),
        height: rec.f32_field("height").unwrap_or(d.height),
        depth: rec.f32_field("depth").unwrap_or(d.depth),
        width_segments: rec.u32_field("widthSegments").unwrap_or(d.width_segments),
        height_segments: rec.u32_field("heightSegments").unwrap_or(d.height_segments),
        depth_segments: rec.u32_field("depthSegments").unwrap_or(d.depth_segments),
    })))
}

fn encode_sphere(_registry: &GeometryRegistry, g: &Geometry, rec: &mut Record) {
    let GeometryParams::Sphere(p) = &g.params else { return };
    rec.insert("radius", p.radius);
    rec.insert("widthSegments", p.width_segments);
    rec.insert("heightSegments", p.height_segments);
}

fn decode_sphere(_registry: &GeometryRegistry, rec: &Record) -> Option<Geometry> {
    let d = SphereParams::default();
    Some(Geometry::build(GeometryParams::Sphere(SphereParams {
        radius: rec.f32_field("radius").unwrap_or(d.radius),
        width_segments: rec.u32_field("widthSegments").unwrap_or(d.width_segments),
        height_segments: rec.u32_field("heightSegments").unwrap_or(d.height_segments),
    })))
}

fn encode_cylinder(_registry: &GeometryRegistry, g: &Geometry, rec: &mut Record) {
    let GeometryParams::Cylinder(p) = &g.params else { return };
    rec.insert("radiusTop", p.radius_top);
    rec.insert("radiusBottom", p.radius_bottom);
    rec.insert("height", p.height);
    rec.insert("radialSegments", p.radial_segments);
    rec.insert("heightSegments", p.height_segments);
    rec.insert("openEnded", p.open_ended);
}

fn decode_cylinder(_registry: &GeometryRegistry, rec: &Record) -> Option<Geometry> {
    let d = CylinderParams::default();
    Some(Geometry::build(GeometryParams::Cylinder(CylinderParams {
        radius_top: rec.f32_field("radiusTop").unwrap_or(d.radius_top),
        radius_bottom: rec.f32_field("radiusBottom").unwrap_or(d.radius_bottom),
        height: rec.f32_field("height").unwrap_or(d.height),
        radial_segments: rec.u32_field("radialSegments").unwrap_or(d.radial_segments),
        height_segments: rec.u32_field("heightSegments").unwrap_or(d.height_segments),
        open_ended: rec.bool_field("openEnded").unwrap_or(d.open_ended),
    })))
}

fn encode_cone(_registry: &GeometryRegistry, g: &Geometry, rec: &mut Record) {
    let GeometryParams::Cone(p) = &g.params else { return };
    rec.insert("radius", p.radius);
    rec.insert("height", p.height);
    rec.insert("radialSegments", p.radial_segments);
    rec.insert("heightSegments", p.height_segments);
    rec.insert("openEnded", p.open_ended);
}

fn decode_cone(_registry: &GeometryRegistry, rec: &Record) -> Option<Geometry> {
    let d = ConeParams::default();
    Some(Geometry::build(GeometryParams::Cone(ConeParams {
        radius: rec.f32_field("radius").unwrap_or(d.radius),
        height: rec.f32_field("height").unwrap_or(d.height),
        radial_segments: rec.u32_field("radialSegments").unwrap_or(d.radial_segments),
        height_segments: rec.u32_field("heightSegments").unwrap_or(d.height_segments),
        open_ended: rec.bool_field("openEnded").unwrap_or(d.open_ended),
    })))
}

fn encode_circle(_registry: &GeometryRegistry, g: &Geometry, rec: &mut Record) {
    let GeometryParams::Circle(p) = &g.params else { return };
    rec.insert("radius", p.radius);
    rec.insert("segments", p.segments);
    rec.insert("thetaStart", p.theta_start);
    rec.insert("thetaLength", p.theta_length);
}

fn decode_circle(_registry: &GeometryRegistry, rec: &Record) -> Option<Geometry> {
    let d = CircleParams::default();
    Some(Geometry::build(GeometryParams::Circle(CircleParams {
        radius: rec.f32_field("radius").unwrap_or(d.radius),
        segments: rec.u32_field("segments").unwrap_or(d.segments),
        theta_start: rec.f32_field("thetaStart").unwrap_or(d.theta_start),
        theta_length: rec.f32_field("thetaLength").unwrap_or(d.theta_length),
    })))
}

fn encode_plane(_registry: &GeometryRegistry, g: &Geometry, rec: &mut Record) {
    let GeometryParams::Plane(p) = &g.params else { return };
    rec.insert("width", p.width);
    rec.insert("height", p.height);
    rec.insert("widthSegments", p.width_segments);
    rec.insert("heightSegments", p.height_segments);
}

fn decode_plane(_registry: &GeometryRegistry, rec: &Record) -> Option<Geometry> {
    let d = PlaneParams::default();
    Some(Geometry::build(GeometryParams::Plane(PlaneParams {
        width: rec.f32_field("width").unwrap_or(d.width),
        height: rec.f32_field("height").unwrap_or(d.height),
        width_segments: rec.u32_field("widthSegments").unwrap_or(d.width_segments),
        height_segments: rec.u32_field("heightSegments").unwrap_or(d.height_segments),
    })))
}

fn encode_ring(_registry: &GeometryRegistry, g: &Geometry, rec: &mut Record) {
    let GeometryParams::Ring(p) = &g.params else { return };
    rec.insert("innerRadius", p.inner_radius);
    rec.insert("outerRadius", p.outer_radius);
    rec.insert("thetaSegments", p.theta_segments);
    rec.insert("phiSegments", p.phi_segments);
}

fn decode_ring(_registry: &GeometryRegistry, rec: &Record) -> Option<Geometry> {
    let d = RingParams::default();
    Some(Geometry::build(GeometryParams::Ring(RingParams {
        inner_radius: rec.f32_field("innerRadius").unwrap_or(d.inner_radius),
        outer_radius: rec.f32_field("outerRadius").unwrap_or(d.outer_radius),
        theta_segments: rec.u32_field("thetaSegments").unwrap_or(d.theta_segments),
        phi_segments: rec.u32_field("phiSegments").unwrap_or(d.phi_segments),
    })))
}

fn encode_torus(_registry: &GeometryRegistry, g: &Geometry, rec: &mut Record) {
    let GeometryParams::Torus(p) = &g.params else { return };
    rec.insert("radius", p.radius);
    rec.insert("tube", p.tube);
    rec.insert("radialSegments", p.radial_segments);
    rec.insert("tubularSegments", p.tubular_segments);
    rec.insert("arc", p.arc);
}

fn decode_torus(_registry: &GeometryRegistry, rec: &Record) -> Option<Geometry> {
    let d = TorusParams::default();
    Some(Geometry::build(GeometryParams::Torus(TorusParams {
        radius: rec.f32_field("radius").unwrap_or(d.radius),
        tube: rec.f32_field("tube").unwrap_or(d.tube),
        radial_segments: rec.u32_field("radialSegments").unwrap_or(d.radial_segments),
        tubular_segments: rec.u32_field("tubularSegments").unwrap_or(d.tubular_segments),
        arc: rec.f32_field("arc").unwrap_or(d.arc),
    })))
}

fn encode_torus_knot(_registry: &GeometryRegistry, g: &Geometry, rec: &mut Record) {
    let GeometryParams::TorusKnot(p) = &g.params else { return };
    rec.insert("radius", p.radius);
    rec.insert("tube", p.tube);
    rec.insert("tubularSegments", p.tubular_segments);
    rec.insert("radialSegments", p.radial_segments);
    rec.insert("p", p.p);
    rec.insert("q", p.q);
}

fn decode_torus_knot(_registry: &GeometryRegistry, rec: &Record) -> Option<Geometry> {
    let d = TorusKnotParams::default();
    Some(Geometry::build(GeometryParams::TorusKnot(TorusKnotParams {
        radius: rec.f32_field("radius").unwrap_or(d.radius),
        tube: rec.f32_field("tube").unwrap_or(d.tube),
        tubular_segments: rec.u32_field("tubularSegments").unwrap_or(d.tubular_segments),
        radial_segments: rec.u32_field("radialSegments").unwrap_or(d.radial_segments),
        p: rec.u32_field("p").unwrap_or(d.p),
        q: rec.u32_field("q").unwrap_or(d.q),
    })))
}

fn encode_icosahedron(_registry: &GeometryRegistry, g: &Geometry, rec: &mut Record) {
    let GeometryParams::Icosahedron(p) = &g.params else { return };
    rec.insert("radius", p.radius);
    rec.insert("detail", p.detail);
}

fn decode_icosahedron(_registry: &GeometryRegistry, rec: &Record) -> Option<Geometry> {
    let d = IcosahedronParams::default();
    Some(Geometry::build(GeometryParams::Icosahedron(IcosahedronParams {
        radius: rec.f32_field("radius").unwrap_or(d.radius),
        detail: rec.u32_field("detail").unwrap_or(d.detail),
    })))
}

fn encode_polyhedron(_registry: &GeometryRegistry, g: &Geometry, rec: &mut Record) {
    let GeometryParams::Polyhedron(p) = &g.params else { return };
    rec.insert("vertices", serde_json::json!(p.vertices));
    rec.insert("indices", serde_json::json!(p.indices));
    rec.insert("radius", p.radius);
    rec.insert("detail", p.detail);
}

fn decode_polyhedron(_registry: &GeometryRegistry, rec: &Record) -> Option<Geometry> {
    let vertices: Vec<f32> = from_field(rec.get("vertices")).unwrap_or_default();
    let indices: Vec<u32> = from_field(rec.get("indices")).unwrap_or_default();
    Some(Geometry::build(GeometryParams::Polyhedron(PolyhedronParams {
        vertices,
        indices,
        radius: rec.f32_field("radius").unwrap_or(1.0),
        detail: rec.u32_field("detail").unwrap_or(0),
    })))
}

fn encode_lathe(_registry: &GeometryRegistry, g: &Geometry, rec: &mut Record) {
    let GeometryParams::Lathe(p) = &g.params else { return };
    rec.insert("points", serde_json::json!(p.points));
    rec.insert("segments", p.segments);
    rec.insert("phiStart", p.phi_start);
    rec.insert("phiLength", p.phi_length);
}

fn decode_lathe(_registry: &GeometryRegistry, rec: &Record) -> Option<Geometry> {
    let d = LatheParams::default();
    Some(Geometry::build(GeometryParams::Lathe(LatheParams {
        points: from_field(rec.get("points")).unwrap_or_else(|| d.points.clone()),
        segments: rec.u32_field("segments").unwrap_or(d.segments),
        phi_start: rec.f32_field("phiStart").unwrap_or(d.phi_start),
        phi_length: rec.f32_field("phiLength").unwrap_or(d.phi_length),
    })))
}

fn encode_tube(_registry: &GeometryRegistry, g: &Geometry, rec: &mut Record) {
    let GeometryParams::Tube(p) = &g.params else { return };
    rec.insert("path", serde_json::json!(p.path));
    rec.insert("tubularSegments", p.tubular_segments);
    rec.insert("radius", p.radius);
    rec.insert("radialSegments", p.radial_segments);
    rec.insert("closed", p.closed);
}

fn decode_tube(_registry: &GeometryRegistry, rec: &Record) -> Option<Geometry> {
    let d = TubeParams::default();
    Some(Geometry::build(GeometryParams::Tube(TubeParams {
        path: from_field(rec.get("path")).unwrap_or_else(|| d.path.clone()),
        tubular_segments: rec.u32_field("tubularSegments").unwrap_or(d.tubular_segments),
        radius: rec.f32_field("radius").unwrap_or(d.radius),
        radial_segments: rec.u32_field("radialSegments").unwrap_or(d.radial_segments),
        closed: rec.bool_field("closed").unwrap_or(d.closed),
    })))
}

fn encode_extrude(_registry: &GeometryRegistry, g: &Geometry, rec: &mut Record) {
    let GeometryParams::Extrude(p) = &g.params else { return };
    rec.insert("shapes", serde_json::json!(p.shapes));
    rec.insert("depth", p.depth);
    rec.insert("bevelEnabled", p.bevel_enabled);
    rec.insert("bevelThickness", p.bevel_thickness);
    rec.insert("bevelSize", p.bevel_size);
    rec.insert("bevelSegments", p.bevel_segments);
    rec.insert("curveSegments", p.curve_segments);
}

fn decode_extrude(_registry: &GeometryRegistry, rec: &Record) -> Option<Geometry> {
    let d = ExtrudeParams::default();
    Some(Geometry::build(GeometryParams::Extrude(ExtrudeParams {
        shapes: from_field(rec.get("shapes")).unwrap_or_default(),
        depth: rec.f32_field("depth").unwrap_or(d.depth),
        bevel_enabled: rec.bool_field("bevelEnabled").unwrap_or(d.bevel_enabled),
        bevel_thickness: rec.f32_field("bevelThickness").unwrap_or(d.bevel_thickness),
        bevel_size: rec.f32_field("bevelSize").unwrap_or(d.bevel_size),
        bevel_segments: rec.u32_field("bevelSegments").unwrap_or(d.bevel_segments),
        curve_segments: rec.u32_field("curveSegments").unwrap_or(d.curve_segments),
    })))
}

fn encode_shape(_registry: &GeometryRegistry, g: &Geometry, rec: &mut Record) {
    let GeometryParams::Shape(p) = &g.params else { return };
    rec.insert("shapes", serde_json::json!(p.shapes));
    rec.insert("curveSegments", p.curve_segments);
}

fn decode_shape(_registry: &GeometryRegistry, rec: &Record) -> Option<Geometry> {
    let d = ShapeParams::default();
    Some(Geometry::build(GeometryParams::Shape(ShapeParams {
        shapes: from_field(rec.get("shapes")).unwrap_or_default(),
        curve_segments: rec.u32_field("curveSegments").unwrap_or(d.curve_segments),
    })))
}

fn encode_text(_registry: &GeometryRegistry, g: &Geometry, rec: &mut Record) {
    let GeometryParams::Text(p) = &g.params else { return };
    rec.insert("text", p.text.clone());
    rec.insert("font", p.font.clone());
    rec.insert("size", p.size);
    rec.insert("depth", p.depth);
    rec.insert("curveSegments", p.curve_segments);
    rec.insert("bevelEnabled", p.bevel_enabled);
    rec.insert("bevelThickness", p.bevel_thickness);
    rec.insert("bevelSize", p.bevel_size);
}

fn decode_text(_registry: &GeometryRegistry, rec: &Record) -> Option<Geometry> {
    let d = TextParams::default();
    Some(Geometry::build(GeometryParams::Text(TextParams {
        text: rec.str_field("text").unwrap_or(&d.text).to_string(),
        font: rec.str_field("font").unwrap_or(&d.font).to_string(),
        size: rec.f32_field("size").unwrap_or(d.size),
        depth: rec.f32_field("depth").unwrap_or(d.depth),
        curve_segments: rec.u32_field("curveSegments").unwrap_or(d.curve_segments),
        bevel_enabled: rec.bool_field("bevelEnabled").unwrap_or(d.bevel_enabled),
        bevel_thickness: rec.f32_field("bevelThickness").unwrap_or(d.bevel_thickness),
        bevel_size: rec.f32_field("bevelSize").unwrap_or(d.bevel_size),
    })))
}

fn encode_parametric(_registry: &GeometryRegistry, g: &Geometry, rec: &mut Record) {
    let GeometryParams::Parametric(p) = &g.params else { return };
    rec.insert("function", p.function.clone());
    rec.insert("slices", p.slices);
    rec.insert("stacks", p.stacks);
}

fn decode_parametric(_registry: &GeometryRegistry, rec: &Record) -> Option<Geometry> {
    let d = ParametricParams::default();
    Some(Geometry::build(GeometryParams::Parametric(ParametricParams {
        function: rec.str_field("function").unwrap_or("").to_string(),
        slices: rec.u32_field("slices").unwrap_or(d.slices),
        stacks: rec.u32_field("stacks").unwrap_or(d.stacks),
    })))
}

fn encode_teapot(_registry: &GeometryRegistry, g: &Geometry, rec: &mut Record) {
    let GeometryParams::Teapot(p) = &g.params else { return };
    rec.insert("size", p.size);
    rec.insert("segments", p.segments);
    rec.insert("bottom", p.bottom);
    rec.insert("lid", p.lid);
    rec.insert("body", p.body);
}

fn decode_teapot(_registry: &GeometryRegistry, rec: &Record) -> Option<Geometry> {
    let d = TeapotParams::default();
    let params = TeapotParams {
        size: rec.f32_field("size").unwrap_or(d.size),
        segments: rec.u32_field("segments").unwrap_or(d.segments),
        bottom: rec.bool_field("bottom").unwrap_or(d.bottom),
        lid: rec.bool_field("lid").unwrap_or(d.lid),
        body: rec.bool_field("body").unwrap_or(d.body),
    };
    let mut geometry = Geometry::build(GeometryParams::Teapot(params.clone()));
    // The teapot assembler self-reports BufferGeometry. Patch the tag and
    // re-attach the parameters so re-encoding dispatches correctly.
    geometry.kind_tag = "TeapotGeometry".to_string();
    geometry.params = GeometryParams::Teapot(params);
    Some(geometry)
}

fn encode_instanced(registry: &GeometryRegistry, g: &Geometry, rec: &mut Record) {
    let GeometryParams::Instanced(p) = &g.params else { return };
    rec.insert("count", p.count);
    let base = Geometry::build((*p.base).clone());
    rec.insert_record("base", registry.encode(&base));
}

fn decode_instanced(registry: &GeometryRegistry, rec: &Record) -> Option<Geometry> {
    let count = rec.u32_field("count").unwrap_or(1);
    let base_rec = rec.record_field("base")?;
    let base = registry.decode(&base_rec)?;
    Some(Geometry::build(GeometryParams::Instanced(InstancedParams {
        count,
        base: Box::new(base.params),
    })))
}

fn from_field<T: serde::de::DeserializeOwned>(value: Option<&Value>) -> Option<T> {
    serde_json::from_value(value?.clone()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(params: GeometryParams) -> Geometry {
        let registry = GeometryRegistry::new();
        let rec = registry.encode(&Geometry::build(params));
        registry.decode(&rec).unwrap()
    }

    #[test]
    fn test_box_roundtrip() {
        let params = GeometryParams::Box(BoxParams {
            width: 3.0,
            depth: 0.5,
            width_segments: 4,
            ..BoxParams::default()
        });
        let back = roundtrip(params.clone());
        assert_eq!(back.params, params);
        assert_eq!(back.kind_tag, "BoxGeometry");
    }

    #[test]
    fn test_lathe_points_roundtrip() {
        let params = GeometryParams::Lathe(LatheParams {
            points: vec![[0.0, -1.0], [1.0, 0.0], [0.0, 1.0]],
            segments: 24,
            ..LatheParams::default()
        });
        assert_eq!(roundtrip(params.clone()).params, params);
    }

    #[test]
    fn test_teapot_tag_patched_on_decode() {
        let registry = GeometryRegistry::new();
        let fresh = Geometry::build(GeometryParams::Teapot(TeapotParams::default()));
        assert_eq!(fresh.kind_tag, "BufferGeometry");

        // Encoding a fresh teapot falls back to the declared kind.
        let rec = registry.encode(&fresh);
        assert_eq!(rec.kind(), "TeapotGeometry");

        // After decode, the tag is patched and re-encoding is direct.
        let back = registry.decode(&rec).unwrap();
        assert_eq!(back.kind_tag, "TeapotGeometry");
        assert_eq!(registry.encode(&back).kind(), "TeapotGeometry");
    }

    #[test]
    fn test_instanced_wraps_base_primitive() {
        let params = GeometryParams::Instanced(InstancedParams {
            count: 64,
            base: Box::new(GeometryParams::Sphere(SphereParams::default())),
        });
        let back = roundtrip(params.clone());
        assert_eq!(back.params, params);
    }

    #[test]
    fn test_unknown_kind_yields_none() {
        let registry = GeometryRegistry::new();
        let rec = Record::new("MysteryGeometry", "g");
        assert!(registry.decode(&rec).is_none());
    }
}
