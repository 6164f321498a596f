//! Parametric geometry resources
//!
//! Geometries are addressed by their construction parameters, never by
//! their generated buffers. Rebuilding a primitive from the same
//! parameters yields the same vertex and index counts, which is all the
//! editor needs for selection outlines and stats panels.

/// Box primitive parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct BoxParams {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub width_segments: u32,
    pub height_segments: u32,
    pub depth_segments: u32,
}

impl Default for BoxParams {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
            depth: 1.0,
            width_segments: 1,
            height_segments: 1,
            depth_segments: 1,
        }
    }
}

/// Sphere primitive parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct SphereParams {
    pub radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
}

impl Default for SphereParams {
    fn default() -> Self {
        Self {
            radius: 1.0,
            width_segments: 32,
            height_segments: 16,
        }
    }
}

/// Cylinder primitive parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct CylinderParams {
    pub radius_top: f32,
    pub radius_bottom: f32,
    pub height: f32,
    pub radial_segments: u32,
    pub height_segments: u32,
    pub open_ended: bool,
}

impl Default for CylinderParams {
    fn default() -> Self {
        Self {
            radius_top: 1.0,
            radius_bottom: 1.0,
            height: 1.0,
            radial_segments: 32,
            height_segments: 1,
            open_ended: false,
        }
    }
}

/// Cone primitive parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct ConeParams {
    pub radius: f32,
    pub height: f32,
    pub radial_segments: u32,
    pub height_segments: u32,
    pub open_ended: bool,
}

impl Default for ConeParams {
    fn default() -> Self {
        Self {
            radius: 1.0,
            height: 1.0,
            radial_segments: 32,
            height_segments: 1,
            open_ended: false,
        }
    }
}

/// Circle primitive parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct CircleParams {
    pub radius: f32,
    pub segments: u32,
    pub theta_start: f32,
    pub theta_length: f32,
}

impl Default for CircleParams {
    fn default() -> Self {
        Self {
            radius: 1.0,
            segments: 32,
            theta_start: 0.0,
            theta_length: core::f32::consts::TAU,
        }
    }
}

/// Plane primitive parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaneParams {
    pub width: f32,
    pub height: f32,
    pub width_segments: u32,
    pub height_segments: u32,
}

impl Default for PlaneParams {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
            width_segments: 1,
            height_segments: 1,
        }
    }
}

/// Ring primitive parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct RingParams {
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub theta_segments: u32,
    pub phi_segments: u32,
}

impl Default for RingParams {
    fn default() -> Self {
        Self {
            inner_radius: 0.5,
            outer_radius: 1.0,
            theta_segments: 32,
            phi_segments: 1,
        }
    }
}

/// Torus primitive parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct TorusParams {
    pub radius: f32,
    pub tube: f32,
    pub radial_segments: u32,
    pub tubular_segments: u32,
    pub arc: f32,
}

impl Default for TorusParams {
    fn default() -> Self {
        Self {
            radius: 1.0,
            tube: 0.4,
            radial_segments: 12,
            tubular_segments: 48,
            arc: core::f32::consts::TAU,
        }
    }
}

/// Torus knot primitive parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct TorusKnotParams {
    pub radius: f32,
    pub tube: f32,
    pub tubular_segments: u32,
    pub radial_segments: u32,
    pub p: u32,
    pub q: u32,
}

impl Default for TorusKnotParams {
    fn default() -> Self {
        Self {
            radius: 1.0,
            tube: 0.4,
            tubular_segments: 64,
            radial_segments: 8,
            p: 2,
            q: 3,
        }
    }
}

/// Icosahedron primitive parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct IcosahedronParams {
    pub radius: f32,
    pub detail: u32,
}

impl Default for IcosahedronParams {
    fn default() -> Self {
        Self { radius: 1.0, detail: 0 }
    }
}

/// Custom polyhedron parameters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PolyhedronParams {
    /// Flat xyz triples.
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
    pub radius: f32,
    pub detail: u32,
}

/// Lathe surface of revolution parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct LatheParams {
    /// Profile points in the xz half-plane.
    pub points: Vec<[f32; 2]>,
    pub segments: u32,
    pub phi_start: f32,
    pub phi_length: f32,
}

impl Default for LatheParams {
    fn default() -> Self {
        Self {
            points: vec![[0.0, -0.5], [0.5, 0.0], [0.0, 0.5]],
            segments: 12,
            phi_start: 0.0,
            phi_length: core::f32::consts::TAU,
        }
    }
}

/// Tube extruded along a polyline path.
#[derive(Clone, Debug, PartialEq)]
pub struct TubeParams {
    pub path: Vec<[f32; 3]>,
    pub tubular_segments: u32,
    pub radius: f32,
    pub radial_segments: u32,
    pub closed: bool,
}

impl Default for TubeParams {
    fn default() -> Self {
        Self {
            path: vec![[0.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            tubular_segments: 64,
            radius: 1.0,
            radial_segments: 8,
            closed: false,
        }
    }
}

/// Extrusion of 2D outlines with optional beveling.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtrudeParams {
    /// Outlines as 2D point loops.
    pub shapes: Vec<Vec<[f32; 2]>>,
    pub depth: f32,
    pub bevel_enabled: bool,
    pub bevel_thickness: f32,
    pub bevel_size: f32,
    pub bevel_segments: u32,
    pub curve_segments: u32,
}

impl Default for ExtrudeParams {
    fn default() -> Self {
        Self {
            shapes: Vec::new(),
            depth: 1.0,
            bevel_enabled: true,
            bevel_thickness: 0.2,
            bevel_size: 0.1,
            bevel_segments: 3,
            curve_segments: 12,
        }
    }
}

/// Flat 2D outlines triangulated in place.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeParams {
    pub shapes: Vec<Vec<[f32; 2]>>,
    pub curve_segments: u32,
}

impl Default for ShapeParams {
    fn default() -> Self {
        Self {
            shapes: Vec::new(),
            curve_segments: 12,
        }
    }
}

/// Extruded text parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct TextParams {
    pub text: String,
    pub font: String,
    pub size: f32,
    pub depth: f32,
    pub curve_segments: u32,
    pub bevel_enabled: bool,
    pub bevel_thickness: f32,
    pub bevel_size: f32,
}

impl Default for TextParams {
    fn default() -> Self {
        Self {
            text: "text".to_string(),
            font: "helvetiker".to_string(),
            size: 1.0,
            depth: 0.2,
            curve_segments: 12,
            bevel_enabled: false,
            bevel_thickness: 0.1,
            bevel_size: 0.05,
        }
    }
}

/// Surface sampled from a stored function expression.
#[derive(Clone, Debug, PartialEq)]
pub struct ParametricParams {
    /// Source of the `(u, v) -> xyz` sampling function.
    pub function: String,
    pub slices: u32,
    pub stacks: u32,
}

impl Default for ParametricParams {
    fn default() -> Self {
        Self {
            function: String::new(),
            slices: 25,
            stacks: 25,
        }
    }
}

/// Utah teapot parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct TeapotParams {
    pub size: f32,
    pub segments: u32,
    pub bottom: bool,
    pub lid: bool,
    pub body: bool,
}

impl Default for TeapotParams {
    fn default() -> Self {
        Self {
            size: 1.0,
            segments: 10,
            bottom: true,
            lid: true,
            body: true,
        }
    }
}

/// Instanced wrapper around a base primitive.
#[derive(Clone, Debug, PartialEq)]
pub struct InstancedParams {
    pub count: u32,
    pub base: Box<GeometryParams>,
}

impl Default for InstancedParams {
    fn default() -> Self {
        Self {
            count: 1,
            base: Box::new(GeometryParams::Box(BoxParams::default())),
        }
    }
}

/// Construction parameters for every supported primitive kind.
#[derive(Clone, Debug, PartialEq)]
pub enum GeometryParams {
    Box(BoxParams),
    Sphere(SphereParams),
    Cylinder(CylinderParams),
    Cone(ConeParams),
    Circle(CircleParams),
    Plane(PlaneParams),
    Ring(RingParams),
    Torus(TorusParams),
    TorusKnot(TorusKnotParams),
    Icosahedron(IcosahedronParams),
    Polyhedron(PolyhedronParams),
    Lathe(LatheParams),
    Tube(TubeParams),
    Extrude(ExtrudeParams),
    Shape(ShapeParams),
    Text(TextParams),
    Parametric(ParametricParams),
    Teapot(TeapotParams),
    Instanced(InstancedParams),
}

impl GeometryParams {
    /// The declared primitive kind, used as the codec dispatch key.
    pub fn kind(&self) -> &'static str {
        match self {
            GeometryParams::Box(_) => "BoxGeometry",
            GeometryParams::Sphere(_) => "SphereGeometry",
            GeometryParams::Cylinder(_) => "CylinderGeometry",
            GeometryParams::Cone(_) => "ConeGeometry",
            GeometryParams::Circle(_) => "CircleGeometry",
            GeometryParams::Plane(_) => "PlaneGeometry",
            GeometryParams::Ring(_) => "RingGeometry",
            GeometryParams::Torus(_) => "TorusGeometry",
            GeometryParams::TorusKnot(_) => "TorusKnotGeometry",
            GeometryParams::Icosahedron(_) => "IcosahedronGeometry",
            GeometryParams::Polyhedron(_) => "PolyhedronGeometry",
            GeometryParams::Lathe(_) => "LatheGeometry",
            GeometryParams::Tube(_) => "TubeGeometry",
            GeometryParams::Extrude(_) => "ExtrudeGeometry",
            GeometryParams::Shape(_) => "ShapeGeometry",
            GeometryParams::Text(_) => "TextGeometry",
            GeometryParams::Parametric(_) => "ParametricGeometry",
            GeometryParams::Teapot(_) => "TeapotGeometry",
            GeometryParams::Instanced(_) => "InstancedGeometry",
        }
    }
}

/// A live geometry resource.
#[derive(Clone, Debug, PartialEq)]
pub struct Geometry {
    /// Tag self-reported by the builder that produced this geometry.
    /// Usually equal to `params.kind()`; the teapot builder is the
    /// exception (see [`Geometry::build`]).
    pub kind_tag: String,
    pub name: String,
    pub params: GeometryParams,
    pub vertex_count: u32,
    pub index_count: u32,
}

impl Geometry {
    /// Construct the primitive, deriving buffer sizes from the parameters.
    ///
    /// The teapot goes through a generic patch-surface assembler that
    /// reports `BufferGeometry` as its tag; its codec patches the tag back
    /// after construction so re-encoding dispatches correctly.
    pub fn build(params: GeometryParams) -> Geometry {
        let (vertex_count, index_count) = counts(&params);
        let kind_tag = match &params {
            GeometryParams::Teapot(_) => "BufferGeometry".to_string(),
            other => other.kind().to_string(),
        };
        Geometry {
            kind_tag,
            name: String::new(),
            params,
            vertex_count,
            index_count,
        }
    }
}

fn grid(w: u32, h: u32) -> (u32, u32) {
    ((w + 1) * (h + 1), 6 * w * h)
}

fn counts(params: &GeometryParams) -> (u32, u32) {
    match params {
        GeometryParams::Box(p) => {
            let (v0, i0) = grid(p.width_segments, p.height_segments);
            let (v1, i1) = grid(p.width_segments, p.depth_segments);
            let (v2, i2) = grid(p.height_segments, p.depth_segments);
            (2 * (v0 + v1 + v2), 2 * (i0 + i1 + i2))
        }
        GeometryParams::Sphere(p) => grid(p.width_segments, p.height_segments),
        GeometryParams::Cylinder(p) => {
            let (v, i) = grid(p.radial_segments, p.height_segments);
            if p.open_ended {
                (v, i)
            } else {
                // One fan per cap.
                (v + 2 * (p.radial_segments + 2), i + 2 * 3 * p.radial_segments)
            }
        }
        GeometryParams::Cone(p) => {
            let (v, i) = grid(p.radial_segments, p.height_segments);
            if p.open_ended {
                (v, i)
            } else {
                (v + p.radial_segments + 2, i + 3 * p.radial_segments)
            }
        }
        GeometryParams::Circle(p) => (p.segments + 2, 3 * p.segments),
        GeometryParams::Plane(p) => grid(p.width_segments, p.height_segments),
        GeometryParams::Ring(p) => grid(p.theta_segments, p.phi_segments),
        GeometryParams::Torus(p) => grid(p.tubular_segments, p.radial_segments),
        GeometryParams::TorusKnot(p) => grid(p.tubular_segments, p.radial_segments),
        GeometryParams::Icosahedron(p) => {
            let faces = 20 * 4u32.pow(p.detail);
            (3 * faces, 3 * faces)
        }
        GeometryParams::Polyhedron(p) => {
            let faces = (p.indices.len() as u32 / 3) * 4u32.pow(p.detail);
            (3 * faces, 3 * faces)
        }
        GeometryParams::Lathe(p) => {
            grid(p.segments, p.points.len().saturating_sub(1) as u32)
        }
        GeometryParams::Tube(p) => grid(p.tubular_segments, p.radial_segments),
        GeometryParams::Extrude(p) => {
            let outline: u32 = p
                .shapes
                .iter()
                .map(|s| s.len() as u32 * p.curve_segments.max(1))
                .sum();
            let bevel = if p.bevel_enabled { p.bevel_segments } else { 0 };
            grid(outline, 1 + 2 * bevel)
        }
        GeometryParams::Shape(p) => {
            let outline: u32 = p
                .shapes
                .iter()
                .map(|s| s.len() as u32 * p.curve_segments.max(1))
                .sum();
            (outline, 3 * outline.saturating_sub(2))
        }
        GeometryParams::Text(p) => {
            let glyphs = p.text.chars().filter(|c| !c.is_whitespace()).count() as u32;
            let outline = glyphs * 4 * p.curve_segments.max(1);
            grid(outline, 1)
        }
        GeometryParams::Parametric(p) => grid(p.slices, p.stacks),
        GeometryParams::Teapot(p) => {
            // 32 bicubic patches, minus caps the flags disable.
            let mut patches = 0u32;
            if p.body {
                patches += 20;
            }
            if p.lid {
                patches += 8;
            }
            if p.bottom {
                patches += 4;
            }
            let (v, i) = grid(p.segments, p.segments);
            (patches * v, patches * i)
        }
        GeometryParams::Instanced(p) => counts(&p.base),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_reports_declared_kind() {
        let g = Geometry::build(GeometryParams::Box(BoxParams::default()));
        assert_eq!(g.kind_tag, "BoxGeometry");
        assert_eq!(g.params.kind(), "BoxGeometry");
        assert_eq!(g.vertex_count, 24);
        assert_eq!(g.index_count, 36);
    }

    #[test]
    fn test_teapot_builder_reports_generic_tag() {
        let g = Geometry::build(GeometryParams::Teapot(TeapotParams::default()));
        assert_eq!(g.kind_tag, "BufferGeometry");
        assert_eq!(g.params.kind(), "TeapotGeometry");
    }

    #[test]
    fn test_counts_are_deterministic() {
        let a = Geometry::build(GeometryParams::Sphere(SphereParams::default()));
        let b = Geometry::build(GeometryParams::Sphere(SphereParams::default()));
        assert_eq!(a.vertex_count, b.vertex_count);
        assert_eq!(a.index_count, b.index_count);
    }
}
