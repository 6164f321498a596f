//! Spatial nodes - the members of the live scene graph
//!
//! The graph is an owned tree: every node has exactly one parent, and
//! ownership flows from parent to children. Kind-specific state lives in
//! a sum type instead of an inheritance chain.

use crate::color::Color;
use crate::effects::Effect;
use crate::geometry::Geometry;
use crate::material::Material;
use crate::math::{Euler, Mat4, Quat, Vec3};
use crate::texture::Texture;
use crate::token::Token;
use crate::document::AnimationClip;

/// Scene background, discriminated by what was stored.
#[derive(Clone, Debug, Default)]
pub enum Background {
    #[default]
    None,
    Color(Color),
    Texture(Texture),
    CubeTexture(Texture),
}

/// Scene fog, discriminated by falloff model.
#[derive(Clone, Debug, Default)]
pub enum Fog {
    #[default]
    None,
    Linear { color: Color, near: f32, far: f32 },
    Exponential { color: Color, density: f32 },
}

/// Opaque handle to a GPU-side shadow map the engine does not own.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShadowMapHandle(pub u64);

/// Shadow configuration bound to a light's runtime shadow object.
///
/// Decoding applies fields onto this struct in place; `map` survives a
/// decode untouched because the GPU resource behind it is not ours to
/// recreate.
#[derive(Clone, Debug, PartialEq)]
pub struct LightShadow {
    pub bias: f32,
    pub radius: f32,
    pub map_width: u32,
    pub map_height: u32,
    pub near: f32,
    pub far: f32,
    pub map: Option<ShadowMapHandle>,
}

impl Default for LightShadow {
    fn default() -> Self {
        Self {
            bias: 0.0,
            radius: 1.0,
            map_width: 512,
            map_height: 512,
            near: 0.5,
            far: 500.0,
            map: None,
        }
    }
}

/// Light variants and their kind-specific fields.
#[derive(Clone, Debug)]
pub enum LightKind {
    Point {
        distance: f32,
        decay: f32,
        shadow: LightShadow,
    },
    Directional {
        shadow: LightShadow,
    },
    Spot {
        distance: f32,
        decay: f32,
        angle: f32,
        penumbra: f32,
        shadow: LightShadow,
    },
    Hemisphere {
        ground_color: Color,
    },
    RectArea {
        width: f32,
        height: f32,
    },
}

/// Fields common to every light.
#[derive(Clone, Debug)]
pub struct Light {
    pub color: Color,
    pub intensity: f32,
    pub kind: LightKind,
}

impl Light {
    pub fn point() -> Self {
        Self {
            color: Color::WHITE,
            intensity: 1.0,
            kind: LightKind::Point {
                distance: 0.0,
                decay: 2.0,
                shadow: LightShadow::default(),
            },
        }
    }

    pub fn directional() -> Self {
        Self {
            color: Color::WHITE,
            intensity: 1.0,
            kind: LightKind::Directional {
                shadow: LightShadow::default(),
            },
        }
    }

    pub fn spot() -> Self {
        Self {
            color: Color::WHITE,
            intensity: 1.0,
            kind: LightKind::Spot {
                distance: 0.0,
                decay: 2.0,
                angle: core::f32::consts::FRAC_PI_3,
                penumbra: 0.0,
                shadow: LightShadow::default(),
            },
        }
    }

    /// The runtime shadow object, for kinds that carry one.
    pub fn shadow_mut(&mut self) -> Option<&mut LightShadow> {
        match &mut self.kind {
            LightKind::Point { shadow, .. }
            | LightKind::Directional { shadow }
            | LightKind::Spot { shadow, .. } => Some(shadow),
            _ => None,
        }
    }
}

/// Positional or global audio source parameters.
#[derive(Clone, Debug)]
pub struct AudioParams {
    pub source: String,
    pub volume: f32,
    pub looped: bool,
    pub autoplay: bool,
    pub positional: bool,
    pub ref_distance: f32,
}

impl Default for AudioParams {
    fn default() -> Self {
        Self {
            source: String::new(),
            volume: 1.0,
            looped: false,
            autoplay: false,
            positional: false,
            ref_distance: 1.0,
        }
    }
}

/// Kind-specific state of a node.
#[derive(Clone, Debug)]
pub enum NodeKind {
    Group,
    Bone,
    Sprite {
        material: Option<Material>,
    },
    Mesh {
        geometry: Geometry,
        materials: Vec<Material>,
    },
    Scene {
        background: Background,
        fog: Fog,
    },
    PerspectiveCamera {
        fov: f32,
        zoom: f32,
        near: f32,
        far: f32,
        focus: f32,
    },
    OrthographicCamera {
        left: f32,
        right: f32,
        top: f32,
        bottom: f32,
        near: f32,
        far: f32,
        zoom: f32,
    },
    Light(Light),
    Audio(AudioParams),
    Effect(Effect),
    /// Externally hosted payload; the remote locator lives in the
    /// annotation bag. `pending` is true until the fetch settles.
    External {
        pending: bool,
    },
}

/// A member of the live scene graph.
#[derive(Clone, Debug)]
pub struct Node {
    pub token: Token,
    pub name: String,
    pub matrix: Mat4,
    pub position: Vec3,
    pub rotation: Euler,
    pub scale: Vec3,
    pub visible: bool,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    pub frustum_culled: bool,
    pub render_order: i32,
    /// Free-form annotation bag carried through a round trip untouched.
    pub user_data: serde_json::Value,
    pub animations: Vec<AnimationClip>,
    pub kind: NodeKind,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            token: Token::generate(),
            name: String::new(),
            matrix: Mat4::IDENTITY,
            position: Vec3::ZERO,
            rotation: Euler::default(),
            scale: Vec3::ONE,
            visible: true,
            cast_shadow: false,
            receive_shadow: false,
            frustum_culled: true,
            render_order: 0,
            user_data: serde_json::Value::Null,
            animations: Vec::new(),
            kind,
            children: Vec::new(),
        }
    }

    pub fn named(kind: NodeKind, name: impl Into<String>) -> Self {
        let mut node = Self::new(kind);
        node.name = name.into();
        node
    }

    /// Recompose the local matrix from position, rotation and scale.
    pub fn update_matrix(&mut self) {
        self.matrix = Mat4::from_scale_rotation_translation(
            self.scale,
            self.rotation.to_quat(),
            self.position,
        );
    }

    /// Derive position/rotation/scale from an assigned local matrix.
    /// The euler order is preserved; angles are re-derived.
    pub fn apply_matrix(&mut self, matrix: Mat4) {
        self.matrix = matrix;
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        self.scale = scale;
        self.position = translation;
        self.rotation = euler_from_quat(rotation, self.rotation.order);
    }

    /// The declared kind of this node, used as the codec dispatch key.
    pub fn kind_tag(&self) -> &'static str {
        match &self.kind {
            NodeKind::Group => "Group",
            NodeKind::Bone => "Bone",
            NodeKind::Sprite { .. } => "Sprite",
            NodeKind::Mesh { .. } => "Mesh",
            NodeKind::Scene { .. } => "Scene",
            NodeKind::PerspectiveCamera { .. } => "PerspectiveCamera",
            NodeKind::OrthographicCamera { .. } => "OrthographicCamera",
            NodeKind::Light(light) => match light.kind {
                LightKind::Point { .. } => "PointLight",
                LightKind::Directional { .. } => "DirectionalLight",
                LightKind::Spot { .. } => "SpotLight",
                LightKind::Hemisphere { .. } => "HemisphereLight",
                LightKind::RectArea { .. } => "RectAreaLight",
            },
            NodeKind::Audio(_) => "Audio",
            NodeKind::Effect(effect) => effect.kind(),
            NodeKind::External { .. } => "External",
        }
    }

    pub fn is_external(&self) -> bool {
        matches!(self.kind, NodeKind::External { .. })
    }

    pub fn is_effect(&self) -> bool {
        matches!(self.kind, NodeKind::Effect(_))
    }

    pub fn is_camera(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::PerspectiveCamera { .. } | NodeKind::OrthographicCamera { .. }
        )
    }

    /// Find a node in this subtree by token.
    pub fn find(&self, token: &Token) -> Option<&Node> {
        if &self.token == token {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(token))
    }

    /// Mutable lookup by token.
    pub fn find_mut(&mut self, token: &Token) -> Option<&mut Node> {
        if &self.token == token {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(token))
    }

    /// Number of nodes in this subtree, including this one.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Node::count).sum::<usize>()
    }

    /// Default perspective camera matching a fresh editor viewport.
    pub fn default_camera() -> Node {
        let mut camera = Node::named(
            NodeKind::PerspectiveCamera {
                fov: 50.0,
                zoom: 1.0,
                near: 0.01,
                far: 1000.0,
                focus: 10.0,
            },
            "Camera",
        );
        camera.position = Vec3::new(0.0, 5.0, 10.0);
        camera.update_matrix();
        camera
    }

    /// Empty scene root.
    pub fn empty_scene() -> Node {
        Node::named(
            NodeKind::Scene {
                background: Background::None,
                fog: Fog::None,
            },
            "Scene",
        )
    }
}

fn euler_from_quat(q: Quat, order: crate::math::EulerOrder) -> Euler {
    use crate::math::EulerOrder;
    let rot = match order {
        EulerOrder::Xyz => glam::EulerRot::XYZ,
        EulerOrder::Yxz => glam::EulerRot::YXZ,
        EulerOrder::Zxy => glam::EulerRot::ZXY,
        EulerOrder::Zyx => glam::EulerRot::ZYX,
        EulerOrder::Yzx => glam::EulerRot::YZX,
        EulerOrder::Xzy => glam::EulerRot::XZY,
    };
    let (a, b, c) = q.to_euler(rot);
    Euler::new(a, b, c, order)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_by_token() {
        let mut scene = Node::empty_scene();
        let child = Node::named(NodeKind::Group, "child");
        let token = child.token.clone();
        scene.children.push(child);

        assert_eq!(scene.find(&token).unwrap().name, "child");
        assert!(scene.find(&Token::new("missing")).is_none());
        assert_eq!(scene.count(), 2);
    }

    #[test]
    fn test_update_matrix_composes_pose() {
        let mut node = Node::new(NodeKind::Group);
        node.position = Vec3::new(1.0, 2.0, 3.0);
        node.update_matrix();
        assert_eq!(node.matrix.w_axis.truncate(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_light_shadow_access() {
        let mut light = Light::spot();
        light.shadow_mut().unwrap().bias = 0.005;
        match light.kind {
            LightKind::Spot { ref shadow, .. } => assert_eq!(shadow.bias, 0.005),
            _ => panic!("expected spot"),
        }

        let mut hemi = Light {
            color: Color::WHITE,
            intensity: 1.0,
            kind: LightKind::Hemisphere {
                ground_color: Color::BLACK,
            },
        };
        assert!(hemi.shadow_mut().is_none());
    }
}
