//! Math conventions for the scene graph
//!
//! Transforms build on glam; rotations are stored as euler angles with an
//! explicit application order so the editor's rotation widgets stay stable
//! across a save/load cycle.

pub use glam::{Mat4, Quat, Vec2, Vec3};

/// Euler rotation application order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EulerOrder {
    #[default]
    Xyz,
    Yxz,
    Zxy,
    Zyx,
    Yzx,
    Xzy,
}

impl EulerOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            EulerOrder::Xyz => "XYZ",
            EulerOrder::Yxz => "YXZ",
            EulerOrder::Zxy => "ZXY",
            EulerOrder::Zyx => "ZYX",
            EulerOrder::Yzx => "YZX",
            EulerOrder::Xzy => "XZY",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "XYZ" => Some(EulerOrder::Xyz),
            "YXZ" => Some(EulerOrder::Yxz),
            "ZXY" => Some(EulerOrder::Zxy),
            "ZYX" => Some(EulerOrder::Zyx),
            "YZX" => Some(EulerOrder::Yzx),
            "XZY" => Some(EulerOrder::Xzy),
            _ => None,
        }
    }

    fn as_glam(&self) -> glam::EulerRot {
        match self {
            EulerOrder::Xyz => glam::EulerRot::XYZ,
            EulerOrder::Yxz => glam::EulerRot::YXZ,
            EulerOrder::Zxy => glam::EulerRot::ZXY,
            EulerOrder::Zyx => glam::EulerRot::ZYX,
            EulerOrder::Yzx => glam::EulerRot::YZX,
            EulerOrder::Xzy => glam::EulerRot::XZY,
        }
    }
}

/// Euler rotation in radians with an explicit order.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Euler {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub order: EulerOrder,
}

impl Euler {
    pub fn new(x: f32, y: f32, z: f32, order: EulerOrder) -> Self {
        Self { x, y, z, order }
    }

    pub fn to_quat(&self) -> Quat {
        Quat::from_euler(self.order.as_glam(), self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_roundtrip() {
        for order in [
            EulerOrder::Xyz,
            EulerOrder::Yxz,
            EulerOrder::Zxy,
            EulerOrder::Zyx,
            EulerOrder::Yzx,
            EulerOrder::Xzy,
        ] {
            assert_eq!(EulerOrder::parse(order.as_str()), Some(order));
        }
        assert_eq!(EulerOrder::parse("WXY"), None);
    }

    #[test]
    fn test_to_quat_identity() {
        let e = Euler::default();
        let q = e.to_quat();
        assert!(q.abs_diff_eq(Quat::IDENTITY, 1e-6));
    }
}
