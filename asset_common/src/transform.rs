use std::ops::Mul;

use serde::{Deserialize, Serialize};
use ultraviolet::{Rotor3, Vec3};

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Transform {
    pub position: Vec3,
    pub orientation: Rotor3,
    pub scale: Vec3,
}

impl Transform {
    pub fn from_arrays(position: [f32; 3], orientation: [f32; 4], scale: [f32; 3]) -> Self {
        Self {
            position: Vec3::from(position),
            orientation: Rotor3::from_quaternion_array(orientation),
            scale: Vec3::from(scale),
        }
    }

    /// Places something at `position` with `orientation` and a uniform `scale`.
    pub fn placed(position: [f32; 3], orientation: [f32; 4], scale: f32) -> Self {
        Self::from_arrays(position, orientation, [scale; 3])
    }

    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + (self.orientation * (point * self.scale))
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zero(),
            orientation: Rotor3::identity(),
            scale: Vec3::one(),
        }
    }
}

impl Mul<Transform> for &Transform {
    type Output = Transform;

    fn mul(self, rhs: Transform) -> Self::Output {
        Transform {
            position: self.transform_point(rhs.position),
            orientation: self.orientation * rhs.orientation,
            scale: self.scale * rhs.scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composes_parent_then_child() {
        let parent = Transform::placed([0.0, 1.0, 0.0], [0.0, 0.0, 0.0, 1.0], 2.0);
        let child = Transform::placed([1.0, 0.0, 0.0], [0.0, 0.0, 0.0, 1.0], 1.0);
        let global = &parent * child;

        assert_eq!(global.position, Vec3::new(2.0, 1.0, 0.0));
        assert_eq!(global.scale, Vec3::broadcast(2.0));
        assert_eq!(
            global.transform_point(Vec3::new(0.5, 0.0, 0.0)),
            Vec3::new(3.0, 1.0, 0.0)
        );
    }
}
