use asset_common::{
    scene::{BoundingBox, SceneNode},
    transform::Transform,
    Color,
};
use serde::{Deserialize, Serialize};

use crate::tint::apply_tint;

/// Where a loaded model ends up in the world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Placement {
    pub position: [f32; 3],
    /// Quaternion, `[x, y, z, w]`.
    pub orientation: [f32; 4],
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            position: [0.0, 1.05, -1.0],
            orientation: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

/// How a freshly parsed model is fitted into the stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum Normalization {
    /// Uniformly scale so that the largest side of the bounding box is `target_size`.
    Rescale {
        #[serde(default = "default_target_size")]
        target_size: f32,
        #[serde(default)]
        placement: Placement,
    },
    /// Keep the authored size.
    Fixed {
        #[serde(default)]
        placement: Placement,
    },
}

fn default_target_size() -> f32 {
    4.0
}

impl Default for Normalization {
    fn default() -> Self {
        Self::Rescale {
            target_size: default_target_size(),
            placement: Placement::default(),
        }
    }
}

impl Normalization {
    pub fn placement(&self) -> Placement {
        match self {
            Self::Rescale { placement, .. } | Self::Fixed { placement } => *placement,
        }
    }

    /// Uniform scale for a model with the given local bounds.
    /// Empty, flat-to-a-point, or non-finite bounds leave the model at its own size.
    pub fn scale_for(&self, bounds: Option<BoundingBox>) -> f32 {
        let Self::Rescale { target_size, .. } = self else {
            return 1.0;
        };
        let Some(bounds) = bounds else {
            return 1.0;
        };
        let largest = bounds.largest_dimension();
        if !largest.is_finite() || largest <= f32::EPSILON {
            return 1.0;
        }
        let scale = target_size / largest;
        if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            1.0
        }
    }

    /// Prepares a parsed model for display: shadows on, tinted, placed and scaled.
    pub fn apply(&self, node: &mut SceneNode, tint: Color) {
        node.for_each_mesh_mut(&mut |mesh| {
            mesh.cast_shadow = true;
            mesh.receive_shadow = true;
        });
        apply_tint(Some(&mut *node), tint);

        let scale = self.scale_for(node.local_bounds());
        let placement = self.placement();
        node.transform = Transform::placed(placement.position, placement.orientation, scale);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use asset_common::{
        gpu::Vertex,
        scene::{Geometry, Mesh},
    };
    use ultraviolet::Vec3;

    use super::*;

    fn flat_square(size: f32) -> SceneNode {
        let geometry = Geometry::new(
            vec![
                Vertex::new([0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
                Vertex::new([size, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0]),
                Vertex::new([size, size / 2.0, 0.0], [0.0, 0.0, 1.0], [1.0, 1.0]),
            ],
            vec![0, 1, 2],
        );
        SceneNode::group(None)
            .with_child(SceneNode::mesh(None, Mesh::new(Arc::new(geometry), vec![])))
    }

    #[test]
    fn rescales_largest_side_to_target() {
        let normalization = Normalization::default();
        let mut node = flat_square(0.5);
        normalization.apply(&mut node, Color::new(0.0, 1.0, 0.0));

        assert_eq!(node.transform.scale, Vec3::broadcast(8.0));
        assert_eq!(node.transform.position, Vec3::new(0.0, 1.05, -1.0));
        node.for_each_mesh(&mut |mesh| {
            assert!(mesh.cast_shadow && mesh.receive_shadow);
            assert_eq!(mesh.materials[0].base_color, Color::new(0.0, 1.0, 0.0));
        });
    }

    #[test]
    fn degenerate_bounds_keep_unit_scale() {
        let normalization = Normalization::default();
        assert_eq!(normalization.scale_for(None), 1.0);
        assert_eq!(
            normalization.scale_for(Some(BoundingBox::from_point(Vec3::one()))),
            1.0
        );
        let infinite = BoundingBox {
            min: Vec3::zero(),
            max: Vec3::new(f32::INFINITY, 0.0, 0.0),
        };
        assert_eq!(normalization.scale_for(Some(infinite)), 1.0);

        let mut empty = SceneNode::group(None);
        normalization.apply(&mut empty, Color::WHITE);
        assert_eq!(empty.transform.scale, Vec3::one());
    }

    #[test]
    fn fixed_policy_keeps_size() {
        let normalization = Normalization::Fixed {
            placement: Placement {
                position: [1.0, 2.0, 3.0],
                ..Default::default()
            },
        };
        let mut node = flat_square(10.0);
        normalization.apply(&mut node, Color::WHITE);
        assert_eq!(node.transform.scale, Vec3::one());
        assert_eq!(node.transform.position, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn reads_policy_from_json() {
        let rescale: Normalization =
            serde_json::from_str(r#"{ "policy": "rescale", "target_size": 2.0 }"#).unwrap();
        assert_eq!(
            rescale,
            Normalization::Rescale {
                target_size: 2.0,
                placement: Placement::default()
            }
        );
        let fixed: Normalization = serde_json::from_str(r#"{ "policy": "fixed" }"#).unwrap();
        assert_eq!(fixed.placement(), Placement::default());
    }
}
