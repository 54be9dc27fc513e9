use std::sync::Arc;

use crate::gpu::Vertex;

use super::Material;

/// A range of indices drawn with one material slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryGroup {
    pub start: u32,
    pub count: u32,
    pub material_index: usize,
}

/// Indexed triangle list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    /// Empty means the whole index range uses material slot 0.
    pub groups: Vec<GeometryGroup>,
}

impl Geometry {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self {
            vertices,
            indices,
            groups: Vec::new(),
        }
    }

    /// Returns `true` if both vertex and index buffers are non-empty.
    pub fn is_valid(&self) -> bool {
        !self.vertices.is_empty() && !self.indices.is_empty()
    }
}

/// A drawable scene node payload.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub geometry: Arc<Geometry>,
    /// One entry per material slot. Never empty.
    pub materials: Vec<Material>,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl Mesh {
    pub fn new(geometry: Arc<Geometry>, materials: Vec<Material>) -> Self {
        let materials = if materials.is_empty() {
            vec![Material::missing_material()]
        } else {
            materials
        };
        Self {
            geometry,
            materials,
            cast_shadow: false,
            receive_shadow: false,
        }
    }

    /// An axis-aligned plane in the XZ plane, facing up, centered at the origin.
    pub fn new_ground_plane(size: f32, material: Material) -> Self {
        let half = size * 0.5;
        let normal = [0.0, 1.0, 0.0];
        let vertices = vec![
            Vertex::new([-half, 0.0, half], normal, [0.0, 0.0]),
            Vertex::new([half, 0.0, half], normal, [1.0, 0.0]),
            Vertex::new([half, 0.0, -half], normal, [1.0, 1.0]),
            Vertex::new([-half, 0.0, -half], normal, [0.0, 1.0]),
        ];
        let indices = vec![0, 1, 2, 2, 3, 0];
        Self::new(Arc::new(Geometry::new(vertices, indices)), vec![material])
    }
}
