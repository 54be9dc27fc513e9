use ultraviolet::Vec3;

use crate::transform::Transform;

use super::{BoundingBox, Mesh};

#[derive(Debug, Clone)]
pub enum NodeKind {
    Group,
    Mesh(Mesh),
}

/// Element of the scene graph.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: Option<String>,
    pub transform: Transform,
    pub kind: NodeKind,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn group(name: Option<String>) -> Self {
        Self {
            name,
            transform: Transform::default(),
            kind: NodeKind::Group,
            children: Vec::new(),
        }
    }

    pub fn mesh(name: Option<String>, mesh: Mesh) -> Self {
        Self {
            name,
            transform: Transform::default(),
            kind: NodeKind::Mesh(mesh),
            children: Vec::new(),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn as_mesh(&self) -> Option<&Mesh> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            NodeKind::Group => None,
        }
    }

    /// Visits this node and all descendants, depth first.
    pub fn traverse<'a>(&'a self, visit: &mut impl FnMut(&'a SceneNode)) {
        visit(self);
        for child in &self.children {
            child.traverse(visit);
        }
    }

    pub fn for_each_mesh<'a>(&'a self, visit: &mut impl FnMut(&'a Mesh)) {
        self.traverse(&mut |node| {
            if let Some(mesh) = node.as_mesh() {
                visit(mesh);
            }
        });
    }

    pub fn for_each_mesh_mut(&mut self, visit: &mut impl FnMut(&mut Mesh)) {
        if let NodeKind::Mesh(mesh) = &mut self.kind {
            visit(mesh);
        }
        for child in &mut self.children {
            child.for_each_mesh_mut(visit);
        }
    }

    pub fn mesh_count(&self) -> usize {
        let mut count = 0;
        self.for_each_mesh(&mut |_| count += 1);
        count
    }

    /// Bounds of all geometry below this node, in this node's own space
    /// (its own transform is not applied). `None` if there are no vertices.
    pub fn local_bounds(&self) -> Option<BoundingBox> {
        let mut bounds = None;
        self.accumulate_bounds(&Transform::default(), &mut bounds);
        bounds
    }

    fn accumulate_bounds(&self, to_root: &Transform, bounds: &mut Option<BoundingBox>) {
        if let NodeKind::Mesh(mesh) = &self.kind {
            for vertex in &mesh.geometry.vertices {
                let point = to_root.transform_point(Vec3::from(vertex.position));
                *bounds = BoundingBox::extend(*bounds, point);
            }
        }
        for child in &self.children {
            let child_to_root = to_root * child.transform.clone();
            child.accumulate_bounds(&child_to_root, bounds);
        }
    }
}
