use asset_common::{scene::SceneNode, Color};

/// Sets the base color of every material slot of every mesh below `node`.
/// Applying a tint replaces any previous one. No model means nothing to do.
pub fn apply_tint(node: Option<&mut SceneNode>, color: Color) {
    let Some(node) = node else {
        return;
    };
    let mut slots = 0;
    node.for_each_mesh_mut(&mut |mesh| {
        for material in &mut mesh.materials {
            material.base_color = color;
            slots += 1;
        }
    });
    log::trace!("Tinted {} material slots with {}", slots, color);
}
