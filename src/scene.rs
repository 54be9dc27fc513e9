use asset_common::{
    scene::{Material, MaterialSource, Mesh, SceneNode},
    Color,
};
use ultraviolet::Vec3;

pub struct SpotLight {
    pub color: Color,
    pub intensity: f32,
    pub distance: f32,
    /// Half-angle of the cone, in radians.
    pub angle: f32,
    pub penumbra: f32,
    pub position: Vec3,
    pub cast_shadow: bool,
    pub shadow_bias: f32,
}

impl Default for SpotLight {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            intensity: 3000.0,
            distance: 100.0,
            angle: 0.4,
            penumbra: 1.0,
            position: Vec3::new(0.0, 25.0, 0.0),
            cast_shadow: true,
            shadow_bias: -0.0001,
        }
    }
}

/// Everything a frame would draw: the fixed stage, its lights and at most one loaded model.
pub struct Scene {
    pub stage: Vec<SceneNode>,
    pub lights: Vec<SpotLight>,
    asset: Option<SceneNode>,
}

impl Scene {
    /// Ground plane and a shadow casting spot light.
    pub fn with_stage() -> Self {
        let ground_material = Material {
            base_color: Color::from_rgb_u8(0x55, 0x55, 0x55),
            ..Material::new("ground", MaterialSource::Default)
        };
        let mut ground = Mesh::new_ground_plane(20.0, ground_material);
        ground.receive_shadow = true;
        ground.cast_shadow = false;

        Self {
            stage: vec![SceneNode::mesh(Some("ground".into()), ground)],
            lights: vec![SpotLight::default()],
            asset: None,
        }
    }

    pub fn asset(&self) -> Option<&SceneNode> {
        self.asset.as_ref()
    }

    pub fn asset_mut(&mut self) -> Option<&mut SceneNode> {
        self.asset.as_mut()
    }

    /// Attaches `asset`, handing back the one it replaces.
    pub fn replace_asset(&mut self, asset: SceneNode) -> Option<SceneNode> {
        self.asset.replace(asset)
    }

    pub fn take_asset(&mut self) -> Option<SceneNode> {
        self.asset.take()
    }

    pub fn top_level_nodes(&self) -> impl Iterator<Item = &SceneNode> {
        self.stage.iter().chain(self.asset.iter())
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::with_stage()
    }
}
