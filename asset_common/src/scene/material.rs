use ultraviolet::Vec3;

use crate::Color;

/// Where a material's properties were read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialSource {
    /// Stand-in used when no material could be loaded.
    Default,
    /// Embedded in a scene container file.
    Embedded,
    /// Read from a sibling material library file.
    Library,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub source: MaterialSource,
    pub base_color: Color,
    /// Texture file referenced by the material. Recorded, not decoded.
    pub base_color_texture: Option<String>,
    pub opacity: f32,
    pub roughness_factor: f32,
    pub metallic_factor: f32,
    pub emissivity: Vec3,
}

impl Material {
    pub fn new(name: impl Into<String>, source: MaterialSource) -> Self {
        Self {
            name: name.into(),
            source,
            base_color: Color::WHITE,
            base_color_texture: None,
            opacity: 1.0,
            roughness_factor: 1.0,
            metallic_factor: 0.0,
            emissivity: Vec3::zero(),
        }
    }

    pub fn missing_material() -> Self {
        Self {
            base_color: Color::new(0.8, 0.8, 0.0),
            ..Self::new("default", MaterialSource::Default)
        }
    }
}
