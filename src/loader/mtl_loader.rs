//! Reader for Wavefront material libraries (`.mtl`).

use anyhow::{anyhow, Context, Result};
use asset_common::{
    scene::{Material, MaterialSource},
    Color,
};
use ultraviolet::Vec3;

use super::text::{directive, next_f32, next_f32s};

/// Materials of one `.mtl` file, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialLibrary {
    materials: Vec<Material>,
}

impl MaterialLibrary {
    pub fn get(&self, name: &str) -> Option<&Material> {
        self.materials.iter().find(|material| material.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }
}

pub fn load_mtl_from_bytes(bytes: &[u8]) -> Result<MaterialLibrary> {
    let contents = std::str::from_utf8(bytes).context("MTL file is not valid UTF-8")?;
    load_mtl_from_str(contents)
}

pub fn load_mtl_from_str(contents: &str) -> Result<MaterialLibrary> {
    let mut materials = Vec::new();
    let mut current: Option<Material> = None;

    for (index, text) in contents.lines().enumerate() {
        let line = index + 1;
        let Some((keyword, rest)) = directive(text) else {
            continue;
        };

        if keyword == "newmtl" {
            if rest.is_empty() {
                anyhow::bail!("Missing material name on line {}", line);
            }
            materials.extend(current.take());
            current = Some(Material::new(rest, MaterialSource::Library));
            continue;
        }

        let Some(material) = current.as_mut() else {
            anyhow::bail!("'{}' on line {} appears before any newmtl", keyword, line);
        };
        let mut tokens = rest.split_whitespace();
        match keyword {
            "Kd" => material.base_color = Color::from(parse_rgb(&mut tokens, line)?),
            "Ke" => material.emissivity = Vec3::from(parse_rgb(&mut tokens, line)?),
            "Ns" => {
                let shininess = next_f32(&mut tokens, line, "Ns")?;
                material.roughness_factor = shininess_to_roughness(shininess);
            }
            "d" => material.opacity = next_f32(&mut tokens, line, "d")?,
            "Tr" => material.opacity = 1.0 - next_f32(&mut tokens, line, "Tr")?,
            "map_Kd" => {
                // Options such as `-s 1 1 1` come before the file name.
                let file = tokens
                    .last()
                    .ok_or_else(|| anyhow!("Missing texture on line {}", line))?;
                material.base_color_texture = Some(file.to_string());
            }
            // Ka, Ks, Ni, illum and the other texture maps are not used
            _ => {}
        }
    }
    materials.extend(current);

    Ok(MaterialLibrary { materials })
}

/// Blinn-Phong exponent to a roughness in `0..=1`.
fn shininess_to_roughness(shininess: f32) -> f32 {
    (2.0 / (shininess.max(0.0) + 2.0)).sqrt()
}

/// `r g b`, or a single value for a grey.
fn parse_rgb<'a>(tokens: &mut impl Iterator<Item = &'a str>, line: usize) -> Result<[f32; 3]> {
    let mut tokens = tokens.peekable();
    let r = next_f32(&mut tokens, line, "red component")?;
    if tokens.peek().is_none() {
        return Ok([r, r, r]);
    }
    let [g, b] = next_f32s(&mut tokens, line, ["green component", "blue component"])?;
    Ok([r, g, b])
}
