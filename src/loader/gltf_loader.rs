use std::{collections::HashMap, sync::Arc};

use anyhow::{anyhow, bail, Context, Result};
use asset_common::{
    gpu::Vertex,
    scene::{Geometry, Material, MaterialSource, Mesh, SceneNode},
    transform::Transform,
    Color,
};
use base64::Engine;
use gltf::{buffer, image, mesh::Mode, Gltf};

use super::SceneParser;

/// Buffer URIs that must be downloaded before the file can be parsed.
/// Embedded `data:` URIs and the binary chunk of a `.glb` are not listed.
pub fn external_buffer_uris(bytes: &[u8]) -> Result<Vec<String>> {
    let gltf = Gltf::from_slice(bytes).context("Invalid glTF")?;
    Ok(gltf
        .buffers()
        .filter_map(|buffer| match buffer.source() {
            buffer::Source::Uri(uri) if !uri.starts_with("data:") => Some(uri.to_string()),
            _ => None,
        })
        .collect())
}

/// Parses `.gltf` and `.glb` files into a scene graph.
#[derive(Default)]
pub struct GltfParser {
    /// Contents of external buffers, keyed by the URI written in the file.
    external_buffers: HashMap<String, Vec<u8>>,
}

impl GltfParser {
    pub fn new(external_buffers: HashMap<String, Vec<u8>>) -> Self {
        Self { external_buffers }
    }
}

impl SceneParser for GltfParser {
    fn parse(&self, bytes: &[u8]) -> Result<SceneNode> {
        let Gltf { document, blob } = Gltf::from_slice(bytes).context("Invalid glTF")?;

        let buffers = document
            .buffers()
            .map(|buffer| self.buffer_data(&buffer, blob.as_deref()))
            .collect::<Result<Vec<_>>>()?;

        let scene = document
            .default_scene()
            .or_else(|| document.scenes().next())
            .ok_or_else(|| anyhow!("glTF file has no scene"))?;

        let mut loading_data = SceneLoadingData {
            buffers,
            materials: HashMap::new(),
            geometries: HashMap::new(),
        };
        let mut root = SceneNode::group(scene.name().map(str::to_string));
        for node in scene.nodes() {
            root.children.push(load_node(&mut loading_data, &node)?);
        }
        Ok(root)
    }
}

impl GltfParser {
    fn buffer_data(&self, buffer: &gltf::Buffer<'_>, blob: Option<&[u8]>) -> Result<Vec<u8>> {
        let data = match buffer.source() {
            buffer::Source::Bin => blob
                .ok_or_else(|| anyhow!("Buffer {} refers to a missing binary chunk", buffer.index()))?
                .to_vec(),
            buffer::Source::Uri(uri) if uri.starts_with("data:") => decode_data_uri(uri)
                .with_context(|| format!("Buffer {} has an invalid data URI", buffer.index()))?,
            buffer::Source::Uri(uri) => self
                .external_buffers
                .get(uri)
                .cloned()
                .ok_or_else(|| anyhow!("External buffer {:?} was not provided", uri))?,
        };
        if data.len() < buffer.length() {
            bail!(
                "Buffer {} is {} bytes, expected at least {}",
                buffer.index(),
                data.len(),
                buffer.length()
            );
        }
        Ok(data)
    }
}

fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let (_, payload) = uri
        .split_once(";base64,")
        .ok_or_else(|| anyhow!("Only base64 data URIs are supported"))?;
    Ok(base64::engine::general_purpose::STANDARD.decode(payload)?)
}

//////////////////////// IMPLEMENTATION ////////////////////////

struct SceneLoadingData {
    buffers: Vec<Vec<u8>>,
    materials: HashMap<usize, Material>,
    geometries: HashMap<GeometryKey, Arc<Geometry>>,
}

#[derive(Hash, Eq, PartialEq, Debug, Clone, Copy)]
struct GeometryKey {
    mesh: usize,
    primitive: usize,
}

fn load_node(loading_data: &mut SceneLoadingData, node: &gltf::Node<'_>) -> Result<SceneNode> {
    let transform = {
        let (position, orientation, scale) = node.transform().decomposed();
        Transform::from_arrays(position, orientation, scale)
    };
    let name = node.name().map(str::to_string);

    let mut scene_node = match node.mesh() {
        Some(mesh) => load_model(loading_data, &mesh, name)?,
        None => SceneNode::group(name),
    };
    scene_node.transform = transform;

    for child in node.children() {
        scene_node.children.push(load_node(loading_data, &child)?);
    }
    Ok(scene_node)
}

/// A single primitive becomes a mesh node, several become a group of mesh nodes.
fn load_model(
    loading_data: &mut SceneLoadingData,
    mesh: &gltf::Mesh<'_>,
    name: Option<String>,
) -> Result<SceneNode> {
    let name = name.or_else(|| mesh.name().map(str::to_string));
    let mut primitives = mesh
        .primitives()
        .map(|primitive| {
            let material = load_material(loading_data, &primitive.material());
            let geometry = load_geometry(loading_data, mesh.index(), &primitive)?;
            Ok(Mesh::new(geometry, vec![material]))
        })
        .collect::<Result<Vec<_>>>()?;

    if primitives.len() == 1 {
        if let Some(primitive) = primitives.pop() {
            return Ok(SceneNode::mesh(name, primitive));
        }
    }
    let mut group = SceneNode::group(name);
    group.children = primitives
        .into_iter()
        .map(|primitive| SceneNode::mesh(None, primitive))
        .collect();
    Ok(group)
}

fn load_material(loading_data: &mut SceneLoadingData, material: &gltf::Material<'_>) -> Material {
    let Some(index) = material.index() else {
        return Material::missing_material();
    };

    loading_data
        .materials
        .entry(index)
        .or_insert_with(|| {
            let material_pbr = material.pbr_metallic_roughness();
            let emissive_factor = material.emissive_factor();
            let emissive_strength = material.emissive_strength().unwrap_or(1.0);
            let [r, g, b, a] = material_pbr.base_color_factor();

            let base_color_texture = material_pbr.base_color_texture().and_then(|info| {
                let texture_image = info.texture().source();
                match texture_image.source() {
                    image::Source::Uri { uri, .. } if !uri.starts_with("data:") => {
                        Some(uri.to_string())
                    }
                    _ => texture_image.name().map(str::to_string),
                }
            });

            Material {
                base_color: Color::new(r, g, b),
                base_color_texture,
                opacity: a,
                roughness_factor: material_pbr.roughness_factor(),
                metallic_factor: material_pbr.metallic_factor(),
                emissivity: emissive_factor.map(|v| v * emissive_strength).into(),
                ..Material::new(
                    material
                        .name()
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("material_{}", index)),
                    MaterialSource::Embedded,
                )
            }
        })
        .clone()
}

fn load_geometry(
    loading_data: &mut SceneLoadingData,
    mesh_index: usize,
    primitive: &gltf::Primitive<'_>,
) -> Result<Arc<Geometry>> {
    let key = GeometryKey {
        mesh: mesh_index,
        primitive: primitive.index(),
    };
    if let Some(geometry) = loading_data.geometries.get(&key) {
        return Ok(geometry.clone());
    }

    if primitive.mode() != Mode::Triangles {
        bail!(
            "Primitive {} of mesh {} uses {:?}, only triangles are supported",
            primitive.index(),
            mesh_index,
            primitive.mode()
        );
    }

    let buffers = &loading_data.buffers;
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|v| &v[..]));
    let positions = reader
        .read_positions()
        .ok_or_else(|| anyhow!("Mesh {} has a primitive without positions", mesh_index))?;
    let normals: Box<dyn Iterator<Item = [f32; 3]> + '_> = match reader.read_normals() {
        Some(normals) => Box::new(normals),
        None => Box::new(std::iter::repeat([0.0, 0.0, 1.0])),
    };
    let tex_coords: Box<dyn Iterator<Item = [f32; 2]> + '_> = match reader.read_tex_coords(0) {
        Some(tex_coords) => Box::new(tex_coords.into_f32()),
        None => Box::new(std::iter::repeat([0.0, 0.0])),
    };

    let vertices: Vec<Vertex> = positions
        .zip(normals.zip(tex_coords))
        .map(|(position, (normal, uv))| Vertex::new(position, normal, uv))
        .collect();

    let indices: Vec<u32> = reader
        .read_indices()
        .map(|indices| indices.into_u32().collect())
        .unwrap_or_else(|| (0..(vertices.len() as u32)).collect());
    if let Some(index) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
        bail!(
            "Mesh {} references vertex {} but only has {}",
            mesh_index,
            index,
            vertices.len()
        );
    }

    let geometry = Arc::new(Geometry::new(vertices, indices));
    loading_data.geometries.insert(key, geometry.clone());
    Ok(geometry)
}
