//! OBJ parser supporting positions, normals, texture coordinates, objects and material groups.

use std::{
    collections::HashMap,
    io::{self, BufRead},
    sync::Arc,
};

use anyhow::{anyhow, Context, Result};
use asset_common::{
    gpu::Vertex,
    scene::{Geometry, GeometryGroup, Material, Mesh, SceneNode},
};

use super::{
    text::{directive, next_f32s},
    MaterialLibrary, SceneParser,
};

/// One `o`/`g` block of an OBJ file.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjObject {
    pub name: Option<String>,
    pub geometry: Geometry,
    /// Material named by `usemtl` for each group slot. `None` before any `usemtl`.
    pub material_names: Vec<Option<String>>,
}

/// Parses OBJ geometry and binds it to a material library, if there is one.
pub struct ObjParser {
    materials: Option<MaterialLibrary>,
}

impl ObjParser {
    pub fn new(materials: Option<MaterialLibrary>) -> Self {
        Self { materials }
    }

    fn resolve_material(&self, name: Option<&str>) -> Material {
        match (&self.materials, name) {
            (Some(library), Some(name)) => match library.get(name) {
                Some(material) => material.clone(),
                None => {
                    log::warn!("Material {:?} is not in the library, using the default", name);
                    Material::missing_material()
                }
            },
            _ => Material::missing_material(),
        }
    }
}

impl SceneParser for ObjParser {
    fn parse(&self, bytes: &[u8]) -> Result<SceneNode> {
        let objects = load_obj_from_reader(io::Cursor::new(bytes))?;

        let mut root = SceneNode::group(None);
        for object in objects {
            let materials = object
                .material_names
                .iter()
                .map(|name| self.resolve_material(name.as_deref()))
                .collect();
            let mesh = Mesh::new(Arc::new(object.geometry), materials);
            root.children.push(SceneNode::mesh(object.name, mesh));
        }
        Ok(root)
    }
}

/// Load OBJ objects from a [`BufRead`] implementation.
pub fn load_obj_from_reader<R: BufRead>(reader: R) -> Result<Vec<ObjObject>> {
    parse_obj(reader)
}

/// Convenience helper to parse an OBJ string literal.
pub fn load_obj_from_str(contents: &str) -> Result<Vec<ObjObject>> {
    parse_obj(io::Cursor::new(contents))
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
struct Key(usize, Option<usize>, Option<usize>);

#[derive(Default)]
struct ObjectBuilder {
    name: Option<String>,
    unique: HashMap<Key, u32>,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    groups: Vec<GeometryGroup>,
    material_names: Vec<Option<String>>,
}

impl ObjectBuilder {
    fn named(name: Option<String>) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }

    /// Makes sure the last group draws with `material`, opening a new group if needed.
    fn use_material(&mut self, material: &Option<String>) {
        let slot = match self.material_names.iter().position(|v| v == material) {
            Some(slot) => slot,
            None => {
                self.material_names.push(material.clone());
                self.material_names.len() - 1
            }
        };
        if self.groups.last().map(|g| g.material_index) == Some(slot) {
            return;
        }
        self.groups.push(GeometryGroup {
            start: self.indices.len() as u32,
            count: 0,
            material_index: slot,
        });
    }

    fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend([a, b, c]);
        if let Some(group) = self.groups.last_mut() {
            group.count += 3;
        }
    }

    fn finish(self) -> Option<ObjObject> {
        if self.indices.is_empty() {
            return None;
        }
        let mut geometry = Geometry::new(self.vertices, self.indices);
        geometry.groups = self.groups.into_iter().filter(|g| g.count > 0).collect();
        Some(ObjObject {
            name: self.name,
            geometry,
            material_names: self.material_names,
        })
    }
}

/// How many positions, texture coordinates and normals have been read so far.
#[derive(Clone, Copy, Debug)]
struct Counts {
    positions: usize,
    texcoords: usize,
    normals: usize,
}

fn parse_obj<R: BufRead>(reader: R) -> Result<Vec<ObjObject>> {
    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut normals: Vec<[f32; 3]> = Vec::new();
    let mut texcoords: Vec<[f32; 2]> = Vec::new();

    let mut objects: Vec<ObjObject> = Vec::new();
    let mut current = ObjectBuilder::default();
    let mut current_material: Option<String> = None;

    for (index, text) in reader.lines().enumerate() {
        let line = index + 1;
        let text = text.with_context(|| format!("Failed to read line {}", line))?;
        let Some((keyword, rest)) = directive(&text) else {
            continue;
        };
        let mut tokens = rest.split_whitespace();

        match keyword {
            "v" => positions.push(next_f32s(&mut tokens, line, ["x", "y", "z"])?),
            "vt" => texcoords.push(next_f32s(&mut tokens, line, ["u", "v"])?),
            "vn" => normals.push(next_f32s(&mut tokens, line, ["nx", "ny", "nz"])?),
            "o" | "g" => {
                let name = Some(rest.to_string()).filter(|name| !name.is_empty());
                if current.indices.is_empty() {
                    // Nothing drawn yet, so this only names the object.
                    current.name = name;
                } else {
                    let finished = std::mem::replace(&mut current, ObjectBuilder::named(name));
                    objects.extend(finished.finish());
                }
            }
            "usemtl" => current_material = Some(rest.to_string()).filter(|name| !name.is_empty()),
            "f" => {
                let counts = Counts {
                    positions: positions.len(),
                    texcoords: texcoords.len(),
                    normals: normals.len(),
                };
                let mut corners: Vec<u32> = Vec::new();
                for token in tokens {
                    let key = parse_corner(token, counts, line)?;
                    let vertex = match current.unique.get(&key) {
                        Some(&vertex) => vertex,
                        None => {
                            let Key(position, uv, normal) = key;
                            let vertex = u32::try_from(current.vertices.len())
                                .map_err(|_| anyhow!("Too many vertices in OBJ (>{})", u32::MAX))?;
                            current.vertices.push(Vertex::new(
                                positions[position],
                                normal.map_or([0.0, 0.0, 1.0], |i| normals[i]),
                                uv.map_or([0.0, 0.0], |i| texcoords[i]),
                            ));
                            current.unique.insert(key, vertex);
                            vertex
                        }
                    };
                    corners.push(vertex);
                }

                if let [first, rest @ ..] = corners.as_slice() {
                    if rest.len() < 2 {
                        continue;
                    }
                    current.use_material(&current_material);
                    for pair in rest.windows(2) {
                        current.push_triangle(*first, pair[0], pair[1]);
                    }
                }
            }
            // mtllib, s, l and the rest do not affect the geometry
            _ => {}
        }
    }
    objects.extend(current.finish());

    if objects.is_empty() {
        anyhow::bail!("OBJ contained no triangles");
    }

    Ok(objects)
}

/// Reads one `v`, `v/vt`, `v//vn` or `v/vt/vn` corner of a face.
fn parse_corner(token: &str, counts: Counts, line: usize) -> Result<Key> {
    let mut fields = token.split('/');
    let position = fields
        .next()
        .filter(|field| !field.is_empty())
        .ok_or_else(|| anyhow!("Face corner '{}' has no position on line {}", token, line))?;
    let optional = |field: Option<&str>, count: usize| {
        field
            .filter(|field| !field.is_empty())
            .map(|field| resolve_index(field, count, line))
            .transpose()
    };

    Ok(Key(
        resolve_index(position, counts.positions, line)?,
        optional(fields.next(), counts.texcoords)?,
        optional(fields.next(), counts.normals)?,
    ))
}

/// Positive indices count from 1, negative ones back from the last element read.
fn resolve_index(token: &str, count: usize, line: usize) -> Result<usize> {
    let raw: i64 = token
        .parse()
        .with_context(|| format!("Invalid index '{}' on line {}", token, line))?;
    let index = if raw > 0 {
        usize::try_from(raw - 1).ok()
    } else {
        usize::try_from(raw.unsigned_abs())
            .ok()
            .filter(|&back| back > 0)
            .and_then(|back| count.checked_sub(back))
    };
    index.filter(|&index| index < count).ok_or_else(|| {
        anyhow!(
            "Index {} on line {} is out of range, {} available",
            raw,
            line,
            count
        )
    })
}
