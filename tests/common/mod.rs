use std::{fs, path::Path};

/// One quad using the single material of [`CHROME_MTL`].
pub const CHROME_QUAD_OBJ: &str = "o body\nv 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nusemtl Chrome\nf 1 2 3 4\n";
pub const CHROME_MTL: &str = "newmtl Chrome\nKd 0.8 0.8 0.8\nNs 250\n";

/// A binary glTF with one red triangle in a node named "Box", 2 units wide.
pub fn box_glb() -> Vec<u8> {
    let bin: Vec<u8> = [[0.0f32, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 1.0, 0.0]]
        .iter()
        .flatten()
        .flat_map(|v| v.to_le_bytes())
        .collect();
    let mut json = r#"{
        "asset": { "version": "2.0" },
        "scenes": [{ "nodes": [0] }],
        "nodes": [{ "name": "Box", "mesh": 0 }],
        "meshes": [{ "primitives": [{ "attributes": { "POSITION": 0 }, "material": 0 }] }],
        "materials": [{ "name": "Paint", "pbrMetallicRoughness": { "baseColorFactor": [1.0, 0.0, 0.0, 1.0] } }],
        "buffers": [{ "byteLength": 36 }],
        "bufferViews": [{ "buffer": 0, "byteLength": 36 }],
        "accessors": [{
            "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
            "min": [0.0, 0.0, 0.0], "max": [2.0, 1.0, 0.0]
        }]
    }"#
    .as_bytes()
    .to_vec();
    while json.len() % 4 != 0 {
        json.push(b' ');
    }

    let total = 12 + 8 + json.len() + 8 + bin.len();
    let mut glb = Vec::with_capacity(total);
    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total as u32).to_le_bytes());
    glb.extend_from_slice(&(json.len() as u32).to_le_bytes());
    glb.extend_from_slice(b"JSON");
    glb.extend_from_slice(&json);
    glb.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    glb.extend_from_slice(b"BIN\0");
    glb.extend_from_slice(&bin);
    glb
}

/// `box/scene.glb`, `plain/plain.obj` without materials, and `robot/robot.obj` with its `.mtl`.
pub fn write_models(dir: &Path) {
    for folder in ["box", "plain", "robot"] {
        fs::create_dir_all(dir.join(folder)).unwrap();
    }
    fs::write(dir.join("box/scene.glb"), box_glb()).unwrap();
    fs::write(dir.join("plain/plain.obj"), CHROME_QUAD_OBJ).unwrap();
    fs::write(dir.join("robot/robot.obj"), CHROME_QUAD_OBJ).unwrap();
    fs::write(dir.join("robot/robot.mtl"), CHROME_MTL).unwrap();
}
