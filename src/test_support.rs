use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
    time::Duration,
};

use asset_client::{AssetFetcher, FetchError, Progress, Url};

/// Two objects, the first one using two materials.
pub const ROBOT_OBJ: &str = r#"# robot
mtllib robot.mtl
o body
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
usemtl Chrome
f 1 2 3
usemtl Paint
f 1 3 4
o head
v 0 2 0
v 1 2 0
v 0 3 0
usemtl Paint
f 5 6 7
"#;

pub const ROBOT_MTL: &str = r#"newmtl Chrome
Kd 0.8 0.8 0.8
Ns 250

newmtl Paint
Kd 0.1 0.2 0.9
"#;

/// Three `f32` positions: (0,0,0), (2,0,0), (0,1,0).
pub fn triangle_bin() -> Vec<u8> {
    [[0.0f32, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 1.0, 0.0]]
        .iter()
        .flatten()
        .flat_map(|v| v.to_le_bytes())
        .collect()
}

/// A one-triangle glTF document. Without `buffer_uri` the buffer is the GLB binary chunk.
pub fn triangle_gltf_json(buffer_uri: Option<&str>) -> String {
    let uri = buffer_uri
        .map(|uri| format!(r#", "uri": "{}""#, uri))
        .unwrap_or_default();
    format!(
        r#"{{
            "asset": {{ "version": "2.0" }},
            "scene": 0,
            "scenes": [{{ "nodes": [0] }}],
            "nodes": [{{ "name": "Triangle", "mesh": 0 }}],
            "meshes": [{{ "primitives": [{{ "attributes": {{ "POSITION": 0 }}, "material": 0 }}] }}],
            "materials": [{{
                "name": "Paint",
                "pbrMetallicRoughness": {{ "baseColorFactor": [1.0, 0.0, 0.0, 1.0] }}
            }}],
            "buffers": [{{ "byteLength": 36{} }}],
            "bufferViews": [{{ "buffer": 0, "byteLength": 36 }}],
            "accessors": [{{
                "bufferView": 0,
                "componentType": 5126,
                "count": 3,
                "type": "VEC3",
                "min": [0.0, 0.0, 0.0],
                "max": [2.0, 1.0, 0.0]
            }}]
        }}"#,
        uri
    )
}

pub fn triangle_glb() -> Vec<u8> {
    let mut json = triangle_gltf_json(None).into_bytes();
    while json.len() % 4 != 0 {
        json.push(b' ');
    }
    let bin = triangle_bin();

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

/// In-memory stand-in for the asset server, keyed by URL path.
#[derive(Default)]
pub struct MockFetcher {
    files: HashMap<String, (Vec<u8>, Duration)>,
    /// Paths that exist but answer GET with this status.
    failing_fetches: HashMap<String, u16>,
    /// Paths whose existence check itself fails.
    failing_checks: HashSet<String>,
    fetches: Mutex<Vec<Url>>,
    checks: Mutex<Vec<Url>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.with_slow_file(path, bytes, Duration::ZERO)
    }

    /// The file only arrives after `delay`.
    pub fn with_slow_file(mut self, path: &str, bytes: impl Into<Vec<u8>>, delay: Duration) -> Self {
        self.files.insert(path.to_string(), (bytes.into(), delay));
        self
    }

    /// The file is listed as present, but downloading it fails with `status`.
    pub fn with_failing_fetch(mut self, path: &str, status: u16) -> Self {
        self.failing_fetches.insert(path.to_string(), status);
        self
    }

    /// Asking whether the file exists fails.
    pub fn with_failing_check(mut self, path: &str) -> Self {
        self.failing_checks.insert(path.to_string());
        self
    }

    pub fn fetches(&self) -> Vec<Url> {
        self.fetches.lock().unwrap().clone()
    }

    pub fn existence_checks(&self) -> Vec<Url> {
        self.checks.lock().unwrap().clone()
    }
}

impl AssetFetcher for MockFetcher {
    async fn fetch(
        &self,
        url: &Url,
        progress: &(dyn Fn(Progress) + Send + Sync),
    ) -> Result<Vec<u8>, FetchError> {
        self.fetches.lock().unwrap().push(url.clone());
        if let Some(&status) = self.failing_fetches.get(url.path()) {
            return Err(FetchError::Status {
                url: url.clone(),
                status,
            });
        }
        let Some((bytes, delay)) = self.files.get(url.path()).cloned() else {
            return Err(FetchError::Status {
                url: url.clone(),
                status: 404,
            });
        };

        let total = Some(bytes.len() as u64);
        progress(Progress { loaded: 0, total });
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        progress(Progress {
            loaded: bytes.len() as u64 / 2,
            total,
        });
        progress(Progress {
            loaded: bytes.len() as u64,
            total,
        });
        Ok(bytes)
    }

    async fn exists(&self, url: &Url) -> Result<bool, FetchError> {
        self.checks.lock().unwrap().push(url.clone());
        if self.failing_checks.contains(url.path()) {
            return Err(FetchError::Status {
                url: url.clone(),
                status: 503,
            });
        }
        Ok(self.files.contains_key(url.path()) || self.failing_fetches.contains_key(url.path()))
    }
}
