use std::path::{Path, PathBuf};

use anyhow::Context;
use asset_common::CatalogEntry;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    pub host: String,
    pub port: u16,
    /// Folder the `route_prefix` URLs are served from.
    pub models_dir: PathBuf,
    pub route_prefix: String,
    pub workers: usize,
    /// List every model file under `models_dir` when `catalog` is empty.
    pub discover: bool,
    pub catalog: Vec<CatalogEntry>,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3000,
            models_dir: "models".into(),
            route_prefix: "/models".into(),
            workers: 4,
            discover: false,
            catalog: vec![
                CatalogEntry::new("Example GLB", "/models/trailer_glb/scene.glb"),
                CatalogEntry::new("Example OBJ", "/models/r2-d2/r2-d2.obj"),
                CatalogEntry::new("Example GLTF", "/models/trailer_gltf/scene.gltf"),
            ],
        }
    }
}

impl AssetsConfig {
    /// Reads the config file, falling back to the defaults if it does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            log::info!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {:?}", path))?;
        serde_json::from_str(&content).with_context(|| format!("Invalid config {:?}", path))
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The route prefix without a trailing slash, e.g. `/models`.
    pub fn prefix(&self) -> &str {
        self.route_prefix.trim_end_matches('/')
    }
}
