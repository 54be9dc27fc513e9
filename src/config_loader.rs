use std::path::PathBuf;

use anyhow::Context;
use asset_common::Color;
use serde::{Deserialize, Serialize};

use crate::loader::Normalization;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Base URL of the asset server. Catalog URLs are resolved against it.
    pub server_url: String,
    pub catalog_path: String,
    /// Catalog name of the model to show first. The first entry if unset.
    pub initial_model: Option<String>,
    pub tint: Color,
    pub normalization: Normalization,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:3000".to_string(),
            catalog_path: "/api/models".to_string(),
            initial_model: None,
            tint: Color::WHITE,
            normalization: Normalization::default(),
        }
    }
}

impl Config {
    pub fn from_str(value: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(value)?)
    }
}

pub struct ConfigFileLoader {
    pub path: PathBuf,
    config: Option<Config>,
}

impl ConfigFileLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: None,
        }
    }

    /// Reads the config file. A missing file is replaced by the defaults, which are written back.
    pub fn load_config(&mut self) -> anyhow::Result<&mut Config> {
        let config = match std::fs::read_to_string(&self.path) {
            Ok(content) => Config::from_str(&content)
                .with_context(|| format!("Invalid config file {:?}", self.path))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No config at {:?}, writing the defaults", self.path);
                self.config = Some(Config::default());
                self.save_config()?;
                Config::default()
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {:?}", self.path));
            }
        };
        Ok(self.config.insert(config))
    }

    pub fn get_or_load_config(&mut self) -> anyhow::Result<&mut Config> {
        if self.config.is_none() {
            return self.load_config();
        }
        Ok(self.config.get_or_insert_with(Config::default))
    }

    pub fn save_config(&self) -> anyhow::Result<()> {
        if let Some(config) = &self.config {
            let content = serde_json::to_string_pretty(config)?;
            std::fs::write(&self.path, content)
                .with_context(|| format!("Failed to write {:?}", self.path))?;
        }
        Ok(())
    }
}
