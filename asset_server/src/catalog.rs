use asset_common::CatalogEntry;

use crate::{assets_config::AssetsConfig, read_startup, source_files::SourceFileRef};

/// The model list served to viewers. Built once at startup.
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    json: Vec<u8>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Result<Self, serde_json::Error> {
        let json = serde_json::to_vec(&entries)?;
        Ok(Self { entries, json })
    }

    pub fn from_config(config: &AssetsConfig) -> Result<Self, serde_json::Error> {
        let entries = if config.catalog.is_empty() && config.discover {
            read_startup::discover_models(config)
        } else {
            config.catalog.clone()
        };
        let catalog = Self::new(entries)?;
        for entry in catalog.unresolved_entries(config) {
            log::warn!(
                "Catalog entry {:?} points at {}, which will not be found",
                entry.name,
                entry.url
            );
        }
        Ok(catalog)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn as_json(&self) -> &[u8] {
        &self.json
    }

    /// Entries whose URL does not point at an existing file below the models folder.
    pub fn unresolved_entries<'a>(&'a self, config: &AssetsConfig) -> Vec<&'a CatalogEntry> {
        self.entries
            .iter()
            .filter(|entry| resolve_entry(config, entry).is_none())
            .collect()
    }
}

fn resolve_entry(config: &AssetsConfig, entry: &CatalogEntry) -> Option<std::path::PathBuf> {
    let rest = entry.url.strip_prefix(config.prefix())?;
    if !rest.starts_with('/') {
        return None;
    }
    let file = SourceFileRef::from_request_path(rest).ok()?;
    let path = file.to_path(&config.models_dir);
    path.is_file().then_some(path)
}
