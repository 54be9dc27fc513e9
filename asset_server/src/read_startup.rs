use asset_common::CatalogEntry;
use relative_path::PathExt;
use walkdir::WalkDir;

use crate::assets_config::AssetsConfig;

const MODEL_EXTENSIONS: [&str; 3] = ["glb", "gltf", "obj"];

/// Lists every model file under the models folder, sorted by path.
/// Entries are named after their path without the extension, e.g. `trailer_glb/scene`.
pub fn discover_models(config: &AssetsConfig) -> Vec<CatalogEntry> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(&config.models_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let is_model = entry
            .path()
            .extension()
            .and_then(|v| v.to_str())
            .is_some_and(|v| MODEL_EXTENSIONS.contains(&v.to_ascii_lowercase().as_str()));
        if !is_model {
            continue;
        }

        let relative_path = match entry.path().relative_to(&config.models_dir) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("Skipping {:?}: {}", entry.path(), e);
                continue;
            }
        };

        let url = relative_path
            .components()
            .map(|v| urlencoding::encode(v.as_str()).into_owned())
            .fold(config.prefix().to_string(), |url, segment| url + "/" + &segment);
        let name = relative_path.with_extension("").into_string();
        entries.push(CatalogEntry { name, url });
    }

    entries
}
