use serde::{Deserialize, Serialize};

/// One selectable model, as listed by the asset server.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, Hash, PartialEq)]
pub struct CatalogEntry {
    /// Display name.
    pub name: String,
    /// Server-relative URL of the main asset file, e.g. `/models/box/scene.glb`.
    pub url: String,
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}
