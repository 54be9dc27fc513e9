use asset_client::Url;
use asset_common::scene::SceneNode;

use super::LoadError;

/// Turns the bytes of a main model file into an unplaced scene node.
/// Anything the file references must already be resolved by the parser's owner.
pub trait SceneParser {
    fn parse(&self, bytes: &[u8]) -> anyhow::Result<SceneNode>;
}

/// Which parser a model file goes through, picked by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetFormat {
    /// glTF (`.gltf` JSON or `.glb` binary). Carries its own materials.
    SceneContainer,
    /// Wavefront OBJ. Materials live in an optional sibling `.mtl` file.
    PlainGeometry,
}

impl AssetFormat {
    pub fn from_url(url: &Url) -> Result<Self, LoadError> {
        let extension = file_name(url)
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, extension)| extension.to_ascii_lowercase());
        match extension.as_deref() {
            Some("glb") | Some("gltf") => Ok(Self::SceneContainer),
            Some("obj") => Ok(Self::PlainGeometry),
            _ => Err(LoadError::UnsupportedFormat {
                url: url.to_string(),
            }),
        }
    }
}

/// Last path segment of `url`, still percent-encoded.
pub fn file_name(url: &Url) -> Option<&str> {
    url.path_segments()?.last().filter(|name| !name.is_empty())
}

/// The file next to `url` with the same base name and a different extension.
pub fn sibling_url(url: &Url, extension: &str) -> Option<Url> {
    let (stem, _) = file_name(url)?.rsplit_once('.')?;
    url.join(&format!("./{}.{}", stem, extension)).ok()
}
