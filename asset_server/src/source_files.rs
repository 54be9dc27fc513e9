use std::path::{Path, PathBuf};

use relative_path::{Component, RelativePath, RelativePathBuf};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("Not Found")]
    NotFound,
    #[error("Forbidden")]
    Forbidden,
    #[error("Bad Request")]
    BadRequest,
    #[error("Method Not Allowed")]
    MethodNotAllowed,
}

impl RouteError {
    pub fn status_code(&self) -> u16 {
        match self {
            RouteError::NotFound => 404,
            RouteError::Forbidden => 403,
            RouteError::BadRequest => 400,
            RouteError::MethodNotAllowed => 405,
        }
    }
}

/// Relative to the models folder root.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct SourceFileRef(RelativePathBuf);
impl SourceFileRef {
    /// Parses the part of a request path that follows the route prefix.
    /// Percent escapes are decoded, and paths that would leave the models folder are rejected.
    pub fn from_request_path(path: &str) -> Result<Self, RouteError> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let decoded = urlencoding::decode(path).map_err(|_| RouteError::BadRequest)?;
        if decoded.contains(['\\', '\0']) {
            return Err(RouteError::Forbidden);
        }

        let normalized = RelativePath::new(decoded.trim_start_matches('/')).normalize();
        match normalized.components().next() {
            None => Err(RouteError::NotFound),
            Some(Component::ParentDir) => Err(RouteError::Forbidden),
            Some(_) => Ok(Self(normalized)),
        }
    }

    pub fn get_path(&self) -> &RelativePathBuf {
        &self.0
    }

    pub fn to_path(&self, base: &Path) -> PathBuf {
        self.0.to_path(base)
    }

    pub fn content_type(&self) -> &'static str {
        let extension = self.0.extension().map(|v| v.to_ascii_lowercase());
        match extension.as_deref() {
            Some("glb") => "model/gltf-binary",
            Some("gltf") => "model/gltf+json",
            Some("obj") | Some("mtl") => "text/plain; charset=utf-8",
            Some("json") => "application/json",
            Some("png") => "image/png",
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("webp") => "image/webp",
            Some("ktx2") => "image/ktx2",
            _ => "application/octet-stream",
        }
    }
}
