use asset_client::{FetchError, Url};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{url} is not a supported model file (expected .glb, .gltf or .obj)")]
    UnsupportedFormat { url: String },
    #[error("no model named {0:?} in the catalog")]
    UnknownModel(String),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("failed to parse {url}")]
    Parse {
        url: String,
        #[source]
        source: anyhow::Error,
    },
}

impl LoadError {
    pub fn parse(url: &Url, source: anyhow::Error) -> Self {
        Self::Parse {
            url: url.to_string(),
            source,
        }
    }

    /// The error and all of its causes on one line, for logs and the UI.
    pub fn describe(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }
}
