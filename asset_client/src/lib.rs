// Deals with HTTP
// Isn't directly aware of scene formats

use std::future::Future;

pub use asset_common;
use asset_common::CatalogEntry;
pub use reqwest::Url;
use thiserror::Error;

/// Bytes received so far for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub loaded: u64,
    /// `None` when the server did not announce a length.
    pub total: Option<u64>,
}

impl Progress {
    pub fn ratio(&self) -> Option<f32> {
        match self.total {
            Some(total) if total > 0 => Some((self.loaded as f32 / total as f32).min(1.0)),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed")]
    Transport {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}")]
    Status { url: Url, status: u16 },
    #[error("{url} did not return a valid catalog")]
    InvalidCatalog {
        url: Url,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot resolve {reference:?}: {reason}")]
    InvalidUrl { reference: String, reason: String },
    #[error("{url} is larger than the {limit} byte limit")]
    TooLarge { url: Url, limit: u64 },
}

/// Resolves `reference` (absolute, or relative like `/models/a.glb` or `a.bin`) against `base`.
pub fn resolve_url(base: &Url, reference: &str) -> Result<Url, FetchError> {
    base.join(reference).map_err(|e| FetchError::InvalidUrl {
        reference: reference.into(),
        reason: e.to_string(),
    })
}

/// The network seam of the viewer. Implemented over HTTP by [`HttpAssetClient`].
pub trait AssetFetcher: Send + Sync + 'static {
    /// Downloads a whole file, reporting progress as bytes arrive.
    fn fetch(
        &self,
        url: &Url,
        progress: &(dyn Fn(Progress) + Send + Sync),
    ) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send;

    /// Lightweight existence check. A missing file is `Ok(false)`, not an error.
    fn exists(&self, url: &Url) -> impl Future<Output = Result<bool, FetchError>> + Send;

    fn fetch_catalog(
        &self,
        url: &Url,
    ) -> impl Future<Output = Result<Vec<CatalogEntry>, FetchError>> + Send {
        async move {
            let bytes = self.fetch(url, &|_: Progress| {}).await?;
            serde_json::from_slice(&bytes).map_err(|source| FetchError::InvalidCatalog {
                url: url.clone(),
                source,
            })
        }
    }
}

/// Largest download [`HttpAssetClient`] accepts unless told otherwise.
pub const DEFAULT_MAX_BYTES: u64 = 512 * 1024 * 1024;

/// Only this much is reserved up front, whatever the server announces.
const MAX_PREALLOCATION: u64 = 1024 * 1024;

#[derive(Clone, Debug)]
pub struct HttpAssetClient {
    client: reqwest::Client,
    max_bytes: u64,
}

impl HttpAssetClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }
}

impl Default for HttpAssetClient {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetFetcher for HttpAssetClient {
    async fn fetch(
        &self,
        url: &Url,
        progress: &(dyn Fn(Progress) + Send + Sync),
    ) -> Result<Vec<u8>, FetchError> {
        let transport = |source: reqwest::Error| FetchError::Transport {
            url: url.clone(),
            source,
        };

        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.clone(),
                status: status.as_u16(),
            });
        }

        let too_large = || FetchError::TooLarge {
            url: url.clone(),
            limit: self.max_bytes,
        };
        let total = response.content_length();
        if total.is_some_and(|total| total > self.max_bytes) {
            return Err(too_large());
        }

        let reserved = total.map_or(0, |total| total.min(MAX_PREALLOCATION));
        let mut bytes = Vec::with_capacity(reserved as usize);
        progress(Progress { loaded: 0, total });
        while let Some(chunk) = response.chunk().await.map_err(transport)? {
            if (bytes.len() + chunk.len()) as u64 > self.max_bytes {
                return Err(too_large());
            }
            bytes.extend_from_slice(&chunk);
            progress(Progress {
                loaded: bytes.len() as u64,
                total,
            });
        }
        log::debug!("Fetched {} ({} bytes)", url, bytes.len());
        Ok(bytes)
    }

    async fn exists(&self, url: &Url) -> Result<bool, FetchError> {
        let response = self
            .client
            .head(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.clone(),
                source,
            })?;
        Ok(response.status().is_success())
    }
}
