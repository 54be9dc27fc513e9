use std::{collections::HashMap, sync::Arc};

use asset_client::{resolve_url, AssetFetcher, Progress, Url};
use asset_common::{scene::SceneNode, Color};

use super::{
    external_buffer_uris, file_name, load_mtl_from_bytes, sibling_url, AssetFormat, GltfParser,
    LoadError, MaterialLibrary, Normalization, ObjParser, SceneParser,
};

/// Fetches, parses and normalizes one model at a time.
pub struct AssetPipeline<F> {
    fetcher: Arc<F>,
    normalization: Normalization,
}

impl<F> Clone for AssetPipeline<F> {
    fn clone(&self) -> Self {
        Self {
            fetcher: self.fetcher.clone(),
            normalization: self.normalization,
        }
    }
}

impl<F: AssetFetcher> AssetPipeline<F> {
    pub fn new(fetcher: Arc<F>, normalization: Normalization) -> Self {
        Self {
            fetcher,
            normalization,
        }
    }

    pub fn fetcher(&self) -> &Arc<F> {
        &self.fetcher
    }

    /// Loads the model at `url` and returns it ready to be attached to the scene.
    /// `progress` only follows the main model file.
    pub async fn load(
        &self,
        url: &Url,
        tint: Color,
        progress: &(dyn Fn(Progress) + Send + Sync),
    ) -> Result<SceneNode, LoadError> {
        let format = AssetFormat::from_url(url)?;
        log::info!("Loading {} as {:?}", url, format);

        let mut node = match format {
            AssetFormat::SceneContainer => self.load_container(url, progress).await?,
            AssetFormat::PlainGeometry => self.load_plain_geometry(url, progress).await?,
        };

        if node.name.is_none() {
            node.name = file_name(url).map(|name| {
                urlencoding::decode(name)
                    .map(|decoded| decoded.into_owned())
                    .unwrap_or_else(|_| name.to_string())
            });
        }
        self.normalization.apply(&mut node, tint);
        log::info!(
            "Loaded {} ({} meshes, scale {})",
            url,
            node.mesh_count(),
            node.transform.scale.x
        );
        Ok(node)
    }

    async fn load_container(
        &self,
        url: &Url,
        progress: &(dyn Fn(Progress) + Send + Sync),
    ) -> Result<SceneNode, LoadError> {
        let bytes = self.fetcher.fetch(url, progress).await?;
        let uris = external_buffer_uris(&bytes).map_err(|e| LoadError::parse(url, e))?;

        let mut external_buffers = HashMap::new();
        for uri in uris {
            let buffer_url = resolve_url(url, &uri)?;
            let data = self.fetcher.fetch(&buffer_url, &|_: Progress| {}).await?;
            external_buffers.insert(uri, data);
        }

        GltfParser::new(external_buffers)
            .parse(&bytes)
            .map_err(|e| LoadError::parse(url, e))
    }

    async fn load_plain_geometry(
        &self,
        url: &Url,
        progress: &(dyn Fn(Progress) + Send + Sync),
    ) -> Result<SceneNode, LoadError> {
        let materials = self.load_sibling_materials(url).await;
        let bytes = self.fetcher.fetch(url, progress).await?;
        ObjParser::new(materials)
            .parse(&bytes)
            .map_err(|e| LoadError::parse(url, e))
    }

    /// The `.mtl` next to an `.obj`. Every way this can go wrong ends in `None`,
    /// which means the default material.
    async fn load_sibling_materials(&self, url: &Url) -> Option<MaterialLibrary> {
        let mtl_url = sibling_url(url, "mtl")?;
        match self.fetcher.exists(&mtl_url).await {
            Ok(true) => {}
            Ok(false) => {
                log::info!("No material library at {}, using the default material", mtl_url);
                return None;
            }
            Err(e) => {
                log::warn!("Could not check for {}: {}", mtl_url, e);
                return None;
            }
        }

        let bytes = match self.fetcher.fetch(&mtl_url, &|_: Progress| {}).await {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("Could not fetch {}: {}", mtl_url, e);
                return None;
            }
        };
        match load_mtl_from_bytes(&bytes) {
            Ok(library) if library.is_empty() => {
                log::warn!("{} defines no materials, using the default material", mtl_url);
                None
            }
            Ok(library) => {
                log::debug!("Read {} materials from {}", library.len(), mtl_url);
                Some(library)
            }
            Err(e) => {
                log::warn!("Invalid material library {}: {:#}", mtl_url, e);
                None
            }
        }
    }
}
