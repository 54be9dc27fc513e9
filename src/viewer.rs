use std::sync::Arc;

use asset_client::{resolve_url, AssetFetcher, FetchError, Progress, Url};
use asset_common::{scene::SceneNode, CatalogEntry, Color};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::{
    config_loader::Config,
    loader::{AssetFormat, AssetPipeline, LoadError, Normalization},
    panel::{show_panel, PanelAction, PanelView},
    scene::Scene,
    tint::apply_tint,
};

/// Identifies one call to [`Viewer::load`]. Later loads have larger ids.
pub type RequestId = u64;

/// Sent from a load task back to the viewer.
#[derive(Debug)]
pub enum LoadEvent {
    Progress {
        request: RequestId,
        progress: Progress,
    },
    Finished {
        request: RequestId,
        result: Result<SceneNode, LoadError>,
    },
}

/// Owns the scene and everything the panel edits. Loads run as tokio tasks and
/// are picked up by [`Viewer::poll`], so the frame loop never waits on the network.
pub struct Viewer<F: AssetFetcher> {
    pipeline: AssetPipeline<F>,
    server_url: Url,
    catalog: Vec<CatalogEntry>,
    scene: Scene,
    tint: Color,
    selected: Option<usize>,

    latest_request: RequestId,
    loading: bool,
    progress: Option<Progress>,
    last_error: Option<String>,

    events: UnboundedSender<LoadEvent>,
    receiver: UnboundedReceiver<LoadEvent>,
}

impl<F: AssetFetcher> Viewer<F> {
    pub fn new(fetcher: Arc<F>, server_url: Url, normalization: Normalization) -> Self {
        let (events, receiver) = mpsc::unbounded_channel();
        Self {
            pipeline: AssetPipeline::new(fetcher, normalization),
            server_url,
            catalog: Vec::new(),
            scene: Scene::with_stage(),
            tint: Color::WHITE,
            selected: None,
            latest_request: 0,
            loading: false,
            progress: None,
            last_error: None,
            events,
            receiver,
        }
    }

    pub fn from_config(fetcher: Arc<F>, config: &Config) -> Result<Self, FetchError> {
        let server_url = Url::parse(&config.server_url).map_err(|e| FetchError::InvalidUrl {
            reference: config.server_url.clone(),
            reason: e.to_string(),
        })?;
        let mut viewer = Self::new(fetcher, server_url, config.normalization);
        viewer.tint = config.tint;
        Ok(viewer)
    }

    /// Downloads the catalog. On failure the catalog is left empty so there is nothing to pick.
    pub async fn refresh_catalog(&mut self, path: &str) -> Result<usize, FetchError> {
        self.catalog.clear();
        self.selected = None;

        let url = resolve_url(&self.server_url, path)?;
        match self.pipeline.fetcher().fetch_catalog(&url).await {
            Ok(catalog) => {
                log::info!("Catalog at {} lists {} models", url, catalog.len());
                self.catalog = catalog;
                Ok(self.catalog.len())
            }
            Err(e) => {
                log::error!("Failed to fetch the catalog: {}", e);
                Err(e)
            }
        }
    }

    pub fn set_catalog(&mut self, catalog: Vec<CatalogEntry>) {
        self.catalog = catalog;
        self.selected = None;
    }

    pub fn catalog(&self) -> &[CatalogEntry] {
        &self.catalog
    }

    /// Loads catalog entry `index`. Any failure is also kept in [`Viewer::last_error`].
    pub fn select(&mut self, index: usize) -> Result<RequestId, LoadError> {
        let url = match self.catalog.get(index) {
            Some(entry) => {
                self.selected = Some(index);
                resolve_url(&self.server_url, &entry.url).map_err(LoadError::from)
            }
            None => Err(LoadError::UnknownModel(format!("#{}", index))),
        };
        match url {
            Ok(url) => self.load(url),
            Err(e) => {
                self.supersede();
                self.report_error(&e);
                Err(e)
            }
        }
    }

    pub fn select_by_name(&mut self, name: &str) -> Result<RequestId, LoadError> {
        match self.catalog.iter().position(|entry| entry.name == name) {
            Some(index) => self.select(index),
            None => {
                let e = LoadError::UnknownModel(name.to_string());
                self.report_error(&e);
                Err(e)
            }
        }
    }

    /// Starts loading `url` in the background. Must be called inside a tokio runtime.
    /// Unsupported files are reported right away and nothing is spawned.
    /// Either way, results of earlier loads are no longer attached.
    pub fn load(&mut self, url: Url) -> Result<RequestId, LoadError> {
        let request = self.supersede();
        if let Err(e) = AssetFormat::from_url(&url) {
            self.report_error(&e);
            return Err(e);
        }
        self.loading = true;

        let pipeline = self.pipeline.clone();
        let events = self.events.clone();
        let tint = self.tint;
        tokio::spawn(async move {
            let progress_events = events.clone();
            let report = move |progress: Progress| {
                let _ = progress_events.send(LoadEvent::Progress { request, progress });
            };
            let result = pipeline.load(&url, tint, &report).await;
            // The viewer may be gone already.
            let _ = events.send(LoadEvent::Finished { request, result });
        });
        log::debug!("Started load request {}", request);
        Ok(request)
    }

    /// Starts a new request id, so whatever is still in flight gets dropped when it arrives.
    fn supersede(&mut self) -> RequestId {
        self.latest_request += 1;
        self.loading = false;
        self.progress = None;
        self.last_error = None;
        self.latest_request
    }

    /// Applies everything the load tasks reported since the last call. Call once per frame.
    pub fn poll(&mut self) {
        while let Ok(event) = self.receiver.try_recv() {
            match event {
                LoadEvent::Progress { request, progress } if request == self.latest_request => {
                    let advanced = self
                        .progress
                        .map_or(true, |current| progress.loaded >= current.loaded);
                    if self.loading && advanced {
                        self.progress = Some(progress);
                    }
                }
                LoadEvent::Finished { request, result } if request == self.latest_request => {
                    self.loading = false;
                    self.progress = None;
                    match result {
                        Ok(node) => self.attach(node),
                        Err(e) => self.report_error(&e),
                    }
                }
                LoadEvent::Progress { .. } => {}
                LoadEvent::Finished { request, .. } => {
                    log::debug!(
                        "Dropping result of request {}, request {} superseded it",
                        request,
                        self.latest_request
                    );
                }
            }
        }
    }

    fn attach(&mut self, mut node: SceneNode) {
        // The tint may have changed while the model was loading.
        apply_tint(Some(&mut node), self.tint);
        self.last_error = None;
        if let Some(previous) = self.scene.replace_asset(node) {
            log::debug!("Removed {:?}", previous.name);
        }
    }

    fn report_error(&mut self, error: &LoadError) {
        let message = error.describe();
        log::error!("{}", message);
        self.last_error = Some(message);
    }

    pub fn set_tint(&mut self, color: Color) {
        self.tint = color;
        apply_tint(self.scene.asset_mut(), color);
    }

    /// Runs one GUI frame: picks up load results, draws the panel and applies what the user did.
    pub fn frame(&mut self, ctx: &egui::Context, input: egui::RawInput) -> egui::FullOutput {
        self.poll();

        let mut actions = Vec::new();
        let output = ctx.run(input, |ctx| {
            actions = show_panel(ctx, self.panel_view());
        });

        for action in actions {
            match action {
                PanelAction::Select(index) => {
                    if let Err(e) = self.select(index) {
                        log::debug!("Selection {} did not start a load: {}", index, e);
                    }
                }
                PanelAction::Tint(color) => self.set_tint(color),
            }
        }
        output
    }

    fn panel_view(&self) -> PanelView<'_> {
        PanelView {
            catalog: &self.catalog,
            selected: self.selected,
            tint: self.tint,
            progress: self
                .loading
                .then(|| self.progress.and_then(|progress| progress.ratio())),
            error: self.last_error.as_deref(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn tint(&self) -> Color {
        self.tint
    }

    pub fn progress(&self) -> Option<Progress> {
        self.progress
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }
}
