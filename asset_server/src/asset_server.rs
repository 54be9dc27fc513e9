use std::{
    fs::File,
    io,
    net::SocketAddr,
    path::PathBuf,
    sync::Arc,
    thread::{self, JoinHandle},
};

use anyhow::Context;
use tiny_http::{Header, Method, Request, Response, ResponseBox};

use crate::{
    assets_config::AssetsConfig,
    catalog::Catalog,
    source_files::{RouteError, SourceFileRef},
};

/// Routes that answer with the catalog. `/api/models` is kept for older viewers.
pub const CATALOG_ROUTES: [&str; 2] = ["/catalog", "/api/models"];

/// What a request resolved to, before any file is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Routed {
    Catalog,
    File {
        path: PathBuf,
        content_type: &'static str,
    },
    Preflight,
}

pub struct AssetServer {
    config: AssetsConfig,
    catalog: Catalog,
    server: tiny_http::Server,
}

impl AssetServer {
    pub fn bind(config: AssetsConfig) -> anyhow::Result<Self> {
        let catalog = Catalog::from_config(&config).context("Failed to build the catalog")?;
        let address = config.address();
        let server = tiny_http::Server::http(&address)
            .map_err(|e| anyhow::format_err!("Failed to listen on {}: {}", address, e))?;
        Ok(Self {
            config,
            catalog,
            server,
        })
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn route(&self, method: &Method, url: &str) -> Result<Routed, RouteError> {
        if *method == Method::Options {
            return Ok(Routed::Preflight);
        }
        if !matches!(method, Method::Get | Method::Head) {
            return Err(RouteError::MethodNotAllowed);
        }

        let path = url.split(['?', '#']).next().unwrap_or_default();
        if CATALOG_ROUTES.contains(&path.trim_end_matches('/')) {
            return Ok(Routed::Catalog);
        }

        let rest = path
            .strip_prefix(self.config.prefix())
            .filter(|rest| rest.starts_with('/'))
            .ok_or(RouteError::NotFound)?;
        let file = SourceFileRef::from_request_path(rest)?;
        Ok(Routed::File {
            path: file.to_path(&self.config.models_dir),
            content_type: file.content_type(),
        })
    }

    fn respond(&self, request: Request) {
        let method = request.method().clone();
        let url = request.url().to_string();

        let response = match self.route(&method, &url).and_then(|routed| self.build(routed)) {
            Ok(response) => response,
            Err(e) => {
                log::debug!("{} {} -> {}", method, url, e.status_code());
                Response::from_string(e.to_string())
                    .with_status_code(e.status_code())
                    .boxed()
            }
        };
        let response = with_headers(
            response,
            &[
                ("Access-Control-Allow-Origin", "*"),
                ("Access-Control-Allow-Methods", "GET, HEAD, OPTIONS"),
                ("Access-Control-Allow-Headers", "*"),
            ],
        );

        if let Err(e) = request.respond(response) {
            log::warn!("Failed to answer {} {}: {}", method, url, e);
        }
    }

    fn build(&self, routed: Routed) -> Result<ResponseBox, RouteError> {
        match routed {
            Routed::Catalog => Ok(with_headers(
                Response::from_data(self.catalog.as_json().to_vec()).boxed(),
                &[("Content-Type", "application/json")],
            )),
            Routed::Preflight => Ok(Response::empty(204).boxed()),
            Routed::File { path, content_type } => {
                if !path.is_file() {
                    return Err(RouteError::NotFound);
                }
                let file = File::open(&path).map_err(|e| match e.kind() {
                    io::ErrorKind::NotFound => RouteError::NotFound,
                    _ => {
                        log::warn!("Failed to open {:?}: {}", path, e);
                        RouteError::Forbidden
                    }
                })?;
                Ok(with_headers(
                    Response::from_file(file).boxed(),
                    &[("Content-Type", content_type)],
                ))
            }
        }
    }

    /// Serves requests on the configured number of worker threads until the listener fails.
    pub fn serve(self) -> anyhow::Result<()> {
        self.spawn().join();
        Ok(())
    }

    /// Starts the worker threads and returns immediately.
    pub fn spawn(self) -> ServerHandle {
        let worker_count = self.config.workers.max(1);
        let server = Arc::new(self);
        let workers = (0..worker_count)
            .map(|_| {
                let server = server.clone();
                thread::spawn(move || loop {
                    match server.server.recv() {
                        Ok(request) => server.respond(request),
                        Err(e) => {
                            log::debug!("Worker stopping: {}", e);
                            break;
                        }
                    }
                })
            })
            .collect();
        ServerHandle { server, workers }
    }
}

/// Running server. Dropping the handle leaves the workers running.
pub struct ServerHandle {
    server: Arc<AssetServer>,
    workers: Vec<JoinHandle<()>>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.local_addr()
    }

    /// Waits for every worker to exit.
    pub fn join(self) {
        for worker in self.workers {
            if worker.join().is_err() {
                log::error!("A server worker panicked");
            }
        }
    }

    /// Wakes every worker so it can exit, then waits for them.
    pub fn shutdown(self) {
        for _ in &self.workers {
            self.server.server.unblock();
        }
        self.join();
    }
}

fn with_headers(mut response: ResponseBox, headers: &[(&str, &str)]) -> ResponseBox {
    for (name, value) in headers {
        match Header::from_bytes(*name, *value) {
            Ok(header) => response.add_header(header),
            Err(()) => log::warn!("Invalid header {}: {}", name, value),
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use std::fs;

    use asset_common::CatalogEntry;

    use super::*;

    fn test_server(models_dir: PathBuf) -> AssetServer {
        AssetServer::bind(AssetsConfig {
            port: 0,
            models_dir,
            catalog: vec![CatalogEntry::new("Box", "/models/box/scene.glb")],
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn routes_catalog_and_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("box")).unwrap();
        fs::write(dir.path().join("box/scene.glb"), b"glTF").unwrap();
        let server = test_server(dir.path().to_path_buf());

        assert_eq!(server.route(&Method::Get, "/catalog"), Ok(Routed::Catalog));
        assert_eq!(
            server.route(&Method::Get, "/api/models/"),
            Ok(Routed::Catalog)
        );
        assert_eq!(
            server.route(&Method::Head, "/models/box/scene.glb"),
            Ok(Routed::File {
                path: dir.path().join("box").join("scene.glb"),
                content_type: "model/gltf-binary",
            })
        );
        assert_eq!(server.route(&Method::Options, "/anything"), Ok(Routed::Preflight));
    }

    #[test]
    fn rejects_unknown_routes_and_methods() {
        let dir = tempfile::tempdir().unwrap();
        let server = test_server(dir.path().to_path_buf());

        assert_eq!(
            server.route(&Method::Post, "/catalog"),
            Err(RouteError::MethodNotAllowed)
        );
        assert_eq!(
            server.route(&Method::Get, "/modelsbox/scene.glb"),
            Err(RouteError::NotFound)
        );
        assert_eq!(
            server.route(&Method::Get, "/models/../Cargo.toml"),
            Err(RouteError::Forbidden)
        );
        assert_eq!(
            server.build(Routed::File {
                path: dir.path().join("missing.obj"),
                content_type: "text/plain; charset=utf-8",
            })
            .err(),
            Some(RouteError::NotFound)
        );
    }

    #[test]
    fn binds_an_ephemeral_port() {
        let dir = tempfile::tempdir().unwrap();
        let handle = test_server(dir.path().to_path_buf()).spawn();
        let addr = handle.local_addr().unwrap();
        assert_ne!(addr.port(), 0);
        handle.shutdown();
    }
}
