use std::path::PathBuf;

use asset_server::{AssetServer, AssetsConfig};
use env_logger::Env;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config_path: PathBuf = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "asset_server.json".into())
        .into();
    let config = AssetsConfig::load(&config_path)?;
    let models_dir = config.models_dir.clone();

    let server = AssetServer::bind(config)?;
    log::info!(
        "Serving {} models from {:?}",
        server.catalog().entries().len(),
        models_dir
    );
    match server.local_addr() {
        Some(addr) => log::info!("Server is running at http://{}", addr),
        None => log::info!("Server is running"),
    }

    server.serve()
}
