use std::{sync::Arc, time::Duration};

use asset_client::HttpAssetClient;
use env_logger::Env;
use model_viewer::{config_loader::ConfigFileLoader, viewer::Viewer};

fn parse_arg(name: &str) -> Option<String> {
    // Accept: --name=value or --name value
    let prefix = format!("--{}=", name);
    let flag = format!("--{}", name);
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            return Some(value.to_string());
        }
        if arg == flag {
            return args.next();
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config_path = parse_arg("config").unwrap_or_else(|| "config.json".into());
    let mut config_loader = ConfigFileLoader::new(config_path);
    let config = config_loader.get_or_load_config()?.clone();

    let mut viewer = Viewer::from_config(Arc::new(HttpAssetClient::new()), &config)?;
    if let Err(e) = viewer.refresh_catalog(&config.catalog_path).await {
        log::error!("No models to show: {}", e);
        return Ok(());
    }

    let started = match parse_arg("model").or(config.initial_model.clone()) {
        Some(name) => viewer.select_by_name(&name),
        None if !viewer.catalog().is_empty() => viewer.select(0),
        None => {
            log::warn!("The catalog is empty");
            return Ok(());
        }
    };
    if let Err(e) = started {
        log::error!("Could not start loading: {}", e.describe());
        return Ok(());
    }

    let ctx = egui::Context::default();
    let mut frames = tokio::time::interval(Duration::from_millis(16));
    while viewer.is_loading() {
        frames.tick().await;
        let _ = viewer.frame(&ctx, egui::RawInput::default());
        if let Some(ratio) = viewer.progress().and_then(|progress| progress.ratio()) {
            log::trace!("Loading {:.0}%", ratio * 100.0);
        }
    }

    match (viewer.scene().asset(), viewer.last_error()) {
        (_, Some(error)) => log::error!("Loading failed: {}", error),
        (Some(asset), None) => {
            let bounds = asset.local_bounds();
            log::info!(
                "Showing {} with {} meshes, scale {}, local bounds {:?}",
                asset.name.as_deref().unwrap_or("model"),
                asset.mesh_count(),
                asset.transform.scale.x,
                bounds.map(|b| b.size())
            );
        }
        (None, None) => log::warn!("Nothing was loaded"),
    }
    Ok(())
}
