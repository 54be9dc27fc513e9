mod common;

use std::{sync::Arc, time::Duration};

use asset_client::{resolve_url, AssetFetcher, HttpAssetClient, Progress, Url};
use asset_common::{scene::MaterialSource, CatalogEntry, Color};
use asset_server::{AssetServer, AssetsConfig, ServerHandle};
use model_viewer::{loader::Normalization, viewer::Viewer};

fn start_server(models_dir: &std::path::Path, catalog: Vec<CatalogEntry>) -> (ServerHandle, Url) {
    let config = AssetsConfig {
        port: 0,
        models_dir: models_dir.to_path_buf(),
        workers: 2,
        discover: true,
        catalog,
        ..Default::default()
    };
    let handle = AssetServer::bind(config).unwrap().spawn();
    let base = Url::parse(&format!("http://{}", handle.local_addr().unwrap())).unwrap();
    (handle, base)
}

async fn settle(viewer: &mut Viewer<HttpAssetClient>) {
    for _ in 0..500 {
        viewer.poll();
        if !viewer.is_loading() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("load did not finish");
}

fn sources(viewer: &Viewer<HttpAssetClient>) -> Vec<MaterialSource> {
    let mut sources = Vec::new();
    if let Some(asset) = viewer.scene().asset() {
        asset.for_each_mesh(&mut |mesh| sources.extend(mesh.materials.iter().map(|m| m.source)));
    }
    sources
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn every_catalog_entry_is_served() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    common::write_models(dir.path());
    let (handle, base) = start_server(dir.path(), vec![]);
    let client = HttpAssetClient::new();

    for route in ["/catalog", "/api/models"] {
        let catalog = client
            .fetch_catalog(&resolve_url(&base, route).unwrap())
            .await
            .unwrap();
        assert_eq!(
            catalog,
            vec![
                CatalogEntry::new("box/scene", "/models/box/scene.glb"),
                CatalogEntry::new("plain/plain", "/models/plain/plain.obj"),
                CatalogEntry::new("robot/robot", "/models/robot/robot.obj"),
            ]
        );
        for entry in &catalog {
            let url = resolve_url(&base, &entry.url).unwrap();
            let bytes = client.fetch(&url, &|_: Progress| {}).await.unwrap();
            assert!(!bytes.is_empty(), "{} is empty", url);
        }
    }

    let missing = resolve_url(&base, "/models/plain/plain.mtl").unwrap();
    assert!(!client.exists(&missing).await.unwrap());
    let present = resolve_url(&base, "/models/robot/robot.mtl").unwrap();
    assert!(client.exists(&present).await.unwrap());

    handle.shutdown();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn viewer_loads_models_from_the_server() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    common::write_models(dir.path());
    let (handle, base) = start_server(
        dir.path(),
        vec![
            CatalogEntry::new("Box", "/models/box/scene.glb"),
            CatalogEntry::new("Plain", "/models/plain/plain.obj"),
            CatalogEntry::new("Robot", "/models/robot/robot.obj"),
            CatalogEntry::new("Missing", "/models/missing.glb"),
        ],
    );

    let mut viewer = Viewer::new(
        Arc::new(HttpAssetClient::new()),
        base,
        Normalization::default(),
    );
    assert_eq!(viewer.refresh_catalog("/catalog").await.unwrap(), 4);
    let tint = Color::new(0.0, 0.5, 1.0);
    viewer.set_tint(tint);

    viewer.select_by_name("Box").unwrap();
    settle(&mut viewer).await;
    assert!(viewer.last_error().is_none());
    let asset = viewer.scene().asset().unwrap();
    assert_eq!(asset.mesh_count(), 1);
    assert_eq!(asset.transform.scale.x, 2.0);
    asset.for_each_mesh(&mut |mesh| {
        assert!(mesh.cast_shadow && mesh.receive_shadow);
        assert!(mesh.materials.iter().all(|m| m.base_color == tint));
    });

    viewer.select_by_name("Plain").unwrap();
    settle(&mut viewer).await;
    assert!(viewer.last_error().is_none());
    assert_eq!(sources(&viewer), vec![MaterialSource::Default]);

    viewer.select_by_name("Robot").unwrap();
    settle(&mut viewer).await;
    assert!(viewer.last_error().is_none());
    assert_eq!(sources(&viewer), vec![MaterialSource::Library]);
    assert_eq!(viewer.scene().top_level_nodes().count(), 2);

    viewer.select_by_name("Missing").unwrap();
    settle(&mut viewer).await;
    assert!(viewer.last_error().is_some());
    assert_eq!(sources(&viewer), vec![MaterialSource::Library]);

    handle.shutdown();
}
