pub mod asset_server;
pub mod assets_config;
pub mod catalog;
pub mod read_startup;
pub mod source_files;

pub use asset_server::{AssetServer, ServerHandle};
pub use assets_config::AssetsConfig;
pub use catalog::Catalog;
