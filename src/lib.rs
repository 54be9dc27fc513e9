pub mod config_loader;
pub mod loader;
pub mod panel;
pub mod scene;
pub mod tint;
pub mod viewer;

#[cfg(test)]
pub(crate) mod test_support;
