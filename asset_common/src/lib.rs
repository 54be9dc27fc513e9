pub mod catalog;
pub mod color;
pub mod gpu;
pub mod scene;
pub mod transform;

pub use catalog::CatalogEntry;
pub use color::Color;
