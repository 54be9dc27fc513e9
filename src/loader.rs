mod error;
mod format;
mod gltf_loader;
mod mtl_loader;
mod normalize;
mod obj_loader;
mod pipeline;
mod text;

pub use error::*;
pub use format::*;
pub use gltf_loader::*;
pub use mtl_loader::*;
pub use normalize::*;
pub use obj_loader::*;
pub use pipeline::*;
