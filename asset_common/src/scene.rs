mod bounds;
mod material;
mod mesh;
mod node;

pub use bounds::*;
pub use material::*;
pub use mesh::*;
pub use node::*;
