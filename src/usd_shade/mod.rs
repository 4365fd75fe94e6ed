//! Shading schemas: shaders, node graphs, materials and their bindings.

mod connectable;
mod material;
mod material_binding_api;
mod shader;
mod tokens;

pub use connectable::*;
pub use material::*;
pub use material_binding_api::*;
pub use shader::*;
pub use tokens::*;
