//! Physics schemas: joints constraining the motion of two rigid bodies, and
//! the physical properties of materials.

mod joint;
mod material_api;
mod tokens;

pub use joint::*;
pub use material_api::*;
pub use tokens::*;
