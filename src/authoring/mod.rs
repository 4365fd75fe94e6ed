//! Asset authoring
//!
//! Helpers that author well-formed assets at the edit target of a stage:
//! the layer structure of an asset, transforms, kind hierarchies, preview
//! materials, physics materials and joints, geometric primitives and valid
//! names. Invalid arguments are reported both as a diagnostic and as an
//! [`Error`](crate::Error), and nothing is authored.

mod asset_structure;
mod gprim_algo;
mod hierarchy;
mod layer_algo;
mod material_algo;
mod name_algo;
mod path_resolver;
mod physics_joint_algo;
mod physics_material_algo;
mod stage_algo;
mod xform_algo;

pub use asset_structure::*;
pub use gprim_algo::*;
pub use hierarchy::*;
pub use layer_algo::*;
pub use material_algo::*;
pub use name_algo::*;
pub use path_resolver::*;
pub use physics_joint_algo::*;
pub use physics_material_algo::*;
pub use stage_algo::*;
pub use xform_algo::*;
