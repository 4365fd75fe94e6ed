//! Universal Scene Description
//!
//! The composed stage and its objects. Reading composes opinions across the
//! layer stack and the layers reached through references and payloads;
//! writing goes to the stage's edit target.

mod attribute;
mod model_api;
mod object;
mod prim;
mod prim_range;
mod property;
mod references;
mod relationship;
mod schema_base;
pub mod schema_registry;
mod stage;

pub use attribute::*;
pub use model_api::*;
pub use object::*;
pub use prim::*;
pub use prim_range::*;
pub use property::*;
pub use references::*;
pub use relationship::*;
pub use schema_base::SchemaBase;
pub(crate) use schema_base::declare_typed_schema;
pub use stage::*;
