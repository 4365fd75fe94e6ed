//! Graphics foundations schemas: transforms, bounds, purposes and stage metrics.

mod bbox_cache;
mod gprim;
mod imageable;
mod metrics;
mod model_api;
mod tokens;
mod xform_cache;
mod xform_op;
mod xformable;

pub use bbox_cache::*;
pub use gprim::*;
pub use imageable::*;
pub use metrics::*;
pub use model_api::*;
pub use tokens::*;
pub use xform_cache::*;
pub use xform_op::*;
pub use xformable::*;
