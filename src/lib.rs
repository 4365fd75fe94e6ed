//! Asset authoring on top of an [OpenUSD](https://github.com/PixarAnimationStudios/OpenUSD)
//! scene description model in pure Rust.
//!
//! The scene description modules (`sdf`, `pcp`, `usd`, `usd_geom`, `usd_shade`,
//! `usd_physics`, `kind`) provide layers, composition and schemas. The
//! [`authoring`] module builds asset structures, material networks, kind
//! hierarchies and physics joints on top of them.

pub mod base;
pub mod kind;
pub mod pcp;
pub mod sdf;
pub mod usd;

pub mod usd_geom;
pub mod usd_physics;
pub mod usd_shade;

pub mod authoring;

mod error;
mod usda;

pub use error::{Error, Result};

#[doc(hidden)]
pub use base::*;

pub(crate) use tf::{declare_public_tokens, tf_coding_error, tf_runtime_error, tf_status, tf_warn};
