//! Tools Foundations

mod diagnostic;
mod token;

pub use diagnostic::*;
pub use token::*;

pub(crate) use diagnostic::{tf_coding_error, tf_runtime_error, tf_status, tf_warn};
pub(crate) use token::declare_public_tokens;
