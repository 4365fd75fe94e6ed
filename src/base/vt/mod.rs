//! Value Types

mod value;

pub use value::*;
