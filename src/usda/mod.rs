//! Text encoding of layers.

mod writer;

pub(crate) use writer::write_layer;
