pub mod gf;
pub mod tf;
pub mod vt;
