//! Domain models for the Cupping Journal

mod cupping;
mod evaluation;

pub use cupping::*;
pub use evaluation::*;
