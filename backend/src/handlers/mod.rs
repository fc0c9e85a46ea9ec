//! HTTP handlers for the Cupping Journal API

pub mod evaluation;
pub mod health;
pub mod report;

pub use evaluation::*;
pub use health::*;
pub use report::*;
