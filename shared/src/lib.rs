//! Shared types and scoring core for the Cupping Journal
//!
//! This crate contains the SCA evaluation model, the score aggregation rules
//! and the report projections. It is shared between the backend and the
//! browser form (via WASM) and performs no I/O.

pub mod error;
pub mod models;
pub mod report;
pub mod scoring;
pub mod types;
pub mod validation;

pub use error::*;
pub use models::*;
pub use report::*;
pub use scoring::*;
pub use types::*;
pub use validation::*;
