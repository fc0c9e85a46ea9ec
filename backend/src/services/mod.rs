//! Business logic services for the Cupping Journal

pub mod evaluation;
pub mod localization;

pub use evaluation::{EvaluationFilter, EvaluationService};
pub use localization::LabelTable;
