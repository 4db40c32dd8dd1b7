//! Shared types for the Hephaestus model pipeline.

pub mod formats;
pub mod model_format;

pub use model_format::{ModelFormat, HEP_MODEL_FORMAT};
