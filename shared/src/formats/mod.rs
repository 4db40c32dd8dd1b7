//! Hephaestus document formats
//!
//! Output side of the exporter; the runtime depends on these types
//! field-for-field.

pub mod hep_model;

pub use hep_model::*;
