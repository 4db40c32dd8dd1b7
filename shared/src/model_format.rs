//! Model format definition for Hephaestus documents.
//!
//! This module defines the `ModelFormat` struct which serves as the single source of truth
//! for format-related constants (file extension, format identifier, version).
//!
//! # Example
//!
//! ```
//! use hephaestus_shared::HEP_MODEL_FORMAT;
//!
//! assert_eq!(HEP_MODEL_FORMAT.extension, "hepmodel");
//! assert_eq!(HEP_MODEL_FORMAT.id, "hephaestus_model");
//! ```

use crate::formats::FORMAT_VERSION;

/// Output format definition.
#[derive(Debug, Clone, Copy)]
pub struct ModelFormat {
    /// Document file extension without dot (e.g., "hepmodel")
    pub extension: &'static str,

    /// Codec identifier registered with the authoring tool
    pub id: &'static str,

    /// Human readable name
    pub name: &'static str,

    /// Document format version
    pub version: u32,

    /// Extension of the project files the exporter reads (e.g., "bbmodel")
    pub source_ext: &'static str,
}

impl ModelFormat {
    pub const fn new(
        extension: &'static str,
        id: &'static str,
        name: &'static str,
        version: u32,
        source_ext: &'static str,
    ) -> Self {
        Self {
            extension,
            id,
            name,
            version,
            source_ext,
        }
    }
}

/// Hephaestus model format.
pub const HEP_MODEL_FORMAT: ModelFormat = ModelFormat::new(
    "hepmodel",
    "hephaestus_model",
    "Hephaestus Model",
    FORMAT_VERSION,
    "bbmodel",
);
