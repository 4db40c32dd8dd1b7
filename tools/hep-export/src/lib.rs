//! hep-export library
//!
//! Compiles authoring-tool scene snapshots into .hepmodel documents. The
//! compiler core (`scene`, `texture`, `geometry`, `skeleton`, `animation`,
//! `model`) is pure; `bbmodel`, `formats` and `manifest` handle files.

pub mod animation;
pub mod bbmodel;
pub mod error;
pub mod formats;
pub mod geometry;
pub mod manifest;
pub mod model;
pub mod scene;
pub mod skeleton;
pub mod texture;

// Re-export the document format from hephaestus-shared
pub use hephaestus_shared::{ModelFormat, HEP_MODEL_FORMAT};

// Re-export the compiler entry points
pub use error::{
    CompatibilityWarning, CompileError, CompileResult, ReferenceError, StructuralError,
    ValidationError,
};
pub use model::{compile, compile_at, Compilation};
pub use scene::{ProjectSnapshot, SceneGraph, SceneNode};

// Re-export file-level helpers
pub use bbmodel::{load_project, parse_project};
pub use formats::{write_model, write_model_file, OutputStyle};
