//! Build manifest (models.toml)
//!
//! Batch export of several projects:
//!
//! ```toml
//! [output]
//! dir = "build"
//! compact = false
//! deny_warnings = false
//!
//! [[models]]
//! path = "models/golem.bbmodel"
//! name = "golem"      # optional, overrides the document name
//! ```
//!
//! Relative paths are resolved against the manifest's directory.

use anyhow::{bail, Context, Result};
use hashbrown::HashSet;
use rayon::prelude::*;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use hephaestus_shared::HEP_MODEL_FORMAT;

use crate::bbmodel;
use crate::formats::{write_model_file, OutputStyle};
use crate::model;

#[derive(Debug, Deserialize)]
pub struct BuildManifest {
    #[serde(default)]
    pub output: OutputSection,
    #[serde(default)]
    pub models: Vec<ModelEntry>,

    /// Directory the manifest was loaded from
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct OutputSection {
    /// Output directory for .hepmodel files
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// Write documents without indentation
    #[serde(default)]
    pub compact: bool,

    /// Treat compatibility warnings as errors
    #[serde(default)]
    pub deny_warnings: bool,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            compact: false,
            deny_warnings: false,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

#[derive(Debug, Deserialize)]
pub struct ModelEntry {
    /// Path to the .bbmodel project
    pub path: PathBuf,

    /// Document name override; defaults to the project's own name
    #[serde(default)]
    pub name: Option<String>,
}

impl ModelEntry {
    /// Output file stem: explicit name, or the project file stem
    pub fn output_stem(&self) -> String {
        self.name.clone().unwrap_or_else(|| {
            self.path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("model")
                .to_owned()
        })
    }

    /// Output file name; the stem is kept whole, dots included
    pub fn output_file_name(&self) -> String {
        format!("{}.{}", self.output_stem(), HEP_MODEL_FORMAT.extension)
    }
}

impl BuildManifest {
    pub fn style(&self) -> OutputStyle {
        if self.output.compact {
            OutputStyle::Compact
        } else {
            OutputStyle::Pretty
        }
    }

    /// Resolve `path` against the manifest directory
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

/// Parse manifest text
pub fn parse_manifest(content: &str) -> Result<BuildManifest> {
    toml::from_str(content).context("Failed to parse build manifest")
}

/// Load a manifest file
pub fn load_manifest(path: &Path) -> Result<BuildManifest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
    let mut manifest = parse_manifest(&content)?;
    manifest.base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    Ok(manifest)
}

/// Check the manifest without compiling anything
pub fn validate(manifest: &BuildManifest) -> Result<()> {
    if manifest.models.is_empty() {
        bail!("Manifest declares no models");
    }

    let mut file_names = HashSet::new();
    for entry in &manifest.models {
        let path = manifest.resolve(&entry.path);
        if !path.is_file() {
            bail!("Model project not found: {}", path.display());
        }
        let file_name = entry.output_file_name();
        if !file_names.insert(file_name.clone()) {
            bail!("Duplicate output name '{}' in manifest", file_name);
        }
    }

    Ok(())
}

/// Outcome of one manifest entry
#[derive(Debug)]
pub struct BuiltModel {
    pub output: PathBuf,
    pub warnings: usize,
}

/// Compile and write every model of the manifest
///
/// Entries compile in parallel, each from its own snapshot. Results and
/// errors are reported in manifest order; the first failing entry fails the
/// build.
pub fn build_all(manifest: &BuildManifest, output_override: Option<&Path>) -> Result<Vec<BuiltModel>> {
    validate(manifest)?;

    let out_dir = match output_override {
        Some(dir) => dir.to_path_buf(),
        None => manifest.resolve(&manifest.output.dir),
    };
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create output directory: {}", out_dir.display()))?;

    let results: Vec<Result<BuiltModel>> = manifest
        .models
        .par_iter()
        .map(|entry| build_one(manifest, entry, &out_dir))
        .collect();

    let built = results.into_iter().collect::<Result<Vec<_>>>()?;
    tracing::info!("Built {} models into {}", built.len(), out_dir.display());
    Ok(built)
}

fn build_one(manifest: &BuildManifest, entry: &ModelEntry, out_dir: &Path) -> Result<BuiltModel> {
    let input = manifest.resolve(&entry.path);
    let mut project = bbmodel::load_project(&input)?;
    if let Some(name) = &entry.name {
        project.geometry_name = Some(name.clone());
    }

    let compilation =
        model::compile(&project).with_context(|| format!("Failed to compile {}", input.display()))?;
    if manifest.output.deny_warnings && compilation.has_warnings() {
        bail!(
            "{} has {} compatibility warnings (deny_warnings is set)",
            input.display(),
            compilation.warnings.len()
        );
    }

    let output = out_dir.join(entry.output_file_name());
    write_model_file(&output, &compilation.model, manifest.style())?;
    tracing::info!("{:?} -> {:?}", input, output);

    Ok(BuiltModel {
        output,
        warnings: compilation.warnings.len(),
    })
}
