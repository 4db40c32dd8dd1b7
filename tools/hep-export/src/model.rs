//! Model assembler
//!
//! Single entry point of the compiler. Runs the components in order (graph
//! validation, texture indexing, bone tree, animations, metadata) and either
//! returns a complete document or the first fatal error. There is no partial
//! document.

use hephaestus_shared::formats::{Meta, Model, FORMAT_VERSION};

use crate::animation::encode_animations;
use crate::error::{CompatibilityWarning, CompileResult};
use crate::scene::ProjectSnapshot;
use crate::skeleton::compile_outliner;
use crate::texture::{collect_textures, TextureIndexer};

/// Successful compilation
#[derive(Debug, Clone, PartialEq)]
pub struct Compilation {
    pub model: Model,
    /// Non-fatal findings, in discovery order
    pub warnings: Vec<CompatibilityWarning>,
}

impl Compilation {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Compile `project`, stamping the current time
pub fn compile(project: &ProjectSnapshot) -> CompileResult<Compilation> {
    compile_at(project, chrono::Utc::now().timestamp())
}

/// Compile `project` with an explicit `creation_time` (seconds since epoch)
///
/// Deterministic: equal snapshots and times give equal documents.
pub fn compile_at(project: &ProjectSnapshot, creation_time: i64) -> CompileResult<Compilation> {
    let mut warnings = Vec::new();
    if project.box_uv {
        warnings.push(CompatibilityWarning::BoxUv);
    }

    let textures = TextureIndexer::new(&project.textures);
    let outliner = compile_outliner(&project.graph, &textures)?;
    warnings.extend(outliner.warnings);

    let animations = encode_animations(&project.animations, &project.graph)?;

    let model = Model {
        name: project.model_name().to_owned(),
        meta: Meta {
            format_version: FORMAT_VERSION,
            creation_time,
            model_format: project.model_format.clone(),
        },
        resolution: project.resolution(),
        outliner: outliner.roots,
        textures: collect_textures(&project.textures),
        animations,
    };

    for warning in &warnings {
        tracing::warn!("Model '{}': {}", model.name, warning);
    }
    tracing::info!(
        "Compiled model '{}': {} bones, {} elements, {} textures, {} animations",
        model.name,
        outliner.bone_count,
        outliner.element_count,
        model.textures.len(),
        model.animations.len()
    );

    Ok(Compilation { model, warnings })
}
