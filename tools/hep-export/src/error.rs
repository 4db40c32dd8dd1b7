//! Compilation error taxonomy
//!
//! Every variant of [`CompileError`] is fatal: compilation returns no
//! document. Non-fatal conditions are reported as [`CompatibilityWarning`]
//! values next to the compiled model.

use hephaestus_shared::formats::FaceKey;

use crate::scene::{NodeId, TextureId};

/// Result alias for the compiler core
pub type CompileResult<T> = Result<T, CompileError>;

/// Reason a compilation failed
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    #[error("structural error: {0}")]
    Structural(#[from] StructuralError),

    #[error("reference error: {0}")]
    Reference(#[from] ReferenceError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Malformed outliner topology
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StructuralError {
    /// A node is reachable from itself through child links
    #[error("outliner cycle through node '{0}'")]
    Cycle(NodeId),

    /// A root or child entry names a node that is not in the graph
    #[error("'{parent}' references missing node '{child}'")]
    MissingNode { parent: String, child: NodeId },

    /// A node listed as child of more than one parent (or twice)
    #[error("node '{0}' is owned by more than one parent")]
    SharedNode(NodeId),

    #[error("outliner nesting exceeds {limit} levels at node '{node}'")]
    TooDeep { node: NodeId, limit: usize },
}

/// Unresolvable reference
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReferenceError {
    #[error("face '{face}' of element '{element}' uses unknown texture '{texture}'")]
    UnknownTexture {
        element: String,
        face: FaceKey,
        texture: TextureId,
    },

    #[error("animation '{animation}' animates unknown bone '{bone}'")]
    UnknownBone { animation: String, bone: NodeId },
}

/// Malformed leaf data
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("keyframe at time {time} of bone '{bone}' in animation '{animation}' has no data points")]
    EmptyKeyframe {
        animation: String,
        bone: String,
        time: f64,
    },
}

/// Non-fatal condition surfaced to the caller; the document is still produced
#[derive(Debug, Clone, PartialEq)]
pub enum CompatibilityWarning {
    /// Project authored in box UV mode; face UVs are best-effort
    BoxUv,

    /// Cuboid rotated on more than one axis
    MultiAxisRotation { element: String },

    /// Rotation angle off the 22.5 degree grid or outside [-45, 45]
    UnalignedRotation { element: String, angle: f64 },

    /// Cuboid outside of any bone
    RootElement { element: String },
}

impl std::fmt::Display for CompatibilityWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompatibilityWarning::BoxUv => {
                write!(f, "models must not use \"Box UV\" UV mode")
            }
            CompatibilityWarning::MultiAxisRotation { element } => {
                write!(f, "element '{}' is rotated on more than one axis", element)
            }
            CompatibilityWarning::UnalignedRotation { element, angle } => write!(
                f,
                "element '{}' has rotation {} (expected a multiple of 22.5 within [-45, 45])",
                element, angle
            ),
            CompatibilityWarning::RootElement { element } => {
                write!(f, "element '{}' is not inside any bone", element)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_culprit() {
        let err: CompileError = StructuralError::Cycle(NodeId::from("arm")).into();
        assert_eq!(err.to_string(), "structural error: outliner cycle through node 'arm'");

        let err: CompileError = ValidationError::EmptyKeyframe {
            animation: "walk".into(),
            bone: "leg".into(),
            time: 0.5,
        }
        .into();
        assert!(err.to_string().contains("'leg'"));
        assert!(err.to_string().contains("'walk'"));
    }

    #[test]
    fn test_warning_display() {
        let warning = CompatibilityWarning::UnalignedRotation {
            element: "horn".into(),
            angle: 30.0,
        };
        assert!(warning.to_string().contains("horn"));
        assert!(CompatibilityWarning::BoxUv.to_string().contains("Box UV"));
    }
}
