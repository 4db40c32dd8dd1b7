//! Geometry resolver (cuboid -> document element)

use std::collections::BTreeMap;

use hephaestus_shared::formats::{Element, Face, NO_TINT};

use crate::error::{CompatibilityWarning, ReferenceError};
use crate::scene::{Cuboid, SourceFace, Vec3};
use crate::texture::TextureIndexer;

/// Rotation step allowed by the runtime, in degrees
const ROTATION_STEP: f64 = 22.5;

/// Largest absolute rotation allowed by the runtime, in degrees
const ROTATION_LIMIT: f64 = 45.0;

/// Resolve one cuboid into its serializable form
///
/// Coordinates are passed through unchanged. Fails only when a face names a
/// texture the indexer does not know.
pub fn resolve_element(cuboid: &Cuboid, textures: &TextureIndexer) -> Result<Element, ReferenceError> {
    let mut faces = BTreeMap::new();
    for (&key, face) in &cuboid.faces {
        let texture = match &face.texture {
            Some(id) => Some(textures.index_of(id).ok_or_else(|| {
                ReferenceError::UnknownTexture {
                    element: cuboid.name.clone(),
                    face: key,
                    texture: id.clone(),
                }
            })?),
            None => None,
        };
        faces.insert(
            key,
            Face {
                uv: face.uv,
                texture,
                tint: face_tint(face),
            },
        );
    }

    Ok(Element {
        from: cuboid.from,
        to: cuboid.to,
        origin: cuboid.origin,
        rotation: compact_rotation(cuboid.rotation),
        faces,
    })
}

/// `None` for the exact zero rotation, the angles otherwise
pub fn compact_rotation(rotation: Vec3) -> Option<Vec3> {
    // Exact comparison: -0.0 counts as zero, 1e-9 does not.
    if rotation.iter().all(|&angle| angle == 0.0) {
        None
    } else {
        Some(rotation)
    }
}

fn face_tint(face: &SourceFace) -> Option<i32> {
    (face.tint != NO_TINT).then_some(face.tint)
}

/// Rotations the runtime cannot reproduce exactly
///
/// The runtime rotates a cuboid around a single axis in 22.5 degree steps
/// within [-45, 45].
pub fn rotation_warnings(cuboid: &Cuboid) -> Vec<CompatibilityWarning> {
    let mut warnings = Vec::new();
    let rotated: Vec<f64> = cuboid
        .rotation
        .iter()
        .copied()
        .filter(|&angle| angle != 0.0)
        .collect();

    if rotated.len() > 1 {
        warnings.push(CompatibilityWarning::MultiAxisRotation {
            element: cuboid.name.clone(),
        });
    }

    for angle in rotated {
        if angle.abs() > ROTATION_LIMIT || angle % ROTATION_STEP != 0.0 {
            warnings.push(CompatibilityWarning::UnalignedRotation {
                element: cuboid.name.clone(),
                angle,
            });
        }
    }

    warnings
}
