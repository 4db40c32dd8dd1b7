//! Animation encoder (source animations -> per-bone keyframe tracks)
//!
//! Keyframes are emitted in source order. The authoring tool keeps them
//! sorted by time, so no re-sorting happens here.

use std::collections::BTreeMap;

use hephaestus_shared::formats::{Animation, Animator, Keyframe};

use crate::error::{CompileResult, ReferenceError, ValidationError};
use crate::scene::{SceneGraph, SourceAnimation, SourceAnimator, SourceKeyframe};

/// Encode every animation of the project, in order
pub fn encode_animations(animations: &[SourceAnimation], graph: &SceneGraph) -> CompileResult<Vec<Animation>> {
    animations
        .iter()
        .map(|animation| encode_animation(animation, graph))
        .collect()
}

/// Encode one animation
///
/// Animators without keyframes are dropped. Animators must target a bone
/// group of `graph`, and every keyframe needs at least one data point.
pub fn encode_animation(animation: &SourceAnimation, graph: &SceneGraph) -> CompileResult<Animation> {
    let mut animators = BTreeMap::new();

    for (bone, animator) in &animation.animators {
        if animator.keyframes.is_empty() {
            continue;
        }
        if !graph.is_bone(bone) {
            return Err(ReferenceError::UnknownBone {
                animation: animation.name.clone(),
                bone: bone.clone(),
            }
            .into());
        }

        let keyframes = encode_keyframes(animation, animator)?;
        animators.insert(
            bone.as_str().to_owned(),
            Animator {
                name: animator.name.clone(),
                keyframes,
            },
        );
    }

    tracing::debug!(
        "Encoded animation '{}': {} animated bones, {:.2} long",
        animation.name,
        animators.len(),
        animation.length
    );

    Ok(Animation {
        name: animation.name.clone(),
        loop_mode: animation.loop_mode,
        override_previous: animation.override_previous,
        length: animation.length,
        animators,
    })
}

fn encode_keyframes(
    animation: &SourceAnimation,
    animator: &SourceAnimator,
) -> Result<Vec<Keyframe>, ValidationError> {
    animator
        .keyframes
        .iter()
        .map(|keyframe| encode_keyframe(keyframe).ok_or_else(|| ValidationError::EmptyKeyframe {
            animation: animation.name.clone(),
            bone: animator.name.clone(),
            time: keyframe.time,
        }))
        .collect()
}

/// Value is (x, y, z) of the first data point; `None` when there is none
fn encode_keyframe(keyframe: &SourceKeyframe) -> Option<Keyframe> {
    let point = keyframe.data_points.first()?;
    Some(Keyframe {
        channel: keyframe.channel,
        time: keyframe.time,
        value: [point.x, point.y, point.z],
    })
}
