//! Blockbench project loader (.bbmodel -> ProjectSnapshot)
//!
//! Reads the project JSON the authoring tool saves and rebuilds the scene
//! snapshot the compiler works on. Malformed files fail here with context;
//! topology and reference problems are left to the compiler so they surface
//! as compile errors.

use anyhow::{bail, Context, Result};
use base64::Engine;
use hashbrown::HashSet;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use hephaestus_shared::formats::{Channel, FaceKey, LoopMode, NO_TINT};

use crate::scene::{
    BoneGroup, Cuboid, DataPoint, NodeId, ProjectSnapshot, SceneGraph, SceneNode, SourceAnimation,
    SourceAnimator, SourceFace, SourceKeyframe, SourceTexture, TextureId, Vec3,
};

/// Prefix of embedded texture sources
const BASE_64_PREFIX: &str = "data:image/png;base64,";

#[derive(Debug, Deserialize)]
struct RawProject {
    #[serde(default)]
    meta: RawMeta,
    #[serde(default)]
    name: String,
    #[serde(default)]
    geometry_name: Option<String>,
    #[serde(default)]
    resolution: Option<RawResolution>,
    #[serde(default)]
    elements: Vec<RawElement>,
    #[serde(default)]
    outliner: Vec<RawOutlinerEntry>,
    #[serde(default)]
    textures: Vec<RawTexture>,
    #[serde(default)]
    animations: Vec<RawAnimation>,
}

#[derive(Debug, Default, Deserialize)]
struct RawMeta {
    #[serde(default)]
    format_version: Option<String>,
    #[serde(default)]
    model_format: Option<String>,
    #[serde(default)]
    box_uv: bool,
}

#[derive(Debug, Deserialize)]
struct RawResolution {
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
}

#[derive(Debug, Deserialize)]
struct RawElement {
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default = "default_element_type")]
    kind: String,
    uuid: String,
    #[serde(default, deserialize_with = "null_as_zero")]
    from: Vec3,
    #[serde(default, deserialize_with = "null_as_zero")]
    to: Vec3,
    #[serde(default, deserialize_with = "null_as_zero")]
    origin: Vec3,
    #[serde(default, deserialize_with = "null_as_zero")]
    rotation: Vec3,
    #[serde(default)]
    faces: BTreeMap<String, RawFace>,
}

fn default_element_type() -> String {
    "cube".to_owned()
}

/// Vectors saved as `null` read as zero, like absent ones
fn null_as_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec3, D::Error> {
    Ok(Option::<Vec3>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Deserialize)]
struct RawFace {
    #[serde(default)]
    uv: [f64; 4],
    #[serde(default)]
    texture: Value,
    #[serde(default = "default_tint")]
    tint: i32,
}

fn default_tint() -> i32 {
    NO_TINT
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawOutlinerEntry {
    /// Reference to an element uuid
    Element(String),
    Group(RawGroup),
}

#[derive(Debug, Deserialize)]
struct RawGroup {
    name: String,
    uuid: String,
    #[serde(default, deserialize_with = "null_as_zero")]
    origin: Vec3,
    #[serde(default, deserialize_with = "null_as_zero")]
    rotation: Vec3,
    #[serde(default)]
    children: Vec<RawOutlinerEntry>,
}

#[derive(Debug, Deserialize)]
struct RawTexture {
    #[serde(default)]
    uuid: Option<String>,
    name: String,
    source: String,
}

#[derive(Debug, Deserialize)]
struct RawAnimation {
    name: String,
    #[serde(rename = "loop", default)]
    loop_mode: Option<String>,
    #[serde(rename = "override", default)]
    override_previous: bool,
    #[serde(default)]
    length: f64,
    #[serde(default)]
    animators: BTreeMap<String, RawAnimator>,
}

#[derive(Debug, Deserialize)]
struct RawAnimator {
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default = "default_animator_type")]
    kind: String,
    #[serde(default)]
    keyframes: Vec<RawKeyframe>,
}

fn default_animator_type() -> String {
    "bone".to_owned()
}

#[derive(Debug, Deserialize)]
struct RawKeyframe {
    channel: String,
    time: f64,
    #[serde(default)]
    data_points: Vec<serde_json::Map<String, Value>>,
}

/// Load a project file
///
/// The file stem is used as project name when the file has none.
pub fn load_project(path: &Path) -> Result<ProjectSnapshot> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read project: {}", path.display()))?;
    let mut project =
        parse_project(&content).with_context(|| format!("Failed to load project: {}", path.display()))?;

    if project.name.is_empty() {
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            project.name = stem.to_owned();
        }
    }

    Ok(project)
}

/// Parse project JSON into a snapshot
pub fn parse_project(content: &str) -> Result<ProjectSnapshot> {
    let raw: RawProject = serde_json::from_str(content).context("Invalid project JSON")?;

    if let Some(version) = &raw.meta.format_version {
        tracing::debug!("Project format version {}", version);
    }

    let textures = read_textures(&raw.textures)?;
    let (graph, skipped) = read_scene(&raw, &textures)?;
    if skipped > 0 {
        tracing::debug!("Skipped {} non-cuboid elements", skipped);
    }
    let animations = raw
        .animations
        .iter()
        .map(read_animation)
        .collect::<Result<Vec<_>>>()?;

    Ok(ProjectSnapshot {
        name: raw.name,
        geometry_name: raw.geometry_name,
        model_format: raw.meta.model_format.unwrap_or_else(|| "free".to_owned()),
        box_uv: raw.meta.box_uv,
        texture_width: raw.resolution.as_ref().map(|r| r.width),
        texture_height: raw.resolution.as_ref().map(|r| r.height),
        graph,
        textures,
        animations,
    })
}

fn read_textures(raw: &[RawTexture]) -> Result<Vec<SourceTexture>> {
    raw.iter()
        .enumerate()
        .map(|(index, texture)| {
            let Some(payload) = texture.source.strip_prefix(BASE_64_PREFIX) else {
                bail!("Texture '{}' has an invalid source, not Base64 PNG", texture.name);
            };
            base64::engine::general_purpose::STANDARD
                .decode(payload)
                .with_context(|| format!("Texture '{}' has a corrupt Base64 payload", texture.name))?;

            let id = match &texture.uuid {
                Some(uuid) => TextureId::from(uuid.as_str()),
                None => index_texture_id(index),
            };
            Ok(SourceTexture {
                id,
                name: texture.name.clone(),
                source: payload.to_owned(),
            })
        })
        .collect()
}

/// Id for texture `index` when the file stores no uuid or the index is out of range
fn index_texture_id(index: usize) -> TextureId {
    TextureId::from(format!("#{}", index))
}

/// Build the outliner arena; returns the graph and the number of skipped elements
fn read_scene(raw: &RawProject, textures: &[SourceTexture]) -> Result<(SceneGraph, usize)> {
    let mut graph = SceneGraph::new();
    let mut skipped: HashSet<&str> = HashSet::new();

    for element in &raw.elements {
        if element.kind != "cube" {
            skipped.insert(element.uuid.as_str());
            continue;
        }
        let cuboid = read_cuboid(element, textures)?;
        graph.insert(element.uuid.as_str(), SceneNode::Cuboid(cuboid));
    }

    let mut roots = Vec::with_capacity(raw.outliner.len());
    for entry in &raw.outliner {
        if let Some(id) = read_outliner_entry(entry, &skipped, &mut graph) {
            roots.push(id);
        }
    }
    for id in roots {
        graph.push_root(id);
    }

    Ok((graph, skipped.len()))
}

/// Register `entry` (recursively for groups) and return its id
///
/// Element references are returned as-is; a dangling uuid is caught by
/// `SceneGraph::validate` during compilation.
fn read_outliner_entry(
    entry: &RawOutlinerEntry,
    skipped: &HashSet<&str>,
    graph: &mut SceneGraph,
) -> Option<NodeId> {
    match entry {
        RawOutlinerEntry::Element(uuid) => {
            (!skipped.contains(uuid.as_str())).then(|| NodeId::from(uuid.as_str()))
        }
        RawOutlinerEntry::Group(group) => {
            let children = group
                .children
                .iter()
                .filter_map(|child| read_outliner_entry(child, skipped, graph))
                .collect();
            graph.insert(
                group.uuid.as_str(),
                SceneNode::BoneGroup(BoneGroup {
                    name: group.name.clone(),
                    origin: group.origin,
                    rotation: group.rotation,
                    children,
                }),
            );
            Some(NodeId::from(group.uuid.as_str()))
        }
    }
}

fn read_cuboid(element: &RawElement, textures: &[SourceTexture]) -> Result<Cuboid> {
    let mut faces = BTreeMap::new();
    for (key, face) in &element.faces {
        let Some(face_key) = FaceKey::parse(key) else {
            bail!("Element '{}' has an unknown face '{}'", element.name, key);
        };
        faces.insert(
            face_key,
            SourceFace {
                uv: face.uv,
                texture: read_face_texture(&face.texture, textures),
                tint: face.tint,
            },
        );
    }

    Ok(Cuboid {
        name: element.name.clone(),
        from: element.from,
        to: element.to,
        origin: element.origin,
        rotation: element.rotation,
        faces,
    })
}

/// Faces store either a texture index, a texture uuid, or null/false
fn read_face_texture(value: &Value, textures: &[SourceTexture]) -> Option<TextureId> {
    match value {
        Value::Number(number) => {
            let index = number
                .as_u64()
                .or_else(|| number.as_f64().filter(|n| *n >= 0.0 && n.fract() == 0.0).map(|n| n as u64));
            // Negative or fractional indices stay dangling so the compiler reports them
            let Some(index) = index else {
                return Some(TextureId::from(format!("#{}", number)));
            };
            let index = index as usize;
            Some(
                textures
                    .get(index)
                    .map(|texture| texture.id.clone())
                    .unwrap_or_else(|| index_texture_id(index)),
            )
        }
        Value::String(uuid) => Some(TextureId::from(uuid.as_str())),
        _ => None,
    }
}

fn read_animation(raw: &RawAnimation) -> Result<SourceAnimation> {
    let loop_mode = match raw.loop_mode.as_deref() {
        None => LoopMode::default(),
        Some(mode) => LoopMode::parse(mode)
            .with_context(|| format!("Animation '{}' has unknown loop mode '{}'", raw.name, mode))?,
    };

    let mut animators = Vec::with_capacity(raw.animators.len());
    for (uuid, animator) in &raw.animators {
        if animator.kind != "bone" {
            tracing::debug!(
                "Skipping {} animator '{}' in animation '{}'",
                animator.kind,
                animator.name,
                raw.name
            );
            continue;
        }

        let mut keyframes = animator
            .keyframes
            .iter()
            .map(|keyframe| read_keyframe(keyframe, &raw.name, &animator.name))
            .collect::<Result<Vec<_>>>()?;
        keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));

        animators.push((
            NodeId::from(uuid.as_str()),
            SourceAnimator {
                name: animator.name.clone(),
                keyframes,
            },
        ));
    }

    Ok(SourceAnimation {
        name: raw.name.clone(),
        loop_mode,
        override_previous: raw.override_previous,
        length: raw.length,
        animators,
    })
}

fn read_keyframe(raw: &RawKeyframe, animation: &str, bone: &str) -> Result<SourceKeyframe> {
    let channel = Channel::parse(&raw.channel).with_context(|| {
        format!(
            "Unknown channel '{}' in animation '{}', bone '{}'",
            raw.channel, animation, bone
        )
    })?;

    let data_points = raw
        .data_points
        .iter()
        .map(|point| {
            Ok(DataPoint {
                x: lenient_component(point, "x")?,
                y: lenient_component(point, "y")?,
                z: lenient_component(point, "z")?,
            })
        })
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("Bad keyframe in animation '{}', bone '{}'", animation, bone))?;

    Ok(SourceKeyframe {
        channel,
        time: raw.time,
        data_points,
    })
}

/// Numbers, numeric strings and empty strings (zero) are accepted
fn lenient_component(point: &serde_json::Map<String, Value>, axis: &str) -> Result<f64> {
    match point.get(axis) {
        None | Some(Value::Null) => Ok(0.0),
        Some(Value::Number(number)) => number
            .as_f64()
            .with_context(|| format!("Component '{}' is not a finite number", axis)),
        Some(Value::String(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(0.0);
            }
            text.parse::<f64>()
                .with_context(|| format!("Component '{}' is an expression, not a number: '{}'", axis, text))
        }
        Some(other) => bail!("Component '{}' has unsupported value {}", axis, other),
    }
}
