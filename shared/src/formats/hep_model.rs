//! HepModel document format (.hepmodel)
//!
//! Skeletal model document produced by the exporter and consumed by the
//! Hephaestus runtime. Self-describing JSON; field names are part of the
//! contract and must not change without bumping [`FORMAT_VERSION`].
//!
//! # Layout
//! ```text
//! {
//!   "name": "dragon",
//!   "meta": { "format_version": 1, "creation_time": 1700000000, "model_format": "free" },
//!   "resolution": { "width": 64, "height": 64 },
//!   "outliner": [ <bone | element>, ... ],
//!   "textures": [ { "name": "skin.png", "source": "<base64>" }, ... ],
//!   "animations": [ { "name", "loop", "override", "length", "animators": { <uuid>: ... } } ]
//! }
//! ```
//!
//! Optional fields (`rotation`, `texture`, `tint`) are omitted rather than
//! written with a neutral value. Consumers must treat a missing rotation as
//! the identity rotation and a missing tint as "no tint".

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Current document format version, incremented on every breaking revision
pub const FORMAT_VERSION: u32 = 1;

/// Texture resolution used when the project leaves it unset
pub const DEFAULT_RESOLUTION: u32 = 16;

/// Sentinel tint value meaning "face uses no color tint"
pub const NO_TINT: i32 = -1;

/// Root document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub name: String,
    pub meta: Meta,
    pub resolution: Resolution,
    /// Root nodes of the bone tree, in outliner order
    pub outliner: Vec<OutlinerNode>,
    /// Textures; a face's `texture` is an index into this list
    pub textures: Vec<Texture>,
    pub animations: Vec<Animation>,
}

impl Model {
    /// Iterate every bone in the document, depth-first pre-order
    pub fn bones(&self) -> impl Iterator<Item = &Bone> + '_ {
        BoneWalk {
            stack: self.outliner.iter().rev().collect(),
        }
    }

    /// Count of cuboid elements anywhere in the tree
    pub fn element_count(&self) -> usize {
        let root = self
            .outliner
            .iter()
            .filter(|node| matches!(node, OutlinerNode::Element(_)))
            .count();
        root + self.bones().map(|b| b.elements().count()).sum::<usize>()
    }
}

struct BoneWalk<'a> {
    stack: Vec<&'a OutlinerNode>,
}

impl<'a> Iterator for BoneWalk<'a> {
    type Item = &'a Bone;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            if let OutlinerNode::Bone(bone) = node {
                self.stack.extend(bone.children.iter().rev());
                return Some(bone);
            }
        }
        None
    }
}

/// Document metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub format_version: u32,
    /// Seconds since the Unix epoch
    pub creation_time: i64,
    /// Identifier of the authoring format the project was created with
    pub model_format: String,
}

/// Texture atlas resolution in texels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: DEFAULT_RESOLUTION,
            height: DEFAULT_RESOLUTION,
        }
    }
}

/// Entry of the outliner tree: either a bone or a cuboid
///
/// Serialized untagged; bones are recognised by `name`/`children`, elements
/// by `from`/`to`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutlinerNode {
    Bone(Bone),
    Element(Element),
}

/// Named transform node grouping child geometry and child bones
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bone {
    pub name: String,
    /// Stable identifier, used as key by [`Animation::animators`]
    pub uuid: String,
    pub origin: [f64; 3],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<[f64; 3]>,
    /// Child elements and bones, in source sibling order
    pub children: Vec<OutlinerNode>,
}

impl Bone {
    /// Direct child elements, in order
    pub fn elements(&self) -> impl Iterator<Item = &Element> + '_ {
        self.children.iter().filter_map(|node| match node {
            OutlinerNode::Element(element) => Some(element),
            OutlinerNode::Bone(_) => None,
        })
    }

    /// Direct child bones, in order
    pub fn bones(&self) -> impl Iterator<Item = &Bone> + '_ {
        self.children.iter().filter_map(|node| match node {
            OutlinerNode::Bone(bone) => Some(bone),
            OutlinerNode::Element(_) => None,
        })
    }
}

/// Cuboid primitive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub from: [f64; 3],
    pub to: [f64; 3],
    /// Pivot point for rotation
    pub origin: [f64; 3],
    /// Euler angles in degrees; absent means no rotation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<[f64; 3]>,
    /// Sparse: only faces present on the source cuboid
    pub faces: BTreeMap<FaceKey, Face>,
}

/// One of the six cuboid faces
///
/// Variant order is the serialization order of [`Element::faces`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaceKey {
    North,
    East,
    South,
    West,
    Up,
    Down,
}

impl FaceKey {
    pub const ALL: [FaceKey; 6] = [
        FaceKey::North,
        FaceKey::East,
        FaceKey::South,
        FaceKey::West,
        FaceKey::Up,
        FaceKey::Down,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FaceKey::North => "north",
            FaceKey::East => "east",
            FaceKey::South => "south",
            FaceKey::West => "west",
            FaceKey::Up => "up",
            FaceKey::Down => "down",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|face| face.as_str() == key)
    }
}

impl std::fmt::Display for FaceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Face UV mapping with optional texture and tint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Face {
    /// [u1, v1, u2, v2] in texels
    pub uv: [f64; 4],
    /// Index into [`Model::textures`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tint: Option<i32>,
}

/// Texture asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Texture {
    pub name: String,
    /// Base64-encoded image payload
    pub source: String,
}

/// Animation loop behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopMode {
    /// Play once and return to the rest pose
    #[default]
    Once,
    /// Restart from the beginning
    Loop,
    /// Play once and hold the last frame
    Hold,
}

impl LoopMode {
    pub fn parse(mode: &str) -> Option<Self> {
        match mode {
            "once" => Some(LoopMode::Once),
            "loop" => Some(LoopMode::Loop),
            "hold" => Some(LoopMode::Hold),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    pub name: String,
    #[serde(rename = "loop")]
    pub loop_mode: LoopMode,
    /// Whether the animation overrides other running animations
    #[serde(rename = "override")]
    pub override_previous: bool,
    /// Total length, in the same unit as keyframe times
    pub length: f64,
    /// Per-bone tracks keyed by [`Bone::uuid`]
    pub animators: BTreeMap<String, Animator>,
}

/// Keyframe track of a single bone within one animation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animator {
    pub name: String,
    /// Ordered by time ascending
    pub keyframes: Vec<Keyframe>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub channel: Channel,
    pub time: f64,
    pub value: [f64; 3],
}

/// Animated bone property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Position,
    Rotation,
    Scale,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Position => "position",
            Channel::Rotation => "rotation",
            Channel::Scale => "scale",
        }
    }

    pub fn parse(channel: &str) -> Option<Self> {
        match channel {
            "position" => Some(Channel::Position),
            "rotation" => Some(Channel::Rotation),
            "scale" => Some(Channel::Scale),
            _ => None,
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
