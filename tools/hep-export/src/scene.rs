//! Scene snapshot handed to the compiler
//!
//! An immutable, fully loaded copy of the authoring project: the outliner as
//! an arena of tagged nodes, the texture list and the animation definitions.
//! Nothing here reads files; see [`crate::bbmodel`] for the project loader.

use std::collections::BTreeMap;

use hashbrown::{HashMap, HashSet};
use hephaestus_shared::formats::{Channel, FaceKey, LoopMode, Resolution, DEFAULT_RESOLUTION, NO_TINT};

use crate::error::StructuralError;

/// Maximum outliner nesting accepted by [`SceneGraph::validate`]
pub const MAX_OUTLINER_DEPTH: usize = 256;

pub type Vec3 = [f64; 3];

/// Stable node identifier (the authoring tool's uuid)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(String);

impl NodeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Texture identity, independent of its position in the texture list
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextureId(String);

impl TextureId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TextureId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for TextureId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for TextureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outliner node: bone group or cuboid leaf
#[derive(Debug, Clone, PartialEq)]
pub enum SceneNode {
    BoneGroup(BoneGroup),
    Cuboid(Cuboid),
}

impl SceneNode {
    pub fn name(&self) -> &str {
        match self {
            SceneNode::BoneGroup(group) => &group.name,
            SceneNode::Cuboid(cuboid) => &cuboid.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoneGroup {
    pub name: String,
    pub origin: Vec3,
    pub rotation: Vec3,
    /// Child node ids in sibling order
    pub children: Vec<NodeId>,
}

impl BoneGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            origin: [0.0; 3],
            rotation: [0.0; 3],
            children: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cuboid {
    pub name: String,
    pub from: Vec3,
    pub to: Vec3,
    pub origin: Vec3,
    pub rotation: Vec3,
    pub faces: BTreeMap<FaceKey, SourceFace>,
}

impl Cuboid {
    pub fn new(name: impl Into<String>, from: Vec3, to: Vec3) -> Self {
        Self {
            name: name.into(),
            from,
            to,
            origin: [0.0; 3],
            rotation: [0.0; 3],
            faces: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceFace {
    pub uv: [f64; 4],
    pub texture: Option<TextureId>,
    /// Tint index, [`NO_TINT`] when the face is untinted
    pub tint: i32,
}

impl SourceFace {
    pub fn new(uv: [f64; 4]) -> Self {
        Self {
            uv,
            texture: None,
            tint: NO_TINT,
        }
    }

    pub fn with_texture(mut self, texture: impl Into<TextureId>) -> Self {
        self.texture = Some(texture.into());
        self
    }

    pub fn with_tint(mut self, tint: i32) -> Self {
        self.tint = tint;
        self
    }
}

/// Outliner forest stored as an arena keyed by [`NodeId`]
///
/// Children are referenced by id, so a malformed snapshot can express cycles,
/// shared children or dangling ids. [`SceneGraph::validate`] rejects all of
/// them before the compiler walks the tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneGraph {
    nodes: HashMap<NodeId, SceneNode>,
    roots: Vec<NodeId>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a node
    pub fn insert(&mut self, id: impl Into<NodeId>, node: SceneNode) {
        self.nodes.insert(id.into(), node);
    }

    /// Append a node id to the root list
    pub fn push_root(&mut self, id: impl Into<NodeId>) {
        self.roots.push(id.into());
    }

    pub fn get(&self, id: &NodeId) -> Option<&SceneNode> {
        self.nodes.get(id)
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `id` names a bone group
    pub fn is_bone(&self, id: &NodeId) -> bool {
        matches!(self.nodes.get(id), Some(SceneNode::BoneGroup(_)))
    }

    /// Check that the outliner reachable from the roots is a forest
    ///
    /// Rejects cycles, missing nodes, nodes owned by more than one parent and
    /// nesting deeper than [`MAX_OUTLINER_DEPTH`]. Iterative, so pathological
    /// inputs cannot exhaust the stack here.
    pub fn validate(&self) -> Result<(), StructuralError> {
        enum Visit<'a> {
            Enter {
                id: &'a NodeId,
                parent: &'a str,
                depth: usize,
            },
            Exit(&'a NodeId),
        }

        let mut seen: HashSet<&NodeId> = HashSet::with_capacity(self.nodes.len());
        let mut on_path: HashSet<&NodeId> = HashSet::new();
        let mut stack: Vec<Visit> = self
            .roots
            .iter()
            .rev()
            .map(|id| Visit::Enter {
                id,
                parent: "outliner root",
                depth: 1,
            })
            .collect();

        while let Some(visit) = stack.pop() {
            let (id, parent, depth) = match visit {
                Visit::Exit(id) => {
                    on_path.remove(id);
                    continue;
                }
                Visit::Enter { id, parent, depth } => (id, parent, depth),
            };

            if on_path.contains(id) {
                return Err(StructuralError::Cycle(id.clone()));
            }
            if !seen.insert(id) {
                return Err(StructuralError::SharedNode(id.clone()));
            }
            if depth > MAX_OUTLINER_DEPTH {
                return Err(StructuralError::TooDeep {
                    node: id.clone(),
                    limit: MAX_OUTLINER_DEPTH,
                });
            }

            let node = self
                .nodes
                .get(id)
                .ok_or_else(|| StructuralError::MissingNode {
                    parent: parent.to_owned(),
                    child: id.clone(),
                })?;

            if let SceneNode::BoneGroup(group) = node {
                on_path.insert(id);
                stack.push(Visit::Exit(id));
                stack.extend(group.children.iter().rev().map(|child| Visit::Enter {
                    id: child,
                    parent: id.as_str(),
                    depth: depth + 1,
                }));
            }
        }

        Ok(())
    }
}

/// Texture asset as declared in the project
#[derive(Debug, Clone, PartialEq)]
pub struct SourceTexture {
    pub id: TextureId,
    pub name: String,
    /// Base64 image payload, without a data URL prefix
    pub source: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceKeyframe {
    pub channel: Channel,
    pub time: f64,
    pub data_points: Vec<DataPoint>,
}

impl SourceKeyframe {
    pub fn new(channel: Channel, time: f64, value: Vec3) -> Self {
        Self {
            channel,
            time,
            data_points: vec![DataPoint {
                x: value[0],
                y: value[1],
                z: value[2],
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceAnimator {
    /// Display name, usually the bone name
    pub name: String,
    /// Time-ordered, as maintained by the authoring tool
    pub keyframes: Vec<SourceKeyframe>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceAnimation {
    pub name: String,
    pub loop_mode: LoopMode,
    pub override_previous: bool,
    pub length: f64,
    /// Per-bone tracks in project order
    pub animators: Vec<(NodeId, SourceAnimator)>,
}

impl SourceAnimation {
    pub fn new(name: impl Into<String>, length: f64) -> Self {
        Self {
            name: name.into(),
            loop_mode: LoopMode::default(),
            override_previous: false,
            length,
            animators: Vec::new(),
        }
    }
}

/// Complete input of one compilation
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectSnapshot {
    pub name: String,
    pub geometry_name: Option<String>,
    /// Identifier of the authoring format (e.g. "free")
    pub model_format: String,
    /// Project uses box UV mode
    pub box_uv: bool,
    pub texture_width: Option<u32>,
    pub texture_height: Option<u32>,
    pub graph: SceneGraph,
    /// Declaration order; defines texture indices
    pub textures: Vec<SourceTexture>,
    pub animations: Vec<SourceAnimation>,
}

impl ProjectSnapshot {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            geometry_name: None,
            model_format: "free".to_owned(),
            box_uv: false,
            texture_width: None,
            texture_height: None,
            graph: SceneGraph::new(),
            textures: Vec::new(),
            animations: Vec::new(),
        }
    }

    /// Document name: geometry name, then project name, then a fallback
    pub fn model_name(&self) -> &str {
        self.geometry_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or_else(|| Some(self.name.as_str()).filter(|name| !name.is_empty()))
            .unwrap_or("unnamed_model")
    }

    /// Texture resolution; unset or zero dimensions fall back to 16
    pub fn resolution(&self) -> Resolution {
        let or_default = |size: Option<u32>| size.filter(|&s| s > 0).unwrap_or(DEFAULT_RESOLUTION);
        Resolution {
            width: or_default(self.texture_width),
            height: or_default(self.texture_height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(graph: &mut SceneGraph, id: &str, children: &[&str]) {
        let mut bone = BoneGroup::new(id);
        bone.children = children.iter().map(|&c| NodeId::from(c)).collect();
        graph.insert(id, SceneNode::BoneGroup(bone));
    }

    fn cube(graph: &mut SceneGraph, id: &str) {
        graph.insert(id, SceneNode::Cuboid(Cuboid::new(id, [0.0; 3], [1.0; 3])));
    }

    #[test]
    fn test_validate_accepts_forest() {
        let mut graph = SceneGraph::new();
        group(&mut graph, "body", &["head", "torso"]);
        group(&mut graph, "head", &["skull"]);
        cube(&mut graph, "skull");
        cube(&mut graph, "torso");
        group(&mut graph, "empty", &[]);
        graph.push_root("body");
        graph.push_root("empty");

        assert_eq!(graph.validate(), Ok(()));
        assert!(graph.is_bone(&NodeId::from("head")));
        assert!(!graph.is_bone(&NodeId::from("skull")));
    }

    #[test]
    fn test_validate_rejects_cycle() {
        let mut graph = SceneGraph::new();
        group(&mut graph, "a", &["b"]);
        group(&mut graph, "b", &["c"]);
        group(&mut graph, "c", &["a"]);
        graph.push_root("a");

        assert_eq!(
            graph.validate(),
            Err(StructuralError::Cycle(NodeId::from("a")))
        );
    }

    #[test]
    fn test_validate_rejects_self_loop() {
        let mut graph = SceneGraph::new();
        group(&mut graph, "a", &["a"]);
        graph.push_root("a");

        assert_eq!(
            graph.validate(),
            Err(StructuralError::Cycle(NodeId::from("a")))
        );
    }

    #[test]
    fn test_validate_rejects_missing_child() {
        let mut graph = SceneGraph::new();
        group(&mut graph, "arm", &["hand"]);
        graph.push_root("arm");

        assert_eq!(
            graph.validate(),
            Err(StructuralError::MissingNode {
                parent: "arm".into(),
                child: NodeId::from("hand"),
            })
        );
    }

    #[test]
    fn test_validate_rejects_missing_root() {
        let mut graph = SceneGraph::new();
        graph.push_root("ghost");

        assert!(matches!(
            graph.validate(),
            Err(StructuralError::MissingNode { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_shared_child() {
        let mut graph = SceneGraph::new();
        group(&mut graph, "left", &["cube"]);
        group(&mut graph, "right", &["cube"]);
        cube(&mut graph, "cube");
        graph.push_root("left");
        graph.push_root("right");

        assert_eq!(
            graph.validate(),
            Err(StructuralError::SharedNode(NodeId::from("cube")))
        );
    }

    #[test]
    fn test_validate_depth_guard() {
        let mut graph = SceneGraph::new();
        let depth = MAX_OUTLINER_DEPTH + 1;
        for level in 0..depth {
            let id = format!("bone{}", level);
            let children = if level + 1 < depth {
                vec![NodeId::from(format!("bone{}", level + 1))]
            } else {
                Vec::new()
            };
            let mut bone = BoneGroup::new(id.clone());
            bone.children = children;
            graph.insert(id, SceneNode::BoneGroup(bone));
        }
        graph.push_root("bone0");

        assert!(matches!(
            graph.validate(),
            Err(StructuralError::TooDeep { limit: MAX_OUTLINER_DEPTH, .. })
        ));
    }

    #[test]
    fn test_model_name_fallbacks() {
        let mut project = ProjectSnapshot::new("project");
        assert_eq!(project.model_name(), "project");

        project.geometry_name = Some("geometry".into());
        assert_eq!(project.model_name(), "geometry");

        project.geometry_name = Some(String::new());
        project.name = String::new();
        assert_eq!(project.model_name(), "unnamed_model");
    }

    #[test]
    fn test_resolution_defaults_to_16() {
        let mut project = ProjectSnapshot::new("p");
        assert_eq!(project.resolution(), Resolution { width: 16, height: 16 });

        project.texture_width = Some(64);
        project.texture_height = Some(0);
        assert_eq!(project.resolution(), Resolution { width: 64, height: 16 });
    }
}
