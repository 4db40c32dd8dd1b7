//! Bone tree compiler (outliner -> nested bones)
//!
//! Depth-first, pre-order walk of the validated outliner. Sibling order in the
//! output matches the source exactly; runtimes may address children by
//! position.

use hephaestus_shared::formats::{Bone, OutlinerNode};

use crate::error::{CompatibilityWarning, CompileResult, StructuralError};
use crate::geometry::{compact_rotation, resolve_element, rotation_warnings};
use crate::scene::{NodeId, SceneGraph, SceneNode};
use crate::texture::TextureIndexer;

/// Result of compiling the outliner
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledOutliner {
    /// Root entries in outliner order
    pub roots: Vec<OutlinerNode>,
    pub bone_count: usize,
    pub element_count: usize,
    pub warnings: Vec<CompatibilityWarning>,
}

/// Compile the outliner of `graph` into the document's bone tree
///
/// The graph is validated first; cyclic or otherwise malformed outliners are
/// rejected before any node is visited.
pub fn compile_outliner(graph: &SceneGraph, textures: &TextureIndexer) -> CompileResult<CompiledOutliner> {
    graph.validate()?;

    let mut compiler = OutlinerCompiler {
        graph,
        textures,
        bone_count: 0,
        element_count: 0,
        warnings: Vec::new(),
    };

    let mut roots = Vec::with_capacity(graph.roots().len());
    for id in graph.roots() {
        compiler.compile_node(id, None, &mut roots)?;
    }

    tracing::debug!(
        "Compiled outliner: {} bones, {} elements",
        compiler.bone_count,
        compiler.element_count
    );

    Ok(CompiledOutliner {
        roots,
        bone_count: compiler.bone_count,
        element_count: compiler.element_count,
        warnings: compiler.warnings,
    })
}

struct OutlinerCompiler<'a> {
    graph: &'a SceneGraph,
    textures: &'a TextureIndexer,
    bone_count: usize,
    element_count: usize,
    warnings: Vec<CompatibilityWarning>,
}

impl OutlinerCompiler<'_> {
    /// Compile `id` and append the result to `out`
    ///
    /// Recursion depth is bounded by `SceneGraph::validate`.
    fn compile_node(
        &mut self,
        id: &NodeId,
        parent: Option<&str>,
        out: &mut Vec<OutlinerNode>,
    ) -> CompileResult<()> {
        let node = self
            .graph
            .get(id)
            .ok_or_else(|| StructuralError::MissingNode {
                parent: parent.unwrap_or("outliner root").to_owned(),
                child: id.clone(),
            })?;

        match node {
            SceneNode::BoneGroup(group) => {
                let mut children = Vec::with_capacity(group.children.len());
                for child in &group.children {
                    self.compile_node(child, Some(id.as_str()), &mut children)?;
                }
                self.bone_count += 1;
                out.push(OutlinerNode::Bone(Bone {
                    name: group.name.clone(),
                    uuid: id.as_str().to_owned(),
                    origin: group.origin,
                    rotation: compact_rotation(group.rotation),
                    children,
                }));
            }
            SceneNode::Cuboid(cuboid) => {
                if parent.is_none() {
                    self.warnings.push(CompatibilityWarning::RootElement {
                        element: cuboid.name.clone(),
                    });
                }
                self.warnings.extend(rotation_warnings(cuboid));
                self.element_count += 1;
                out.push(OutlinerNode::Element(resolve_element(cuboid, self.textures)?));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CompileError, ReferenceError};
    use crate::scene::{BoneGroup, Cuboid, SourceFace};
    use hephaestus_shared::formats::FaceKey;

    fn add_group(graph: &mut SceneGraph, id: &str, children: &[&str]) {
        let mut bone = BoneGroup::new(id);
        bone.children = children.iter().map(|&c| NodeId::from(c)).collect();
        graph.insert(id, SceneNode::BoneGroup(bone));
    }

    fn add_cube(graph: &mut SceneGraph, id: &str) {
        graph.insert(id, SceneNode::Cuboid(Cuboid::new(id, [0.0; 3], [1.0; 3])));
    }

    /// Names of the compiled tree, walked independently of the compiler
    fn shape(nodes: &[OutlinerNode]) -> Vec<String> {
        nodes
            .iter()
            .map(|node| match node {
                OutlinerNode::Bone(bone) => {
                    format!("{}({})", bone.name, shape(&bone.children).join(","))
                }
                OutlinerNode::Element(element) => format!("cube@{}", element.to[0]),
            })
            .collect()
    }

    fn graph_shape(graph: &SceneGraph, ids: &[NodeId]) -> Vec<String> {
        ids.iter()
            .map(|id| match graph.get(id).unwrap() {
                SceneNode::BoneGroup(group) => {
                    format!("{}({})", group.name, graph_shape(graph, &group.children).join(","))
                }
                SceneNode::Cuboid(cuboid) => format!("cube@{}", cuboid.to[0]),
            })
            .collect()
    }

    #[test]
    fn test_preserves_order_and_depth() {
        let mut graph = SceneGraph::new();
        add_group(&mut graph, "body", &["c1", "head", "c2", "legs"]);
        add_group(&mut graph, "head", &["c3", "hat"]);
        add_group(&mut graph, "hat", &[]);
        add_group(&mut graph, "legs", &["left", "right"]);
        add_group(&mut graph, "left", &["c4"]);
        add_group(&mut graph, "right", &["c5"]);
        for (i, id) in ["c1", "c2", "c3", "c4", "c5"].iter().enumerate() {
            let mut cube = Cuboid::new(*id, [0.0; 3], [i as f64 + 1.0; 3]);
            cube.origin = [0.0; 3];
            graph.insert(*id, SceneNode::Cuboid(cube));
        }
        add_group(&mut graph, "tail", &[]);
        graph.push_root("body");
        graph.push_root("tail");

        let compiled = compile_outliner(&graph, &TextureIndexer::default()).unwrap();

        assert_eq!(shape(&compiled.roots), graph_shape(&graph, graph.roots()));
        assert_eq!(compiled.bone_count, 7);
        assert_eq!(compiled.element_count, 5);
        assert!(compiled.warnings.is_empty());
    }

    #[test]
    fn test_bone_fields_and_typed_children() {
        let mut graph = SceneGraph::new();
        let mut root = BoneGroup::new("root");
        root.origin = [0.0, 24.0, 0.0];
        root.rotation = [0.0, 0.0, 0.0];
        root.children = vec![NodeId::from("cube"), NodeId::from("arm")];
        graph.insert("root-uuid", SceneNode::BoneGroup(root));
        add_cube(&mut graph, "cube");
        let mut arm = BoneGroup::new("arm");
        arm.rotation = [0.0, 0.0, 15.0];
        graph.insert("arm", SceneNode::BoneGroup(arm));
        graph.push_root("root-uuid");

        let compiled = compile_outliner(&graph, &TextureIndexer::default()).unwrap();
        let OutlinerNode::Bone(root) = &compiled.roots[0] else {
            panic!("expected bone at root");
        };

        assert_eq!(root.name, "root");
        assert_eq!(root.uuid, "root-uuid");
        assert_eq!(root.origin, [0.0, 24.0, 0.0]);
        assert_eq!(root.rotation, None);
        assert_eq!(root.elements().count(), 1);
        let arm = root.bones().next().unwrap();
        assert_eq!(arm.rotation, Some([0.0, 0.0, 15.0]));
        assert!(arm.children.is_empty());
    }

    #[test]
    fn test_empty_bone_is_kept() {
        let mut graph = SceneGraph::new();
        add_group(&mut graph, "empty", &[]);
        graph.push_root("empty");

        let compiled = compile_outliner(&graph, &TextureIndexer::default()).unwrap();
        assert_eq!(shape(&compiled.roots), ["empty()"]);
    }

    #[test]
    fn test_cycle_rejected_before_traversal() {
        let mut graph = SceneGraph::new();
        add_group(&mut graph, "a", &["b"]);
        add_group(&mut graph, "b", &["a"]);
        graph.push_root("a");

        let err = compile_outliner(&graph, &TextureIndexer::default()).unwrap_err();
        assert!(matches!(
            err,
            CompileError::Structural(StructuralError::Cycle(_))
        ));
    }

    #[test]
    fn test_root_element_warns() {
        let mut graph = SceneGraph::new();
        add_cube(&mut graph, "floating");
        graph.push_root("floating");

        let compiled = compile_outliner(&graph, &TextureIndexer::default()).unwrap();
        assert_eq!(
            compiled.warnings,
            vec![CompatibilityWarning::RootElement {
                element: "floating".into()
            }]
        );
        assert!(matches!(compiled.roots[0], OutlinerNode::Element(_)));
    }

    #[test]
    fn test_unknown_texture_aborts() {
        let mut graph = SceneGraph::new();
        let mut cube = Cuboid::new("cube", [0.0; 3], [1.0; 3]);
        cube.faces
            .insert(FaceKey::Up, SourceFace::new([0.0; 4]).with_texture("missing"));
        graph.insert("cube", SceneNode::Cuboid(cube));
        add_group(&mut graph, "root", &["cube"]);
        graph.push_root("root");

        let err = compile_outliner(&graph, &TextureIndexer::default()).unwrap_err();
        assert!(matches!(
            err,
            CompileError::Reference(ReferenceError::UnknownTexture { .. })
        ));
    }
}
