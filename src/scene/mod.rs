pub mod body;
pub mod raycast;

use std::{collections::BTreeMap, sync::Arc};

use glam::{Affine3A, Vec3A};
use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};

use crate::catalog::Prototype;

use self::body::{ConstraintId, FixedConstraint, RigidBody};

/// Default collision layer for freshly spawned nodes.
pub const LAYER_DEFAULT: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MaterialId(pub usize);

#[derive(Debug, Clone)]
pub struct Material {
    pub name: Arc<str>,
    pub base_color: [f32; 4],
    pub translucent: bool,
}

impl Material {
    pub fn solid(name: &str, base_color: [f32; 4]) -> Self {
        Self {
            name: name.into(),
            base_color,
            translucent: false,
        }
    }

    pub fn tinted(name: &str, base_color: [f32; 4]) -> Self {
        Self {
            name: name.into(),
            base_color,
            translucent: true,
        }
    }
}

/// A renderable surface: one or more material slots on a node.
#[derive(Debug, Clone)]
pub struct MeshVisual {
    pub materials: SmallVec<[MaterialId; 4]>,
    pub enabled: bool,
}

impl MeshVisual {
    pub fn with_materials(ids: &[MaterialId]) -> Self {
        Self {
            materials: SmallVec::from_slice(ids),
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ColliderShape {
    Sphere { radius: f32 },
    Cuboid { half_extents: Vec3A },
}

impl ColliderShape {
    /// Vertical half-extent, used to rest a shape flush on a surface.
    pub fn half_height(&self) -> f32 {
        match self {
            ColliderShape::Sphere { radius } => *radius,
            ColliderShape::Cuboid { half_extents } => half_extents.y,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Collider {
    pub shape: ColliderShape,
    pub enabled: bool,
}

impl Collider {
    pub fn new(shape: ColliderShape) -> Self {
        Self {
            shape,
            enabled: true,
        }
    }
}

pub struct SceneNode {
    pub id: NodeId,
    pub name: Arc<str>,
    pub parent: Option<NodeId>,
    pub transform: Affine3A,
    pub tag: Option<Arc<str>>,
    pub layers: u32,
    pub collider: Option<Collider>,
    pub body: Option<RigidBody>,
    pub mesh: Option<MeshVisual>,
}

impl SceneNode {
    pub fn named(name: impl Into<Arc<str>>) -> Self {
        Self {
            id: NodeId(usize::MAX), // assigned on spawn
            name: name.into(),
            parent: None,
            transform: Affine3A::IDENTITY,
            tag: None,
            layers: LAYER_DEFAULT,
            collider: None,
            body: None,
            mesh: None,
        }
    }
}

/// Id-addressed node arena plus the material registry and constraint set.
///
/// Ids are monotonically increasing and never reused, so a handle kept
/// across a despawn stays observable: `get` simply returns `None`.
pub struct Scene {
    nodes: BTreeMap<NodeId, SceneNode>,
    materials: Vec<Material>,
    pub(crate) constraints: BTreeMap<ConstraintId, FixedConstraint>,
    pub gravity: Vec3A,
    next_node: usize,
    pub(crate) next_constraint: usize,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            materials: Vec::new(),
            constraints: BTreeMap::new(),
            gravity: Vec3A::new(0.0, -9.81, 0.0),
            next_node: 0,
            next_constraint: 0,
        }
    }

    pub fn spawn(&mut self, mut node: SceneNode) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        node.id = id;
        self.nodes.insert(id, node);
        id
    }

    pub fn despawn(&mut self, id: NodeId) -> bool {
        self.nodes.remove(&id).is_some()
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &SceneNode> {
        self.nodes.values()
    }

    pub(crate) fn nodes_mut(&mut self) -> impl Iterator<Item = &mut SceneNode> {
        self.nodes.values_mut()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn count_named(&self, name: &str) -> usize {
        self.nodes
            .values()
            .filter(|n| n.name.as_ref() == name)
            .count()
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0)
    }

    /// Direct children of `id`, in creation order.
    pub fn children(&self, id: NodeId) -> SmallVec<[NodeId; 8]> {
        self.nodes
            .values()
            .filter(|n| n.parent == Some(id))
            .map(|n| n.id)
            .collect()
    }

    /// All enabled renderable surfaces at or below `root`, depth-first,
    /// children in creation order. Deterministic so callers can compare
    /// surface sets by identity sequence across steps.
    pub fn collect_surfaces(&self, root: NodeId) -> SmallVec<[NodeId; 8]> {
        let mut out = smallvec![];
        let mut stack: Vec<NodeId> = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.get(id) else { continue };
            if let Some(mesh) = &node.mesh {
                if mesh.enabled {
                    out.push(id);
                }
            }
            let mut kids = self.children(id);
            kids.reverse();
            stack.extend(kids);
        }
        out
    }

    /// Spawn a fully physical instance of a catalog prototype.
    pub fn instantiate(&mut self, proto: &Prototype, transform: Affine3A) -> NodeId {
        let mut node = SceneNode::named(proto.name.clone());
        node.transform = transform;
        node.tag = proto.tag.clone();
        node.layers = proto.layers;
        node.collider = Some(Collider::new(proto.collider));
        node.body = Some(RigidBody::dynamic(proto.mass));
        node.mesh = Some(MeshVisual {
            materials: proto.materials.iter().copied().collect(),
            enabled: true,
        });
        self.spawn(node)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn despawned_ids_are_not_reused() {
        let mut scene = Scene::new();
        let a = scene.spawn(SceneNode::named("a"));
        assert!(scene.despawn(a));
        let b = scene.spawn(SceneNode::named("b"));
        assert_ne!(a, b);
        assert!(scene.get(a).is_none());
        assert!(scene.get(b).is_some());
    }

    #[test]
    fn collect_surfaces_is_depth_first_and_skips_disabled() {
        let mut scene = Scene::new();
        let mat = scene.add_material(Material::solid("grey", [0.5, 0.5, 0.5, 1.0]));

        let mut root = SceneNode::named("root");
        root.mesh = Some(MeshVisual::with_materials(&[mat]));
        let root = scene.spawn(root);

        let mut child_a = SceneNode::named("a");
        child_a.parent = Some(root);
        child_a.mesh = Some(MeshVisual::with_materials(&[mat]));
        let child_a = scene.spawn(child_a);

        let mut child_b = SceneNode::named("b");
        child_b.parent = Some(root);
        child_b.mesh = Some(MeshVisual {
            materials: smallvec![mat],
            enabled: false,
        });
        scene.spawn(child_b);

        let mut grandchild = SceneNode::named("aa");
        grandchild.parent = Some(child_a);
        grandchild.mesh = Some(MeshVisual::with_materials(&[mat]));
        let grandchild = scene.spawn(grandchild);

        let surfaces = scene.collect_surfaces(root);
        assert_eq!(surfaces.as_slice(), &[root, child_a, grandchild]);
    }
}
