/// Scene nodes and the index-addressed pool that owns them
use crate::geometry::Mesh;
use crate::material::Material;
use crate::transform::Transform;

/// Handle to a slot in a [`NodePool`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Renderable object: transform, geometry and material
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub transform: Transform,
    pub mesh: Mesh,
    pub material: Material,
    /// Cached `mesh.bounding_radius()`, refreshed by `set_mesh`
    bounds: f32,
}

impl SceneNode {
    pub fn new(name: &str, transform: Transform, mesh: Mesh, material: Material) -> Self {
        let bounds = mesh.bounding_radius();
        Self {
            name: name.to_string(),
            transform,
            mesh,
            material,
            bounds,
        }
    }

    pub fn set_mesh(&mut self, mesh: Mesh) {
        self.bounds = mesh.bounding_radius();
        self.mesh = mesh;
    }

    /// Local-space bounding radius, widened by the largest scale component
    pub fn world_bounds(&self) -> f32 {
        let s = self.transform.scale;
        self.bounds * s.x.abs().max(s.y.abs()).max(s.z.abs())
    }
}

/// One slot per mounted primitive. A slot can be reserved before its node
/// is attached, and per-frame updates skip empty slots.
#[derive(Debug, Default)]
pub struct NodePool {
    slots: Vec<Option<SceneNode>>,
}

impl NodePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: SceneNode) -> NodeId {
        self.slots.push(Some(node));
        NodeId(self.slots.len() - 1)
    }

    /// Reserve a slot without a node yet
    pub fn reserve(&mut self) -> NodeId {
        self.slots.push(None);
        NodeId(self.slots.len() - 1)
    }

    /// Fill (or replace) a slot. Returns the previous node, if any.
    pub fn attach(&mut self, id: NodeId, node: SceneNode) -> Option<SceneNode> {
        let slot = self.slots.get_mut(id.0)?;
        slot.replace(node)
    }

    pub fn detach(&mut self, id: NodeId) -> Option<SceneNode> {
        self.slots.get_mut(id.0)?.take()
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.slots.get(id.0)?.as_ref()
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.slots.get_mut(id.0)?.as_mut()
    }

    /// Attached nodes with their ids
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|n| (NodeId(i), n)))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
