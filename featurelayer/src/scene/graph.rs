//! Arena-backed scene graph.
//!
//! Nodes live in a slab and are addressed by generational handles, so a
//! handle held across an asynchronous gap (a fetch completion arriving after
//! its tile was dropped) fails lookups instead of aliasing a reused slot.
//!
//! The graph is the single-writer stand-in for the external spatial index:
//! all mutation happens from the host loop that drives updates and
//! completions. A multi-threaded host must serialize access per tile.

use glam::{DMat4, DVec3};
use slab::Slab;

use super::node::SceneNode;

/// Generational handle to a scene node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

/// Arena of scene nodes with parent/child links and cached world transforms.
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: Slab<SceneNode>,
    generations: Vec<u32>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn is_valid(&self, id: NodeId) -> bool {
        self.generations.get(id.index as usize) == Some(&id.generation)
            && self.nodes.contains(id.index as usize)
    }

    /// Whether the handle still refers to a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.is_valid(id)
    }

    /// Insert a node, optionally attaching it under `parent`.
    pub fn insert(&mut self, node: SceneNode, parent: Option<NodeId>) -> NodeId {
        let index = self.nodes.insert(node);
        if index >= self.generations.len() {
            self.generations.resize(index + 1, 0);
        }
        let id = NodeId {
            index: index as u32,
            generation: self.generations[index],
        };
        if let Some(parent) = parent {
            self.attach(id, parent);
        }
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        if !self.is_valid(id) {
            return None;
        }
        self.nodes.get(id.index as usize)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        if !self.is_valid(id) {
            return None;
        }
        self.nodes.get_mut(id.index as usize)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|node| node.children.as_slice()).unwrap_or(&[])
    }

    /// Attach `child` under `parent`, detaching it from any previous parent
    /// first: a node never hangs under two parents.
    pub fn attach(&mut self, child: NodeId, parent: NodeId) {
        if !self.is_valid(child) || !self.is_valid(parent) || child == parent {
            return;
        }
        self.detach(child);
        self.nodes[parent.index as usize].children.push(child);
        self.nodes[child.index as usize].parent = Some(parent);
        self.mark_world_dirty(child);
    }

    /// Detach `child` from its parent, leaving it parentless but alive.
    pub fn detach(&mut self, child: NodeId) {
        let Some(parent) = self.parent(child) else {
            return;
        };
        self.nodes[parent.index as usize]
            .children
            .retain(|c| *c != child);
        self.nodes[child.index as usize].parent = None;
        self.mark_world_dirty(child);
    }

    /// Remove a node and every descendant from the arena, returning the
    /// number of nodes dropped. Their handles become stale.
    pub fn remove_subtree(&mut self, id: NodeId) -> usize {
        if !self.is_valid(id) {
            return 0;
        }
        self.detach(id);
        let mut removed = 0;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.try_remove(current.index as usize) {
                self.generations[current.index as usize] += 1;
                removed += 1;
                stack.extend(node.children);
            }
        }
        removed
    }

    /// All descendants of `id` in depth-first order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend_from_slice(self.children(current));
        }
        out
    }

    /// World matrix of a node, computed from the live parent chain.
    pub fn compute_world(&self, id: NodeId) -> Option<DMat4> {
        let mut matrix = self.get(id)?.transform.to_matrix();
        let mut current = self.parent(id);
        while let Some(ancestor) = current {
            matrix = self.get(ancestor)?.transform.to_matrix() * matrix;
            current = self.parent(ancestor);
        }
        Some(matrix)
    }

    /// Convert a point from world coordinates into `id`'s local frame.
    pub fn world_to_local(&self, id: NodeId, point: DVec3) -> Option<DVec3> {
        self.compute_world(id)
            .map(|world| world.inverse().transform_point3(point))
    }

    /// Flag a subtree's cached world matrices as stale.
    pub fn mark_world_dirty(&mut self, id: NodeId) {
        if !self.is_valid(id) {
            return;
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(current.index as usize) {
                node.world_dirty = true;
                stack.extend_from_slice(&node.children);
            }
        }
    }

    /// Recompute cached world matrices for `id` and its descendants.
    ///
    /// Attaching children changes their world positions; cached matrices do
    /// not reflect that until this runs.
    pub fn update_matrix_world(&mut self, id: NodeId) {
        if !self.is_valid(id) {
            return;
        }
        let base = match self.parent(id) {
            Some(parent) => self.compute_world(parent).unwrap_or(DMat4::IDENTITY),
            None => DMat4::IDENTITY,
        };
        let mut stack = vec![(id, base)];
        while let Some((current, parent_world)) = stack.pop() {
            let Some(node) = self.nodes.get_mut(current.index as usize) else {
                continue;
            };
            node.world = parent_world * node.transform.to_matrix();
            node.world_dirty = false;
            let world = node.world;
            for child in node.children.clone() {
                stack.push((child, world));
            }
        }
    }
}
