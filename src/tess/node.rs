//! Bintree node arena
//!
//! TriNodes live in a fixed-capacity arena and address each other by
//! handle, so the cyclic neighbor graph of the triangle trees never holds
//! references. The first entries are the permanent patch roots; everything
//! after them is pooled and recycled as trees split and merge.

use std::ops::{Index, IndexMut};

/// Handle into the node arena
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeIndex(u32);

impl NodeIndex {
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Binary triangle tree element
///
/// Children are either both present or both absent. `base_neighbor` faces
/// the hypotenuse; `left_neighbor` and `right_neighbor` face the legs.
#[derive(Clone, Copy, Debug, Default)]
pub struct TriNode {
    pub left_child: Option<NodeIndex>,
    pub right_child: Option<NodeIndex>,
    pub parent: Option<NodeIndex>,
    pub base_neighbor: Option<NodeIndex>,
    pub left_neighbor: Option<NodeIndex>,
    pub right_neighbor: Option<NodeIndex>,
    /// Start of this triangle's three positions in the vertex buffer
    pub vertex_slot: Option<u32>,
    /// Leaf written to its vertex slot this frame
    pub is_rendered: bool,
    /// Subtree needs no further tessellation work this frame
    pub is_tessellated: bool,
}

impl TriNode {
    pub fn is_leaf(&self) -> bool {
        self.left_child.is_none()
    }

    /// Back to initial state; required before a handle returns to the pool
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Fixed-capacity arena of TriNodes with a free list
///
/// Indices `0..root_count` are patch roots and are never released.
/// Exhaustion is not an error: `allocate` returns `None` and the caller
/// leaves its tree at the current refinement level for the frame.
pub struct NodePool {
    nodes: Vec<TriNode>,
    free: Vec<NodeIndex>,
    root_count: usize,
}

impl NodePool {
    pub fn new(root_count: usize, capacity: usize) -> Self {
        let nodes = vec![TriNode::default(); root_count + capacity];
        // Reversed so low handles come out first.
        let free = (root_count..root_count + capacity)
            .rev()
            .map(NodeIndex::new)
            .collect();
        Self {
            nodes,
            free,
            root_count,
        }
    }

    /// Lend a node, or `None` when the pool is exhausted
    pub fn allocate(&mut self) -> Option<NodeIndex> {
        self.free.pop()
    }

    /// Return a node to the pool, resetting it to initial state
    pub fn release(&mut self, handle: NodeIndex) {
        debug_assert!(handle.index() >= self.root_count, "patch roots are permanent");
        self.nodes[handle.index()].reset();
        self.free.push(handle);
    }

    /// Pooled nodes currently free
    pub fn available(&self) -> usize {
        self.free.len()
    }

    /// Pooled nodes currently lent out
    pub fn in_use(&self) -> usize {
        self.capacity() - self.free.len()
    }

    /// Pool capacity, excluding the permanent roots
    pub fn capacity(&self) -> usize {
        self.nodes.len() - self.root_count
    }
}

impl Index<NodeIndex> for NodePool {
    type Output = TriNode;

    fn index(&self, handle: NodeIndex) -> &TriNode {
        &self.nodes[handle.index()]
    }
}

impl IndexMut<NodeIndex> for NodePool {
    fn index_mut(&mut self, handle: NodeIndex) -> &mut TriNode {
        &mut self.nodes[handle.index()]
    }
}
