//! Terrain patches and the bintree split/merge machinery
//!
//! A patch covers a square of the heightmap with two right triangles that
//! share the square's diagonal. Tessellation refines each triangle by
//! binary splits along the altitude from the right angle. The diamond rule
//! keeps the mesh free of cracks: a triangle may only split cheaply when it
//! and its base neighbor share a hypotenuse, so splitting outside a diamond
//! first forces the neighbor to split, which can propagate across patch
//! seams.

use glam::{UVec2, Vec2, Vec3};

use crate::core::camera::Camera;
use crate::render::mesh::{TerrainMesh, TerrainVertex};
use crate::terrain::heightmap::Heightmap;
use crate::tess::node::{NodeIndex, NodePool};
use crate::tess::slots::VertexSlotPool;
use crate::tess::variance::VarianceTree;
use crate::tess::visibility;

/// Shared mutable state threaded through the per-frame recursions
pub(crate) struct TessContext<'a> {
    pub nodes: &'a mut NodePool,
    pub slots: &'a mut VertexSlotPool,
    pub mesh: &'a mut TerrainMesh,
    pub map: &'a Heightmap,
    pub eye: Vec3,
    pub frame_variance: f32,
    pub tolerance: f32,
}

impl TessContext<'_> {
    fn release_slot(&mut self, slot: u32) {
        self.mesh.clear_slot(slot);
        self.slots.release(slot);
    }
}

/// A square sub-region of the heightmap holding two bintree roots
pub struct Patch {
    origin: UVec2,
    size: u32,
    left_root: NodeIndex,
    right_root: NodeIndex,
    variance_left: VarianceTree,
    variance_right: VarianceTree,
    visible: bool,
}

impl Patch {
    pub(crate) fn new(
        origin: UVec2,
        size: u32,
        left_root: NodeIndex,
        right_root: NodeIndex,
        variance_depth: u32,
    ) -> Self {
        Self {
            origin,
            size,
            left_root,
            right_root,
            variance_left: VarianceTree::new(variance_depth),
            variance_right: VarianceTree::new(variance_depth),
            visible: false,
        }
    }

    /// Heightmap anchor of this patch
    pub fn origin(&self) -> UVec2 {
        self.origin
    }

    pub fn left_root(&self) -> NodeIndex {
        self.left_root
    }

    pub fn right_root(&self) -> NodeIndex {
        self.right_root
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub(crate) fn variance_left(&self) -> &VarianceTree {
        &self.variance_left
    }

    pub(crate) fn variance_right(&self) -> &VarianceTree {
        &self.variance_right
    }

    /// (left, right, apex) corners of the left root triangle
    pub(crate) fn left_corners(&self) -> [UVec2; 3] {
        let o = self.origin;
        let s = self.size;
        [o + UVec2::new(0, s), o + UVec2::new(s, 0), o]
    }

    /// (left, right, apex) corners of the right root triangle
    pub(crate) fn right_corners(&self) -> [UVec2; 3] {
        let o = self.origin;
        let s = self.size;
        [o + UVec2::new(s, 0), o + UVec2::new(0, s), o + UVec2::new(s, s)]
    }

    /// Clear per-frame visibility
    pub fn reset(&mut self) {
        self.visible = false;
    }

    /// Re-test this patch against the camera heading
    pub fn set_visibility(&mut self, camera: &Camera) {
        let half = self.size as f32 / 2.0;
        let center = Vec2::new(self.origin.x as f32 + half, self.origin.y as f32 + half);
        self.visible = visibility::patch_in_view(center, camera);
    }

    /// Rebuild both variance trees from the heightmap
    pub fn compute_variance(&mut self, map: &Heightmap) {
        let [left, right, apex] = self.left_corners();
        self.variance_left.compute(map, left, right, apex);
        let [left, right, apex] = self.right_corners();
        self.variance_right.compute(map, left, right, apex);
    }

    /// Split and merge this patch's trees for the current view
    pub(crate) fn tessellate(&self, ctx: &mut TessContext<'_>) {
        let [left, right, apex] = self.left_corners();
        recurs_tessellate(ctx, &self.variance_left, self.left_root, left, right, apex, 1);
        let [left, right, apex] = self.right_corners();
        recurs_tessellate(ctx, &self.variance_right, self.right_root, left, right, apex, 1);
    }

    /// Emit this patch's leaf triangles into the output mesh
    pub(crate) fn render(&self, ctx: &mut TessContext<'_>) {
        let [left, right, apex] = self.left_corners();
        recurs_render(ctx, self.left_root, left, right, apex);
        let [left, right, apex] = self.right_corners();
        recurs_render(ctx, self.right_root, left, right, apex);
    }
}

/// Force `tri` to have children while preserving the diamond invariant
pub(crate) fn split(ctx: &mut TessContext<'_>, tri: NodeIndex) {
    if ctx.nodes[tri].left_child.is_some() {
        return;
    }

    // Not in a diamond: the base neighbor must split first. Its split
    // rewires our base link to the child that faces us.
    if let Some(base) = ctx.nodes[tri].base_neighbor {
        if ctx.nodes[base].base_neighbor != Some(tri) {
            split(ctx, base);
        }
    }

    // Pool exhaustion aborts the split; the tree stays at this level.
    let Some(left_child) = ctx.nodes.allocate() else {
        return;
    };
    let Some(right_child) = ctx.nodes.allocate() else {
        ctx.nodes.release(left_child);
        return;
    };

    // A split triangle no longer owns an output triangle, and neither does
    // any ancestor that claimed its subtree was fully emitted or settled.
    if ctx.nodes[tri].is_rendered {
        if let Some(slot) = ctx.nodes[tri].vertex_slot.take() {
            ctx.release_slot(slot);
        }
        ctx.nodes[tri].is_rendered = false;
        clear_rendered_above(ctx.nodes, tri);
    }
    ctx.nodes[tri].is_tessellated = false;
    clear_tessellated_above(ctx.nodes, tri);

    let left_neighbor = ctx.nodes[tri].left_neighbor;
    let right_neighbor = ctx.nodes[tri].right_neighbor;

    ctx.nodes[tri].left_child = Some(left_child);
    ctx.nodes[tri].right_child = Some(right_child);

    {
        let node = &mut ctx.nodes[left_child];
        node.parent = Some(tri);
        node.base_neighbor = left_neighbor;
        node.left_neighbor = Some(right_child);
    }
    {
        let node = &mut ctx.nodes[right_child];
        node.parent = Some(tri);
        node.base_neighbor = right_neighbor;
        node.right_neighbor = Some(left_child);
    }

    // Our leg neighbors now border the children instead of us.
    if let Some(neighbor) = left_neighbor {
        replace_neighbor(ctx.nodes, neighbor, tri, left_child);
    }
    if let Some(neighbor) = right_neighbor {
        replace_neighbor(ctx.nodes, neighbor, tri, right_child);
    }

    // Re-read: the forced split above may have rewired our base link.
    match ctx.nodes[tri].base_neighbor {
        Some(base) => {
            if let (Some(base_left), Some(base_right)) =
                (ctx.nodes[base].left_child, ctx.nodes[base].right_child)
            {
                // Diamond partner is split: cross-wire the four children
                // along the shared hypotenuse.
                ctx.nodes[base_left].right_neighbor = Some(right_child);
                ctx.nodes[base_right].left_neighbor = Some(left_child);
                ctx.nodes[left_child].right_neighbor = Some(base_right);
                ctx.nodes[right_child].left_neighbor = Some(base_left);
            } else {
                // The other half of the diamond splits with us; it sees our
                // children and cross-wires from its side.
                split(ctx, base);
            }
        }
        None => {
            // Patch edge: nothing across the new hypotenuse halves.
            ctx.nodes[left_child].right_neighbor = None;
            ctx.nodes[right_child].left_neighbor = None;
        }
    }
}

/// A node can merge when its children are both leaves; a merge releases
/// exactly those two children
pub(crate) fn mergable(nodes: &NodePool, tri: NodeIndex) -> bool {
    match (nodes[tri].left_child, nodes[tri].right_child) {
        (Some(left), Some(right)) => nodes[left].is_leaf() && nodes[right].is_leaf(),
        _ => false,
    }
}

/// Collapse `tri`'s children back into it
pub(crate) fn merge(ctx: &mut TessContext<'_>, tri: NodeIndex) {
    let (Some(left_child), Some(right_child)) =
        (ctx.nodes[tri].left_child, ctx.nodes[tri].right_child)
    else {
        return;
    };

    // A child's base neighbor borders the merged parent from now on.
    for (child, is_left) in [(left_child, true), (right_child, false)] {
        let Some(base) = ctx.nodes[child].base_neighbor else {
            continue;
        };
        let was_base_of_child = ctx.nodes[base].base_neighbor == Some(child);
        replace_neighbor(ctx.nodes, base, child, tri);

        if was_base_of_child {
            if let Some(base_parent) = ctx.nodes[base].parent {
                // The seam link on our side may still point at the
                // neighbor's parent from before its split.
                if is_left {
                    if ctx.nodes[tri].left_neighbor == Some(base_parent) {
                        ctx.nodes[tri].left_neighbor = Some(base);
                    }
                } else if ctx.nodes[tri].right_neighbor == Some(base_parent) {
                    ctx.nodes[tri].right_neighbor = Some(base);
                }
                replace_neighbor(ctx.nodes, base_parent, child, tri);
            }
        }
    }

    for child in [left_child, right_child] {
        if ctx.nodes[child].is_rendered {
            if let Some(slot) = ctx.nodes[child].vertex_slot.take() {
                ctx.release_slot(slot);
            }
            clear_rendered_above(ctx.nodes, child);
        }
        ctx.nodes.release(child);
    }

    ctx.nodes[tri].left_child = None;
    ctx.nodes[tri].right_child = None;
}

/// Merge a subtree back toward `tri`, one level per call, never past the
/// point where a merge would open a crack
pub(crate) fn merge_down(ctx: &mut TessContext<'_>, tri: NodeIndex) {
    let (Some(left_child), Some(right_child)) =
        (ctx.nodes[tri].left_child, ctx.nodes[tri].right_child)
    else {
        return;
    };

    if mergable(ctx.nodes, tri) {
        match ctx.nodes[tri].base_neighbor {
            None => merge(ctx, tri),
            Some(base) => {
                // Diamond partners merge together or not at all.
                if mergable(ctx.nodes, base) {
                    merge(ctx, base);
                    merge(ctx, tri);
                }
            }
        }
    } else {
        merge_down(ctx, left_child);
        merge_down(ctx, right_child);
    }
}

fn recurs_tessellate(
    ctx: &mut TessContext<'_>,
    variance: &VarianceTree,
    tri: NodeIndex,
    left: UVec2,
    right: UVec2,
    apex: UVec2,
    node: usize,
) {
    let center = (left + right) / 2;

    // View-scaled variance of this triangle, while the tree still covers it.
    let mut tri_variance = 0.0;
    if node < variance.limit() && variance.get(node) > 1 {
        let world = Vec3::new(
            center.x as f32,
            ctx.map.height_at(center) as f32,
            center.y as f32,
        );
        let distance = 1.0 + world.distance(ctx.eye);
        tri_variance = variance.get(node) as f32 * ctx.map.size() as f32 * 2.0 / distance;
    }

    let wants_split = node >= variance.limit() || tri_variance > ctx.frame_variance + ctx.tolerance;
    if !ctx.nodes[tri].is_tessellated && wants_split {
        split(ctx, tri);

        // Stop descending once the triangle is a few samples across.
        let coarse = left.x.abs_diff(right.x) >= 3 || left.y.abs_diff(right.y) >= 3;
        if let (Some(left_child), Some(right_child)) =
            (ctx.nodes[tri].left_child, ctx.nodes[tri].right_child)
        {
            if coarse {
                recurs_tessellate(ctx, variance, left_child, apex, left, center, node * 2);
                recurs_tessellate(ctx, variance, right_child, right, apex, center, node * 2 + 1);
            }
        }
    } else if tri_variance < ctx.frame_variance - ctx.tolerance
        && ctx.nodes[tri].left_child.is_some()
        && ctx.nodes[tri].is_rendered
    {
        merge_down(ctx, tri);
    }

    // A subtree is settled when both halves are; past the variance data
    // there is nothing left to decide.
    let settled = match (ctx.nodes[tri].left_child, ctx.nodes[tri].right_child) {
        (Some(left_child), Some(right_child)) => {
            ctx.nodes[left_child].is_tessellated && ctx.nodes[right_child].is_tessellated
        }
        _ => false,
    };
    if settled || node >= variance.limit() {
        ctx.nodes[tri].is_tessellated = true;
    }
}

fn recurs_render(ctx: &mut TessContext<'_>, tri: NodeIndex, left: UVec2, right: UVec2, apex: UVec2) {
    if ctx.nodes[tri].is_rendered {
        return;
    }

    if let (Some(left_child), Some(right_child)) =
        (ctx.nodes[tri].left_child, ctx.nodes[tri].right_child)
    {
        let center = (left + right) / 2;
        recurs_render(ctx, left_child, apex, left, center);
        recurs_render(ctx, right_child, right, apex, center);
        if ctx.nodes[left_child].is_rendered && ctx.nodes[right_child].is_rendered {
            ctx.nodes[tri].is_rendered = true;
        }
    } else {
        // No free slot: skip this leaf for the frame; its parent subtree
        // stays unrendered and retries next frame.
        let Some(slot) = ctx.slots.acquire() else {
            return;
        };
        ctx.mesh.write_slot(
            slot,
            [
                vertex_at(ctx.map, left),
                vertex_at(ctx.map, right),
                vertex_at(ctx.map, apex),
            ],
        );
        let node = &mut ctx.nodes[tri];
        node.vertex_slot = Some(slot);
        node.is_rendered = true;
    }
}

/// Grid sample to output space: grid x/y become world X/Z, height becomes Y
fn vertex_at(map: &Heightmap, p: UVec2) -> TerrainVertex {
    TerrainVertex::new(p.x as f32, map.height_at(p) as f32, p.y as f32)
}

/// Rewrite whichever of `node`'s neighbor links points at `from` to `to`
fn replace_neighbor(nodes: &mut NodePool, node: NodeIndex, from: NodeIndex, to: NodeIndex) {
    let n = &mut nodes[node];
    if n.base_neighbor == Some(from) {
        n.base_neighbor = Some(to);
    }
    if n.left_neighbor == Some(from) {
        n.left_neighbor = Some(to);
    }
    if n.right_neighbor == Some(from) {
        n.right_neighbor = Some(to);
    }
}

fn clear_rendered_above(nodes: &mut NodePool, tri: NodeIndex) {
    let mut cursor = nodes[tri].parent;
    while let Some(node) = cursor {
        nodes[node].is_rendered = false;
        cursor = nodes[node].parent;
    }
}

fn clear_tessellated_above(nodes: &mut NodePool, tri: NodeIndex) {
    let mut cursor = nodes[tri].parent;
    while let Some(node) = cursor {
        nodes[node].is_tessellated = false;
        cursor = nodes[node].parent;
    }
}
