//! The landscape engine
//!
//! Owns the patch grid, the node and slot pools, and the output mesh, and
//! runs the per-frame pipeline: reset visibility, tessellate visible
//! patches, render their leaves, then retune the frame variance toward the
//! triangle budget. Everything is single-threaded and synchronous; a frame
//! never fails, it only degrades detail when pools run dry.

use glam::{UVec2, Vec3};

use crate::core::camera::Camera;
use crate::core::error::Error;
use crate::core::types::Result;
use crate::render::mesh::TerrainMesh;
use crate::terrain::heightmap::Heightmap;
use crate::tess::config::TessConfig;
use crate::tess::node::{NodeIndex, NodePool};
use crate::tess::patch::{Patch, TessContext};
use crate::tess::slots::VertexSlotPool;

/// Initial split/merge threshold; the controller adjusts it every frame
const INITIAL_FRAME_VARIANCE: f32 = 50.0;

/// Per-frame engine counters
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameStats {
    pub triangles_rendered: usize,
    pub visible_patches: usize,
    pub nodes_in_use: usize,
    pub free_slots: usize,
    pub frame_variance: f32,
}

/// The tessellation engine: a grid of patches over one heightmap
pub struct Landscape {
    config: TessConfig,
    map: Heightmap,
    patches: Vec<Patch>,
    nodes: NodePool,
    slots: VertexSlotPool,
    mesh: TerrainMesh,
    camera: Camera,
    frame_variance: f32,
    visible_count: usize,
}

impl Landscape {
    /// Build the engine over a loaded heightmap. Fatal on configuration or
    /// size mismatch; per-frame calls never fail after this.
    pub fn new(config: TessConfig, map: Heightmap) -> Result<Self> {
        config.validate()?;
        if map.size() != config.map_size {
            return Err(Error::Config(format!(
                "heightmap is {} per side, config expects {}",
                map.size(),
                config.map_size
            )));
        }

        let per_side = config.patches_per_side;
        let patch_size = config.patch_size() as u32;
        let patch_count = per_side * per_side;

        let mut nodes = NodePool::new(patch_count * 2, config.tri_node_pool);
        let mut patches = Vec::with_capacity(patch_count);
        for i in 0..per_side {
            for j in 0..per_side {
                let index = i * per_side + j;
                let left_root = NodeIndex::new(index * 2);
                let right_root = NodeIndex::new(index * 2 + 1);
                // The two halves of a patch form a diamond from the start.
                nodes[left_root].base_neighbor = Some(right_root);
                nodes[right_root].base_neighbor = Some(left_root);

                let origin = UVec2::new(j as u32 * patch_size, i as u32 * patch_size);
                let mut patch = Patch::new(
                    origin,
                    patch_size,
                    left_root,
                    right_root,
                    config.variance_depth,
                );
                patch.compute_variance(&map);
                patches.push(patch);
            }
        }

        // Wire roots across every patch seam up front, both directions;
        // the forced-split rule keeps the seams crack-free from then on.
        for i in 0..per_side {
            for j in 0..per_side {
                let index = i * per_side + j;
                let left_root = patches[index].left_root();
                let right_root = patches[index].right_root();
                if j > 0 {
                    nodes[left_root].left_neighbor = Some(patches[index - 1].right_root());
                }
                if j < per_side - 1 {
                    nodes[right_root].left_neighbor = Some(patches[index + 1].left_root());
                }
                if i > 0 {
                    nodes[left_root].right_neighbor = Some(patches[index - per_side].right_root());
                }
                if i < per_side - 1 {
                    nodes[right_root].right_neighbor = Some(patches[index + per_side].left_root());
                }
            }
        }

        log::info!(
            "landscape initialized: {}x{} patches of {}, {} pooled nodes, {} triangle budget",
            per_side,
            per_side,
            patch_size,
            config.tri_node_pool,
            config.max_tris
        );

        Ok(Self {
            slots: VertexSlotPool::new(config.max_tris),
            mesh: TerrainMesh::new(config.max_tris),
            camera: Camera::new(Vec3::ZERO),
            frame_variance: INITIAL_FRAME_VARIANCE,
            visible_count: 0,
            config,
            map,
            patches,
            nodes,
        })
    }

    /// Load a raw heightmap from disk and build the engine over it
    pub fn from_file(config: TessConfig, path: impl AsRef<std::path::Path>) -> Result<Self> {
        let map = Heightmap::from_file(path, config.map_size)?;
        Self::new(config, map)
    }

    /// Point the view; takes effect at the next reset
    pub fn set_camera(&mut self, position: Vec3, forward: Vec3) {
        self.camera.set_pose(position, forward);
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Begin a frame: refresh per-patch visibility
    pub fn reset(&mut self) {
        self.visible_count = 0;
        for patch in &mut self.patches {
            patch.reset();
            patch.set_visibility(&self.camera);
            if patch.is_visible() {
                self.visible_count += 1;
            }
        }
    }

    /// Split and merge the trees of every visible patch for the current view
    pub fn tessellate(&mut self) {
        let mut ctx = TessContext {
            nodes: &mut self.nodes,
            slots: &mut self.slots,
            mesh: &mut self.mesh,
            map: &self.map,
            eye: self.camera.position,
            frame_variance: self.frame_variance,
            tolerance: self.config.variance_tolerance,
        };
        for patch in &self.patches {
            if patch.is_visible() {
                patch.tessellate(&mut ctx);
            }
        }
    }

    /// Emit leaf triangles into the output buffers, then retune the frame
    /// variance toward the triangle budget
    pub fn render(&mut self) {
        let mut ctx = TessContext {
            nodes: &mut self.nodes,
            slots: &mut self.slots,
            mesh: &mut self.mesh,
            map: &self.map,
            eye: self.camera.position,
            frame_variance: self.frame_variance,
            tolerance: self.config.variance_tolerance,
        };
        for patch in &self.patches {
            if patch.is_visible() {
                patch.render(&mut ctx);
            }
        }

        self.update_frame_variance();

        log::debug!(
            "frame: {} tris, {} visible patches, {} nodes in use, variance {:.2}",
            self.slots.used(),
            self.visible_count,
            self.nodes.in_use(),
            self.frame_variance
        );
    }

    /// Nudge the split threshold so the next frame lands nearer the wanted
    /// triangle count: too few triangles lowers it, too many raises it
    fn update_frame_variance(&mut self) {
        let wanted = self.config.wanted_tris as f32;
        let used = self.slots.used() as f32;
        self.frame_variance = (self.frame_variance + (used - wanted) / wanted).max(0.0);
    }

    /// Output buffers for the host to upload after render
    pub fn mesh(&self) -> &TerrainMesh {
        &self.mesh
    }

    pub fn config(&self) -> &TessConfig {
        &self.config
    }

    pub fn heightmap(&self) -> &Heightmap {
        &self.map
    }

    pub fn frame_variance(&self) -> f32 {
        self.frame_variance
    }

    /// Seed or override the controller threshold
    pub fn set_frame_variance(&mut self, variance: f32) {
        self.frame_variance = variance.max(0.0);
    }

    pub fn stats(&self) -> FrameStats {
        FrameStats {
            triangles_rendered: self.slots.used(),
            visible_patches: self.visible_count,
            nodes_in_use: self.nodes.in_use(),
            free_slots: self.slots.free_count(),
            frame_variance: self.frame_variance,
        }
    }
}
