//! CPU-side terrain mesh output
//!
//! The tessellator writes leaf triangles into a persistent vertex buffer in
//! slot units of three positions; the index buffer is the fixed identity
//! sequence. Both are plain Pod data so the host can upload them with a
//! single byte cast. Freed slots are zeroed and degenerate to zero-area
//! triangles, which hosts tolerate.

use bytemuck::{Pod, Zeroable};

/// One output vertex: position only. Y-up, the heightmap byte becomes Y;
/// grid x and y become world X and Z.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
}

impl TerrainVertex {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { position: [x, y, z] }
    }
}

/// Output buffers consumed by the host after each render
pub struct TerrainMesh {
    vertices: Vec<TerrainVertex>,
    indices: Vec<u32>,
}

impl TerrainMesh {
    pub fn new(max_tris: usize) -> Self {
        Self {
            vertices: vec![TerrainVertex::default(); max_tris * 3],
            indices: (0..(max_tris * 3) as u32).collect(),
        }
    }

    /// All vertex positions, including zeroed unused slots
    pub fn vertices(&self) -> &[TerrainVertex] {
        &self.vertices
    }

    /// Fixed identity triangle list; u32 because the buffer exceeds 65k vertices
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Vertex buffer as raw bytes for upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub(crate) fn write_slot(&mut self, slot: u32, corners: [TerrainVertex; 3]) {
        let start = slot as usize;
        self.vertices[start..start + 3].copy_from_slice(&corners);
    }

    pub(crate) fn clear_slot(&mut self, slot: u32) {
        self.write_slot(slot, [TerrainVertex::default(); 3]);
    }
}
