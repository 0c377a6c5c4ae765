//! Engine configuration

use crate::core::error::Error;
use crate::core::types::Result;

/// Tunables for the tessellator
///
/// Defaults match a 4096 heightmap carved into a 64 x 64 patch grid with a
/// 200k-triangle output buffer and a 100k-triangle target.
#[derive(Clone, Debug)]
pub struct TessConfig {
    /// Heightmap side length in samples (padded by one row/column on load)
    pub map_size: usize,
    /// Patch grid side; patch size = map_size / patches_per_side
    pub patches_per_side: usize,
    /// Variance trees hold `1 << variance_depth` entries per patch side
    pub variance_depth: u32,
    /// Output triangle budget; the vertex buffer holds 3 * max_tris positions
    pub max_tris: usize,
    /// Triangle count the feedback controller steers toward
    pub wanted_tris: usize,
    /// Dead band around the frame variance for split/merge decisions
    pub variance_tolerance: f32,
    /// Capacity of the shared TriNode pool (patch roots not included)
    pub tri_node_pool: usize,
}

impl Default for TessConfig {
    fn default() -> Self {
        Self {
            map_size: 4096,
            patches_per_side: 64,
            variance_depth: 9,
            max_tris: 200_000,
            wanted_tris: 100_000,
            variance_tolerance: 2.0,
            tri_node_pool: 400_000,
        }
    }
}

impl TessConfig {
    /// Heightmap samples per patch side
    pub fn patch_size(&self) -> usize {
        self.map_size / self.patches_per_side
    }

    /// Reject configurations the engine cannot run with. Fatal at init;
    /// per-frame calls never fail afterwards.
    pub fn validate(&self) -> Result<()> {
        if self.map_size == 0 || self.patches_per_side == 0 {
            return Err(Error::Config("map and patch grid must be non-empty".into()));
        }
        if self.map_size % self.patches_per_side != 0 {
            return Err(Error::Config(format!(
                "map size {} is not divisible by patch grid {}",
                self.map_size, self.patches_per_side
            )));
        }
        let patch_size = self.patch_size();
        if !patch_size.is_power_of_two() {
            return Err(Error::Config(format!(
                "patch size {} must be a power of two",
                patch_size
            )));
        }
        if self.variance_depth >= usize::BITS || (1usize << self.variance_depth) < patch_size {
            return Err(Error::Config(format!(
                "variance depth {} does not cover patch size {}",
                self.variance_depth, patch_size
            )));
        }
        if self.max_tris == 0 || self.tri_node_pool == 0 {
            return Err(Error::Config("pools must be non-empty".into()));
        }
        if self.wanted_tris > self.max_tris {
            return Err(Error::Config(format!(
                "wanted {} triangles exceeds the {} budget",
                self.wanted_tris, self.max_tris
            )));
        }
        Ok(())
    }
}
