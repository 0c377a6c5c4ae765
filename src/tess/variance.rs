//! Precomputed height variance
//!
//! Each patch side stores the interpolation error of every bintree triangle
//! down to a fixed depth as a complete binary tree: index 1 is the root,
//! the children of node `n` are `2n` and `2n + 1`, index 0 is unused. The
//! stored byte is one plus the subtree maximum, so even perfectly flat
//! terrain carries a non-zero entry and the split rule never divides detail
//! decisions by a dead value.

use glam::UVec2;

use crate::terrain::heightmap::Heightmap;

/// Coarse-to-fine variance of one patch triangle tree
pub struct VarianceTree {
    values: Vec<u8>,
}

impl VarianceTree {
    pub fn new(depth: u32) -> Self {
        Self {
            values: vec![0; 1 << depth],
        }
    }

    /// Number of addressable tree slots; indices at or beyond this carry no
    /// stored variance
    pub fn limit(&self) -> usize {
        self.values.len()
    }

    pub fn get(&self, node: usize) -> u8 {
        self.values[node]
    }

    /// Rebuild the tree for the triangle (left, right, apex) over `map`.
    /// Pure in the heightmap and the corners; recomputing is idempotent.
    pub fn compute(&mut self, map: &Heightmap, left: UVec2, right: UVec2, apex: UVec2) {
        self.recurse(map, left, right, apex, 1);
    }

    fn recurse(
        &mut self,
        map: &Heightmap,
        left: UVec2,
        right: UVec2,
        apex: UVec2,
        node: usize,
    ) -> u8 {
        let center = (left + right) / 2;

        let left_z = map.height_at(left) as i32;
        let right_z = map.height_at(right) as i32;
        let center_z = map.height_at(center) as i32;

        // Error of the hypotenuse midpoint against the endpoint average.
        let mut variance = (center_z - (left_z + right_z) / 2).unsigned_abs() as u8;

        // Descend while the hypotenuse still spans the grid.
        if left.x.abs_diff(right.x) >= 8 || left.y.abs_diff(right.y) >= 8 {
            variance = variance.max(self.recurse(map, apex, left, center, node * 2));
            variance = variance.max(self.recurse(map, right, apex, center, node * 2 + 1));
        }

        if node < self.values.len() {
            self.values[node] = variance.saturating_add(1);
        }

        variance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corners(size: u32) -> [UVec2; 3] {
        [UVec2::new(0, size), UVec2::new(size, 0), UVec2::ZERO]
    }

    #[test]
    fn test_flat_terrain_is_all_ones() {
        let map = Heightmap::from_fn(64, |_, _| 100);
        let mut tree = VarianceTree::new(9);
        let [l, r, a] = corners(64);
        tree.compute(&map, l, r, a);

        assert_eq!(tree.get(0), 0);
        for node in 1..tree.limit() {
            assert_eq!(tree.get(node), 1, "node {}", node);
        }
    }

    #[test]
    fn test_single_spike_marks_only_its_path() {
        // Spike at the apex corner of the triangle.
        let map = Heightmap::from_fn(64, |x, y| if x == 0 && y == 0 { 255 } else { 0 });
        let mut tree = VarianceTree::new(9);
        let [l, r, a] = corners(64);
        tree.compute(&map, l, r, a);

        assert!(tree.get(1) > 1);
        let marked = (1..tree.limit()).filter(|&n| tree.get(n) > 1).count();
        let unit = (1..tree.limit()).filter(|&n| tree.get(n) == 1).count();
        assert!(marked > 0);
        assert!(unit > marked, "spike path should be narrow: {} marked", marked);
    }

    #[test]
    fn test_parent_dominates_children() {
        let map = Heightmap::from_fn(64, |x, y| ((x * 7 + y * 13) % 251) as u8);
        let mut tree = VarianceTree::new(9);
        let [l, r, a] = corners(64);
        tree.compute(&map, l, r, a);

        for node in 1..tree.limit() / 2 {
            let parent = tree.get(node) as i32;
            let lo = tree.get(node * 2) as i32;
            let hi = tree.get(node * 2 + 1) as i32;
            if lo == 0 && hi == 0 {
                continue; // below the recursion cutoff
            }
            assert!(parent >= lo.max(hi) - 1, "node {}", node);
        }
    }

    #[test]
    fn test_high_contrast_saturates() {
        // 4-sample checker blocks put full-range jumps at sampled midpoints.
        let map = Heightmap::from_fn(64, |x, y| {
            if (x / 4 + y / 4) % 2 == 0 {
                0
            } else {
                255
            }
        });
        let mut tree = VarianceTree::new(9);
        let [l, r, a] = corners(64);
        tree.compute(&map, l, r, a);

        assert_eq!(tree.get(1), 255);
    }

    #[test]
    fn test_recompute_is_identical() {
        let map = Heightmap::from_fn(64, |x, y| ((x ^ y) & 0xff) as u8);
        let mut first = VarianceTree::new(9);
        let mut second = VarianceTree::new(9);
        let [l, r, a] = corners(64);
        first.compute(&map, l, r, a);
        second.compute(&map, l, r, a);
        second.compute(&map, l, r, a);

        for node in 0..first.limit() {
            assert_eq!(first.get(node), second.get(node));
        }
    }
}
