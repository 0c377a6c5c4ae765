//! Heightmap input
//!
//! Raw 8-bit grayscale, `size * size` bytes, row-major with the origin at
//! (0, 0). The tessellator samples one past the last row and column, so the
//! map is padded by duplicating its edge on load. Fixed after load; the
//! engine never writes it.

use std::fs;
use std::path::Path;

use glam::UVec2;

use crate::core::error::Error;
use crate::core::types::Result;

/// Read-only terrain height field
pub struct Heightmap {
    size: usize,
    /// `(size + 1) * (size + 1)` samples, row-major
    data: Vec<u8>,
}

impl Heightmap {
    /// Wrap `size * size` raw grayscale bytes, padding the extra row and column
    pub fn from_raw(bytes: &[u8], size: usize) -> Result<Self> {
        if size == 0 {
            return Err(Error::Heightmap("map size must be non-zero".into()));
        }
        if bytes.len() != size * size {
            return Err(Error::Heightmap(format!(
                "expected {} bytes for a {}x{} map, got {}",
                size * size,
                size,
                size,
                bytes.len()
            )));
        }

        let stride = size + 1;
        let mut data = vec![0u8; stride * stride];
        for y in 0..size {
            let src = &bytes[y * size..(y + 1) * size];
            data[y * stride..y * stride + size].copy_from_slice(src);
            data[y * stride + size] = src[size - 1];
        }
        // Bottom padding row repeats the last real row.
        let (rows, pad) = data.split_at_mut(size * stride);
        pad.copy_from_slice(&rows[(size - 1) * stride..]);

        Ok(Self { size, data })
    }

    /// One-shot bulk load from disk
    pub fn from_file(path: impl AsRef<Path>, size: usize) -> Result<Self> {
        let bytes = fs::read(path)?;
        Self::from_raw(&bytes, size)
    }

    /// Build a map from a sampling closure; handy for tests and benches
    pub fn from_fn(size: usize, mut f: impl FnMut(u32, u32) -> u8) -> Self {
        let last = size.saturating_sub(1) as u32;
        let stride = size + 1;
        let mut data = vec![0u8; stride * stride];
        for y in 0..stride {
            for x in 0..stride {
                data[y * stride + x] = f((x as u32).min(last), (y as u32).min(last));
            }
        }
        Self { size, data }
    }

    /// Side length in samples (without padding)
    pub fn size(&self) -> usize {
        self.size
    }

    /// Height at a grid position; valid for x and y in `0..=size`
    pub fn sample(&self, x: u32, y: u32) -> u8 {
        self.data[y as usize * (self.size + 1) + x as usize]
    }

    /// Height at a grid point
    pub fn height_at(&self, p: UVec2) -> u8 {
        self.sample(p.x, p.y)
    }
}
