//! Terrain data sources

pub mod heightmap;
pub use heightmap::Heightmap;
