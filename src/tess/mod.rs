//! Real-time adaptive tessellation (ROAM)
//!
//! Each patch of the heightmap carries two binary triangle trees that are
//! split and merged every frame against a precomputed variance tree and the
//! current view. Forced neighbor splits keep the mesh free of cracks, and a
//! feedback controller steers the global split threshold toward the
//! configured triangle budget.

pub mod config;
pub mod node;
pub mod slots;
pub mod variance;
pub mod visibility;
pub mod patch;
pub mod landscape;

pub use config::TessConfig;
pub use landscape::{FrameStats, Landscape};
pub use node::{NodeIndex, NodePool, TriNode};
pub use patch::Patch;
pub use slots::VertexSlotPool;
pub use variance::VarianceTree;
