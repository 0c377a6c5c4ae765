//! Roamesh - real-time adaptive terrain tessellation
//!
//! A ROAM (Real-time Optimally Adapting Meshes) engine: each frame it bends
//! pool-backed binary triangle trees over an 8-bit heightmap so that
//! triangles concentrate where the terrain is rough or close to the camera,
//! while a feedback controller holds the output near a triangle budget.

pub mod core;
pub mod terrain;
pub mod tess;
pub mod render;
