//! Error types for the tessellation engine

use thiserror::Error;

/// Main error type for the engine
///
/// Only construction and load paths can fail; steady-state frames absorb
/// resource shortages by degrading detail instead of returning errors.
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Heightmap error: {0}")]
    Heightmap(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
