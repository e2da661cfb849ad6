use thiserror::Error;

/// Errors produced by world and shape operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The shape has no physics body, either because it was never registered
    /// or because its world unregistered it.
    #[error("shape {shape} is not registered with a world")]
    Detached { shape: String },

    /// A collider cannot be built from a non-positive extent.
    #[error("shape {shape} has degenerate extents {width}x{height}")]
    DegenerateGeometry { shape: String, width: f64, height: f64 },

    #[error("invalid world configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
