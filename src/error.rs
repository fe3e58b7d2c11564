use thiserror::Error;

/// Errors produced by the resampling engine and the checkpoint remapper.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested kernel / factor / padding combination has no valid output.
    #[error("invalid shape: {0}")]
    InvalidShape(String),

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),

    /// A key expected for the inferred generator layout is absent from the source.
    #[error("key not found in source state dict: {0}")]
    KeyNotFound(String),

    /// The collaborator that reads the source checkpoint format is unavailable.
    #[error("missing dependency: {0}")]
    MissingDependency(String),

    #[error("cannot infer generator config: {0}")]
    Config(String),
}
