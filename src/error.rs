use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the rendering library.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("framebuffer is not complete: {reason}")]
    FramebufferIncomplete { reason: String },

    /// The UV deltas of a triangle are linearly dependent, so no tangent frame exists.
    #[error("degenerate UV mapping (determinant {determinant})")]
    DegenerateUvMapping { determinant: f32 },

    #[error("failed to load texture {path:?}: {source}")]
    Texture {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to load model {path:?}: {message}")]
    Model { path: PathBuf, message: String },

    #[error("invalid config {path:?}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("failed to write image {path:?}: {source}")]
    ImageWrite {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RenderError>;
