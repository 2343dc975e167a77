//! Error type for the rendering core
//!
//! Every capacity limit in the pipeline is checked before the affected
//! buffer is written, and reported through `RenderError` so the caller can
//! decide whether to skip the frame, log and continue, or abort.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("matrix stack overflow (max depth {max_depth})")]
    StackOverflow { max_depth: usize },

    #[error("matrix stack underflow")]
    StackUnderflow,

    #[error("object has {count} vertices, transform buffer holds {max}")]
    TooManyVertices { count: usize, max: usize },

    #[error("object has {count} polygons, limit is {max}")]
    TooManyPolygons { count: usize, max: usize },

    #[error("clipped polygon needs {count} vertices, clip buffer holds {max}")]
    ClipOverflow { count: usize, max: usize },

    #[error("vertex stream of {len} entries exceeds the {max} entry limit")]
    StreamTooLong { len: usize, max: usize },

    #[error("polygon {polygon} references vertex {index}, object has {vertex_count}")]
    VertexIndexOutOfRange {
        polygon: usize,
        index: usize,
        vertex_count: usize,
    },

    #[error("resolution {width}x{height} is not supported")]
    InvalidResolution { width: usize, height: usize },

    #[error("fov exponent {0} is outside 8..=18")]
    InvalidFov(u32),

    #[error("matrix stack depth must be positive")]
    InvalidStackDepth,

    #[error("color buffer has {len} pixels, {required} required")]
    ColorBufferTooSmall { len: usize, required: usize },

    #[error("mesh builder end() without begin()")]
    EndWithoutBegin,

    #[error("mesh builder is not recording")]
    NotRecording,
}
