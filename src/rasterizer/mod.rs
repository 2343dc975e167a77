//! Integer-only software rasterizer
//!
//! Features:
//! - Q15 fixed-point model matrix stack with table-driven trig
//! - Viewport and near-plane clipping with attribute interpolation
//! - Scanline fill with a per-pixel depth test (greater is closer)
//! - Flat and affine-textured polygons with depth shading

mod clip;
mod fixed;
mod pipeline;
mod project;
mod render;
mod scan;
mod transform;
mod types;

pub use clip::*;
pub use fixed::*;
pub use pipeline::*;
pub use project::*;
pub use render::*;
pub use scan::*;
pub use transform::*;
pub use types::*;

/// Largest supported width or height
pub const MAX_SCREEN_SIZE: usize = 2048;
