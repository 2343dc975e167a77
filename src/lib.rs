//! Fixpoint Engine
//!
//! A software 3D renderer that works only in integers: Q15 matrices,
//! table trig, near-plane and viewport clipping, and a scanline fill with
//! a per-pixel depth buffer into a caller-owned `0x00RRGGBB` color buffer.

pub mod config;
pub mod error;
pub mod mesh;
pub mod rasterizer;

pub use error::RenderError;

/// Crate version, shown in the demo window title
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
