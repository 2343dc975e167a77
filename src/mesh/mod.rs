//! Mesh module - objects handed to the renderer
//!
//! - Integer vertex positions with indexed triangles and quads
//! - Immediate-mode builder and box generator
//! - RON persistence

mod builder;
mod geometry;
mod io;

pub use builder::*;
pub use geometry::*;
pub use io::*;
