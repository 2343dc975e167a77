//! Mesh serialization
//!
//! Meshes are stored as RON. Loaded meshes are validated before they are
//! handed out, so a bad index in a file never reaches the renderer.

use std::fs;
use std::path::Path;

use thiserror::Error;

use super::geometry::Mesh;
use crate::error::RenderError;

/// Error type for mesh loading and saving
#[derive(Debug, Error)]
pub enum MeshIoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),
    #[error("Invalid mesh: {0}")]
    Invalid(#[from] RenderError),
}

/// Load a mesh from a RON file
pub fn load_mesh<P: AsRef<Path>>(path: P) -> Result<Mesh, MeshIoError> {
    let contents = fs::read_to_string(path)?;
    load_mesh_from_str(&contents)
}

/// Save a mesh to a RON file
pub fn save_mesh<P: AsRef<Path>>(mesh: &Mesh, path: P) -> Result<(), MeshIoError> {
    let config = ron::ser::PrettyConfig::new()
        .depth_limit(3)
        .indentor("  ".to_string());

    let contents = ron::ser::to_string_pretty(mesh, config)?;
    fs::write(path, contents)?;
    Ok(())
}

/// Load a mesh from a RON string (for embedded meshes or testing)
pub fn load_mesh_from_str(s: &str) -> Result<Mesh, MeshIoError> {
    let mesh: Mesh = ron::from_str(s)?;
    mesh.validate()?;
    Ok(mesh)
}
