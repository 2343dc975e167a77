//! Object geometry: integer vertex positions and indexed polygons
//!
//! Pure data structures with minimal behavior.
//! All transform/raster logic lives in the rasterizer module.

use serde::{Deserialize, Serialize};

use crate::error::RenderError;
use crate::rasterizer::Color;

/// Largest vertex count an object may have
pub const MAX_OBJECT_VERTICES: usize = 4096;

/// Largest polygon count an object may have
pub const MAX_OBJECT_POLYGONS: usize = MAX_OBJECT_VERTICES / 4;

/// Integer axis-aligned bounding box
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: [i32; 3],
    pub max: [i32; 3],
}

impl Bounds {
    fn empty() -> Self {
        Self {
            min: [i32::MAX; 3],
            max: [i32::MIN; 3],
        }
    }

    /// Expand bounds to include a point
    pub fn expand(&mut self, p: [i32; 3]) {
        for i in 0..3 {
            self.min[i] = self.min[i].min(p[i]);
            self.max[i] = self.max[i].max(p[i]);
        }
    }

    pub fn center(&self) -> [i32; 3] {
        [
            (self.min[0] + self.max[0]) / 2,
            (self.min[1] + self.max[1]) / 2,
            (self.min[2] + self.max[2]) / 2,
        ]
    }
}

/// A triangle or quad referencing object vertices by index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Polygon {
    /// Vertex indices (4 elements; for triangles, indices[3] == indices[2])
    pub indices: [usize; 4],
    /// Per-corner texture coordinates in texels
    pub uvs: [[i32; 2]; 4],
    /// True if only the first 3 corners are used
    pub is_triangle: bool,
    /// Flat color, also used when no texture resolves
    pub color: Color,
    /// Index into the texture list handed to the renderer
    #[serde(default)]
    pub texture: Option<usize>,
}

impl Polygon {
    /// Create a quad
    pub fn quad(indices: [usize; 4], uvs: [[i32; 2]; 4], color: Color) -> Self {
        Self {
            indices,
            uvs,
            is_triangle: false,
            color,
            texture: None,
        }
    }

    /// Create a triangle
    pub fn tri(indices: [usize; 3], uvs: [[i32; 2]; 3], color: Color) -> Self {
        Self {
            indices: [indices[0], indices[1], indices[2], indices[2]], // Duplicate last corner
            uvs: [uvs[0], uvs[1], uvs[2], uvs[2]],
            is_triangle: true,
            color,
            texture: None,
        }
    }

    pub fn with_texture(mut self, texture: Option<usize>) -> Self {
        self.texture = texture;
        self
    }

    /// Number of corners in use (3 or 4)
    pub fn vertex_count(&self) -> usize {
        if self.is_triangle {
            3
        } else {
            4
        }
    }
}

/// A renderable object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<[i32; 3]>,
    pub polygons: Vec<Polygon>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex and return its index
    pub fn add_vertex(&mut self, x: i32, y: i32, z: i32) -> usize {
        self.vertices.push([x, y, z]);
        self.vertices.len() - 1
    }

    pub fn add_polygon(&mut self, polygon: Polygon) {
        self.polygons.push(polygon);
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    /// Free both arrays
    pub fn clear(&mut self) {
        self.vertices = Vec::new();
        self.polygons = Vec::new();
    }

    /// Bounding box of all vertices (default when empty)
    pub fn bounds(&self) -> Bounds {
        if self.vertices.is_empty() {
            return Bounds::default();
        }
        let mut b = Bounds::empty();
        for v in &self.vertices {
            b.expand(*v);
        }
        b
    }

    /// Check capacity limits and that every polygon references real vertices
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.vertices.len() > MAX_OBJECT_VERTICES {
            return Err(RenderError::TooManyVertices {
                count: self.vertices.len(),
                max: MAX_OBJECT_VERTICES,
            });
        }
        if self.polygons.len() > MAX_OBJECT_POLYGONS {
            return Err(RenderError::TooManyPolygons {
                count: self.polygons.len(),
                max: MAX_OBJECT_POLYGONS,
            });
        }
        for (i, poly) in self.polygons.iter().enumerate() {
            let n = poly.vertex_count();
            if let Some(&index) = poly.indices[..n].iter().find(|&&idx| idx >= self.vertices.len()) {
                return Err(RenderError::VertexIndexOutOfRange {
                    polygon: i,
                    index,
                    vertex_count: self.vertices.len(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Mesh {
        let mut mesh = Mesh::new();
        let a = mesh.add_vertex(-50, 50, 100);
        let b = mesh.add_vertex(50, 50, 100);
        let c = mesh.add_vertex(50, -50, 100);
        let d = mesh.add_vertex(-50, -50, 100);
        mesh.add_polygon(Polygon::quad([a, b, c, d], [[0, 0]; 4], Color::RED));
        mesh
    }

    #[test]
    fn test_bounds() {
        let b = square().bounds();
        assert_eq!(b.min, [-50, -50, 100]);
        assert_eq!(b.max, [50, 50, 100]);
        assert_eq!(b.center(), [0, 0, 100]);
        assert_eq!(Mesh::new().bounds(), Bounds::default());
    }

    #[test]
    fn test_triangle_duplicates_last_corner() {
        let t = Polygon::tri([0, 1, 2], [[0, 0], [1, 1], [2, 2]], Color::WHITE);
        assert_eq!(t.indices, [0, 1, 2, 2]);
        assert_eq!(t.vertex_count(), 3);
    }

    #[test]
    fn test_validate_catches_bad_index() {
        let mut mesh = square();
        assert!(mesh.validate().is_ok());
        mesh.polygons[0].indices[2] = 9;
        assert_eq!(
            mesh.validate(),
            Err(RenderError::VertexIndexOutOfRange {
                polygon: 0,
                index: 9,
                vertex_count: 4
            })
        );
    }

    #[test]
    fn test_copy_and_clear() {
        let mut mesh = square();
        let copy = mesh.clone();
        mesh.clear();
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.polygon_count(), 0);
        assert_eq!(copy.vertex_count(), 4);
        assert_eq!(copy.polygon_count(), 1);
    }
}
