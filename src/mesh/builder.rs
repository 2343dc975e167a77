//! Immediate-mode mesh builder
//!
//! Geometry is entered one vertex at a time between `begin` and `end`. The
//! current color, texture and texture coordinate are sticky and are captured
//! when a vertex is entered. Identical positions share one vertex.

use std::ops::BitOr;

use super::geometry::{Mesh, Polygon, MAX_OBJECT_POLYGONS, MAX_OBJECT_VERTICES};
use crate::error::RenderError;
use crate::rasterizer::{Color, TEX_DIM};

/// How entered vertices are grouped into polygons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    Triangles,
    Quads,
}

impl PrimitiveType {
    fn corners(self) -> usize {
        match self {
            PrimitiveType::Triangles => 3,
            PrimitiveType::Quads => 4,
        }
    }
}

/// Set of box faces to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxSides(u8);

impl BoxSides {
    pub const TOP: BoxSides = BoxSides(0o01);
    pub const BOTTOM: BoxSides = BoxSides(0o02);
    pub const BACK: BoxSides = BoxSides(0o04);
    pub const FRONT: BoxSides = BoxSides(0o10);
    pub const LEFT: BoxSides = BoxSides(0o20);
    pub const RIGHT: BoxSides = BoxSides(0o40);
    pub const ALL: BoxSides = BoxSides(0o77);
    pub const NONE: BoxSides = BoxSides(0);

    pub fn contains(self, other: BoxSides) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for BoxSides {
    type Output = BoxSides;

    fn bitor(self, rhs: BoxSides) -> BoxSides {
        BoxSides(self.0 | rhs.0)
    }
}

/// Builder state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderState {
    Idle,
    Recording,
}

/// Accumulates vertices and polygons into a `Mesh`
pub struct MeshBuilder {
    state: BuilderState,
    primitive: PrimitiveType,
    mesh: Mesh,
    color: Color,
    texture: Option<usize>,
    texcoord: [i32; 2],
    corners: [usize; 4],
    corner_uvs: [[i32; 2]; 4],
    pending: usize,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self {
            state: BuilderState::Idle,
            primitive: PrimitiveType::Triangles,
            mesh: Mesh::new(),
            color: Color::WHITE,
            texture: None,
            texcoord: [0, 0],
            corners: [0; 4],
            corner_uvs: [[0, 0]; 4],
            pending: 0,
        }
    }

    pub fn state(&self) -> BuilderState {
        self.state
    }

    /// Start a new object, discarding anything entered before
    pub fn begin(&mut self) {
        self.state = BuilderState::Recording;
        self.mesh = Mesh::new();
        self.pending = 0;
    }

    /// Change primitive type; a partially entered primitive is dropped
    pub fn set_type(&mut self, primitive: PrimitiveType) {
        if primitive != self.primitive {
            self.pending = 0;
        }
        self.primitive = primitive;
    }

    pub fn texture(&mut self, texture: Option<usize>) {
        self.texture = texture;
    }

    pub fn color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn texcoord(&mut self, u: i32, v: i32) {
        self.texcoord = [u, v];
    }

    pub fn vertex_count(&self) -> usize {
        self.mesh.vertex_count()
    }

    pub fn polygon_count(&self) -> usize {
        self.mesh.polygon_count()
    }

    /// Enter a vertex; completes a polygon when enough corners are in
    pub fn vertex(&mut self, x: i32, y: i32, z: i32) -> Result<(), RenderError> {
        if self.state != BuilderState::Recording {
            return Err(RenderError::NotRecording);
        }

        let index = self.add_vertex([x, y, z])?;
        self.corners[self.pending] = index;
        self.corner_uvs[self.pending] = self.texcoord;
        self.pending += 1;

        if self.pending == self.primitive.corners() {
            self.pending = 0;
            self.add_polygon()?;
        }
        Ok(())
    }

    /// Finish the object and hand it over
    pub fn end(&mut self) -> Result<Mesh, RenderError> {
        if self.state != BuilderState::Recording {
            return Err(RenderError::EndWithoutBegin);
        }
        self.state = BuilderState::Idle;
        self.pending = 0;
        Ok(std::mem::take(&mut self.mesh))
    }

    fn add_vertex(&mut self, p: [i32; 3]) -> Result<usize, RenderError> {
        if let Some(i) = self.mesh.vertices.iter().position(|v| *v == p) {
            return Ok(i);
        }
        if self.mesh.vertices.len() >= MAX_OBJECT_VERTICES {
            return Err(RenderError::TooManyVertices {
                count: self.mesh.vertices.len() + 1,
                max: MAX_OBJECT_VERTICES,
            });
        }
        Ok(self.mesh.add_vertex(p[0], p[1], p[2]))
    }

    fn add_polygon(&mut self) -> Result<(), RenderError> {
        if self.mesh.polygons.len() >= MAX_OBJECT_POLYGONS {
            return Err(RenderError::TooManyPolygons {
                count: self.mesh.polygons.len() + 1,
                max: MAX_OBJECT_POLYGONS,
            });
        }

        let c = &mut self.corners;
        let uv = &mut self.corner_uvs;
        let mut triangle = self.primitive == PrimitiveType::Triangles;

        // a quad with a repeated corner is a triangle
        if !triangle {
            if c[0] == c[1] {
                triangle = true;
                c[1] = c[2];
                uv[1] = uv[2];
                c[2] = c[3];
                uv[2] = uv[3];
            }
            if c[2] == c[3] {
                triangle = true;
            }
        }

        let polygon = if triangle {
            Polygon::tri([c[0], c[1], c[2]], [uv[0], uv[1], uv[2]], self.color)
        } else {
            Polygon::quad(*c, *uv, self.color)
        };
        self.mesh.add_polygon(polygon.with_texture(self.texture));
        Ok(())
    }

    /// Enter the faces of an axis-aligned box centered at (x, y, z) as quads.
    /// Every face maps the whole texture.
    #[allow(clippy::too_many_arguments)]
    pub fn box_faces(
        &mut self,
        x: i32,
        y: i32,
        z: i32,
        w: i32,
        h: i32,
        d: i32,
        sides: BoxSides,
    ) -> Result<(), RenderError> {
        let (w, h, d) = (w >> 1, h >> 1, d >> 1);

        let v = [
            [x - w, y - h, z + d],
            [x + w, y - h, z + d],
            [x + w, y + h, z + d],
            [x - w, y + h, z + d],
            [x - w, y - h, z - d],
            [x - w, y + h, z - d],
            [x + w, y + h, z - d],
            [x + w, y - h, z - d],
        ];

        let t = TEX_DIM as i32 - 1;
        let uvs = [[0, 0], [t, 0], [t, t], [0, t]];

        let faces: [(BoxSides, [usize; 4]); 6] = [
            (BoxSides::BACK, [0, 1, 2, 3]),
            (BoxSides::FRONT, [4, 5, 6, 7]),
            (BoxSides::TOP, [5, 3, 2, 6]),
            (BoxSides::BOTTOM, [4, 7, 1, 0]),
            (BoxSides::RIGHT, [7, 6, 2, 1]),
            (BoxSides::LEFT, [4, 0, 3, 5]),
        ];

        for (side, corners) in faces {
            if !sides.contains(side) {
                continue;
            }
            for (corner, uv) in corners.iter().zip(uvs) {
                let p = v[*corner];
                self.texcoord(uv[0], uv[1]);
                self.vertex(p[0], p[1], p[2])?;
            }
        }
        Ok(())
    }
}

impl Default for MeshBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a box object of `w` x `h` x `d` centered at the origin
pub fn gen_box(
    w: i32,
    h: i32,
    d: i32,
    sides: BoxSides,
    color: Color,
    texture: Option<usize>,
) -> Result<Mesh, RenderError> {
    let mut builder = MeshBuilder::new();
    builder.begin();
    builder.set_type(PrimitiveType::Quads);
    builder.color(color);
    builder.texture(texture);
    builder.box_faces(0, 0, 0, w, h, d, sides)?;
    builder.end()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertices_are_shared() {
        let mut b = MeshBuilder::new();
        b.begin();
        b.set_type(PrimitiveType::Triangles);
        b.vertex(0, 0, 0).unwrap();
        b.vertex(1, 0, 0).unwrap();
        b.vertex(0, 1, 0).unwrap();
        b.vertex(1, 0, 0).unwrap();
        b.vertex(1, 1, 0).unwrap();
        b.vertex(0, 1, 0).unwrap();
        let mesh = b.end().unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.polygon_count(), 2);
        assert_eq!(mesh.polygons[1].indices, [1, 3, 2, 2]);
    }

    #[test]
    fn test_degenerate_quad_becomes_triangle() {
        let mut b = MeshBuilder::new();
        b.begin();
        b.set_type(PrimitiveType::Quads);
        b.color(Color::RED);
        b.texcoord(0, 0);
        b.vertex(0, 0, 0).unwrap();
        b.texcoord(5, 5);
        b.vertex(0, 0, 0).unwrap();
        b.texcoord(7, 0);
        b.vertex(1, 0, 0).unwrap();
        b.texcoord(7, 7);
        b.vertex(1, 1, 0).unwrap();
        let mesh = b.end().unwrap();

        let p = &mesh.polygons[0];
        assert!(p.is_triangle);
        assert_eq!(p.indices[..3], [0, 1, 2]);
        assert_eq!(p.uvs[1], [7, 0]);
        assert_eq!(p.color, Color::RED);
    }

    #[test]
    fn test_type_change_drops_partial_primitive() {
        let mut b = MeshBuilder::new();
        b.begin();
        b.set_type(PrimitiveType::Quads);
        b.vertex(0, 0, 0).unwrap();
        b.vertex(1, 0, 0).unwrap();
        b.set_type(PrimitiveType::Triangles);
        b.vertex(2, 0, 0).unwrap();
        b.vertex(3, 0, 0).unwrap();
        b.vertex(4, 4, 0).unwrap();
        let mesh = b.end().unwrap();
        assert_eq!(mesh.polygon_count(), 1);
        assert_eq!(mesh.polygons[0].indices[..3], [2, 3, 4]);
    }

    #[test]
    fn test_misuse_is_reported() {
        let mut b = MeshBuilder::new();
        assert_eq!(b.vertex(0, 0, 0), Err(RenderError::NotRecording));
        assert_eq!(b.end(), Err(RenderError::EndWithoutBegin));
        b.begin();
        assert!(b.end().is_ok());
        assert_eq!(b.end(), Err(RenderError::EndWithoutBegin));
    }

    #[test]
    fn test_gen_box() {
        let mesh = gen_box(100, 200, 300, BoxSides::ALL, Color::WHITE, Some(0)).unwrap();
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.polygon_count(), 6);
        assert!(mesh.polygons.iter().all(|p| p.texture == Some(0) && !p.is_triangle));
        let b = mesh.bounds();
        assert_eq!(b.min, [-50, -100, -150]);
        assert_eq!(b.max, [50, 100, 150]);

        let open = gen_box(100, 100, 100, BoxSides::TOP | BoxSides::BOTTOM, Color::WHITE, None).unwrap();
        assert_eq!(open.polygon_count(), 2);
        assert!(gen_box(1, 1, 1, BoxSides::NONE, Color::WHITE, None).unwrap().polygons.is_empty());
    }
}
