//! Render context: owns the viewport, depth buffer, matrix stack, camera and
//! all scratch storage, and drives objects through the pipeline.
//!
//! Per object: transform every vertex once. Per polygon: classify against
//! the near plane, cull by winding, near-clip if needed, project, fill.

use log::{debug, trace};

use super::clip::{
    clip_polygon, frustum_test, point_frustum_test, ClipBound, ClipOutcome, Frustum, Viewport,
    CLIP_CAPACITY,
};
use super::fixed::winding_order;
use super::project::{project_stream, project_vertex};
use super::render::Rasterizer;
use super::transform::{transform_stream, Camera, MatrixStack, DEFAULT_STACK_DEPTH};
use super::types::{RasterMode, RasterSettings, StreamKind, Texture, Vert, TEX_PRECISION};
use super::MAX_SCREEN_SIZE;
use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::mesh::{Mesh, Polygon, MAX_OBJECT_VERTICES};

pub struct Renderer {
    viewport: Viewport,
    raster: Rasterizer,
    stack: MatrixStack,
    camera: Camera,
    pub settings: RasterSettings,
    /// Camera-space positions of the object being drawn
    transformed: Vec<[i32; 3]>,
}

impl Renderer {
    pub fn new(width: usize, height: usize) -> Result<Self, RenderError> {
        Self::with_settings(width, height, RasterSettings::default(), DEFAULT_STACK_DEPTH)
    }

    pub fn from_config(config: &RenderConfig) -> Result<Self, RenderError> {
        Self::with_settings(
            config.width,
            config.height,
            config.raster_settings(),
            config.max_stack_depth,
        )
    }

    fn with_settings(
        width: usize,
        height: usize,
        settings: RasterSettings,
        max_stack_depth: usize,
    ) -> Result<Self, RenderError> {
        if !(1..=MAX_SCREEN_SIZE).contains(&width) || !(1..=MAX_SCREEN_SIZE).contains(&height) {
            return Err(RenderError::InvalidResolution { width, height });
        }
        if !RasterSettings::fov_is_valid(settings.fov) {
            return Err(RenderError::InvalidFov(settings.fov));
        }
        if max_stack_depth == 0 {
            return Err(RenderError::InvalidStackDepth);
        }

        debug!(
            "renderer {}x{} fov {} mode {:?} cull {:?}",
            width, height, settings.fov, settings.raster_mode, settings.cull_mode
        );

        Ok(Self {
            viewport: Viewport::new(width, height),
            raster: Rasterizer::new(width, height),
            stack: MatrixStack::new(max_stack_depth),
            camera: Camera::new(),
            settings,
            transformed: vec![[0; 3]; MAX_OBJECT_VERTICES],
        })
    }

    pub fn width(&self) -> usize {
        self.raster.width
    }

    pub fn height(&self) -> usize {
        self.raster.height
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Restrict drawing to a rectangle (clamped to the buffer)
    pub fn set_viewport(&mut self, min_x: i32, min_y: i32, max_x: i32, max_y: i32, update_center: bool) {
        self.viewport.set(min_x, min_y, max_x, max_y, update_center);
        debug!(
            "viewport x {}..={} y {}..={} center ({}, {})",
            self.viewport.min_x,
            self.viewport.max_x,
            self.viewport.min_y,
            self.viewport.max_y,
            self.viewport.center_x,
            self.viewport.center_y
        );
    }

    /// Clear color and depth inside the viewport
    pub fn clear(&mut self, color: &mut [u32], rgb: u32) -> Result<(), RenderError> {
        self.clear_color(color, rgb)?;
        self.clear_depth();
        Ok(())
    }

    pub fn clear_color(&self, color: &mut [u32], rgb: u32) -> Result<(), RenderError> {
        self.raster.clear_color(color, &self.viewport, rgb)
    }

    pub fn clear_depth(&mut self) {
        self.raster.clear_depth(&self.viewport);
    }

    pub fn depth_buffer(&self) -> &[i64] {
        self.raster.depth()
    }

    pub fn set_camera(&mut self, x: i32, y: i32, z: i32, pitch: i32, yaw: i32) {
        self.camera.set(x, y, z, pitch, yaw);
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn stack(&self) -> &MatrixStack {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut MatrixStack {
        &mut self.stack
    }

    pub fn polygon_count(&self) -> usize {
        self.raster.polygon_count()
    }

    pub fn reset_polygon_count(&mut self) {
        self.raster.reset_polygon_count();
    }

    /// Fill a closed, projected X Y Z stream directly
    pub fn fill_flat(&mut self, color: &mut [u32], stream: &[Vert], num: usize, rgb: u32) -> Result<(), RenderError> {
        self.raster.fill_flat(color, &self.viewport, stream, num, rgb)
    }

    /// Fill a closed, projected X Y Z U V stream directly
    pub fn fill_textured(
        &mut self,
        color: &mut [u32],
        stream: &[Vert],
        num: usize,
        texture: &Texture,
    ) -> Result<(), RenderError> {
        self.raster.fill_textured(color, &self.viewport, stream, num, texture)
    }

    /// Transform and project one model-space point.
    /// `None` when it is on or behind the near plane.
    pub fn project_point(&self, p: [i32; 3]) -> Option<[i32; 3]> {
        let mut xf = [[0; 3]; 1];
        transform_stream(self.stack.top(), &self.camera, &[p], &mut xf);
        if point_frustum_test(xf[0][2]) == Frustum::Outside {
            return None;
        }
        let mut v: Vert = [xf[0][0], xf[0][1], xf[0][2], 0, 0];
        project_vertex(&mut v, self.settings.fov, &self.viewport);
        Some([v[0], v[1], v[2]])
    }

    /// Draw an object with the current model matrix and camera.
    ///
    /// The whole object is validated before anything is written.
    pub fn render_object(&mut self, color: &mut [u32], mesh: &Mesh, textures: &[Texture]) -> Result<(), RenderError> {
        self.raster.check_color_buffer(color)?;
        if !RasterSettings::fov_is_valid(self.settings.fov) {
            return Err(RenderError::InvalidFov(self.settings.fov));
        }
        mesh.validate()?;

        let n = mesh.vertices.len();
        transform_stream(self.stack.top(), &self.camera, &mesh.vertices, &mut self.transformed[..n]);

        let drawn_before = self.raster.polygon_count();
        let mut rejected = 0;
        for poly in &mesh.polygons {
            if !self.render_polygon(color, poly, textures)? {
                rejected += 1;
            }
        }

        trace!(
            "object: {} verts, {} polys, {} filled, {} rejected",
            n,
            mesh.polygons.len(),
            self.raster.polygon_count() - drawn_before,
            rejected
        );
        Ok(())
    }

    fn resolve_texture<'a>(&self, poly: &Polygon, textures: &'a [Texture]) -> Option<&'a Texture> {
        if self.settings.raster_mode != RasterMode::Textured {
            return None;
        }
        let id = self.settings.texture_override.or(poly.texture)?;
        let texture = textures.get(id);
        if texture.is_none() {
            trace!("texture {} not found, falling back to flat", id);
        }
        texture
    }

    /// Returns false when the polygon was rejected or culled
    fn render_polygon(&mut self, color: &mut [u32], poly: &Polygon, textures: &[Texture]) -> Result<bool, RenderError> {
        let texture = self.resolve_texture(poly, textures);
        let kind = if texture.is_some() {
            StreamKind::Textured
        } else {
            StreamKind::Flat
        };
        let dim = kind.dim();
        let nedge = poly.vertex_count();

        // closed stream: corner 0 is repeated at the end
        let mut copy: [Vert; CLIP_CAPACITY] = [[0; 5]; CLIP_CAPACITY];
        let mut min_z = i32::MAX;
        let mut max_z = i32::MIN;
        for (i, v) in copy.iter_mut().take(nedge + 1).enumerate() {
            let corner = i % nedge;
            let p = self.transformed[poly.indices[corner]];
            v[..3].copy_from_slice(&p);
            if kind == StreamKind::Textured {
                v[3] = poly.uvs[corner][0] << TEX_PRECISION;
                v[4] = poly.uvs[corner][1] << TEX_PRECISION;
            }
            min_z = min_z.min(p[2]);
            max_z = max_z.max(p[2]);
        }

        let frustum = frustum_test(min_z, max_z);
        if frustum == Frustum::Outside {
            return Ok(false);
        }

        // winding is tested in camera space
        let back_face = winding_order(&copy[0], &copy[1], &copy[2]);
        if self.settings.cull_mode.culls(back_face) {
            return Ok(false);
        }

        let mut clipped: [Vert; CLIP_CAPACITY] = [[0; 5]; CLIP_CAPACITY];
        let (stream, count) = if frustum == Frustum::PartialNear {
            match clip_polygon(&mut clipped, &copy, nedge, dim, ClipBound::Near)? {
                ClipOutcome::NotClipped => (&mut copy, nedge),
                ClipOutcome::Clipped { count } => (&mut clipped, count),
            }
        } else {
            (&mut copy, nedge)
        };
        if count == 0 {
            return Ok(false);
        }

        project_stream(&mut stream[..=count], self.settings.fov, &self.viewport);

        match texture {
            Some(tex) => self.raster.fill_textured(color, &self.viewport, &stream[..], count, tex)?,
            None => self
                .raster
                .fill_flat(color, &self.viewport, &stream[..], count, poly.color.to_packed())?,
        }
        Ok(true)
    }
}
