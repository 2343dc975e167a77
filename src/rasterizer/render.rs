//! Span fill, depth buffer and buffer clears
//! Flat and affine-textured polygons with depth shading

use super::clip::Viewport;
use super::scan::ScanTables;
use super::types::{StreamKind, Texture, Vert, TEX_LOG_DIM, TEX_PRECISION};
use crate::error::RenderError;

/// Wrap mask for interpolated texture coordinates
const TEX_MASK: i64 = (1 << (TEX_LOG_DIM + TEX_PRECISION)) - 1;

/// Owns the depth buffer and scan scratch; draws into a borrowed color buffer
pub struct Rasterizer {
    pub width: usize,
    pub height: usize,
    /// Closeness per pixel, 0 is farthest
    depth: Vec<i64>,
    tables: ScanTables,
    /// mul8[i][j] = i * j / 256
    mul8: Vec<[u8; 256]>,
    polygon_count: usize,
}

impl Rasterizer {
    pub fn new(width: usize, height: usize) -> Self {
        let mul8 = (0..256usize)
            .map(|i| {
                let mut row = [0u8; 256];
                for (j, v) in row.iter_mut().enumerate() {
                    *v = ((i * j) >> 8) as u8;
                }
                row
            })
            .collect();

        Self {
            width,
            height,
            depth: vec![0; width * height],
            tables: ScanTables::new(height),
            mul8,
            polygon_count: 0,
        }
    }

    pub fn depth(&self) -> &[i64] {
        &self.depth
    }

    /// Polygons filled since the last reset
    pub fn polygon_count(&self) -> usize {
        self.polygon_count
    }

    pub fn reset_polygon_count(&mut self) {
        self.polygon_count = 0;
    }

    pub fn check_color_buffer(&self, color: &[u32]) -> Result<(), RenderError> {
        let required = self.width * self.height;
        if color.len() < required {
            return Err(RenderError::ColorBufferTooSmall {
                len: color.len(),
                required,
            });
        }
        Ok(())
    }

    /// Fill the viewport rectangle of the color buffer
    pub fn clear_color(&self, color: &mut [u32], viewport: &Viewport, rgb: u32) -> Result<(), RenderError> {
        self.check_color_buffer(color)?;
        for y in viewport.min_y..=viewport.max_y {
            let row = y as usize * self.width;
            let (x0, x1) = (viewport.min_x as usize, viewport.max_x as usize);
            if x0 <= x1 {
                color[row + x0..=row + x1].fill(rgb);
            }
        }
        Ok(())
    }

    /// Reset the viewport rectangle of the depth buffer to farthest
    pub fn clear_depth(&mut self, viewport: &Viewport) {
        for y in viewport.min_y..=viewport.max_y {
            let row = y as usize * self.width;
            let (x0, x1) = (viewport.min_x as usize, viewport.max_x as usize);
            if x0 <= x1 {
                self.depth[row + x0..=row + x1].fill(0);
            }
        }
    }

    /// Attenuate a packed color by depth; close pixels are unshaded
    #[inline]
    fn shade(&self, rgb: u32, sz: i64) -> u32 {
        let d = (sz >> 20) * 3 / 2;
        if d >= 256 {
            return rgb;
        }
        let m = &self.mul8[d.max(0) as usize];
        let r = m[((rgb >> 16) & 0xff) as usize] as u32;
        let g = m[((rgb >> 8) & 0xff) as usize] as u32;
        let b = m[(rgb & 0xff) as usize] as u32;
        (r << 16) | (g << 8) | b
    }

    /// Fill a closed, projected X Y Z stream of `num` vertices with one color
    pub fn fill_flat(
        &mut self,
        color: &mut [u32],
        viewport: &Viewport,
        stream: &[Vert],
        num: usize,
        rgb: u32,
    ) -> Result<(), RenderError> {
        self.check_color_buffer(color)?;
        if !self.tables.scan(stream, num, StreamKind::Flat, viewport)? {
            return Ok(());
        }

        for y in self.tables.min_y..=self.tables.max_y {
            let row = y as usize;
            let (xl, xr) = (self.tables.x_left[row], self.tables.x_right[row]);
            if xl > xr {
                continue;
            }
            let len = (xr - xl) as i64;
            let dlen = len + (len == 0) as i64;
            let mut sz = self.tables.attr_left[row][0];
            let dz = (self.tables.attr_right[row][0] - sz) / dlen;

            let start = row * self.width + xl as usize;
            for idx in start..=start + len as usize {
                if self.depth[idx] < sz {
                    self.depth[idx] = sz;
                    color[idx] = self.shade(rgb, sz);
                }
                sz += dz;
            }
        }

        self.polygon_count += 1;
        Ok(())
    }

    /// Fill a closed, projected X Y Z U V stream with an affine-mapped texture.
    /// U and V carry `TEX_PRECISION` fractional bits.
    pub fn fill_textured(
        &mut self,
        color: &mut [u32],
        viewport: &Viewport,
        stream: &[Vert],
        num: usize,
        texture: &Texture,
    ) -> Result<(), RenderError> {
        self.check_color_buffer(color)?;
        if !self.tables.scan(stream, num, StreamKind::Textured, viewport)? {
            return Ok(());
        }
        let texels = texture.pixels();

        for y in self.tables.min_y..=self.tables.max_y {
            let row = y as usize;
            let (xl, xr) = (self.tables.x_left[row], self.tables.x_right[row]);
            if xl > xr {
                continue;
            }
            let len = (xr - xl) as i64;
            let dlen = len + (len == 0) as i64;
            let [mut sz, mut su, mut sv] = self.tables.attr_left[row];
            let [zr, ur, vr] = self.tables.attr_right[row];
            let dz = (zr - sz) / dlen;
            let du = (ur - su) / dlen;
            let dv = (vr - sv) / dlen;

            let start = row * self.width + xl as usize;
            for idx in start..=start + len as usize {
                if self.depth[idx] < sz {
                    self.depth[idx] = sz;
                    su &= TEX_MASK;
                    sv &= TEX_MASK;
                    let texel = texels
                        [((su >> TEX_PRECISION) | ((sv >> TEX_PRECISION) << TEX_LOG_DIM)) as usize];
                    color[idx] = self.shade(texel, sz);
                }
                su += du;
                sv += dv;
                sz += dz;
            }
        }

        self.polygon_count += 1;
        Ok(())
    }
}
