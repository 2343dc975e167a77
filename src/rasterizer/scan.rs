//! Scan conversion: walk polygon edges into per-row span tables

use super::clip::{clip_line_y, clip_polygon, ClipOutcome, Viewport, MAX_POLY_VERTS};
use super::types::{StreamKind, Vert};
use crate::error::RenderError;

/// Extra depth precision added before the edge walk
pub const ZP: u32 = 15;

/// Sub-pixel precision of the edge walk
const SCANP: u32 = 18;
const SCANP_ROUND: i64 = 1 << (SCANP - 1);

/// Clipping against both x bounds adds at most two vertices
const SCAN_CAPACITY: usize = MAX_POLY_VERTS + 3;

/// Per-row left/right extents and the attributes (depth, U, V) at each
pub struct ScanTables {
    pub(super) x_left: Vec<i32>,
    pub(super) x_right: Vec<i32>,
    pub(super) attr_left: Vec<[i64; 3]>,
    pub(super) attr_right: Vec<[i64; 3]>,
    pub(super) min_y: i32,
    pub(super) max_y: i32,
}

impl ScanTables {
    pub fn new(height: usize) -> Self {
        Self {
            x_left: vec![i32::MAX; height],
            x_right: vec![i32::MIN; height],
            attr_left: vec![[0; 3]; height],
            attr_right: vec![[0; 3]; height],
            min_y: i32::MAX,
            max_y: i32::MIN,
        }
    }

    fn reset(&mut self) {
        self.x_left.fill(i32::MAX);
        self.x_right.fill(i32::MIN);
        self.min_y = i32::MAX;
        self.max_y = i32::MIN;
    }

    /// Record the extremes of a closed screen-space stream of `num` vertices.
    ///
    /// Returns false when the polygon covers fewer than two rows, in which
    /// case nothing should be drawn.
    pub fn scan(
        &mut self,
        stream: &[Vert],
        num: usize,
        kind: StreamKind,
        viewport: &Viewport,
    ) -> Result<bool, RenderError> {
        if num > MAX_POLY_VERTS {
            return Err(RenderError::StreamTooLong {
                len: num,
                max: MAX_POLY_VERTS,
            });
        }

        let dim = kind.dim();
        let rdim = dim - 2;
        self.reset();

        let mut clipped = [[0; 5]; SCAN_CAPACITY];
        let verts = match clip_polygon(&mut clipped, stream, num, dim, viewport.x_bound())? {
            ClipOutcome::NotClipped => &stream[..=num],
            ClipOutcome::Clipped { count } => &clipped[..=count],
        };

        for edge in verts.windows(2) {
            let mut va = edge[0];
            let mut vb = edge[1];
            if !clip_line_y(&mut va, &mut vb, dim, viewport.min_y, viewport.max_y) {
                continue;
            }
            self.walk_edge(&va, &vb, rdim);
        }

        Ok(self.min_y < self.max_y)
    }

    fn walk_edge(&mut self, va: &Vert, vb: &Vert, rdim: usize) {
        let (x0, y0) = (va[0] as i64, va[1] as i64);
        let (x1, y1) = (vb[0] as i64, vb[1] as i64);

        self.min_y = self.min_y.min(va[1]).min(vb[1]);
        self.max_y = self.max_y.max(va[1]).max(vb[1]);

        let dx = x1 - x0;
        let dy = y1 - y0;
        let mjr = dx.abs().max(dy.abs());
        if mjr <= 0 {
            return;
        }

        // depth gets extra precision, U/V keep their own
        let mut at = [0i64; 3];
        let mut dt = [0i64; 3];
        at[0] = (va[2] as i64) << ZP;
        dt[0] = ((vb[2] as i64 - va[2] as i64) << ZP) / mjr;
        for i in 1..rdim {
            at[i] = va[2 + i] as i64;
            dt[i] = (vb[2 + i] as i64 - va[2 + i] as i64) / mjr;
        }

        let mut x = (x0 << SCANP) + SCANP_ROUND;
        let mut y = (y0 << SCANP) + SCANP_ROUND;
        let step_x = (dx << SCANP) / mjr;
        let step_y = (dy << SCANP) / mjr;

        for _ in 0..=mjr {
            let sx = (x >> SCANP) as i32;
            let row = (y >> SCANP) as usize;

            if self.x_left[row] > sx {
                self.x_left[row] = sx;
                self.attr_left[row] = at;
            }
            if self.x_right[row] < sx {
                self.x_right[row] = sx;
                self.attr_right[row] = at;
            }

            x += step_x;
            y += step_y;
            for i in 0..rdim {
                at[i] += dt[i];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(x0: i32, y0: i32, x1: i32, y1: i32, z: i32) -> [Vert; 5] {
        [
            [x0, y0, z, 0, 0],
            [x1, y0, z, 0, 0],
            [x1, y1, z, 0, 0],
            [x0, y1, z, 0, 0],
            [x0, y0, z, 0, 0],
        ]
    }

    #[test]
    fn test_rectangle_extents() {
        let vp = Viewport::new(100, 100);
        let mut tables = ScanTables::new(100);
        let draw = tables
            .scan(&quad(10, 20, 60, 40, 1000), 4, StreamKind::Flat, &vp)
            .unwrap();
        assert!(draw);
        assert_eq!((tables.min_y, tables.max_y), (20, 40));
        for row in 20..=40 {
            assert_eq!(tables.x_left[row], 10);
            assert_eq!(tables.x_right[row], 60);
            assert_eq!(tables.attr_left[row][0], 1000 << ZP);
        }
        assert_eq!(tables.x_left[19], i32::MAX);
        assert_eq!(tables.x_right[41], i32::MIN);
    }

    #[test]
    fn test_offscreen_polygon_is_clipped_to_viewport() {
        let vp = Viewport::new(100, 100);
        let mut tables = ScanTables::new(100);
        let draw = tables
            .scan(&quad(-50, -50, 150, 150, 1000), 4, StreamKind::Flat, &vp)
            .unwrap();
        assert!(draw);
        assert_eq!((tables.min_y, tables.max_y), (0, 99));
        assert_eq!(tables.x_left[50], 0);
        assert_eq!(tables.x_right[50], 99);
    }

    #[test]
    fn test_single_row_draws_nothing() {
        let vp = Viewport::new(100, 100);
        let mut tables = ScanTables::new(100);
        let draw = tables
            .scan(&quad(10, 30, 60, 30, 1000), 4, StreamKind::Flat, &vp)
            .unwrap();
        assert!(!draw);
    }

    #[test]
    fn test_fully_outside_draws_nothing() {
        let vp = Viewport::new(100, 100);
        let mut tables = ScanTables::new(100);
        let draw = tables
            .scan(&quad(200, 10, 260, 40, 1000), 4, StreamKind::Flat, &vp)
            .unwrap();
        assert!(!draw);
    }

    #[test]
    fn test_uv_interpolated_along_edge() {
        let vp = Viewport::new(100, 100);
        let mut tables = ScanTables::new(100);
        let stream = [
            [10, 10, 100, 0, 0],
            [10, 74, 100, 0, 64 << 12],
            [50, 74, 100, 0, 64 << 12],
            [10, 10, 100, 0, 0],
        ];
        tables.scan(&stream, 3, StreamKind::Textured, &vp).unwrap();
        // left edge runs straight down, V grows by one texel per row
        assert_eq!(tables.attr_left[42][2], 32 << 12);
    }

    #[test]
    fn test_too_many_vertices() {
        let vp = Viewport::new(100, 100);
        let mut tables = ScanTables::new(100);
        let stream = [[0; 5]; 12];
        assert!(tables.scan(&stream, 11, StreamKind::Flat, &vp).is_err());
    }
}
