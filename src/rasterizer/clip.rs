//! Viewport and near-plane clipping
//!
//! Edges are clipped one at a time. The two endpoints are ordered along the
//! clip axis so the same interpolation serves both ends of the bound, and
//! the caller learns which of its two vertices was replaced.
//!
//! Precision:
//! - 2D (screen) clips compute the fraction at 15 bits. Depth uses all 15,
//!   the other screen axis 14, trailing attributes 7.
//! - The near-plane clip runs before projection and uses an 8-bit fraction.

use super::types::Vert;
use crate::error::RenderError;

/// Camera-space depth below which geometry is behind the near plane
pub const NEAR_PLANE: i32 = 16;

/// Most vertices a polygon may carry after near-plane clipping
pub const MAX_POLY_VERTS: usize = 8;

/// Closed vertex stream able to hold a fully clipped polygon
pub const CLIP_CAPACITY: usize = MAX_POLY_VERTS + 1;

/// 2D clip fraction precision for the non-bound screen axis
const HI_P: u32 = 14;
const HH_P: u32 = HI_P >> 1;

/// Near-plane interpolation precision
const CLIP_P: u32 = 8;

/// Screen-space clip rectangle (inclusive) and projection center
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
    pub center_x: i32,
    pub center_y: i32,
    width: i32,
    height: i32,
}

impl Viewport {
    /// Viewport covering a whole `width` x `height` buffer
    pub fn new(width: usize, height: usize) -> Self {
        let mut vp = Self {
            min_x: 0,
            max_x: 0,
            min_y: 0,
            max_y: 0,
            center_x: 0,
            center_y: 0,
            width: width as i32,
            height: height as i32,
        };
        vp.set(0, 0, width as i32 - 1, height as i32 - 1, true);
        vp
    }

    /// Set the clip rectangle, clamped to the buffer.
    /// The center is only recomputed when `update_center` is set.
    pub fn set(&mut self, min_x: i32, min_y: i32, max_x: i32, max_y: i32, update_center: bool) {
        let (w, h) = (self.width - 1, self.height - 1);
        self.min_x = min_x.clamp(0, w);
        self.min_y = min_y.clamp(0, h);
        self.max_x = max_x.clamp(0, w);
        self.max_y = max_y.clamp(0, h);
        if update_center {
            self.center_x = ((self.min_x + self.max_x) >> 1) + 1;
            self.center_y = ((self.min_y + self.max_y) >> 1) + 1;
        }
    }

    pub fn buffer_width(&self) -> usize {
        self.width as usize
    }

    pub fn buffer_height(&self) -> usize {
        self.height as usize
    }

    /// Bound against the x extent of the viewport
    pub fn x_bound(&self) -> ClipBound {
        ClipBound::X { min: self.min_x, max: self.max_x }
    }

    /// Bound against the y extent of the viewport
    pub fn y_bound(&self) -> ClipBound {
        ClipBound::Y { min: self.min_y, max: self.max_y }
    }
}

/// Screen axis of a 2D clip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
        }
    }

    fn other(self) -> usize {
        match self {
            Axis::X => 1,
            Axis::Y => 0,
        }
    }
}

/// What a polygon clip pass clips against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipBound {
    X { min: i32, max: i32 },
    Y { min: i32, max: i32 },
    Near,
}

/// Result of clipping one edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeClip {
    /// No part of the edge survives
    Outside,
    /// Both endpoints were already inside
    NotClipped,
    /// At least one endpoint was moved onto the bound
    Clipped {
        first_replaced: bool,
        second_replaced: bool,
    },
}

impl EdgeClip {
    pub fn is_visible(self) -> bool {
        self != EdgeClip::Outside
    }

    fn first_replaced(self) -> bool {
        matches!(self, EdgeClip::Clipped { first_replaced: true, .. })
    }
}

/// Result of clipping a polygon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipOutcome {
    /// The input stream can be used unchanged
    NotClipped,
    /// The output stream holds `count` vertices plus a closing copy of the first
    Clipped { count: usize },
}

/// Interpolate `l` towards `r` where the `comp` axis reaches `bound`
fn doclip(l: &Vert, r: &Vert, dim: usize, bound: i32, comp: usize, ocomp: usize) -> Vert {
    let d = |i: usize| r[i] as i64 - l[i] as i64;

    let mut out = *l;
    let fhp = ((bound as i64 - l[comp] as i64) << 15) / d(comp);
    let fh = fhp >> (15 - HI_P);
    let f = fh >> HH_P;

    for i in 3..dim {
        out[i] = (l[i] as i64 + f * (d(i) >> HH_P)) as i32;
    }
    // depth keeps the full fraction
    out[2] = (l[2] as i64 + ((fhp * d(2)) >> 15)) as i32;
    out[comp] = bound;
    out[ocomp] = (l[ocomp] as i64 + ((fh * d(ocomp)) >> HI_P)) as i32;
    out
}

/// Clip the edge `a`-`b` to `min..=max` along `axis`, replacing endpoints in place.
pub fn clip_edge(a: &mut Vert, b: &mut Vert, dim: usize, axis: Axis, min: i32, max: i32) -> EdgeClip {
    let comp = axis.index();
    let ocomp = axis.other();

    // canonical order: l has the smaller axis value
    let a_is_left = a[comp] < b[comp];
    let (l, r) = if a_is_left { (*a, *b) } else { (*b, *a) };

    if l[comp] >= max || r[comp] <= min {
        return EdgeClip::Outside;
    }

    let mut replaced_left = false;
    let mut replaced_right = false;
    let mut new_l = l;
    let mut new_r = r;

    if l[comp] <= min {
        new_l = doclip(&l, &r, dim, min, comp, ocomp);
        replaced_left = true;
    }
    if r[comp] >= max {
        new_r = doclip(&l, &r, dim, max, comp, ocomp);
        replaced_right = true;
    }

    if !replaced_left && !replaced_right {
        return EdgeClip::NotClipped;
    }

    if a_is_left {
        *a = new_l;
        *b = new_r;
        EdgeClip::Clipped {
            first_replaced: replaced_left,
            second_replaced: replaced_right,
        }
    } else {
        *a = new_r;
        *b = new_l;
        EdgeClip::Clipped {
            first_replaced: replaced_right,
            second_replaced: replaced_left,
        }
    }
}

/// Clip the camera-space edge `a`-`b` to the near plane.
/// Only the endpoint nearer the eye can be replaced.
pub fn clip_edge_near(a: &mut Vert, b: &mut Vert, dim: usize) -> EdgeClip {
    let a_is_left = a[2] < b[2];
    let (l, r) = if a_is_left { (*a, *b) } else { (*b, *a) };

    if r[2] < NEAR_PLANE {
        return EdgeClip::Outside;
    }
    if l[2] >= NEAR_PLANE {
        return EdgeClip::NotClipped;
    }

    let f = ((NEAR_PLANE as i64 - l[2] as i64) << CLIP_P) / (r[2] as i64 - l[2] as i64);
    let lerp = |i: usize| (l[i] as i64 + ((f * (r[i] as i64 - l[i] as i64)) >> CLIP_P)) as i32;

    let mut m = l;
    m[0] = lerp(0);
    m[1] = lerp(1);
    m[2] = NEAR_PLANE;
    for i in 3..dim {
        m[i] = lerp(i);
    }

    if a_is_left {
        *a = m;
    } else {
        *b = m;
    }
    EdgeClip::Clipped {
        first_replaced: a_is_left,
        second_replaced: !a_is_left,
    }
}

/// Line clip against the x bounds; true when any part is visible
pub fn clip_line_x(a: &mut Vert, b: &mut Vert, dim: usize, min: i32, max: i32) -> bool {
    clip_edge(a, b, dim, Axis::X, min, max).is_visible()
}

/// Line clip against the y bounds; true when any part is visible
pub fn clip_line_y(a: &mut Vert, b: &mut Vert, dim: usize, min: i32, max: i32) -> bool {
    clip_edge(a, b, dim, Axis::Y, min, max).is_visible()
}

fn emit(dst: &mut [Vert], count: &mut usize, capacity: usize, v: Vert) -> Result<(), RenderError> {
    if *count >= capacity {
        return Err(RenderError::ClipOverflow {
            count: *count + 1,
            max: capacity,
        });
    }
    dst[*count] = v;
    *count += 1;
    Ok(())
}

/// Clip a closed polygon stream.
///
/// `src` holds `num` vertices followed by a copy of the first. On
/// `Clipped { count }`, `dst` holds `count` vertices followed by a copy of
/// the first; `count` may be zero when nothing survives.
pub fn clip_polygon(
    dst: &mut [Vert],
    src: &[Vert],
    num: usize,
    dim: usize,
    bound: ClipBound,
) -> Result<ClipOutcome, RenderError> {
    if src.len() <= num {
        return Err(RenderError::StreamTooLong {
            len: num + 1,
            max: src.len(),
        });
    }
    let capacity = dst.len().saturating_sub(1);

    let mut count = 0;
    let mut modified = false;

    for edge in src[..=num].windows(2) {
        let mut a = edge[0];
        let mut b = edge[1];
        let result = match bound {
            ClipBound::X { min, max } => clip_edge(&mut a, &mut b, dim, Axis::X, min, max),
            ClipBound::Y { min, max } => clip_edge(&mut a, &mut b, dim, Axis::Y, min, max),
            ClipBound::Near => clip_edge_near(&mut a, &mut b, dim),
        };

        match result {
            EdgeClip::Outside => {
                modified = true;
                continue;
            }
            EdgeClip::NotClipped => {}
            EdgeClip::Clipped { .. } => modified = true,
        }

        if result.first_replaced() {
            emit(dst, &mut count, capacity, a)?;
        }
        emit(dst, &mut count, capacity, b)?;
    }

    if !modified {
        return Ok(ClipOutcome::NotClipped);
    }
    if count > 0 {
        dst[count] = dst[0];
    }
    Ok(ClipOutcome::Clipped { count })
}

/// Depth classification against the near plane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frustum {
    /// Entirely in front of the near plane
    InView,
    /// Straddles the near plane, needs a near clip
    PartialNear,
    /// Entirely behind the near plane
    Outside,
}

/// Classify a polygon by its camera-space depth extents
pub fn frustum_test(min_z: i32, max_z: i32) -> Frustum {
    if max_z <= NEAR_PLANE {
        Frustum::Outside
    } else if min_z < NEAR_PLANE {
        Frustum::PartialNear
    } else {
        Frustum::InView
    }
}

/// Classify a single camera-space point
pub fn point_frustum_test(z: i32) -> Frustum {
    if z <= NEAR_PLANE {
        Frustum::Outside
    } else {
        Frustum::InView
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closed(verts: &[Vert]) -> Vec<Vert> {
        let mut v = verts.to_vec();
        v.push(verts[0]);
        v
    }

    #[test]
    fn test_viewport_clamps_and_centers() {
        let mut vp = Viewport::new(896, 504);
        assert_eq!((vp.min_x, vp.max_x, vp.min_y, vp.max_y), (0, 895, 0, 503));
        assert_eq!((vp.center_x, vp.center_y), (448, 252));

        vp.set(-10, -10, 5000, 100, false);
        assert_eq!((vp.min_x, vp.max_x, vp.min_y, vp.max_y), (0, 895, 0, 100));
        assert_eq!((vp.center_x, vp.center_y), (448, 252));
    }

    #[test]
    fn test_edge_inside_is_not_clipped() {
        let mut a = [10, 10, 100, 0, 0];
        let mut b = [50, 20, 200, 0, 0];
        assert_eq!(clip_edge(&mut a, &mut b, 3, Axis::X, 0, 100), EdgeClip::NotClipped);
        assert_eq!(a, [10, 10, 100, 0, 0]);
    }

    #[test]
    fn test_edge_clipped_to_exact_bound() {
        let mut a = [-100, 0, 1000, 0, 0];
        let mut b = [100, 100, 3000, 0, 0];
        let r = clip_edge(&mut a, &mut b, 3, Axis::X, 0, 50);
        assert_eq!(
            r,
            EdgeClip::Clipped { first_replaced: true, second_replaced: true }
        );
        assert_eq!(a[0], 0);
        assert_eq!(b[0], 50);
        // halfway along: y and depth interpolated
        assert_eq!(a[1], 50);
        assert_eq!(a[2], 2000);
        assert_eq!(b[1], 75);
        assert_eq!(b[2], 2500);
    }

    #[test]
    fn test_edge_order_reports_replaced_endpoint() {
        // second argument is the one outside
        let mut a = [20, 5, 100, 0, 0];
        let mut b = [20, -20, 100, 0, 0];
        let r = clip_edge(&mut a, &mut b, 3, Axis::Y, 0, 50);
        assert_eq!(
            r,
            EdgeClip::Clipped { first_replaced: false, second_replaced: true }
        );
        assert_eq!(a, [20, 5, 100, 0, 0]);
        assert_eq!(b[1], 0);
    }

    #[test]
    fn test_edge_outside() {
        let mut a = [-20, 0, 100, 0, 0];
        let mut b = [-5, 0, 100, 0, 0];
        assert!(!clip_line_x(&mut a, &mut b, 3, 0, 100));
        let mut a = [0, 200, 100, 0, 0];
        let mut b = [0, 300, 100, 0, 0];
        assert!(!clip_line_y(&mut a, &mut b, 3, 0, 100));
    }

    #[test]
    fn test_attributes_interpolated() {
        let mut a = [-64, 0, 0, 0, 0];
        let mut b = [64, 0, 0, 128 << 12, 64 << 12];
        clip_edge(&mut a, &mut b, 5, Axis::X, 0, 1000);
        assert_eq!(a[0], 0);
        assert_eq!(a[3], 64 << 12);
        assert_eq!(a[4], 32 << 12);
    }

    #[test]
    fn test_near_clip() {
        let mut a = [0, 0, 0, 0, 0];
        let mut b = [256, -256, 32, 1 << 12, 0];
        let r = clip_edge_near(&mut a, &mut b, 5);
        assert_eq!(
            r,
            EdgeClip::Clipped { first_replaced: true, second_replaced: false }
        );
        assert_eq!(a, [128, -128, NEAR_PLANE, 1 << 11, 0]);
        assert_eq!(b, [256, -256, 32, 1 << 12, 0]);

        let mut a = [0, 0, 5, 0, 0];
        let mut b = [0, 0, 15, 0, 0];
        assert_eq!(clip_edge_near(&mut a, &mut b, 3), EdgeClip::Outside);
    }

    #[test]
    fn test_extreme_coordinates_clip_without_overflow() {
        let mut a = [-2_000_000_000, 10, 1000, 0, 0];
        let mut b = [2_000_000_000, 20, 1000, 0, 0];
        let r = clip_edge(&mut a, &mut b, 3, Axis::X, 0, 63);
        assert_eq!(
            r,
            EdgeClip::Clipped { first_replaced: true, second_replaced: true }
        );
        assert_eq!((a[0], b[0]), (0, 63));
        assert_eq!(a[1], 15);

        let mut a = [-1_500_000_000, 0, 0, 0, 0];
        let mut b = [1_500_000_000, 0, 100, 0, 0];
        clip_edge_near(&mut a, &mut b, 3);
        assert_eq!(a[2], NEAR_PLANE);
        assert_eq!(a[0], -1_500_000_000 + ((40i64 * 3_000_000_000) >> 8) as i32);
    }

    #[test]
    fn test_zigzag_quad_near_clip_fits_capacity() {
        // every edge crosses the plane, the worst case for a quad
        let src = closed(&[
            [-10, -10, 0, 0, 0],
            [10, -10, 100, 0, 0],
            [10, 10, 0, 0, 0],
            [-10, 10, 100, 0, 0],
        ]);
        let mut dst = [[0; 5]; CLIP_CAPACITY];
        let out = clip_polygon(&mut dst, &src, 4, 5, ClipBound::Near).unwrap();
        assert_eq!(out, ClipOutcome::Clipped { count: 6 });
        assert!(dst[..6].iter().all(|v| v[2] >= NEAR_PLANE));
        assert_eq!(dst[6], dst[0]);
    }

    #[test]
    fn test_polygon_inside_reports_not_clipped() {
        let src = closed(&[
            [10, 10, 100, 0, 0],
            [90, 10, 100, 0, 0],
            [90, 90, 100, 0, 0],
            [10, 90, 100, 0, 0],
        ]);
        let mut dst = [[0; 5]; CLIP_CAPACITY];
        let vp = Viewport::new(100, 100);
        assert_eq!(
            clip_polygon(&mut dst, &src, 4, 3, vp.x_bound()).unwrap(),
            ClipOutcome::NotClipped
        );
        assert_eq!(
            clip_polygon(&mut dst, &src, 4, 3, vp.y_bound()).unwrap(),
            ClipOutcome::NotClipped
        );
        assert_eq!(
            clip_polygon(&mut dst, &src, 4, 3, ClipBound::Near).unwrap(),
            ClipOutcome::NotClipped
        );
    }

    #[test]
    fn test_polygon_clip_hits_bound_exactly() {
        let src = closed(&[
            [-50, 10, 100, 0, 0],
            [50, 10, 100, 0, 0],
            [50, 60, 100, 0, 0],
            [-50, 60, 100, 0, 0],
        ]);
        let mut dst = [[0; 5]; CLIP_CAPACITY];
        let out = clip_polygon(&mut dst, &src, 4, 3, ClipBound::X { min: 0, max: 99 }).unwrap();
        let ClipOutcome::Clipped { count } = out else {
            panic!("expected a clip");
        };
        assert_eq!(count, 4);
        assert!(dst[..count].iter().all(|v| v[0] == 0 || v[0] == 50));
        assert_eq!(dst[count], dst[0]);
    }

    #[test]
    fn test_near_clip_grows_polygon() {
        // triangle with one vertex behind the plane becomes a quad
        let src = closed(&[
            [0, 0, 0, 0, 0],
            [100, 0, 100, 0, 0],
            [0, 100, 100, 0, 0],
        ]);
        let mut dst = [[0; 5]; CLIP_CAPACITY];
        let out = clip_polygon(&mut dst, &src, 3, 3, ClipBound::Near).unwrap();
        assert_eq!(out, ClipOutcome::Clipped { count: 4 });
        assert!(dst[..4].iter().all(|v| v[2] >= NEAR_PLANE));
    }

    #[test]
    fn test_polygon_clip_overflow_is_an_error() {
        let src = closed(&[
            [0, 0, 0, 0, 0],
            [100, 0, 100, 0, 0],
            [0, 100, 100, 0, 0],
        ]);
        let mut dst = [[0; 5]; 3];
        assert!(matches!(
            clip_polygon(&mut dst, &src, 3, 3, ClipBound::Near),
            Err(RenderError::ClipOverflow { .. })
        ));
    }

    #[test]
    fn test_frustum_classification() {
        assert_eq!(frustum_test(0, 16), Frustum::Outside);
        assert_eq!(frustum_test(0, 17), Frustum::PartialNear);
        assert_eq!(frustum_test(16, 100), Frustum::InView);
        assert_eq!(point_frustum_test(16), Frustum::Outside);
        assert_eq!(point_frustum_test(17), Frustum::InView);
    }
}
