//! Perspective projection from camera space to screen space

use super::clip::Viewport;
use super::types::Vert;

/// Projected x/y saturate here so later clip products stay in range
const SCREEN_LIMIT: i64 = 1 << 24;

/// Project one camera-space vertex in place.
///
/// x and y become pixel coordinates (y grows downward), z becomes the depth
/// key (larger is closer). Trailing attributes are left alone.
#[inline]
pub fn project_vertex(v: &mut Vert, fov: u32, viewport: &Viewport) {
    let f = 1i64 << (fov + 12);
    let fz = f / (v[2] as i64).max(1);

    let x = ((v[0] as i64 * fz + 2048) >> 12).clamp(-SCREEN_LIMIT, SCREEN_LIMIT);
    let y = ((v[1] as i64 * fz + 2048) >> 12).clamp(-SCREEN_LIMIT, SCREEN_LIMIT);

    v[0] = x as i32 + viewport.center_x;
    v[1] = viewport.center_y - y as i32;
    v[2] = (fz >> (fov - 8)) as i32;
}

/// Project every vertex of a stream
pub fn project_stream(stream: &mut [Vert], fov: u32, viewport: &Viewport) {
    for v in stream {
        project_vertex(v, fov, viewport);
    }
}
