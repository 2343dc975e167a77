//! Model matrix stack and camera
//!
//! The stack holds the active model matrix. The camera is kept apart from it:
//! its translation and yaw/pitch are applied per vertex after the model
//! matrix, in a fixed order (translate, yaw about Y, pitch about X).

use super::fixed::{
    fixed_cos, fixed_sin, mat4_identity, mat4_mul, mat4_rotation_x, mat4_rotation_y,
    mat4_rotation_z, mat4_scale, mat4_translation, Mat4, P, TRIG_MASK, TRIG_MAX,
};
use crate::error::RenderError;

/// Default limit on saved matrices
pub const DEFAULT_STACK_DEPTH: usize = 64;

/// Bounded stack of Q15 model matrices
#[derive(Debug, Clone)]
pub struct MatrixStack {
    current: Mat4,
    saved: Vec<Mat4>,
    max_depth: usize,
}

impl MatrixStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            current: mat4_identity(),
            saved: Vec::with_capacity(max_depth),
            max_depth,
        }
    }

    /// Active (top) matrix
    pub fn top(&self) -> &Mat4 {
        &self.current
    }

    /// Number of saved matrices below the top
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Save a copy of the top matrix
    pub fn push(&mut self) -> Result<(), RenderError> {
        if self.saved.len() + 1 > self.max_depth {
            return Err(RenderError::StackOverflow {
                max_depth: self.max_depth,
            });
        }
        self.saved.push(self.current);
        Ok(())
    }

    /// Restore the most recently saved matrix
    pub fn pop(&mut self) -> Result<(), RenderError> {
        self.current = self.saved.pop().ok_or(RenderError::StackUnderflow)?;
        Ok(())
    }

    /// Drop every saved matrix and load identity
    pub fn reset(&mut self) {
        self.saved.clear();
        self.current = mat4_identity();
    }

    pub fn load_identity(&mut self) {
        self.current = mat4_identity();
    }

    pub fn load(&mut self, m: &Mat4) {
        self.current = *m;
    }

    /// top = top ∘ m (m is applied to vertices first)
    pub fn mul(&mut self, m: &Mat4) {
        self.current = mat4_mul(&self.current, m);
    }

    /// Scale factors are Q15
    pub fn scale(&mut self, x: i32, y: i32, z: i32) {
        self.mul(&mat4_scale(x, y, z));
    }

    pub fn translate(&mut self, x: i32, y: i32, z: i32) {
        self.mul(&mat4_translation(x, y, z));
    }

    pub fn rotate_x(&mut self, angle: i32) {
        self.mul(&mat4_rotation_x(angle));
    }

    pub fn rotate_y(&mut self, angle: i32) {
        self.mul(&mat4_rotation_y(angle));
    }

    pub fn rotate_z(&mut self, angle: i32) {
        self.mul(&mat4_rotation_z(angle));
    }
}

impl Default for MatrixStack {
    fn default() -> Self {
        Self::new(DEFAULT_STACK_DEPTH)
    }
}

/// View state: negated position and inverted table angles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Camera {
    pub tx: i32,
    pub ty: i32,
    pub tz: i32,
    /// Inverted pitch (rotation about X)
    pub rx: i32,
    /// Inverted yaw (rotation about Y)
    pub ry: i32,
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place the camera at (x, y, z) looking along +Z after yaw then pitch
    pub fn set(&mut self, x: i32, y: i32, z: i32, pitch: i32, yaw: i32) {
        self.tx = -x;
        self.ty = -y;
        self.tz = -z;
        self.rx = (TRIG_MAX - pitch) & TRIG_MASK;
        self.ry = (TRIG_MAX - yaw) & TRIG_MASK;
    }
}

/// Transform model-space vertices into camera space.
///
/// Applies the linear part and translation row of `model`, then the camera
/// translation, yaw and pitch. `dst` must hold at least `src.len()` entries.
pub fn transform_stream(model: &Mat4, camera: &Camera, src: &[[i32; 3]], dst: &mut [[i32; 3]]) {
    let m = model.map(|e| e as i64);
    let tx = camera.tx as i64 + m[12];
    let ty = camera.ty as i64 + m[13];
    let tz = camera.tz as i64 + m[14];

    let cx = fixed_cos(camera.rx) as i64;
    let sx = fixed_sin(camera.rx) as i64;
    let cy = fixed_cos(camera.ry) as i64;
    let sy = fixed_sin(camera.ry) as i64;

    for (v, out) in src.iter().zip(dst.iter_mut()) {
        let (x, y, z) = (v[0] as i64, v[1] as i64, v[2] as i64);

        let mut xx = ((x * m[0] + y * m[4] + z * m[8]) >> P) + tx;
        let mut yy = ((x * m[1] + y * m[5] + z * m[9]) >> P) + ty;
        let mut zz = ((x * m[2] + y * m[6] + z * m[10]) >> P) + tz;

        // yaw
        let w = (zz * sy + xx * cy) >> P;
        zz = (zz * cy - xx * sy) >> P;
        xx = w;

        // pitch
        let w = (yy * cx - zz * sx) >> P;
        zz = (yy * sx + zz * cx) >> P;
        yy = w;

        *out = [xx as i32, yy as i32, zz as i32];
    }
}
