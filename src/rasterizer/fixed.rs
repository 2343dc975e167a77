//! Fixed-point math for the integer pipeline
//!
//! Everything the transform stage touches is Q15: 15 fractional bits, so
//! `P_ONE` (32768) is 1.0. Angles are indices into a 256-entry table that
//! spans a full turn, and wrap with a bitmask.

// =============================================================================
// Q15 scalars
// =============================================================================

/// Fractional bits of the transform fixed-point format
pub const P: u32 = 15;

/// 1.0 in Q15
pub const P_ONE: i32 = 1 << P;

/// Fixed-point multiply: product right-shifted back down to Q15.
///
/// This is the multiply-accumulate term used throughout the pipeline; sums
/// of several products are formed from already-shifted terms.
#[inline]
pub fn fx_mul(a: i32, b: i32) -> i32 {
    ((a as i64 * b as i64) >> P) as i32
}

// =============================================================================
// Sin/Cos lookup tables
// =============================================================================

/// Number of entries in the sin/cos tables (one full turn)
pub const TRIG_MAX: i32 = 256;

/// Mask that wraps any angle index into the table
pub const TRIG_MASK: i32 = TRIG_MAX - 1;

/// First quarter of the sine wave in Q15, indices 0..=64 (0 to 90 degrees)
const QUARTER_SINE: [i32; 65] = [
    0x0000, 0x0324, 0x0647, 0x096a, 0x0c8b, 0x0fab, 0x12c8, 0x15e2,
    0x18f8, 0x1c0b, 0x1f19, 0x2223, 0x2528, 0x2826, 0x2b1f, 0x2e11,
    0x30fb, 0x33de, 0x36ba, 0x398c, 0x3c56, 0x3f17, 0x41ce, 0x447a,
    0x471c, 0x49b4, 0x4c3f, 0x4ebf, 0x5133, 0x539b, 0x55f5, 0x5842,
    0x5a82, 0x5cb4, 0x5ed7, 0x60ec, 0x62f2, 0x64e8, 0x66cf, 0x68a6,
    0x6a6d, 0x6c24, 0x6dca, 0x6f5f, 0x70e2, 0x7255, 0x73b5, 0x7504,
    0x7641, 0x776c, 0x7884, 0x798a, 0x7a7d, 0x7b5d, 0x7c29, 0x7ce3,
    0x7d8a, 0x7e1d, 0x7e9d, 0x7f09, 0x7f62, 0x7fa7, 0x7fd8, 0x7ff6,
    0x8000,
];

/// Sine table, Q15. Index 64 = 90 degrees, 128 = 180, 192 = 270.
pub static SIN_TABLE: [i32; TRIG_MAX as usize] = generate_sin_table();

/// Cosine table, Q15. Built from the sine table by a quarter-turn shift.
pub static COS_TABLE: [i32; TRIG_MAX as usize] = generate_cos_table();

/// Mirror the quarter wave into a full turn.
/// The second quarter reflects the first about 90 degrees, and the second
/// half is the first half negated.
const fn generate_sin_table() -> [i32; TRIG_MAX as usize] {
    let mut table = [0i32; TRIG_MAX as usize];
    let half = (TRIG_MAX >> 1) as usize;
    let quarter = (TRIG_MAX >> 2) as usize;
    let mut i = 0;
    while i < half {
        table[i] = if i <= quarter {
            QUARTER_SINE[i]
        } else {
            QUARTER_SINE[half - i]
        };
        table[half + i] = -table[i];
        i += 1;
    }
    table
}

const fn generate_cos_table() -> [i32; TRIG_MAX as usize] {
    let sin = generate_sin_table();
    let mut table = [0i32; TRIG_MAX as usize];
    let mut i = 0;
    while i < TRIG_MAX as usize {
        table[i] = sin[(i + (TRIG_MAX >> 2) as usize) & TRIG_MASK as usize];
        i += 1;
    }
    table
}

/// Q15 sine of a table angle (any integer, wrapped)
#[inline]
pub fn fixed_sin(angle: i32) -> i32 {
    SIN_TABLE[(angle & TRIG_MASK) as usize]
}

/// Q15 cosine of a table angle (any integer, wrapped)
#[inline]
pub fn fixed_cos(angle: i32) -> i32 {
    COS_TABLE[(angle & TRIG_MASK) as usize]
}

// =============================================================================
// 4x4 affine matrices
// =============================================================================

/// Row-major Q15 affine matrix. Translation lives in elements 12..15; the
/// last column is never read by the transform code.
pub type Mat4 = [i32; 16];

#[inline]
const fn mi(row: usize, col: usize) -> usize {
    (row << 2) + col
}

pub const fn mat4_identity() -> Mat4 {
    [
        P_ONE, 0, 0, 0,
        0, P_ONE, 0, 0,
        0, 0, P_ONE, 0,
        0, 0, 0, P_ONE,
    ]
}

/// Scale matrix, factors in Q15
pub fn mat4_scale(x: i32, y: i32, z: i32) -> Mat4 {
    let mut m = mat4_identity();
    m[mi(0, 0)] = x;
    m[mi(1, 1)] = y;
    m[mi(2, 2)] = z;
    m
}

/// Translation matrix, offsets in model units
pub fn mat4_translation(x: i32, y: i32, z: i32) -> Mat4 {
    let mut m = mat4_identity();
    m[mi(3, 0)] = x;
    m[mi(3, 1)] = y;
    m[mi(3, 2)] = z;
    m
}

pub fn mat4_rotation_x(angle: i32) -> Mat4 {
    let c = fixed_cos(angle);
    let s = fixed_sin(angle);
    let mut m = mat4_identity();
    m[mi(1, 1)] = c;
    m[mi(2, 1)] = -s;
    m[mi(1, 2)] = s;
    m[mi(2, 2)] = c;
    m
}

pub fn mat4_rotation_y(angle: i32) -> Mat4 {
    let c = fixed_cos(angle);
    let s = fixed_sin(angle);
    let mut m = mat4_identity();
    m[mi(0, 0)] = c;
    m[mi(2, 0)] = s;
    m[mi(0, 2)] = -s;
    m[mi(2, 2)] = c;
    m
}

pub fn mat4_rotation_z(angle: i32) -> Mat4 {
    let c = fixed_cos(angle);
    let s = fixed_sin(angle);
    let mut m = mat4_identity();
    m[mi(0, 0)] = c;
    m[mi(1, 0)] = s;
    m[mi(0, 1)] = -s;
    m[mi(1, 1)] = c;
    m
}

/// Compose `given` onto `current`: the result applies `given` first, then
/// `current`. Only the affine part (columns 0..3 of every row) is computed;
/// column 3 keeps whatever `current` held.
pub fn mat4_mul(current: &Mat4, given: &Mat4) -> Mat4 {
    let mut out = *current;
    for row in 0..4 {
        for col in 0..3 {
            out[mi(row, col)] = fx_mul(given[mi(row, 0)], current[mi(0, col)])
                + fx_mul(given[mi(row, 1)], current[mi(1, col)])
                + fx_mul(given[mi(row, 2)], current[mi(2, col)])
                + fx_mul(given[mi(row, 3)], current[mi(3, col)]);
        }
    }
    out
}

// =============================================================================
// Vector helpers
// =============================================================================

/// Halve all three components until every one fits a signed 16-bit range.
pub fn vec_shorten(v: &mut [i64; 3]) {
    const LO: i64 = i16::MIN as i64;
    const HI: i64 = i16::MAX as i64;
    while v.iter().any(|&c| !(LO..=HI).contains(&c)) {
        for c in v.iter_mut() {
            *c >>= 1;
        }
    }
}

/// Orientation of the triangle (a, b, c) as seen from the eye at the
/// camera-space origin. Returns true for back faces (counter-clockwise on
/// screen).
pub fn winding_order(a: &[i32], b: &[i32], c: &[i32]) -> bool {
    let (a0, a1, a2) = (a[0] as i64, a[1] as i64, a[2] as i64);
    let (b0, b1, b2) = (b[0] as i64, b[1] as i64, b[2] as i64);
    let mut n = [
        a2 * b1 - a1 * b2,
        a0 * b2 - a2 * b0,
        a1 * b0 - a0 * b1,
    ];
    vec_shorten(&mut n);
    c[0] as i64 * n[0] + c[1] as i64 * n[1] + c[2] as i64 * n[2] < 0
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sin_cos_key_angles() {
        assert_eq!(fixed_sin(0), 0);
        assert_eq!(fixed_sin(64), P_ONE);
        assert_eq!(fixed_sin(128), 0);
        assert_eq!(fixed_sin(192), -P_ONE);

        assert_eq!(fixed_cos(0), P_ONE);
        assert_eq!(fixed_cos(64), 0);
        assert_eq!(fixed_cos(128), -P_ONE);
        assert_eq!(fixed_cos(192), 0);
    }

    #[test]
    fn test_sin_table_is_mirrored() {
        for i in 1..64 {
            assert_eq!(fixed_sin(64 + i), fixed_sin(64 - i));
            assert_eq!(fixed_sin(128 + i), -fixed_sin(i));
        }
        assert_eq!(fixed_sin(32), 0x5a82);
    }

    #[test]
    fn test_angle_wraps() {
        assert_eq!(fixed_sin(256 + 10), fixed_sin(10));
        assert_eq!(fixed_cos(-1), fixed_cos(255));
    }

    #[test]
    fn test_mul_identity_is_noop() {
        let mut m = mat4_translation(10, -20, 30);
        m = mat4_mul(&m, &mat4_scale(P_ONE * 2, P_ONE, P_ONE));
        let same = mat4_mul(&m, &mat4_identity());
        assert_eq!(m, same);
    }

    #[test]
    fn test_mul_translation_then_scale() {
        // Scale is applied before the existing translation, so the
        // translation row is unaffected.
        let t = mat4_translation(100, 0, 0);
        let m = mat4_mul(&t, &mat4_scale(P_ONE * 2, P_ONE * 2, P_ONE * 2));
        assert_eq!(m[0], P_ONE * 2);
        assert_eq!(m[12], 100);

        // The other way round, translation is scaled.
        let s = mat4_scale(P_ONE * 2, P_ONE * 2, P_ONE * 2);
        let m = mat4_mul(&s, &mat4_translation(100, 0, 0));
        assert_eq!(m[12], 200);
    }

    #[test]
    fn test_vec_shorten() {
        let mut v = [70000, -70000, 3];
        vec_shorten(&mut v);
        assert!(v.iter().all(|&c| (-32768..=32767).contains(&c)));
        assert_eq!(v, [17500, -17500, 0]);

        let mut small = [5, -6, 7];
        vec_shorten(&mut small);
        assert_eq!(small, [5, -6, 7]);
    }

    #[test]
    fn test_winding_order_flips_with_vertex_order() {
        let a = [-400, 400, 800];
        let b = [400, 400, 800];
        let c = [400, -400, 800];
        assert!(!winding_order(&a, &b, &c));
        assert!(winding_order(&a, &c, &b));
    }

    #[test]
    fn test_winding_order_invariant_under_shift() {
        let a = [-400 << 4, 400 << 4, 800 << 4];
        let b = [400 << 4, 400 << 4, 800 << 4];
        let c = [400 << 4, -400 << 4, 800 << 4];
        for shift in 0..5 {
            let sa = a.map(|x| x >> shift);
            let sb = b.map(|x| x >> shift);
            let sc = c.map(|x| x >> shift);
            assert_eq!(winding_order(&sa, &sb, &sc), winding_order(&a, &b, &c));
            assert_eq!(winding_order(&sa, &sc, &sb), winding_order(&a, &c, &b));
        }
    }
}
