// Copyright 2026 the Tracery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Column-major 4×4 matrix for the recording transform stack.
//!
//! Display lists record 2-D affine and full perspective transforms, so the
//! builder tracks the current transform as a 4×4 matrix. Only the subset of
//! operations the builder and its clip tracking need is provided: building
//! from the recorded transform ops, concatenation, inversion and mapping of
//! points and rectangles.

use core::ops::Mul;

use kurbo::{Affine, Point, Rect};
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// Homogeneous `w` values at or below this are treated as behind the viewer.
const W_EPSILON: f64 = 1e-9;

/// A column-major 4×4 transform stored as `[[f64; 4]; 4]`.
///
/// Each inner array is one *column*, `[x, y, z, w]`. A 2-D affine transform
/// `x' = a·x + c·y + e`, `y' = b·x + d·y + f` occupies columns 0, 1 and 3.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Matrix {
    /// Four columns, each a 4-element array `[x, y, z, w]`.
    pub cols: [[f64; 4]; 4],
}

impl Matrix {
    /// The 4×4 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Creates a matrix from four column arrays.
    #[inline]
    #[must_use]
    pub const fn from_cols(col0: [f64; 4], col1: [f64; 4], col2: [f64; 4], col3: [f64; 4]) -> Self {
        Self {
            cols: [col0, col1, col2, col3],
        }
    }

    /// Returns column `i` (0-based).
    ///
    /// # Panics
    ///
    /// Panics if `i >= 4`.
    #[inline]
    #[must_use]
    pub const fn col(self, i: usize) -> [f64; 4] {
        self.cols[i]
    }

    /// A 2-D translation.
    #[inline]
    #[must_use]
    pub const fn from_translation(tx: f64, ty: f64) -> Self {
        Self::from_row_major_2d(1.0, 0.0, tx, 0.0, 1.0, ty)
    }

    /// A 2-D non-uniform scale.
    #[inline]
    #[must_use]
    pub const fn from_scale(sx: f64, sy: f64) -> Self {
        Self::from_row_major_2d(sx, 0.0, 0.0, 0.0, sy, 0.0)
    }

    /// A 2-D skew: `x' = x + sx·y`, `y' = sy·x + y`.
    #[inline]
    #[must_use]
    pub const fn from_skew(sx: f64, sy: f64) -> Self {
        Self::from_row_major_2d(1.0, sx, 0.0, sy, 1.0, 0.0)
    }

    /// A rotation around the Z axis, in degrees.
    #[must_use]
    pub fn from_rotation_degrees(degrees: f64) -> Self {
        let radians = degrees.to_radians();
        let (s, c) = (radians.sin(), radians.cos());
        Self::from_row_major_2d(c, -s, 0.0, s, c, 0.0)
    }

    /// A 2-D affine transform given in row-major order.
    #[inline]
    #[must_use]
    pub const fn from_row_major_2d(mxx: f64, mxy: f64, mxt: f64, myx: f64, myy: f64, myt: f64) -> Self {
        Self {
            cols: [
                [mxx, myx, 0.0, 0.0],
                [mxy, myy, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [mxt, myt, 0.0, 1.0],
            ],
        }
    }

    /// A full 4×4 transform given in row-major order.
    #[must_use]
    pub const fn from_row_major(m: [f64; 16]) -> Self {
        let mut cols = [[0.0; 4]; 4];
        let mut r = 0;
        while r < 4 {
            let mut c = 0;
            while c < 4 {
                cols[c][r] = m[r * 4 + c];
                c += 1;
            }
            r += 1;
        }
        Self { cols }
    }

    /// The matrix in row-major order.
    #[must_use]
    pub const fn to_row_major(&self) -> [f64; 16] {
        let mut m = [0.0; 16];
        let mut r = 0;
        while r < 4 {
            let mut c = 0;
            while c < 4 {
                m[r * 4 + c] = self.cols[c][r];
                c += 1;
            }
            r += 1;
        }
        m
    }

    /// Embeds a [`kurbo::Affine`].
    #[must_use]
    pub fn from_affine(affine: Affine) -> Self {
        let [a, b, c, d, e, f] = affine.as_coeffs();
        Self::from_row_major_2d(a, c, e, b, d, f)
    }

    /// The 2-D affine part, if this matrix has no Z or perspective terms.
    #[must_use]
    pub fn to_affine(&self) -> Option<Affine> {
        self.is_2d_affine().then(|| {
            let c = &self.cols;
            Affine::new([c[0][0], c[0][1], c[1][0], c[1][1], c[3][0], c[3][1]])
        })
    }

    /// Is this exactly the identity?
    #[inline]
    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Returns `true` if the matrix only uses the 2-D affine terms.
    #[must_use]
    pub fn is_2d_affine(&self) -> bool {
        let c = &self.cols;
        c[0][2] == 0.0
            && c[0][3] == 0.0
            && c[1][2] == 0.0
            && c[1][3] == 0.0
            && c[2] == [0.0, 0.0, 1.0, 0.0]
            && c[3][2] == 0.0
            && c[3][3] == 1.0
    }

    /// Returns `true` if mapping a 2-D point can produce a `w` other than 1.
    #[inline]
    #[must_use]
    pub fn has_perspective(&self) -> bool {
        let c = &self.cols;
        c[0][3] != 0.0 || c[1][3] != 0.0 || c[3][3] != 1.0
    }

    /// Returns `true` if axis-aligned rectangles map to axis-aligned
    /// rectangles.
    #[must_use]
    pub fn preserves_axis_alignment(&self) -> bool {
        if self.has_perspective() {
            return false;
        }
        let c = &self.cols;
        (c[0][1] == 0.0 && c[1][0] == 0.0) || (c[0][0] == 0.0 && c[1][1] == 0.0)
    }

    /// Is this matrix [finite]?
    ///
    /// [finite]: f64::is_finite
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.cols.iter().flatten().all(|v| v.is_finite())
    }

    /// Is any element [NaN]?
    ///
    /// [NaN]: f64::is_nan
    #[must_use]
    pub fn is_nan(&self) -> bool {
        self.cols.iter().flatten().any(|v| v.is_nan())
    }

    /// Maps a 2-D point, dividing by `w`.
    ///
    /// Returns `None` if the point lands behind the viewer.
    #[must_use]
    pub fn map_point(&self, p: Point) -> Option<Point> {
        let c = &self.cols;
        let x = c[0][0] * p.x + c[1][0] * p.y + c[3][0];
        let y = c[0][1] * p.x + c[1][1] * p.y + c[3][1];
        let w = c[0][3] * p.x + c[1][3] * p.y + c[3][3];
        if w <= W_EPSILON {
            return None;
        }
        Some(Point::new(x / w, y / w))
    }

    /// Bounding box of a mapped rectangle.
    ///
    /// Returns `None` if any corner lands behind the viewer, in which case
    /// callers should treat the mapped area as unbounded.
    #[must_use]
    pub fn map_rect(&self, r: Rect) -> Option<Rect> {
        let p0 = self.map_point(Point::new(r.x0, r.y0))?;
        let p1 = self.map_point(Point::new(r.x1, r.y0))?;
        let p2 = self.map_point(Point::new(r.x1, r.y1))?;
        let p3 = self.map_point(Point::new(r.x0, r.y1))?;
        Some(Rect::new(
            p0.x.min(p1.x).min(p2.x).min(p3.x),
            p0.y.min(p1.y).min(p2.y).min(p3.y),
            p0.x.max(p1.x).max(p2.x).max(p3.x),
            p0.y.max(p1.y).max(p2.y).max(p3.y),
        ))
    }

    /// The inverse, or `None` if the matrix is singular.
    #[must_use]
    pub fn inverse(&self) -> Option<Self> {
        let c = &self.cols;
        let m = [
            c[0][0], c[0][1], c[0][2], c[0][3], c[1][0], c[1][1], c[1][2], c[1][3], c[2][0],
            c[2][1], c[2][2], c[2][3], c[3][0], c[3][1], c[3][2], c[3][3],
        ];
        let mut inv = [0.0; 16];
        inv[0] = m[5] * m[10] * m[15] - m[5] * m[11] * m[14] - m[9] * m[6] * m[15]
            + m[9] * m[7] * m[14]
            + m[13] * m[6] * m[11]
            - m[13] * m[7] * m[10];
        inv[4] = -m[4] * m[10] * m[15] + m[4] * m[11] * m[14] + m[8] * m[6] * m[15]
            - m[8] * m[7] * m[14]
            - m[12] * m[6] * m[11]
            + m[12] * m[7] * m[10];
        inv[8] = m[4] * m[9] * m[15] - m[4] * m[11] * m[13] - m[8] * m[5] * m[15]
            + m[8] * m[7] * m[13]
            + m[12] * m[5] * m[11]
            - m[12] * m[7] * m[9];
        inv[12] = -m[4] * m[9] * m[14] + m[4] * m[10] * m[13] + m[8] * m[5] * m[14]
            - m[8] * m[6] * m[13]
            - m[12] * m[5] * m[10]
            + m[12] * m[6] * m[9];
        inv[1] = -m[1] * m[10] * m[15] + m[1] * m[11] * m[14] + m[9] * m[2] * m[15]
            - m[9] * m[3] * m[14]
            - m[13] * m[2] * m[11]
            + m[13] * m[3] * m[10];
        inv[5] = m[0] * m[10] * m[15] - m[0] * m[11] * m[14] - m[8] * m[2] * m[15]
            + m[8] * m[3] * m[14]
            + m[12] * m[2] * m[11]
            - m[12] * m[3] * m[10];
        inv[9] = -m[0] * m[9] * m[15] + m[0] * m[11] * m[13] + m[8] * m[1] * m[15]
            - m[8] * m[3] * m[13]
            - m[12] * m[1] * m[11]
            + m[12] * m[3] * m[9];
        inv[13] = m[0] * m[9] * m[14] - m[0] * m[10] * m[13] - m[8] * m[1] * m[14]
            + m[8] * m[2] * m[13]
            + m[12] * m[1] * m[10]
            - m[12] * m[2] * m[9];
        inv[2] = m[1] * m[6] * m[15] - m[1] * m[7] * m[14] - m[5] * m[2] * m[15]
            + m[5] * m[3] * m[14]
            + m[13] * m[2] * m[7]
            - m[13] * m[3] * m[6];
        inv[6] = -m[0] * m[6] * m[15] + m[0] * m[7] * m[14] + m[4] * m[2] * m[15]
            - m[4] * m[3] * m[14]
            - m[12] * m[2] * m[7]
            + m[12] * m[3] * m[6];
        inv[10] = m[0] * m[5] * m[15] - m[0] * m[7] * m[13] - m[4] * m[1] * m[15]
            + m[4] * m[3] * m[13]
            + m[12] * m[1] * m[7]
            - m[12] * m[3] * m[5];
        inv[14] = -m[0] * m[5] * m[14] + m[0] * m[6] * m[13] + m[4] * m[1] * m[14]
            - m[4] * m[2] * m[13]
            - m[12] * m[1] * m[6]
            + m[12] * m[2] * m[5];
        inv[3] = -m[1] * m[6] * m[11] + m[1] * m[7] * m[10] + m[5] * m[2] * m[11]
            - m[5] * m[3] * m[10]
            - m[9] * m[2] * m[7]
            + m[9] * m[3] * m[6];
        inv[7] = m[0] * m[6] * m[11] - m[0] * m[7] * m[10] - m[4] * m[2] * m[11]
            + m[4] * m[3] * m[10]
            + m[8] * m[2] * m[7]
            - m[8] * m[3] * m[6];
        inv[11] = -m[0] * m[5] * m[11] + m[0] * m[7] * m[9] + m[4] * m[1] * m[11]
            - m[4] * m[3] * m[9]
            - m[8] * m[1] * m[7]
            + m[8] * m[3] * m[5];
        inv[15] = m[0] * m[5] * m[10] - m[0] * m[6] * m[9] - m[4] * m[1] * m[10]
            + m[4] * m[2] * m[9]
            + m[8] * m[1] * m[6]
            - m[8] * m[2] * m[5];

        let det = m[0] * inv[0] + m[1] * inv[4] + m[2] * inv[8] + m[3] * inv[12];
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let inv_det = 1.0 / det;
        let mut cols = [[0.0; 4]; 4];
        for (i, v) in inv.iter().enumerate() {
            cols[i / 4][i % 4] = v * inv_det;
        }
        let out = Self { cols };
        out.is_finite().then_some(out)
    }
}

impl Default for Matrix {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Matrix {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let a = &self.cols;
        let b = &rhs.cols;
        let mut out = [[0.0_f64; 4]; 4];
        let mut j = 0;
        while j < 4 {
            let mut i = 0;
            while i < 4 {
                out[j][i] =
                    a[0][i] * b[j][0] + a[1][i] * b[j][1] + a[2][i] * b[j][2] + a[3][i] * b[j][3];
                i += 1;
            }
            j += 1;
        }
        Self { cols: out }
    }
}
