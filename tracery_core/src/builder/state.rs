// Copyright 2026 the Tracery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transform and conservative clip tracking.

use kurbo::{Point, Rect};

use crate::geometry::{intersect, rect_is_empty, MAX_CULL_RECT};
use crate::matrix::Matrix;
use crate::paint::ClipOp;

/// A transform plus a rectangle that bounds everything still visible, in the
/// space the transform maps into.
///
/// The cull rect only ever shrinks conservatively: intersect clips shrink it
/// to the bounding box of the clip, difference clips shrink it only when the
/// removed rectangle covers a whole edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct MatrixClip {
    matrix: Matrix,
    cull_rect: Rect,
}

impl MatrixClip {
    pub(crate) fn new(cull_rect: Rect, matrix: Matrix) -> Self {
        let cull_rect = if rect_is_empty(&cull_rect) {
            Rect::ZERO
        } else {
            cull_rect
        };
        Self { matrix, cull_rect }
    }

    #[inline]
    pub(crate) fn matrix(&self) -> Matrix {
        self.matrix
    }

    #[inline]
    pub(crate) fn device_cull_rect(&self) -> Rect {
        self.cull_rect
    }

    #[inline]
    pub(crate) fn is_cull_rect_empty(&self) -> bool {
        rect_is_empty(&self.cull_rect)
    }

    // -----------------------------------------------------------------------
    // Transforms (all pre-concatenate)
    // -----------------------------------------------------------------------

    pub(crate) fn translate(&mut self, tx: f64, ty: f64) {
        self.matrix = self.matrix * Matrix::from_translation(tx, ty);
    }

    pub(crate) fn scale(&mut self, sx: f64, sy: f64) {
        self.matrix = self.matrix * Matrix::from_scale(sx, sy);
    }

    pub(crate) fn rotate(&mut self, degrees: f64) {
        self.matrix = self.matrix * Matrix::from_rotation_degrees(degrees);
    }

    pub(crate) fn skew(&mut self, sx: f64, sy: f64) {
        self.matrix = self.matrix * Matrix::from_skew(sx, sy);
    }

    pub(crate) fn transform(&mut self, m: &Matrix) {
        self.matrix = self.matrix * *m;
    }

    pub(crate) fn set_matrix(&mut self, m: Matrix) {
        self.matrix = m;
    }

    // -----------------------------------------------------------------------
    // Clips
    // -----------------------------------------------------------------------

    /// Applies a rectangular clip given in local coordinates.
    pub(crate) fn clip_rect(&mut self, rect: Rect, op: ClipOp) {
        match op {
            ClipOp::Intersect => self.intersect_local(rect),
            ClipOp::Difference => self.subtract_local(rect),
        }
    }

    /// Applies a clip to a non-rectangular shape with the given bounds.
    ///
    /// Only intersection shrinks the cull rect; subtracting a curved shape
    /// leaves it unchanged.
    pub(crate) fn clip_bounds(&mut self, bounds: Rect, op: ClipOp) {
        if op == ClipOp::Intersect {
            self.intersect_local(bounds);
        }
    }

    fn intersect_local(&mut self, rect: Rect) {
        let Some(mapped) = self.matrix.map_rect(rect) else {
            return;
        };
        self.cull_rect = intersect(&self.cull_rect, &mapped).unwrap_or(Rect::ZERO);
    }

    fn subtract_local(&mut self, rect: Rect) {
        if rect_is_empty(&rect) || !self.matrix.preserves_axis_alignment() {
            return;
        }
        let Some(hole) = self.matrix.map_rect(rect) else {
            return;
        };
        let cull = &mut self.cull_rect;
        let spans_height = hole.y0 <= cull.y0 && hole.y1 >= cull.y1;
        let spans_width = hole.x0 <= cull.x0 && hole.x1 >= cull.x1;
        if spans_height {
            if hole.x0 <= cull.x0 {
                cull.x0 = cull.x0.max(hole.x1);
            }
            if hole.x1 >= cull.x1 {
                cull.x1 = cull.x1.min(hole.x0);
            }
        } else if spans_width {
            if hole.y0 <= cull.y0 {
                cull.y0 = cull.y0.max(hole.y1);
            }
            if hole.y1 >= cull.y1 {
                cull.y1 = cull.y1.min(hole.y0);
            }
        }
        if rect_is_empty(cull) {
            *cull = Rect::ZERO;
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Maps local bounds and clips them to the cull rect.
    ///
    /// Returns `None` if nothing remains. Bounds that cannot be mapped (a
    /// corner behind the viewer) are treated as covering the whole cull rect.
    pub(crate) fn map_and_clip(&self, local: Rect) -> Option<Rect> {
        let mapped = self.matrix.map_rect(local).unwrap_or(self.cull_rect);
        intersect(&mapped, &self.cull_rect)
    }

    /// The cull rect mapped back into local coordinates.
    ///
    /// Falls back to [`MAX_CULL_RECT`] when the matrix cannot be inverted or
    /// the mapping is not bounded.
    pub(crate) fn local_cull_coverage(&self) -> Rect {
        if self.is_cull_rect_empty() {
            return Rect::ZERO;
        }
        self.matrix
            .inverse()
            .and_then(|inverse| inverse.map_rect(self.cull_rect))
            .unwrap_or(MAX_CULL_RECT)
    }

    /// Returns `true` if the local rectangle contains the whole cull rect.
    pub(crate) fn rect_covers_cull(&self, local: Rect) -> bool {
        if self.is_cull_rect_empty() {
            return true;
        }
        let Some(inverse) = self.matrix.inverse() else {
            return false;
        };
        let c = self.cull_rect;
        [
            Point::new(c.x0, c.y0),
            Point::new(c.x1, c.y0),
            Point::new(c.x1, c.y1),
            Point::new(c.x0, c.y1),
        ]
        .into_iter()
        .all(|corner| {
            inverse.map_point(corner).is_some_and(|p| {
                // Tolerate round-off from the inverse.
                let eps = 1e-9 * (1.0 + p.x.abs().max(p.y.abs()));
                p.x >= local.x0 - eps
                    && p.x <= local.x1 + eps
                    && p.y >= local.y0 - eps
                    && p.y <= local.y1 + eps
            })
        })
    }
}
