// Copyright 2026 the Tracery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transform and clip ops.
//!
//! Ops that cannot change anything are not recorded: identity and
//! non-finite transforms, clips that already contain the current clip, and
//! anything inside a scope whose clip is empty.

use alloc::sync::Arc;

use kurbo::{BezPath, Rect, RoundedRect, Shape};

use crate::geometry::{rect_is_empty, rect_is_finite};
use crate::matrix::Matrix;
use crate::op::records::{
    radii_data, rect_data, Affine2DPayload, ClipPathPayload, ClipRectPayload,
    ClipRoundRectPayload, PairPayload, PerspectivePayload, ScalarPayload,
};
use crate::op::OpType;
use crate::paint::ClipOp;
use crate::resource::DlResource;

use super::state::MatrixClip;
use super::DisplayListBuilder;

impl DisplayListBuilder {
    /// Emits the pending save and returns `true` unless the scope is a no-op.
    fn begin_state_op(&mut self) -> bool {
        if self.save_info().is_nop {
            return false;
        }
        self.check_for_deferred_save();
        true
    }

    fn update_states(&mut self, f: impl Fn(&mut MatrixClip)) {
        let info = self.save_info_mut();
        f(&mut info.global_state);
        f(&mut info.layer_state);
    }

    /// Applies a clip to both states and emits the pending save.
    ///
    /// Returns `false`, and turns the scope into a no-op without saving, if
    /// the clip leaves nothing visible.
    fn apply_clip(&mut self, f: impl Fn(&mut MatrixClip)) -> bool {
        if self.save_info().is_nop {
            return false;
        }
        self.update_states(f);
        let info = self.save_info_mut();
        if info.global_state.is_cull_rect_empty() || info.layer_state.is_cull_rect_empty() {
            info.is_nop = true;
            return false;
        }
        self.check_for_deferred_save();
        true
    }

    // -----------------------------------------------------------------------
    // Transforms
    // -----------------------------------------------------------------------

    /// Pre-concatenates a translation.
    pub fn translate(&mut self, tx: f64, ty: f64) {
        if !(tx.is_finite() && ty.is_finite()) || (tx == 0.0 && ty == 0.0) {
            return;
        }
        if self.begin_state_op() {
            self.push_op(OpType::Translate, &PairPayload { x: tx, y: ty });
            self.update_states(|s| s.translate(tx, ty));
        }
    }

    /// Pre-concatenates a scale.
    pub fn scale(&mut self, sx: f64, sy: f64) {
        if !(sx.is_finite() && sy.is_finite()) || (sx == 1.0 && sy == 1.0) {
            return;
        }
        if self.begin_state_op() {
            self.push_op(OpType::Scale, &PairPayload { x: sx, y: sy });
            self.update_states(|s| s.scale(sx, sy));
        }
    }

    /// Pre-concatenates a rotation, in degrees.
    pub fn rotate(&mut self, degrees: f64) {
        if !degrees.is_finite() || degrees % 360.0 == 0.0 {
            return;
        }
        if self.begin_state_op() {
            self.push_op(OpType::Rotate, &ScalarPayload { value: degrees });
            self.update_states(|s| s.rotate(degrees));
        }
    }

    /// Pre-concatenates a skew.
    pub fn skew(&mut self, sx: f64, sy: f64) {
        if !(sx.is_finite() && sy.is_finite()) || (sx == 0.0 && sy == 0.0) {
            return;
        }
        if self.begin_state_op() {
            self.push_op(OpType::Skew, &PairPayload { x: sx, y: sy });
            self.update_states(|s| s.skew(sx, sy));
        }
    }

    /// Pre-concatenates a 2-D affine transform given in row-major order.
    ///
    /// A pure translation is recorded as [`translate`](Self::translate).
    pub fn transform_2d_affine(
        &mut self,
        mxx: f64,
        mxy: f64,
        mxt: f64,
        myx: f64,
        myy: f64,
        myt: f64,
    ) {
        let m = [mxx, mxy, mxt, myx, myy, myt];
        if !m.iter().all(|v| v.is_finite()) {
            return;
        }
        if mxx == 1.0 && mxy == 0.0 && myx == 0.0 && myy == 1.0 {
            self.translate(mxt, myt);
            return;
        }
        if self.begin_state_op() {
            self.push_op(OpType::Transform2DAffine, &Affine2DPayload { m });
            let matrix = Matrix::from_row_major_2d(mxx, mxy, mxt, myx, myy, myt);
            self.update_states(|s| s.transform(&matrix));
        }
    }

    /// Pre-concatenates a full 4x4 transform.
    ///
    /// A matrix that only uses the 2-D affine terms is recorded as
    /// [`transform_2d_affine`](Self::transform_2d_affine).
    pub fn transform_full_perspective(&mut self, matrix: &Matrix) {
        if !matrix.is_finite() {
            return;
        }
        if matrix.is_2d_affine() {
            let r = matrix.to_row_major();
            self.transform_2d_affine(r[0], r[1], r[3], r[4], r[5], r[7]);
            return;
        }
        if self.begin_state_op() {
            self.push_op(
                OpType::TransformFullPerspective,
                &PerspectivePayload {
                    m: matrix.to_row_major(),
                },
            );
            self.update_states(|s| s.transform(matrix));
        }
    }

    /// Pre-concatenates `matrix`.
    pub fn transform(&mut self, matrix: &Matrix) {
        self.transform_full_perspective(matrix);
    }

    /// Resets the transform to identity in device space.
    pub fn transform_reset(&mut self) {
        if !self.begin_state_op() {
            return;
        }
        self.push_bare(OpType::TransformReset);
        let layer_matrix = self
            .layer()
            .base_matrix
            .inverse()
            .unwrap_or(Matrix::IDENTITY);
        let info = self.save_info_mut();
        info.global_state.set_matrix(Matrix::IDENTITY);
        info.layer_state.set_matrix(layer_matrix);
    }

    /// Replaces the transform with `matrix`.
    pub fn set_transform(&mut self, matrix: &Matrix) {
        self.transform_reset();
        self.transform(matrix);
    }

    // -----------------------------------------------------------------------
    // Clips
    // -----------------------------------------------------------------------

    /// Clips to (or out of) a rectangle.
    pub fn clip_rect(&mut self, rect: Rect, op: ClipOp, is_aa: bool) {
        if !rect_is_finite(&rect) || self.save_info().is_nop {
            return;
        }
        let rect = rect.abs();
        let redundant = match op {
            ClipOp::Intersect => self.save_info().layer_state.rect_covers_cull(rect),
            ClipOp::Difference => rect_is_empty(&rect),
        };
        if redundant || !self.apply_clip(|s| s.clip_rect(rect, op)) {
            return;
        }
        self.push_op(
            OpType::ClipRect,
            &ClipRectPayload {
                clip_op: op as u32,
                is_aa: u32::from(is_aa),
                rect: rect_data(rect),
            },
        );
    }

    /// Clips to (or out of) the oval inscribed in `bounds`.
    pub fn clip_oval(&mut self, bounds: Rect, op: ClipOp, is_aa: bool) {
        if !rect_is_finite(&bounds) || self.save_info().is_nop {
            return;
        }
        let bounds = bounds.abs();
        if op == ClipOp::Difference && rect_is_empty(&bounds) {
            return;
        }
        if !self.apply_clip(|s| s.clip_bounds(bounds, op)) {
            return;
        }
        self.push_op(
            OpType::ClipOval,
            &ClipRectPayload {
                clip_op: op as u32,
                is_aa: u32::from(is_aa),
                rect: rect_data(bounds),
            },
        );
    }

    /// Clips to (or out of) a rounded rectangle.
    ///
    /// One with square corners is recorded as [`clip_rect`](Self::clip_rect).
    pub fn clip_round_rect(&mut self, rrect: RoundedRect, op: ClipOp, is_aa: bool) {
        let radii = radii_data(rrect.radii());
        if radii == [0.0; 4] {
            self.clip_rect(rrect.rect(), op, is_aa);
            return;
        }
        let bounds = rrect.rect();
        if !rect_is_finite(&bounds) || self.save_info().is_nop {
            return;
        }
        if op == ClipOp::Difference && rect_is_empty(&bounds) {
            return;
        }
        if !self.apply_clip(|s| s.clip_bounds(bounds, op)) {
            return;
        }
        self.push_op(
            OpType::ClipRoundRect,
            &ClipRoundRectPayload {
                clip_op: op as u32,
                is_aa: u32::from(is_aa),
                rect: rect_data(bounds),
                radii,
            },
        );
    }

    /// Clips to (or out of) a path.
    ///
    /// Intersecting with an empty path makes the rest of the scope a no-op;
    /// subtracting one does nothing.
    pub fn clip_path(&mut self, path: &Arc<BezPath>, op: ClipOp, is_aa: bool) {
        if self.save_info().is_nop {
            return;
        }
        if path.elements().is_empty() {
            if op == ClipOp::Intersect {
                self.save_info_mut().is_nop = true;
            }
            return;
        }
        let bounds = path.bounding_box();
        if !rect_is_finite(&bounds) {
            return;
        }
        if !self.apply_clip(|s| s.clip_bounds(bounds, op)) {
            return;
        }
        let slot = self.push_resource(DlResource::Path(path.clone()));
        self.push_op(
            OpType::ClipPath,
            &ClipPathPayload {
                clip_op: op as u32,
                is_aa: u32::from(is_aa),
                slot,
                pad: 0,
            },
        );
    }
}
