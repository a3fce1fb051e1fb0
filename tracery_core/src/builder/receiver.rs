// Copyright 2026 the Tracery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Replaying into a builder.
//!
//! Attribute setters only record when the value changes. Everything else
//! goes through the same checks as the inherent recording methods, so
//! replaying a list into a builder produces an equal list.

use alloc::sync::Arc;

use kurbo::{BezPath, Point, Rect, RoundedRect};

use crate::display_list::DisplayList;
use crate::effects::{ColorFilter, ColorSource, ImageFilter, MaskFilter};
use crate::matrix::Matrix;
use crate::op::records::{MaskFilterPayload, ResourcePayload, ScalarPayload, U32Payload};
use crate::op::OpType;
use crate::paint::{
    BlendMode, ClipOp, DlColor, DrawStyle, FilterMode, ImageSampling, PointMode,
    SaveLayerOptions, SrcRectConstraint, StrokeCap, StrokeJoin,
};
use crate::receiver::DlOpReceiver;
use crate::resource::{DlImage, DlResource, RsTransform, TextBlob, Vertices};

use super::attributes::is_opacity_compatible;
use super::DisplayListBuilder;

/// Same filter: the same allocation, or equal values.
fn same_arc<T: PartialEq + ?Sized>(a: Option<&Arc<T>>, b: Option<&Arc<T>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b) || **a == **b,
        (None, None) => true,
        _ => false,
    }
}

impl DisplayListBuilder {
    fn push_u32(&mut self, op_type: OpType, value: u32) {
        self.push_op(op_type, &U32Payload { value, pad: 0 });
    }

    fn push_scalar(&mut self, op_type: OpType, value: f64) {
        self.push_op(op_type, &ScalarPayload { value });
    }

    fn push_slot(&mut self, op_type: OpType, resource: DlResource) {
        let slot = self.push_resource(resource);
        self.push_op(op_type, &ResourcePayload { slot, pad: 0 });
    }

    fn refresh_opacity_compatibility(&mut self) {
        self.current_opacity_compatible = is_opacity_compatible(&self.current);
    }
}

impl DlOpReceiver for DisplayListBuilder {
    fn set_anti_alias(&mut self, aa: bool) {
        if self.current.anti_alias != aa {
            self.current.anti_alias = aa;
            self.push_u32(OpType::SetAntiAlias, u32::from(aa));
        }
    }

    fn set_invert_colors(&mut self, invert: bool) {
        if self.current.invert_colors != invert {
            self.current.invert_colors = invert;
            self.push_u32(OpType::SetInvertColors, u32::from(invert));
            self.refresh_opacity_compatibility();
        }
    }

    fn set_stroke_cap(&mut self, cap: StrokeCap) {
        if self.current.stroke_cap != cap {
            self.current.stroke_cap = cap;
            self.push_u32(OpType::SetStrokeCap, cap as u32);
        }
    }

    fn set_stroke_join(&mut self, join: StrokeJoin) {
        if self.current.stroke_join != join {
            self.current.stroke_join = join;
            self.push_u32(OpType::SetStrokeJoin, join as u32);
        }
    }

    fn set_draw_style(&mut self, style: DrawStyle) {
        if self.current.draw_style != style {
            self.current.draw_style = style;
            self.push_u32(OpType::SetDrawStyle, style as u32);
        }
    }

    fn set_stroke_width(&mut self, width: f64) {
        if self.current.stroke_width.to_bits() != width.to_bits() {
            self.current.stroke_width = width;
            self.push_scalar(OpType::SetStrokeWidth, width);
        }
    }

    fn set_stroke_miter(&mut self, limit: f64) {
        if self.current.stroke_miter.to_bits() != limit.to_bits() {
            self.current.stroke_miter = limit;
            self.push_scalar(OpType::SetStrokeMiter, limit);
        }
    }

    fn set_color(&mut self, color: DlColor) {
        if self.current.color != color {
            self.current.color = color;
            self.push_u32(OpType::SetColor, color.0);
        }
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        if self.current.blend_mode != mode {
            self.current.blend_mode = mode;
            self.push_u32(OpType::SetBlendMode, mode as u32);
            self.refresh_opacity_compatibility();
        }
    }

    fn set_color_source(&mut self, source: Option<&Arc<ColorSource>>) {
        if same_arc(self.current.color_source.as_ref(), source) {
            return;
        }
        self.current.color_source = source.cloned();
        match source {
            Some(source) => {
                if !source.is_ui_thread_safe() {
                    self.is_ui_thread_safe = false;
                }
                self.push_slot(OpType::SetColorSource, DlResource::ColorSource(source.clone()));
            }
            None => self.push_bare(OpType::ClearColorSource),
        }
    }

    fn set_color_filter(&mut self, filter: Option<&Arc<ColorFilter>>) {
        if same_arc(self.current.color_filter.as_ref(), filter) {
            return;
        }
        self.current.color_filter = filter.cloned();
        match filter {
            Some(filter) => {
                self.push_slot(OpType::SetColorFilter, DlResource::ColorFilter(filter.clone()));
            }
            None => self.push_bare(OpType::ClearColorFilter),
        }
        self.refresh_opacity_compatibility();
    }

    fn set_image_filter(&mut self, filter: Option<&Arc<ImageFilter>>) {
        if same_arc(self.current.image_filter.as_ref(), filter) {
            return;
        }
        self.current.image_filter = filter.cloned();
        match filter {
            Some(filter) => {
                self.push_slot(OpType::SetImageFilter, DlResource::ImageFilter(filter.clone()));
            }
            None => self.push_bare(OpType::ClearImageFilter),
        }
    }

    fn set_mask_filter(&mut self, filter: Option<&MaskFilter>) {
        if self.current.mask_filter.as_ref() == filter {
            return;
        }
        self.current.mask_filter = filter.copied();
        match filter {
            Some(filter) => {
                self.push_op(
                    OpType::SetMaskFilter,
                    &MaskFilterPayload {
                        style: filter.style as u32,
                        respect_ctm: u32::from(filter.respect_ctm),
                        sigma: filter.sigma,
                    },
                );
            }
            None => self.push_bare(OpType::ClearMaskFilter),
        }
    }

    fn save(&mut self, _total_content_depth: u32) {
        Self::save(self);
    }

    fn save_layer(
        &mut self,
        bounds: Rect,
        options: SaveLayerOptions,
        _total_content_depth: u32,
        _max_content_blend_mode: BlendMode,
        backdrop: Option<&Arc<ImageFilter>>,
    ) {
        let bounds = options
            .contains(SaveLayerOptions::BOUNDS_FROM_CALLER)
            .then_some(bounds);
        self.save_layer_op(
            bounds,
            options.contains(SaveLayerOptions::RENDERS_WITH_ATTRIBUTES),
            backdrop,
        );
    }

    fn restore(&mut self) {
        Self::restore(self);
    }

    fn translate(&mut self, tx: f64, ty: f64) {
        Self::translate(self, tx, ty);
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        Self::scale(self, sx, sy);
    }

    fn rotate(&mut self, degrees: f64) {
        Self::rotate(self, degrees);
    }

    fn skew(&mut self, sx: f64, sy: f64) {
        Self::skew(self, sx, sy);
    }

    fn transform_2d_affine(
        &mut self,
        mxx: f64,
        mxy: f64,
        mxt: f64,
        myx: f64,
        myy: f64,
        myt: f64,
    ) {
        Self::transform_2d_affine(self, mxx, mxy, mxt, myx, myy, myt);
    }

    fn transform_full_perspective(&mut self, matrix: &Matrix) {
        Self::transform_full_perspective(self, matrix);
    }

    fn transform_reset(&mut self) {
        Self::transform_reset(self);
    }

    fn clip_rect(&mut self, rect: Rect, op: ClipOp, is_aa: bool) {
        Self::clip_rect(self, rect, op, is_aa);
    }

    fn clip_oval(&mut self, bounds: Rect, op: ClipOp, is_aa: bool) {
        Self::clip_oval(self, bounds, op, is_aa);
    }

    fn clip_round_rect(&mut self, rrect: RoundedRect, op: ClipOp, is_aa: bool) {
        Self::clip_round_rect(self, rrect, op, is_aa);
    }

    fn clip_path(&mut self, path: &Arc<BezPath>, op: ClipOp, is_aa: bool) {
        Self::clip_path(self, path, op, is_aa);
    }

    fn draw_paint(&mut self) {
        self.draw_paint_op();
    }

    fn draw_color(&mut self, color: DlColor, mode: BlendMode) {
        Self::draw_color(self, color, mode);
    }

    fn draw_line(&mut self, p0: Point, p1: Point) {
        self.draw_line_op(p0, p1);
    }

    fn draw_dashed_line(&mut self, p0: Point, p1: Point, on_length: f64, off_length: f64) {
        self.draw_dashed_line_op(p0, p1, on_length, off_length);
    }

    fn draw_rect(&mut self, rect: Rect) {
        self.draw_rect_op(rect);
    }

    fn draw_oval(&mut self, bounds: Rect) {
        self.draw_oval_op(bounds);
    }

    fn draw_circle(&mut self, center: Point, radius: f64) {
        self.draw_circle_op(center, radius);
    }

    fn draw_round_rect(&mut self, rrect: RoundedRect) {
        self.draw_round_rect_op(rrect);
    }

    fn draw_diff_round_rect(&mut self, outer: RoundedRect, inner: RoundedRect) {
        self.draw_diff_round_rect_op(outer, inner);
    }

    fn draw_arc(&mut self, bounds: Rect, start_degrees: f64, sweep_degrees: f64, use_center: bool) {
        self.draw_arc_op(bounds, start_degrees, sweep_degrees, use_center);
    }

    fn draw_path(&mut self, path: &Arc<BezPath>) {
        self.draw_path_op(path);
    }

    fn draw_points(&mut self, mode: PointMode, points: &[Point]) {
        self.draw_points_op(mode, points);
    }

    fn draw_vertices(&mut self, vertices: &Arc<Vertices>, mode: BlendMode) {
        self.draw_vertices_op(vertices, mode);
    }

    fn draw_image(
        &mut self,
        image: &Arc<dyn DlImage>,
        point: Point,
        sampling: ImageSampling,
        with_attributes: bool,
    ) {
        self.draw_image_op(image, point, sampling, with_attributes);
    }

    fn draw_image_rect(
        &mut self,
        image: &Arc<dyn DlImage>,
        src: Rect,
        dst: Rect,
        sampling: ImageSampling,
        with_attributes: bool,
        constraint: SrcRectConstraint,
    ) {
        self.draw_image_rect_op(image, src, dst, sampling, with_attributes, constraint);
    }

    fn draw_image_nine(
        &mut self,
        image: &Arc<dyn DlImage>,
        center: Rect,
        dst: Rect,
        filter: FilterMode,
        with_attributes: bool,
    ) {
        self.draw_image_nine_op(image, center, dst, filter, with_attributes);
    }

    fn draw_atlas(
        &mut self,
        image: &Arc<dyn DlImage>,
        xforms: &[RsTransform],
        tex: &[Rect],
        colors: &[DlColor],
        mode: BlendMode,
        sampling: ImageSampling,
        cull: Option<Rect>,
        with_attributes: bool,
    ) {
        self.draw_atlas_op(
            image,
            xforms,
            tex,
            colors,
            mode,
            sampling,
            cull,
            with_attributes,
        );
    }

    fn draw_text(&mut self, text: &Arc<TextBlob>, x: f64, y: f64) {
        self.draw_text_op(text, x, y);
    }

    fn draw_shadow(
        &mut self,
        path: &Arc<BezPath>,
        color: DlColor,
        elevation: f64,
        transparent_occluder: bool,
        dpr: f64,
    ) {
        Self::draw_shadow(self, path, color, elevation, transparent_occluder, dpr);
    }

    fn draw_display_list(&mut self, list: &Arc<DisplayList>, opacity: f64) {
        Self::draw_display_list(self, list, opacity);
    }
}
