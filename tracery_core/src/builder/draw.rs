// Copyright 2026 the Tracery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rendering ops.
//!
//! Each op comes in two forms: a public method that takes the paint (or
//! optional paint) to draw with, and a `*_op` method that draws with the
//! attributes already recorded. The first records the attributes it needs
//! and then calls the second.

use alloc::sync::Arc;
use alloc::vec::Vec;

use kurbo::{BezPath, Point, Rect, RoundedRect, Shape, Vec2};

use crate::display_list::DisplayList;
use crate::geometry::{points_bounds, rect_is_finite};
use crate::op::records::{
    point_data, radii_data, rect_data, ArcPayload, AtlasPayload, CirclePayload,
    DashedLinePayload, DiffRoundRectPayload, DisplayListPayload, DrawColorPayload,
    ImageNinePayload, ImagePayload, ImageRectPayload, LinePayload, PointsPayload, RectPayload,
    ResourcePayload, RoundRectPayload, ShadowPayload, TextPayload, VerticesPayload,
};
use crate::op::{OpType, HEADER_SIZE};
use crate::paint::{
    BlendMode, DlColor, FilterMode, ImageSampling, Paint, PointMode, SrcRectConstraint,
};
use crate::resource::{DlImage, DlResource, RsTransform, TextBlob, Vertices};

use super::attributes::{is_hairline, paint_result, AttributeFlags, PaintResult};
use super::DisplayListBuilder;

impl DisplayListBuilder {
    /// Records the attributes `paint` contributes to an op using `flags`.
    ///
    /// Returns `false` without recording anything if the op would be dropped
    /// anyway.
    fn apply_paint(&mut self, paint: &Paint, flags: AttributeFlags) -> bool {
        if self.save_info().is_nop {
            return false;
        }
        if paint_result(paint, flags) == PaintResult::NoEffect {
            self.elided.no_effect_ops += 1;
            return false;
        }
        self.set_attributes_from_paint(paint, flags);
        true
    }

    fn apply_optional_paint(&mut self, paint: Option<&Paint>, flags: AttributeFlags) -> bool {
        match paint {
            Some(paint) => self.apply_paint(paint, flags),
            None => true,
        }
    }

    /// What the next op does with the current attributes, or `None` if it
    /// must not be recorded.
    fn render_op_result(&mut self, flags: AttributeFlags) -> Option<PaintResult> {
        if self.save_info().is_nop {
            return None;
        }
        match paint_result(&self.current, flags) {
            PaintResult::NoEffect => {
                self.elided.no_effect_ops += 1;
                None
            }
            result => Some(result),
        }
    }

    /// Checks the paint and accumulates `bounds` for an op about to be
    /// recorded.
    fn begin_bounded_op(&mut self, flags: AttributeFlags, bounds: Rect) -> Option<PaintResult> {
        let result = self.render_op_result(flags)?;
        if !rect_is_finite(&bounds) {
            self.elided.culled_ops += 1;
            return None;
        }
        self.accumulate_op_bounds(bounds, flags).then_some(result)
    }

    /// Layer bookkeeping and depth for an op that was just recorded.
    ///
    /// `groupable` is `false` for ops that may blend with themselves, which
    /// keeps a group opacity from being folded into them.
    fn finish_render_op(&mut self, flags: AttributeFlags, result: PaintResult, groupable: bool) {
        let mode = if flags.contains(AttributeFlags::BLEND) {
            self.current.blend_mode
        } else {
            BlendMode::SrcOver
        };
        self.update_layer_result(result, mode);
        if groupable {
            self.check_layer_opacity_compatibility(!flags.is_empty());
        } else {
            self.update_layer_opacity_compatibility(false);
        }
        let masked =
            flags.contains(AttributeFlags::MASK_FILTER) && self.current.mask_filter.is_some();
        self.depth += if masked { 2 } else { 1 };
    }

    fn note_image(&mut self, image: &Arc<dyn DlImage>) -> u32 {
        if !image.is_ui_thread_safe() {
            self.is_ui_thread_safe = false;
        }
        self.push_resource(DlResource::Image(image.clone()))
    }

    // -----------------------------------------------------------------------
    // Floods
    // -----------------------------------------------------------------------

    /// Fills the whole clip with `paint`.
    pub fn draw_paint(&mut self, paint: &Paint) {
        if self.apply_paint(paint, AttributeFlags::DRAW_PAINT) {
            self.draw_paint_op();
        }
    }

    pub(super) fn draw_paint_op(&mut self) {
        let flags = AttributeFlags::DRAW_PAINT;
        let Some(result) = self.render_op_result(flags) else {
            return;
        };
        if !self.accumulate_unbounded() {
            return;
        }
        self.push_bare(OpType::DrawPaint);
        self.finish_render_op(flags, result, true);
    }

    /// Fills the whole clip with `color` using `mode`, ignoring the current
    /// attributes.
    pub fn draw_color(&mut self, color: DlColor, mode: BlendMode) {
        if self.save_info().is_nop {
            return;
        }
        let paint = Paint::with_color(color).blend_mode(mode);
        let result = paint_result(&paint, AttributeFlags::DRAW_COLOR);
        if result == PaintResult::NoEffect {
            self.elided.no_effect_ops += 1;
            return;
        }
        if !self.accumulate_unbounded() {
            return;
        }
        self.push_op(
            OpType::DrawColor,
            &DrawColorPayload {
                color: color.0,
                mode: mode as u32,
            },
        );
        self.update_layer_result(result, mode);
        self.update_layer_opacity_compatibility(mode == BlendMode::SrcOver);
        self.depth += 1;
    }

    // -----------------------------------------------------------------------
    // Geometry
    // -----------------------------------------------------------------------

    /// Strokes a line segment.
    pub fn draw_line(&mut self, p0: Point, p1: Point, paint: &Paint) {
        if self.apply_paint(paint, AttributeFlags::DRAW_LINE) {
            self.draw_line_op(p0, p1);
        }
    }

    pub(super) fn draw_line_op(&mut self, p0: Point, p1: Point) {
        let flags = AttributeFlags::DRAW_LINE;
        let Some(result) = self.begin_bounded_op(flags, Rect::from_points(p0, p1)) else {
            return;
        };
        self.push_op(
            OpType::DrawLine,
            &LinePayload {
                p0: point_data(p0),
                p1: point_data(p1),
            },
        );
        self.finish_render_op(flags, result, true);
    }

    /// Strokes a dashed line segment.
    pub fn draw_dashed_line(
        &mut self,
        p0: Point,
        p1: Point,
        on_length: f64,
        off_length: f64,
        paint: &Paint,
    ) {
        if self.apply_paint(paint, AttributeFlags::DRAW_LINE) {
            self.draw_dashed_line_op(p0, p1, on_length, off_length);
        }
    }

    pub(super) fn draw_dashed_line_op(
        &mut self,
        p0: Point,
        p1: Point,
        on_length: f64,
        off_length: f64,
    ) {
        let flags = AttributeFlags::DRAW_LINE;
        let Some(result) = self.begin_bounded_op(flags, Rect::from_points(p0, p1)) else {
            return;
        };
        self.push_op(
            OpType::DrawDashedLine,
            &DashedLinePayload {
                p0: point_data(p0),
                p1: point_data(p1),
                on: on_length,
                off: off_length,
            },
        );
        self.finish_render_op(flags, result, true);
    }

    /// Draws a rectangle.
    pub fn draw_rect(&mut self, rect: Rect, paint: &Paint) {
        if self.apply_paint(paint, AttributeFlags::DRAW_RECT) {
            self.draw_rect_op(rect);
        }
    }

    pub(super) fn draw_rect_op(&mut self, rect: Rect) {
        let flags = AttributeFlags::DRAW_RECT;
        let Some(result) = self.begin_bounded_op(flags, rect.abs()) else {
            return;
        };
        self.push_op(OpType::DrawRect, &RectPayload { rect: rect_data(rect) });
        self.finish_render_op(flags, result, true);
    }

    /// Draws the oval inscribed in `bounds`.
    pub fn draw_oval(&mut self, bounds: Rect, paint: &Paint) {
        if self.apply_paint(paint, AttributeFlags::DRAW_OVAL) {
            self.draw_oval_op(bounds);
        }
    }

    pub(super) fn draw_oval_op(&mut self, bounds: Rect) {
        let flags = AttributeFlags::DRAW_OVAL;
        let Some(result) = self.begin_bounded_op(flags, bounds.abs()) else {
            return;
        };
        self.push_op(OpType::DrawOval, &RectPayload { rect: rect_data(bounds) });
        self.finish_render_op(flags, result, true);
    }

    /// Draws a circle.
    pub fn draw_circle(&mut self, center: Point, radius: f64, paint: &Paint) {
        if self.apply_paint(paint, AttributeFlags::DRAW_OVAL) {
            self.draw_circle_op(center, radius);
        }
    }

    pub(super) fn draw_circle_op(&mut self, center: Point, radius: f64) {
        let flags = AttributeFlags::DRAW_OVAL;
        let r = radius.abs();
        let bounds = Rect::new(center.x - r, center.y - r, center.x + r, center.y + r);
        let Some(result) = self.begin_bounded_op(flags, bounds) else {
            return;
        };
        self.push_op(
            OpType::DrawCircle,
            &CirclePayload {
                center: point_data(center),
                radius,
            },
        );
        self.finish_render_op(flags, result, true);
    }

    /// Draws a rounded rectangle. Square corners record a plain rectangle.
    pub fn draw_round_rect(&mut self, rrect: RoundedRect, paint: &Paint) {
        if self.apply_paint(paint, AttributeFlags::DRAW_ROUND_RECT) {
            self.draw_round_rect_op(rrect);
        }
    }

    pub(super) fn draw_round_rect_op(&mut self, rrect: RoundedRect) {
        let radii = radii_data(rrect.radii());
        if radii == [0.0; 4] {
            self.draw_rect_op(rrect.rect());
            return;
        }
        let flags = AttributeFlags::DRAW_ROUND_RECT;
        let Some(result) = self.begin_bounded_op(flags, rrect.rect()) else {
            return;
        };
        self.push_op(
            OpType::DrawRoundRect,
            &RoundRectPayload {
                rect: rect_data(rrect.rect()),
                radii,
            },
        );
        self.finish_render_op(flags, result, true);
    }

    /// Draws the area inside `outer` and outside `inner`.
    pub fn draw_diff_round_rect(&mut self, outer: RoundedRect, inner: RoundedRect, paint: &Paint) {
        if self.apply_paint(paint, AttributeFlags::DRAW_ROUND_RECT) {
            self.draw_diff_round_rect_op(outer, inner);
        }
    }

    pub(super) fn draw_diff_round_rect_op(&mut self, outer: RoundedRect, inner: RoundedRect) {
        let flags = AttributeFlags::DRAW_ROUND_RECT;
        let Some(result) = self.begin_bounded_op(flags, outer.rect()) else {
            return;
        };
        self.push_op(
            OpType::DrawDiffRoundRect,
            &DiffRoundRectPayload {
                outer_rect: rect_data(outer.rect()),
                outer_radii: radii_data(outer.radii()),
                inner_rect: rect_data(inner.rect()),
                inner_radii: radii_data(inner.radii()),
            },
        );
        self.finish_render_op(flags, result, true);
    }

    /// Draws an arc of the oval inscribed in `bounds`. Angles are in degrees.
    pub fn draw_arc(
        &mut self,
        bounds: Rect,
        start_degrees: f64,
        sweep_degrees: f64,
        use_center: bool,
        paint: &Paint,
    ) {
        if self.apply_paint(paint, arc_flags(use_center)) {
            self.draw_arc_op(bounds, start_degrees, sweep_degrees, use_center);
        }
    }

    pub(super) fn draw_arc_op(
        &mut self,
        bounds: Rect,
        start_degrees: f64,
        sweep_degrees: f64,
        use_center: bool,
    ) {
        let flags = arc_flags(use_center);
        let Some(result) = self.begin_bounded_op(flags, bounds.abs()) else {
            return;
        };
        self.push_op(
            OpType::DrawArc,
            &ArcPayload {
                use_center: u32::from(use_center),
                pad: 0,
                rect: rect_data(bounds),
                start: start_degrees,
                sweep: sweep_degrees,
            },
        );
        let groupable = !is_hairline(&self.current, flags);
        self.finish_render_op(flags, result, groupable);
    }

    /// Draws a path. Empty paths are dropped.
    pub fn draw_path(&mut self, path: &Arc<BezPath>, paint: &Paint) {
        if self.apply_paint(paint, AttributeFlags::DRAW_PATH) {
            self.draw_path_op(path);
        }
    }

    pub(super) fn draw_path_op(&mut self, path: &Arc<BezPath>) {
        if path.elements().is_empty() {
            return;
        }
        let flags = AttributeFlags::DRAW_PATH;
        let Some(result) = self.begin_bounded_op(flags, path.bounding_box()) else {
            return;
        };
        let slot = self.push_resource(DlResource::Path(path.clone()));
        self.push_op(OpType::DrawPath, &ResourcePayload { slot, pad: 0 });
        let groupable = !is_hairline(&self.current, flags);
        self.finish_render_op(flags, result, groupable);
    }

    /// Draws points, segments or a polyline.
    pub fn draw_points(&mut self, mode: PointMode, points: &[Point], paint: &Paint) {
        if self.apply_paint(paint, points_flags(mode)) {
            self.draw_points_op(mode, points);
        }
    }

    pub(super) fn draw_points_op(&mut self, mode: PointMode, points: &[Point]) {
        let Some(bounds) = points_bounds(points) else {
            return;
        };
        let Ok(count) = u32::try_from(points.len()) else {
            panic!("{} points do not fit in one op", points.len());
        };
        let flags = points_flags(mode);
        let Some(result) = self.begin_bounded_op(flags, bounds) else {
            return;
        };
        let data: Vec<[f64; 2]> = points.iter().map(|&p| point_data(p)).collect();
        let offset = self.push_op_with_trailing(
            OpType::DrawPoints,
            &PointsPayload {
                mode: mode as u32,
                count,
            },
            size_of_val(data.as_slice()),
        );
        self.storage
            .write_slice(offset + HEADER_SIZE + size_of::<PointsPayload>(), &data);
        self.finish_render_op(flags, result, false);
    }

    /// Draws a triangle mesh; `mode` blends vertex colors with the paint.
    pub fn draw_vertices(&mut self, vertices: &Arc<Vertices>, mode: BlendMode, paint: &Paint) {
        if self.apply_paint(paint, AttributeFlags::DRAW_VERTICES) {
            self.draw_vertices_op(vertices, mode);
        }
    }

    pub(super) fn draw_vertices_op(&mut self, vertices: &Arc<Vertices>, mode: BlendMode) {
        if vertices.positions.is_empty() {
            return;
        }
        let flags = AttributeFlags::DRAW_VERTICES;
        let Some(result) = self.begin_bounded_op(flags, vertices.bounds()) else {
            return;
        };
        let slot = self.push_resource(DlResource::Vertices(vertices.clone()));
        self.push_op(
            OpType::DrawVertices,
            &VerticesPayload {
                slot,
                mode: mode as u32,
            },
        );
        self.finish_render_op(flags, result, false);
    }

    // -----------------------------------------------------------------------
    // Images
    // -----------------------------------------------------------------------

    /// Draws `image` with its top-left corner at `point`. Without a paint the
    /// image is drawn with default attributes.
    pub fn draw_image(
        &mut self,
        image: &Arc<dyn DlImage>,
        point: Point,
        sampling: ImageSampling,
        paint: Option<&Paint>,
    ) {
        if self.apply_optional_paint(paint, AttributeFlags::DRAW_IMAGE) {
            self.draw_image_op(image, point, sampling, paint.is_some());
        }
    }

    pub(super) fn draw_image_op(
        &mut self,
        image: &Arc<dyn DlImage>,
        point: Point,
        sampling: ImageSampling,
        with_attributes: bool,
    ) {
        let flags = AttributeFlags::DRAW_IMAGE.used_if(with_attributes);
        let bounds = image.bounds() + point.to_vec2();
        let Some(result) = self.begin_bounded_op(flags, bounds) else {
            return;
        };
        let slot = self.note_image(image);
        self.push_op(
            OpType::DrawImage,
            &ImagePayload {
                slot,
                sampling: sampling as u32,
                with_attributes: u32::from(with_attributes),
                pad: 0,
                point: point_data(point),
            },
        );
        self.finish_render_op(flags, result, true);
    }

    /// Draws the `src` part of `image` scaled into `dst`.
    pub fn draw_image_rect(
        &mut self,
        image: &Arc<dyn DlImage>,
        src: Rect,
        dst: Rect,
        sampling: ImageSampling,
        paint: Option<&Paint>,
        constraint: SrcRectConstraint,
    ) {
        if self.apply_optional_paint(paint, AttributeFlags::DRAW_IMAGE) {
            self.draw_image_rect_op(image, src, dst, sampling, paint.is_some(), constraint);
        }
    }

    pub(super) fn draw_image_rect_op(
        &mut self,
        image: &Arc<dyn DlImage>,
        src: Rect,
        dst: Rect,
        sampling: ImageSampling,
        with_attributes: bool,
        constraint: SrcRectConstraint,
    ) {
        let flags = AttributeFlags::DRAW_IMAGE.used_if(with_attributes);
        let Some(result) = self.begin_bounded_op(flags, dst.abs()) else {
            return;
        };
        let slot = self.note_image(image);
        self.push_op(
            OpType::DrawImageRect,
            &ImageRectPayload {
                slot,
                sampling: sampling as u32,
                with_attributes: u32::from(with_attributes),
                constraint: constraint as u32,
                src: rect_data(src),
                dst: rect_data(dst),
            },
        );
        self.finish_render_op(flags, result, true);
    }

    /// Draws `image` as a nine-patch stretched over `dst`.
    pub fn draw_image_nine(
        &mut self,
        image: &Arc<dyn DlImage>,
        center: Rect,
        dst: Rect,
        filter: FilterMode,
        paint: Option<&Paint>,
    ) {
        if self.apply_optional_paint(paint, AttributeFlags::DRAW_IMAGE_NINE) {
            self.draw_image_nine_op(image, center, dst, filter, paint.is_some());
        }
    }

    pub(super) fn draw_image_nine_op(
        &mut self,
        image: &Arc<dyn DlImage>,
        center: Rect,
        dst: Rect,
        filter: FilterMode,
        with_attributes: bool,
    ) {
        let flags = AttributeFlags::DRAW_IMAGE_NINE.used_if(with_attributes);
        let Some(result) = self.begin_bounded_op(flags, dst.abs()) else {
            return;
        };
        let slot = self.note_image(image);
        self.push_op(
            OpType::DrawImageNine,
            &ImageNinePayload {
                slot,
                filter: filter as u32,
                with_attributes: u32::from(with_attributes),
                pad: 0,
                center: rect_data(center),
                dst: rect_data(dst),
            },
        );
        self.finish_render_op(flags, result, true);
    }

    /// Draws sprites from `image`.
    ///
    /// `xforms` and `tex` pair up one to one; `colors` is either empty or has
    /// one entry per sprite. `cull`, if given, bounds every sprite.
    ///
    /// # Panics
    ///
    /// Panics if the slice lengths do not match.
    pub fn draw_atlas(
        &mut self,
        image: &Arc<dyn DlImage>,
        xforms: &[RsTransform],
        tex: &[Rect],
        colors: &[DlColor],
        mode: BlendMode,
        sampling: ImageSampling,
        cull: Option<Rect>,
        paint: Option<&Paint>,
    ) {
        if self.apply_optional_paint(paint, AttributeFlags::DRAW_ATLAS) {
            self.draw_atlas_op(
                image,
                xforms,
                tex,
                colors,
                mode,
                sampling,
                cull,
                paint.is_some(),
            );
        }
    }

    pub(super) fn draw_atlas_op(
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
        assert_eq!(
            xforms.len(),
            tex.len(),
            "atlas needs one texture rect per transform"
        );
        assert!(
            colors.is_empty() || colors.len() == xforms.len(),
            "atlas colors must be empty or one per sprite"
        );
        if xforms.is_empty() {
            return;
        }
        let Ok(count) = u32::try_from(xforms.len()) else {
            panic!("{} sprites do not fit in one op", xforms.len());
        };
        let flags = AttributeFlags::DRAW_ATLAS.used_if(with_attributes);
        let bounds = cull.map(|c| c.abs()).unwrap_or_else(|| {
            xforms
                .iter()
                .zip(tex)
                .map(|(xform, t)| xform.sprite_bounds(t.width().abs(), t.height().abs()))
                .reduce(|a, b| a.union(b))
                .unwrap_or(Rect::ZERO)
        });
        let Some(result) = self.begin_bounded_op(flags, bounds) else {
            return;
        };
        let slot = self.note_image(image);
        let tex_data: Vec<[f64; 4]> = tex.iter().map(|&t| rect_data(t)).collect();
        let trailing = size_of_val(xforms) + size_of_val(tex_data.as_slice()) + size_of_val(colors);
        let offset = self.push_op_with_trailing(
            OpType::DrawAtlas,
            &AtlasPayload {
                slot,
                count,
                mode: mode as u32,
                sampling: sampling as u32,
                with_attributes: u32::from(with_attributes),
                has_colors: u32::from(!colors.is_empty()),
                has_cull: u32::from(cull.is_some()),
                pad: 0,
                cull: rect_data(cull.unwrap_or(Rect::ZERO)),
            },
            trailing,
        );
        let xforms_at = offset + HEADER_SIZE + size_of::<AtlasPayload>();
        let tex_at = xforms_at + size_of_val(xforms);
        let colors_at = tex_at + size_of_val(tex_data.as_slice());
        self.storage.write_slice(xforms_at, xforms);
        self.storage.write_slice(tex_at, &tex_data);
        self.storage.write_slice(colors_at, colors);
        self.finish_render_op(flags, result, false);
    }

    // -----------------------------------------------------------------------
    // Text and shadows
    // -----------------------------------------------------------------------

    /// Draws a text blob with its origin at `(x, y)`.
    pub fn draw_text(&mut self, text: &Arc<TextBlob>, x: f64, y: f64, paint: &Paint) {
        if self.apply_paint(paint, AttributeFlags::DRAW_TEXT) {
            self.draw_text_op(text, x, y);
        }
    }

    pub(super) fn draw_text_op(&mut self, text: &Arc<TextBlob>, x: f64, y: f64) {
        let flags = AttributeFlags::DRAW_TEXT;
        let Some(result) = self.begin_bounded_op(flags, text.bounds + Vec2::new(x, y)) else {
            return;
        };
        let slot = self.push_resource(DlResource::Text(text.clone()));
        self.push_op(OpType::DrawText, &TextPayload { slot, pad: 0, x, y });
        self.finish_render_op(flags, result, false);
    }

    /// Draws the shadow `path` casts at `elevation`.
    ///
    /// The shadow may reach `2 * elevation * dpr` past the path.
    pub fn draw_shadow(
        &mut self,
        path: &Arc<BezPath>,
        color: DlColor,
        elevation: f64,
        transparent_occluder: bool,
        dpr: f64,
    ) {
        if self.save_info().is_nop {
            return;
        }
        if color.is_transparent() {
            self.elided.no_effect_ops += 1;
            return;
        }
        if path.elements().is_empty() {
            return;
        }
        let flags = AttributeFlags::empty();
        let outset = (2.0 * elevation * dpr).abs();
        let bounds = path.bounding_box().inflate(outset, outset);
        let Some(result) = self.begin_bounded_op(flags, bounds) else {
            return;
        };
        let slot = self.push_resource(DlResource::Path(path.clone()));
        self.push_op(
            OpType::DrawShadow,
            &ShadowPayload {
                slot,
                color: color.0,
                transparent_occluder: u32::from(transparent_occluder),
                pad: 0,
                elevation,
                dpr,
            },
        );
        self.finish_render_op(flags, result, false);
    }

    // -----------------------------------------------------------------------
    // Nested lists
    // -----------------------------------------------------------------------

    /// Draws another list, with `opacity` applied to it as a group.
    pub fn draw_display_list(&mut self, list: &Arc<DisplayList>, opacity: f64) {
        if !opacity.is_finite() || opacity <= 0.0 {
            self.elided.no_effect_ops += 1;
            return;
        }
        if list.is_empty() || self.save_info().is_nop {
            return;
        }
        let accumulated = if list.root_is_unbounded() {
            self.accumulate_unbounded()
        } else {
            match (list.rtree(), self.rtree_data.is_some()) {
                (Some(rtree), true) => {
                    let rects = rtree.search_and_consolidate_rects(self.local_clip_coverage());
                    if rects.is_empty() {
                        self.elided.culled_ops += 1;
                        false
                    } else {
                        self.accumulate_local_rects(&rects)
                    }
                }
                _ => self.accumulate_local_bounds(list.bounds()),
            }
        };
        if !accumulated {
            return;
        }

        let slot = self.push_resource(DlResource::DisplayList(list.clone()));
        self.push_op(
            OpType::DrawDisplayList,
            &DisplayListPayload {
                slot,
                pad: 0,
                opacity,
            },
        );

        self.depth += list.total_depth();
        self.nested_op_count += list.op_count(true);
        self.nested_byte_count += list.bytes(true);
        if !list.is_ui_thread_safe() {
            self.is_ui_thread_safe = false;
        }
        if list.root_has_backdrop_filter() {
            self.layer_mut().contains_backdrop_filter = true;
        }
        self.update_layer_opacity_compatibility(
            list.can_apply_group_opacity() && !list.root_has_backdrop_filter(),
        );
        let result = if list.modifies_transparent_black() {
            PaintResult::AffectsAll
        } else {
            PaintResult::PreservesTransparency
        };
        self.update_layer_result(result, list.max_root_blend_mode());
    }
}

fn arc_flags(use_center: bool) -> AttributeFlags {
    if use_center {
        AttributeFlags::DRAW_ARC_WITH_CENTER
    } else {
        AttributeFlags::DRAW_ARC_NO_CENTER
    }
}

fn points_flags(mode: PointMode) -> AttributeFlags {
    match mode {
        PointMode::Polygon => AttributeFlags::DRAW_POLYGON,
        PointMode::Points | PointMode::Lines => AttributeFlags::DRAW_POINTS,
    }
}
