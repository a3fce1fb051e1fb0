// Copyright 2026 the Tracery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The replay interface.
//!
//! [`DlOpReceiver`] has one method per op type. Every method defaults to a
//! no-op, so a receiver that only cares about a handful of ops (bounds
//! collectors, debug printers, test recorders) implements just those.
//!
//! Attribute methods describe the persistent paint state; draw methods that
//! take `with_attributes` use that state only when it is `true`.

use alloc::sync::Arc;

use kurbo::{BezPath, Point, Rect, RoundedRect};

use crate::display_list::DisplayList;
use crate::effects::{ColorFilter, ColorSource, ImageFilter, MaskFilter};
use crate::matrix::Matrix;
use crate::paint::{
    BlendMode, ClipOp, DlColor, DrawStyle, FilterMode, ImageSampling, PointMode, SaveLayerOptions,
    SrcRectConstraint, StrokeCap, StrokeJoin,
};
use crate::resource::{DlImage, RsTransform, TextBlob, Vertices};

/// Receives ops replayed from a [`DisplayList`].
///
/// Object safe; dispatch takes `&mut dyn DlOpReceiver`.
#[expect(unused_variables, reason = "default bodies ignore their arguments")]
pub trait DlOpReceiver {
    // -----------------------------------------------------------------------
    // Attributes
    // -----------------------------------------------------------------------

    /// Anti-aliasing on or off.
    fn set_anti_alias(&mut self, aa: bool) {}

    /// Color inversion on or off.
    fn set_invert_colors(&mut self, invert: bool) {}

    /// Stroke end cap.
    fn set_stroke_cap(&mut self, cap: StrokeCap) {}

    /// Stroke corner join.
    fn set_stroke_join(&mut self, join: StrokeJoin) {}

    /// Fill, stroke, or both.
    fn set_draw_style(&mut self, style: DrawStyle) {}

    /// Stroke width; zero means hairline.
    fn set_stroke_width(&mut self, width: f64) {}

    /// Miter limit.
    fn set_stroke_miter(&mut self, limit: f64) {}

    /// Solid color.
    fn set_color(&mut self, color: DlColor) {}

    /// Blend mode.
    fn set_blend_mode(&mut self, mode: BlendMode) {}

    /// Color source, or `None` to clear it.
    fn set_color_source(&mut self, source: Option<&Arc<ColorSource>>) {}

    /// Color filter, or `None` to clear it.
    fn set_color_filter(&mut self, filter: Option<&Arc<ColorFilter>>) {}

    /// Image filter, or `None` to clear it.
    fn set_image_filter(&mut self, filter: Option<&Arc<ImageFilter>>) {}

    /// Mask filter, or `None` to clear it.
    fn set_mask_filter(&mut self, filter: Option<&MaskFilter>) {}

    // -----------------------------------------------------------------------
    // Save / restore
    // -----------------------------------------------------------------------

    /// Plain save. `total_content_depth` is the depth cost of everything up
    /// to the matching restore.
    fn save(&mut self, total_content_depth: u32) {}

    /// Layer save. `bounds` are the final content bounds in local space.
    fn save_layer(
        &mut self,
        bounds: Rect,
        options: SaveLayerOptions,
        total_content_depth: u32,
        max_content_blend_mode: BlendMode,
        backdrop: Option<&Arc<ImageFilter>>,
    ) {
    }

    /// Restore matching the most recent save.
    fn restore(&mut self) {}

    // -----------------------------------------------------------------------
    // Transforms
    // -----------------------------------------------------------------------

    /// Pre-concatenates a translation.
    fn translate(&mut self, tx: f64, ty: f64) {}

    /// Pre-concatenates a scale.
    fn scale(&mut self, sx: f64, sy: f64) {}

    /// Pre-concatenates a rotation in degrees.
    fn rotate(&mut self, degrees: f64) {}

    /// Pre-concatenates a skew.
    fn skew(&mut self, sx: f64, sy: f64) {}

    /// Pre-concatenates a row-major 2D affine transform.
    fn transform_2d_affine(
        &mut self,
        mxx: f64,
        mxy: f64,
        mxt: f64,
        myx: f64,
        myy: f64,
        myt: f64,
    ) {
    }

    /// Pre-concatenates a full 4×4 transform.
    fn transform_full_perspective(&mut self, matrix: &Matrix) {}

    /// Resets the transform to identity.
    fn transform_reset(&mut self) {}

    // -----------------------------------------------------------------------
    // Clips
    // -----------------------------------------------------------------------

    /// Clips to a rectangle.
    fn clip_rect(&mut self, rect: Rect, op: ClipOp, is_aa: bool) {}

    /// Clips to the oval inscribed in `bounds`.
    fn clip_oval(&mut self, bounds: Rect, op: ClipOp, is_aa: bool) {}

    /// Clips to a rounded rectangle.
    fn clip_round_rect(&mut self, rrect: RoundedRect, op: ClipOp, is_aa: bool) {}

    /// Clips to a path.
    fn clip_path(&mut self, path: &Arc<BezPath>, op: ClipOp, is_aa: bool) {}

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    /// Fills the clip with the current paint.
    fn draw_paint(&mut self) {}

    /// Fills the clip with a color.
    fn draw_color(&mut self, color: DlColor, mode: BlendMode) {}

    /// Line segment.
    fn draw_line(&mut self, p0: Point, p1: Point) {}

    /// Dashed line segment with on/off lengths.
    fn draw_dashed_line(&mut self, p0: Point, p1: Point, on_length: f64, off_length: f64) {}

    /// Rectangle.
    fn draw_rect(&mut self, rect: Rect) {}

    /// Oval inscribed in `bounds`.
    fn draw_oval(&mut self, bounds: Rect) {}

    /// Circle.
    fn draw_circle(&mut self, center: Point, radius: f64) {}

    /// Rounded rectangle.
    fn draw_round_rect(&mut self, rrect: RoundedRect) {}

    /// The area between two rounded rectangles.
    fn draw_diff_round_rect(&mut self, outer: RoundedRect, inner: RoundedRect) {}

    /// Arc of the oval in `bounds`, angles in degrees.
    fn draw_arc(&mut self, bounds: Rect, start_degrees: f64, sweep_degrees: f64, use_center: bool) {
    }

    /// Path.
    fn draw_path(&mut self, path: &Arc<BezPath>) {}

    /// Points, segments or a polyline depending on `mode`.
    fn draw_points(&mut self, mode: PointMode, points: &[Point]) {}

    /// Triangle mesh; `mode` blends vertex colors with the paint.
    fn draw_vertices(&mut self, vertices: &Arc<Vertices>, mode: BlendMode) {}

    /// Image with its top-left corner at `point`.
    fn draw_image(
        &mut self,
        image: &Arc<dyn DlImage>,
        point: Point,
        sampling: ImageSampling,
        with_attributes: bool,
    ) {
    }

    /// The `src` part of an image scaled into `dst`.
    fn draw_image_rect(
        &mut self,
        image: &Arc<dyn DlImage>,
        src: Rect,
        dst: Rect,
        sampling: ImageSampling,
        with_attributes: bool,
        constraint: SrcRectConstraint,
    ) {
    }

    /// Nine-patch: `center` splits the image into a 3×3 grid, only the
    /// middle stretches.
    fn draw_image_nine(
        &mut self,
        image: &Arc<dyn DlImage>,
        center: Rect,
        dst: Rect,
        filter: FilterMode,
        with_attributes: bool,
    ) {
    }

    /// Sprites from `image`; `colors` is empty or one per sprite.
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
    }

    /// Text blob at `(x, y)`.
    fn draw_text(&mut self, text: &Arc<TextBlob>, x: f64, y: f64) {}

    /// Shadow cast by `path` at `elevation`.
    fn draw_shadow(
        &mut self,
        path: &Arc<BezPath>,
        color: DlColor,
        elevation: f64,
        transparent_occluder: bool,
        dpr: f64,
    ) {
    }

    // -----------------------------------------------------------------------
    // Nested lists
    // -----------------------------------------------------------------------

    /// Draws another list with a group opacity.
    fn draw_display_list(&mut self, list: &Arc<DisplayList>, opacity: f64) {}
}
