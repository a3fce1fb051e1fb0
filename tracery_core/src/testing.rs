// Copyright 2026 the Tracery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Test fixtures shared by the unit tests.

use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use kurbo::{BezPath, Point, Rect, RoundedRect};

use crate::display_list::DisplayList;
use crate::effects::{ColorFilter, ColorSource, ImageFilter, MaskFilter};
use crate::matrix::Matrix;
use crate::paint::{
    BlendMode, ClipOp, DlColor, DrawStyle, FilterMode, ImageSampling, PointMode, SaveLayerOptions,
    SrcRectConstraint, StrokeCap, StrokeJoin,
};
use crate::receiver::DlOpReceiver;
use crate::resource::{DlImage, PositionedGlyph, RsTransform, TextBlob, Vertices};

/// An image with no pixels.
#[derive(Debug)]
pub(crate) struct TestImage {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) opaque: bool,
    pub(crate) thread_safe: bool,
}

impl TestImage {
    pub(crate) fn opaque(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            opaque: true,
            thread_safe: true,
        }
    }
}

impl DlImage for TestImage {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn is_opaque(&self) -> bool {
        self.opaque
    }

    fn is_ui_thread_safe(&self) -> bool {
        self.thread_safe
    }
}

/// A blob of `count` glyphs, each 10 units wide.
pub(crate) fn test_text(count: u32) -> Arc<TextBlob> {
    let glyphs = (0..count)
        .map(|i| PositionedGlyph {
            glyph_id: i,
            position: Point::new(f64::from(i) * 10.0, 0.0),
        })
        .collect();
    Arc::new(TextBlob {
        glyphs,
        bounds: Rect::new(0.0, -10.0, f64::from(count) * 10.0, 2.0),
    })
}

pub(crate) fn triangle() -> Arc<BezPath> {
    let mut p = BezPath::new();
    p.move_to((0.0, 0.0));
    p.line_to((10.0, 0.0));
    p.line_to((5.0, 10.0));
    p.close_path();
    Arc::new(p)
}

fn r(rect: Rect) -> String {
    format!("{}, {}, {}, {}", rect.x0, rect.y0, rect.x1, rect.y1)
}

fn p(point: Point) -> String {
    format!("{}, {}", point.x, point.y)
}

/// Records each call as a short string.
#[derive(Debug, Default)]
pub(crate) struct RecordingReceiver {
    pub(crate) calls: Vec<String>,
}

impl RecordingReceiver {
    fn push(&mut self, call: String) {
        self.calls.push(call);
    }
}

impl DlOpReceiver for RecordingReceiver {
    fn set_anti_alias(&mut self, aa: bool) {
        self.push(format!("set_anti_alias({aa})"));
    }

    fn set_invert_colors(&mut self, invert: bool) {
        self.push(format!("set_invert_colors({invert})"));
    }

    fn set_stroke_cap(&mut self, cap: StrokeCap) {
        self.push(format!("set_stroke_cap({cap:?})"));
    }

    fn set_stroke_join(&mut self, join: StrokeJoin) {
        self.push(format!("set_stroke_join({join:?})"));
    }

    fn set_draw_style(&mut self, style: DrawStyle) {
        self.push(format!("set_draw_style({style:?})"));
    }

    fn set_stroke_width(&mut self, width: f64) {
        self.push(format!("set_stroke_width({width})"));
    }

    fn set_stroke_miter(&mut self, limit: f64) {
        self.push(format!("set_stroke_miter({limit})"));
    }

    fn set_color(&mut self, color: DlColor) {
        self.push(format!("set_color({color:?})"));
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.push(format!("set_blend_mode({mode:?})"));
    }

    fn set_color_source(&mut self, source: Option<&Arc<ColorSource>>) {
        self.push(format!("set_color_source({})", source.is_some()));
    }

    fn set_color_filter(&mut self, filter: Option<&Arc<ColorFilter>>) {
        self.push(format!("set_color_filter({})", filter.is_some()));
    }

    fn set_image_filter(&mut self, filter: Option<&Arc<ImageFilter>>) {
        self.push(format!("set_image_filter({})", filter.is_some()));
    }

    fn set_mask_filter(&mut self, filter: Option<&MaskFilter>) {
        self.push(format!("set_mask_filter({})", filter.is_some()));
    }

    fn save(&mut self, _total_content_depth: u32) {
        self.push("save".into());
    }

    fn save_layer(
        &mut self,
        bounds: Rect,
        _options: SaveLayerOptions,
        _total_content_depth: u32,
        _max_content_blend_mode: BlendMode,
        backdrop: Option<&Arc<ImageFilter>>,
    ) {
        self.push(format!("save_layer({}, backdrop={})", r(bounds), backdrop.is_some()));
    }

    fn restore(&mut self) {
        self.push("restore".into());
    }

    fn translate(&mut self, tx: f64, ty: f64) {
        self.push(format!("translate({tx}, {ty})"));
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.push(format!("scale({sx}, {sy})"));
    }

    fn rotate(&mut self, degrees: f64) {
        self.push(format!("rotate({degrees})"));
    }

    fn skew(&mut self, sx: f64, sy: f64) {
        self.push(format!("skew({sx}, {sy})"));
    }

    fn transform_2d_affine(&mut self, mxx: f64, mxy: f64, mxt: f64, myx: f64, myy: f64, myt: f64) {
        self.push(format!(
            "transform_2d_affine({mxx}, {mxy}, {mxt}, {myx}, {myy}, {myt})"
        ));
    }

    fn transform_full_perspective(&mut self, matrix: &Matrix) {
        self.push(format!("transform_full_perspective({:?})", matrix.to_row_major()));
    }

    fn transform_reset(&mut self) {
        self.push("transform_reset".into());
    }

    fn clip_rect(&mut self, rect: Rect, op: ClipOp, _is_aa: bool) {
        self.push(format!("clip_rect({}, {op:?})", r(rect)));
    }

    fn clip_oval(&mut self, bounds: Rect, op: ClipOp, _is_aa: bool) {
        self.push(format!("clip_oval({}, {op:?})", r(bounds)));
    }

    fn clip_round_rect(&mut self, rrect: RoundedRect, op: ClipOp, _is_aa: bool) {
        self.push(format!("clip_round_rect({}, {op:?})", r(rrect.rect())));
    }

    fn clip_path(&mut self, _path: &Arc<BezPath>, op: ClipOp, _is_aa: bool) {
        self.push(format!("clip_path({op:?})"));
    }

    fn draw_paint(&mut self) {
        self.push("draw_paint".into());
    }

    fn draw_color(&mut self, color: DlColor, mode: BlendMode) {
        self.push(format!("draw_color({color:?}, {mode:?})"));
    }

    fn draw_line(&mut self, p0: Point, p1: Point) {
        self.push(format!("draw_line({}, {})", p(p0), p(p1)));
    }

    fn draw_dashed_line(&mut self, p0: Point, p1: Point, on_length: f64, off_length: f64) {
        self.push(format!(
            "draw_dashed_line({}, {}, {on_length}, {off_length})",
            p(p0),
            p(p1)
        ));
    }

    fn draw_rect(&mut self, rect: Rect) {
        self.push(format!("draw_rect({})", r(rect)));
    }

    fn draw_oval(&mut self, bounds: Rect) {
        self.push(format!("draw_oval({})", r(bounds)));
    }

    fn draw_circle(&mut self, center: Point, radius: f64) {
        self.push(format!("draw_circle({}, {radius})", p(center)));
    }

    fn draw_round_rect(&mut self, rrect: RoundedRect) {
        self.push(format!("draw_round_rect({})", r(rrect.rect())));
    }

    fn draw_diff_round_rect(&mut self, outer: RoundedRect, inner: RoundedRect) {
        self.push(format!(
            "draw_diff_round_rect({}, {})",
            r(outer.rect()),
            r(inner.rect())
        ));
    }

    fn draw_arc(&mut self, bounds: Rect, start_degrees: f64, sweep_degrees: f64, use_center: bool) {
        self.push(format!(
            "draw_arc({}, {start_degrees}, {sweep_degrees}, {use_center})",
            r(bounds)
        ));
    }

    fn draw_path(&mut self, _path: &Arc<BezPath>) {
        self.push("draw_path".into());
    }

    fn draw_points(&mut self, mode: PointMode, points: &[Point]) {
        self.push(format!("draw_points({mode:?}, {})", points.len()));
    }

    fn draw_vertices(&mut self, vertices: &Arc<Vertices>, mode: BlendMode) {
        self.push(format!("draw_vertices({}, {mode:?})", vertices.positions.len()));
    }

    fn draw_image(
        &mut self,
        _image: &Arc<dyn DlImage>,
        point: Point,
        _sampling: ImageSampling,
        with_attributes: bool,
    ) {
        self.push(format!("draw_image({}, {with_attributes})", p(point)));
    }

    fn draw_image_rect(
        &mut self,
        _image: &Arc<dyn DlImage>,
        src: Rect,
        dst: Rect,
        _sampling: ImageSampling,
        with_attributes: bool,
        constraint: SrcRectConstraint,
    ) {
        self.push(format!(
            "draw_image_rect({}, {}, {with_attributes}, {constraint:?})",
            r(src),
            r(dst)
        ));
    }

    fn draw_image_nine(
        &mut self,
        _image: &Arc<dyn DlImage>,
        center: Rect,
        dst: Rect,
        filter: FilterMode,
        with_attributes: bool,
    ) {
        self.push(format!(
            "draw_image_nine({}, {}, {filter:?}, {with_attributes})",
            r(center),
            r(dst)
        ));
    }

    fn draw_atlas(
        &mut self,
        _image: &Arc<dyn DlImage>,
        xforms: &[RsTransform],
        tex: &[Rect],
        colors: &[DlColor],
        mode: BlendMode,
        _sampling: ImageSampling,
        cull: Option<Rect>,
        with_attributes: bool,
    ) {
        self.push(format!(
            "draw_atlas({}, {}, {}, {mode:?}, cull={}, {with_attributes})",
            xforms.len(),
            tex.len(),
            colors.len(),
            cull.is_some()
        ));
    }

    fn draw_text(&mut self, text: &Arc<TextBlob>, x: f64, y: f64) {
        self.push(format!("draw_text({}, {x}, {y})", text.glyphs.len()));
    }

    fn draw_shadow(
        &mut self,
        _path: &Arc<BezPath>,
        color: DlColor,
        elevation: f64,
        transparent_occluder: bool,
        dpr: f64,
    ) {
        self.push(format!(
            "draw_shadow({color:?}, {elevation}, {transparent_occluder}, {dpr})"
        ));
    }

    fn draw_display_list(&mut self, list: &Arc<DisplayList>, opacity: f64) {
        self.push(format!("draw_display_list({}, {opacity})", list.op_count(false)));
    }
}
