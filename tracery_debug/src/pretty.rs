// Copyright 2026 the Tracery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable output for trace events and replayed ops.
//!
//! Write errors are ignored: these printers are diagnostics and must never
//! disturb the code being inspected.

use std::io::{self, Write};
use std::sync::Arc;

use kurbo::{BezPath, Point, Rect, RoundedRect, Shape};
use tracery_core::DisplayList;
use tracery_core::effects::{ColorFilter, ColorSource, ImageFilter, MaskFilter};
use tracery_core::id::DisplayListId;
use tracery_core::matrix::Matrix;
use tracery_core::paint::{
    BlendMode, ClipOp, DlColor, DrawStyle, FilterMode, ImageSampling, PointMode, SaveLayerOptions,
    SrcRectConstraint, StrokeCap, StrokeJoin,
};
use tracery_core::receiver::DlOpReceiver;
use tracery_core::resource::{DlImage, RsTransform, TextBlob, Vertices};
use tracery_core::trace::{BuildSummary, CullSummary, TraceSink};

fn fmt_rect(r: Rect) -> String {
    format!("[{}, {}, {}, {}]", r.x0, r.y0, r.x1, r.y1)
}

fn fmt_point(p: Point) -> String {
    format!("({}, {})", p.x, p.y)
}

fn fmt_rrect(rr: RoundedRect) -> String {
    let radii = rr.radii();
    format!(
        "{} r=[{}, {}, {}, {}]",
        fmt_rect(rr.rect()),
        radii.top_left,
        radii.top_right,
        radii.bottom_right,
        radii.bottom_left
    )
}

// ---------------------------------------------------------------------------
// PrettyPrintSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that writes one line per event.
#[derive(Debug)]
pub struct PrettyPrintSink<W> {
    out: W,
}

impl PrettyPrintSink<io::Stderr> {
    /// Prints to standard error.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Prints to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Returns the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_build(&mut self, e: &BuildSummary) {
        _ = writeln!(
            self.out,
            "[build {}] ops={} bytes={} nested_ops={} depth={} bounds={} rtree={} \
             elided_saves={} culled={} no_effect={}",
            e.list_id.get(),
            e.op_count,
            e.byte_count,
            e.nested_op_count,
            e.total_depth,
            fmt_rect(e.bounds),
            e.has_rtree,
            e.elided_saves,
            e.culled_ops,
            e.no_effect_ops,
        );
    }

    fn on_cull(&mut self, e: &CullSummary) {
        let mode = if e.full_replay { "full" } else { "culled" };
        _ = writeln!(
            self.out,
            "[cull {}] {mode} kept={}/{} candidates={}",
            e.list_id.get(),
            e.kept_count,
            e.op_count,
            e.candidate_count,
        );
    }

    fn on_culled_indices(&mut self, list_id: DisplayListId, indices: &[usize]) {
        _ = writeln!(self.out, "[cull {}]   indices={indices:?}", list_id.get());
    }
}

// ---------------------------------------------------------------------------
// PrettyPrintReceiver
// ---------------------------------------------------------------------------

/// A [`DlOpReceiver`] that writes one line per op, indented by save depth.
///
/// Nested display lists are printed inline, one level deeper, when
/// [`expand_nested`](Self::expand_nested) is set.
#[derive(Debug)]
pub struct PrettyPrintReceiver<W> {
    out: W,
    depth: usize,
    expand_nested: bool,
}

impl<W: Write> PrettyPrintReceiver<W> {
    /// Prints to `out`, without expanding nested lists.
    pub fn new(out: W) -> Self {
        Self {
            out,
            depth: 0,
            expand_nested: false,
        }
    }

    /// Also prints the ops of every nested display list.
    #[must_use]
    pub fn expand_nested(mut self, expand: bool) -> Self {
        self.expand_nested = expand;
        self
    }

    /// Returns the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        _ = writeln!(self.out, "{:indent$}{text}", "", indent = self.depth * 2);
    }
}

/// Renders every op of `list`, nested lists included.
#[must_use]
pub fn dump(list: &DisplayList) -> String {
    let mut printer = PrettyPrintReceiver::new(Vec::new()).expand_nested(true);
    list.dispatch(&mut printer);
    String::from_utf8_lossy(&printer.into_inner()).into_owned()
}

impl<W: Write> DlOpReceiver for PrettyPrintReceiver<W> {
    fn set_anti_alias(&mut self, aa: bool) {
        self.line(&format!("set_anti_alias({aa})"));
    }

    fn set_invert_colors(&mut self, invert: bool) {
        self.line(&format!("set_invert_colors({invert})"));
    }

    fn set_stroke_cap(&mut self, cap: StrokeCap) {
        self.line(&format!("set_stroke_cap({cap:?})"));
    }

    fn set_stroke_join(&mut self, join: StrokeJoin) {
        self.line(&format!("set_stroke_join({join:?})"));
    }

    fn set_draw_style(&mut self, style: DrawStyle) {
        self.line(&format!("set_draw_style({style:?})"));
    }

    fn set_stroke_width(&mut self, width: f64) {
        self.line(&format!("set_stroke_width({width})"));
    }

    fn set_stroke_miter(&mut self, limit: f64) {
        self.line(&format!("set_stroke_miter({limit})"));
    }

    fn set_color(&mut self, color: DlColor) {
        self.line(&format!("set_color({color:?})"));
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.line(&format!("set_blend_mode({mode:?})"));
    }

    fn set_color_source(&mut self, source: Option<&Arc<ColorSource>>) {
        match source {
            Some(source) => self.line(&format!("set_color_source({source:?})")),
            None => self.line("clear_color_source"),
        }
    }

    fn set_color_filter(&mut self, filter: Option<&Arc<ColorFilter>>) {
        match filter {
            Some(filter) => self.line(&format!("set_color_filter({filter:?})")),
            None => self.line("clear_color_filter"),
        }
    }

    fn set_image_filter(&mut self, filter: Option<&Arc<ImageFilter>>) {
        match filter {
            Some(filter) => self.line(&format!("set_image_filter({filter:?})")),
            None => self.line("clear_image_filter"),
        }
    }

    fn set_mask_filter(&mut self, filter: Option<&MaskFilter>) {
        match filter {
            Some(filter) => self.line(&format!("set_mask_filter({filter:?})")),
            None => self.line("clear_mask_filter"),
        }
    }

    fn save(&mut self, total_content_depth: u32) {
        self.line(&format!("save(depth={total_content_depth})"));
        self.depth += 1;
    }

    fn save_layer(
        &mut self,
        bounds: Rect,
        options: SaveLayerOptions,
        total_content_depth: u32,
        max_content_blend_mode: BlendMode,
        backdrop: Option<&Arc<ImageFilter>>,
    ) {
        let mut text = format!(
            "save_layer({}, {options:?}, depth={total_content_depth}, \
             max_blend={max_content_blend_mode:?}",
            fmt_rect(bounds)
        );
        if let Some(backdrop) = backdrop {
            text.push_str(&format!(", backdrop={backdrop:?}"));
        }
        text.push(')');
        self.line(&text);
        self.depth += 1;
    }

    fn restore(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.line("restore");
    }

    fn translate(&mut self, tx: f64, ty: f64) {
        self.line(&format!("translate({tx}, {ty})"));
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.line(&format!("scale({sx}, {sy})"));
    }

    fn rotate(&mut self, degrees: f64) {
        self.line(&format!("rotate({degrees})"));
    }

    fn skew(&mut self, sx: f64, sy: f64) {
        self.line(&format!("skew({sx}, {sy})"));
    }

    fn transform_2d_affine(&mut self, mxx: f64, mxy: f64, mxt: f64, myx: f64, myy: f64, myt: f64) {
        self.line(&format!(
            "transform_2d_affine([{mxx}, {mxy}, {mxt}], [{myx}, {myy}, {myt}])"
        ));
    }

    fn transform_full_perspective(&mut self, matrix: &Matrix) {
        let rows: Vec<String> = matrix
            .to_row_major()
            .chunks(4)
            .map(|row| format!("{row:?}"))
            .collect();
        self.line(&format!("transform_full_perspective({})", rows.join(", ")));
    }

    fn transform_reset(&mut self) {
        self.line("transform_reset");
    }

    fn clip_rect(&mut self, rect: Rect, op: ClipOp, is_aa: bool) {
        self.line(&format!("clip_rect({}, {op:?}, aa={is_aa})", fmt_rect(rect)));
    }

    fn clip_oval(&mut self, bounds: Rect, op: ClipOp, is_aa: bool) {
        self.line(&format!("clip_oval({}, {op:?}, aa={is_aa})", fmt_rect(bounds)));
    }

    fn clip_round_rect(&mut self, rrect: RoundedRect, op: ClipOp, is_aa: bool) {
        self.line(&format!(
            "clip_round_rect({}, {op:?}, aa={is_aa})",
            fmt_rrect(rrect)
        ));
    }

    fn clip_path(&mut self, path: &Arc<BezPath>, op: ClipOp, is_aa: bool) {
        self.line(&format!(
            "clip_path(bounds={}, {op:?}, aa={is_aa})",
            fmt_rect(path.bounding_box())
        ));
    }

    fn draw_paint(&mut self) {
        self.line("draw_paint");
    }

    fn draw_color(&mut self, color: DlColor, mode: BlendMode) {
        self.line(&format!("draw_color({color:?}, {mode:?})"));
    }

    fn draw_line(&mut self, p0: Point, p1: Point) {
        self.line(&format!("draw_line({}, {})", fmt_point(p0), fmt_point(p1)));
    }

    fn draw_dashed_line(&mut self, p0: Point, p1: Point, on_length: f64, off_length: f64) {
        self.line(&format!(
            "draw_dashed_line({}, {}, on={on_length}, off={off_length})",
            fmt_point(p0),
            fmt_point(p1)
        ));
    }

    fn draw_rect(&mut self, rect: Rect) {
        self.line(&format!("draw_rect({})", fmt_rect(rect)));
    }

    fn draw_oval(&mut self, bounds: Rect) {
        self.line(&format!("draw_oval({})", fmt_rect(bounds)));
    }

    fn draw_circle(&mut self, center: Point, radius: f64) {
        self.line(&format!("draw_circle({}, {radius})", fmt_point(center)));
    }

    fn draw_round_rect(&mut self, rrect: RoundedRect) {
        self.line(&format!("draw_round_rect({})", fmt_rrect(rrect)));
    }

    fn draw_diff_round_rect(&mut self, outer: RoundedRect, inner: RoundedRect) {
        self.line(&format!(
            "draw_diff_round_rect({}, {})",
            fmt_rrect(outer),
            fmt_rrect(inner)
        ));
    }

    fn draw_arc(&mut self, bounds: Rect, start_degrees: f64, sweep_degrees: f64, use_center: bool) {
        self.line(&format!(
            "draw_arc({}, start={start_degrees}, sweep={sweep_degrees}, center={use_center})",
            fmt_rect(bounds)
        ));
    }

    fn draw_path(&mut self, path: &Arc<BezPath>) {
        self.line(&format!(
            "draw_path(bounds={}, elements={})",
            fmt_rect(path.bounding_box()),
            path.elements().len()
        ));
    }

    fn draw_points(&mut self, mode: PointMode, points: &[Point]) {
        let points: Vec<String> = points.iter().copied().map(fmt_point).collect();
        self.line(&format!("draw_points({mode:?}, [{}])", points.join(", ")));
    }

    fn draw_vertices(&mut self, vertices: &Arc<Vertices>, mode: BlendMode) {
        self.line(&format!(
            "draw_vertices({:?}, count={}, {mode:?})",
            vertices.mode,
            vertices.positions.len()
        ));
    }

    fn draw_image(
        &mut self,
        image: &Arc<dyn DlImage>,
        point: Point,
        sampling: ImageSampling,
        with_attributes: bool,
    ) {
        self.line(&format!(
            "draw_image({}x{} at {}, {sampling:?}, attributes={with_attributes})",
            image.width(),
            image.height(),
            fmt_point(point)
        ));
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
        self.line(&format!(
            "draw_image_rect({}x{}, {} -> {}, {sampling:?}, attributes={with_attributes}, \
             {constraint:?})",
            image.width(),
            image.height(),
            fmt_rect(src),
            fmt_rect(dst)
        ));
    }

    fn draw_image_nine(
        &mut self,
        image: &Arc<dyn DlImage>,
        center: Rect,
        dst: Rect,
        filter: FilterMode,
        with_attributes: bool,
    ) {
        self.line(&format!(
            "draw_image_nine({}x{}, center={}, dst={}, {filter:?}, attributes={with_attributes})",
            image.width(),
            image.height(),
            fmt_rect(center),
            fmt_rect(dst)
        ));
    }

    fn draw_atlas(
        &mut self,
        image: &Arc<dyn DlImage>,
        xforms: &[RsTransform],
        _tex: &[Rect],
        colors: &[DlColor],
        mode: BlendMode,
        sampling: ImageSampling,
        cull: Option<Rect>,
        with_attributes: bool,
    ) {
        let cull = cull.map_or_else(|| "none".to_owned(), fmt_rect);
        self.line(&format!(
            "draw_atlas({}x{}, sprites={}, colors={}, {mode:?}, {sampling:?}, cull={cull}, \
             attributes={with_attributes})",
            image.width(),
            image.height(),
            xforms.len(),
            colors.len()
        ));
    }

    fn draw_text(&mut self, text: &Arc<TextBlob>, x: f64, y: f64) {
        self.line(&format!(
            "draw_text(glyphs={}, at ({x}, {y}), bounds={})",
            text.glyphs.len(),
            fmt_rect(text.bounds)
        ));
    }

    fn draw_shadow(
        &mut self,
        path: &Arc<BezPath>,
        color: DlColor,
        elevation: f64,
        transparent_occluder: bool,
        dpr: f64,
    ) {
        self.line(&format!(
            "draw_shadow(bounds={}, {color:?}, elevation={elevation}, \
             transparent={transparent_occluder}, dpr={dpr})",
            fmt_rect(path.bounding_box())
        ));
    }

    fn draw_display_list(&mut self, list: &Arc<DisplayList>, opacity: f64) {
        self.line(&format!(
            "draw_display_list(id={}, ops={}, opacity={opacity})",
            list.id().get(),
            list.op_count(false)
        ));
        if self.expand_nested {
            self.depth += 1;
            list.dispatch(self);
            self.depth -= 1;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tracery_core::DisplayListBuilder;
    use tracery_core::paint::Paint;
    use tracery_core::trace::Tracer;

    fn sample_list() -> Arc<DisplayList> {
        let mut builder = DisplayListBuilder::new(true);
        builder.save();
        builder.translate(5.0, 5.0);
        builder.draw_rect(Rect::new(0.0, 0.0, 10.0, 10.0), &Paint::with_color(DlColor::RED));
        builder.restore();
        builder.build()
    }

    #[test]
    fn receiver_indents_by_save_depth() {
        let text = dump(&sample_list());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "save(depth=1)",
                "  translate(5, 5)",
                "  set_color(DlColor(0xffff0000))",
                "  draw_rect([0, 0, 10, 10])",
                "restore",
            ]
        );
    }

    #[test]
    fn nested_lists_expand_one_level_deeper() {
        let inner = sample_list();
        let mut builder = DisplayListBuilder::new(false);
        builder.draw_display_list(&inner, 1.0);
        let outer = builder.build();

        let text = dump(&outer);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("draw_display_list("), "got {lines:?}");
        assert_eq!(lines[1], "  save(depth=1)");
        assert_eq!(lines[5], "  restore");
        assert_eq!(lines.len(), 6);

        let mut flat = PrettyPrintReceiver::new(Vec::new());
        outer.dispatch(&mut flat);
        assert_eq!(String::from_utf8(flat.into_inner()).unwrap().lines().count(), 1);
    }

    #[test]
    fn sink_prints_one_line_per_event() {
        let mut sink = PrettyPrintSink::new(Vec::new());
        let list = {
            let mut builder = DisplayListBuilder::new(true);
            builder.draw_rect(Rect::new(0.0, 0.0, 10.0, 10.0), &Paint::default());
            builder.draw_rect(Rect::new(50.0, 50.0, 60.0, 60.0), &Paint::default());
            let mut tracer = Tracer::new(&mut sink);
            builder.build_traced(&mut tracer)
        };
        {
            let mut tracer = Tracer::new(&mut sink);
            let mut printer = PrettyPrintReceiver::new(io::sink());
            list.dispatch_culled_traced(&mut printer, Rect::new(0.0, 0.0, 20.0, 20.0), &mut tracer);
        }

        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3, "got {lines:?}");
        assert!(lines[0].contains("ops=2"), "got {}", lines[0]);
        assert!(lines[0].contains("rtree=true"), "got {}", lines[0]);
        assert!(lines[1].contains("culled kept=1/2"), "got {}", lines[1]);
        assert!(lines[2].contains("indices=[0]"), "got {}", lines[2]);
    }
}
