// Copyright 2026 the Tracery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON export of display lists.
//!
//! [`export`] writes a list as a JSON array with one object per op:
//!
//! ```json
//! { "index": 3, "op": "DrawRect", "size": 40, "args": { "rect": [0, 0, 10, 10] } }
//! ```
//!
//! Nested display lists carry their own ops under `args.ops`. Resources
//! that have no natural JSON form (paths, images, filters) are summarized.

use std::io::{self, Write};
use std::sync::Arc;

use kurbo::{BezPath, Point, Rect, RoundedRect, Shape};
use serde_json::{Map, Value, json};
use tracery_core::DisplayList;
use tracery_core::effects::{ColorFilter, ColorSource, ImageFilter, MaskFilter};
use tracery_core::matrix::Matrix;
use tracery_core::paint::{
    BlendMode, ClipOp, DlColor, DrawStyle, FilterMode, ImageSampling, PointMode, SaveLayerOptions,
    SrcRectConstraint, StrokeCap, StrokeJoin,
};
use tracery_core::receiver::DlOpReceiver;
use tracery_core::resource::{DlImage, RsTransform, TextBlob, Vertices};

/// Writes every op of `list` as pretty-printed JSON.
pub fn export(list: &DisplayList, writer: &mut dyn Write) -> io::Result<()> {
    serde_json::to_writer_pretty(writer, &ops_to_json(list, None))?;
    Ok(())
}

/// Writes the ops a culled replay of `list` against `cull` would dispatch.
pub fn export_culled(list: &DisplayList, cull: Rect, writer: &mut dyn Write) -> io::Result<()> {
    let indices = list.culled_indices(cull);
    serde_json::to_writer_pretty(writer, &ops_to_json(list, Some(&indices)))?;
    Ok(())
}

fn ops_to_json(list: &DisplayList, only: Option<&[usize]>) -> Value {
    let mut ops = Vec::new();
    let mut collector = JsonReceiver::default();
    for record in list.op_records() {
        if only.is_some_and(|only| only.binary_search(&record.index).is_err()) {
            continue;
        }
        list.dispatch_at(&mut collector, record.index);
        let args = collector.args.take().unwrap_or(Value::Null);
        ops.push(json!({
            "index": record.index,
            "op": format!("{:?}", record.op_type),
            "size": record.size,
            "args": args,
        }));
    }
    Value::Array(ops)
}

fn rect(r: Rect) -> Value {
    json!([r.x0, r.y0, r.x1, r.y1])
}

fn point(p: Point) -> Value {
    json!([p.x, p.y])
}

fn rrect(rr: RoundedRect) -> Value {
    let radii = rr.radii();
    json!({
        "rect": rect(rr.rect()),
        "radii": [radii.top_left, radii.top_right, radii.bottom_right, radii.bottom_left],
    })
}

fn color(c: DlColor) -> Value {
    Value::String(format!("#{:08x}", c.0))
}

fn debug<T: core::fmt::Debug + ?Sized>(value: &T) -> Value {
    Value::String(format!("{value:?}"))
}

fn path_summary(path: &BezPath) -> Value {
    json!({
        "bounds": rect(path.bounding_box()),
        "elements": path.elements().len(),
    })
}

fn image_summary(image: &Arc<dyn DlImage>) -> Value {
    json!({
        "width": image.width(),
        "height": image.height(),
        "opaque": image.is_opaque(),
    })
}

/// Captures the arguments of the single op it was last handed.
#[derive(Debug, Default)]
struct JsonReceiver {
    args: Option<Value>,
}

impl JsonReceiver {
    fn set(&mut self, args: Value) {
        self.args = Some(args);
    }

    fn set_optional<T: core::fmt::Debug + ?Sized>(&mut self, value: Option<&T>) {
        self.set(value.map_or(Value::Null, |v| json!({ "value": debug(v) })));
    }
}

impl DlOpReceiver for JsonReceiver {
    fn set_anti_alias(&mut self, aa: bool) {
        self.set(json!({ "value": aa }));
    }

    fn set_invert_colors(&mut self, invert: bool) {
        self.set(json!({ "value": invert }));
    }

    fn set_stroke_cap(&mut self, cap: StrokeCap) {
        self.set(json!({ "value": debug(&cap) }));
    }

    fn set_stroke_join(&mut self, join: StrokeJoin) {
        self.set(json!({ "value": debug(&join) }));
    }

    fn set_draw_style(&mut self, style: DrawStyle) {
        self.set(json!({ "value": debug(&style) }));
    }

    fn set_stroke_width(&mut self, width: f64) {
        self.set(json!({ "value": width }));
    }

    fn set_stroke_miter(&mut self, limit: f64) {
        self.set(json!({ "value": limit }));
    }

    fn set_color(&mut self, c: DlColor) {
        self.set(json!({ "value": color(c) }));
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.set(json!({ "value": debug(&mode) }));
    }

    fn set_color_source(&mut self, source: Option<&Arc<ColorSource>>) {
        self.set_optional(source);
    }

    fn set_color_filter(&mut self, filter: Option<&Arc<ColorFilter>>) {
        self.set_optional(filter);
    }

    fn set_image_filter(&mut self, filter: Option<&Arc<ImageFilter>>) {
        self.set_optional(filter);
    }

    fn set_mask_filter(&mut self, filter: Option<&MaskFilter>) {
        self.set_optional(filter);
    }

    fn save(&mut self, total_content_depth: u32) {
        self.set(json!({ "total_content_depth": total_content_depth }));
    }

    fn save_layer(
        &mut self,
        bounds: Rect,
        options: SaveLayerOptions,
        total_content_depth: u32,
        max_content_blend_mode: BlendMode,
        backdrop: Option<&Arc<ImageFilter>>,
    ) {
        let flags: Vec<&str> = options.iter_names().map(|(name, _)| name).collect();
        let mut args = Map::new();
        args.insert("bounds".into(), rect(bounds));
        args.insert("options".into(), json!(flags));
        args.insert("total_content_depth".into(), json!(total_content_depth));
        args.insert("max_content_blend_mode".into(), debug(&max_content_blend_mode));
        if let Some(backdrop) = backdrop {
            args.insert("backdrop".into(), debug(backdrop));
        }
        self.set(Value::Object(args));
    }

    fn restore(&mut self) {
        self.set(Value::Null);
    }

    fn translate(&mut self, tx: f64, ty: f64) {
        self.set(json!({ "tx": tx, "ty": ty }));
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.set(json!({ "sx": sx, "sy": sy }));
    }

    fn rotate(&mut self, degrees: f64) {
        self.set(json!({ "degrees": degrees }));
    }

    fn skew(&mut self, sx: f64, sy: f64) {
        self.set(json!({ "sx": sx, "sy": sy }));
    }

    fn transform_2d_affine(&mut self, mxx: f64, mxy: f64, mxt: f64, myx: f64, myy: f64, myt: f64) {
        self.set(json!({ "matrix": [[mxx, mxy, mxt], [myx, myy, myt]] }));
    }

    fn transform_full_perspective(&mut self, matrix: &Matrix) {
        let rows: Vec<Value> = matrix
            .to_row_major()
            .chunks(4)
            .map(|row| json!(row))
            .collect();
        self.set(json!({ "matrix": rows }));
    }

    fn transform_reset(&mut self) {
        self.set(Value::Null);
    }

    fn clip_rect(&mut self, r: Rect, op: ClipOp, is_aa: bool) {
        self.set(json!({ "rect": rect(r), "clip_op": debug(&op), "aa": is_aa }));
    }

    fn clip_oval(&mut self, bounds: Rect, op: ClipOp, is_aa: bool) {
        self.set(json!({ "bounds": rect(bounds), "clip_op": debug(&op), "aa": is_aa }));
    }

    fn clip_round_rect(&mut self, rr: RoundedRect, op: ClipOp, is_aa: bool) {
        self.set(json!({ "rrect": rrect(rr), "clip_op": debug(&op), "aa": is_aa }));
    }

    fn clip_path(&mut self, path: &Arc<BezPath>, op: ClipOp, is_aa: bool) {
        self.set(json!({ "path": path_summary(path), "clip_op": debug(&op), "aa": is_aa }));
    }

    fn draw_paint(&mut self) {
        self.set(Value::Null);
    }

    fn draw_color(&mut self, c: DlColor, mode: BlendMode) {
        self.set(json!({ "color": color(c), "mode": debug(&mode) }));
    }

    fn draw_line(&mut self, p0: Point, p1: Point) {
        self.set(json!({ "p0": point(p0), "p1": point(p1) }));
    }

    fn draw_dashed_line(&mut self, p0: Point, p1: Point, on_length: f64, off_length: f64) {
        self.set(json!({
            "p0": point(p0),
            "p1": point(p1),
            "on": on_length,
            "off": off_length,
        }));
    }

    fn draw_rect(&mut self, r: Rect) {
        self.set(json!({ "rect": rect(r) }));
    }

    fn draw_oval(&mut self, bounds: Rect) {
        self.set(json!({ "bounds": rect(bounds) }));
    }

    fn draw_circle(&mut self, center: Point, radius: f64) {
        self.set(json!({ "center": point(center), "radius": radius }));
    }

    fn draw_round_rect(&mut self, rr: RoundedRect) {
        self.set(json!({ "rrect": rrect(rr) }));
    }

    fn draw_diff_round_rect(&mut self, outer: RoundedRect, inner: RoundedRect) {
        self.set(json!({ "outer": rrect(outer), "inner": rrect(inner) }));
    }

    fn draw_arc(&mut self, bounds: Rect, start_degrees: f64, sweep_degrees: f64, use_center: bool) {
        self.set(json!({
            "bounds": rect(bounds),
            "start": start_degrees,
            "sweep": sweep_degrees,
            "use_center": use_center,
        }));
    }

    fn draw_path(&mut self, path: &Arc<BezPath>) {
        self.set(json!({ "path": path_summary(path) }));
    }

    fn draw_points(&mut self, mode: PointMode, points: &[Point]) {
        let points: Vec<Value> = points.iter().copied().map(point).collect();
        self.set(json!({ "mode": debug(&mode), "points": points }));
    }

    fn draw_vertices(&mut self, vertices: &Arc<Vertices>, mode: BlendMode) {
        self.set(json!({
            "vertex_mode": debug(&vertices.mode),
            "count": vertices.positions.len(),
            "bounds": rect(vertices.bounds()),
            "mode": debug(&mode),
        }));
    }

    fn draw_image(
        &mut self,
        image: &Arc<dyn DlImage>,
        p: Point,
        sampling: ImageSampling,
        with_attributes: bool,
    ) {
        self.set(json!({
            "image": image_summary(image),
            "point": point(p),
            "sampling": debug(&sampling),
            "with_attributes": with_attributes,
        }));
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
        self.set(json!({
            "image": image_summary(image),
            "src": rect(src),
            "dst": rect(dst),
            "sampling": debug(&sampling),
            "with_attributes": with_attributes,
            "constraint": debug(&constraint),
        }));
    }

    fn draw_image_nine(
        &mut self,
        image: &Arc<dyn DlImage>,
        center: Rect,
        dst: Rect,
        filter: FilterMode,
        with_attributes: bool,
    ) {
        self.set(json!({
            "image": image_summary(image),
            "center": rect(center),
            "dst": rect(dst),
            "filter": debug(&filter),
            "with_attributes": with_attributes,
        }));
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
        let xforms: Vec<Value> = xforms
            .iter()
            .map(|x| json!([x.scos, x.ssin, x.tx, x.ty]))
            .collect();
        let tex: Vec<Value> = tex.iter().copied().map(rect).collect();
        let colors: Vec<Value> = colors.iter().copied().map(color).collect();
        self.set(json!({
            "image": image_summary(image),
            "xforms": xforms,
            "tex": tex,
            "colors": colors,
            "mode": debug(&mode),
            "sampling": debug(&sampling),
            "cull": cull.map_or(Value::Null, rect),
            "with_attributes": with_attributes,
        }));
    }

    fn draw_text(&mut self, text: &Arc<TextBlob>, x: f64, y: f64) {
        self.set(json!({
            "glyphs": text.glyphs.len(),
            "bounds": rect(text.bounds),
            "origin": [x, y],
        }));
    }

    fn draw_shadow(
        &mut self,
        path: &Arc<BezPath>,
        c: DlColor,
        elevation: f64,
        transparent_occluder: bool,
        dpr: f64,
    ) {
        self.set(json!({
            "path": path_summary(path),
            "color": color(c),
            "elevation": elevation,
            "transparent_occluder": transparent_occluder,
            "dpr": dpr,
        }));
    }

    fn draw_display_list(&mut self, list: &Arc<DisplayList>, opacity: f64) {
        self.set(json!({
            "id": list.id().get(),
            "opacity": opacity,
            "bounds": rect(list.bounds()),
            "ops": ops_to_json(list, None),
        }));
    }
}
