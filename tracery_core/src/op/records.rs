// Copyright 2026 the Tracery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixed-size payloads that follow an [`OpHeader`](super::OpHeader).
//!
//! Payloads are `#[repr(C)]` [`Pod`] structs with no implicit padding: flags
//! are stored as `u32`, enums as their `u32` discriminant, geometry as `f64`
//! arrays. A payload shape is shared by every op type with the same fields;
//! the header tag decides how it is read.
//!
//! Payloads followed by trailing `f64` arrays are sized to a multiple of 8.

use bytemuck::{Pod, Zeroable};
use kurbo::{Point, Rect, RoundedRect, RoundedRectRadii};

/// Single `u32` value: flags, enum discriminants, colors.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct U32Payload {
    pub(crate) value: u32,
    pub(crate) pad: u32,
}

/// Single scalar: stroke width, miter limit, rotation degrees.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct ScalarPayload {
    pub(crate) value: f64,
}

/// Resource slot only: set color source / filters, draw path.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct ResourcePayload {
    pub(crate) slot: u32,
    pub(crate) pad: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct MaskFilterPayload {
    pub(crate) style: u32,
    pub(crate) respect_ctm: u32,
    pub(crate) sigma: f64,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct SavePayload {
    pub(crate) restore_index: u32,
    pub(crate) total_content_depth: u32,
}

/// Shared by `SaveLayer` and `SaveLayerBackdrop`; `backdrop` is
/// `NO_RESOURCE` for the former.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct SaveLayerPayload {
    pub(crate) restore_index: u32,
    pub(crate) total_content_depth: u32,
    pub(crate) options: u32,
    pub(crate) max_blend_mode: u32,
    pub(crate) backdrop: u32,
    pub(crate) pad: u32,
    pub(crate) rect: [f64; 4],
}

/// Two scalars: translate, scale, skew.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct PairPayload {
    pub(crate) x: f64,
    pub(crate) y: f64,
}

/// Row-major `[mxx, mxy, mxt, myx, myy, myt]`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct Affine2DPayload {
    pub(crate) m: [f64; 6],
}

/// Row-major 4×4.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct PerspectivePayload {
    pub(crate) m: [f64; 16],
}

/// Clip rect and clip oval.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct ClipRectPayload {
    pub(crate) clip_op: u32,
    pub(crate) is_aa: u32,
    pub(crate) rect: [f64; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct ClipRoundRectPayload {
    pub(crate) clip_op: u32,
    pub(crate) is_aa: u32,
    pub(crate) rect: [f64; 4],
    pub(crate) radii: [f64; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct ClipPathPayload {
    pub(crate) clip_op: u32,
    pub(crate) is_aa: u32,
    pub(crate) slot: u32,
    pub(crate) pad: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct DrawColorPayload {
    pub(crate) color: u32,
    pub(crate) mode: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct LinePayload {
    pub(crate) p0: [f64; 2],
    pub(crate) p1: [f64; 2],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct DashedLinePayload {
    pub(crate) p0: [f64; 2],
    pub(crate) p1: [f64; 2],
    pub(crate) on: f64,
    pub(crate) off: f64,
}

/// Draw rect and draw oval.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct RectPayload {
    pub(crate) rect: [f64; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct CirclePayload {
    pub(crate) center: [f64; 2],
    pub(crate) radius: f64,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct RoundRectPayload {
    pub(crate) rect: [f64; 4],
    pub(crate) radii: [f64; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct DiffRoundRectPayload {
    pub(crate) outer_rect: [f64; 4],
    pub(crate) outer_radii: [f64; 4],
    pub(crate) inner_rect: [f64; 4],
    pub(crate) inner_radii: [f64; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct ArcPayload {
    pub(crate) use_center: u32,
    pub(crate) pad: u32,
    pub(crate) rect: [f64; 4],
    pub(crate) start: f64,
    pub(crate) sweep: f64,
}

/// Followed by `count` `[f64; 2]` points.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct PointsPayload {
    pub(crate) mode: u32,
    pub(crate) count: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct VerticesPayload {
    pub(crate) slot: u32,
    pub(crate) mode: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct ImagePayload {
    pub(crate) slot: u32,
    pub(crate) sampling: u32,
    pub(crate) with_attributes: u32,
    pub(crate) pad: u32,
    pub(crate) point: [f64; 2],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct ImageRectPayload {
    pub(crate) slot: u32,
    pub(crate) sampling: u32,
    pub(crate) with_attributes: u32,
    pub(crate) constraint: u32,
    pub(crate) src: [f64; 4],
    pub(crate) dst: [f64; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct ImageNinePayload {
    pub(crate) slot: u32,
    pub(crate) filter: u32,
    pub(crate) with_attributes: u32,
    pub(crate) pad: u32,
    pub(crate) center: [f64; 4],
    pub(crate) dst: [f64; 4],
}

/// Followed by `count` [`RsTransform`](crate::RsTransform)s, `count`
/// `[f64; 4]` texture rects and, when `has_colors`, `count` `u32` colors.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct AtlasPayload {
    pub(crate) slot: u32,
    pub(crate) count: u32,
    pub(crate) mode: u32,
    pub(crate) sampling: u32,
    pub(crate) with_attributes: u32,
    pub(crate) has_colors: u32,
    pub(crate) has_cull: u32,
    pub(crate) pad: u32,
    pub(crate) cull: [f64; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct TextPayload {
    pub(crate) slot: u32,
    pub(crate) pad: u32,
    pub(crate) x: f64,
    pub(crate) y: f64,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct ShadowPayload {
    pub(crate) slot: u32,
    pub(crate) color: u32,
    pub(crate) transparent_occluder: u32,
    pub(crate) pad: u32,
    pub(crate) elevation: f64,
    pub(crate) dpr: f64,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct DisplayListPayload {
    pub(crate) slot: u32,
    pub(crate) pad: u32,
    pub(crate) opacity: f64,
}

// ---------------------------------------------------------------------------
// Field conversions
// ---------------------------------------------------------------------------

#[inline]
pub(crate) fn rect_data(r: Rect) -> [f64; 4] {
    [r.x0, r.y0, r.x1, r.y1]
}

#[inline]
pub(crate) fn rect_from(d: [f64; 4]) -> Rect {
    Rect::new(d[0], d[1], d[2], d[3])
}

#[inline]
pub(crate) fn point_data(p: Point) -> [f64; 2] {
    [p.x, p.y]
}

#[inline]
pub(crate) fn point_from(d: [f64; 2]) -> Point {
    Point::new(d[0], d[1])
}

#[inline]
pub(crate) fn radii_data(r: RoundedRectRadii) -> [f64; 4] {
    [r.top_left, r.top_right, r.bottom_right, r.bottom_left]
}

#[inline]
pub(crate) fn round_rect_from(rect: [f64; 4], radii: [f64; 4]) -> RoundedRect {
    RoundedRect::from_rect(
        rect_from(rect),
        RoundedRectRadii::new(radii[0], radii[1], radii[2], radii[3]),
    )
}

/// Decodes a stored `u32` enum, panicking on an unknown discriminant.
#[inline]
pub(crate) fn decode<T>(raw: u32, from_raw: fn(u32) -> Option<T>, what: &str) -> T {
    match from_raw(raw) {
        Some(value) => value,
        None => panic!("corrupt display list: invalid {what} discriminant {raw}"),
    }
}
