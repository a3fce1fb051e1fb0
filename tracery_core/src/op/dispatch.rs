// Copyright 2026 the Tracery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Decoding a stored op and forwarding it to a receiver.

use alloc::vec::Vec;
use core::mem::size_of;

use kurbo::{Point, Rect};

use super::records::{
    decode, point_from, rect_from, round_rect_from, Affine2DPayload, ArcPayload, AtlasPayload,
    CirclePayload, ClipPathPayload, ClipRectPayload, ClipRoundRectPayload, DashedLinePayload,
    DiffRoundRectPayload, DisplayListPayload, DrawColorPayload, ImageNinePayload, ImagePayload,
    ImageRectPayload, LinePayload, MaskFilterPayload, PairPayload, PerspectivePayload,
    PointsPayload, RectPayload, ResourcePayload, RoundRectPayload, SaveLayerPayload, SavePayload,
    ScalarPayload, ShadowPayload, TextPayload, U32Payload, VerticesPayload,
};
use super::{OpHeader, OpType, HEADER_SIZE};
use crate::effects::{BlurStyle, MaskFilter};
use crate::matrix::Matrix;
use crate::paint::{
    BlendMode, ClipOp, DlColor, DrawStyle, FilterMode, ImageSampling, PointMode, SaveLayerOptions,
    SrcRectConstraint, StrokeCap, StrokeJoin,
};
use crate::receiver::DlOpReceiver;
use crate::resource::{ResourceTable, RsTransform, NO_RESOURCE};
use crate::storage::DlStorage;

/// Reads the header at `offset`.
///
/// # Panics
///
/// Panics on an unknown tag.
pub(crate) fn read_header(storage: &DlStorage, offset: usize) -> (OpType, usize) {
    let header: &OpHeader = storage.record(offset);
    match OpType::from_raw(header.op_type) {
        Some(op_type) => (op_type, header.size as usize),
        None => panic!(
            "corrupt display list: unknown op tag {} at offset {offset}",
            header.op_type
        ),
    }
}

#[inline]
fn clip_op(raw: u32) -> ClipOp {
    decode(raw, ClipOp::from_raw, "clip op")
}

#[inline]
fn blend_mode(raw: u32) -> BlendMode {
    decode(raw, BlendMode::from_raw, "blend mode")
}

#[inline]
fn sampling(raw: u32) -> ImageSampling {
    decode(raw, ImageSampling::from_raw, "image sampling")
}

/// Forwards the op stored at `offset` to `receiver`.
pub(crate) fn dispatch_op(
    storage: &DlStorage,
    resources: &ResourceTable,
    offset: usize,
    receiver: &mut dyn DlOpReceiver,
) {
    let (op_type, _) = read_header(storage, offset);
    let body = offset + HEADER_SIZE;
    match op_type {
        OpType::SetAntiAlias => {
            receiver.set_anti_alias(storage.record::<U32Payload>(body).value != 0);
        }
        OpType::SetInvertColors => {
            receiver.set_invert_colors(storage.record::<U32Payload>(body).value != 0);
        }
        OpType::SetStrokeCap => {
            let raw = storage.record::<U32Payload>(body).value;
            receiver.set_stroke_cap(decode(raw, StrokeCap::from_raw, "stroke cap"));
        }
        OpType::SetStrokeJoin => {
            let raw = storage.record::<U32Payload>(body).value;
            receiver.set_stroke_join(decode(raw, StrokeJoin::from_raw, "stroke join"));
        }
        OpType::SetDrawStyle => {
            let raw = storage.record::<U32Payload>(body).value;
            receiver.set_draw_style(decode(raw, DrawStyle::from_raw, "draw style"));
        }
        OpType::SetStrokeWidth => {
            receiver.set_stroke_width(storage.record::<ScalarPayload>(body).value);
        }
        OpType::SetStrokeMiter => {
            receiver.set_stroke_miter(storage.record::<ScalarPayload>(body).value);
        }
        OpType::SetColor => {
            receiver.set_color(DlColor(storage.record::<U32Payload>(body).value));
        }
        OpType::SetBlendMode => {
            receiver.set_blend_mode(blend_mode(storage.record::<U32Payload>(body).value));
        }
        OpType::SetColorSource => {
            let slot = storage.record::<ResourcePayload>(body).slot;
            receiver.set_color_source(Some(resources.color_source(slot)));
        }
        OpType::ClearColorSource => receiver.set_color_source(None),
        OpType::SetColorFilter => {
            let slot = storage.record::<ResourcePayload>(body).slot;
            receiver.set_color_filter(Some(resources.color_filter(slot)));
        }
        OpType::ClearColorFilter => receiver.set_color_filter(None),
        OpType::SetImageFilter => {
            let slot = storage.record::<ResourcePayload>(body).slot;
            receiver.set_image_filter(Some(resources.image_filter(slot)));
        }
        OpType::ClearImageFilter => receiver.set_image_filter(None),
        OpType::SetMaskFilter => {
            let op: &MaskFilterPayload = storage.record(body);
            let filter = MaskFilter {
                style: decode(op.style, BlurStyle::from_raw, "blur style"),
                sigma: op.sigma,
                respect_ctm: op.respect_ctm != 0,
            };
            receiver.set_mask_filter(Some(&filter));
        }
        OpType::ClearMaskFilter => receiver.set_mask_filter(None),

        OpType::Save => {
            receiver.save(storage.record::<SavePayload>(body).total_content_depth);
        }
        OpType::SaveLayer | OpType::SaveLayerBackdrop => {
            let op: &SaveLayerPayload = storage.record(body);
            let backdrop = if op.backdrop == NO_RESOURCE {
                None
            } else {
                Some(resources.image_filter(op.backdrop))
            };
            receiver.save_layer(
                rect_from(op.rect),
                SaveLayerOptions::from_bits_truncate(op.options),
                op.total_content_depth,
                blend_mode(op.max_blend_mode),
                backdrop,
            );
        }
        OpType::Restore => receiver.restore(),

        OpType::Translate => {
            let op: &PairPayload = storage.record(body);
            receiver.translate(op.x, op.y);
        }
        OpType::Scale => {
            let op: &PairPayload = storage.record(body);
            receiver.scale(op.x, op.y);
        }
        OpType::Rotate => receiver.rotate(storage.record::<ScalarPayload>(body).value),
        OpType::Skew => {
            let op: &PairPayload = storage.record(body);
            receiver.skew(op.x, op.y);
        }
        OpType::Transform2DAffine => {
            let [mxx, mxy, mxt, myx, myy, myt] = storage.record::<Affine2DPayload>(body).m;
            receiver.transform_2d_affine(mxx, mxy, mxt, myx, myy, myt);
        }
        OpType::TransformFullPerspective => {
            let m = storage.record::<PerspectivePayload>(body).m;
            receiver.transform_full_perspective(&Matrix::from_row_major(m));
        }
        OpType::TransformReset => receiver.transform_reset(),

        OpType::ClipRect => {
            let op: &ClipRectPayload = storage.record(body);
            receiver.clip_rect(rect_from(op.rect), clip_op(op.clip_op), op.is_aa != 0);
        }
        OpType::ClipOval => {
            let op: &ClipRectPayload = storage.record(body);
            receiver.clip_oval(rect_from(op.rect), clip_op(op.clip_op), op.is_aa != 0);
        }
        OpType::ClipRoundRect => {
            let op: &ClipRoundRectPayload = storage.record(body);
            receiver.clip_round_rect(
                round_rect_from(op.rect, op.radii),
                clip_op(op.clip_op),
                op.is_aa != 0,
            );
        }
        OpType::ClipPath => {
            let op: &ClipPathPayload = storage.record(body);
            receiver.clip_path(
                resources.path(op.slot),
                clip_op(op.clip_op),
                op.is_aa != 0,
            );
        }

        OpType::DrawPaint => receiver.draw_paint(),
        OpType::DrawColor => {
            let op: &DrawColorPayload = storage.record(body);
            receiver.draw_color(DlColor(op.color), blend_mode(op.mode));
        }
        OpType::DrawLine => {
            let op: &LinePayload = storage.record(body);
            receiver.draw_line(point_from(op.p0), point_from(op.p1));
        }
        OpType::DrawDashedLine => {
            let op: &DashedLinePayload = storage.record(body);
            receiver.draw_dashed_line(point_from(op.p0), point_from(op.p1), op.on, op.off);
        }
        OpType::DrawRect => receiver.draw_rect(rect_from(storage.record::<RectPayload>(body).rect)),
        OpType::DrawOval => receiver.draw_oval(rect_from(storage.record::<RectPayload>(body).rect)),
        OpType::DrawCircle => {
            let op: &CirclePayload = storage.record(body);
            receiver.draw_circle(point_from(op.center), op.radius);
        }
        OpType::DrawRoundRect => {
            let op: &RoundRectPayload = storage.record(body);
            receiver.draw_round_rect(round_rect_from(op.rect, op.radii));
        }
        OpType::DrawDiffRoundRect => {
            let op: &DiffRoundRectPayload = storage.record(body);
            receiver.draw_diff_round_rect(
                round_rect_from(op.outer_rect, op.outer_radii),
                round_rect_from(op.inner_rect, op.inner_radii),
            );
        }
        OpType::DrawArc => {
            let op: &ArcPayload = storage.record(body);
            receiver.draw_arc(rect_from(op.rect), op.start, op.sweep, op.use_center != 0);
        }
        OpType::DrawPath => {
            receiver.draw_path(resources.path(storage.record::<ResourcePayload>(body).slot));
        }
        OpType::DrawPoints => {
            let op: &PointsPayload = storage.record(body);
            let mode = decode(op.mode, PointMode::from_raw, "point mode");
            let points: Vec<Point> = storage
                .slice::<[f64; 2]>(body + size_of::<PointsPayload>(), op.count as usize)
                .iter()
                .map(|p| point_from(*p))
                .collect();
            receiver.draw_points(mode, &points);
        }
        OpType::DrawVertices => {
            let op: &VerticesPayload = storage.record(body);
            receiver.draw_vertices(resources.vertices(op.slot), blend_mode(op.mode));
        }
        OpType::DrawImage => {
            let op: &ImagePayload = storage.record(body);
            receiver.draw_image(
                resources.image(op.slot),
                point_from(op.point),
                sampling(op.sampling),
                op.with_attributes != 0,
            );
        }
        OpType::DrawImageRect => {
            let op: &ImageRectPayload = storage.record(body);
            receiver.draw_image_rect(
                resources.image(op.slot),
                rect_from(op.src),
                rect_from(op.dst),
                sampling(op.sampling),
                op.with_attributes != 0,
                decode(op.constraint, SrcRectConstraint::from_raw, "rect constraint"),
            );
        }
        OpType::DrawImageNine => {
            let op: &ImageNinePayload = storage.record(body);
            receiver.draw_image_nine(
                resources.image(op.slot),
                rect_from(op.center),
                rect_from(op.dst),
                decode(op.filter, FilterMode::from_raw, "filter mode"),
                op.with_attributes != 0,
            );
        }
        OpType::DrawAtlas => {
            let op: &AtlasPayload = storage.record(body);
            let count = op.count as usize;
            let xforms_at = body + size_of::<AtlasPayload>();
            let tex_at = xforms_at + count * size_of::<RsTransform>();
            let colors_at = tex_at + count * size_of::<[f64; 4]>();
            let xforms = storage.slice::<RsTransform>(xforms_at, count);
            let tex: Vec<Rect> = storage
                .slice::<[f64; 4]>(tex_at, count)
                .iter()
                .map(|r| rect_from(*r))
                .collect();
            let colors: &[DlColor] = if op.has_colors != 0 {
                storage.slice(colors_at, count)
            } else {
                &[]
            };
            receiver.draw_atlas(
                resources.image(op.slot),
                xforms,
                &tex,
                colors,
                blend_mode(op.mode),
                sampling(op.sampling),
                (op.has_cull != 0).then(|| rect_from(op.cull)),
                op.with_attributes != 0,
            );
        }
        OpType::DrawText => {
            let op: &TextPayload = storage.record(body);
            receiver.draw_text(resources.text(op.slot), op.x, op.y);
        }
        OpType::DrawShadow => {
            let op: &ShadowPayload = storage.record(body);
            receiver.draw_shadow(
                resources.path(op.slot),
                DlColor(op.color),
                op.elevation,
                op.transparent_occluder != 0,
                op.dpr,
            );
        }

        OpType::DrawDisplayList => {
            let op: &DisplayListPayload = storage.record(body);
            receiver.draw_display_list(resources.display_list(op.slot), op.opacity);
        }
    }
}

/// Resource slot referenced by a resource-holding record, if any.
pub(crate) fn resource_slot(storage: &DlStorage, offset: usize, op_type: OpType) -> Option<u32> {
    let body = offset + HEADER_SIZE;
    let slot = match op_type {
        OpType::SetColorSource
        | OpType::SetColorFilter
        | OpType::SetImageFilter
        | OpType::DrawPath => storage.record::<ResourcePayload>(body).slot,
        OpType::SaveLayerBackdrop => storage.record::<SaveLayerPayload>(body).backdrop,
        OpType::ClipPath => storage.record::<ClipPathPayload>(body).slot,
        OpType::DrawVertices => storage.record::<VerticesPayload>(body).slot,
        OpType::DrawImage => storage.record::<ImagePayload>(body).slot,
        OpType::DrawImageRect => storage.record::<ImageRectPayload>(body).slot,
        OpType::DrawImageNine => storage.record::<ImageNinePayload>(body).slot,
        OpType::DrawAtlas => storage.record::<AtlasPayload>(body).slot,
        OpType::DrawText => storage.record::<TextPayload>(body).slot,
        OpType::DrawShadow => storage.record::<ShadowPayload>(body).slot,
        OpType::DrawDisplayList => storage.record::<DisplayListPayload>(body).slot,
        _ => return None,
    };
    Some(slot)
}

/// Restore index stored in a `Save`, `SaveLayer` or `SaveLayerBackdrop`
/// record.
pub(crate) fn restore_index(storage: &DlStorage, offset: usize, op_type: OpType) -> usize {
    let body = offset + HEADER_SIZE;
    match op_type {
        OpType::Save => storage.record::<SavePayload>(body).restore_index as usize,
        OpType::SaveLayer | OpType::SaveLayerBackdrop => {
            storage.record::<SaveLayerPayload>(body).restore_index as usize
        }
        other => panic!("corrupt display list: {other:?} has no restore index"),
    }
}
