// Copyright 2026 the Tracery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;

use kurbo::{BezPath, Point, Rect, RoundedRect};

use super::DisplayListBuilder;
use crate::display_list::DisplayList;
use crate::effects::{ColorFilter, ImageFilter, MaskFilter};
use crate::matrix::Matrix;
use crate::op::records::{SaveLayerPayload, SavePayload};
use crate::op::HEADER_SIZE;
use crate::paint::{
    BlendMode, ClipOp, DlColor, FilterMode, ImageSampling, Paint, PointMode, SaveLayerOptions,
    SrcRectConstraint,
};
use crate::resource::{DlImage, RsTransform};
use crate::testing::{test_text, triangle, RecordingReceiver, TestImage};

fn calls(list: &DisplayList) -> Vec<String> {
    let mut rec = RecordingReceiver::default();
    list.dispatch(&mut rec);
    rec.calls
}

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Rect {
    Rect::new(x0, y0, x1, y1)
}

fn first_layer(list: &DisplayList) -> SaveLayerPayload {
    *list.storage.record::<SaveLayerPayload>(HEADER_SIZE)
}

// ---------------------------------------------------------------------------
// Save / restore
// ---------------------------------------------------------------------------

#[test]
fn empty_scopes_are_never_recorded() {
    let mut b = DisplayListBuilder::new(false);
    b.save();
    b.restore();
    b.save();
    b.translate(0.0, 0.0);
    b.scale(1.0, 1.0);
    b.restore();
    let list = b.build();
    assert!(list.is_empty());
    assert_eq!(list.op_count(false), 0);
}

#[test]
fn only_the_scope_that_changes_state_is_saved() {
    let mut b = DisplayListBuilder::new(false);
    b.save();
    b.save();
    b.translate(1.0, 1.0);
    b.draw_rect(rect(0.0, 0.0, 5.0, 5.0), &Paint::default());
    b.restore();
    b.restore();
    let list = b.build();
    assert_eq!(
        calls(&list),
        vec!["save", "translate(1, 1)", "draw_rect(0, 0, 5, 5)", "restore"]
    );
}

#[test]
fn restore_patches_the_save() {
    let mut b = DisplayListBuilder::new(false);
    b.save();
    b.translate(1.0, 1.0);
    b.draw_rect(rect(0.0, 0.0, 5.0, 5.0), &Paint::default());
    b.draw_oval(rect(0.0, 0.0, 5.0, 5.0), &Paint::default());
    b.restore();
    let list = b.build();

    let save: &SavePayload = list.storage.record(HEADER_SIZE);
    assert_eq!(save.restore_index, 4);
    assert_eq!(save.total_content_depth, 2);
    assert_eq!(list.total_depth(), 2);
}

#[test]
fn restore_to_count_and_build_close_everything() {
    let mut b = DisplayListBuilder::new(false);
    b.save();
    b.translate(1.0, 0.0);
    b.save();
    b.translate(0.0, 1.0);
    b.save();
    assert_eq!(b.save_count(), 4);
    b.restore_to_count(2);
    assert_eq!(b.save_count(), 2);
    b.restore_to_count(0);
    assert_eq!(b.save_count(), 1);
    b.restore();
    assert_eq!(b.save_count(), 1, "restore at the root does nothing");

    b.save();
    b.translate(2.0, 2.0);
    let list = b.build();
    let list_calls = calls(&list);
    assert_eq!(list_calls.last().map(String::as_str), Some("restore"));
}

// ---------------------------------------------------------------------------
// Transforms and clips
// ---------------------------------------------------------------------------

#[test]
fn identity_and_non_finite_transforms_are_skipped() {
    let mut b = DisplayListBuilder::new(false);
    b.translate(0.0, 0.0);
    b.translate(f64::NAN, 1.0);
    b.scale(1.0, 1.0);
    b.rotate(360.0);
    b.rotate(f64::INFINITY);
    b.skew(0.0, 0.0);
    b.transform_2d_affine(1.0, 0.0, 5.0, 0.0, 1.0, 6.0);
    b.transform(&Matrix::from_translation(2.0, 3.0));
    b.transform_2d_affine(2.0, 0.0, 0.0, 0.0, 2.0, 0.0);
    b.rotate(90.0);
    let list = b.build();
    assert_eq!(
        calls(&list),
        vec![
            "translate(5, 6)",
            "translate(2, 3)",
            "transform_2d_affine(2, 0, 0, 0, 2, 0)",
            "rotate(90)",
        ]
    );
}

#[test]
fn set_transform_replaces_the_matrix() {
    let mut b = DisplayListBuilder::new(false);
    b.scale(3.0, 3.0);
    b.set_transform(&Matrix::from_translation(10.0, 0.0));
    assert_eq!(b.matrix(), Matrix::from_translation(10.0, 0.0));
    b.draw_rect(rect(0.0, 0.0, 5.0, 5.0), &Paint::default());
    let list = b.build();
    assert_eq!(list.bounds(), rect(10.0, 0.0, 15.0, 5.0));
    assert_eq!(
        calls(&list),
        vec![
            "scale(3, 3)",
            "transform_reset",
            "translate(10, 0)",
            "draw_rect(0, 0, 5, 5)",
        ]
    );
}

#[test]
fn bounds_follow_the_transform() {
    let mut b = DisplayListBuilder::new(false);
    b.translate(10.0, 20.0);
    b.scale(2.0, 2.0);
    b.draw_rect(rect(0.0, 0.0, 5.0, 5.0), &Paint::default());
    let list = b.build();
    assert_eq!(list.bounds(), rect(10.0, 20.0, 20.0, 30.0));
}

#[test]
fn clip_queries_track_the_current_scope() {
    let mut b = DisplayListBuilder::with_cull_rect(rect(0.0, 0.0, 100.0, 100.0), false);
    b.save();
    b.translate(10.0, 10.0);
    b.clip_rect(rect(0.0, 0.0, 20.0, 20.0), ClipOp::Intersect, false);
    assert_eq!(b.destination_clip_coverage(), rect(10.0, 10.0, 30.0, 30.0));
    assert_eq!(b.local_clip_coverage(), rect(0.0, 0.0, 20.0, 20.0));
    assert!(b.quick_reject(rect(30.0, 30.0, 40.0, 40.0)));
    assert!(!b.quick_reject(rect(5.0, 5.0, 40.0, 40.0)));
    b.restore();
    assert_eq!(b.destination_clip_coverage(), rect(0.0, 0.0, 100.0, 100.0));
}

#[test]
fn clip_covering_the_cull_rect_is_dropped() {
    let mut b = DisplayListBuilder::with_cull_rect(rect(0.0, 0.0, 100.0, 100.0), false);
    b.save();
    b.clip_rect(rect(-10.0, -10.0, 200.0, 200.0), ClipOp::Intersect, false);
    b.clip_rect(rect(5.0, 5.0, 5.0, 50.0), ClipOp::Difference, false);
    b.restore();
    assert!(b.build().is_empty());
}

#[test]
fn clip_covering_the_layer_clip_is_dropped() {
    let mut b = DisplayListBuilder::with_cull_rect(rect(0.0, 0.0, 100.0, 100.0), false);
    b.rotate(45.0);
    b.save_layer(None, None, None);
    b.clip_rect(rect(0.0, 0.0, 20.0, 20.0), ClipOp::Intersect, false);
    // The device clip is the rotated square's bounding box, which this does
    // not cover. In layer space it covers the clip exactly.
    b.clip_rect(rect(0.0, 0.0, 20.0, 20.0), ClipOp::Intersect, false);
    b.draw_rect(rect(5.0, 5.0, 10.0, 10.0), &Paint::default());
    b.restore();
    let list = b.build();
    let clips = calls(&list)
        .iter()
        .filter(|c| c.starts_with("clip_rect"))
        .count();
    assert_eq!(clips, 1, "{:?}", calls(&list));
}

#[test]
fn empty_clip_makes_the_scope_a_no_op() {
    let mut b = DisplayListBuilder::new(false);
    b.save();
    b.clip_rect(rect(0.0, 0.0, 10.0, 10.0), ClipOp::Intersect, false);
    b.clip_rect(rect(20.0, 20.0, 30.0, 30.0), ClipOp::Intersect, false);
    b.draw_rect(rect(0.0, 0.0, 5.0, 5.0), &Paint::with_color(DlColor::RED));
    b.translate(1.0, 1.0);
    b.restore();
    b.draw_rect(rect(50.0, 50.0, 60.0, 60.0), &Paint::default());
    let list = b.build();
    assert_eq!(
        calls(&list),
        vec![
            "save",
            "clip_rect(0, 0, 10, 10, Intersect)",
            "restore",
            "draw_rect(50, 50, 60, 60)",
        ]
    );
}

#[test]
fn clip_outside_the_cull_rect_never_saves() {
    let mut b = DisplayListBuilder::with_cull_rect(rect(0.0, 0.0, 100.0, 100.0), false);
    b.save();
    b.clip_rect(rect(200.0, 200.0, 300.0, 300.0), ClipOp::Intersect, false);
    b.draw_rect(rect(210.0, 210.0, 220.0, 220.0), &Paint::default());
    b.restore();
    b.save();
    b.clip_oval(rect(-50.0, -50.0, -10.0, -10.0), ClipOp::Intersect, false);
    b.draw_oval(rect(0.0, 0.0, 10.0, 10.0), &Paint::default());
    b.restore();
    let list = b.build();
    assert!(calls(&list).is_empty(), "{:?}", calls(&list));
    assert_eq!(list.op_count(false), 0);
}

#[test]
fn empty_path_clips() {
    let empty = Arc::new(BezPath::new());
    let mut b = DisplayListBuilder::new(false);
    b.save();
    b.clip_path(&empty, ClipOp::Difference, false);
    b.restore();
    b.draw_rect(rect(0.0, 0.0, 5.0, 5.0), &Paint::default());
    b.save();
    b.clip_path(&empty, ClipOp::Intersect, false);
    b.draw_rect(rect(0.0, 0.0, 5.0, 5.0), &Paint::default());
    b.restore();
    let list = b.build();
    assert_eq!(calls(&list), vec!["draw_rect(0, 0, 5, 5)"]);
}

#[test]
fn square_round_rect_clip_is_a_rect_clip() {
    let mut b = DisplayListBuilder::new(false);
    b.clip_round_rect(
        RoundedRect::from_rect(rect(0.0, 0.0, 10.0, 10.0), 0.0),
        ClipOp::Intersect,
        true,
    );
    b.clip_round_rect(
        RoundedRect::from_rect(rect(0.0, 0.0, 8.0, 8.0), 2.0),
        ClipOp::Intersect,
        true,
    );
    let list = b.build();
    assert_eq!(
        calls(&list),
        vec![
            "clip_rect(0, 0, 10, 10, Intersect)",
            "clip_round_rect(0, 0, 8, 8, Intersect)",
        ]
    );
}

// ---------------------------------------------------------------------------
// Culling and no-effect draws
// ---------------------------------------------------------------------------

#[test]
fn ops_outside_the_cull_rect_are_dropped() {
    let mut b = DisplayListBuilder::with_cull_rect(rect(0.0, 0.0, 100.0, 100.0), true);
    b.draw_rect(rect(200.0, 200.0, 210.0, 210.0), &Paint::default());
    b.draw_circle(Point::new(-50.0, -50.0), 10.0, &Paint::default());
    b.draw_rect(rect(90.0, 90.0, 110.0, 110.0), &Paint::default());
    let list = b.build();
    assert_eq!(calls(&list), vec!["draw_rect(90, 90, 110, 110)"]);
    assert_eq!(list.bounds(), rect(90.0, 90.0, 100.0, 100.0));
}

#[test]
fn draws_that_change_nothing_are_dropped() {
    let mut b = DisplayListBuilder::new(false);
    b.draw_rect(rect(0.0, 0.0, 5.0, 5.0), &Paint::with_color(DlColor::TRANSPARENT));
    b.draw_rect(
        rect(0.0, 0.0, 5.0, 5.0),
        &Paint::with_color(DlColor::RED).blend_mode(BlendMode::Dst),
    );
    b.draw_color(DlColor::TRANSPARENT, BlendMode::SrcOver);
    b.draw_shadow(&triangle(), DlColor::TRANSPARENT, 4.0, false, 1.0);
    b.draw_path(&Arc::new(BezPath::new()), &Paint::default());
    b.draw_points(PointMode::Points, &[], &Paint::default());
    let list = b.build();
    assert!(list.is_empty(), "{:?}", calls(&list));
}

#[test]
fn transparent_paint_with_flooding_filter_still_draws() {
    let paint = Paint::with_color(DlColor::TRANSPARENT).color_filter(ColorFilter::Blend {
        color: DlColor::BLUE,
        mode: BlendMode::Src,
    });
    let mut b = DisplayListBuilder::new(false);
    b.draw_rect(rect(0.0, 0.0, 5.0, 5.0), &paint);
    let list = b.build();
    assert_eq!(
        calls(&list),
        vec![
            "set_color(DlColor(0x00000000))",
            "set_color_filter(true)",
            "draw_rect(0, 0, 5, 5)",
        ]
    );
    assert!(list.modifies_transparent_black());
}

#[test]
fn attributes_are_recorded_only_on_change() {
    let red = Paint::with_color(DlColor::RED);
    let mut b = DisplayListBuilder::new(false);
    b.draw_rect(rect(0.0, 0.0, 5.0, 5.0), &red);
    b.draw_oval(rect(0.0, 0.0, 5.0, 5.0), &red);
    b.draw_rect(rect(0.0, 0.0, 5.0, 5.0), &red.clone().stroked(2.0));
    let list = b.build();
    assert_eq!(
        calls(&list),
        vec![
            "set_color(DlColor(0xffff0000))",
            "draw_rect(0, 0, 5, 5)",
            "draw_oval(0, 0, 5, 5)",
            "set_draw_style(Stroke)",
            "set_stroke_width(2)",
            "draw_rect(0, 0, 5, 5)",
        ]
    );
}

// ---------------------------------------------------------------------------
// Layers
// ---------------------------------------------------------------------------

#[test]
fn dst_layer_degrades_to_a_discarded_scope() {
    let mut b = DisplayListBuilder::new(false);
    b.save_layer(None, Some(&Paint::default().blend_mode(BlendMode::Dst)), None);
    b.draw_rect(rect(0.0, 0.0, 5.0, 5.0), &Paint::default());
    b.translate(1.0, 1.0);
    b.restore();
    assert!(b.build().is_empty());
}

#[test]
fn save_layer_is_patched_with_its_content() {
    let mut b = DisplayListBuilder::new(false);
    b.save_layer(None, None, None);
    b.draw_rect(rect(10.0, 10.0, 20.0, 20.0), &Paint::with_color(DlColor::RED));
    b.restore();
    let list = b.build();
    assert_eq!(
        calls(&list),
        vec![
            "save_layer(10, 10, 20, 20, backdrop=false)",
            "set_color(DlColor(0xffff0000))",
            "draw_rect(10, 10, 20, 20)",
            "restore",
        ]
    );
    let layer = first_layer(&list);
    let options = SaveLayerOptions::from_bits_truncate(layer.options);
    assert_eq!(layer.restore_index, 3);
    assert_eq!(layer.total_content_depth, 1);
    assert_eq!(list.total_depth(), 2);
    assert!(options.contains(SaveLayerOptions::CAN_DISTRIBUTE_OPACITY));
    assert!(!options.contains(SaveLayerOptions::BOUNDS_FROM_CALLER));
    assert_eq!(layer.max_blend_mode, BlendMode::SrcOver as u32);
}

#[test]
fn caller_bounds_clip_the_layer_content() {
    let mut b = DisplayListBuilder::new(false);
    b.save_layer(Some(rect(0.0, 0.0, 15.0, 15.0)), None, None);
    b.draw_rect(rect(10.0, 10.0, 20.0, 20.0), &Paint::default());
    b.draw_rect(rect(12.0, 12.0, 14.0, 14.0), &Paint::default());
    b.restore();
    let list = b.build();

    let layer = first_layer(&list);
    let options = SaveLayerOptions::from_bits_truncate(layer.options);
    assert!(options.contains(SaveLayerOptions::BOUNDS_FROM_CALLER));
    assert!(options.contains(SaveLayerOptions::CONTENT_IS_CLIPPED));
    assert!(
        !options.contains(SaveLayerOptions::CAN_DISTRIBUTE_OPACITY),
        "the two draws overlap"
    );
    assert_eq!(list.bounds(), rect(10.0, 10.0, 15.0, 15.0));
}

#[test]
fn backdrop_layer_floods_the_clip() {
    let blur = Arc::new(ImageFilter::blur(2.0, 2.0));
    let mut b = DisplayListBuilder::with_cull_rect(rect(0.0, 0.0, 100.0, 100.0), false);
    b.save_layer(None, None, Some(&blur));
    b.restore();
    let list = b.build();
    assert_eq!(calls(&list), vec!["save_layer(0, 0, 0, 0, backdrop=true)", "restore"]);
    assert!(list.root_has_backdrop_filter());
    assert!(list.root_is_unbounded());
    assert!(!list.can_apply_group_opacity());
    assert_eq!(list.bounds(), rect(0.0, 0.0, 100.0, 100.0));
}

#[test]
fn culling_keeps_backdrop_layers_anywhere_in_the_clip() {
    let blur = Arc::new(ImageFilter::blur(2.0, 2.0));
    let mut b = DisplayListBuilder::with_cull_rect(rect(0.0, 0.0, 100.0, 100.0), true);
    b.draw_rect(rect(10.0, 10.0, 20.0, 20.0), &Paint::default());
    b.save_layer(None, None, Some(&blur));
    b.draw_rect(rect(10.0, 10.0, 20.0, 20.0), &Paint::default());
    b.restore();
    let list = b.build();
    assert_eq!(list.op_count(false), 4);
    assert_eq!(list.culled_indices(rect(50.0, 50.0, 60.0, 60.0)), vec![1, 3]);
    assert_eq!(list.culled_indices(rect(12.0, 12.0, 14.0, 14.0)), vec![0, 1, 2, 3]);
}

#[test]
fn nested_backdrop_is_reported_on_the_layer() {
    let blur = Arc::new(ImageFilter::blur(2.0, 2.0));
    let mut b = DisplayListBuilder::with_cull_rect(rect(0.0, 0.0, 100.0, 100.0), false);
    b.save_layer(Some(rect(0.0, 0.0, 50.0, 50.0)), None, None);
    b.save_layer(None, None, Some(&blur));
    b.restore();
    b.restore();
    let list = b.build();
    let options = SaveLayerOptions::from_bits_truncate(first_layer(&list).options);
    assert!(options.contains(SaveLayerOptions::CONTAINS_BACKDROP_FILTER));
    assert!(options.contains(SaveLayerOptions::CONTENT_IS_UNBOUNDED));
    assert!(!list.root_has_backdrop_filter());
    assert!(!list.root_is_unbounded(), "the caller bounds contain the flood");
    assert_eq!(list.bounds(), rect(0.0, 0.0, 50.0, 50.0));
}

#[test]
fn flooding_color_filter_makes_the_list_unbounded() {
    let paint = Paint::default().color_filter(ColorFilter::Blend {
        color: DlColor::BLUE,
        mode: BlendMode::Src,
    });
    let mut b = DisplayListBuilder::with_cull_rect(rect(0.0, 0.0, 100.0, 100.0), true);
    b.save_layer(None, Some(&paint), None);
    b.draw_rect(rect(10.0, 10.0, 20.0, 20.0), &Paint::default());
    b.restore();
    let list = b.build();
    assert!(list.root_is_unbounded());
    assert!(list.modifies_transparent_black());
    assert_eq!(list.bounds(), rect(0.0, 0.0, 100.0, 100.0));
    assert_eq!(
        list.culled_indices(rect(80.0, 80.0, 90.0, 90.0)).len(),
        list.op_count(false),
        "everything in a flooded layer is visible everywhere"
    );
}

#[test]
fn filtered_layer_sees_content_beyond_the_clip() {
    let paint = Paint::default().image_filter(ImageFilter::blur(5.0, 5.0));
    let mut b = DisplayListBuilder::with_cull_rect(rect(0.0, 0.0, 100.0, 100.0), false);
    b.save_layer(None, Some(&paint), None);
    b.draw_rect(rect(105.0, 105.0, 110.0, 110.0), &Paint::default());
    b.draw_rect(rect(200.0, 200.0, 210.0, 210.0), &Paint::default());
    b.restore();
    let list = b.build();
    // Filter on, layer, filter off, one draw, restore.
    assert_eq!(list.op_count(false), 5, "{:?}", calls(&list));
    assert_eq!(list.bounds(), rect(90.0, 90.0, 100.0, 100.0));
}

#[test]
fn culling_sees_the_fringe_of_a_filtered_layer() {
    let paint = Paint::default().image_filter(ImageFilter::blur(5.0, 5.0));
    let mut b = DisplayListBuilder::with_cull_rect(rect(0.0, 0.0, 100.0, 100.0), true);
    b.save_layer(None, Some(&paint), None);
    b.draw_rect(rect(10.0, 10.0, 20.0, 20.0), &Paint::default());
    b.restore();
    let list = b.build();
    let everything: Vec<usize> = (0..list.op_count(false)).collect();
    // Outside the rect, inside its blur.
    assert_eq!(list.culled_indices(rect(22.0, 22.0, 24.0, 24.0)), everything);
    assert!(list.culled_indices(rect(60.0, 60.0, 70.0, 70.0)).is_empty());
}

// ---------------------------------------------------------------------------
// Group opacity
// ---------------------------------------------------------------------------

#[test]
fn group_opacity_needs_disjoint_simple_draws() {
    let disjoint = {
        let mut b = DisplayListBuilder::new(false);
        b.draw_rect(rect(0.0, 0.0, 10.0, 10.0), &Paint::default());
        b.draw_rect(rect(20.0, 20.0, 30.0, 30.0), &Paint::default());
        b.build()
    };
    assert!(disjoint.can_apply_group_opacity());

    let overlapping = {
        let mut b = DisplayListBuilder::new(false);
        b.draw_rect(rect(0.0, 0.0, 10.0, 10.0), &Paint::default());
        b.draw_rect(rect(5.0, 5.0, 15.0, 15.0), &Paint::default());
        b.build()
    };
    assert!(!overlapping.can_apply_group_opacity());

    let src = {
        let mut b = DisplayListBuilder::new(false);
        b.draw_rect(
            rect(0.0, 0.0, 10.0, 10.0),
            &Paint::default().blend_mode(BlendMode::Src),
        );
        b.build()
    };
    assert!(!src.can_apply_group_opacity());
    assert_eq!(src.max_root_blend_mode(), BlendMode::Src);

    let points = {
        let mut b = DisplayListBuilder::new(false);
        b.draw_points(
            PointMode::Points,
            &[Point::new(1.0, 1.0), Point::new(9.0, 9.0)],
            &Paint::default(),
        );
        b.build()
    };
    assert!(!points.can_apply_group_opacity());

    let hairline = {
        let mut b = DisplayListBuilder::new(false);
        b.draw_path(&triangle(), &Paint::default().stroked(0.0));
        b.build()
    };
    assert!(!hairline.can_apply_group_opacity());
}

#[test]
fn mask_filter_costs_an_extra_depth() {
    let mut b = DisplayListBuilder::new(false);
    b.draw_rect(
        rect(0.0, 0.0, 10.0, 10.0),
        &Paint::default().mask_filter(MaskFilter::blur(2.0)),
    );
    let list = b.build();
    assert_eq!(list.total_depth(), 2);
    assert_eq!(list.bounds(), rect(-6.0, -6.0, 16.0, 16.0));
}

// ---------------------------------------------------------------------------
// Images, text and nested lists
// ---------------------------------------------------------------------------

#[test]
fn thread_unsafe_images_taint_the_list() {
    let image: Arc<dyn DlImage> = Arc::new(TestImage {
        width: 8,
        height: 4,
        opaque: true,
        thread_safe: false,
    });
    let mut b = DisplayListBuilder::new(false);
    b.draw_image(&image, Point::new(2.0, 2.0), ImageSampling::Linear, None);
    let list = b.build();
    assert!(!list.is_ui_thread_safe());
    assert_eq!(list.bounds(), rect(2.0, 2.0, 10.0, 6.0));
    assert_eq!(calls(&list), vec!["draw_image(2, 2, false)"]);
}

#[test]
fn atlas_bounds_come_from_the_sprites() {
    let image: Arc<dyn DlImage> = Arc::new(TestImage::opaque(64, 64));
    let mut b = DisplayListBuilder::new(false);
    b.draw_atlas(
        &image,
        &[RsTransform::translate(10.0, 10.0), RsTransform::translate(40.0, 0.0)],
        &[rect(0.0, 0.0, 8.0, 8.0), rect(8.0, 0.0, 16.0, 4.0)],
        &[DlColor::RED, DlColor::BLUE],
        BlendMode::Modulate,
        ImageSampling::Nearest,
        None,
        None,
    );
    let list = b.build();
    assert_eq!(list.bounds(), rect(10.0, 0.0, 48.0, 18.0));
    assert_eq!(
        calls(&list),
        vec!["draw_atlas(2, 2, 2, Modulate, cull=false, false)"]
    );
}

#[test]
#[should_panic(expected = "one texture rect per transform")]
fn atlas_rejects_mismatched_slices() {
    let image: Arc<dyn DlImage> = Arc::new(TestImage::opaque(4, 4));
    let mut b = DisplayListBuilder::new(false);
    b.draw_atlas(
        &image,
        &[RsTransform::translate(0.0, 0.0)],
        &[],
        &[],
        BlendMode::SrcOver,
        ImageSampling::Nearest,
        None,
        None,
    );
}

#[test]
fn text_is_offset_by_its_origin() {
    let mut b = DisplayListBuilder::new(false);
    b.draw_text(&test_text(3), 5.0, 20.0, &Paint::default());
    let list = b.build();
    assert_eq!(list.bounds(), rect(5.0, 10.0, 35.0, 22.0));
    assert!(!list.can_apply_group_opacity());
}

#[test]
fn shadow_reaches_past_the_path() {
    let mut b = DisplayListBuilder::new(false);
    b.draw_shadow(&triangle(), DlColor::BLACK, 2.0, true, 1.5);
    let list = b.build();
    assert_eq!(list.bounds(), rect(-6.0, -6.0, 16.0, 16.0));
}

#[test]
fn shadow_blends_like_a_source_over_draw() {
    let shadow = {
        let mut b = DisplayListBuilder::new(false);
        b.draw_shadow(&triangle(), DlColor::BLACK, 2.0, false, 1.0);
        b.build()
    };
    let filled = {
        let mut b = DisplayListBuilder::new(false);
        b.draw_rect(rect(0.0, 0.0, 10.0, 10.0), &Paint::default());
        b.build()
    };
    assert_eq!(shadow.max_root_blend_mode(), BlendMode::SrcOver);
    assert_eq!(shadow.max_root_blend_mode(), filled.max_root_blend_mode());
    assert_eq!(
        shadow.modifies_transparent_black(),
        filled.modifies_transparent_black()
    );

    // The blend mode left behind by an earlier paint does not apply.
    let mut b = DisplayListBuilder::new(false);
    let multiply = Paint::with_color(DlColor::RED).blend_mode(BlendMode::Multiply);
    b.save_layer(None, None, None);
    b.draw_rect(rect(50.0, 50.0, 60.0, 60.0), &multiply);
    b.restore();
    b.draw_shadow(&triangle(), DlColor::BLACK, 2.0, false, 1.0);
    let list = b.build();
    assert_eq!(list.max_root_blend_mode(), BlendMode::SrcOver);
    assert!(calls(&list).iter().any(|c| c.starts_with("draw_shadow")));
}

#[test]
fn nested_lists_add_their_counts() {
    let child = {
        let mut b = DisplayListBuilder::new(false);
        b.draw_rect(rect(0.0, 0.0, 10.0, 10.0), &Paint::default());
        b.draw_rect(rect(20.0, 0.0, 30.0, 10.0), &Paint::default());
        b.build()
    };
    let mut b = DisplayListBuilder::new(false);
    b.translate(100.0, 0.0);
    b.draw_display_list(&child, 0.5);
    b.draw_display_list(&child, 0.0);
    let parent = b.build();

    assert_eq!(parent.op_count(false), 2);
    assert_eq!(parent.op_count(true), 4);
    assert_eq!(parent.bytes(true), parent.bytes(false) + child.bytes(true));
    assert_eq!(parent.total_depth(), child.total_depth());
    assert_eq!(parent.bounds(), rect(100.0, 0.0, 130.0, 10.0));
    assert!(parent.can_apply_group_opacity());
}

// ---------------------------------------------------------------------------
// Build and replay
// ---------------------------------------------------------------------------

#[test]
fn build_leaves_a_fresh_builder() {
    let mut b = DisplayListBuilder::with_cull_rect(rect(0.0, 0.0, 50.0, 50.0), true);
    b.save();
    b.translate(5.0, 5.0);
    b.draw_rect(rect(0.0, 0.0, 5.0, 5.0), &Paint::with_color(DlColor::RED));
    let first = b.build();
    assert_eq!(first.op_count(false), 5, "{:?}", calls(&first));

    assert_eq!(b.save_count(), 1);
    assert_eq!(b.matrix(), Matrix::IDENTITY);
    assert_eq!(b.destination_clip_coverage(), rect(0.0, 0.0, 50.0, 50.0));
    b.draw_rect(rect(0.0, 0.0, 5.0, 5.0), &Paint::default());
    let second = b.build();
    assert_eq!(calls(&second), vec!["draw_rect(0, 0, 5, 5)"]);
    assert!(second.rtree().is_some());
    assert_ne!(first.id(), second.id());
}

#[test]
fn replay_reproduces_a_rich_list() {
    let image: Arc<dyn DlImage> = Arc::new(TestImage::opaque(16, 16));
    let child = {
        let mut b = DisplayListBuilder::new(true);
        b.draw_circle(Point::new(5.0, 5.0), 5.0, &Paint::with_color(DlColor::GREEN));
        b.build()
    };
    let stroke = Paint::with_color(DlColor::BLUE).stroked(3.0);

    let mut b = DisplayListBuilder::new(true);
    b.save_layer(
        Some(rect(0.0, 0.0, 200.0, 200.0)),
        Some(&Paint::default().alpha(128)),
        None,
    );
    b.clip_path(&triangle(), ClipOp::Difference, true);
    b.rotate(15.0);
    b.draw_line(Point::new(0.0, 0.0), Point::new(50.0, 50.0), &stroke);
    b.draw_dashed_line(Point::new(0.0, 5.0), Point::new(50.0, 5.0), 2.0, 1.0, &stroke);
    b.draw_arc(rect(0.0, 0.0, 20.0, 20.0), 0.0, 90.0, true, &stroke);
    b.draw_round_rect(RoundedRect::from_rect(rect(0.0, 0.0, 20.0, 20.0), 4.0), &stroke);
    b.draw_diff_round_rect(
        RoundedRect::from_rect(rect(0.0, 0.0, 40.0, 40.0), 4.0),
        RoundedRect::from_rect(rect(10.0, 10.0, 30.0, 30.0), 2.0),
        &Paint::default(),
    );
    b.restore();
    b.draw_paint(&Paint::with_color(DlColor::WHITE).blend_mode(BlendMode::Multiply));
    b.draw_image_rect(
        &image,
        rect(0.0, 0.0, 16.0, 16.0),
        rect(50.0, 50.0, 82.0, 82.0),
        ImageSampling::Linear,
        Some(&Paint::default().alpha(200)),
        SrcRectConstraint::Strict,
    );
    b.draw_image_nine(
        &image,
        rect(4.0, 4.0, 12.0, 12.0),
        rect(0.0, 100.0, 64.0, 164.0),
        FilterMode::Linear,
        None,
    );
    b.draw_points(
        PointMode::Polygon,
        &[Point::new(0.0, 0.0), Point::new(10.0, 30.0), Point::new(20.0, 0.0)],
        &stroke,
    );
    b.draw_text(&test_text(4), 0.0, 150.0, &Paint::default());
    b.draw_display_list(&child, 0.75);
    let list = b.build();

    let mut copy = DisplayListBuilder::new(true);
    list.dispatch(&mut copy);
    let copy = copy.build();
    assert!(copy.equals(&list), "{:?}\n{:?}", calls(&copy), calls(&list));
    assert_eq!(copy.bounds(), list.bounds());
    assert_eq!(copy.total_depth(), list.total_depth());
    assert_eq!(copy.op_count(true), list.op_count(true));
}

#[cfg(feature = "trace")]
#[test]
fn build_traced_reports_what_was_dropped() {
    use crate::trace::{BuildSummary, TraceSink, Tracer};

    #[derive(Default)]
    struct Sink(Vec<BuildSummary>);
    impl TraceSink for Sink {
        fn on_build(&mut self, e: &BuildSummary) {
            self.0.push(*e);
        }
    }

    let mut b = DisplayListBuilder::with_cull_rect(rect(0.0, 0.0, 100.0, 100.0), true);
    b.save();
    b.restore();
    b.draw_rect(rect(500.0, 500.0, 510.0, 510.0), &Paint::default());
    b.draw_rect(rect(0.0, 0.0, 10.0, 10.0), &Paint::with_color(DlColor::TRANSPARENT));
    b.draw_rect(rect(0.0, 0.0, 10.0, 10.0), &Paint::default());

    let mut sink = Sink::default();
    let list = b.build_traced(&mut Tracer::new(&mut sink));
    let [summary] = sink.0.as_slice() else {
        panic!("expected one build summary, got {}", sink.0.len());
    };
    assert_eq!(summary.list_id, list.id());
    assert_eq!(summary.op_count, 1);
    assert_eq!(summary.elided_saves, 1);
    assert_eq!(summary.culled_ops, 1);
    assert_eq!(summary.no_effect_ops, 1);
    assert!(summary.has_rtree);
    assert_eq!(summary.bounds, rect(0.0, 0.0, 10.0, 10.0));
}
