// Copyright 2026 the Tracery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Save scopes, layers, and what a layer hands to its parent on restore.

use alloc::sync::Arc;

use kurbo::Rect;

use crate::effects::ImageFilter;
use crate::geometry::{
    intersect, rect_contains, rect_is_empty, rect_is_finite, AccumulationRect, MAX_CULL_RECT,
};
use crate::matrix::Matrix;
use crate::op::records::{rect_data, SaveLayerPayload, SavePayload};
use crate::op::{OpType, HEADER_SIZE};
use crate::paint::{BlendMode, Paint, SaveLayerOptions};
use crate::resource::{DlResource, NO_RESOURCE};

use super::attributes::{paint_result, AttributeFlags, PaintResult};
use super::state::MatrixClip;
use super::{op_id, DisplayListBuilder};

/// One open `save` or `save_layer` scope.
#[derive(Clone, Debug)]
pub(super) struct SaveInfo {
    pub(super) is_save_layer: bool,
    /// The `save` op has not been written yet.
    pub(super) has_deferred_save_op: bool,
    /// Nothing recorded in this scope can be visible.
    pub(super) is_nop: bool,
    pub(super) save_offset: usize,
    pub(super) save_index: usize,
    pub(super) save_depth: u32,
    /// Transform and clip in device space.
    pub(super) global_state: MatrixClip,
    /// Transform and clip in the space of the enclosing layer.
    pub(super) layer_state: MatrixClip,
    pub(super) user_bounds: Option<Rect>,
}

impl SaveInfo {
    pub(super) fn root(state: MatrixClip) -> Self {
        Self {
            is_save_layer: false,
            has_deferred_save_op: false,
            is_nop: false,
            save_offset: 0,
            save_index: 0,
            save_depth: 0,
            global_state: state,
            layer_state: state,
            user_bounds: None,
        }
    }

    fn child_of(parent: &Self) -> Self {
        Self {
            is_save_layer: false,
            has_deferred_save_op: true,
            is_nop: parent.is_nop,
            save_offset: 0,
            save_index: 0,
            save_depth: 0,
            global_state: parent.global_state,
            layer_state: parent.layer_state,
            user_bounds: None,
        }
    }
}

/// Accumulated facts about the content of one layer.
#[derive(Clone, Debug)]
pub(super) struct LayerInfo {
    /// First spatial index entry recorded inside this layer.
    pub(super) rtree_start: usize,
    /// Device-space bounds, used when no spatial index is kept.
    pub(super) global_acc: AccumulationRect,
    /// Bounds in the coordinates the layer was opened in.
    pub(super) local_acc: AccumulationRect,
    pub(super) filter: Option<Arc<ImageFilter>>,
    /// Device transform when the layer was opened.
    pub(super) base_matrix: Matrix,
    /// The layer's color filter turns transparent pixels visible.
    pub(super) floods: bool,
    pub(super) max_blend_mode: BlendMode,
    pub(super) opacity_incompatible: bool,
    pub(super) affects_transparent_layer: bool,
    pub(super) contains_backdrop_filter: bool,
    pub(super) is_unbounded: bool,
}

impl LayerInfo {
    pub(super) fn new(
        rtree_start: usize,
        filter: Option<Arc<ImageFilter>>,
        base_matrix: Matrix,
    ) -> Self {
        Self {
            rtree_start,
            global_acc: AccumulationRect::new(),
            local_acc: AccumulationRect::new(),
            filter,
            base_matrix,
            floods: false,
            max_blend_mode: BlendMode::Clear,
            opacity_incompatible: false,
            affects_transparent_layer: false,
            contains_backdrop_filter: false,
            is_unbounded: false,
        }
    }
}

impl DisplayListBuilder {
    /// Opens a scope that [`restore`](Self::restore) closes.
    ///
    /// The `save` op is only written once something inside the scope changes
    /// the transform or clip, or draws.
    pub fn save(&mut self) {
        let info = SaveInfo::child_of(self.save_info());
        self.save_stack.push(info);
    }

    /// Opens an offscreen layer.
    ///
    /// `bounds` limits the layer's content. With a `paint`, the layer is
    /// composited using its alpha, blend mode, color filter and image filter.
    /// With a `backdrop`, the filter is applied to what lies under the layer
    /// before its content is drawn.
    ///
    /// A layer whose paint cannot change anything, and that has no backdrop,
    /// degrades to a plain `save` whose content is discarded.
    pub fn save_layer(
        &mut self,
        bounds: Option<Rect>,
        paint: Option<&Paint>,
        backdrop: Option<&Arc<ImageFilter>>,
    ) {
        if self.save_info().is_nop {
            self.save();
            return;
        }
        if let Some(paint) = paint {
            if backdrop.is_none()
                && paint_result(paint, AttributeFlags::SAVE_LAYER) == PaintResult::NoEffect
            {
                self.save_nop_layer();
                return;
            }
            self.set_attributes_from_paint(paint, AttributeFlags::SAVE_LAYER);
        }
        self.save_layer_op(bounds, paint.is_some(), backdrop);
    }

    fn save_nop_layer(&mut self) {
        self.elided.no_effect_ops += 1;
        self.save();
        self.save_info_mut().is_nop = true;
    }

    /// Opens a layer using the current attributes.
    pub(super) fn save_layer_op(
        &mut self,
        bounds: Option<Rect>,
        with_attributes: bool,
        backdrop: Option<&Arc<ImageFilter>>,
    ) {
        if self.save_info().is_nop {
            self.save();
            return;
        }
        let flags = AttributeFlags::SAVE_LAYER.used_if(with_attributes);
        if with_attributes
            && backdrop.is_none()
            && paint_result(&self.current, flags) == PaintResult::NoEffect
        {
            self.save_nop_layer();
            return;
        }
        let user_bounds = bounds.filter(rect_is_finite).map(|b| b.abs());

        self.check_for_deferred_save();
        let index = self.storage.op_count();
        if backdrop.is_some() {
            // The backdrop reads and rewrites everything under the clip.
            self.accumulate_unbounded();
            let parent = self.layer_mut();
            parent.contains_backdrop_filter = true;
            parent.opacity_incompatible = true;
        }
        self.check_layer_opacity_compatibility(with_attributes);
        let blend = if with_attributes {
            self.current.blend_mode
        } else {
            BlendMode::SrcOver
        };
        let parent = self.layer_mut();
        parent.max_blend_mode = parent.max_blend_mode.max(blend);

        let mut options = SaveLayerOptions::empty();
        options.set(SaveLayerOptions::RENDERS_WITH_ATTRIBUTES, with_attributes);
        options.set(SaveLayerOptions::BOUNDS_FROM_CALLER, user_bounds.is_some());
        let (op_type, backdrop_slot) = match backdrop {
            Some(filter) => (
                OpType::SaveLayerBackdrop,
                self.push_resource(DlResource::ImageFilter(filter.clone())),
            ),
            None => (OpType::SaveLayer, NO_RESOURCE),
        };
        self.depth += 1;
        let offset = self.push_op(
            op_type,
            &SaveLayerPayload {
                restore_index: 0,
                total_content_depth: 0,
                options: options.bits(),
                max_blend_mode: BlendMode::Clear as u32,
                backdrop: backdrop_slot,
                pad: 0,
                rect: rect_data(user_bounds.unwrap_or(Rect::ZERO)),
            },
        );

        let parent_state = self.save_info().global_state;
        let filter = if with_attributes {
            self.current.image_filter.clone()
        } else {
            None
        };
        // A filter can pull content from outside the clip into view.
        let content_cull = match &filter {
            Some(filter) => filter
                .map_input_device_bounds(parent_state.device_cull_rect(), &parent_state.matrix())
                .unwrap_or(MAX_CULL_RECT),
            None => parent_state.device_cull_rect(),
        };
        let global_state = MatrixClip::new(content_cull, parent_state.matrix());
        let layer_state = MatrixClip::new(global_state.local_cull_coverage(), Matrix::IDENTITY);
        self.save_stack.push(SaveInfo {
            is_save_layer: true,
            has_deferred_save_op: false,
            is_nop: false,
            save_offset: offset,
            save_index: index,
            save_depth: self.depth,
            global_state,
            layer_state,
            user_bounds,
        });

        let rtree_start = self.rtree_data.as_ref().map_or(0, |data| data.rects.len());
        let mut layer = LayerInfo::new(rtree_start, filter, parent_state.matrix());
        layer.floods = with_attributes
            && self
                .current
                .color_filter
                .as_ref()
                .is_some_and(|cf| cf.modifies_transparent_black());
        self.layer_stack.push(layer);
    }

    /// Closes the innermost scope. Does nothing at the root.
    pub fn restore(&mut self) {
        let Some(info) = self.save_stack.pop() else {
            return;
        };
        if info.has_deferred_save_op {
            self.elided.saves += 1;
            return;
        }
        let restore_index = op_id(self.storage.op_count());
        let content_depth = self.depth.saturating_sub(info.save_depth);
        if info.is_save_layer {
            let Some(layer) = self.layer_stack.pop() else {
                panic!("save layer scope has no layer state");
            };
            self.finish_layer(&info, layer, restore_index, content_depth);
        } else {
            let op: &mut SavePayload = self.storage.record_mut(info.save_offset + HEADER_SIZE);
            op.restore_index = restore_index;
            op.total_content_depth = content_depth;
        }
        self.push_bare(OpType::Restore);
    }

    /// Closes scopes until `count` remain (never fewer than one).
    pub fn restore_to_count(&mut self, count: usize) {
        let count = count.max(1);
        while self.save_count() > count {
            self.restore();
        }
    }

    /// Back-patches the save layer op and hands the layer's bounds to its
    /// parent.
    fn finish_layer(
        &mut self,
        info: &SaveInfo,
        layer: LayerInfo,
        restore_index: u32,
        content_depth: u32,
    ) {
        let mut content = layer.local_acc.bounds();
        let op: &mut SaveLayerPayload = self.storage.record_mut(info.save_offset + HEADER_SIZE);
        let mut options = SaveLayerOptions::from_bits_truncate(op.options);
        if let Some(user) = info.user_bounds {
            if !rect_contains(&user, &content) {
                options |= SaveLayerOptions::CONTENT_IS_CLIPPED;
            }
            content = intersect(&content, &user).unwrap_or(Rect::ZERO);
        }
        options.set(SaveLayerOptions::CONTENT_IS_UNBOUNDED, layer.is_unbounded);
        options.set(
            SaveLayerOptions::CONTAINS_BACKDROP_FILTER,
            layer.contains_backdrop_filter,
        );
        options.set(
            SaveLayerOptions::CAN_DISTRIBUTE_OPACITY,
            !layer.opacity_incompatible && !layer.local_acc.overlap_detected(),
        );
        op.restore_index = restore_index;
        op.total_content_depth = content_depth;
        op.options = options.bits();
        op.max_blend_mode = layer.max_blend_mode as u32;
        op.rect = rect_data(content);

        self.transfer_layer_bounds(info, &layer, content);
    }

    /// Moves a finished layer's bounds into its parent, through the layer's
    /// image filter.
    ///
    /// If the filter's output cannot be bounded, the layer floods the
    /// parent's clip: every op inside it is indexed under the whole clip and
    /// the parent becomes unbounded.
    fn transfer_layer_bounds(&mut self, info: &SaveInfo, layer: &LayerInfo, content: Rect) {
        let parent_state = self.save_info().global_state;
        let parent_layer_state = self.save_info().layer_state;
        let ctm = parent_state.matrix();
        let clip = match info.user_bounds {
            Some(user) => parent_state.map_and_clip(user).unwrap_or(Rect::ZERO),
            None => parent_state.device_cull_rect(),
        };

        // Maps one device-space content rect to what the parent sees, or
        // `None` if the filter output is unbounded.
        let map_global = |rect: &Rect| -> Option<Rect> {
            let mapped = match &layer.filter {
                Some(filter) => filter.map_device_bounds(*rect, &ctm)?,
                None => *rect,
            };
            Some(intersect(&mapped, &clip).unwrap_or(Rect::ZERO))
        };

        let mut flooded = layer.floods
            || layer
                .filter
                .as_ref()
                .is_some_and(|f| f.modifies_transparent_black());

        if let Some(data) = self.rtree_data.as_mut() {
            let rects = &mut data.rects[layer.rtree_start..];
            if !flooded {
                for rect in rects.iter_mut() {
                    match map_global(rect) {
                        Some(mapped) => *rect = mapped,
                        None => {
                            flooded = true;
                            break;
                        }
                    }
                }
            }
            if flooded {
                rects.fill(clip);
                if !rect_is_empty(&clip) {
                    data.push(clip, info.save_index);
                }
            }
        } else if !flooded && !layer.global_acc.is_empty() {
            match map_global(&layer.global_acc.bounds()) {
                Some(mapped) if !rect_is_empty(&mapped) => {
                    self.layer_mut().global_acc.accumulate(mapped);
                }
                Some(_) => {}
                None => flooded = true,
            }
        }
        if flooded && self.rtree_data.is_none() && !rect_is_empty(&clip) {
            self.layer_mut().global_acc.accumulate(clip);
        }

        let local = if flooded {
            match info.user_bounds {
                Some(user) => parent_layer_state.map_and_clip(user),
                None => Some(parent_layer_state.device_cull_rect()),
            }
        } else if layer.local_acc.is_empty() {
            None
        } else {
            let filtered = match &layer.filter {
                Some(filter) => filter.map_local_bounds(content),
                None => Some(content),
            };
            filtered
                .map(|r| match info.user_bounds {
                    Some(user) => intersect(&r, &user).unwrap_or(Rect::ZERO),
                    None => r,
                })
                .and_then(|r| parent_layer_state.map_and_clip(r))
        };

        let parent = self.layer_mut();
        if let Some(local) = local.filter(|r| !rect_is_empty(r)) {
            parent.local_acc.accumulate(local);
        }
        if info.user_bounds.is_none() && (flooded || layer.is_unbounded) {
            parent.is_unbounded = true;
        }
        if flooded || layer.affects_transparent_layer {
            parent.affects_transparent_layer = true;
        }
    }
}
