// Copyright 2026 the Tracery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording.
//!
//! [`DisplayListBuilder`] turns a stream of drawing calls into a
//! [`DisplayList`]. While it records it:
//!
//! - defers `save` ops until something inside the scope needs them, so empty
//!   save/restore pairs never reach the list,
//! - tracks the transform and a conservative clip, dropping ops that fall
//!   outside it and scopes whose clip becomes empty,
//! - drops ops whose paint cannot change a pixel,
//! - accumulates bounds (or spatial index entries) per layer, and
//!   back-patches each save layer with what it learned about its content
//!   when the layer is restored.
//!
//! Drawing calls come in two forms. The inherent `draw_*` methods take a
//! [`Paint`] and record whatever attributes it changes. The
//! [`DlOpReceiver`] implementation takes the current attributes as they are,
//! which is what replaying one list into a builder needs.

mod attributes;
mod draw;
mod layer;
mod receiver;
mod state;
mod transform;

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use bytemuck::Pod;
use kurbo::Rect;
use tracery_rtree::RTree;

use crate::display_list::DisplayList;
use crate::geometry::{rect_is_empty, rect_is_finite, MAX_CULL_RECT};
use crate::id::DisplayListId;
use crate::matrix::Matrix;
use crate::op::records::SavePayload;
use crate::op::{OpHeader, OpType, HEADER_SIZE};
use crate::paint::{BlendMode, Paint};
use crate::resource::{DlResource, ResourceTable};
use crate::storage::DlStorage;
use crate::trace::{BuildSummary, Tracer};

use attributes::{adjust_bounds_for_paint, AttributeFlags, PaintResult};
use layer::{LayerInfo, SaveInfo};
use state::MatrixClip;

/// Converts an op index into the id stored in records and the spatial index.
fn op_id(index: usize) -> u32 {
    match u32::try_from(index) {
        Ok(id) => id,
        Err(_) => panic!("display list exceeds {} ops", u32::MAX),
    }
}

/// Spatial index entries collected while recording.
#[derive(Debug, Default)]
struct RTreeData {
    rects: Vec<Rect>,
    ids: Vec<u32>,
}

impl RTreeData {
    fn push(&mut self, rect: Rect, index: usize) {
        self.rects.push(rect);
        self.ids.push(op_id(index));
    }
}

/// Counters for what recording dropped.
#[derive(Clone, Copy, Debug, Default)]
struct Elisions {
    saves: u32,
    culled_ops: u32,
    no_effect_ops: u32,
}

/// Records drawing calls into a [`DisplayList`].
///
/// A builder can be reused: [`build`](Self::build) hands out the list and
/// leaves the builder empty, with the same cull rect and indexing choice.
pub struct DisplayListBuilder {
    original_cull_rect: Rect,
    prepare_rtree: bool,

    storage: DlStorage,
    resources: ResourceTable,

    root_save: SaveInfo,
    save_stack: Vec<SaveInfo>,
    root_layer: LayerInfo,
    layer_stack: Vec<LayerInfo>,
    rtree_data: Option<RTreeData>,

    current: Paint,
    current_opacity_compatible: bool,

    depth: u32,
    nested_byte_count: usize,
    nested_op_count: usize,
    is_ui_thread_safe: bool,
    elided: Elisions,
}

impl fmt::Debug for DisplayListBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisplayListBuilder")
            .field("cull_rect", &self.original_cull_rect)
            .field("prepare_rtree", &self.prepare_rtree)
            .field("op_count", &self.storage.op_count())
            .field("save_count", &self.save_count())
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}

impl Default for DisplayListBuilder {
    fn default() -> Self {
        Self::new(false)
    }
}

impl DisplayListBuilder {
    /// Creates a builder with an effectively unbounded cull rect.
    ///
    /// With `prepare_rtree`, the built list carries a spatial index of its
    /// draws and supports [`DisplayList::dispatch_culled`].
    #[must_use]
    pub fn new(prepare_rtree: bool) -> Self {
        Self::with_cull_rect(MAX_CULL_RECT, prepare_rtree)
    }

    /// Creates a builder that drops ops falling entirely outside `cull_rect`.
    ///
    /// A non-finite cull rect is replaced by [`MAX_CULL_RECT`].
    #[must_use]
    pub fn with_cull_rect(cull_rect: Rect, prepare_rtree: bool) -> Self {
        let cull_rect = if rect_is_finite(&cull_rect) {
            cull_rect.abs()
        } else {
            MAX_CULL_RECT
        };
        let root_state = MatrixClip::new(cull_rect, Matrix::IDENTITY);
        let current = Paint::default();
        let current_opacity_compatible = attributes::is_opacity_compatible(&current);
        Self {
            original_cull_rect: cull_rect,
            prepare_rtree,
            storage: DlStorage::default(),
            resources: ResourceTable::default(),
            root_save: SaveInfo::root(root_state),
            save_stack: Vec::new(),
            root_layer: LayerInfo::new(0, None, Matrix::IDENTITY),
            layer_stack: Vec::new(),
            rtree_data: prepare_rtree.then(RTreeData::default),
            current,
            current_opacity_compatible,
            depth: 0,
            nested_byte_count: 0,
            nested_op_count: 0,
            is_ui_thread_safe: true,
            elided: Elisions::default(),
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Number of open scopes, counting the implicit root scope.
    #[inline]
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.save_stack.len() + 1
    }

    /// The current local-to-device transform.
    #[must_use]
    pub fn matrix(&self) -> Matrix {
        self.save_info().global_state.matrix()
    }

    /// The current clip, in local coordinates.
    #[must_use]
    pub fn local_clip_coverage(&self) -> Rect {
        self.save_info().global_state.local_cull_coverage()
    }

    /// The current clip, in device coordinates.
    #[must_use]
    pub fn destination_clip_coverage(&self) -> Rect {
        self.save_info().global_state.device_cull_rect()
    }

    /// Returns `true` if nothing inside the local rectangle `bounds` can be
    /// visible.
    #[must_use]
    pub fn quick_reject(&self, bounds: Rect) -> bool {
        self.save_info().global_state.map_and_clip(bounds).is_none()
    }

    // -----------------------------------------------------------------------
    // Build
    // -----------------------------------------------------------------------

    /// Closes every open scope and returns the recorded list.
    ///
    /// The builder is left empty and ready to record again.
    pub fn build(&mut self) -> Arc<DisplayList> {
        self.build_traced(&mut Tracer::none())
    }

    /// Like [`build`](Self::build), reporting a [`BuildSummary`] to `tracer`.
    pub fn build_traced(&mut self, tracer: &mut Tracer<'_>) -> Arc<DisplayList> {
        self.restore_to_count(1);

        let rtree = self
            .rtree_data
            .as_ref()
            .map(|data| Arc::new(RTree::new(&data.rects, &data.ids)));
        let bounds = match &rtree {
            Some(tree) => tree.bounds(),
            None => self.root_layer.global_acc.bounds(),
        };
        let root = &self.root_layer;
        let can_apply_group_opacity =
            !root.opacity_incompatible && !root.local_acc.overlap_detected();

        let mut storage = core::mem::take(&mut self.storage);
        storage.trim();
        let mut resources = core::mem::take(&mut self.resources);
        resources.shrink_to_fit();

        let list = DisplayList {
            storage,
            resources,
            nested_byte_count: self.nested_byte_count,
            nested_op_count: self.nested_op_count,
            total_depth: self.depth,
            id: DisplayListId::next(),
            bounds,
            rtree,
            can_apply_group_opacity,
            is_ui_thread_safe: self.is_ui_thread_safe,
            modifies_transparent_black: root.affects_transparent_layer,
            root_has_backdrop_filter: root.contains_backdrop_filter,
            root_is_unbounded: root.is_unbounded,
            max_root_blend_mode: root.max_blend_mode,
        };

        tracer.build(&BuildSummary {
            list_id: list.id,
            op_count: list.op_count(false),
            byte_count: list.bytes(false),
            nested_op_count: list.nested_op_count,
            total_depth: list.total_depth,
            bounds,
            has_rtree: list.rtree.is_some(),
            elided_saves: self.elided.saves,
            culled_ops: self.elided.culled_ops,
            no_effect_ops: self.elided.no_effect_ops,
        });

        *self = Self::with_cull_rect(self.original_cull_rect, self.prepare_rtree);
        Arc::new(list)
    }

    // -----------------------------------------------------------------------
    // Scope access
    // -----------------------------------------------------------------------

    fn save_info(&self) -> &SaveInfo {
        self.save_stack.last().unwrap_or(&self.root_save)
    }

    fn save_info_mut(&mut self) -> &mut SaveInfo {
        match self.save_stack.last_mut() {
            Some(info) => info,
            None => &mut self.root_save,
        }
    }

    fn layer(&self) -> &LayerInfo {
        self.layer_stack.last().unwrap_or(&self.root_layer)
    }

    fn layer_mut(&mut self) -> &mut LayerInfo {
        match self.layer_stack.last_mut() {
            Some(layer) => layer,
            None => &mut self.root_layer,
        }
    }

    // -----------------------------------------------------------------------
    // Record emission
    // -----------------------------------------------------------------------

    /// Appends a record with `trailing` extra bytes after the payload and
    /// returns its offset.
    fn push_op_with_trailing<T: Pod>(
        &mut self,
        op_type: OpType,
        payload: &T,
        trailing: usize,
    ) -> usize {
        let (offset, size) = self
            .storage
            .allocate_op(HEADER_SIZE + size_of::<T>() + trailing);
        let Ok(size) = u32::try_from(size) else {
            panic!("{op_type:?} record of {size} bytes is too large");
        };
        let header = OpHeader {
            op_type: op_type as u8,
            pad: [0; 3],
            size,
        };
        self.storage.write(offset, &header);
        self.storage.write(offset + HEADER_SIZE, payload);
        offset
    }

    fn push_op<T: Pod>(&mut self, op_type: OpType, payload: &T) -> usize {
        self.push_op_with_trailing(op_type, payload, 0)
    }

    /// Appends a record with no payload.
    fn push_bare(&mut self, op_type: OpType) {
        let (offset, size) = self.storage.allocate_op(HEADER_SIZE);
        let header = OpHeader {
            op_type: op_type as u8,
            pad: [0; 3],
            size: op_id(size),
        };
        self.storage.write(offset, &header);
    }

    fn push_resource(&mut self, resource: DlResource) -> u32 {
        self.resources.push(resource)
    }

    /// Emits the pending `save` of the current scope, if any.
    fn check_for_deferred_save(&mut self) {
        if !self.save_info().has_deferred_save_op {
            return;
        }
        let index = self.storage.op_count();
        let offset = self.push_op(
            OpType::Save,
            &SavePayload {
                restore_index: 0,
                total_content_depth: 0,
            },
        );
        let depth = self.depth;
        let info = self.save_info_mut();
        info.has_deferred_save_op = false;
        info.save_offset = offset;
        info.save_index = index;
        info.save_depth = depth;
    }

    // -----------------------------------------------------------------------
    // Bounds accumulation
    // -----------------------------------------------------------------------

    /// Records a device-space rectangle for the op at `index`.
    fn add_global_rect(&mut self, rect: Rect, index: usize) {
        if let Some(data) = self.rtree_data.as_mut() {
            data.push(rect, index);
            return;
        }
        self.layer_mut().global_acc.accumulate(rect);
    }

    /// Accumulates the local bounds of the op about to be recorded.
    ///
    /// Returns `false` if the op is entirely clipped out and must not be
    /// recorded. Emits any deferred save first, so the op index used for the
    /// spatial index is the index the op will get.
    fn accumulate_local_bounds(&mut self, bounds: Rect) -> bool {
        let info = self.save_info();
        let (Some(global), Some(local)) = (
            info.global_state.map_and_clip(bounds),
            info.layer_state.map_and_clip(bounds),
        ) else {
            self.elided.culled_ops += 1;
            return false;
        };
        self.check_for_deferred_save();
        let index = self.storage.op_count();
        self.add_global_rect(global, index);
        self.layer_mut().local_acc.accumulate(local);
        true
    }

    /// Accumulates several local rectangles that all belong to the next op.
    fn accumulate_local_rects(&mut self, rects: &[Rect]) -> bool {
        let info = self.save_info();
        let visible: Vec<(Rect, Rect)> = rects
            .iter()
            .filter_map(|&r| {
                Some((
                    info.global_state.map_and_clip(r)?,
                    info.layer_state.map_and_clip(r)?,
                ))
            })
            .collect();
        if visible.is_empty() {
            self.elided.culled_ops += 1;
            return false;
        }
        self.check_for_deferred_save();
        let index = self.storage.op_count();
        for (global, local) in visible {
            self.add_global_rect(global, index);
            self.layer_mut().local_acc.accumulate(local);
        }
        true
    }

    /// Accumulates the whole current clip for an op that floods it, and
    /// marks the layer unbounded.
    fn accumulate_unbounded(&mut self) -> bool {
        let info = self.save_info();
        let global = info.global_state.device_cull_rect();
        let local = info.layer_state.device_cull_rect();
        if rect_is_empty(&global) || rect_is_empty(&local) {
            self.elided.culled_ops += 1;
            return false;
        }
        self.check_for_deferred_save();
        let index = self.storage.op_count();
        self.add_global_rect(global, index);
        let layer = self.layer_mut();
        layer.local_acc.accumulate(local);
        layer.is_unbounded = true;
        true
    }

    /// Accumulates geometry bounds after growing them for the current paint.
    fn accumulate_op_bounds(&mut self, bounds: Rect, flags: AttributeFlags) -> bool {
        match adjust_bounds_for_paint(&self.current, bounds, flags) {
            Some(bounds) => self.accumulate_local_bounds(bounds),
            None => self.accumulate_unbounded(),
        }
    }

    // -----------------------------------------------------------------------
    // Layer bookkeeping for render ops
    // -----------------------------------------------------------------------

    fn update_layer_result(&mut self, result: PaintResult, mode: BlendMode) {
        let layer = self.layer_mut();
        if result == PaintResult::AffectsAll {
            layer.affects_transparent_layer = true;
        }
        layer.max_blend_mode = layer.max_blend_mode.max(mode);
    }

    fn update_layer_opacity_compatibility(&mut self, compatible: bool) {
        if !compatible {
            self.layer_mut().opacity_incompatible = true;
        }
    }

    /// Opacity bookkeeping for an op that blends with the current attributes
    /// only when `uses_attributes` is set.
    fn check_layer_opacity_compatibility(&mut self, uses_attributes: bool) {
        let compatible = !uses_attributes || self.current_opacity_compatible;
        self.update_layer_opacity_compatibility(compatible);
    }
}

#[cfg(test)]
mod tests;
