// Copyright 2026 the Tracery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The immutable result of recording.
//!
//! A [`DisplayList`] owns the op arena, its offset table and the resource
//! table, plus the aggregate metadata the builder computed while recording.
//! It is shared as `Arc<DisplayList>` and never mutated after
//! [`DisplayListBuilder::build`](crate::DisplayListBuilder::build).
//!
//! # Culled replay
//!
//! When the list carries a spatial index, [`DisplayList::dispatch_culled`]
//! replays only the ops needed to render a query rectangle. Draws are picked
//! from the index; the save, restore, transform and clip ops around them are
//! kept only when something inside their scope survives:
//!
//! ```text
//!   0 save            kept if a kept draw lies before op 3
//!   1 clip_rect       kept under the same condition
//!   2 draw_rect  X    kept iff the index reported op 2
//!   3 restore         kept iff op 0 was kept
//!   4 draw_rect  Y    kept iff the index reported op 4
//! ```
//!
//! Attribute ops are always kept because paint state is not scoped by
//! save/restore.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use kurbo::Rect;
use tracery_rtree::RTree;

use crate::geometry::{rect_contains, rect_is_empty};
use crate::id::DisplayListId;
use crate::op::compare::ops_equal;
use crate::op::dispatch::{dispatch_op, read_header, restore_index};
use crate::op::{OpCategory, OpType};
use crate::paint::BlendMode;
use crate::receiver::DlOpReceiver;
use crate::resource::ResourceTable;
use crate::storage::DlStorage;
use crate::trace::{CullSummary, Tracer};

/// Marks "no further candidate" and "no enclosing restore" while culling.
const NONE: usize = usize::MAX;

/// A recorded, immutable sequence of drawing ops.
pub struct DisplayList {
    pub(crate) storage: DlStorage,
    pub(crate) resources: ResourceTable,
    pub(crate) nested_byte_count: usize,
    pub(crate) nested_op_count: usize,
    pub(crate) total_depth: u32,
    pub(crate) id: DisplayListId,
    pub(crate) bounds: Rect,
    pub(crate) rtree: Option<Arc<RTree>>,
    pub(crate) can_apply_group_opacity: bool,
    pub(crate) is_ui_thread_safe: bool,
    pub(crate) modifies_transparent_black: bool,
    pub(crate) root_has_backdrop_filter: bool,
    pub(crate) root_is_unbounded: bool,
    pub(crate) max_root_blend_mode: BlendMode,
}

/// One stored op, as seen by [`DisplayList::op_records`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpRecord {
    /// Position in the op sequence.
    pub index: usize,
    /// Byte offset of the header.
    pub offset: usize,
    /// Stored type.
    pub op_type: OpType,
    /// Stored size, header and trailing data included.
    pub size: usize,
}

/// Iterator over the records of a list, walking the arena by stored size.
#[derive(Clone, Debug)]
pub struct OpRecords<'a> {
    storage: &'a DlStorage,
    offset: usize,
    index: usize,
}

impl Iterator for OpRecords<'_> {
    type Item = OpRecord;

    fn next(&mut self) -> Option<OpRecord> {
        if self.offset >= self.storage.used() {
            return None;
        }
        let (op_type, size) = read_header(self.storage, self.offset);
        assert!(size > 0, "corrupt display list: zero-sized op at {}", self.offset);
        let record = OpRecord {
            index: self.index,
            offset: self.offset,
            op_type,
            size,
        };
        self.offset += size;
        self.index += 1;
        Some(record)
    }
}

#[derive(Clone, Copy)]
struct CullFrame {
    previous_restore: usize,
    needed: bool,
}

impl DisplayList {
    // -----------------------------------------------------------------------
    // Metadata
    // -----------------------------------------------------------------------

    /// Process-unique identity.
    #[inline]
    #[must_use]
    pub fn id(&self) -> DisplayListId {
        self.id
    }

    /// Number of ops, optionally including ops of nested lists.
    #[must_use]
    pub fn op_count(&self, nested: bool) -> usize {
        let own = self.storage.op_count();
        if nested { own + self.nested_op_count } else { own }
    }

    /// Bytes of op storage, optionally including nested lists.
    #[must_use]
    pub fn bytes(&self, nested: bool) -> usize {
        let own = self.storage.used();
        if nested { own + self.nested_byte_count } else { own }
    }

    /// Recursive depth cost of rendering this list.
    #[inline]
    #[must_use]
    pub fn total_depth(&self) -> u32 {
        self.total_depth
    }

    /// Device-space bounds of everything drawn.
    #[inline]
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// The spatial index over render ops, if one was requested.
    #[inline]
    #[must_use]
    pub fn rtree(&self) -> Option<&Arc<RTree>> {
        self.rtree.as_ref()
    }

    /// Returns `true` if the list has no ops.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.storage.op_count() == 0
    }

    /// Whether a group opacity can be distributed to each op.
    #[inline]
    #[must_use]
    pub fn can_apply_group_opacity(&self) -> bool {
        self.can_apply_group_opacity
    }

    /// Whether the list may be rendered off the thread that recorded it.
    #[inline]
    #[must_use]
    pub fn is_ui_thread_safe(&self) -> bool {
        self.is_ui_thread_safe
    }

    /// Whether rendering can change fully transparent destination pixels.
    #[inline]
    #[must_use]
    pub fn modifies_transparent_black(&self) -> bool {
        self.modifies_transparent_black
    }

    /// Whether a backdrop filter appears at the top level.
    #[inline]
    #[must_use]
    pub fn root_has_backdrop_filter(&self) -> bool {
        self.root_has_backdrop_filter
    }

    /// Whether top-level content floods the clip.
    #[inline]
    #[must_use]
    pub fn root_is_unbounded(&self) -> bool {
        self.root_is_unbounded
    }

    /// The strongest blend mode used at the top level.
    #[inline]
    #[must_use]
    pub fn max_root_blend_mode(&self) -> BlendMode {
        self.max_root_blend_mode
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    /// Type of the op at `index`.
    #[must_use]
    pub fn op_type_at(&self, index: usize) -> Option<OpType> {
        let offset = *self.storage.offsets().get(index)?;
        Some(read_header(&self.storage, offset).0)
    }

    /// Category of the op at `index`, or [`OpCategory::Invalid`].
    #[must_use]
    pub fn op_category_at(&self, index: usize) -> OpCategory {
        self.op_type_at(index)
            .map_or(OpCategory::Invalid, OpType::category)
    }

    /// Walks the arena by stored record sizes.
    #[must_use]
    pub fn op_records(&self) -> OpRecords<'_> {
        OpRecords {
            storage: &self.storage,
            offset: 0,
            index: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    /// Replays every op.
    pub fn dispatch(&self, receiver: &mut dyn DlOpReceiver) {
        for &offset in self.storage.offsets() {
            dispatch_op(&self.storage, &self.resources, offset, receiver);
        }
    }

    /// Replays the ops at `indices`, in the given order. Out-of-range
    /// indices are skipped.
    pub fn dispatch_indices(&self, receiver: &mut dyn DlOpReceiver, indices: &[usize]) {
        let offsets = self.storage.offsets();
        for &index in indices {
            if let Some(&offset) = offsets.get(index) {
                dispatch_op(&self.storage, &self.resources, offset, receiver);
            }
        }
    }

    /// Replays a single op. Returns `false` if `index` is out of range.
    pub fn dispatch_at(&self, receiver: &mut dyn DlOpReceiver, index: usize) -> bool {
        match self.storage.offsets().get(index) {
            Some(&offset) => {
                dispatch_op(&self.storage, &self.resources, offset, receiver);
                true
            }
            None => false,
        }
    }

    /// Replays what is needed to render `cull`.
    ///
    /// An empty `cull` replays nothing. Without a spatial index, or when
    /// `cull` contains the whole list, every op is replayed.
    pub fn dispatch_culled(&self, receiver: &mut dyn DlOpReceiver, cull: Rect) {
        self.dispatch_culled_traced(receiver, cull, &mut Tracer::none());
    }

    /// [`dispatch_culled`](Self::dispatch_culled), reporting a
    /// [`CullSummary`] to `tracer`.
    pub fn dispatch_culled_traced(
        &self,
        receiver: &mut dyn DlOpReceiver,
        cull: Rect,
        tracer: &mut Tracer<'_>,
    ) {
        let op_count = self.storage.op_count();
        let (kept, candidate_count, full_replay) = if rect_is_empty(&cull) {
            (0, 0, false)
        } else {
            match &self.rtree {
                Some(rtree) if !rect_contains(&cull, &self.bounds) => {
                    let (indices, candidates) = self.cull_with(rtree, cull);
                    self.dispatch_indices(receiver, &indices);
                    #[cfg(feature = "trace-rich")]
                    tracer.culled_indices(self.id, &indices);
                    (indices.len(), candidates, false)
                }
                _ => {
                    self.dispatch(receiver);
                    (op_count, 0, true)
                }
            }
        };
        tracer.cull(&CullSummary {
            list_id: self.id,
            op_count,
            candidate_count,
            kept_count: kept,
            full_replay,
        });
    }

    /// Indices of the ops [`dispatch_culled`](Self::dispatch_culled) would
    /// replay for `cull`, in order.
    #[must_use]
    pub fn culled_indices(&self, cull: Rect) -> Vec<usize> {
        if rect_is_empty(&cull) {
            return Vec::new();
        }
        match &self.rtree {
            Some(rtree) if !rect_contains(&cull, &self.bounds) => self.cull_with(rtree, cull).0,
            _ => (0..self.storage.op_count()).collect(),
        }
    }

    /// Returns the kept indices and the number of index hits.
    fn cull_with(&self, rtree: &RTree, cull: Rect) -> (Vec<usize>, usize) {
        let mut candidates: Vec<usize> = rtree
            .search_ids(cull)
            .into_iter()
            .map(|id| id as usize)
            .collect();
        // Flooded layers register their own (earlier) index after their
        // content, so ids are not sorted.
        candidates.sort_unstable();
        let candidate_count = candidates.len();

        let mut pending = candidates.into_iter();
        let mut next_render = pending.next().unwrap_or(NONE);
        let mut next_restore = NONE;
        let mut frames: Vec<CullFrame> = Vec::new();
        let mut indices = Vec::new();

        for (index, &offset) in self.storage.offsets().iter().enumerate() {
            while index > next_render {
                next_render = pending.next().unwrap_or(NONE);
            }
            if next_render == NONE {
                break;
            }
            let (op_type, _) = read_header(&self.storage, offset);
            match op_type.category() {
                OpCategory::Attribute => indices.push(index),
                OpCategory::Save | OpCategory::SaveLayer => {
                    let restore = restore_index(&self.storage, offset, op_type);
                    let needed = next_render < restore;
                    frames.push(CullFrame {
                        previous_restore: next_restore,
                        needed,
                    });
                    next_restore = restore;
                    if needed {
                        indices.push(index);
                    }
                }
                OpCategory::Transform | OpCategory::Clip => {
                    if next_render < next_restore {
                        indices.push(index);
                    }
                }
                OpCategory::Rendering | OpCategory::SubDisplayList => {
                    if index == next_render {
                        indices.push(index);
                    }
                }
                OpCategory::Restore => {
                    let Some(frame) = frames.pop() else {
                        panic!("corrupt display list: unbalanced restore at op {index}");
                    };
                    next_restore = frame.previous_restore;
                    if frame.needed {
                        indices.push(index);
                    }
                }
                OpCategory::Invalid => {}
            }
        }

        while let Some(frame) = frames.pop() {
            if frame.needed {
                indices.push(next_restore);
            }
            next_restore = frame.previous_restore;
        }
        (indices, candidate_count)
    }

    // -----------------------------------------------------------------------
    // Equality
    // -----------------------------------------------------------------------

    /// Structural equality: same ops with equal payloads and resources.
    #[must_use]
    pub fn equals(&self, other: &Self) -> bool {
        if core::ptr::eq(self, other) {
            return true;
        }
        if self.storage.op_count() != other.storage.op_count()
            || self.storage.used() != other.storage.used()
        {
            return false;
        }
        ops_equal(&self.storage, &self.resources, &other.storage, &other.resources)
    }
}

impl PartialEq for DisplayList {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl fmt::Debug for DisplayList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisplayList")
            .field("id", &self.id)
            .field("op_count", &self.storage.op_count())
            .field("bytes", &self.storage.used())
            .field("resources", &self.resources.len())
            .field("nested_op_count", &self.nested_op_count)
            .field("nested_byte_count", &self.nested_byte_count)
            .field("total_depth", &self.total_depth)
            .field("bounds", &self.bounds)
            .field("has_rtree", &self.rtree.is_some())
            .field("can_apply_group_opacity", &self.can_apply_group_opacity)
            .field("is_ui_thread_safe", &self.is_ui_thread_safe)
            .field("modifies_transparent_black", &self.modifies_transparent_black)
            .field("root_has_backdrop_filter", &self.root_has_backdrop_filter)
            .field("root_is_unbounded", &self.root_is_unbounded)
            .field("max_root_blend_mode", &self.max_root_blend_mode)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::String;
    use alloc::vec;

    use kurbo::BezPath;

    use crate::builder::DisplayListBuilder;
    use crate::paint::{ClipOp, DlColor, Paint};
    use crate::testing::RecordingReceiver;

    fn calls(list: &DisplayList) -> Vec<String> {
        let mut rec = RecordingReceiver::default();
        list.dispatch(&mut rec);
        rec.calls
    }

    fn culled_calls(list: &DisplayList, cull: Rect) -> Vec<String> {
        let mut rec = RecordingReceiver::default();
        list.dispatch_culled(&mut rec, cull);
        rec.calls
    }

    /// `save, clip_rect(R), draw_rect(X), restore, draw_rect(Y)`.
    fn clipped_pair(rtree: bool) -> Arc<DisplayList> {
        let paint = Paint::default();
        let mut b = DisplayListBuilder::new(rtree);
        b.save();
        b.clip_rect(Rect::new(0.0, 0.0, 50.0, 50.0), ClipOp::Intersect, false);
        b.draw_rect(Rect::new(10.0, 10.0, 20.0, 20.0), &paint);
        b.restore();
        b.draw_rect(Rect::new(100.0, 100.0, 120.0, 120.0), &paint);
        b.build()
    }

    #[test]
    fn stored_sizes_reproduce_offset_table() {
        let mut b = DisplayListBuilder::new(false);
        let paint = Paint::with_color(DlColor::RED).stroked(2.0);
        b.translate(3.0, 4.0);
        b.draw_points(
            crate::paint::PointMode::Polygon,
            &[(0.0, 0.0).into(), (5.0, 5.0).into(), (9.0, 1.0).into()],
            &paint,
        );
        b.draw_rect(Rect::new(0.0, 0.0, 5.0, 5.0), &Paint::default());
        let list = b.build();

        let walked: Vec<usize> = list.op_records().map(|r| r.offset).collect();
        assert_eq!(walked, list.storage.offsets(), "size walk must land on every header");
        let end = list.op_records().last().map(|r| r.offset + r.size);
        assert_eq!(end, Some(list.bytes(false)));
    }

    #[test]
    fn full_dispatch_replays_in_order() {
        let mut b = DisplayListBuilder::new(false);
        b.translate(10.0, 10.0);
        b.draw_rect(Rect::new(0.0, 0.0, 5.0, 5.0), &Paint::default());
        let list = b.build();
        assert_eq!(calls(&list), vec!["translate(10, 10)", "draw_rect(0, 0, 5, 5)"]);
        assert_eq!(list.bounds(), Rect::new(10.0, 10.0, 15.0, 15.0));
    }

    #[test]
    fn disjoint_cull_replays_nothing() {
        let mut b = DisplayListBuilder::new(true);
        b.translate(10.0, 10.0);
        b.draw_rect(Rect::new(0.0, 0.0, 5.0, 5.0), &Paint::default());
        let list = b.build();

        assert!(culled_calls(&list, Rect::new(100.0, 100.0, 200.0, 200.0)).is_empty());
        assert_eq!(
            culled_calls(&list, Rect::new(0.0, 0.0, 200.0, 200.0)),
            vec!["translate(10, 10)", "draw_rect(0, 0, 5, 5)"],
        );
    }

    #[test]
    fn cull_keeps_only_the_visible_branch() {
        let list = clipped_pair(true);

        let y_only = culled_calls(&list, Rect::new(110.0, 110.0, 115.0, 115.0));
        assert_eq!(y_only, vec!["draw_rect(100, 100, 120, 120)"]);

        let x_only = culled_calls(&list, Rect::new(12.0, 12.0, 15.0, 15.0));
        assert_eq!(
            x_only,
            vec![
                "save",
                "clip_rect(0, 0, 50, 50, Intersect)",
                "draw_rect(10, 10, 20, 20)",
                "restore",
            ]
        );
    }

    #[test]
    fn cull_without_rtree_or_covering_is_full_replay() {
        let list = clipped_pair(false);
        assert_eq!(culled_calls(&list, Rect::new(12.0, 12.0, 15.0, 15.0)).len(), 5);

        let indexed = clipped_pair(true);
        let everything = Rect::new(-10.0, -10.0, 500.0, 500.0);
        assert_eq!(culled_calls(&indexed, everything).len(), 5);
        assert_eq!(indexed.culled_indices(everything), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn empty_cull_replays_nothing() {
        let list = clipped_pair(false);
        assert!(culled_calls(&list, Rect::new(5.0, 5.0, 5.0, 9.0)).is_empty());
        assert!(list.culled_indices(Rect::ZERO).is_empty());
    }

    #[test]
    fn attributes_survive_culling() {
        let mut b = DisplayListBuilder::new(true);
        b.draw_rect(Rect::new(0.0, 0.0, 10.0, 10.0), &Paint::with_color(DlColor::RED));
        b.draw_rect(Rect::new(50.0, 50.0, 60.0, 60.0), &Paint::with_color(DlColor::BLUE));
        let list = b.build();

        let kept = list.culled_indices(Rect::new(52.0, 52.0, 55.0, 55.0));
        let kinds: Vec<OpCategory> = kept.iter().map(|&i| list.op_category_at(i)).collect();
        assert_eq!(
            kinds,
            vec![OpCategory::Attribute, OpCategory::Attribute, OpCategory::Rendering],
            "both color changes precede the kept draw"
        );
    }

    #[test]
    fn open_frames_close_when_candidates_run_out() {
        let paint = Paint::default();
        let mut b = DisplayListBuilder::new(true);
        b.save();
        b.translate(1.0, 1.0);
        b.save();
        b.scale(2.0, 2.0);
        b.draw_rect(Rect::new(0.0, 0.0, 4.0, 4.0), &paint);
        b.draw_rect(Rect::new(100.0, 100.0, 104.0, 104.0), &paint);
        b.restore();
        b.restore();
        let list = b.build();

        // save, translate, save, scale, draw, draw, restore, restore
        let kept = list.culled_indices(Rect::new(0.0, 0.0, 5.0, 5.0));
        assert_eq!(kept, vec![0, 1, 2, 3, 4, 6, 7]);
    }

    #[test]
    fn index_access() {
        let list = clipped_pair(false);
        let mut rec = RecordingReceiver::default();
        assert!(list.dispatch_at(&mut rec, 2));
        assert!(!list.dispatch_at(&mut rec, 5));
        assert_eq!(rec.calls, vec!["draw_rect(10, 10, 20, 20)"]);

        let mut rec = RecordingReceiver::default();
        list.dispatch_indices(&mut rec, &[4, 99, 0]);
        assert_eq!(rec.calls, vec!["draw_rect(100, 100, 120, 120)", "save"]);

        assert_eq!(list.op_type_at(1), Some(OpType::ClipRect));
        assert_eq!(list.op_type_at(5), None);
        assert_eq!(list.op_category_at(3), OpCategory::Restore);
        assert_eq!(list.op_category_at(5), OpCategory::Invalid);
    }

    #[test]
    fn equality_is_structural() {
        let a = clipped_pair(false);
        let b = clipped_pair(false);
        assert!(a.equals(&a));
        assert!(a.equals(&b) && b.equals(&a));
        assert_ne!(a.id(), b.id());

        let mut builder = DisplayListBuilder::new(false);
        builder.draw_rect(Rect::new(0.0, 0.0, 5.0, 5.0), &Paint::default());
        let c = builder.build();
        assert!(!a.equals(&c));
    }

    #[test]
    fn equality_compares_resources_by_value() {
        let path = |x: f64| {
            let mut p = BezPath::new();
            p.move_to((0.0, 0.0));
            p.line_to((x, 10.0));
            p.line_to((10.0, 0.0));
            p.close_path();
            Arc::new(p)
        };
        let record = |p: Arc<BezPath>| {
            let mut b = DisplayListBuilder::new(false);
            b.draw_rect(Rect::new(0.0, 0.0, 1.0, 1.0), &Paint::default());
            b.draw_path(&p, &Paint::default());
            b.draw_rect(Rect::new(2.0, 2.0, 3.0, 3.0), &Paint::default());
            b.build()
        };
        assert_eq!(*record(path(5.0)), *record(path(5.0)));
        assert_ne!(*record(path(5.0)), *record(path(6.0)));
    }

    #[test]
    fn replaying_into_a_builder_reproduces_the_list() {
        let list = clipped_pair(true);
        let mut copy = DisplayListBuilder::new(true);
        list.dispatch(&mut copy);
        let copy = copy.build();
        assert!(copy.equals(&list));
        assert_eq!(copy.bounds(), list.bounds());
    }

    #[test]
    fn nested_list_hits_are_coalesced() {
        let paint = Paint::default();
        let mut child = DisplayListBuilder::new(true);
        child.draw_rect(Rect::new(0.0, 0.0, 10.0, 10.0), &paint);
        child.draw_rect(Rect::new(5.0, 5.0, 15.0, 15.0), &paint);
        child.draw_rect(Rect::new(40.0, 40.0, 50.0, 50.0), &paint);
        let child = child.build();

        let mut parent = DisplayListBuilder::new(true);
        parent.draw_display_list(&child, 1.0);
        parent.draw_rect(Rect::new(200.0, 200.0, 210.0, 210.0), &paint);
        let parent = parent.build();

        let rtree = parent.rtree().map(|r| r.len());
        assert_eq!(rtree, Some(3), "two merged child rects plus the parent draw");
        assert_eq!(parent.op_count(true), 5);
        assert_eq!(parent.culled_indices(Rect::new(0.0, 0.0, 60.0, 60.0)), vec![0]);
    }
}
