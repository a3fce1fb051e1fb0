// Copyright 2026 the Tracery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for recording and culled replay.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! builder and the culling dispatcher call. All method bodies default to
//! no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace` enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`) gates the per-index culling report and
//!   the corresponding `TraceSink` method.

use kurbo::Rect;

use crate::id::DisplayListId;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted by [`DisplayListBuilder::build_traced`](crate::DisplayListBuilder::build_traced).
#[derive(Clone, Copy, Debug)]
pub struct BuildSummary {
    /// Identity of the new list.
    pub list_id: DisplayListId,
    /// Top-level op count.
    pub op_count: usize,
    /// Bytes of op storage.
    pub byte_count: usize,
    /// Ops inside nested display lists.
    pub nested_op_count: usize,
    /// Recursive depth cost.
    pub total_depth: u32,
    /// Aggregate device-space bounds.
    pub bounds: Rect,
    /// Whether a spatial index was built.
    pub has_rtree: bool,
    /// Save/restore pairs that were never emitted.
    pub elided_saves: u32,
    /// Draws dropped because they fell outside the cull rect.
    pub culled_ops: u32,
    /// Draws dropped because their paint had no effect.
    pub no_effect_ops: u32,
}

/// Emitted by [`DisplayList::dispatch_culled_traced`](crate::DisplayList::dispatch_culled_traced).
#[derive(Clone, Copy, Debug)]
pub struct CullSummary {
    /// Identity of the replayed list.
    pub list_id: DisplayListId,
    /// Top-level op count.
    pub op_count: usize,
    /// Spatial index hits for the query.
    pub candidate_count: usize,
    /// Ops actually dispatched.
    pub kept_count: usize,
    /// `true` if the whole list was replayed without consulting the index.
    pub full_replay: bool,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from recording and replay.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a builder finishes a list.
    fn on_build(&mut self, e: &BuildSummary) {
        _ = e;
    }

    /// Called after a culled replay.
    fn on_cull(&mut self, e: &CullSummary) {
        _ = e;
    }

    /// Called with the op indices a culled replay kept (requires
    /// `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_culled_indices(&mut self, list_id: DisplayListId, indices: &[usize]) {
        _ = (list_id, indices);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`BuildSummary`].
    #[inline]
    pub fn build(&mut self, e: &BuildSummary) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_build(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`CullSummary`].
    #[inline]
    pub fn cull(&mut self, e: &CullSummary) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_cull(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits the kept op indices (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn culled_indices(&mut self, list_id: DisplayListId, indices: &[usize]) {
        if let Some(s) = &mut self.sink {
            s.on_culled_indices(list_id, indices);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
