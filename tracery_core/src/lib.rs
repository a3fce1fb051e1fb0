// Copyright 2026 the Tracery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, culling and replay of vector drawing commands.
//!
//! `tracery_core` records a stream of canvas calls (transforms, clips,
//! attribute changes and draws) into a compact, immutable [`DisplayList`].
//! While recording, the builder drops calls that cannot affect the output,
//! tracks conservative bounds, and decides whether each layer can take a
//! group opacity. A finished list can be replayed into any
//! [`DlOpReceiver`], optionally restricted to the ops that touch a cull
//! rectangle. It is `no_std` compatible (with `alloc`).
//!
//! # Architecture
//!
//! ```text
//!   canvas calls
//!       │
//!       ▼
//!   DisplayListBuilder ──► DlStorage (op records) + ResourceTable
//!       │                        │
//!       │ build()                │
//!       ▼                        ▼
//!   DisplayList ──► dispatch / dispatch_culled ──► DlOpReceiver
//!       │
//!       └──► RTree (optional) ──► search / culled_indices
//! ```
//!
//! **[`builder`]**: [`DisplayListBuilder`], the recording front end. It
//! defers saves until something changes, elides no-op and fully clipped
//! draws, and patches each save with the content bounds of its scope.
//!
//! **[`display_list`]**: [`DisplayList`], the immutable result: op
//! iteration, full and culled dispatch, bounds queries and structural
//! equality.
//!
//! **[`receiver`]**: The [`DlOpReceiver`] trait, one method per op type.
//! A builder is itself a receiver, so replaying into one copies a list.
//!
//! **[`op`]**: Op types and categories. Records are stored as an 8-byte
//! header followed by a `bytemuck` payload.
//!
//! **[`paint`]** and **[`effects`]**: Paint attributes and the color
//! sources and filters they reference.
//!
//! **[`resource`]**: Shared payloads (paths, images, text, vertices)
//! referenced from op records by slot.
//!
//! **[`matrix`]** and **[`geometry`]**: The 4×4 transform and rectangle
//! helpers used for bounds tracking.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and summaries for
//! recording and culled replay, with a zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Reports the op
//!   indices kept by each culled replay.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod builder;
pub mod display_list;
pub mod effects;
pub mod geometry;
pub mod id;
pub mod matrix;
pub mod op;
pub mod paint;
pub mod receiver;
pub mod resource;
pub mod trace;

mod storage;

#[cfg(test)]
mod testing;

pub use builder::DisplayListBuilder;
pub use display_list::DisplayList;
pub use id::DisplayListId;
pub use matrix::Matrix;
pub use paint::{BlendMode, ClipOp, DlColor, Paint, SaveLayerOptions};
pub use receiver::DlOpReceiver;
pub use resource::{DlImage, RsTransform, TextBlob, Vertices};
