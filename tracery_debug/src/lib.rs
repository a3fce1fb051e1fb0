// Copyright 2026 the Tracery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing and JSON export for tracery diagnostics.
//!
//! This crate provides tools for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: a [`TraceSink`](tracery_core::trace::TraceSink)
//!   that writes one line per event.
//! - [`pretty::PrettyPrintReceiver`]: a
//!   [`DlOpReceiver`](tracery_core::DlOpReceiver) that writes one indented line
//!   per replayed op, with [`pretty::dump`] as a shortcut.
//! - [`json::export`]: writes a display list as a JSON array of op objects.

pub mod json;
pub mod pretty;
