// Copyright 2026 the Tracery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rectangle helpers and the bounds accumulator used while recording.

use kurbo::{Point, Rect};

/// The cull rectangle used when a builder is not given one.
pub const MAX_CULL_RECT: Rect = Rect::new(-1e9, -1e9, 1e9, 1e9);

/// Returns `true` if `r` has no interior (zero or negative extent, or NaN).
#[inline]
#[must_use]
pub fn rect_is_empty(r: &Rect) -> bool {
    !(r.x0 < r.x1 && r.y0 < r.y1)
}

/// Returns `true` if every coordinate of `r` is finite.
#[inline]
#[must_use]
pub fn rect_is_finite(r: &Rect) -> bool {
    r.x0.is_finite() && r.y0.is_finite() && r.x1.is_finite() && r.y1.is_finite()
}

/// Returns `true` if the interiors of `a` and `b` intersect.
#[inline]
#[must_use]
pub fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    a.x0 < b.x1 && b.x0 < a.x1 && a.y0 < b.y1 && b.y0 < a.y1
}

/// Returns `true` if `outer` contains all of `inner`.
///
/// An empty `inner` is contained by anything that is not itself empty.
#[inline]
#[must_use]
pub fn rect_contains(outer: &Rect, inner: &Rect) -> bool {
    if rect_is_empty(outer) {
        return false;
    }
    rect_is_empty(inner)
        || (outer.x0 <= inner.x0
            && outer.y0 <= inner.y0
            && outer.x1 >= inner.x1
            && outer.y1 >= inner.y1)
}

/// The intersection of `a` and `b`, or `None` if it has no interior.
#[inline]
#[must_use]
pub fn intersect(a: &Rect, b: &Rect) -> Option<Rect> {
    let r = Rect::new(a.x0.max(b.x0), a.y0.max(b.y0), a.x1.min(b.x1), a.y1.min(b.y1));
    (!rect_is_empty(&r)).then_some(r)
}

/// The bounding box of a set of points, or `None` for an empty set.
#[must_use]
pub fn points_bounds(points: &[Point]) -> Option<Rect> {
    let (first, rest) = points.split_first()?;
    let mut r = Rect::from_points(*first, *first);
    for p in rest {
        r = Rect::new(r.x0.min(p.x), r.y0.min(p.y), r.x1.max(p.x), r.y1.max(p.y));
    }
    Some(r)
}

/// Union-of-rectangles accumulator with interior overlap detection.
///
/// Every accumulated rectangle is checked against the union of everything
/// accumulated before it. If their interiors intersect, the accumulator
/// remembers that overlap was detected. Rectangles that only share an edge
/// are not considered overlapping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AccumulationRect {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
    overlap_detected: bool,
}

impl Default for AccumulationRect {
    fn default() -> Self {
        Self::new()
    }
}

impl AccumulationRect {
    /// An accumulator that has seen nothing.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
            overlap_detected: false,
        }
    }

    /// Adds a single point. Points never trigger overlap detection.
    pub fn accumulate_point(&mut self, p: Point) {
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
    }

    /// Adds a rectangle. Empty rectangles are ignored.
    pub fn accumulate(&mut self, r: Rect) {
        if rect_is_empty(&r) {
            return;
        }
        if !self.overlap_detected
            && r.x0 < self.max_x
            && r.y0 < self.max_y
            && r.x1 > self.min_x
            && r.y1 > self.min_y
        {
            self.overlap_detected = true;
        }
        self.min_x = self.min_x.min(r.x0);
        self.min_y = self.min_y.min(r.y0);
        self.max_x = self.max_x.max(r.x1);
        self.max_y = self.max_y.max(r.y1);
    }

    /// Adds everything another accumulator has seen, inheriting its overlap
    /// state.
    pub fn accumulate_other(&mut self, other: &Self) {
        if other.is_empty() {
            return;
        }
        self.accumulate(other.bounds());
        self.overlap_detected |= other.overlap_detected;
    }

    /// Returns `true` if nothing with an interior has been accumulated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !(self.min_x < self.max_x && self.min_y < self.max_y)
    }

    /// Whether two accumulated rectangles were found to overlap.
    #[inline]
    #[must_use]
    pub fn overlap_detected(&self) -> bool {
        self.overlap_detected
    }

    /// The union of everything accumulated, or [`Rect::ZERO`] if empty.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        if self.is_empty() {
            Rect::ZERO
        } else {
            Rect::new(self.min_x, self.min_y, self.max_x, self.max_y)
        }
    }

    /// Forgets everything accumulated so far.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
