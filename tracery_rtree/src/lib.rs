// Copyright 2026 the Tracery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A packed R-tree over axis-aligned rectangles.
//!
//! [`RTree`] is built once from a list of rectangles and matching integer ids
//! and is immutable afterwards. The tree is packed bottom-up: leaves keep the
//! order in which rectangles were supplied and every interior node groups up
//! to [`MAX_CHILDREN`] consecutive nodes of the level below. Because of that,
//! a depth-first search reports hits in ascending leaf order, which is the
//! order a display list recorded its operations in.
//!
//! Empty rectangles never intersect anything and are dropped at construction,
//! so leaf positions refer to the kept rectangles only.
//!
//! ```
//! use kurbo::Rect;
//! use tracery_rtree::RTree;
//!
//! let rects = [Rect::new(0., 0., 10., 10.), Rect::new(20., 0., 30., 10.)];
//! let tree = RTree::new(&rects, &[7, 9]);
//! assert_eq!(tree.search_ids(Rect::new(25., 5., 26., 6.)), [9]);
//! ```

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

use alloc::vec::Vec;
use core::fmt;

use kurbo::Rect;

/// Maximum number of children grouped under one interior node.
pub const MAX_CHILDREN: usize = 11;

#[derive(Clone, Copy, Debug)]
struct Node {
    bounds: Rect,
    /// For leaves, the leaf position. For interior nodes, the first child.
    first: usize,
    /// Zero for leaves.
    child_count: usize,
}

/// An immutable spatial index mapping rectangles to integer ids.
#[derive(Clone)]
pub struct RTree {
    nodes: Vec<Node>,
    ids: Vec<u32>,
    leaf_count: usize,
}

impl fmt::Debug for RTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RTree")
            .field("leaf_count", &self.leaf_count)
            .field("node_count", &self.nodes.len())
            .field("bounds", &self.bounds())
            .finish_non_exhaustive()
    }
}

impl RTree {
    /// Builds a tree over `rects`, tagging each with the id at the same
    /// position in `ids`.
    ///
    /// # Panics
    ///
    /// Panics if `rects` and `ids` differ in length.
    #[must_use]
    pub fn new(rects: &[Rect], ids: &[u32]) -> Self {
        assert_eq!(
            rects.len(),
            ids.len(),
            "every rectangle needs exactly one id"
        );

        let mut nodes = Vec::with_capacity(rects.len() + rects.len() / (MAX_CHILDREN - 1) + 1);
        let mut kept_ids = Vec::with_capacity(rects.len());
        for (rect, &id) in rects.iter().zip(ids) {
            if is_empty(rect) {
                continue;
            }
            nodes.push(Node {
                bounds: *rect,
                first: kept_ids.len(),
                child_count: 0,
            });
            kept_ids.push(id);
        }
        let leaf_count = kept_ids.len();

        let mut level_start = 0;
        let mut level_len = leaf_count;
        while level_len > 1 {
            let next_start = nodes.len();
            let mut child = level_start;
            let level_end = level_start + level_len;
            while child < level_end {
                let count = MAX_CHILDREN.min(level_end - child);
                let mut bounds = nodes[child].bounds;
                for node in &nodes[child + 1..child + count] {
                    bounds = bounds.union(node.bounds);
                }
                nodes.push(Node {
                    bounds,
                    first: child,
                    child_count: count,
                });
                child += count;
            }
            level_start = next_start;
            level_len = nodes.len() - next_start;
        }

        Self {
            nodes,
            ids: kept_ids,
            leaf_count,
        }
    }

    /// Number of (non-empty) rectangles in the tree.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.leaf_count
    }

    /// Returns `true` if the tree holds no rectangles.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.leaf_count == 0
    }

    /// Union of every rectangle in the tree, or [`Rect::ZERO`] when empty.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.nodes.last().map_or(Rect::ZERO, |root| root.bounds)
    }

    /// The id stored for the leaf at `position`.
    ///
    /// # Panics
    ///
    /// Panics if `position >= self.len()`.
    #[inline]
    #[must_use]
    pub fn id(&self, position: usize) -> u32 {
        self.ids[position]
    }

    /// The rectangle stored for the leaf at `position`.
    ///
    /// # Panics
    ///
    /// Panics if `position >= self.len()`.
    #[inline]
    #[must_use]
    pub fn rect(&self, position: usize) -> Rect {
        self.nodes[position].bounds
    }

    /// Leaf positions whose rectangles overlap `query`, in ascending order.
    ///
    /// Overlap means the interiors intersect; rectangles that merely share an
    /// edge with `query` are not reported.
    #[must_use]
    pub fn search(&self, query: Rect) -> Vec<usize> {
        let mut hits = Vec::new();
        if let Some(root) = self.nodes.len().checked_sub(1)
            && !is_empty(&query)
        {
            self.visit(root, &query, &mut hits);
        }
        hits
    }

    /// Ids of the rectangles overlapping `query`, in leaf order.
    ///
    /// Ids are reported once per matching leaf, so an id that was inserted
    /// under several rectangles can appear more than once.
    #[must_use]
    pub fn search_ids(&self, query: Rect) -> Vec<u32> {
        self.search(query).into_iter().map(|i| self.ids[i]).collect()
    }

    /// Rectangles overlapping `query`, with overlapping hits merged into
    /// their union.
    ///
    /// The result is a set of pairwise non-overlapping rectangles sorted by
    /// top edge, then left edge.
    #[must_use]
    pub fn search_and_consolidate_rects(&self, query: Rect) -> Vec<Rect> {
        let mut merged: Vec<Rect> = Vec::new();
        for position in self.search(query) {
            let mut current = self.rect(position);
            while let Some(j) = merged.iter().position(|r| overlaps(r, &current)) {
                current = current.union(merged.swap_remove(j));
            }
            merged.push(current);
        }
        merged.sort_by(|a, b| a.y0.total_cmp(&b.y0).then(a.x0.total_cmp(&b.x0)));
        merged
    }

    fn visit(&self, index: usize, query: &Rect, hits: &mut Vec<usize>) {
        let node = &self.nodes[index];
        if !overlaps(&node.bounds, query) {
            return;
        }
        if node.child_count == 0 {
            hits.push(node.first);
        } else {
            for child in node.first..node.first + node.child_count {
                self.visit(child, query, hits);
            }
        }
    }
}

#[inline]
fn is_empty(r: &Rect) -> bool {
    !(r.x0 < r.x1 && r.y0 < r.y1)
}

#[inline]
fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.x0 < b.x1 && b.x0 < a.x1 && a.y0 < b.y1 && b.y0 < a.y1
}
