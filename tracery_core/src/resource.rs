// Copyright 2026 the Tracery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared payloads referenced by op records.
//!
//! Op records are plain bytes, so anything reference-counted (paths, images,
//! filters, text, vertices, nested display lists) lives in a per-list
//! resource table and records store its slot.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use bytemuck::{Pod, Zeroable};
use kurbo::{BezPath, Point, Rect};

use crate::display_list::DisplayList;
use crate::effects::{ColorFilter, ColorSource, ImageFilter};
use crate::geometry::points_bounds;
use crate::paint::DlColor;

/// An image that can be drawn by a receiver.
///
/// The pixels are opaque to the recording engine; only size, opacity and
/// thread affinity matter here.
pub trait DlImage: fmt::Debug + Send + Sync {
    /// Width in pixels.
    fn width(&self) -> u32;

    /// Height in pixels.
    fn height(&self) -> u32;

    /// Returns `true` if every pixel is opaque.
    fn is_opaque(&self) -> bool;

    /// Returns `false` for images that must only be sampled on the thread
    /// that created them.
    fn is_ui_thread_safe(&self) -> bool {
        true
    }

    /// The image's own bounds, anchored at the origin.
    fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width()), f64::from(self.height()))
    }
}

/// One positioned glyph of a [`TextBlob`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionedGlyph {
    /// Font-specific glyph id.
    pub glyph_id: u32,
    /// Baseline origin relative to the blob origin.
    pub position: Point,
}

/// Pre-shaped text with known bounds.
#[derive(Clone, Debug, PartialEq)]
pub struct TextBlob {
    /// Glyphs in drawing order.
    pub glyphs: Vec<PositionedGlyph>,
    /// Conservative bounds relative to the blob origin.
    pub bounds: Rect,
}

/// How vertices are assembled into triangles.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum VertexMode {
    /// Every three vertices form a triangle.
    #[default]
    Triangles,
    /// Each vertex after the first two forms a triangle with the previous two.
    TriangleStrip,
    /// Each vertex after the first two forms a triangle with the first and
    /// previous.
    TriangleFan,
}

/// A triangle mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct Vertices {
    /// Assembly mode.
    pub mode: VertexMode,
    /// Vertex positions.
    pub positions: Vec<Point>,
    /// Optional per-vertex colors, same length as `positions`.
    pub colors: Option<Vec<DlColor>>,
    /// Optional index list into `positions`.
    pub indices: Option<Vec<u16>>,
}

impl Vertices {
    /// Bounding box of all positions, or [`Rect::ZERO`] when empty.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        points_bounds(&self.positions).unwrap_or(Rect::ZERO)
    }
}

/// A rotation-scale-translation transform for one atlas sprite.
///
/// Maps sprite-local `(x, y)` to `(scos·x − ssin·y + tx, ssin·x + scos·y + ty)`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct RsTransform {
    /// `scale · cos(angle)`
    pub scos: f64,
    /// `scale · sin(angle)`
    pub ssin: f64,
    /// X translation.
    pub tx: f64,
    /// Y translation.
    pub ty: f64,
}

impl RsTransform {
    /// A pure translation.
    #[must_use]
    pub const fn translate(tx: f64, ty: f64) -> Self {
        Self {
            scos: 1.0,
            ssin: 0.0,
            tx,
            ty,
        }
    }

    /// Bounding box of a `width × height` sprite placed by this transform.
    #[must_use]
    pub fn sprite_bounds(&self, width: f64, height: f64) -> Rect {
        let map = |x: f64, y: f64| {
            Point::new(
                self.scos * x - self.ssin * y + self.tx,
                self.ssin * x + self.scos * y + self.ty,
            )
        };
        let corners = [map(0.0, 0.0), map(width, 0.0), map(width, height), map(0.0, height)];
        points_bounds(&corners).unwrap_or(Rect::ZERO)
    }
}

// ---------------------------------------------------------------------------
// Resource table
// ---------------------------------------------------------------------------

/// Slot value meaning "no resource".
pub(crate) const NO_RESOURCE: u32 = u32::MAX;

/// A shared payload owned by a display list.
#[derive(Clone, Debug)]
pub(crate) enum DlResource {
    ColorSource(Arc<ColorSource>),
    ColorFilter(Arc<ColorFilter>),
    ImageFilter(Arc<ImageFilter>),
    Path(Arc<BezPath>),
    Image(Arc<dyn DlImage>),
    Text(Arc<TextBlob>),
    Vertices(Arc<Vertices>),
    DisplayList(Arc<DisplayList>),
}

impl DlResource {
    /// Deep equality: identical handles, or equal values behind them.
    ///
    /// Images compare by identity only since their pixels are not visible
    /// here.
    pub(crate) fn equals(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::ColorSource(a), Self::ColorSource(b)) => Arc::ptr_eq(a, b) || a == b,
            (Self::ColorFilter(a), Self::ColorFilter(b)) => Arc::ptr_eq(a, b) || a == b,
            (Self::ImageFilter(a), Self::ImageFilter(b)) => Arc::ptr_eq(a, b) || a == b,
            (Self::Path(a), Self::Path(b)) => Arc::ptr_eq(a, b) || a == b,
            (Self::Image(a), Self::Image(b)) => Arc::ptr_eq(a, b),
            (Self::Text(a), Self::Text(b)) => Arc::ptr_eq(a, b) || a == b,
            (Self::Vertices(a), Self::Vertices(b)) => Arc::ptr_eq(a, b) || a == b,
            (Self::DisplayList(a), Self::DisplayList(b)) => a.equals(b),
            _ => false,
        }
    }
}

/// Append-only table of resources, addressed by `u32` slot.
#[derive(Clone, Debug, Default)]
pub(crate) struct ResourceTable {
    entries: Vec<DlResource>,
}

macro_rules! typed_getter {
    ($name:ident, $variant:ident, $ty:ty) => {
        pub(crate) fn $name(&self, slot: u32) -> &$ty {
            match self.get(slot) {
                DlResource::$variant(value) => value,
                other => panic!(
                    "corrupt display list: slot {slot} holds {other:?}, expected {}",
                    stringify!($variant)
                ),
            }
        }
    };
}

impl ResourceTable {
    pub(crate) fn push(&mut self, resource: DlResource) -> u32 {
        let slot = u32::try_from(self.entries.len()).unwrap_or(NO_RESOURCE);
        assert!(slot != NO_RESOURCE, "resource table overflow");
        self.entries.push(resource);
        slot
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// # Panics
    ///
    /// Panics if `slot` is out of range, which means the op stream is
    /// corrupt.
    pub(crate) fn get(&self, slot: u32) -> &DlResource {
        match self.entries.get(slot as usize) {
            Some(resource) => resource,
            None => panic!("corrupt display list: resource slot {slot} out of range"),
        }
    }

    pub(crate) fn optional(&self, slot: u32) -> Option<&DlResource> {
        (slot != NO_RESOURCE).then(|| self.get(slot))
    }

    pub(crate) fn shrink_to_fit(&mut self) {
        self.entries.shrink_to_fit();
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    typed_getter!(color_source, ColorSource, Arc<ColorSource>);
    typed_getter!(color_filter, ColorFilter, Arc<ColorFilter>);
    typed_getter!(image_filter, ImageFilter, Arc<ImageFilter>);
    typed_getter!(path, Path, Arc<BezPath>);
    typed_getter!(image, Image, Arc<dyn DlImage>);
    typed_getter!(text, Text, Arc<TextBlob>);
    typed_getter!(vertices, Vertices, Arc<Vertices>);
    typed_getter!(display_list, DisplayList, Arc<DisplayList>);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestImage;
    use alloc::vec;

    #[test]
    fn sprite_bounds_with_rotation() {
        // 90 degrees: (x, y) -> (-y, x)
        let xf = RsTransform {
            scos: 0.0,
            ssin: 1.0,
            tx: 10.0,
            ty: 0.0,
        };
        assert_eq!(xf.sprite_bounds(4.0, 2.0), Rect::new(8.0, 0.0, 10.0, 4.0));
        assert_eq!(
            RsTransform::translate(5.0, 5.0).sprite_bounds(4.0, 2.0),
            Rect::new(5.0, 5.0, 9.0, 7.0)
        );
    }

    #[test]
    fn vertices_bounds() {
        let v = Vertices {
            mode: VertexMode::Triangles,
            positions: vec![Point::new(1., 1.), Point::new(5., 2.), Point::new(3., 9.)],
            colors: None,
            indices: None,
        };
        assert_eq!(v.bounds(), Rect::new(1., 1., 5., 9.));
    }

    #[test]
    fn paths_compare_by_value_images_by_identity() {
        let mut a = BezPath::new();
        a.move_to((0., 0.));
        a.line_to((1., 1.));
        let p1 = DlResource::Path(Arc::new(a.clone()));
        let p2 = DlResource::Path(Arc::new(a));
        assert!(p1.equals(&p2));

        let img: Arc<dyn DlImage> = Arc::new(TestImage::opaque(4, 4));
        let twin: Arc<dyn DlImage> = Arc::new(TestImage::opaque(4, 4));
        assert!(DlResource::Image(img.clone()).equals(&DlResource::Image(img.clone())));
        assert!(!DlResource::Image(img).equals(&DlResource::Image(twin)));
    }

    #[test]
    #[should_panic(expected = "corrupt display list")]
    fn wrong_kind_panics() {
        let mut table = ResourceTable::default();
        let slot = table.push(DlResource::Path(Arc::new(BezPath::new())));
        let _ = table.text(slot);
    }
}
