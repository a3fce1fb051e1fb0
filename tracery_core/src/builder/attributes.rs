// Copyright 2026 the Tracery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Which paint attributes each op reads, and what a paint does to a layer.

use bitflags::bitflags;
use kurbo::Rect;

use crate::paint::{BlendMode, DlColor, DrawStyle, Paint, StrokeCap, StrokeJoin};
use crate::receiver::DlOpReceiver;

use super::DisplayListBuilder;

bitflags! {
    /// The paint attributes an op consumes, plus hints about its geometry.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub(crate) struct AttributeFlags: u32 {
        const ANTI_ALIAS = 1 << 0;
        const COLOR = 1 << 1;
        const ALPHA = 1 << 2;
        const BLEND = 1 << 3;
        const COLOR_SOURCE = 1 << 4;
        const COLOR_FILTER = 1 << 5;
        const IMAGE_FILTER = 1 << 6;
        const MASK_FILTER = 1 << 7;
        const DRAW_STYLE = 1 << 8;
        const ALWAYS_STROKED = 1 << 9;
        /// Stroke parameters affect the output.
        const IS_GEOMETRIC = 1 << 10;
        const MAY_HAVE_JOINS = 1 << 11;
        const MAY_HAVE_ACUTE_JOINS = 1 << 12;
        const MAY_HAVE_CAPS = 1 << 13;
        const MAY_HAVE_DIAGONAL_CAPS = 1 << 14;
        /// Fills the whole clip.
        const IS_FLOOD = 1 << 15;
    }
}

impl AttributeFlags {
    const BASE: Self = Self::COLOR
        .union(Self::ALPHA)
        .union(Self::BLEND)
        .union(Self::COLOR_SOURCE)
        .union(Self::COLOR_FILTER)
        .union(Self::IMAGE_FILTER);

    const GEOMETRIC: Self = Self::BASE
        .union(Self::ANTI_ALIAS)
        .union(Self::MASK_FILTER)
        .union(Self::IS_GEOMETRIC);

    const CAPS: Self = Self::MAY_HAVE_CAPS.union(Self::MAY_HAVE_DIAGONAL_CAPS);

    const JOINS: Self = Self::MAY_HAVE_JOINS.union(Self::MAY_HAVE_ACUTE_JOINS);

    const IMAGE_BASE: Self = Self::ALPHA
        .union(Self::BLEND)
        .union(Self::COLOR_FILTER)
        .union(Self::IMAGE_FILTER)
        .union(Self::ANTI_ALIAS);

    pub(crate) const DRAW_PAINT: Self = Self::BASE.union(Self::IS_FLOOD);
    pub(crate) const DRAW_COLOR: Self = Self::COLOR.union(Self::BLEND).union(Self::IS_FLOOD);
    pub(crate) const DRAW_LINE: Self = Self::GEOMETRIC.union(Self::ALWAYS_STROKED).union(Self::CAPS);
    pub(crate) const DRAW_RECT: Self = Self::GEOMETRIC
        .union(Self::DRAW_STYLE)
        .union(Self::MAY_HAVE_JOINS);
    pub(crate) const DRAW_OVAL: Self = Self::GEOMETRIC.union(Self::DRAW_STYLE);
    pub(crate) const DRAW_ROUND_RECT: Self = Self::GEOMETRIC.union(Self::DRAW_STYLE);
    pub(crate) const DRAW_PATH: Self = Self::GEOMETRIC
        .union(Self::DRAW_STYLE)
        .union(Self::CAPS)
        .union(Self::JOINS);
    pub(crate) const DRAW_ARC_NO_CENTER: Self = Self::GEOMETRIC
        .union(Self::DRAW_STYLE)
        .union(Self::CAPS);
    pub(crate) const DRAW_ARC_WITH_CENTER: Self = Self::GEOMETRIC
        .union(Self::DRAW_STYLE)
        .union(Self::JOINS);
    pub(crate) const DRAW_POINTS: Self = Self::DRAW_LINE;
    pub(crate) const DRAW_POLYGON: Self = Self::DRAW_LINE.union(Self::JOINS);
    pub(crate) const DRAW_VERTICES: Self = Self::BASE;
    pub(crate) const DRAW_IMAGE: Self = Self::IMAGE_BASE.union(Self::MASK_FILTER);
    pub(crate) const DRAW_IMAGE_NINE: Self = Self::IMAGE_BASE;
    pub(crate) const DRAW_ATLAS: Self = Self::IMAGE_BASE;
    pub(crate) const DRAW_TEXT: Self = Self::BASE
        .union(Self::ANTI_ALIAS)
        .union(Self::MASK_FILTER);
    pub(crate) const SAVE_LAYER: Self = Self::ALPHA
        .union(Self::BLEND)
        .union(Self::COLOR_FILTER)
        .union(Self::IMAGE_FILTER);

    /// These flags if the op renders with attributes, otherwise none.
    pub(crate) fn used_if(self, with_attributes: bool) -> Self {
        if with_attributes { self } else { Self::empty() }
    }

    fn is_stroked(self, style: DrawStyle) -> bool {
        self.contains(Self::ALWAYS_STROKED)
            || (self.contains(Self::DRAW_STYLE) && style != DrawStyle::Fill)
    }
}

/// What an op does to the pixels of its layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PaintResult {
    /// Nothing visible changes.
    NoEffect,
    /// Transparent destination pixels stay transparent.
    PreservesTransparency,
    /// Any pixel under the op may change.
    AffectsAll,
}

/// The color an op effectively paints with, for transparency reasoning.
///
/// Colors that cannot be known are reported as [`DlColor::ANY`], which is
/// neither opaque nor transparent.
fn effective_color(paint: &Paint, flags: AttributeFlags) -> DlColor {
    let mut color = if flags.contains(AttributeFlags::COLOR) {
        match &paint.color_source {
            Some(_) if paint.color.alpha() == 0 => DlColor::TRANSPARENT,
            Some(source) if source.is_opaque() && paint.color.is_opaque() => DlColor::BLACK,
            Some(_) => DlColor::ANY,
            None => paint.color,
        }
    } else if flags.contains(AttributeFlags::ALPHA) {
        DlColor::ANY.with_alpha(paint.color.alpha())
    } else {
        DlColor::ANY
    };
    if flags.contains(AttributeFlags::COLOR_FILTER) {
        if let Some(filter) = &paint.color_filter {
            if !color.is_transparent() || filter.modifies_transparent_black() {
                color = DlColor::ANY;
            }
        }
    }
    if flags.contains(AttributeFlags::IMAGE_FILTER) {
        if let Some(filter) = &paint.image_filter {
            if !color.is_transparent() || filter.modifies_transparent_black() {
                color = DlColor::ANY;
            }
        }
    }
    color
}

/// Classifies what drawing with `paint` does to the destination.
pub(crate) fn paint_result(paint: &Paint, flags: AttributeFlags) -> PaintResult {
    use PaintResult::{AffectsAll, NoEffect, PreservesTransparency};

    if !flags.contains(AttributeFlags::BLEND) {
        return AffectsAll;
    }
    match paint.blend_mode {
        BlendMode::Dst => NoEffect,
        BlendMode::Clear
        | BlendMode::Src
        | BlendMode::SrcIn
        | BlendMode::SrcOut
        | BlendMode::DstATop
        | BlendMode::Modulate => PreservesTransparency,
        BlendMode::DstIn => {
            if effective_color(paint, flags).is_opaque() {
                NoEffect
            } else {
                PreservesTransparency
            }
        }
        BlendMode::DstOut | BlendMode::SrcATop => {
            if effective_color(paint, flags).is_transparent() {
                NoEffect
            } else {
                PreservesTransparency
            }
        }
        _ => {
            if effective_color(paint, flags).is_transparent() {
                NoEffect
            } else {
                AffectsAll
            }
        }
    }
}

/// Grows `bounds` by everything the paint can add around the geometry.
///
/// Returns `None` if an image filter makes the output unbounded.
pub(crate) fn adjust_bounds_for_paint(
    paint: &Paint,
    bounds: Rect,
    flags: AttributeFlags,
) -> Option<Rect> {
    let mut bounds = bounds;
    if flags.contains(AttributeFlags::IS_GEOMETRIC) && flags.is_stroked(paint.draw_style) {
        let mut pad: f64 = 1.0;
        if flags.contains(AttributeFlags::MAY_HAVE_JOINS) && paint.stroke_join == StrokeJoin::Miter
        {
            if flags.contains(AttributeFlags::MAY_HAVE_ACUTE_JOINS) {
                pad = pad.max(paint.stroke_miter);
            } else {
                pad = pad.max(core::f64::consts::SQRT_2);
            }
        }
        if flags.contains(AttributeFlags::MAY_HAVE_DIAGONAL_CAPS)
            && paint.stroke_cap == StrokeCap::Square
        {
            pad = pad.max(core::f64::consts::SQRT_2);
        }
        pad *= (paint.stroke_width * 0.5).max(0.01);
        bounds = bounds.inflate(pad, pad);
    }
    if flags.contains(AttributeFlags::MASK_FILTER) {
        if let Some(mask) = &paint.mask_filter {
            let outset = mask.outset();
            bounds = bounds.inflate(outset, outset);
        }
    }
    if flags.contains(AttributeFlags::IMAGE_FILTER) {
        if let Some(filter) = &paint.image_filter {
            return filter.map_local_bounds(bounds);
        }
    }
    Some(bounds)
}

/// Whether ops drawn with `paint` can have a group opacity folded into them.
pub(crate) fn is_opacity_compatible(paint: &Paint) -> bool {
    paint.color_filter.is_none() && !paint.invert_colors && paint.blend_mode == BlendMode::SrcOver
}

/// Returns `true` if `paint` draws hairlines, which double-blend where
/// segments overlap.
pub(crate) fn is_hairline(paint: &Paint, flags: AttributeFlags) -> bool {
    flags.is_stroked(paint.draw_style) && paint.stroke_width == 0.0
}

impl DisplayListBuilder {
    /// Records every attribute in `flags` that differs from the current
    /// attributes.
    pub(crate) fn set_attributes_from_paint(&mut self, paint: &Paint, flags: AttributeFlags) {
        if flags.contains(AttributeFlags::ANTI_ALIAS) {
            DlOpReceiver::set_anti_alias(self, paint.anti_alias);
        }
        if flags.intersects(AttributeFlags::COLOR | AttributeFlags::ALPHA) {
            DlOpReceiver::set_color(self, paint.color);
        }
        if flags.contains(AttributeFlags::BLEND) {
            DlOpReceiver::set_blend_mode(self, paint.blend_mode);
        }
        if flags.contains(AttributeFlags::DRAW_STYLE) {
            DlOpReceiver::set_draw_style(self, paint.draw_style);
        }
        if flags.contains(AttributeFlags::IS_GEOMETRIC) && flags.is_stroked(paint.draw_style) {
            DlOpReceiver::set_stroke_width(self, paint.stroke_width);
            DlOpReceiver::set_stroke_miter(self, paint.stroke_miter);
            DlOpReceiver::set_stroke_cap(self, paint.stroke_cap);
            DlOpReceiver::set_stroke_join(self, paint.stroke_join);
        }
        if flags.contains(AttributeFlags::COLOR_SOURCE) {
            DlOpReceiver::set_color_source(self, paint.color_source.as_ref());
        }
        if flags.contains(AttributeFlags::COLOR_FILTER) {
            DlOpReceiver::set_color_filter(self, paint.color_filter.as_ref());
            DlOpReceiver::set_invert_colors(self, paint.invert_colors);
        }
        if flags.contains(AttributeFlags::IMAGE_FILTER) {
            DlOpReceiver::set_image_filter(self, paint.image_filter.as_ref());
        }
        if flags.contains(AttributeFlags::MASK_FILTER) {
            DlOpReceiver::set_mask_filter(self, paint.mask_filter.as_ref());
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;
    use alloc::vec;

    use super::*;
    use crate::effects::{ColorFilter, ColorSource, ImageFilter, MaskFilter, TileMode};
    use crate::paint::DlColor;

    #[test]
    fn dst_never_draws() {
        let paint = Paint::with_color(DlColor::RED).blend_mode(BlendMode::Dst);
        assert_eq!(paint_result(&paint, AttributeFlags::DRAW_RECT), PaintResult::NoEffect);
    }

    #[test]
    fn transparent_src_over_is_a_no_op() {
        let paint = Paint::with_color(DlColor::TRANSPARENT);
        assert_eq!(paint_result(&paint, AttributeFlags::DRAW_RECT), PaintResult::NoEffect);
        let paint = Paint::with_color(DlColor::RED);
        assert_eq!(paint_result(&paint, AttributeFlags::DRAW_RECT), PaintResult::AffectsAll);
    }

    #[test]
    fn destructive_modes_preserve_transparency() {
        for mode in [BlendMode::Clear, BlendMode::Src, BlendMode::SrcIn, BlendMode::Modulate] {
            let paint = Paint::with_color(DlColor::TRANSPARENT).blend_mode(mode);
            assert_eq!(
                paint_result(&paint, AttributeFlags::DRAW_RECT),
                PaintResult::PreservesTransparency,
                "{mode:?}"
            );
        }
    }

    #[test]
    fn dst_in_with_opaque_color_changes_nothing() {
        let paint = Paint::with_color(DlColor::RED).blend_mode(BlendMode::DstIn);
        assert_eq!(paint_result(&paint, AttributeFlags::DRAW_RECT), PaintResult::NoEffect);
        let paint = Paint::with_color(DlColor::RED.with_alpha(10)).blend_mode(BlendMode::DstIn);
        assert_eq!(
            paint_result(&paint, AttributeFlags::DRAW_RECT),
            PaintResult::PreservesTransparency
        );
    }

    #[test]
    fn flooding_filter_makes_transparent_paint_visible() {
        let filter = ColorFilter::Blend {
            color: DlColor::BLUE,
            mode: BlendMode::Src,
        };
        let paint = Paint::with_color(DlColor::TRANSPARENT).color_filter(filter);
        assert_eq!(paint_result(&paint, AttributeFlags::DRAW_RECT), PaintResult::AffectsAll);
        // Images ignore the paint color but not the alpha.
        let paint = Paint::with_color(DlColor::RED.with_alpha(0));
        assert_eq!(paint_result(&paint, AttributeFlags::DRAW_IMAGE), PaintResult::NoEffect);
    }

    #[test]
    fn color_source_with_zero_alpha_is_transparent() {
        let source = ColorSource::LinearGradient {
            start: kurbo::Point::ZERO,
            end: kurbo::Point::new(10.0, 0.0),
            colors: vec![DlColor::RED, DlColor::BLUE],
            stops: vec![],
            tile_mode: TileMode::Clamp,
        };
        let paint = Paint::with_color(DlColor::TRANSPARENT).color_source(source.clone());
        assert_eq!(paint_result(&paint, AttributeFlags::DRAW_RECT), PaintResult::NoEffect);
        // An opaque gradient under DstIn changes nothing.
        let paint = Paint::default()
            .color_source(source)
            .blend_mode(BlendMode::DstIn);
        assert_eq!(paint_result(&paint, AttributeFlags::DRAW_RECT), PaintResult::NoEffect);
    }

    #[test]
    fn ops_without_blend_affect_everything() {
        let paint = Paint::with_color(DlColor::TRANSPARENT);
        assert_eq!(paint_result(&paint, AttributeFlags::empty()), PaintResult::AffectsAll);
    }

    #[test]
    fn stroke_padding() {
        let r = Rect::new(10.0, 10.0, 20.0, 20.0);
        let fill = Paint::default();
        assert_eq!(adjust_bounds_for_paint(&fill, r, AttributeFlags::DRAW_RECT), Some(r));

        let mut stroke = Paint::default().stroked(4.0);
        stroke.stroke_join = StrokeJoin::Round;
        assert_eq!(
            adjust_bounds_for_paint(&stroke, r, AttributeFlags::DRAW_OVAL),
            Some(r.inflate(2.0, 2.0))
        );

        // Miter joins on a path may reach out to the miter limit.
        stroke.stroke_join = StrokeJoin::Miter;
        assert_eq!(
            adjust_bounds_for_paint(&stroke, r, AttributeFlags::DRAW_PATH),
            Some(r.inflate(8.0, 8.0))
        );
    }

    #[test]
    fn lines_are_always_stroked() {
        let r = Rect::new(0.0, 5.0, 10.0, 5.0);
        let paint = Paint::default();
        assert_eq!(
            adjust_bounds_for_paint(&paint, r, AttributeFlags::DRAW_LINE),
            Some(r.inflate(0.01, 0.01))
        );
        let mut square = Paint::default().stroked(2.0);
        square.stroke_cap = StrokeCap::Square;
        let padded = adjust_bounds_for_paint(&square, r, AttributeFlags::DRAW_LINE);
        let sqrt2 = core::f64::consts::SQRT_2;
        assert_eq!(padded, Some(r.inflate(sqrt2, sqrt2)));
    }

    #[test]
    fn mask_and_image_filters_grow_bounds() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        let paint = Paint::default().mask_filter(MaskFilter::blur(1.0));
        assert_eq!(
            adjust_bounds_for_paint(&paint, r, AttributeFlags::DRAW_RECT),
            Some(r.inflate(3.0, 3.0))
        );
        let paint = Paint::default().image_filter(ImageFilter::blur(2.0, 2.0));
        assert_eq!(
            adjust_bounds_for_paint(&paint, r, AttributeFlags::DRAW_RECT),
            Some(r.inflate(6.0, 6.0))
        );
        let flood = ImageFilter::ColorFilter(Arc::new(ColorFilter::Blend {
            color: DlColor::BLUE,
            mode: BlendMode::Src,
        }));
        let paint = Paint::default().image_filter(flood);
        assert_eq!(adjust_bounds_for_paint(&paint, r, AttributeFlags::DRAW_RECT), None);
    }

    #[test]
    fn opacity_compatibility() {
        assert!(is_opacity_compatible(&Paint::default()));
        assert!(!is_opacity_compatible(&Paint::default().blend_mode(BlendMode::Src)));
        let mut inverted = Paint::default();
        inverted.invert_colors = true;
        assert!(!is_opacity_compatible(&inverted));
        assert!(is_hairline(&Paint::default().stroked(0.0), AttributeFlags::DRAW_PATH));
        assert!(!is_hairline(&Paint::default(), AttributeFlags::DRAW_PATH));
    }
}
