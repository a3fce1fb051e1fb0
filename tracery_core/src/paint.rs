// Copyright 2026 the Tracery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paint attributes and the small enums recorded alongside drawing ops.
//!
//! Enums that are stored inside op records carry an explicit `u8`
//! representation and an `ALL` table in discriminant order, so a record can
//! hold them as plain integers and decode them with `from_raw`.

use alloc::sync::Arc;
use core::fmt;

use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};

use crate::effects::{ColorFilter, ColorSource, ImageFilter, MaskFilter};

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// A non-premultiplied 8-bit ARGB color packed as `0xAARRGGBB`.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct DlColor(pub u32);

impl DlColor {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self(0x0000_0000);
    /// Opaque black.
    pub const BLACK: Self = Self(0xFF00_0000);
    /// Opaque white.
    pub const WHITE: Self = Self(0xFFFF_FFFF);
    /// Opaque red.
    pub const RED: Self = Self(0xFFFF_0000);
    /// Opaque green.
    pub const GREEN: Self = Self(0xFF00_FF00);
    /// Opaque blue.
    pub const BLUE: Self = Self(0xFF00_00FF);
    /// Mid grey at half alpha: a stand-in for "some color we cannot know".
    pub const ANY: Self = Self(0x8080_8080);

    /// Packs four 8-bit channels.
    #[inline]
    #[must_use]
    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self(u32::from_be_bytes([a, r, g, b]))
    }

    /// Alpha channel.
    #[inline]
    #[must_use]
    pub const fn alpha(self) -> u8 {
        self.0.to_be_bytes()[0]
    }

    /// Red channel.
    #[inline]
    #[must_use]
    pub const fn red(self) -> u8 {
        self.0.to_be_bytes()[1]
    }

    /// Green channel.
    #[inline]
    #[must_use]
    pub const fn green(self) -> u8 {
        self.0.to_be_bytes()[2]
    }

    /// Blue channel.
    #[inline]
    #[must_use]
    pub const fn blue(self) -> u8 {
        self.0.to_be_bytes()[3]
    }

    /// Returns `true` if alpha is 255.
    #[inline]
    #[must_use]
    pub const fn is_opaque(self) -> bool {
        self.alpha() == 0xFF
    }

    /// Returns `true` if alpha is 0.
    #[inline]
    #[must_use]
    pub const fn is_transparent(self) -> bool {
        self.alpha() == 0
    }

    /// The same color with a different alpha.
    #[inline]
    #[must_use]
    pub const fn with_alpha(self, alpha: u8) -> Self {
        Self((self.0 & 0x00FF_FFFF) | ((alpha as u32) << 24))
    }

    /// The same color with alpha scaled by `opacity` (clamped to `0..=1`).
    #[must_use]
    pub fn modulate_opacity(self, opacity: f64) -> Self {
        let opacity = if opacity.is_nan() { 0.0 } else { opacity.clamp(0.0, 1.0) };
        #[expect(
            clippy::cast_possible_truncation,
            reason = "the product is clamped to 0..=255 before conversion"
        )]
        let alpha = (f64::from(self.alpha()) * opacity + 0.5).min(255.0) as u8;
        self.with_alpha(alpha)
    }
}

impl Default for DlColor {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Debug for DlColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DlColor({:#010x})", self.0)
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Porter-Duff and separable/non-separable blend modes.
///
/// The declaration order is also the "strength" order used when tracking the
/// strongest blend mode seen inside a layer: `Clear` is the weakest.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BlendMode {
    /// `r = 0`
    Clear,
    /// `r = s`
    Src,
    /// `r = d`
    Dst,
    /// `r = s + (1-sa)*d`
    #[default]
    SrcOver,
    /// `r = d + (1-da)*s`
    DstOver,
    /// `r = s * da`
    SrcIn,
    /// `r = d * sa`
    DstIn,
    /// `r = s * (1-da)`
    SrcOut,
    /// `r = d * (1-sa)`
    DstOut,
    /// `r = s*da + d*(1-sa)`
    SrcATop,
    /// `r = d*sa + s*(1-da)`
    DstATop,
    /// `r = s*(1-da) + d*(1-sa)`
    Xor,
    /// `r = min(s + d, 1)`
    Plus,
    /// `r = s*d`
    Modulate,
    /// `r = s + d - s*d`
    Screen,
    /// Multiply or screen, depending on destination.
    Overlay,
    /// `r = s + d - max(s*da, d*sa)`
    Darken,
    /// `r = s + d - min(s*da, d*sa)`
    Lighten,
    /// Brighten destination to reflect source.
    ColorDodge,
    /// Darken destination to reflect source.
    ColorBurn,
    /// Multiply or screen, depending on source.
    HardLight,
    /// Lighten or darken, depending on source.
    SoftLight,
    /// Subtract darker from lighter with higher contrast.
    Difference,
    /// Subtract darker from lighter with lower contrast.
    Exclusion,
    /// `r = s*(1-da) + d*(1-sa) + s*d`
    Multiply,
    /// Hue of source with saturation and luminosity of destination.
    Hue,
    /// Saturation of source with hue and luminosity of destination.
    Saturation,
    /// Hue and saturation of source with luminosity of destination.
    Color,
    /// Luminosity of source with hue and saturation of destination.
    Luminosity,
}

impl BlendMode {
    /// Every blend mode in discriminant order.
    pub const ALL: [Self; 29] = [
        Self::Clear,
        Self::Src,
        Self::Dst,
        Self::SrcOver,
        Self::DstOver,
        Self::SrcIn,
        Self::DstIn,
        Self::SrcOut,
        Self::DstOut,
        Self::SrcATop,
        Self::DstATop,
        Self::Xor,
        Self::Plus,
        Self::Modulate,
        Self::Screen,
        Self::Overlay,
        Self::Darken,
        Self::Lighten,
        Self::ColorDodge,
        Self::ColorBurn,
        Self::HardLight,
        Self::SoftLight,
        Self::Difference,
        Self::Exclusion,
        Self::Multiply,
        Self::Hue,
        Self::Saturation,
        Self::Color,
        Self::Luminosity,
    ];

    /// Decodes a stored discriminant.
    #[must_use]
    pub fn from_raw(raw: u32) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }
}

/// How the ends of open strokes are drawn.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StrokeCap {
    /// No extension past the endpoint.
    #[default]
    Butt,
    /// Semicircle past the endpoint.
    Round,
    /// Half-square past the endpoint.
    Square,
}

impl StrokeCap {
    /// Every cap in discriminant order.
    pub const ALL: [Self; 3] = [Self::Butt, Self::Round, Self::Square];

    /// Decodes a stored discriminant.
    #[must_use]
    pub fn from_raw(raw: u32) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }
}

/// How stroke segments are joined.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StrokeJoin {
    /// Sharp corner, limited by the miter limit.
    #[default]
    Miter,
    /// Rounded corner.
    Round,
    /// Flattened corner.
    Bevel,
}

impl StrokeJoin {
    /// Every join in discriminant order.
    pub const ALL: [Self; 3] = [Self::Miter, Self::Round, Self::Bevel];

    /// Decodes a stored discriminant.
    #[must_use]
    pub fn from_raw(raw: u32) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }
}

/// Whether geometry is filled, stroked or both.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DrawStyle {
    /// Fill the interior.
    #[default]
    Fill,
    /// Stroke the outline.
    Stroke,
    /// Fill, then stroke.
    StrokeAndFill,
}

impl DrawStyle {
    /// Every style in discriminant order.
    pub const ALL: [Self; 3] = [Self::Fill, Self::Stroke, Self::StrokeAndFill];

    /// Decodes a stored discriminant.
    #[must_use]
    pub fn from_raw(raw: u32) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }
}

/// How a clip shape combines with the current clip.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ClipOp {
    /// Keep only the area inside the shape.
    #[default]
    Intersect,
    /// Remove the area inside the shape.
    Difference,
}

impl ClipOp {
    /// Every clip op in discriminant order.
    pub const ALL: [Self; 2] = [Self::Intersect, Self::Difference];

    /// Decodes a stored discriminant.
    #[must_use]
    pub fn from_raw(raw: u32) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }
}

/// How a point array is interpreted by `draw_points`.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PointMode {
    /// Each point is drawn on its own.
    #[default]
    Points,
    /// Each pair of points is a line segment.
    Lines,
    /// The points form one open polyline.
    Polygon,
}

impl PointMode {
    /// Every point mode in discriminant order.
    pub const ALL: [Self; 3] = [Self::Points, Self::Lines, Self::Polygon];

    /// Decodes a stored discriminant.
    #[must_use]
    pub fn from_raw(raw: u32) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }
}

/// Sampling used when drawing images.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ImageSampling {
    /// Nearest neighbor.
    #[default]
    Nearest,
    /// Bilinear.
    Linear,
    /// Bilinear with linear mipmap blending.
    MipmapLinear,
    /// Bicubic.
    Cubic,
}

impl ImageSampling {
    /// Every sampling mode in discriminant order.
    pub const ALL: [Self; 4] = [Self::Nearest, Self::Linear, Self::MipmapLinear, Self::Cubic];

    /// Decodes a stored discriminant.
    #[must_use]
    pub fn from_raw(raw: u32) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }
}

/// Filtering used by nine-patch image draws.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FilterMode {
    /// Nearest neighbor.
    #[default]
    Nearest,
    /// Bilinear.
    Linear,
}

impl FilterMode {
    /// Every filter mode in discriminant order.
    pub const ALL: [Self; 2] = [Self::Nearest, Self::Linear];

    /// Decodes a stored discriminant.
    #[must_use]
    pub fn from_raw(raw: u32) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }
}

/// Whether sampling may read outside the source rectangle of an image.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SrcRectConstraint {
    /// Sampling stays inside the source rectangle.
    Strict,
    /// Sampling may bleed outside it.
    #[default]
    Fast,
}

impl SrcRectConstraint {
    /// Every constraint in discriminant order.
    pub const ALL: [Self; 2] = [Self::Strict, Self::Fast];

    /// Decodes a stored discriminant.
    #[must_use]
    pub fn from_raw(raw: u32) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }
}

bitflags! {
    /// Flags recorded on a save layer op.
    ///
    /// `RENDERS_WITH_ATTRIBUTES` and `BOUNDS_FROM_CALLER` are set when the
    /// layer is opened; the rest are back-patched when it is restored.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct SaveLayerOptions: u32 {
        /// The layer is composited with the current paint attributes.
        const RENDERS_WITH_ATTRIBUTES = 1 << 0;
        /// The caller supplied explicit layer bounds.
        const BOUNDS_FROM_CALLER = 1 << 1;
        /// Group opacity may be pushed down onto each child op.
        const CAN_DISTRIBUTE_OPACITY = 1 << 2;
        /// Content extended past the caller's bounds and was clipped.
        const CONTENT_IS_CLIPPED = 1 << 3;
        /// Content floods the clip (its bounds could not be computed).
        const CONTENT_IS_UNBOUNDED = 1 << 4;
        /// Content contains a backdrop filter.
        const CONTAINS_BACKDROP_FILTER = 1 << 5;
    }
}

// ---------------------------------------------------------------------------
// Paint
// ---------------------------------------------------------------------------

/// A snapshot of every paint attribute.
///
/// The builder's `draw_*` methods take a `Paint` and record only the
/// attributes the op actually uses, and only where they differ from the
/// attributes already recorded.
#[derive(Clone, Debug, PartialEq)]
pub struct Paint {
    /// Solid color, also the alpha applied to color sources.
    pub color: DlColor,
    /// Blend mode used to composite the op.
    pub blend_mode: BlendMode,
    /// Fill and/or stroke.
    pub draw_style: DrawStyle,
    /// Stroke width; zero is a hairline.
    pub stroke_width: f64,
    /// Miter limit for `StrokeJoin::Miter`.
    pub stroke_miter: f64,
    /// Cap for open stroke ends.
    pub stroke_cap: StrokeCap,
    /// Join between stroke segments.
    pub stroke_join: StrokeJoin,
    /// Whether edges are anti-aliased.
    pub anti_alias: bool,
    /// Whether colors are inverted after filtering.
    pub invert_colors: bool,
    /// Gradient or image shader replacing the solid color.
    pub color_source: Option<Arc<ColorSource>>,
    /// Per-pixel color transform.
    pub color_filter: Option<Arc<ColorFilter>>,
    /// Filter applied to the rendered result of the op.
    pub image_filter: Option<Arc<ImageFilter>>,
    /// Blur applied to the op's coverage mask.
    pub mask_filter: Option<MaskFilter>,
}

impl Default for Paint {
    fn default() -> Self {
        Self {
            color: DlColor::BLACK,
            blend_mode: BlendMode::SrcOver,
            draw_style: DrawStyle::Fill,
            stroke_width: 0.0,
            stroke_miter: 4.0,
            stroke_cap: StrokeCap::Butt,
            stroke_join: StrokeJoin::Miter,
            anti_alias: false,
            invert_colors: false,
            color_source: None,
            color_filter: None,
            image_filter: None,
            mask_filter: None,
        }
    }
}

impl Paint {
    /// A default paint with the given color.
    #[must_use]
    pub fn with_color(color: DlColor) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }

    /// Sets the blend mode.
    #[must_use]
    pub fn blend_mode(mut self, mode: BlendMode) -> Self {
        self.blend_mode = mode;
        self
    }

    /// Switches to stroking with the given width.
    #[must_use]
    pub fn stroked(mut self, width: f64) -> Self {
        self.draw_style = DrawStyle::Stroke;
        self.stroke_width = width;
        self
    }

    /// Sets the alpha of the color.
    #[must_use]
    pub fn alpha(mut self, alpha: u8) -> Self {
        self.color = self.color.with_alpha(alpha);
        self
    }

    /// Sets the color source.
    #[must_use]
    pub fn color_source(mut self, source: ColorSource) -> Self {
        self.color_source = Some(Arc::new(source));
        self
    }

    /// Sets the color filter.
    #[must_use]
    pub fn color_filter(mut self, filter: ColorFilter) -> Self {
        self.color_filter = Some(Arc::new(filter));
        self
    }

    /// Sets the image filter.
    #[must_use]
    pub fn image_filter(mut self, filter: ImageFilter) -> Self {
        self.image_filter = Some(Arc::new(filter));
        self
    }

    /// Sets the mask filter.
    #[must_use]
    pub fn mask_filter(mut self, filter: MaskFilter) -> Self {
        self.mask_filter = Some(filter);
        self
    }
}
