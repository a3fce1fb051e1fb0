// Copyright 2026 the Tracery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Color sources, color filters, image filters and mask filters.
//!
//! These are value types: the recording engine never runs them. What it
//! needs from them is answered here. That covers whether they can turn
//! transparent pixels visible, whether their output is opaque, and how they
//! move bounds. Bounds mapping returns `None` when the output cannot be
//! bounded, which the builder treats as "floods the clip".

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Affine, Point, Rect};

use crate::matrix::Matrix;
use crate::paint::{BlendMode, DlColor, ImageSampling};
use crate::resource::DlImage;

/// Edge behavior for gradients, image shaders and blurs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TileMode {
    /// Repeat the edge color.
    #[default]
    Clamp,
    /// Repeat the content.
    Repeat,
    /// Repeat the content, mirrored.
    Mirror,
    /// Transparent outside the content.
    Decal,
}

// ---------------------------------------------------------------------------
// Color sources
// ---------------------------------------------------------------------------

/// A shader that replaces the paint's solid color.
#[derive(Clone)]
pub enum ColorSource {
    /// Linear gradient between two points.
    LinearGradient {
        /// Start point.
        start: Point,
        /// End point.
        end: Point,
        /// Stop colors.
        colors: Vec<DlColor>,
        /// Stop offsets in `0..=1`, or empty for evenly spaced stops.
        stops: Vec<f64>,
        /// Behavior outside the gradient.
        tile_mode: TileMode,
    },
    /// Radial gradient around a center.
    RadialGradient {
        /// Center.
        center: Point,
        /// Radius.
        radius: f64,
        /// Stop colors.
        colors: Vec<DlColor>,
        /// Stop offsets in `0..=1`, or empty for evenly spaced stops.
        stops: Vec<f64>,
        /// Behavior outside the gradient.
        tile_mode: TileMode,
    },
    /// Sweep gradient around a center.
    SweepGradient {
        /// Center.
        center: Point,
        /// Start angle in degrees.
        start_degrees: f64,
        /// End angle in degrees.
        end_degrees: f64,
        /// Stop colors.
        colors: Vec<DlColor>,
        /// Stop offsets in `0..=1`, or empty for evenly spaced stops.
        stops: Vec<f64>,
        /// Behavior outside the sweep.
        tile_mode: TileMode,
    },
    /// Image shader.
    Image {
        /// The sampled image.
        image: Arc<dyn DlImage>,
        /// Horizontal tiling.
        horizontal: TileMode,
        /// Vertical tiling.
        vertical: TileMode,
        /// Sampling.
        sampling: ImageSampling,
        /// Local matrix applied to the image.
        matrix: Affine,
    },
}

impl ColorSource {
    /// Returns `true` if every pixel the source produces is opaque.
    #[must_use]
    pub fn is_opaque(&self) -> bool {
        match self {
            Self::LinearGradient {
                colors, tile_mode, ..
            }
            | Self::RadialGradient {
                colors, tile_mode, ..
            }
            | Self::SweepGradient {
                colors, tile_mode, ..
            } => *tile_mode != TileMode::Decal && colors.iter().all(|c| c.is_opaque()),
            Self::Image {
                image,
                horizontal,
                vertical,
                ..
            } => {
                image.is_opaque()
                    && *horizontal != TileMode::Decal
                    && *vertical != TileMode::Decal
            }
        }
    }

    /// Returns `false` if the source samples a thread-bound image.
    #[must_use]
    pub fn is_ui_thread_safe(&self) -> bool {
        match self {
            Self::Image { image, .. } => image.is_ui_thread_safe(),
            _ => true,
        }
    }
}

impl PartialEq for ColorSource {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::LinearGradient {
                    start: s0,
                    end: e0,
                    colors: c0,
                    stops: t0,
                    tile_mode: m0,
                },
                Self::LinearGradient {
                    start: s1,
                    end: e1,
                    colors: c1,
                    stops: t1,
                    tile_mode: m1,
                },
            ) => s0 == s1 && e0 == e1 && c0 == c1 && t0 == t1 && m0 == m1,
            (
                Self::RadialGradient {
                    center: p0,
                    radius: r0,
                    colors: c0,
                    stops: t0,
                    tile_mode: m0,
                },
                Self::RadialGradient {
                    center: p1,
                    radius: r1,
                    colors: c1,
                    stops: t1,
                    tile_mode: m1,
                },
            ) => p0 == p1 && r0 == r1 && c0 == c1 && t0 == t1 && m0 == m1,
            (
                Self::SweepGradient {
                    center: p0,
                    start_degrees: a0,
                    end_degrees: b0,
                    colors: c0,
                    stops: t0,
                    tile_mode: m0,
                },
                Self::SweepGradient {
                    center: p1,
                    start_degrees: a1,
                    end_degrees: b1,
                    colors: c1,
                    stops: t1,
                    tile_mode: m1,
                },
            ) => p0 == p1 && a0 == a1 && b0 == b1 && c0 == c1 && t0 == t1 && m0 == m1,
            (
                Self::Image {
                    image: i0,
                    horizontal: h0,
                    vertical: v0,
                    sampling: s0,
                    matrix: x0,
                },
                Self::Image {
                    image: i1,
                    horizontal: h1,
                    vertical: v1,
                    sampling: s1,
                    matrix: x1,
                },
            ) => Arc::ptr_eq(i0, i1) && h0 == h1 && v0 == v1 && s0 == s1 && x0 == x1,
            _ => false,
        }
    }
}

impl fmt::Debug for ColorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LinearGradient { start, end, colors, .. } => f
                .debug_struct("LinearGradient")
                .field("start", start)
                .field("end", end)
                .field("stops", &colors.len())
                .finish_non_exhaustive(),
            Self::RadialGradient { center, radius, colors, .. } => f
                .debug_struct("RadialGradient")
                .field("center", center)
                .field("radius", radius)
                .field("stops", &colors.len())
                .finish_non_exhaustive(),
            Self::SweepGradient { center, colors, .. } => f
                .debug_struct("SweepGradient")
                .field("center", center)
                .field("stops", &colors.len())
                .finish_non_exhaustive(),
            Self::Image { image, sampling, .. } => f
                .debug_struct("ImageShader")
                .field("image", image)
                .field("sampling", sampling)
                .finish_non_exhaustive(),
        }
    }
}

// ---------------------------------------------------------------------------
// Color filters
// ---------------------------------------------------------------------------

/// A per-pixel color transform.
#[derive(Clone, Debug, PartialEq)]
pub enum ColorFilter {
    /// Blends a constant color over each pixel with the given mode.
    Blend {
        /// The constant source color.
        color: DlColor,
        /// How it is blended onto the pixel.
        mode: BlendMode,
    },
    /// A 4×5 row-major matrix on unpremultiplied RGBA in `0..=1`.
    Matrix([f64; 20]),
    /// sRGB to linear gamma conversion.
    SrgbToLinearGamma,
    /// Linear to sRGB gamma conversion.
    LinearToSrgbGamma,
}

impl ColorFilter {
    /// Returns `true` if a fully transparent pixel can come out visible.
    #[must_use]
    pub fn modifies_transparent_black(&self) -> bool {
        match self {
            Self::Blend { color, mode } => {
                !color.is_transparent()
                    && !matches!(
                        mode,
                        BlendMode::Clear
                            | BlendMode::Dst
                            | BlendMode::SrcIn
                            | BlendMode::DstIn
                            | BlendMode::DstOut
                            | BlendMode::SrcATop
                            | BlendMode::Modulate
                    )
            }
            Self::Matrix(m) => m[4] != 0.0 || m[9] != 0.0 || m[14] != 0.0 || m[19] != 0.0,
            Self::SrgbToLinearGamma | Self::LinearToSrgbGamma => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Image filters
// ---------------------------------------------------------------------------

/// A filter applied to the rendered output of an op or a layer.
#[derive(Clone, Debug, PartialEq)]
pub enum ImageFilter {
    /// Gaussian blur.
    Blur {
        /// Horizontal standard deviation.
        sigma_x: f64,
        /// Vertical standard deviation.
        sigma_y: f64,
        /// Edge handling.
        tile_mode: TileMode,
    },
    /// Morphological dilation.
    Dilate {
        /// Horizontal radius.
        radius_x: f64,
        /// Vertical radius.
        radius_y: f64,
    },
    /// Morphological erosion.
    Erode {
        /// Horizontal radius.
        radius_x: f64,
        /// Vertical radius.
        radius_y: f64,
    },
    /// Transforms the content.
    Matrix {
        /// The transform, in the local coordinates of the filtered content.
        transform: Affine,
        /// Sampling.
        sampling: ImageSampling,
    },
    /// Applies `inner`, then `outer`.
    Compose {
        /// Applied second.
        outer: Arc<ImageFilter>,
        /// Applied first.
        inner: Arc<ImageFilter>,
    },
    /// Runs a color filter over the content.
    ColorFilter(Arc<ColorFilter>),
    /// Runs `filter` in a coordinate system transformed by `matrix`.
    LocalMatrix {
        /// Local transform.
        matrix: Affine,
        /// The wrapped filter.
        filter: Arc<ImageFilter>,
    },
}

impl ImageFilter {
    /// A blur with clamp edges.
    #[must_use]
    pub fn blur(sigma_x: f64, sigma_y: f64) -> Self {
        Self::Blur {
            sigma_x,
            sigma_y,
            tile_mode: TileMode::Clamp,
        }
    }

    /// Returns `true` if transparent input can produce visible output.
    #[must_use]
    pub fn modifies_transparent_black(&self) -> bool {
        match self {
            Self::ColorFilter(cf) => cf.modifies_transparent_black(),
            Self::Compose { outer, inner } => {
                inner.modifies_transparent_black() || outer.modifies_transparent_black()
            }
            Self::LocalMatrix { filter, .. } => filter.modifies_transparent_black(),
            Self::Blur { .. } | Self::Dilate { .. } | Self::Erode { .. } | Self::Matrix { .. } => {
                false
            }
        }
    }

    /// Output bounds for content covering `input`, in the same local space.
    ///
    /// Returns `None` if the output cannot be bounded.
    #[must_use]
    pub fn map_local_bounds(&self, input: Rect) -> Option<Rect> {
        match self {
            Self::Blur { sigma_x, sigma_y, .. } => {
                Some(input.inflate(3.0 * sigma_x.abs(), 3.0 * sigma_y.abs()))
            }
            Self::Dilate { radius_x, radius_y } => {
                Some(input.inflate(radius_x.abs(), radius_y.abs()))
            }
            Self::Erode { radius_x, radius_y } => {
                let r = input.inflate(-radius_x.abs(), -radius_y.abs());
                Some(if r.x0 < r.x1 && r.y0 < r.y1 { r } else { Rect::ZERO })
            }
            Self::Matrix { transform, .. } => Some(transform.transform_rect_bbox(input)),
            Self::Compose { outer, inner } => outer.map_local_bounds(inner.map_local_bounds(input)?),
            Self::ColorFilter(cf) => (!cf.modifies_transparent_black()).then_some(input),
            Self::LocalMatrix { matrix, filter } => {
                if matrix.determinant() == 0.0 {
                    return None;
                }
                let local = matrix.inverse().transform_rect_bbox(input);
                Some(matrix.transform_rect_bbox(filter.map_local_bounds(local)?))
            }
        }
    }

    /// Output bounds in device space for content covering `input` (device
    /// space) drawn under `ctm`.
    ///
    /// Returns `None` if the output cannot be bounded.
    #[must_use]
    pub fn map_device_bounds(&self, input: Rect, ctm: &Matrix) -> Option<Rect> {
        match self {
            Self::Blur { sigma_x, sigma_y, .. } => {
                let (dx, dy) = device_outset(ctm, 3.0 * sigma_x.abs(), 3.0 * sigma_y.abs())?;
                Some(input.inflate(dx, dy))
            }
            Self::Dilate { radius_x, radius_y } => {
                let (dx, dy) = device_outset(ctm, radius_x.abs(), radius_y.abs())?;
                Some(input.inflate(dx, dy))
            }
            Self::Erode { .. } => {
                // Shrinking never escapes the input.
                Some(input)
            }
            Self::Matrix { transform, .. } => {
                let inverse = ctm.inverse()?;
                let local = inverse.map_rect(input)?;
                ctm.map_rect(transform.transform_rect_bbox(local))
            }
            Self::Compose { outer, inner } => {
                outer.map_device_bounds(inner.map_device_bounds(input, ctm)?, ctm)
            }
            Self::ColorFilter(cf) => (!cf.modifies_transparent_black()).then_some(input),
            Self::LocalMatrix { matrix, filter } => {
                filter.map_device_bounds(input, &(*ctm * Matrix::from_affine(*matrix)))
            }
        }
    }

    /// Device-space region of input that can contribute to `output` when the
    /// filter runs under `ctm`.
    ///
    /// Returns `None` if the region cannot be bounded.
    #[must_use]
    pub fn map_input_device_bounds(&self, output: Rect, ctm: &Matrix) -> Option<Rect> {
        match self {
            Self::Blur { sigma_x, sigma_y, .. } => {
                let (dx, dy) = device_outset(ctm, 3.0 * sigma_x.abs(), 3.0 * sigma_y.abs())?;
                Some(output.inflate(dx, dy))
            }
            Self::Dilate { radius_x, radius_y } | Self::Erode { radius_x, radius_y } => {
                let (dx, dy) = device_outset(ctm, radius_x.abs(), radius_y.abs())?;
                Some(output.inflate(dx, dy))
            }
            Self::Matrix { transform, .. } => {
                if transform.determinant() == 0.0 {
                    return None;
                }
                let local = ctm.inverse()?.map_rect(output)?;
                ctm.map_rect(transform.inverse().transform_rect_bbox(local))
            }
            Self::Compose { outer, inner } => {
                inner.map_input_device_bounds(outer.map_input_device_bounds(output, ctm)?, ctm)
            }
            Self::ColorFilter(_) => Some(output),
            Self::LocalMatrix { matrix, filter } => {
                filter.map_input_device_bounds(output, &(*ctm * Matrix::from_affine(*matrix)))
            }
        }
    }
}

/// Device-space outset of a local `(dx, dy)` outset under the 2-D part of
/// `ctm`. Perspective transforms cannot be bounded this way.
fn device_outset(ctm: &Matrix, dx: f64, dy: f64) -> Option<(f64, f64)> {
    if ctm.has_perspective() {
        return None;
    }
    let c = &ctm.cols;
    Some((
        c[0][0].abs() * dx + c[1][0].abs() * dy,
        c[0][1].abs() * dx + c[1][1].abs() * dy,
    ))
}

// ---------------------------------------------------------------------------
// Mask filters
// ---------------------------------------------------------------------------

/// How a blur mask filter treats the inside and outside of the shape.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlurStyle {
    /// Blur inside and outside.
    #[default]
    Normal,
    /// Solid inside, blurred outside.
    Solid,
    /// Nothing inside, blurred outside.
    Outer,
    /// Blurred inside, nothing outside.
    Inner,
}

impl BlurStyle {
    /// Every style in discriminant order.
    pub const ALL: [Self; 4] = [Self::Normal, Self::Solid, Self::Outer, Self::Inner];

    /// Decodes a stored discriminant.
    #[must_use]
    pub fn from_raw(raw: u32) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }
}

/// A blur applied to an op's coverage mask.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaskFilter {
    /// Blur style.
    pub style: BlurStyle,
    /// Standard deviation.
    pub sigma: f64,
    /// Whether `sigma` is scaled by the current transform.
    pub respect_ctm: bool,
}

impl MaskFilter {
    /// A normal blur that respects the transform.
    #[must_use]
    pub const fn blur(sigma: f64) -> Self {
        Self {
            style: BlurStyle::Normal,
            sigma,
            respect_ctm: true,
        }
    }

    /// How far the blur can spread coverage past the shape.
    #[must_use]
    pub fn outset(&self) -> f64 {
        match self.style {
            BlurStyle::Inner => 0.0,
            _ => 3.0 * self.sigma.abs(),
        }
    }
}
