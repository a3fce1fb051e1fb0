// Copyright 2026 the Tracery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Op types, categories and the record header.
//!
//! Every op in a display list is stored as an 8-byte [`OpHeader`] followed by
//! a fixed-size payload struct and, for a few ops, trailing arrays:
//!
//! ```text
//!   offset ─► ┌──────────┬─────────┬──────────┐
//!             │ op_type  │ padding │   size   │  OpHeader (8 bytes)
//!             ├──────────┴─────────┴──────────┤
//!             │ payload (records.rs)          │
//!             ├───────────────────────────────┤
//!             │ trailing arrays (optional)    │
//!             └───────────────────────────────┘ ◄─ offset + size
//! ```
//!
//! `size` covers all three parts and is rounded up to the arena alignment, so
//! walking by `size` visits every op in order.

pub(crate) mod compare;
pub(crate) mod dispatch;
pub(crate) mod records;

use bytemuck::{Pod, Zeroable};

/// Size in bytes of [`OpHeader`].
pub(crate) const HEADER_SIZE: usize = core::mem::size_of::<OpHeader>();

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct OpHeader {
    pub(crate) op_type: u8,
    pub(crate) pad: [u8; 3],
    pub(crate) size: u32,
}

/// What an op does, as far as culling is concerned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpCategory {
    /// Paint attribute change.
    Attribute,
    /// Transform change.
    Transform,
    /// Clip change.
    Clip,
    /// Plain save.
    Save,
    /// Save that opens a layer.
    SaveLayer,
    /// Restore matching a save or save layer.
    Restore,
    /// Draw call.
    Rendering,
    /// Embedded display list.
    SubDisplayList,
    /// No op at the requested index.
    Invalid,
}

/// The kind of an op record.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[expect(missing_docs, reason = "variant names mirror the receiver methods")]
pub enum OpType {
    SetAntiAlias,
    SetInvertColors,
    SetStrokeCap,
    SetStrokeJoin,
    SetDrawStyle,
    SetStrokeWidth,
    SetStrokeMiter,
    SetColor,
    SetBlendMode,
    SetColorSource,
    ClearColorSource,
    SetColorFilter,
    ClearColorFilter,
    SetImageFilter,
    ClearImageFilter,
    SetMaskFilter,
    ClearMaskFilter,

    Save,
    SaveLayer,
    SaveLayerBackdrop,
    Restore,

    Translate,
    Scale,
    Rotate,
    Skew,
    Transform2DAffine,
    TransformFullPerspective,
    TransformReset,

    ClipRect,
    ClipOval,
    ClipRoundRect,
    ClipPath,

    DrawPaint,
    DrawColor,
    DrawLine,
    DrawDashedLine,
    DrawRect,
    DrawOval,
    DrawCircle,
    DrawRoundRect,
    DrawDiffRoundRect,
    DrawArc,
    DrawPath,
    DrawPoints,
    DrawVertices,
    DrawImage,
    DrawImageRect,
    DrawImageNine,
    DrawAtlas,
    DrawText,
    DrawShadow,

    DrawDisplayList,
}

impl OpType {
    /// Every op type in discriminant order.
    pub const ALL: [Self; 52] = [
        Self::SetAntiAlias,
        Self::SetInvertColors,
        Self::SetStrokeCap,
        Self::SetStrokeJoin,
        Self::SetDrawStyle,
        Self::SetStrokeWidth,
        Self::SetStrokeMiter,
        Self::SetColor,
        Self::SetBlendMode,
        Self::SetColorSource,
        Self::ClearColorSource,
        Self::SetColorFilter,
        Self::ClearColorFilter,
        Self::SetImageFilter,
        Self::ClearImageFilter,
        Self::SetMaskFilter,
        Self::ClearMaskFilter,
        Self::Save,
        Self::SaveLayer,
        Self::SaveLayerBackdrop,
        Self::Restore,
        Self::Translate,
        Self::Scale,
        Self::Rotate,
        Self::Skew,
        Self::Transform2DAffine,
        Self::TransformFullPerspective,
        Self::TransformReset,
        Self::ClipRect,
        Self::ClipOval,
        Self::ClipRoundRect,
        Self::ClipPath,
        Self::DrawPaint,
        Self::DrawColor,
        Self::DrawLine,
        Self::DrawDashedLine,
        Self::DrawRect,
        Self::DrawOval,
        Self::DrawCircle,
        Self::DrawRoundRect,
        Self::DrawDiffRoundRect,
        Self::DrawArc,
        Self::DrawPath,
        Self::DrawPoints,
        Self::DrawVertices,
        Self::DrawImage,
        Self::DrawImageRect,
        Self::DrawImageNine,
        Self::DrawAtlas,
        Self::DrawText,
        Self::DrawShadow,
        Self::DrawDisplayList,
    ];

    /// Decodes a stored tag.
    #[must_use]
    pub fn from_raw(raw: u8) -> Option<Self> {
        Self::ALL.get(usize::from(raw)).copied()
    }

    /// The culling category of this op type.
    #[must_use]
    pub const fn category(self) -> OpCategory {
        match self {
            Self::SetAntiAlias
            | Self::SetInvertColors
            | Self::SetStrokeCap
            | Self::SetStrokeJoin
            | Self::SetDrawStyle
            | Self::SetStrokeWidth
            | Self::SetStrokeMiter
            | Self::SetColor
            | Self::SetBlendMode
            | Self::SetColorSource
            | Self::ClearColorSource
            | Self::SetColorFilter
            | Self::ClearColorFilter
            | Self::SetImageFilter
            | Self::ClearImageFilter
            | Self::SetMaskFilter
            | Self::ClearMaskFilter => OpCategory::Attribute,
            Self::Save => OpCategory::Save,
            Self::SaveLayer | Self::SaveLayerBackdrop => OpCategory::SaveLayer,
            Self::Restore => OpCategory::Restore,
            Self::Translate
            | Self::Scale
            | Self::Rotate
            | Self::Skew
            | Self::Transform2DAffine
            | Self::TransformFullPerspective
            | Self::TransformReset => OpCategory::Transform,
            Self::ClipRect | Self::ClipOval | Self::ClipRoundRect | Self::ClipPath => {
                OpCategory::Clip
            }
            Self::DrawDisplayList => OpCategory::SubDisplayList,
            Self::DrawPaint
            | Self::DrawColor
            | Self::DrawLine
            | Self::DrawDashedLine
            | Self::DrawRect
            | Self::DrawOval
            | Self::DrawCircle
            | Self::DrawRoundRect
            | Self::DrawDiffRoundRect
            | Self::DrawArc
            | Self::DrawPath
            | Self::DrawPoints
            | Self::DrawVertices
            | Self::DrawImage
            | Self::DrawImageRect
            | Self::DrawImageNine
            | Self::DrawAtlas
            | Self::DrawText
            | Self::DrawShadow => OpCategory::Rendering,
        }
    }

    /// Returns `true` if records of this type reference the resource table.
    ///
    /// These records cannot be compared byte for byte alone; equality also
    /// compares the resources they reference.
    #[must_use]
    pub const fn holds_resource(self) -> bool {
        matches!(
            self,
            Self::SetColorSource
                | Self::SetColorFilter
                | Self::SetImageFilter
                | Self::SaveLayerBackdrop
                | Self::ClipPath
                | Self::DrawPath
                | Self::DrawVertices
                | Self::DrawImage
                | Self::DrawImageRect
                | Self::DrawImageNine
                | Self::DrawAtlas
                | Self::DrawText
                | Self::DrawShadow
                | Self::DrawDisplayList
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip() {
        for (i, op) in OpType::ALL.iter().enumerate() {
            assert_eq!(*op as usize, i, "ALL must be in discriminant order");
            assert_eq!(OpType::from_raw(*op as u8), Some(*op));
        }
        assert_eq!(OpType::from_raw(52), None);
    }

    #[test]
    fn categories() {
        assert_eq!(OpType::SetColor.category(), OpCategory::Attribute);
        assert_eq!(OpType::SaveLayerBackdrop.category(), OpCategory::SaveLayer);
        assert_eq!(OpType::TransformReset.category(), OpCategory::Transform);
        assert_eq!(OpType::ClipPath.category(), OpCategory::Clip);
        assert_eq!(OpType::DrawShadow.category(), OpCategory::Rendering);
        assert_eq!(OpType::DrawDisplayList.category(), OpCategory::SubDisplayList);
    }

    #[test]
    fn header_is_eight_bytes() {
        assert_eq!(HEADER_SIZE, 8);
    }
}
