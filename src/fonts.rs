// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Font face types
//!
//! A [`Face`] wraps shared font data together with the design-space metrics
//! the layout needs (all values are in unscaled font units). Faces are
//! assigned to character ranges by the caller; this library performs no font
//! matching or fallback.

use std::sync::Arc;

/// Identifies a font face assigned to this layout
///
/// The id indexes the layout's face list (see [`crate::Text::face`]) and is
/// only meaningful for the layout that produced it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FaceId(pub u32);

/// Design-space metrics of a font face
///
/// All fields are in font units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceMetrics {
    /// Units per em square
    pub units_per_em: u16,
    /// Typographic ascender (positive, above the baseline)
    pub ascender: i16,
    /// Typographic descender (negative, below the baseline)
    pub descender: i16,
    /// Additional gap between lines
    pub line_gap: i16,
}

impl FaceMetrics {
    /// Height of a line of text: `ascender + |descender|`
    #[inline]
    pub fn height(&self) -> i32 {
        i32::from(self.ascender) - i32::from(self.descender)
    }
}

#[derive(Debug)]
struct FaceData {
    /// Raw font file data plus the face index within it, when available.
    /// Metrics-only faces (for custom shaping backends) have no data.
    data: Option<(Arc<Vec<u8>>, u32)>,
    metrics: FaceMetrics,
}

/// A font face shared between the caller and the layout
///
/// Cloning a `Face` clones a shared reference (the font data is reference
/// counted); the layout keeps its references until it is dropped or the text
/// is replaced.
#[derive(Clone, Debug)]
pub struct Face(Arc<FaceData>);

/// Error type returned when font data cannot be parsed
#[derive(Clone, Debug, thiserror::Error)]
#[error("failed to parse font face")]
pub struct InvalidFontData;

impl Face {
    /// Construct from font file data
    ///
    /// `index` selects a face within a font collection; use 0 for ordinary
    /// font files. The data is parsed once to extract metrics.
    pub fn from_data(data: Arc<Vec<u8>>, index: u32) -> Result<Self, InvalidFontData> {
        let face = ttf_parser::Face::parse(&data, index).map_err(|_| InvalidFontData)?;
        let metrics = FaceMetrics {
            units_per_em: face.units_per_em(),
            ascender: face.ascender(),
            descender: face.descender(),
            line_gap: face.line_gap(),
        };
        drop(face);
        Ok(Face(Arc::new(FaceData {
            data: Some((data, index)),
            metrics,
        })))
    }

    /// Construct from owned font file data
    pub fn from_vec(data: Vec<u8>, index: u32) -> Result<Self, InvalidFontData> {
        Self::from_data(Arc::new(data), index)
    }

    /// Construct a metrics-only face
    ///
    /// Such a face carries no font data and cannot be shaped by the built-in
    /// backend; it exists for callers which supply their own
    /// [`Shaper`](crate::shaper::Shaper) implementation.
    pub fn from_metrics(metrics: FaceMetrics) -> Self {
        Face(Arc::new(FaceData {
            data: None,
            metrics,
        }))
    }

    /// Access the face metrics
    #[inline]
    pub fn metrics(&self) -> &FaceMetrics {
        &self.0.metrics
    }

    /// Access the raw font data and face index, when available
    #[inline]
    pub fn data(&self) -> Option<(&[u8], u32)> {
        self.0.data.as_ref().map(|(d, i)| (d.as_slice(), *i))
    }

    /// Whether `self` and `other` share the same underlying face
    #[inline]
    pub(crate) fn same(&self, other: &Face) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn metrics() -> FaceMetrics {
        FaceMetrics {
            units_per_em: 1000,
            ascender: 800,
            descender: -200,
            line_gap: 0,
        }
    }

    #[test]
    fn height_is_ascender_minus_descender() {
        assert_eq!(metrics().height(), 1000);
    }

    #[test]
    fn metrics_only_face_has_no_data() {
        let face = Face::from_metrics(metrics());
        assert!(face.data().is_none());
        assert_eq!(face.metrics().units_per_em, 1000);
        assert!(face.same(&face.clone()));
        assert!(!face.same(&Face::from_metrics(metrics())));
    }
}
