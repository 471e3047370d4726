// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Text shaping
//!
//! To quote the HarfBuzz manual:
//!
//! > Text shaping is the process of translating a string of character codes
//! > (such as Unicode codepoints) into a properly arranged sequence of glyphs
//! > that can be rendered onto a screen or into final output form for
//! > inclusion in a document.
//!
//! The shaping backend is the [`Shaper`] trait; [`RustybuzzShaper`] is the
//! built-in implementation. A custom backend may be supplied with
//! [`crate::Text::with_shaper`], e.g. to drive a system shaping library or to
//! provide a deterministic mock in tests.
//!
//! This module *does not* perform line-breaking, wrapping or text reversal.

use crate::data::{Range, RunDirection};
use crate::fonts::Face;
use unicode_script::Script;

pub use rustybuzz::{Feature, Language};
pub use ttf_parser::Tag;

/// A glyph as returned by a shaping backend
///
/// Advances and offsets are in unscaled font units. `cluster` is the UTF-32
/// index of the first character the glyph derives from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShapedGlyph {
    /// Glyph id in the font
    pub glyph_id: u32,
    /// UTF-32 index of the source character
    pub cluster: u32,
    pub x_advance: i32,
    pub y_advance: i32,
    pub x_offset: i32,
    pub y_offset: i32,
}

/// One run of text submitted to a [`Shaper`]
///
/// `range` selects the run within the full `text`; clusters of the returned
/// glyphs must be UTF-32 indices into `text` (i.e. within `range`).
#[derive(Clone, Copy, Debug)]
pub struct ShapeRequest<'a> {
    /// The full paragraph, UTF-32
    pub text: &'a [char],
    /// The run to shape
    pub range: Range,
    pub direction: RunDirection,
    pub script: Script,
    /// Language tag for the run, if one was assigned
    pub language: Option<&'a Language>,
    /// Font features enabled for the layout
    pub features: &'a [Feature],
    pub face: &'a Face,
}

/// A shaping backend
///
/// Implementations convert one run of text into glyphs with advances and
/// offsets. Returning an empty vector for a non-empty run is permitted and is
/// treated as "no glyphs for this run" by the layout.
pub trait Shaper {
    fn shape(&self, request: &ShapeRequest) -> Vec<ShapedGlyph>;
}

/// The built-in shaping backend, driving `rustybuzz`
///
/// Faces without font data (see [`Face::from_metrics`]) yield no glyphs.
#[derive(Clone, Copy, Debug, Default)]
pub struct RustybuzzShaper;

impl Shaper for RustybuzzShaper {
    fn shape(&self, request: &ShapeRequest) -> Vec<ShapedGlyph> {
        let Some((data, index)) = request.face.data() else {
            return vec![];
        };
        let Some(face) = rustybuzz::Face::from_slice(data, index) else {
            return vec![];
        };

        let mut buffer = rustybuzz::UnicodeBuffer::new();
        // Each character carries its UTF-32 index so that output clusters
        // refer to the full paragraph, not the run.
        for i in request.range.to_std() {
            buffer.add(request.text[i], crate::conv::to_u32(i));
        }
        buffer.set_direction(match request.direction {
            RunDirection::Ltr => rustybuzz::Direction::LeftToRight,
            RunDirection::Rtl => rustybuzz::Direction::RightToLeft,
            RunDirection::Ttb => rustybuzz::Direction::TopToBottom,
        });
        if let Some(script) = to_rustybuzz_script(request.script) {
            buffer.set_script(script);
        }
        if let Some(language) = request.language {
            buffer.set_language(language.clone());
        }

        let output = rustybuzz::shape(&face, request.features, buffer);

        output
            .glyph_infos()
            .iter()
            .zip(output.glyph_positions().iter())
            .map(|(info, pos)| ShapedGlyph {
                glyph_id: info.glyph_id,
                cluster: info.cluster,
                x_advance: pos.x_advance,
                y_advance: pos.y_advance,
                x_offset: pos.x_offset,
                y_offset: pos.y_offset,
            })
            .collect()
    }
}

/// Map a resolved script to the shaper's script type via its ISO 15924 tag
fn to_rustybuzz_script(script: Script) -> Option<rustybuzz::Script> {
    let name = script.short_name().as_bytes();
    if name.len() != 4 {
        return None;
    }
    let tag = ttf_parser::Tag::from_bytes(&[name[0], name[1], name[2], name[3]]);
    rustybuzz::Script::from_iso15924_tag(tag)
}

/// Whether `c` has the Default_Ignorable_Code_Point property
///
/// Covers the ranges relevant to text layout (format controls, joiners,
/// variation selectors, fillers). Glyphs for these characters are replaced
/// when an invisible glyph is configured.
pub(crate) fn is_default_ignorable(c: char) -> bool {
    matches!(u32::from(c),
        0x00AD
        | 0x034F
        | 0x061C
        | 0x115F..=0x1160
        | 0x17B4..=0x17B5
        | 0x180B..=0x180F
        | 0x200B..=0x200F
        | 0x202A..=0x202E
        | 0x2060..=0x206F
        | 0x3164
        | 0xFE00..=0xFE0F
        | 0xFEFF
        | 0xFFA0
        | 0xFFF0..=0xFFF8
        | 0x1BCA0..=0x1BCA3
        | 0x1D173..=0x1D17A
        | 0xE0000..=0xE0FFF)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn script_tags_map() {
        assert!(to_rustybuzz_script(Script::Latin).is_some());
        assert!(to_rustybuzz_script(Script::Arabic).is_some());
        assert!(to_rustybuzz_script(Script::Han).is_some());
        assert_ne!(
            to_rustybuzz_script(Script::Latin),
            to_rustybuzz_script(Script::Arabic)
        );
    }

    #[test]
    fn default_ignorables() {
        assert!(is_default_ignorable('\u{200D}')); // zero-width joiner
        assert!(is_default_ignorable('\u{FEFF}'));
        assert!(!is_default_ignorable('a'));
        assert!(!is_default_ignorable(' '));
    }

    #[test]
    fn feature_strings() {
        use std::str::FromStr;
        assert!(Feature::from_str("-liga").is_ok());
        assert!(Feature::from_str("+kern").is_ok());
        assert!(Feature::from_str("dlig=1").is_ok());
        assert!(Feature::from_str("smcp[3:5]=1").is_ok());
        assert!(Feature::from_str("").is_err());
    }
}
