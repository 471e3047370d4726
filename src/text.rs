// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Text layout object

use crate::conv::{to_u32, to_usize};
use crate::data::{Alignment, Direction};
use crate::display::{Glyph, RunInfo, Source, TextDisplay};
use crate::fonts::{Face, FaceId};
use crate::shaper::{Feature, Language, RustybuzzShaper, Shaper};

/// Error type of the layout operations
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Layout requires non-empty text
    #[error("no text set")]
    NoText,
    /// A range setter was called with an out-of-range or empty range
    #[error("invalid range {start}+{count} for text length {len}")]
    InvalidRange {
        start: usize,
        count: usize,
        /// Text length in the caller's encoding
        len: usize,
    },
    /// Layout requires a face for every code point
    #[error("no font face assigned at index {0}")]
    MissingFace(usize),
    /// The feature string does not follow the shaper's syntax
    #[error("invalid font feature string: {0:?}")]
    InvalidFeature(String),
    /// The language tag could not be parsed
    #[error("invalid language tag: {0:?}")]
    InvalidLanguage(String),
}

/// Text layout object (one paragraph)
///
/// Holds one run of text, its per-range attributes and the laid-out result.
/// Typical usage:
///
/// ```no_run
/// use rasm_text::{Face, Text};
/// # fn load() -> Vec<u8> { vec![] }
///
/// let face = Face::from_vec(load(), 0).unwrap();
/// let mut text = Text::new();
/// text.set_text("مرحبا World");
/// text.set_font_range(&face, 0, text.text().len()).unwrap();
/// text.layout().unwrap();
/// for glyph in text.glyphs() {
///     // draw glyph.index at (glyph.x_position, glyph.y_position)
/// }
/// ```
///
/// Setters may be called in any order, except that the text must be set
/// before any per-range attribute (ranges are validated against the text
/// length). [`Text::layout`] consumes the current configuration; glyphs and
/// positions are then available until the next `layout` or until the text is
/// replaced.
///
/// Range indices are in the caller's encoding: byte offsets after
/// [`Text::set_text`], code point indices after [`Text::set_text_utf32`].
/// Glyph clusters and cursor indices are reported in the same encoding.
pub struct Text {
    /// UTF-8 form of the text (always maintained)
    text: String,
    /// UTF-32 form of the text
    chars: Vec<char>,
    /// UTF-32 index → byte offset; one extra entry holds `text.len()`
    byte_of: Vec<u32>,
    report_utf8: bool,

    direction: Direction,
    faces: Vec<Face>,
    face_of: Vec<Option<u32>>,
    languages: Vec<Language>,
    language_of: Vec<Option<u16>>,
    letter_spacing: Vec<i32>,
    word_spacing: Vec<i32>,
    features: Vec<Feature>,
    invisible_glyph: Option<u32>,
    line_width: Option<i32>,
    alignment: Alignment,

    shaper: Box<dyn Shaper>,
    display: TextDisplay,
    laid_out: bool,
}

impl Default for Text {
    fn default() -> Self {
        Text::new()
    }
}

impl Text {
    /// Construct an empty layout using the built-in shaping backend
    pub fn new() -> Self {
        Self::with_shaper(Box::new(RustybuzzShaper))
    }

    /// Construct an empty layout with a custom shaping backend
    pub fn with_shaper(shaper: Box<dyn Shaper>) -> Self {
        Text {
            text: String::new(),
            chars: vec![],
            byte_of: vec![0],
            report_utf8: true,
            direction: Direction::default(),
            faces: vec![],
            face_of: vec![],
            languages: vec![],
            language_of: vec![],
            letter_spacing: vec![],
            word_spacing: vec![],
            features: vec![],
            invisible_glyph: None,
            line_width: None,
            alignment: Alignment::default(),
            shaper,
            display: TextDisplay::default(),
            laid_out: false,
        }
    }

    /// Set the text from UTF-8
    ///
    /// Glyph clusters, cursor indices and attribute ranges are interpreted as
    /// byte offsets into `text`. Per-range attributes and previous layout
    /// results are reset; the paragraph direction, feature list and wrap
    /// configuration are kept.
    pub fn set_text(&mut self, text: &str) {
        self.store_text(text.chars().collect(), true);
    }

    /// Set the text from UTF-32 code points
    ///
    /// Invalid scalar values are replaced with U+FFFD. Glyph clusters, cursor
    /// indices and attribute ranges are code point indices.
    pub fn set_text_utf32(&mut self, text: &[u32]) {
        let chars = text
            .iter()
            .map(|&u| char::from_u32(u).unwrap_or('\u{FFFD}'))
            .collect();
        self.store_text(chars, false);
    }

    fn store_text(&mut self, chars: Vec<char>, report_utf8: bool) {
        let n = chars.len();
        self.text = chars.iter().collect();
        self.byte_of = Vec::with_capacity(n + 1);
        let mut byte = 0u32;
        for c in &chars {
            self.byte_of.push(byte);
            byte += to_u32(c.len_utf8());
        }
        self.byte_of.push(byte);
        self.chars = chars;
        self.report_utf8 = report_utf8;

        self.faces.clear();
        self.face_of = vec![None; n];
        self.languages.clear();
        self.language_of = vec![None; n];
        self.letter_spacing = vec![0; n];
        self.word_spacing = vec![0; n];
        self.display.clear();
        self.laid_out = false;
    }

    /// Access the text, UTF-8
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Set the base paragraph direction
    #[inline]
    pub fn set_par_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    /// Assign a font face to a character range
    ///
    /// Overwrites earlier assignments for the covered range; it is the
    /// caller's responsibility to cover the whole text before layout. The
    /// layout holds a reference to the face until the text is replaced.
    pub fn set_font_range(&mut self, face: &Face, start: usize, count: usize) -> Result<(), Error> {
        let range = self.char_range(start, count)?;
        let id = match self.faces.iter().position(|f| f.same(face)) {
            Some(i) => to_u32(i),
            None => {
                self.faces.push(face.clone());
                to_u32(self.faces.len() - 1)
            }
        };
        for i in range {
            self.face_of[i] = Some(id);
        }
        Ok(())
    }

    /// Assign a language to a character range
    ///
    /// `language` is a BCP 47 tag, e.g. `"en"` or `"ar-SA"`.
    pub fn set_language(&mut self, language: &str, start: usize, count: usize) -> Result<(), Error> {
        let parsed: Language = language
            .parse()
            .map_err(|_| Error::InvalidLanguage(language.into()))?;
        let range = self.char_range(start, count)?;
        let id = match self.languages.iter().position(|l| *l == parsed) {
            Some(i) => i as u16,
            None => {
                self.languages.push(parsed);
                (self.languages.len() - 1) as u16
            }
        };
        for i in range {
            self.language_of[i] = Some(id);
        }
        Ok(())
    }

    /// Append a font feature
    ///
    /// The string follows the shaper's convention: `+liga`, `-liga`,
    /// `kern=0`, optionally with a `[start:end]` range suffix. Features apply
    /// to the whole text.
    pub fn add_font_feature(&mut self, feature: &str) -> Result<(), Error> {
        let parsed: Feature = feature
            .parse()
            .map_err(|_| Error::InvalidFeature(feature.into()))?;
        self.features.push(parsed);
        Ok(())
    }

    /// Add `units` to the advance of every glyph in the range
    pub fn set_letter_spacing_range(
        &mut self,
        units: i32,
        start: usize,
        count: usize,
    ) -> Result<(), Error> {
        let range = self.char_range(start, count)?;
        for i in range {
            self.letter_spacing[i] = units;
        }
        Ok(())
    }

    /// Add `units` to the advance of whitespace glyphs in the range
    pub fn set_word_spacing_range(
        &mut self,
        units: i32,
        start: usize,
        count: usize,
    ) -> Result<(), Error> {
        let range = self.char_range(start, count)?;
        for i in range {
            self.word_spacing[i] = units;
        }
        Ok(())
    }

    /// Set the wrap width, in font units
    ///
    /// A width of zero or less disables wrapping (the default); explicit line
    /// breaks still apply.
    #[inline]
    pub fn set_line_width(&mut self, width: i32) {
        self.line_width = (width > 0).then_some(width);
    }

    /// Set the horizontal alignment of lines
    #[inline]
    pub fn set_alignment(&mut self, alignment: Alignment) {
        self.alignment = alignment;
    }

    /// Substitute `glyph` for default-ignorable code points
    ///
    /// Zero restores the default (the glyphs the shaper produced).
    #[inline]
    pub fn set_invisible_glyph(&mut self, glyph: u32) {
        self.invisible_glyph = (glyph != 0).then_some(glyph);
    }

    /// Lay the text out
    ///
    /// Applies the bidirectional algorithm, resolves scripts, itemizes,
    /// shapes, breaks lines and positions glyphs. May be called repeatedly;
    /// each call rebuilds the result from the current configuration.
    ///
    /// Fails if no text is set or if any code point has no assigned face; on
    /// failure previous results are cleared.
    pub fn layout(&mut self) -> Result<(), Error> {
        self.display.clear();
        self.laid_out = false;

        if self.chars.is_empty() {
            return Err(Error::NoText);
        }
        let mut face_of = Vec::with_capacity(self.chars.len());
        for (i, id) in self.face_of.iter().enumerate() {
            match id {
                Some(id) => face_of.push(*id),
                None => return Err(Error::MissingFace(self.report_index(i))),
            }
        }

        let source = Source {
            text: &self.text,
            chars: &self.chars,
            byte_of: &self.byte_of,
            report_utf8: self.report_utf8,
            direction: self.direction,
            faces: &self.faces,
            face_of: &face_of,
            languages: &self.languages,
            language_of: &self.language_of,
            letter_spacing: &self.letter_spacing,
            word_spacing: &self.word_spacing,
            features: &self.features,
            invisible_glyph: self.invisible_glyph,
            line_width: self.line_width,
            alignment: self.alignment,
        };
        self.display.prepare_runs(&source, self.shaper.as_ref());
        self.display.prepare_lines(&source);

        // Internally clusters are UTF-32; report them in the caller's
        // encoding.
        if self.report_utf8 {
            for glyph in &mut self.display.glyphs {
                glyph.cluster = self.byte_of[to_usize(glyph.cluster)];
            }
            for run in &mut self.display.runs {
                run.range.start = self.byte_of[run.range.start()];
                run.range.end = self.byte_of[run.range.end()];
            }
            for line in &mut self.display.lines {
                line.first_cluster = self.byte_of[to_usize(line.first_cluster)];
            }
        }

        self.laid_out = true;
        Ok(())
    }

    /// The laid-out glyphs, in visual order
    ///
    /// Empty before the first successful [`Text::layout`].
    #[inline]
    pub fn glyphs(&self) -> &[Glyph] {
        &self.display.glyphs
    }

    /// The shaping runs of the last layout, in visual order
    #[inline]
    pub fn runs(&self) -> &[RunInfo] {
        &self.display.runs
    }

    /// Number of lines of the last layout
    #[inline]
    pub fn num_lines(&self) -> usize {
        self.display.lines.len()
    }

    /// Whether the paragraph direction resolved to right-to-left
    #[inline]
    pub fn is_rtl(&self) -> bool {
        self.display.resolved_rtl
    }

    /// The character range of a line, in the caller's encoding
    ///
    /// Returns `None` for line numbers past the last layout's line count.
    pub fn line_range(&self, line: usize) -> Option<std::ops::Range<usize>> {
        self.display.line_range(line, self.report_len())
    }

    /// Extent of the last layout: `(width, height)` in font units
    ///
    /// Width is the furthest pen position reached on any line (including
    /// alignment shifts); height spans from the top of the first line to the
    /// bottom of the last. `(0, 0)` before a successful [`Text::layout`].
    pub fn bounding_size(&self) -> (i32, i32) {
        self.display.bounding_size()
    }

    /// Look up a face assigned to this layout
    #[inline]
    pub fn face(&self, id: FaceId) -> Option<&Face> {
        self.faces.get(to_usize(id.0))
    }

    /// Map a character index to a caret position
    ///
    /// `index` is snapped to the nearest grapheme cluster boundary at or
    /// after it and then to the start of the containing glyph cluster; the
    /// snapped value is written back. An index equal to the text length is
    /// the caret after the last character. The returned x grows along the
    /// flow direction from the paragraph's starting edge; y is the baseline
    /// of the index's line. Requires a successful [`Text::layout`].
    pub fn index_to_position(&self, index: &mut usize) -> Option<(i32, i32)> {
        if !self.laid_out {
            return None;
        }
        self.display.index_to_position(&self.source_view(), index)
    }

    /// Map a position to the nearest caret index
    ///
    /// The line is selected by `y`, the caret within it by `x` (advance
    /// midpoints decide between neighbouring carets); the result lies on a
    /// grapheme cluster boundary. Requires a successful [`Text::layout`].
    pub fn position_to_index(&self, x: i32, y: i32) -> Option<usize> {
        if !self.laid_out {
            return None;
        }
        self.display.position_to_index(&self.source_view(), x, y)
    }

    /// A `Source` for post-layout queries
    fn source_view(&self) -> Source {
        Source {
            text: &self.text,
            chars: &self.chars,
            byte_of: &self.byte_of,
            report_utf8: self.report_utf8,
            direction: self.direction,
            faces: &self.faces,
            face_of: &[],
            languages: &self.languages,
            language_of: &self.language_of,
            letter_spacing: &self.letter_spacing,
            word_spacing: &self.word_spacing,
            features: &self.features,
            invisible_glyph: self.invisible_glyph,
            line_width: self.line_width,
            alignment: self.alignment,
        }
    }

    /// Translate a range in the caller's encoding to a UTF-32 range
    fn char_range(&self, start: usize, count: usize) -> Result<std::ops::Range<usize>, Error> {
        let len = self.report_len();
        let err = Error::InvalidRange { start, count, len };
        if count == 0 || start >= len || count > len - start {
            return Err(err);
        }
        if self.report_utf8 {
            let first = self.char_of_byte(start);
            let last = self.char_of_byte(start + count - 1);
            Ok(first..last + 1)
        } else {
            Ok(start..start + count)
        }
    }

    /// Text length in the caller's encoding
    fn report_len(&self) -> usize {
        if self.report_utf8 {
            self.text.len()
        } else {
            self.chars.len()
        }
    }

    /// Convert a UTF-32 index to the caller's encoding
    fn report_index(&self, i: usize) -> usize {
        if self.report_utf8 {
            to_usize(self.byte_of[i])
        } else {
            i
        }
    }

    /// UTF-32 index of the character containing `byte`
    fn char_of_byte(&self, byte: usize) -> usize {
        let byte = to_u32(byte);
        self.byte_of.partition_point(|&b| b <= byte) - 1
    }
}
