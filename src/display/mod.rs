// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Text prepared for display
//!
//! [`TextDisplay`] caches the products of the layout pipeline: the visual-order
//! run list, the flat glyph array, a logical-order index over it and the line
//! table. It is rebuilt from scratch by every [`crate::Text::layout`] call.

use crate::data::{Alignment, Direction, Range, RunDirection};
use crate::fonts::{Face, FaceId};
use crate::shaper::{Feature, Language};
use unicode_script::Script;

mod cursor;
mod lines;
mod runs;

/// A positioned glyph
///
/// All distances are in unscaled font units. `cluster` is the index of the
/// first source character the glyph derives from: a UTF-32 index when the
/// text was set with [`crate::Text::set_text_utf32`], a UTF-8 byte offset
/// when it was set with [`crate::Text::set_text`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Glyph {
    /// Glyph id in the font face
    pub index: u32,
    /// Index of the source character (see type docs for encoding)
    pub cluster: u32,
    pub x_advance: i32,
    pub y_advance: i32,
    pub x_offset: i32,
    pub y_offset: i32,
    /// Horizontal pen position, accumulated per line from x 0
    pub x_position: i32,
    /// Vertical position: the baseline of the glyph's line
    pub y_position: i32,
    /// The face the glyph was shaped with
    pub face: FaceId,
    /// Line number, starting at 0
    pub line: u32,
    /// Position within the visual-order glyph array
    pub visual_index: u32,
}

/// Metadata of one shaping run
///
/// Runs are reported in visual order and cover the text exactly once;
/// adjacent runs differ in at least one of embedding level, script, face,
/// language or spacing.
#[derive(Clone, Debug)]
pub struct RunInfo {
    /// Covered characters, in the caller's encoding; `range.start` is the
    /// smallest logical index regardless of direction
    pub range: Range,
    /// Resolved embedding level (even = LTR, odd = RTL)
    pub level: u8,
    pub direction: RunDirection,
    pub script: Script,
    pub face: FaceId,
    /// Language assigned to the run, if any
    pub language: Option<Language>,
    /// Number of glyphs the run shaped to
    pub glyph_count: u32,
}

/// One visual line
#[derive(Clone, Debug)]
pub(crate) struct LineInfo {
    /// Baseline y position (0 for the first line, stepping down by line
    /// height)
    pub y: i32,
    /// Line height: the maximum `ascender + |descender|` of the faces used
    pub height: i32,
    /// Glyphs of this line in the visual-order array
    pub visual: Range,
    /// Glyphs of this line in [`TextDisplay::logical`]
    pub logical: Range,
    /// Smallest cluster on the line, in the caller's encoding
    pub first_cluster: u32,
    /// True when the line ends due to wrapping (not a hard break or the end
    /// of the text); only wrapped lines are justified
    pub wrapped: bool,
}

/// Everything the pipeline needs to read from the owning [`crate::Text`]
pub(crate) struct Source<'a> {
    /// The full text, UTF-8
    pub text: &'a str,
    /// The full text, UTF-32
    pub chars: &'a [char],
    /// UTF-32 index → UTF-8 byte offset; `byte_of[chars.len()] == text.len()`
    pub byte_of: &'a [u32],
    /// Report clusters as UTF-8 byte offsets
    pub report_utf8: bool,
    pub direction: Direction,
    pub faces: &'a [Face],
    /// Validated face assignment per code point (index into `faces`)
    pub face_of: &'a [u32],
    pub languages: &'a [Language],
    pub language_of: &'a [Option<u16>],
    pub letter_spacing: &'a [i32],
    pub word_spacing: &'a [i32],
    pub features: &'a [Feature],
    pub invisible_glyph: Option<u32>,
    pub line_width: Option<i32>,
    pub alignment: Alignment,
}

impl<'a> Source<'a> {
    /// UTF-32 index of the character containing `byte`
    pub fn char_of_byte(&self, byte: usize) -> usize {
        debug_assert!(byte <= self.text.len());
        let byte = crate::conv::to_u32(byte);
        self.byte_of.partition_point(|&b| b <= byte) - 1
    }

    /// Text length in the caller's encoding
    pub fn report_len(&self) -> usize {
        if self.report_utf8 {
            self.text.len()
        } else {
            self.chars.len()
        }
    }

    /// Byte offset of the character containing reporting index `i`
    pub fn byte_of_report(&self, i: usize) -> usize {
        let ci = if self.report_utf8 {
            self.char_of_byte(i.min(self.text.len()))
        } else {
            i.min(self.chars.len())
        };
        crate::conv::to_usize(self.byte_of[ci])
    }

    /// Reporting index of the character starting at `byte`
    pub fn report_of_byte(&self, byte: usize) -> usize {
        if self.report_utf8 {
            byte
        } else {
            self.char_of_byte(byte.min(self.text.len()))
        }
    }
}

/// Cached layout state
#[derive(Clone, Debug, Default)]
pub(crate) struct TextDisplay {
    /// Shaping runs, visual order
    pub runs: Vec<RunInfo>,
    /// Glyphs in visual order: by `(line, visual_index)` after line breaking
    pub glyphs: Vec<Glyph>,
    /// Indices into `glyphs`, sorted to logical (cluster) order
    pub logical: Vec<u32>,
    pub lines: Vec<LineInfo>,
    /// Paragraph direction resolved to right-to-left
    pub resolved_rtl: bool,
    /// Vertical (top-to-bottom) flow
    pub ttb: bool,
}

impl TextDisplay {
    pub fn clear(&mut self) {
        self.runs.clear();
        self.glyphs.clear();
        self.logical.clear();
        self.lines.clear();
        self.resolved_rtl = false;
        self.ttb = false;
    }

    /// The advance of `g` along the flow axis (always non-negative)
    pub(crate) fn flow_advance(&self, g: &Glyph) -> i32 {
        if self.ttb {
            -g.y_advance
        } else {
            g.x_advance
        }
    }

    /// The line containing the character at `index`
    ///
    /// `index` is in the same space as the stored cluster values. Lines
    /// partition the text in logical order; this returns the last line
    /// starting at or before `index`.
    pub(crate) fn line_of_index(&self, index: usize) -> usize {
        let index = crate::conv::to_u32(index);
        let i = self
            .lines
            .partition_point(|line| line.first_cluster <= index);
        i.saturating_sub(1)
    }

    /// The character range covered by a line, ending where the next line
    /// starts (`report_len` for the last line)
    pub(crate) fn line_range(
        &self,
        line: usize,
        report_len: usize,
    ) -> Option<std::ops::Range<usize>> {
        let info = self.lines.get(line)?;
        let start = crate::conv::to_usize(info.first_cluster);
        let end = self
            .lines
            .get(line + 1)
            .map(|l| crate::conv::to_usize(l.first_cluster))
            .unwrap_or(report_len);
        Some(start..end)
    }

    /// Extent of the laid-out glyphs: `(width, height)` in font units
    ///
    /// Width is the furthest pen position reached on any line (including
    /// alignment shifts); height spans from the top of the first line to the
    /// bottom of the last.
    pub(crate) fn bounding_size(&self) -> (i32, i32) {
        if self.ttb {
            let depth = self
                .glyphs
                .iter()
                .map(|g| -(g.y_position + g.y_advance))
                .max()
                .unwrap_or(0);
            return (0, depth);
        }
        let width = self
            .glyphs
            .iter()
            .map(|g| g.x_position - g.x_offset + g.x_advance)
            .max()
            .unwrap_or(0);
        let height = match (self.lines.first(), self.lines.last()) {
            (Some(first), Some(last)) => first.height - last.y,
            _ => 0,
        };
        (width, height)
    }
}
