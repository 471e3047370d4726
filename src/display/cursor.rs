// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Cursor mapping between character indices and positions
//!
//! Caret coordinates are measured along the flow axis from the paragraph's
//! starting edge: the caret of a character is the summed advance of every
//! glyph on its line that precedes it in logical order. The caret therefore
//! grows with logical position in both left-to-right and right-to-left
//! paragraphs, and a position before the starting edge maps to the
//! paragraph's first character. Carets are constrained to grapheme cluster
//! boundaries.
//!
//! Indices are in the caller's encoding, matching glyph clusters.

use super::{Glyph, LineInfo, Source, TextDisplay};
use crate::conv::{to_u32, to_usize};
use crate::grapheme;

impl TextDisplay {
    /// Map a character index to a caret position
    ///
    /// `index` is snapped forward to a grapheme boundary and then back to the
    /// start of the containing glyph cluster; the snapped value is written
    /// back. An index equal to the text length (or snapping to it) is the
    /// caret after the last character. Returns `(x, y)`: the caret along the
    /// flow axis and the line's baseline (for vertical text the flow
    /// coordinate is y and x is 0).
    ///
    /// Returns `None` when nothing is laid out or `index` is past the text
    /// length.
    pub(crate) fn index_to_position(
        &self,
        source: &Source,
        index: &mut usize,
    ) -> Option<(i32, i32)> {
        if self.glyphs.is_empty() || *index > source.report_len() {
            return None;
        }

        // Snap forward to a grapheme boundary
        let byte = grapheme::snap_forward(source.text, source.byte_of_report(*index));
        if byte >= source.text.len() {
            // Caret after the last character: one past the last glyph of the
            // last line.
            let line = self.lines.last()?;
            let x: i32 = self.logical[line.logical.to_std()]
                .iter()
                .map(|&gi| self.flow_advance(&self.glyphs[to_usize(gi)]))
                .sum();
            *index = source.report_len();
            return if self.ttb {
                Some((0, -x))
            } else {
                Some((x, line.y))
            };
        }
        let target = to_u32(source.report_of_byte(byte));

        let line = &self.lines[self.line_of_index(to_usize(target))];
        let logical = &self.logical[line.logical.to_std()];

        // The caret sits before the cluster containing the index: its x is
        // the summed advance of all logically preceding glyphs on the line.
        let cluster = cluster_start(&self.glyphs, logical, target);
        let mut x: i32 = 0;
        for &gi in logical {
            let g = &self.glyphs[to_usize(gi)];
            if g.cluster >= cluster {
                break;
            }
            x += self.flow_advance(g);
        }

        *index = to_usize(cluster);
        if self.ttb {
            Some((0, -x))
        } else {
            Some((x, line.y))
        }
    }

    /// Map a position to a character index
    ///
    /// The line is chosen by `y` (nearest baseline); within the line the
    /// caret falls before or after the cluster under `x` depending on the
    /// advance midpoint. The result lies on a grapheme boundary. A position
    /// before the starting edge returns the line's first character.
    ///
    /// Returns `None` when nothing is laid out.
    pub(crate) fn position_to_index(&self, source: &Source, x: i32, y: i32) -> Option<usize> {
        if self.glyphs.is_empty() {
            return None;
        }

        let pos = if self.ttb { -y } else { x };
        let line = if self.ttb {
            self.lines.first()?
        } else {
            self.lines
                .iter()
                .min_by_key(|line| (i64::from(line.y) - i64::from(y)).abs())?
        };

        let logical = &self.logical[line.logical.to_std()];
        if pos < 0 {
            return Some(to_usize(line.first_cluster));
        }

        // Walk cluster groups accumulating advances
        let mut acc: i32 = 0;
        let mut i = 0;
        while i < logical.len() {
            let cluster = self.glyphs[to_usize(logical[i])].cluster;
            let mut advance = 0;
            let mut j = i;
            while j < logical.len() && self.glyphs[to_usize(logical[j])].cluster == cluster {
                advance += self.flow_advance(&self.glyphs[to_usize(logical[j])]);
                j += 1;
            }

            if pos < acc + advance {
                let chosen = if pos - acc < advance / 2 {
                    to_usize(cluster)
                } else {
                    // after: the next cluster on the line, or past its end
                    match logical.get(j) {
                        Some(&gi) => to_usize(self.glyphs[to_usize(gi)].cluster),
                        None => self.line_end_index(source, line),
                    }
                };
                return Some(self.snap_index(source, chosen));
            }

            acc += advance;
            i = j;
        }

        Some(self.line_end_index(source, line))
    }

    /// The index one past the line's content: the next line's start, or the
    /// text length
    fn line_end_index(&self, source: &Source, line: &LineInfo) -> usize {
        let next = self
            .lines
            .iter()
            .find(|l| l.first_cluster > line.first_cluster);
        match next {
            Some(l) => to_usize(l.first_cluster),
            None => source.report_len(),
        }
    }

    /// Snap an index forward to a grapheme boundary
    fn snap_index(&self, source: &Source, index: usize) -> usize {
        if index >= source.report_len() {
            return source.report_len();
        }
        let byte = grapheme::snap_forward(source.text, source.byte_of_report(index));
        if byte >= source.text.len() {
            source.report_len()
        } else {
            source.report_of_byte(byte)
        }
    }
}

/// The start of the glyph cluster containing `target`: the largest cluster
/// value ≤ `target` among the line's glyphs
fn cluster_start(glyphs: &[Glyph], logical: &[u32], target: u32) -> u32 {
    let mut found = None;
    for &gi in logical {
        let c = glyphs[to_usize(gi)].cluster;
        if c <= target {
            found = Some(c);
        } else {
            break;
        }
    }
    found.unwrap_or(target)
}
