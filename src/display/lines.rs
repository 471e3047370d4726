// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Text preparation: line breaking, positioning and alignment
//!
//! The second stage of layout. Glyphs are walked in logical order and
//! assigned line numbers: a line wraps at the last allowed break opportunity
//! once its width (excluding trailing whitespace) exceeds the wrap width, and
//! always wraps after a hard break. Break opportunities come from the UAX #14
//! line breaking algorithm. Glyphs sharing a cluster are never separated and
//! break opportunities only occur on grapheme boundaries, so grapheme
//! clusters stay on one line.
//!
//! Afterwards glyphs are re-sorted to visual order by `(line, visual_index)`,
//! pen positions are accumulated per line and the configured alignment is
//! applied.

use super::{LineInfo, Source, TextDisplay};
use crate::conv::{to_u32, to_usize};
use crate::data::{Alignment, Range};
use smallvec::SmallVec;
use xi_unicode::LineBreakIterator;

const BREAK_ALLOWED: u8 = 1;
const BREAK_MANDATORY: u8 = 2;

/// A group of glyphs sharing one cluster, in logical order
#[derive(Clone, Debug)]
struct Cluster {
    /// UTF-32 index of the cluster
    index: u32,
    /// Range into the logical glyph ordering
    glyphs: Range,
    /// Offset plus advance along the flow axis
    advance: i32,
    /// The cluster maps to a whitespace character
    is_space: bool,
    flags: u8,
}

impl TextDisplay {
    /// Assign lines, positions and alignment
    ///
    /// Requires [`TextDisplay::prepare_runs`]; clusters must still be UTF-32
    /// indices.
    pub(crate) fn prepare_lines(&mut self, source: &Source) {
        if self.glyphs.is_empty() {
            return;
        }

        // Logical ordering of the flat visual glyph array. A stable sort by
        // cluster leaves glyphs of one cluster in visual order.
        let mut order: Vec<u32> = (0..to_u32(self.glyphs.len())).collect();
        order.sort_by_key(|&i| self.glyphs[to_usize(i)].cluster);

        let flags = break_flags(source);
        let clusters = self.clusters(source, &order, &flags);
        let (line_of, wrapped) = self.assign_lines(source, &clusters);

        for (k, cluster) in clusters.iter().enumerate() {
            for &gi in &order[cluster.glyphs.to_std()] {
                self.glyphs[to_usize(gi)].line = line_of[k];
            }
        }

        // Re-sort to visual order; within a line the original visual order
        // is kept.
        self.glyphs.sort_by_key(|g| (g.line, g.visual_index));
        for (i, g) in self.glyphs.iter_mut().enumerate() {
            g.visual_index = to_u32(i);
        }

        self.logical = (0..to_u32(self.glyphs.len())).collect();
        self.logical
            .sort_by_key(|&i| (self.glyphs[to_usize(i)].cluster, i));

        self.build_lines(source, &wrapped);
        self.position_glyphs();
        self.align_lines(source);

        if log::log_enabled!(log::Level::Trace) {
            for g in &self.glyphs {
                log::trace!(
                    "glyph[{}]: id {} cluster {} line {} at ({}, {})",
                    g.visual_index,
                    g.index,
                    g.cluster,
                    g.line,
                    g.x_position,
                    g.y_position
                );
            }
        }
    }

    /// Group logically ordered glyphs by cluster
    fn clusters(&self, source: &Source, order: &[u32], flags: &[u8]) -> Vec<Cluster> {
        let mut clusters: Vec<Cluster> = Vec::new();
        for (i, &gi) in order.iter().enumerate() {
            let g = &self.glyphs[to_usize(gi)];
            // The line measure accumulates the offset along the flow axis as
            // well as the advance.
            let advance = self.flow_advance(g) + if self.ttb { -g.y_offset } else { g.x_offset };
            if let Some(c) = clusters.last_mut() {
                if c.index == g.cluster {
                    c.glyphs.end = to_u32(i) + 1;
                    c.advance += advance;
                    continue;
                }
            }
            let index = g.cluster;
            clusters.push(Cluster {
                index,
                glyphs: Range::from(i..i + 1),
                advance,
                is_space: source.chars[to_usize(index)].is_whitespace(),
                flags: flags[to_usize(index)],
            });
        }
        clusters
    }

    /// Greedy line assignment over logical clusters
    ///
    /// Returns the line number of every cluster plus, per finished line,
    /// whether it ended by wrapping.
    fn assign_lines(&self, source: &Source, clusters: &[Cluster]) -> (Vec<u32>, Vec<bool>) {
        let mut line_of = vec![0u32; clusters.len()];
        let mut wrapped = Vec::new();

        let width = if self.ttb { None } else { source.line_width };
        let mut line = 0u32;
        let mut start = 0usize; // first cluster of the current line
        let mut x: i32 = 0;
        let mut last_break: Option<usize> = None;

        for k in 0..clusters.len() {
            let cl = &clusters[k];

            if cl.flags & BREAK_MANDATORY != 0 && k > start {
                wrapped.push(false);
                line += 1;
                start = k;
                x = 0;
                last_break = None;
            } else if let Some(width) = width {
                if cl.flags & BREAK_ALLOWED != 0 && k > start {
                    last_break = Some(k);
                }
                if !cl.is_space && x + cl.advance > width {
                    if let Some(b) = last_break.filter(|&b| b > start) {
                        wrapped.push(true);
                        line += 1;
                        // Rewind: clusters from the break point onwards move
                        // to the new line.
                        x = 0;
                        last_break = None;
                        for j in b..k {
                            line_of[j] = line;
                            x += clusters[j].advance;
                            if clusters[j].flags & BREAK_ALLOWED != 0 && j > b {
                                last_break = Some(j);
                            }
                        }
                        start = b;
                    }
                }
            }

            line_of[k] = line;
            x += cl.advance;
        }

        (line_of, wrapped)
    }

    /// Build the line table over the visually sorted glyph array
    fn build_lines(&mut self, source: &Source, wrapped: &[bool]) {
        self.lines.clear();

        let mut visual_start = 0;
        while visual_start < self.glyphs.len() {
            let line = self.glyphs[visual_start].line;
            let mut visual_end = visual_start + 1;
            while visual_end < self.glyphs.len() && self.glyphs[visual_end].line == line {
                visual_end += 1;
            }

            // The logical index shares the grouping: a line covers one
            // contiguous logical range of the same length.
            let logical_start = self
                .logical
                .partition_point(|&i| self.glyphs[to_usize(i)].line < line);
            let logical = Range::from(logical_start..logical_start + (visual_end - visual_start));
            let first_cluster = self.glyphs[to_usize(self.logical[logical.start()])].cluster;

            let height = self.glyphs[visual_start..visual_end]
                .iter()
                .map(|g| source.faces[to_usize(g.face.0)].metrics().height())
                .max()
                .unwrap_or(0);
            let y = match self.lines.last() {
                Some(prev) if !self.ttb => prev.y - height,
                _ => 0,
            };

            self.lines.push(LineInfo {
                y,
                height,
                visual: Range::from(visual_start..visual_end),
                logical,
                first_cluster,
                wrapped: wrapped.get(self.lines.len()).copied().unwrap_or(false),
            });
            visual_start = visual_end;
        }
    }

    /// Accumulate pen positions per line
    fn position_glyphs(&mut self) {
        if self.ttb {
            let mut y: i32 = 0;
            for g in &mut self.glyphs {
                g.x_position = g.x_offset;
                g.y_position = y + g.y_offset;
                y += g.y_advance;
            }
            return;
        }

        for li in 0..self.lines.len() {
            let (y, visual) = (self.lines[li].y, self.lines[li].visual);
            let mut x: i32 = 0;
            for g in &mut self.glyphs[visual.to_std()] {
                g.x_position = x + g.x_offset;
                g.y_position = y + g.y_offset;
                x += g.x_advance;
            }
        }
    }

    /// Apply horizontal alignment within the wrap width
    fn align_lines(&mut self, source: &Source) {
        let Some(width) = source.line_width else {
            return;
        };
        if self.ttb {
            return;
        }
        let alignment = match source.alignment {
            Alignment::Start if self.resolved_rtl => Alignment::Right,
            Alignment::Start => Alignment::Left,
            Alignment::End if self.resolved_rtl => Alignment::Left,
            Alignment::End => Alignment::Right,
            other => other,
        };
        if alignment == Alignment::Left {
            return;
        }

        for li in 0..self.lines.len() {
            let line = self.lines[li].clone();

            // Logically trailing whitespace does not occupy the line for the
            // purposes of alignment.
            let mut trailing: SmallVec<[u32; 8]> = SmallVec::new();
            for &gi in self.logical[line.logical.to_std()].iter().rev() {
                let g = &self.glyphs[to_usize(gi)];
                if source.chars[to_usize(g.cluster)].is_whitespace() {
                    trailing.push(gi);
                } else {
                    break;
                }
            }
            let trailing_advance: i32 = trailing
                .iter()
                .map(|&gi| self.glyphs[to_usize(gi)].x_advance)
                .sum();
            let total: i32 = self.glyphs[line.visual.to_std()]
                .iter()
                .map(|g| g.x_advance)
                .sum();
            let spare = width - (total - trailing_advance);
            if spare <= 0 {
                continue;
            }

            match alignment {
                Alignment::Right => {
                    for g in &mut self.glyphs[line.visual.to_std()] {
                        g.x_position += spare;
                    }
                }
                Alignment::Center => {
                    for g in &mut self.glyphs[line.visual.to_std()] {
                        g.x_position += spare / 2;
                    }
                }
                Alignment::Full => {
                    // Justify wrapped lines only: distribute the slack over
                    // the word spaces, shifting everything that follows each
                    // space.
                    if !line.wrapped {
                        continue;
                    }
                    let gaps = self.glyphs[line.visual.to_std()]
                        .iter()
                        .filter(|g| {
                            source.chars[to_usize(g.cluster)].is_whitespace()
                                && !trailing.contains(&g.visual_index)
                        })
                        .count() as i32;
                    if gaps == 0 {
                        continue;
                    }
                    let mut passed: i64 = 0;
                    for g in &mut self.glyphs[line.visual.to_std()] {
                        g.x_position += (i64::from(spare) * passed / i64::from(gaps)) as i32;
                        if source.chars[to_usize(g.cluster)].is_whitespace()
                            && !trailing.contains(&g.visual_index)
                        {
                            passed += 1;
                        }
                    }
                }
                _ => (),
            }
        }
    }
}

/// Compute break opportunities before every code point
///
/// Bit 0: a line may start at this character; bit 1: a line must start here
/// (the previous character ends in a hard break).
fn break_flags(source: &Source) -> Vec<u8> {
    let mut flags = vec![0u8; source.chars.len()];
    for (byte, hard) in LineBreakIterator::new(source.text) {
        if byte == 0 || byte >= source.text.len() {
            // The iterator finishes with a break at the end of text; no line
            // starts there.
            continue;
        }
        let ci = source.char_of_byte(byte);
        flags[ci] |= if hard { BREAK_MANDATORY } else { BREAK_ALLOWED };
    }
    flags
}
