// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Text preparation: BIDI, itemization and shaping
//!
//! The first stage of layout. The Unicode Bidirectional Algorithm orders the
//! text into level runs; these are split further wherever the resolved
//! script, font face, language or spacing attributes change, and each
//! resulting run is shaped. Runs and glyphs are produced in visual order.

use super::{Glyph, RunInfo, Source, TextDisplay};
use crate::conv::{to_u32, to_usize};
use crate::data::{Direction, Range, RunDirection};
use crate::fonts::FaceId;
use crate::script::resolve_scripts;
use crate::shaper::{is_default_ignorable, ShapeRequest, Shaper};
use unicode_bidi::{BidiInfo, Level, LTR_LEVEL, RTL_LEVEL};
use unicode_script::Script;

/// A maximal run of one embedding level, in visual order
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct BidiRun {
    /// Covered characters (UTF-32 indices)
    pub range: Range,
    pub level: Level,
}

/// Apply the Unicode Bidirectional Algorithm
///
/// Returns the level runs of the whole text in visual order plus the
/// resolved paragraph direction. Rules L1 (trailing whitespace) and L2 (run
/// reversal) are applied per paragraph. A top-to-bottom paragraph bypasses
/// the algorithm entirely: a single level-0 run.
pub(crate) fn bidi_runs(source: &Source) -> (Vec<BidiRun>, bool) {
    let n = source.chars.len();
    if source.direction == Direction::TopToBottom {
        let range = Range::from(0..n);
        return (
            vec![BidiRun {
                range,
                level: LTR_LEVEL,
            }],
            false,
        );
    }

    let default_level = match source.direction {
        Direction::Ltr => Some(LTR_LEVEL),
        Direction::Rtl => Some(RTL_LEVEL),
        _ => None, // resolved by rule P2
    };
    let info = BidiInfo::new(source.text, default_level);
    let resolved_rtl = info
        .paragraphs
        .first()
        .map(|p| p.level.is_rtl())
        .unwrap_or(false);

    let mut runs: Vec<BidiRun> = Vec::new();
    for para in &info.paragraphs {
        let (levels, ranges) = info.visual_runs(para, para.range.clone());
        for byte_range in ranges {
            let level = levels[byte_range.start];
            let start = source.char_of_byte(byte_range.start);
            let end = if byte_range.end == source.text.len() {
                n
            } else {
                source.char_of_byte(byte_range.end)
            };
            // A paragraph separator does not end a level run: the trailing
            // run of one paragraph continues into the next when the level is
            // unchanged.
            if let Some(prev) = runs.last_mut() {
                if prev.level == level && prev.range.end() == start {
                    prev.range.end = to_u32(end);
                    continue;
                }
            }
            runs.push(BidiRun {
                range: Range::from(start..end),
                level,
            });
        }
    }

    (runs, resolved_rtl)
}

/// Attribute set that a shaping run must share
#[derive(Clone, Copy, PartialEq)]
struct RunKey {
    script: Script,
    face: u32,
    language: Option<u16>,
    letter_spacing: i32,
    word_spacing: i32,
}

impl RunKey {
    fn at(source: &Source, scripts: &[Script], i: usize) -> Self {
        RunKey {
            script: scripts[i],
            face: source.face_of[i],
            language: source.language_of[i],
            letter_spacing: source.letter_spacing[i],
            word_spacing: source.word_spacing[i],
        }
    }
}

impl TextDisplay {
    /// Itemize and shape the text
    ///
    /// Splits each level run on script/face/language/spacing boundaries
    /// (walking backwards through right-to-left runs so that list order stays
    /// visual), shapes every run, applies spacing and invisible-glyph
    /// substitution and flattens the result into the glyph array.
    ///
    /// Glyph clusters are UTF-32 indices at this stage.
    pub(crate) fn prepare_runs(&mut self, source: &Source, shaper: &dyn Shaper) {
        self.clear();
        self.ttb = source.direction == Direction::TopToBottom;

        let (bidi, resolved_rtl) = bidi_runs(source);
        self.resolved_rtl = resolved_rtl;
        log::trace!("resolved direction: {}", if resolved_rtl { "RTL" } else { "LTR" });

        let scripts = resolve_scripts(source.chars);

        for run in &bidi {
            let backward = run.level.is_rtl() && !self.ttb;
            let mut indices = run.range.to_std();
            let mut next = move || {
                if backward {
                    indices.next_back()
                } else {
                    indices.next()
                }
            };

            let Some(first) = next() else { continue };
            let mut key = RunKey::at(source, &scripts, first);
            let mut pos = first;
            let mut len = 1;
            for i in std::iter::from_fn(&mut next) {
                let k = RunKey::at(source, &scripts, i);
                if k == key {
                    pos = pos.min(i);
                    len += 1;
                } else {
                    self.shape_run(source, shaper, run.level, key, Range::from(pos..pos + len));
                    key = k;
                    pos = i;
                    len = 1;
                }
            }
            self.shape_run(source, shaper, run.level, key, Range::from(pos..pos + len));
        }

        if log::log_enabled!(log::Level::Trace) {
            for (i, run) in self.runs.iter().enumerate() {
                log::trace!(
                    "run[{i}]: chars {}..{} level {} {:?} {:?} ({} glyphs)",
                    run.range.start,
                    run.range.end,
                    run.level,
                    run.direction,
                    run.script,
                    run.glyph_count
                );
            }
        }
    }

    fn shape_run(
        &mut self,
        source: &Source,
        shaper: &dyn Shaper,
        level: Level,
        key: RunKey,
        range: Range,
    ) {
        let direction = if self.ttb {
            RunDirection::Ttb
        } else if level.is_rtl() {
            RunDirection::Rtl
        } else {
            RunDirection::Ltr
        };
        let language = key.language.map(|i| &source.languages[usize::from(i)]);
        let face = &source.faces[to_usize(key.face)];

        let request = ShapeRequest {
            text: source.chars,
            range,
            direction,
            script: key.script,
            language,
            features: source.features,
            face,
        };
        // An empty result for a non-empty run means the backend failed on it;
        // the run contributes no glyphs and layout continues.
        let shaped = shaper.shape(&request);

        let glyph_count = to_u32(shaped.len());
        for sg in shaped {
            let c = source.chars[to_usize(sg.cluster)];
            let mut glyph = Glyph {
                index: sg.glyph_id,
                cluster: sg.cluster,
                x_advance: sg.x_advance,
                y_advance: sg.y_advance,
                x_offset: sg.x_offset,
                y_offset: sg.y_offset,
                x_position: 0,
                y_position: 0,
                face: FaceId(key.face),
                line: 0,
                visual_index: to_u32(self.glyphs.len()),
            };
            glyph.x_advance += key.letter_spacing;
            if c.is_whitespace() {
                glyph.x_advance += key.word_spacing;
            }
            if let Some(invisible) = source.invisible_glyph {
                if is_default_ignorable(c) {
                    glyph.index = invisible;
                }
            }
            self.glyphs.push(glyph);
        }

        self.runs.push(RunInfo {
            range,
            level: level.number(),
            direction,
            script: key.script,
            face: FaceId(key.face),
            language: language.cloned(),
            glyph_count,
        });
    }
}
