//! End-to-end layout scenarios
//!
//! These tests drive the full pipeline through a deterministic shaping
//! backend: one glyph per character with a fixed advance of 10 units
//! (combining marks are zero-width), reversed output for right-to-left runs,
//! and an optional `fi` ligature to exercise the feature list.

use rasm_text::shaper::{ShapeRequest, ShapedGlyph, Shaper, Tag};
use rasm_text::{Alignment, Direction, Face, FaceId, FaceMetrics, RunDirection, Text};

const ADVANCE: i32 = 10;

fn char_advance(c: char) -> i32 {
    match u32::from(c) {
        0x0300..=0x036F | 0x064B..=0x065F => 0, // combining marks
        _ => ADVANCE,
    }
}

fn glyph(c: char, cluster: usize, ttb: bool) -> ShapedGlyph {
    ShapedGlyph {
        glyph_id: u32::from(c),
        cluster: cluster as u32,
        x_advance: if ttb { 0 } else { char_advance(c) },
        y_advance: if ttb { -char_advance(c) } else { 0 },
        x_offset: 0,
        y_offset: 0,
    }
}

/// Fixed-advance shaper with an `fi` ligature (on unless `liga` is disabled)
struct TestShaper;

impl Shaper for TestShaper {
    fn shape(&self, request: &ShapeRequest) -> Vec<ShapedGlyph> {
        let liga = !request
            .features
            .iter()
            .any(|f| f.tag == Tag::from_bytes(b"liga") && f.value == 0);
        let ttb = request.direction == RunDirection::Ttb;

        let mut glyphs = Vec::new();
        let mut i = request.range.start();
        while i < request.range.end() {
            if liga
                && request.text[i] == 'f'
                && i + 1 < request.range.end()
                && request.text[i + 1] == 'i'
            {
                let mut g = glyph('f', i, ttb);
                g.glyph_id = 0xFB01; // LATIN SMALL LIGATURE FI
                glyphs.push(g);
                i += 2;
            } else {
                glyphs.push(glyph(request.text[i], i, ttb));
                i += 1;
            }
        }
        if request.direction == RunDirection::Rtl {
            glyphs.reverse();
        }
        glyphs
    }
}

fn face() -> Face {
    Face::from_metrics(FaceMetrics {
        units_per_em: 1000,
        ascender: 800,
        descender: -200,
        line_gap: 0,
    })
}

fn build(text: &str) -> Text {
    let mut t = Text::with_shaper(Box::new(TestShaper));
    t.set_text(text);
    t.set_font_range(&face(), 0, text.len()).unwrap();
    t
}

/// Visual indices of the glyphs whose cluster falls in `range`
fn visual_of(t: &Text, range: std::ops::Range<u32>) -> Vec<u32> {
    t.glyphs()
        .iter()
        .filter(|g| range.contains(&g.cluster))
        .map(|g| g.visual_index)
        .collect()
}

#[test]
fn mixed_bidi_default_direction() {
    // Arabic text with a parenthesised ASCII segment; the paragraph resolves
    // to RTL, so in the left-to-right visual array the logically-first
    // Arabic word comes last and the ASCII sits between the Arabic words.
    let mut t = build("عربي(English ) عربي");
    t.layout().unwrap();
    assert!(t.is_rtl());
    assert!(t.runs().len() >= 3);

    let word1 = visual_of(&t, 0..8);
    let english = visual_of(&t, 9..16);
    let word2 = visual_of(&t, 19..27);
    assert!(!word1.is_empty() && !english.is_empty() && !word2.is_empty());
    assert!(word2.iter().max() < english.iter().min());
    assert!(english.iter().max() < word1.iter().min());
}

#[test]
fn forced_ltr_direction() {
    let mut t = build("عربي(English ) عربي");
    t.set_par_direction(Direction::Ltr);
    t.layout().unwrap();
    assert!(!t.is_rtl());

    // The paragraph now starts with the first Arabic run on the left; the
    // word itself still reads right-to-left, so its visually-first glyph is
    // its last letter (bytes 6..8).
    assert_eq!(t.glyphs()[0].cluster, 6);
    let word1 = visual_of(&t, 0..8);
    let english = visual_of(&t, 9..16);
    assert!(word1.iter().max() < english.iter().min());
}

#[test]
fn script_itemization_across_brackets() {
    // Bracket content adopts the surrounding Latin script; with no level
    // changes the text shapes as a single run.
    let mut t = build("aa (bb) aa");
    t.layout().unwrap();
    assert_eq!(t.runs().len(), 1);
    assert_eq!(t.glyphs().len(), 10);
}

#[test]
fn ligature_suppression() {
    let mut t = build("file is filling");
    t.layout().unwrap();
    // Two fi ligatures formed
    assert_eq!(t.glyphs().len(), 13);

    let mut t = build("file is filling");
    t.add_font_feature("-liga").unwrap();
    t.layout().unwrap();
    // Glyph count equals the number of base code points
    assert_eq!(t.glyphs().len(), 15);
}

#[test]
fn multi_font_ranges() {
    let text = "English اللغة العربية";
    let (a, b) = (face(), face());
    let mut t = Text::with_shaper(Box::new(TestShaper));
    t.set_text(text);
    t.set_font_range(&a, 0, 12).unwrap();
    t.set_font_range(&b, 12, text.len() - 12).unwrap();
    t.layout().unwrap();

    assert!(t.runs().iter().any(|r| r.range.start == 12 || r.range.end == 12));
    for g in t.glyphs() {
        if g.cluster >= 12 {
            assert_eq!(g.face, FaceId(1));
        } else {
            assert_eq!(g.face, FaceId(0));
        }
    }
    assert!(t.face(FaceId(1)).is_some());
}

#[test]
fn cursor_mapping_with_combining_mark() {
    // "عمَان oman": bytes 0..2 ain, 2..4 meem, 4..6 fatha, 6..8 alef,
    // 8..10 noon. The caret grows with logical position.
    let mut t = build("عمَان oman");
    t.layout().unwrap();
    assert!(t.is_rtl());

    let mut i3 = 3; // inside the meem
    let (x3, _) = t.index_to_position(&mut i3).unwrap();
    assert_eq!(i3, 2); // snapped to the meem cluster

    let mut i4 = 4; // the fatha: same grapheme as the meem
    let (x4, y4) = t.index_to_position(&mut i4).unwrap();
    assert_eq!(i4, 6); // snapped forward past the grapheme
    assert!(x4 > x3);

    // The caret round-trips on grapheme boundaries
    assert_eq!(t.position_to_index(x4, y4), Some(6));
    // A position inside the meem's advance maps into its grapheme
    let idx = t.position_to_index(x4 - 6, y4).unwrap();
    assert!(idx == 2 || idx == 4);
}

#[test]
fn grapheme_boundary_crlf() {
    let mut t = build("om\r\nan");
    t.layout().unwrap();
    assert_eq!(t.num_lines(), 2);
    // The paragraph separator does not split the run: level, script, face
    // and spacing are unchanged across it
    assert_eq!(t.runs().len(), 1);

    // An index inside the CRLF pair snaps past it as a single grapheme
    let mut index = 3;
    let (x, _) = t.index_to_position(&mut index).unwrap();
    assert_eq!(index, 4);
    assert_eq!(x, 0); // start of the second line
}

#[test]
fn line_break_with_width() {
    let mut t = build("one two three four");
    t.set_line_width(75);
    t.layout().unwrap();

    let lines: std::collections::BTreeSet<u32> = t.glyphs().iter().map(|g| g.line).collect();
    assert!(lines.len() >= 2);

    // No glyph of "three" (bytes 8..13) sits on line 0
    for g in t.glyphs() {
        if (8..13).contains(&g.cluster) {
            assert!(g.line > 0);
        }
    }
    // Line 1 starts at x 0 again
    let first_line1 = t.glyphs().iter().find(|g| g.line == 1).unwrap();
    assert_eq!(first_line1.x_position, 0);
    // y steps down by the line height
    assert!(first_line1.y_position < 0);
}

#[test]
fn glyph_counts_match_runs() {
    let mut t = build("abc אבג def");
    t.layout().unwrap();
    let total: u32 = t.runs().iter().map(|r| r.glyph_count).sum();
    assert_eq!(total as usize, t.glyphs().len());

    // Every cluster lies inside the range of the run that shaped it
    for g in t.glyphs() {
        assert!(t
            .runs()
            .iter()
            .any(|r| r.face == g.face && g.cluster >= r.range.start && g.cluster < r.range.end));
    }
}

#[test]
fn rtl_first_glyph_is_leftmost() {
    // For a pure RTL paragraph the visual array begins with the logically
    // last cluster (the visually leftmost one).
    let mut t = build("عربي");
    t.layout().unwrap();
    assert!(t.is_rtl());
    assert_eq!(t.glyphs()[0].cluster, 6);
    assert_eq!(t.glyphs()[0].x_position, 0);
}

#[test]
fn caret_round_trips_on_boundaries() {
    let mut t = build("hello world");
    t.layout().unwrap();
    // Includes the caret after the last character
    for i in 0..=t.text().len() {
        let mut index = i;
        let (x, y) = t.index_to_position(&mut index).unwrap();
        assert_eq!(index, i);
        assert_eq!(t.position_to_index(x, y), Some(i));
    }
    let mut past = t.text().len() + 1;
    assert_eq!(t.index_to_position(&mut past), None);
    // Before the starting edge: the paragraph start
    assert_eq!(t.position_to_index(-5, 0), Some(0));
    // Past the end of the line
    assert_eq!(t.position_to_index(i32::MAX, 0), Some(t.text().len()));
}

/// Fixed-advance shaper splitting each glyph's measure into advance and
/// offset
struct OffsetShaper;

impl Shaper for OffsetShaper {
    fn shape(&self, request: &ShapeRequest) -> Vec<ShapedGlyph> {
        let mut glyphs: Vec<ShapedGlyph> = request
            .range
            .to_std()
            .map(|i| ShapedGlyph {
                glyph_id: u32::from(request.text[i]),
                cluster: i as u32,
                x_advance: 8,
                y_advance: 0,
                x_offset: 2,
                y_offset: 0,
            })
            .collect();
        if request.direction == RunDirection::Rtl {
            glyphs.reverse();
        }
        glyphs
    }
}

#[test]
fn wrap_measure_includes_offsets() {
    let text = "aaaa bbbb cccc";
    let mut t = Text::with_shaper(Box::new(OffsetShaper));
    t.set_text(text);
    t.set_font_range(&face(), 0, text.len()).unwrap();
    t.set_line_width(80);
    t.layout().unwrap();

    // Each glyph measures 10 on the line (advance 8 plus offset 2), so
    // "bbbb" exceeds the width after "aaaa " and wraps; advances alone
    // (8 per glyph) would have fit it on the first line.
    let b = t.glyphs().iter().find(|g| g.cluster == 5).unwrap();
    assert_eq!(b.line, 1);
    // Pen placement applies the offset per glyph
    assert_eq!(t.glyphs()[0].x_position, 2);
}

#[test]
fn clusters_stay_on_one_line() {
    let mut t = build("ab cd\u{0301} ef");
    t.set_line_width(25);
    t.layout().unwrap();
    assert!(t.num_lines() >= 2);

    // The combining mark shares its line with its base
    let mark_line = t.glyphs().iter().find(|g| g.cluster == 5).unwrap().line;
    let base_line = t.glyphs().iter().find(|g| g.cluster == 4).unwrap().line;
    assert_eq!(mark_line, base_line);

    // Glyphs sharing a cluster share a line
    for a in t.glyphs() {
        for b in t.glyphs() {
            if a.cluster == b.cluster {
                assert_eq!(a.line, b.line);
            }
        }
    }
}

#[test]
fn neutral_text_is_direction_independent() {
    let run = |dir| {
        let mut t = build("123 456");
        t.set_par_direction(dir);
        t.layout().unwrap();
        let mut glyphs: Vec<(u32, i32)> = t
            .glyphs()
            .iter()
            .map(|g| (g.cluster, g.x_advance))
            .collect();
        glyphs.sort_unstable();
        (t.is_rtl(), glyphs)
    };
    let (ltr_rtl, ltr_glyphs) = run(Direction::Ltr);
    let (rtl_rtl, rtl_glyphs) = run(Direction::Rtl);
    assert!(!ltr_rtl);
    assert!(rtl_rtl);
    assert_eq!(ltr_glyphs, rtl_glyphs);
}

#[test]
fn alignment_shifts_lines() {
    let mut right = build("aa bb");
    right.set_line_width(100);
    right.set_alignment(Alignment::Right);
    right.layout().unwrap();
    // 5 glyphs of advance 10: spare is 50
    assert_eq!(right.glyphs()[0].x_position, 50);

    let mut center = build("aa bb");
    center.set_line_width(100);
    center.set_alignment(Alignment::Center);
    center.layout().unwrap();
    assert_eq!(center.glyphs()[0].x_position, 25);

    // Start resolves to the right edge for RTL paragraphs
    let mut start = build("عربي");
    start.set_line_width(100);
    start.layout().unwrap();
    assert_eq!(start.glyphs()[0].x_position, 60);
}

#[test]
fn justification_distributes_word_space() {
    let mut t = build("one two three");
    t.set_line_width(75);
    t.set_alignment(Alignment::Full);
    t.layout().unwrap();

    // Line 0 wraps after "two " with 5 units of slack and one interior
    // space: "two" shifts right by the full slack.
    let g = |cluster: u32| *t.glyphs().iter().find(|g| g.cluster == cluster).unwrap();
    assert_eq!(g(0).x_position, 0); // 'o' of one
    assert_eq!(g(4).x_position, 45); // 't' of two: 40 + 5
    // The unwrapped last line is not justified
    assert_eq!(g(8).x_position, 0); // 't' of three
}

#[test]
fn relayout_after_reconfiguration() {
    let mut t = build("one two three four");
    t.layout().unwrap();
    assert_eq!(t.num_lines(), 1);
    let unwrapped = t.glyphs().len();

    t.set_line_width(75);
    t.layout().unwrap();
    assert!(t.num_lines() > 1);
    assert_eq!(t.glyphs().len(), unwrapped);
}
