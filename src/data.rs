// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Simple data types

/// Base paragraph direction
///
/// This sets the "paragraph embedding level" of the Unicode Bidirectional
/// Algorithm. With [`Direction::Default`] the direction is detected from the
/// first character with a strong bidi type (rule P2), which is usually good
/// enough but may pick the wrong direction when a mainly right-to-left
/// paragraph starts with a left-to-right character (or vice versa), or when
/// the text has no strong characters at all (only punctuation or numbers), in
/// which case it falls back to left-to-right.
///
/// [`Direction::TopToBottom`] lays the text out as a single vertical flow;
/// there is no re-ordering and no rotation of embedded horizontal text.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Auto-detect from the first strong character (default)
    #[default]
    Default,
    /// Left-to-right
    Ltr,
    /// Right-to-left
    Rtl,
    /// Top-to-bottom (vertical)
    TopToBottom,
}

/// Direction of a single shaping run
///
/// Runs of a horizontal paragraph are left-to-right or right-to-left
/// according to their embedding level; every run of a vertical paragraph is
/// top-to-bottom.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RunDirection {
    /// Left-to-right
    Ltr,
    /// Right-to-left
    Rtl,
    /// Top-to-bottom
    Ttb,
}

/// Horizontal alignment of lines
///
/// Alignment only applies once a wrap width has been set with
/// [`crate::Text::set_line_width`] (without a width there is no edge to align
/// to).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Alignment {
    /// Align to the line's starting edge (left for LTR paragraphs, right for
    /// RTL paragraphs); the default
    #[default]
    Start,
    /// Align to the line's trailing edge
    End,
    /// Align to the left edge
    Left,
    /// Align to the right edge
    Right,
    /// Center within the wrap width
    Center,
    /// Justify: distribute slack across the word spaces of wrapped lines
    Full,
}

/// Range type
///
/// Essentially this is just a `std::ops::Range<u32>`, but with convenient
/// implementations (see also [`crate::conv`]).
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Range {
    pub start: u32,
    pub end: u32,
}

impl Range {
    /// The start, as `usize`
    #[inline]
    pub fn start(&self) -> usize {
        self.start as usize
    }

    /// The end, as `usize`
    #[inline]
    pub fn end(&self) -> usize {
        self.end as usize
    }

    /// The number of indices covered
    #[inline]
    pub fn len(&self) -> usize {
        (self.end - self.start) as usize
    }

    /// True if the given value is contained
    #[inline]
    pub fn contains(&self, value: usize) -> bool {
        self.start as usize <= value && value < self.end as usize
    }

    /// Convert to a `std::ops::Range`
    #[inline]
    pub fn to_std(self) -> std::ops::Range<usize> {
        self.start()..self.end()
    }
}

impl<T> std::ops::Index<Range> for [T] {
    type Output = [T];

    fn index(&self, range: Range) -> &[T] {
        &self[range.to_std()]
    }
}

impl std::ops::Index<Range> for str {
    type Output = str;

    fn index(&self, range: Range) -> &str {
        &self[range.to_std()]
    }
}

impl From<Range> for std::ops::Range<usize> {
    fn from(range: Range) -> std::ops::Range<usize> {
        range.to_std()
    }
}

impl From<std::ops::Range<u32>> for Range {
    fn from(range: std::ops::Range<u32>) -> Range {
        Range {
            start: range.start,
            end: range.end,
        }
    }
}

impl From<std::ops::Range<usize>> for Range {
    fn from(range: std::ops::Range<usize>) -> Range {
        assert!(range.end <= u32::MAX as usize);
        Range {
            start: range.start as u32,
            end: range.end as u32,
        }
    }
}
