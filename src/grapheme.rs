// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Grapheme cluster boundaries
//!
//! Cursor positions are constrained to grapheme cluster boundaries (UAX #29):
//! CRLF is a single cluster, combining marks attach to their base, regional
//! indicator pairs stay together, and so on. The boundary rules come from
//! `unicode-segmentation`; this module adapts them to the byte offsets the
//! cursor mapper works with.

use unicode_segmentation::GraphemeCursor;

/// Whether a grapheme cluster boundary lies at `offset`
///
/// `offset` must lie on a code point boundary of `text`.
pub(crate) fn is_boundary(text: &str, offset: usize) -> bool {
    let mut cursor = GraphemeCursor::new(offset, text.len(), true);
    cursor.is_boundary(text, 0).unwrap_or(true)
}

/// The nearest boundary at or after `offset`
pub(crate) fn snap_forward(text: &str, offset: usize) -> usize {
    if offset >= text.len() {
        return text.len();
    }
    if is_boundary(text, offset) {
        return offset;
    }
    let mut cursor = GraphemeCursor::new(offset, text.len(), true);
    match cursor.next_boundary(text, 0) {
        Ok(Some(next)) => next,
        _ => text.len(),
    }
}
