// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Complex-script text layout
//!
//! Given a run of Unicode text and one or more font faces, this library
//! produces positioned glyphs ready for rendering:
//!
//! 1. the Unicode Bidirectional Algorithm orders the text visually;
//! 2. every code point is resolved to a concrete script (paired punctuation
//!    keeps the script of its opening context);
//! 3. the text is itemized into maximal runs sharing direction, script, font
//!    face, language and spacing attributes;
//! 4. each run is shaped into glyphs with advances and offsets;
//! 5. lines are broken at UAX #14 opportunities within the wrap width and
//!    aligned.
//!
//! The entry point is [`Text`]; see its documentation for an example.
//! Cursor↔position mapping with grapheme-cluster awareness is provided by
//! [`Text::index_to_position`] and [`Text::position_to_index`].
//!
//! Shaping is performed by the [`shaper::Shaper`] backend; the built-in
//! backend drives `rustybuzz`. Font fallback is out of scope: the caller
//! assigns a [`Face`] to every character range.

pub mod conv;

mod data;
pub use data::*;

mod display;
pub use display::{Glyph, RunInfo};

mod fonts;
pub use fonts::{Face, FaceId, FaceMetrics, InvalidFontData};

mod grapheme;
mod script;

pub mod shaper;

mod text;
pub use text::{Error, Text};

pub use unicode_script::Script;
