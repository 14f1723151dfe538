//! Response parser: splits a leading `[MUSIC: <keyword>]` tag from the story body.
//!
//! Parsing runs in two pure phases. [`detect_tag`] looks for the tag anchored
//! at the very start of the text; [`parse`] then computes the trimmed
//! remainder. Text without a tag passes through untouched. Parsing never fails.

use serde::{Deserialize, Serialize};

const TAG_OPEN: &str = "[MUSIC:";
const TAG_CLOSE: char = ']';

/// Story body plus the optional music keyword announced by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedStory {
    /// `Some("")` for `[MUSIC: ]`; empty keywords are not suppressed here.
    pub music_keyword: Option<String>,
    pub body: String,
}

/// A tag found at the start of the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag<'a> {
    /// Trimmed keyword
    pub keyword: &'a str,
    /// Byte offset just past the closing `]`
    pub end: usize,
}

/// Phase one: match `\s*\[MUSIC:\s*(.*?)\]` at the start of `raw`.
///
/// The capture ends at the first `]` and never spans a line break.
pub fn detect_tag(raw: &str) -> Option<Tag<'_>> {
    let start = raw.len() - raw.trim_start().len();
    let after_open = start + raw[start..].strip_prefix(TAG_OPEN).map(|_| TAG_OPEN.len())?;

    let rest = &raw[after_open..];
    let capture_start = after_open + (rest.len() - rest.trim_start().len());

    let capture = &raw[capture_start..];
    let close = capture.find(|c: char| c == TAG_CLOSE || c == '\n' || c == '\r')?;
    if !capture[close..].starts_with(TAG_CLOSE) {
        return None;
    }

    Some(Tag {
        keyword: capture[..close].trim(),
        end: capture_start + close + TAG_CLOSE.len_utf8(),
    })
}

/// Phase two: the body left once the tag is removed.
pub fn strip_tag<'a>(raw: &'a str, tag: &Tag<'_>) -> &'a str {
    raw[tag.end..].trim()
}

/// Split generated text into music keyword and story body.
pub fn parse(raw_text: &str) -> ParsedStory {
    match detect_tag(raw_text) {
        Some(tag) => ParsedStory {
            music_keyword: Some(tag.keyword.to_string()),
            body: strip_tag(raw_text, &tag).to_string(),
        },
        None => ParsedStory {
            music_keyword: None,
            body: raw_text.to_string(),
        },
    }
}
