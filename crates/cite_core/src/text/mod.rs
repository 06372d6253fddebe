//! Derived display text for citations.
//!
//! Everything here is a pure function of the citation fields. Counts are in Unicode scalar
//! values, never bytes, so truncation cannot split a character.

use serde::{Deserialize, Serialize};

use crate::domain::Citation;

pub const TITLE_MAX_WORDS: usize = 8;
/// A preview must be strictly longer than this to be used for the title.
pub const MIN_PREVIEW_CHARS: usize = 20;
pub const ELLIPSIS: char = '\u{2026}';
pub const UNTITLED: &str = "Untitled Document";
pub const NO_PREVIEW: &str = "No preview available";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DerivedText {
    pub title: String,
    pub body: String,
    /// True when the preview was absent or too short and placeholders were used.
    pub fallback: bool,
}

/// Whether `preview` is long enough to drive the title (`> 20` chars).
pub fn has_usable_preview(preview: Option<&str>) -> bool {
    match preview {
        Some(p) => p.chars().count() > MIN_PREVIEW_CHARS && p.split_whitespace().next().is_some(),
        None => false,
    }
}

/// Cut `text` to at most `max_chars` characters, appending an ellipsis when something was cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    let trimmed_len = out.trim_end().len();
    out.truncate(trimmed_len);
    out.push(ELLIPSIS);
    out
}

/// Split a preview into a title of at most `max_words` words and the remaining words.
///
/// The title gets an ellipsis iff words were dropped. The remainder is cut to `max_chars`.
pub fn split_preview(preview: &str, max_words: usize, max_chars: usize) -> (String, String) {
    let words: Vec<&str> = preview.split_whitespace().collect();
    let head = words.len().min(max_words);

    let mut title = words[..head].join(" ");
    if words.len() > head {
        title.push(ELLIPSIS);
    }

    let rest = words[head..].join(" ");
    (title, truncate_chars(&rest, max_chars))
}

/// Title shown on every affordance.
pub fn derive_title(preview: Option<&str>, source: &str) -> String {
    match preview {
        Some(p) if has_usable_preview(Some(p)) => split_preview(p, TITLE_MAX_WORDS, 0).0,
        _ => fallback_title(source),
    }
}

fn fallback_title(source: &str) -> String {
    let s = source.trim();
    if s.is_empty() {
        UNTITLED.to_string()
    } else {
        s.to_string()
    }
}

/// Title plus the words after the title, as shown by the expandable card and bottom sheet.
pub fn card_text(citation: &Citation, max_chars: usize) -> DerivedText {
    match citation.preview.as_deref() {
        Some(p) if has_usable_preview(Some(p)) => {
            let (title, body) = split_preview(p, TITLE_MAX_WORDS, max_chars);
            DerivedText {
                title,
                body,
                fallback: false,
            }
        }
        _ => placeholder(citation),
    }
}

/// Title plus the first `max_chars` characters of the preview, as shown by tooltips.
pub fn tooltip_text(citation: &Citation, max_chars: usize) -> DerivedText {
    match citation.preview.as_deref() {
        Some(p) if has_usable_preview(Some(p)) => DerivedText {
            title: split_preview(p, TITLE_MAX_WORDS, 0).0,
            body: truncate_chars(p.trim(), max_chars),
            fallback: false,
        },
        _ => placeholder(citation),
    }
}

fn placeholder(citation: &Citation) -> DerivedText {
    DerivedText {
        title: fallback_title(&citation.source),
        body: NO_PREVIEW.to_string(),
        fallback: true,
    }
}
