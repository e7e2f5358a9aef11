//! Chunk appending with smart spacing
//!
//! Token-level producers often drop the separator between words. When the
//! existing text ends in an ASCII letter or digit and the next chunk starts
//! with an ASCII capital, a single space is inserted.
//!
//! Trust is decided once, by [`MarkupTrust`]: escaped text unless the caller
//! opted in to raw markup. Both spacing modes honor it.

use crate::config::MarkupTrust;
use crate::ui::ContentSink;

/// Whether a space belongs between `existing` and `chunk`
pub fn needs_space(existing: &str, chunk: &str) -> bool {
    if chunk.starts_with(' ') {
        return false;
    }
    let Some(last) = existing.chars().next_back() else {
        return false;
    };
    let Some(first) = chunk.chars().next() else {
        return false;
    };
    last.is_ascii_alphanumeric() && first.is_ascii_uppercase()
}

/// Append `chunk` to `sink`, repairing the word boundary if enabled
pub fn append_chunk(sink: &dyn ContentSink, chunk: &str, smart_spacing: bool, trust: MarkupTrust) {
    let spaced;
    let content = if smart_spacing && needs_space(&sink.text(), chunk) {
        spaced = format!(" {}", chunk);
        spaced.as_str()
    } else {
        chunk
    };

    match trust {
        MarkupTrust::Escaped => sink.append_text(content),
        MarkupTrust::Raw => sink.append_markup(content),
    }
}
