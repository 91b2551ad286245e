//! Bounded previews for log lines

use std::borrow::Cow;

use crate::constants::logging::TRUNCATION_MARKER;

/// Keep at most `limit` characters of `text`, appending a marker when cut.
///
/// Counts chars, not bytes, so multi-byte text never splits mid-codepoint.
pub fn preview(text: &str, limit: usize) -> Cow<'_, str> {
    match text.char_indices().nth(limit) {
        None => Cow::Borrowed(text),
        Some((cut, _)) => Cow::Owned(format!("{}{}", &text[..cut], TRUNCATION_MARKER)),
    }
}
