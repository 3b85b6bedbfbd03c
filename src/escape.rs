//! HTML/XML escaping for text interpolated outside of maud markup.

use std::borrow::Cow;

/// Escape `&`, `<`, `>`, `"` and `'`. Apply once per interpolation point;
/// escaping already-escaped text encodes the entities again.
pub fn escape(text: &str) -> Cow<'_, str> {
    html_escape::encode_quoted_attribute(text)
}
