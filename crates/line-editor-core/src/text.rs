//! Character-indexed helpers over UTF-8 line text.
//!
//! Positions in this crate count Unicode scalar values, while `String` slicing works in
//! bytes. Everything that converts between the two lives here.

/// Number of characters in `text`.
pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte offset of the `character`-th char, clamped to the end of `text`.
pub(crate) fn byte_offset(text: &str, character: usize) -> usize {
    text.char_indices()
        .nth(character)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

/// Split `text` at a character index (clamped).
pub(crate) fn split_at_char(text: &str, character: usize) -> (&str, &str) {
    text.split_at(byte_offset(text, character))
}

/// The `[start, end)` character slice of `text`, both ends clamped.
pub(crate) fn char_slice(text: &str, start: usize, end: usize) -> &str {
    let start_byte = byte_offset(text, start);
    let end_byte = byte_offset(text, end.max(start));
    &text[start_byte..end_byte]
}

/// Remove `[start, end)` (in chars) from `text` and put `insert` in its place.
pub(crate) fn splice_chars(text: &str, start: usize, end: usize, insert: &str) -> String {
    let start_byte = byte_offset(text, start);
    let end_byte = byte_offset(text, end.max(start));
    let mut out = String::with_capacity(text.len() - (end_byte - start_byte) + insert.len());
    out.push_str(&text[..start_byte]);
    out.push_str(insert);
    out.push_str(&text[end_byte..]);
    out
}
