/// Cuts `text` to at most `max_chars` characters, ending in `…` when shortened.
/// Counts chars, not bytes, so multibyte text is never split mid-sequence.
pub fn trim_with_ellipsis(text: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return String::new();
    }
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut s: String = text.chars().take(max_chars - 1).collect();
    s.push('…');
    s
}
