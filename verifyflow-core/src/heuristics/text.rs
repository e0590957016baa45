//! Char-boundary safe slicing helpers.
//!
//! Offsets handed around by the heuristics are byte offsets into UTF-8 text,
//! while every context window is measured in characters.

/// Byte index of the position `n_chars` characters before `byte_idx`
pub fn back_chars(text: &str, byte_idx: usize, n_chars: usize) -> usize {
    let byte_idx = floor_boundary(text, byte_idx);
    if n_chars == 0 {
        return byte_idx;
    }
    text[..byte_idx]
        .char_indices()
        .rev()
        .nth(n_chars - 1)
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Byte index of the position `n_chars` characters after `byte_idx`
pub fn forward_chars(text: &str, byte_idx: usize, n_chars: usize) -> usize {
    let byte_idx = floor_boundary(text, byte_idx);
    text[byte_idx..]
        .char_indices()
        .nth(n_chars)
        .map(|(i, _)| byte_idx + i)
        .unwrap_or(text.len())
}

/// Up to `n_chars` characters ending at `byte_idx`
pub fn window_before(text: &str, byte_idx: usize, n_chars: usize) -> &str {
    let end = floor_boundary(text, byte_idx);
    &text[back_chars(text, end, n_chars)..end]
}

/// Up to `n_chars` characters starting at `byte_idx`
pub fn window_after(text: &str, byte_idx: usize, n_chars: usize) -> &str {
    let start = floor_boundary(text, byte_idx);
    &text[start..forward_chars(text, start, n_chars)]
}

/// Characters `before` ahead of `start` through `after` past `end`
pub fn window_around(text: &str, start: usize, end: usize, before: usize, after: usize) -> &str {
    let from = back_chars(text, start, before);
    let to = forward_chars(text, end.max(start), after);
    &text[from..to.max(from)]
}

/// The first `n_chars` characters
pub fn char_prefix(text: &str, n_chars: usize) -> &str {
    &text[..forward_chars(text, 0, n_chars)]
}

pub fn truncate_chars(text: &str, n_chars: usize) -> String {
    char_prefix(text, n_chars).to_string()
}

/// Collapse whitespace runs into single spaces and trim
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn floor_boundary(text: &str, mut idx: usize) -> usize {
    if idx >= text.len() {
        return text.len();
    }
    while !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_count_characters_not_bytes() {
        let text = "дата 01.02.2024 конец";
        let start = text.find("01").unwrap();
        assert_eq!(window_before(text, start, 5), "дата ");
        assert_eq!(window_after(text, start, 10), "01.02.2024");
    }

    #[test]
    fn windows_clamp_at_text_edges() {
        let text = "абв";
        assert_eq!(window_before(text, 2, 50), "а");
        assert_eq!(window_after(text, 2, 50), "бв");
        assert_eq!(window_around(text, 2, 4, 100, 100), "абв");
    }

    #[test]
    fn prefix_is_char_safe() {
        assert_eq!(char_prefix("привет", 3), "при");
        assert_eq!(truncate_chars("ok", 10), "ok");
    }

    #[test]
    fn collapses_mixed_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b  "), "a b");
    }
}
