//! Small string helpers shared by the loader's rule matching.

/// Byte index of the last `ch` in `s`.
pub fn str_last(s: &str, ch: char) -> Option<usize> {
    s.char_indices()
        .filter(|&(_, c)| c == ch)
        .map(|(i, _)| i)
        .last()
}

/// `true` for a non-empty string made only of ASCII digits.
pub fn is_all_digit(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Lowercase ASCII letters in place; other bytes are left alone.
pub fn str_to_lower(s: &mut str) -> &mut str {
    s.make_ascii_lowercase();
    s
}

/// Uppercase ASCII letters in place; other bytes are left alone.
pub fn str_to_upper(s: &mut str) -> &mut str {
    s.make_ascii_uppercase();
    s
}
