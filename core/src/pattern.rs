//! Wildcard comparison for configuration rules.
//!
//! Rules such as `"sd*"` or `"*:/ISO/a*c.iso"` are matched against device and
//! file names. A `*` in the pattern stands for exactly ONE text byte; it is
//! not a glob and never matches a run or an empty span.
//!
//! The comparison works like `strcmp`: both cursors advance together until a
//! literal mismatch or until either side runs out, and the result is the
//! difference between the two bytes under the cursor. A string that has run
//! out reads as `0` there, so a pattern that is a strict prefix of the text
//! (or the other way round) compares non-zero.
//!
//! Bytes are compared unsigned. An embedded NUL ends a string, same as the
//! end of the slice.

/// Single-byte wildcard glyph.
pub const WILDCARD: u8 = b'*';

/// Byte at `i`, reading past the end as the terminator.
#[inline]
fn byte_at(s: &[u8], i: usize) -> u8 {
    s.get(i).copied().unwrap_or(0)
}

#[inline]
fn diff_at(pattern: &[u8], text: &[u8], i: usize) -> i32 {
    byte_at(pattern, i) as i32 - byte_at(text, i) as i32
}

/// Compare `text` against `pattern`; 0 means match.
///
/// Non-zero results are the byte difference at the stopping position, with a
/// `*` in the pattern accepted as equal to any single text byte.
pub fn wildcard_cmp(pattern: &[u8], text: &[u8]) -> i32 {
    let mut i = 0;
    loop {
        let p = byte_at(pattern, i);
        let t = byte_at(text, i);
        if p == 0 || t == 0 {
            break;
        }
        if p != t && p != WILDCARD {
            break;
        }
        i += 1;
    }
    diff_at(pattern, text, i)
}

/// Length-bounded [`wildcard_cmp`].
///
/// At most `max` positions take part in the comparison; the byte difference at
/// the last of them is returned raw, so a `*` sitting exactly on the bound is
/// compared literally. A bound of 0 always compares equal.
pub fn wildcard_ncmp(pattern: &[u8], text: &[u8], max: usize) -> i32 {
    if max == 0 {
        return 0;
    }

    let mut remaining = max;
    let mut i = 0;
    loop {
        let p = byte_at(pattern, i);
        let t = byte_at(text, i);
        if p == 0 || t == 0 {
            break;
        }
        remaining -= 1;
        if remaining == 0 {
            break;
        }
        if p != t && p != WILDCARD {
            break;
        }
        i += 1;
    }
    diff_at(pattern, text, i)
}

/// `true` when `text` matches `pattern` exactly (see [`wildcard_cmp`]).
#[inline]
pub fn wildcard_match(pattern: &str, text: &str) -> bool {
    wildcard_cmp(pattern.as_bytes(), text.as_bytes()) == 0
}

/// `true` when the first `max` positions match (see [`wildcard_ncmp`]).
#[inline]
pub fn wildcard_match_n(pattern: &str, text: &str, max: usize) -> bool {
    wildcard_ncmp(pattern.as_bytes(), text.as_bytes(), max) == 0
}

/// Boundary form for callers holding optional strings.
///
/// A missing pattern or text is rejected as "no match" without being compared.
pub fn wildcard_matches_opt(pattern: Option<&str>, text: Option<&str>) -> bool {
    match (pattern, text) {
        (Some(pattern), Some(text)) => wildcard_match(pattern, text),
        _ => false,
    }
}
