//! UTF-16 code-unit helpers
//!
//! Offsets produced by this crate are UTF-16 code units so they line up with
//! JavaScript string indices on the other side of the WASM boundary.

/// Length of `s` in UTF-16 code units.
pub fn len_utf16(s: &str) -> usize {
    s.chars().map(char::len_utf16).sum()
}

/// Trim the way `String.prototype.trim` does: Unicode whitespace plus the
/// byte-order mark U+FEFF.
pub fn trim_js(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}')
}

/// Encode `s` as UTF-16 code units.
pub fn to_units(s: &str) -> Vec<u16> {
    s.encode_utf16().collect()
}

/// Convert a byte offset in `s` into a UTF-16 offset.
///
/// `byte_idx` must lie on a char boundary.
pub fn byte_to_utf16(s: &str, byte_idx: usize) -> usize {
    len_utf16(&s[..byte_idx])
}

/// Convert a UTF-16 offset into a byte offset of `s`.
///
/// An offset that falls inside a surrogate pair rounds down to the start of
/// that char when `round_up` is false, or past it when true. Offsets beyond
/// the end clamp to `s.len()`.
pub fn utf16_to_byte(s: &str, unit_idx: usize, round_up: bool) -> usize {
    let mut units = 0;
    for (byte_idx, ch) in s.char_indices() {
        if units >= unit_idx {
            return byte_idx;
        }
        let next = units + ch.len_utf16();
        if next > unit_idx {
            // Inside a surrogate pair
            return if round_up { byte_idx + ch.len_utf8() } else { byte_idx };
        }
        units = next;
    }
    s.len()
}

/// Slice `s` by a half-open UTF-16 range, widening to char boundaries.
pub fn slice_utf16(s: &str, start: usize, end: usize) -> &str {
    if start >= end {
        return "";
    }
    let from = utf16_to_byte(s, start, false);
    let to = utf16_to_byte(s, end, true);
    &s[from..to.max(from)]
}

/// Find `needle` in `haystack`, returning the UTF-16 offset of the first hit.
pub fn find_utf16(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .find(needle)
        .map(|byte_idx| byte_to_utf16(haystack, byte_idx))
}
