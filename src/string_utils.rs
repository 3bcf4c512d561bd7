//! UTF-8 Safe String Utilities
//!
//! Text widgets report cursor and selection positions as character offsets,
//! while Rust strings are sliced by byte. These helpers convert between the
//! two so that multi-byte characters (`ø`, `中`, `🎉`) never cause a panic
//! when the body is spliced.

// ─────────────────────────────────────────────────────────────────────────────
// Index Conversion Utilities
// ─────────────────────────────────────────────────────────────────────────────

/// Number of characters in `s`.
#[inline]
pub fn char_count(s: &str) -> usize {
    s.chars().count()
}

/// Convert a character index to a byte index.
///
/// Returns the string length if `char_index` is beyond the string.
pub fn char_index_to_byte_index(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_index_to_byte_index() {
        let s = "Hei på deg";
        assert_eq!(char_index_to_byte_index(s, 0), 0);
        assert_eq!(char_index_to_byte_index(s, 5), 5);
        assert_eq!(char_index_to_byte_index(s, 6), 7);
        assert_eq!(char_index_to_byte_index(s, 100), s.len());
    }

    #[test]
    fn test_char_count() {
        assert_eq!(char_count("🎉ab"), 3);
        assert_eq!(char_count(""), 0);
    }
}
