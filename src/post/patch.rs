//! Body patches for post updates.
//!
//! Updating a post may broadcast a diff-match-patch text patch against the
//! published body instead of the full body. The chain applies the patch
//! when the body starts with `@@ `.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Context characters kept around a change
const PATCH_MARGIN: usize = 4;

/// Pattern length the patch matcher can locate reliably
const MATCH_MAX_BITS: usize = 32;

/// Characters left unescaped in patch text (the `encodeURI` set plus space)
const PATCH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b' ')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b';')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b',')
    .remove(b'#');

/// Return a patch from `original` to `body` when it is shorter than `body`.
///
/// Falls back to the full body when there is no original, nothing changed,
/// or the patch would not save space.
pub fn body_patch_if_smaller(original: Option<&str>, body: &str) -> String {
    let Some(original) = original.filter(|o| !o.is_empty()) else {
        return body.to_string();
    };

    match make_patch(original, body) {
        // Patch text is pure ASCII, so bytes equal characters
        Some(patch) if patch.len() < body.len() => patch,
        _ => body.to_string(),
    }
}

/// Build a single-hunk patch turning `old` into `new`.
///
/// Returns `None` when the texts are equal.
pub fn make_patch(old: &str, new: &str) -> Option<String> {
    if old == new {
        return None;
    }

    let a: Vec<char> = old.chars().collect();
    let b: Vec<char> = new.chars().collect();

    let prefix = a.iter().zip(&b).take_while(|(x, y)| x == y).count();
    let max_suffix = a.len().min(b.len()) - prefix;
    let suffix = a
        .iter()
        .rev()
        .zip(b.iter().rev())
        .take(max_suffix)
        .take_while(|(x, y)| x == y)
        .count();

    let a_end = a.len() - suffix;
    let b_end = b.len() - suffix;

    // Grow the context until the hunk is unique in the old text
    let mut padding = 0;
    loop {
        let start = prefix.saturating_sub(padding);
        let end = (a_end + padding).min(a.len());
        let pattern: String = a[start..end].iter().collect();
        let unique = old.find(&pattern) == old.rfind(&pattern);
        if unique || utf16_len(&a[start..end]) >= MATCH_MAX_BITS - 2 * PATCH_MARGIN {
            break;
        }
        padding += PATCH_MARGIN;
    }
    padding += PATCH_MARGIN;

    let start = prefix.saturating_sub(padding);
    let after = (a_end + padding).min(a.len()) - a_end;

    let head = &a[start..prefix];
    let removed = &a[prefix..a_end];
    let inserted = &b[prefix..b_end];
    let tail = &a[a_end..a_end + after];

    let start16 = utf16_len(&a[..start]);
    let len1 = utf16_len(head) + utf16_len(removed) + utf16_len(tail);
    let len2 = utf16_len(head) + utf16_len(inserted) + utf16_len(tail);

    let mut patch = format!(
        "@@ -{} +{} @@\n",
        coords(start16, len1),
        coords(start16, len2)
    );
    for (sign, chars) in [(' ', head), ('-', removed), ('+', inserted), (' ', tail)] {
        if !chars.is_empty() {
            patch.push(sign);
            patch.push_str(&encode(chars));
            patch.push('\n');
        }
    }
    Some(patch)
}

/// Hunk coordinates: 1-based start, length omitted when it is one.
fn coords(start: usize, len: usize) -> String {
    match len {
        0 => format!("{},0", start),
        1 => format!("{}", start + 1),
        _ => format!("{},{}", start + 1, len),
    }
}

fn encode(chars: &[char]) -> String {
    let text: String = chars.iter().collect();
    utf8_percent_encode(&text, PATCH_ENCODE_SET).to_string()
}

fn utf16_len(chars: &[char]) -> usize {
    chars.iter().map(|c| c.len_utf16()).sum()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use percent_encoding::percent_decode_str;

    /// Apply a single-hunk patch exactly at its coordinates.
    ///
    /// Context and deleted lines must match the old text at the stated
    /// UTF-16 offset, and the hunk lengths must match the header.
    fn apply_patch(old: &str, patch: &str) -> String {
        let mut lines = patch.lines();
        let header = lines.next().expect("patch header");
        let ranges: Vec<&str> = header
            .strip_prefix("@@ -")
            .and_then(|h| h.strip_suffix(" @@"))
            .expect("hunk header")
            .split(" +")
            .collect();
        let (start, len1) = parse_range(ranges[0]);
        let (_, len2) = parse_range(ranges[1]);

        let old16: Vec<u16> = old.encode_utf16().collect();
        let mut out: Vec<u16> = old16[..start].to_vec();
        let mut pos = start;
        let (mut consumed, mut produced) = (0, 0);

        for line in lines {
            let (sign, text) = line.split_at(1);
            let text: Vec<u16> = percent_decode_str(text)
                .decode_utf8()
                .expect("patch text is UTF-8")
                .encode_utf16()
                .collect();
            match sign {
                " " | "-" => {
                    assert_eq!(
                        &old16[pos..pos + text.len()],
                        text.as_slice(),
                        "context mismatch at {}",
                        pos
                    );
                    pos += text.len();
                    consumed += text.len();
                    if sign == " " {
                        out.extend_from_slice(&text);
                        produced += text.len();
                    }
                }
                "+" => {
                    out.extend_from_slice(&text);
                    produced += text.len();
                }
                other => panic!("Unexpected patch line sign {:?}", other),
            }
        }

        assert_eq!(consumed, len1, "old length in header");
        assert_eq!(produced, len2, "new length in header");
        out.extend_from_slice(&old16[pos..]);
        String::from_utf16(&out).expect("valid UTF-16")
    }

    /// `start,len` / `start` header range to a 0-based start and length.
    fn parse_range(range: &str) -> (usize, usize) {
        match range.split_once(',') {
            Some((start, "0")) => (start.parse().unwrap(), 0),
            Some((start, len)) => (start.parse::<usize>().unwrap() - 1, len.parse().unwrap()),
            None => (range.parse::<usize>().unwrap() - 1, 1),
        }
    }

    fn assert_round_trip(old: &str, new: &str) -> String {
        let patch = make_patch(old, new).expect("texts differ");
        assert!(patch.is_ascii());
        assert_eq!(apply_patch(old, &patch), new, "patch:\n{}", patch);
        patch
    }

    #[test]
    fn test_identical_texts_have_no_patch() {
        assert_eq!(make_patch("same", "same"), None);
        assert_eq!(body_patch_if_smaller(Some("same"), "same"), "same");
    }

    #[test]
    fn test_insertion_hunk() {
        let patch = make_patch("Hello world", "Hello brave world").unwrap();
        assert_eq!(patch, "@@ -1,11 +1,17 @@\n Hello \n+brave \n world\n");
    }

    #[test]
    fn test_deletion_hunk_in_long_text() {
        let old = format!("{}XYZ{}", "a".repeat(40), "b".repeat(40));
        let new = format!("{}{}", "a".repeat(40), "b".repeat(40));
        let patch = make_patch(&old, &new).unwrap();
        assert_eq!(patch, "@@ -37,11 +37,8 @@\n aaaa\n-XYZ\n bbbb\n");
    }

    #[test]
    fn test_non_ascii_is_percent_encoded() {
        let patch = make_patch("caf", "café\n").unwrap();
        assert!(patch.contains("+%C3%A9%0A\n"));
        assert!(patch.is_ascii());
    }

    #[test]
    fn test_utf16_coordinates() {
        // The emoji counts as two UTF-16 units
        let patch = make_patch("😀 ab", "😀 xb").unwrap();
        assert!(patch.starts_with("@@ -1,5 +1,5 @@\n"));
    }

    #[test]
    fn test_patch_used_when_smaller() {
        let original = format!("{}\n\nThe end.", "Lorem ipsum dolor sit amet. ".repeat(40));
        let body = original.replace("The end.", "The very end.");
        let result = body_patch_if_smaller(Some(&original), &body);
        assert!(result.starts_with("@@ "));
        assert!(result.len() < body.len());
    }

    #[test]
    fn test_full_body_when_patch_is_larger() {
        assert_eq!(
            body_patch_if_smaller(Some("Hello world"), "Hello brave world"),
            "Hello brave world"
        );
    }

    #[test]
    fn test_full_body_without_original() {
        assert_eq!(body_patch_if_smaller(None, "body"), "body");
        assert_eq!(body_patch_if_smaller(Some(""), "body"), "body");
    }

    #[test]
    fn test_round_trip_multibyte_text() {
        assert_round_trip("😀 ab", "😀 xb");
        assert_round_trip("Grüße aus Köln, 日本語のテキスト", "Grüße aus Bonn, 日本語のテキストです");
        assert_round_trip("café 🎉🎉 crème", "café 🎉 brûlée 🎉 crème");
    }

    #[test]
    fn test_round_trip_change_at_start_and_end() {
        let start = assert_round_trip("Hello world", "Jello world");
        assert!(start.starts_with("@@ -1,5 +1,5 @@\n"));
        assert_round_trip("Hello world", "Hello world!");
        assert_round_trip("Hello world", "Hello");
        assert_round_trip("Hello world", "Oh, hello world");
    }

    #[test]
    fn test_round_trip_repeated_context_is_padded() {
        let old = "ab ab ab ab ab ab ab ab";
        let new = "ab ab ab ab! ab ab ab ab";
        let patch = assert_round_trip(old, new);
        // The minimal margin of four characters would not be unique
        let context: usize = patch
            .lines()
            .filter(|line| line.starts_with(' '))
            .map(|line| line.len() - 1)
            .sum();
        assert!(context > 2 * PATCH_MARGIN, "patch:\n{}", patch);
    }

    #[test]
    fn test_round_trip_long_hunk() {
        let old = format!("start {} end", "x".repeat(50));
        let new = format!("start {} end", "y".repeat(45));
        assert_round_trip(&old, &new);

        let old = format!("{}🎉{}", "a".repeat(60), "a".repeat(60));
        let new = format!("{}{}", "a".repeat(60), "a".repeat(60));
        assert_round_trip(&old, &new);
    }

    #[test]
    fn test_round_trip_escaped_characters() {
        assert_round_trip("100% done\nline two", "100% sure\nline 2 + more");
        assert_round_trip("", "new body");
    }

    #[test]
    fn test_body_patch_applies_to_original() {
        let original = format!("{}\n\nThe end.", "Lorem ipsum dolor sit amet. ".repeat(40));
        let body = original.replace("The end.", "The very end. ✓");
        let patch = body_patch_if_smaller(Some(&original), &body);
        assert!(patch.starts_with("@@ "));
        assert_eq!(apply_patch(&original, &patch), body);
    }
}
