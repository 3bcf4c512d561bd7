//! Markdown Insertion Shortcuts
//!
//! This module provides the cursor-relative insertions behind the editor
//! toolbar and hotkeys. Every shortcut wraps the current selection in a
//! fixed prefix/suffix pair and moves the selection by fixed deltas.
//!
//! All offsets are character offsets (the unit text widgets report), not
//! byte offsets.
//!
//! # Usage
//! ```ignore
//! use crate::markdown::shortcuts::{MarkdownShortcut, Selection};
//!
//! let result = MarkdownShortcut::Bold.apply("Hello world", Selection::new(0, 5));
//! assert_eq!(result.text, "**Hello** world");
//! assert_eq!(result.selection, Selection::new(2, 7));
//! ```

use crate::string_utils::{char_count, char_index_to_byte_index};

// ─────────────────────────────────────────────────────────────────────────────
// Selection
// ─────────────────────────────────────────────────────────────────────────────

/// A selection range `[start, end)` in character offsets.
///
/// `start == end` is a collapsed cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    /// Create a selection, ordering the bounds.
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    /// A collapsed cursor at `offset`.
    pub fn cursor(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    /// Whether nothing is selected.
    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Clamp both bounds to a buffer of `len` characters.
    pub fn clamped(self, len: usize) -> Self {
        Self::new(self.start.min(len), self.end.min(len))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Insertion Result
// ─────────────────────────────────────────────────────────────────────────────

/// Result of inserting markup into the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    /// The new body text
    pub text: String,
    /// The selection to restore in the text widget
    pub selection: Selection,
}

// ─────────────────────────────────────────────────────────────────────────────
// Shortcut Enum
// ─────────────────────────────────────────────────────────────────────────────

/// The markdown constructs reachable from the toolbar and hotkeys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkdownShortcut {
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    Bold,
    Italic,
    Quote,
    Link,
    Image,
}

impl MarkdownShortcut {
    /// Every shortcut, in toolbar order.
    pub const ALL: [MarkdownShortcut; 11] = [
        MarkdownShortcut::H1,
        MarkdownShortcut::H2,
        MarkdownShortcut::H3,
        MarkdownShortcut::H4,
        MarkdownShortcut::H5,
        MarkdownShortcut::H6,
        MarkdownShortcut::Bold,
        MarkdownShortcut::Italic,
        MarkdownShortcut::Quote,
        MarkdownShortcut::Link,
        MarkdownShortcut::Image,
    ];

    /// The heading shortcut for `level` (1-6).
    pub fn heading(level: u8) -> Option<Self> {
        match level {
            1 => Some(Self::H1),
            2 => Some(Self::H2),
            3 => Some(Self::H3),
            4 => Some(Self::H4),
            5 => Some(Self::H5),
            6 => Some(Self::H6),
            _ => None,
        }
    }

    /// Text inserted before and after the selection, and the deltas applied
    /// to the selection start and end.
    pub fn insertion(&self) -> (&'static str, &'static str, usize, usize) {
        match self {
            Self::H1 => ("# ", "", 2, 2),
            Self::H2 => ("## ", "", 3, 3),
            Self::H3 => ("### ", "", 4, 4),
            Self::H4 => ("#### ", "", 5, 5),
            Self::H5 => ("##### ", "", 6, 6),
            Self::H6 => ("###### ", "", 7, 7),
            Self::Bold => ("**", "**", 2, 2),
            Self::Italic => ("*", "*", 1, 1),
            Self::Quote => ("> ", "", 2, 2),
            Self::Link => ("[", "](url)", 1, 1),
            Self::Image => ("![", "](url)", 2, 2),
        }
    }

    /// Apply this shortcut to `text` at `selection`.
    pub fn apply(&self, text: &str, selection: Selection) -> Insertion {
        let (before, after, delta_start, delta_end) = self.insertion();
        insert_at_cursor(text, selection, before, after, delta_start, delta_end)
    }

    /// Get the keyboard shortcut label for this command.
    pub fn shortcut_label(&self) -> &'static str {
        match self {
            Self::H1 => "Ctrl+Shift+1",
            Self::H2 => "Ctrl+Shift+2",
            Self::H3 => "Ctrl+Shift+3",
            Self::H4 => "Ctrl+Shift+4",
            Self::H5 => "Ctrl+Shift+5",
            Self::H6 => "Ctrl+Shift+6",
            Self::Bold => "Ctrl+B",
            Self::Italic => "Ctrl+I",
            Self::Quote => "Ctrl+Q",
            Self::Link => "Ctrl+K",
            Self::Image => "Ctrl+M",
        }
    }

    /// Get the toolbar label for this command.
    pub fn icon(&self) -> &'static str {
        match self {
            Self::H1 => "H1",
            Self::H2 => "H2",
            Self::H3 => "H3",
            Self::H4 => "H4",
            Self::H5 => "H5",
            Self::H6 => "H6",
            Self::Bold => "𝐁",
            Self::Italic => "𝐼",
            Self::Quote => "\u{275D}", // heavy double turned comma quotation mark ❝
            Self::Link => "🔗",
            Self::Image => "🖼",
        }
    }

    /// Get the tooltip text for this command.
    pub fn tooltip(&self) -> String {
        let name = match self {
            Self::H1 => "Heading 1",
            Self::H2 => "Heading 2",
            Self::H3 => "Heading 3",
            Self::H4 => "Heading 4",
            Self::H5 => "Heading 5",
            Self::H6 => "Heading 6",
            Self::Bold => "Bold",
            Self::Italic => "Italic",
            Self::Quote => "Quote",
            Self::Link => "Insert Link",
            Self::Image => "Insert Image",
        };
        format!("{} ({})", name, self.shortcut_label())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Insertion Operations
// ─────────────────────────────────────────────────────────────────────────────

/// Insert `before` and `after` around the selection.
///
/// The buffer becomes `text[..start] + before + selected + after + text[end..]`
/// and the selection moves to `[start + delta_start, end + delta_end)`.
pub fn insert_at_cursor(
    text: &str,
    selection: Selection,
    before: &str,
    after: &str,
    delta_start: usize,
    delta_end: usize,
) -> Insertion {
    let selection = selection.clamped(char_count(text));
    let start = char_index_to_byte_index(text, selection.start);
    let end = char_index_to_byte_index(text, selection.end);

    let mut out = String::with_capacity(text.len() + before.len() + after.len());
    out.push_str(&text[..start]);
    out.push_str(before);
    out.push_str(&text[start..end]);
    out.push_str(after);
    out.push_str(&text[end..]);

    Insertion {
        text: out,
        selection: Selection {
            start: selection.start + delta_start,
            end: selection.end + delta_end,
        },
    }
}

/// Replace the selection with an image reference.
///
/// A newline is appended to the end of the buffer, and the cursor lands at
/// the end of the buffer.
pub fn insert_image(text: &str, selection: Selection, url: &str, name: Option<&str>) -> Insertion {
    let selection = selection.clamped(char_count(text));
    let start = char_index_to_byte_index(text, selection.start);
    let end = char_index_to_byte_index(text, selection.end);
    let name = name.filter(|n| !n.is_empty()).unwrap_or("image");

    let new_text = format!("{}![{}]({}){}\n", &text[..start], name, url, &text[end..]);
    let cursor = char_count(&new_text);

    Insertion {
        text: new_text,
        selection: Selection::cursor(cursor),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bold_on_empty_selection_places_cursor_between_markers() {
        let result = MarkdownShortcut::Bold.apply("Hello world", Selection::cursor(5));
        assert_eq!(result.text, "Hello**** world");
        assert_eq!(result.selection, Selection::cursor(7));
    }

    #[test]
    fn test_bold_wraps_selection() {
        let result = MarkdownShortcut::Bold.apply("Hello world", Selection::new(0, 5));
        assert_eq!(result.text, "**Hello** world");
        assert_eq!(result.selection, Selection::new(2, 7));
    }

    #[test]
    fn test_italic_wraps_selection() {
        let result = MarkdownShortcut::Italic.apply("Hello world", Selection::new(6, 11));
        assert_eq!(result.text, "Hello *world*");
        assert_eq!(result.selection, Selection::new(7, 12));
    }

    #[test]
    fn test_headings_insert_marker_and_move_cursor_past_it() {
        for level in 1..=6u8 {
            let shortcut = MarkdownShortcut::heading(level).unwrap();
            let result = shortcut.apply("Title", Selection::cursor(0));
            let marker = format!("{} ", "#".repeat(level as usize));
            assert_eq!(result.text, format!("{}Title", marker));
            let delta = level as usize + 1;
            assert_eq!(result.selection, Selection::cursor(delta));
        }
    }

    #[test]
    fn test_heading_out_of_range() {
        assert_eq!(MarkdownShortcut::heading(0), None);
        assert_eq!(MarkdownShortcut::heading(7), None);
    }

    #[test]
    fn test_quote_inserts_marker_at_selection_start() {
        let result = MarkdownShortcut::Quote.apply("a\nquoted", Selection::new(2, 8));
        assert_eq!(result.text, "a\n> quoted");
        assert_eq!(result.selection, Selection::new(4, 10));
    }

    #[test]
    fn test_link_keeps_text_selected() {
        let result = MarkdownShortcut::Link.apply("Click here", Selection::new(6, 10));
        assert_eq!(result.text, "Click [here](url)");
        assert_eq!(result.selection, Selection::new(7, 11));
    }

    #[test]
    fn test_image_on_empty_selection() {
        let result = MarkdownShortcut::Image.apply("", Selection::cursor(0));
        assert_eq!(result.text, "![](url)");
        assert_eq!(result.selection, Selection::cursor(2));
    }

    #[test]
    fn test_every_shortcut_matches_insert_at_cursor() {
        let text = "some body text";
        let selection = Selection::new(5, 9);
        for shortcut in MarkdownShortcut::ALL {
            let (before, after, ds, de) = shortcut.insertion();
            let expected = format!("some {}body{} text", before, after);
            let result = shortcut.apply(text, selection);
            assert_eq!(result.text, expected, "{:?}", shortcut);
            assert_eq!(result.selection, Selection::new(5 + ds, 9 + de));
        }
    }

    #[test]
    fn test_selection_beyond_buffer_is_clamped() {
        let result = MarkdownShortcut::Bold.apply("abc", Selection::new(10, 20));
        assert_eq!(result.text, "abc****");
        assert_eq!(result.selection, Selection::cursor(5));
    }

    #[test]
    fn test_multibyte_text_uses_character_offsets() {
        // "på" starts at character 4
        let result = MarkdownShortcut::Bold.apply("Hei på deg", Selection::new(4, 6));
        assert_eq!(result.text, "Hei **på** deg");
        assert_eq!(result.selection, Selection::new(6, 8));

        let result = MarkdownShortcut::Italic.apply("🎉 party", Selection::new(0, 1));
        assert_eq!(result.text, "*🎉* party");
    }

    #[test]
    fn test_insert_image_replaces_selection_and_appends_newline() {
        let result = insert_image(
            "before SEL after",
            Selection::new(7, 10),
            "https://img/x.png",
            Some("x.png"),
        );
        assert_eq!(result.text, "before ![x.png](https://img/x.png) after\n");
        assert_eq!(result.selection, Selection::cursor(char_count(&result.text)));
    }

    #[test]
    fn test_insert_image_default_name() {
        let result = insert_image("", Selection::cursor(0), "u", None);
        assert_eq!(result.text, "![image](u)\n");

        let result = insert_image("", Selection::cursor(0), "u", Some(""));
        assert_eq!(result.text, "![image](u)\n");
    }

    #[test]
    fn test_metadata() {
        assert_eq!(MarkdownShortcut::Bold.shortcut_label(), "Ctrl+B");
        assert_eq!(MarkdownShortcut::Image.shortcut_label(), "Ctrl+M");
        let tooltip = MarkdownShortcut::Link.tooltip();
        assert!(tooltip.contains("Insert Link"));
        assert!(tooltip.contains("Ctrl+K"));
        assert!(MarkdownShortcut::ALL.iter().all(|s| !s.icon().is_empty()));
    }
}
