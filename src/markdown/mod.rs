//! Markdown editing and rendering module
//!
//! This module provides the markdown side of the post composer using the
//! comrak library, a CommonMark + GFM compatible parser.
//!
//! # Features
//! - Cursor-relative insertion of markdown shortcuts and image markup
//! - Render markdown to HTML and to preview blocks for egui
//! - Throttled preview rendering
//! - Extraction of images, links and mentions for post metadata
//!
//! # Example
//! ```ignore
//! use crate::markdown::{MarkdownShortcut, Selection, render_markdown};
//!
//! let insertion = MarkdownShortcut::Bold.apply("Hello world", Selection::cursor(5));
//! assert_eq!(insertion.text, "Hello**** world");
//! let html = render_markdown(&insertion.text);
//! ```

mod metadata;
mod render;
mod shortcuts;

pub use metadata::{extract_metadata, BodyMetadata};
pub use render::{
    generate_html_document, parse_preview, render_markdown, PreviewBlock, PreviewThrottle, Span,
    SpanStyle,
};
pub use shortcuts::{insert_at_cursor, insert_image, Insertion, MarkdownShortcut, Selection};
