//! Markdown rendering using comrak
//!
//! This module wraps comrak to render the post body to HTML, converts the
//! comrak AST into lightweight preview blocks for the in-app preview, and
//! throttles keystroke-driven re-renders.

use comrak::{
    markdown_to_html,
    nodes::{AstNode, ListType, NodeValue},
    parse_document, Arena, Options,
};
use std::time::{Duration, Instant};

// ─────────────────────────────────────────────────────────────────────────────
// Options
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration options for markdown rendering.
#[derive(Debug, Clone)]
pub struct MarkdownOptions {
    /// Enable GitHub Flavored Markdown tables
    pub tables: bool,
    /// Enable strikethrough syntax (~~text~~)
    pub strikethrough: bool,
    /// Enable autolink URLs and emails
    pub autolink: bool,
    /// Enable task lists (- [ ] and - [x])
    pub tasklist: bool,
    /// Strip raw HTML and dangerous URLs from the output
    pub safe_html: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            tables: true,
            strikethrough: true,
            autolink: true,
            tasklist: true,
            safe_html: true,
        }
    }
}

impl MarkdownOptions {
    /// Convert to comrak Options.
    fn to_comrak_options(&self) -> Options {
        let mut options = Options::default();

        options.extension.strikethrough = self.strikethrough;
        options.extension.table = self.tables;
        options.extension.autolink = self.autolink;
        options.extension.tasklist = self.tasklist;

        options.render.unsafe_ = !self.safe_html;

        options
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HTML Rendering
// ─────────────────────────────────────────────────────────────────────────────

/// Render markdown to an HTML string with the default options.
pub fn render_markdown(markdown: &str) -> String {
    render_markdown_with_options(markdown, &MarkdownOptions::default())
}

/// Render markdown to an HTML string.
pub fn render_markdown_with_options(markdown: &str, options: &MarkdownOptions) -> String {
    markdown_to_html(markdown, &options.to_comrak_options())
}

/// Wrap a post into a standalone HTML page for viewing in a browser.
pub fn generate_html_document(title: &str, markdown: &str) -> String {
    let doc_title = if title.trim().is_empty() {
        "Untitled post"
    } else {
        title
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
{css}
    </style>
</head>
<body>
    <article class="post">
    <h1>{title}</h1>
{body}
    </article>
</body>
</html>"#,
        title = html_escape(doc_title),
        css = DOCUMENT_CSS,
        body = render_markdown(markdown),
    )
}

const DOCUMENT_CSS: &str = r#"
body {
    margin: 0;
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
    font-size: 16px;
    line-height: 1.6;
    color: #24292e;
}
.post { max-width: 800px; margin: 0 auto; padding: 32px 24px; }
.post img { max-width: 100%; }
.post pre { background: #f6f8fa; padding: 12px; overflow: auto; }
.post blockquote { margin: 0; padding-left: 16px; border-left: 4px solid #dfe2e5; color: #6a737d; }
"#;

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

// ─────────────────────────────────────────────────────────────────────────────
// Preview Blocks
// ─────────────────────────────────────────────────────────────────────────────

/// Inline styling of a preview span.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpanStyle {
    pub strong: bool,
    pub emphasis: bool,
    pub code: bool,
    pub strikethrough: bool,
    /// Target of the enclosing link or image
    pub link: Option<String>,
    /// Whether the span is the alt text of an image
    pub image: bool,
}

/// A run of text with uniform styling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub style: SpanStyle,
}

/// Block-level element of the preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewBlock {
    Heading { level: u8, spans: Vec<Span> },
    Paragraph(Vec<Span>),
    Quote(Vec<PreviewBlock>),
    List {
        ordered: bool,
        start: usize,
        items: Vec<Vec<PreviewBlock>>,
    },
    Code { info: String, literal: String },
    Html(String),
    Rule,
}

/// Parse markdown into preview blocks.
pub fn parse_preview(markdown: &str) -> Vec<PreviewBlock> {
    let arena = Arena::new();
    let options = MarkdownOptions::default().to_comrak_options();
    let root = parse_document(&arena, markdown, &options);
    convert_blocks(root)
}

fn convert_blocks<'a>(parent: &'a AstNode<'a>) -> Vec<PreviewBlock> {
    let mut blocks = Vec::new();
    for node in parent.children() {
        let value = node.data.borrow().value.clone();
        match value {
            NodeValue::Heading(heading) => blocks.push(PreviewBlock::Heading {
                level: heading.level,
                spans: collect_spans(node),
            }),
            NodeValue::Paragraph => blocks.push(PreviewBlock::Paragraph(collect_spans(node))),
            NodeValue::BlockQuote => blocks.push(PreviewBlock::Quote(convert_blocks(node))),
            NodeValue::List(list) => blocks.push(PreviewBlock::List {
                ordered: list.list_type == ListType::Ordered,
                start: list.start,
                items: node.children().map(convert_blocks).collect(),
            }),
            NodeValue::CodeBlock(code) => blocks.push(PreviewBlock::Code {
                info: code.info,
                literal: code.literal,
            }),
            NodeValue::HtmlBlock(html) => blocks.push(PreviewBlock::Html(html.literal)),
            NodeValue::ThematicBreak => blocks.push(PreviewBlock::Rule),
            // Tables, footnotes, task items: flatten whatever they contain
            _ => {
                let nested = convert_blocks(node);
                if nested.is_empty() {
                    let spans = collect_spans(node);
                    if !spans.is_empty() {
                        blocks.push(PreviewBlock::Paragraph(spans));
                    }
                } else {
                    blocks.extend(nested);
                }
            }
        }
    }
    blocks
}

fn collect_spans<'a>(node: &'a AstNode<'a>) -> Vec<Span> {
    let mut spans = Vec::new();
    for child in node.children() {
        push_spans(child, &SpanStyle::default(), &mut spans);
    }
    spans
}

fn push_spans<'a>(node: &'a AstNode<'a>, style: &SpanStyle, out: &mut Vec<Span>) {
    let value = node.data.borrow().value.clone();
    let mut nested = style.clone();
    match value {
        NodeValue::Text(text) => {
            push_text(out, text, style);
            return;
        }
        NodeValue::Code(code) => {
            nested.code = true;
            push_text(out, code.literal, &nested);
            return;
        }
        NodeValue::HtmlInline(html) => {
            push_text(out, html, style);
            return;
        }
        NodeValue::SoftBreak => {
            push_text(out, " ".to_string(), style);
            return;
        }
        NodeValue::LineBreak => {
            push_text(out, "\n".to_string(), style);
            return;
        }
        NodeValue::Emph => nested.emphasis = true,
        NodeValue::Strong => nested.strong = true,
        NodeValue::Strikethrough => nested.strikethrough = true,
        NodeValue::Link(link) => nested.link = Some(link.url),
        NodeValue::Image(link) => {
            nested.link = Some(link.url);
            nested.image = true;
            if node.first_child().is_none() {
                push_text(out, "image".to_string(), &nested);
                return;
            }
        }
        _ => {}
    }
    for child in node.children() {
        push_spans(child, &nested, out);
    }
}

/// Append text, merging with the previous span when the style matches.
fn push_text(out: &mut Vec<Span>, text: String, style: &SpanStyle) {
    if text.is_empty() {
        return;
    }
    if let Some(last) = out.last_mut() {
        if &last.style == style {
            last.text.push_str(&text);
            return;
        }
    }
    out.push(Span {
        text,
        style: style.clone(),
    });
}

// ─────────────────────────────────────────────────────────────────────────────
// Render Throttling
// ─────────────────────────────────────────────────────────────────────────────

/// Leading/trailing throttle for keystroke-driven preview renders.
///
/// The first request in a quiet period renders immediately; requests inside
/// the interval are coalesced into a single trailing render once the
/// interval has elapsed.
#[derive(Debug, Clone)]
pub struct PreviewThrottle {
    interval: Duration,
    last_run: Option<Instant>,
    pending: bool,
}

impl PreviewThrottle {
    /// Create a throttle with the given minimum interval.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_run: None,
            pending: false,
        }
    }

    /// Register a change. Returns `true` if the caller should render now.
    pub fn request(&mut self, now: Instant) -> bool {
        if self.is_open(now) {
            self.last_run = Some(now);
            self.pending = false;
            true
        } else {
            self.pending = true;
            false
        }
    }

    /// Returns `true` once when a coalesced trailing render is due.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.pending && self.is_open(now) {
            self.pending = false;
            self.last_run = Some(now);
            true
        } else {
            false
        }
    }

    /// Time left until the trailing render, if one is pending.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        if !self.pending {
            return None;
        }
        let elapsed = self
            .last_run
            .map(|t| now.saturating_duration_since(t))
            .unwrap_or(self.interval);
        Some(self.interval.saturating_sub(elapsed))
    }

    /// Forget any pending render (the caller rendered out of band).
    pub fn reset(&mut self, now: Instant) {
        self.pending = false;
        self.last_run = Some(now);
    }

    fn is_open(&self, now: Instant) -> bool {
        self.last_run
            .map(|t| now.saturating_duration_since(t) >= self.interval)
            .unwrap_or(true)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
