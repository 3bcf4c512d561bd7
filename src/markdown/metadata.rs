//! Body metadata extraction
//!
//! Collects the images, links and account mentions a post body references.
//! These end up in the `json_metadata` of the broadcast comment.

use regex::Regex;
use std::sync::LazyLock;

/// Markdown image: `![alt](url "title")`
static MD_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"!\[[^\]]*\]\(\s*<?([^)\s>]+)>?(?:\s+"[^"]*")?\s*\)"#).unwrap());

/// Markdown link, including the `!` of images so they can be skipped
static MD_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(!?)\[[^\]]*\]\(\s*<?([^)\s>]+)>?(?:\s+"[^"]*")?\s*\)"#).unwrap());

/// `<img src="...">` in raw HTML
static HTML_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<img[^>]+src\s*=\s*["']([^"']+)["']"#).unwrap());

/// `<a href="...">` in raw HTML
static HTML_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<a[^>]+href\s*=\s*["']([^"']+)["']"#).unwrap());

/// `@account` mention at the start of the text or after a non-word
/// character. E-mail addresses and URL paths like `/@user/post` don't match.
static MENTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\w/@.+\-])@([a-z][a-z0-9\-.]{2,15}[a-z0-9])").unwrap()
});

/// References collected from a post body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BodyMetadata {
    pub images: Vec<String>,
    pub links: Vec<String>,
    pub users: Vec<String>,
}

/// Extract image URLs, links and `@user` mentions from a markdown body.
///
/// Each list keeps first-occurrence order without duplicates.
pub fn extract_metadata(body: &str) -> BodyMetadata {
    let mut meta = BodyMetadata::default();

    for caps in MD_IMAGE.captures_iter(body).chain(HTML_IMAGE.captures_iter(body)) {
        push_unique(&mut meta.images, &caps[1]);
    }

    for caps in MD_LINK.captures_iter(body) {
        if caps[1].is_empty() {
            push_unique(&mut meta.links, &caps[2]);
        }
    }
    for caps in HTML_LINK.captures_iter(body) {
        push_unique(&mut meta.links, &caps[1]);
    }

    for caps in MENTION.captures_iter(body) {
        let name = caps[1].trim_end_matches('.');
        push_unique(&mut meta.users, name);
    }

    meta
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
