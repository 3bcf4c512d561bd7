//! Permlink generation.
//!
//! A permlink is the URL-safe identifier of a post under its author. Titled
//! posts get a slug of the title, made unique with a random prefix when the
//! author already has a post at that slug. Untitled comments get a
//! `re-{parent}` permlink with a timestamp.

use crate::error::Result;
use crate::net::Broadcaster;
use chrono::{DateTime, SecondsFormat, Utc};
use log::debug;
use regex::Regex;
use std::sync::LazyLock;

/// Longest permlink the chain accepts
pub const MAX_PERMLINK_LENGTH: usize = 255;

/// Longest slug taken from a title
pub const MAX_SLUG_LENGTH: usize = 128;

/// Timestamp suffix a previous reply permlink carries, e.g. `-20180101t120000000z`
static REPLY_TIMESTAMP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-\d{8}t\d{9}z").unwrap());

/// Create the permlink for a new post.
///
/// Asks the node whether `author` already has content at the slug and adds
/// a random prefix if so.
pub async fn create_permlink<B: Broadcaster + ?Sized>(
    broadcaster: &B,
    title: &str,
    author: &str,
    parent_author: &str,
    parent_permlink: &str,
) -> Result<String> {
    if title.trim().is_empty() {
        return Ok(reply_permlink(parent_author, parent_permlink, Utc::now()));
    }

    let mut slug = slugify(title);
    if slug.is_empty() {
        slug = random_token();
    }

    let taken = broadcaster
        .get_content(author, &slug)
        .await?
        .is_some_and(|content| !content.body.is_empty());

    let permlink = if taken {
        debug!("Permlink {}/{} is taken, adding a prefix", author, slug);
        format!("{}-{}", random_token(), slug)
    } else {
        slug
    };

    Ok(check_permlink_length(&permlink))
}

/// Permlink of an untitled reply.
pub fn reply_permlink(parent_author: &str, parent_permlink: &str, now: DateTime<Utc>) -> String {
    let time: String = now
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect();
    let parent = REPLY_TIMESTAMP.replace_all(parent_permlink, "");
    check_permlink_length(&format!("re-{}-{}-{}", parent_author, parent, time))
}

/// Turn a title into a URL slug.
///
/// Lowercase ASCII letters and digits are kept; every other run of
/// characters becomes a single `-`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars().filter(|c| *c != '<' && *c != '>') {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if slug.len() > MAX_SLUG_LENGTH {
        slug.truncate(MAX_SLUG_LENGTH);
        let trimmed = slug.trim_end_matches('-').len();
        slug.truncate(trimmed);
    }
    slug
}

/// Keep the last 255 characters and lowercase.
pub fn check_permlink_length(permlink: &str) -> String {
    let count = permlink.chars().count();
    let tail: String = if count > MAX_PERMLINK_LENGTH {
        permlink.chars().skip(count - MAX_PERMLINK_LENGTH).collect()
    } else {
        permlink.to_string()
    };
    tail.to_lowercase()
}

/// Author and permlink named by a post URL or an `@author/permlink`
/// reference.
///
/// Accepts `https://site/category/@author/permlink`, `@author/permlink` and
/// `author/permlink`; query strings and fragments are ignored.
pub fn parse_post_reference(input: &str) -> Option<(String, String)> {
    let trimmed = input.trim();
    let path = trimmed
        .split(|c| c == '?' || c == '#')
        .next()
        .unwrap_or_default()
        .trim_end_matches('/');

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let author_index = segments
        .iter()
        .rposition(|s| s.starts_with('@'))
        .or_else(|| (segments.len() == 2).then_some(0))?;

    let author = segments[author_index].trim_start_matches('@');
    let permlink = segments.get(author_index + 1)?;
    if author.is_empty() || segments.len() != author_index + 2 {
        return None;
    }
    Some((author.to_string(), permlink.to_string()))
}

/// Short random base36 token.
pub fn random_token() -> String {
    let bytes = uuid::Uuid::new_v4().into_bytes();
    let value = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    to_base36(value)
}

fn to_base36(mut value: u32) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::net::{BroadcastResult, PublishedContent};
    use crate::post::Operation;
    use async_trait::async_trait;
    use chrono::TimeZone;

    struct Node {
        existing_body: Option<&'static str>,
    }

    #[async_trait]
    impl Broadcaster for Node {
        async fn broadcast(&self, _operations: &[Operation]) -> Result<BroadcastResult> {
            Err(Error::Broadcast("unused".to_string()))
        }

        async fn get_content(
            &self,
            author: &str,
            permlink: &str,
        ) -> Result<Option<PublishedContent>> {
            Ok(self.existing_body.map(|body| PublishedContent {
                author: author.to_string(),
                permlink: permlink.to_string(),
                body: body.to_string(),
                ..Default::default()
            }))
        }
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  <b>Rust</b> & egui  "), "brust-b-egui");
        assert_eq!(slugify("Ünïcode only ß"), "n-code-only");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_slugify_truncates() {
        let slug = slugify(&"word ".repeat(60));
        assert!(slug.len() <= MAX_SLUG_LENGTH);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn test_check_permlink_length_keeps_tail() {
        let long = format!("{}END", "a".repeat(300));
        let checked = check_permlink_length(&long);
        assert_eq!(checked.len(), MAX_PERMLINK_LENGTH);
        assert!(checked.ends_with("end"));
    }

    #[test]
    fn test_reply_permlink_strips_parent_timestamp() {
        let now = Utc.with_ymd_and_hms(2018, 1, 2, 3, 4, 5).unwrap();
        let permlink = reply_permlink("alice", "re-bob-post-20171231t235959123z", now);
        assert_eq!(permlink, "re-alice-re-bob-post-20180102t030405000z");
    }

    #[test]
    fn test_random_token_is_base36() {
        let token = random_token();
        assert!(!token.is_empty());
        assert!(token.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }

    #[tokio::test]
    async fn test_create_permlink_free_slug() {
        let node = Node {
            existing_body: None,
        };
        let permlink = create_permlink(&node, "My First Post", "alice", "", "utopian-io")
            .await
            .unwrap();
        assert_eq!(permlink, "my-first-post");
    }

    #[tokio::test]
    async fn test_create_permlink_taken_slug_gets_prefix() {
        let node = Node {
            existing_body: Some("already here"),
        };
        let permlink = create_permlink(&node, "My First Post", "alice", "", "utopian-io")
            .await
            .unwrap();
        assert!(permlink.ends_with("-my-first-post"));
        assert_ne!(permlink, "my-first-post");
    }

    #[tokio::test]
    async fn test_create_permlink_deleted_content_is_free() {
        let node = Node {
            existing_body: Some(""),
        };
        let permlink = create_permlink(&node, "Post", "alice", "", "utopian-io")
            .await
            .unwrap();
        assert_eq!(permlink, "post");
    }

    #[tokio::test]
    async fn test_create_permlink_without_title_is_reply() {
        let node = Node {
            existing_body: None,
        };
        let permlink = create_permlink(&node, "  ", "alice", "bob", "some-post")
            .await
            .unwrap();
        assert!(permlink.starts_with("re-bob-some-post-"));
    }

    #[test]
    fn test_parse_post_reference() {
        let expected = Some(("alice".to_string(), "my-post".to_string()));
        assert_eq!(
            parse_post_reference("https://utopian.io/utopian-io/@alice/my-post"),
            expected
        );
        assert_eq!(
            parse_post_reference(" https://steemit.com/rust/@alice/my-post/?ref=x#c "),
            expected
        );
        assert_eq!(parse_post_reference("@alice/my-post"), expected);
        assert_eq!(parse_post_reference("alice/my-post"), expected);
    }

    #[test]
    fn test_parse_post_reference_rejects_incomplete_input() {
        assert_eq!(parse_post_reference(""), None);
        assert_eq!(parse_post_reference("@alice"), None);
        assert_eq!(parse_post_reference("https://utopian.io/@alice"), None);
        assert_eq!(parse_post_reference("https://utopian.io/a/b"), None);
        assert_eq!(parse_post_reference("@/my-post"), None);
    }
}
