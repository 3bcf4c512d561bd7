//! Form validation rules.
//!
//! Each field has an ordered list of rules; the first failing rule of a
//! field is the message shown under it.

use regex::Regex;
use std::sync::LazyLock;

/// Longest title accepted
pub const MAX_TITLE_LENGTH: usize = 255;

/// Allowed number of tags
pub const MIN_TOPICS: usize = 1;
pub const MAX_TOPICS: usize = 4;

pub const TITLE_REQUIRED: &str = "Please enter a title";
pub const TOPICS_REQUIRED: &str = "Please enter some tags";
pub const TOPICS_COUNT: &str = "You have to add 1 to 4 tags";
pub const REPOSITORY_REQUIRED: &str = "Please enter an existing Github repository";
pub const BODY_REQUIRED: &str = "Content can't be empty";

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").unwrap());

/// Inline errors of the post form, one per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    pub title: Option<String>,
    pub topics: Option<String>,
    pub repository: Option<String>,
    pub body: Option<String>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.topics.is_none()
            && self.repository.is_none()
            && self.body.is_none()
    }

    /// All messages in form order.
    pub fn messages(&self) -> Vec<&str> {
        [&self.repository, &self.title, &self.body, &self.topics]
            .into_iter()
            .filter_map(|e| e.as_deref())
            .collect()
    }
}

/// Title rules: required, at most 255 characters.
pub fn check_title(title: &str) -> Option<String> {
    if title.trim().is_empty() {
        return Some(TITLE_REQUIRED.to_string());
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Some(format!(
            "Title can't be longer than {} characters.",
            MAX_TITLE_LENGTH
        ));
    }
    None
}

/// Tag rules: required, 1 to 4 tags, each lowercase alphanumeric words
/// joined by single hyphens.
///
/// The count error wins over per-tag errors; the first invalid tag is
/// reported.
pub fn check_topics(topics: &[String]) -> Option<String> {
    if topics.is_empty() {
        return Some(TOPICS_REQUIRED.to_string());
    }
    if !(MIN_TOPICS..=MAX_TOPICS).contains(&topics.len()) {
        return Some(TOPICS_COUNT.to_string());
    }
    topics
        .iter()
        .find(|topic| !is_valid_tag(topic))
        .map(|topic| format!("Tag {} is invalid", topic))
}

/// Whether a single tag matches the tag pattern.
pub fn is_valid_tag(tag: &str) -> bool {
    TAG_PATTERN.is_match(tag)
}

/// Run the field rule table.
pub fn validate_fields(title: &str, topics: &[String]) -> FormErrors {
    FormErrors {
        title: check_title(title),
        topics: check_topics(topics),
        ..Default::default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
