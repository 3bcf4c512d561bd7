//! Local draft persistence
//!
//! Drafts are the fallback copy of everything the user typed. They are saved
//! debounced while editing, deleted after a successful publish, and opened
//! again from the drafts window.

mod store;

pub use store::{JsonDraftStore, DRAFTS_FILE_NAME};

use crate::error::Result;
use crate::net::Repository;
use crate::post::RewardOption;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

// ─────────────────────────────────────────────────────────────────────────────
// Draft Record
// ─────────────────────────────────────────────────────────────────────────────

/// A saved post draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostDraft {
    /// Draft id (UUID v4)
    pub id: String,
    pub title: String,
    /// Tags
    pub topics: Vec<String>,
    /// Markdown body
    pub body: String,
    pub repository: Option<Repository>,
    pub upvote: bool,
    pub reward: RewardOption,
    /// The draft edits an already published post
    pub is_updating: bool,
    /// Permlink of the published post when updating
    pub permlink: Option<String>,
    /// Body as published, used to build a patch when updating
    pub original_body: Option<String>,
    /// Empty for top-level posts
    pub parent_author: String,
    /// Category for top-level posts
    pub parent_permlink: String,
    /// Unix seconds of the last save
    pub last_updated: i64,
}

impl Default for PostDraft {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            topics: Vec::new(),
            body: String::new(),
            repository: None,
            upvote: true,
            reward: RewardOption::default(),
            is_updating: false,
            permlink: None,
            original_body: None,
            parent_author: String::new(),
            parent_permlink: String::new(),
            last_updated: 0,
        }
    }
}

impl PostDraft {
    /// Create an empty draft with a fresh id.
    pub fn new() -> Self {
        Self {
            id: new_draft_id(),
            ..Default::default()
        }
    }

    /// Title shown in the drafts window.
    pub fn display_title(&self) -> &str {
        let title = self.title.trim();
        if title.is_empty() {
            "Untitled draft"
        } else {
            title
        }
    }

    /// Whether the draft holds nothing worth saving.
    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty()
            && self.body.trim().is_empty()
            && self.topics.is_empty()
            && self.repository.is_none()
            && !self.is_updating
    }

    /// Stamp the draft with the current time.
    pub fn touch(&mut self) {
        self.last_updated = chrono::Utc::now().timestamp();
    }
}

/// Generate a new draft id.
pub fn new_draft_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// Store Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Storage backend for drafts.
pub trait DraftStore: Send + Sync {
    /// All drafts, most recently updated first.
    fn load_all(&self) -> Result<Vec<PostDraft>>;

    /// A single draft by id.
    fn get(&self, id: &str) -> Result<Option<PostDraft>>;

    /// Insert or replace a draft.
    fn save(&self, draft: &PostDraft) -> Result<()>;

    /// Remove a draft. Removing a missing id is not an error.
    fn delete(&self, id: &str) -> Result<()>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Debounce
// ─────────────────────────────────────────────────────────────────────────────

/// Trailing-edge debounce for draft saves.
///
/// Every change pushes the deadline out; the save fires once the user has
/// been idle for the configured delay.
#[derive(Debug, Clone)]
pub struct SaveDebouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl SaveDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Record a change at `now`.
    pub fn touch(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Returns `true` once when the quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Whether a save is waiting to fire.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Time left until the save fires.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }

    /// Drop a pending save.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_draft_defaults() {
        let draft = PostDraft::new();
        assert_eq!(draft.id.len(), 36);
        assert!(draft.upvote);
        assert_eq!(draft.reward, RewardOption::Half);
        assert!(draft.is_blank());
        assert_eq!(draft.display_title(), "Untitled draft");
    }

    #[test]
    fn test_draft_ids_are_unique() {
        assert_ne!(new_draft_id(), new_draft_id());
    }

    #[test]
    fn test_partial_draft_json_uses_defaults() {
        let draft: PostDraft = serde_json::from_str(r#"{"id":"x","title":"Hi"}"#).unwrap();
        assert_eq!(draft.title, "Hi");
        assert!(draft.upvote);
        assert!(!draft.is_blank());
    }

    #[test]
    fn test_debouncer_fires_once_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = SaveDebouncer::new(Duration::from_millis(400));

        debouncer.touch(start);
        debouncer.touch(start + Duration::from_millis(300));
        assert!(!debouncer.poll(start + Duration::from_millis(500)));
        assert!(debouncer.is_pending());

        assert!(debouncer.poll(start + Duration::from_millis(700)));
        assert!(!debouncer.poll(start + Duration::from_millis(800)));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_debouncer_cancel() {
        let start = Instant::now();
        let mut debouncer = SaveDebouncer::new(Duration::from_millis(400));
        debouncer.touch(start);
        debouncer.cancel();
        assert!(!debouncer.poll(start + Duration::from_secs(1)));
        assert_eq!(debouncer.time_until_due(start), None);
    }
}
