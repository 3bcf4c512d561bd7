//! Post publishing
//!
//! Turns a validated submission into chain operations and drives the publish
//! sequence: permlink, body, broadcast, contribution API, navigation.

mod metadata;
mod operations;
mod patch;
mod permlink;
mod publish;

pub use metadata::{JsonMetadata, RewardOption, DEFAULT_CONTRIBUTION_TYPE};
pub use operations::{
    build_operations, Beneficiary, CommentOperation, CommentOptionsExtension,
    CommentOptionsOperation, Operation, OperationParams, MAX_ACCEPTED_PAYOUT,
};
pub use patch::{body_patch_if_smaller, make_patch};
pub use permlink::{
    check_permlink_length, create_permlink, parse_post_reference, reply_permlink, slugify,
};
pub use publish::{PublishOutcome, Publisher, SiteConfig};

use crate::config::Settings;
use crate::drafts::PostDraft;
use crate::editor::PostSubmission;
use crate::error::{Error, Result};
use crate::markdown::extract_metadata;

/// Everything needed to publish a post.
#[derive(Debug, Clone, PartialEq)]
pub struct PostData {
    /// Empty for top-level posts
    pub parent_author: String,
    pub parent_permlink: String,
    pub author: String,
    pub title: String,
    pub body: String,
    pub json_metadata: JsonMetadata,
    /// Existing permlink; required when updating
    pub permlink: Option<String>,
    pub reward: RewardOption,
    pub upvote: bool,
    pub draft_id: Option<String>,
    pub is_updating: bool,
    pub original_body: Option<String>,
    /// Beneficiaries, used on creation only
    pub extensions: Vec<Beneficiary>,
}

impl PostData {
    /// Assemble post data from a validated form submission.
    pub fn from_submission(
        submission: PostSubmission,
        draft: &PostDraft,
        settings: &Settings,
    ) -> Self {
        let json_metadata = JsonMetadata::new(
            &settings.community,
            &settings.app_id,
            submission.topics,
            submission.repository,
            extract_metadata(&submission.body),
        );

        let parent_permlink = if draft.is_updating && !draft.parent_permlink.is_empty() {
            draft.parent_permlink.clone()
        } else {
            settings.category.clone()
        };

        Self {
            parent_author: if draft.is_updating {
                draft.parent_author.clone()
            } else {
                String::new()
            },
            parent_permlink,
            author: settings.account.clone(),
            title: submission.title,
            body: submission.body,
            json_metadata,
            permlink: draft.permlink.clone(),
            reward: submission.reward,
            upvote: submission.upvote,
            draft_id: (!draft.id.is_empty()).then(|| draft.id.clone()),
            is_updating: draft.is_updating,
            original_body: draft.original_body.clone(),
            extensions: settings
                .beneficiaries
                .iter()
                .map(|b| Beneficiary {
                    account: b.account.clone(),
                    weight: b.weight,
                })
                .collect(),
        }
    }

    /// Check the fields publishing cannot do without.
    pub fn validate_required(&self) -> Result<()> {
        let required = [
            ("parentPermlink", self.parent_permlink.as_str()),
            ("author", self.author.as_str()),
            ("title", self.title.as_str()),
            ("body", self.body.as_str()),
        ];
        for (name, value) in required {
            if value.is_empty() {
                return Err(Error::MissingField(name));
            }
        }
        if self.is_updating && self.permlink.as_deref().map_or(true, str::is_empty) {
            return Err(Error::MissingField("permlink"));
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
