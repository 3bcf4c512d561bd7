//! Publish sequencing.

use super::{
    body_patch_if_smaller, build_operations, create_permlink, JsonMetadata, OperationParams,
    PostData,
};
use crate::config::Settings;
use crate::drafts::{DraftStore, PostDraft};
use crate::error::{Error, Result};
use crate::net::{BroadcastResult, Broadcaster, ContributionApi};
use log::{error, info, warn};
use std::sync::Arc;

/// Site the posts are published to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    /// Public site URL without trailing slash
    pub site_url: String,
    /// Name shown in the post footer
    pub site_name: String,
    /// Category linked from the post footer
    pub category: String,
}

impl SiteConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            site_url: settings.site_url.clone(),
            site_name: settings.site_name.clone(),
            category: settings.category.clone(),
        }
    }

    /// Footer appended to newly created posts.
    pub fn footer(&self, author: &str, permlink: &str) -> String {
        format!(
            "\n\n<br /><hr/><em>Posted on <a href=\"{}/{}/@{}/{}\">{} -  Rewarding Open Source Contributors</a></em><hr/>",
            self.site_url, self.category, author, permlink, self.site_name
        )
    }

    /// URL of a published post.
    pub fn post_url(&self, parent_permlink: &str, author: &str, permlink: &str) -> String {
        format!(
            "{}/{}/@{}/{}",
            self.site_url, parent_permlink, author, permlink
        )
    }
}

/// Result of a successful publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOutcome {
    pub author: String,
    pub permlink: String,
    /// Where to navigate after publishing
    pub url: String,
    pub broadcast: BroadcastResult,
    pub is_updating: bool,
    /// Set when the post is on chain but the contribution API call failed
    pub contribution_error: Option<String>,
}

/// Drives the publish sequence against the network collaborators.
#[derive(Clone)]
pub struct Publisher {
    broadcaster: Arc<dyn Broadcaster>,
    contributions: Arc<dyn ContributionApi>,
    drafts: Arc<dyn DraftStore>,
    site: SiteConfig,
}

impl Publisher {
    pub fn new(
        broadcaster: Arc<dyn Broadcaster>,
        contributions: Arc<dyn ContributionApi>,
        drafts: Arc<dyn DraftStore>,
        site: SiteConfig,
    ) -> Self {
        Self {
            broadcaster,
            contributions,
            drafts,
            site,
        }
    }

    /// Publish a new post or update an existing one.
    ///
    /// The permlink is computed once and shared by the broadcast, the
    /// contribution API call and the returned URL.
    pub async fn create_post(&self, post: PostData) -> Result<PublishOutcome> {
        post.validate_required()?;

        let permlink = if post.is_updating {
            post.permlink.clone().ok_or(Error::MissingField("permlink"))?
        } else {
            create_permlink(
                self.broadcaster.as_ref(),
                &post.title,
                &post.author,
                &post.parent_author,
                &post.parent_permlink,
            )
            .await?
        };

        let body = if post.is_updating {
            body_patch_if_smaller(post.original_body.as_deref(), &post.body)
        } else {
            format!("{}{}", post.body, self.site.footer(&post.author, &permlink))
        };

        let operations = build_operations(OperationParams {
            parent_author: &post.parent_author,
            parent_permlink: &post.parent_permlink,
            author: &post.author,
            permlink: &permlink,
            title: &post.title,
            body: &body,
            json_metadata: post.json_metadata.to_json_string(),
            options: (!post.is_updating).then_some((post.reward, post.extensions.as_slice())),
        });

        let broadcast = match self.broadcaster.broadcast(&operations).await {
            Ok(result) => result,
            Err(err) => {
                error!("Broadcast of {}/{} failed: {}", post.author, permlink, err);
                if let Some(comment) = operations.first() {
                    error!("Original comment operation: {:?}", comment);
                }
                return Err(match err {
                    Error::Broadcast(_) => err,
                    other => Error::Broadcast(other.to_string()),
                });
            }
        };
        info!("Published {}/{}", post.author, permlink);

        if let Some(draft_id) = &post.draft_id {
            if let Err(e) = self.drafts.delete(draft_id) {
                warn!("Failed to delete draft {} after publishing: {}", draft_id, e);
            }
        }

        let contribution = if post.is_updating {
            self.contributions
                .update_contribution(&post.author, &permlink)
                .await
        } else {
            self.contributions
                .create_contribution(&post.author, &permlink)
                .await
        };
        let contribution_error = contribution.err().map(|e| {
            warn!("Contribution API call for {}/{} failed: {}", post.author, permlink, e);
            e.to_string()
        });

        Ok(PublishOutcome {
            url: self
                .site
                .post_url(&post.parent_permlink, &post.author, &permlink),
            author: post.author,
            permlink,
            broadcast,
            is_updating: post.is_updating,
            contribution_error,
        })
    }

    /// Load a published post into a draft for editing.
    pub async fn edit_post(&self, author: &str, permlink: &str) -> Result<PostDraft> {
        let content = self
            .broadcaster
            .get_content(author, permlink)
            .await?
            .ok_or_else(|| Error::Application(format!("Post @{}/{} not found", author, permlink)))?;

        let metadata = JsonMetadata::parse_lenient(&content.json_metadata);
        let mut draft = PostDraft {
            id: format!("edit-{}-{}", content.author, content.permlink),
            title: content.title,
            topics: metadata.tags,
            body: content.body.clone(),
            repository: metadata.repository,
            is_updating: true,
            permlink: Some(content.permlink),
            original_body: Some(content.body),
            parent_author: content.parent_author,
            parent_permlink: content.parent_permlink,
            ..Default::default()
        };
        draft.touch();

        self.drafts.save(&draft)?;
        info!("Loaded {}/{} for editing as draft {}", author, permlink, draft.id);
        Ok(draft)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
