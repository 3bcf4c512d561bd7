//! External services used while composing and publishing
//!
//! Every collaborator is an async trait so the publishing sequence can be
//! driven by in-memory fakes in tests. The reqwest-backed clients live in
//! the submodules.

mod contribution;
mod github;
mod steem;
mod upload;

pub use contribution::UtopianApiClient;
pub use github::{rank_repositories, GithubClient};
pub use steem::SteemConnectClient;
pub use upload::{is_image_file, ImageHostClient};

use crate::error::Result;
use crate::post::Operation;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// User agent sent with every request (GitHub rejects requests without one)
pub const USER_AGENT: &str = concat!("steem-composer/", env!("CARGO_PKG_VERSION"));

/// Timeout applied to every request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the shared HTTP client.
pub fn http_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()?)
}

// ─────────────────────────────────────────────────────────────────────────────
// Shared Types
// ─────────────────────────────────────────────────────────────────────────────

/// Owner of a GitHub repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryOwner {
    pub login: String,
}

/// A GitHub repository as returned by the search API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub html_url: String,
    pub owner: RepositoryOwner,
    pub fork: bool,
}

/// A post as stored on chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PublishedContent {
    pub author: String,
    pub permlink: String,
    pub category: String,
    pub parent_author: String,
    pub parent_permlink: String,
    pub title: String,
    pub body: String,
    /// Raw JSON metadata string
    pub json_metadata: String,
}

/// Result of an accepted broadcast.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BroadcastResult {
    /// Transaction id, when the service reports one
    pub id: Option<String>,
}

/// An image picked, pasted or dropped by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    /// Guess the MIME type from the file extension.
    pub fn mime_type(&self) -> &'static str {
        let ext = self
            .name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "webp" => "image/webp",
            "svg" => "image/svg+xml",
            "bmp" => "image/bmp",
            _ => "application/octet-stream",
        }
    }

    /// File name without its extension, used as the image alt text.
    pub fn stem(&self) -> &str {
        match self.name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => &self.name,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Collaborator Traits
// ─────────────────────────────────────────────────────────────────────────────

/// Signs and broadcasts operations, and reads content from the node.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    /// Broadcast the operations as one transaction.
    async fn broadcast(&self, operations: &[Operation]) -> Result<BroadcastResult>;

    /// Fetch a post. Returns `None` when nothing exists at `author/permlink`.
    async fn get_content(&self, author: &str, permlink: &str) -> Result<Option<PublishedContent>>;
}

/// Registers published posts with the contribution API.
#[async_trait]
pub trait ContributionApi: Send + Sync {
    async fn create_contribution(&self, author: &str, permlink: &str) -> Result<()>;

    async fn update_contribution(&self, author: &str, permlink: &str) -> Result<()>;
}

/// Uploads images and returns their public URL.
#[async_trait]
pub trait ImageUploader: Send + Sync {
    async fn upload(&self, account: &str, file: ImageFile) -> Result<String>;
}

/// Searches GitHub repositories.
#[async_trait]
pub trait RepositorySearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<Repository>>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_file_mime_and_stem() {
        let file = ImageFile {
            name: "Screen Shot.PNG".to_string(),
            bytes: vec![],
        };
        assert_eq!(file.mime_type(), "image/png");
        assert_eq!(file.stem(), "Screen Shot");

        let bare = ImageFile {
            name: "noext".to_string(),
            bytes: vec![],
        };
        assert_eq!(bare.mime_type(), "application/octet-stream");
        assert_eq!(bare.stem(), "noext");
    }

    #[test]
    fn test_repository_deserializes_search_item() {
        let json = r#"{
            "id": 42, "name": "composer", "full_name": "utopian/composer",
            "html_url": "https://github.com/utopian/composer",
            "owner": {"login": "utopian", "id": 7}, "fork": false,
            "stargazers_count": 10
        }"#;
        let repo: Repository = serde_json::from_str(json).unwrap();
        assert_eq!(repo.id, 42);
        assert_eq!(repo.owner.login, "utopian");
        assert!(!repo.fork);
    }
}
