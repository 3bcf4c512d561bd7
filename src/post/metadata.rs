//! Post metadata and reward options.

use crate::markdown::BodyMetadata;
use crate::net::Repository;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Contribution type written into the metadata
pub const DEFAULT_CONTRIBUTION_TYPE: &str = "development";

/// How the author reward is paid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RewardOption {
    /// 50% SBD / 50% SP
    #[default]
    #[serde(rename = "50")]
    Half,
    /// 100% Steem Power
    #[serde(rename = "100")]
    FullPower,
    /// Payout declined
    #[serde(rename = "0")]
    Declined,
}

impl RewardOption {
    pub fn label(&self) -> &'static str {
        match self {
            RewardOption::Half => "50% SBD and 50% SP",
            RewardOption::FullPower => "100% Steem Power",
            RewardOption::Declined => "Declined",
        }
    }

    pub fn all() -> &'static [RewardOption] {
        &[
            RewardOption::Half,
            RewardOption::FullPower,
            RewardOption::Declined,
        ]
    }

    /// `percent_steem_dollars` of the comment options.
    pub fn percent_steem_dollars(&self) -> u16 {
        match self {
            RewardOption::FullPower => 0,
            RewardOption::Half | RewardOption::Declined => 10_000,
        }
    }
}

/// The `json_metadata` of a post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonMetadata {
    pub community: String,
    pub app: String,
    pub format: String,
    pub tags: Vec<String>,
    pub repository: Option<Repository>,
    pub platform: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub users: Vec<String>,
    pub links: Vec<String>,
    pub image: Vec<String>,
}

impl JsonMetadata {
    /// Build metadata for a post body.
    pub fn new(
        community: &str,
        app: &str,
        tags: Vec<String>,
        repository: Repository,
        body: BodyMetadata,
    ) -> Self {
        Self {
            community: community.to_string(),
            app: app.to_string(),
            format: "markdown".to_string(),
            tags,
            repository: Some(repository),
            platform: "github".to_string(),
            kind: DEFAULT_CONTRIBUTION_TYPE.to_string(),
            users: body.users,
            links: body.links,
            image: body.images,
        }
    }

    /// Parse metadata read from chain.
    ///
    /// Published metadata is user controlled; anything that is not an
    /// object yields the default and malformed fields are dropped one by one.
    pub fn parse_lenient(raw: &str) -> Self {
        let Ok(Value::Object(map)) = serde_json::from_str::<Value>(raw) else {
            return Self::default();
        };

        let strings = |key: &str| -> Vec<String> {
            map.get(key)
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default()
        };
        let string = |key: &str| -> String {
            map.get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        Self {
            community: string("community"),
            app: string("app"),
            format: string("format"),
            tags: strings("tags"),
            repository: map
                .get("repository")
                .and_then(|r| serde_json::from_value(r.clone()).ok()),
            platform: string("platform"),
            kind: string("type"),
            users: strings("users"),
            links: strings("links"),
            image: strings("image"),
        }
    }

    /// Serialize for the comment operation.
    pub fn to_json_string(&self) -> String {
        // Only plain strings and vectors inside; serialization cannot fail
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::RepositoryOwner;

    fn repository() -> Repository {
        Repository {
            id: 7,
            name: "composer".to_string(),
            full_name: "me/composer".to_string(),
            html_url: "https://github.com/me/composer".to_string(),
            owner: RepositoryOwner {
                login: "me".to_string(),
            },
            fork: false,
        }
    }

    #[test]
    fn test_reward_serialization() {
        assert_eq!(serde_json::to_string(&RewardOption::Half).unwrap(), "\"50\"");
        assert_eq!(
            serde_json::from_str::<RewardOption>("\"100\"").unwrap(),
            RewardOption::FullPower
        );
        assert_eq!(RewardOption::FullPower.percent_steem_dollars(), 0);
        assert_eq!(RewardOption::Half.percent_steem_dollars(), 10_000);
    }

    #[test]
    fn test_metadata_shape() {
        let meta = JsonMetadata::new(
            "utopian",
            "utopian/1.0.0",
            vec!["rust".to_string()],
            repository(),
            BodyMetadata {
                images: vec!["https://i.io/a.png".to_string()],
                links: vec![],
                users: vec!["bob".to_string()],
            },
        );
        let value: Value = serde_json::from_str(&meta.to_json_string()).unwrap();
        assert_eq!(value["format"], "markdown");
        assert_eq!(value["platform"], "github");
        assert_eq!(value["type"], "development");
        assert_eq!(value["repository"]["full_name"], "me/composer");
        assert_eq!(value["image"][0], "https://i.io/a.png");
        assert_eq!(value["users"][0], "bob");
    }

    #[test]
    fn test_parse_lenient_keeps_valid_fields() {
        let raw = r#"{"tags":["a",3,"b"],"type":"ideas","repository":{"id":7,"full_name":"me/composer"},"image":"oops"}"#;
        let meta = JsonMetadata::parse_lenient(raw);
        assert_eq!(meta.tags, vec!["a", "b"]);
        assert_eq!(meta.kind, "ideas");
        assert_eq!(meta.repository.unwrap().id, 7);
        assert!(meta.image.is_empty());
    }

    #[test]
    fn test_parse_lenient_garbage() {
        assert_eq!(JsonMetadata::parse_lenient("not json"), JsonMetadata::default());
        assert_eq!(JsonMetadata::parse_lenient("[1,2]"), JsonMetadata::default());
    }
}
