//! Contribution API client.

use super::ContributionApi;
use crate::config::Settings;
use crate::error::{Error, Result};
use async_trait::async_trait;
use log::debug;
use serde::Serialize;

/// Registers posts with the Utopian contribution API.
#[derive(Debug, Clone)]
pub struct UtopianApiClient {
    http: reqwest::Client,
    api_url: String,
    access_token: String,
}

#[derive(Serialize)]
struct ContributionRequest<'a> {
    author: &'a str,
    permlink: &'a str,
}

impl UtopianApiClient {
    pub fn new(
        http: reqwest::Client,
        api_url: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            http,
            api_url: api_url.into(),
            access_token: access_token.into(),
        }
    }

    pub fn from_settings(http: reqwest::Client, settings: &Settings) -> Self {
        Self::new(http, &settings.api_url, &settings.access_token)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.access_token.is_empty() {
            request
        } else {
            request.header(reqwest::header::AUTHORIZATION, &self.access_token)
        }
    }

    /// `POST {api}/posts`
    fn create_request(&self, author: &str, permlink: &str) -> reqwest::RequestBuilder {
        self.authorized(
            self.http
                .post(format!("{}/posts", self.api_url))
                .json(&ContributionRequest { author, permlink }),
        )
    }

    /// `PUT {api}/posts/{author}/{permlink}`
    fn update_request(&self, author: &str, permlink: &str) -> reqwest::RequestBuilder {
        self.authorized(
            self.http
                .put(format!("{}/posts/{}/{}", self.api_url, author, permlink))
                .json(&ContributionRequest { author, permlink }),
        )
    }

    async fn send(&self, request: reqwest::RequestBuilder, what: &str) -> Result<()> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(Error::ContributionApi(format!(
                "{} returned {}: {}",
                what,
                status,
                text.trim()
            )))
        }
    }
}

#[async_trait]
impl ContributionApi for UtopianApiClient {
    async fn create_contribution(&self, author: &str, permlink: &str) -> Result<()> {
        debug!("Creating contribution {}/{}", author, permlink);
        self.send(self.create_request(author, permlink), "Create contribution")
            .await
    }

    async fn update_contribution(&self, author: &str, permlink: &str) -> Result<()> {
        debug!("Updating contribution {}/{}", author, permlink);
        self.send(self.update_request(author, permlink), "Update contribution")
            .await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::AUTHORIZATION;
    use reqwest::Method;
    use serde_json::{json, Value};

    fn client(token: &str) -> UtopianApiClient {
        UtopianApiClient::new(reqwest::Client::new(), "https://api.utopian.io/api", token)
    }

    fn json_body(request: &reqwest::Request) -> Value {
        let bytes = request
            .body()
            .and_then(|body| body.as_bytes())
            .expect("JSON body");
        serde_json::from_slice(bytes).unwrap()
    }

    #[test]
    fn test_create_request() {
        let request = client("token-1")
            .create_request("alice", "hello-world")
            .build()
            .unwrap();
        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.url().as_str(), "https://api.utopian.io/api/posts");
        assert_eq!(request.headers()[AUTHORIZATION], "token-1");
        assert_eq!(
            json_body(&request),
            json!({"author": "alice", "permlink": "hello-world"})
        );
    }

    #[test]
    fn test_update_request() {
        let request = client("token-1")
            .update_request("alice", "hello-world")
            .build()
            .unwrap();
        assert_eq!(request.method(), &Method::PUT);
        assert_eq!(
            request.url().as_str(),
            "https://api.utopian.io/api/posts/alice/hello-world"
        );
        assert_eq!(
            json_body(&request),
            json!({"author": "alice", "permlink": "hello-world"})
        );
    }

    #[test]
    fn test_no_authorization_without_token() {
        let request = client("").create_request("alice", "p").build().unwrap();
        assert!(request.headers().get(AUTHORIZATION).is_none());
    }
}
