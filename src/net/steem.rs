//! SteemConnect broadcasting and node content lookups.

use super::{BroadcastResult, Broadcaster, PublishedContent};
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::post::Operation;
use async_trait::async_trait;
use log::{debug, info};
use serde::Serialize;
use serde_json::{json, Value};

const GET_CONTENT_METHOD: &str = "condenser_api.get_content";

/// Broadcasts through the SteemConnect API and reads from a JSON-RPC node.
#[derive(Debug, Clone)]
pub struct SteemConnectClient {
    http: reqwest::Client,
    broadcast_url: String,
    node_url: String,
    access_token: String,
}

#[derive(Serialize)]
struct BroadcastRequest<'a> {
    operations: &'a [Operation],
}

impl SteemConnectClient {
    pub fn new(
        http: reqwest::Client,
        broadcast_url: impl Into<String>,
        node_url: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            http,
            broadcast_url: broadcast_url.into(),
            node_url: node_url.into(),
            access_token: access_token.into(),
        }
    }

    pub fn from_settings(http: reqwest::Client, settings: &Settings) -> Self {
        Self::new(
            http,
            &settings.broadcast_url,
            &settings.node_url,
            &settings.access_token,
        )
    }
}

#[async_trait]
impl Broadcaster for SteemConnectClient {
    async fn broadcast(&self, operations: &[Operation]) -> Result<BroadcastResult> {
        if self.access_token.is_empty() {
            return Err(Error::Broadcast(
                "No access token configured. Log in from the settings window.".to_string(),
            ));
        }

        debug!("Broadcasting {} operation(s)", operations.len());
        let response = self
            .http
            .post(format!("{}/api/broadcast", self.broadcast_url))
            .header(reqwest::header::AUTHORIZATION, &self.access_token)
            .json(&BroadcastRequest { operations })
            .send()
            .await?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);
        let result = parse_broadcast_response(status.is_success(), &body)?;
        info!("Broadcast accepted: {:?}", result.id);
        Ok(result)
    }

    async fn get_content(&self, author: &str, permlink: &str) -> Result<Option<PublishedContent>> {
        let request = json!({
            "jsonrpc": "2.0",
            "method": GET_CONTENT_METHOD,
            "params": [author, permlink],
            "id": 1,
        });

        let body: Value = self
            .http
            .post(&self.node_url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        parse_content_response(&body)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Response Parsing
// ─────────────────────────────────────────────────────────────────────────────

/// Interpret a SteemConnect broadcast response.
fn parse_broadcast_response(success: bool, body: &Value) -> Result<BroadcastResult> {
    let error = body
        .get("error_description")
        .or_else(|| body.get("error"))
        .filter(|e| !e.is_null());

    if let Some(error) = error {
        let message = match error {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Err(Error::Broadcast(message));
    }

    if !success {
        return Err(Error::Broadcast(format!("Unexpected response: {}", body)));
    }

    let id = body
        .pointer("/result/id")
        .and_then(Value::as_str)
        .map(str::to_string);
    Ok(BroadcastResult { id })
}

/// Interpret a `condenser_api.get_content` JSON-RPC response.
///
/// The node answers with an empty post (blank author) when nothing exists.
fn parse_content_response(body: &Value) -> Result<Option<PublishedContent>> {
    if let Some(error) = body.get("error").filter(|e| !e.is_null()) {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(Error::Rpc {
            method: GET_CONTENT_METHOD.to_string(),
            message,
        });
    }

    let Some(result) = body.get("result").filter(|r| !r.is_null()) else {
        return Ok(None);
    };

    let content: PublishedContent = serde_json::from_value(result.clone()).map_err(|e| Error::Rpc {
        method: GET_CONTENT_METHOD.to_string(),
        message: e.to_string(),
    })?;

    if content.author.is_empty() {
        Ok(None)
    } else {
        Ok(Some(content))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_success() {
        let body = json!({"result": {"id": "abc123", "block_num": 1}});
        let result = parse_broadcast_response(true, &body).unwrap();
        assert_eq!(result.id.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_broadcast_error_description_wins() {
        let body = json!({"error": "invalid_grant", "error_description": "Token expired"});
        let err = parse_broadcast_response(false, &body).unwrap_err();
        assert!(matches!(err, Error::Broadcast(ref m) if m == "Token expired"));
    }

    #[test]
    fn test_broadcast_http_failure_without_error_body() {
        let err = parse_broadcast_response(false, &Value::Null).unwrap_err();
        assert!(matches!(err, Error::Broadcast(_)));
    }

    #[test]
    fn test_content_found() {
        let body = json!({
            "jsonrpc": "2.0",
            "result": {
                "author": "alice",
                "permlink": "hello",
                "category": "utopian-io",
                "parent_author": "",
                "parent_permlink": "utopian-io",
                "title": "Hello",
                "body": "Body",
                "json_metadata": "{\"tags\":[\"a\"]}",
                "net_votes": 3
            },
            "id": 1
        });
        let content = parse_content_response(&body).unwrap().unwrap();
        assert_eq!(content.author, "alice");
        assert_eq!(content.json_metadata, "{\"tags\":[\"a\"]}");
    }

    #[test]
    fn test_content_missing_is_none() {
        let body = json!({"result": {"author": "", "permlink": ""}, "id": 1});
        assert_eq!(parse_content_response(&body).unwrap(), None);
        assert_eq!(parse_content_response(&json!({"id": 1})).unwrap(), None);
    }

    #[test]
    fn test_content_rpc_error() {
        let body = json!({"error": {"code": -32000, "message": "bad params"}, "id": 1});
        let err = parse_content_response(&body).unwrap_err();
        assert!(matches!(err, Error::Rpc { ref message, .. } if message == "bad params"));
    }
}
