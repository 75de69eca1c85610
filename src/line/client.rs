use super::ChatTransport;
use crate::config::LineConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

#[derive(Serialize)]
struct TextMessage<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

impl<'a> TextMessage<'a> {
    fn new(text: &'a str) -> Self {
        Self { kind: "text", text }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest<'a> {
    reply_token: &'a str,
    messages: Vec<TextMessage<'a>>,
}

#[derive(Serialize)]
struct BroadcastRequest<'a> {
    messages: Vec<TextMessage<'a>>,
}

/// HTTP client for the LINE Messaging API.
///
/// Authenticates with the channel access token as a Bearer token.
#[derive(Clone)]
pub struct LineClient {
    http_client: Client,
    api_base: String,
    access_token: String,
}

impl LineClient {
    /// Create a client from LINE configuration.
    ///
    /// A request that gets no answer within `request_timeout_seconds` fails.
    pub fn new(config: &LineConfig) -> Result<Self> {
        let http_client = Client::builder()
            .user_agent("feeder-bot/0.1")
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .context("Failed to build LINE HTTP client")?;

        Ok(Self {
            http_client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            access_token: config.channel_access_token.clone(),
        })
    }

    async fn post<T: Serialize>(&self, endpoint: &str, body: &T) -> Result<()> {
        let url = format!("{}{}", self.api_base, endpoint);
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", endpoint))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read body>".to_string());
            anyhow::bail!("LINE API returned error status {}: {}", status, body);
        }

        Ok(())
    }
}

#[async_trait]
impl ChatTransport for LineClient {
    async fn reply(&self, reply_token: &str, text: &str) -> Result<()> {
        debug!(reply_token = %reply_token, "Sending reply");
        self.post(
            "/v2/bot/message/reply",
            &ReplyRequest {
                reply_token,
                messages: vec![TextMessage::new(text)],
            },
        )
        .await
    }

    async fn broadcast(&self, text: &str) -> Result<()> {
        debug!(text = %text, "Sending broadcast");
        self.post(
            "/v2/bot/message/broadcast",
            &BroadcastRequest {
                messages: vec![TextMessage::new(text)],
            },
        )
        .await
    }
}
