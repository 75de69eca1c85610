use super::{whole_number, RemoteStore, StoreError};
use crate::config::StoreConfig;
use crate::monitor::Snapshot;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// REST client for a Firebase Realtime Database.
///
/// Paths map to `{database_url}/{path}.json`. Every request is bounded by the
/// configured timeout; a timeout surfaces as `StoreError::Request`.
#[derive(Clone)]
pub struct FirebaseClient {
    http_client: Client,
    database_url: String,
    auth_token: Option<String>,
}

impl FirebaseClient {
    /// Create a client from store configuration.
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .context("Failed to build Firebase HTTP client")?;

        Ok(Self {
            http_client,
            database_url: config.database_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}.json", self.database_url, path.trim_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => request.query(&[("auth", token)]),
            None => request,
        }
    }

    async fn get_value(&self, path: &str) -> Result<Value, StoreError> {
        let url = self.url(path);
        debug!(path = %path, "Reading store path");

        let response = self.authorize(self.http_client.get(&url)).send().await?;
        let response = check_response_status(response).await?;

        response
            .json::<Value>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }
}

#[async_trait]
impl RemoteStore for FirebaseClient {
    async fn get_int(&self, path: &str) -> Result<i64, StoreError> {
        let value = self.get_value(path).await?;
        decode_int(path, &value)
    }

    async fn set_int(&self, path: &str, value: i64) -> Result<(), StoreError> {
        let url = self.url(path);
        debug!(path = %path, value = value, "Writing store path");

        let response = self
            .authorize(self.http_client.put(&url))
            .json(&value)
            .send()
            .await?;
        check_response_status(response).await?;

        Ok(())
    }

    async fn get_snapshot(&self) -> Result<Snapshot, StoreError> {
        let value = self.get_value("").await?;
        if value.is_null() {
            // Empty database: every sensor reads as zero
            return Ok(Snapshot::default());
        }
        serde_json::from_value(value).map_err(|e| StoreError::Decode(e.to_string()))
    }
}

/// Interpret a JSON value as an integer state code.
fn decode_int(path: &str, value: &Value) -> Result<i64, StoreError> {
    if value.is_null() {
        return Err(StoreError::Missing(path.to_string()));
    }
    whole_number(value).ok_or_else(|| {
        StoreError::Decode(format!("expected integer at '{}', got {}", path, value))
    })
}

async fn check_response_status(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read body>".to_string());
    Err(StoreError::Status(status.as_u16(), body))
}
