// Shared doubles for router integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use feeder::line::ChatTransport;
use feeder::store::{RemoteStore, StoreError};
use feeder::Snapshot;
use std::collections::HashMap;
use std::sync::Mutex;

/// Map-backed store that records writes
#[derive(Default)]
pub struct TestStore {
    pub values: Mutex<HashMap<String, i64>>,
    pub writes: Mutex<Vec<(String, i64)>>,
    pub fail_writes: bool,
}

impl TestStore {
    pub fn with_value(path: &str, value: i64) -> Self {
        let store = Self::default();
        store.values.lock().unwrap().insert(path.to_string(), value);
        store
    }

    pub fn writes(&self) -> Vec<(String, i64)> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteStore for TestStore {
    async fn get_int(&self, path: &str) -> Result<i64, StoreError> {
        self.values
            .lock()
            .unwrap()
            .get(path)
            .copied()
            .ok_or_else(|| StoreError::Missing(path.to_string()))
    }

    async fn set_int(&self, path: &str, value: i64) -> Result<(), StoreError> {
        self.writes.lock().unwrap().push((path.to_string(), value));
        if self.fail_writes {
            return Err(StoreError::Request("connection reset".to_string()));
        }
        self.values.lock().unwrap().insert(path.to_string(), value);
        Ok(())
    }

    async fn get_snapshot(&self) -> Result<Snapshot, StoreError> {
        Ok(Snapshot::default())
    }
}

/// Transport that records replies
#[derive(Default)]
pub struct TestTransport {
    pub replies: Mutex<Vec<(String, String)>>,
    pub broadcasts: Mutex<Vec<String>>,
}

impl TestTransport {
    pub fn replies(&self) -> Vec<(String, String)> {
        self.replies.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for TestTransport {
    async fn reply(&self, reply_token: &str, text: &str) -> anyhow::Result<()> {
        self.replies
            .lock()
            .unwrap()
            .push((reply_token.to_string(), text.to_string()));
        Ok(())
    }

    async fn broadcast(&self, text: &str) -> anyhow::Result<()> {
        self.broadcasts.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Webhook body with one text-message event per (reply_token, text) pair
pub fn text_delivery(messages: &[(&str, &str)]) -> String {
    let events: Vec<serde_json::Value> = messages
        .iter()
        .enumerate()
        .map(|(i, (token, text))| {
            serde_json::json!({
                "type": "message",
                "mode": "active",
                "timestamp": 1700000000000i64 + i as i64,
                "source": {"type": "user", "userId": "U0123"},
                "replyToken": token,
                "message": {"id": format!("{}", i), "type": "text", "text": text}
            })
        })
        .collect();
    serde_json::json!({"destination": "Ubot", "events": events}).to_string()
}
