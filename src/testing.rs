//! In-memory store and transport doubles for unit tests.

use crate::line::ChatTransport;
use crate::monitor::Snapshot;
use crate::store::{RemoteStore, StoreError};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Store double that records every call.
///
/// `get_snapshot` pops scripted results in order and fails once the script
/// runs out.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, i64>>,
    failing_reads: Mutex<HashSet<String>>,
    failing_writes: Mutex<HashSet<String>>,
    snapshots: Mutex<VecDeque<Result<Snapshot, StoreError>>>,
    reads: Mutex<Vec<String>>,
    writes: Mutex<Vec<(String, i64)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(self, path: &str, value: i64) -> Self {
        self.values.lock().unwrap().insert(path.to_string(), value);
        self
    }

    pub fn fail_reads(self, path: &str) -> Self {
        self.failing_reads.lock().unwrap().insert(path.to_string());
        self
    }

    pub fn fail_writes(self, path: &str) -> Self {
        self.failing_writes.lock().unwrap().insert(path.to_string());
        self
    }

    pub fn push_snapshot(&self, result: Result<Snapshot, StoreError>) {
        self.snapshots.lock().unwrap().push_back(result);
    }

    pub fn reads(&self) -> Vec<String> {
        self.reads.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<(String, i64)> {
        self.writes.lock().unwrap().clone()
    }

    pub fn value(&self, path: &str) -> Option<i64> {
        self.values.lock().unwrap().get(path).copied()
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn get_int(&self, path: &str) -> Result<i64, StoreError> {
        self.reads.lock().unwrap().push(path.to_string());
        if self.failing_reads.lock().unwrap().contains(path) {
            return Err(StoreError::Request("connection refused".to_string()));
        }
        self.value(path)
            .ok_or_else(|| StoreError::Missing(path.to_string()))
    }

    async fn set_int(&self, path: &str, value: i64) -> Result<(), StoreError> {
        self.writes.lock().unwrap().push((path.to_string(), value));
        if self.failing_writes.lock().unwrap().contains(path) {
            return Err(StoreError::Status(401, "Permission denied".to_string()));
        }
        self.values.lock().unwrap().insert(path.to_string(), value);
        Ok(())
    }

    async fn get_snapshot(&self) -> Result<Snapshot, StoreError> {
        self.snapshots
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(StoreError::Request("no scripted snapshot".to_string())))
    }
}

/// Transport double that records replies and broadcasts.
#[derive(Default)]
pub struct RecordingTransport {
    replies: Mutex<Vec<(String, String)>>,
    broadcasts: Mutex<Vec<String>>,
    failing: AtomicBool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent send fail (sends are still recorded)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn replies(&self) -> Vec<(String, String)> {
        self.replies.lock().unwrap().clone()
    }

    pub fn broadcasts(&self) -> Vec<String> {
        self.broadcasts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn reply(&self, reply_token: &str, text: &str) -> anyhow::Result<()> {
        self.replies
            .lock()
            .unwrap()
            .push((reply_token.to_string(), text.to_string()));
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("transport unavailable");
        }
        Ok(())
    }

    async fn broadcast(&self, text: &str) -> anyhow::Result<()> {
        self.broadcasts.lock().unwrap().push(text.to_string());
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("transport unavailable");
        }
        Ok(())
    }
}
