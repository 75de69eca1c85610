// Remote store access (Firebase Realtime Database)

mod firebase;

pub use firebase::FirebaseClient;

use crate::monitor::Snapshot;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

/// Actuator path for the LED (written by the dispatcher)
pub const LED_PATH: &str = "led/state";
/// Actuator path for the feeding motor (written by the dispatcher)
pub const MOTOR_PATH: &str = "motor/state";
/// Sensor path for the food level, in percent (written by the device)
pub const FOOD_PATH: &str = "food/state";
/// Sensor path for the temperature state code
pub const TEMP_PATH: &str = "temp/state";
/// Sensor path for the water quality state code
pub const QUALITY_PATH: &str = "quality/state";

/// Integer reading of a stored JSON number.
///
/// Whole-valued floats are accepted since devices often write `25.0`.
pub(crate) fn whole_number(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    match value.as_f64() {
        Some(f) if f.fract() == 0.0 => Some(f as i64),
        _ => None,
    }
}

/// Typed access to the shared device tree.
///
/// Implementations must tolerate concurrent use from the monitor task and
/// any number of in-flight dispatches. No atomicity is provided across
/// calls; the device may write sensor paths at any time.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Read the integer stored at `path`.
    async fn get_int(&self, path: &str) -> Result<i64, StoreError>;

    /// Overwrite the integer stored at `path` (last write wins).
    async fn set_int(&self, path: &str, value: i64) -> Result<(), StoreError>;

    /// Read the whole observable state from the tree root.
    async fn get_snapshot(&self) -> Result<Snapshot, StoreError>;
}

/// Store access errors
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Network failure or request timeout
    Request(String),
    /// Store answered with a non-success status
    Status(u16, String),
    /// Nothing stored at the path
    Missing(String),
    /// Stored value has an unexpected shape
    Decode(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Request(msg) => write!(f, "store request failed: {}", msg),
            StoreError::Status(code, body) => {
                write!(f, "store returned status {}: {}", code, body)
            }
            StoreError::Missing(path) => write!(f, "no value stored at '{}'", path),
            StoreError::Decode(msg) => write!(f, "unexpected store value: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        StoreError::Request(e.to_string())
    }
}
