use crate::store::{whole_number, QUALITY_PATH, TEMP_PATH};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// `{"state": n}` node as the device writes it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorState {
    #[serde(default, deserialize_with = "deserialize_state")]
    pub state: i64,
}

/// Same integer rule as single-path reads; `null` reads as zero.
fn deserialize_state<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(0);
    }
    whole_number(&value)
        .ok_or_else(|| D::Error::custom(format!("expected integer state, got {}", value)))
}

/// Observable device state as of one poll tick.
///
/// Decoded from the store root: `temp` holds the [`TEMP_PATH`] reading and
/// `quality` the [`QUALITY_PATH`] reading. Other top-level nodes (`food`,
/// `led`, `motor`) are ignored; absent sensor nodes read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub temp: SensorState,
    #[serde(default)]
    pub quality: SensorState,
}

impl Snapshot {
    pub fn new(temperature: i64, quality: i64) -> Self {
        Self {
            temp: SensorState { state: temperature },
            quality: SensorState { state: quality },
        }
    }

    /// State code of one monitored field
    pub fn value(&self, field: SensorField) -> i64 {
        match field {
            SensorField::Temperature => self.temp.state,
            SensorField::Quality => self.quality.state,
        }
    }
}

/// Sensor fields the monitor watches for transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorField {
    Temperature,
    Quality,
}

impl SensorField {
    /// Comparison order within a tick
    pub const ALL: [SensorField; 2] = [SensorField::Temperature, SensorField::Quality];

    /// Store path the device writes this field to
    pub fn path(self) -> &'static str {
        match self {
            SensorField::Temperature => TEMP_PATH,
            SensorField::Quality => QUALITY_PATH,
        }
    }

    /// Notification text for a newly observed state code.
    ///
    /// Quality uses 0 and 2 for the same condition. Codes outside the known
    /// set have no message.
    pub fn message_for(self, value: i64) -> Option<&'static str> {
        match (self, value) {
            (SensorField::Temperature, 0) => Some("Temperature is too low!"),
            (SensorField::Temperature, 1) => Some("Temperature is now okay."),
            (SensorField::Temperature, 2) => Some("Temperature is too high!"),
            (SensorField::Quality, 0 | 2) => Some("Quality is too low!"),
            (SensorField::Quality, 1) => Some("Quality is now okay."),
            _ => None,
        }
    }
}

/// One notification to broadcast
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub field: SensorField,
    pub value: i64,
    pub message: &'static str,
}

/// Compare two consecutive snapshots.
///
/// Fires on transition only: an unchanged field yields nothing whatever its
/// value. Output is ordered by `SensorField::ALL`.
pub fn detect_transitions(previous: &Snapshot, current: &Snapshot) -> Vec<Notification> {
    SensorField::ALL
        .iter()
        .filter(|field| previous.value(**field) != current.value(**field))
        .filter_map(|&field| {
            let value = current.value(field);
            field.message_for(value).map(|message| Notification {
                field,
                value,
                message,
            })
        })
        .collect()
}
