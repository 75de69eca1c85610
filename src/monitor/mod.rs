// Sensor change detection and notification

mod poller;
mod snapshot;

pub use poller::{ChangeMonitor, MonitorStatus, SharedMonitorStatus, TickOutcome};
pub use snapshot::{detect_transitions, Notification, SensorField, SensorState, Snapshot};
