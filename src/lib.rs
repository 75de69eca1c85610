// Configuration (TOML file + environment)
pub mod config;

// Remote device store
pub mod store;

// LINE chat transport
pub mod line;

// Chat command dispatch
pub mod dispatcher;

// Sensor change monitor
pub mod monitor;

// HTTP API
pub mod api;

#[cfg(test)]
mod testing;

pub use dispatcher::{Command, CommandDispatcher};
pub use monitor::{ChangeMonitor, Snapshot};
