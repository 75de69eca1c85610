use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Complete feeder configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeederConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub line: LineConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub dispatcher: DispatcherConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Path the LINE platform posts webhook deliveries to
    #[serde(default = "default_webhook_path")]
    pub webhook_path: String,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_webhook_path() -> String {
    "/callback".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            webhook_path: default_webhook_path(),
        }
    }
}

/// Firebase Realtime Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// e.g. "https://my-device-default-rtdb.firebaseio.com"
    #[serde(default)]
    pub database_url: String,
    /// Database secret or ID token, sent as the `auth` query parameter
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            auth_token: None,
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

/// LINE Messaging API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LineConfig {
    #[serde(default)]
    pub channel_secret: String,
    #[serde(default)]
    pub channel_access_token: String,
    #[serde(default = "default_line_api_base")]
    pub api_base: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_line_api_base() -> String {
    "https://api.line.me".to_string()
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            channel_secret: String::new(),
            channel_access_token: String::new(),
            api_base: default_line_api_base(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

/// Change monitor configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Seconds between store polls
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
}

fn default_poll_interval() -> u64 {
    30
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: default_poll_interval(),
        }
    }
}

/// Command dispatcher configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DispatcherConfig {
    /// Food level above which "feed" is refused
    #[serde(default = "default_feed_threshold")]
    pub feed_threshold: i64,
}

fn default_feed_threshold() -> i64 {
    30
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            feed_threshold: default_feed_threshold(),
        }
    }
}

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug)]
pub enum ConfigError {
    /// Required value not set in file or environment
    Missing(&'static str),
    /// Environment value present but unparseable
    Invalid { name: &'static str, value: String },
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(name) => write!(f, "missing required configuration: {}", name),
            ConfigError::Invalid { name, value } => {
                write!(f, "invalid value for {}: '{}'", name, value)
            }
            ConfigError::Io(e) => write!(f, "failed to read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "failed to parse config file: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl FeederConfig {
    /// Apply environment overrides on top of file/default values.
    ///
    /// Variable names match the ones the LINE and Firebase consoles hand out.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("LINE_CHANNEL_SECRET") {
            self.line.channel_secret = v;
        }
        if let Some(v) = lookup("LINE_CHANNEL_ACCESS_TOKEN") {
            self.line.channel_access_token = v;
        }
        if let Some(v) = lookup("FIREBASE_DATABASE_URL") {
            self.store.database_url = v;
        }
        if let Some(v) = lookup("FIREBASE_AUTH_TOKEN") {
            self.store.auth_token = Some(v);
        }
        if let Some(v) = lookup("PORT") {
            self.server.port = v.parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: v.clone(),
            })?;
        }
        if let Some(v) = lookup("FEEDER_POLL_INTERVAL_SECONDS") {
            self.monitor.poll_interval_seconds =
                v.parse().map_err(|_| ConfigError::Invalid {
                    name: "FEEDER_POLL_INTERVAL_SECONDS",
                    value: v.clone(),
                })?;
        }
        Ok(())
    }

    /// Check that every credential the service cannot run without is present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.line.channel_secret.is_empty() {
            return Err(ConfigError::Missing("LINE_CHANNEL_SECRET"));
        }
        if self.line.channel_access_token.is_empty() {
            return Err(ConfigError::Missing("LINE_CHANNEL_ACCESS_TOKEN"));
        }
        if self.store.database_url.is_empty() {
            return Err(ConfigError::Missing("FIREBASE_DATABASE_URL"));
        }
        if !self.server.webhook_path.starts_with('/') {
            return Err(ConfigError::Invalid {
                name: "webhook_path",
                value: self.server.webhook_path.clone(),
            });
        }
        if self.monitor.poll_interval_seconds == 0 {
            return Err(ConfigError::Invalid {
                name: "poll_interval_seconds",
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

/// Load configuration from TOML file
pub fn load_config(path: impl AsRef<Path>) -> Result<FeederConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&contents).map_err(ConfigError::Parse)
}

/// Build the runtime configuration: optional TOML file named by `FEEDER_CONFIG`,
/// then process environment overrides, then validation.
pub fn from_env() -> Result<FeederConfig, ConfigError> {
    let mut config = match std::env::var("FEEDER_CONFIG") {
        Ok(path) => load_config(path)?,
        Err(_) => FeederConfig::default(),
    };
    config.apply_env(|name| std::env::var(name).ok())?;
    config.validate()?;
    Ok(config)
}
