use std::sync::Arc;
use std::time::Duration;
use std::{env, fmt, fs, path};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::monitoring::SchedulerConfig;
use crate::monitoring::validation::{
    validate_check_interval, validate_retention, validate_service_url, validate_timeout,
};
use crate::notify::{DiscordSink, NotificationDispatcher, NotificationSink, WebhookSink};
use crate::retention::RetentionPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadFailed(#[source] std::io::Error),
    #[error("failed to write config file: {0}")]
    WriteFailed(#[source] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseFailed(String),
    #[error("no config directory available (set XDG_CONFIG_HOME or HOME)")]
    ConfigPathUnavailable,
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub monitoring: Monitoring,
    pub database: Database,
    pub notifications: Notifications,
    pub server: Server,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Monitoring {
    pub interval_minutes: u64,
    pub timeout_seconds: u64,
    pub retention_days: u32,
    pub user_agent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Database {
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Notifications {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discord_webhook_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Server {
    pub bind: String,
    pub port: u16,
    pub history_days: u32,
}

/// Used to ensure we are actually reading a toml file
fn normalize_toml_path(path: &path::Path) -> path::PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
        path.set_extension("toml");
    }
    path
}

/// Get default config path ($XDG_CONFIG_HOME/vigil/config.toml or
/// $HOME/.config/...)
fn default_config_path() -> Result<path::PathBuf, ConfigError> {
    let path = if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
        path::PathBuf::from(config_home)
    } else if let Some(home_dir) = env::home_dir() {
        home_dir.join(".config")
    } else {
        return Err(ConfigError::ConfigPathUnavailable);
    };

    Ok(path.join("vigil/config.toml"))
}

impl Default for Monitoring {
    fn default() -> Self {
        Self {
            interval_minutes: 30,
            timeout_seconds: 10,
            retention_days: 45,
            user_agent: concat!("vigil-status-monitor/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl Default for Database {
    fn default() -> Self {
        Self { path: "vigil.db".into() }
    }
}

impl Default for Server {
    fn default() -> Self {
        Self { bind: "0.0.0.0".into(), port: 8080, history_days: 45 }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str, value: &dyn fmt::Display| {
                writeln!(f, "  {:indent$}{}: {}", "", label, value, indent = level * 2)
            }
        };
        let write_title_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str| {
                writeln!(f, "{:indent$}{}", "", label, indent = level * 2)
            }
        };
        let or_unset = |value: &Option<String>| value.clone().unwrap_or_else(|| "(not set)".into());

        let write_title_1 = write_title_indented(1);
        let write_1 = write_indented(1);

        writeln!(f, "Current Internal Configuration State:")?;
        write_title_1(f, "Monitoring")?;
        write_1(f, "Check Interval (minutes)", &self.monitoring.interval_minutes)?;
        write_1(f, "Request Timeout (seconds)", &self.monitoring.timeout_seconds)?;
        write_1(f, "Retention (days)", &self.monitoring.retention_days)?;
        write_1(f, "User Agent", &self.monitoring.user_agent)?;
        write_title_1(f, "Database")?;
        write_1(f, "Path", &self.database.path)?;
        write_title_1(f, "Notifications")?;
        write_1(f, "Webhook URL", &or_unset(&self.notifications.webhook_url))?;
        write_1(f, "Discord Webhook URL", &or_unset(&self.notifications.discord_webhook_url))?;
        write_title_1(f, "Server")?;
        write_1(f, "Bind Address", &self.server.bind)?;
        write_1(f, "Port", &self.server.port)?;
        write_1(f, "History (days)", &self.server.history_days)?;

        Ok(())
    }
}

impl Config {
    /// Generate Config structure from file
    ///
    /// Creates a default config in ~/.config/vigil/config.toml
    ///  or the specified path, with the name config.toml if one does not exist
    ///
    /// ```no_run
    /// # use std::path;
    /// # use vigil_service::config;
    /// let cfg = config::Config::from_config(None::<&path::Path>)?;
    /// println!("{}", cfg);
    /// # Ok::<(), config::ConfigError>(())
    /// ```
    pub fn from_config(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, ConfigError> {
        let config_path: path::PathBuf = if let Some(path) = optional_path {
            normalize_toml_path(path.as_ref())
        } else {
            default_config_path()?
        };

        if config_path.exists() {
            let raw_string = fs::read_to_string(&config_path).map_err(ConfigError::ReadFailed)?;
            toml::from_str(raw_string.as_str()).map_err(|err| ConfigError::ParseFailed(err.to_string()))
        } else {
            let config = Self::default();
            config.write_config(&config_path)?;
            Ok(config)
        }
    }

    /// Load the file, apply `VIGIL_*` environment overrides, then validate
    pub fn load(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, ConfigError> {
        let mut config = Self::from_config(optional_path)?;
        config.apply_overrides(|key| env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Serialize and write a config to a file
    pub fn write_config(&self, path: &path::Path) -> Result<(), ConfigError> {
        let config_str: String =
            toml::to_string_pretty(self).map_err(|err| ConfigError::ParseFailed(err.to_string()))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(ConfigError::WriteFailed)?;
        }

        fs::write(path, config_str).map_err(ConfigError::WriteFailed)
    }

    /// Apply overrides from `lookup` (normally the process environment).
    /// Values that fail to parse are ignored with a warning.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        fn parsed<T: std::str::FromStr>(key: &str, raw: String) -> Option<T> {
            let value = raw.trim().parse().ok();
            if value.is_none() {
                warn!("Ignoring {}: cannot parse {:?}", key, raw);
            }
            value
        }

        let number = |key: &str| lookup(key).and_then(|raw| parsed::<u64>(key, raw));

        if let Some(v) = number("VIGIL_CHECK_INTERVAL_MINUTES") {
            self.monitoring.interval_minutes = v;
        }
        if let Some(v) = number("VIGIL_TIMEOUT_SECONDS") {
            self.monitoring.timeout_seconds = v;
        }
        if let Some(v) = lookup("VIGIL_RETENTION_DAYS").and_then(|raw| parsed("VIGIL_RETENTION_DAYS", raw)) {
            self.monitoring.retention_days = v;
        }
        if let Some(v) = lookup("VIGIL_SERVER_PORT").and_then(|raw| parsed("VIGIL_SERVER_PORT", raw)) {
            self.server.port = v;
        }
        if let Some(v) = lookup("VIGIL_DATABASE_PATH").filter(|v| !v.trim().is_empty()) {
            self.database.path = v;
        }
        if let Some(v) = lookup("VIGIL_WEBHOOK_URL") {
            self.notifications.webhook_url = Some(v).filter(|v| !v.trim().is_empty());
        }
        if let Some(v) = lookup("VIGIL_DISCORD_WEBHOOK_URL") {
            self.notifications.discord_webhook_url = Some(v).filter(|v| !v.trim().is_empty());
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |e: anyhow::Error| ConfigError::Invalid(e.to_string());

        validate_check_interval(self.monitoring.interval_minutes).map_err(invalid)?;
        validate_timeout(self.monitoring.timeout_seconds).map_err(invalid)?;
        validate_retention(self.monitoring.retention_days).map_err(invalid)?;

        for url in [&self.notifications.webhook_url, &self.notifications.discord_webhook_url]
            .into_iter()
            .flatten()
        {
            validate_service_url(url).map_err(invalid)?;
        }

        if self.database.path.trim().is_empty() {
            return Err(ConfigError::Invalid("database path is empty".into()));
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.monitoring.timeout_seconds)
    }

    pub fn retention_policy(&self) -> RetentionPolicy {
        RetentionPolicy::new(self.monitoring.retention_days)
    }

    pub fn to_scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            interval: Duration::from_secs(self.monitoring.interval_minutes * 60),
            retention: self.retention_policy(),
        }
    }

    /// One sink per configured webhook; none configured means events are only logged
    pub fn build_dispatcher(&self) -> anyhow::Result<NotificationDispatcher> {
        let timeout = self.request_timeout();
        let mut sinks: Vec<Arc<dyn NotificationSink>> = Vec::new();

        if let Some(url) = &self.notifications.webhook_url {
            sinks.push(Arc::new(WebhookSink::new(url.as_str(), timeout)?));
        }
        if let Some(url) = &self.notifications.discord_webhook_url {
            sinks.push(Arc::new(DiscordSink::new(url.as_str(), timeout)?));
        }

        Ok(NotificationDispatcher::new(sinks))
    }
}
