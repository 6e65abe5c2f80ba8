//! Shared configuration for the DocBot admin tools.
//!
//! TOML file plus `DOCBOT_*` environment overrides, and translation to
//! `docbot_core::DashboardConfig`. The CLI layers its own flags on top.
//! The admin password is never read from or written to this file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::{ProjectDirs, UserDirs};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use docbot_core::{DashboardConfig, FeedbackWindows, PollIntervals};

/// Environment prefix; nested keys use `__` (`DOCBOT_INTERVALS__STATS=5`).
pub const ENV_PREFIX: &str = "DOCBOT_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Admin service base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Where exports are written. Defaults to the platform download dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,

    #[serde(default)]
    pub feedback: Feedback,

    #[serde(default)]
    pub intervals: Intervals,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout: default_timeout(),
            export_dir: None,
            feedback: Feedback::default(),
            intervals: Intervals::default(),
        }
    }
}

/// Outcome-message lifetimes, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Feedback {
    #[serde(default = "default_success_window_ms")]
    pub success_window_ms: u64,
    #[serde(default = "default_failure_window_ms")]
    pub failure_window_ms: u64,
}

impl Default for Feedback {
    fn default() -> Self {
        Self {
            success_window_ms: default_success_window_ms(),
            failure_window_ms: default_failure_window_ms(),
        }
    }
}

/// Poll periods in seconds. `0` fetches once per subscription.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Intervals {
    pub stats: u64,
    pub conversions: u64,
    pub timeseries: u64,
    pub feature_usage: u64,
    pub user_analytics: u64,
    pub error_tracking: u64,
    pub system_health: u64,
    pub liveness: u64,
}

impl Default for Intervals {
    fn default() -> Self {
        let d = PollIntervals::default();
        Self {
            stats: d.stats.as_secs(),
            conversions: d.conversions.as_secs(),
            timeseries: d.timeseries.as_secs(),
            feature_usage: d.feature_usage.as_secs(),
            user_analytics: d.user_analytics.as_secs(),
            error_tracking: d.error_tracking.as_secs(),
            system_health: d.system_health.as_secs(),
            liveness: d.liveness.as_secs(),
        }
    }
}

impl From<&Intervals> for PollIntervals {
    fn from(i: &Intervals) -> Self {
        Self {
            stats: Duration::from_secs(i.stats),
            conversions: Duration::from_secs(i.conversions),
            timeseries: Duration::from_secs(i.timeseries),
            feature_usage: Duration::from_secs(i.feature_usage),
            user_analytics: Duration::from_secs(i.user_analytics),
            error_tracking: Duration::from_secs(i.error_tracking),
            system_health: Duration::from_secs(i.system_health),
            liveness: Duration::from_secs(i.liveness),
        }
    }
}

fn default_api_url() -> String {
    "http://localhost:8000".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_success_window_ms() -> u64 {
    3000
}
fn default_failure_window_ms() -> u64 {
    5000
}

// ── Paths ───────────────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "docbot", "docbot").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("docbot");
    p
}

/// Platform download directory, else the working directory.
pub fn default_export_dir() -> PathBuf {
    UserDirs::new()
        .and_then(|dirs| dirs.download_dir().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

// ── Loading ─────────────────────────────────────────────────────────

/// Defaults, then the TOML file at `path`, then the environment.
pub fn figment_for(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Load the config at `path`, layered under the environment.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = figment_for(path).extract()?;
    Ok(config)
}

/// Load the config from the canonical path.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Saving ──────────────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

// ── Translation ─────────────────────────────────────────────────────

impl Config {
    /// Validate and convert into the core's runtime configuration.
    pub fn to_dashboard_config(&self) -> Result<DashboardConfig, ConfigError> {
        let base_url = parse_api_url(&self.api_url)?;
        if self.timeout == 0 {
            return Err(ConfigError::Validation {
                field: "timeout".into(),
                reason: "must be at least 1 second".into(),
            });
        }

        Ok(DashboardConfig {
            base_url,
            timeout: Duration::from_secs(self.timeout),
            intervals: PollIntervals::from(&self.intervals),
            feedback: FeedbackWindows {
                success: Duration::from_millis(self.feedback.success_window_ms),
                failure: Duration::from_millis(self.feedback.failure_window_ms),
            },
            export_dir: self.export_dir.clone().unwrap_or_else(default_export_dir),
        })
    }
}

/// Parse an `http`/`https` base URL.
pub fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::Validation {
        field: "api_url".into(),
        reason: format!("{e}: {raw}"),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Validation {
            field: "api_url".into(),
            reason: format!("unsupported scheme '{other}', expected http or https"),
        }),
    }
}
