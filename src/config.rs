//! Static client configuration.
//!
//! DESIGN
//! ======
//! Values come from three layers, later ones winning:
//!
//! 1. built-in defaults,
//! 2. an optional JSON file (`camelCase` keys, every key optional),
//! 3. `GEOCLIENT_*` environment variables for the numeric values.
//!
//! A missing, zero or empty value in the file counts as "not set" and falls
//! back to the default.
//!
//! ERROR HANDLING
//! ==============
//! An unreadable or unparseable file is an error; the client does not start
//! with a half-applied configuration. Unparseable environment values are
//! ignored.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::{Path, PathBuf};
use std::time::Duration;

use livemap::geo::LatLng;
use livemap::scope::ScopeSettings;
use livemap::style::UnitColors;
use serde::Deserialize;
use tracing::info;

pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 2000;
pub const DEFAULT_ONLINE_TIMEOUT_MS: i64 = 30 * 60_000;
pub const DEFAULT_INITIAL_POSITION: LatLng = LatLng { lat: 48.208_981_6, lng: 16.371_019_3 };
pub const DEFAULT_INITIAL_ZOOM: u8 = 14;
pub const DEFAULT_API_URL: &str = "/api/v1/public";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Interval between snapshot fetches.
    pub refresh_interval: Duration,
    /// A unit counts as offline once its live position is this old.
    pub online_timeout: time::Duration,
    pub initial_position: LatLng,
    pub initial_zoom: u8,
    /// API base; relative values are resolved against the server URL.
    pub api_url: String,
    /// Name keyword to fill color, first match wins.
    pub unit_colors: UnitColors,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_millis(DEFAULT_REFRESH_INTERVAL_MS),
            online_timeout: time::Duration::milliseconds(DEFAULT_ONLINE_TIMEOUT_MS),
            initial_position: DEFAULT_INITIAL_POSITION,
            initial_zoom: DEFAULT_INITIAL_ZOOM,
            api_url: DEFAULT_API_URL.to_owned(),
            unit_colors: UnitColors::default(),
        }
    }
}

/// The file format. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawConfig {
    refresh_interval: Option<u64>,
    online_timeout: Option<i64>,
    initial_position: Option<LatLng>,
    initial_zoom: Option<u8>,
    api_url: Option<String>,
    unit_colors: Option<UnitColors>,
}

impl Config {
    /// Load the configuration: defaults, then `path` if given, then environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .map_err(|source| ConfigError::Read { path: path.to_owned(), source })?;
                Self::from_json(&text).map_err(|source| ConfigError::Parse { path: path.to_owned(), source })?
            }
            None => Self::default(),
        };
        let config = config.with_env();
        info!(
            refresh_ms = config.refresh_interval.as_millis(),
            online_timeout_s = config.online_timeout.whole_seconds(),
            api_url = %config.api_url,
            unit_colors = config.unit_colors.len(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// Parse a JSON config document, falling back to defaults per key.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let raw: RawConfig = serde_json::from_str(text)?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: RawConfig) -> Self {
        let defaults = Self::default();
        Self {
            refresh_interval: raw
                .refresh_interval
                .filter(|ms| *ms > 0)
                .map_or(defaults.refresh_interval, Duration::from_millis),
            online_timeout: raw
                .online_timeout
                .filter(|ms| *ms > 0)
                .map_or(defaults.online_timeout, time::Duration::milliseconds),
            initial_position: raw.initial_position.unwrap_or(defaults.initial_position),
            initial_zoom: raw.initial_zoom.filter(|z| *z > 0).unwrap_or(defaults.initial_zoom),
            api_url: raw.api_url.filter(|url| !url.is_empty()).unwrap_or(defaults.api_url),
            unit_colors: raw.unit_colors.unwrap_or(defaults.unit_colors),
        }
    }

    /// Apply `GEOCLIENT_REFRESH_INTERVAL_MS` and `GEOCLIENT_ONLINE_TIMEOUT_MS`.
    #[must_use]
    pub fn with_env(mut self) -> Self {
        let refresh_ms = env_parse("GEOCLIENT_REFRESH_INTERVAL_MS", 0_u64);
        if refresh_ms > 0 {
            self.refresh_interval = Duration::from_millis(refresh_ms);
        }
        let timeout_ms = env_parse("GEOCLIENT_ONLINE_TIMEOUT_MS", 0_i64);
        if timeout_ms > 0 {
            self.online_timeout = time::Duration::milliseconds(timeout_ms);
        }
        self
    }

    /// Settings for the reconciliation service of a session authenticated as `own_id`.
    #[must_use]
    pub fn scope_settings(&self, own_id: Option<String>) -> ScopeSettings {
        ScopeSettings { own_id, online_timeout: self.online_timeout, unit_colors: self.unit_colors.clone() }
    }
}

/// Parse environment variable `key`, or return `default` if unset or invalid.
pub fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key).map_or(default, |v| v.parse::<T>().unwrap_or(default))
}
