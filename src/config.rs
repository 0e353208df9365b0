//! Credentials and runtime settings.
//!
//! Credentials come from the environment as comma-separated key lists.
//! Tunables come from an optional TOML file, validated on load, and may be
//! overridden afterwards by command-line flags.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::http_client::HttpTimeouts;
use crate::providers::{DEFAULT_GENIUS_BASE_URL, DEFAULT_YOUTUBE_BASE_URL};
use crate::request::RetryPolicy;
use crate::rotation::DEFAULT_COOLDOWN;

/// Environment variable holding the comma-separated YouTube key pool.
pub const YOUTUBE_KEYS_ENV: &str = "CLOWDS_YOUTUBE_API_KEYS";

/// Environment variable holding the comma-separated Genius token pool.
pub const GENIUS_KEYS_ENV: &str = "CLOWDS_GENIUS_API_KEYS";

/// Errors loading or validating settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file could not be read.
    #[error("failed to read config file '{}': {source}", .path.display())]
    Read {
        /// The file path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid TOML for [`FileSettings`].
    #[error("failed to parse config: {source}")]
    Parse {
        /// The underlying TOML error.
        #[from]
        source: toml::de::Error,
    },

    /// A value is outside its allowed range.
    #[error("invalid config value for `{field}`: {value}. Expected range: {expected}")]
    InvalidValue {
        /// Settings key.
        field: &'static str,
        /// The offending value.
        value: u64,
        /// Human-readable allowed range.
        expected: &'static str,
    },
}

/// Splits a comma-separated key list, trimming entries and dropping empties.
#[must_use]
pub fn parse_key_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .collect()
}

/// Key pools for both providers.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// YouTube Data API keys, in rotation order.
    pub youtube: Vec<String>,
    /// Genius access tokens, in rotation order.
    pub genius: Vec<String>,
}

impl Credentials {
    /// Reads both pools from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads both pools through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| lookup(name).map(|raw| parse_key_list(&raw)).unwrap_or_default();
        let credentials = Self {
            youtube: read(YOUTUBE_KEYS_ENV),
            genius: read(GENIUS_KEYS_ENV),
        };
        debug!(
            youtube_keys = credentials.youtube.len(),
            genius_keys = credentials.genius.len(),
            "loaded credentials"
        );
        credentials
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("youtube", &format_args!("<{} keys>", self.youtube.len()))
            .field("genius", &format_args!("<{} keys>", self.genius.len()))
            .finish()
    }
}

/// TOML-backed settings file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileSettings {
    /// Failed-key cooldown in seconds (1..=86400).
    pub cooldown_secs: Option<u64>,
    /// Attempts per request (1..=10).
    pub max_attempts: Option<u32>,
    /// Base wait when every key has failed, in milliseconds (0..=60000).
    pub exhausted_backoff_ms: Option<u64>,
    /// HTTP connect timeout in seconds (1..=3600).
    pub connect_timeout_secs: Option<u64>,
    /// HTTP request timeout in seconds (1..=3600).
    pub read_timeout_secs: Option<u64>,
    /// YouTube API root override.
    pub youtube_base_url: Option<String>,
    /// Genius API root override.
    pub genius_base_url: Option<String>,
}

impl FileSettings {
    /// Checks every present value against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for the first out-of-range value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("cooldown_secs", self.cooldown_secs, 1, 86_400, "1..=86400")?;
        check_range(
            "max_attempts",
            self.max_attempts.map(u64::from),
            1,
            10,
            "1..=10",
        )?;
        check_range(
            "exhausted_backoff_ms",
            self.exhausted_backoff_ms,
            0,
            60_000,
            "0..=60000",
        )?;
        check_range(
            "connect_timeout_secs",
            self.connect_timeout_secs,
            1,
            3600,
            "1..=3600",
        )?;
        check_range(
            "read_timeout_secs",
            self.read_timeout_secs,
            1,
            3600,
            "1..=3600",
        )?;
        Ok(())
    }
}

fn check_range(
    field: &'static str,
    value: Option<u64>,
    min: u64,
    max: u64,
    expected: &'static str,
) -> Result<(), ConfigError> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(min..=max).contains(&value) {
        return Err(ConfigError::InvalidValue {
            field,
            value,
            expected,
        });
    }
    Ok(())
}

/// Effective runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Failed-key cooldown for both pools.
    pub cooldown: Duration,
    /// Retry bound and exhausted-pool backoff.
    pub retry: RetryPolicy,
    /// HTTP client timeouts.
    pub timeouts: HttpTimeouts,
    /// YouTube API root.
    pub youtube_base_url: String,
    /// Genius API root.
    pub genius_base_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cooldown: DEFAULT_COOLDOWN,
            retry: RetryPolicy::default(),
            timeouts: HttpTimeouts::default(),
            youtube_base_url: DEFAULT_YOUTUBE_BASE_URL.to_string(),
            genius_base_url: DEFAULT_GENIUS_BASE_URL.to_string(),
        }
    }
}

impl Settings {
    /// Applies file values on top of the defaults. `file` must be validated.
    #[must_use]
    pub fn from_file(file: &FileSettings) -> Self {
        let mut settings = Self::default();
        if let Some(secs) = file.cooldown_secs {
            settings.cooldown = Duration::from_secs(secs);
        }
        let max_attempts = file.max_attempts.unwrap_or(settings.retry.max_attempts());
        let backoff = file
            .exhausted_backoff_ms
            .map_or(settings.retry.exhausted_backoff(), Duration::from_millis);
        settings.retry = RetryPolicy::new(max_attempts, backoff);
        if let Some(secs) = file.connect_timeout_secs {
            settings.timeouts.connect = Duration::from_secs(secs);
        }
        if let Some(secs) = file.read_timeout_secs {
            settings.timeouts.read = Duration::from_secs(secs);
        }
        if let Some(url) = &file.youtube_base_url {
            settings.youtube_base_url.clone_from(url);
        }
        if let Some(url) = &file.genius_base_url {
            settings.genius_base_url.clone_from(url);
        }
        settings
    }

    /// Overrides the cooldown.
    #[must_use]
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Overrides the attempt bound, keeping the backoff.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.retry = RetryPolicy::new(max_attempts, self.retry.exhausted_backoff());
        self
    }
}

/// Resolves the default settings path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/clowds/config.toml`
/// 2. `$HOME/.config/clowds/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    resolve_config_path_with(|name| env::var_os(name))
}

fn resolve_config_path_with(lookup: impl Fn(&str) -> Option<OsString>) -> Option<PathBuf> {
    let non_empty = |name: &str| lookup(name).filter(|value| !value.is_empty());

    if let Some(xdg_config_home) = non_empty("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("clowds")
                .join("config.toml"),
        );
    }

    let home = non_empty("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("clowds")
            .join("config.toml"),
    )
}

/// Parses and validates settings from a TOML string.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys and
/// [`ConfigError::InvalidValue`] for out-of-range values.
pub fn parse_settings_str(raw: &str) -> Result<FileSettings, ConfigError> {
    let settings: FileSettings = toml::from_str(raw)?;
    settings.validate()?;
    Ok(settings)
}

/// Reads, parses and validates the settings file at `path`.
///
/// # Errors
///
/// Returns [`ConfigError::Read`] when the file cannot be read, otherwise as
/// [`parse_settings_str`].
pub fn load_file_settings(path: &Path) -> Result<FileSettings, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let settings = parse_settings_str(&raw)?;
    debug!(path = %path.display(), "loaded settings file");
    Ok(settings)
}

/// Loads the default settings file if it exists.
///
/// # Errors
///
/// As [`load_file_settings`] when the file exists but is unreadable or invalid.
pub fn load_default_file_settings() -> Result<Option<FileSettings>, ConfigError> {
    let Some(path) = resolve_default_config_path() else {
        return Ok(None);
    };
    if !path.exists() {
        debug!(path = %path.display(), "no settings file");
        return Ok(None);
    }
    load_file_settings(&path).map(Some)
}
