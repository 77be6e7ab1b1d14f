//! Configuration management
//!
//! Defaults, then the first configuration file found, then environment overrides,
//! then validation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{HarvestError, HarvestResult};

/// Configuration constants
pub mod constants {
    /// Attribute that tags an element with its translation key
    pub const DEFAULT_MARKER_ATTRIBUTE: &str = "data-i18n";

    /// Value recorded for annotated elements that display nothing
    pub const NO_VISIBLE_VALUE: &str = "No visible value";

    pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

    pub const DEFAULT_STORE_FILE: &str = "i18n-harvest.redb";

    /// Inline styles applied to highlighted elements
    pub const HIGHLIGHT_BACKGROUND: &str = "pink";
    pub const HIGHLIGHT_CURSOR: &str = "pointer";

    /// Local-storage key the page keeps its session token data under
    pub const TOKEN_STORAGE_KEY: &str = "@nFlow/TOKEN_DATA";

    /// Header carrying the tenant label
    pub const TENANT_HEADER: &str = "x-nc-tenant";

    /// Configuration file search paths
    pub const CONFIG_PATHS: &[&str] = &[
        "i18n-harvest.toml",
        ".i18n-harvest.toml",
        "~/.config/i18n-harvest/config.toml",
        "/etc/i18n-harvest/config.toml",
    ];
}

/// Settings for harvesting, storage and the translation API
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HarvestConfig {
    pub log_level: String,

    // Harvesting
    pub marker_attribute: String,
    pub no_visible_value: String,
    pub poll_interval_ms: u64,

    // Storage
    pub store_path: PathBuf,

    // Remote API
    pub api_base: Option<String>,
    pub access_token: Option<String>,
    pub session_file: Option<PathBuf>,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            marker_attribute: constants::DEFAULT_MARKER_ATTRIBUTE.to_string(),
            no_visible_value: constants::NO_VISIBLE_VALUE.to_string(),
            poll_interval_ms: constants::DEFAULT_POLL_INTERVAL_MS,
            store_path: PathBuf::from(constants::DEFAULT_STORE_FILE),
            api_base: None,
            access_token: None,
            session_file: None,
        }
    }
}

impl HarvestConfig {
    /// Loads configuration from `path`, or from the search paths when `None`
    pub fn load(path: Option<&Path>) -> HarvestResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match find_config_file() {
                Some(found) => {
                    tracing::debug!("Using configuration file {}", found.display());
                    Self::from_file(&found)?
                }
                None => Self::default(),
            },
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parses one TOML configuration file
    pub fn from_file(path: &Path) -> HarvestResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
            .map_err(|e| HarvestError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Applies `I18N_HARVEST_*` overrides
    pub fn apply_env_overrides(&mut self) -> HarvestResult<()> {
        use crate::env::{core, harvest, remote, store, EnvVar};

        if let Some(level) = core::LogLevel::lookup()? {
            self.log_level = level;
        }

        if let Some(marker) = harvest::MarkerAttribute::lookup()? {
            self.marker_attribute = marker;
        }

        if let Some(interval) = harvest::PollInterval::lookup()? {
            self.poll_interval_ms = interval.as_millis() as u64;
        }

        if let Some(path) = store::Path::lookup()? {
            self.store_path = path;
        }

        if let Some(api_base) = remote::ApiBase::lookup()? {
            tracing::info!("Environment overrides API base: {}", api_base);
            self.api_base = Some(api_base);
        }

        if let Some(token) = remote::AccessToken::lookup()? {
            self.access_token = Some(token);
        }

        if let Some(session_file) = remote::SessionFile::lookup()? {
            self.session_file = Some(session_file);
        }

        Ok(())
    }

    pub fn validate(&self) -> HarvestResult<()> {
        if self.marker_attribute.trim().is_empty() {
            return Err(HarvestError::Config(
                "marker_attribute must not be empty".to_string(),
            ));
        }

        if self.poll_interval_ms < 100 {
            return Err(HarvestError::Config(
                "poll_interval_ms must be at least 100".to_string(),
            ));
        }

        if let Some(api_base) = &self.api_base {
            url::Url::parse(api_base)
                .map_err(|e| HarvestError::Config(format!("api_base '{}': {}", api_base, e)))?;
        }

        if !matches!(
            self.log_level.as_str(),
            "trace" | "debug" | "info" | "warn" | "error"
        ) {
            return Err(HarvestError::Config(format!(
                "unknown log level '{}'",
                self.log_level
            )));
        }

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn find_config_file() -> Option<PathBuf> {
    constants::CONFIG_PATHS
        .iter()
        .map(|path| expand_home(path))
        .find(|path| path.exists())
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(rest),
            None => PathBuf::from(path),
        },
        None => PathBuf::from(path),
    }
}
