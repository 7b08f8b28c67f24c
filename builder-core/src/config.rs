//! `~/.builder/config.yaml`.
//!
//! Every field has a default, so a missing file (or a partial one) is fine.
//! `BUILDER_API_URL` overrides `api_url` after the file is read.
//!
//! Like the session API, each function has an `_at(home, …)` form taking an
//! explicit home directory and a no-arg wrapper resolving it through
//! `dirs::home_dir()`. Tests use the `_at` forms.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{io_err, ConfigError};

pub const DEFAULT_API_URL: &str = "https://bldr.habitat.sh/v1";
pub const API_URL_ENV: &str = "BUILDER_API_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Base URL of the builder API, including the version prefix.
    pub api_url: String,
    /// Quiet period after the last keystroke before an availability check.
    pub check_debounce_ms: u64,
    /// Delay before the first-origin nudge validates the empty name field.
    pub first_origin_nudge_ms: u64,
    pub copy_tooltip_ms: u64,
    pub copy_reset_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            check_debounce_ms: 300,
            first_origin_nudge_ms: 1000,
            copy_tooltip_ms: 10,
            copy_reset_ms: 2500,
            request_timeout_secs: 30,
        }
    }
}

impl BuilderConfig {
    pub fn check_debounce(&self) -> Duration {
        Duration::from_millis(self.check_debounce_ms)
    }

    pub fn first_origin_nudge(&self) -> Duration {
        Duration::from_millis(self.first_origin_nudge_ms)
    }

    pub fn copy_tooltip_delay(&self) -> Duration {
        Duration::from_millis(self.copy_tooltip_ms)
    }

    pub fn copy_reset_after(&self) -> Duration {
        Duration::from_millis(self.copy_reset_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.api_url = url;
        }
        self
    }
}

/// `<home>/.builder/`
pub fn builder_root(home: &Path) -> PathBuf {
    home.join(".builder")
}

/// `<home>/.builder/config.yaml`
pub fn config_path_at(home: &Path) -> PathBuf {
    builder_root(home).join("config.yaml")
}

/// Load the config under `home`, falling back to defaults when absent.
pub fn load_at(home: &Path) -> Result<BuilderConfig, ConfigError> {
    load_with_env_at(home, |key| std::env::var(key).ok())
}

/// [`load_at`] with an explicit environment lookup.
pub fn load_with_env_at(
    home: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<BuilderConfig, ConfigError> {
    let path = config_path_at(home);
    let config = if path.exists() {
        let raw = fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?
    } else {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        BuilderConfig::default()
    };
    Ok(config.apply_overrides(lookup))
}

pub fn load() -> Result<BuilderConfig, ConfigError> {
    load_at(&home()?)
}

pub fn save_at(home: &Path, config: &BuilderConfig) -> Result<PathBuf, ConfigError> {
    let root = builder_root(home);
    fs::create_dir_all(&root).map_err(|e| io_err(&root, e))?;
    let path = config_path_at(home);
    let yaml = serde_yaml::to_string(config)?;
    fs::write(&path, yaml).map_err(|e| io_err(&path, e))?;
    Ok(path)
}

pub(crate) fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}
