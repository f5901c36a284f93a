//! Controller configuration.
//!
//! All fields have defaults, so an empty document is a valid config:
//!
//! ```yaml
//! storage_key: theme
//! state_file: /home/me/.config/themekeeper/state.json
//! poll_interval_ms: 1000
//! ```
//!
//! `THEMEKEEPER_STATE` and `THEMEKEEPER_KEY` override the state file and the
//! key when [`ThemeConfig::with_env_overrides`] is applied.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ThemeError;

/// Key the preference is stored under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "theme";

/// Environment variable overriding [`ThemeConfig::state_file`].
pub const STATE_ENV: &str = "THEMEKEEPER_STATE";

/// Environment variable overriding [`ThemeConfig::storage_key`].
pub const KEY_ENV: &str = "THEMEKEEPER_KEY";

const STATE_FILE_NAME: &str = "state.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    /// Key the preference is stored under.
    pub storage_key: String,
    /// Path of the JSON state file. `None` means the platform config dir.
    pub state_file: Option<PathBuf>,
    /// Period between OS color scheme polls, in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            state_file: None,
            poll_interval_ms: 1000,
        }
    }
}

impl ThemeConfig {
    /// Parses and validates a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ThemeError> {
        // An empty document deserializes as null, not as an empty map.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ThemeError> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path).map_err(|e| ThemeError::io(path, e))?;
        Self::from_yaml(&yaml)
    }

    /// Applies `THEMEKEEPER_STATE` / `THEMEKEEPER_KEY` when set and non-empty.
    pub fn with_env_overrides(mut self) -> Result<Self, ThemeError> {
        if let Some(state) = std::env::var_os(STATE_ENV).filter(|v| !v.is_empty()) {
            self.state_file = Some(PathBuf::from(state));
        }
        if let Ok(key) = std::env::var(KEY_ENV) {
            if !key.is_empty() {
                self.storage_key = key;
            }
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ThemeError> {
        if self.storage_key.trim().is_empty() {
            return Err(ThemeError::config("storage_key must not be empty"));
        }
        if self.poll_interval_ms == 0 {
            return Err(ThemeError::config("poll_interval_ms must be greater than zero"));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// The state file to use: the configured one, else
    /// `<config dir>/themekeeper/state.json`.
    pub fn resolved_state_file(&self) -> Result<PathBuf, ThemeError> {
        if let Some(path) = &self.state_file {
            return Ok(path.clone());
        }
        dirs::config_dir()
            .map(|dir| dir.join("themekeeper").join(STATE_FILE_NAME))
            .ok_or_else(|| {
                ThemeError::config(format!(
                    "no platform config directory; set state_file or {}",
                    STATE_ENV
                ))
            })
    }
}
