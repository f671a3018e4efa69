//! TOML-based core configuration.
//!
//! ```toml
//! [calendar]
//! utc_offset_minutes = 480
//!
//! [todos]
//! policy = "one_way"   # or "toggle"
//!
//! [logging]
//! level = "info"
//!
//! [seed]
//! sample_data = true
//! ```

use crate::model::todo::TodoPolicy;
use log::warn;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Reference calendar used for all day arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Minutes east of UTC, within `-1439..=1439`.
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TodoConfig {
    #[serde(default)]
    pub policy: TodoPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Falls back to `default_log_level()` when unset.
    #[serde(default)]
    pub level: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedConfig {
    #[serde(default = "default_true")]
    pub sample_data: bool,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self { sample_data: true }
    }
}

/// Core configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CoreConfig {
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub todos: TodoConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

fn default_true() -> bool {
    true
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, message: String },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, message } => {
                write!(f, "failed to parse config `{}`: {message}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { .. } | Self::Invalid(_) => None,
        }
    }
}

impl CoreConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw).map_err(|err| ConfigError::Parse {
            path: PathBuf::new(),
            message: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let offset = self.calendar.utc_offset_minutes;
        if !(-1439..=1439).contains(&offset) {
            return Err(ConfigError::Invalid(format!(
                "calendar.utc_offset_minutes `{offset}` is outside -1439..=1439"
            )));
        }
        Ok(())
    }
}

/// Loads configuration from `path`.
pub fn load_config(path: impl AsRef<Path>) -> Result<CoreConfig, ConfigError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    CoreConfig::from_toml_str(&raw).map_err(|err| match err {
        ConfigError::Parse { message, .. } => ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        },
        other => other,
    })
}

/// Loads configuration, falling back to defaults when the file is missing
/// or invalid.
pub fn load_config_or_default(path: impl AsRef<Path>) -> CoreConfig {
    let path = path.as_ref();
    match load_config(path) {
        Ok(config) => config,
        Err(ConfigError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            CoreConfig::default()
        }
        Err(err) => {
            warn!(
                "event=config_load module=config status=fallback error={}",
                err
            );
            CoreConfig::default()
        }
    }
}
