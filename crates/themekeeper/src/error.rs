//! Error types for theme persistence.
//!
//! An invalid stored preference is not an error; it is normalized to
//! `system`. [`ThemeError`] only covers infrastructure failures: the state
//! file, its encoding, and configuration.

use std::io;
use std::path::PathBuf;

use crate::preference::ParsePreferenceError;

/// Errors raised by stores, configuration and the controller.
#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    /// Reading or writing a file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The state file could not be encoded.
    #[error("Failed to encode state: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Configuration is malformed or out of range.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A preference string supplied by a caller is not valid.
    #[error(transparent)]
    Parse(#[from] ParsePreferenceError),
}

impl ThemeError {
    /// Create an I/O error tagged with the path involved.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<serde_yaml::Error> for ThemeError {
    fn from(err: serde_yaml::Error) -> Self {
        ThemeError::Config(err.to_string())
    }
}
