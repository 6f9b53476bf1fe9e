use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = ConfigError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {format} file {path}: {message}")]
    Parse {
        format: &'static str,
        path: PathBuf,
        message: String,
    },

    #[error("Failed to convert value at '{key}': {source}")]
    Convert {
        key: String,
        source: serde_json::Error,
    },

    #[error("Failed to parse settings: {0}")]
    ParseSettings(#[from] serde_yaml::Error),
}

impl ConfigError {
    #[must_use]
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument(reason.into())
    }

    pub(crate) fn parse(
        format: &'static str,
        path: impl Into<PathBuf>,
        message: impl std::fmt::Display,
    ) -> Self {
        Self::Parse {
            format,
            path: path.into(),
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }

    #[must_use]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}
