use std::path::PathBuf;

use chanrelay_common::FromMessage;

/// Crate-wide result type for configuration loading.
pub type Result<T> = std::result::Result<T, Error>;

/// Configuration errors. Every variant is fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// One or more required values were not supplied by file or environment.
    #[error("missing required configuration: {}", .fields.join(", "))]
    Missing { fields: Vec<&'static str> },

    /// A value was supplied but could not be used.
    #[error("invalid {field} ({value:?}): {reason}")]
    Invalid {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("{0}")]
    Message(String),
}

impl Error {
    #[must_use]
    pub fn invalid(
        field: &'static str,
        value: impl Into<String>,
        reason: impl std::fmt::Display,
    ) -> Self {
        Self::Invalid {
            field,
            value: value.into(),
            reason: reason.to_string(),
        }
    }

    #[must_use]
    pub fn parse(path: impl Into<PathBuf>, message: impl std::fmt::Display) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

impl FromMessage for Error {
    fn from_message(message: String) -> Self {
        Self::Message(message)
    }
}

chanrelay_common::impl_context!();
