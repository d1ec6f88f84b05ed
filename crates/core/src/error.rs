use std::error::Error as StdError;

/// Crate-wide result type for relay operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed relay errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A platform API call failed (permission, rate limit, deleted message,
    /// transport, timeout).
    #[error("{operation} failed: {source}")]
    Platform {
        operation: &'static str,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl Error {
    #[must_use]
    pub fn platform(
        operation: &'static str,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Platform {
            operation,
            source: Box::new(source),
        }
    }
}
