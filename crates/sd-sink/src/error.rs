//! Error types for sd-sink.

use thiserror::Error;

/// Errors raised while persisting a record or administering the store.
///
/// None of these are retried inside the sink; the scheduler decides whether
/// a failure ends the whole run or a single vehicle's loop.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[cfg(feature = "sqlite")]
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("storage connection lock poisoned by a panicked writer")]
    Poisoned,

    #[cfg(feature = "sqlite")]
    #[error("blocking SQLite writer did not finish: {0}")]
    Writer(String),

    #[cfg(feature = "remote")]
    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[cfg(feature = "remote")]
    #[error("failed calling POST {url:?}: {source}. Is the server running?")]
    Http {
        url:    String,
        #[source]
        source: reqwest::Error,
    },

    #[cfg(feature = "remote")]
    #[error("POST {url:?} answered with status {status}")]
    Status { url: String, status: u16 },
}

/// Alias for `Result<T, SinkError>`.
pub type SinkResult<T> = Result<T, SinkError>;
