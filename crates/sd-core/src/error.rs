//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]`, so validation failures raised here surface with
//! their original message at the CLI.

use thiserror::Error;

/// The top-level error type for `sd-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("coordinate out of range: lat {lat}, lon {lon} (lat must be in [-90, 90], lon in (-180, 180])")]
    InvalidCoordinate { lat: f64, lon: f64 },

    #[error("unknown vehicle kind {0:?} (expected one of: bus, taxi, tram, train)")]
    UnknownKind(String),

    #[error("unknown sink mode {0:?} (expected one of: database, api, none)")]
    UnknownSinkMode(String),

    #[error("invalid speed {0} m/s (must be finite and non-negative)")]
    InvalidSpeed(f64),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for all `sd-*` crates.
pub type CoreResult<T> = Result<T, CoreError>;
