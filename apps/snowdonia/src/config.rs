//! Application configuration, loaded from a TOML file.
//!
//! ```toml
//! [service]
//! host     = "localhost"
//! port     = 5000
//! endpoint = "/data"
//! database = "traffic.db"
//!
//! [simulation]
//! tick_secs          = 20.0
//! catchment_radius_m = 50000.0
//! home               = { lat = 52.516667, lon = 13.383333 }
//! seed               = 42
//! ```
//!
//! Every key is optional; a missing file means all defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sd_core::RunConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service:    ServiceConfig,
    pub simulation: RunConfig,
}

/// Where records go: the ingest endpoint and the SQLite file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub host:     String,
    pub port:     u16,
    pub endpoint: String,
    pub database: PathBuf,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host:     "localhost".to_string(),
            port:     5000,
            endpoint: "/data".to_string(),
            database: PathBuf::from("traffic.db"),
        }
    }
}

impl ServiceConfig {
    /// `http://{host}:{port}{endpoint}`.
    pub fn url(&self) -> String {
        format!("http://{}:{}{}", self.host, self.port, self.endpoint)
    }
}

impl AppConfig {
    /// Read `path`, or fall back to defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
