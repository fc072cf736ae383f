//! HTTP ingest backend (feature `remote`).
//!
//! Each record becomes one form-encoded `POST` to the configured endpoint,
//! bounded by a 10 s timeout.  Transport failures, timeouts and non-2xx
//! answers are all returned as errors; the caller decides how far the
//! failure propagates.

use std::time::Duration;

use async_trait::async_trait;
use sd_core::SinkMode;
use tracing::debug;

use crate::sink::Sink;
use crate::{SinkError, SinkRecord, SinkResult};

/// Timeout applied to every ingest request.
pub const REMOTE_TIMEOUT: Duration = Duration::from_secs(10);

/// Posts records to an HTTP ingest endpoint.
pub struct RemoteSink {
    client: reqwest::Client,
    url:    String,
}

impl RemoteSink {
    /// A sink posting to `url` with the default [`REMOTE_TIMEOUT`].
    pub fn new(url: impl Into<String>) -> SinkResult<Self> {
        Self::with_timeout(url, REMOTE_TIMEOUT)
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> SinkResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(SinkError::Client)?;
        Ok(Self { client, url: url.into() })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Sink for RemoteSink {
    async fn emit(&self, record: &SinkRecord) -> SinkResult<()> {
        let resp = self
            .client
            .post(&self.url)
            .form(&record.form_fields())
            .send()
            .await
            .map_err(|source| SinkError::Http { url: self.url.clone(), source })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SinkError::Status { url: self.url.clone(), status: status.as_u16() });
        }
        debug!(uid = %record.id, status = status.as_u16(), "record posted");
        Ok(())
    }

    fn mode(&self) -> SinkMode {
        SinkMode::Remote
    }
}
