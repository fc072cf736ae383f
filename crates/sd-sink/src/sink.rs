//! The `Sink` trait implemented by all persistence backends.

use async_trait::async_trait;
use sd_core::SinkMode;

use crate::{SinkRecord, SinkResult};

/// Destination for in-catchment vehicle states.
///
/// A pool picks one sink at build time and shares it between all vehicles as
/// an `Arc<dyn Sink>`, so implementations must tolerate concurrent `emit`
/// calls from live-mode tasks.  Each call either persists the whole record or
/// returns an error; nothing is retried.
#[async_trait]
pub trait Sink: Send + Sync {
    /// Persist one record.
    async fn emit(&self, record: &SinkRecord) -> SinkResult<()>;

    /// The mode this backend implements.
    fn mode(&self) -> SinkMode;
}

/// A [`Sink`] that drops every record.  Used for `--store none`.
pub struct NoopSink;

#[async_trait]
impl Sink for NoopSink {
    async fn emit(&self, _record: &SinkRecord) -> SinkResult<()> {
        Ok(())
    }

    fn mode(&self) -> SinkMode {
        SinkMode::None
    }
}
