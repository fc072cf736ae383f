//! Run observers for progress reporting and trace output.

use sd_core::{GeoPoint, Timestamp, VehicleId};
use sd_sink::SinkError;
use sd_vehicle::{StepOutcome, Vehicle};
use tokio::sync::mpsc;
use tracing::info;

use crate::RunReport;

// ── TickReport ────────────────────────────────────────────────────────────────

/// One vehicle's state after one tick, whether or not a sink took it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TickReport {
    pub id:       VehicleId,
    pub time:     Timestamp,
    pub position: GeoPoint,
    pub heading:  f64,
    pub emitted:  bool,
}

impl From<&StepOutcome> for TickReport {
    fn from(outcome: &StepOutcome) -> Self {
        Self {
            id:       outcome.record.id,
            time:     outcome.record.timestamp,
            position: outcome.record.position(),
            heading:  outcome.record.heading,
            emitted:  outcome.emitted,
        }
    }
}

// ── RunObserver ───────────────────────────────────────────────────────────────

/// Callbacks invoked by [`run`][crate::run] at key points of a run.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.  In live mode the callbacks arrive
/// concurrently from every vehicle task, hence `&self` and `Sync`.
///
/// # Example — emitted-tick counter
///
/// ```rust,ignore
/// struct Emitted(AtomicU64);
///
/// impl RunObserver for Emitted {
///     fn on_tick(&self, report: &TickReport) {
///         if report.emitted {
///             self.0.fetch_add(1, Ordering::Relaxed);
///         }
///     }
/// }
/// ```
pub trait RunObserver: Send + Sync {
    /// Called once per vehicle before its first tick.
    fn on_spawn(&self, _vehicle: &Vehicle) {}

    /// Called after every completed tick.
    fn on_tick(&self, _report: &TickReport) {}

    /// Called when a vehicle's loop ends because its sink failed.
    fn on_failure(&self, _vehicle: VehicleId, _error: &SinkError) {}

    /// Called once after every vehicle has finished.
    fn on_run_end(&self, _report: &RunReport) {}
}

/// A [`RunObserver`] that does nothing.
pub struct NoopObserver;

impl RunObserver for NoopObserver {}

/// Logs one `info` line per vehicle at spawn and one per tick, each with the
/// vehicle's id, time, position and heading.
pub struct TraceObserver;

impl RunObserver for TraceObserver {
    fn on_spawn(&self, v: &Vehicle) {
        info!(
            uid = %v.id(),
            time = %v.current_time(),
            lat = v.position().lat,
            lon = v.position().lon,
            heading = v.heading(),
            "spawn"
        );
    }

    fn on_tick(&self, r: &TickReport) {
        info!(
            uid = %r.id,
            time = %r.time,
            lat = r.position.lat,
            lon = r.position.lon,
            heading = r.heading,
            emitted = r.emitted,
            "tick"
        );
    }
}

/// Forwards every [`TickReport`] into an unbounded channel.
///
/// Sends to a closed channel are dropped; a consumer that stops listening
/// does not stop the run.
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<TickReport>,
}

impl ChannelObserver {
    pub fn new(tx: mpsc::UnboundedSender<TickReport>) -> Self {
        Self { tx }
    }

    /// An observer together with the receiving end of its channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TickReport>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl RunObserver for ChannelObserver {
    fn on_tick(&self, report: &TickReport) {
        let _ = self.tx.send(*report);
    }
}
