//! Simulation time model.
//!
//! # Design
//!
//! Vehicle time is a [`Timestamp`]: `f64` seconds since the Unix epoch, the
//! same representation stored in the `timestamp` column.  Each step receives
//! a [`Tick`] describing how far to move and what the vehicle's clock should
//! read afterwards:
//!
//!   accelerated:  now = current_time + tick_secs
//!   live:         now = wall clock after sleeping tick_secs
//!
//! so the step itself never needs to know which scheduling mode is active.

use std::fmt;

use crate::geo::{Catchment, GeoPoint};
use crate::{CoreError, CoreResult};

// ── Timestamp ─────────────────────────────────────────────────────────────────

/// Seconds since the Unix epoch.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timestamp(pub f64);

impl Timestamp {
    /// The current wall-clock time, microsecond resolution.
    pub fn now() -> Self {
        Timestamp(chrono::Utc::now().timestamp_micros() as f64 / 1e6)
    }

    /// The timestamp `secs` seconds after `self`.
    #[inline]
    pub fn offset(self, secs: f64) -> Timestamp {
        Timestamp(self.0 + secs)
    }

    /// Seconds elapsed from `earlier` to `self`.
    #[inline]
    pub fn since(self, earlier: Timestamp) -> f64 {
        self.0 - earlier.0
    }

    /// The later of two timestamps.
    #[inline]
    pub fn max(self, other: Timestamp) -> Timestamp {
        if other.0 > self.0 { other } else { self }
    }

    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

// ── Tick ──────────────────────────────────────────────────────────────────────

/// One step's worth of time, produced by a tick driver and consumed by
/// `Vehicle::step`.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Tick {
    /// Seconds of travel this step represents.
    pub elapsed_secs: f64,
    /// What the vehicle's clock reads after the step.  Vehicles never move
    /// their clock backwards, so an earlier value is ignored.
    pub now: Timestamp,
}

impl Tick {
    /// A simulated tick: the clock advances by exactly `elapsed_secs`.
    #[inline]
    pub fn simulated(from: Timestamp, elapsed_secs: f64) -> Self {
        Self { elapsed_secs, now: from.offset(elapsed_secs) }
    }

    /// A wall-clock tick: travel `elapsed_secs`, stamp with `now`.
    #[inline]
    pub fn wall_clock(elapsed_secs: f64, now: Timestamp) -> Self {
        Self { elapsed_secs, now }
    }
}

// ── RunConfig ─────────────────────────────────────────────────────────────────

/// Default seconds per tick.
pub const DEFAULT_TICK_SECS: f64 = 20.0;
/// Default catchment radius around home, metres.
pub const DEFAULT_CATCHMENT_RADIUS_M: f64 = 50_000.0;
/// Default home point: Berlin city centre.
pub const DEFAULT_HOME: GeoPoint = GeoPoint { lat: 52.516667, lon: 13.383333 };

/// Per-run simulation parameters.
///
/// Typically loaded from the `[simulation]` table of the application's TOML
/// config; every field has a default.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RunConfig {
    /// Seconds per tick, in both scheduling modes.  Default: 20.
    pub tick_secs: f64,

    /// Ticks ending within this distance of `home` are persisted.
    pub catchment_radius_m: f64,

    /// Where every vehicle starts, and the catchment centre.
    pub home: GeoPoint,

    /// Master RNG seed.  `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            tick_secs:          DEFAULT_TICK_SECS,
            catchment_radius_m: DEFAULT_CATCHMENT_RADIUS_M,
            home:               DEFAULT_HOME,
            seed:               None,
        }
    }
}

impl RunConfig {
    /// Reject non-positive tick length or radius and out-of-range home.
    pub fn validate(&self) -> CoreResult<()> {
        if !(self.tick_secs.is_finite() && self.tick_secs > 0.0) {
            return Err(CoreError::Config(format!(
                "tick_secs must be a positive number, got {}",
                self.tick_secs
            )));
        }
        if !(self.catchment_radius_m.is_finite() && self.catchment_radius_m > 0.0) {
            return Err(CoreError::Config(format!(
                "catchment_radius_m must be a positive number, got {}",
                self.catchment_radius_m
            )));
        }
        self.home.validate()
    }

    /// The catchment this run filters sink writes with.
    pub fn catchment(&self) -> Catchment {
        Catchment::new(self.home, self.catchment_radius_m)
    }
}
