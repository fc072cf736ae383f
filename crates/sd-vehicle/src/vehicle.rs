//! `Vehicle` — one simulated agent and its step function.
//!
//! # Step
//!
//! ```text
//! distance  = speed * tick.elapsed_secs
//! position' = destination(position, heading, distance)
//! heading'  = normalize(heading + U(-5, 10))      // drifts clockwise on average
//! time'     = max(time, tick.now)
//! persist   = distance(home, position') < radius
//! ```
//!
//! The heading used for travel is the one *before* this tick's drift, so a
//! freshly created vehicle leaves home along its initial heading.
//!
//! All fields are private; the only mutation is [`Vehicle::step`] (and
//! [`Vehicle::advance`], which wraps it).

use std::ops::Range;

use sd_core::geo::normalize_bearing;
use sd_core::{
    Catchment, CoreError, CoreResult, GeoPoint, SinkMode, Tick, Timestamp, VehicleId,
    VehicleKind, VehicleRng, destination,
};
use sd_sink::{Sink, SinkRecord, SinkResult};
use tracing::trace;

/// km/h → m/s.
pub const KMH_TO_MS: f64 = 1000.0 / 3600.0;

/// Initial speeds are drawn uniformly from this range, km/h.
pub const SPEED_RANGE_KMH: Range<f64> = 10.0..50.0;

/// Per-tick heading perturbation, degrees.  Mean +2.5°, a right-hand bias.
pub const HEADING_DRIFT_DEG: Range<f64> = -5.0..10.0;

// ── VehicleSpec ───────────────────────────────────────────────────────────────

/// The attributes a pool shares between all of its vehicles.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VehicleSpec {
    pub kind:      VehicleKind,
    pub sink_mode: SinkMode,
    pub live:      bool,
    /// Starting point, and the centre of the catchment.
    pub home:      GeoPoint,
}

// ── StepOutcome ───────────────────────────────────────────────────────────────

/// What one tick produced.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StepOutcome {
    /// The vehicle's state after the tick.
    pub record:       SinkRecord,
    /// Metres travelled this tick.
    pub travelled_m:  f64,
    /// Whether the new position is inside the catchment.
    pub in_catchment: bool,
    /// Whether `record` was handed to a sink.  Always `false` from `step`.
    pub emitted:      bool,
}

// ── Vehicle ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Vehicle {
    id:           VehicleId,
    spec:         VehicleSpec,
    created_at:   Timestamp,
    current_time: Timestamp,
    position:     GeoPoint,
    heading:      f64,
    speed_m_s:    f64,
}

impl Vehicle {
    /// A vehicle parked at `spec.home` with random heading and speed.
    ///
    /// The id is a fresh v4 UUID regardless of `rng`, so seeded runs still
    /// write distinct `uid`s.
    pub fn new(spec: VehicleSpec, now: Timestamp, rng: &mut VehicleRng) -> CoreResult<Self> {
        let heading = rng.gen_range(0.0..360.0);
        let speed_m_s = rng.gen_range(SPEED_RANGE_KMH) * KMH_TO_MS;
        Self::with_kinematics(spec, now, heading, speed_m_s)
    }

    /// A vehicle with a given heading and speed.
    ///
    /// `heading_deg` is normalised into `[0, 360)`; `speed_m_s` must be finite
    /// and non-negative (zero gives a parked vehicle).
    pub fn with_kinematics(
        spec:        VehicleSpec,
        now:         Timestamp,
        heading_deg: f64,
        speed_m_s:   f64,
    ) -> CoreResult<Self> {
        spec.home.validate()?;
        if !(speed_m_s.is_finite() && speed_m_s >= 0.0) {
            return Err(CoreError::InvalidSpeed(speed_m_s));
        }
        Ok(Self {
            id:           VehicleId::new_v4(),
            spec,
            created_at:   now,
            current_time: now,
            position:     spec.home,
            heading:      normalize_bearing(heading_deg),
            speed_m_s,
        })
    }

    // ── Step ──────────────────────────────────────────────────────────────

    /// Advance by one tick.  Never touches a sink.
    pub fn step(&mut self, tick: &Tick, catchment: &Catchment, rng: &mut VehicleRng) -> StepOutcome {
        let travelled_m = self.speed_m_s * tick.elapsed_secs.max(0.0);
        let next = destination(self.position, self.heading, travelled_m);

        let drift = rng.gen_range(HEADING_DRIFT_DEG);
        self.heading = normalize_bearing(self.heading + drift);
        self.position = next;
        self.current_time = self.current_time.max(tick.now);

        StepOutcome {
            record:       self.record(),
            travelled_m,
            in_catchment: catchment.contains(self.position),
            emitted:      false,
        }
    }

    /// [`step`](Self::step), then hand the new state to `sink` if it lies in
    /// the catchment and this vehicle's sink mode persists.
    ///
    /// At most one `emit` per call, and only after the state is fully
    /// updated.  A sink error is returned as is; the vehicle has still moved.
    pub async fn advance(
        &mut self,
        tick:      &Tick,
        catchment: &Catchment,
        rng:       &mut VehicleRng,
        sink:      &dyn Sink,
    ) -> SinkResult<StepOutcome> {
        let mut outcome = self.step(tick, catchment, rng);
        if outcome.in_catchment && self.spec.sink_mode.persists() {
            sink.emit(&outcome.record).await?;
            outcome.emitted = true;
        } else {
            trace!(uid = %self.id, "tick not persisted");
        }
        Ok(outcome)
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    /// The current state as a sink record.
    pub fn record(&self) -> SinkRecord {
        SinkRecord {
            id:        self.id,
            kind:      self.spec.kind,
            timestamp: self.current_time,
            longitude: self.position.lon,
            latitude:  self.position.lat,
            heading:   self.heading,
        }
    }

    #[inline]
    pub fn id(&self) -> VehicleId {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> VehicleKind {
        self.spec.kind
    }

    #[inline]
    pub fn sink_mode(&self) -> SinkMode {
        self.spec.sink_mode
    }

    #[inline]
    pub fn is_live(&self) -> bool {
        self.spec.live
    }

    #[inline]
    pub fn home(&self) -> GeoPoint {
        self.spec.home
    }

    #[inline]
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    #[inline]
    pub fn current_time(&self) -> Timestamp {
        self.current_time
    }

    /// Simulated seconds since creation.
    #[inline]
    pub fn age_secs(&self) -> f64 {
        self.current_time.since(self.created_at)
    }

    #[inline]
    pub fn position(&self) -> GeoPoint {
        self.position
    }

    /// Degrees in `[0, 360)`.
    #[inline]
    pub fn heading(&self) -> f64 {
        self.heading
    }

    #[inline]
    pub fn speed_m_s(&self) -> f64 {
        self.speed_m_s
    }
}
