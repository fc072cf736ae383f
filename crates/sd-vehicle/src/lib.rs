//! `sd-vehicle` — simulated vehicles for the `snowdonia` simulator.
//!
//! A [`Vehicle`] owns its kinematic state and advances it one tick at a time
//! with [`Vehicle::step`].  Randomness (initial speed and heading, per-tick
//! heading drift) comes from an injected [`sd_core::VehicleRng`], and time
//! from the [`sd_core::Tick`] a scheduler hands in, so the step itself is the
//! same in accelerated and live runs.

pub mod vehicle;


pub use vehicle::{
    HEADING_DRIFT_DEG, KMH_TO_MS, SPEED_RANGE_KMH, StepOutcome, Vehicle, VehicleSpec,
};
