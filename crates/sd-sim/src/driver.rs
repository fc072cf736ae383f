//! Tick drivers: where each vehicle's next [`Tick`] comes from.
//!
//! | Driver              | Waits                      | `tick.now`                 |
//! |---------------------|----------------------------|----------------------------|
//! | `AcceleratedDriver` | never                      | `current_time + tick_secs` |
//! | `LiveDriver`        | `tick_secs` of tokio time  | wall clock                 |
//!
//! Both report `elapsed_secs = tick_secs`, so a vehicle covers the same
//! distance per tick in either mode.

use std::time::Duration;

use async_trait::async_trait;
use sd_core::{Tick, Timestamp};
use sd_vehicle::Vehicle;

/// Produces the next tick for a vehicle, possibly after waiting.
#[async_trait]
pub trait TickDriver: Send + Sync {
    /// The tick `vehicle` should step with next.
    async fn next_tick(&self, vehicle: &Vehicle) -> Tick;

    /// Nominal seconds per tick.
    fn tick_secs(&self) -> f64;
}

// ── AcceleratedDriver ─────────────────────────────────────────────────────────

/// Fast-forward: no waiting, simulated time only.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AcceleratedDriver {
    pub tick_secs: f64,
}

impl AcceleratedDriver {
    pub fn new(tick_secs: f64) -> Self {
        Self { tick_secs }
    }
}

#[async_trait]
impl TickDriver for AcceleratedDriver {
    async fn next_tick(&self, vehicle: &Vehicle) -> Tick {
        Tick::simulated(vehicle.current_time(), self.tick_secs)
    }

    fn tick_secs(&self) -> f64 {
        self.tick_secs
    }
}

// ── LiveDriver ────────────────────────────────────────────────────────────────

/// Real time: sleep one tick, then stamp with the wall clock.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LiveDriver {
    pub tick_secs: f64,
}

impl LiveDriver {
    pub fn new(tick_secs: f64) -> Self {
        Self { tick_secs }
    }

    fn period(&self) -> Duration {
        Duration::try_from_secs_f64(self.tick_secs).unwrap_or(Duration::ZERO)
    }
}

#[async_trait]
impl TickDriver for LiveDriver {
    async fn next_tick(&self, _vehicle: &Vehicle) -> Tick {
        tokio::time::sleep(self.period()).await;
        Tick::wall_clock(self.tick_secs, Timestamp::now())
    }

    fn tick_secs(&self) -> f64 {
        self.tick_secs
    }
}
