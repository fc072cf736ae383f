//! The vehicle pool and its fluent builder.

use sd_core::{RunConfig, SimRng, SinkMode, Timestamp, VehicleKind, VehicleRng};
use sd_vehicle::{Vehicle, VehicleSpec};
use tracing::debug;

use crate::{SimError, SimResult};

// ── Pool ──────────────────────────────────────────────────────────────────────

/// A fixed set of vehicles sharing kind, sink mode and scheduling mode.
///
/// `vehicles[i]` draws its randomness from `rngs[i]` only; the two vectors
/// are kept separate so the run loop can borrow one vehicle and its RNG
/// mutably at the same time.
pub struct Pool {
    pub(crate) vehicles: Vec<Vehicle>,
    pub(crate) rngs:     Vec<VehicleRng>,
    spec:                VehicleSpec,
    config:              RunConfig,
}

impl Pool {
    #[inline]
    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    /// Vehicles in creation order.
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn spec(&self) -> VehicleSpec {
        self.spec
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    #[inline]
    pub fn is_live(&self) -> bool {
        self.spec.live
    }
}

// ── PoolBuilder ───────────────────────────────────────────────────────────────

/// Fluent builder for [`Pool`].
///
/// # Optional inputs (have defaults)
///
/// | Method        | Default                                   |
/// |---------------|-------------------------------------------|
/// | `.config(c)`  | `RunConfig::default()` (Berlin, 20 s, 50 km, entropy seed) |
///
/// # Example
///
/// ```rust,ignore
/// let pool = PoolBuilder::new(100, VehicleKind::Bus, SinkMode::Direct, false)
///     .config(config)
///     .build(Timestamp::now())?;
/// ```
pub struct PoolBuilder {
    size:      usize,
    kind:      VehicleKind,
    sink_mode: SinkMode,
    live:      bool,
    config:    RunConfig,
}

impl PoolBuilder {
    pub fn new(size: usize, kind: VehicleKind, sink_mode: SinkMode, live: bool) -> Self {
        Self { size, kind, sink_mode, live, config: RunConfig::default() }
    }

    /// Replace the default run parameters.
    pub fn config(mut self, config: RunConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate inputs and create every vehicle at `config.home`, all
    /// stamped with `now`.
    pub fn build(self, now: Timestamp) -> SimResult<Pool> {
        if self.size == 0 {
            return Err(SimError::Config("pool size must be at least 1".into()));
        }
        self.config.validate()?;

        let spec = VehicleSpec {
            kind:      self.kind,
            sink_mode: self.sink_mode,
            live:      self.live,
            home:      self.config.home,
        };

        let global_seed: u64 = SimRng::from_seed_opt(self.config.seed).random();
        let mut vehicles = Vec::with_capacity(self.size);
        let mut rngs = Vec::with_capacity(self.size);
        for i in 0..self.size {
            let mut rng = VehicleRng::new(global_seed, i);
            vehicles.push(Vehicle::new(spec, now, &mut rng)?);
            rngs.push(rng);
        }
        debug!(size = self.size, kind = %self.kind, seed = global_seed, "pool built");

        Ok(Pool { vehicles, rngs, spec, config: self.config })
    }
}
