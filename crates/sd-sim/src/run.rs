//! The run loop.
//!
//! # Accelerated (`live = false`)
//!
//! ```text
//! for vehicle in pool:                       // one after another
//!   while vehicle.age < duration:
//!     tick = current_time + tick_secs         // no waiting
//!     advance(vehicle, tick) → sink?          // failure ends the run
//! ```
//!
//! # Live (`live = true`)
//!
//! ```text
//! deadline = now + duration
//! for vehicle in pool: spawn {
//!   while now < deadline:
//!     sleep(tick_secs); tick = wall clock
//!     advance(vehicle, tick) → sink?          // failure ends this task only
//! }
//! join all
//! ```
//!
//! The deadline is checked before each sleep, so a tick that started before
//! the deadline always completes.

use std::sync::Arc;
use std::time::Duration;

use sd_core::{Catchment, VehicleId, VehicleRng};
use sd_sink::{Sink, SinkError};
use sd_vehicle::Vehicle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::{
    AcceleratedDriver, LiveDriver, Pool, RunObserver, SimError, SimResult, TickDriver, TickReport,
};

// ── RunReport ─────────────────────────────────────────────────────────────────

/// Summary of a finished run.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Vehicles that took part.
    pub vehicles: usize,
    /// Completed ticks, over all vehicles.
    pub ticks:    u64,
    /// Ticks whose record a sink accepted.
    pub emitted:  u64,
    /// Live-mode vehicles stopped early by a sink error.
    pub failures: Vec<VehicleFailure>,
}

impl RunReport {
    /// No vehicle was stopped by its sink.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A vehicle whose loop ended on a sink error.
#[derive(Debug)]
pub struct VehicleFailure {
    pub vehicle: VehicleId,
    pub error:   SinkError,
}

// ── Entry points ──────────────────────────────────────────────────────────────

/// Run every vehicle in `pool` for `duration_secs`, with the driver the
/// pool's mode calls for.
///
/// Vehicles are moved back into `pool` afterwards, so their final state can
/// be read from [`Pool::vehicles`].
pub async fn run(
    pool:          &mut Pool,
    duration_secs: f64,
    sink:          Arc<dyn Sink>,
    observer:      Arc<dyn RunObserver>,
) -> SimResult<RunReport> {
    let tick_secs = pool.config().tick_secs;
    let driver: Arc<dyn TickDriver> = if pool.is_live() {
        Arc::new(LiveDriver::new(tick_secs))
    } else {
        Arc::new(AcceleratedDriver::new(tick_secs))
    };
    run_with_driver(pool, duration_secs, driver, sink, observer).await
}

/// [`run`] with an explicit tick driver.
///
/// The pool's `live` flag still decides the stop condition and whether
/// vehicles run concurrently.
pub async fn run_with_driver(
    pool:          &mut Pool,
    duration_secs: f64,
    driver:        Arc<dyn TickDriver>,
    sink:          Arc<dyn Sink>,
    observer:      Arc<dyn RunObserver>,
) -> SimResult<RunReport> {
    let length = validate_duration(duration_secs)?;
    let spec = pool.spec();
    if spec.sink_mode != sink.mode() {
        warn!(pool = %spec.sink_mode, sink = %sink.mode(), "sink does not match the pool's sink mode");
    }
    info!(
        vehicles = pool.len(),
        kind = %spec.kind,
        live = spec.live,
        store = %spec.sink_mode,
        duration_secs,
        tick_secs = driver.tick_secs(),
        "run start"
    );

    let report = if spec.live {
        run_live(pool, length, driver, sink, Arc::clone(&observer)).await?
    } else {
        run_accelerated(pool, duration_secs, driver.as_ref(), sink.as_ref(), observer.as_ref())
            .await?
    };

    info!(
        ticks = report.ticks,
        emitted = report.emitted,
        failures = report.failures.len(),
        "run end"
    );
    observer.on_run_end(&report);
    Ok(report)
}

/// Check a run length before anything is built or opened.
///
/// Accepts finite, strictly positive seconds that fit a [`Duration`].
pub fn validate_duration(duration_secs: f64) -> SimResult<Duration> {
    if !(duration_secs.is_finite() && duration_secs > 0.0) {
        return Err(SimError::Config(format!(
            "duration must be a positive number of seconds, got {duration_secs}"
        )));
    }
    Duration::try_from_secs_f64(duration_secs)
        .map_err(|e| SimError::Config(format!("duration {duration_secs} s: {e}")))
}

// ── Modes ─────────────────────────────────────────────────────────────────────

async fn run_accelerated(
    pool:          &mut Pool,
    duration_secs: f64,
    driver:        &dyn TickDriver,
    sink:          &dyn Sink,
    observer:      &dyn RunObserver,
) -> SimResult<RunReport> {
    let lane = Lane {
        driver,
        sink,
        observer,
        catchment: pool.config().catchment(),
        stop:      Stop::Age(duration_secs),
    };
    let mut tally = Tally::default();
    for (vehicle, rng) in pool.vehicles.iter_mut().zip(pool.rngs.iter_mut()) {
        drive(vehicle, rng, &lane, &mut tally)
            .await
            .map_err(|source| SimError::Sink { vehicle: vehicle.id(), source })?;
    }
    Ok(RunReport {
        vehicles: pool.vehicles.len(),
        ticks:    tally.ticks,
        emitted:  tally.emitted,
        failures: Vec::new(),
    })
}

async fn run_live(
    pool:     &mut Pool,
    length:   Duration,
    driver:   Arc<dyn TickDriver>,
    sink:     Arc<dyn Sink>,
    observer: Arc<dyn RunObserver>,
) -> SimResult<RunReport> {
    let deadline = Instant::now()
        .checked_add(length)
        .ok_or_else(|| SimError::Config(format!("duration {length:?} is too long")))?;
    let catchment = pool.config().catchment();

    let vehicles = std::mem::take(&mut pool.vehicles);
    let rngs = std::mem::take(&mut pool.rngs);
    let mut handles = Vec::with_capacity(vehicles.len());
    for (mut vehicle, mut rng) in vehicles.into_iter().zip(rngs) {
        let driver = Arc::clone(&driver);
        let sink = Arc::clone(&sink);
        let observer = Arc::clone(&observer);
        handles.push(tokio::spawn(async move {
            let lane = Lane {
                driver:   driver.as_ref(),
                sink:     sink.as_ref(),
                observer: observer.as_ref(),
                catchment,
                stop:     Stop::Deadline(deadline),
            };
            let mut tally = Tally::default();
            let result = drive(&mut vehicle, &mut rng, &lane, &mut tally).await;
            (vehicle, rng, tally, result)
        }));
    }

    // Await every task before reporting a join error.
    let mut report = RunReport { vehicles: handles.len(), ..RunReport::default() };
    let mut lost = None;
    for handle in handles {
        let (vehicle, rng, tally, result) = match handle.await {
            Ok(joined) => joined,
            Err(e) => {
                error!(error = %e, "vehicle task did not complete");
                if lost.is_none() {
                    lost = Some(e);
                }
                continue;
            }
        };
        report.ticks += tally.ticks;
        report.emitted += tally.emitted;
        if let Err(error) = result {
            report.failures.push(VehicleFailure { vehicle: vehicle.id(), error });
        }
        pool.vehicles.push(vehicle);
        pool.rngs.push(rng);
    }
    match lost {
        Some(e) => Err(SimError::Join(e)),
        None => Ok(report),
    }
}

// ── Per-vehicle loop ──────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug)]
enum Stop {
    /// Until the vehicle's simulated age reaches this many seconds.
    Age(f64),
    /// Until the shared tokio deadline passes.
    Deadline(Instant),
}

impl Stop {
    fn keep_going(self, vehicle: &Vehicle) -> bool {
        match self {
            Stop::Age(secs) => vehicle.age_secs() < secs,
            Stop::Deadline(at) => Instant::now() < at,
        }
    }
}

#[derive(Copy, Clone, Debug, Default)]
struct Tally {
    ticks:   u64,
    emitted: u64,
}

/// What one vehicle loop shares with the rest of the run.
struct Lane<'a> {
    driver:    &'a dyn TickDriver,
    sink:      &'a dyn Sink,
    observer:  &'a dyn RunObserver,
    catchment: Catchment,
    stop:      Stop,
}

async fn drive(
    vehicle: &mut Vehicle,
    rng:     &mut VehicleRng,
    lane:    &Lane<'_>,
    tally:   &mut Tally,
) -> Result<(), SinkError> {
    lane.observer.on_spawn(vehicle);
    while lane.stop.keep_going(vehicle) {
        let tick = lane.driver.next_tick(vehicle).await;
        let outcome = match vehicle.advance(&tick, &lane.catchment, rng, lane.sink).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(uid = %vehicle.id(), error = %e, "sink failed, vehicle stopped");
                lane.observer.on_failure(vehicle.id(), &e);
                return Err(e);
            }
        };
        tally.ticks += 1;
        if outcome.emitted {
            tally.emitted += 1;
            debug!(uid = %vehicle.id(), time = %outcome.record.timestamp, "record emitted");
        }
        lane.observer.on_tick(&TickReport::from(&outcome));
    }
    Ok(())
}
