//! Integration tests for sd-sim.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use sd_core::{GeoPoint, RunConfig, SinkMode, Timestamp, VehicleId, VehicleKind};
use sd_sink::{DirectSink, NoopSink, Sink, SinkError, SinkRecord, SinkResult};
use sd_vehicle::Vehicle;

use crate::{
    ChannelObserver, NoopObserver, Pool, PoolBuilder, RunObserver, RunReport, SimError, TickReport,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

const T0: Timestamp = Timestamp(1_000_000.0);

fn seeded(seed: u64) -> RunConfig {
    RunConfig { seed: Some(seed), ..RunConfig::default() }
}

fn pool(size: usize, sink_mode: SinkMode, live: bool) -> Pool {
    PoolBuilder::new(size, VehicleKind::Bus, sink_mode, live)
        .config(seeded(42))
        .build(T0)
        .unwrap()
}

fn noop() -> Arc<dyn RunObserver> {
    Arc::new(NoopObserver)
}

/// Fails every emit for one vehicle, accepts (and drops) the rest.
struct FailsFor {
    vehicle:  VehicleId,
    accepted: AtomicUsize,
}

impl FailsFor {
    fn new(vehicle: VehicleId) -> Self {
        Self { vehicle, accepted: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl Sink for FailsFor {
    async fn emit(&self, record: &SinkRecord) -> SinkResult<()> {
        if record.id == self.vehicle {
            return Err(SinkError::Poisoned);
        }
        self.accepted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn mode(&self) -> SinkMode {
        SinkMode::Direct
    }
}

#[derive(Default)]
struct Counting {
    spawned:  AtomicUsize,
    ticks:    AtomicUsize,
    failures: AtomicUsize,
    ended:    AtomicUsize,
}

impl RunObserver for Counting {
    fn on_spawn(&self, _vehicle: &Vehicle) {
        self.spawned.fetch_add(1, Ordering::Relaxed);
    }

    fn on_tick(&self, _report: &TickReport) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    fn on_failure(&self, _vehicle: VehicleId, _error: &SinkError) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    fn on_run_end(&self, _report: &RunReport) {
        self.ended.fetch_add(1, Ordering::Relaxed);
    }
}

/// Panics on the first tick of one vehicle.
struct PanicsFor(VehicleId);

impl RunObserver for PanicsFor {
    fn on_tick(&self, report: &TickReport) {
        if report.id == self.0 {
            panic!("observer gave up on {}", self.0);
        }
    }
}

fn drain(rx: &mut tokio::sync::mpsc::UnboundedReceiver<TickReport>) -> Vec<TickReport> {
    let mut out = Vec::new();
    while let Ok(r) = rx.try_recv() {
        out.push(r);
    }
    out
}

// ── PoolBuilder ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;

    #[test]
    fn builds_vehicles_at_home() {
        let p = pool(5, SinkMode::Direct, false);
        assert_eq!(p.len(), 5);
        assert!(!p.is_live());
        for v in p.vehicles() {
            assert_eq!(v.position(), p.config().home);
            assert_eq!(v.created_at(), T0);
            assert_eq!(v.kind(), VehicleKind::Bus);
            assert_eq!(v.sink_mode(), SinkMode::Direct);
        }
    }

    #[test]
    fn zero_size_is_config_error() {
        let result = PoolBuilder::new(0, VehicleKind::Taxi, SinkMode::None, false).build(T0);
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn invalid_run_config_rejected() {
        let bad_tick = RunConfig { tick_secs: 0.0, ..RunConfig::default() };
        let result = PoolBuilder::new(1, VehicleKind::Taxi, SinkMode::None, false)
            .config(bad_tick)
            .build(T0);
        assert!(matches!(result, Err(SimError::Core(_))));

        let bad_home = RunConfig { home: GeoPoint::new(0.0, 200.0), ..RunConfig::default() };
        let result = PoolBuilder::new(1, VehicleKind::Taxi, SinkMode::None, false)
            .config(bad_home)
            .build(T0);
        assert!(matches!(result, Err(SimError::Core(_))));
    }

    #[test]
    fn same_seed_same_kinematics() {
        let a = pool(4, SinkMode::None, false);
        let b = pool(4, SinkMode::None, false);
        for (x, y) in a.vehicles().iter().zip(b.vehicles()) {
            assert_eq!(x.heading(), y.heading());
            assert_eq!(x.speed_m_s(), y.speed_m_s());
            assert_ne!(x.id(), y.id());
        }
    }

    #[test]
    fn vehicles_differ_within_a_pool() {
        let p = pool(2, SinkMode::None, false);
        assert_ne!(p.vehicles()[0].heading(), p.vehicles()[1].heading());
    }
}

// ── Accelerated mode ──────────────────────────────────────────────────────────

#[cfg(test)]
mod accelerated_tests {
    use super::*;
    use crate::run;

    #[tokio::test]
    async fn three_vehicles_three_ticks_each() {
        let mut p = pool(3, SinkMode::Direct, false);
        let sink = Arc::new(DirectSink::in_memory().unwrap());
        let (observer, mut rx) = ChannelObserver::channel();

        let report = run(&mut p, 60.0, sink.clone(), Arc::new(observer)).await.unwrap();

        assert_eq!(report.vehicles, 3);
        assert_eq!(report.ticks, 9);
        assert_eq!(report.emitted, 9);
        assert!(report.is_clean());
        assert_eq!(sink.count().unwrap(), 9);

        let reports = drain(&mut rx);
        assert_eq!(reports.len(), 9);
        for v in p.vehicles() {
            let times: Vec<f64> =
                reports.iter().filter(|r| r.id == v.id()).map(|r| r.time.0).collect();
            assert_eq!(times, [T0.0 + 20.0, T0.0 + 40.0, T0.0 + 60.0]);
            assert_eq!(v.age_secs(), 60.0);
        }
    }

    #[tokio::test]
    async fn stops_within_one_tick_of_duration() {
        let mut p = pool(2, SinkMode::None, false);
        let report = run(&mut p, 50.0, Arc::new(NoopSink), noop()).await.unwrap();
        assert_eq!(report.ticks, 6);
        for v in p.vehicles() {
            assert!(v.age_secs() >= 50.0 && v.age_secs() < 70.0, "age {}", v.age_secs());
        }
    }

    #[tokio::test]
    async fn age_is_monotonic_per_vehicle() {
        let mut p = pool(3, SinkMode::None, false);
        let (observer, mut rx) = ChannelObserver::channel();
        run(&mut p, 600.0, Arc::new(NoopSink), Arc::new(observer)).await.unwrap();

        let reports = drain(&mut rx);
        for v in p.vehicles() {
            let mut last = T0;
            for r in reports.iter().filter(|r| r.id == v.id()) {
                assert!(r.time >= last);
                assert!((0.0..360.0).contains(&r.heading));
                last = r.time;
            }
        }
    }

    #[tokio::test]
    async fn outside_catchment_nothing_written() {
        // Slowest vehicle covers ~55 m per tick; radius 1 m.
        let config = RunConfig { catchment_radius_m: 1.0, ..seeded(7) };
        let mut p = PoolBuilder::new(3, VehicleKind::Tram, SinkMode::Direct, false)
            .config(config)
            .build(T0)
            .unwrap();
        let sink = Arc::new(DirectSink::in_memory().unwrap());

        let report = run(&mut p, 60.0, sink.clone(), noop()).await.unwrap();
        assert_eq!(report.ticks, 9);
        assert_eq!(report.emitted, 0);
        assert_eq!(sink.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn sink_mode_none_writes_nothing() {
        let mut p = pool(3, SinkMode::None, false);
        let sink = Arc::new(DirectSink::in_memory().unwrap());
        let report = run(&mut p, 60.0, sink.clone(), noop()).await.unwrap();
        assert_eq!(report.ticks, 9);
        assert_eq!(report.emitted, 0);
        assert_eq!(sink.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn sink_failure_aborts_run() {
        let mut p = pool(3, SinkMode::Direct, false);
        let failing = p.vehicles()[1].id();
        let sink = Arc::new(FailsFor::new(failing));
        let observer = Arc::new(Counting::default());

        let err = run(&mut p, 60.0, sink.clone(), observer.clone()).await.unwrap_err();
        match err {
            SimError::Sink { vehicle, .. } => assert_eq!(vehicle, failing),
            other => panic!("expected sink error, got {other}"),
        }
        // First vehicle finished; the run stopped at the second.
        assert_eq!(sink.accepted.load(Ordering::Relaxed), 3);
        assert_eq!(observer.failures.load(Ordering::Relaxed), 1);
        assert_eq!(observer.ended.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn duration_checked_up_front() {
        assert_eq!(crate::validate_duration(60.0).unwrap(), std::time::Duration::from_secs(60));
        for d in [0.0, -1.0, f64::NAN, f64::INFINITY, 1e30] {
            assert!(matches!(crate::validate_duration(d), Err(SimError::Config(_))), "duration {d}");
        }
    }

    #[tokio::test]
    async fn non_positive_duration_rejected() {
        let mut p = pool(1, SinkMode::None, false);
        for d in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let result = run(&mut p, d, Arc::new(NoopSink), noop()).await;
            assert!(matches!(result, Err(SimError::Config(_))), "duration {d}");
        }
        assert_eq!(p.vehicles()[0].age_secs(), 0.0);
    }

    #[tokio::test]
    async fn observer_sees_every_hook() {
        let mut p = pool(4, SinkMode::None, false);
        let observer = Arc::new(Counting::default());
        run(&mut p, 40.0, Arc::new(NoopSink), observer.clone()).await.unwrap();
        assert_eq!(observer.spawned.load(Ordering::Relaxed), 4);
        assert_eq!(observer.ticks.load(Ordering::Relaxed), 8);
        assert_eq!(observer.ended.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn closed_channel_does_not_stop_run() {
        let mut p = pool(2, SinkMode::None, false);
        let (observer, rx) = ChannelObserver::channel();
        drop(rx);
        let report = run(&mut p, 60.0, Arc::new(NoopSink), Arc::new(observer)).await.unwrap();
        assert_eq!(report.ticks, 6);
    }

    #[tokio::test]
    async fn trace_observer_runs() {
        let mut p = pool(1, SinkMode::None, false);
        let report =
            run(&mut p, 20.0, Arc::new(NoopSink), Arc::new(crate::TraceObserver)).await.unwrap();
        assert_eq!(report.ticks, 1);
    }
}

// ── Live mode ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod live_tests {
    use std::time::Duration;

    use tokio::time::Instant;

    use super::*;
    use crate::run;

    #[tokio::test(start_paused = true)]
    async fn ticks_until_deadline() {
        let mut p = pool(3, SinkMode::Direct, true);
        let sink = Arc::new(DirectSink::in_memory().unwrap());
        let start = Instant::now();

        let report = run(&mut p, 60.0, sink.clone(), noop()).await.unwrap();

        assert_eq!(report.vehicles, 3);
        assert_eq!(report.ticks, 9);
        assert_eq!(report.emitted, 9);
        assert_eq!(sink.count().unwrap(), 9);
        assert!(start.elapsed() >= Duration::from_secs(60));
        assert_eq!(p.len(), 3, "vehicles are returned to the pool");
    }

    #[tokio::test(start_paused = true)]
    async fn in_flight_tick_completes_after_deadline() {
        // Deadline at 50 s: the tick started at 40 s ends at 60 s.
        let mut p = pool(1, SinkMode::None, true);
        let start = Instant::now();
        let report = run(&mut p, 50.0, Arc::new(NoopSink), noop()).await.unwrap();
        assert_eq!(report.ticks, 3);
        assert!(start.elapsed() >= Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn timestamps_never_go_backwards() {
        let mut p = pool(2, SinkMode::None, true);
        let (observer, mut rx) = ChannelObserver::channel();
        run(&mut p, 100.0, Arc::new(NoopSink), Arc::new(observer)).await.unwrap();

        let reports = drain(&mut rx);
        assert_eq!(reports.len(), 10);
        for v in p.vehicles() {
            let mut last = T0;
            for r in reports.iter().filter(|r| r.id == v.id()) {
                assert!(r.time >= last);
                last = r.time;
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn sink_failure_stops_only_that_vehicle() {
        let mut p = pool(3, SinkMode::Direct, true);
        let failing = p.vehicles()[0].id();
        let sink = Arc::new(FailsFor::new(failing));
        let observer = Arc::new(Counting::default());

        let report = run(&mut p, 60.0, sink.clone(), observer.clone()).await.unwrap();

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].vehicle, failing);
        assert!(matches!(report.failures[0].error, SinkError::Poisoned));
        assert!(!report.is_clean());
        assert_eq!(report.ticks, 6);
        assert_eq!(report.emitted, 6);
        assert_eq!(sink.accepted.load(Ordering::Relaxed), 6);
        assert_eq!(observer.failures.load(Ordering::Relaxed), 1);
        assert_eq!(observer.ended.load(Ordering::Relaxed), 1);
        assert_eq!(p.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn panicked_task_keeps_the_others() {
        let mut p = pool(3, SinkMode::None, true);
        let doomed = p.vehicles()[1].id();

        let err = run(&mut p, 60.0, Arc::new(NoopSink), Arc::new(PanicsFor(doomed)))
            .await
            .unwrap_err();

        match err {
            SimError::Join(e) => assert!(e.is_panic()),
            other => panic!("expected join error, got {other}"),
        }
        assert_eq!(p.len(), 2, "finished vehicles are returned to the pool");
        assert!(p.vehicles().iter().all(|v| v.id() != doomed));
    }
}

// ── Drivers ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod driver_tests {
    use std::time::Duration;

    use tokio::time::Instant;

    use super::*;
    use crate::{AcceleratedDriver, LiveDriver, TickDriver};

    #[tokio::test]
    async fn accelerated_tick_is_simulated() {
        let p = pool(1, SinkMode::None, false);
        let v = &p.vehicles()[0];
        let tick = AcceleratedDriver::new(20.0).next_tick(v).await;
        assert_eq!(tick.elapsed_secs, 20.0);
        assert_eq!(tick.now, Timestamp(T0.0 + 20.0));
    }

    #[tokio::test(start_paused = true)]
    async fn live_tick_waits_one_period() {
        let p = pool(1, SinkMode::None, true);
        let driver = LiveDriver::new(20.0);
        let start = Instant::now();
        let tick = driver.next_tick(&p.vehicles()[0]).await;
        assert!(start.elapsed() >= Duration::from_secs(20));
        assert_eq!(tick.elapsed_secs, 20.0);
        assert_eq!(driver.tick_secs(), 20.0);
    }
}
