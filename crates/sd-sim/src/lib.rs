//! `sd-sim` — pool scheduler for the `snowdonia` simulator.
//!
//! # Modes
//!
//! | Mode        | Driver              | Concurrency                 | Stops when                 |
//! |-------------|---------------------|-----------------------------|----------------------------|
//! | accelerated | `AcceleratedDriver` | sequential, no suspension   | each vehicle's age ≥ duration |
//! | live        | `LiveDriver`        | one tokio task per vehicle  | shared deadline passes     |
//!
//! A sink failure ends an accelerated run with [`SimError::Sink`]; in a live
//! run it ends only that vehicle's task and is listed in
//! [`RunReport::failures`].  A live task that panics is reported as
//! [`SimError::Join`] once every other task has been collected.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sd_core::{SinkMode, Timestamp, VehicleKind};
//! use sd_sim::{PoolBuilder, TraceObserver, run};
//! use sd_sink::NoopSink;
//!
//! let mut pool = PoolBuilder::new(10, VehicleKind::Taxi, SinkMode::None, false)
//!     .build(Timestamp::now())?;
//! let report = run(&mut pool, 3600.0, Arc::new(NoopSink), Arc::new(TraceObserver)).await?;
//! ```

pub mod driver;
pub mod error;
pub mod observer;
pub mod pool;
pub mod run;

#[cfg(test)]
mod tests;

pub use driver::{AcceleratedDriver, LiveDriver, TickDriver};
pub use error::{SimError, SimResult};
pub use observer::{ChannelObserver, NoopObserver, RunObserver, TickReport, TraceObserver};
pub use pool::{Pool, PoolBuilder};
pub use run::{RunReport, VehicleFailure, run, run_with_driver, validate_duration};
