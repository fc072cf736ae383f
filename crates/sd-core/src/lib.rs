//! `sd-core` — foundational types for the `snowdonia` traffic simulator.
//!
//! This crate is a dependency of every other `sd-*` crate.  It has no `sd-*`
//! dependencies and only small external ones (`rand`, `thiserror`, `uuid`,
//! `chrono`, `geographiclib-rs`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                                   |
//! |-------------|------------------------------------------------------------|
//! | [`geo`]     | `GeoPoint`, geodesic distance/destination, bbox, catchment |
//! | [`ids`]     | `VehicleId`                                                |
//! | [`kind`]    | `VehicleKind`, `SinkMode`                                  |
//! | [`time`]    | `Timestamp`, `Tick`, `RunConfig`                           |
//! | [`rng`]     | `VehicleRng` (per-vehicle), `SimRng` (run)                 |
//! | [`error`]   | `CoreError`, `CoreResult`                                  |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to public value types.      |
//!           | Required for loading `RunConfig` from TOML.                |

pub mod error;
pub mod geo;
pub mod ids;
pub mod kind;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use geo::{BoundingBox, Catchment, GeoPoint, bounding_box, destination, distance_m};
pub use ids::VehicleId;
pub use kind::{SinkMode, VehicleKind};
pub use rng::{SimRng, VehicleRng};
pub use time::{RunConfig, Tick, Timestamp};
