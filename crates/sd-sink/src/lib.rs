//! `sd-sink` — persistence backends for simulated vehicle states.
//!
//! Three backends implement [`Sink`]; two of them sit behind Cargo features
//! (both on by default):
//!
//! | Feature   | Backend       | Destination                                      |
//! |-----------|---------------|--------------------------------------------------|
//! | *(none)*  | `NoopSink`    | nowhere                                          |
//! | `sqlite`  | `DirectSink`  | row in the `traffic` table of an SQLite file     |
//! | `remote`  | `RemoteSink`  | form `POST` to the ingest endpoint               |
//!
//! The `sqlite` feature also provides [`TrafficTable`] for creating, dumping
//! and deleting the database file.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sd_sink::{DirectSink, Sink};
//!
//! let sink: Arc<dyn Sink> = Arc::new(DirectSink::open(Path::new("snowdonia.db"))?);
//! sink.emit(&record).await?;
//! ```

pub mod error;
pub mod record;
pub mod sink;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "sqlite")]
pub mod table;

#[cfg(feature = "remote")]
pub mod remote;


pub use error::{SinkError, SinkResult};
pub use record::{FormFields, SinkRecord, TrafficRow};
pub use sink::{NoopSink, Sink};

#[cfg(feature = "sqlite")]
pub use sqlite::DirectSink;

#[cfg(feature = "sqlite")]
pub use table::TrafficTable;

#[cfg(feature = "remote")]
pub use remote::{REMOTE_TIMEOUT, RemoteSink};
