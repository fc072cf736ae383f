//! SQLite direct-write backend (feature `sqlite`).
//!
//! Appends one row per record to the `traffic` table, the same table the
//! ingest endpoint writes to.  Column order and types are fixed by that
//! shared schema.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::Connection;
use sd_core::SinkMode;
use tracing::debug;

use crate::sink::Sink;
use crate::{SinkError, SinkRecord, SinkResult, TrafficRow};

/// Schema of the shared `traffic` table.
pub const TRAFFIC_SCHEMA: &str = "CREATE TABLE traffic (
                uid text,
                type text,
                timestamp real,
                longitude real,
                lattitude real,
                heading real
            )";

const INSERT_ROW: &str = "INSERT INTO traffic VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

/// Writes records straight into an SQLite database.
///
/// `rusqlite::Connection` is `Send` but not `Sync`, so live-mode tasks share
/// it through a mutex.  Each insert runs on tokio's blocking pool and holds
/// the lock only for its single-row transaction.
pub struct DirectSink {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl DirectSink {
    /// Open (or create) the database at `path`, creating `traffic` if absent.
    pub fn open(path: &Path) -> SinkResult<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    /// A private in-memory database, mostly for tests.
    pub fn in_memory() -> SinkResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> SinkResult<Self> {
        conn.execute_batch(&TRAFFIC_SCHEMA.replacen("CREATE TABLE", "CREATE TABLE IF NOT EXISTS", 1))?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    /// Number of rows currently in `traffic`.
    pub fn count(&self) -> SinkResult<u64> {
        let conn = self.conn.lock().map_err(|_| SinkError::Poisoned)?;
        count_rows(&conn)
    }

    /// All rows in insertion order.
    pub fn rows(&self) -> SinkResult<Vec<TrafficRow>> {
        let conn = self.conn.lock().map_err(|_| SinkError::Poisoned)?;
        read_rows(&conn)
    }
}

fn insert(conn: &Mutex<Connection>, record: &SinkRecord) -> SinkResult<()> {
    let mut conn = conn.lock().map_err(|_| SinkError::Poisoned)?;
    let tx = conn.transaction()?;
    tx.execute(
        INSERT_ROW,
        rusqlite::params![
            record.id.to_string(),
            record.kind.as_str(),
            record.timestamp.as_secs_f64(),
            record.longitude,
            record.latitude,
            record.heading,
        ],
    )?;
    tx.commit()?;
    Ok(())
}

#[async_trait]
impl Sink for DirectSink {
    async fn emit(&self, record: &SinkRecord) -> SinkResult<()> {
        let conn = Arc::clone(&self.conn);
        let row = *record;
        tokio::task::spawn_blocking(move || insert(&conn, &row))
            .await
            .map_err(|e| SinkError::Writer(e.to_string()))??;
        debug!(uid = %record.id, ts = %record.timestamp, "row stored");
        Ok(())
    }

    fn mode(&self) -> SinkMode {
        SinkMode::Direct
    }
}

// ── Shared read helpers ───────────────────────────────────────────────────────

pub(crate) fn count_rows(conn: &Connection) -> SinkResult<u64> {
    let n: i64 = conn.query_row("SELECT count(*) FROM traffic", [], |row| row.get(0))?;
    Ok(n as u64)
}

pub(crate) fn read_rows(conn: &Connection) -> SinkResult<Vec<TrafficRow>> {
    let mut stmt = conn.prepare(
        "SELECT uid, type, timestamp, longitude, lattitude, heading FROM traffic ORDER BY rowid",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(TrafficRow {
                uid:       row.get(0)?,
                kind:      row.get(1)?,
                timestamp: row.get(2)?,
                longitude: row.get(3)?,
                lattitude: row.get(4)?,
                heading:   row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
