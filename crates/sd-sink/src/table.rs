//! Administration of the `traffic` database file (feature `sqlite`).
//!
//! Backs the `snowdonia db` subcommands: create a fresh store, count rows,
//! dump them as SQL or CSV, and delete the file.

use std::io::Write;
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tracing::info;

use crate::sqlite::{TRAFFIC_SCHEMA, count_rows, read_rows};
use crate::{SinkResult, TrafficRow};

/// Header row written by [`TrafficTable::dump_csv`].
pub const CSV_HEADER: [&str; 6] = ["uid", "type", "timestamp", "longitude", "lattitude", "heading"];

/// Handle on the SQLite file holding the `traffic` table.
#[derive(Debug, Clone)]
pub struct TrafficTable {
    path: PathBuf,
}

impl TrafficTable {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace any existing database at `path` with an empty `traffic` table.
    ///
    /// The file is made world-writable on Unix so that the simulator and the
    /// ingest endpoint can run as different users.
    pub fn create(&self) -> SinkResult<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        let conn = Connection::open(&self.path)?;
        conn.execute_batch(TRAFFIC_SCHEMA)?;
        drop(conn);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o666))?;
        }

        info!(path = %self.path.display(), "created traffic table");
        Ok(())
    }

    pub fn count(&self) -> SinkResult<u64> {
        count_rows(&self.open()?)
    }

    pub fn rows(&self) -> SinkResult<Vec<TrafficRow>> {
        read_rows(&self.open()?)
    }

    /// Write the table as an SQL script that recreates it.
    pub fn dump_sql<W: Write>(&self, mut out: W) -> SinkResult<()> {
        let rows = self.rows()?;
        writeln!(out, "BEGIN TRANSACTION;")?;
        writeln!(out, "{TRAFFIC_SCHEMA};")?;
        for r in &rows {
            writeln!(
                out,
                "INSERT INTO \"traffic\" VALUES({},{},{},{},{},{});",
                sql_text(&r.uid),
                sql_text(&r.kind),
                r.timestamp,
                r.longitude,
                r.lattitude,
                r.heading,
            )?;
        }
        writeln!(out, "COMMIT;")?;
        Ok(())
    }

    /// Write the table as CSV with a [`CSV_HEADER`] row.
    pub fn dump_csv<W: Write>(&self, out: W) -> SinkResult<()> {
        let rows = self.rows()?;
        let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(out);
        wtr.write_record(CSV_HEADER)?;
        for r in &rows {
            wtr.serialize(r)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Remove the database file.
    pub fn delete(&self) -> SinkResult<()> {
        std::fs::remove_file(&self.path)?;
        info!(path = %self.path.display(), "deleted traffic table");
        Ok(())
    }

    fn open(&self) -> SinkResult<Connection> {
        Ok(Connection::open_with_flags(
            &self.path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        )?)
    }
}

fn sql_text(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}
