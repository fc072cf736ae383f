//! snowdonia — create a pool of moving vehicles emitting GPS data.
//!
//! ```text
//! snowdonia simulate 10 3600                      # 10 buses, one simulated hour, into SQLite
//! snowdonia simulate 5 120 --live --store api     # real time, POST to the ingest endpoint
//! snowdonia db create | count | dump-sql | dump-csv | delete
//! ```
//!
//! Log output goes to stderr (filter with `RUST_LOG`, default `info`), so
//! `db dump-*` output on stdout can be redirected cleanly.

mod config;


use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use sd_core::{SinkMode, Timestamp, VehicleKind};
use sd_sim::{PoolBuilder, TraceObserver, run, validate_duration};
use sd_sink::{DirectSink, NoopSink, RemoteSink, Sink, TrafficTable};

use config::{AppConfig, ServiceConfig};

// ── CLI ───────────────────────────────────────────────────────────────────────

/// Simulate vehicles moving and sending data.
#[derive(Parser, Debug)]
#[command(name = "snowdonia", version, long_about = None)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, global = true, default_value = "config.toml", value_name = "PATH")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a pool of vehicles.
    Simulate(SimulateArgs),

    /// Administer the SQLite traffic table.
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Args, Debug)]
struct SimulateArgs {
    /// Number of vehicles to create.
    num: usize,

    /// Duration in seconds to run the simulation.
    dur: f64,

    /// Run in real time (waiting for time to pass).
    #[arg(long)]
    live: bool,

    /// Storage mode: "database", "api" or "none".
    #[arg(long, default_value = "database", value_name = "MODE")]
    store: SinkMode,

    /// Vehicle type for all vehicles: bus, taxi, tram or train.
    #[arg(long = "type", default_value = "bus", value_name = "TYPE")]
    kind: VehicleKind,

    /// Seed for reproducible speeds and headings (overrides the config file).
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum DbAction {
    /// Drop any existing database file and create an empty traffic table.
    Create,
    /// Print the number of stored rows.
    Count,
    /// Print the table as SQL statements.
    DumpSql,
    /// Print the table as CSV with a header row.
    DumpCsv,
    /// Remove the database file.
    Delete,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = AppConfig::load(&cli.config)?;
    match cli.command {
        Command::Simulate(args) => simulate(args, config).await,
        Command::Db { action } => db(action, &config.service),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// ── simulate ──────────────────────────────────────────────────────────────────

async fn simulate(args: SimulateArgs, mut config: AppConfig) -> Result<()> {
    if args.seed.is_some() {
        config.simulation.seed = args.seed;
    }

    // Nothing is built or opened for a run that cannot start.
    validate_duration(args.dur).context("invalid simulation parameters")?;
    let mut pool = PoolBuilder::new(args.num, args.kind, args.store, args.live)
        .config(config.simulation)
        .build(Timestamp::now())
        .context("invalid simulation parameters")?;
    let sink = open_sink(args.store, &config.service)?;

    let report = run(&mut pool, args.dur, sink, Arc::new(TraceObserver))
        .await
        .context("simulation aborted")?;

    if !report.is_clean() {
        warn!(stopped = report.failures.len(), "some vehicles stopped early on sink errors");
    }
    info!(vehicles = report.vehicles, ticks = report.ticks, emitted = report.emitted, "done");
    Ok(())
}

fn open_sink(mode: SinkMode, service: &ServiceConfig) -> Result<Arc<dyn Sink>> {
    let sink: Arc<dyn Sink> = match mode {
        SinkMode::None => Arc::new(NoopSink),
        SinkMode::Direct => Arc::new(
            DirectSink::open(&service.database)
                .with_context(|| format!("opening database {}", service.database.display()))?,
        ),
        SinkMode::Remote => Arc::new(RemoteSink::new(service.url())?),
    };
    Ok(sink)
}

// ── db ────────────────────────────────────────────────────────────────────────

fn db(action: DbAction, service: &ServiceConfig) -> Result<()> {
    let table = TrafficTable::new(&service.database);
    let path = table.path().display().to_string();
    let stdout = std::io::stdout();
    match action {
        DbAction::Create => table.create(),
        DbAction::Count => table.count().map(|n| println!("{n}")),
        DbAction::DumpSql => table.dump_sql(stdout.lock()),
        DbAction::DumpCsv => table.dump_csv(stdout.lock()),
        DbAction::Delete => table.delete(),
    }
    .with_context(|| format!("db {action:?} on {path}"))
}
