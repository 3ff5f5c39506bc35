use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use safetrack_core::dates::parse_date;
use safetrack_core::{Dataset, EvaluationPolicy};
use safetrack_store::RecordSet;
use tracing_subscriber::EnvFilter;

mod display;

/// Personnel certification and attestation compliance.
#[derive(Debug, Parser)]
#[command(name = "safetrack", version)]
struct Cli {
    /// Dataset: a `.json` file or a directory of `<table>.parquet` files.
    #[arg(long, env = "SAFETRACK_DATA", default_value = "data")]
    data: PathBuf,

    /// Evaluation date (YYYY-MM-DD); defaults to the local date.
    #[arg(long, value_parser = parse_date)]
    today: Option<NaiveDate>,

    /// Documents with this many whole months left or fewer are expiring soon.
    #[arg(long, env = "SAFETRACK_WARN_MONTHS", default_value_t = 3)]
    warn_months: i32,

    /// Persistent DuckDB file; imported from `--data` on first use.
    #[cfg(feature = "duckdb")]
    #[arg(long, env = "SAFETRACK_DB")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show one person's per-area compliance card.
    Person {
        /// Personnel id.
        id: String,
    },
    /// Organisation-wide competency gap report.
    Report {
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::info!("safetrack v{}", env!("CARGO_PKG_VERSION"));

    let today = cli
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let policy = EvaluationPolicy {
        expiring_soon_months: cli.warn_months,
    };
    let records = RecordSet::new(load_records(&cli)?).with_policy(policy);

    match &cli.command {
        Command::Person { id } => {
            let person = records
                .dataset()
                .person(id)
                .with_context(|| format!("no personnel with id {id:?}"))?;
            let statuses = records.evaluate_person(id, today)?;
            display::print_person_card(person, &statuses, today);
        }
        Command::Report { json } => {
            let report = records.gap_report(today);
            if *json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                display::print_gap_report(&report);
            }
        }
    }

    Ok(())
}

fn load_files(data: &Path) -> anyhow::Result<Dataset> {
    safetrack_store::load_dataset(data)
        .with_context(|| format!("loading dataset from {}", data.display()))
}

#[cfg(not(feature = "duckdb"))]
fn load_records(cli: &Cli) -> anyhow::Result<Dataset> {
    load_files(&cli.data)
}

#[cfg(feature = "duckdb")]
fn load_records(cli: &Cli) -> anyhow::Result<Dataset> {
    let Some(db) = &cli.db else {
        return load_files(&cli.data);
    };
    let store = safetrack_store::DuckStore::open_persistent(db)
        .with_context(|| format!("opening {}", db.display()))?;
    if !store.has_tables() {
        store
            .load_all(&cli.data)
            .with_context(|| format!("importing Parquet tables from {}", cli.data.display()))?;
    }
    store.dataset().context("reading tables from DuckDB")
}
