use clap::Parser;
use std::path::PathBuf;

/// A plain `gios-ingest` invocation with no arguments performs one full
/// ingestion run against the destination named in `config.yaml`.
#[derive(Parser)]
#[command(name = "gios-ingest")]
#[command(about = "Ingest GIOŚ air-quality readings into BigQuery")]
#[command(version)]
pub struct Cli {
    #[arg(short, long, default_value = "config.yaml", help = "Configuration file")]
    pub config: PathBuf,

    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, help = "Ingest only this station")]
    pub station_id: Option<u32>,

    #[arg(long, help = "Fetch, transform and dedup, but write nothing (no rows, no DDL)")]
    pub dry_run: bool,

    #[arg(long, help = "Suppress the progress bar")]
    pub quiet: bool,
}
