//! Closed-ring annotation tool.

use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use annotator::{
    missing_scans, run_session, write_outcome, AnnotationSession, AnnotatorConfig,
    TerminalFrontend,
};
use ring_common::EventTable;
use scan_reader::ScanStore;

#[derive(Parser, Debug)]
#[command(name = "annotator")]
#[command(about = "Review wind scans and label closed wind rings")]
struct Args {
    /// Half-width of the plotted area in degrees [default: 3]
    #[arg(long = "window_size")]
    window_size: Option<f64>,

    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Event table to review
    #[arg(long, env = "RING_TABLE")]
    table: Option<PathBuf>,

    /// Directory holding the scans
    #[arg(long, env = "RING_DATASET_DIR")]
    dataset_dir: Option<PathBuf>,

    /// Output table [default: <dataset-dir>/new_<table file name>]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write excluded file names here, one per line
    #[arg(long)]
    excluded_output: Option<PathBuf>,

    /// Where to write the plot of the current scan
    #[arg(long)]
    preview: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = AnnotatorConfig::load(args.config.as_deref())?;
    if let Some(window_size) = args.window_size {
        config.window_size = window_size;
    }
    if let Some(table) = args.table {
        config.table = table;
    }
    if let Some(dir) = args.dataset_dir {
        config.dataset_dir = dir;
    }
    if let Some(preview) = args.preview {
        config.preview = preview;
    }
    config.validate()?;

    let table = EventTable::read(&config.table)
        .with_context(|| format!("Failed to read {}", config.table.display()))?;
    let mut session = AnnotationSession::new(table, &config.catalog);
    info!(
        table = %config.table.display(),
        rows = session.table().len(),
        candidates = session.len(),
        "Loaded event table"
    );

    let store = ScanStore::new(&config.dataset_dir);
    let missing = missing_scans(&session, &store);
    if !missing.is_empty() {
        bail!(
            "{} candidate scans are missing from {}: {}",
            missing.len(),
            config.dataset_dir.display(),
            missing.join(", ")
        );
    }

    let stdin = io::stdin();
    let mut frontend = TerminalFrontend::new(
        stdin.lock(),
        io::stdout(),
        &config.preview,
        config.window_size,
    );

    let Some(outcome) = run_session(&mut session, &store, &mut frontend)? else {
        return Ok(());
    };

    let output = args.output.unwrap_or_else(|| config.output_path());
    write_outcome(&outcome, &output, args.excluded_output.as_deref())?;

    Ok(())
}
