//! Closed-ring detector training.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use dataset::{
    random_split, split_lengths, CycloneDataset, DataLoader, DatasetOptions, DEFAULT_RADIUS_KM,
};
use renderer::{render_loss_curves, ChartConfig};
use trainer::{evaluate, train, CheckpointWriter, Model, PixelClassifier, Sgd, SgdConfig};

#[derive(Parser, Debug)]
#[command(name = "trainer")]
#[command(about = "Train a closed wind ring detector on annotated scans")]
struct Args {
    /// Number of epochs
    #[arg(long, default_value_t = 20)]
    epochs: usize,

    /// Learning rate
    #[arg(long, default_value_t = 0.005)]
    lr: f32,

    /// Samples per batch
    #[arg(long = "batch_size", default_value_t = 16)]
    batch_size: usize,

    /// Fraction of rows held out for validation
    #[arg(long = "validation_split", default_value_t = 0.2)]
    validation_split: f64,

    /// Fraction of rows held out for a final test evaluation
    #[arg(long = "test_split", default_value_t = 0.0)]
    test_split: f64,

    /// Annotated event table
    #[arg(
        long,
        env = "RING_TABLE",
        default_value = "data/processed/dataset/new_annotations_SS.txt"
    )]
    table: PathBuf,

    /// Directory holding the scans
    #[arg(long, env = "RING_DATASET_DIR", default_value = "data/processed/dataset")]
    dataset_dir: PathBuf,

    /// Where to write per-epoch checkpoints
    #[arg(long, env = "RING_CHECKPOINT_DIR", default_value = "models")]
    checkpoint_dir: PathBuf,

    /// Radius of the ring region around the storm centre, in km
    #[arg(long, default_value_t = DEFAULT_RADIUS_KM)]
    radius: f64,

    /// Skip z-score normalization of the wind components
    #[arg(long)]
    no_normalize: bool,

    /// Random seed for splits, shuffling and windows [default: random]
    #[arg(long)]
    seed: Option<u64>,

    /// Output path of the loss-curve plot
    #[arg(long, default_value = "result.png")]
    plot: PathBuf,

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
        .with_thread_ids(true)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let seed = args.seed.unwrap_or_else(|| rand::thread_rng().gen());
    info!(seed, "Starting trainer");

    let options = DatasetOptions::default()
        .with_radius_km(args.radius)
        .with_normalize(!args.no_normalize);
    let dataset = CycloneDataset::open(&args.table, &args.dataset_dir, options)
        .with_context(|| format!("Failed to open dataset {}", args.table.display()))?;

    let lengths = split_lengths(dataset.len(), args.validation_split, args.test_split)?;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut splits = random_split(dataset.len(), &lengths.as_array(), &mut rng)?.into_iter();
    let (train_rows, validation_rows, test_rows) = (
        splits.next().unwrap_or_default(),
        splits.next().unwrap_or_default(),
        splits.next().unwrap_or_default(),
    );
    info!(
        rows = dataset.len(),
        train = train_rows.len(),
        validation = validation_rows.len(),
        test = test_rows.len(),
        "Split dataset"
    );

    let mut train_loader = DataLoader::new(&dataset, train_rows, args.batch_size)?
        .with_shuffle(true)
        .with_seed(seed);
    let mut validation_loader =
        DataLoader::new(&dataset, validation_rows, args.batch_size)?.with_seed(seed);

    let mut model = PixelClassifier::new();
    let mut optimizer = Sgd::new(SgdConfig {
        lr: args.lr,
        ..SgdConfig::default()
    });
    let checkpoints = CheckpointWriter::new(&args.checkpoint_dir)
        .with_context(|| format!("Failed to create {}", args.checkpoint_dir.display()))?;

    let history = train(
        &mut model,
        &mut optimizer,
        &mut train_loader,
        &mut validation_loader,
        args.epochs,
        Some(&checkpoints),
    )?;
    if let Some(best) = history.best_epoch() {
        info!(epoch = best, "Best validation epoch");
    }

    if !test_rows.is_empty() {
        let mut test_loader =
            DataLoader::new(&dataset, test_rows, args.batch_size)?.with_seed(seed);
        let test_loss = evaluate(&model, &mut test_loader)?;
        info!(model = model.name(), test_loss, "Test evaluation complete");
    }

    match render_loss_curves(&history.train, &history.validation, &ChartConfig::default()) {
        Ok(png) => {
            fs::write(&args.plot, png)
                .with_context(|| format!("Failed to write {}", args.plot.display()))?;
            info!(path = %args.plot.display(), "Saved loss curves");
        }
        Err(e) => warn!(error = %e, "Loss curves not rendered"),
    }

    Ok(())
}
