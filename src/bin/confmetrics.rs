use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use confmetrics::{
    open_store, resolve_config, ExampleKind, MetricsAccumulator, StoreFormat,
    SyntheticClassification,
};
use std::path::PathBuf;

const DEFAULT_STORE_DIR: &str = "confmetrics-store";

#[derive(Parser)]
#[command(name = "confmetrics")]
#[command(version, about = "Confusion-matrix metrics over synthetic or stored examples")]
struct Cli {
    /// Evaluator configuration file (.toml or .json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Table store location; defaults to the configured store_dir
    #[arg(short, long, global = true)]
    store: Option<PathBuf>,

    /// Table store format: csv, json or parquet
    #[arg(short, long, global = true, default_value = "csv")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate synthetic examples and persist the accumulated tables
    Generate {
        /// Number of examples, recorded under row ids 0..N
        #[arg(short, long, default_value_t = 10)]
        num_examples: u64,

        /// Shape of each example, comma separated
        #[arg(long, value_delimiter = ',', default_value = "16,16")]
        shape: Vec<usize>,

        /// Number of classes values are drawn from
        #[arg(long, default_value_t = 2)]
        num_classes: usize,

        /// Example kind: random, all_correct, all_wrong or all_zeros
        #[arg(short, long, default_value = "random")]
        kind: String,

        /// Seed for reproducible examples
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Restore an accumulator from a store and print its rows
    Report {
        /// Metric table name; defaults to the configured name
        #[arg(short, long)]
        name: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    confmetrics::init()?;

    let (config, source) = resolve_config(cli.config.as_deref())?;
    log::debug!("Using configuration from {:?}", source);

    let format: StoreFormat = cli.format.parse()?;
    let store_path = cli
        .store
        .or_else(|| config.store_dir.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_DIR));

    match cli.command {
        Commands::Generate {
            num_examples,
            shape,
            num_classes,
            kind,
            seed,
        } => {
            let kind: ExampleKind = kind.parse()?;
            let mut generator = match seed {
                Some(seed) => SyntheticClassification::with_seed(&shape, num_classes, seed)?,
                None => SyntheticClassification::new(&shape, num_classes)?,
            };

            let mut accumulator = MetricsAccumulator::from_config(&config)?;
            for row_id in 0..num_examples {
                let example = generator.generate(kind)?;
                accumulator
                    .evaluate_and_record(row_id, &example)
                    .with_context(|| format!("evaluating example {}", row_id))?;
            }

            let mut store = open_store(format, &store_path)?;
            accumulator
                .persist(&mut store)
                .with_context(|| format!("persisting to {}", store_path.display()))?;

            println!(
                "Recorded {} {} examples into '{}' at {}",
                accumulator.len(),
                kind,
                accumulator.name(),
                store_path.display()
            );
            print_summary(&accumulator);
            Ok(())
        }

        Commands::Report { name } => {
            if !store_path.exists() {
                bail!("no table store at {}", store_path.display());
            }
            let name = name.unwrap_or_else(|| config.name.clone());
            let store = open_store(format, &store_path)?;
            let accumulator = MetricsAccumulator::load(&store, &name)
                .with_context(|| format!("restoring '{}' from {}", name, store_path.display()))?;

            println!(
                "{}: labels {}, threshold {}",
                accumulator.name(),
                accumulator.labels(),
                accumulator.threshold()
            );
            println!(
                "{:>8} {:>8} {:>8} {:>8} {:>8} {:>8} {:>10} {:>10} {:>10}",
                "rowid", "n", "tp", "fp", "tn", "fn", "precision", "recall", "f1"
            );
            for (row_id, s) in accumulator.rows() {
                println!(
                    "{:>8} {:>8} {:>8} {:>8} {:>8} {:>8} {:>10.5} {:>10.5} {:>10.5}",
                    row_id, s.n, s.tp, s.fp, s.tn, s.fn_, s.precision, s.recall, s.f1
                );
            }
            print_summary(&accumulator);
            Ok(())
        }
    }
}

fn print_summary(accumulator: &MetricsAccumulator) {
    match accumulator.summary() {
        Some(summary) => println!(
            "mean over {} rows: precision {:.5}, recall {:.5}, f1 {:.5}",
            summary.count, summary.precision, summary.recall, summary.f1
        ),
        None => println!("no rows recorded"),
    }
}
