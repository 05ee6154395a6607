use anyhow::Context;
use clap::{Parser, Subcommand};
use log::info;
use pgx_features::aggregate::AggregationKind;
use pgx_features::config::{AggregateSpec, Config, Output, resolve_order};
use pgx_features::{pipeline, table};
use std::path::PathBuf;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "pgx-features")]
#[command(about = "Compose feature sets into a cohort feature matrix", long_about = None)]
struct Cli {
    /// error, warn, info, debug or trace
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the build order of the activated feature sets (validates the config).
    Order {
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Aggregate a gene-by-sample table over one annotation column.
    Aggregate {
        #[arg(long)]
        annotations: PathBuf,

        #[arg(long)]
        measurements: PathBuf,

        /// Annotation column to group by.
        #[arg(long)]
        column: String,

        /// Gene id column of the annotation table (default: first column).
        #[arg(long)]
        gene_column: Option<String>,

        /// Comma-separated aggregation kinds (default: all).
        #[arg(long, value_delimiter = ',')]
        kinds: Vec<AggregationKind>,

        /// Splits multi-valued annotation cells.
        #[arg(long, default_value_t = ';')]
        separator: char,

        #[arg(short = 'o', long)]
        out: PathBuf,
    },

    /// Build every activated feature set and write the unified matrix.
    Build {
        #[arg(short, long)]
        config: PathBuf,

        /// Overrides the config's output path.
        #[arg(short = 'o', long)]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = cli.log_level.parse::<log::LevelFilter>().unwrap_or_else(|_| {
        eprintln!("Warning: invalid log level '{}', using info", cli.log_level);
        log::LevelFilter::Info
    });
    env_logger::Builder::new().filter_level(level).format_timestamp_millis().init();

    match cli.cmd {
        Commands::Order { config } => {
            let cfg = Config::from_path(&config).with_context(|| format!("load config {}", config.display()))?;
            for label in resolve_order(&cfg)? {
                let spec = &cfg.features[&label];
                let outputs = match &spec.output {
                    Output::Single(p) => p.display().to_string(),
                    Output::Named(m) => m
                        .iter()
                        .map(|(name, p)| format!("{}={}", name, p.display()))
                        .collect::<Vec<_>>()
                        .join(","),
                };
                println!("{}\t{}\t{}", label, spec.generator, outputs);
            }
        }

        Commands::Aggregate {
            annotations,
            measurements,
            column,
            gene_column,
            kinds,
            separator,
            out,
        } => {
            let spec = AggregateSpec {
                annotations,
                measurements,
                column,
                gene_column,
                separator,
                kinds: if kinds.is_empty() { AggregationKind::ALL.to_vec() } else { kinds },
            };
            let scores = pipeline::aggregate_annotations(&spec).context("aggregation failed")?;
            table::write_table(&scores, &out)?;
            info!("Wrote {} features to {}", scores.n_rows(), out.display());
        }

        Commands::Build { config, out } => {
            let cfg = Config::from_path(&config).with_context(|| format!("load config {}", config.display()))?;
            info!("Run '{}' with {} feature sets", cfg.run_id, cfg.features_to_use.len());
            let matrix = pipeline::run(&cfg).context("feature matrix build failed")?;
            let out = out.unwrap_or_else(|| cfg.output.clone());
            matrix.write(&out)?;
            println!("Wrote {}", out.display());
        }
    }

    Ok(())
}
