//! Command line interface
//!
//! - `train`: train on every company of a directory store and publish the artifact
//! - `gaps`: report reconstructable quarters per company
//! - `import`: convert a fundamentals JSON document into a store table
//! - `init-config`: write the default configuration

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use fundamentals_gap_rnn::{
    data::{table_from_fundamentals, FieldCatalog},
    pipeline, setup_logging, CompanyKey, Config, DirectoryStore,
};

#[derive(Parser)]
#[command(name = "gap_rnn")]
#[command(version = "0.1.0")]
#[command(about = "Reconstruct missing quarters in company fundamentals", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    config: PathBuf,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train on a directory store and publish the artifact into it
    Train {
        /// Store root (<root>/<country>/<exchange>/<company>.csv)
        #[arg(short, long, default_value = "data")]
        store: PathBuf,

        /// Restrict to one country
        #[arg(long)]
        country: Option<String>,

        /// Override the configured epoch count
        #[arg(short, long)]
        epochs: Option<usize>,
    },

    /// Count gap triples per company
    Gaps {
        #[arg(short, long, default_value = "data")]
        store: PathBuf,
    },

    /// Import a fundamentals JSON document as a company table
    Import {
        /// Fundamentals JSON file
        #[arg(short, long)]
        json: PathBuf,

        #[arg(short, long, default_value = "data")]
        store: PathBuf,

        #[arg(long)]
        country: String,

        #[arg(long)]
        exchange: String,

        #[arg(long)]
        company: String,
    },

    /// Write the default configuration file
    InitConfig {
        /// Output path
        #[arg(short, long, default_value = "config/default.toml")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load_or_default(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    let level = match cli.verbose {
        0 => config.logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    setup_logging(level);

    match cli.command {
        Commands::Train {
            store,
            country,
            epochs,
        } => {
            let mut config = config;
            if let Some(epochs) = epochs {
                config.training.epochs = epochs;
            }
            let mut store = DirectoryStore::new(&store);
            let keys: Vec<CompanyKey> = store
                .list_companies()
                .with_context(|| format!("listing {}", store.root().display()))?
                .into_iter()
                .filter(|k| country.as_ref().map_or(true, |c| &k.country == c))
                .collect();
            if keys.is_empty() {
                bail!("no company tables under {}", store.root().display());
            }
            info!(companies = keys.len(), "Training");

            let artifact = pipeline::run_training(&mut store, &keys, &config)?;
            println!(
                "Trained '{}' on {} samples, final loss {:.6}",
                artifact.name,
                artifact.samples,
                artifact.final_loss().unwrap_or(0.0)
            );
        }
        Commands::Gaps { store } => {
            let store = DirectoryStore::new(&store);
            let keys = store.list_companies()?;
            let counts = pipeline::count_gaps(&store, &keys, &config)?;
            for (key, count) in &counts {
                println!("{key}\t{count}");
            }
            let total: usize = counts.iter().map(|(_, c)| c).sum();
            println!("total\t{total}");
        }
        Commands::Import {
            json,
            store,
            country,
            exchange,
            company,
        } => {
            let content = std::fs::read_to_string(&json)
                .with_context(|| format!("reading {}", json.display()))?;
            let doc: serde_json::Value = serde_json::from_str(&content)?;
            let key = CompanyKey::new(country, exchange, company);
            let table = table_from_fundamentals(key, &doc, &FieldCatalog::default())?;
            DirectoryStore::new(&store).put(&table)?;
            println!("Imported {} quarters for {}", table.len(), table.key);
        }
        Commands::InitConfig { output } => {
            if let Some(parent) = output.parent() {
                std::fs::create_dir_all(parent)?;
            }
            Config::create_default(&output)?;
            println!("Wrote default configuration to {}", output.display());
        }
    }

    Ok(())
}
