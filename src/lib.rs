//! Operational knowledge cache and fuzzy search over bus-station records.
//!
//! Twelve collections (vehicles, drivers, operators, routes, badges,
//! dispatch records, schedules, services, shifts, invoices, violations,
//! service charges) are pre-loaded into memory from a pluggable snapshot
//! source, indexed under diacritic- and separator-insensitive normalization,
//! and served through per-entity searches, a bounded cross-collection fuzzy
//! search, and calendar-day aggregations. The cache is an in-process library
//! surface; the `bss` binary wraps it for shell use over JSON fixture
//! directories.

pub mod cache;
pub mod index;
pub mod model;
pub mod normalize;
pub mod search;
pub mod source;
pub mod stats;

pub use cache::{LoadState, OpsCache, SystemStats};
pub use search::{FUZZY_RESULT_CAP, QueryShape, SearchEntity, TaggedHit};
pub use source::{CollectionSource, JsonDirSource, SourceError};
pub use stats::DispatchStats;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

pub fn version_string() -> String {
    match option_env!("VERGEN_BUILD_TIMESTAMP") {
        Some(ts) => format!("{} (built {ts})", env!("CARGO_PKG_VERSION")),
        None => env!("CARGO_PKG_VERSION").to_string(),
    }
}

/// Command-line interface.
#[derive(Parser, Debug)]
#[command(
    name = "bss",
    version = version_string().leak() as &str,
    about = "Query a bus-station operational cache from the shell"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load all collection snapshots and print cache statistics
    Warm {
        /// Directory of <collection>.json snapshot files
        #[arg(long)]
        data_dir: PathBuf,
    },
    /// Fuzzy-search the cached collections, one JSON hit per line
    Search {
        /// Free-text query (operator name, plate, route code, ...)
        query: String,

        /// Directory of <collection>.json snapshot files
        #[arg(long)]
        data_dir: PathBuf,
    },
    /// Print per-collection counts and readiness as one JSON line
    Stats {
        /// Directory of <collection>.json snapshot files
        #[arg(long)]
        data_dir: PathBuf,
    },
    /// Generate shell completions to stdout
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate man page to stdout
    Man,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Warm { data_dir } => {
            let cache = warm_cache(data_dir).await;
            println!("{}", serde_json::to_string_pretty(&cache.system_stats())?);
            Ok(())
        }
        Commands::Search { query, data_dir } => {
            let cache = warm_cache(data_dir).await;
            for hit in cache.fuzzy_search(&query) {
                println!("{}", serde_json::to_string(&hit)?);
            }
            Ok(())
        }
        Commands::Stats { data_dir } => {
            let cache = warm_cache(data_dir).await;
            println!("{}", serde_json::to_string(&cache.system_stats())?);
            Ok(())
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "bss", &mut std::io::stdout());
            Ok(())
        }
        Commands::Man => {
            let cmd = Cli::command();
            let man = clap_mangen::Man::new(cmd);
            let mut out = std::io::stdout();
            man.render(&mut out)?;
            Ok(())
        }
    }
}

async fn warm_cache(data_dir: PathBuf) -> OpsCache<JsonDirSource> {
    let cache = OpsCache::new(JsonDirSource::new(data_dir));
    let spinner = indicatif::ProgressBar::new_spinner();
    spinner.set_message("warming cache");
    spinner.enable_steady_tick(Duration::from_millis(80));
    cache.pre_warm().await;
    spinner.finish_and_clear();
    cache
}
