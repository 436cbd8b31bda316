use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rollcall_core::{CosineMatcher, Matcher};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

mod config;
mod input;

use config::Config;

#[derive(Parser)]
#[command(name = "rollcall", about = "Rollcall face descriptor matching CLI")]
struct Cli {
    /// Path to a TOML config file (defaults to $ROLLCALL_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Similarity threshold, overriding config and environment
    #[arg(long, global = true, allow_negative_numbers = true)]
    threshold: Option<f64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rescale a descriptor to unit length
    Normalize {
        /// Descriptor JSON array, or - for stdin
        descriptor: PathBuf,
    },
    /// Compare two descriptors
    Similarity { a: PathBuf, b: PathBuf },
    /// Resolve a query descriptor against an enrollment snapshot
    Match { query: PathBuf, enrollment: PathBuf },
    /// Like match, but report the best candidate even below threshold
    Scan { query: PathBuf, enrollment: PathBuf },
    /// List every candidate at or above threshold, most similar first
    Rank {
        query: PathBuf,
        enrollment: PathBuf,
        /// Maximum number of candidates to print
        #[arg(short, long, default_value_t = 5)]
        limit: usize,
    },
    /// Average several captures of one identity into an enrollment template
    Template {
        /// JSON array of descriptors
        captures: PathBuf,
    },
    /// Print the effective configuration
    Config,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(threshold) = cli.threshold {
        config = config.with_threshold(threshold)?;
    }
    tracing::debug!(?config, "configuration resolved");

    run(cli.command, &config)
}

fn run(command: Commands, config: &Config) -> Result<()> {
    let threshold = config.similarity_threshold;

    match command {
        Commands::Normalize { descriptor } => {
            let raw = input::load_descriptor(&descriptor, config)?;
            print_json(&raw.normalized())
        }
        Commands::Similarity { a, b } => {
            let a = input::load_descriptor(&a, config)?;
            let b = input::load_descriptor(&b, config)?;
            print_json(&serde_json::json!({
                "cosine": rollcall_core::cosine_similarity(&a, &b),
                "euclidean": rollcall_core::euclidean_distance(&a.normalized(), &b.normalized()),
            }))
        }
        Commands::Match { query, enrollment } => {
            let (query, enrollment) = load_pair(&query, &enrollment, config)?;
            let result = CosineMatcher.find_best_match(&query, &enrollment, threshold);
            tracing::info!(
                matched = result.is_match(),
                identity = result.identity(),
                score = result.score(),
                "match complete"
            );
            print_json(&result)
        }
        Commands::Scan { query, enrollment } => {
            let (query, enrollment) = load_pair(&query, &enrollment, config)?;
            print_json(&CosineMatcher.scan(&query, &enrollment, threshold))
        }
        Commands::Rank {
            query,
            enrollment,
            limit,
        } => {
            let (query, enrollment) = load_pair(&query, &enrollment, config)?;
            print_json(&CosineMatcher.rank(&query, &enrollment, threshold, limit))
        }
        Commands::Template { captures } => {
            let captures = input::load_captures(&captures, config)?;
            let template = rollcall_core::mean_descriptor(&captures)
                .context("no usable capture: all were empty, zero, or cancelled out")?;
            tracing::info!(captures = captures.len(), dim = template.len(), "template built");
            print_json(&template)
        }
        Commands::Config => {
            print!("{}", toml::to_string(config)?);
            Ok(())
        }
    }
}

fn load_pair(
    query: &Path,
    enrollment: &Path,
    config: &Config,
) -> Result<(rollcall_core::Descriptor, Vec<rollcall_core::EnrollmentRecord>)> {
    let query = input::load_query(query, config)?;
    let enrollment = input::load_enrollment(enrollment, config)?;
    Ok((query, enrollment))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
