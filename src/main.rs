//! Luma-Harvest main entry point
//!
//! This is the command-line interface for the Luma-Harvest event roster
//! extractor.

use anyhow::Context;
use clap::Parser;
use luma_harvest::config::{load_config_with_hash, validate, Config};
use luma_harvest::crawler::{Harvester, RunOptions};
use luma_harvest::output::{print_statistics, writers_for, HarvestStatistics};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Luma-Harvest: event roster extraction
///
/// Luma-Harvest fetches public event pages (or listing pages of events),
/// collects every host and guest profile linked from them, and looks up the
/// external social profile of each participant.
#[derive(Parser, Debug)]
#[command(name = "luma-harvest")]
#[command(version)]
#[command(about = "Harvests event participants and their social profiles", long_about = None)]
struct Cli {
    /// Event or listing URLs to harvest
    #[arg(value_name = "SEED_URL")]
    seeds: Vec<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Keep at most this many participants per event
    #[arg(long, value_name = "N")]
    max_participants: Option<usize>,

    /// Leave event descriptions out of the output
    #[arg(long)]
    no_description: bool,

    /// CSV output path (overrides the config file)
    #[arg(short, long, value_name = "PATH")]
    output: Option<String>,

    /// Also write a JSON export next to the CSV file
    #[arg(long)]
    json: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be harvested without fetching anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load_effective_config(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config, &cli.seeds, cli.json);
        return Ok(());
    }

    handle_harvest(&config, &cli.seeds, cli.json).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("luma_harvest=info,warn"),
            1 => EnvFilter::new("luma_harvest=debug,info"),
            2 => EnvFilter::new("luma_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file (or defaults) and applies command-line overrides
fn load_effective_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if let Some(max) = cli.max_participants {
        config.harvest.max_participants_per_event = Some(max);
    }
    if cli.no_description {
        config.harvest.include_description = false;
    }
    if let Some(output) = &cli.output {
        config.output.csv_path = output.clone();
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Handles the --dry-run mode: shows the effective settings and seeds
fn handle_dry_run(config: &Config, seeds: &[String], json: bool) {
    println!("=== Luma-Harvest Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Social domain: {}", config.site.social_domain);
    println!("  Listing markers: {}", config.site.listing_markers.join(", "));

    println!("\nHTTP:");
    println!("  User agent: {}", config.http.user_agent);
    println!(
        "  Timeouts: {}s total, {}s connect",
        config.http.timeout_secs, config.http.connect_timeout_secs
    );
    println!(
        "  Attempts: {} (base retry delay {}ms)",
        config.http.max_attempts, config.http.retry_base_delay_ms
    );
    println!("  Delay between requests: {}ms", config.http.request_delay_ms);

    println!("\nHarvest:");
    println!(
        "  Concurrent profiles: {}",
        config.harvest.max_concurrent_profiles
    );
    match config.harvest.max_participants_per_event {
        Some(max) => println!("  Participants per event: at most {}", max),
        None => println!("  Participants per event: unlimited"),
    }
    println!(
        "  Include descriptions: {}",
        config.harvest.include_description
    );

    println!("\nOutput:");
    println!("  CSV: {}", config.output.csv_path);
    if json {
        println!("  JSON: {}", config.output.resolved_json_path());
    }

    println!("\nSeeds ({}):", seeds.len());
    for seed in seeds {
        println!("  - {}", seed);
    }

    println!("\n✓ Configuration is valid");
    if seeds.is_empty() {
        println!("✗ No seed URL given; a real run would stop here");
    }
}

/// Handles the main harvest operation
async fn handle_harvest(config: &Config, seeds: &[String], json: bool) -> anyhow::Result<()> {
    let harvester = Harvester::new(config)?;
    let options = RunOptions::from(&config.harvest);

    let report = match harvester.run_all(seeds, &options).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            return Err(e.into());
        }
    };

    for url in &report.failed_events {
        tracing::warn!("Failed event: {}", url);
    }

    for writer in writers_for(&config.output, json) {
        writer.write(&report).with_context(|| {
            format!(
                "Failed to write {} output to {}",
                writer.format_name(),
                writer.path().display()
            )
        })?;
        println!(
            "✓ {} written to: {}",
            writer.format_name(),
            writer.path().display()
        );
    }

    let stats = HarvestStatistics::from_report(&report, harvester.cache().computations());
    println!();
    print_statistics(&stats);

    Ok(())
}
