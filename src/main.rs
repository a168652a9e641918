//! Battle-Ripple main entry point
//!
//! This is the command-line interface for the Battle-Ripple match-graph crawler.

use anyhow::Context;
use battle_ripple::config::{load_config_with_hash, Config, GroupingKind};
use battle_ripple::crawler::{crawl, CrawlOutcome};
use battle_ripple::output::{print_summary, write_map_trio_reports, write_reports};
use battle_ripple::stats::{by_entity, by_map_trio, Grouping, MapTrio};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Battle-Ripple: a match-graph crawler for game statistics
///
/// Battle-Ripple starts from one player, follows every player met in their
/// recent battles, counts each battle once, and reports win rates and pick
/// counts per entity or per map and team composition.
#[derive(Parser, Debug)]
#[command(name = "battle-ripple")]
#[command(version)]
#[command(about = "A match-graph crawler for game statistics", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,

    /// Seed player tag, overriding the config file and environment
    #[arg(long, value_name = "TAG")]
    seed: Option<String>,

    /// Stop after fetching this many players
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    max_players: Option<u32>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load(&cli)?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config, config_hash).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("battle_ripple=info,warn"),
            1 => EnvFilter::new("battle_ripple=debug,info"),
            2 => EnvFilter::new("battle_ripple=trace,debug"),
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

/// Loads the configuration with environment and command-line overrides
fn load(cli: &Cli) -> anyhow::Result<(Config, String)> {
    let (mut config, hash) = load_config_with_hash(&cli.config, cli.seed.as_deref())
        .with_context(|| format!("Invalid configuration in {}", cli.config.display()))?;

    if let Some(max) = cli.max_players {
        config.crawler.max_players = Some(max);
    }

    Ok((config, hash))
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== Battle-Ripple Dry Run ===\n");

    println!("Crawler Configuration:");
    println!(
        "  Seed player: {}",
        config.crawler.seed_player.as_deref().unwrap_or("-")
    );
    println!("  Workers: {}", config.crawler.workers);
    println!("  Request timeout: {}ms", config.crawler.request_timeout);
    println!(
        "  Minimum request interval: {}ms",
        config.crawler.minimum_request_interval
    );
    println!(
        "  Rate limit cooldown: {}ms",
        config.crawler.rate_limit_cooldown
    );
    match config.crawler.max_players {
        Some(max) => println!("  Max players: {}", max),
        None => println!("  Max players: unlimited"),
    }
    println!("  Unknown results: {:?}", config.crawler.unknown_result);
    println!("  Grouping: {:?}", config.crawler.grouping);

    println!("\nAPI:");
    println!("  Base URL: {}", config.api.base_url);
    println!("  User agent: {}", config.api.user_agent);
    println!("  Token: configured");

    println!("\nFilter:");
    println!("  Excluded modes: {}", config.filter.excluded_modes.join(", "));
    println!(
        "  Excluded markers: {}",
        config.filter.excluded_markers.join(", ")
    );

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, config_hash: String) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight fetches");
            on_interrupt.cancel();
        }
    });

    let dir = Path::new(&config.output.directory);
    match config.crawler.grouping {
        GroupingKind::Entity => {
            let grouping: Arc<dyn Grouping<String>> = Arc::new(by_entity);
            let mut outcome = run(&config, grouping, cancel).await?;
            outcome.summary.config_hash = Some(config_hash);
            write_reports(
                dir,
                config.crawler.grouping.file_prefix(),
                &outcome.stats,
                &outcome.summary,
            )?;
            print_summary(&outcome.summary);
        }
        GroupingKind::MapTrio => {
            let grouping: Arc<dyn Grouping<MapTrio>> = Arc::new(by_map_trio);
            let mut outcome = run(&config, grouping, cancel).await?;
            outcome.summary.config_hash = Some(config_hash);
            write_map_trio_reports(dir, &outcome.stats, &outcome.summary)?;
            print_summary(&outcome.summary);
        }
    }

    Ok(())
}

async fn run<K>(
    config: &Config,
    grouping: Arc<dyn Grouping<K>>,
    cancel: CancellationToken,
) -> anyhow::Result<CrawlOutcome<K>>
where
    K: Clone + Eq + std::hash::Hash + Ord + Send + Sync + 'static,
{
    match crawl(config, grouping, cancel).await {
        Ok(outcome) => {
            tracing::info!("Crawl completed successfully");
            Ok(outcome)
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
