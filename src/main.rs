//! Forum-Mirror main entry point
//!
//! This is the command-line interface for the Forum-Mirror archive mirror.

use clap::Parser;
use forum_mirror::config::{load_config_with_hash, validate, Config, LoggingConfig};
use forum_mirror::crawler::Coordinator;
use forum_mirror::logging::{file_filter, rotating_log_file};
use forum_mirror::output::print_summary;
use forum_mirror::url::{seed_urls, LinkFilter};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Forum-Mirror: a polite forum archive mirror
///
/// Mirrors the archive pages of the given sub-forums to local disk while
/// respecting robots.txt, and rewrites links so the copy browses offline.
#[derive(Parser, Debug)]
#[command(name = "forum-mirror")]
#[command(version)]
#[command(about = "A polite forum archive mirror", long_about = None)]
struct Cli {
    /// Sub-forum numbers to mirror (overrides the config file)
    #[arg(value_name = "FORUM_CODES")]
    forum_codes: Vec<u32>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Base of the site to mirror
    #[arg(short = 'u', long, value_name = "URL")]
    base_url: Option<String>,

    /// Directory to build the archive in
    #[arg(short, long, value_name = "PATH")]
    archive_location: Option<String>,

    /// Also write logs to this file, rotated by size (overrides the config file)
    #[arg(short, long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Show the resolved configuration, seeds and scope patterns, then exit
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Loaded before logging starts, since the log file is configurable
    let loaded = match &cli.config {
        Some(path) => Some(load_config_with_hash(path)?),
        None => None,
    };
    let (mut config, hash) = match loaded {
        Some((cfg, hash)) => (cfg, Some(hash)),
        None => (Config::default(), None),
    };

    apply_overrides(&mut config, &cli);
    validate(&config)?;

    setup_logging(cli.verbose, cli.quiet, &config.logging)?;
    if let (Some(path), Some(hash)) = (&cli.config, hash) {
        tracing::info!(
            "Configuration loaded from {} (hash: {})",
            path.display(),
            hash
        );
    }

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else {
        handle_crawl(config).await?;
    }

    Ok(())
}

/// Sets up the console subscriber and the optional rotating log file
///
/// Each output has its own filter: the console follows `-v`/`-q`, the file
/// follows `file-level`.
fn setup_logging(
    verbose: u8,
    quiet: bool,
    logging: &LoggingConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let console_filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("forum_mirror=info,warn"),
            1 => EnvFilter::new("forum_mirror=debug,info"),
            2 => EnvFilter::new("forum_mirror=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let file_layer = logging.file.as_ref().map(|path| {
        fmt::layer()
            .with_ansi(false)
            .with_writer(Mutex::new(rotating_log_file(Path::new(path), logging)))
            .with_filter(file_filter(logging))
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_filter(console_filter))
        .with(file_layer)
        .try_init()?;

    Ok(())
}

/// Applies command-line values over the loaded configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if !cli.forum_codes.is_empty() {
        config.archive.forum_codes = cli.forum_codes.clone();
    }
    if let Some(base_url) = &cli.base_url {
        config.archive.base_url = base_url.clone();
    }
    if let Some(location) = &cli.archive_location {
        config.archive.archive_location = location.clone();
    }
    if let Some(log_file) = &cli.log_file {
        config.logging.file = Some(log_file.to_string_lossy().into_owned());
    }
}

/// Handles the --dry-run mode: shows what would be mirrored
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Forum-Mirror Dry Run ===\n");

    println!("Archive:");
    println!("  Base URL: {}", config.archive.base_url);
    println!("  Mirrored prefix: {}", config.archive.mirror_prefix);
    println!("  Location: {}", config.archive.archive_location);

    println!("\nCrawler:");
    println!("  Workers: {}", config.crawler.workers);
    println!(
        "  Default crawl delay: {}ms",
        config.crawler.default_crawl_delay_ms
    );
    println!("  User agent: {}", config.user_agent.header_value());

    let seeds = seed_urls(&config.archive)?;
    println!("\nSeed URLs ({}):", seeds.len());
    for seed in &seeds {
        println!("  - {}", seed);
    }

    let filter = LinkFilter::new(&config.archive.forum_codes)?;
    println!("\nScope patterns:");
    for pattern in filter.patterns() {
        println!("  - {}", pattern);
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the main mirror operation
async fn handle_crawl(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Mirroring forums {:?} from {} into {}",
        config.archive.forum_codes,
        config.archive.base_url,
        config.archive.archive_location
    );

    let mut coordinator = Coordinator::from_config(config)?;
    if let Err(e) = coordinator.setup().await {
        tracing::error!("Setup failed: {}", e);
        return Err(e.into());
    }

    let shutdown = coordinator.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() && shutdown.signal() {
            tracing::warn!("Interrupted, finishing in-flight pages");
        }
    });

    let result = coordinator.run().await;
    coordinator.teardown();

    match result {
        Ok(summary) => {
            tracing::info!("Mirror completed successfully");
            print_summary(&summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Mirror failed: {}", e);
            Err(e.into())
        }
    }
}
