//! gitratra - GitHub repository traffic tracker
//!
//! One-shot CLI meant to run periodically (e.g. from cron): loads the local
//! traffic store, fetches the current reporting window for every configured
//! repository, merges it in, prints a summary and writes the store back.
//!
//! The store is written exactly once, at the end, and only when every
//! repository fetched and merged cleanly — a failed run never leaves a
//! store reflecting part of the list.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use gitratra_core::github::qualify_repo_name;
use gitratra_core::{merge, repolist, store, summary};
use gitratra_core::{Config, Credential, MetricKind, TrafficClient};

#[derive(Parser)]
#[command(name = "gitratra")]
#[command(about = "Track GitHub repository traffic over time")]
#[command(version)]
struct Args {
    /// Credential: "token:<value>" or "username:<value>"
    credential: Credential,

    /// File listing one repository per line
    repositories: PathBuf,

    /// Path of the traffic store file
    store: PathBuf,

    /// Fetch and merge but do not write the store
    #[arg(long)]
    dry_run: bool,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration (optional config.toml; defaults otherwise)
    let mut config = Config::load().context("failed to load configuration")?;
    match args.verbose {
        0 => {}
        1 => config.logging.level = "debug".to_string(),
        _ => config.logging.level = "trace".to_string(),
    }

    // Initialize logging (to file; stdout is for the summary)
    let _log_guard =
        gitratra_core::logging::init(&config.logging).context("failed to initialize logging")?;

    tracing::info!("gitratra starting");

    let repositories =
        repolist::load(&args.repositories).context("failed to load repository list")?;
    tracing::info!(count = repositories.len(), "Loaded repository list");

    let mut traffic = store::load(&args.store).context("failed to load traffic store")?;

    println!("Authentication...");
    let client = TrafficClient::new(&args.credential, &config.api)
        .context("failed to create GitHub client")?;
    let login = client
        .authenticated_login()
        .await
        .context("failed to resolve authenticated user")?;

    for name in &repositories {
        let full_name = qualify_repo_name(name, &login);
        println!("querying current traffic data from {}...", name);
        tracing::info!(repo = %full_name, "Fetching traffic");

        let clones = client
            .fetch_traffic(&full_name, MetricKind::Clones)
            .await
            .with_context(|| format!("failed to fetch clones for {}", full_name))?;
        let views = client
            .fetch_traffic(&full_name, MetricKind::Views)
            .await
            .with_context(|| format!("failed to fetch views for {}", full_name))?;

        merge::update_repository(&mut traffic, name, &clones, &views)
            .with_context(|| format!("failed to merge traffic for {}", name))?;
    }

    println!();
    print!("{}", summary::render(&traffic));

    if args.dry_run {
        println!("Dry run - store not saved");
        tracing::info!("Dry run complete");
        return Ok(());
    }

    println!("Saving results...");
    store::save(&args.store, &traffic).context("failed to save traffic store")?;

    tracing::info!(repos = traffic.len(), "Run complete");
    Ok(())
}
