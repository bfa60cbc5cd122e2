//! # Feed Scrape
//!
//! Collects posts from a JavaScript-rendered social feed by scrolling it in
//! a headless Chrome session, and exports them as a table.
//!
//! ## Usage
//!
//! ```sh
//! feed_scrape -u https://www.reddit.com/r/AUT/new/ -n 100 --dated
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Loading**: A [`loader::SnapshotSource`] scrolls the feed and captures
//!    the page markup after each scroll
//! 2. **Extraction**: [`extract::Extractor`] turns each snapshot into records
//! 3. **Collection**: [`collect::collect`] merges records without duplicates
//!    until the target count is reached or the feed stops growing
//! 4. **Output**: [`outputs::write_records`] numbers the records and writes
//!    an Excel workbook (or CSV, TSV, JSON)
//!
//! Whatever stops the loop, the records collected so far are exported.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod collect;
mod config;
mod error;
mod extract;
mod loader;
mod models;
mod outputs;
mod utils;

use cli::Cli;
use collect::collect;
use config::ScrapeConfig;
use loader::browser::BrowserFeed;
use loader::replay::ReplayFeed;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("feed_scrape starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = match ScrapeConfig::resolve(&args) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    let extractor = match config.extractor() {
        Ok(extractor) => extractor,
        Err(e) => {
            error!(error = %e, "Invalid extraction selectors");
            return Err(e.into());
        }
    };
    let output_path = config.output_path();
    let options = config.collect_options();
    info!(
        url = %config.url,
        max_posts = config.max_posts,
        alignment = ?extractor.alignment(),
        output = %output_path.display(),
        "Configuration ready"
    );

    // ---- Collect ----
    let collection = if args.replay.is_empty() {
        let feed = match BrowserFeed::open(&config.url, config.session_options()).await {
            Ok(feed) => feed,
            Err(e) => {
                error!(error = %e, "Could not start browser session");
                return Err(e.into());
            }
        };
        collect(feed, &extractor, &options).await
    } else {
        let feed = ReplayFeed::new(args.replay.iter().cloned());
        info!(pages = feed.remaining(), "Replaying saved pages");
        collect(feed, &extractor, &options).await
    };
    info!(
        stop = %collection.stop,
        cycles = collection.cycles,
        records = collection.records.len(),
        "Collection complete"
    );

    // ---- Output ----
    if let Err(e) = outputs::write_records(&collection.records, &output_path, config.format).await {
        error!(path = %output_path.display(), error = %e, "Failed to write export");
        return Err(e.into());
    }
    info!(path = %output_path.display(), "Data saved");

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
