//! Command-line interface definitions for Feed Scrape.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Every option is optional: unset flags fall back to the YAML config file
//! (if any) and then to built-in defaults.

use std::path::PathBuf;

use clap::Parser;

use crate::extract::BoundPolicy;
use crate::loader::SettleStrategy;
use crate::outputs::ExportFormat;

fn parse_positive(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

/// Command-line arguments for the Feed Scrape application.
///
/// # Examples
///
/// ```sh
/// # Scrape 100 posts from the default feed into feed_data.xlsx
/// feed_scrape
///
/// # 200 posts, dated filename, permissive field alignment
/// feed_scrape -u https://www.reddit.com/r/rust/new/ -n 200 --dated --bound permissive
///
/// # Re-run extraction offline over saved pages
/// feed_scrape --replay debug_page_source.html -f json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Feed URL to load
    #[arg(short, long, env = "FEED_URL")]
    pub url: Option<String>,

    /// Number of posts to collect
    #[arg(short = 'n', long, value_parser = parse_positive)]
    pub max_posts: Option<usize>,

    /// Output file (default: feed_data.<ext> in the current directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (default: xlsx)
    #[arg(short, long, value_enum)]
    pub format: Option<ExportFormat>,

    /// Append the month and day to the default output filename
    #[arg(long)]
    pub dated: bool,

    /// How to pair field lists of different lengths
    #[arg(long, value_enum)]
    pub bound: Option<BoundPolicy>,

    /// Per-post container selector; fields are then matched inside each container
    #[arg(long)]
    pub container: Option<String>,

    /// Seconds to wait for the feed to render before giving up
    #[arg(long, value_parser = parse_positive)]
    pub wait_timeout: Option<usize>,

    /// Maximum seconds to wait for new posts after each scroll
    #[arg(long, value_parser = parse_positive)]
    pub settle_delay: Option<usize>,

    /// How to wait after each scroll
    #[arg(long, value_enum)]
    pub settle: Option<SettleStrategy>,

    /// Extra scrolls allowed without new posts before stopping
    #[arg(long)]
    pub no_progress_retries: Option<usize>,

    /// Show the browser window
    #[arg(long)]
    pub headful: bool,

    /// Write each captured page to this file (default: debug_page_source.html)
    #[arg(long, num_args = 0..=1, default_missing_value = "debug_page_source.html")]
    pub debug_dump: Option<PathBuf>,

    /// Replay saved page files instead of opening a browser
    #[arg(long, num_args = 1..)]
    pub replay: Vec<PathBuf>,

    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_are_unset() {
        let cli = Cli::parse_from(["feed_scrape"]);
        assert!(cli.max_posts.is_none());
        assert!(cli.format.is_none());
        assert!(cli.debug_dump.is_none());
        assert!(cli.replay.is_empty());
        assert!(!cli.headful);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "feed_scrape",
            "-u",
            "https://www.reddit.com/r/rust/new/",
            "-n",
            "25",
            "-o",
            "/tmp/posts.tsv",
            "-f",
            "tsv",
        ]);

        assert_eq!(cli.url.as_deref(), Some("https://www.reddit.com/r/rust/new/"));
        assert_eq!(cli.max_posts, Some(25));
        assert_eq!(cli.output, Some(PathBuf::from("/tmp/posts.tsv")));
        assert_eq!(cli.format, Some(ExportFormat::Tsv));
    }

    #[test]
    fn test_cli_rejects_zero_posts() {
        assert!(Cli::try_parse_from(["feed_scrape", "-n", "0"]).is_err());
    }

    #[test]
    fn test_cli_debug_dump_default_name() {
        let cli = Cli::parse_from(["feed_scrape", "--debug-dump"]);
        assert_eq!(cli.debug_dump, Some(PathBuf::from("debug_page_source.html")));
    }

    #[test]
    fn test_cli_replay_and_policies() {
        let cli = Cli::parse_from([
            "feed_scrape",
            "--bound",
            "permissive",
            "--settle",
            "fixed",
            "--replay",
            "a.html",
            "b.html",
        ]);
        assert_eq!(cli.bound, Some(BoundPolicy::Permissive));
        assert_eq!(cli.settle, Some(SettleStrategy::Fixed));
        assert_eq!(cli.replay, vec![PathBuf::from("a.html"), PathBuf::from("b.html")]);
    }
}
