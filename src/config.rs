//! Run configuration: YAML file, CLI overrides and validation.
//!
//! Every field has a default, so a config file only needs the keys it
//! changes:
//!
//! ```yaml
//! url: https://www.reddit.com/r/AUT/new/
//! max_posts: 200
//! format: xlsx
//! extraction:
//!   bound: permissive
//!   selectors:
//!     title: 'a[slot="title"]'
//! session:
//!   settle: fixed
//!   settle_delay_secs: 5
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use url::Url;

use crate::cli::Cli;
use crate::collect::CollectOptions;
use crate::error::{Result, ScrapeError};
use crate::extract::{BoundPolicy, Extractor, Selectors};
use crate::loader::SettleStrategy;
use crate::loader::browser::SessionOptions;
use crate::outputs::ExportFormat;
use crate::utils::dated_filename;

pub const DEFAULT_URL: &str = "https://www.reddit.com/r/AUT/new/";
pub const DEFAULT_STEM: &str = "feed_data";

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub bound: BoundPolicy,
    pub container: Option<String>,
    pub selectors: Selectors,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    pub headless: bool,
    pub wait_timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub settle: SettleStrategy,
    pub settle_delay_secs: u64,
    pub chrome_executable: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            headless: true,
            wait_timeout_secs: 20,
            poll_interval_ms: 250,
            settle: SettleStrategy::default(),
            settle_delay_secs: 5,
            chrome_executable: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScrapeConfig {
    pub url: String,
    pub max_posts: usize,
    pub output: Option<PathBuf>,
    pub format: ExportFormat,
    pub dated_filename: bool,
    pub debug_dump: Option<PathBuf>,
    pub no_progress_retries: usize,
    pub extraction: ExtractionConfig,
    pub session: SessionConfig,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            max_posts: 100,
            output: None,
            format: ExportFormat::default(),
            dated_filename: false,
            debug_dump: None,
            no_progress_retries: 0,
            extraction: ExtractionConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl ScrapeConfig {
    /// Read a YAML config file.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&text)?;
        info!("Loaded configuration");
        Ok(config)
    }

    /// Build the effective configuration: file (if given), then CLI flags.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::from_file(Path::new(path))?,
            None => Self::default(),
        };
        config.apply_cli(cli);
        config.validate()?;
        debug!(?config, "Resolved configuration");
        Ok(config)
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(url) = &cli.url {
            self.url = url.clone();
        }
        if let Some(n) = cli.max_posts {
            self.max_posts = n;
        }
        if let Some(output) = &cli.output {
            self.output = Some(output.clone());
        }
        if let Some(format) = cli.format {
            self.format = format;
        }
        if cli.dated {
            self.dated_filename = true;
        }
        if let Some(dump) = &cli.debug_dump {
            self.debug_dump = Some(dump.clone());
        }
        if let Some(retries) = cli.no_progress_retries {
            self.no_progress_retries = retries;
        }
        if let Some(bound) = cli.bound {
            self.extraction.bound = bound;
        }
        if let Some(container) = &cli.container {
            self.extraction.container = Some(container.clone());
        }
        if let Some(secs) = cli.wait_timeout {
            self.session.wait_timeout_secs = secs as u64;
        }
        if let Some(secs) = cli.settle_delay {
            self.session.settle_delay_secs = secs as u64;
        }
        if let Some(settle) = cli.settle {
            self.session.settle = settle;
        }
        if cli.headful {
            self.session.headless = false;
        }
    }

    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.url)?;
        if self.max_posts == 0 {
            return Err(ScrapeError::Config("max_posts must be at least 1".into()));
        }
        if self.session.wait_timeout_secs == 0
            || self.session.poll_interval_ms == 0
            || self.session.settle_delay_secs == 0
        {
            return Err(ScrapeError::Config(
                "wait_timeout_secs, poll_interval_ms and settle_delay_secs must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Where the export goes: the configured path, or a default name.
    pub fn output_path(&self) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => {
                let date = self.dated_filename.then(|| Local::now().date_naive());
                dated_filename(DEFAULT_STEM, self.format.extension(), date)
            }
        }
    }

    pub fn extractor(&self) -> Result<Extractor> {
        Extractor::new(
            &self.extraction.selectors,
            self.extraction.bound,
            self.extraction.container.as_deref(),
        )
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            headless: self.session.headless,
            marker: self.extraction.selectors.author.clone(),
            wait_timeout: Duration::from_secs(self.session.wait_timeout_secs),
            poll_interval: Duration::from_millis(self.session.poll_interval_ms),
            settle: self.session.settle,
            settle_delay: Duration::from_secs(self.session.settle_delay_secs),
            chrome_executable: self.session.chrome_executable.clone(),
        }
    }

    pub fn collect_options(&self) -> CollectOptions {
        CollectOptions {
            max_records: self.max_posts,
            no_progress_retries: self.no_progress_retries,
            debug_dump: self.debug_dump.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
max_posts: 200
format: tsv
extraction:
  bound: permissive
session:
  settle: fixed
"#;
        let config: ScrapeConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.max_posts, 200);
        assert_eq!(config.format, ExportFormat::Tsv);
        assert_eq!(config.extraction.bound, BoundPolicy::Permissive);
        assert_eq!(config.extraction.selectors, Selectors::default());
        assert_eq!(config.session.settle, SettleStrategy::Fixed);
        assert_eq!(config.session.wait_timeout_secs, 20);
        assert_eq!(config.url, DEFAULT_URL);
    }

    #[test]
    fn test_cli_overrides_config() {
        let mut config = ScrapeConfig {
            max_posts: 200,
            ..ScrapeConfig::default()
        };
        let cli = Cli::parse_from([
            "feed_scrape",
            "-n",
            "30",
            "--headful",
            "--container",
            "article",
            "--wait-timeout",
            "7",
        ]);
        config.apply_cli(&cli);

        assert_eq!(config.max_posts, 30);
        assert!(!config.session.headless);
        assert_eq!(config.extraction.container.as_deref(), Some("article"));
        assert_eq!(config.session.wait_timeout_secs, 7);
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let config = ScrapeConfig {
            url: "not a url".to_string(),
            ..ScrapeConfig::default()
        };
        assert!(matches!(config.validate(), Err(ScrapeError::Url(_))));
    }

    #[test]
    fn test_validate_rejects_zero_posts() {
        let config = ScrapeConfig {
            max_posts: 0,
            ..ScrapeConfig::default()
        };
        assert!(matches!(config.validate(), Err(ScrapeError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_settle_delay() {
        let config: ScrapeConfig =
            serde_yaml::from_str("session:\n  settle_delay_secs: 0\n").unwrap();
        assert!(matches!(config.validate(), Err(ScrapeError::Config(_))));
    }

    #[test]
    fn test_default_output_is_workbook() {
        let config = ScrapeConfig::default();
        assert_eq!(config.output_path(), PathBuf::from("feed_data.xlsx"));
    }

    #[test]
    fn test_output_path_defaults() {
        let config = ScrapeConfig {
            format: ExportFormat::Json,
            ..ScrapeConfig::default()
        };
        assert_eq!(config.output_path(), PathBuf::from("feed_data.json"));

        let dated = ScrapeConfig {
            dated_filename: true,
            ..ScrapeConfig::default()
        };
        let name = dated.output_path().to_string_lossy().into_owned();
        assert!(name.starts_with("feed_data_"));
        assert!(name.ends_with(".xlsx"));

        let explicit = ScrapeConfig {
            output: Some(PathBuf::from("out/posts.csv")),
            dated_filename: true,
            ..ScrapeConfig::default()
        };
        assert_eq!(explicit.output_path(), PathBuf::from("out/posts.csv"));
    }

    #[test]
    fn test_session_marker_follows_author_selector() {
        let mut config = ScrapeConfig::default();
        config.extraction.selectors.author = "span.author".to_string();
        let options = config.session_options();
        assert_eq!(options.marker, "span.author");
        assert_eq!(options.settle_delay, Duration::from_secs(5));
    }

    #[test]
    fn test_from_file_missing_is_io_error() {
        let err = ScrapeConfig::from_file(Path::new("/nonexistent/feed_scrape.yaml")).unwrap_err();
        assert!(matches!(err, ScrapeError::Io(_)));
    }
}
