//! Offline snapshot source reading saved page markup from disk.
//!
//! Typically fed with earlier debug dumps so that extraction and the
//! collection loop can be exercised without a browser.

use std::collections::VecDeque;
use std::path::PathBuf;

use tokio::fs;
use tracing::{debug, instrument};

use super::SnapshotSource;
use crate::error::{Result, ScrapeError};
use crate::models::Snapshot;

/// Plays back markup files in the order given.
#[derive(Debug)]
pub struct ReplayFeed {
    pages: VecDeque<PathBuf>,
}

impl ReplayFeed {
    pub fn new(pages: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            pages: pages.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.pages.len()
    }
}

impl SnapshotSource for ReplayFeed {
    #[instrument(level = "debug", skip_all, fields(remaining = self.pages.len()))]
    async fn next_snapshot(&mut self) -> Result<Snapshot> {
        let path = self.pages.pop_front().ok_or(ScrapeError::Exhausted)?;
        let markup = fs::read_to_string(&path).await?;
        debug!(path = %path.display(), bytes = markup.len(), "Replaying snapshot");
        Ok(Snapshot::new(markup))
    }

    async fn close(self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replays_in_order_then_exhausts() {
        let dir = std::env::temp_dir().join(format!("feed_scrape_replay_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let first = dir.join("first.html");
        let second = dir.join("second.html");
        std::fs::write(&first, "<p>one</p>").unwrap();
        std::fs::write(&second, "<p>two</p>").unwrap();

        let mut feed = ReplayFeed::new([first, second]);
        assert_eq!(feed.remaining(), 2);
        assert_eq!(feed.next_snapshot().await.unwrap().markup(), "<p>one</p>");
        assert_eq!(feed.next_snapshot().await.unwrap().markup(), "<p>two</p>");

        let err = feed.next_snapshot().await.unwrap_err();
        assert!(matches!(err, ScrapeError::Exhausted));
        feed.close().await.unwrap();

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let mut feed = ReplayFeed::new([PathBuf::from("/nonexistent/feed_scrape/page.html")]);
        let err = feed.next_snapshot().await.unwrap_err();
        assert!(matches!(err, ScrapeError::Io(_)));
    }
}
