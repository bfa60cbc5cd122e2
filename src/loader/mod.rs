//! Snapshot sources feeding the collection loop.
//!
//! # Submodules
//!
//! - [`browser`]: Live headless-Chrome session that scrolls the feed
//! - [`replay`]: Saved markup files played back in order, for offline runs
//!
//! Every source hands out [`Snapshot`]s one at a time and is closed exactly
//! once by its consumer. Running out of content is reported as
//! `LoadTimeout` or `Exhausted`, which the collection loop treats as a
//! normal stop.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::Snapshot;

pub mod browser;
pub mod replay;

/// A finite, lazily advancing sequence of page snapshots.
pub trait SnapshotSource {
    /// Capture the next snapshot.
    ///
    /// # Errors
    ///
    /// [`ScrapeError::LoadTimeout`](crate::error::ScrapeError::LoadTimeout)
    /// or [`ScrapeError::Exhausted`](crate::error::ScrapeError::Exhausted)
    /// when there is nothing more to load; any other error is a failure of
    /// the source itself.
    async fn next_snapshot(&mut self) -> Result<Snapshot>;

    /// Release whatever the source holds. The source is unusable afterwards.
    async fn close(self) -> Result<()>;
}

/// How to wait for new content after scrolling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SettleStrategy {
    /// Always wait the full settle delay.
    Fixed,
    /// Wait until more marker elements appear, at most the settle delay.
    #[default]
    Growth,
}
