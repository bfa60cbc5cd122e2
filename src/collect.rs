//! The incremental collection loop.
//!
//! Each cycle asks the source for a snapshot, extracts its records and
//! appends the ones not already collected. The loop is `Running` until one
//! of these stops it:
//!
//! | Stop                      | Cause                                              |
//! |---------------------------|----------------------------------------------------|
//! | [`StopReason::Target`]     | the requested number of records was reached        |
//! | [`StopReason::NoProgress`] | a cycle added no new records (after allowed retries) |
//! | [`StopReason::Timeout`]    | the marker element never appeared                  |
//! | [`StopReason::Exhausted`]  | a replay source ran out of pages                   |
//! | [`StopReason::Failed`]     | the source failed in some other way                |
//!
//! Whatever the stop, the source is closed and the records collected so
//! far are returned, truncated to the requested maximum.

use std::fmt;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{error, info, instrument, warn};

use crate::error::ScrapeError;
use crate::extract::Extractor;
use crate::loader::SnapshotSource;
use crate::models::{Record, Snapshot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    Target,
    NoProgress,
    Timeout,
    Exhausted,
    Failed(String),
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Target => write!(f, "target reached"),
            Self::NoProgress => write!(f, "no new records"),
            Self::Timeout => write!(f, "load timeout"),
            Self::Exhausted => write!(f, "source exhausted"),
            Self::Failed(msg) => write!(f, "source failed: {msg}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CollectOptions {
    /// Requested number of records; the result never exceeds it.
    pub max_records: usize,
    /// Extra consecutive no-progress cycles tolerated before stopping.
    pub no_progress_retries: usize,
    /// Overwritten with every captured snapshot when set.
    pub debug_dump: Option<PathBuf>,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            max_records: 100,
            no_progress_retries: 0,
            debug_dump: None,
        }
    }
}

/// Result of one collection run.
#[derive(Debug)]
pub struct Collection {
    pub records: Vec<Record>,
    pub stop: StopReason,
    /// Number of snapshots processed.
    pub cycles: usize,
}

/// Insertion-ordered set of records, deduplicated by full equality.
#[derive(Debug, Default)]
pub struct Accumulator {
    records: Vec<Record>,
}

impl Accumulator {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Append the records not already present; returns how many were new.
    // Linear scan per record; target counts are small.
    pub fn absorb(&mut self, batch: Vec<Record>) -> usize {
        let before = self.records.len();
        for record in batch {
            if !self.records.contains(&record) {
                self.records.push(record);
            }
        }
        self.records.len() - before
    }

    pub fn into_records(self, max: usize) -> Vec<Record> {
        let mut records = self.records;
        records.truncate(max);
        records
    }
}

async fn dump_snapshot(snapshot: &Snapshot, path: &Path) {
    if let Err(e) = fs::write(path, snapshot.markup()).await {
        warn!(path = %path.display(), error = %e, "Failed to write snapshot dump");
    }
}

/// Run the collection loop to completion and close `source`.
#[instrument(level = "info", skip_all, fields(max_records = options.max_records))]
pub async fn collect<S: SnapshotSource>(
    mut source: S,
    extractor: &Extractor,
    options: &CollectOptions,
) -> Collection {
    let mut acc = Accumulator::default();
    let mut cycles = 0;
    let mut idle = 0;

    let stop = loop {
        if acc.len() >= options.max_records {
            break StopReason::Target;
        }

        let snapshot = match source.next_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(ScrapeError::LoadTimeout { selector, waited }) => {
                info!(%selector, ?waited, "Feed did not render in time, stopping");
                break StopReason::Timeout;
            }
            Err(ScrapeError::Exhausted) => break StopReason::Exhausted,
            Err(e) => {
                error!(error = %e, collected = acc.len(), "Snapshot capture failed, stopping");
                break StopReason::Failed(e.to_string());
            }
        };
        cycles += 1;

        if let Some(path) = &options.debug_dump {
            dump_snapshot(&snapshot, path).await;
        }

        let extracted = extractor.extract(&snapshot);
        let raw = extracted.len();
        if raw == 0 {
            info!(cycle = cycles, bytes = snapshot.len(), "No posts found in snapshot");
        }

        let added = acc.absorb(extracted);
        info!(cycle = cycles, extracted = raw, added, total = acc.len(), "Cycle complete");

        if added == 0 {
            idle += 1;
            if idle > options.no_progress_retries {
                break StopReason::NoProgress;
            }
            info!(attempt = idle, "No new posts, scrolling again");
        } else {
            idle = 0;
        }
    };

    if let Err(e) = source.close().await {
        warn!(error = %e, "Failed to close snapshot source");
    }

    info!(%stop, cycles, collected = acc.len(), "Collection finished");
    Collection {
        records: acc.into_records(options.max_records),
        stop,
        cycles,
    }
}
