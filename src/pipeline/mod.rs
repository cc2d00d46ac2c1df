//! Scans over the two catalogs.
//!
//! Each scan pages through one feed, resolves and merges every entry, then
//! dedups and sorts the records before they are written out as a
//! [`ScanOutput`]. Work is strictly sequential: one request in flight at a
//! time, with fixed pauses between items, pages and scans.

pub mod airing;
pub mod output;
pub mod ranking;

use crate::catalog::{CatalogClient, ResolvedRecord};
use crate::config::ScannerConfig;
use crate::http_client::Transport;
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

pub use output::{write_collection, OutputError};

/// One persisted collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanOutput {
    /// Epoch milliseconds at which the collection was assembled
    pub timestamp: i64,
    pub total: usize,
    pub data: Vec<ResolvedRecord>,
}

impl ScanOutput {
    pub fn new(data: Vec<ResolvedRecord>) -> Self {
        Self {
            timestamp: chrono::Utc::now().timestamp_millis(),
            total: data.len(),
            data,
        }
    }
}

/// What one scan produced and where it went
#[derive(Debug)]
pub struct ScanSummary {
    pub name: &'static str,
    pub path: PathBuf,
    pub total: usize,
    pub error: Option<OutputError>,
}

impl ScanSummary {
    pub fn saved(&self) -> bool {
        self.error.is_none()
    }
}

/// Keep the first record for every session. Records without a session are
/// kept as they are.
pub fn dedup_by_session(records: Vec<ResolvedRecord>) -> Vec<ResolvedRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| match &record.session {
            Some(session) => seen.insert(session.clone()),
            None => true,
        })
        .collect()
}

/// Newest scan first. Stable, so equal timestamps keep scan order.
pub fn sort_by_scanned_at(records: &mut [ResolvedRecord]) {
    records.sort_by(|a, b| b.scanned_at.cmp(&a.scanned_at));
}

fn score_desc(a: &ResolvedRecord, b: &ResolvedRecord) -> Ordering {
    let a = a.score.unwrap_or(0.0);
    let b = b.score.unwrap_or(0.0);
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Highest score first, missing score counted as 0.
pub fn sort_by_score(records: &mut [ResolvedRecord]) {
    records.sort_by(score_desc);
}

/// Highest score first, then best (lowest) rank; unranked entries go last.
pub fn sort_by_score_then_rank(records: &mut [ResolvedRecord]) {
    records.sort_by(|a, b| {
        score_desc(a, b).then_with(|| {
            a.rank
                .unwrap_or(u32::MAX)
                .cmp(&b.rank.unwrap_or(u32::MAX))
        })
    });
}

pub(crate) async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

/// Runs the three scans against one authenticated client.
pub struct Scanner<T: Transport> {
    client: CatalogClient<T>,
    config: ScannerConfig,
}

impl<T: Transport> Scanner<T> {
    pub fn new(client: CatalogClient<T>, config: ScannerConfig) -> Self {
        Self { client, config }
    }

    pub fn client(&self) -> &CatalogClient<T> {
        &self.client
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    fn persist(&self, name: &'static str, path: PathBuf, records: Vec<ResolvedRecord>) -> ScanSummary {
        let total = records.len();
        let error = match write_collection(&path, &ScanOutput::new(records)) {
            Ok(()) => {
                info!("Saved {} {} records to {}", total, name, path.display());
                None
            }
            Err(e) => {
                error!("Failed to save {} records to {}: {}", name, path.display(), e);
                Some(e)
            }
        };
        ScanSummary { name, path, total, error }
    }

    /// Airing, popular, then movies, each written as soon as it finishes.
    /// A failed write is reported in its summary and does not stop the run.
    pub async fn scan_all(&self) -> Vec<ScanSummary> {
        info!("Starting anime scans against {}", self.config.base_url);
        let mut summaries = Vec::with_capacity(3);

        let airing = self.scan_airing().await;
        info!("Airing scan complete: {} records", airing.len());
        summaries.push(self.persist("airing", self.config.recent_path(), airing));
        pause(self.config.pacing.between_scans).await;

        let popular = self.scan_popular().await;
        info!("Popular scan complete: {} records", popular.len());
        summaries.push(self.persist("popular", self.config.popular_path(), popular));
        pause(self.config.pacing.between_scans).await;

        let movies = self.scan_top_movies().await;
        info!("Top movies scan complete: {} records", movies.len());
        summaries.push(self.persist("movie", self.config.movies_path(), movies));

        info!("Files written:");
        for summary in &summaries {
            if summary.saved() {
                info!("  - {} ({} {})", summary.path.display(), summary.total, summary.name);
            }
        }
        self.client.metrics().log_summary();
        summaries
    }
}
