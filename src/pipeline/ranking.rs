use super::{pause, sort_by_score, sort_by_score_then_rank, Scanner};
use crate::catalog::{CatalogItem, RankedEntry, RankingFeed, ResolvedRecord};
use crate::http_client::Transport;
use crate::merge::merge;
use crate::resolver::resolve;
use log::{debug, info, warn};
use std::time::Duration;

const MOVIE_TYPE: &str = "Movie";

impl<T: Transport> Scanner<T> {
    /// Top airing anime from the ranking API, enriched from the catalog
    /// where a title matches.
    pub async fn scan_popular(&self) -> Vec<ResolvedRecord> {
        info!("Scanning popular anime...");
        let mut records = self
            .scan_ranking(
                RankingFeed::Airing,
                self.config.popular_pages,
                None,
                self.config.pacing.popular_page,
            )
            .await;
        sort_by_score(&mut records);
        records
    }

    /// Top movies from the ranking API; catalog matches prefer movie entries.
    pub async fn scan_top_movies(&self) -> Vec<ResolvedRecord> {
        info!("Scanning top movies...");
        let mut records = self
            .scan_ranking(
                RankingFeed::Movies,
                self.config.movie_pages,
                Some(MOVIE_TYPE),
                self.config.pacing.movie_page,
            )
            .await;
        sort_by_score_then_rank(&mut records);
        records
    }

    async fn scan_ranking(
        &self,
        feed: RankingFeed,
        pages: u32,
        prefer_type: Option<&str>,
        page_delay: Duration,
    ) -> Vec<ResolvedRecord> {
        let mut records = Vec::new();

        for page in 1..=pages {
            info!("Scanning ranking page {} ({:?})...", page, feed);
            match self.client.ranking_page(feed, page).await {
                Ok(entries) if entries.is_empty() => {
                    warn!("No data found on ranking page {} ({:?})", page, feed);
                }
                Ok(entries) => {
                    for entry in &entries {
                        let matched = self.find_on_catalog(entry, prefer_type).await;
                        let record = merge(matched.as_ref(), entry);
                        match matched {
                            Some(_) => info!("Found: {} (matched on catalog)", entry.title),
                            None => info!("Found: {} (ranking only)", entry.title),
                        }
                        records.push(record);
                        pause(self.config.pacing.ranking_item).await;
                    }
                }
                Err(e) if e.is_transient() => warn!("Ranking page {} ({:?}) skipped: {}", page, feed, e),
                Err(e) => warn!("No data found on ranking page {} ({:?}): {}", page, feed, e),
            }
            pause(page_delay).await;
        }

        records
    }

    /// Search the catalog with each title variant until one resolves.
    async fn find_on_catalog(&self, entry: &RankedEntry, prefer_type: Option<&str>) -> Option<CatalogItem> {
        let variants = entry.title_variants();
        for (i, title) in variants.iter().enumerate() {
            if i > 0 {
                pause(self.config.pacing.title_variant).await;
            }
            match self.client.search(title).await {
                Ok(candidates) => {
                    if let Some(found) = resolve(&candidates, title, prefer_type) {
                        return Some(found.clone());
                    }
                }
                Err(e) => debug!("Catalog search for {:?} failed: {}", title, e),
            }
        }
        None
    }
}
