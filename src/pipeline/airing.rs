use super::{dedup_by_session, pause, sort_by_scanned_at, Scanner};
use crate::catalog::{AiringItem, ResolvedRecord};
use crate::http_client::{FetchError, Transport};
use crate::merge::from_airing;
use chrono::Utc;
use log::{debug, info, warn};

impl<T: Transport> Scanner<T> {
    /// Page through the airing feed and resolve each entry to its catalog
    /// item by session. Entries that cannot be resolved are skipped.
    pub async fn scan_airing(&self) -> Vec<ResolvedRecord> {
        info!("Scanning airing anime...");
        let mut records = Vec::new();

        for page in 1..=self.config.airing_pages {
            info!("Scanning airing page {}...", page);
            let items = match self.client.airing_page(page).await {
                Ok(items) => items,
                Err(e) if e.is_transient() => {
                    warn!("Airing page {} skipped: {}", page, e);
                    continue;
                }
                Err(e) => {
                    warn!("No data found on airing page {}: {}", page, e);
                    continue;
                }
            };
            if items.is_empty() {
                warn!("No data found on airing page {}", page);
                continue;
            }

            for item in &items {
                match self.resolve_airing(item).await {
                    Ok(Some(record)) => {
                        info!("Found: {} (matched on catalog)", item.anime_title);
                        records.push(record);
                    }
                    Ok(None) => debug!("No catalog entry with session {} for {}", item.anime_session, item.anime_title),
                    Err(e) => warn!("Error processing {}: {}", item.anime_title, e),
                }
                pause(self.config.pacing.airing_item).await;
            }
        }

        let mut records = dedup_by_session(records);
        sort_by_scanned_at(&mut records);
        records
    }

    async fn resolve_airing(&self, item: &AiringItem) -> Result<Option<ResolvedRecord>, FetchError> {
        let candidates = self.client.search(&item.anime_title).await?;
        let Some(matched) = candidates.iter().find(|c| c.session == item.anime_session) else {
            return Ok(None);
        };

        let mal_id = match self.client.lookup_mal_id(&matched.session).await {
            Ok(id) => id,
            Err(e) => {
                warn!("Failed to get MAL id for session {}: {}", matched.session, e);
                None
            }
        };

        Ok(Some(from_airing(matched, item, mal_id, Utc::now())))
    }
}
