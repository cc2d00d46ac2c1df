use super::models::{AiringItem, CatalogItem, JikanAnime, RankedEntry};
use crate::http_client::{random_user_agent, FetchError, FetchResponse, Transport};
use crate::metrics::MetricsTracker;
use crate::session::Session;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE, REFERER, USER_AGENT};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Instant;

const CATALOG_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

pub const CATALOG_ENDPOINT: &str = "catalog";
pub const RANKING_ENDPOINT: &str = "ranking";

/// Which slice of the ranking API to page through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingFeed {
    /// Top anime currently airing
    Airing,
    /// Top anime restricted to movies
    Movies,
}

impl RankingFeed {
    fn query(&self) -> &'static str {
        match self {
            RankingFeed::Airing => "filter=airing",
            RankingFeed::Movies => "type=movie",
        }
    }
}

/// Outbound calls to the primary catalog and the ranking API.
///
/// Primary catalog calls carry the session's cookies; ranking calls never
/// do. Non-2xx answers come back as [`FetchError::Status`].
pub struct CatalogClient<T: Transport> {
    transport: T,
    session: Session,
    base_url: String,
    ranking_api_url: String,
    metrics: MetricsTracker,
}

impl<T: Transport> CatalogClient<T> {
    pub fn new(transport: T, session: Session, base_url: &str, ranking_api_url: &str) -> Self {
        Self {
            transport,
            session,
            base_url: base_url.trim_end_matches('/').to_string(),
            ranking_api_url: ranking_api_url.trim_end_matches('/').to_string(),
            metrics: MetricsTracker::new(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn metrics(&self) -> &MetricsTracker {
        &self.metrics
    }

    fn headers(&self, session: Option<&Session>) -> Result<HeaderMap, FetchError> {
        let mut headers = HeaderMap::new();
        match session {
            Some(session) => {
                headers.insert(USER_AGENT, HeaderValue::from_static(CATALOG_USER_AGENT));
                headers.insert(
                    REFERER,
                    HeaderValue::from_str(&self.base_url)
                        .map_err(|e| FetchError::InvalidHeader(e.to_string()))?,
                );
                headers.insert(
                    COOKIE,
                    HeaderValue::from_str(&session.cookie_header())
                        .map_err(|e| FetchError::InvalidHeader(e.to_string()))?,
                );
            }
            None => {
                headers.insert(USER_AGENT, HeaderValue::from_static(random_user_agent()));
            }
        }
        Ok(headers)
    }

    /// GET `url`, authenticated when a session is given.
    /// Anything outside 200..300 is returned as an error.
    pub async fn get(&self, url: &str, session: Option<&Session>) -> Result<FetchResponse, FetchError> {
        let endpoint = if session.is_some() {
            CATALOG_ENDPOINT
        } else {
            RANKING_ENDPOINT
        };
        let headers = self.headers(session)?;

        let start = Instant::now();
        match self.transport.get(url, headers).await {
            Ok(response) if response.is_success() => {
                self.metrics.record_success(endpoint, start.elapsed());
                Ok(response)
            }
            Ok(response) => {
                let err = FetchError::Status {
                    url: url.to_string(),
                    status: response.status,
                };
                self.metrics
                    .record_failure(endpoint, Some(response.status), err.to_string());
                Err(err)
            }
            Err(e) => {
                self.metrics.record_failure(endpoint, None, e.to_string());
                Err(e)
            }
        }
    }

    pub fn airing_url(&self, page: u32) -> String {
        format!("{}/api?m=airing&page={}", self.base_url, page)
    }

    pub fn search_url(&self, query: &str) -> String {
        format!("{}/api?m=search&q={}", self.base_url, urlencoding::encode(query))
    }

    pub fn anime_page_url(&self, session_id: &str) -> String {
        format!("{}/anime/{}", self.base_url, session_id)
    }

    pub fn ranking_url(&self, feed: RankingFeed, page: u32) -> String {
        format!("{}/top/anime?{}&page={}", self.ranking_api_url, feed.query(), page)
    }

    /// One page of the primary catalog's airing feed
    pub async fn airing_page(&self, page: u32) -> Result<Vec<AiringItem>, FetchError> {
        let url = self.airing_url(page);
        let response = self.get(&url, Some(&self.session)).await?;
        parse_data_array(&url, &response.body)
    }

    /// Free-text search of the primary catalog
    pub async fn search(&self, query: &str) -> Result<Vec<CatalogItem>, FetchError> {
        let url = self.search_url(query);
        let response = self.get(&url, Some(&self.session)).await?;
        parse_data_array(&url, &response.body)
    }

    /// MyAnimeList id advertised on the catalog's anime page
    pub async fn lookup_mal_id(&self, session_id: &str) -> Result<Option<String>, FetchError> {
        let url = self.anime_page_url(session_id);
        let response = self.get(&url, Some(&self.session)).await?;
        Ok(extract_mal_id(&response.body))
    }

    /// One page of a ranking feed, unauthenticated
    pub async fn ranking_page(&self, feed: RankingFeed, page: u32) -> Result<Vec<RankedEntry>, FetchError> {
        let url = self.ranking_url(feed, page);
        let response = self.get(&url, None).await?;
        let raw: Vec<JikanAnime> = parse_data_array(&url, &response.body)?;
        Ok(raw.into_iter().map(RankedEntry::from).collect())
    }
}

/// Pull `data` out of a paged JSON body.
///
/// A body without a `data` array is malformed. Individual entries that fail
/// to deserialize are skipped so one bad entry does not cost the page.
pub fn parse_data_array<T: DeserializeOwned>(url: &str, body: &str) -> Result<Vec<T>, FetchError> {
    let json: Value = serde_json::from_str(body)
        .map_err(|e| FetchError::malformed(url, format!("invalid JSON: {}", e)))?;

    let items = match json.get("data") {
        Some(Value::Array(items)) => items,
        Some(_) => return Err(FetchError::malformed(url, "`data` is not an array")),
        None => return Err(FetchError::malformed(url, "missing `data` field")),
    };

    let mut parsed = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match serde_json::from_value::<T>(item.clone()) {
            Ok(value) => parsed.push(value),
            Err(e) => log::warn!("Skipping entry {} from {}: {}", index, url, e),
        }
    }
    Ok(parsed)
}

/// Find `<meta name="myanimelist" content="123">` in an anime page
pub fn extract_mal_id(html: &str) -> Option<String> {
    let re = regex::Regex::new(r#"meta name="myanimelist" content="(\d+)""#).ok()?;
    re.captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}
