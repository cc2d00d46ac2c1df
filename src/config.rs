use std::path::PathBuf;
use std::time::Duration;

/// Environment variable that overrides the primary catalog base URL
pub const TARGET_ENV: &str = "TARGET";

pub const DEFAULT_BASE_URL: &str = "https://animepahe.ru";
pub const DEFAULT_RANKING_API_URL: &str = "https://api.jikan.moe/v4";

const AIRING_PAGES: u32 = 5;
const POPULAR_PAGES: u32 = 2;
const MOVIE_PAGES: u32 = 3;

const AIRING_ITEM_DELAY_MS: u64 = 100;
const RANKING_ITEM_DELAY_MS: u64 = 150;
const TITLE_VARIANT_DELAY_MS: u64 = 100;
const POPULAR_PAGE_DELAY_MS: u64 = 200;
const MOVIE_PAGE_DELAY_MS: u64 = 300;
const BETWEEN_SCANS_DELAY_MS: u64 = 1000;

/// Scanner settings. Everything except the base URL is compiled in.
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Primary catalog root, also sent as `Referer`
    pub base_url: String,

    /// Ranking API root (Jikan)
    pub ranking_api_url: String,

    pub airing_pages: u32,
    pub popular_pages: u32,
    pub movie_pages: u32,

    pub pacing: Pacing,

    /// Directory the three collection files are written to
    pub output_dir: PathBuf,
    pub recent_file: String,
    pub popular_file: String,
    pub movies_file: String,

    /// Cookie files produced by the harvest binary
    pub cookies_json: PathBuf,
    pub cookies_txt: PathBuf,
}

/// Fixed delays that bound the outbound request rate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pacing {
    pub airing_item: Duration,
    pub ranking_item: Duration,
    pub title_variant: Duration,
    pub popular_page: Duration,
    pub movie_page: Duration,
    pub between_scans: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            airing_item: Duration::from_millis(AIRING_ITEM_DELAY_MS),
            ranking_item: Duration::from_millis(RANKING_ITEM_DELAY_MS),
            title_variant: Duration::from_millis(TITLE_VARIANT_DELAY_MS),
            popular_page: Duration::from_millis(POPULAR_PAGE_DELAY_MS),
            movie_page: Duration::from_millis(MOVIE_PAGE_DELAY_MS),
            between_scans: Duration::from_millis(BETWEEN_SCANS_DELAY_MS),
        }
    }
}

impl Pacing {
    /// No waits at all, for tests and dry runs
    pub fn none() -> Self {
        Self {
            airing_item: Duration::ZERO,
            ranking_item: Duration::ZERO,
            title_variant: Duration::ZERO,
            popular_page: Duration::ZERO,
            movie_page: Duration::ZERO,
            between_scans: Duration::ZERO,
        }
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            ranking_api_url: DEFAULT_RANKING_API_URL.to_string(),
            airing_pages: AIRING_PAGES,
            popular_pages: POPULAR_PAGES,
            movie_pages: MOVIE_PAGES,
            pacing: Pacing::default(),
            output_dir: PathBuf::from("."),
            recent_file: "recent-anime.json".to_string(),
            popular_file: "popular-anime.json".to_string(),
            movies_file: "top-movies.json".to_string(),
            cookies_json: PathBuf::from("cookies.json"),
            cookies_txt: PathBuf::from("cookies.txt"),
        }
    }
}

impl ScannerConfig {
    /// Defaults plus the `TARGET` base URL override
    pub fn from_env() -> Self {
        Self::default().with_base_url_override(std::env::var(TARGET_ENV).ok())
    }

    fn with_base_url_override(mut self, value: Option<String>) -> Self {
        if let Some(url) = value {
            let trimmed = url.trim().trim_end_matches('/');
            if !trimmed.is_empty() {
                self.base_url = trimmed.to_string();
            }
        }
        self
    }

    pub fn recent_path(&self) -> PathBuf {
        self.output_dir.join(&self.recent_file)
    }

    pub fn popular_path(&self) -> PathBuf {
        self.output_dir.join(&self.popular_file)
    }

    pub fn movies_path(&self) -> PathBuf {
        self.output_dir.join(&self.movies_file)
    }
}
