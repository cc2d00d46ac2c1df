use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A search hit from the primary catalog. `session` is its natural key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, rename = "malid")]
    pub mal_id: Option<String>,
    pub title: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub episodes: Option<u32>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub poster: Option<String>,
    pub session: String,
    #[serde(default)]
    pub slug: Option<String>,
}

impl CatalogItem {
    /// Minimal item, mostly for tests and fixtures
    pub fn new(title: impl Into<String>, session: impl Into<String>) -> Self {
        Self {
            id: None,
            mal_id: None,
            title: title.into(),
            kind: None,
            episodes: None,
            status: None,
            season: None,
            year: None,
            score: None,
            poster: None,
            session: session.into(),
            slug: None,
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }
}

/// An entry of the primary catalog's airing feed
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AiringItem {
    pub anime_title: String,
    pub anime_session: String,
    #[serde(default)]
    pub episode: Option<serde_json::Number>,
    #[serde(default)]
    pub snapshot: Option<String>,
    #[serde(default)]
    pub fansub: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Raw ranking API entry, as Jikan returns it
#[derive(Debug, Clone, Deserialize)]
pub struct JikanAnime {
    pub mal_id: u64,
    pub title: String,
    #[serde(default)]
    pub title_english: Option<String>,
    #[serde(default)]
    pub title_japanese: Option<String>,
    #[serde(default)]
    pub title_synonyms: Option<Vec<String>>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub episodes: Option<u32>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub scored_by: Option<u64>,
    #[serde(default)]
    pub rank: Option<u32>,
    #[serde(default)]
    pub popularity: Option<u32>,
    #[serde(default)]
    pub favorites: Option<u64>,
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub images: Option<JikanImages>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JikanImages {
    #[serde(default)]
    pub jpg: Option<JikanImageSet>,
    #[serde(default)]
    pub webp: Option<JikanImageSet>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JikanImageSet {
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub large_image_url: Option<String>,
}

/// Normalized ranking entry
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RankedEntry {
    pub mal_id: u64,
    pub title: String,
    /// English, native, then synonyms, in that order
    pub alternate_titles: Vec<String>,
    pub kind: Option<String>,
    pub episodes: Option<u32>,
    pub status: Option<String>,
    pub season: Option<String>,
    pub year: Option<i32>,
    pub score: Option<f64>,
    pub scored_by: Option<u64>,
    pub rank: Option<u32>,
    pub popularity: Option<u32>,
    pub favorites: Option<u64>,
    pub poster: Option<String>,
    pub synopsis: Option<String>,
    pub duration: Option<String>,
    pub rating: Option<String>,
}

impl RankedEntry {
    /// Title variants to search with: canonical first, blanks and exact
    /// repeats dropped
    pub fn title_variants(&self) -> Vec<&str> {
        let mut variants: Vec<&str> = Vec::new();
        for title in std::iter::once(&self.title).chain(self.alternate_titles.iter()) {
            let title = title.trim();
            if !title.is_empty() && !variants.contains(&title) {
                variants.push(title);
            }
        }
        variants
    }
}

impl From<JikanAnime> for RankedEntry {
    fn from(raw: JikanAnime) -> Self {
        let poster = raw.images.as_ref().and_then(|images| {
            images
                .webp
                .as_ref()
                .and_then(|set| set.large_image_url.clone())
                .or_else(|| images.jpg.as_ref().and_then(|set| set.image_url.clone()))
        });

        let mut alternate_titles = Vec::new();
        alternate_titles.extend(raw.title_english);
        alternate_titles.extend(raw.title_japanese);
        alternate_titles.extend(raw.title_synonyms.unwrap_or_default());

        Self {
            mal_id: raw.mal_id,
            title: raw.title,
            alternate_titles,
            kind: raw.kind,
            episodes: raw.episodes,
            status: raw.status,
            season: raw.season,
            year: raw.year,
            score: raw.score,
            scored_by: raw.scored_by,
            rank: raw.rank,
            popularity: raw.popularity,
            favorites: raw.favorites,
            poster,
            synopsis: raw.synopsis,
            duration: raw.duration,
            rating: raw.rating,
        }
    }
}

/// Which catalog supplied the record's core fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceLabel {
    Primary,
    Secondary,
}

/// One record of an output collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRecord {
    pub id: Option<i64>,
    #[serde(rename = "malid")]
    pub mal_id: Option<String>,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub episodes: Option<u32>,
    pub status: Option<String>,
    pub season: Option<String>,
    pub year: Option<i32>,
    pub score: Option<f64>,
    pub poster: Option<String>,
    pub session: Option<String>,
    pub slug: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synopsis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popularity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorites: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scored_by: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_episode: Option<serde_json::Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_snapshot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_fansub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,

    pub scanned_at: DateTime<Utc>,
    pub source: SourceLabel,
}
