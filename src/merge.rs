use crate::catalog::{AiringItem, CatalogItem, RankedEntry, ResolvedRecord, SourceLabel};
use chrono::{DateTime, Utc};

/// Values that count as "not provided" when merging. Empty strings and
/// zero numbers fall back to the other catalog.
trait Blank {
    fn is_blank(&self) -> bool;
}

impl Blank for String {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl Blank for u32 {
    fn is_blank(&self) -> bool {
        *self == 0
    }
}

impl Blank for i32 {
    fn is_blank(&self) -> bool {
        *self == 0
    }
}

impl Blank for f64 {
    fn is_blank(&self) -> bool {
        *self == 0.0
    }
}

impl Blank for i64 {
    fn is_blank(&self) -> bool {
        *self == 0
    }
}

fn present<T: Blank>(value: Option<T>) -> Option<T> {
    value.filter(|v| !v.is_blank())
}

fn prefer<T: Blank>(primary: Option<T>, secondary: Option<T>) -> Option<T> {
    present(primary).or(secondary)
}

/// Combine a primary match (if any) with a ranking entry, stamped now.
pub fn merge(primary: Option<&CatalogItem>, secondary: &RankedEntry) -> ResolvedRecord {
    merge_at(primary, secondary, Utc::now())
}

/// [`merge`] with an explicit scan time.
///
/// Shared fields take the primary value unless it is missing or blank.
/// Ranking-only fields pass straight through, and `mal_id` always comes
/// from the ranking entry.
pub fn merge_at(
    primary: Option<&CatalogItem>,
    secondary: &RankedEntry,
    scanned_at: DateTime<Utc>,
) -> ResolvedRecord {
    let p = primary.cloned();
    let source = if primary.is_some() {
        SourceLabel::Primary
    } else {
        SourceLabel::Secondary
    };

    let title = p
        .as_ref()
        .map(|item| item.title.clone())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| secondary.title.clone());

    ResolvedRecord {
        id: present(p.as_ref().and_then(|item| item.id)),
        mal_id: Some(secondary.mal_id.to_string()),
        title,
        kind: prefer(p.as_ref().and_then(|i| i.kind.clone()), secondary.kind.clone()),
        episodes: prefer(p.as_ref().and_then(|i| i.episodes), secondary.episodes),
        status: prefer(p.as_ref().and_then(|i| i.status.clone()), secondary.status.clone()),
        season: prefer(p.as_ref().and_then(|i| i.season.clone()), secondary.season.clone()),
        year: prefer(p.as_ref().and_then(|i| i.year), secondary.year),
        score: prefer(p.as_ref().and_then(|i| i.score), secondary.score),
        poster: prefer(p.as_ref().and_then(|i| i.poster.clone()), secondary.poster.clone()),
        session: present(p.as_ref().map(|i| i.session.clone())),
        slug: present(p.as_ref().and_then(|i| i.slug.clone())),
        synopsis: secondary.synopsis.clone(),
        duration: secondary.duration.clone(),
        rating: secondary.rating.clone(),
        rank: secondary.rank,
        popularity: secondary.popularity,
        favorites: secondary.favorites,
        scored_by: secondary.scored_by,
        latest_episode: None,
        latest_snapshot: None,
        latest_fansub: None,
        last_updated: None,
        scanned_at,
        source,
    }
}

/// Record for an airing feed entry whose catalog item was found by session.
pub fn from_airing(
    item: &CatalogItem,
    airing: &AiringItem,
    mal_id: Option<String>,
    scanned_at: DateTime<Utc>,
) -> ResolvedRecord {
    ResolvedRecord {
        id: item.id,
        mal_id,
        title: item.title.clone(),
        kind: item.kind.clone(),
        episodes: item.episodes,
        status: item.status.clone(),
        season: item.season.clone(),
        year: item.year,
        score: item.score,
        poster: item.poster.clone(),
        session: Some(item.session.clone()),
        slug: item.slug.clone(),
        synopsis: None,
        duration: None,
        rating: None,
        rank: None,
        popularity: None,
        favorites: None,
        scored_by: None,
        latest_episode: airing.episode.clone(),
        latest_snapshot: airing.snapshot.clone(),
        latest_fansub: airing.fansub.clone(),
        last_updated: airing.created_at.clone(),
        scanned_at,
        source: SourceLabel::Primary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked(title: &str, score: f64) -> RankedEntry {
        RankedEntry {
            mal_id: 21,
            title: title.to_string(),
            score: Some(score),
            kind: Some("TV".to_string()),
            episodes: Some(12),
            synopsis: Some("A story.".to_string()),
            rank: Some(40),
            poster: Some("jikan.webp".to_string()),
            ..RankedEntry::default()
        }
    }

    #[test]
    fn test_secondary_only_merge() {
        let record = merge(None, &ranked("Y", 8.1));
        assert_eq!(record.source, SourceLabel::Secondary);
        assert_eq!(record.title, "Y");
        assert_eq!(record.score, Some(8.1));
        assert_eq!(record.mal_id.as_deref(), Some("21"));
        assert!(record.session.is_none());
        assert!(record.id.is_none());
    }

    #[test]
    fn test_primary_fields_win() {
        let mut item = CatalogItem::new("One Piece", "op-session").with_kind("TV");
        item.id = Some(4);
        item.score = Some(8.7);
        item.poster = Some("pahe.jpg".to_string());

        let record = merge(Some(&item), &ranked("ONE PIECE", 8.6));
        assert_eq!(record.source, SourceLabel::Primary);
        assert_eq!(record.title, "One Piece");
        assert_eq!(record.score, Some(8.7));
        assert_eq!(record.poster.as_deref(), Some("pahe.jpg"));
        assert_eq!(record.session.as_deref(), Some("op-session"));
        assert_eq!(record.id, Some(4));
        // ranking-only fields still come through
        assert_eq!(record.synopsis.as_deref(), Some("A story."));
        assert_eq!(record.rank, Some(40));
        assert_eq!(record.episodes, Some(12));
    }

    #[test]
    fn test_blank_primary_values_fall_back() {
        let mut item = CatalogItem::new("", "s1");
        item.score = Some(0.0);
        item.episodes = Some(0);
        item.poster = Some(String::new());

        let record = merge(Some(&item), &ranked("Fallback", 7.5));
        assert_eq!(record.source, SourceLabel::Primary);
        assert_eq!(record.title, "Fallback");
        assert_eq!(record.score, Some(7.5));
        assert_eq!(record.episodes, Some(12));
        assert_eq!(record.poster.as_deref(), Some("jikan.webp"));
    }

    #[test]
    fn test_from_airing_copies_latest_episode() {
        let item = CatalogItem::new("Dandadan", "dd");
        let airing: AiringItem = serde_json::from_str(
            r#"{"anime_title": "Dandadan", "anime_session": "dd", "episode": 7,
                "snapshot": "snap.jpg", "fansub": "SubsPlease", "created_at": "2024-11-14 18:01:02"}"#,
        )
        .unwrap();
        let now = Utc::now();

        let record = from_airing(&item, &airing, Some("57334".to_string()), now);
        assert_eq!(record.source, SourceLabel::Primary);
        assert_eq!(record.session.as_deref(), Some("dd"));
        assert_eq!(record.latest_episode, Some(serde_json::Number::from(7)));
        assert_eq!(record.latest_fansub.as_deref(), Some("SubsPlease"));
        assert_eq!(record.last_updated.as_deref(), Some("2024-11-14 18:01:02"));
        assert_eq!(record.mal_id.as_deref(), Some("57334"));
        assert_eq!(record.scanned_at, now);
    }

    #[test]
    fn test_serialized_shape() {
        let record = merge(None, &ranked("Y", 8.1));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["malid"], "21");
        assert_eq!(json["type"], "TV");
        assert_eq!(json["source"], "secondary");
        assert!(json["session"].is_null());
        assert!(json.get("latest_episode").is_none());
    }
}
