//! Title matching between the ranking API and the primary catalog.
//!
//! Two titles match when, ignoring case, they are equal or either contains
//! the other. The first matching candidate in search order wins; there is
//! no scoring pass. Callers compensate for missed matches by retrying with
//! other title variants.

use crate::catalog::CatalogItem;

fn normalize(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Equality-or-containment, case-insensitive. Blank titles never match.
pub fn titles_match(candidate: &str, query: &str) -> bool {
    let candidate = normalize(candidate);
    let query = normalize(query);
    if candidate.is_empty() || query.is_empty() {
        return false;
    }
    candidate == query || candidate.contains(&query) || query.contains(&candidate)
}

fn same_kind(item: &CatalogItem, kind: &str) -> bool {
    item.kind
        .as_deref()
        .map(|k| k.eq_ignore_ascii_case(kind))
        .unwrap_or(false)
}

/// Pick the first candidate whose title matches `title`.
///
/// With `prefer_type`, candidates of that type are searched first and the
/// unrestricted search is the fallback.
pub fn resolve<'a>(
    candidates: &'a [CatalogItem],
    title: &str,
    prefer_type: Option<&str>,
) -> Option<&'a CatalogItem> {
    if let Some(kind) = prefer_type {
        let preferred = candidates
            .iter()
            .find(|c| same_kind(c, kind) && titles_match(&c.title, title));
        if preferred.is_some() {
            return preferred;
        }
    }

    candidates.iter().find(|c| titles_match(&c.title, title))
}
