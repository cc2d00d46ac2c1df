//! The two catalogs: the site's own API (airing feed, search, anime pages)
//! and the Jikan ranking API.

pub mod client;
pub mod models;

pub use client::{CatalogClient, RankingFeed};
pub use models::{AiringItem, CatalogItem, RankedEntry, ResolvedRecord, SourceLabel};
