//! Catalog collaborator interface
//!
//! The provider only needs two things from a catalog: turning a locator into
//! an episode id, and fetching the record behind that id. [`TvdbClient`]
//! implements this over HTTP; tests substitute in-memory catalogs.
//!
//! [`TvdbClient`]: crate::client::TvdbClient

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{DisplayOrder, EpisodeLocator, RawEpisodeRecord};

/// A remote episode catalog.
#[async_trait]
pub trait EpisodeCatalog: Send + Sync {
    /// Returns the name of this catalog, used as the search provider name.
    fn name(&self) -> &str;

    /// Resolves the catalog's episode id for a single-episode locator.
    ///
    /// `Ok(None)` means the catalog has no matching episode.
    async fn resolve_episode_id(
        &self,
        locator: &EpisodeLocator,
        language: &str,
    ) -> Result<Option<String>>;

    /// Fetches the full record of an episode.
    async fn fetch_episode(&self, episode_id: u64, language: &str) -> Result<RawEpisodeRecord>;
}

/// Episode query parameters for `/series/{id}/episodes/query`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpisodeQuery {
    pub first_aired: Option<String>,
    pub aired_season: Option<i32>,
    pub aired_episode: Option<i32>,
    pub dvd_season: Option<i32>,
    pub dvd_episode: Option<i32>,
    pub absolute_number: Option<i32>,
}

impl EpisodeQuery {
    /// Build the query for a locator.
    ///
    /// The display order decides which numbering the locator's index is
    /// matched against. The air date is only used when there is no index.
    pub fn from_locator(locator: &EpisodeLocator) -> Self {
        if locator.index_number.is_none() {
            if let Some(date) = locator.premiere_date {
                return Self {
                    first_aired: Some(date.format("%Y-%m-%d").to_string()),
                    ..Self::default()
                };
            }
        }

        match locator.display_order {
            DisplayOrder::Dvd => Self {
                dvd_season: locator.parent_index_number,
                dvd_episode: locator.index_number,
                ..Self::default()
            },
            DisplayOrder::Absolute => Self {
                absolute_number: locator.index_number,
                ..Self::default()
            },
            DisplayOrder::Aired => Self {
                aired_season: locator.parent_index_number,
                aired_episode: locator.index_number,
                ..Self::default()
            },
        }
    }

    /// Query string pairs for the fields that are set.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let numbers = [
            ("airedSeason", self.aired_season),
            ("airedEpisode", self.aired_episode),
            ("dvdSeason", self.dvd_season),
            ("dvdEpisode", self.dvd_episode),
            ("absoluteNumber", self.absolute_number),
        ];

        let mut pairs: Vec<(&'static str, String)> = numbers
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v.to_string())))
            .collect();

        if let Some(date) = &self.first_aired {
            pairs.push(("firstAired", date.clone()));
        }

        pairs
    }
}
