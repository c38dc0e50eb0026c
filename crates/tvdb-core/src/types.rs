//! Data types for the TVDB episode provider
//!
//! This module contains the lookup key handed in by the host, the raw record
//! returned by the catalog, and the mapped result handed back to the host.
//! All types implement Serialize and Deserialize for JSON compatibility.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, TvdbError};

/// Provider id key for TheTVDB identifiers
pub const TVDB_PROVIDER_KEY: &str = "Tvdb";

/// Provider id key for IMDb identifiers
pub const IMDB_PROVIDER_KEY: &str = "Imdb";

/// Provider id key for Zap2It identifiers
pub const ZAP2IT_PROVIDER_KEY: &str = "Zap2It";

/// Series keys that identify a show on TheTVDB, directly or via lookup
pub const RECOGNIZED_SERIES_KEYS: [&str; 3] =
    [TVDB_PROVIDER_KEY, IMDB_PROVIDER_KEY, ZAP2IT_PROVIDER_KEY];

/// Episode numbering scheme requested by the host library
///
/// Parsed case-insensitively; anything other than `dvd` or `absolute`
/// falls back to aired order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DisplayOrder {
    /// Broadcast order (the default)
    #[default]
    Aired,
    /// Order of the DVD release
    Dvd,
    /// Continuous numbering across seasons
    Absolute,
}

impl DisplayOrder {
    /// Interpret a host display-order preference string.
    ///
    /// # Examples
    /// ```
    /// use tvdb_core::DisplayOrder;
    ///
    /// assert_eq!(DisplayOrder::from_preference("DVD"), DisplayOrder::Dvd);
    /// assert_eq!(DisplayOrder::from_preference("absolute"), DisplayOrder::Absolute);
    /// assert_eq!(DisplayOrder::from_preference(""), DisplayOrder::Aired);
    /// ```
    pub fn from_preference(preference: &str) -> Self {
        let preference = preference.trim();
        if preference.eq_ignore_ascii_case("dvd") {
            Self::Dvd
        } else if preference.eq_ignore_ascii_case("absolute") {
            Self::Absolute
        } else {
            Self::Aired
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aired => "aired",
            Self::Dvd => "dvd",
            Self::Absolute => "absolute",
        }
    }
}

impl FromStr for DisplayOrder {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from_preference(s))
    }
}

impl From<String> for DisplayOrder {
    fn from(value: String) -> Self {
        Self::from_preference(&value)
    }
}

impl From<DisplayOrder> for String {
    fn from(value: DisplayOrder) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for DisplayOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lookup key identifying which episode to fetch
///
/// A locator with `index_number_end` set describes a file spanning several
/// consecutive episodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EpisodeLocator {
    /// Display name of the item, used for log correlation only
    pub name: Option<String>,
    /// Series identity as catalog name -> id (e.g. "Tvdb" -> "81189")
    pub series_provider_ids: BTreeMap<String, String>,
    /// Episode number
    pub index_number: Option<i32>,
    /// Season number
    pub parent_index_number: Option<i32>,
    /// Last episode number of a multi-episode span
    pub index_number_end: Option<i32>,
    /// Air date, used instead of numbering when present
    pub premiere_date: Option<NaiveDate>,
    /// Requested numbering scheme
    pub display_order: DisplayOrder,
    /// Content language tag (e.g. "en")
    pub language: Option<String>,
}

impl EpisodeLocator {
    /// Look up a non-empty series id by catalog name, ignoring key case.
    pub fn series_id(&self, key: &str) -> Option<&str> {
        self.series_provider_ids
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Whether the series identity carries at least one recognized key.
    pub fn has_series_identity(&self) -> bool {
        RECOGNIZED_SERIES_KEYS
            .iter()
            .any(|key| self.series_id(key).is_some())
    }

    /// Copy of this locator pointing at a single episode of a span.
    pub fn with_index(&self, index_number: i32) -> Self {
        Self {
            index_number: Some(index_number),
            ..self.clone()
        }
    }
}

/// Numbering field as delivered by the catalog
///
/// TheTVDB sends integers for most numbers, decimals for DVD episode
/// numbers (`5.0`) and occasionally strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Integer(i64),
    Decimal(f64),
    Text(String),
}

impl RawNumber {
    /// Whether the value carries no data (blank text).
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(text) if text.trim().is_empty())
    }

    /// Convert to an integer, rounding decimals half-to-even.
    ///
    /// # Errors
    /// `TvdbError::InvalidNumber` naming `field` when the value is not numeric
    /// or does not fit an `i32`.
    ///
    /// # Examples
    /// ```
    /// use tvdb_core::RawNumber;
    ///
    /// assert_eq!(RawNumber::Decimal(5.0).to_i32("dvdEpisodeNumber").unwrap(), 5);
    /// assert_eq!(RawNumber::Text(" 12 ".into()).to_i32("airedSeason").unwrap(), 12);
    /// assert!(RawNumber::Text("twelve".into()).to_i32("airedSeason").is_err());
    /// ```
    pub fn to_i32(&self, field: &'static str) -> Result<i32> {
        let converted = match self {
            Self::Integer(value) => i32::try_from(*value).ok(),
            Self::Decimal(value) => decimal_to_i32(*value),
            Self::Text(text) => {
                let text = text.trim();
                text.parse::<i32>()
                    .ok()
                    .or_else(|| text.parse::<f64>().ok().and_then(decimal_to_i32))
            }
        };

        converted.ok_or_else(|| TvdbError::InvalidNumber {
            field,
            value: self.to_string(),
        })
    }
}

fn decimal_to_i32(value: f64) -> Option<i32> {
    if !value.is_finite() {
        return None;
    }
    let rounded = value.round_ties_even();
    if rounded < f64::from(i32::MIN) || rounded > f64::from(i32::MAX) {
        return None;
    }
    Some(rounded as i32)
}

impl fmt::Display for RawNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{}", value),
            Self::Decimal(value) => write!(f, "{}", value),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// Language tags attached to translated episode fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EpisodeLanguage {
    pub episode_name: Option<String>,
    pub overview: Option<String>,
}

/// Unmapped episode record as returned by `GET /episodes/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawEpisodeRecord {
    /// Catalog episode id
    pub id: u64,
    pub series_id: Option<u64>,
    pub aired_season: Option<RawNumber>,
    pub aired_episode_number: Option<RawNumber>,
    pub dvd_season: Option<RawNumber>,
    pub dvd_episode_number: Option<RawNumber>,
    pub absolute_number: Option<RawNumber>,
    pub airs_after_season: Option<i32>,
    pub airs_before_season: Option<i32>,
    pub airs_before_episode: Option<i32>,
    pub episode_name: Option<String>,
    pub overview: Option<String>,
    /// Air date exactly as sent, usually `YYYY-MM-DD`
    pub first_aired: Option<String>,
    pub content_rating: Option<String>,
    pub site_rating: Option<f32>,
    #[serde(deserialize_with = "null_as_default")]
    pub directors: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub writers: Vec<String>,
    /// Raw guest star strings; order matters for credit parsing
    #[serde(deserialize_with = "null_as_default")]
    pub guest_stars: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub language: EpisodeLanguage,
    pub imdb_id: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Role category of a credited person
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersonKind {
    Director,
    Writer,
    GuestStar,
}

/// A person credited on an episode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonCredit {
    pub name: String,
    pub kind: PersonKind,
    /// Character names for guest stars; empty otherwise
    pub role: String,
}

impl PersonCredit {
    /// Create a credit with an empty role
    pub fn new(name: impl Into<String>, kind: PersonKind) -> Self {
        Self {
            name: name.into(),
            kind,
            role: String::new(),
        }
    }

    /// Create a credit carrying a role text
    pub fn with_role(name: impl Into<String>, kind: PersonKind, role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            role: role.into(),
        }
    }
}

/// Episode metadata in the host library's schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MappedEpisode {
    pub index_number: Option<i32>,
    pub parent_index_number: Option<i32>,
    pub index_number_end: Option<i32>,
    pub airs_before_season_number: Option<i32>,
    pub airs_after_season_number: Option<i32>,
    pub airs_before_episode_number: Option<i32>,
    pub name: Option<String>,
    pub overview: Option<String>,
    /// Content rating (e.g. "TV-14")
    pub official_rating: Option<String>,
    pub community_rating: Option<f32>,
    pub premiere_date: Option<DateTime<Utc>>,
    pub production_year: Option<i32>,
    /// Catalog name -> id
    pub provider_ids: BTreeMap<String, String>,
    /// Directors, then guest stars, then writers
    pub people: Vec<PersonCredit>,
}

impl MappedEpisode {
    /// Seed an episode with the numbering the host already knows.
    pub fn from_locator(locator: &EpisodeLocator) -> Self {
        Self {
            index_number: locator.index_number,
            parent_index_number: locator.parent_index_number,
            index_number_end: locator.index_number_end,
            ..Self::default()
        }
    }

    /// Project this episode into a search result entry.
    pub fn to_search_result(&self, provider_name: &str) -> RemoteSearchResult {
        RemoteSearchResult {
            name: self.name.clone(),
            index_number: self.index_number,
            parent_index_number: self.parent_index_number,
            index_number_end: self.index_number_end,
            premiere_date: self.premiere_date,
            production_year: self.production_year,
            provider_ids: self.provider_ids.clone(),
            search_provider_name: provider_name.to_string(),
        }
    }
}

/// Outcome of a metadata lookup handed to the host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataResult {
    /// Whether the catalog supplied a record
    pub has_metadata: bool,
    /// Always true for lookups made by this provider
    pub queried_by_id: bool,
    /// Language of the episode name
    pub result_language: Option<String>,
    pub item: MappedEpisode,
}

impl MetadataResult {
    /// A no-metadata result still carrying the locator's numbering.
    pub fn empty_for(locator: &EpisodeLocator) -> Self {
        Self {
            has_metadata: false,
            queried_by_id: true,
            result_language: None,
            item: MappedEpisode::from_locator(locator),
        }
    }
}

/// Search result entry for an episode lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteSearchResult {
    pub name: Option<String>,
    pub index_number: Option<i32>,
    pub parent_index_number: Option<i32>,
    pub index_number_end: Option<i32>,
    pub premiere_date: Option<DateTime<Utc>>,
    pub production_year: Option<i32>,
    pub provider_ids: BTreeMap<String, String>,
    /// Name of the catalog that produced the result
    pub search_provider_name: String,
}
