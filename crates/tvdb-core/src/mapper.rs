//! Raw record to host metadata mapping
//!
//! Turns a [`RawEpisodeRecord`] into a [`MetadataResult`], choosing which
//! episode numbering to expose and parsing the credit fields.

use chrono::Datelike;

use crate::error::Result;
use crate::parser::{parse_credits, parse_premiere_date};
use crate::types::{
    DisplayOrder, EpisodeLocator, MappedEpisode, MetadataResult, RawEpisodeRecord, RawNumber,
    IMDB_PROVIDER_KEY, TVDB_PROVIDER_KEY,
};

/// Episode and season number pair exposed to the host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Numbering {
    pub index_number: Option<i32>,
    pub parent_index_number: Option<i32>,
}

/// Pick the first candidate that carries a value, with its field name.
fn first_present<'a>(
    candidates: &[(&'static str, &'a Option<RawNumber>)],
) -> Option<(&'static str, &'a RawNumber)> {
    candidates.iter().find_map(|&(field, value)| {
        value
            .as_ref()
            .filter(|number| !number.is_blank())
            .map(|number| (field, number))
    })
}

fn convert(candidate: Option<(&'static str, &RawNumber)>) -> Result<Option<i32>> {
    candidate
        .map(|(field, number)| number.to_i32(field))
        .transpose()
}

/// Resolve the numbering to expose for `order`.
///
/// Exactly one branch applies, in priority order:
/// 1. `Dvd`: DVD numbers, each falling back to its aired counterpart
/// 2. `Absolute`: the absolute number when present and non-zero; the season is untouched
/// 3. aired episode number present: it replaces the index
/// 4. otherwise aired season present: it replaces the parent index
///
/// Values the record does not supply keep the `seed` numbering.
///
/// # Errors
/// `TvdbError::InvalidNumber` when a selected field holds something other
/// than an integer.
pub fn resolve_numbering(
    order: DisplayOrder,
    record: &RawEpisodeRecord,
    seed: Numbering,
) -> Result<Numbering> {
    let mut numbering = seed;

    match order {
        DisplayOrder::Dvd => {
            let episode = convert(first_present(&[
                ("dvdEpisodeNumber", &record.dvd_episode_number),
                ("airedEpisodeNumber", &record.aired_episode_number),
            ]))?;
            let season = convert(first_present(&[
                ("dvdSeason", &record.dvd_season),
                ("airedSeason", &record.aired_season),
            ]))?;

            numbering.index_number = episode.or(numbering.index_number);
            numbering.parent_index_number = season.or(numbering.parent_index_number);
        }
        DisplayOrder::Absolute => {
            let absolute = convert(first_present(&[("absoluteNumber", &record.absolute_number)]))?;
            if let Some(absolute) = absolute.filter(|n| *n != 0) {
                numbering.index_number = Some(absolute);
            }
        }
        DisplayOrder::Aired => {
            let episode = first_present(&[("airedEpisodeNumber", &record.aired_episode_number)]);
            if let Some(episode) = episode {
                numbering.index_number = convert(Some(episode))?;
            } else if let Some(season) = first_present(&[("airedSeason", &record.aired_season)]) {
                numbering.parent_index_number = convert(Some(season))?;
            }
        }
    }

    Ok(numbering)
}

/// Map a fetched record onto the host schema.
///
/// The result starts from the locator's numbering; the record then fills in
/// names, ratings, dates, provider ids and credits. An unparseable air date
/// leaves the premiere date and production year unset.
///
/// # Errors
/// Propagates `TvdbError::InvalidNumber` from [`resolve_numbering`].
pub fn map_episode(locator: &EpisodeLocator, record: &RawEpisodeRecord) -> Result<MetadataResult> {
    let mut item = MappedEpisode::from_locator(locator);

    item.airs_before_episode_number = record.airs_before_episode;
    item.airs_after_season_number = record.airs_after_season;
    item.airs_before_season_number = record.airs_before_season;
    item.name = record.episode_name.clone();
    item.overview = record.overview.clone();
    item.community_rating = record.site_rating;
    item.official_rating = record.content_rating.clone();

    item.provider_ids
        .insert(TVDB_PROVIDER_KEY.to_string(), record.id.to_string());
    item.provider_ids.insert(
        IMDB_PROVIDER_KEY.to_string(),
        record.imdb_id.clone().unwrap_or_default(),
    );

    let numbering = resolve_numbering(
        locator.display_order,
        record,
        Numbering {
            index_number: item.index_number,
            parent_index_number: item.parent_index_number,
        },
    )?;
    item.index_number = numbering.index_number;
    item.parent_index_number = numbering.parent_index_number;

    if let Some(date) = record.first_aired.as_deref().and_then(parse_premiere_date) {
        item.premiere_date = Some(date);
        item.production_year = Some(date.year());
    }

    item.people = parse_credits(record);

    Ok(MetadataResult {
        has_metadata: true,
        queried_by_id: true,
        result_language: record.language.episode_name.clone(),
        item,
    })
}
