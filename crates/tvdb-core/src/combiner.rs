//! Multi-episode merging
//!
//! A file covering episodes 3-5 is looked up as three single episodes and
//! folded into one result. Only names and overviews are merged; every other
//! field, credits included, comes from the first episode of the span.

use crate::types::MetadataResult;

/// Placed between the names (and overviews) of merged episodes.
pub const SEGMENT_SEPARATOR: &str = " / ";

/// Fold per-episode results, in index order, into a single result.
///
/// Results without metadata keep their slot: their missing name or overview
/// contributes an empty segment. Returns `None` for an empty input.
///
/// # Examples
/// ```
/// use tvdb_core::combiner::combine_results;
/// use tvdb_core::{MappedEpisode, MetadataResult};
///
/// let part = |name: &str| MetadataResult {
///     has_metadata: true,
///     item: MappedEpisode { name: Some(name.to_string()), ..MappedEpisode::default() },
///     ..MetadataResult::default()
/// };
///
/// let combined = combine_results(vec![part("A"), part("B")]).unwrap();
/// assert_eq!(combined.item.name.as_deref(), Some("A / B"));
/// ```
pub fn combine_results(results: Vec<MetadataResult>) -> Option<MetadataResult> {
    let mut results = results.into_iter();
    let mut combined = results.next()?;

    let mut name = combined.item.name.clone().unwrap_or_default();
    let mut overview = combined.item.overview.clone().unwrap_or_default();
    let mut merged_any = false;

    for next in results {
        name.push_str(SEGMENT_SEPARATOR);
        name.push_str(next.item.name.as_deref().unwrap_or_default());
        overview.push_str(SEGMENT_SEPARATOR);
        overview.push_str(next.item.overview.as_deref().unwrap_or_default());
        merged_any = true;
    }

    if merged_any {
        combined.item.name = Some(name);
        combined.item.overview = Some(overview);
    }

    Some(combined)
}
