//! Main episode provider API
//!
//! This module ties the catalog, the mapper and the combiner together into
//! the lookup the host calls once per library item.

use std::future::Future;
use std::ops::RangeInclusive;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::catalog::EpisodeCatalog;
use crate::combiner::combine_results;
use crate::error::Result;
use crate::mapper::map_episode;
use crate::types::{EpisodeLocator, MetadataResult, RemoteSearchResult, TVDB_PROVIDER_KEY};

/// Longest episode span looked up episode by episode. Longer spans are
/// treated as a misparsed file name and looked up as their first episode.
pub const MAX_SPAN_EPISODES: i64 = 50;

/// How the episodes of a span are fetched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanFetch {
    /// One episode after another (default)
    #[default]
    Sequential,
    /// All episodes at once; results keep index order
    Concurrent,
}

/// Configuration for the episode provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Language used when the locator has none (default: "en")
    pub default_language: String,
    /// Span fetch strategy (default: sequential)
    pub span_fetch: SpanFetch,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            default_language: "en".to_string(),
            span_fetch: SpanFetch::Sequential,
        }
    }
}

/// Episode metadata provider
///
/// Catalog failures never surface as errors: a missing or unreachable
/// record yields a result with `has_metadata == false`. The only error
/// returned is `TvdbError::InvalidNumber` for malformed numbering data.
///
/// # Example
/// ```no_run
/// use tokio_util::sync::CancellationToken;
/// use tvdb_core::{ClientConfig, EpisodeLocator, EpisodeProvider, TvdbClient};
///
/// # async fn example() -> Result<(), tvdb_core::TvdbError> {
/// let provider = EpisodeProvider::new(TvdbClient::new(ClientConfig::with_api_key("key"))?);
///
/// let mut locator = EpisodeLocator {
///     index_number: Some(5),
///     parent_index_number: Some(1),
///     ..EpisodeLocator::default()
/// };
/// locator.series_provider_ids.insert("Tvdb".into(), "81189".into());
///
/// let result = provider.get_metadata(&locator, &CancellationToken::new()).await?;
/// if result.has_metadata {
///     println!("{:?}", result.item.name);
/// }
/// # Ok(())
/// # }
/// ```
pub struct EpisodeProvider<C> {
    catalog: C,
    config: ProviderConfig,
}

impl<C: EpisodeCatalog> EpisodeProvider<C> {
    /// Create a provider with default configuration.
    pub fn new(catalog: C) -> Self {
        Self::with_config(catalog, ProviderConfig::default())
    }

    /// Create a provider with custom configuration.
    pub fn with_config(catalog: C, config: ProviderConfig) -> Self {
        Self { catalog, config }
    }

    /// The underlying catalog.
    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Whether a locator can be looked up at all.
    ///
    /// It needs a recognized series key and either an episode index or an
    /// air date.
    pub fn is_valid_locator(locator: &EpisodeLocator) -> bool {
        locator.has_series_identity()
            && (locator.index_number.is_some() || locator.premiere_date.is_some())
    }

    /// Look up episode metadata for a library item.
    ///
    /// Invalid locators yield an empty result without contacting the
    /// catalog. Spans are fetched episode by episode and merged.
    ///
    /// # Errors
    /// `TvdbError::InvalidNumber` when a fetched record carries a numbering
    /// field that is not an integer.
    pub async fn get_metadata(
        &self,
        locator: &EpisodeLocator,
        cancel: &CancellationToken,
    ) -> Result<MetadataResult> {
        if !Self::is_valid_locator(locator) {
            debug!(
                name = locator.name.as_deref(),
                "Locator has no usable series id or episode anchor"
            );
            return Ok(MetadataResult::default());
        }

        match span_range(locator) {
            Some(range) => self.get_combined_episode(locator, range, cancel).await,
            None => self.get_episode(locator, cancel).await,
        }
    }

    /// Search results for a locator: one entry when the episode was found.
    pub async fn get_search_results(
        &self,
        locator: &EpisodeLocator,
        cancel: &CancellationToken,
    ) -> Result<Vec<RemoteSearchResult>> {
        if !Self::is_valid_locator(locator) || locator.index_number.is_none() {
            return Ok(Vec::new());
        }

        let result = self.get_episode(locator, cancel).await?;
        if !result.has_metadata {
            return Ok(Vec::new());
        }

        Ok(vec![result.item.to_search_result(self.catalog.name())])
    }

    async fn get_combined_episode(
        &self,
        locator: &EpisodeLocator,
        range: RangeInclusive<i32>,
        cancel: &CancellationToken,
    ) -> Result<MetadataResult> {
        // Each episode gets its own locator copy
        let results = match self.config.span_fetch {
            SpanFetch::Sequential => {
                let mut results = Vec::new();
                for index in range {
                    let part = locator.with_index(index);
                    results.push(self.get_episode(&part, cancel).await?);
                }
                results
            }
            SpanFetch::Concurrent => {
                let parts: Vec<EpisodeLocator> =
                    range.map(|index| locator.with_index(index)).collect();
                join_all(parts.iter().map(|part| self.get_episode(part, cancel)))
                    .await
                    .into_iter()
                    .collect::<Result<Vec<_>>>()?
            }
        };

        Ok(combine_results(results).unwrap_or_else(|| MetadataResult::empty_for(locator)))
    }

    /// Single-episode path: resolve the id, fetch, map.
    async fn get_episode(
        &self,
        locator: &EpisodeLocator,
        cancel: &CancellationToken,
    ) -> Result<MetadataResult> {
        let result = MetadataResult::empty_for(locator);
        let language = self.language_for(locator);
        let series_id = locator.series_id(TVDB_PROVIDER_KEY);

        let resolve = self.catalog.resolve_episode_id(locator, language);
        let resolved = match until_cancelled(cancel, resolve).await {
            Some(resolved) => resolved,
            None => {
                debug!(name = locator.name.as_deref(), "Episode lookup cancelled");
                return Ok(result);
            }
        };

        let episode_id = match resolved {
            Ok(Some(id)) => id,
            Ok(None) => {
                error!(
                    season = locator.parent_index_number,
                    episode = locator.index_number,
                    series_id,
                    name = locator.name.as_deref(),
                    "Episode not found"
                );
                return Ok(result);
            }
            Err(e) => {
                error!(
                    season = locator.parent_index_number,
                    episode = locator.index_number,
                    series_id,
                    name = locator.name.as_deref(),
                    error = %e,
                    "Failed to resolve episode id"
                );
                return Ok(result);
            }
        };

        let numeric_id = match episode_id.trim().parse::<u64>() {
            Ok(id) => id,
            Err(_) => {
                error!(
                    episode_id = %episode_id,
                    series_id,
                    name = locator.name.as_deref(),
                    "Catalog returned a non-numeric episode id"
                );
                return Ok(result);
            }
        };

        let fetch = self.catalog.fetch_episode(numeric_id, language);
        let record = match until_cancelled(cancel, fetch).await {
            Some(Ok(record)) => record,
            Some(Err(e)) => {
                error!(
                    episode_id = numeric_id,
                    series_id,
                    name = locator.name.as_deref(),
                    error = %e,
                    "Failed to retrieve episode"
                );
                return Ok(result);
            }
            None => {
                debug!(episode_id = numeric_id, "Episode fetch cancelled");
                return Ok(result);
            }
        };

        map_episode(locator, &record)
    }

    fn language_for<'a>(&'a self, locator: &'a EpisodeLocator) -> &'a str {
        locator
            .language
            .as_deref()
            .map(str::trim)
            .filter(|language| !language.is_empty())
            .unwrap_or(self.config.default_language.as_str())
    }
}

/// Inclusive index range of a span, `None` for single-episode locators.
fn span_range(locator: &EpisodeLocator) -> Option<RangeInclusive<i32>> {
    let end = locator.index_number_end?;
    let start = locator.index_number?;

    if end < start {
        warn!(
            start,
            end,
            name = locator.name.as_deref(),
            "Episode span ends before it starts, looking up the first episode only"
        );
        return None;
    }

    if i64::from(end) - i64::from(start) >= MAX_SPAN_EPISODES {
        warn!(
            start,
            end,
            name = locator.name.as_deref(),
            "Episode span is too long, looking up the first episode only"
        );
        return None;
    }

    Some(start..=end)
}

/// Run `future` unless `cancel` fires first.
async fn until_cancelled<F: Future>(cancel: &CancellationToken, future: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        output = future => Some(output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use tracing::subscriber::DefaultGuard;
    use tracing_subscriber::fmt::MakeWriter;

    use crate::error::TvdbError;
    use crate::types::{
        DisplayOrder, PersonKind, RawEpisodeRecord, RawNumber, IMDB_PROVIDER_KEY,
    };

    /// In-memory catalog keyed by aired episode number.
    #[derive(Default)]
    struct MockCatalog {
        records: HashMap<i32, RawEpisodeRecord>,
        failing_fetches: HashSet<u64>,
        failing_resolve: bool,
        resolve_calls: AtomicUsize,
        fetch_calls: AtomicUsize,
        seen_languages: Mutex<Vec<String>>,
        fetch_delay: Option<Duration>,
    }

    impl MockCatalog {
        fn with_episode(mut self, episode: i32, name: &str, overview: &str) -> Self {
            let record = RawEpisodeRecord {
                id: 1000 + episode as u64,
                aired_season: Some(RawNumber::Integer(1)),
                aired_episode_number: Some(RawNumber::Integer(i64::from(episode))),
                episode_name: Some(name.to_string()),
                overview: Some(overview.to_string()),
                site_rating: Some(episode as f32),
                directors: vec![format!("Director {}", episode)],
                ..RawEpisodeRecord::default()
            };
            self.records.insert(episode, record);
            self
        }

        fn calls(&self) -> usize {
            self.resolve_calls.load(Ordering::SeqCst) + self.fetch_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl EpisodeCatalog for MockCatalog {
        fn name(&self) -> &str {
            "mock"
        }

        async fn resolve_episode_id(
            &self,
            locator: &EpisodeLocator,
            language: &str,
        ) -> Result<Option<String>> {
            self.resolve_calls.fetch_add(1, Ordering::SeqCst);
            self.seen_languages.lock().unwrap().push(language.to_string());

            if self.failing_resolve {
                return Err(TvdbError::ServerFault {
                    status: 503,
                    message: "unavailable".into(),
                });
            }

            Ok(locator
                .index_number
                .and_then(|index| self.records.get(&index))
                .map(|record| record.id.to_string()))
        }

        async fn fetch_episode(
            &self,
            episode_id: u64,
            _language: &str,
        ) -> Result<RawEpisodeRecord> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);

            if let Some(delay) = self.fetch_delay {
                tokio::time::sleep(delay).await;
            }
            if self.failing_fetches.contains(&episode_id) {
                return Err(TvdbError::ServerFault {
                    status: 500,
                    message: "boom".into(),
                });
            }

            self.records
                .values()
                .find(|record| record.id == episode_id)
                .cloned()
                .ok_or_else(|| TvdbError::NotFound(episode_id.to_string()))
        }
    }

    /// Formatted log output of the current thread.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for LogBuffer {
        type Writer = LogBuffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture_logs() -> (LogBuffer, DefaultGuard) {
        let buffer = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(buffer.clone())
            .with_ansi(false)
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (buffer, guard)
    }

    fn locator(episode: Option<i32>) -> EpisodeLocator {
        let mut locator = EpisodeLocator {
            name: Some("Show S01E05.mkv".into()),
            index_number: episode,
            parent_index_number: Some(1),
            ..EpisodeLocator::default()
        };
        locator
            .series_provider_ids
            .insert(TVDB_PROVIDER_KEY.to_string(), "81189".to_string());
        locator
    }

    fn span(start: i32, end: i32) -> EpisodeLocator {
        EpisodeLocator {
            index_number_end: Some(end),
            ..locator(Some(start))
        }
    }

    fn abc_catalog() -> MockCatalog {
        MockCatalog::default()
            .with_episode(1, "A", "x")
            .with_episode(2, "B", "y")
            .with_episode(3, "C", "z")
    }

    #[test]
    fn test_locator_validation() {
        assert!(EpisodeProvider::<MockCatalog>::is_valid_locator(&locator(Some(1))));
        assert!(!EpisodeProvider::<MockCatalog>::is_valid_locator(&locator(None)));

        let dated = EpisodeLocator {
            premiere_date: NaiveDate::from_ymd_opt(2010, 1, 1),
            ..locator(None)
        };
        assert!(EpisodeProvider::<MockCatalog>::is_valid_locator(&dated));

        let anonymous = EpisodeLocator {
            index_number: Some(1),
            ..EpisodeLocator::default()
        };
        assert!(!EpisodeProvider::<MockCatalog>::is_valid_locator(&anonymous));
    }

    #[tokio::test]
    async fn test_invalid_locator_makes_no_calls() {
        let provider = EpisodeProvider::new(abc_catalog());

        let no_anchor = provider
            .get_metadata(&locator(None), &CancellationToken::new())
            .await
            .unwrap();
        let no_series = provider
            .get_metadata(
                &EpisodeLocator {
                    index_number: Some(1),
                    ..EpisodeLocator::default()
                },
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert!(!no_anchor.has_metadata);
        assert!(!no_series.has_metadata);
        assert_eq!(provider.catalog().calls(), 0);
    }

    #[tokio::test]
    async fn test_single_episode() {
        let catalog = MockCatalog::default().with_episode(5, "Gray Matter", "o");
        let provider = EpisodeProvider::new(catalog);

        let result = provider
            .get_metadata(&locator(Some(5)), &CancellationToken::new())
            .await
            .unwrap();

        assert!(result.has_metadata);
        assert!(result.queried_by_id);
        assert_eq!(result.item.name.as_deref(), Some("Gray Matter"));
        assert_eq!(result.item.index_number, Some(5));
        assert_eq!(result.item.parent_index_number, Some(1));
        assert_eq!(
            result.item.provider_ids.get(TVDB_PROVIDER_KEY).map(String::as_str),
            Some("1005")
        );
        assert_eq!(provider.catalog().resolve_calls.load(Ordering::SeqCst), 1);
        assert_eq!(provider.catalog().fetch_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_not_found_keeps_locator_numbering() {
        let provider = EpisodeProvider::new(abc_catalog());

        let result = provider
            .get_metadata(&locator(Some(9)), &CancellationToken::new())
            .await
            .unwrap();

        assert!(!result.has_metadata);
        assert_eq!(result.item.index_number, Some(9));
        assert_eq!(result.item.parent_index_number, Some(1));
        assert_eq!(provider.catalog().fetch_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fetch_fault_degrades_to_no_metadata() {
        let catalog = MockCatalog {
            failing_fetches: HashSet::from([1002]),
            ..abc_catalog()
        };
        let provider = EpisodeProvider::new(catalog);

        let result = provider
            .get_metadata(&locator(Some(2)), &CancellationToken::new())
            .await
            .unwrap();

        assert!(!result.has_metadata);
        assert_eq!(result.item.index_number, Some(2));
    }

    #[tokio::test]
    async fn test_fetch_fault_logs_attempted_ids() {
        let catalog = MockCatalog {
            failing_fetches: HashSet::from([1002]),
            ..abc_catalog()
        };
        let provider = EpisodeProvider::new(catalog);
        let (logs, _guard) = capture_logs();

        provider
            .get_metadata(&locator(Some(2)), &CancellationToken::new())
            .await
            .unwrap();

        let output = logs.contents();
        assert!(output.contains("Failed to retrieve episode"), "{output}");
        assert!(output.contains("episode_id=1002"), "{output}");
        assert!(output.contains(r#"series_id="81189""#), "{output}");
        assert!(output.contains(r#"name="Show S01E05.mkv""#), "{output}");
    }

    #[tokio::test]
    async fn test_not_found_logs_season_and_episode() {
        let provider = EpisodeProvider::new(abc_catalog());
        let (logs, _guard) = capture_logs();

        provider
            .get_metadata(&locator(Some(9)), &CancellationToken::new())
            .await
            .unwrap();

        let output = logs.contents();
        assert!(output.contains("Episode not found"), "{output}");
        assert!(output.contains("season=1"), "{output}");
        assert!(output.contains("episode=9"), "{output}");
        assert!(output.contains(r#"series_id="81189""#), "{output}");
    }

    #[tokio::test]
    async fn test_resolve_fault_degrades_to_no_metadata() {
        let catalog = MockCatalog {
            failing_resolve: true,
            ..abc_catalog()
        };
        let provider = EpisodeProvider::new(catalog);

        let result = provider
            .get_metadata(&locator(Some(1)), &CancellationToken::new())
            .await
            .unwrap();

        assert!(!result.has_metadata);
        assert_eq!(provider.catalog().fetch_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_number_propagates() {
        let mut catalog = abc_catalog();
        if let Some(record) = catalog.records.get_mut(&1) {
            record.aired_episode_number = Some(RawNumber::Text("one".into()));
        }
        let provider = EpisodeProvider::new(catalog);

        let result = provider
            .get_metadata(&locator(Some(1)), &CancellationToken::new())
            .await;

        assert!(matches!(result, Err(TvdbError::InvalidNumber { .. })));
    }

    #[tokio::test]
    async fn test_combined_span() {
        let provider = EpisodeProvider::new(abc_catalog());

        let result = provider
            .get_metadata(&span(1, 3), &CancellationToken::new())
            .await
            .unwrap();

        assert!(result.has_metadata);
        assert_eq!(result.item.name.as_deref(), Some("A / B / C"));
        assert_eq!(result.item.overview.as_deref(), Some("x / y / z"));
        assert_eq!(result.item.index_number, Some(1));
        assert_eq!(result.item.parent_index_number, Some(1));
        assert_eq!(result.item.index_number_end, Some(3));
        assert_eq!(provider.catalog().fetch_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_combined_span_keeps_first_credits_only() {
        // Known asymmetry: later episodes contribute names and overviews only
        let provider = EpisodeProvider::new(abc_catalog());

        let result = provider
            .get_metadata(&span(1, 3), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.item.people.len(), 1);
        assert_eq!(result.item.people[0].name, "Director 1");
        assert_eq!(result.item.people[0].kind, PersonKind::Director);
        assert_eq!(result.item.community_rating, Some(1.0));
    }

    #[tokio::test]
    async fn test_combined_span_with_missing_episode() {
        let catalog = MockCatalog::default()
            .with_episode(1, "A", "x")
            .with_episode(3, "C", "z");
        let provider = EpisodeProvider::new(catalog);

        let result = provider
            .get_metadata(&span(1, 3), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.item.name.as_deref(), Some("A /  / C"));
        assert_eq!(result.item.overview.as_deref(), Some("x /  / z"));
    }

    #[tokio::test]
    async fn test_combined_span_concurrent_keeps_order() {
        let catalog = MockCatalog {
            fetch_delay: Some(Duration::from_millis(5)),
            ..abc_catalog()
        };
        let config = ProviderConfig {
            span_fetch: SpanFetch::Concurrent,
            ..ProviderConfig::default()
        };
        let provider = EpisodeProvider::with_config(catalog, config);

        let result = provider
            .get_metadata(&span(1, 3), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.item.name.as_deref(), Some("A / B / C"));
        assert_eq!(result.item.index_number, Some(1));
    }

    #[tokio::test]
    async fn test_inverted_span_is_single_lookup() {
        let provider = EpisodeProvider::new(abc_catalog());

        let result = provider
            .get_metadata(&span(3, 1), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.item.name.as_deref(), Some("C"));
        assert_eq!(provider.catalog().resolve_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_overlong_span_is_single_lookup() {
        let config = ProviderConfig {
            span_fetch: SpanFetch::Concurrent,
            ..ProviderConfig::default()
        };
        let provider = EpisodeProvider::with_config(abc_catalog(), config);

        let result = provider
            .get_metadata(&span(1, i32::MAX), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.item.name.as_deref(), Some("A"));
        assert_eq!(provider.catalog().resolve_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_span_at_limit_is_combined() {
        let provider = EpisodeProvider::new(abc_catalog());
        let end = MAX_SPAN_EPISODES as i32;

        let result = provider
            .get_metadata(&span(1, end), &CancellationToken::new())
            .await
            .unwrap();

        assert!(result.item.name.as_deref().unwrap().starts_with("A / B / C / "));
        assert_eq!(result.item.index_number_end, Some(end));
        assert_eq!(
            provider.catalog().resolve_calls.load(Ordering::SeqCst),
            MAX_SPAN_EPISODES as usize
        );
    }

    #[tokio::test]
    async fn test_span_of_one_episode() {
        let provider = EpisodeProvider::new(abc_catalog());

        let result = provider
            .get_metadata(&span(2, 2), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.item.name.as_deref(), Some("B"));
        assert_eq!(result.item.index_number_end, Some(2));
    }

    #[tokio::test]
    async fn test_cancelled_lookup_has_no_metadata() {
        let provider = EpisodeProvider::new(abc_catalog());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = provider.get_metadata(&locator(Some(1)), &cancel).await.unwrap();

        assert!(!result.has_metadata);
        assert_eq!(result.item.index_number, Some(1));
    }

    #[tokio::test]
    async fn test_cancel_during_fetch() {
        let catalog = MockCatalog {
            fetch_delay: Some(Duration::from_secs(30)),
            ..abc_catalog()
        };
        let provider = EpisodeProvider::new(catalog);
        let cancel = CancellationToken::new();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let result = provider.get_metadata(&locator(Some(1)), &cancel).await.unwrap();
        assert!(!result.has_metadata);
        assert_eq!(provider.catalog().fetch_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_language_defaults_and_overrides() {
        let config = ProviderConfig {
            default_language: "de".to_string(),
            ..ProviderConfig::default()
        };
        let provider = EpisodeProvider::with_config(abc_catalog(), config);

        provider
            .get_metadata(&locator(Some(1)), &CancellationToken::new())
            .await
            .unwrap();
        provider
            .get_metadata(
                &EpisodeLocator {
                    language: Some("fr".into()),
                    ..locator(Some(1))
                },
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        let seen = provider.catalog().seen_languages.lock().unwrap().clone();
        assert_eq!(seen, vec!["de".to_string(), "fr".to_string()]);
    }

    #[tokio::test]
    async fn test_dvd_order_flows_through() {
        let mut catalog = abc_catalog();
        if let Some(record) = catalog.records.get_mut(&2) {
            record.dvd_season = Some(RawNumber::Integer(4));
            record.dvd_episode_number = Some(RawNumber::Decimal(7.0));
        }
        let provider = EpisodeProvider::new(catalog);

        let result = provider
            .get_metadata(
                &EpisodeLocator {
                    display_order: DisplayOrder::Dvd,
                    ..locator(Some(2))
                },
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(result.item.index_number, Some(7));
        assert_eq!(result.item.parent_index_number, Some(4));
    }

    #[tokio::test]
    async fn test_search_results() {
        let provider = EpisodeProvider::new(abc_catalog());

        let found = provider
            .get_search_results(&locator(Some(2)), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name.as_deref(), Some("B"));
        assert_eq!(found[0].search_provider_name, "mock");

        let missing = provider
            .get_search_results(&locator(Some(8)), &CancellationToken::new())
            .await
            .unwrap();
        assert!(missing.is_empty());
    }

    #[tokio::test]
    async fn test_search_results_need_index() {
        let provider = EpisodeProvider::new(abc_catalog());
        let mut dated = EpisodeLocator {
            premiere_date: NaiveDate::from_ymd_opt(2010, 1, 1),
            ..locator(None)
        };
        dated.series_provider_ids.clear();
        dated
            .series_provider_ids
            .insert(IMDB_PROVIDER_KEY.to_string(), "tt0903747".to_string());

        let results = provider
            .get_search_results(&dated, &CancellationToken::new())
            .await
            .unwrap();

        assert!(results.is_empty());
        assert_eq!(provider.catalog().calls(), 0);
    }

    #[test]
    fn test_provider_config_from_json() {
        let config: ProviderConfig =
            serde_json::from_str(r#"{"span_fetch": "concurrent"}"#).unwrap();
        assert_eq!(config.span_fetch, SpanFetch::Concurrent);
        assert_eq!(config.default_language, "en");
    }
}
