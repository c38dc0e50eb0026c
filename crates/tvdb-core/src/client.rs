//! HTTP client with rate limiting for TheTVDB v3 API
//!
//! This module provides a rate-limited, token-authenticated client that
//! implements [`EpisodeCatalog`] and retries transient failures with
//! exponential backoff.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::debug;

use crate::catalog::{EpisodeCatalog, EpisodeQuery};
use crate::error::{Result, TvdbError};
use crate::types::{
    EpisodeLocator, RawEpisodeRecord, IMDB_PROVIDER_KEY, TVDB_PROVIDER_KEY, ZAP2IT_PROVIDER_KEY,
};

/// Base URL for TheTVDB v3 API
const TVDB_BASE_URL: &str = "https://api.thetvdb.com";

/// User-Agent sent with every request
const DEFAULT_USER_AGENT: &str = concat!("tvdb-core/", env!("CARGO_PKG_VERSION"));

/// Name reported as the search provider
const CATALOG_NAME: &str = "TheTVDB";

/// Maximum number of retry attempts for transient errors
const MAX_RETRIES: u32 = 3;

/// Rate limiter to control request frequency
///
/// Ensures that requests are spaced at least `min_interval` apart.
pub struct RateLimiter {
    /// Minimum interval between requests
    min_interval: Duration,
    /// Timestamp of the last request
    last_request: Arc<Mutex<Instant>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the specified requests per second
    ///
    /// # Example
    /// ```
    /// use tvdb_core::client::RateLimiter;
    ///
    /// let limiter = RateLimiter::new(4.0);
    /// assert_eq!(limiter.min_interval().as_millis(), 250);
    /// ```
    pub fn new(requests_per_second: f64) -> Self {
        let min_interval = Duration::from_secs_f64(1.0 / requests_per_second);
        let now = Instant::now();
        Self {
            min_interval,
            last_request: Arc::new(Mutex::new(now.checked_sub(min_interval).unwrap_or(now))),
        }
    }

    /// Wait until the minimum interval since the previous request has passed.
    pub async fn acquire(&self) {
        let mut last = self.last_request.lock().await;
        let elapsed = last.elapsed();

        if elapsed < self.min_interval {
            sleep(self.min_interval - elapsed).await;
        }

        *last = Instant::now();
    }

    /// Get the minimum interval between requests
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

/// Configuration for the TheTVDB HTTP client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API key used to obtain a session token (required)
    pub api_key: String,
    /// Base URL (default: https://api.thetvdb.com)
    pub base_url: String,
    /// Maximum requests per second (default: 4.0)
    pub requests_per_second: f64,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
    /// First backoff delay in milliseconds, doubled per retry (default: 1000)
    pub retry_base_delay_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: TVDB_BASE_URL.to_string(),
            requests_per_second: 4.0,
            timeout_secs: 30,
            retry_base_delay_ms: 1000,
        }
    }
}

impl ClientConfig {
    /// Default configuration with the given API key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    apikey: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct DataResponse<T> {
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct IdOnly {
    id: u64,
}

/// HTTP client for TheTVDB with rate limiting and retry logic
///
/// This client automatically:
/// - Logs in with the API key and reuses the session token
/// - Limits request rate to avoid server overload
/// - Retries on transient errors (401 after re-login, 429, 5xx)
pub struct TvdbClient {
    /// Underlying HTTP client
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    /// Session token, filled on first use
    token: Mutex<Option<String>>,
    /// Rate limiter for request throttling
    rate_limiter: RateLimiter,
    retry_base_delay: Duration,
}

impl TvdbClient {
    /// Create a new client
    ///
    /// # Errors
    /// - `TvdbError::NotConfigured` if the API key is empty or the request
    ///   rate is not a positive finite number
    /// - `TvdbError::HttpError` if the HTTP client cannot be created
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(TvdbError::NotConfigured(
                "TheTVDB API key is required".to_string(),
            ));
        }
        if !(config.requests_per_second.is_finite() && config.requests_per_second > 0.0) {
            return Err(TvdbError::NotConfigured(format!(
                "requests_per_second must be positive, got {}",
                config.requests_per_second
            )));
        }

        let client = reqwest::Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            token: Mutex::new(None),
            rate_limiter: RateLimiter::new(config.requests_per_second),
            retry_base_delay: Duration::from_millis(config.retry_base_delay_ms),
        })
    }

    /// Current session token, logging in when there is none.
    async fn token(&self) -> Result<String> {
        let mut token = self.token.lock().await;
        if let Some(existing) = token.as_ref() {
            return Ok(existing.clone());
        }

        let fresh = self.login().await?;
        *token = Some(fresh.clone());
        Ok(fresh)
    }

    async fn invalidate_token(&self) {
        self.token.lock().await.take();
    }

    async fn login(&self) -> Result<String> {
        self.rate_limiter.acquire().await;
        debug!("TVDB login");

        let response = self
            .client
            .post(format!("{}/login", self.base_url))
            .json(&LoginRequest {
                apikey: &self.api_key,
            })
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(TvdbError::Unauthorized);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TvdbError::ServerFault {
                status: status.as_u16(),
                message,
            });
        }

        let login: LoginResponse = response
            .json()
            .await
            .map_err(|e| TvdbError::ParseError(format!("Failed to parse login response: {}", e)))?;
        Ok(login.token)
    }

    /// Fetch and decode a JSON document from an API path.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
        language: &str,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let body = self.get_with_retry(&url, query, language, 0).await?;
        serde_json::from_str(&body)
            .map_err(|e| TvdbError::ParseError(format!("Failed to parse {}: {}", path, e)))
    }

    /// Internal method to fetch with retry logic
    fn get_with_retry<'a>(
        &'a self,
        url: &'a str,
        query: &'a [(&'static str, String)],
        language: &'a str,
        attempt: u32,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            let token = self.token().await?;

            // Wait for rate limiter before making request
            self.rate_limiter.acquire().await;

            let response = self
                .client
                .get(url)
                .query(query)
                .bearer_auth(&token)
                .header(reqwest::header::ACCEPT_LANGUAGE, language)
                .send()
                .await?;
            let status = response.status();

            if status.is_success() {
                return Ok(response.text().await?);
            }

            // Handle 404 - Not Found (no retry)
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(TvdbError::NotFound(url.to_string()));
            }

            // Handle 401 - token expired, log in again
            if status == reqwest::StatusCode::UNAUTHORIZED {
                self.invalidate_token().await;
                if attempt < MAX_RETRIES {
                    return self.get_with_retry(url, query, language, attempt + 1).await;
                }
                return Err(TvdbError::Unauthorized);
            }

            // Handle 429 and 5xx - transient
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                if attempt < MAX_RETRIES {
                    let delay = self.calculate_backoff_delay(attempt);
                    debug!(url, status = status.as_u16(), attempt, "Retrying TVDB request");
                    sleep(delay).await;
                    return self.get_with_retry(url, query, language, attempt + 1).await;
                }
                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    return Err(TvdbError::RateLimited);
                }
            }

            let message = response.text().await.unwrap_or_default();
            Err(TvdbError::ServerFault {
                status: status.as_u16(),
                message,
            })
        })
    }

    /// Calculate exponential backoff delay for retry
    fn calculate_backoff_delay(&self, attempt: u32) -> Duration {
        self.retry_base_delay * 2u32.pow(attempt)
    }

    /// Resolve the numeric series id behind a locator's series identity.
    ///
    /// A `Tvdb` id is used as-is; `Imdb` and `Zap2It` ids are looked up
    /// through the series search endpoint.
    pub async fn resolve_series_id(
        &self,
        locator: &EpisodeLocator,
        language: &str,
    ) -> Result<Option<u64>> {
        if let Some(id) = locator.series_id(TVDB_PROVIDER_KEY) {
            return id
                .parse()
                .map(Some)
                .map_err(|_| TvdbError::InvalidId(id.to_string()));
        }

        let remote_keys = [(IMDB_PROVIDER_KEY, "imdbId"), (ZAP2IT_PROVIDER_KEY, "zap2itId")];
        for (key, param) in remote_keys {
            let Some(remote_id) = locator.series_id(key) else {
                continue;
            };

            debug!(key, remote_id, "TVDB series lookup by remote id");
            let query = [(param, remote_id.to_string())];
            match self
                .get_json::<DataResponse<Vec<IdOnly>>>("/search/series", &query, language)
                .await
            {
                Ok(found) => {
                    if let Some(series) = found.data.unwrap_or_default().first() {
                        return Ok(Some(series.id));
                    }
                }
                Err(TvdbError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }

        Ok(None)
    }

    /// Get a reference to the rate limiter (for testing)
    #[cfg(test)]
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }
}

#[async_trait]
impl EpisodeCatalog for TvdbClient {
    fn name(&self) -> &str {
        CATALOG_NAME
    }

    async fn resolve_episode_id(
        &self,
        locator: &EpisodeLocator,
        language: &str,
    ) -> Result<Option<String>> {
        let Some(series_id) = self.resolve_series_id(locator, language).await? else {
            return Ok(None);
        };

        let query = EpisodeQuery::from_locator(locator);
        debug!(series_id, ?query, "TVDB episode query");

        let path = format!("/series/{}/episodes/query", series_id);
        match self
            .get_json::<DataResponse<Vec<IdOnly>>>(&path, &query.to_query_pairs(), language)
            .await
        {
            Ok(page) => Ok(page
                .data
                .unwrap_or_default()
                .first()
                .map(|episode| episode.id.to_string())),
            Err(TvdbError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn fetch_episode(&self, episode_id: u64, language: &str) -> Result<RawEpisodeRecord> {
        debug!(episode_id, language, "TVDB get episode");

        let path = format!("/episodes/{}", episode_id);
        let response: DataResponse<RawEpisodeRecord> = self.get_json(&path, &[], language).await?;
        response
            .data
            .ok_or_else(|| TvdbError::ParseError(format!("Episode {} has no data", episode_id)))
    }
}
