//! Citation index API client.
//!
//! Looks up the talks that cite a scripture passage on the third-party
//! citation index. The index is slow, so requests are spaced out by a
//! minimum interval and every result is meant to be cached by the caller.
//!
//! ### Endpoint
//!
//! - `GET {base_url}/citations/{book_id}/{chapter}?verses={verse_spec}`
//! - `200` with a JSON list of talks (or `{"talks": [...]}`)
//! - `404` means the passage has no citations
//! - `429` is reported as [`CitationApiError::RateLimited`]

pub mod error;
pub mod response;

pub use error::CitationApiError;
pub use response::CitationPayload;

use async_trait::async_trait;
use citecache_core::{AppConfig, CitationFetcher, CitationKey, FetchError, TalkRef};
use reqwest::{StatusCode, header};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use url::Url;

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "citecache/0.1";

/// Default minimum interval between upstream requests.
const DEFAULT_MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(250);

/// Citation index client configuration.
#[derive(Debug, Clone)]
pub struct CitationClientConfig {
    /// Base URL of the citation index API.
    pub base_url: String,
    /// Request timeout (default: 60s). The resolver applies its own,
    /// shorter bound on the live path.
    pub timeout: Duration,
    /// User-agent string (default: citecache/0.x).
    pub user_agent: String,
    /// Minimum spacing between requests.
    pub min_request_interval: Duration,
}

impl Default for CitationClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            min_request_interval: DEFAULT_MIN_REQUEST_INTERVAL,
        }
    }
}

impl CitationClientConfig {
    /// Build from application configuration.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, CitationApiError> {
        let base_url = config
            .require_upstream_base_url()
            .map_err(|_| CitationApiError::MissingBaseUrl)?
            .to_string();

        Ok(Self {
            base_url,
            timeout: config.refresh_timeout(),
            user_agent: config.user_agent.clone(),
            min_request_interval: config.min_request_interval(),
        })
    }
}

/// Rate limiter to enforce request intervals.
#[derive(Debug)]
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self { last_request: Mutex::new(None), min_interval }
    }

    /// Wait until the next request is allowed.
    async fn acquire(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    /// Take a slot only if one is free right now. Never waits behind a
    /// pending `acquire`.
    fn try_acquire(&self) -> bool {
        let Ok(mut last) = self.last_request.try_lock() else {
            return false;
        };
        if last.is_some_and(|prev| prev.elapsed() < self.min_interval) {
            return false;
        }
        *last = Some(Instant::now());
        true
    }
}

/// Citation index API client.
#[derive(Debug, Clone)]
pub struct CitationClient {
    http: reqwest::Client,
    base_url: Url,
    config: CitationClientConfig,
    rate_limiter: Arc<RateLimiter>,
}

impl CitationClient {
    /// Create a new client with the given configuration.
    pub fn new(config: CitationClientConfig) -> Result<Self, CitationApiError> {
        if config.base_url.trim().is_empty() {
            return Err(CitationApiError::MissingBaseUrl);
        }

        let mut base_url =
            Url::parse(config.base_url.trim()).map_err(|e| CitationApiError::InvalidBaseUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(CitationApiError::InvalidBaseUrl(config.base_url.clone()));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| CitationApiError::Network(Arc::new(e)))?;

        let rate_limiter = Arc::new(RateLimiter::new(config.min_request_interval));
        Ok(Self { http, base_url, config, rate_limiter })
    }

    /// Create a client from application configuration.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, CitationApiError> {
        Self::new(CitationClientConfig::from_app_config(config)?)
    }

    pub fn config(&self) -> &CitationClientConfig {
        &self.config
    }

    /// URL for a lookup.
    pub fn endpoint(&self, key: &CitationKey) -> Result<Url, CitationApiError> {
        let mut url = self
            .base_url
            .join(&format!("citations/{}/{}", key.book_id, key.chapter))
            .map_err(|e| CitationApiError::InvalidBaseUrl(e.to_string()))?;
        url.query_pairs_mut().append_pair("verses", &key.verse_spec);
        Ok(url)
    }

    /// Fetch the talks citing a passage, in upstream order.
    pub async fn lookup(&self, key: &CitationKey) -> Result<Vec<TalkRef>, CitationApiError> {
        let url = self.endpoint(key)?;
        self.rate_limiter.acquire().await;
        self.send(key, url).await
    }

    /// Like [`lookup`](Self::lookup), but returns `Ok(None)` instead of
    /// waiting when the rate limiter has no free slot.
    pub async fn try_lookup(&self, key: &CitationKey) -> Result<Option<Vec<TalkRef>>, CitationApiError> {
        let url = self.endpoint(key)?;
        if !self.rate_limiter.try_acquire() {
            return Ok(None);
        }
        self.send(key, url).await.map(Some)
    }

    async fn send(&self, key: &CitationKey, url: Url) -> Result<Vec<TalkRef>, CitationApiError> {
        let start = Instant::now();
        tracing::debug!(%key, "querying citation index");

        let http_response = self
            .http
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = http_response.status();
        tracing::debug!(%key, %status, "citation index response");

        if status == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(CitationApiError::RateLimited);
        }

        if status.is_client_error() || status.is_server_error() {
            return Err(CitationApiError::HttpError { status: status.as_u16() });
        }

        let bytes = http_response.bytes().await?;
        let talks = CitationPayload::parse(&bytes)?;

        tracing::debug!(%key, talks = talks.len(), elapsed_ms = start.elapsed().as_millis() as u64, "lookup completed");

        Ok(talks)
    }
}

#[async_trait]
impl CitationFetcher for CitationClient {
    async fn fetch_citations(&self, key: &CitationKey) -> Result<Vec<TalkRef>, FetchError> {
        self.lookup(key).await.map_err(FetchError::from)
    }

    async fn refresh_citations(&self, key: &CitationKey) -> Result<Vec<TalkRef>, FetchError> {
        match self.try_lookup(key).await {
            Ok(Some(talks)) => Ok(talks),
            Ok(None) => Err(FetchError::Throttled),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        extract::{Path, Query},
        http::StatusCode as AxumStatus,
        routing::get,
    };
    use chrono::Utc;
    use citecache_core::{CacheDb, CitationService, CitationSource, ResolverConfig};
    use serde_json::json;
    use std::collections::HashMap;

    async fn spawn_upstream(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client(base_url: String) -> CitationClient {
        CitationClient::new(CitationClientConfig {
            base_url,
            timeout: Duration::from_secs(2),
            min_request_interval: Duration::ZERO,
            ..Default::default()
        })
        .unwrap()
    }

    fn key() -> CitationKey {
        CitationKey::new(205, 3, "7").unwrap()
    }

    #[test]
    fn test_client_new_missing_base_url() {
        let result = CitationClient::new(CitationClientConfig::default());
        assert!(matches!(result, Err(CitationApiError::MissingBaseUrl)));
    }

    #[test]
    fn test_client_new_invalid_base_url() {
        let config = CitationClientConfig { base_url: "not a url".into(), ..Default::default() };
        assert!(matches!(CitationClient::new(config), Err(CitationApiError::InvalidBaseUrl(_))));
    }

    #[test]
    fn test_from_app_config_requires_base_url() {
        let config = AppConfig::default();
        assert!(matches!(CitationClient::from_app_config(&config), Err(CitationApiError::MissingBaseUrl)));

        let config = AppConfig { upstream_base_url: Some("https://index.test/api".into()), ..Default::default() };
        let client = CitationClient::from_app_config(&config).unwrap();
        assert_eq!(client.config().timeout, config.refresh_timeout());
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = client("https://index.test/api/v1".into());
        let url = client.endpoint(&CitationKey::new(140, 5, "1-2,4").unwrap()).unwrap();
        assert_eq!(url.as_str(), "https://index.test/api/v1/citations/140/5?verses=1-2%2C4");
    }

    #[tokio::test]
    async fn test_lookup_returns_talks_in_order() {
        let app = Router::new().route(
            "/citations/{book}/{chapter}",
            get(|Path((book, chapter)): Path<(i64, u32)>, Query(q): Query<HashMap<String, String>>| async move {
                Json(json!([
                    {"talkId": "t1", "book": book, "chapter": chapter, "verses": q.get("verses")},
                    {"talkId": "t2"}
                ]))
            }),
        );
        let client = client(spawn_upstream(app).await);

        let talks = client.lookup(&key()).await.unwrap();
        assert_eq!(talks.len(), 2);
        assert_eq!(talks[0], json!({"talkId": "t1", "book": 205, "chapter": 3, "verses": "7"}));
        assert_eq!(talks[1]["talkId"], "t2");
    }

    #[tokio::test]
    async fn test_lookup_not_found_is_empty() {
        let client = client(spawn_upstream(Router::new()).await);
        assert!(client.lookup(&key()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_lookup_status_errors() {
        let app = Router::new()
            .route("/citations/205/3", get(|| async { AxumStatus::TOO_MANY_REQUESTS }))
            .route("/citations/205/4", get(|| async { AxumStatus::BAD_GATEWAY }));
        let client = client(spawn_upstream(app).await);

        let err = client.lookup(&key()).await.unwrap_err();
        assert!(matches!(err, CitationApiError::RateLimited));

        let err = client.lookup(&CitationKey::new(205, 4, "1").unwrap()).await.unwrap_err();
        assert!(matches!(err, CitationApiError::HttpError { status: 502 }));
    }

    #[tokio::test]
    async fn test_lookup_timeout_maps_to_fetch_timeout() {
        let app = Router::new().route(
            "/citations/{book}/{chapter}",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!([]))
            }),
        );
        let base_url = spawn_upstream(app).await;
        let client = CitationClient::new(CitationClientConfig {
            base_url,
            timeout: Duration::from_millis(100),
            min_request_interval: Duration::ZERO,
            ..Default::default()
        })
        .unwrap();

        let err = client.fetch_citations(&key()).await.unwrap_err();
        assert!(matches!(err, FetchError::Timeout));
    }

    #[tokio::test]
    async fn test_rate_limiter_try_acquire_never_waits() {
        let limiter = RateLimiter::new(Duration::from_secs(60));
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());

        let limiter = RateLimiter::new(Duration::ZERO);
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
    }

    #[tokio::test]
    async fn test_refresh_is_throttled_instead_of_queued() {
        let app = Router::new().route("/citations/{book}/{chapter}", get(|| async { Json(json!([{"talkId": "t1"}])) }));
        let client = CitationClient::new(CitationClientConfig {
            base_url: spawn_upstream(app).await,
            timeout: Duration::from_secs(2),
            min_request_interval: Duration::from_secs(60),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(client.refresh_citations(&key()).await.unwrap().len(), 1);
        let err = client.refresh_citations(&key()).await.unwrap_err();
        assert!(matches!(err, FetchError::Throttled));
    }

    #[tokio::test]
    async fn test_stale_refresh_burst_does_not_delay_live_miss() {
        let app = Router::new().route("/citations/{book}/{chapter}", get(|| async { Json(json!([{"talkId": "new"}])) }));
        let client = CitationClient::new(CitationClientConfig {
            base_url: spawn_upstream(app).await,
            timeout: Duration::from_secs(2),
            min_request_interval: Duration::from_millis(250),
            ..Default::default()
        })
        .unwrap();

        let db = CacheDb::open_in_memory().await.unwrap();
        let config = ResolverConfig { live_timeout: Duration::from_secs(2), ..Default::default() };
        let service = CitationService::new(db.clone(), Arc::new(client), config);

        let stale_at = Utc::now() - chrono::Duration::hours(48);
        for chapter in 1..=40 {
            let key = CitationKey::new(205, chapter, "1").unwrap();
            db.upsert_citation(&key, &[json!({"talkId": "old"})], stale_at).await.unwrap();
        }
        for chapter in 1..=40 {
            let resolved = service.resolve_citations(205, chapter, "1").await.unwrap();
            assert_eq!(resolved.source, CitationSource::CacheStale);
        }

        let start = Instant::now();
        let resolved = service.resolve_citations(206, 1, "1").await.unwrap();
        assert_eq!(resolved.source, CitationSource::Live);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_rate_limiter_spaces_requests() {
        let limiter = RateLimiter::new(Duration::from_millis(50));
        let start = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(50));
    }
}
