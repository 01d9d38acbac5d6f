//! Sensor feed ingestion
//!
//! `SensorFeedIngestor::ingest` never fails: transport errors, schema
//! mismatches and empty feeds are logged and replaced by a synthetic
//! snapshot with `is_fallback` set and `error` describing the cause.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{info, warn};

use crate::domain::Snapshot;
use crate::error::IngestError;
use crate::fallback;
use crate::feed_parser::parse_feed;
use crate::random::RandomSource;
use crate::snapshot;
use crate::source::{SourceConfig, SourceRequest};
use crate::time::Clock;

/// Default bound on a single feed fetch
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Retrieves the raw delimited feed text
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, IngestError>;
}

/// Production fetcher performing a single HTTP GET
#[derive(Debug, Clone)]
pub struct HttpFeedFetcher {
    client: reqwest::Client,
}

impl HttpFeedFetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(&self, url: &str) -> Result<String, IngestError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::Fetch(format!("HTTP {}", status)));
        }

        Ok(response.text().await?)
    }
}

impl From<reqwest::Error> for IngestError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            IngestError::Fetch("request timed out".to_string())
        } else if err.is_connect() {
            IngestError::Fetch(format!("connection failed: {}", err))
        } else {
            IngestError::Fetch(err.to_string())
        }
    }
}

/// Turns a feed reference into a ready-to-render snapshot
#[derive(Debug, Clone)]
pub struct SensorFeedIngestor<F> {
    source: SourceConfig,
    fetcher: F,
}

impl<F: FeedFetcher> SensorFeedIngestor<F> {
    pub fn new(source: SourceConfig, fetcher: F) -> Self {
        Self { source, fetcher }
    }

    /// Ingest the feed named by `source_ref`
    ///
    /// `"simulation"` yields synthetic data without an error; absent or blank
    /// uses the configured default URL.
    pub async fn ingest(
        &self,
        source_ref: Option<&str>,
        clock: &dyn Clock,
        rng: &dyn RandomSource,
    ) -> Snapshot {
        let url = match self.source.resolve(source_ref) {
            SourceRequest::Simulation => {
                let data = fallback::generate(rng);
                info!(
                    scenario = data.scenario.as_str(),
                    "Simulation requested, generated synthetic snapshot"
                );
                return snapshot::from_fallback(data, None, clock);
            }
            SourceRequest::Fetch(url) => url,
        };

        match self.load(&url, clock).await {
            Ok(snapshot) => {
                info!(
                    url = %url,
                    readings = snapshot.history.len(),
                    "Sensor feed ingested"
                );
                snapshot
            }
            Err(e) => {
                let data = fallback::generate(rng);
                warn!(
                    url = %url,
                    error_code = e.error_code(),
                    error = %e,
                    scenario = data.scenario.as_str(),
                    "Sensor feed unavailable, substituting synthetic snapshot"
                );
                snapshot::from_fallback(data, Some(e.to_string()), clock)
            }
        }
    }

    async fn load(&self, url: &str, clock: &dyn Clock) -> Result<Snapshot, IngestError> {
        let text = self.fetcher.fetch(url).await?;
        let history = parse_feed(&text)?;
        snapshot::from_feed(history, clock)
    }
}
