use lambda_http::{Body, Request, RequestExt, Response};
use serde::Serialize;
use tracing::info;

use crate::error::{ApiError, ValidationError};
use npk_feed::{
    recommend, Clock, FeedFetcher, RandomSource, Recommendation, SensorFeedIngestor, StatusSet,
    SIMULATION_SENTINEL,
};

/// Longest accepted `source` query parameter
pub const MAX_SOURCE_LENGTH: usize = 2048;

/// Response payload for GET /npk/recommendations
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsResponse {
    /// True when the advice is based on synthetic data
    pub is_fallback: bool,
    pub status: StatusSet,
    /// Most urgent first; empty when every field is optimal
    pub recommendations: Vec<Recommendation>,
}

/// Handle GET /npk requests
///
/// Runs the ingestor for the optional `source` query parameter and returns
/// the snapshot. Ingestion failures come back as fallback snapshots, so the
/// only error path is an invalid parameter.
pub async fn handle_npk<F: FeedFetcher>(
    event: &Request,
    request_id: &str,
    ingestor: &SensorFeedIngestor<F>,
    clock: &dyn Clock,
    rng: &dyn RandomSource,
) -> Result<Response<Body>, ApiError> {
    let source = source_param(event)?;

    let snapshot = ingestor.ingest(source.as_deref(), clock, rng).await;

    info!(
        request_id = %request_id,
        is_fallback = snapshot.is_fallback,
        readings = snapshot.history.len(),
        "NPK snapshot ready"
    );

    json_response(&snapshot)
}

/// Handle GET /npk/recommendations requests
pub async fn handle_recommendations<F: FeedFetcher>(
    event: &Request,
    request_id: &str,
    ingestor: &SensorFeedIngestor<F>,
    clock: &dyn Clock,
    rng: &dyn RandomSource,
) -> Result<Response<Body>, ApiError> {
    let source = source_param(event)?;

    let snapshot = ingestor.ingest(source.as_deref(), clock, rng).await;
    let recommendations = recommend(&snapshot);

    info!(
        request_id = %request_id,
        is_fallback = snapshot.is_fallback,
        recommendations = recommendations.len(),
        "NPK recommendations ready"
    );

    json_response(&RecommendationsResponse {
        is_fallback: snapshot.is_fallback,
        status: snapshot.status,
        recommendations,
    })
}

/// Read the optional `source` query parameter
///
/// A present value must be blank, the simulation sentinel, or an http(s) URL
/// of at most [`MAX_SOURCE_LENGTH`] bytes.
fn source_param(event: &Request) -> Result<Option<String>, ValidationError> {
    let query_params = event.query_string_parameters();

    match query_params.first("source") {
        Some(source) if source.len() > MAX_SOURCE_LENGTH || !is_fetchable_source(source) => {
            Err(ValidationError::InvalidValue(String::from("source")))
        }
        Some(source) => Ok(Some(source.to_string())),
        None => Ok(None),
    }
}

fn is_fetchable_source(source: &str) -> bool {
    let source = source.trim();
    if source.is_empty() || source == SIMULATION_SENTINEL {
        return true;
    }

    match reqwest::Url::parse(source) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

fn json_response<T: Serialize>(payload: &T) -> Result<Response<Body>, ApiError> {
    let body = serde_json::to_string(payload)
        .map_err(|e| ApiError::Internal(format!("Failed to serialize response: {}", e)))?;

    Response::builder()
        .status(200)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lambda_http::http::Method;
    use npk_feed::{FixedClock, FixedRandomSource, IngestError, SourceConfig};
    use std::collections::HashMap;

    const FEED: &str = "Timestamp,Nitrogen,Phosphorus,Potassium\n\
                        2024-01-15 09:00:00,80,192,240\n\
                        2024-01-15 09:30:00,85,195,238\n";

    struct StubFetcher(Result<String, String>);

    #[async_trait]
    impl FeedFetcher for StubFetcher {
        async fn fetch(&self, _url: &str) -> Result<String, IngestError> {
            self.0.clone().map_err(IngestError::Fetch)
        }
    }

    fn ingestor(response: Result<&str, &str>) -> SensorFeedIngestor<StubFetcher> {
        let response = response.map(str::to_string).map_err(str::to_string);
        SensorFeedIngestor::new(
            SourceConfig::new("https://example.com/default.csv"),
            StubFetcher(response),
        )
    }

    fn request(params: &[(&str, &str)]) -> Request {
        let req = lambda_http::http::Request::builder()
            .method(Method::GET)
            .uri("/npk")
            .body(Body::Empty)
            .unwrap();

        let query: HashMap<String, String> = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Request::from(req).with_query_string_parameters(query)
    }

    fn json_body(response: &Response<Body>) -> serde_json::Value {
        match response.body() {
            Body::Text(text) => serde_json::from_str(text).unwrap(),
            _ => panic!("Expected text body"),
        }
    }

    fn clock() -> FixedClock {
        FixedClock::from_epoch_millis(1705314600000)
    }

    #[tokio::test]
    async fn test_handle_npk_real_feed() {
        let response = handle_npk(
            &request(&[]),
            "test-req-1",
            &ingestor(Ok(FEED)),
            &clock(),
            &FixedRandomSource::constant(0.5),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/json"
        );

        let body = json_body(&response);
        assert_eq!(body["isFallback"], false);
        assert_eq!(body["current"]["n"], 85.0);
        assert_eq!(body["status"]["n"], "Low");
        assert_eq!(body["trend"]["n"], "up");
        assert_eq!(body["history"].as_array().unwrap().len(), 2);
        assert_eq!(body["history"][0]["timeLabel"], "09:00");
        assert_eq!(body["timestamp"], 1705314600000i64);
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn test_handle_npk_simulation() {
        let response = handle_npk(
            &request(&[("source", "simulation")]),
            "test-req-2",
            &ingestor(Err("should not be fetched")),
            &clock(),
            &FixedRandomSource::constant(0.5),
        )
        .await
        .unwrap();

        let body = json_body(&response);
        assert_eq!(body["isFallback"], true);
        assert!(body.get("error").is_none());
        assert_eq!(body["history"].as_array().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_handle_npk_fetch_failure_is_still_200() {
        let response = handle_npk(
            &request(&[]),
            "test-req-3",
            &ingestor(Err("HTTP 404 Not Found")),
            &clock(),
            &FixedRandomSource::constant(0.5),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), 200);
        let body = json_body(&response);
        assert_eq!(body["isFallback"], true);
        assert_eq!(
            body["error"],
            "Failed to fetch sensor feed: HTTP 404 Not Found"
        );
    }

    #[tokio::test]
    async fn test_handle_npk_source_too_long() {
        let long_source = format!("https://example.com/{}", "a".repeat(MAX_SOURCE_LENGTH));
        let result = handle_npk(
            &request(&[("source", &long_source)]),
            "test-req-4",
            &ingestor(Ok(FEED)),
            &clock(),
            &FixedRandomSource::constant(0.5),
        )
        .await;

        match result {
            Err(ApiError::Validation(ValidationError::InvalidValue(field))) => {
                assert_eq!(field, "source")
            }
            other => panic!("Expected validation error, got {:?}", other.map(|r| r.status())),
        }
    }

    #[tokio::test]
    async fn test_handle_recommendations() {
        let response = handle_recommendations(
            &request(&[]),
            "test-req-5",
            &ingestor(Ok(FEED)),
            &clock(),
            &FixedRandomSource::constant(0.5),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), 200);

        let body = json_body(&response);
        assert_eq!(body["isFallback"], false);
        assert_eq!(body["status"]["n"], "Low");

        let recommendations = body["recommendations"].as_array().unwrap();
        assert_eq!(recommendations.len(), 1);
        assert_eq!(recommendations[0]["field"], "nitrogen");
        assert_eq!(recommendations[0]["urgency"], "medium");
    }

    #[test]
    fn test_source_param() {
        assert_eq!(source_param(&request(&[])).unwrap(), None);
        assert_eq!(
            source_param(&request(&[("source", "simulation")])).unwrap(),
            Some("simulation".to_string())
        );

        let at_limit = format!(
            "https://example.com/{}",
            "a".repeat(MAX_SOURCE_LENGTH - "https://example.com/".len())
        );
        assert_eq!(at_limit.len(), MAX_SOURCE_LENGTH);
        assert_eq!(
            source_param(&request(&[("source", &at_limit)])).unwrap(),
            Some(at_limit.clone())
        );

        assert_eq!(
            source_param(&request(&[("source", "http://sensors.local/feed.csv")])).unwrap(),
            Some("http://sensors.local/feed.csv".to_string())
        );
        assert_eq!(
            source_param(&request(&[("source", "  ")])).unwrap(),
            Some("  ".to_string())
        );
    }

    #[test]
    fn test_source_param_rejects_non_http_sources() {
        for source in [
            "file:///etc/passwd",
            "ftp://example.com/feed.csv",
            "gopher://127.0.0.1:6379/_INFO",
            "not a url",
            "/spreadsheets/d/abc/edit",
        ] {
            match source_param(&request(&[("source", source)])) {
                Err(ValidationError::InvalidValue(field)) => assert_eq!(field, "source"),
                other => panic!("Expected {:?} to be rejected, got {:?}", source, other),
            }
        }
    }

    #[tokio::test]
    async fn test_handle_npk_rejects_file_source_without_fetching() {
        let result = handle_npk(
            &request(&[("source", "file:///etc/passwd")]),
            "test-req-6",
            &ingestor(Ok(FEED)),
            &clock(),
            &FixedRandomSource::constant(0.5),
        )
        .await;

        assert!(matches!(
            result,
            Err(ApiError::Validation(ValidationError::InvalidValue(_)))
        ));
    }
}
