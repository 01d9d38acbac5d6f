use lambda_http::http::Method;
use lambda_http::{Body, Request, Response};
use tracing::{info, warn};

use crate::cors::preflight_response;
use crate::error::ApiError;
use crate::handlers::npk::{handle_npk, handle_recommendations};
use npk_feed::{Clock, FeedFetcher, RandomSource, SensorFeedIngestor};

/// Route requests that can be answered without configuration
///
/// Returns `None` when the request needs the ingestor.
pub fn route_request_unconfigured(
    event: &Request,
    request_id: &str,
) -> Option<Result<Response<Body>, ApiError>> {
    let path = normalize_path(event.uri().path());

    match (event.method(), path.as_str()) {
        (&Method::GET, "/health") => Some(handle_health(request_id)),
        (&Method::OPTIONS, _) => {
            info!(request_id = %request_id, path = %path, "CORS preflight");
            Some(Ok(preflight_response()))
        }
        _ => None,
    }
}

/// Route an incoming request to the appropriate handler
///
/// Paths are normalized (trailing slashes dropped) and matched on
/// (method, path) tuples. Unknown routes get a 404.
pub async fn route_request<F: FeedFetcher>(
    event: Request,
    request_id: &str,
    ingestor: &SensorFeedIngestor<F>,
    clock: &dyn Clock,
    rng: &dyn RandomSource,
) -> Result<Response<Body>, ApiError> {
    if let Some(response) = route_request_unconfigured(&event, request_id) {
        return response;
    }

    let method = event.method();
    let path = normalize_path(event.uri().path());

    info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "Routing request"
    );

    match (method, path.as_str()) {
        (&Method::GET, "/npk") => {
            info!(request_id = %request_id, "NPK snapshot endpoint");
            handle_npk(&event, request_id, ingestor, clock, rng).await
        }

        (&Method::GET, "/npk/recommendations") => {
            info!(request_id = %request_id, "NPK recommendations endpoint");
            handle_recommendations(&event, request_id, ingestor, clock, rng).await
        }

        _ => {
            warn!(
                request_id = %request_id,
                method = %method,
                path = %path,
                "Unknown route"
            );
            handle_not_found(request_id, method, &path)
        }
    }
}

/// Normalize a path by removing trailing slashes
///
/// The root path "/" is preserved as-is.
fn normalize_path(path: &str) -> String {
    if path == "/" {
        return path.to_string();
    }

    path.trim_end_matches('/').to_string()
}

/// Handle health check requests
fn handle_health(request_id: &str) -> Result<Response<Body>, ApiError> {
    let body = serde_json::json!({
        "status": "healthy",
        "service": "npk-feed-api",
        "request_id": request_id
    });

    Response::builder()
        .status(200)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}

/// Handle 404 Not Found responses
fn handle_not_found(
    request_id: &str,
    method: &Method,
    path: &str,
) -> Result<Response<Body>, ApiError> {
    let body = serde_json::json!({
        "error": "NOT_FOUND",
        "message": format!("Route {} {} not found", method, path),
        "request_id": request_id
    });

    Response::builder()
        .status(404)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}
