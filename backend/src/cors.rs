use lambda_http::http::{HeaderValue, StatusCode};
use lambda_http::{Body, Response};

/// Environment variable naming the allowed dashboard origin
pub const CORS_ALLOWED_ORIGIN_VAR: &str = "CORS_ALLOWED_ORIGIN";

/// Add CORS headers to a response
///
/// Reads the CORS_ALLOWED_ORIGIN environment variable to determine the allowed origin.
/// If not set (or not a valid header value), defaults to "*".
pub fn add_cors_headers(mut response: Response<Body>) -> Response<Body> {
    let allowed_origin = std::env::var(CORS_ALLOWED_ORIGIN_VAR)
        .ok()
        .and_then(|origin| HeaderValue::from_str(&origin).ok())
        .unwrap_or_else(|| HeaderValue::from_static("*"));

    let headers = response.headers_mut();
    headers.insert("Access-Control-Allow-Origin", allowed_origin);
    headers.insert(
        "Access-Control-Allow-Methods",
        HeaderValue::from_static("GET, OPTIONS"),
    );
    headers.insert(
        "Access-Control-Allow-Headers",
        HeaderValue::from_static("Content-Type"),
    );
    headers.insert("Access-Control-Max-Age", HeaderValue::from_static("3600"));

    response
}

/// Create a preflight response for OPTIONS requests
///
/// Returns a 200 OK response with CORS headers and an empty body.
pub fn preflight_response() -> Response<Body> {
    let mut response = Response::new(Body::Empty);
    *response.status_mut() = StatusCode::OK;

    add_cors_headers(response)
}
