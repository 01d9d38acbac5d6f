// Feed API binary entry point

mod config;
mod cors;
mod error;
mod router;

// Handlers module
#[path = "feed/handlers/mod.rs"]
mod handlers;

use lambda_http::{run, service_fn, Body, Error, Request, RequestExt, Response};
use tracing::{error, info};

use config::FeedConfig;
use cors::add_cors_headers;
use error::ApiError;
use npk_feed::{HttpFeedFetcher, SensorFeedIngestor, SystemClock, ThreadRandomSource};
use router::{route_request, route_request_unconfigured};

async fn function_handler(event: Request) -> Result<Response<Body>, Error> {
    // Extract request ID from Lambda context
    let request_id = event.lambda_context().request_id.clone();

    info!(
        request_id = %request_id,
        method = %event.method(),
        path = %event.uri().path(),
        "Feed Lambda invoked"
    );

    let result = match route_request_unconfigured(&event, &request_id) {
        Some(result) => result,
        None => handle_configured(event, &request_id).await,
    };

    let response = match result {
        Ok(response) => {
            info!(
                request_id = %request_id,
                status = %response.status(),
                "Request completed successfully"
            );
            response
        }
        Err(api_error) => {
            error!(
                request_id = %request_id,
                error = %api_error,
                "Request failed"
            );
            api_error.to_http_response(&request_id)
        }
    };

    Ok(add_cors_headers(response))
}

async fn handle_configured(event: Request, request_id: &str) -> Result<Response<Body>, ApiError> {
    let config = FeedConfig::from_env().map_err(|e| {
        error!(
            request_id = %request_id,
            error = %e,
            "Failed to load configuration"
        );
        ApiError::Internal(format!("Configuration error: {}", e))
    })?;

    let fetcher = HttpFeedFetcher::new(config.fetch_timeout)
        .map_err(|e| ApiError::Internal(format!("Failed to build HTTP client: {}", e)))?;
    let ingestor = SensorFeedIngestor::new(config.source, fetcher);

    let clock = SystemClock::new();
    let rng = ThreadRandomSource::new();

    route_request(event, request_id, &ingestor, &clock, &rng).await
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .init();

    info!("Feed Lambda starting");

    run(service_fn(function_handler)).await
}
