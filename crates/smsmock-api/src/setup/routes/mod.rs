//! Route configuration and setup

pub mod health;

use std::sync::Arc;

use axum::{
    error_handling::HandleErrorLayer,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, MethodRouter},
    BoxError, Json, Router,
};
use smsmock_core::{AppError, Config};
use smsmock_infra::request_id_middleware;
use tower::limit::ConcurrencyLimitLayer;
use tower::timeout::{error::Elapsed, TimeoutLayer};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers;
use crate::state::AppState;

/// Slack for JSON framing around a base64 payload
const BODY_OVERHEAD_BYTES: usize = 64 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    // Base64 inflates binary payloads by 4/3
    let body_limit = config.max_upload_size_bytes / 3 * 4 + BODY_OVERHEAD_BYTES;
    let http_concurrency_limit = config.http_concurrency_limit.max(1);
    let request_timeout = config.request_timeout();
    tracing::info!(
        http_concurrency_limit,
        body_limit,
        request_timeout_secs = request_timeout.as_secs(),
        "HTTP limits configured"
    );

    let app = api_routes()
        .route("/health", get(health::health_check))
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
        .fallback(unmatched_path)
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(move |err: BoxError| async move {
                    handle_timeout(err, request_timeout.as_secs())
                }))
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state);

    Ok(app)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/sms-image",
            with_preflight(
                get(handlers::sms_image::get_sms_image)
                    .post(handlers::sms_image::create_sms_image),
            ),
        )
        .route(
            "/api/upload",
            with_preflight(post(handlers::upload::upload_to_cdn)),
        )
}

/// Plain OPTIONS answers 200 with an empty body; other unrouted methods get a 405 envelope.
fn with_preflight(router: MethodRouter<Arc<AppState>>) -> MethodRouter<Arc<AppState>> {
    router
        .options(|| async { StatusCode::OK })
        .fallback(method_not_allowed)
}

async fn method_not_allowed(method: Method) -> HttpAppError {
    HttpAppError(AppError::MethodNotAllowed(method.to_string()))
}

/// Requests cut off by the timeout layer get the usual JSON envelope
fn handle_timeout(err: BoxError, timeout_secs: u64) -> HttpAppError {
    if err.is::<Elapsed>() {
        HttpAppError(AppError::Timeout(timeout_secs))
    } else {
        HttpAppError(AppError::Internal(format!("Unhandled middleware error: {}", err)))
    }
}

async fn unmatched_path(method: Method) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("Not found", "NOT_FOUND")),
    )
        .into_response()
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];

    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}
