use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};

use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod listing;
pub mod models;
pub mod repository;
pub mod views;

// Module for routing segregation (Public, Admin).
pub mod routes;
use auth::{AuthUser, TokenService};
use routes::{admin, public};

// --- Public Re-exports ---

// Makes core state types easily accessible to the application entry point (main.rs).
pub use config::AppConfig;
pub use error::Error;
pub use repository::{MemoryRepository, PostgresRepository, RepositoryState};

/// AppState
///
/// The single, thread-safe, immutable container holding all essential application
/// services and configuration, shared across all incoming requests. The only
/// shared state between requests lives here, and none of it is mutable.
#[derive(Clone)]
pub struct AppState {
    /// Repository layer: abstracts access to the document store.
    pub repo: RepositoryState,
    /// Token service: issues and verifies session tokens with the configured secret.
    pub tokens: TokenService,
    /// Configuration: the loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// These implementations allow extractors and handlers to selectively pull
// components from the shared AppState.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for TokenService {
    fn from_ref(app_state: &AppState) -> TokenService {
        app_state.tokens.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// session_guard
///
/// A middleware function that enforces authentication for the admin routes.
///
/// *Mechanism*: it attempts to extract `AuthUser` from the request. Since
/// `AuthUser` implements `FromRequestParts`, if admission fails (missing cookie or
/// failed token verification) the extractor immediately rejects the request with a
/// 401 Unauthorized status, preventing execution of the handler. If successful,
/// the request proceeds down the handler chain.
async fn session_guard(_admin: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the application's entire routing structure, applies global and scoped
/// middleware, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 1. Base Router Assembly
    let base_router = Router::new()
        // Public routes: no middleware applied.
        .merge(public::public_routes())
        // Admin routes: protected by the session guard. The guard is the only
        // gate in front of the dashboard and the post write operations.
        .merge(
            admin::admin_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), session_guard)),
        )
        // Static assets (stylesheets etc.) served straight from disk.
        .nest_service("/public", ServeDir::new("public"))
        // Apply the unified state to all routes.
        .with_state(state);

    // 2. Observability and Correlation Layers (applied outermost/first)
    base_router.layer(
        ServiceBuilder::new()
            // 2a. Request ID generation: a unique UUID for every incoming request.
            .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
            // 2b. Request tracing: wraps the request/response lifecycle in a
            // tracing span correlated by the generated request id.
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(trace_span_logger)
                    .on_response(
                        DefaultOnResponse::new()
                            .level(Level::INFO)
                            .latency_unit(tower_http::LatencyUnit::Millis),
                    ),
            )
            // 2c. Request ID propagation: returns the x-request-id header to the
            // client.
            .layer(PropagateRequestIdLayer::new(x_request_id)),
    )
}

/// trace_span_logger
///
/// Helper used by `TraceLayer` to customize span creation. It extracts the
/// `x-request-id` header (if present) and includes it in the structured logging
/// metadata alongside the HTTP method and URI, so every log line for a single
/// request is correlated by a unique id.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
