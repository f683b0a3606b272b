//! gwm-api - REST API layer for the gateway manager
//!
//! Serves the gateway/device resources over HTTP on top of a
//! [`GatewayService`](gwm_core::GatewayService). The store behind it is
//! chosen by the caller.
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use gwm_api::{create_router, AppState};
//! use gwm_core::MemoryStore;
//!
//! let state = AppState::new(Arc::new(MemoryStore::new()));
//! let router = create_router(state);
//! ```

pub mod error;
pub mod extract;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

use axum::error_handling::HandleErrorLayer;
use axum::http::{Method, Uri};
use axum::routing::{delete, get, post};
use axum::Router;
use tower::timeout::TimeoutLayer;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the gateway manager router with the given application state
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(HandleErrorLayer::new(error::handle_middleware_error))
        .layer(TimeoutLayer::new(state.request_timeout()));

    Router::new()
        // Liveness / readiness
        .route("/health", get(|| async { "OK" }))
        .route("/ready", get(handlers::health::ready))
        // Gateway routes
        .route(
            "/gateways",
            get(handlers::gateways::list_gateways).post(handlers::gateways::create_gateway),
        )
        .route(
            "/gateways/{serial}",
            get(handlers::gateways::get_gateway)
                .patch(handlers::gateways::update_gateway)
                .delete(handlers::gateways::delete_gateway),
        )
        // Device routes (nested under their gateway)
        .route(
            "/gateways/{serial}/devices",
            post(handlers::devices::add_device),
        )
        .route(
            "/gateways/{serial}/devices/{uid}",
            delete(handlers::devices::remove_device),
        )
        .fallback(unknown_route)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(middleware)
        .with_state(state)
}

async fn unknown_route(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}

async fn method_not_allowed(method: Method, uri: Uri) -> ApiError {
    ApiError::MethodNotAllowed(format!("{} is not supported on {}", method, uri.path()))
}
