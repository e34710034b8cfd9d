//! RxShop storefront library.
//!
//! JSON API for the pharmacy storefront: a cookie-held shopping cart for
//! logged-in customers, a public catalog backed by a hosted document store,
//! and a simulated checkout. The binary in `main.rs` adds process setup
//! (Sentry, tracing subscriber, rate limiting, graceful shutdown) around
//! [`app`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

use axum::{Router, extract::Request, middleware::from_fn};
use tower_http::trace::TraceLayer;

use crate::middleware::rate_limit::RateLimiterLayer;
use crate::state::AppState;

/// Build the storefront router.
///
/// `api_rate_limit` is applied to the `/api` routes only, so health probes
/// are never throttled.
pub fn app(state: AppState, api_rate_limit: Option<RateLimiterLayer>) -> Router {
    let session_layer = middleware::create_session_layer(state.config());

    let api = match api_rate_limit {
        Some(limiter) => routes::api_routes().layer(limiter),
        None => routes::api_routes(),
    };

    Router::new()
        .merge(routes::health_routes())
        .nest("/api", api)
        .layer(session_layer)
        .layer(from_fn(middleware::security_headers_middleware))
        .layer(from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                    customer_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}
