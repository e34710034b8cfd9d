//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health               - Liveness probe
//! GET    /health/ready         - Readiness probe (product store reachable)
//!
//! # Session
//! POST   /api/auth/session     - Log in with a backend session secret
//! GET    /api/auth/session     - Current customer
//! DELETE /api/auth/session     - Log out
//!
//! # Catalog (public)
//! GET    /api/products         - Product listing (filter, sort, paginate)
//! GET    /api/products/{id}    - Product detail
//! GET    /api/categories       - Distinct categories
//!
//! # Cart (requires auth, state held in the `cart` cookie)
//! POST   /api/cart             - Add {id, quantity}
//! GET    /api/cart             - Hydrated cart lines
//! PUT    /api/cart             - Set {id, quantity}; 0 removes the line
//! DELETE /api/cart             - Clear the cart
//! GET    /api/cart/count       - Total item count
//!
//! # Checkout (requires auth)
//! POST   /api/checkout         - Price the cart and clear it
//! ```

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod health;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the session routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new().route(
        "/session",
        post(auth::login).get(auth::show).delete(auth::logout),
    )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(cart::add)
                .get(cart::show)
                .put(cart::update)
                .delete(cart::clear),
        )
        .route("/count", get(cart::count))
}

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .route("/categories", get(products::categories))
}

/// Create the `/api` router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/cart", cart_routes())
        .route("/checkout", post(checkout::checkout))
        .merge(catalog_routes())
}

/// Create the health probe routes.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::ready))
}
