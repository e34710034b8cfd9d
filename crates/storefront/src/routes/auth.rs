//! Session route handlers.
//!
//! The client signs in with the backend's own auth flow and hands us the
//! resulting session secret. We verify it with the identity provider once and
//! keep only the verified customer in our server-side session.

use axum::{Json, extract::State};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::extract::ApiJson;
use crate::middleware::{RequireAuth, clear_current_customer, set_current_customer};
use crate::models::CurrentCustomer;
use crate::state::AppState;

use super::cart::Ack;

/// Login request body.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub secret: String,
}

/// Current customer response.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub success: bool,
    pub customer: CurrentCustomer,
}

/// Exchange a backend session secret for a storefront session
/// (`POST /api/auth/session`).
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<SessionResponse>> {
    let secret = body.secret.trim();
    if secret.is_empty() {
        return Err(AppError::BadRequest("secret is required".to_string()));
    }

    let customer = state
        .identity()
        .verify_session(&SecretString::from(secret))
        .await?
        .ok_or_else(|| {
            tracing::info!("Rejected login with unknown backend session");
            AppError::Unauthorized("Invalid session".to_string())
        })?;

    set_current_customer(&session, &customer).await?;
    set_sentry_user(&customer.id, Some(&customer.email));
    add_breadcrumb("auth", "Logged in", None);
    tracing::info!(customer_id = %customer.id, "Customer logged in");

    Ok(Json(SessionResponse {
        success: true,
        customer,
    }))
}

/// Return the logged-in customer (`GET /api/auth/session`).
#[instrument(skip_all)]
pub async fn show(RequireAuth(customer): RequireAuth) -> Json<SessionResponse> {
    Json(SessionResponse {
        success: true,
        customer,
    })
}

/// Log out (`DELETE /api/auth/session`).
#[instrument(skip_all)]
pub async fn logout(session: Session) -> Result<Json<Ack>> {
    clear_current_customer(&session).await?;
    clear_sentry_user();
    add_breadcrumb("auth", "Logged out", None);

    Ok(Json(Ack::OK))
}
