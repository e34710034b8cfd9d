//! Authentication extractors.
//!
//! A customer is "logged in" when the server-side session holds a
//! [`CurrentCustomer`], which only `POST /api/auth/session` writes after the
//! identity provider has verified the client's secret.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;
use tracing::Span;

use crate::error::{AppError, set_sentry_user};
use crate::models::{CurrentCustomer, session_keys};

/// Extractor that requires an authenticated customer.
///
/// Rejects with a 401 JSON error before the handler runs, so unauthenticated
/// requests never read or write the cart cookie.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(customer): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", customer.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentCustomer);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let customer = load_customer(parts)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))?;

        Span::current().record("customer_id", customer.id.as_str());
        set_sentry_user(&customer.id, Some(&customer.email));

        Ok(Self(customer))
    }
}

async fn load_customer(parts: &Parts) -> Result<Option<CurrentCustomer>, AppError> {
    // No session layer means no way to be logged in.
    let Some(session) = parts.extensions.get::<Session>() else {
        return Ok(None);
    };

    Ok(session
        .get::<CurrentCustomer>(session_keys::CURRENT_CUSTOMER)
        .await?)
}

/// Store the verified customer in the session.
///
/// Cycles the session ID first so a session fixed before login cannot be
/// reused after it.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_customer(
    session: &Session,
    customer: &CurrentCustomer,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session
        .insert(session_keys::CURRENT_CUSTOMER, customer)
        .await
}

/// Drop the whole session (logout).
///
/// # Errors
///
/// Returns an error if the session store cannot delete the session.
pub async fn clear_current_customer(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
