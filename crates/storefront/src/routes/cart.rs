//! Cart route handlers.
//!
//! The cart lives entirely in the `cart` cookie; every mutation reads the
//! cookie, applies the change and writes the whole cart back. Two concurrent
//! writes from the same browser race and the last one wins.

use axum::{
    Json,
    extract::State,
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse},
};
use rxshop_core::{Cart, CartError, CartLine, HydratedCartLine, ProductId, Quantity};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::cart::{StoredCart, cart_cookie, hydrate, removal_cookie};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::extract::ApiJson;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// `Set-Cookie` header list for a cart response.
pub(crate) type CartCookieHeader = AppendHeaders<[(axum::http::HeaderName, String); 1]>;

/// Build the `Set-Cookie` header persisting `cart`.
pub(crate) fn persist(cart: &Cart, secure: bool) -> Result<CartCookieHeader> {
    let cookie = cart_cookie(cart, secure)
        .map_err(|e| AppError::Internal(format!("failed to encode cart cookie: {e}")))?;
    Ok(AppendHeaders([(SET_COOKIE, cookie.to_string())]))
}

/// Build the `Set-Cookie` header deleting the cart.
pub(crate) fn forget(secure: bool) -> CartCookieHeader {
    AppendHeaders([(SET_COOKIE, removal_cookie(secure).to_string())])
}

/// Add to cart request body.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub id: ProductId,
    pub quantity: Quantity,
}

/// Update cart request body.
///
/// A missing, `null` or zero quantity removes the line.
#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub id: ProductId,
    #[serde(default)]
    pub quantity: Option<u32>,
}

/// Bare success acknowledgement.
#[derive(Debug, Serialize)]
pub struct Ack {
    pub success: bool,
}

impl Ack {
    pub const OK: Self = Self { success: true };
}

/// Cart contents response.
#[derive(Debug, Serialize)]
pub struct CartResponse<T> {
    pub success: bool,
    pub items: Vec<T>,
}

impl<T> CartResponse<T> {
    const fn ok(items: Vec<T>) -> Self {
        Self {
            success: true,
            items,
        }
    }
}

/// Cart count response.
#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub success: bool,
    pub count: u64,
}

/// Add a product to the cart (`POST /api/cart`).
///
/// Increments the existing line for the product or appends a new one.
#[instrument(skip_all)]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(_customer): RequireAuth,
    StoredCart(cart): StoredCart,
    ApiJson(body): ApiJson<AddToCartRequest>,
) -> Result<impl IntoResponse> {
    let mut cart = cart.unwrap_or_default();
    cart.add(body.id.clone(), body.quantity)?;

    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[("product_id", body.id.as_str())]),
    );
    tracing::info!(
        product_id = %body.id,
        quantity = %body.quantity,
        lines = cart.len(),
        "Added to cart"
    );

    Ok((persist(&cart, state.config().secure_cookies())?, Json(Ack::OK)))
}

/// Show the cart with current product data (`GET /api/cart`).
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(_customer): RequireAuth,
    StoredCart(cart): StoredCart,
) -> Result<Json<CartResponse<HydratedCartLine>>> {
    let items = match cart {
        Some(cart) => hydrate(state.products(), &cart).await?,
        None => Vec::new(),
    };

    Ok(Json(CartResponse::ok(items)))
}

/// Overwrite or remove a cart line (`PUT /api/cart`).
#[instrument(skip_all)]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(_customer): RequireAuth,
    StoredCart(cart): StoredCart,
    ApiJson(body): ApiJson<UpdateCartRequest>,
) -> Result<impl IntoResponse> {
    let mut cart = cart.ok_or_else(|| AppError::BadRequest("No cart found".to_string()))?;

    let quantity = match body.quantity {
        None | Some(0) => None,
        Some(n) => Some(Quantity::try_from(n).map_err(|source| CartError::Quantity {
            id: body.id.clone(),
            source,
        })?),
    };
    cart.set_quantity(&body.id, quantity)?;
    tracing::info!(
        product_id = %body.id,
        quantity = body.quantity.unwrap_or(0),
        "Updated cart line"
    );

    add_breadcrumb(
        "cart",
        "Updated cart",
        Some(&[("product_id", body.id.as_str())]),
    );

    let items: Vec<CartLine> = cart.lines().to_vec();
    Ok((
        persist(&cart, state.config().secure_cookies())?,
        Json(CartResponse::ok(items)),
    ))
}

/// Delete the cart (`DELETE /api/cart`).
#[instrument(skip_all)]
pub async fn clear(
    State(state): State<AppState>,
    RequireAuth(_customer): RequireAuth,
) -> impl IntoResponse {
    add_breadcrumb("cart", "Cleared cart", None);
    (forget(state.config().secure_cookies()), Json(Ack::OK))
}

/// Total quantity across all lines (`GET /api/cart/count`).
#[instrument(skip_all)]
pub async fn count(
    RequireAuth(_customer): RequireAuth,
    StoredCart(cart): StoredCart,
) -> Json<CountResponse> {
    Json(CountResponse {
        success: true,
        count: cart.map_or(0, |cart| cart.total_quantity()),
    })
}
