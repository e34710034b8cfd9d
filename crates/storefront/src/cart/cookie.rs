//! Cart cookie encoding.
//!
//! Cookie value: `urlencode(json([{ "id": "...", "quantity": n }, ...]))`.
//! Attributes: `HttpOnly; SameSite=Strict; Path=/; Max-Age=30 days`, plus
//! `Secure` when the storefront is served over https.

use std::string::FromUtf8Error;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::COOKIE, request::Parts},
};
use rxshop_core::{Cart, CartLine};
use thiserror::Error;
use tower_sessions::cookie::{Cookie, SameSite, time::Duration};

/// Cart cookie name.
pub const CART_COOKIE_NAME: &str = "cart";

/// Cart cookie lifetime (30 days).
const CART_COOKIE_MAX_AGE: Duration = Duration::days(30);

/// Errors decoding a cart cookie value.
#[derive(Debug, Error)]
pub enum CartCookieError {
    #[error("cart cookie is not valid percent-encoded UTF-8: {0}")]
    Encoding(#[from] FromUtf8Error),
    #[error("cart cookie is not a valid cart: {0}")]
    Json(#[from] serde_json::Error),
}

/// Encode a cart as a cookie value.
///
/// # Errors
///
/// Returns an error if the cart cannot be serialized.
pub fn encode(cart: &Cart) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(cart)?;
    Ok(urlencoding::encode(&json).into_owned())
}

/// Decode a cookie value into a cart.
///
/// Lines that are not a valid `{id, quantity}` pair (zero quantity, bad id)
/// are dropped and duplicate ids are merged, so a hand-edited or stale
/// cookie cannot break the cart invariants.
///
/// # Errors
///
/// Returns an error if the value is not percent-encoded JSON holding an
/// array.
pub fn decode(value: &str) -> Result<Cart, CartCookieError> {
    let json = urlencoding::decode(value)?;
    let raw: Vec<serde_json::Value> = serde_json::from_str(&json)?;
    let total = raw.len();

    let lines: Vec<CartLine> = raw
        .into_iter()
        .filter_map(|line| serde_json::from_value(line).ok())
        .collect();

    if lines.len() < total {
        tracing::warn!(
            dropped = total - lines.len(),
            "Dropped invalid lines from cart cookie"
        );
    }

    Ok(Cart::from_lines(lines))
}

/// Find the cart cookie among the request's `Cookie` headers.
///
/// Returns `None` when the cookie is absent, empty, or cannot be decoded.
#[must_use]
pub fn read_cart(headers: &HeaderMap) -> Option<Cart> {
    let value = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == CART_COOKIE_NAME)?
        .value()
        .to_owned();

    if value.is_empty() {
        return None;
    }

    match decode(&value) {
        Ok(cart) => Some(cart),
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring undecodable cart cookie");
            None
        }
    }
}

/// Build the `Set-Cookie` value persisting `cart`.
///
/// # Errors
///
/// Returns an error if the cart cannot be serialized.
pub fn cart_cookie(cart: &Cart, secure: bool) -> Result<Cookie<'static>, serde_json::Error> {
    Ok(Cookie::build((CART_COOKIE_NAME, encode(cart)?))
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(secure)
        .path("/")
        .max_age(CART_COOKIE_MAX_AGE)
        .build())
}

/// Build a `Set-Cookie` value that deletes the cart cookie.
///
/// Carries `Max-Age=0` and an `Expires` date in the past so every browser
/// drops it, rather than just blanking the value.
#[must_use]
pub fn removal_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::build((CART_COOKIE_NAME, ""))
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(secure)
        .path("/")
        .build();
    cookie.make_removal();
    cookie
}

/// Extractor for the cart stored in the request's cookie.
///
/// `StoredCart(None)` means the client has no (usable) cart cookie, which is
/// distinct from a cookie holding an empty cart.
#[derive(Debug, Clone)]
pub struct StoredCart(pub Option<Cart>);

impl<S> FromRequestParts<S> for StoredCart
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(read_cart(&parts.headers)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;
    use rxshop_core::{ProductId, Quantity};

    use super::*;

    fn sample_cart() -> Cart {
        let mut cart = Cart::new();
        cart.add(ProductId::parse("omega-3").unwrap(), Quantity::new(2).unwrap())
            .unwrap();
        cart.add(ProductId::from(17), Quantity::ONE).unwrap();
        cart
    }

    fn headers(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn test_encoded_value_is_cookie_safe() {
        let value = encode(&sample_cart()).unwrap();
        assert!(
            value
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "%-_.~".contains(c))
        );
        assert_eq!(decode(&value).unwrap(), sample_cart());
    }

    #[test]
    fn test_decode_accepts_unencoded_json() {
        let cart = decode(r#"[{"id":17,"quantity":1}]"#).unwrap();
        assert_eq!(cart.quantity_of(&ProductId::from(17)), Some(Quantity::ONE));
    }

    #[test]
    fn test_read_cart_among_other_cookies() {
        let value = encode(&sample_cart()).unwrap();
        let headers = headers(&format!("rx_session=abc; cart={value}; theme=dark"));
        assert_eq!(read_cart(&headers), Some(sample_cart()));
    }

    #[test]
    fn test_read_cart_absent_empty_or_garbage() {
        assert_eq!(read_cart(&HeaderMap::new()), None);
        assert_eq!(read_cart(&headers("cart=")), None);
        assert_eq!(read_cart(&headers("cart=not-json")), None);
        assert_eq!(read_cart(&headers("cart=%7B%7D")), None);
    }

    #[test]
    fn test_decode_drops_invalid_lines() {
        let cart = decode(
            r#"[{"id":"a","quantity":0},{"id":"b c","quantity":1},{"id":1},{"id":"d","quantity":2}]"#,
        )
        .unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(
            cart.quantity_of(&ProductId::parse("d").unwrap()),
            Some(Quantity::new(2).unwrap())
        );
    }

    #[test]
    fn test_read_cart_distinguishes_empty_cart() {
        assert_eq!(read_cart(&headers("cart=%5B%5D")), Some(Cart::new()));
    }

    #[test]
    fn test_cart_cookie_attributes() {
        let header = cart_cookie(&sample_cart(), true).unwrap().to_string();
        assert!(header.starts_with("cart="));
        assert!(header.contains("HttpOnly"));
        assert!(header.contains("SameSite=Strict"));
        assert!(header.contains("Secure"));
        assert!(header.contains("Path=/"));
        assert!(header.contains("Max-Age=2592000"));
    }

    #[test]
    fn test_removal_cookie_expires_immediately() {
        let header = removal_cookie(false).to_string();
        assert!(header.starts_with("cart=;"));
        assert!(header.contains("Max-Age=0"));
        assert!(header.contains("Expires="));
        assert!(!header.contains("Secure"));
    }
}
