//! Request extractors that reject with [`AppError`] instead of axum's
//! plain-text rejections, so malformed input always gets the JSON error body.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

/// JSON body extractor rejecting with a 400 `{success:false,error}` body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor rejecting with a 400 `{success:false,error}` body.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);
