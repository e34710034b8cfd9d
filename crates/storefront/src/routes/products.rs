//! Catalog route handlers. Public, no session required.

use axum::{
    Json,
    extract::{Path, State},
};
use rxshop_core::{Product, ProductId};
use serde::Serialize;
use tracing::instrument;

use crate::catalog::{self, CatalogPage, CatalogQuery};
use crate::error::{AppError, Result};
use crate::extract::ApiQuery;
use crate::state::AppState;

/// Product listing response.
#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub success: bool,
    #[serde(flatten)]
    pub page: CatalogPage,
}

/// Single product response.
#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub success: bool,
    pub product: Product,
}

/// Category list response.
#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub success: bool,
    pub categories: Vec<String>,
}

/// List products (`GET /api/products`).
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CatalogQuery>,
) -> Result<Json<ProductListResponse>> {
    let products = state.products().list_products().await?;
    let page = query.apply(products)?;

    Ok(Json(ProductListResponse {
        success: true,
        page,
    }))
}

/// Show a single product (`GET /api/products/{id}`).
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>> {
    let id = ProductId::parse(&id).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let product = state
        .products()
        .get_product(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product {id} not found")))?;

    Ok(Json(ProductResponse {
        success: true,
        product,
    }))
}

/// List distinct categories (`GET /api/categories`).
#[instrument(skip(state))]
pub async fn categories(State(state): State<AppState>) -> Result<Json<CategoriesResponse>> {
    let products = state.products().list_products().await?;

    Ok(Json(CategoriesResponse {
        success: true,
        categories: catalog::categories(&products),
    }))
}
