//! Join cart lines with current catalog data.

use futures::future::try_join_all;
use rxshop_core::{Cart, HydratedCartLine};
use tracing::instrument;

use crate::backend::{BackendError, ProductStore};

/// Resolve every cart line against the product store, preserving cart order.
///
/// Lines whose product no longer exists are skipped with a warning. Any
/// backend failure aborts the whole hydration.
///
/// # Errors
///
/// Returns the first backend error encountered.
#[instrument(skip_all, fields(lines = cart.len()))]
pub async fn hydrate(
    store: &dyn ProductStore,
    cart: &Cart,
) -> Result<Vec<HydratedCartLine>, BackendError> {
    let lookups = cart.lines().iter().map(|line| async move {
        let product = store.get_product(&line.id).await?;
        Ok::<_, BackendError>((line, product))
    });

    let hydrated = try_join_all(lookups)
        .await?
        .into_iter()
        .filter_map(|(line, product)| match product {
            Some(product) => Some(HydratedCartLine::new(product, line.quantity)),
            None => {
                tracing::warn!(product_id = %line.id, "Skipping cart line for missing product");
                None
            }
        })
        .collect();

    Ok(hydrated)
}
