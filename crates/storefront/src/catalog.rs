//! Product listing: filtering, sorting and pagination over the catalog.
//!
//! The catalog is small enough to hold in memory (the product store caps it),
//! so listing is done here rather than through backend queries.

use std::collections::BTreeSet;

use rxshop_core::Product;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Default page size.
pub const DEFAULT_PER_PAGE: u32 = 20;

/// Largest page size a client may request.
pub const MAX_PER_PAGE: u32 = 100;

/// Listing sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Name,
    PriceAsc,
    PriceDesc,
}

/// Query parameters for `GET /api/products`.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    /// Exact category match, case-insensitive.
    pub category: Option<String>,
    /// Substring of name or category, case-insensitive.
    pub q: Option<String>,
    /// Store order when absent.
    pub sort: Option<SortOrder>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// One page of listing results.
#[derive(Debug, Serialize)]
pub struct CatalogPage {
    pub items: Vec<Product>,
    pub page: u32,
    pub per_page: u32,
    pub total: usize,
    pub total_pages: usize,
}

impl CatalogQuery {
    /// Apply the query to the full catalog.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BadRequest`] if `page` is zero or `per_page` is
    /// outside `1..=100`.
    pub fn apply(&self, products: Vec<Product>) -> Result<CatalogPage, AppError> {
        let page = self.page.unwrap_or(1);
        if page == 0 {
            return Err(AppError::BadRequest("page must be at least 1".to_string()));
        }
        let per_page = self.per_page.unwrap_or(DEFAULT_PER_PAGE);
        if !(1..=MAX_PER_PAGE).contains(&per_page) {
            return Err(AppError::BadRequest(format!(
                "per_page must be between 1 and {MAX_PER_PAGE}"
            )));
        }

        let mut matches: Vec<Product> = products
            .into_iter()
            .filter(|p| self.matches(p))
            .collect();

        match self.sort {
            Some(SortOrder::Name) => {
                matches.sort_by_cached_key(|p| p.name.to_lowercase());
            }
            Some(SortOrder::PriceAsc) => matches.sort_by(|a, b| a.price.cmp(&b.price)),
            Some(SortOrder::PriceDesc) => matches.sort_by(|a, b| b.price.cmp(&a.price)),
            None => {}
        }

        let total = matches.len();
        let per_page_len = per_page as usize;
        let total_pages = total.div_ceil(per_page_len);
        let items = matches
            .into_iter()
            .skip((page as usize - 1).saturating_mul(per_page_len))
            .take(per_page_len)
            .collect();

        Ok(CatalogPage {
            items,
            page,
            per_page,
            total,
            total_pages,
        })
    }

    fn matches(&self, product: &Product) -> bool {
        if let Some(category) = self.category.as_deref().map(str::trim)
            && !category.is_empty()
            && !product.category.eq_ignore_ascii_case(category)
        {
            return false;
        }

        if let Some(q) = self.q.as_deref().map(str::trim)
            && !q.is_empty()
        {
            let q = q.to_lowercase();
            return product.name.to_lowercase().contains(&q)
                || product.category.to_lowercase().contains(&q);
        }

        true
    }
}

/// Distinct non-empty categories, sorted.
#[must_use]
pub fn categories(products: &[Product]) -> Vec<String> {
    products
        .iter()
        .map(|p| p.category.trim())
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use rxshop_core::ProductId;

    use super::*;

    fn product(id: &str, name: &str, category: &str, cents: i64) -> Product {
        Product {
            id: ProductId::parse(id).unwrap(),
            name: name.to_string(),
            category: category.to_string(),
            price: Decimal::new(cents, 2),
            image: None,
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product("1", "Vitamin C 500mg", "Vitamins", 899),
            product("2", "Ibuprofen 200mg", "Pain Relief", 649),
            product("3", "Zinc Lozenges", "Vitamins", 1099),
            product("4", "Aspirin 81mg", "Pain Relief", 399),
            product("5", "Bandages", "First Aid", 499),
        ]
    }

    fn ids(page: &CatalogPage) -> Vec<&str> {
        page.items.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_defaults_keep_store_order() {
        let page = CatalogQuery::default().apply(catalog()).unwrap();
        assert_eq!(ids(&page), ["1", "2", "3", "4", "5"]);
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, DEFAULT_PER_PAGE);
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_category_filter_is_case_insensitive() {
        let query = CatalogQuery {
            category: Some("pain relief".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&query.apply(catalog()).unwrap()), ["2", "4"]);
    }

    #[test]
    fn test_search_matches_name_or_category() {
        let query = CatalogQuery {
            q: Some("MG".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&query.apply(catalog()).unwrap()), ["1", "2", "4"]);

        let query = CatalogQuery {
            q: Some("first".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&query.apply(catalog()).unwrap()), ["5"]);
    }

    #[test]
    fn test_sorting() {
        let by = |sort| CatalogQuery {
            sort: Some(sort),
            ..Default::default()
        };
        assert_eq!(
            ids(&by(SortOrder::Name).apply(catalog()).unwrap()),
            ["4", "5", "2", "1", "3"]
        );
        assert_eq!(
            ids(&by(SortOrder::PriceAsc).apply(catalog()).unwrap()),
            ["4", "5", "2", "1", "3"]
        );
        assert_eq!(
            ids(&by(SortOrder::PriceDesc).apply(catalog()).unwrap()),
            ["3", "1", "2", "5", "4"]
        );
    }

    #[test]
    fn test_pagination_arithmetic() {
        let query = CatalogQuery {
            page: Some(2),
            per_page: Some(2),
            ..Default::default()
        };
        let page = query.apply(catalog()).unwrap();
        assert_eq!(ids(&page), ["3", "4"]);
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);

        let query = CatalogQuery {
            page: Some(9),
            per_page: Some(2),
            ..Default::default()
        };
        let page = query.apply(catalog()).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn test_invalid_paging_is_rejected() {
        for (page, per_page) in [(Some(0), None), (None, Some(0)), (None, Some(101))] {
            let query = CatalogQuery {
                page,
                per_page,
                ..Default::default()
            };
            assert!(matches!(
                query.apply(catalog()),
                Err(AppError::BadRequest(_))
            ));
        }
    }

    #[test]
    fn test_empty_catalog() {
        let page = CatalogQuery::default().apply(Vec::new()).unwrap();
        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn test_categories_are_distinct_and_sorted() {
        assert_eq!(
            categories(&catalog()),
            ["First Aid", "Pain Relief", "Vitamins"]
        );
    }
}
