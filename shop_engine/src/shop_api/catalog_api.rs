use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Category, Product},
    shop_api::{catalog_objects::ProductQuery, errors::CatalogApiError},
    traits::CatalogManagement,
};

pub struct CatalogApi<B> {
    db: B,
}

impl<B> Debug for CatalogApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CatalogApi")
    }
}

impl<B> CatalogApi<B>
where B: CatalogManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Searches the catalog. A search term that is present but blank is an error, rather than a match-everything.
    pub async fn search_products(&self, query: ProductQuery) -> Result<Vec<Product>, CatalogApiError> {
        let mut query = query;
        if let Some(term) = &query.q {
            if term.trim().is_empty() {
                return Err(CatalogApiError::EmptySearchTerm);
            }
            query.q = Some(term.trim().to_string());
        }
        query.categories.retain(|c| !c.trim().is_empty());
        let products = self.db.search_products(&query).await?;
        trace!("🛍️ Product search {query:?} returned {} result(s)", products.len());
        Ok(products)
    }

    pub async fn product_by_id(&self, product_id: i64) -> Result<Product, CatalogApiError> {
        self.db.fetch_product(product_id).await?.ok_or(CatalogApiError::ProductNotFound(product_id))
    }

    pub async fn categories(&self) -> Result<Vec<Category>, CatalogApiError> {
        let categories = self.db.fetch_categories().await?;
        Ok(categories)
    }
}
