use crate::{
    db_types::{Category, NewProduct, Product},
    shop_api::catalog_objects::ProductQuery,
    traits::ShopError,
};

#[allow(async_fn_in_trait)]
pub trait CatalogManagement {
    /// Products matching the query. Validating the query is the caller's job; backends only translate it.
    async fn search_products(&self, query: &ProductQuery) -> Result<Vec<Product>, ShopError>;

    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, ShopError>;

    async fn fetch_categories(&self) -> Result<Vec<Category>, ShopError>;

    async fn insert_category(&self, name: &str, friendly_name: Option<&str>) -> Result<Category, ShopError>;

    async fn insert_product(&self, product: NewProduct) -> Result<Product, ShopError>;
}
