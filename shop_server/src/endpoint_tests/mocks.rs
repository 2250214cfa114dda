use mockall::mock;
use shop_engine::{
    catalog_objects::ProductQuery,
    db_types::{Category, NewLineItem, NewOrder, NewProduct, Order, OrderLineItem, OrderNumber, Product, UserProfile},
    pricing::DeliveryConfig,
    traits::{CatalogManagement, OrderManagement, OrderMatch, ProfileManagement, ProfileUpdate, ShopError},
};

mock! {
    pub Shop {}
    impl Clone for Shop {
        fn clone(&self) -> Self;
    }
    impl OrderManagement for Shop {
        fn url(&self) -> &str;
        async fn find_matching_orders(&self, criteria: &OrderMatch) -> Result<Vec<Order>, ShopError>;
        async fn insert_order_with_line_items(&self, order: NewOrder, items: Vec<NewLineItem>, delivery: &DeliveryConfig) -> Result<Order, ShopError>;
        async fn fetch_order_by_stripe_pid(&self, stripe_pid: &str) -> Result<Option<Order>, ShopError>;
        async fn fetch_order_by_number(&self, order_number: &OrderNumber) -> Result<Option<Order>, ShopError>;
        async fn fetch_line_items(&self, order_id: i64) -> Result<Vec<OrderLineItem>, ShopError>;
        async fn fetch_orders_for_profile(&self, profile_id: i64) -> Result<Vec<Order>, ShopError>;
        async fn delete_order(&self, order_id: i64) -> Result<bool, ShopError>;
    }
    impl ProfileManagement for Shop {
        async fn fetch_profile(&self, username: &str) -> Result<Option<UserProfile>, ShopError>;
        async fn fetch_or_create_profile(&self, username: &str) -> Result<UserProfile, ShopError>;
        async fn update_profile_defaults(&self, profile_id: i64, update: &ProfileUpdate) -> Result<Option<UserProfile>, ShopError>;
    }
    impl CatalogManagement for Shop {
        async fn search_products(&self, query: &ProductQuery) -> Result<Vec<Product>, ShopError>;
        async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, ShopError>;
        async fn fetch_categories(&self) -> Result<Vec<Category>, ShopError>;
        async fn insert_category<'a>(&self, name: &str, friendly_name: Option<&'a str>) -> Result<Category, ShopError>;
        async fn insert_product(&self, product: NewProduct) -> Result<Product, ShopError>;
    }
}
