use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web, web::ServiceConfig, App};
use serde_json::json;
use shop_common::Money;
use shop_engine::{
    catalog_objects::{BagContents, SortDirection, SortKey},
    db_types::{Category, Order, Product},
    order_objects::{OrderWithLineItems, PaymentIntentRequest},
    pricing::DeliveryConfig,
    traits::ShopError,
    CatalogApi,
    CheckoutApi,
    ProfileApi,
};

use super::{
    helpers::{get_request, post_request, sample_order, sample_product},
    mocks::MockShop,
};
use crate::routes::{
    health,
    AddToBagRoute,
    BagContentsRoute,
    CategoriesRoute,
    CheckoutIntentRoute,
    OrderDetailsRoute,
    PlaceOrderRoute,
    ProductByIdRoute,
    ProductsRoute,
};

fn configure_catalog(shop: MockShop) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(CatalogApi::new(shop)))
            .service(ProductsRoute::<MockShop>::new())
            .service(ProductByIdRoute::<MockShop>::new())
            .service(CategoriesRoute::<MockShop>::new());
    }
}

fn configure_checkout(shop: MockShop) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let api = CheckoutApi::new(shop, DeliveryConfig::default());
        cfg.app_data(web::Data::new(api))
            .service(BagContentsRoute::<MockShop>::new())
            .service(AddToBagRoute::<MockShop>::new())
            .service(CheckoutIntentRoute::<MockShop>::new())
            .service(PlaceOrderRoute::<MockShop>::new());
    }
}

fn configure_orders(shop: MockShop) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(ProfileApi::new(shop))).service(OrderDetailsRoute::<MockShop>::new());
    }
}

/// Products 1 (Canvas Tote, 12.99) and 2 (Linen Shirt, 30.00, sized)
fn with_products(shop: &mut MockShop) {
    shop.expect_fetch_product().returning(|id| match id {
        1 => Ok(Some(sample_product(1, "Canvas Tote", 1299, false))),
        2 => Ok(Some(sample_product(2, "Linen Shirt", 3000, true))),
        _ => Ok(None),
    });
}

const PLACE_ORDER: &str = r#"{
    "form": {
        "full_name": "Alice Smith", "email": "alice@example.com", "phone_number": "07700900123",
        "country": "GB", "postcode": "LS1 1AA", "town_or_city": "Leeds", "street_address1": "1 High St",
        "street_address2": "", "county": "", "save_info": false
    },
    "bag": {"4": {"items_by_size": {"M": 1}}},
    "stripe_pid": "pi_checkout"
}"#;

#[actix_web::test]
async fn health_endpoint() {
    let app = test::init_service(App::new().service(health)).await;
    let req = TestRequest::get().uri("/health").to_request();
    let (_req, res) = test::call_service(&app, req).await.into_parts();
    let status = res.status();
    let body = res.into_body().try_into_bytes().unwrap();
    assert!(status.is_success());
    assert_eq!(body, "👍️\n");
}

#[actix_web::test]
async fn search_products() {
    let _ = env_logger::try_init().ok();
    let mut shop = MockShop::new();
    shop.expect_search_products().times(1).returning(|q| {
        assert_eq!(q.q.as_deref(), Some("linen"));
        assert_eq!(q.categories, vec!["shirts".to_string(), "jackets".to_string()]);
        assert_eq!(q.sort, Some(SortKey::Price));
        assert_eq!(q.direction, SortDirection::Desc);
        Ok(vec![sample_product(2, "Linen Shirt", 3000, true)])
    });
    let path = "/products?q=linen&category=shirts,jackets&sort=price&direction=desc";
    let (status, body) = get_request(path, configure_catalog(shop)).await;
    assert_eq!(status, StatusCode::OK);
    let products = serde_json::from_str::<Vec<Product>>(&body).unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].price, Money::from(3000));
}

#[actix_web::test]
async fn empty_search_term_is_rejected() {
    let _ = env_logger::try_init().ok();
    let mut shop = MockShop::new();
    shop.expect_search_products().never();
    let (status, body) = get_request("/products?q=", configure_catalog(shop)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("You didn't enter any search criteria"), "{body}");
}

#[actix_web::test]
async fn unknown_sort_key_is_rejected() {
    let _ = env_logger::try_init().ok();
    let mut shop = MockShop::new();
    shop.expect_search_products().never();
    let (status, _) = get_request("/products?sort=colour", configure_catalog(shop)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn product_by_id() {
    let _ = env_logger::try_init().ok();
    let mut shop = MockShop::new();
    with_products(&mut shop);
    let (status, body) = get_request("/products/1", configure_catalog(shop)).await;
    assert_eq!(status, StatusCode::OK);
    let product = serde_json::from_str::<Product>(&body).unwrap();
    assert_eq!(product.name, "Canvas Tote");

    let mut shop = MockShop::new();
    with_products(&mut shop);
    let (status, body) = get_request("/products/99", configure_catalog(shop)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Product 99 does not exist"), "{body}");
}

#[actix_web::test]
async fn categories() {
    let _ = env_logger::try_init().ok();
    let mut shop = MockShop::new();
    shop.expect_fetch_categories().times(1).returning(|| {
        Ok(vec![Category { id: 1, name: "bags".into(), friendly_name: Some("Bags".into()) }])
    });
    let (status, body) = get_request("/categories", configure_catalog(shop)).await;
    assert_eq!(status, StatusCode::OK);
    let categories = serde_json::from_str::<Vec<Category>>(&body).unwrap();
    assert_eq!(categories[0].friendly_name(), "Bags");
}

#[actix_web::test]
async fn database_errors_are_500s() {
    let _ = env_logger::try_init().ok();
    let mut shop = MockShop::new();
    shop.expect_fetch_categories().returning(|| Err(ShopError::DatabaseError("database is locked".into())));
    let (status, body) = get_request("/categories", configure_catalog(shop)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("database is locked"), "{body}");
}

#[actix_web::test]
async fn bag_contents() {
    let _ = env_logger::try_init().ok();
    let mut shop = MockShop::new();
    with_products(&mut shop);
    let bag = r#"{"1": 2, "2": {"items_by_size": {"M": 1}}}"#;
    let (status, body) = post_request("/bag/contents", bag, &[], configure_checkout(shop)).await;
    assert_eq!(status, StatusCode::OK);
    let contents = serde_json::from_str::<BagContents>(&body).unwrap();
    assert_eq!(contents.items.len(), 2);
    assert_eq!(contents.product_count, 3);
    assert_eq!(contents.total, Money::from(5598));
    assert_eq!(contents.delivery, Money::from(0));
    assert_eq!(contents.free_delivery_delta, Money::from(0));
    assert_eq!(contents.grand_total, Money::from(5598));
}

#[actix_web::test]
async fn add_to_bag() {
    let _ = env_logger::try_init().ok();
    let mut shop = MockShop::new();
    with_products(&mut shop);
    let body = json!({ "bag": {"1": 1}, "quantity": 2, "size": "M" }).to_string();
    let (status, body) = post_request("/bag/add/2", &body, &[], configure_checkout(shop)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"1":1,"2":{"items_by_size":{"M":2}}}"#);

    let mut shop = MockShop::new();
    with_products(&mut shop);
    let body = json!({ "quantity": 1 }).to_string();
    let (status, body) = post_request("/bag/add/2", &body, &[], configure_checkout(shop)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Choose one"), "{body}");
}

#[actix_web::test]
async fn checkout_intent() {
    let _ = env_logger::try_init().ok();
    let mut shop = MockShop::new();
    with_products(&mut shop);
    let (status, body) = post_request("/checkout/intent", r#"{"1": 1}"#, &[], configure_checkout(shop)).await;
    assert_eq!(status, StatusCode::OK);
    let intent = serde_json::from_str::<PaymentIntentRequest>(&body).unwrap();
    assert_eq!(intent.amount, Money::from(1429));
    assert_eq!(intent.currency, "gbp");
    assert_eq!(intent.bag, r#"{"1":1}"#);

    let shop = MockShop::new();
    let (status, _) = post_request("/checkout/intent", "{}", &[], configure_checkout(shop)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn place_order() {
    let _ = env_logger::try_init().ok();
    let mut shop = MockShop::new();
    shop.expect_insert_order_with_line_items().times(1).returning(|order, items, _| {
        assert_eq!(order.stripe_pid, "pi_checkout");
        assert_eq!(order.details.address.county, None);
        assert_eq!(order.original_bag, r#"{"4":{"items_by_size":{"M":1}}}"#);
        assert_eq!(items.len(), 1);
        Ok(sample_order(3, "pi_checkout"))
    });
    shop.expect_fetch_line_items().never();
    let (status, body) = post_request("/checkout/orders", PLACE_ORDER, &[], configure_checkout(shop)).await;
    assert_eq!(status, StatusCode::OK);
    let order = serde_json::from_str::<Order>(&body).unwrap();
    assert_eq!(order.id, 3);
}

#[actix_web::test]
async fn place_order_twice() {
    let _ = env_logger::try_init().ok();
    let mut shop = MockShop::new();
    shop.expect_insert_order_with_line_items()
        .times(1)
        .returning(|_, _, _| Err(ShopError::OrderAlreadyExists("pi_checkout".into())));
    let (status, body) = post_request("/checkout/orders", PLACE_ORDER, &[], configure_checkout(shop)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("pi_checkout"), "{body}");
}

#[actix_web::test]
async fn place_order_needs_contact_details() {
    let _ = env_logger::try_init().ok();
    let mut shop = MockShop::new();
    shop.expect_insert_order_with_line_items().never();
    let body = PLACE_ORDER.replace("alice@example.com", " ");
    let (status, body) = post_request("/checkout/orders", &body, &[], configure_checkout(shop)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("email"), "{body}");
}

#[actix_web::test]
async fn order_details() {
    let _ = env_logger::try_init().ok();
    let mut shop = MockShop::new();
    shop.expect_fetch_order_by_number().returning(|n| match n.as_str() {
        "8F1C0A6D2E9B47D3A5C1E0F2B3D4A596" => Ok(Some(sample_order(1, "pi_1"))),
        _ => Ok(None),
    });
    shop.expect_fetch_line_items().returning(|_| Ok(vec![]));
    let (status, body) =
        get_request("/checkout/orders/8F1C0A6D2E9B47D3A5C1E0F2B3D4A596", configure_orders(shop)).await;
    assert_eq!(status, StatusCode::OK);
    let details = serde_json::from_str::<OrderWithLineItems>(&body).unwrap();
    assert_eq!(details.order.stripe_pid, "pi_1");

    let mut shop = MockShop::new();
    shop.expect_fetch_order_by_number().returning(|_| Ok(None));
    let (status, _) = get_request("/checkout/orders/NOPE", configure_orders(shop)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
