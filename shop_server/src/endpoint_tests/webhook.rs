use std::time::Duration;

use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::Utc;
use shop_common::Secret;
use shop_engine::{
    events::EventProducers,
    order_objects::LookupPolicy,
    pricing::DeliveryConfig,
    traits::ShopError,
    ReconciliationApi,
};

use super::{
    helpers::{event_of_type, payment_succeeded_event, post_request, sample_order},
    mocks::MockShop,
};
use crate::{
    data_objects::JsonResponse,
    middleware::{sign_payload, StripeSignatureMiddlewareFactory, STRIPE_SIGNATURE_HEADER},
    stripe_routes::StripeWebhookRoute,
};

const PID: &str = "pi_3PQabc";
const SECRET: &str = "whsec_endpoint_tests";

fn configure_with(shop: MockShop, signature_checks: bool) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let policy = LookupPolicy::new(2, Duration::from_millis(1));
        let api = ReconciliationApi::new(shop, EventProducers::default(), DeliveryConfig::default(), policy);
        let scope = web::scope("/stripe")
            .wrap(StripeSignatureMiddlewareFactory::new(
                Secret::new(SECRET.to_string()),
                Duration::from_secs(300),
                signature_checks,
            ))
            .service(StripeWebhookRoute::<MockShop>::new());
        cfg.app_data(web::Data::new(api)).service(scope);
    }
}

fn configure(shop: MockShop) -> impl FnOnce(&mut ServiceConfig) {
    configure_with(shop, false)
}

#[actix_web::test]
async fn order_already_in_database() {
    let _ = env_logger::try_init().ok();
    let mut shop = MockShop::new();
    shop.expect_find_matching_orders().times(1).returning(|m| {
        assert_eq!(m.stripe_pid, PID);
        assert_eq!(m.details.address.street_address2, None);
        Ok(vec![sample_order(1, PID)])
    });
    shop.expect_fetch_line_items().times(1).returning(|_| Ok(vec![]));
    shop.expect_insert_order_with_line_items().never();
    let (status, body) = post_request("/stripe/webhook", &payment_succeeded_event(PID), &[], configure(shop)).await;
    assert_eq!(status, StatusCode::OK);
    let res = serde_json::from_str::<JsonResponse>(&body).unwrap();
    assert!(res.success);
    assert_eq!(res.message, "Webhook received: payment_intent.succeeded | SUCCESS: Verified order already in database");
}

#[actix_web::test]
async fn order_created_in_webhook() {
    let _ = env_logger::try_init().ok();
    let mut shop = MockShop::new();
    shop.expect_find_matching_orders().times(2).returning(|_| Ok(vec![]));
    shop.expect_fetch_or_create_profile().never();
    shop.expect_insert_order_with_line_items().times(1).returning(|order, items, _| {
        assert_eq!(order.stripe_pid, PID);
        assert_eq!(order.user_profile_id, None);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_size.as_deref(), Some("M"));
        Ok(sample_order(7, PID))
    });
    shop.expect_fetch_line_items().times(1).returning(|_| Ok(vec![]));
    let (status, body) = post_request("/stripe/webhook", &payment_succeeded_event(PID), &[], configure(shop)).await;
    assert_eq!(status, StatusCode::OK);
    let res = serde_json::from_str::<JsonResponse>(&body).unwrap();
    assert!(res.success);
    assert_eq!(res.message, "Webhook received: payment_intent.succeeded | SUCCESS: Created order in webhook");
}

#[actix_web::test]
async fn failed_creation_asks_for_redelivery() {
    let _ = env_logger::try_init().ok();
    let mut shop = MockShop::new();
    shop.expect_find_matching_orders().times(2).returning(|_| Ok(vec![]));
    shop.expect_insert_order_with_line_items().times(1).returning(|_, _, _| Err(ShopError::ProductNotFound(4)));
    shop.expect_fetch_line_items().never();
    let (status, body) = post_request("/stripe/webhook", &payment_succeeded_event(PID), &[], configure(shop)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let res = serde_json::from_str::<JsonResponse>(&body).unwrap();
    assert!(!res.success);
    assert!(res.message.starts_with("Webhook received: payment_intent.succeeded | ERROR:"));
    assert!(res.message.contains("Product 4"), "{}", res.message);
}

#[actix_web::test]
async fn lookup_errors_are_not_retried() {
    let _ = env_logger::try_init().ok();
    let mut shop = MockShop::new();
    shop.expect_find_matching_orders().times(1).returning(|_| Err(ShopError::DatabaseError("disk I/O error".into())));
    shop.expect_insert_order_with_line_items().never();
    let (status, _) = post_request("/stripe/webhook", &payment_succeeded_event(PID), &[], configure(shop)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[actix_web::test]
async fn payment_failed_is_acknowledged() {
    let _ = env_logger::try_init().ok();
    let mut shop = MockShop::new();
    shop.expect_find_matching_orders().never();
    let body = event_of_type("payment_intent.payment_failed");
    let (status, body) = post_request("/stripe/webhook", &body, &[], configure(shop)).await;
    assert_eq!(status, StatusCode::OK);
    let res = serde_json::from_str::<JsonResponse>(&body).unwrap();
    assert_eq!(res.message, "Webhook received: payment_intent.payment_failed");
}

#[actix_web::test]
async fn unknown_events_are_acknowledged() {
    let _ = env_logger::try_init().ok();
    let mut shop = MockShop::new();
    shop.expect_find_matching_orders().never();
    let body = event_of_type("charge.refunded");
    let (status, body) = post_request("/stripe/webhook", &body, &[], configure(shop)).await;
    assert_eq!(status, StatusCode::OK);
    let res = serde_json::from_str::<JsonResponse>(&body).unwrap();
    assert!(res.success);
    assert_eq!(res.message, "Unhandled webhook received: charge.refunded");
}

#[actix_web::test]
async fn unreadable_payment_intent() {
    let _ = env_logger::try_init().ok();
    let mut shop = MockShop::new();
    shop.expect_find_matching_orders().never();
    // A succeeded event whose intent carries no charge, bag or shipping details
    let body = event_of_type("payment_intent.succeeded");
    let (status, body) = post_request("/stripe/webhook", &body, &[], configure(shop)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Invalid webhook payload"), "{body}");
}

#[actix_web::test]
async fn unsigned_webhooks_are_rejected() {
    let _ = env_logger::try_init().ok();
    let mut shop = MockShop::new();
    shop.expect_find_matching_orders().never();
    let body = payment_succeeded_event(PID);
    let (status, _) = post_request("/stripe/webhook", &body, &[], configure_with(shop, true)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn badly_signed_webhooks_are_rejected() {
    let _ = env_logger::try_init().ok();
    let mut shop = MockShop::new();
    shop.expect_find_matching_orders().never();
    let body = payment_succeeded_event(PID);
    let t = Utc::now().timestamp();
    let sig = sign_payload("whsec_someone_else", t, body.as_bytes()).unwrap();
    let header = format!("t={t},v1={sig}");
    let headers = [(STRIPE_SIGNATURE_HEADER, header.as_str())];
    let (status, _) = post_request("/stripe/webhook", &body, &headers, configure_with(shop, true)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn signed_webhooks_are_processed() {
    let _ = env_logger::try_init().ok();
    let mut shop = MockShop::new();
    shop.expect_find_matching_orders().times(1).returning(|_| Ok(vec![sample_order(1, PID)]));
    shop.expect_fetch_line_items().times(1).returning(|_| Ok(vec![]));
    let body = payment_succeeded_event(PID);
    let t = Utc::now().timestamp();
    let sig = sign_payload(SECRET, t, body.as_bytes()).unwrap();
    let header = format!("t={t},v1={sig}");
    let headers = [(STRIPE_SIGNATURE_HEADER, header.as_str())];
    let (status, body) = post_request("/stripe/webhook", &body, &headers, configure_with(shop, true)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
}
