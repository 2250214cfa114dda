use actix_web::{
    body::MessageBody,
    http::StatusCode,
    test,
    test::TestRequest,
    web::ServiceConfig,
    App,
};
use chrono::{TimeZone, Utc};
use log::debug;
use serde_json::json;
use shop_common::Money;
use shop_engine::db_types::{Order, OrderNumber, Product, UserProfile};

pub async fn get_request<F>(path: &str, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    let req = TestRequest::get().uri(path).to_request();
    send(req, configure).await
}

pub async fn post_request<F>(path: &str, body: &str, headers: &[(&str, &str)], configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    let mut req =
        TestRequest::post().uri(path).insert_header(("Content-Type", "application/json")).set_payload(body.to_string());
    for (name, value) in headers {
        req = req.insert_header((*name, *value));
    }
    send(req.to_request(), configure).await
}

async fn send<F>(req: actix_http::Request, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    match test::try_call_service(&service, req).await {
        Ok(res) => {
            let (_, res) = res.into_parts();
            let status = res.status();
            let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
            (status, body)
        },
        // Middleware rejections arrive as errors rather than responses
        Err(e) => (e.as_response_error().status_code(), e.to_string()),
    }
}

pub fn sample_order(id: i64, stripe_pid: &str) -> Order {
    Order {
        id,
        order_number: OrderNumber::from("8F1C0A6D2E9B47D3A5C1E0F2B3D4A596".to_string()),
        user_profile_id: None,
        full_name: "Alice Smith".into(),
        email: "alice@example.com".into(),
        phone_number: "07700900123".into(),
        country: Some("GB".into()),
        postcode: Some("LS1 1AA".into()),
        town_or_city: Some("Leeds".into()),
        street_address1: Some("1 High St".into()),
        street_address2: None,
        county: None,
        date: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        delivery_cost: Money::from(0),
        order_total: Money::from(7500),
        grand_total: Money::from(7500),
        original_bag: r#"{"4": {"items_by_size": {"M": 1}}}"#.into(),
        stripe_pid: stripe_pid.into(),
    }
}

pub fn sample_profile(id: i64, username: &str) -> UserProfile {
    UserProfile {
        id,
        username: username.into(),
        default_full_name: Some("Alice Smith".into()),
        default_phone_number: None,
        default_country: Some("GB".into()),
        default_postcode: Some("LS1 1AA".into()),
        default_town_or_city: Some("Leeds".into()),
        default_street_address1: Some("1 High St".into()),
        default_street_address2: None,
        default_county: None,
    }
}

pub fn sample_product(id: i64, name: &str, price: i64, has_sizes: bool) -> Product {
    Product {
        id,
        category_id: Some(1),
        sku: None,
        name: name.into(),
        description: format!("A fine {name}"),
        has_sizes,
        price: Money::from(price),
        rating: Some(4.5),
        image_url: None,
    }
}

/// A Stripe `payment_intent.succeeded` event for the sample order.
pub fn payment_succeeded_event(stripe_pid: &str) -> String {
    json!({
        "id": "evt_1",
        "type": "payment_intent.succeeded",
        "data": { "object": {
            "id": stripe_pid,
            "amount": 7500,
            "currency": "gbp",
            "metadata": {
                "bag": r#"{"4": {"items_by_size": {"M": 1}}}"#,
                "save_info": "false",
                "username": "AnonymousUser"
            },
            "shipping": {
                "name": "Alice Smith",
                "phone": "07700900123",
                "address": {
                    "city": "Leeds", "country": "GB", "line1": "1 High St", "line2": "", "postal_code": "LS1 1AA",
                    "state": ""
                }
            },
            "charges": { "data": [ { "amount": 7500, "billing_details": { "email": "alice@example.com" } } ] }
        }}
    })
    .to_string()
}

pub fn event_of_type(event_type: &str) -> String {
    json!({ "id": "evt_2", "type": event_type, "data": { "object": { "id": "pi_other" } } }).to_string()
}
