use actix_web::{http::StatusCode, web, web::ServiceConfig};
use shop_engine::{
    db_types::{Order, UserProfile},
    traits::ShopError,
    ProfileApi,
};

use super::{
    helpers::{get_request, post_request, sample_order, sample_profile},
    mocks::MockShop,
};
use crate::routes::{OrderHistoryRoute, ProfileRoute, UpdateProfileRoute};

fn configure_profiles(shop: MockShop) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(ProfileApi::new(shop)))
            .service(OrderHistoryRoute::<MockShop>::new())
            .service(ProfileRoute::<MockShop>::new())
            .service(UpdateProfileRoute::<MockShop>::new());
    }
}

#[actix_web::test]
async fn profile_is_created_on_first_visit() {
    let _ = env_logger::try_init().ok();
    let mut shop = MockShop::new();
    shop.expect_fetch_or_create_profile().times(1).returning(|username| {
        assert_eq!(username, "alice");
        Ok(sample_profile(7, username))
    });
    let (status, body) = get_request("/profiles/alice", configure_profiles(shop)).await;
    assert_eq!(status, StatusCode::OK);
    let profile = serde_json::from_str::<UserProfile>(&body).unwrap();
    assert_eq!(profile.id, 7);
    assert_eq!(profile.default_town_or_city.as_deref(), Some("Leeds"));
}

#[actix_web::test]
async fn update_profile_clears_blank_fields() {
    let _ = env_logger::try_init().ok();
    let mut shop = MockShop::new();
    shop.expect_fetch_profile().returning(|username| Ok(Some(sample_profile(7, username))));
    shop.expect_update_profile_defaults().times(1).returning(|id, update| {
        assert_eq!(id, 7);
        assert_eq!(update.default_full_name.as_deref(), Some("Alice Jones"));
        assert_eq!(update.default_phone_number, None);
        assert_eq!(update.default_address.postcode.as_deref(), Some("M1 1AA"));
        assert_eq!(update.default_address.county, None);
        let mut profile = sample_profile(7, "alice");
        profile.default_full_name = update.default_full_name.clone();
        profile.default_postcode = update.default_address.postcode.clone();
        Ok(Some(profile))
    });
    let body = r#"{"default_full_name": "Alice Jones", "default_phone_number": "", "postcode": "M1 1AA", "county": ""}"#;
    let (status, body) = post_request("/profiles/alice", body, &[], configure_profiles(shop)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let profile = serde_json::from_str::<UserProfile>(&body).unwrap();
    assert_eq!(profile.default_full_name.as_deref(), Some("Alice Jones"));
    assert_eq!(profile.default_postcode.as_deref(), Some("M1 1AA"));
}

#[actix_web::test]
async fn update_unknown_profile() {
    let _ = env_logger::try_init().ok();
    let mut shop = MockShop::new();
    shop.expect_fetch_profile().returning(|_| Ok(None));
    shop.expect_update_profile_defaults().never();
    let (status, body) = post_request("/profiles/nobody", "{}", &[], configure_profiles(shop)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("nobody"), "{body}");
}

#[actix_web::test]
async fn order_history_is_newest_first() {
    let _ = env_logger::try_init().ok();
    let mut shop = MockShop::new();
    shop.expect_fetch_profile().returning(|username| Ok(Some(sample_profile(7, username))));
    shop.expect_fetch_orders_for_profile().times(1).returning(|profile_id| {
        assert_eq!(profile_id, 7);
        Ok(vec![sample_order(12, "pi_new"), sample_order(3, "pi_old")])
    });
    let (status, body) = get_request("/profiles/alice/orders", configure_profiles(shop)).await;
    assert_eq!(status, StatusCode::OK);
    let orders = serde_json::from_str::<Vec<Order>>(&body).unwrap();
    let pids = orders.iter().map(|o| o.stripe_pid.as_str()).collect::<Vec<_>>();
    assert_eq!(pids, vec!["pi_new", "pi_old"]);
}

#[actix_web::test]
async fn order_history_without_a_profile_is_empty() {
    let _ = env_logger::try_init().ok();
    let mut shop = MockShop::new();
    shop.expect_fetch_profile().returning(|_| Ok(None));
    shop.expect_fetch_orders_for_profile().never();
    let (status, body) = get_request("/profiles/bob/orders", configure_profiles(shop)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "[]");
}

#[actix_web::test]
async fn order_history_database_error() {
    let _ = env_logger::try_init().ok();
    let mut shop = MockShop::new();
    shop.expect_fetch_profile().returning(|_| Err(ShopError::DatabaseError("disk I/O error".into())));
    let (status, body) = get_request("/profiles/alice/orders", configure_profiles(shop)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("disk I/O error"), "{body}");
}
