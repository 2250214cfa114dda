use std::{net::IpAddr, time::Duration};

use actix_web::{
    dev::{Server, Service},
    http::KeepAlive,
    middleware::Logger,
    web,
    App,
    HttpServer,
};
use futures::future::{ok, Either};
use log::*;
use shop_engine::{
    events::EventProducers,
    CatalogApi,
    CheckoutApi,
    ProfileApi,
    ReconciliationApi,
    SqliteDatabase,
};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    helpers::get_remote_ip,
    integrations::notifications::create_confirmation_event_handlers,
    middleware::StripeSignatureMiddlewareFactory,
    routes::{
        health,
        AddToBagRoute,
        BagContentsRoute,
        CategoriesRoute,
        CheckoutIntentRoute,
        OrderDetailsRoute,
        OrderHistoryRoute,
        PlaceOrderRoute,
        ProductByIdRoute,
        ProductsRoute,
        ProfileRoute,
        UpdateProfileRoute,
    },
    stripe_routes::StripeWebhookRoute,
};

const MAX_DB_CONNECTIONS: u32 = 25;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::open(&config.database_url, MAX_DB_CONNECTIONS)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let handlers = create_confirmation_event_handlers();
    let producers = handlers.producers();
    let handler_tasks = handlers.start_handlers();
    info!("📬️ {} event handler(s) started", handler_tasks.len());
    let srv = create_server_instance(config, db.clone(), producers)?;
    let result = srv.await.map_err(|e| ServerError::Unspecified(e.to_string()));
    db.close().await;
    result
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        let reconciliation_api =
            ReconciliationApi::new(db.clone(), producers.clone(), config.delivery, config.lookup_policy);
        let checkout_api = CheckoutApi::new(db.clone(), config.delivery)
            .with_currency(config.stripe.currency.as_str());
        let catalog_api = CatalogApi::new(db.clone());
        let profile_api = ProfileApi::new(db.clone());
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("shop::access_log"))
            .app_data(web::Data::new(reconciliation_api))
            .app_data(web::Data::new(checkout_api))
            .app_data(web::Data::new(catalog_api))
            .app_data(web::Data::new(profile_api));
        let api_scope = web::scope("/api")
            .service(ProductsRoute::<SqliteDatabase>::new())
            .service(ProductByIdRoute::<SqliteDatabase>::new())
            .service(CategoriesRoute::<SqliteDatabase>::new())
            .service(BagContentsRoute::<SqliteDatabase>::new())
            .service(AddToBagRoute::<SqliteDatabase>::new())
            .service(CheckoutIntentRoute::<SqliteDatabase>::new())
            .service(PlaceOrderRoute::<SqliteDatabase>::new())
            .service(OrderDetailsRoute::<SqliteDatabase>::new())
            .service(OrderHistoryRoute::<SqliteDatabase>::new())
            .service(ProfileRoute::<SqliteDatabase>::new())
            .service(UpdateProfileRoute::<SqliteDatabase>::new());
        let use_x_forwarded_for = config.use_x_forwarded_for;
        let use_forwarded = config.use_forwarded;
        let stripe_whitelist = config.stripe.whitelist.clone();
        let stripe_scope = web::scope("/stripe")
            .wrap(StripeSignatureMiddlewareFactory::new(
                config.stripe.webhook_secret.clone(),
                config.stripe.signature_tolerance,
                config.stripe.signature_checks,
            ))
            .wrap_fn(move |req, srv| {
                let peer_ip = get_remote_ip(req.request(), use_x_forwarded_for, use_forwarded);
                if is_whitelisted(peer_ip, stripe_whitelist.as_deref()) {
                    Either::Left(srv.call(req))
                } else {
                    let err = ServerError::Forbidden("Webhook calls are not accepted from this address".into());
                    Either::Right(ok(req.error_response(err)))
                }
            })
            .service(StripeWebhookRoute::<SqliteDatabase>::new());
        app.service(health).service(api_scope).service(stripe_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// Without a whitelist every peer is allowed. With one, the peer must be on it.
pub fn is_whitelisted(peer_ip: Option<IpAddr>, whitelist: Option<&[IpAddr]>) -> bool {
    match (peer_ip, whitelist) {
        (_, None) => true,
        (Some(ip), Some(whitelist)) => {
            let allowed = whitelist.contains(&ip);
            if !allowed {
                warn!("🔐️ Stripe webhook call from {ip}, which is not whitelisted. Denying access.");
            }
            allowed
        },
        (None, Some(_)) => {
            warn!("🔐️ No IP address found in Stripe webhook request. Denying access.");
            false
        },
    }
}
