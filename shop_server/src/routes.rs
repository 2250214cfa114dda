//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Any long, non-cpu-bound operation (e.g. I/O, database operations,
//! etc.) should be expressed as futures or asynchronous functions, so that the worker can handle other requests in the
//! meantime.
//!
//! The shopping bag is held by the client. Bag routes take the current bag in the request body and return the new bag
//! (or its priced contents); the server does not keep one per visitor.
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use shop_engine::{
    bag::Bag,
    catalog_objects::ProductQuery,
    db_types::OrderNumber,
    traits::{CatalogManagement, OrderManagement, ProfileManagement, ProfileUpdate},
    CatalogApi,
    CheckoutApi,
    ProfileApi,
};

use crate::{
    data_objects::{AddToBagRequest, PlaceOrderRequest, ProductSearchParams},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]<B>(core::marker::PhantomData<fn() -> B>);}
        paste::paste! { impl<B> [<$name:camel Route>]<B> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> B>)
            }
        }}
        paste::paste! { impl<B> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<B>
        where
            B: $($bounds +)+ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<B>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Catalog  ----------------------------------------------------
route!(products => Get "/products" impl CatalogManagement);
/// Route handler for the product listing
///
/// Supports a free-text search (`q`, matched against product names and descriptions), a comma-separated list of
/// category names (`category`), and sorting (`sort` = name | price | rating | category, `direction` = asc | desc).
/// An empty `q` is rejected with a 400.
pub async fn products<B: CatalogManagement>(
    params: web::Query<ProductSearchParams>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let params = params.into_inner();
    debug!("💻️ GET products {params:?}");
    let query = ProductQuery::try_from(params).map_err(ServerError::InvalidRequestBody)?;
    let products = api.search_products(query).await?;
    Ok(HttpResponse::Ok().json(products))
}

route!(product_by_id => Get "/products/{product_id}" impl CatalogManagement);
pub async fn product_by_id<B: CatalogManagement>(
    path: web::Path<i64>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let product_id = path.into_inner();
    debug!("💻️ GET product {product_id}");
    let product = api.product_by_id(product_id).await?;
    Ok(HttpResponse::Ok().json(product))
}

route!(categories => Get "/categories" impl CatalogManagement);
pub async fn categories<B: CatalogManagement>(api: web::Data<CatalogApi<B>>) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET categories");
    let categories = api.categories().await?;
    Ok(HttpResponse::Ok().json(categories))
}

//----------------------------------------------   Bag  ----------------------------------------------------
route!(bag_contents => Post "/bag/contents" impl CatalogManagement);
/// Prices the bag in the request body: every line with its product, the subtotal, delivery, and grand total.
pub async fn bag_contents<B: CatalogManagement>(
    body: web::Json<Bag>,
    api: web::Data<CheckoutApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let bag = body.into_inner();
    trace!("💻️ POST bag contents for {bag}");
    let contents = api.bag_contents(&bag).await?;
    Ok(HttpResponse::Ok().json(contents))
}

route!(add_to_bag => Post "/bag/add/{product_id}" impl CatalogManagement);
/// Adds a product to the bag in the request body and returns the updated bag.
pub async fn add_to_bag<B: CatalogManagement>(
    path: web::Path<i64>,
    body: web::Json<AddToBagRequest>,
    api: web::Data<CheckoutApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let product_id = path.into_inner();
    let AddToBagRequest { bag, quantity, size } = body.into_inner();
    debug!("💻️ POST add {quantity} of product {product_id} (size {size:?}) to bag");
    let bag = api.add_to_bag(bag, product_id, quantity, size.as_deref()).await?;
    Ok(HttpResponse::Ok().json(bag))
}

//----------------------------------------------   Checkout  ----------------------------------------------------
route!(checkout_intent => Post "/checkout/intent" impl CatalogManagement);
/// The amount and currency to create the Stripe payment intent with, and the bag snapshot to attach to its metadata.
pub async fn checkout_intent<B: CatalogManagement>(
    body: web::Json<Bag>,
    api: web::Data<CheckoutApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let bag = body.into_inner();
    debug!("💻️ POST checkout intent for {bag}");
    let intent = api.payment_intent_amount(&bag).await?;
    Ok(HttpResponse::Ok().json(intent))
}

route!(place_order => Post "/checkout/orders" impl OrderManagement, ProfileManagement);
/// Places the order for a completed checkout. Returns 409 if the payment already has an order.
pub async fn place_order<B>(
    body: web::Json<PlaceOrderRequest>,
    api: web::Data<CheckoutApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement + ProfileManagement,
{
    let PlaceOrderRequest { form, bag, stripe_pid, username } = body.into_inner();
    debug!("💻️ POST place order for payment {stripe_pid}");
    let order = api.place_order(form, &bag, &stripe_pid, username.as_deref()).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(order_details => Get "/checkout/orders/{order_number}" impl OrderManagement, ProfileManagement);
/// The order confirmation: an order and its line items, by order number.
pub async fn order_details<B>(
    path: web::Path<String>,
    api: web::Data<ProfileApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement + ProfileManagement,
{
    let order_number = OrderNumber::from(path.into_inner());
    debug!("💻️ GET order {order_number}");
    let order = api.order_with_line_items(&order_number).await?;
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   Profiles  ----------------------------------------------------
// The username is taken as given. Signing in happens in front of this server.
route!(profile => Get "/profiles/{username}" impl OrderManagement, ProfileManagement);
/// The user's profile with their default delivery details. A profile is created on first access.
pub async fn profile<B>(
    path: web::Path<String>,
    api: web::Data<ProfileApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement + ProfileManagement,
{
    let username = path.into_inner();
    debug!("💻️ GET profile for {username}");
    let profile = api.fetch_or_create_profile(&username).await?;
    Ok(HttpResponse::Ok().json(profile))
}

route!(update_profile => Post "/profiles/{username}" impl OrderManagement, ProfileManagement);
/// Replaces the user's default delivery details. Fields that are missing or blank are cleared.
pub async fn update_profile<B>(
    path: web::Path<String>,
    body: web::Json<ProfileUpdate>,
    api: web::Data<ProfileApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement + ProfileManagement,
{
    let username = path.into_inner();
    debug!("💻️ POST profile update for {username}");
    let profile = api.update_profile(&username, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(profile))
}

route!(order_history => Get "/profiles/{username}/orders" impl OrderManagement, ProfileManagement);
/// The user's orders, newest first.
pub async fn order_history<B>(
    path: web::Path<String>,
    api: web::Data<ProfileApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement + ProfileManagement,
{
    let username = path.into_inner();
    trace!("💻️ GET order history for {username}");
    let orders = api.orders_for_profile(&username).await?;
    Ok(HttpResponse::Ok().json(orders))
}
