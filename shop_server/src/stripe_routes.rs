//! The Stripe webhook endpoint.
//!
//! Stripe retries a webhook call until it gets a 2xx response. So every event the shop does not act on is acknowledged
//! with a 200, and only a failed reconciliation returns a 500, asking Stripe to deliver the event again.
use actix_web::{web, HttpResponse};
use log::*;
use shop_engine::{
    order_objects::{PaymentNotification, ReconcileOutcome},
    traits::{OrderManagement, ProfileManagement},
    ReconciliationApi,
};

use crate::{
    data_objects::JsonResponse,
    errors::ServerError,
    integrations::stripe::{StripeEvent, StripeEventType},
    route,
};

route!(stripe_webhook => Post "/webhook" impl OrderManagement, ProfileManagement);
pub async fn stripe_webhook<B>(
    body: web::Json<StripeEvent>,
    api: web::Data<ReconciliationApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement + ProfileManagement,
{
    let event = body.into_inner();
    let kind = event.kind();
    debug!("💳️ Received Stripe webhook {} ({kind})", event.id);
    let response = match &kind {
        StripeEventType::PaymentIntentSucceeded => handle_payment_intent_succeeded(&event, api.as_ref()).await?,
        StripeEventType::PaymentIntentFailed => {
            info!("💳️ Payment failed for event {}. Nothing to do.", event.id);
            HttpResponse::Ok().json(JsonResponse::success(format!("Webhook received: {kind}")))
        },
        StripeEventType::Other(event_type) => {
            trace!("💳️ Ignoring {event_type} webhook");
            HttpResponse::Ok().json(JsonResponse::success(format!("Unhandled webhook received: {event_type}")))
        },
    };
    Ok(response)
}

async fn handle_payment_intent_succeeded<B>(
    event: &StripeEvent,
    api: &ReconciliationApi<B>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement + ProfileManagement,
{
    let notification = event.payment_intent().and_then(PaymentNotification::try_from).map_err(|e| {
        warn!("💳️ Could not read the payment intent in event {}. {e}", event.id);
        e
    })?;
    let pid = notification.stripe_pid.clone();
    let response = match api.reconcile(notification).await {
        Ok(ReconcileOutcome::AlreadyExisted(order)) => {
            info!("💳️ Payment {pid} verified against order {}", order.order_number);
            HttpResponse::Ok().json(JsonResponse::success(format!(
                "Webhook received: {} | SUCCESS: Verified order already in database",
                event.event_type
            )))
        },
        Ok(ReconcileOutcome::Created(order)) => {
            info!("💳️ Order {} created from payment {pid}", order.order_number);
            HttpResponse::Ok().json(JsonResponse::success(format!(
                "Webhook received: {} | SUCCESS: Created order in webhook",
                event.event_type
            )))
        },
        Err(e) => {
            error!("💳️ Could not reconcile payment {pid}. Stripe will deliver it again. {e}");
            HttpResponse::InternalServerError()
                .json(JsonResponse::failure(format!("Webhook received: {} | ERROR: {e}", event.event_type)))
        },
    };
    Ok(response)
}
