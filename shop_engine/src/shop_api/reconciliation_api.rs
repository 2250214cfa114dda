//! Payment reconciliation.
//!
//! When a payment succeeds, the payment processor tells us twice, in a way: the customer's browser completes checkout
//! (which normally creates the order), and the processor delivers a "payment succeeded" notification. The two race
//! each other, and either can fail. [`ReconciliationApi::reconcile`] makes sure that every successful payment ends up
//! as exactly one order:
//!
//! 1. Look for an order that matches the notification on every field. If checkout is still writing it, it may not be
//!    there yet, so the lookup is repeated a bounded number of times, with a pause in between.
//! 2. If the order turns up, there is nothing to do.
//! 3. Otherwise the order is created from the notification: the order and all its line items in one transaction.
//!
//! Either way, exactly one [`OrderConfirmedEvent`] is published per successful reconciliation.
use std::fmt::Debug;

use backon::{ConstantBuilder, Retryable};
use log::*;

use crate::{
    bag::Bag,
    db_types::{NewOrder, Order},
    events::{ConfirmationSource, EventProducers, OrderConfirmedEvent},
    pricing::DeliveryConfig,
    shop_api::{
        errors::ReconcileError,
        order_objects::{LookupPolicy, PaymentNotification, ReconcileOutcome},
    },
    traits::{OrderManagement, OrderMatch, ProfileManagement, ProfileUpdate, ShopError},
};

/// The result of a single lookup attempt.
#[derive(Debug)]
enum LookupError {
    NotYetPersisted,
    Failed(ShopError),
}

pub struct ReconciliationApi<B> {
    db: B,
    producers: EventProducers,
    delivery: DeliveryConfig,
    policy: LookupPolicy,
}

impl<B> Debug for ReconciliationApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReconciliationApi ({:?}, {:?})", self.delivery, self.policy)
    }
}

impl<B> ReconciliationApi<B> {
    pub fn new(db: B, producers: EventProducers, delivery: DeliveryConfig, policy: LookupPolicy) -> Self {
        Self { db, producers, delivery, policy }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> ReconciliationApi<B>
where B: OrderManagement + ProfileManagement
{
    /// Ensures the paid order described by `notification` exists in the ledger.
    ///
    /// Returns [`ReconcileOutcome::AlreadyExisted`] if checkout got there first (including a concurrent delivery of
    /// the same notification that won the race to create it), or [`ReconcileOutcome::Created`] if the order had to be
    /// created here. On error, no order was created and the caller should report failure so the notification is
    /// delivered again.
    pub async fn reconcile(&self, notification: PaymentNotification) -> Result<ReconcileOutcome, ReconcileError> {
        let notification = notification.normalize();
        let pid = notification.stripe_pid.clone();
        debug!("🔄️ Reconciling payment {pid}");
        let criteria = notification.order_match();
        if let Some(order) = self.find_existing_order(&criteria).await? {
            info!("🔄️ Payment {pid} verified. Order {} is already in the database", order.order_number);
            self.confirm(order.clone(), ConfirmationSource::PaymentVerified).await;
            return Ok(ReconcileOutcome::AlreadyExisted(order));
        }
        info!("🔄️ No order found for payment {pid}. Creating it from the payment details.");
        self.create_order(notification).await
    }

    /// Looks for the order, retrying while it has not been persisted. Database errors end the search immediately.
    async fn find_existing_order(&self, criteria: &OrderMatch) -> Result<Option<Order>, ReconcileError> {
        let pid = criteria.stripe_pid.as_str();
        let backoff = ConstantBuilder::default().with_delay(self.policy.interval).with_max_times(self.policy.retries());
        let result = (|| async {
            let orders = self.db.find_matching_orders(criteria).await.map_err(LookupError::Failed)?;
            if orders.len() > 1 {
                warn!("🔄️ {} orders match payment {pid}. Using the first one.", orders.len());
            }
            orders.into_iter().next().ok_or(LookupError::NotYetPersisted)
        })
        .retry(backoff)
        .when(|e| matches!(e, LookupError::NotYetPersisted))
        .notify(|_, delay| trace!("🔄️ Order for payment {pid} not found yet. Looking again in {delay:?}"))
        .await;
        match result {
            Ok(order) => Ok(Some(order)),
            Err(LookupError::NotYetPersisted) => Ok(None),
            Err(LookupError::Failed(e)) => {
                error!("🔄️ Order lookup for payment {pid} failed. {e}");
                Err(ReconcileError::LookupFailed(pid.to_string(), e))
            },
        }
    }

    async fn create_order(&self, notification: PaymentNotification) -> Result<ReconcileOutcome, ReconcileError> {
        let pid = notification.stripe_pid.clone();
        let bag = Bag::from_json(&notification.bag).map_err(|e| {
            warn!("🔄️ Cannot create an order for payment {pid}. {e}");
            ReconcileError::InvalidBag(pid.clone(), e)
        })?;
        let profile = match notification.registered_user() {
            Some(username) => {
                let profile = self
                    .db
                    .fetch_or_create_profile(username)
                    .await
                    .map_err(|e| ReconcileError::ProfileError(username.to_string(), e))?;
                Some(profile)
            },
            None => None,
        };
        let new_order =
            NewOrder::new(notification.details.clone(), notification.bag.clone(), notification.stripe_pid.clone())
                .with_user_profile(profile.as_ref().map(|p| p.id));
        let order = match self.db.insert_order_with_line_items(new_order, bag.expand(), &self.delivery).await {
            Ok(order) => order,
            Err(ShopError::OrderAlreadyExists(_)) => return self.lost_creation_race(&pid).await,
            Err(e) => {
                error!("🔄️ Could not create the order for payment {pid}. Nothing was saved. {e}");
                return Err(ReconcileError::CreationFailed(pid, e));
            },
        };
        if order.grand_total != notification.grand_total {
            warn!(
                "🔄️ Order {} was created for payment {pid}, but its total ({}) differs from the amount charged ({})",
                order.order_number, order.grand_total, notification.grand_total
            );
        }
        if let (Some(profile), true) = (&profile, notification.save_info) {
            let update = ProfileUpdate::from(&notification.details);
            if let Err(e) = self.db.update_profile_defaults(profile.id, &update).await {
                warn!("🔄️ Could not save delivery details to {}'s profile. {e}", profile.username);
            }
        }
        info!("🔄️ Order {} created for payment {pid}", order.order_number);
        self.confirm(order.clone(), ConfirmationSource::PaymentRecovered).await;
        Ok(ReconcileOutcome::Created(order))
    }

    /// Another delivery of the same notification created the order between our lookup and our insert.
    async fn lost_creation_race(&self, pid: &str) -> Result<ReconcileOutcome, ReconcileError> {
        debug!("🔄️ An order for payment {pid} was created concurrently");
        let existing = self
            .db
            .fetch_order_by_stripe_pid(pid)
            .await
            .map_err(|e| ReconcileError::LookupFailed(pid.to_string(), e))?
            .ok_or_else(|| {
                ReconcileError::LookupFailed(pid.to_string(), ShopError::OrderNotFound(format!("for payment {pid}")))
            })?;
        self.confirm(existing.clone(), ConfirmationSource::PaymentVerified).await;
        Ok(ReconcileOutcome::AlreadyExisted(existing))
    }

    async fn confirm(&self, order: Order, source: ConfirmationSource) {
        let line_items = match self.db.fetch_line_items(order.id).await {
            Ok(items) => items,
            Err(e) => {
                warn!("🔄️ Could not load line items for order {}. The confirmation will not list them. {e}", order.id);
                Vec::new()
            },
        };
        debug!("🔄️ Notifying order confirmed hook subscribers");
        self.producers.publish_order_confirmed(OrderConfirmedEvent::new(order, line_items, source)).await;
    }
}
