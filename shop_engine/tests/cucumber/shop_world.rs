use std::{
    future::Future,
    pin::Pin,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use cucumber::World;
use log::*;
use shop_engine::{
    events::{EventHandlers, EventHooks},
    order_objects::{LookupPolicy, ReconcileOutcome},
    pricing::DeliveryConfig,
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    CheckoutApi,
    ReconcileError,
    ReconciliationApi,
    SqliteDatabase,
};

#[derive(Default, Debug, World)]
pub struct ShopWorld {
    pub system: Option<ShopSystem>,
    pub last_outcome: Option<Result<ReconcileOutcome, ReconcileError>>,
}

#[derive(Debug)]
pub struct ShopSystem {
    pub db_path: String,
    pub db: SqliteDatabase,
    pub reconciler: ReconciliationApi<SqliteDatabase>,
    pub checkout: CheckoutApi<SqliteDatabase>,
    pub confirmations: Arc<AtomicUsize>,
}

impl ShopWorld {
    pub fn system(&self) -> &ShopSystem {
        self.system.as_ref().expect("Shop not initialised")
    }
}

impl ShopSystem {
    pub async fn new(policy: LookupPolicy) -> Self {
        let db_path = random_db_path();
        let db = prepare_test_env(&db_path).await;
        debug!("Created database: {db_path}");
        let confirmations = Arc::new(AtomicUsize::new(0));
        let counter = confirmations.clone();
        let mut hooks = EventHooks::default();
        hooks.on_order_confirmed(move |ev| {
            let counter = counter.clone();
            Box::pin(async move {
                debug!("🪝️ Order {} confirmed", ev.order.order_number);
                counter.fetch_add(1, Ordering::SeqCst);
            }) as Pin<Box<dyn Future<Output = ()> + Send>>
        });
        let handlers = EventHandlers::new(16, hooks);
        let producers = handlers.producers();
        // The handler tasks end when the APIs holding the producers are dropped along with the world
        let _ = handlers.start_handlers();
        let delivery = DeliveryConfig::default();
        let reconciler = ReconciliationApi::new(db.clone(), producers, delivery, policy);
        let checkout = CheckoutApi::new(db.clone(), delivery);
        Self { db_path, db, reconciler, checkout, confirmations }
    }

    /// Confirmations are handled asynchronously, so give them a moment to arrive.
    pub async fn wait_for_confirmations(&self, expected: usize) -> usize {
        for _ in 0..50 {
            if self.confirmations.load(Ordering::SeqCst) >= expected {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        // Anything extra would show up in the same window
        tokio::time::sleep(Duration::from_millis(50)).await;
        self.confirmations.load(Ordering::SeqCst)
    }
}
