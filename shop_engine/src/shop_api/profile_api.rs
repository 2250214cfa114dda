use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Order, OrderNumber, UserProfile},
    shop_api::{errors::ProfileApiError, order_objects::OrderWithLineItems},
    traits::{OrderManagement, ProfileManagement, ProfileUpdate},
};

/// User profiles, their default delivery details, and their order history.
pub struct ProfileApi<B> {
    db: B,
}

impl<B> Debug for ProfileApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ProfileApi")
    }
}

impl<B> ProfileApi<B>
where B: OrderManagement + ProfileManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn fetch_or_create_profile(&self, username: &str) -> Result<UserProfile, ProfileApiError> {
        let profile = self.db.fetch_or_create_profile(username).await?;
        Ok(profile)
    }

    /// Replaces the user's default delivery details. Blank fields are cleared.
    pub async fn update_profile(&self, username: &str, update: ProfileUpdate) -> Result<UserProfile, ProfileApiError> {
        let profile =
            self.db.fetch_profile(username).await?.ok_or_else(|| ProfileApiError::ProfileNotFound(username.into()))?;
        let updated = self
            .db
            .update_profile_defaults(profile.id, &update.normalize())
            .await?
            .ok_or_else(|| ProfileApiError::ProfileNotFound(username.into()))?;
        debug!("🗃️ Profile for {username} updated");
        Ok(updated)
    }

    /// The user's orders, newest first. A user without a profile has no orders.
    pub async fn orders_for_profile(&self, username: &str) -> Result<Vec<Order>, ProfileApiError> {
        match self.db.fetch_profile(username).await? {
            Some(profile) => Ok(self.db.fetch_orders_for_profile(profile.id).await?),
            None => Ok(Vec::new()),
        }
    }

    pub async fn order_with_line_items(&self, order_number: &OrderNumber) -> Result<OrderWithLineItems, ProfileApiError> {
        let order = self
            .db
            .fetch_order_by_number(order_number)
            .await?
            .ok_or_else(|| ProfileApiError::OrderNotFound(order_number.to_string()))?;
        let line_items = self.db.fetch_line_items(order.id).await?;
        Ok(OrderWithLineItems { order, line_items })
    }
}
