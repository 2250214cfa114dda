use crate::{
    db_types::UserProfile,
    traits::{ProfileUpdate, ShopError},
};

#[allow(async_fn_in_trait)]
pub trait ProfileManagement {
    async fn fetch_profile(&self, username: &str) -> Result<Option<UserProfile>, ShopError>;

    /// Fetches the profile for `username`, creating an empty one if the user does not have one yet.
    async fn fetch_or_create_profile(&self, username: &str) -> Result<UserProfile, ShopError>;

    /// Overwrites the profile's default delivery details. Returns `None` if there is no profile with this id.
    async fn update_profile_defaults(
        &self,
        profile_id: i64,
        update: &ProfileUpdate,
    ) -> Result<Option<UserProfile>, ShopError>;
}
