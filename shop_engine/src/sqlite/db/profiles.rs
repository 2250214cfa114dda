use log::debug;
use sqlx::SqliteConnection;

use crate::{db_types::UserProfile, traits::ProfileUpdate};

pub async fn fetch_profile(username: &str, conn: &mut SqliteConnection) -> Result<Option<UserProfile>, sqlx::Error> {
    let profile = sqlx::query_as("SELECT * FROM user_profiles WHERE username = $1")
        .bind(username)
        .fetch_optional(conn)
        .await?;
    Ok(profile)
}

/// Returns the profile for `username`, creating an empty one if necessary. Safe to call concurrently for the same user.
pub async fn fetch_or_create_profile(username: &str, conn: &mut SqliteConnection) -> Result<UserProfile, sqlx::Error> {
    let inserted = sqlx::query("INSERT INTO user_profiles (username) VALUES ($1) ON CONFLICT (username) DO NOTHING")
        .bind(username)
        .execute(&mut *conn)
        .await?;
    if inserted.rows_affected() > 0 {
        debug!("🗃️ Created profile for {username}");
    }
    let profile =
        sqlx::query_as("SELECT * FROM user_profiles WHERE username = $1").bind(username).fetch_one(conn).await?;
    Ok(profile)
}

pub async fn update_profile_defaults(
    profile_id: i64,
    update: &ProfileUpdate,
    conn: &mut SqliteConnection,
) -> Result<Option<UserProfile>, sqlx::Error> {
    let address = &update.default_address;
    let profile = sqlx::query_as(
        r#"
            UPDATE user_profiles SET
                default_full_name = $1,
                default_phone_number = $2,
                default_country = $3,
                default_postcode = $4,
                default_town_or_city = $5,
                default_street_address1 = $6,
                default_street_address2 = $7,
                default_county = $8
            WHERE id = $9
            RETURNING *;
        "#,
    )
    .bind(update.default_full_name.as_deref())
    .bind(update.default_phone_number.as_deref())
    .bind(address.country.as_deref())
    .bind(address.postcode.as_deref())
    .bind(address.town_or_city.as_deref())
    .bind(address.street_address1.as_deref())
    .bind(address.street_address2.as_deref())
    .bind(address.county.as_deref())
    .bind(profile_id)
    .fetch_optional(conn)
    .await?;
    Ok(profile)
}
