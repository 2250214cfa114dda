use chrono::Utc;
use log::{debug, trace};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use super::UNICODE_NOCASE;
use crate::{
    db_types::{NewOrder, Order, OrderNumber},
    pricing::{DeliveryConfig, OrderTotals},
    traits::{OrderMatch, ShopError},
};

/// Inserts a new order with zero totals. This is not atomic on its own; embed it in a transaction along with the
/// line items and pass `&mut *tx` as the connection argument.
///
/// A second order for the same non-empty payment id violates the unique index on `stripe_pid`, and is reported as
/// [`ShopError::OrderAlreadyExists`].
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, ShopError> {
    let NewOrder { order_number, user_profile_id, details, original_bag, stripe_pid } = order;
    let details = details.normalize();
    let result = sqlx::query_as(
        r#"
            INSERT INTO orders (
                order_number,
                user_profile_id,
                full_name,
                email,
                phone_number,
                country,
                postcode,
                town_or_city,
                street_address1,
                street_address2,
                county,
                date,
                original_bag,
                stripe_pid
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *;
        "#,
    )
    .bind(order_number)
    .bind(user_profile_id)
    .bind(details.full_name)
    .bind(details.email)
    .bind(details.phone_number)
    .bind(details.address.country)
    .bind(details.address.postcode)
    .bind(details.address.town_or_city)
    .bind(details.address.street_address1)
    .bind(details.address.street_address2)
    .bind(details.address.county)
    .bind(Utc::now())
    .bind(original_bag)
    .bind(stripe_pid.as_str())
    .fetch_one(conn)
    .await;
    match result {
        Ok(order) => Ok(order),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            debug!("🗃️ An order for payment {stripe_pid} already exists");
            Err(ShopError::OrderAlreadyExists(stripe_pid))
        },
        Err(e) => Err(e.into()),
    }
}

/// Recalculates the order's subtotal from its line items, applies the delivery rules and saves the totals.
pub async fn update_order_totals(
    order_id: i64,
    delivery: &DeliveryConfig,
    conn: &mut SqliteConnection,
) -> Result<Order, ShopError> {
    let subtotal = super::line_items::order_subtotal(order_id, conn).await?;
    let totals = OrderTotals::from_subtotal(subtotal, delivery);
    trace!("🗃️ Order {order_id} totals: {totals:?}");
    let order = sqlx::query_as(
        "UPDATE orders SET order_total = $1, delivery_cost = $2, grand_total = $3 WHERE id = $4 RETURNING *",
    )
    .bind(totals.order_total.value())
    .bind(totals.delivery_cost.value())
    .bind(totals.grand_total.value())
    .bind(order_id)
    .fetch_optional(conn)
    .await?;
    order.ok_or_else(|| ShopError::OrderNotFound(order_id.to_string()))
}

/// Every order that agrees with `criteria` on all fields, oldest first.
///
/// Text fields compare case-insensitively, in any script. A missing address field only matches a NULL column.
pub async fn find_matching_orders(criteria: &OrderMatch, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let details = &criteria.details;
    let address = &details.address;
    let mut builder = QueryBuilder::<Sqlite>::new("SELECT * FROM orders WHERE ");
    let mut where_clause = builder.separated(" AND ");
    let text_fields = [
        ("full_name", Some(&details.full_name)),
        ("email", Some(&details.email)),
        ("phone_number", Some(&details.phone_number)),
        ("country", address.country.as_ref()),
        ("postcode", address.postcode.as_ref()),
        ("town_or_city", address.town_or_city.as_ref()),
        ("street_address1", address.street_address1.as_ref()),
        ("street_address2", address.street_address2.as_ref()),
        ("county", address.county.as_ref()),
    ];
    for (column, value) in text_fields {
        match value {
            Some(v) => {
                where_clause.push(format!("{column} = "));
                where_clause.push_bind_unseparated(v.clone());
                where_clause.push_unseparated(format!(" COLLATE {UNICODE_NOCASE}"));
            },
            None => {
                where_clause.push(format!("{column} IS NULL"));
            },
        }
    }
    where_clause.push("grand_total = ");
    where_clause.push_bind_unseparated(criteria.grand_total.value());
    where_clause.push("original_bag = ");
    where_clause.push_bind_unseparated(criteria.original_bag.clone());
    where_clause.push("stripe_pid = ");
    where_clause.push_bind_unseparated(criteria.stripe_pid.clone());
    builder.push(" ORDER BY id ASC");
    trace!("🗃️ Executing query: {}", builder.sql());
    let orders = builder.build_query_as::<Order>().fetch_all(conn).await?;
    Ok(orders)
}

pub async fn fetch_order_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn fetch_order_by_stripe_pid(
    stripe_pid: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE stripe_pid = $1 AND stripe_pid <> '' LIMIT 1")
        .bind(stripe_pid)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

pub async fn fetch_order_by_number(
    order_number: &OrderNumber,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE order_number = $1")
        .bind(order_number.as_str())
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

/// Newest first
pub async fn fetch_orders_for_profile(profile_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as("SELECT * FROM orders WHERE user_profile_id = $1 ORDER BY date DESC, id DESC")
        .bind(profile_id)
        .fetch_all(conn)
        .await?;
    Ok(orders)
}

/// Deletes the order. Its line items go with it.
pub async fn delete_order(order_id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM orders WHERE id = $1").bind(order_id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}

