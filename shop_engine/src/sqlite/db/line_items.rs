use log::trace;
use shop_common::Money;
use sqlx::SqliteConnection;

use super::products;
use crate::{
    db_types::{NewLineItem, OrderLineItem},
    traits::ShopError,
};

/// Attaches a line item to an order. The line total is fixed here, at the product's current price.
///
/// The order totals are *not* updated. Call [`super::orders::update_order_totals`] afterwards, in the same
/// transaction.
pub async fn attach_line_item(
    order_id: i64,
    item: &NewLineItem,
    conn: &mut SqliteConnection,
) -> Result<OrderLineItem, ShopError> {
    if item.quantity <= 0 {
        return Err(ShopError::InvalidLineItem(format!(
            "Quantity for product {} must be positive, not {}",
            item.product_id, item.quantity
        )));
    }
    let product = products::fetch_product(item.product_id, conn)
        .await?
        .ok_or(ShopError::ProductNotFound(item.product_id))?;
    let lineitem_total = product.price.checked_mul(item.quantity).ok_or_else(|| {
        ShopError::InvalidLineItem(format!("{} × {} is too large to charge", item.quantity, product.name))
    })?;
    let line_item: OrderLineItem = sqlx::query_as(
        r#"
            INSERT INTO order_line_items (order_id, product_id, product_size, quantity, lineitem_total)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(order_id)
    .bind(item.product_id)
    .bind(item.product_size.as_deref())
    .bind(item.quantity)
    .bind(lineitem_total.value())
    .fetch_one(conn)
    .await?;
    trace!("🗃️ Line item {} ({} × {}) attached to order {order_id}", line_item.id, item.quantity, product.name);
    Ok(line_item)
}

pub async fn fetch_line_items(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderLineItem>, sqlx::Error> {
    let items = sqlx::query_as("SELECT * FROM order_line_items WHERE order_id = $1 ORDER BY id ASC")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(items)
}

pub async fn order_subtotal(order_id: i64, conn: &mut SqliteConnection) -> Result<Money, sqlx::Error> {
    let total: Option<i64> =
        sqlx::query_scalar("SELECT SUM(lineitem_total) FROM order_line_items WHERE order_id = $1")
            .bind(order_id)
            .fetch_one(conn)
            .await?;
    Ok(Money::from(total.unwrap_or_default()))
}
