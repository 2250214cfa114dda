use log::{debug, trace};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    db_types::{Category, NewProduct, Product},
    shop_api::catalog_objects::{ProductQuery, SortDirection, SortKey},
    traits::ShopError,
};

pub async fn fetch_product(product_id: i64, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    let product =
        sqlx::query_as("SELECT * FROM products WHERE id = $1").bind(product_id).fetch_optional(conn).await?;
    Ok(product)
}

/// Translates the query into a single SELECT.
///
/// The search term matches name or description, case-insensitively. Category filters match the category name.
/// Without a sort key, products come back in id order.
pub async fn search_products(query: &ProductQuery, conn: &mut SqliteConnection) -> Result<Vec<Product>, sqlx::Error> {
    let mut builder = QueryBuilder::<Sqlite>::new(
        "SELECT products.* FROM products LEFT JOIN categories ON products.category_id = categories.id",
    );
    let has_term = query.q.is_some();
    let has_categories = !query.categories.is_empty();
    if has_term || has_categories {
        builder.push(" WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(term) = &query.q {
        let pattern = format!("%{}%", escape_like(term));
        where_clause.push("(products.name LIKE ");
        where_clause.push_bind_unseparated(pattern.clone());
        where_clause.push_unseparated(" ESCAPE '\\' OR products.description LIKE ");
        where_clause.push_bind_unseparated(pattern);
        where_clause.push_unseparated(" ESCAPE '\\')");
    }
    if has_categories {
        where_clause.push("categories.name IN (");
        for (i, name) in query.categories.iter().enumerate() {
            if i > 0 {
                where_clause.push_unseparated(", ");
            }
            where_clause.push_bind_unseparated(name.clone());
        }
        where_clause.push_unseparated(")");
    }
    let direction = match query.direction {
        SortDirection::Asc => "ASC",
        SortDirection::Desc => "DESC",
    };
    let order_by = match query.sort {
        None => "products.id ASC".to_string(),
        Some(SortKey::Name) => format!("LOWER(products.name) {direction}, products.id ASC"),
        Some(SortKey::Price) => format!("products.price {direction}, products.id ASC"),
        Some(SortKey::Rating) => format!("products.rating {direction}, products.id ASC"),
        Some(SortKey::Category) => format!("categories.name {direction}, products.id ASC"),
    };
    builder.push(" ORDER BY ");
    builder.push(order_by);
    trace!("🗃️ Executing query: {}", builder.sql());
    let products = builder.build_query_as::<Product>().fetch_all(conn).await?;
    Ok(products)
}

fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

pub async fn insert_product(product: NewProduct, conn: &mut SqliteConnection) -> Result<Product, sqlx::Error> {
    let product: Product = sqlx::query_as(
        r#"
            INSERT INTO products (category_id, sku, name, description, has_sizes, price, rating, image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *;
        "#,
    )
    .bind(product.category_id)
    .bind(product.sku)
    .bind(product.name)
    .bind(product.description)
    .bind(product.has_sizes)
    .bind(product.price.value())
    .bind(product.rating)
    .bind(product.image_url)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Product '{}' saved with id {}", product.name, product.id);
    Ok(product)
}

pub async fn fetch_categories(conn: &mut SqliteConnection) -> Result<Vec<Category>, sqlx::Error> {
    let categories = sqlx::query_as("SELECT * FROM categories ORDER BY name ASC").fetch_all(conn).await?;
    Ok(categories)
}

pub async fn insert_category(
    name: &str,
    friendly_name: Option<&str>,
    conn: &mut SqliteConnection,
) -> Result<Category, ShopError> {
    let result = sqlx::query_as("INSERT INTO categories (name, friendly_name) VALUES ($1, $2) RETURNING *")
        .bind(name)
        .bind(friendly_name)
        .fetch_one(conn)
        .await;
    match result {
        Ok(category) => Ok(category),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Err(ShopError::CategoryAlreadyExists(name.to_string()))
        },
        Err(e) => Err(e.into()),
    }
}
