//! Categories and products.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Result, ShopError};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CategoryRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub quantity: i32,
    pub image_url: Option<String>,
    pub category_id: Option<Uuid>,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub async fn list_categories(db: &PgPool) -> Result<Vec<CategoryRow>> {
    Ok(sqlx::query_as::<_, CategoryRow>("SELECT * FROM categories ORDER BY name")
        .fetch_all(db)
        .await?)
}

pub async fn create_category(db: &PgPool, name: &str, description: Option<&str>) -> Result<CategoryRow> {
    sqlx::query_as::<_, CategoryRow>(
        "INSERT INTO categories (id, name, description) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(name)
    .bind(description)
    .fetch_one(db)
    .await
    .map_err(|e| ShopError::conflict_on_unique(e, "category"))
}

pub async fn update_category(
    db: &PgPool,
    id: Uuid,
    name: &str,
    description: Option<&str>,
) -> Result<CategoryRow> {
    sqlx::query_as::<_, CategoryRow>(
        "UPDATE categories SET name = $2, description = $3 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(name)
    .bind(description)
    .fetch_optional(db)
    .await
    .map_err(|e| ShopError::conflict_on_unique(e, "category"))?
    .ok_or(ShopError::NotFound("category"))
}

/// Refused while any product, even a soft-deleted one, still references the
/// category.
pub async fn delete_category(db: &PgPool, id: Uuid) -> Result<()> {
    let in_use: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products WHERE category_id = $1")
        .bind(id)
        .fetch_one(db)
        .await?;
    if in_use.0 > 0 {
        return Err(ShopError::Conflict("category still has products".into()));
    }
    let done = sqlx::query("DELETE FROM categories WHERE id = $1").bind(id).execute(db).await?;
    if done.rows_affected() == 0 {
        return Err(ShopError::NotFound("category"));
    }
    Ok(())
}

/// Live-catalog listing: soft-deleted products are invisible. `search`
/// matches product and category names, case-insensitively.
pub async fn list_products(
    db: &PgPool,
    category: Option<Uuid>,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<(Vec<ProductRow>, i64)> {
    let products = sqlx::query_as::<_, ProductRow>(
        "SELECT p.* FROM products p LEFT JOIN categories c ON c.id = p.category_id \
         WHERE NOT p.deleted \
           AND ($1::uuid IS NULL OR p.category_id = $1) \
           AND ($2::text IS NULL OR p.name ILIKE '%' || $2 || '%' OR c.name ILIKE '%' || $2 || '%') \
         ORDER BY p.created_at DESC LIMIT $3 OFFSET $4",
    )
    .bind(category)
    .bind(search)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;
    let total: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM products p LEFT JOIN categories c ON c.id = p.category_id \
         WHERE NOT p.deleted \
           AND ($1::uuid IS NULL OR p.category_id = $1) \
           AND ($2::text IS NULL OR p.name ILIKE '%' || $2 || '%' OR c.name ILIKE '%' || $2 || '%')",
    )
    .bind(category)
    .bind(search)
    .fetch_one(db)
    .await?;
    Ok((products, total.0))
}

/// Back-office listing: soft-deleted products included.
pub async fn list_all_products(db: &PgPool, limit: i64, offset: i64) -> Result<(Vec<ProductRow>, i64)> {
    let products = sqlx::query_as::<_, ProductRow>(
        "SELECT * FROM products ORDER BY created_at DESC LIMIT $1 OFFSET $2",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;
    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products").fetch_one(db).await?;
    Ok((products, total.0))
}

pub async fn get_product(db: &PgPool, id: Uuid) -> Result<Option<ProductRow>> {
    Ok(sqlx::query_as::<_, ProductRow>("SELECT * FROM products WHERE id = $1 AND NOT deleted")
        .bind(id)
        .fetch_optional(db)
        .await?)
}

pub async fn create_product(
    db: &PgPool,
    name: &str,
    description: Option<&str>,
    price_cents: i64,
    quantity: i32,
    category_id: Option<Uuid>,
) -> Result<ProductRow> {
    Ok(sqlx::query_as::<_, ProductRow>(
        "INSERT INTO products (id, name, description, price_cents, quantity, category_id) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(name)
    .bind(description)
    .bind(price_cents)
    .bind(quantity)
    .bind(category_id)
    .fetch_one(db)
    .await?)
}

pub async fn update_product(
    db: &PgPool,
    id: Uuid,
    name: &str,
    description: Option<&str>,
    price_cents: i64,
    category_id: Option<Uuid>,
) -> Result<ProductRow> {
    sqlx::query_as::<_, ProductRow>(
        "UPDATE products SET name = $2, description = $3, price_cents = $4, category_id = $5, \
         updated_at = NOW() WHERE id = $1 AND NOT deleted RETURNING *",
    )
    .bind(id)
    .bind(name)
    .bind(description)
    .bind(price_cents)
    .bind(category_id)
    .fetch_optional(db)
    .await?
    .ok_or(ShopError::NotFound("product"))
}

pub async fn soft_delete_product(db: &PgPool, id: Uuid) -> Result<()> {
    let done = sqlx::query(
        "UPDATE products SET deleted = TRUE, updated_at = NOW() WHERE id = $1 AND NOT deleted",
    )
    .bind(id)
    .execute(db)
    .await?;
    if done.rows_affected() == 0 {
        return Err(ShopError::NotFound("product"));
    }
    Ok(())
}

/// Admin stock override: sets quantity-on-hand outright.
pub async fn set_stock(db: &PgPool, id: Uuid, quantity: i32) -> Result<ProductRow> {
    sqlx::query_as::<_, ProductRow>(
        "UPDATE products SET quantity = $2, updated_at = NOW() \
         WHERE id = $1 AND NOT deleted RETURNING *",
    )
    .bind(id)
    .bind(quantity)
    .fetch_optional(db)
    .await?
    .ok_or(ShopError::NotFound("product"))
}

pub async fn set_image(db: &PgPool, id: Uuid, image_url: &str) -> Result<ProductRow> {
    sqlx::query_as::<_, ProductRow>(
        "UPDATE products SET image_url = $2, updated_at = NOW() \
         WHERE id = $1 AND NOT deleted RETURNING *",
    )
    .bind(id)
    .bind(image_url)
    .fetch_optional(db)
    .await?
    .ok_or(ShopError::NotFound("product"))
}
