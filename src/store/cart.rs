//! Cart manager: one live (user, product, quantity) line per pair.
//!
//! Cart lines are mutable pre-order intent. They disappear when the order
//! engine commits a checkout; order lines are the immutable record.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{can_fulfill, line_total, merged_cart_quantity};
use crate::error::{Result, ShopError};
use crate::store::catalog;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CartLineRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

/// One cart line joined with the product's current name and price.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CartViewLine {
    pub line_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub unit_price_cents: i64,
    pub quantity: i32,
    pub line_total_cents: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub lines: Vec<CartViewLine>,
    pub total_cents: i64,
    pub item_count: i64,
}

/// Adds `quantity` of a product to the user's cart, merging additively into
/// an existing line. The stock check here is the soft, informational one:
/// the merged line quantity must not exceed current stock. The hard gate
/// runs again at payment commit.
pub async fn add_to_cart(
    db: &PgPool,
    user_id: Uuid,
    product_id: Uuid,
    quantity: i32,
) -> Result<CartLineRow> {
    if quantity < 1 {
        return Err(ShopError::Validation("quantity must be at least 1".into()));
    }
    let product = catalog::get_product(db, product_id)
        .await?
        .ok_or(ShopError::NotFound("product"))?;

    let existing: Option<(i32,)> = sqlx::query_as(
        "SELECT quantity FROM cart_lines WHERE user_id = $1 AND product_id = $2",
    )
    .bind(user_id)
    .bind(product_id)
    .fetch_optional(db)
    .await?;
    let merged = merged_cart_quantity(existing.map(|(q,)| q), quantity);
    if !can_fulfill(product.quantity, merged) {
        return Err(ShopError::OutOfStock { product: product.name });
    }

    Ok(sqlx::query_as::<_, CartLineRow>(
        "INSERT INTO cart_lines (id, user_id, product_id, quantity) VALUES ($1, $2, $3, $4) \
         ON CONFLICT (user_id, product_id) \
         DO UPDATE SET quantity = cart_lines.quantity + EXCLUDED.quantity RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(user_id)
    .bind(product_id)
    .bind(quantity)
    .fetch_one(db)
    .await?)
}

/// Steps a line's quantity up or down by `delta`, flooring at 1. Decreasing
/// never deletes implicitly; use [`remove_line`] for that.
pub async fn update_quantity(
    db: &PgPool,
    user_id: Uuid,
    line_id: Uuid,
    delta: i32,
) -> Result<CartLineRow> {
    sqlx::query_as::<_, CartLineRow>(
        "UPDATE cart_lines SET quantity = GREATEST(1, quantity + $3) \
         WHERE id = $1 AND user_id = $2 RETURNING *",
    )
    .bind(line_id)
    .bind(user_id)
    .bind(delta)
    .fetch_optional(db)
    .await?
    .ok_or(ShopError::NotFound("cart line"))
}

/// Idempotent: removing a line that does not exist is a no-op.
pub async fn remove_line(db: &PgPool, user_id: Uuid, line_id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM cart_lines WHERE id = $1 AND user_id = $2")
        .bind(line_id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(())
}

/// Side-effect-free view of the cart with current prices and totals.
pub async fn view_cart(db: &PgPool, user_id: Uuid) -> Result<CartView> {
    let lines = sqlx::query_as::<_, CartViewLine>(
        "SELECT cl.id AS line_id, cl.product_id, p.name AS product_name, \
                p.price_cents AS unit_price_cents, cl.quantity, \
                p.price_cents * cl.quantity AS line_total_cents \
         FROM cart_lines cl JOIN products p ON p.id = cl.product_id \
         WHERE cl.user_id = $1 ORDER BY cl.created_at",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    let total_cents = lines.iter().map(|l| line_total(l.unit_price_cents, l.quantity)).sum();
    let item_count = lines.iter().map(|l| l.quantity as i64).sum();
    Ok(CartView { lines, total_cents, item_count })
}
