//! Orders and their immutable line items.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{OrderStatus, PaymentStatus};
use crate::error::Result;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_ref: Option<String>,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Price and name are copied from the product at snapshot time and never
/// touched again.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderLineRow {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price_cents: i64,
}

pub async fn get_order(db: &PgPool, id: Uuid) -> Result<Option<OrderRow>> {
    Ok(sqlx::query_as::<_, OrderRow>("SELECT * FROM orders WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await?)
}

pub async fn find_pending_for_user(db: &PgPool, user_id: Uuid) -> Result<Option<OrderRow>> {
    Ok(sqlx::query_as::<_, OrderRow>(
        "SELECT * FROM orders WHERE user_id = $1 AND status = 'pending'",
    )
    .bind(user_id)
    .fetch_optional(db)
    .await?)
}

pub async fn lines_for_order(db: &PgPool, order_id: Uuid) -> Result<Vec<OrderLineRow>> {
    Ok(sqlx::query_as::<_, OrderLineRow>(
        "SELECT * FROM order_lines WHERE order_id = $1 ORDER BY product_id",
    )
    .bind(order_id)
    .fetch_all(db)
    .await?)
}

/// Shopper-facing history: payment-completed orders only.
pub async fn history_for_user(db: &PgPool, user_id: Uuid) -> Result<Vec<OrderRow>> {
    Ok(sqlx::query_as::<_, OrderRow>(
        "SELECT * FROM orders WHERE user_id = $1 AND payment_status = 'completed' \
         ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?)
}

pub async fn list_pending(db: &PgPool) -> Result<Vec<OrderRow>> {
    Ok(sqlx::query_as::<_, OrderRow>(
        "SELECT * FROM orders WHERE status = 'pending' ORDER BY created_at",
    )
    .fetch_all(db)
    .await?)
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TopProduct {
    pub product_id: Uuid,
    pub product_name: String,
    pub units_sold: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SalesStats {
    pub total_users: i64,
    pub total_sales_cents: i64,
    pub pending_orders: i64,
    pub top_products: Vec<TopProduct>,
}

/// Back-office dashboard aggregates: user count, completed sales total,
/// pending order count, and top sellers by units.
pub async fn sales_stats(db: &PgPool, top_n: i64) -> Result<SalesStats> {
    let total_users: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users").fetch_one(db).await?;
    let total_sales: (Option<i64>,) = sqlx::query_as(
        "SELECT SUM(total_cents) FROM orders WHERE payment_status = 'completed'",
    )
    .fetch_one(db)
    .await?;
    let pending: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM orders WHERE status = 'pending'").fetch_one(db).await?;
    let top_products = sqlx::query_as::<_, TopProduct>(
        "SELECT ol.product_id, ol.product_name, SUM(ol.quantity)::bigint AS units_sold \
         FROM order_lines ol JOIN orders o ON o.id = ol.order_id \
         WHERE o.status = 'confirmed' \
         GROUP BY ol.product_id, ol.product_name \
         ORDER BY units_sold DESC LIMIT $1",
    )
    .bind(top_n)
    .fetch_all(db)
    .await?;
    Ok(SalesStats {
        total_users: total_users.0,
        total_sales_cents: total_sales.0.unwrap_or(0),
        pending_orders: pending.0,
        top_products,
    })
}
