//! The order engine: cart → pending snapshot → confirmed order.
//!
//! `pending → confirmed | cancelled`; nothing leaves `confirmed`. The commit
//! step is the one transactional boundary in the system: stock is re-read
//! under row locks, decremented, the order flipped, and the cart cleared as
//! a single atomic unit.

use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{
    generate_payment_ref, line_total, plan_commit, CardDetails, CommitLine, OrderStatus,
};
use crate::error::{Result, ShopError};
use crate::store::accounts;
use crate::store::cart;
use crate::store::orders::{self, OrderLineRow, OrderRow};
use crate::AppState;

/// A pending order together with its snapshot lines.
#[derive(Debug, serde::Serialize)]
pub struct CheckoutView {
    pub order: OrderRow,
    pub lines: Vec<OrderLineRow>,
}

/// Materializes the user's cart into a pending order, copying each
/// product's current price into the lines. Re-entering checkout while a
/// pending order exists returns that order untouched — the snapshot is
/// created at most once per active cart session.
pub async fn begin_checkout(db: &PgPool, user_id: Uuid) -> Result<CheckoutView> {
    if let Some(order) = orders::find_pending_for_user(db, user_id).await? {
        let lines = orders::lines_for_order(db, order.id).await?;
        return Ok(CheckoutView { order, lines });
    }

    let view = cart::view_cart(db, user_id).await?;
    if view.lines.is_empty() {
        return Err(ShopError::Validation("cart is empty".into()));
    }

    let mut tx = db.begin().await?;
    let order = sqlx::query_as::<_, OrderRow>(
        "INSERT INTO orders (id, user_id, total_cents) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(user_id)
    .bind(view.total_cents)
    .fetch_one(&mut *tx)
    .await
    // Partial unique index: a concurrent snapshot for the same user lost
    // the race; surface it rather than duplicating lines.
    .map_err(|e| ShopError::conflict_on_unique(e, "pending order"))?;

    let lines = snapshot_lines(order.id, &view.lines);
    for l in &lines {
        sqlx::query(
            "INSERT INTO order_lines (order_id, product_id, product_name, quantity, unit_price_cents) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(l.order_id)
        .bind(l.product_id)
        .bind(&l.product_name)
        .bind(l.quantity)
        .bind(l.unit_price_cents)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    tracing::info!(order_id = %order.id, user_id = %user_id, total_cents = order.total_cents,
        "checkout snapshot created");
    Ok(CheckoutView { order, lines })
}

/// Simulated payment authorization for the caller's pending order. On
/// success the order is committed (stock decremented, cart cleared) and a
/// confirmation is published best-effort.
pub async fn submit_payment(state: &AppState, user_id: Uuid, card: &CardDetails) -> Result<OrderRow> {
    if !card.is_complete() {
        return Err(ShopError::InvalidPayment);
    }
    let order = orders::find_pending_for_user(&state.db, user_id)
        .await?
        .ok_or(ShopError::InvalidState("no checkout in progress"))?;
    let order = commit_order(&state.db, &order).await?;
    notify_owner(state, &order).await;
    Ok(order)
}

/// Admin override for out-of-band payment confirmation. Runs the identical
/// commit path; rejected unless the order is currently pending.
pub async fn force_confirm(state: &AppState, order_id: Uuid) -> Result<OrderRow> {
    let order = orders::get_order(&state.db, order_id).await?.ok_or(ShopError::NotFound("order"))?;
    if order.status != OrderStatus::Pending {
        return Err(ShopError::InvalidState("order is not pending"));
    }
    let order = commit_order(&state.db, &order).await?;
    notify_owner(state, &order).await;
    Ok(order)
}

/// The atomic commit: re-validate every line against current stock under
/// `FOR UPDATE` row locks, decrement, flip the order to confirmed/completed,
/// and clear the owner's cart. Any shortfall aborts the whole transaction
/// and leaves the order pending.
async fn commit_order(db: &PgPool, order: &OrderRow) -> Result<OrderRow> {
    let mut tx = db.begin().await?;

    // Lines come back ordered by product_id, so concurrent commits lock
    // product rows in the same order.
    let lines = sqlx::query_as::<_, OrderLineRow>(
        "SELECT * FROM order_lines WHERE order_id = $1 ORDER BY product_id",
    )
    .bind(order.id)
    .fetch_all(&mut *tx)
    .await?;

    let mut commit_lines = Vec::with_capacity(lines.len());
    for line in &lines {
        let (on_hand,): (i32,) =
            sqlx::query_as("SELECT quantity FROM products WHERE id = $1 FOR UPDATE")
                .bind(line.product_id)
                .fetch_one(&mut *tx)
                .await?;
        commit_lines.push(CommitLine {
            product_id: line.product_id,
            product_name: line.product_name.clone(),
            requested: line.quantity,
            on_hand,
        });
    }

    // All-or-nothing: a shortfall yields no plan at all, and dropping the
    // transaction releases the locks with nothing written.
    let decrements = plan_commit(&commit_lines)?;
    for d in &decrements {
        sqlx::query("UPDATE products SET quantity = quantity - $2, updated_at = NOW() WHERE id = $1")
            .bind(d.product_id)
            .bind(d.quantity)
            .execute(&mut *tx)
            .await?;
    }

    let payment_ref = generate_payment_ref();
    let confirmed = sqlx::query_as::<_, OrderRow>(
        "UPDATE orders SET status = 'confirmed', payment_status = 'completed', \
         payment_ref = $2, updated_at = NOW() \
         WHERE id = $1 AND status = 'pending' RETURNING *",
    )
    .bind(order.id)
    .bind(&payment_ref)
    .fetch_optional(&mut *tx)
    .await?
    // Someone else confirmed it while we waited on locks.
    .ok_or(ShopError::InvalidState("order is not pending"))?;

    sqlx::query("DELETE FROM cart_lines WHERE user_id = $1")
        .bind(order.user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    tracing::info!(order_id = %confirmed.id, payment_ref = %payment_ref,
        total_cents = confirmed.total_cents, "order confirmed");
    Ok(confirmed)
}

/// Best-effort confirmation notification; failures are logged, never
/// surfaced — the order stays confirmed regardless.
async fn notify_owner(state: &AppState, order: &OrderRow) {
    match accounts::find_by_id(&state.db, order.user_id).await {
        Ok(Some(user)) => state.notifier.order_confirmed(&user.email, order).await,
        Ok(None) => tracing::warn!(order_id = %order.id, "order owner missing, skipping notification"),
        Err(e) => tracing::warn!(order_id = %order.id, error = %e, "could not load order owner for notification"),
    }
}

/// Total the engine would stamp on a snapshot of these (price, quantity)
/// pairs. Kept separate so the math is testable without a store.
pub fn snapshot_total(lines: &[(i64, i32)]) -> i64 {
    lines.iter().map(|&(price, qty)| line_total(price, qty)).sum()
}

/// Builds the immutable snapshot lines for an order, copying each product's
/// current name and price by value. Cart lines are live intent; these are
/// historical facts no later catalog edit can reach.
pub fn snapshot_lines(order_id: Uuid, cart_lines: &[cart::CartViewLine]) -> Vec<OrderLineRow> {
    cart_lines
        .iter()
        .map(|l| OrderLineRow {
            order_id,
            product_id: l.product_id,
            product_name: l.product_name.clone(),
            quantity: l.quantity,
            unit_price_cents: l.unit_price_cents,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::cart::CartViewLine;

    fn view_line(name: &str, price: i64, qty: i32) -> CartViewLine {
        CartViewLine {
            line_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            product_name: name.into(),
            unit_price_cents: price,
            quantity: qty,
            line_total_cents: price * qty as i64,
        }
    }

    #[test]
    fn test_snapshot_total() {
        assert_eq!(snapshot_total(&[(1000, 2), (250, 4)]), 3000);
        assert_eq!(snapshot_total(&[]), 0);
    }

    #[test]
    fn test_snapshot_copies_price_and_name() {
        let order_id = Uuid::new_v4();
        let cart = vec![view_line("Widget", 1000, 2)];
        let lines = snapshot_lines(order_id, &cart);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].order_id, order_id);
        assert_eq!(lines[0].unit_price_cents, 1000);
        assert_eq!(lines[0].product_name, "Widget");
        assert_eq!(lines[0].quantity, 2);
    }

    #[test]
    fn test_snapshot_price_survives_later_price_change() {
        let mut cart = vec![view_line("Widget", 1000, 2)];
        let lines = snapshot_lines(Uuid::new_v4(), &cart);
        // the catalog price moves after the snapshot
        cart[0].unit_price_cents = 1200;
        assert_eq!(lines[0].unit_price_cents, 1000);
    }

    #[test]
    fn test_commit_plan_matches_snapshot_quantities() {
        // cart {Widget: 2 @ 10.00}, stock 5: after commit, 3 units remain
        let cart = vec![view_line("Widget", 1000, 2)];
        let lines = snapshot_lines(Uuid::new_v4(), &cart);
        let commit = [CommitLine {
            product_id: lines[0].product_id,
            product_name: lines[0].product_name.clone(),
            requested: lines[0].quantity,
            on_hand: 5,
        }];
        let plan = plan_commit(&commit).unwrap();
        assert_eq!(plan[0].quantity, 2);
        assert_eq!(commit[0].on_hand - plan[0].quantity, 3);
    }
}
