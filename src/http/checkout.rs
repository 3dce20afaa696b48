//! Checkout flow and shopper order history.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::checkout as engine;
use crate::domain::{CardDetails, Role};
use crate::error::{Result, ShopError};
use crate::store::orders::{self, OrderRow};
use crate::AppState;

/// Snapshot the cart into a pending order (or return the one in flight).
pub async fn begin(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse> {
    let view = engine::begin_checkout(&state.db, user.id).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn pay(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(card): Json<CardDetails>,
) -> Result<Json<OrderRow>> {
    Ok(Json(engine::submit_payment(&state, user.id, &card).await?))
}

pub async fn history(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<OrderRow>>> {
    Ok(Json(orders::history_for_user(&state.db, user.id).await?))
}

/// Confirmation view: the order with its snapshot lines. Owner-gated;
/// admins may inspect any order.
pub async fn detail(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<engine::CheckoutView>> {
    let order = orders::get_order(&state.db, id).await?.ok_or(ShopError::NotFound("order"))?;
    if order.user_id != user.id && user.role != Role::Admin {
        return Err(ShopError::Forbidden("not your order".into()));
    }
    let lines = orders::lines_for_order(&state.db, order.id).await?;
    Ok(Json(engine::CheckoutView { order, lines }))
}
