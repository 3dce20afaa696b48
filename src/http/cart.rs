//! Shopper cart operations. Every route requires an authenticated owner.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::error::Result;
use crate::store::cart;
use crate::AppState;

pub async fn view(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<cart::CartView>> {
    Ok(Json(cart::view_cart(&state.db, user.id).await?))
}

#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

pub async fn add(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<AddToCartRequest>,
) -> Result<impl IntoResponse> {
    let line = cart::add_to_cart(&state.db, user.id, req.product_id, req.quantity).await?;
    Ok((StatusCode::CREATED, Json(line)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub delta: i32,
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(line_id): Path<Uuid>,
    Json(req): Json<UpdateQuantityRequest>,
) -> Result<Json<cart::CartLineRow>> {
    Ok(Json(cart::update_quantity(&state.db, user.id, line_id, req.delta).await?))
}

pub async fn remove(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(line_id): Path<Uuid>,
) -> Result<StatusCode> {
    cart::remove_line(&state.db, user.id, line_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
