//! Back-office console: moderation, catalog management, order oversight.
//!
//! Every handler requires the admin capability via [`AdminUser`].

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::auth::AdminUser;
use crate::checkout as engine;
use crate::domain::UserStatus;
use crate::error::{Result, ShopError};
use crate::http::{validated, ListParams, PaginatedResponse};
use crate::images;
use crate::store::accounts::{self, UserRow};
use crate::store::catalog::{self, CategoryRow, ProductRow};
use crate::store::orders::{self, OrderRow, SalesStats};
use crate::AppState;

// --- Users ----------------------------------------------------------------

pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Query(params): Query<ListParams>,
) -> Result<Json<PaginatedResponse<UserRow>>> {
    let (limit, offset) = params.limits();
    let (data, total) = accounts::list_users(&state.db, limit, offset).await?;
    Ok(Json(PaginatedResponse { data, total, page: params.page() }))
}

pub async fn activate_user(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<UserRow>> {
    Ok(Json(accounts::set_status(&state.db, id, UserStatus::Active).await?))
}

pub async fn deactivate_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<UserRow>> {
    let user = accounts::set_status(&state.db, id, UserStatus::Inactive).await?;
    tracing::info!(user_id = %id, by = %admin.id, "user deactivated");
    Ok(Json(user))
}

// --- Products -------------------------------------------------------------

pub async fn list_products(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Query(params): Query<ListParams>,
) -> Result<Json<PaginatedResponse<ProductRow>>> {
    let (limit, offset) = params.limits();
    let (data, total) = catalog::list_all_products(&state.db, limit, offset).await?;
    Ok(Json(PaginatedResponse { data, total, page: params.page() }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub price_cents: i64,
    #[validate(range(min = 0))]
    pub quantity: Option<i32>,
    pub category_id: Option<Uuid>,
}

/// Update carries no `quantity`: stock changes go through the dedicated
/// stock endpoint, and an unknown field in the body is rejected rather
/// than silently dropped.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateProductInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub price_cents: i64,
    pub category_id: Option<Uuid>,
}

pub async fn create_product(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Json(req): Json<CreateProductInput>,
) -> Result<impl IntoResponse> {
    let req = validated(req)?;
    let product = catalog::create_product(
        &state.db,
        &req.name,
        req.description.as_deref(),
        req.price_cents,
        req.quantity.unwrap_or(0),
        req.category_id,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProductInput>,
) -> Result<Json<ProductRow>> {
    let req = validated(req)?;
    let product = catalog::update_product(
        &state.db,
        id,
        &req.name,
        req.description.as_deref(),
        req.price_cents,
        req.category_id,
    )
    .await?;
    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    catalog::soft_delete_product(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize, Validate)]
pub struct SetStockRequest {
    #[validate(range(min = 0))]
    pub quantity: i32,
}

pub async fn set_stock(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<SetStockRequest>,
) -> Result<Json<ProductRow>> {
    let req = validated(req)?;
    Ok(Json(catalog::set_stock(&state.db, id, req.quantity).await?))
}

pub async fn upload_image(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ProductRow>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ShopError::Validation(format!("bad multipart body: {e}")))?
    {
        if field.name() != Some("image") {
            continue;
        }
        let filename = field
            .file_name()
            .ok_or_else(|| ShopError::Validation("image field has no filename".into()))?
            .to_string();
        let ext = images::validate_extension(&filename)?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ShopError::Validation(format!("could not read image: {e}")))?;
        let url = state.images.save(&ext, &bytes).await?;
        return Ok(Json(catalog::set_image(&state.db, id, &url).await?));
    }
    Err(ShopError::Validation("missing 'image' field".into()))
}

// --- Categories -----------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct CategoryInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

pub async fn create_category(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Json(req): Json<CategoryInput>,
) -> Result<impl IntoResponse> {
    let req = validated(req)?;
    let category = catalog::create_category(&state.db, &req.name, req.description.as_deref()).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<CategoryInput>,
) -> Result<Json<CategoryRow>> {
    let req = validated(req)?;
    Ok(Json(catalog::update_category(&state.db, id, &req.name, req.description.as_deref()).await?))
}

pub async fn delete_category(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    catalog::delete_category(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Orders ---------------------------------------------------------------

pub async fn pending_orders(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
) -> Result<Json<Vec<OrderRow>>> {
    Ok(Json(orders::list_pending(&state.db).await?))
}

/// Operational override for out-of-band payment confirmation.
pub async fn confirm_order(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderRow>> {
    let order = engine::force_confirm(&state, id).await?;
    tracing::info!(order_id = %id, by = %admin.id, "order force-confirmed");
    Ok(Json(order))
}

pub async fn stats(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
) -> Result<Json<SalesStats>> {
    Ok(Json(orders::sales_stats(&state.db, 5).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_product_rejects_stock_field() {
        let with_quantity = serde_json::json!({"name": "Widget", "price_cents": 1000, "quantity": 7});
        assert!(serde_json::from_value::<UpdateProductInput>(with_quantity).is_err());
        let plain = serde_json::json!({"name": "Widget", "price_cents": 1000});
        assert!(serde_json::from_value::<UpdateProductInput>(plain).is_ok());
    }
}
