//! Public catalog browsing.

use axum::extract::{Path, Query, State};
use axum::Json;
use uuid::Uuid;

use crate::error::{Result, ShopError};
use crate::http::{ListParams, PaginatedResponse};
use crate::store::catalog::{self, CategoryRow, ProductRow};
use crate::AppState;

pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<PaginatedResponse<ProductRow>>> {
    let (limit, offset) = params.limits();
    let (data, total) = catalog::list_products(
        &state.db,
        params.category,
        params.search.as_deref(),
        limit,
        offset,
    )
    .await?;
    Ok(Json(PaginatedResponse { data, total, page: params.page() }))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductRow>> {
    catalog::get_product(&state.db, id)
        .await?
        .map(Json)
        .ok_or(ShopError::NotFound("product"))
}

pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<CategoryRow>>> {
    Ok(Json(catalog::list_categories(&state.db).await?))
}
