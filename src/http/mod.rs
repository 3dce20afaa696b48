//! Axum router and request handlers.

pub mod account;
pub mod admin;
pub mod cart;
pub mod catalog;
pub mod checkout;

use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;
use validator::Validate;

use crate::error::{Result, ShopError};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub category: Option<Uuid>,
    pub search: Option<String>,
}

impl ListParams {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// (limit, offset): 20 per page by default, capped at 100. Widened to
    /// i64 before multiplying so an absurd `page` cannot overflow.
    pub fn limits(&self) -> (i64, i64) {
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100) as i64;
        (per_page, (self.page() as i64 - 1) * per_page)
    }
}

#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: u32,
}

/// Runs `validator` checks on a request body, folding failures into the
/// `Validation` error variant.
pub(crate) fn validated<T: Validate>(value: T) -> Result<T> {
    value.validate().map_err(|e| ShopError::Validation(e.to_string()))?;
    Ok(value)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "healthy", "service": "shopfront"}))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        // account
        .route("/api/v1/auth/register", post(account::register))
        .route("/api/v1/auth/login", post(account::login))
        .route("/api/v1/auth/logout", post(account::logout))
        .route("/api/v1/account", get(account::profile).put(account::update_profile))
        .route("/api/v1/account/password", post(account::change_password))
        // catalog
        .route("/api/v1/products", get(catalog::list_products))
        .route("/api/v1/products/:id", get(catalog::get_product))
        .route("/api/v1/categories", get(catalog::list_categories))
        // cart
        .route("/api/v1/cart", get(cart::view).post(cart::add))
        .route("/api/v1/cart/:line_id", patch(cart::update).delete(cart::remove))
        // checkout + orders
        .route("/api/v1/checkout", post(checkout::begin))
        .route("/api/v1/checkout/pay", post(checkout::pay))
        .route("/api/v1/orders", get(checkout::history))
        .route("/api/v1/orders/:id", get(checkout::detail))
        // admin
        .route("/api/v1/admin/users", get(admin::list_users))
        .route("/api/v1/admin/users/:id/activate", post(admin::activate_user))
        .route("/api/v1/admin/users/:id/deactivate", post(admin::deactivate_user))
        .route("/api/v1/admin/products", get(admin::list_products).post(admin::create_product))
        .route("/api/v1/admin/products/:id", put(admin::update_product).delete(admin::delete_product))
        .route("/api/v1/admin/products/:id/stock", post(admin::set_stock))
        .route("/api/v1/admin/products/:id/image", post(admin::upload_image))
        .route("/api/v1/admin/categories", post(admin::create_category))
        .route("/api/v1/admin/categories/:id", put(admin::update_category).delete(admin::delete_category))
        .route("/api/v1/admin/orders/pending", get(admin::pending_orders))
        .route("/api/v1/admin/orders/:id/confirm", post(admin::confirm_order))
        .route("/api/v1/admin/stats", get(admin::stats))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_params_limits() {
        let p = ListParams { page: None, per_page: None, category: None, search: None };
        assert_eq!(p.limits(), (20, 0));
        let p = ListParams { page: Some(3), per_page: Some(500), category: None, search: None };
        assert_eq!(p.limits(), (100, 200));
        assert_eq!(p.page(), 3);
    }

    #[test]
    fn test_list_params_huge_page_does_not_overflow() {
        let p = ListParams {
            page: Some(u32::MAX),
            per_page: Some(100),
            category: None,
            search: None,
        };
        let (limit, offset) = p.limits();
        assert_eq!(limit, 100);
        assert_eq!(offset, (u32::MAX as i64 - 1) * 100);
    }
}
