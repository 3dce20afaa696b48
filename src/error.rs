//! Service-wide error taxonomy and its HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShopError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{product} is out of stock")]
    OutOfStock { product: String },

    #[error("not enough stock for {product}")]
    InsufficientStock { product: String },

    #[error("payment details are incomplete")]
    InvalidPayment,

    #[error("{0}")]
    InvalidState(&'static str),

    #[error("login required")]
    Unauthenticated,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("database error")]
    Db(#[from] sqlx::Error),

    #[error("{0}")]
    Internal(String),
}

pub type Result<T, E = ShopError> = std::result::Result<T, E>;

impl ShopError {
    /// Maps a unique-key violation from the store into `Conflict`; every
    /// other database error passes through unchanged.
    pub fn conflict_on_unique(err: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db) = err {
            if db.code().as_deref() == Some("23505") {
                return ShopError::Conflict(format!("{what} already exists"));
            }
        }
        ShopError::Db(err)
    }

    fn status(&self) -> StatusCode {
        match self {
            ShopError::Validation(_) | ShopError::InvalidPayment => StatusCode::BAD_REQUEST,
            ShopError::NotFound(_) => StatusCode::NOT_FOUND,
            ShopError::OutOfStock { .. }
            | ShopError::InsufficientStock { .. }
            | ShopError::InvalidState(_)
            | ShopError::Conflict(_) => StatusCode::CONFLICT,
            ShopError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ShopError::Forbidden(_) => StatusCode::FORBIDDEN,
            ShopError::Db(_) | ShopError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ShopError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Internal details stay in the log, not the body.
        let body = match &self {
            ShopError::Db(e) => {
                tracing::error!(error = %e, "database error");
                json!({"error": "internal error"})
            }
            ShopError::Internal(m) => {
                tracing::error!(error = %m, "internal error");
                json!({"error": "internal error"})
            }
            ShopError::OutOfStock { product } | ShopError::InsufficientStock { product } => {
                json!({"error": self.to_string(), "product": product})
            }
            other => json!({"error": other.to_string()}),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ShopError::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ShopError::Forbidden("no".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(ShopError::NotFound("product").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ShopError::InsufficientStock { product: "Widget".into() }.status(),
            StatusCode::CONFLICT
        );
        assert_eq!(ShopError::InvalidPayment.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_stock_errors_name_the_product() {
        let e = ShopError::InsufficientStock { product: "Widget".into() };
        assert_eq!(e.to_string(), "not enough stock for Widget");
    }
}
