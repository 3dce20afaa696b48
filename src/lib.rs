//! Shopfront
//!
//! Storefront and back-office service: catalog browsing, per-user carts,
//! snapshot-then-pay checkout, order history, and an admin console for
//! users, products, categories, and orders.
//!
//! ## Layout
//! - [`domain`] — closed enums and the pure order-engine logic
//! - [`store`] — explicit query functions over Postgres
//! - [`checkout`] — the cart-to-order state machine
//! - [`http`] — axum router and handlers
//! - [`auth`] — credential hashing and the session access gate

pub mod auth;
pub mod checkout;
pub mod config;
pub mod domain;
pub mod error;
pub mod http;
pub mod images;
pub mod notify;
pub mod store;

pub use error::{Result, ShopError};

use crate::images::ImageStore;
use crate::notify::Notifier;

/// Shared service context. Handlers receive it explicitly through axum's
/// `State`; there is no ambient global state.
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub notifier: Notifier,
    pub images: ImageStore,
}
