//! Credential hashing and the session access gate.
//!
//! Two capability levels exist: authenticated shopper ([`CurrentUser`]) and
//! authenticated admin ([`AdminUser`]). Handlers state the capability they
//! need in their signature; the extractors do the rest.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use uuid::Uuid;

use crate::domain::{Role, UserStatus};
use crate::error::{Result, ShopError};
use crate::store::accounts::{self, UserRow};
use crate::AppState;

pub const SESSION_COOKIE: &str = "session";

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| ShopError::Internal(format!("password hashing failed: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
        .unwrap_or(false)
}

/// The raw session token, taken from `Authorization: Bearer` or the
/// `session` cookie. Only login/logout care about the token itself.
pub struct SessionToken(pub Uuid);

fn token_from_parts(parts: &Parts) -> Option<Uuid> {
    if let Some(auth) = parts.headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        if let Some(token) = auth.strip_prefix("Bearer ") {
            return Uuid::parse_str(token.trim()).ok();
        }
    }
    let cookies = parts.headers.get(COOKIE).and_then(|v| v.to_str().ok())?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| Uuid::parse_str(value).ok())?
    })
}

#[async_trait]
impl FromRequestParts<AppState> for SessionToken {
    type Rejection = ShopError;

    async fn from_request_parts(parts: &mut Parts, _state: &AppState) -> Result<Self> {
        token_from_parts(parts).map(SessionToken).ok_or(ShopError::Unauthenticated)
    }
}

/// An authenticated, active user. Sessions of deactivated accounts are
/// rejected here, not just at login.
pub struct CurrentUser(pub UserRow);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ShopError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let token = token_from_parts(parts).ok_or(ShopError::Unauthenticated)?;
        let user = accounts::find_session_user(&state.db, token)
            .await?
            .ok_or(ShopError::Unauthenticated)?;
        if user.status == UserStatus::Inactive {
            return Err(ShopError::Forbidden("account is deactivated".into()));
        }
        Ok(CurrentUser(user))
    }
}

/// An authenticated user holding the admin capability.
pub struct AdminUser(pub UserRow);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ShopError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if user.role != Role::Admin {
            return Err(ShopError::Forbidden("admin access required".into()));
        }
        Ok(AdminUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("hunter2").unwrap();
        assert_ne!(hash, "hunter2");
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(!verify_password("hunter2", "not-a-phc-string"));
    }
}
