//! Registration, login, and profile management.

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::auth::{self, CurrentUser, SessionToken};
use crate::domain::{Role, UserStatus};
use crate::error::{Result, ShopError};
use crate::http::validated;
use crate::store::accounts;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    pub confirm_password: String,
    pub phone: Option<String>,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    let req = validated(req)?;
    if req.password != req.confirm_password {
        return Err(ShopError::Validation("passwords do not match".into()));
    }
    let email = req.email.to_lowercase();
    let role = Role::for_email(&email);
    let hash = auth::hash_password(&req.password)?;
    let user =
        accounts::create_user(&state.db, &req.name, &email, &hash, req.phone.as_deref(), role)
            .await?;
    tracing::info!(user_id = %user.id, role = ?user.role, "user registered");
    Ok((StatusCode::CREATED, Json(user)))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let user = accounts::find_by_email(&state.db, &req.email.to_lowercase()).await?;
    let user = match user {
        Some(u) if auth::verify_password(&req.password, &u.password_hash) => u,
        _ => return Err(ShopError::Validation("invalid credentials".into())),
    };
    if user.status == UserStatus::Inactive {
        return Err(ShopError::Forbidden("account is deactivated".into()));
    }
    let token = accounts::create_session(&state.db, user.id).await?;
    let cookie = format!("{}={token}; Path=/; HttpOnly", auth::SESSION_COOKIE);
    Ok(([(SET_COOKIE, cookie)], Json(json!({"token": token, "user": user}))))
}

pub async fn logout(
    State(state): State<AppState>,
    SessionToken(token): SessionToken,
) -> Result<impl IntoResponse> {
    accounts::delete_session(&state.db, token).await?;
    let cookie = format!("{}=; Path=/; Max-Age=0; HttpOnly", auth::SESSION_COOKIE);
    Ok(([(SET_COOKIE, cookie)], StatusCode::NO_CONTENT))
}

pub async fn profile(CurrentUser(user): CurrentUser) -> Json<accounts::UserRow> {
    Json(user)
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<accounts::UserRow>> {
    let req = validated(req)?;
    let updated = accounts::update_profile(
        &state.db,
        user.id,
        &req.name,
        req.phone.as_deref(),
        req.address.as_deref(),
    )
    .await?;
    Ok(Json(updated))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    #[validate(length(min = 8, max = 128))]
    pub new_password: String,
    pub confirm_password: String,
}

pub async fn change_password(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<StatusCode> {
    let req = validated(req)?;
    if !auth::verify_password(&req.current_password, &user.password_hash) {
        return Err(ShopError::Validation("current password is incorrect".into()));
    }
    if req.new_password != req.confirm_password {
        return Err(ShopError::Validation("passwords do not match".into()));
    }
    let hash = auth::hash_password(&req.new_password)?;
    accounts::update_password(&state.db, user.id, &hash).await?;
    Ok(StatusCode::NO_CONTENT)
}
