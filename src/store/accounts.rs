//! User identities and their server-side sessions.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Role, UserStatus};
use crate::error::{Result, ShopError};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: Role,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub async fn create_user(
    db: &PgPool,
    name: &str,
    email: &str,
    password_hash: &str,
    phone: Option<&str>,
    role: Role,
) -> Result<UserRow> {
    sqlx::query_as::<_, UserRow>(
        "INSERT INTO users (id, name, email, password_hash, phone, role) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(phone)
    .bind(role)
    .fetch_one(db)
    .await
    .map_err(|e| ShopError::conflict_on_unique(e, "email"))
}

pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<UserRow>> {
    Ok(sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(db)
        .await?)
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<UserRow>> {
    Ok(sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await?)
}

pub async fn update_profile(
    db: &PgPool,
    id: Uuid,
    name: &str,
    phone: Option<&str>,
    address: Option<&str>,
) -> Result<UserRow> {
    sqlx::query_as::<_, UserRow>(
        "UPDATE users SET name = $2, phone = $3, address = $4, updated_at = NOW() \
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(name)
    .bind(phone)
    .bind(address)
    .fetch_optional(db)
    .await?
    .ok_or(ShopError::NotFound("user"))
}

pub async fn update_password(db: &PgPool, id: Uuid, password_hash: &str) -> Result<()> {
    sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .bind(password_hash)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn set_status(db: &PgPool, id: Uuid, status: UserStatus) -> Result<UserRow> {
    sqlx::query_as::<_, UserRow>(
        "UPDATE users SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(status)
    .fetch_optional(db)
    .await?
    .ok_or(ShopError::NotFound("user"))
}

pub async fn list_users(db: &PgPool, limit: i64, offset: i64) -> Result<(Vec<UserRow>, i64)> {
    let users = sqlx::query_as::<_, UserRow>(
        "SELECT * FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;
    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users").fetch_one(db).await?;
    Ok((users, total.0))
}

// --- Sessions -------------------------------------------------------------

pub async fn create_session(db: &PgPool, user_id: Uuid) -> Result<Uuid> {
    let token = Uuid::new_v4();
    sqlx::query("INSERT INTO sessions (token, user_id) VALUES ($1, $2)")
        .bind(token)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(token)
}

pub async fn delete_session(db: &PgPool, token: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE token = $1").bind(token).execute(db).await?;
    Ok(())
}

/// Resolves a session token to its user, if the session exists.
pub async fn find_session_user(db: &PgPool, token: Uuid) -> Result<Option<UserRow>> {
    Ok(sqlx::query_as::<_, UserRow>(
        "SELECT u.* FROM users u JOIN sessions s ON s.user_id = u.id WHERE s.token = $1",
    )
    .bind(token)
    .fetch_optional(db)
    .await?)
}
