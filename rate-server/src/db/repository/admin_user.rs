//! Admin User Repository

use super::{RepoError, RepoResult};
use shared::models::AdminUser;
use sqlx::SqlitePool;

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> RepoResult<Option<AdminUser>> {
    let user = sqlx::query_as::<_, AdminUser>(
        "SELECT id, username, password_hash, is_active, created_at FROM admin_user WHERE username = ? LIMIT 1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admin_user")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn create(
    pool: &SqlitePool,
    username: &str,
    password_hash: &str,
    created_at: i64,
) -> RepoResult<AdminUser> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO admin_user (username, password_hash, created_at) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(username)
    .bind(password_hash)
    .bind(created_at)
    .fetch_one(pool)
    .await?;

    sqlx::query_as::<_, AdminUser>(
        "SELECT id, username, password_hash, is_active, created_at FROM admin_user WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| RepoError::Database("Failed to create admin user".into()))
}
