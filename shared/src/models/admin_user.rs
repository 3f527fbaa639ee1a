//! Admin User Model

use serde::{Deserialize, Serialize};

/// Admin account for the management routes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct AdminUser {
    pub id: i64,
    pub username: String,
    /// Argon2 PHC string, never serialized to clients
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: i64,
}
