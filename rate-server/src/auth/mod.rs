//! Authentication
//!
//! JWT bearer auth for the admin routes, argon2 password hashing.

pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{Claims, JwtConfig, JwtError, JwtService};
pub use middleware::require_auth;
pub use password::{hash_password, verify_password};

/// Authenticated admin, injected into request extensions by
/// [`require_auth`]
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub.parse().unwrap_or_default(),
            username: claims.username,
        }
    }
}
