//! Data models
//!
//! Shared between rate-server and API consumers.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY).

pub mod admin_user;
pub mod country;
pub mod country_zone;
pub mod quote_lang;
pub mod rate;
pub mod ratecard_file;

// Re-exports
pub use admin_user::*;
pub use country::*;
pub use country_zone::*;
pub use quote_lang::*;
pub use rate::*;
pub use ratecard_file::*;
