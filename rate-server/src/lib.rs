//! Ratecard Server - shipping ratecard administration and quote API
//!
//! # Module structure
//!
//! ```text
//! rate-server/src/
//! ├── core/          # Config, state, server startup
//! ├── auth/          # JWT authentication, passwords
//! ├── db/            # SQLite pool, migrations, repositories
//! ├── handler/       # HTTP handlers
//! ├── routes/        # Routers and middleware stack
//! ├── services/      # Importer, pricing, archive storage
//! └── utils/         # Errors, logging, validation helpers
//! ```

pub mod auth;
pub mod core;
pub mod db;
pub mod handler;
pub mod routes;
pub mod services;
pub mod utils;

// Re-export public types
pub use crate::auth::{CurrentUser, JwtConfig, JwtService};
pub use crate::core::{Config, Server, ServerState};
pub use crate::utils::{AppError, AppResult};
