//! Shared types for the ratecard service
//!
//! Domain models, the unified API response envelope and small utilities
//! used by both the server and any API consumer.

pub mod models;
pub mod response;
pub mod util;

// Re-exports
pub use response::ApiResponse;
pub use serde::{Deserialize, Serialize};
