//! Utility module - errors, logging, validation helpers

pub mod error;
pub mod logger;
pub mod result;
pub mod validation;

pub use error::{AppError, FieldErrors, ok, ok_with_message};
pub use result::AppResult;
