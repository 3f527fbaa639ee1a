//! Input validation helpers
//!
//! Centralized length limits and helpers that collect failures into a
//! field-keyed error map, so a request reports every bad field at once.

use crate::utils::error::FieldErrors;

// ── Limits ──────────────────────────────────────────────────────────

/// Country and destination names
pub const MAX_NAME_LEN: usize = 200;

/// ISO country codes
pub const MIN_CODE_LEN: usize = 2;
pub const MAX_CODE_LEN: usize = 3;

/// Quote-lang marketing copy
pub const MAX_QUOTE_TEXT_LEN: usize = 500;

/// Price symbol ("$", "Fr.", ...)
pub const MAX_SYMBOL_LEN: usize = 8;

/// Decimal places shown for prices
pub const MAX_DECIMAL_PLACES: i64 = 4;

// ── Helpers ─────────────────────────────────────────────────────────

/// Record a validation failure for a field
pub fn push_error(errors: &mut FieldErrors, field: &str, message: impl Into<String>) {
    errors.entry(field.to_string()).or_default().push(message.into());
}

/// Require a non-empty string within the length limit
pub fn require_text(errors: &mut FieldErrors, field: &str, value: &str, max_len: usize) {
    if value.trim().is_empty() {
        push_error(errors, field, "must not be empty");
    } else if value.len() > max_len {
        push_error(
            errors,
            field,
            format!("is too long ({} chars, max {max_len})", value.len()),
        );
    }
}

/// Check an optional string against the length limit
pub fn check_optional_text(
    errors: &mut FieldErrors,
    field: &str,
    value: &Option<String>,
    max_len: usize,
) {
    if let Some(v) = value
        && v.len() > max_len
    {
        push_error(
            errors,
            field,
            format!("is too long ({} chars, max {max_len})", v.len()),
        );
    }
}
