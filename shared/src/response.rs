//! API Response types
//!
//! Standardized API response structure used by every endpoint.

use serde::{Deserialize, Serialize};

/// Response code for success
pub const API_CODE_SUCCESS: u16 = 200;

/// Unified API response structure
///
/// All API responses follow this format:
/// ```json
/// {
///     "code": 200,
///     "message": "Success",
///     "data": { ... }
/// }
/// ```
///
/// Error responses carry the matching HTTP status as `code`; validation
/// failures (422) put the field-keyed error map in `data`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Response code (200 = success, mirrors the HTTP status otherwise)
    pub code: u16,
    /// Human-readable message
    pub message: String,
    /// Response data (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response
    pub fn ok(data: T) -> Self {
        Self {
            code: API_CODE_SUCCESS,
            message: "Success".to_string(),
            data: Some(data),
        }
    }

    /// Create a successful response with custom message
    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            code: API_CODE_SUCCESS,
            message: message.into(),
            data: Some(data),
        }
    }

    /// Create an error response
    pub fn error(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Create an error response with data (e.g. field-keyed validation errors)
    pub fn error_with_data(code: u16, message: impl Into<String>, data: T) -> Self {
        Self {
            code,
            message: message.into(),
            data: Some(data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_round_trips() {
        let body = serde_json::to_string(&ApiResponse::ok(vec![1, 2, 3])).unwrap();
        let parsed: ApiResponse<Vec<i32>> = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed.code, API_CODE_SUCCESS);
        assert_eq!(parsed.data, Some(vec![1, 2, 3]));
    }

    #[test]
    fn error_envelope_omits_data() {
        let body = serde_json::to_string(&ApiResponse::<()>::error(404, "Country not found")).unwrap();
        assert!(!body.contains("data"));
    }
}
