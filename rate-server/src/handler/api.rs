//! Public API Handlers
//!
//! The calculator endpoints: health, reference listings and quote
//! calculation. No authentication.

use axum::{Json, extract::State};
use serde::Serialize;

use shared::ApiResponse;
use shared::models::{CountryListItem, PackageType};

use crate::core::ServerState;
use crate::db::repository as repo;
use crate::services::pricing::{self, CalculateRequest, CalculateResult};
use crate::utils::{AppError, ok, ok_with_message};

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub name: &'static str,
    pub version: &'static str,
}

/// Service health payload
pub async fn index() -> Json<ApiResponse<ServiceInfo>> {
    ok(ServiceInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Round-trip through the connection pool
pub async fn test_db(State(state): State<ServerState>) -> Result<Json<ApiResponse<()>>, AppError> {
    sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(state.pool())
        .await
        .map_err(|e| AppError::database(e.to_string()))?;
    Ok(ok_with_message((), "database ok"))
}

/// Countries available as senders
pub async fn senders(
    State(state): State<ServerState>,
) -> Result<Json<ApiResponse<Vec<CountryListItem>>>, AppError> {
    Ok(ok(repo::country::find_active(state.pool()).await?))
}

/// Countries available as receivers
pub async fn receivers(
    State(state): State<ServerState>,
) -> Result<Json<ApiResponse<Vec<CountryListItem>>>, AppError> {
    Ok(ok(repo::country::find_active(state.pool()).await?))
}

#[derive(Debug, Serialize)]
pub struct PackageTypeInfo {
    pub key: PackageType,
    pub label: &'static str,
}

/// The package type enumeration
pub async fn package_types() -> Json<ApiResponse<Vec<PackageTypeInfo>>> {
    ok(PackageType::ALL
        .iter()
        .map(|t| PackageTypeInfo {
            key: *t,
            label: t.label(),
        })
        .collect())
}

/// Price a shipment
pub async fn calculate(
    State(state): State<ServerState>,
    Json(req): Json<CalculateRequest>,
) -> Result<Json<ApiResponse<CalculateResult>>, AppError> {
    Ok(ok(pricing::calculate(state.pool(), &req).await?))
}
