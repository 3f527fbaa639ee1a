//! Ratecard Handlers
//!
//! Workbook upload (three CSV sheets in one multipart request),
//! archived-file download and the audit-trail listing.

use axum::{
    Json,
    extract::{Multipart, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use shared::ApiResponse;
use shared::models::{RateType, RatecardFile, SheetKind};

use crate::core::ServerState;
use crate::db::repository as repo;
use crate::services::importer::{self, ImportSummary, SheetUpload};
use crate::utils::{AppError, ok, ok_with_message};

/// Maximum size per uploaded sheet (5MB)
const MAX_SHEET_SIZE: usize = 5 * 1024 * 1024;

/// Import a ratecard workbook.
///
/// Multipart fields: `country_id`, `rate_type`, plus the three sheet
/// files `documents`, `non_documents` and `zones`.
pub async fn upload(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<ImportSummary>>, AppError> {
    let mut country_id: Option<i64> = None;
    let mut rate_type: Option<RateType> = None;
    let mut documents: Option<SheetUpload> = None;
    let mut non_documents: Option<SheetUpload> = None;
    let mut zones: Option<SheetUpload> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "country_id" => {
                let text = field.text().await?;
                country_id = Some(
                    text.trim()
                        .parse()
                        .map_err(|_| AppError::field("country_id", "must be an integer"))?,
                );
            }
            "rate_type" => {
                let text = field.text().await?;
                rate_type = Some(text.parse().map_err(|_| {
                    AppError::field("rate_type", "must be one of ORIGINAL, PERSONAL, BUSINESS")
                })?);
            }
            "documents" | "non_documents" | "zones" => {
                let sheet: SheetKind = name
                    .parse()
                    .map_err(|_| AppError::invalid(format!("Unknown sheet part: {name}")))?;
                let original_name = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{name}.csv"));
                let data = field.bytes().await?;
                if data.is_empty() {
                    return Err(AppError::field(sheet.part_name(), "file is empty"));
                }
                if data.len() > MAX_SHEET_SIZE {
                    return Err(AppError::field(sheet.part_name(), "file too large (max 5MB)"));
                }
                let part = SheetUpload {
                    sheet,
                    original_name,
                    data: data.to_vec(),
                };
                match sheet {
                    SheetKind::Documents => documents = Some(part),
                    SheetKind::NonDocuments => non_documents = Some(part),
                    SheetKind::Zones => zones = Some(part),
                }
            }
            // Unknown parts are ignored, matching form posts with extras
            _ => {}
        }
    }

    let country_id = country_id.ok_or_else(|| AppError::field("country_id", "required"))?;
    let rate_type = rate_type.ok_or_else(|| AppError::field("rate_type", "required"))?;
    let documents = documents.ok_or_else(|| AppError::field("documents", "sheet is required"))?;
    let non_documents =
        non_documents.ok_or_else(|| AppError::field("non_documents", "sheet is required"))?;
    let zones = zones.ok_or_else(|| AppError::field("zones", "sheet is required"))?;

    let summary = importer::import_ratecard(
        state.pool(),
        &state.storage,
        &state.import_locks,
        country_id,
        rate_type,
        documents,
        non_documents,
        zones,
    )
    .await?;

    Ok(ok_with_message(summary, "Ratecard imported"))
}

#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    pub file_id: i64,
}

/// Stream an archived ratecard sheet.
///
/// A missing row or a missing file on disk both produce an explicit
/// "does not exist" result.
pub async fn download(
    State(state): State<ServerState>,
    Json(req): Json<DownloadRequest>,
) -> Result<Response, AppError> {
    let file = repo::ratecard_file::find_by_id(state.pool(), req.file_id)
        .await?
        .ok_or_else(|| AppError::not_found("Ratecard file does not exist"))?;

    let path = state.storage.absolute(&file.path);
    if !path.is_file() {
        tracing::warn!(file_id = file.id, path = %file.path, "archived ratecard missing on disk");
        return Err(AppError::not_found("Ratecard file does not exist"));
    }

    let data = tokio::fs::read(&path)
        .await
        .map_err(|e| AppError::internal(format!("Failed to read archived ratecard: {e}")))?;

    let content_type = mime_guess::from_path(&file.original_name).first_or_octet_stream();
    let filename = file.original_name.replace('"', "");
    let headers = [
        (header::CONTENT_TYPE, content_type.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
    ];
    Ok((headers, data).into_response())
}

#[derive(Debug, Deserialize)]
pub struct FilesQuery {
    pub country_id: i64,
}

/// Upload audit trail for one country
pub async fn files(
    State(state): State<ServerState>,
    Query(query): Query<FilesQuery>,
) -> Result<Json<ApiResponse<Vec<RatecardFile>>>, AppError> {
    Ok(ok(
        repo::ratecard_file::find_by_country(state.pool(), query.country_id).await?,
    ))
}
