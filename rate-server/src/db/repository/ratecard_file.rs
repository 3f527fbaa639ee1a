//! Ratecard File Repository
//!
//! Append-only provenance rows for archived ratecard uploads. The app
//! never deletes rows or the archived files they point at.

use super::RepoResult;
use shared::models::{RateType, RatecardFile, SheetKind};
use sqlx::{Sqlite, SqlitePool, Transaction};

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<RatecardFile>> {
    let file = sqlx::query_as::<_, RatecardFile>(
        "SELECT id, country_id, sheet, rate_type, original_name, path, checksum, created_at FROM ratecard_file WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(file)
}

pub async fn find_by_country(pool: &SqlitePool, country_id: i64) -> RepoResult<Vec<RatecardFile>> {
    let files = sqlx::query_as::<_, RatecardFile>(
        "SELECT id, country_id, sheet, rate_type, original_name, path, checksum, created_at FROM ratecard_file WHERE country_id = ? ORDER BY created_at DESC, id DESC",
    )
    .bind(country_id)
    .fetch_all(pool)
    .await?;
    Ok(files)
}

#[allow(clippy::too_many_arguments)]
pub async fn insert_tx(
    tx: &mut Transaction<'_, Sqlite>,
    country_id: i64,
    sheet: SheetKind,
    rate_type: RateType,
    original_name: &str,
    path: &str,
    checksum: &str,
    created_at: i64,
) -> RepoResult<i64> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO ratecard_file (country_id, sheet, rate_type, original_name, path, checksum, created_at) VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(country_id)
    .bind(sheet)
    .bind(rate_type)
    .bind(original_name)
    .bind(path)
    .bind(checksum)
    .bind(created_at)
    .fetch_one(&mut **tx)
    .await?;
    Ok(id)
}
