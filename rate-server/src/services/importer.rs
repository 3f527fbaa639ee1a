//! Ratecard Importer
//!
//! Parses the three workbook sheets (documents, non-documents, zones),
//! validates each against a strict column contract, reconciles zone
//! references across sheets and persists everything in one transaction.
//! Any bad row aborts the whole import: no rate/zone rows and no
//! provenance rows survive from a rejected workbook.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::BTreeSet;
use std::str::FromStr;

use shared::models::{Country, PackageType, RateType, RatecardFile, SheetKind};
use shared::util::{now_millis, now_secs};

use crate::core::state::ImportLocks;
use crate::db::repository::{self as repo, RepoError};
use crate::services::storage::{ArchivedFile, StorageService};
use crate::utils::error::FieldErrors;
use crate::utils::{AppError, validation};

/// Zone numbers allowed in any sheet
const MAX_ZONE: i64 = 20;
/// Weight ceilings above this are data errors (kg)
const MAX_WEIGHT_KG: i64 = 1000;
const MAX_TRANSIT_DAYS: i64 = 60;

/// One uploaded sheet of the workbook
pub struct SheetUpload {
    pub sheet: SheetKind,
    pub original_name: String,
    pub data: Vec<u8>,
}

/// What an accepted import wrote
#[derive(Debug, Serialize)]
pub struct ImportSummary {
    pub country_id: i64,
    pub rate_type: RateType,
    pub zones: usize,
    pub document_rates: usize,
    pub non_document_rates: usize,
    pub files: Vec<RatecardFile>,
}

/// Import rejection with sheet/row context
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("{sheet} sheet: {message}")]
    Header { sheet: SheetKind, message: String },

    #[error("{sheet} sheet row {row}: {message}")]
    Row {
        sheet: SheetKind,
        row: usize,
        message: String,
    },

    #[error("{sheet} sheet has no data rows")]
    Empty { sheet: SheetKind },

    #[error("{0}")]
    Reconcile(String),
}

impl ImportError {
    fn field(&self) -> &'static str {
        match self {
            ImportError::Header { sheet, .. }
            | ImportError::Row { sheet, .. }
            | ImportError::Empty { sheet } => sheet.part_name(),
            ImportError::Reconcile(_) => "workbook",
        }
    }
}

impl From<ImportError> for AppError {
    fn from(err: ImportError) -> Self {
        let mut errors = FieldErrors::new();
        errors
            .entry(err.field().to_string())
            .or_default()
            .push(err.to_string());
        AppError::Validation(errors)
    }
}

/// Parsed rate-sheet row
#[derive(Debug, Clone, PartialEq)]
pub struct RateRow {
    pub zone: i64,
    pub weight: f64,
    pub price: f64,
}

/// Parsed zones-sheet row
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneRow {
    pub name: String,
    pub zone: i64,
    pub transit_days: i64,
}

// ── Sheet parsing ───────────────────────────────────────────────────

fn sheet_reader(data: &[u8]) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(data)
}

fn check_header(
    sheet: SheetKind,
    headers: &csv::StringRecord,
    expected: &[&str],
) -> Result<(), ImportError> {
    let got: Vec<String> = headers.iter().map(|h| h.to_ascii_lowercase()).collect();
    if got != expected {
        return Err(ImportError::Header {
            sheet,
            message: format!(
                "expected header '{}', got '{}'",
                expected.join(","),
                got.join(",")
            ),
        });
    }
    Ok(())
}

fn parse_int(
    sheet: SheetKind,
    row: usize,
    field: &str,
    value: &str,
    min: i64,
    max: i64,
) -> Result<i64, ImportError> {
    let parsed: i64 = value.parse().map_err(|_| ImportError::Row {
        sheet,
        row,
        message: format!("{field} '{value}' is not an integer"),
    })?;
    if !(min..=max).contains(&parsed) {
        return Err(ImportError::Row {
            sheet,
            row,
            message: format!("{field} {parsed} is out of range ({min}-{max})"),
        });
    }
    Ok(parsed)
}

fn parse_decimal(
    sheet: SheetKind,
    row: usize,
    field: &str,
    value: &str,
) -> Result<Decimal, ImportError> {
    Decimal::from_str(value).map_err(|_| ImportError::Row {
        sheet,
        row,
        message: format!("{field} '{value}' is not a number"),
    })
}

/// Parse a documents / non-documents sheet.
///
/// Contract: header exactly `zone,weight,price`; zone 1-20; weight
/// positive with at most 3 decimals; price non-negative with at most 4
/// decimals; no duplicate (zone, weight) band.
pub fn parse_rate_sheet(sheet: SheetKind, data: &[u8]) -> Result<Vec<RateRow>, ImportError> {
    let mut reader = sheet_reader(data);
    let headers = reader
        .headers()
        .map_err(|e| ImportError::Header {
            sheet,
            message: e.to_string(),
        })?
        .clone();
    check_header(sheet, &headers, &["zone", "weight", "price"])?;

    let mut rows = Vec::new();
    let mut seen: BTreeSet<(i64, Decimal)> = BTreeSet::new();

    for (idx, record) in reader.records().enumerate() {
        let row = idx + 2; // 1-based, after the header line
        let record = record.map_err(|e| ImportError::Row {
            sheet,
            row,
            message: e.to_string(),
        })?;
        if record.len() != 3 {
            return Err(ImportError::Row {
                sheet,
                row,
                message: format!("expected 3 columns, got {}", record.len()),
            });
        }

        let zone = parse_int(sheet, row, "zone", record.get(0).unwrap_or(""), 1, MAX_ZONE)?;

        let weight = parse_decimal(sheet, row, "weight", record.get(1).unwrap_or(""))?;
        if weight <= Decimal::ZERO || weight > Decimal::from(MAX_WEIGHT_KG) {
            return Err(ImportError::Row {
                sheet,
                row,
                message: format!("weight {weight} is out of range (0-{MAX_WEIGHT_KG} kg)"),
            });
        }
        if weight.scale() > 3 {
            return Err(ImportError::Row {
                sheet,
                row,
                message: format!("weight {weight} has more than 3 decimal places"),
            });
        }

        let price = parse_decimal(sheet, row, "price", record.get(2).unwrap_or(""))?;
        if price < Decimal::ZERO {
            return Err(ImportError::Row {
                sheet,
                row,
                message: format!("price {price} is negative"),
            });
        }
        if price.scale() > 4 {
            return Err(ImportError::Row {
                sheet,
                row,
                message: format!("price {price} has more than 4 decimal places"),
            });
        }

        if !seen.insert((zone, weight.normalize())) {
            return Err(ImportError::Row {
                sheet,
                row,
                message: format!("duplicate band: zone {zone}, weight {weight}"),
            });
        }

        rows.push(RateRow {
            zone,
            weight: weight.to_f64().unwrap_or_default(),
            price: price.to_f64().unwrap_or_default(),
        });
    }

    if rows.is_empty() {
        return Err(ImportError::Empty { sheet });
    }
    Ok(rows)
}

/// Parse the zones sheet.
///
/// Contract: header exactly `name,zone,transit_days`; non-empty
/// destination names, zone 1-20, transit days 1-60, no duplicate
/// destination.
pub fn parse_zone_sheet(data: &[u8]) -> Result<Vec<ZoneRow>, ImportError> {
    let sheet = SheetKind::Zones;
    let mut reader = sheet_reader(data);
    let headers = reader
        .headers()
        .map_err(|e| ImportError::Header {
            sheet,
            message: e.to_string(),
        })?
        .clone();
    check_header(sheet, &headers, &["name", "zone", "transit_days"])?;

    let mut rows = Vec::new();
    let mut seen_names: BTreeSet<String> = BTreeSet::new();

    for (idx, record) in reader.records().enumerate() {
        let row = idx + 2;
        let record = record.map_err(|e| ImportError::Row {
            sheet,
            row,
            message: e.to_string(),
        })?;
        if record.len() != 3 {
            return Err(ImportError::Row {
                sheet,
                row,
                message: format!("expected 3 columns, got {}", record.len()),
            });
        }

        let name = record.get(0).unwrap_or("").trim();
        if name.is_empty() || name.len() > validation::MAX_NAME_LEN {
            return Err(ImportError::Row {
                sheet,
                row,
                message: "destination name must be 1-200 characters".to_string(),
            });
        }
        if !seen_names.insert(name.to_lowercase()) {
            return Err(ImportError::Row {
                sheet,
                row,
                message: format!("duplicate destination: {name}"),
            });
        }

        let zone = parse_int(sheet, row, "zone", record.get(1).unwrap_or(""), 1, MAX_ZONE)?;
        let transit_days = parse_int(
            sheet,
            row,
            "transit_days",
            record.get(2).unwrap_or(""),
            1,
            MAX_TRANSIT_DAYS,
        )?;

        rows.push(ZoneRow {
            name: name.to_string(),
            zone,
            transit_days,
        });
    }

    if rows.is_empty() {
        return Err(ImportError::Empty { sheet });
    }
    Ok(rows)
}

/// Every zone a rate sheet references must be declared in the zones sheet
fn reconcile(
    zones: &[ZoneRow],
    documents: &[RateRow],
    non_documents: &[RateRow],
) -> Result<(), ImportError> {
    let declared: BTreeSet<i64> = zones.iter().map(|z| z.zone).collect();
    for (sheet, rows) in [
        (SheetKind::Documents, documents),
        (SheetKind::NonDocuments, non_documents),
    ] {
        if let Some(stray) = rows.iter().find(|r| !declared.contains(&r.zone)) {
            return Err(ImportError::Reconcile(format!(
                "{sheet} sheet references zone {} which the zones sheet does not declare",
                stray.zone
            )));
        }
    }
    Ok(())
}

// ── Import serialization ────────────────────────────────────────────

/// Holds the in-flight marker for one (country, rate type) import
struct ImportGuard {
    locks: ImportLocks,
    key: (i64, RateType),
}

impl ImportGuard {
    fn acquire(locks: &ImportLocks, country_id: i64, rate_type: RateType) -> Result<Self, AppError> {
        use dashmap::mapref::entry::Entry;
        match locks.entry((country_id, rate_type)) {
            Entry::Occupied(_) => Err(AppError::conflict(
                "An import for this country and rate type is already in progress",
            )),
            Entry::Vacant(slot) => {
                slot.insert(());
                Ok(Self {
                    locks: locks.clone(),
                    key: (country_id, rate_type),
                })
            }
        }
    }
}

impl Drop for ImportGuard {
    fn drop(&mut self) {
        self.locks.remove(&self.key);
    }
}

// ── Import driver ───────────────────────────────────────────────────

/// Run a full workbook import for one country and rate type.
///
/// Order: parse and reconcile every sheet, archive the originals, then
/// one transaction upserting zones and rates and inserting the
/// provenance rows. A failed transaction removes the archived files.
pub async fn import_ratecard(
    pool: &SqlitePool,
    storage: &StorageService,
    locks: &ImportLocks,
    country_id: i64,
    rate_type: RateType,
    documents: SheetUpload,
    non_documents: SheetUpload,
    zones: SheetUpload,
) -> Result<ImportSummary, AppError> {
    let country = repo::country::find_by_id(pool, country_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Country {country_id} not found")))?;

    if country.share_country_id.is_some() {
        return Err(AppError::field(
            "country_id",
            "Country shares rates from another country; import into the owning country instead",
        ));
    }

    let _guard = ImportGuard::acquire(locks, country.id, rate_type)?;

    let document_rows = parse_rate_sheet(SheetKind::Documents, &documents.data)?;
    let non_document_rows = parse_rate_sheet(SheetKind::NonDocuments, &non_documents.data)?;
    let zone_rows = parse_zone_sheet(&zones.data)?;
    reconcile(&zone_rows, &document_rows, &non_document_rows)?;

    // Archive originals before touching the database; the provenance
    // rows written below point at these paths.
    let timestamp = now_secs();
    let mut archived: Vec<(SheetKind, String, ArchivedFile)> = Vec::new();
    for part in [&documents, &non_documents, &zones] {
        match storage.archive_ratecard(&country.code, &part.original_name, &part.data, timestamp) {
            Ok(file) => archived.push((part.sheet, part.original_name.clone(), file)),
            Err(e) => {
                remove_archived(storage, &archived);
                return Err(e);
            }
        }
    }

    match persist(
        pool,
        &country,
        rate_type,
        &zone_rows,
        &document_rows,
        &non_document_rows,
        &archived,
    )
    .await
    {
        Ok(files) => {
            tracing::info!(
                country = %country.code,
                rate_type = %rate_type,
                zones = zone_rows.len(),
                rates = document_rows.len() + non_document_rows.len(),
                "Ratecard imported"
            );
            Ok(ImportSummary {
                country_id: country.id,
                rate_type,
                zones: zone_rows.len(),
                document_rates: document_rows.len(),
                non_document_rates: non_document_rows.len(),
                files,
            })
        }
        Err(e) => {
            remove_archived(storage, &archived);
            Err(e.into())
        }
    }
}

fn remove_archived(storage: &StorageService, archived: &[(SheetKind, String, ArchivedFile)]) {
    for (_, _, file) in archived {
        storage.remove(&file.rel_path);
    }
}

async fn persist(
    pool: &SqlitePool,
    country: &Country,
    rate_type: RateType,
    zones: &[ZoneRow],
    documents: &[RateRow],
    non_documents: &[RateRow],
    archived: &[(SheetKind, String, ArchivedFile)],
) -> Result<Vec<RatecardFile>, RepoError> {
    let now = now_millis();
    let mut tx = pool.begin().await?;

    for zone in zones {
        repo::country_zone::upsert_tx(&mut tx, country.id, &zone.name, zone.zone, zone.transit_days)
            .await?;
    }

    for (package_type, rows) in [
        (PackageType::Document, documents),
        (PackageType::NonDocument, non_documents),
    ] {
        for rate in rows {
            repo::rate::upsert_tx(
                &mut tx,
                country.id,
                package_type,
                rate_type,
                rate.zone,
                rate.weight,
                rate.price,
            )
            .await?;
        }
    }

    let mut files = Vec::new();
    for (sheet, original_name, file) in archived {
        let id = repo::ratecard_file::insert_tx(
            &mut tx,
            country.id,
            *sheet,
            rate_type,
            original_name,
            &file.rel_path,
            &file.checksum,
            now,
        )
        .await?;
        files.push(RatecardFile {
            id,
            country_id: country.id,
            sheet: *sheet,
            rate_type,
            original_name: original_name.clone(),
            path: file.rel_path.clone(),
            checksum: file.checksum.clone(),
            created_at: now,
        });
    }

    tx.commit().await?;
    Ok(files)
}
