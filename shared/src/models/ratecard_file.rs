//! Ratecard File Model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::rate::{ParseEnumError, RateType};

/// Workbook sheet identifier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum SheetKind {
    Documents,
    NonDocuments,
    Zones,
}

impl SheetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SheetKind::Documents => "DOCUMENTS",
            SheetKind::NonDocuments => "NON_DOCUMENTS",
            SheetKind::Zones => "ZONES",
        }
    }

    /// Multipart part name carrying this sheet
    pub fn part_name(&self) -> &'static str {
        match self {
            SheetKind::Documents => "documents",
            SheetKind::NonDocuments => "non_documents",
            SheetKind::Zones => "zones",
        }
    }
}

impl fmt::Display for SheetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SheetKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DOCUMENTS" => Ok(SheetKind::Documents),
            "NON_DOCUMENTS" => Ok(SheetKind::NonDocuments),
            "ZONES" => Ok(SheetKind::Zones),
            other => Err(ParseEnumError(other.to_string())),
        }
    }
}

/// Archived ratecard upload (append-only audit trail)
///
/// One row per archived sheet file. Rows are never deleted by the app
/// and the archived file is physically retained.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct RatecardFile {
    pub id: i64,
    pub country_id: i64,
    pub sheet: SheetKind,
    pub rate_type: RateType,
    /// Filename as uploaded
    pub original_name: String,
    /// Archive path relative to the work dir
    pub path: String,
    /// SHA-256 of the uploaded bytes
    pub checksum: String,
    pub created_at: i64,
}
