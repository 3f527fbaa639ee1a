//! Rate Model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Package type enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PackageType {
    Document,
    NonDocument,
}

impl PackageType {
    pub const ALL: [PackageType; 2] = [PackageType::Document, PackageType::NonDocument];

    pub fn as_str(&self) -> &'static str {
        match self {
            PackageType::Document => "DOCUMENT",
            PackageType::NonDocument => "NON_DOCUMENT",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PackageType::Document => "Document",
            PackageType::NonDocument => "Non-document",
        }
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rate type enum (pricing context)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum RateType {
    Original,
    Personal,
    Business,
}

impl RateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateType::Original => "ORIGINAL",
            RateType::Personal => "PERSONAL",
            RateType::Business => "BUSINESS",
        }
    }
}

impl fmt::Display for RateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse error for the rate enums (multipart text fields arrive as raw strings)
#[derive(Debug, Error)]
#[error("unrecognized value: {0}")]
pub struct ParseEnumError(pub String);

impl FromStr for RateType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ORIGINAL" => Ok(RateType::Original),
            "PERSONAL" => Ok(RateType::Personal),
            "BUSINESS" => Ok(RateType::Business),
            other => Err(ParseEnumError(other.to_string())),
        }
    }
}

impl FromStr for PackageType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DOCUMENT" => Ok(PackageType::Document),
            "NON_DOCUMENT" => Ok(PackageType::NonDocument),
            other => Err(ParseEnumError(other.to_string())),
        }
    }
}

/// Rate entity
///
/// Price rows are banded by `weight` ceiling: a row covers every weight
/// up to and including its ceiling that no lower ceiling covers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Rate {
    pub id: i64,
    pub country_id: i64,
    pub package_type: PackageType,
    pub rate_type: RateType,
    pub zone: i64,
    /// Weight ceiling in kg
    pub weight: f64,
    pub price: f64,
}
