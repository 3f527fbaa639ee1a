//! Country Zone Model

use serde::{Deserialize, Serialize};

/// Destination zone entity
///
/// Zone numbering is per-country; a zone number carries no meaning
/// across countries. `name` is the destination country this zone covers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CountryZone {
    pub id: i64,
    pub country_id: i64,
    /// Destination country name
    pub name: String,
    /// Per-country zone number
    pub zone: i64,
    pub transit_days: i64,
}
