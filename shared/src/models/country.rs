//! Country Model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::rate::RateType;

/// Country entity
///
/// Holds the per-country currency/formatting rules and the optional rate
/// sharing reference. A country with `share_country_id` set borrows the
/// referenced country's zones and rates instead of owning any.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Country {
    pub id: i64,
    pub name: String,
    /// ISO code, unique, stored uppercased
    pub code: String,
    /// ISO 4217 currency code (e.g. "USD")
    pub currency_code: String,
    /// Symbol printed next to prices (e.g. "$")
    pub price_symbol: String,
    /// Decimal places shown for prices (0-4)
    pub decimal_places: i64,
    /// Symbol placement for business-context prices (true = before numeral)
    pub symbol_first_business: bool,
    /// Symbol placement for personal-context prices
    pub symbol_first_personal: bool,
    pub is_active: bool,
    /// When set, zones/rates resolve through the referenced country
    pub share_country_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Country {
    /// The country id zones and rates are read from.
    ///
    /// Computed once per request and passed down; every zone/rate read
    /// must go through this instead of `self.id`, or shared countries
    /// silently show no data.
    pub fn rate_country_id(&self) -> i64 {
        self.share_country_id.unwrap_or(self.id)
    }

    /// Symbol placement flag for the given rate context.
    pub fn symbol_first(&self, rate_type: RateType) -> bool {
        match rate_type {
            RateType::Business => self.symbol_first_business,
            _ => self.symbol_first_personal,
        }
    }
}

/// Country payload for create and update (both share the same
/// validation, an update is a full replace)
///
/// Unknown top-level keys land in `extra`; the handler picks the
/// allow-listed quote-lang fields out of it (see [`super::quote_lang`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryPayload {
    pub name: String,
    pub code: String,
    pub currency_code: String,
    pub price_symbol: Option<String>,
    pub decimal_places: Option<i64>,
    pub symbol_first_business: Option<bool>,
    pub symbol_first_personal: Option<bool>,
    pub is_active: Option<bool>,
    pub share_country_id: Option<i64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Compact country listing for the public sender/receiver endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CountryListItem {
    pub id: i64,
    pub name: String,
    pub code: String,
}
