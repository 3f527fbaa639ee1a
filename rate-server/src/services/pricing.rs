//! Rate Resolution
//!
//! Band lookup with country rate-sharing and the per-country
//! currency/decimal formatting rules. All money math goes through
//! Decimal; rows keep f64 only as the storage representation.

use rust_decimal::prelude::*;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use shared::models::{Country, PackageType, RateType};

use crate::db::repository as repo;
use crate::utils::AppError;
use crate::utils::error::FieldErrors;
use crate::utils::validation::push_error;

/// Upper bound on packages per calculate request
const MAX_PACKAGES: usize = 50;

fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

/// Round to the country's configured decimal places
fn rounded(amount: f64, decimal_places: i64) -> Decimal {
    let digits = decimal_places.clamp(0, 4) as u32;
    to_decimal(amount).round_dp_with_strategy(digits, RoundingStrategy::MidpointAwayFromZero)
}

/// Format a price per the country's symbol and decimal rules.
///
/// The symbol sits before or after the numeral depending on the
/// per-context placement flag (business vs personal).
pub fn format_price(country: &Country, rate_type: RateType, amount: f64) -> String {
    let digits = country.decimal_places.clamp(0, 4) as usize;
    let value = rounded(amount, country.decimal_places);
    let numeral = format!("{value:.digits$}");
    if country.symbol_first(rate_type) {
        format!("{}{}", country.price_symbol, numeral)
    } else {
        format!("{}{}", numeral, country.price_symbol)
    }
}

// ── Calculate flow ──────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct PackageInput {
    pub package_type: PackageType,
    /// Weight in kg
    pub weight: f64,
}

#[derive(Debug, Deserialize)]
pub struct CalculateRequest {
    pub sender_id: i64,
    pub receiver_id: i64,
    #[serde(default = "default_rate_type")]
    pub rate_type: RateType,
    pub packages: Vec<PackageInput>,
}

fn default_rate_type() -> RateType {
    RateType::Personal
}

#[derive(Debug, Serialize)]
pub struct PackagePrice {
    pub package_type: PackageType,
    pub weight: f64,
    /// Ceiling of the band that priced this package
    pub band_weight: f64,
    pub price: f64,
    pub formatted: String,
}

#[derive(Debug, Serialize)]
pub struct CalculateResult {
    pub sender_id: i64,
    pub receiver_id: i64,
    pub rate_type: RateType,
    pub currency_code: String,
    pub zone: i64,
    pub transit_days: i64,
    pub packages: Vec<PackagePrice>,
    pub total: f64,
    pub total_formatted: String,
}

fn validate_packages(packages: &[PackageInput]) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    if packages.is_empty() {
        push_error(&mut errors, "packages", "at least one package is required");
    }
    if packages.len() > MAX_PACKAGES {
        push_error(
            &mut errors,
            "packages",
            format!("at most {MAX_PACKAGES} packages per request"),
        );
    }
    for (idx, package) in packages.iter().enumerate() {
        if !package.weight.is_finite() || package.weight <= 0.0 {
            push_error(
                &mut errors,
                &format!("packages.{idx}.weight"),
                "must be a positive number",
            );
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

/// Price a shipment: resolve the sender's rate country, find the zone
/// covering the receiver, then band-price every package.
///
/// A destination outside the zone table is a validation error; a weight
/// no band covers is an explicit not-found, never a default price.
pub async fn calculate(pool: &SqlitePool, req: &CalculateRequest) -> Result<CalculateResult, AppError> {
    validate_packages(&req.packages)?;

    let sender = repo::country::find_by_id(pool, req.sender_id)
        .await?
        .ok_or_else(|| AppError::not_found("Sender country not found"))?;
    if !sender.is_active {
        return Err(AppError::field("sender_id", "Sender country is not available"));
    }

    let receiver = repo::country::find_by_id(pool, req.receiver_id)
        .await?
        .ok_or_else(|| AppError::not_found("Receiver country not found"))?;

    let rate_country = sender.rate_country_id();
    let zone = repo::country_zone::find_destination(pool, rate_country, &receiver.name)
        .await?
        .ok_or_else(|| {
            AppError::field(
                "receiver_id",
                format!("No shipping zone covers {}", receiver.name),
            )
        })?;

    let mut total = Decimal::ZERO;
    let mut packages = Vec::with_capacity(req.packages.len());
    for package in &req.packages {
        let band = repo::rate::find_band(
            pool,
            rate_country,
            package.package_type,
            req.rate_type,
            Some(zone.zone),
            package.weight,
        )
        .await?
        .ok_or_else(|| {
            AppError::not_found(format!(
                "No {} rate covers {} kg to zone {}",
                package.package_type.label(),
                package.weight,
                zone.zone
            ))
        })?;

        let price = rounded(band.price, sender.decimal_places);
        total += price;
        packages.push(PackagePrice {
            package_type: package.package_type,
            weight: package.weight,
            band_weight: band.weight,
            price: to_f64(price),
            formatted: format_price(&sender, req.rate_type, band.price),
        });
    }

    Ok(CalculateResult {
        sender_id: sender.id,
        receiver_id: receiver.id,
        rate_type: req.rate_type,
        currency_code: sender.currency_code.clone(),
        zone: zone.zone,
        transit_days: zone.transit_days,
        total: to_f64(total),
        total_formatted: format_price(&sender, req.rate_type, to_f64(total)),
        packages,
    })
}
