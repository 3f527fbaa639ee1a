//! Country Handlers
//!
//! CRUD for countries plus the rates/receivers views. Every zone/rate
//! read goes through the share-resolved country id.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use shared::ApiResponse;
use shared::models::{
    Country, CountryPayload, CountryQuoteLang, CountryZone, PackageType, RateType, quote_field,
};

use crate::core::ServerState;
use crate::db::repository::country::CountryFields;
use crate::db::repository::quote_lang::QuoteUpsert;
use crate::db::repository::{self as repo};
use crate::services::pricing;
use crate::utils::error::FieldErrors;
use crate::utils::validation::{
    MAX_CODE_LEN, MAX_DECIMAL_PLACES, MAX_NAME_LEN, MAX_QUOTE_TEXT_LEN, MAX_SYMBOL_LEN,
    MIN_CODE_LEN, check_optional_text, push_error, require_text,
};
use crate::utils::{AppError, ok, ok_with_message};

/// Country with its quote-lang rows
#[derive(Debug, Serialize)]
pub struct CountryDetail {
    #[serde(flatten)]
    pub country: Country,
    pub quote_langs: Vec<CountryQuoteLang>,
}

/// Validate and normalize a payload; `exclude` is the country being
/// updated (its own code does not count as taken).
///
/// Collects every field failure before returning, so the client sees
/// the whole picture at once.
async fn build_fields(
    state: &ServerState,
    payload: &CountryPayload,
    exclude: Option<i64>,
) -> Result<(CountryFields, Vec<QuoteUpsert>), AppError> {
    let mut errors = FieldErrors::new();

    let name = payload.name.trim().to_string();
    require_text(&mut errors, "name", &name, MAX_NAME_LEN);

    let code = payload.code.trim().to_ascii_uppercase();
    if code.len() < MIN_CODE_LEN
        || code.len() > MAX_CODE_LEN
        || !code.chars().all(|c| c.is_ascii_alphabetic())
    {
        push_error(&mut errors, "code", "must be a 2-3 letter ISO code");
    }

    let currency_code = payload.currency_code.trim().to_ascii_uppercase();
    if currency_code.len() != 3 || !currency_code.chars().all(|c| c.is_ascii_alphabetic()) {
        push_error(&mut errors, "currency_code", "must be a 3-letter ISO 4217 code");
    }

    check_optional_text(&mut errors, "price_symbol", &payload.price_symbol, MAX_SYMBOL_LEN);
    let price_symbol = payload.price_symbol.clone().unwrap_or_default();

    let decimal_places = payload.decimal_places.unwrap_or(2);
    if !(0..=MAX_DECIMAL_PLACES).contains(&decimal_places) {
        push_error(
            &mut errors,
            "decimal_places",
            format!("must be between 0 and {MAX_DECIMAL_PLACES}"),
        );
    }

    // Allow-listed quote fields; anything else in `extra` is ignored
    let mut quotes = Vec::new();
    for (key, value) in &payload.extra {
        let Some(field) = quote_field(key) else {
            continue;
        };
        match value.as_str() {
            Some(text) if text.len() > MAX_QUOTE_TEXT_LEN => {
                push_error(&mut errors, key, "is too long");
            }
            Some(text) => quotes.push(QuoteUpsert {
                name: field.key.to_string(),
                lang: field.lang.map(str::to_string),
                description: text.to_string(),
            }),
            None => push_error(&mut errors, key, "must be a string"),
        }
    }

    // Database-backed checks only for fields that passed so far
    if !errors.contains_key("code")
        && repo::country::code_taken(state.pool(), &code, exclude).await?
    {
        push_error(&mut errors, "code", "has already been taken");
    }

    if let Some(share_id) = payload.share_country_id {
        if exclude == Some(share_id) {
            push_error(&mut errors, "share_country_id", "cannot reference itself");
        } else {
            match repo::country::find_by_id(state.pool(), share_id).await? {
                None => push_error(&mut errors, "share_country_id", "does not exist"),
                Some(target) if target.share_country_id.is_some() => push_error(
                    &mut errors,
                    "share_country_id",
                    "referenced country shares rates itself; reference the owning country",
                ),
                Some(_) => {}
            }
            // The redirect is one hop: a country others borrow from
            // cannot start borrowing itself
            if let Some(id) = exclude
                && repo::country::has_sharers(state.pool(), id).await?
            {
                push_error(
                    &mut errors,
                    "share_country_id",
                    "other countries share rates from this country",
                );
            }
        }
    }

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    Ok((
        CountryFields {
            name,
            code,
            currency_code,
            price_symbol,
            decimal_places,
            symbol_first_business: payload.symbol_first_business.unwrap_or(true),
            symbol_first_personal: payload.symbol_first_personal.unwrap_or(true),
            is_active: payload.is_active.unwrap_or(true),
            share_country_id: payload.share_country_id,
        },
        quotes,
    ))
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<ApiResponse<Vec<Country>>>, AppError> {
    Ok(ok(repo::country::find_all(state.pool()).await?))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CountryPayload>,
) -> Result<Json<ApiResponse<Country>>, AppError> {
    let (fields, quotes) = build_fields(&state, &payload, None).await?;
    let country = repo::country::create(state.pool(), &fields, &quotes).await?;
    Ok(ok_with_message(country, "Country created"))
}

pub async fn show(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<CountryDetail>>, AppError> {
    let country = repo::country::find_by_id(state.pool(), id)
        .await?
        .ok_or_else(|| AppError::not_found("Country not found"))?;
    let quote_langs = repo::quote_lang::find_by_country(state.pool(), country.id).await?;
    Ok(ok(CountryDetail { country, quote_langs }))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<CountryPayload>,
) -> Result<Json<ApiResponse<Country>>, AppError> {
    let (fields, quotes) = build_fields(&state, &payload, Some(id)).await?;
    let country = repo::country::update(state.pool(), id, &fields, &quotes).await?;
    Ok(ok_with_message(country, "Country updated"))
}

pub async fn destroy(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    repo::country::delete(state.pool(), id).await?;
    Ok(ok_with_message((), "Country deleted"))
}

// ── Rates / receivers views ─────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RatesQuery {
    pub package_type: Option<PackageType>,
    pub rate_type: Option<RateType>,
}

#[derive(Debug, Serialize)]
pub struct RateView {
    pub zone: i64,
    pub weight: f64,
    pub price: f64,
    pub formatted: String,
}

#[derive(Debug, Serialize)]
pub struct RatesView {
    pub country_id: i64,
    /// Differs from country_id when rates are shared
    pub rate_country_id: i64,
    pub package_type: PackageType,
    pub rate_type: RateType,
    /// Highest zone present, display bound only
    pub max_zone: Option<i64>,
    pub rates: Vec<RateView>,
}

/// Rate table for one (package type, rate type), share-resolved
pub async fn rates(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Query(query): Query<RatesQuery>,
) -> Result<Json<ApiResponse<RatesView>>, AppError> {
    let country = repo::country::find_by_id(state.pool(), id)
        .await?
        .ok_or_else(|| AppError::not_found("Country not found"))?;

    let package_type = query.package_type.unwrap_or(PackageType::Document);
    let rate_type = query.rate_type.unwrap_or(RateType::Original);
    let rate_country_id = country.rate_country_id();

    let rows = repo::rate::find_for_country(state.pool(), rate_country_id, package_type, rate_type)
        .await?;
    let max_zone = repo::rate::max_zone(state.pool(), rate_country_id, package_type).await?;

    let rates = rows
        .into_iter()
        .map(|rate| RateView {
            zone: rate.zone,
            weight: rate.weight,
            formatted: pricing::format_price(&country, rate_type, rate.price),
            price: rate.price,
        })
        .collect();

    Ok(ok(RatesView {
        country_id: country.id,
        rate_country_id,
        package_type,
        rate_type,
        max_zone,
        rates,
    }))
}

/// Destination list (zones with transit days), share-resolved
pub async fn receivers(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<CountryZone>>>, AppError> {
    let country = repo::country::find_by_id(state.pool(), id)
        .await?
        .ok_or_else(|| AppError::not_found("Country not found"))?;
    let zones =
        repo::country_zone::find_by_country(state.pool(), country.rate_country_id()).await?;
    Ok(ok(zones))
}
