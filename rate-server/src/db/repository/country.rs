//! Country Repository

use super::quote_lang::{self, QuoteUpsert};
use super::{RepoError, RepoResult};
use shared::models::{Country, CountryListItem};
use shared::util::now_millis;
use sqlx::SqlitePool;

/// Validated, normalized column values for insert/update
#[derive(Debug, Clone)]
pub struct CountryFields {
    pub name: String,
    pub code: String,
    pub currency_code: String,
    pub price_symbol: String,
    pub decimal_places: i64,
    pub symbol_first_business: bool,
    pub symbol_first_personal: bool,
    pub is_active: bool,
    pub share_country_id: Option<i64>,
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Country>> {
    let countries = sqlx::query_as::<_, Country>(
        "SELECT id, name, code, currency_code, price_symbol, decimal_places, symbol_first_business, symbol_first_personal, is_active, share_country_id, created_at, updated_at FROM country ORDER BY name",
    )
    .fetch_all(pool)
    .await?;
    Ok(countries)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Country>> {
    let country = sqlx::query_as::<_, Country>(
        "SELECT id, name, code, currency_code, price_symbol, decimal_places, symbol_first_business, symbol_first_personal, is_active, share_country_id, created_at, updated_at FROM country WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(country)
}

/// Whether a code is already taken by a country other than `exclude`
pub async fn code_taken(pool: &SqlitePool, code: &str, exclude: Option<i64>) -> RepoResult<bool> {
    let taken: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM country WHERE code = ?1 AND (?2 IS NULL OR id <> ?2))",
    )
    .bind(code)
    .bind(exclude)
    .fetch_one(pool)
    .await?;
    Ok(taken)
}

/// Active countries for the public sender/receiver listings
pub async fn find_active(pool: &SqlitePool) -> RepoResult<Vec<CountryListItem>> {
    let countries = sqlx::query_as::<_, CountryListItem>(
        "SELECT id, name, code FROM country WHERE is_active = 1 ORDER BY name",
    )
    .fetch_all(pool)
    .await?;
    Ok(countries)
}

/// Create a country together with its quote-lang rows.
///
/// One transaction: a failing quote row rolls the country back too.
pub async fn create(
    pool: &SqlitePool,
    fields: &CountryFields,
    quotes: &[QuoteUpsert],
) -> RepoResult<Country> {
    let now = now_millis();
    let mut tx = pool.begin().await?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO country (name, code, currency_code, price_symbol, decimal_places, symbol_first_business, symbol_first_personal, is_active, share_country_id, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&fields.name)
    .bind(&fields.code)
    .bind(&fields.currency_code)
    .bind(&fields.price_symbol)
    .bind(fields.decimal_places)
    .bind(fields.symbol_first_business)
    .bind(fields.symbol_first_personal)
    .bind(fields.is_active)
    .bind(fields.share_country_id)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    for quote in quotes {
        quote_lang::upsert_tx(&mut tx, id, quote).await?;
    }

    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create country".into()))
}

/// Full-field update plus quote-lang upserts, in one transaction
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    fields: &CountryFields,
    quotes: &[QuoteUpsert],
) -> RepoResult<Country> {
    let now = now_millis();
    let mut tx = pool.begin().await?;

    let rows = sqlx::query(
        "UPDATE country SET name = ?, code = ?, currency_code = ?, price_symbol = ?, decimal_places = ?, symbol_first_business = ?, symbol_first_personal = ?, is_active = ?, share_country_id = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&fields.name)
    .bind(&fields.code)
    .bind(&fields.currency_code)
    .bind(&fields.price_symbol)
    .bind(fields.decimal_places)
    .bind(fields.symbol_first_business)
    .bind(fields.symbol_first_personal)
    .bind(fields.is_active)
    .bind(fields.share_country_id)
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Country {id} not found")));
    }

    for quote in quotes {
        quote_lang::upsert_tx(&mut tx, id, quote).await?;
    }

    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Country {id} not found")))
}

/// Whether any country borrows this one's zones/rates
pub async fn has_sharers(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let sharers: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM country WHERE share_country_id = ?)")
            .bind(id)
            .fetch_one(pool)
            .await?;
    Ok(sharers)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    // Countries borrowing this one's rates would silently lose data
    if has_sharers(pool, id).await? {
        return Err(RepoError::Validation(
            "Cannot delete a country that other countries share rates from".into(),
        ));
    }

    let rows = sqlx::query("DELETE FROM country WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Country {id} not found")));
    }
    Ok(true)
}
