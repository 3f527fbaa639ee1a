//! Country Zone Repository

use super::RepoResult;
use shared::models::CountryZone;
use sqlx::{Sqlite, SqlitePool, Transaction};

pub async fn find_by_country(pool: &SqlitePool, country_id: i64) -> RepoResult<Vec<CountryZone>> {
    let zones = sqlx::query_as::<_, CountryZone>(
        "SELECT id, country_id, name, zone, transit_days FROM country_zone WHERE country_id = ? ORDER BY zone, name",
    )
    .bind(country_id)
    .fetch_all(pool)
    .await?;
    Ok(zones)
}

/// Zone row covering a destination country, by name
pub async fn find_destination(
    pool: &SqlitePool,
    country_id: i64,
    destination: &str,
) -> RepoResult<Option<CountryZone>> {
    let zone = sqlx::query_as::<_, CountryZone>(
        "SELECT id, country_id, name, zone, transit_days FROM country_zone WHERE country_id = ? AND name = ? COLLATE NOCASE LIMIT 1",
    )
    .bind(country_id)
    .bind(destination)
    .fetch_optional(pool)
    .await?;
    Ok(zone)
}

/// Upsert on (country_id, name); a reimport may move a destination to a
/// different zone
pub async fn upsert_tx(
    tx: &mut Transaction<'_, Sqlite>,
    country_id: i64,
    name: &str,
    zone: i64,
    transit_days: i64,
) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO country_zone (country_id, name, zone, transit_days) VALUES (?, ?, ?, ?) ON CONFLICT(country_id, name) DO UPDATE SET zone = excluded.zone, transit_days = excluded.transit_days",
    )
    .bind(country_id)
    .bind(name)
    .bind(zone)
    .bind(transit_days)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
