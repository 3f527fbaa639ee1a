//! Country Quote-Lang Repository

use super::RepoResult;
use shared::models::CountryQuoteLang;
use sqlx::{Sqlite, SqlitePool, Transaction};

/// One allow-listed marketing field headed for upsert
#[derive(Debug, Clone)]
pub struct QuoteUpsert {
    pub name: String,
    pub lang: Option<String>,
    pub description: String,
}

pub async fn find_by_country(pool: &SqlitePool, country_id: i64) -> RepoResult<Vec<CountryQuoteLang>> {
    let rows = sqlx::query_as::<_, CountryQuoteLang>(
        "SELECT id, country_id, name, lang, description FROM country_quote_lang WHERE country_id = ? ORDER BY name",
    )
    .bind(country_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Upsert on (country_id, name); the key name determines the language
pub async fn upsert_tx(
    tx: &mut Transaction<'_, Sqlite>,
    country_id: i64,
    quote: &QuoteUpsert,
) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO country_quote_lang (country_id, name, lang, description) VALUES (?, ?, ?, ?) ON CONFLICT(country_id, name) DO UPDATE SET lang = excluded.lang, description = excluded.description",
    )
    .bind(country_id)
    .bind(&quote.name)
    .bind(quote.lang.as_deref())
    .bind(&quote.description)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
