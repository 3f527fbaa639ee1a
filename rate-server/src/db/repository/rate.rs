//! Rate Repository
//!
//! Price rows banded by weight ceiling. Band selection is the smallest
//! ceiling >= the requested weight, so a weight exactly on a boundary
//! lands in that band, not the next one up.

use super::RepoResult;
use shared::models::{PackageType, Rate, RateType};
use sqlx::{Sqlite, SqlitePool, Transaction};

pub async fn find_for_country(
    pool: &SqlitePool,
    country_id: i64,
    package_type: PackageType,
    rate_type: RateType,
) -> RepoResult<Vec<Rate>> {
    let rates = sqlx::query_as::<_, Rate>(
        "SELECT id, country_id, package_type, rate_type, zone, weight, price FROM rate WHERE country_id = ? AND package_type = ? AND rate_type = ? ORDER BY zone, weight",
    )
    .bind(country_id)
    .bind(package_type)
    .bind(rate_type)
    .fetch_all(pool)
    .await?;
    Ok(rates)
}

/// The band covering `weight`, optionally scoped to a single zone.
///
/// Without a zone the `zone ASC` tiebreak keeps the result deterministic.
pub async fn find_band(
    pool: &SqlitePool,
    country_id: i64,
    package_type: PackageType,
    rate_type: RateType,
    zone: Option<i64>,
    weight: f64,
) -> RepoResult<Option<Rate>> {
    let rate = match zone {
        Some(zone) => {
            sqlx::query_as::<_, Rate>(
                "SELECT id, country_id, package_type, rate_type, zone, weight, price FROM rate WHERE country_id = ? AND package_type = ? AND rate_type = ? AND zone = ? AND weight >= ? ORDER BY weight ASC LIMIT 1",
            )
            .bind(country_id)
            .bind(package_type)
            .bind(rate_type)
            .bind(zone)
            .bind(weight)
            .fetch_optional(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Rate>(
                "SELECT id, country_id, package_type, rate_type, zone, weight, price FROM rate WHERE country_id = ? AND package_type = ? AND rate_type = ? AND weight >= ? ORDER BY weight ASC, zone ASC LIMIT 1",
            )
            .bind(country_id)
            .bind(package_type)
            .bind(rate_type)
            .bind(weight)
            .fetch_optional(pool)
            .await?
        }
    };
    Ok(rate)
}

/// Highest zone number present for (country, package type).
///
/// Display bound only; pricing never uses it.
pub async fn max_zone(
    pool: &SqlitePool,
    country_id: i64,
    package_type: PackageType,
) -> RepoResult<Option<i64>> {
    let zone: Option<i64> = sqlx::query_scalar(
        "SELECT MAX(zone) FROM rate WHERE country_id = ? AND package_type = ?",
    )
    .bind(country_id)
    .bind(package_type)
    .fetch_one(pool)
    .await?;
    Ok(zone)
}

/// Upsert on the reimport key (country, package type, rate type, zone, weight)
pub async fn upsert_tx(
    tx: &mut Transaction<'_, Sqlite>,
    country_id: i64,
    package_type: PackageType,
    rate_type: RateType,
    zone: i64,
    weight: f64,
    price: f64,
) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO rate (country_id, package_type, rate_type, zone, weight, price) VALUES (?, ?, ?, ?, ?, ?) ON CONFLICT(country_id, package_type, rate_type, zone, weight) DO UPDATE SET price = excluded.price",
    )
    .bind(country_id)
    .bind(package_type)
    .bind(rate_type)
    .bind(zone)
    .bind(weight)
    .bind(price)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::country::tests::{fields, test_pool};
    use crate::db::repository::country;

    async fn seed_rate(
        pool: &SqlitePool,
        country_id: i64,
        package_type: PackageType,
        rate_type: RateType,
        zone: i64,
        weight: f64,
        price: f64,
    ) {
        let mut tx = pool.begin().await.unwrap();
        upsert_tx(&mut tx, country_id, package_type, rate_type, zone, weight, price)
            .await
            .unwrap();
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn band_boundary_selects_the_exact_ceiling() {
        let pool = test_pool().await;
        let country = country::create(&pool, &fields("Testland", "TL"), &[]).await.unwrap();

        seed_rate(&pool, country.id, PackageType::Document, RateType::Personal, 1, 0.5, 10.0).await;
        seed_rate(&pool, country.id, PackageType::Document, RateType::Personal, 1, 1.0, 15.0).await;
        seed_rate(&pool, country.id, PackageType::Document, RateType::Personal, 1, 2.0, 22.0).await;

        // Exactly on the 1.0 ceiling -> the 1.0 band, not the 2.0 one
        let band = find_band(&pool, country.id, PackageType::Document, RateType::Personal, Some(1), 1.0)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(band.weight, 1.0);
        assert_eq!(band.price, 15.0);

        // Just above -> next band
        let band = find_band(&pool, country.id, PackageType::Document, RateType::Personal, Some(1), 1.01)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(band.weight, 2.0);
    }

    #[tokio::test]
    async fn band_is_scoped_to_zone_and_rate_type() {
        let pool = test_pool().await;
        let country = country::create(&pool, &fields("Testland", "TL"), &[]).await.unwrap();

        seed_rate(&pool, country.id, PackageType::Document, RateType::Personal, 1, 1.0, 15.0).await;
        seed_rate(&pool, country.id, PackageType::Document, RateType::Personal, 2, 1.0, 19.0).await;
        seed_rate(&pool, country.id, PackageType::Document, RateType::Business, 1, 1.0, 12.0).await;

        let band = find_band(&pool, country.id, PackageType::Document, RateType::Personal, Some(2), 0.7)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(band.price, 19.0);

        let band = find_band(&pool, country.id, PackageType::Document, RateType::Business, Some(1), 0.7)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(band.price, 12.0);

        // Heavier than every ceiling -> no band, never a default
        let none = find_band(&pool, country.id, PackageType::Document, RateType::Personal, Some(1), 5.0)
            .await
            .unwrap();
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn reimport_upsert_replaces_price_without_duplicating() {
        let pool = test_pool().await;
        let country = country::create(&pool, &fields("Testland", "TL"), &[]).await.unwrap();

        seed_rate(&pool, country.id, PackageType::Document, RateType::Personal, 1, 1.0, 15.0).await;
        seed_rate(&pool, country.id, PackageType::Document, RateType::Personal, 1, 1.0, 17.5).await;

        let rates = find_for_country(&pool, country.id, PackageType::Document, RateType::Personal)
            .await
            .unwrap();
        assert_eq!(rates.len(), 1);
        assert_eq!(rates[0].price, 17.5);
    }

    #[tokio::test]
    async fn max_zone_is_per_package_type() {
        let pool = test_pool().await;
        let country = country::create(&pool, &fields("Testland", "TL"), &[]).await.unwrap();

        seed_rate(&pool, country.id, PackageType::Document, RateType::Personal, 3, 1.0, 15.0).await;
        seed_rate(&pool, country.id, PackageType::NonDocument, RateType::Personal, 5, 1.0, 20.0).await;

        assert_eq!(max_zone(&pool, country.id, PackageType::Document).await.unwrap(), Some(3));
        assert_eq!(max_zone(&pool, country.id, PackageType::NonDocument).await.unwrap(), Some(5));

        let empty = country::create(&pool, &fields("Emptyland", "EM"), &[]).await.unwrap();
        assert_eq!(max_zone(&pool, empty.id, PackageType::Document).await.unwrap(), None);
    }
}
