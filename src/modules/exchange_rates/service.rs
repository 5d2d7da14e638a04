//! Exchange rate management.
//!
//! The single-active-rate invariant is enforced in two layers: every
//! activation deactivates the previous rate inside one transaction, and a
//! partial unique index on `is_active` turns a lost race into a constraint
//! error instead of a second active row.

use sqlx::PgPool;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use stockbay_cache::{MemoryCache, invalidate, keys};

use crate::modules::exchange_rates::model::{
    CreateExchangeRateDto, ExchangeRate, UpdateExchangeRateDto,
};
use crate::utils::errors::AppError;

const RATE_COLUMNS: &str = "id, rate, is_active, created_at, updated_at";

pub struct ExchangeRateService;

impl ExchangeRateService {
    #[instrument(skip(db, cache), fields(db.operation = "SELECT", db.table = "exchange_rates"))]
    pub async fn get_exchange_rates(
        db: &PgPool,
        cache: &MemoryCache,
    ) -> Result<Vec<ExchangeRate>, AppError> {
        let cache_key = keys::generate(keys::prefixes::EXCHANGE_RATES, &[]);

        if let Some(rates) = cache.get::<Vec<ExchangeRate>>(&cache_key).await {
            debug!("Exchange rate list served from cache");
            return Ok(rates);
        }

        let query = format!(
            "SELECT {RATE_COLUMNS} FROM exchange_rates ORDER BY created_at DESC"
        );
        let rates = sqlx::query_as::<_, ExchangeRate>(&query)
            .fetch_all(db)
            .await?;

        if let Err(e) = cache.set(&cache_key, &rates).await {
            warn!(error = %e, "Failed to cache exchange rate list");
        }

        Ok(rates)
    }

    /// The currently active rate, if any. Always read live: purchases and
    /// orders price against it, so a stale value is worse than a query.
    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "exchange_rates"))]
    pub async fn find_active_rate(db: &PgPool) -> Result<Option<ExchangeRate>, AppError> {
        let query = format!("SELECT {RATE_COLUMNS} FROM exchange_rates WHERE is_active = TRUE");
        let rate = sqlx::query_as::<_, ExchangeRate>(&query)
            .fetch_optional(db)
            .await?;

        Ok(rate)
    }

    pub async fn get_active_rate(db: &PgPool) -> Result<ExchangeRate, AppError> {
        Self::find_active_rate(db)
            .await?
            .ok_or_else(|| AppError::not_found("No active exchange rate found"))
    }

    /// Rate applied to a new purchase or order: an explicit rate wins,
    /// otherwise the active rate. With neither, the transaction is refused
    /// rather than priced at a guess.
    pub async fn resolve_rate(db: &PgPool, requested: Option<f64>) -> Result<f64, AppError> {
        if let Some(rate) = requested {
            return Ok(rate);
        }

        match Self::find_active_rate(db).await? {
            Some(active) => Ok(active.rate),
            None => {
                warn!("Rejected transaction; no exchange rate given and none active");
                Err(AppError::validation("No active exchange rate is set"))
            }
        }
    }

    #[instrument(skip(db, cache, dto), fields(exchange_rate.rate = %dto.rate, db.operation = "INSERT", db.table = "exchange_rates"))]
    pub async fn create_exchange_rate(
        db: &PgPool,
        cache: &MemoryCache,
        dto: CreateExchangeRateDto,
    ) -> Result<ExchangeRate, AppError> {
        let query = format!(
            "INSERT INTO exchange_rates (rate, is_active) VALUES ($1, $2) RETURNING {RATE_COLUMNS}"
        );

        let rate = if dto.is_active {
            let mut tx = db.begin().await?;

            let deactivated = sqlx::query(
                "UPDATE exchange_rates SET is_active = FALSE, updated_at = NOW() \
                 WHERE is_active = TRUE",
            )
            .execute(&mut *tx)
            .await?
            .rows_affected();

            let rate = sqlx::query_as::<_, ExchangeRate>(&query)
                .bind(dto.rate)
                .bind(true)
                .fetch_one(&mut *tx)
                .await?;

            tx.commit().await?;

            info!(
                exchange_rate.id = %rate.id,
                exchange_rate.rate = %rate.rate,
                deactivated = %deactivated,
                "Active exchange rate switched"
            );

            rate
        } else {
            let rate = sqlx::query_as::<_, ExchangeRate>(&query)
                .bind(dto.rate)
                .bind(false)
                .fetch_one(db)
                .await?;

            info!(exchange_rate.id = %rate.id, "Inactive exchange rate created");

            rate
        };

        invalidate::exchange_rates(cache).await;

        Ok(rate)
    }

    #[instrument(skip(db, cache, dto), fields(exchange_rate.id = %id, db.operation = "UPDATE", db.table = "exchange_rates"))]
    pub async fn update_exchange_rate(
        db: &PgPool,
        cache: &MemoryCache,
        id: Uuid,
        dto: UpdateExchangeRateDto,
    ) -> Result<ExchangeRate, AppError> {
        let existing = Self::fetch_rate(db, id).await?;

        let new_rate = dto.rate.unwrap_or(existing.rate);
        let activate = dto.is_active.unwrap_or(existing.is_active);

        let query = format!(
            "UPDATE exchange_rates SET rate = $2, is_active = $3, updated_at = NOW() \
             WHERE id = $1 RETURNING {RATE_COLUMNS}"
        );

        let rate = if activate && !existing.is_active {
            let mut tx = db.begin().await?;

            let deactivated = sqlx::query(
                "UPDATE exchange_rates SET is_active = FALSE, updated_at = NOW() \
                 WHERE is_active = TRUE",
            )
            .execute(&mut *tx)
            .await?
            .rows_affected();

            let rate = sqlx::query_as::<_, ExchangeRate>(&query)
                .bind(id)
                .bind(new_rate)
                .bind(true)
                .fetch_one(&mut *tx)
                .await?;

            tx.commit().await?;

            info!(
                exchange_rate.id = %rate.id,
                exchange_rate.rate = %rate.rate,
                deactivated = %deactivated,
                "Active exchange rate switched"
            );

            rate
        } else {
            if existing.is_active && !activate {
                warn!(
                    exchange_rate.id = %id,
                    "Active exchange rate deactivated; no rate is active now"
                );
            }

            let rate = sqlx::query_as::<_, ExchangeRate>(&query)
                .bind(id)
                .bind(new_rate)
                .bind(activate)
                .fetch_one(db)
                .await?;

            info!(exchange_rate.id = %rate.id, "Exchange rate updated");

            rate
        };

        invalidate::exchange_rates(cache).await;

        Ok(rate)
    }

    #[instrument(skip(db, cache), fields(exchange_rate.id = %id, db.operation = "DELETE", db.table = "exchange_rates"))]
    pub async fn delete_exchange_rate(
        db: &PgPool,
        cache: &MemoryCache,
        id: Uuid,
    ) -> Result<(), AppError> {
        let existing = Self::fetch_rate(db, id).await?;

        if existing.is_active {
            warn!(exchange_rate.id = %id, "Refused to delete the active exchange rate");
            return Err(AppError::validation(
                "Cannot delete the active exchange rate",
            ));
        }

        sqlx::query("DELETE FROM exchange_rates WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        invalidate::exchange_rates(cache).await;

        info!(exchange_rate.id = %id, "Exchange rate deleted");

        Ok(())
    }

    async fn fetch_rate(db: &PgPool, id: Uuid) -> Result<ExchangeRate, AppError> {
        let query = format!("SELECT {RATE_COLUMNS} FROM exchange_rates WHERE id = $1");

        sqlx::query_as::<_, ExchangeRate>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found("Exchange rate not found"))
    }
}
