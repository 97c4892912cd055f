use async_trait::async_trait;
use domain::{
    CustomerCode, DomainError, MeasureType, NaturalKey, Reading, ReadingRepository,
};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

/// Postgres SQLSTATE for a unique-constraint violation.
const UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL implementation of ReadingRepository
///
/// The `readings_natural_key` unique index is the authoritative duplicate
/// guard; a violation on insert surfaces as `DoubleReport` so concurrent
/// uploads that both pass the service pre-check still cannot both commit.
pub struct PostgresReadingRepository {
    pool: PgPool,
}

impl PostgresReadingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_reading(row: &PgRow) -> Result<Reading, DomainError> {
        let customer_code = CustomerCode::new(row.try_get::<String, _>("customer_code").map_err(db_err)?)?;

        let raw_type: String = row.try_get("measure_type").map_err(db_err)?;
        let measure_type = MeasureType::parse(&raw_type)
            .map_err(|_| DomainError::Storage(format!("unknown measure_type in row: {}", raw_type)))?;

        Ok(Reading::from_parts(
            row.try_get("id").map_err(db_err)?,
            customer_code,
            measure_type,
            row.try_get("measure_datetime").map_err(db_err)?,
            row.try_get("month").map_err(db_err)?,
            row.try_get("year").map_err(db_err)?,
            row.try_get("reading").map_err(db_err)?,
            row.try_get("image_url").map_err(db_err)?,
            row.try_get("confirmed").map_err(db_err)?,
            row.try_get("created_at").map_err(db_err)?,
            row.try_get("updated_at").map_err(db_err)?,
        ))
    }
}

fn db_err(e: sqlx::Error) -> DomainError {
    DomainError::Storage(format!("database error: {}", e))
}

#[async_trait]
impl ReadingRepository for PostgresReadingRepository {
    async fn insert(&self, reading: &Reading) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO readings (
                id, customer_code, measure_type, measure_datetime,
                month, year, reading, image_url, confirmed,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(reading.id())
        .bind(reading.customer_code().as_str())
        .bind(reading.measure_type().as_str())
        .bind(reading.measure_datetime())
        .bind(reading.month())
        .bind(reading.year())
        .bind(reading.value())
        .bind(reading.image_url())
        .bind(reading.confirmed())
        .bind(reading.created_at())
        .bind(reading.updated_at())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                Err(DomainError::DoubleReport)
            }
            Err(e) => Err(db_err(e)),
        }
    }

    async fn update(&self, reading: &Reading) -> Result<(), DomainError> {
        // Conditional write: only an unconfirmed row may be updated. Two
        // concurrent confirmations can both read `confirmed IS NULL`; the
        // predicate lets exactly one of them through.
        let result = sqlx::query(
            r#"
            UPDATE readings
            SET reading = $2, confirmed = $3, updated_at = NOW()
            WHERE id = $1 AND confirmed IS NULL
            "#,
        )
        .bind(reading.id())
        .bind(reading.value())
        .bind(reading.confirmed())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            // Zero rows means either the row is gone or it was confirmed by a
            // concurrent request after we read it.
            return match self.find_by_id(reading.id()).await? {
                Some(_) => Err(DomainError::ConfirmationDuplicate),
                None => Err(DomainError::MeasureNotFound(reading.id().to_string())),
            };
        }
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Reading>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, customer_code, measure_type, measure_datetime,
                   month, year, reading, image_url, confirmed,
                   created_at, updated_at
            FROM readings
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(Self::row_to_reading).transpose()
    }

    async fn find_by_natural_key(&self, key: &NaturalKey) -> Result<Option<Reading>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, customer_code, measure_type, measure_datetime,
                   month, year, reading, image_url, confirmed,
                   created_at, updated_at
            FROM readings
            WHERE customer_code = $1 AND measure_type = $2 AND month = $3 AND year = $4
            "#,
        )
        .bind(key.customer_code.as_str())
        .bind(key.measure_type.as_str())
        .bind(key.month)
        .bind(key.year)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(Self::row_to_reading).transpose()
    }

    async fn find_by_customer(
        &self,
        customer_code: &CustomerCode,
        measure_type: Option<MeasureType>,
    ) -> Result<Vec<Reading>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, customer_code, measure_type, measure_datetime,
                   month, year, reading, image_url, confirmed,
                   created_at, updated_at
            FROM readings
            WHERE customer_code = $1
              AND ($2::text IS NULL OR measure_type = $2)
            ORDER BY measure_datetime ASC
            "#,
        )
        .bind(customer_code.as_str())
        .bind(measure_type.map(|t| t.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(Self::row_to_reading).collect()
    }
}
