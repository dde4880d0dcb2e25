//! PostgreSQL stores.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use uuid::Uuid;

use super::{PremisesStore, StoreError, SubmissionReceipt, SubmissionStore};
use crate::config::DatabaseConfig;
use crate::domain::{NewSubmission, PremiseRow, PremisesPage};

/// Pool that connects on first use, so startup never waits on the database.
pub fn lazy_pool(url: &str, config: &DatabaseConfig) -> Result<PgPool, StoreError> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect_lazy(url)
        .map_err(StoreError::from)
}

#[derive(Clone)]
pub struct PostgresSubmissionStore {
    pool: PgPool,
}

impl PostgresSubmissionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubmissionStore for PostgresSubmissionStore {
    async fn insert(&self, s: NewSubmission) -> Result<SubmissionReceipt, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO submissions (
                dataset_name, dataset_url, dataset_owner, owner_name,
                description, missing_type, job_title, sector
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, created_at
            "#,
        )
        .bind(s.dataset_name)
        .bind(s.dataset_url)
        .bind(s.dataset_owner.as_str())
        .bind(s.owner_name)
        .bind(s.description)
        .bind(s.missing_type.as_stored())
        .bind(s.job_title)
        .bind(s.sector.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(SubmissionReceipt {
            id: row.try_get::<Uuid, _>("id")?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        })
    }
}

/// BDUK premises joined to OS Open Linked Identifiers (UPRN → USRN).
#[derive(Clone)]
pub struct PostgresPremisesStore {
    pool: PgPool,
    query: String,
}

impl PostgresPremisesStore {
    /// Table names must already be checked as plain SQL identifiers.
    pub fn new(pool: PgPool, bduk_table: &str, os_identifiers_table: &str) -> Self {
        Self {
            pool,
            query: premises_query(bduk_table, os_identifiers_table),
        }
    }
}

pub(crate) fn premises_query(bduk_table: &str, os_identifiers_table: &str) -> String {
    format!(
        r#"
        SELECT
            bduk.uprn::text AS uprn,
            bduk.postcode::text AS postcode,
            bduk.country::text AS country,
            bduk.local_authority_district_ons::text AS local_authority,
            bduk.region_ons::text AS region,
            COALESCE(bduk.current_gigabit::boolean, false) AS current_gigabit,
            COALESCE(bduk.future_gigabit::boolean, false) AS future_gigabit,
            bduk.lot_name::text AS lot_name,
            bduk.subsidy_control_status::text AS subsidy_control_status,
            COUNT(*) OVER() AS total_count
        FROM {bduk_table} bduk
        LEFT JOIN {os_identifiers_table} usrn
            ON bduk.uprn = usrn.identifier_1
        WHERE usrn.identifier_2 = $1
        ORDER BY bduk.uprn
        "#
    )
}

fn row_to_premise(row: &PgRow) -> Result<PremiseRow, StoreError> {
    Ok(PremiseRow {
        uprn: row.try_get("uprn")?,
        postcode: row.try_get("postcode")?,
        country: row.try_get("country")?,
        local_authority: row.try_get("local_authority")?,
        region: row.try_get("region")?,
        current_gigabit: row.try_get("current_gigabit")?,
        future_gigabit: row.try_get("future_gigabit")?,
        lot_name: row.try_get("lot_name")?,
        subsidy_control_status: row.try_get("subsidy_control_status")?,
    })
}

#[async_trait]
impl PremisesStore for PostgresPremisesStore {
    async fn premises_for_usrn(&self, usrn: i64) -> Result<PremisesPage, StoreError> {
        let rows = sqlx::query(&self.query)
            .bind(usrn)
            .fetch_all(&self.pool)
            .await?;

        let total_count = match rows.first() {
            Some(row) => row.try_get::<i64, _>("total_count")?,
            None => 0,
        };
        let rows = rows.iter().map(row_to_premise).collect::<Result<Vec<_>, _>>()?;

        Ok(PremisesPage { total_count, rows })
    }
}
