//! PostgreSQL store writer

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{PgConnection, Postgres, QueryBuilder};
use tracing::{debug, info};
use uuid::Uuid;
use vulnmon_common::types::{AffectedProduct, StoredVulnerability, VulnerabilityRecord};

use super::{UpsertOutcome, VulnStore};
use crate::config::DatabaseConfig;
use crate::error::StoreError;

/// Rows per multi-row insert, keeps bind parameters well under the 65535 limit
pub const AFFECTED_CHUNK_SIZE: usize = 1000;

/// Store writer backed by a connection pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct VulnRow {
    id: Uuid,
    cve_id: String,
    source: String,
    published_at: Option<DateTime<Utc>>,
    last_modified: Option<DateTime<Utc>>,
    summary: String,
    cvss_score: Option<f64>,
    raw_json: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct AffectedRow {
    vendor: String,
    product: String,
    version_range: String,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Build a pool without connecting; the first query opens connections.
    ///
    /// Lets the worker start before the database is reachable and poll it with
    /// [`VulnStore::ping`].
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout())
            .connect_lazy(&config.url)?;

        info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "Database connection pool configured"
        );

        Ok(Self { pool })
    }

    /// Apply pending migrations from the workspace `migrations/` directory
    pub async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        info!("Database migrations completed");
        Ok(())
    }

    /// Look a record up by its natural key, with its affected products
    pub async fn find_by_key(
        &self,
        source: &str,
        source_id: &str,
    ) -> Result<Option<StoredVulnerability>, StoreError> {
        let row = sqlx::query_as::<_, VulnRow>(
            r#"
            SELECT id, cve_id, source, published_at, last_modified, summary,
                   cvss_score, raw_json, created_at, updated_at
            FROM vulns
            WHERE source = $1 AND cve_id = $2
            "#,
        )
        .bind(source)
        .bind(source_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let affected = sqlx::query_as::<_, AffectedRow>(
            r#"
            SELECT vendor, product, version_range
            FROM vuln_affected
            WHERE vuln_id = $1
            ORDER BY vendor, product, version_range
            "#,
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|a| AffectedProduct::new(a.vendor, a.product, a.version_range))
        .collect();

        Ok(Some(StoredVulnerability {
            id: row.id,
            record: VulnerabilityRecord {
                source_id: row.cve_id,
                source: row.source,
                published_at: row.published_at,
                last_modified_at: row.last_modified,
                summary: row.summary,
                severity_score: row.cvss_score,
                raw_payload: row.raw_json,
            },
            affected,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }))
    }

    /// Number of stored records
    pub async fn count_records(&self) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM vulns")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Number of stored affected-product rows across all records
    pub async fn count_affected(&self) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM vuln_affected")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn upsert_record(
        conn: &mut PgConnection,
        record: &VulnerabilityRecord,
    ) -> Result<(Uuid, bool), StoreError> {
        // published_at is only written on first insert
        let row: (Uuid, bool) = sqlx::query_as(
            r#"
            INSERT INTO vulns (
                cve_id,
                source,
                published_at,
                last_modified,
                summary,
                cvss_score,
                raw_json
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (source, cve_id)
            DO UPDATE SET
                last_modified = EXCLUDED.last_modified,
                summary = EXCLUDED.summary,
                cvss_score = EXCLUDED.cvss_score,
                raw_json = EXCLUDED.raw_json,
                updated_at = NOW()
            RETURNING id, (xmax = 0) AS inserted
            "#,
        )
        .bind(&record.source_id)
        .bind(&record.source)
        .bind(record.published_at)
        .bind(record.last_modified_at)
        .bind(&record.summary)
        .bind(record.severity_score)
        .bind(&record.raw_payload)
        .fetch_one(&mut *conn)
        .await?;

        Ok(row)
    }

    async fn replace_affected(
        conn: &mut PgConnection,
        vuln_id: Uuid,
        affected: &[AffectedProduct],
    ) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM vuln_affected WHERE vuln_id = $1")
            .bind(vuln_id)
            .execute(&mut *conn)
            .await?;

        for chunk in affected.chunks(AFFECTED_CHUNK_SIZE) {
            let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO vuln_affected (vuln_id, vendor, product, version_range) ",
            );

            query_builder.push_values(chunk, |mut b, product| {
                b.push_bind(vuln_id)
                    .push_bind(&product.vendor)
                    .push_bind(&product.product)
                    .push_bind(&product.version_range);
            });

            query_builder.build().execute(&mut *conn).await?;
        }

        Ok(())
    }
}

#[async_trait]
impl VulnStore for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn upsert(
        &self,
        record: &VulnerabilityRecord,
        affected: &[AffectedProduct],
    ) -> Result<UpsertOutcome, StoreError> {
        let mut tx = self.pool.begin().await?;

        let (id, inserted) = Self::upsert_record(&mut tx, record).await?;
        Self::replace_affected(&mut tx, id, affected).await?;

        tx.commit().await?;

        debug!(
            cve_id = %record.source_id,
            vuln_id = %id,
            inserted,
            affected = affected.len(),
            "Stored vulnerability"
        );

        Ok(UpsertOutcome {
            id,
            inserted,
            affected_written: affected.len(),
        })
    }
}
