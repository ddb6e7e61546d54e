//! PostgreSQL implementation of AuditLogRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use community_core::entities::{AuditLogEntry, AuditLogFilter, AuditStats};
use community_core::traits::{AuditLogRepository, RepoResult};
use community_core::value_objects::Snowflake;

use crate::mappers::AuditLogInsert;
use crate::models::{AuditLogModel, AuditTotalsModel, CountedKeyModel};

use super::error::map_db_error;

/// Number of buckets returned for top actions / resources
const TOP_N: i64 = 10;

/// Shared optional-filter clause; parameters $1..$6
const FILTER_CLAUSE: &str = r"
    WHERE ($1::BIGINT IS NULL OR user_id = $1)
      AND ($2::TEXT IS NULL OR action = $2)
      AND ($3::TEXT IS NULL OR resource = $3)
      AND ($4::TEXT IS NULL OR result = $4)
      AND ($5::TIMESTAMPTZ IS NULL OR timestamp >= $5)
      AND ($6::TIMESTAMPTZ IS NULL OR timestamp <= $6)
";

/// Window clause for stats; parameters $1..$2
const WINDOW_CLAUSE: &str = r"
    WHERE ($1::TIMESTAMPTZ IS NULL OR timestamp >= $1)
      AND ($2::TIMESTAMPTZ IS NULL OR timestamp <= $2)
";

/// PostgreSQL implementation of AuditLogRepository
#[derive(Clone)]
pub struct PgAuditLogRepository {
    pool: PgPool,
}

impl PgAuditLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn top_by(
        &self,
        column: &'static str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> RepoResult<Vec<CountedKeyModel>> {
        let sql = format!(
            "SELECT {column} AS key, COUNT(*) AS count FROM audit_logs {WINDOW_CLAUSE} \
             GROUP BY {column} ORDER BY count DESC, {column} ASC LIMIT $3"
        );

        sqlx::query_as::<_, CountedKeyModel>(&sql)
            .bind(start)
            .bind(end)
            .bind(TOP_N)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)
    }
}

#[async_trait]
impl AuditLogRepository for PgAuditLogRepository {
    #[instrument(skip(self, entry), fields(action = %entry.action, result = %entry.result))]
    async fn append(&self, entry: &AuditLogEntry) -> RepoResult<()> {
        let insert = AuditLogInsert::new(entry);
        sqlx::query(
            r"
            INSERT INTO audit_logs (id, user_id, action, resource, ip_address, user_agent, result, metadata, timestamp)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(insert.id)
        .bind(insert.user_id)
        .bind(insert.action)
        .bind(insert.resource)
        .bind(insert.ip_address)
        .bind(insert.user_agent)
        .bind(insert.result)
        .bind(&entry.metadata)
        .bind(entry.timestamp)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn query(&self, filter: &AuditLogFilter) -> RepoResult<(Vec<AuditLogEntry>, i64)> {
        let filter = filter.clone().normalized();
        let user_id = filter.user_id.map(Snowflake::into_inner);
        let result = filter.result.map(|r| r.as_str());

        let count_sql = format!("SELECT COUNT(*) FROM audit_logs {FILTER_CLAUSE}");
        let total = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(user_id)
            .bind(filter.action.as_deref())
            .bind(filter.resource.as_deref())
            .bind(result)
            .bind(filter.start_date)
            .bind(filter.end_date)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        let page_sql = format!(
            "SELECT id, user_id, action, resource, ip_address, user_agent, result, metadata, timestamp \
             FROM audit_logs {FILTER_CLAUSE} ORDER BY timestamp DESC, id DESC LIMIT $7 OFFSET $8"
        );
        let rows = sqlx::query_as::<_, AuditLogModel>(&page_sql)
            .bind(user_id)
            .bind(filter.action.as_deref())
            .bind(filter.resource.as_deref())
            .bind(result)
            .bind(filter.start_date)
            .bind(filter.end_date)
            .bind(i64::from(filter.limit))
            .bind(filter.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        let entries = rows
            .into_iter()
            .map(AuditLogEntry::try_from)
            .collect::<RepoResult<Vec<_>>>()?;

        Ok((entries, total))
    }

    #[instrument(skip(self))]
    async fn stats(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> RepoResult<AuditStats> {
        let totals_sql = format!(
            "SELECT COUNT(*) AS total, \
                    COUNT(*) FILTER (WHERE result = 'success') AS success, \
                    COUNT(*) FILTER (WHERE result = 'failure') AS failure, \
                    COUNT(DISTINCT user_id) AS unique_users \
             FROM audit_logs {WINDOW_CLAUSE}"
        );
        let totals = sqlx::query_as::<_, AuditTotalsModel>(&totals_sql)
            .bind(start)
            .bind(end)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        let top_actions = self.top_by("action", start, end).await?;
        let top_resources = self.top_by("resource", start, end).await?;

        Ok(totals.into_stats(top_actions, top_resources))
    }

    #[instrument(skip(self))]
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM audit_logs WHERE timestamp < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}
