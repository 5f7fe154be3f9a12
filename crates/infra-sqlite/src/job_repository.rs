// SQLite JobRepository Implementation

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use reportflow_core::domain::{Job, JobId, JobResult};
use reportflow_core::error::{AppError, Result};
use reportflow_core::port::JobRepository;
use sqlx::SqlitePool;
use tracing::debug;

pub struct SqliteJobRepository {
    pool: SqlitePool,
}

impl SqliteJobRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobRepository for SqliteJobRepository {
    async fn insert(&self, job: &Job) -> Result<()> {
        let result = job.result.as_ref().map(serde_json::to_string).transpose()?;

        sqlx::query(
            r#"
            INSERT INTO jobs (
                id, kind, status, progress, result, error,
                analysis_id, input, created_at, updated_at, finished_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&job.id)
        .bind(job.kind.as_str())
        .bind(job.status.as_str())
        .bind(job.progress.map(i64::from))
        .bind(result)
        .bind(&job.error)
        .bind(&job.analysis_id)
        .bind(job.input.to_string())
        .bind(job.created_at)
        .bind(job.updated_at)
        .bind(job.finished_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: &JobId) -> Result<Option<Job>> {
        let row = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(JobRow::into_job).transpose()
    }

    async fn record_outcome(&self, job: &Job) -> Result<bool> {
        let result = job.result.as_ref().map(serde_json::to_string).transpose()?;

        // Guarded on the stored status so a late or repeated write can
        // never move a finished job
        let rows = sqlx::query(
            r#"
            UPDATE jobs
            SET status = ?, progress = ?, result = ?, error = ?,
                updated_at = ?, finished_at = ?
            WHERE id = ? AND status NOT IN ('completed', 'failed')
            "#,
        )
        .bind(job.status.as_str())
        .bind(job.progress.map(i64::from))
        .bind(result)
        .bind(&job.error)
        .bind(job.updated_at)
        .bind(job.finished_at)
        .bind(&job.id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .rows_affected();

        if rows == 0 {
            debug!(job_id = %job.id, "Outcome not recorded: job missing or already terminal");
        }
        Ok(rows > 0)
    }

    async fn ping(&self) -> Result<()> {
        crate::connection::health_check(&self.pool).await
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
struct JobRow {
    id: String,
    kind: String,
    status: String,
    progress: Option<i64>,
    result: Option<String>,
    error: Option<String>,
    analysis_id: Option<String>,
    input: String,
    created_at: i64,
    updated_at: i64,
    finished_at: Option<i64>,
}

impl JobRow {
    fn into_job(self) -> Result<Job> {
        let result = self
            .result
            .as_deref()
            .map(serde_json::from_str::<JobResult>)
            .transpose()?;

        let progress = self
            .progress
            .map(|p| {
                u8::try_from(p).map_err(|_| {
                    AppError::Database(format!("Job {} has invalid progress {}", self.id, p))
                })
            })
            .transpose()?;

        Ok(Job {
            kind: self.kind.parse()?,
            status: self.status.parse()?,
            progress,
            result,
            error: self.error,
            analysis_id: self.analysis_id,
            input: serde_json::from_str(&self.input)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
            finished_at: self.finished_at,
            id: self.id,
        })
    }
}
