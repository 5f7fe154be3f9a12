// SQLite AnalysisRepository Implementation
//
// Result and failure writes are compare-and-set on the per-kind status
// column: they only touch a row whose task id matches and whose status is
// still open, so repeated materialization converges on one write.

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use reportflow_core::domain::{AnalysisRecord, FileMetadata, JobKind, JobResult, JobStatus};
use reportflow_core::error::Result;
use reportflow_core::port::AnalysisRepository;
use sqlx::SqlitePool;

pub struct SqliteAnalysisRepository {
    pool: SqlitePool,
}

impl SqliteAnalysisRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// (task id column, status column) for a job kind
fn columns(kind: JobKind) -> (&'static str, &'static str) {
    match kind {
        JobKind::Pdf => ("pdf_task_id", "pdf_status"),
        JobKind::Analysis => ("analysis_task_id", "analysis_status"),
    }
}

fn encode_list(list: Option<&Vec<String>>) -> Result<Option<String>> {
    Ok(list.map(serde_json::to_string).transpose()?)
}

#[async_trait]
impl AnalysisRepository for SqliteAnalysisRepository {
    async fn insert(&self, record: &AnalysisRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO analyses (
                id, user_id, file_name, file_type, file_size, file_url,
                analysis_status, analysis_task_id, summary, insights, recommendations,
                pdf_status, pdf_task_id, pdf_url, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(&record.file.file_name)
        .bind(&record.file.file_type)
        .bind(record.file.file_size)
        .bind(&record.file.file_url)
        .bind(record.analysis_status.map(|s| s.as_str()))
        .bind(&record.analysis_task_id)
        .bind(&record.summary)
        .bind(encode_list(record.insights.as_ref())?)
        .bind(encode_list(record.recommendations.as_ref())?)
        .bind(record.pdf_status.map(|s| s.as_str()))
        .bind(&record.pdf_task_id)
        .bind(&record.pdf_url)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<AnalysisRecord>> {
        let row = sqlx::query_as::<_, AnalysisRow>("SELECT * FROM analyses WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(AnalysisRow::into_record).transpose()
    }

    async fn find_by_task_id(
        &self,
        kind: JobKind,
        task_id: &str,
    ) -> Result<Option<AnalysisRecord>> {
        let (task_column, _) = columns(kind);
        let sql = format!("SELECT * FROM analyses WHERE {} = ? LIMIT 1", task_column);

        let row = sqlx::query_as::<_, AnalysisRow>(&sql)
            .bind(task_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(AnalysisRow::into_record).transpose()
    }

    async fn attach_task(
        &self,
        analysis_id: &str,
        kind: JobKind,
        task_id: &str,
        now_millis: i64,
    ) -> Result<bool> {
        let (task_column, status_column) = columns(kind);
        let sql = format!(
            "UPDATE analyses SET {} = ?, {} = ?, updated_at = ? WHERE id = ?",
            task_column, status_column
        );

        let rows = sqlx::query(&sql)
            .bind(task_id)
            .bind(JobStatus::Queued.as_str())
            .bind(now_millis)
            .bind(analysis_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .rows_affected();

        Ok(rows > 0)
    }

    async fn apply_result(
        &self,
        task_id: &str,
        result: &JobResult,
        now_millis: i64,
    ) -> Result<bool> {
        let completed = JobStatus::Completed.as_str();

        let query = match result {
            JobResult::Pdf(output) => sqlx::query(
                r#"
                UPDATE analyses
                SET pdf_url = ?, pdf_status = ?, updated_at = ?
                WHERE pdf_task_id = ?
                  AND (pdf_status IS NULL OR pdf_status NOT IN ('completed', 'failed'))
                "#,
            )
            .bind(output.pdf_url.clone())
            .bind(completed)
            .bind(now_millis)
            .bind(task_id),
            JobResult::Analysis(output) => sqlx::query(
                r#"
                UPDATE analyses
                SET summary = ?, insights = ?, recommendations = ?,
                    analysis_status = ?, updated_at = ?
                WHERE analysis_task_id = ?
                  AND (analysis_status IS NULL OR analysis_status NOT IN ('completed', 'failed'))
                "#,
            )
            .bind(output.summary.clone())
            .bind(serde_json::to_string(&output.insights)?)
            .bind(serde_json::to_string(&output.recommendations)?)
            .bind(completed)
            .bind(now_millis)
            .bind(task_id),
        };

        let rows = query
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .rows_affected();

        Ok(rows > 0)
    }

    async fn mark_failed(&self, kind: JobKind, task_id: &str, now_millis: i64) -> Result<bool> {
        let (task_column, status_column) = columns(kind);
        let sql = format!(
            "UPDATE analyses SET {status} = ?, updated_at = ? \
             WHERE {task} = ? AND ({status} IS NULL OR {status} NOT IN ('completed', 'failed'))",
            status = status_column,
            task = task_column
        );

        let rows = sqlx::query(&sql)
            .bind(JobStatus::Failed.as_str())
            .bind(now_millis)
            .bind(task_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .rows_affected();

        Ok(rows > 0)
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
struct AnalysisRow {
    id: String,
    user_id: String,
    file_name: String,
    file_type: Option<String>,
    file_size: Option<i64>,
    file_url: Option<String>,
    analysis_status: Option<String>,
    analysis_task_id: Option<String>,
    summary: Option<String>,
    insights: Option<String>,        // JSON array
    recommendations: Option<String>, // JSON array
    pdf_status: Option<String>,
    pdf_task_id: Option<String>,
    pdf_url: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl AnalysisRow {
    fn into_record(self) -> Result<AnalysisRecord> {
        let status = |s: Option<String>| -> Result<Option<JobStatus>> {
            Ok(s.as_deref().map(str::parse::<JobStatus>).transpose()?)
        };
        let list = |s: Option<String>| -> Result<Option<Vec<String>>> {
            Ok(s.as_deref().map(serde_json::from_str::<Vec<String>>).transpose()?)
        };

        Ok(AnalysisRecord {
            id: self.id,
            user_id: self.user_id,
            file: FileMetadata {
                file_name: self.file_name,
                file_type: self.file_type,
                file_size: self.file_size,
                file_url: self.file_url,
            },
            analysis_status: status(self.analysis_status)?,
            analysis_task_id: self.analysis_task_id,
            summary: self.summary,
            insights: list(self.insights)?,
            recommendations: list(self.recommendations)?,
            pdf_status: status(self.pdf_status)?,
            pdf_task_id: self.pdf_task_id,
            pdf_url: self.pdf_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
