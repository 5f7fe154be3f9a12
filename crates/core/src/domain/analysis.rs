// Analysis Record Domain Model

use crate::domain::job::{JobKind, JobStatus};
use serde::{Deserialize, Serialize};

/// Uploaded file the analysis was derived from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub file_name: String,
    pub file_type: Option<String>,
    pub file_size: Option<i64>,
    pub file_url: Option<String>,
}

/// A user's uploaded dataset and the analysis/report derived from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub id: String,
    pub user_id: String,
    #[serde(flatten)]
    pub file: FileMetadata,

    pub analysis_status: Option<JobStatus>,
    pub analysis_task_id: Option<String>,
    pub summary: Option<String>,
    pub insights: Option<Vec<String>>,
    pub recommendations: Option<Vec<String>>,

    pub pdf_status: Option<JobStatus>,
    pub pdf_task_id: Option<String>,
    pub pdf_url: Option<String>,

    pub created_at: i64, // epoch ms
    pub updated_at: i64,
}

impl AnalysisRecord {
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        file: FileMetadata,
        created_at: i64,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            file,
            analysis_status: None,
            analysis_task_id: None,
            summary: None,
            insights: None,
            recommendations: None,
            pdf_status: None,
            pdf_task_id: None,
            pdf_url: None,
            created_at,
            updated_at: created_at,
        }
    }

    pub fn task_id(&self, kind: JobKind) -> Option<&str> {
        match kind {
            JobKind::Pdf => self.pdf_task_id.as_deref(),
            JobKind::Analysis => self.analysis_task_id.as_deref(),
        }
    }

    pub fn status_for(&self, kind: JobKind) -> Option<JobStatus> {
        match kind {
            JobKind::Pdf => self.pdf_status,
            JobKind::Analysis => self.analysis_status,
        }
    }
}
