//! Reportflow SDK - Rust Client Library
//!
//! Client for the Reportflow daemon's HTTP API: submit worker jobs, poll
//! them, and materialize their results.
//!
//! # Example
//!
//! ```no_run
//! use reportflow_sdk::{JobKind, ReportflowClient, SubmitRequest, WaitOptions};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ReportflowClient::connect("http://127.0.0.1:8080").await?;
//!
//!     let submitted = client
//!         .submit(SubmitRequest::new(JobKind::Pdf, json!({"reportId": "r1"})).for_analysis("r1"))
//!         .await?;
//!
//!     client
//!         .wait_for_completion(&submitted.task_id, JobKind::Pdf, WaitOptions::default())
//!         .await?;
//!     let result = client.result(&submitted.task_id, JobKind::Pdf).await?;
//!     println!("PDF: {}", result.result);
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod types;

pub use client::{ReportflowClient, WaitOptions};
pub use error::{Result, SdkError};
pub use types::{
    AnalysisRecord, Health, JobKind, JobStatus, PdfQueued, PdfStatus, SubmitRequest,
    SubmitResponse, TaskResult, TaskStatus,
};
