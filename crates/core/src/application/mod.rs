// Application Layer - Use Cases and Business Logic

pub mod pdf_queue;
pub mod task;

// Re-exports
pub use pdf_queue::{PdfQueueService, PdfQueueStatus, PdfQueued, NOT_QUEUED};
pub use task::{
    MaterializedResult, SubmitOutcome, SubmitRequest, TaskRef, TaskService, TaskStatus,
};
