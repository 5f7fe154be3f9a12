//! Simple SDK Example
//!
//! Queues a PDF for an existing report, waits for the render, and writes
//! the result back.
//!
//! # Usage
//!
//! 1. Start the daemon:
//!    ```bash
//!    cargo run --package reportflow-daemon
//!    ```
//!
//! 2. Run this example:
//!    ```bash
//!    cargo run --package reportflow-sdk --example simple -- <report-id>
//!    ```

use reportflow_sdk::{JobKind, ReportflowClient, WaitOptions};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let report_id = std::env::args().nth(1).unwrap_or_else(|| "r1".to_string());

    println!("Reportflow SDK - Simple Example");
    println!("===============================\n");

    // 1. Connect to daemon
    println!("1. Connecting to daemon...");
    let client = ReportflowClient::connect("http://127.0.0.1:8080").await?;
    println!("   ✓ Connected\n");

    // 2. Queue the PDF
    println!("2. Queuing PDF for report {}...", report_id);
    let queued = client.queue_pdf(&report_id).await?;
    println!("   ✓ Task: {}\n", queued.task_id);

    // 3. Wait for the worker
    println!("3. Waiting for the render...");
    client
        .wait_for_completion(&queued.task_id, JobKind::Pdf, WaitOptions::default())
        .await?;
    println!("   ✓ Completed\n");

    // 4. Materialize the result
    println!("4. Fetching result...");
    let result = client.result(&queued.task_id, JobKind::Pdf).await?;
    println!("   ✓ {} (record updated: {})\n", result.result, result.updated);

    let status = client.pdf_status(&report_id).await?;
    println!("PDF status: {} {:?}", status.status, status.pdf_url);

    Ok(())
}
