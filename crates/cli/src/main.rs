//! Reportflow CLI - Command-line interface for the Reportflow daemon

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use reportflow_sdk::{JobKind, ReportflowClient, SubmitRequest, WaitOptions};
use std::time::Duration;
use tabled::{Table, Tabled};

const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";

#[derive(Parser)]
#[command(name = "reportflow")]
#[command(about = "Reportflow CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Daemon base URL
    #[arg(long, env = "REPORTFLOW_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a job to the worker queue
    Submit {
        /// Job type (pdf or analysis)
        #[arg(short = 't', long = "type")]
        kind: JobKind,

        /// Job input as a JSON object
        #[arg(short, long)]
        input: String,

        /// Analysis record to attach the task to
        #[arg(short, long)]
        analysis_id: Option<String>,
    },

    /// Show the worker's status for a task
    Status {
        task_id: String,

        #[arg(short = 't', long = "type")]
        kind: JobKind,
    },

    /// Fetch a completed task's result and save it
    Result {
        task_id: String,

        #[arg(short = 't', long = "type")]
        kind: JobKind,
    },

    /// Poll a task until it finishes
    Wait {
        task_id: String,

        #[arg(short = 't', long = "type")]
        kind: JobKind,

        /// Seconds between polls
        #[arg(long, default_value = "2")]
        interval: u64,

        /// Give up after this many polls
        #[arg(long, default_value = "150")]
        max_attempts: u32,

        /// Fetch and save the result once completed
        #[arg(long)]
        fetch: bool,
    },

    /// PDF report queue
    Pdf {
        #[command(subcommand)]
        command: PdfCommands,
    },

    /// Show an analysis record
    Analysis {
        id: String,
    },

    /// Show daemon health
    Health,
}

#[derive(Subcommand)]
enum PdfCommands {
    /// Queue a PDF render for a report
    Queue { report_id: String },

    /// Show a report's PDF status
    Status { report_id: String },
}

#[derive(Tabled)]
struct TaskRow {
    task_id: String,
    status: String,
    progress: String,
    error: String,
}

#[derive(Tabled)]
struct PdfRow {
    report_id: String,
    status: String,
    task_id: String,
    pdf_url: String,
}

fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn print_task(status: &reportflow_sdk::TaskStatus) {
    let row = TaskRow {
        task_id: status.task_id.clone(),
        status: status.status.to_string(),
        progress: or_dash(status.progress.map(|p| format!("{}%", p))),
        error: or_dash(status.error.clone()),
    };
    println!("{}", Table::new(vec![row]));
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = ReportflowClient::new(&cli.api_url).context("Invalid daemon URL")?;

    match cli.command {
        Commands::Submit {
            kind,
            input,
            analysis_id,
        } => {
            let input: serde_json::Value =
                serde_json::from_str(&input).context("Invalid JSON input")?;

            let mut request = SubmitRequest::new(kind, input);
            if let Some(id) = analysis_id {
                request = request.for_analysis(id);
            }

            let response = client.submit(request).await.context("Submit failed")?;

            println!("{}", "✓ Job submitted".green().bold());
            println!("  {} {}", "Task ID:".bold(), response.task_id);
            println!("  {} {}", "Status:".bold(), response.status);
        }

        Commands::Status { task_id, kind } => {
            let status = client.status(&task_id, kind).await?;
            print_task(&status);
        }

        Commands::Result { task_id, kind } => {
            let result = client.result(&task_id, kind).await?;

            println!("{}", "✓ Result fetched".green().bold());
            if result.updated {
                println!("  {} record updated", "•".bold());
            } else {
                println!("  {} no record changed", "○".bold());
            }
            println!("{}", serde_json::to_string_pretty(&result.result)?);
        }

        Commands::Wait {
            task_id,
            kind,
            interval,
            max_attempts,
            fetch,
        } => {
            println!("{}", format!("Waiting for {} job {}...", kind, task_id).cyan());

            let options = WaitOptions {
                interval: Duration::from_secs(interval),
                max_attempts,
            };
            let status = client.wait_for_completion(&task_id, kind, options).await?;
            print_task(&status);

            if fetch {
                let result = client.result(&task_id, kind).await?;
                println!("{}", serde_json::to_string_pretty(&result.result)?);
            }
        }

        Commands::Pdf { command } => match command {
            PdfCommands::Queue { report_id } => {
                let queued = client.queue_pdf(&report_id).await?;

                println!("{}", format!("✓ {}", queued.message).green().bold());
                println!("  {} {}", "Task ID:".bold(), queued.task_id);
            }
            PdfCommands::Status { report_id } => {
                let status = client.pdf_status(&report_id).await?;
                let row = PdfRow {
                    report_id: status.report_id,
                    status: status.status,
                    task_id: or_dash(status.task_id),
                    pdf_url: or_dash(status.pdf_url),
                };
                println!("{}", Table::new(vec![row]));
            }
        },

        Commands::Analysis { id } => {
            let record = client.analysis(&id).await?;

            println!("{}", format!("Analysis {}", record.id).cyan().bold());
            println!("  {} {}", "File:".bold(), record.file_name);
            println!("  {} {}", "Analysis:".bold(), or_dash(record.analysis_status));
            println!("  {} {}", "PDF:".bold(), or_dash(record.pdf_status));
            if let Some(url) = record.pdf_url {
                println!("  {} {}", "PDF URL:".bold(), url);
            }
            if let Some(summary) = record.summary {
                println!();
                println!("{}", "Summary".bold());
                println!("  {}", summary);
            }
            for (title, items) in [
                ("Insights", record.insights),
                ("Recommendations", record.recommendations),
            ] {
                if let Some(items) = items.filter(|i| !i.is_empty()) {
                    println!();
                    println!("{}", title.bold());
                    for item in items {
                        println!("  • {}", item);
                    }
                }
            }
        }

        Commands::Health => {
            println!("{}", "System Status".cyan().bold());
            println!();

            match client.health().await {
                Ok(health) => {
                    println!("  {} {}", "API URL:".bold(), cli.api_url);
                    println!("  {} {}", "Status:".bold(), "ONLINE".green());
                    println!("  {} {}", "Version:".bold(), health.version);
                    let db = if health.db_healthy {
                        "OK".green()
                    } else {
                        "UNREACHABLE".red()
                    };
                    println!("  {} {}", "Database:".bold(), db);
                }
                Err(e) => {
                    println!("  {} {}", "Status:".bold(), "ERROR".red());
                    println!("  {} {}", "Error:".bold(), e);
                }
            }
        }
    }

    Ok(())
}
