//! HTTP API Layer
//!
//! axum facade over the task services: job submission, status polling,
//! result materialization and the report-centric PDF queue.

pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;
pub mod types;

pub use router::build_router;
pub use server::{HttpServer, HttpServerConfig};
pub use state::AppState;
