// Reportflow Infrastructure - Worker Queue Adapter
// Implements: WorkerQueue over the fal-style queue REST protocol

mod client;
mod config;
mod error;
mod protocol;

pub use client::FalQueueClient;
pub use config::FalConfig;
pub use error::FalError;
pub use protocol::QueueStatus;
