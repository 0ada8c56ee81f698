//! # Execution
//!
//! Submits a program and its composed stdin to a Judge0-compatible sandbox,
//! then decodes and classifies what came back.
//!
//! ```text
//! ExecutionRequest → Sandbox::submit (cancellable) → ExecutionResponse → RunReport
//! ```
//!
//! - `model`: wire types of the submissions API
//! - `client`: the `Sandbox` seam and the reqwest-backed `Judge0Client`
//! - `report`: base64 decoding, prompt stripping, verdict classification

pub mod client;
pub mod model;
pub mod report;

pub use client::{Judge0Client, Sandbox};
pub use model::{ExecutionRequest, ExecutionResponse, Status};
pub use report::{RunReport, Verdict};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("{0}")]
    Transport(String),

    #[error("{}", http_message(.status, .body))]
    Http { status: u16, body: String },

    #[error("{0}")]
    InvalidResponse(String),

    #[error("{0}")]
    Client(String),

    #[error("Execution cancelled by user")]
    Cancelled,
}

impl ExecutionError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ExecutionError::Cancelled)
    }

    pub(crate) fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ExecutionError::Transport("Request timeout - the sandbox took too long to respond".to_string())
        } else if e.is_connect() {
            ExecutionError::Transport("Connection error - unable to reach the sandbox".to_string())
        } else {
            ExecutionError::Transport(format!("Network error: {}", e))
        }
    }
}

fn http_message(status: &u16, body: &str) -> String {
    match status {
        401 => "Authentication failed - check your API key".to_string(),
        403 => "Access forbidden - insufficient permissions".to_string(),
        422 => format!("Submission rejected by the sandbox: {}", body),
        429 => "Rate limit exceeded - too many requests".to_string(),
        500..=599 => format!("Server error ({}): {}", status, body),
        _ => format!("HTTP error {}: {}", status, body),
    }
}
