//! Errors raised while fetching the index

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AltmeError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Alternative.me API error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid response shape: {0}")]
    InvalidShape(String),

    #[error("Request timed out after {0} ms")]
    Timeout(u64),
}
