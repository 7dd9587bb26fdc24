//! Error types for the widget API

use thiserror::Error;

/// Crate-wide error type
#[derive(Error, Debug)]
pub enum EdgeError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid path expression `{expr}`: {reason}")]
    InvalidPath { expr: String, reason: String },

    #[error("Unsupported asset: {0}")]
    UnsupportedAsset(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl EdgeError {
    pub fn network(msg: impl Into<String>) -> Self {
        EdgeError::Network(msg.into())
    }

    pub fn provider(msg: impl Into<String>) -> Self {
        EdgeError::Provider(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        EdgeError::Parse(msg.into())
    }

    pub fn invalid_path(expr: impl Into<String>, reason: impl Into<String>) -> Self {
        EdgeError::InvalidPath {
            expr: expr.into(),
            reason: reason.into(),
        }
    }

    pub fn unsupported_asset(symbol: impl Into<String>) -> Self {
        EdgeError::UnsupportedAsset(symbol.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        EdgeError::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        EdgeError::Internal(msg.into())
    }
}

/// Result type alias for widget operations
pub type EdgeResult<T> = Result<T, EdgeError>;
