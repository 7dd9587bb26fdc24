//! Alternative.me integration for the EdgeBlocks widget API
//!
//! This crate provides a client for the Fear & Greed index endpoint,
//! validation of its response shape, and parsing into the widget view.

pub mod client;
pub mod error;
pub mod types;

pub use client::{AltmeClient, FearGreedSource, ALTME_FNG_URL, PROVIDER};
pub use error::AltmeError;
pub use types::{validate, FearGreedIndex, FearGreedReading, FngResponse, FngRow, HistoryPoint};
