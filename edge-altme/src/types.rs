//! Alternative.me response types
//!
//! The raw response is cached verbatim, so these types are used to check
//! its shape before caching and to build the widget view from it.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::AltmeError;

/// Value served when nothing usable is available
const NEUTRAL_VALUE: u32 = 50;
const NEUTRAL_LABEL: &str = "Neutral";

/// Response from GET /fng/
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FngResponse {
    #[serde(default)]
    pub name: Option<String>,

    /// Newest first
    #[serde(default)]
    pub data: Vec<FngRow>,
}

/// One daily reading. The API sends numbers as strings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FngRow {
    #[serde(default)]
    pub value: Option<Value>,

    #[serde(default)]
    pub value_classification: Option<String>,

    /// Unix seconds
    #[serde(default)]
    pub timestamp: Option<Value>,

    #[serde(default)]
    pub time_until_update: Option<Value>,
}

impl FngRow {
    /// Index value, accepting integers and digit strings
    pub fn value(&self) -> Option<u32> {
        self.value.as_ref().and_then(as_u64).and_then(|v| u32::try_from(v).ok())
    }

    /// Row date as `Mon DD`
    pub fn date_label(&self) -> Option<String> {
        let secs = self.timestamp.as_ref().and_then(as_u64)?;
        let ts = DateTime::from_timestamp(i64::try_from(secs).ok()?, 0)?;
        Some(ts.format("%b %d").to_string())
    }
}

fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
            s.parse().ok()
        }
        _ => None,
    }
}

/// Check that `raw` is worth caching: `data` is a non-empty array whose
/// first row has a numeric `value`.
pub fn validate(raw: &Value) -> Result<(), AltmeError> {
    let rows = raw
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| AltmeError::InvalidShape("missing `data` array".to_string()))?;

    let first = rows
        .first()
        .ok_or_else(|| AltmeError::InvalidShape("empty `data` array".to_string()))?;

    match first.get("value").map(as_u64) {
        Some(Some(_)) => Ok(()),
        _ => Err(AltmeError::InvalidShape(
            "first row has no numeric `value`".to_string(),
        )),
    }
}

/// Current reading
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FearGreedReading {
    pub value: u32,
    pub label: String,
}

/// One point of the short history chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryPoint {
    pub t: String,
    pub v: u32,
}

/// Widget view of the index
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FearGreedIndex {
    pub current: FearGreedReading,
    /// Oldest first
    pub history: Vec<HistoryPoint>,
}

impl FearGreedIndex {
    /// Neutral reading with no history
    pub fn neutral() -> Self {
        Self {
            current: FearGreedReading {
                value: NEUTRAL_VALUE,
                label: NEUTRAL_LABEL.to_string(),
            },
            history: Vec::new(),
        }
    }

    /// Build the view from a raw (possibly cached) response.
    ///
    /// Unreadable rows degrade to neutral values instead of failing.
    pub fn from_payload(raw: &Value, history_len: usize) -> Self {
        let response: FngResponse = match serde_json::from_value(raw.clone()) {
            Ok(response) => response,
            Err(_) => return Self::neutral(),
        };

        let current = match response.data.first() {
            Some(row) => FearGreedReading {
                value: row.value().unwrap_or(NEUTRAL_VALUE),
                label: row
                    .value_classification
                    .clone()
                    .filter(|label| !label.is_empty())
                    .unwrap_or_else(|| NEUTRAL_LABEL.to_string()),
            },
            None => Self::neutral().current,
        };

        let recent: Vec<&FngRow> = response.data.iter().take(history_len).collect();
        let count = recent.len();
        let history = recent
            .into_iter()
            .rev()
            .enumerate()
            .map(|(i, row)| HistoryPoint {
                t: row
                    .date_label()
                    .unwrap_or_else(|| format!("D-{}", count - 1 - i)),
                v: row.value().unwrap_or(NEUTRAL_VALUE),
            })
            .collect();

        Self { current, history }
    }
}
