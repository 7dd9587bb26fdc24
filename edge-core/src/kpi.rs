//! Typed KPI values and the field extractor
//!
//! A KPI value is a possibly-absent scalar together with the provenance of
//! the snapshot it came from. Values from dead snapshots are kept for
//! diagnostics but never rendered as current.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::format::{fmt_count, fmt_pct, fmt_usd, PLACEHOLDER};
use crate::{EdgeResult, Freshness, FreshnessStatus, PathExpr};

/// Scalar kind of a KPI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KpiKind {
    /// Amount in USD
    Amount,
    /// Percentage points (1.5 = 1.5%)
    Percent,
    /// Non-negative integer count
    Count,
}

/// Post-extraction transform
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Transform {
    #[default]
    Identity,
    /// Multiply, e.g. a funding-rate fraction into percent
    Scale(f64),
    /// Absolute value, displayed without sign
    Unsigned,
}

/// Where and how to read one field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub path: PathExpr,
    /// Tried when `path` does not resolve
    pub fallback: Option<PathExpr>,
    pub kind: KpiKind,
    pub transform: Transform,
}

impl FieldSpec {
    pub fn parse(path: &str, kind: KpiKind) -> EdgeResult<Self> {
        Ok(Self {
            path: PathExpr::parse(path)?,
            fallback: None,
            kind,
            transform: Transform::Identity,
        })
    }

    pub fn with_fallback(mut self, path: &str) -> EdgeResult<Self> {
        self.fallback = Some(PathExpr::parse(path)?);
        Ok(self)
    }

    pub fn scaled(mut self, factor: f64) -> Self {
        self.transform = Transform::Scale(factor);
        self
    }

    pub fn unsigned(mut self) -> Self {
        self.transform = Transform::Unsigned;
        self
    }

    /// Whether values of this field display with an explicit sign
    pub fn is_signed(&self) -> bool {
        self.kind == KpiKind::Percent && self.transform != Transform::Unsigned
    }
}

/// Read a typed scalar from `payload`, or `None` if anything is missing or mistyped
pub fn extract(payload: Option<&Value>, field: &FieldSpec) -> Option<f64> {
    let payload = payload?;
    let raw = field
        .path
        .resolve(payload)
        .found()
        .or_else(|| field.fallback.as_ref()?.resolve(payload).found())?;

    let number = as_number(raw)?;
    let number = match field.transform {
        Transform::Identity => number,
        Transform::Scale(factor) => number * factor,
        Transform::Unsigned => number.abs(),
    };

    match field.kind {
        KpiKind::Count if number < 0.0 || number.fract() != 0.0 => None,
        _ if !number.is_finite() => None,
        _ => Some(number),
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// A resolved KPI with provenance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KpiValue {
    pub kind: KpiKind,
    pub value: Option<f64>,
    pub signed: bool,
    /// `None` when the source snapshot was absent
    pub freshness: Option<Freshness>,
    pub source_ts: Option<DateTime<Utc>>,
}

impl KpiValue {
    /// A KPI whose source could not be read
    pub fn unavailable(kind: KpiKind) -> Self {
        Self {
            kind,
            value: None,
            signed: kind == KpiKind::Percent,
            freshness: None,
            source_ts: None,
        }
    }

    /// Freshness status; a missing source counts as dead
    pub fn status(&self) -> FreshnessStatus {
        self.freshness
            .map(|f| f.status)
            .unwrap_or(FreshnessStatus::Dead)
    }

    pub fn age_secs(&self) -> Option<f64> {
        self.freshness.and_then(|f| f.age_secs)
    }

    /// The value if it may be presented as current (fresh or stale)
    pub fn usable(&self) -> Option<f64> {
        match self.status() {
            FreshnessStatus::Dead => None,
            _ => self.value,
        }
    }

    pub fn is_usable(&self) -> bool {
        self.usable().is_some()
    }

    /// Combine inputs into a derived KPI, inheriting the worst freshness and
    /// the oldest source timestamp.
    pub fn derived(kind: KpiKind, value: Option<f64>, signed: bool, inputs: &[&KpiValue]) -> Self {
        let freshness = inputs
            .iter()
            .map(|kpi| kpi.freshness)
            .try_fold(None::<Freshness>, |worst, current| {
                let current = current?;
                Some(Some(match worst {
                    Some(w) if w.status >= current.status => w,
                    _ => current,
                }))
            })
            .flatten();

        let source_ts = inputs.iter().filter_map(|kpi| kpi.source_ts).min();

        Self {
            kind,
            value: if freshness.is_some() { value } else { None },
            signed,
            freshness,
            source_ts,
        }
    }

    /// Display string with the default precision for the kind
    pub fn display(&self) -> String {
        self.display_with(2)
    }

    /// Display string; `digits` applies to percentages
    pub fn display_with(&self, digits: usize) -> String {
        let value = self.usable();
        match self.kind {
            KpiKind::Amount => fmt_usd(value),
            KpiKind::Percent => fmt_pct(value, digits, self.signed),
            KpiKind::Count => fmt_count(value),
        }
    }

    /// Serializable view for responses
    pub fn view(&self) -> KpiView {
        self.view_with(2)
    }

    pub fn view_with(&self, digits: usize) -> KpiView {
        KpiView {
            value: self.usable(),
            display: self.display_with(digits),
            status: self.status(),
            age_s: self.age_secs(),
            source_ts: self.source_ts,
        }
    }
}

/// Response shape of a single KPI
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiView {
    /// Raw value; `null` when absent or dead
    pub value: Option<f64>,
    /// Formatted value or placeholder
    pub display: String,
    pub status: FreshnessStatus,
    pub age_s: Option<f64>,
    pub source_ts: Option<DateTime<Utc>>,
}

impl KpiView {
    pub fn is_placeholder(&self) -> bool {
        self.display == PLACEHOLDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fresh_kpi(value: f64, status: FreshnessStatus) -> KpiValue {
        KpiValue {
            kind: KpiKind::Amount,
            value: Some(value),
            signed: false,
            freshness: Some(Freshness {
                status,
                age_secs: Some(10.0),
            }),
            source_ts: Some(Utc::now()),
        }
    }

    #[test]
    fn test_extract_numbers_and_strings() {
        let payload = json!({"data": {"price": 68819, "value": " 45 ", "bad": "n/a"}});

        let price = FieldSpec::parse("data.price", KpiKind::Amount).unwrap();
        assert_eq!(extract(Some(&payload), &price), Some(68819.0));

        let value = FieldSpec::parse("data.value", KpiKind::Count).unwrap();
        assert_eq!(extract(Some(&payload), &value), Some(45.0));

        let bad = FieldSpec::parse("data.bad", KpiKind::Amount).unwrap();
        assert_eq!(extract(Some(&payload), &bad), None);
    }

    #[test]
    fn test_extract_unavailable_never_panics() {
        let field = FieldSpec::parse("data[0].value", KpiKind::Count).unwrap();
        for payload in [json!(null), json!([]), json!({"data": {}}), json!({"data": [true]})] {
            assert_eq!(extract(Some(&payload), &field), None);
        }
        assert_eq!(extract(None, &field), None);
    }

    #[test]
    fn test_extract_fallback_and_transforms() {
        let payload = json!({"raw": [{"exchange": "Binance", "total": 5.0}], "data": {"rate": 0.001178, "delta": -3.5}});

        let total = FieldSpec::parse("raw[exchange=All].total", KpiKind::Amount)
            .unwrap()
            .with_fallback("raw[0].total")
            .unwrap();
        assert_eq!(extract(Some(&payload), &total), Some(5.0));

        let funding = FieldSpec::parse("data.rate", KpiKind::Percent)
            .unwrap()
            .scaled(100.0);
        let pct = extract(Some(&payload), &funding).unwrap();
        assert!((pct - 0.1178).abs() < 1e-12);

        let share = FieldSpec::parse("data.delta", KpiKind::Percent)
            .unwrap()
            .unsigned();
        assert_eq!(extract(Some(&payload), &share), Some(3.5));
        assert!(!share.is_signed());
        assert!(funding.is_signed());
    }

    #[test]
    fn test_count_rejects_fractions_and_negatives() {
        let payload = json!({"a": 2.5, "b": -1, "c": 3.0});
        for (path, expected) in [("a", None), ("b", None), ("c", Some(3.0))] {
            let field = FieldSpec::parse(path, KpiKind::Count).unwrap();
            assert_eq!(extract(Some(&payload), &field), expected);
        }
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let payload = json!({"x": 0.1234567891234});
        let field = FieldSpec::parse("x", KpiKind::Percent).unwrap();
        let first = extract(Some(&payload), &field);
        assert_eq!(first, extract(Some(&payload), &field));
        assert_eq!(first, Some(0.1234567891234));
    }

    #[test]
    fn test_dead_value_renders_placeholder() {
        let kpi = fresh_kpi(100.0, FreshnessStatus::Dead);
        assert_eq!(kpi.usable(), None);
        let view = kpi.view();
        assert!(view.is_placeholder());
        assert_eq!(view.value, None);
        assert_eq!(view.status, FreshnessStatus::Dead);
    }

    #[test]
    fn test_stale_value_is_kept_and_annotated() {
        let kpi = fresh_kpi(68_819.0, FreshnessStatus::Stale);
        let view = kpi.view();
        assert_eq!(view.value, Some(68_819.0));
        assert_eq!(view.display, "$68,819");
        assert_eq!(view.status, FreshnessStatus::Stale);
    }

    #[test]
    fn test_unavailable_kpi() {
        let kpi = KpiValue::unavailable(KpiKind::Percent);
        assert_eq!(kpi.status(), FreshnessStatus::Dead);
        assert!(kpi.view().is_placeholder());
        assert!(kpi.age_secs().is_none());
    }

    #[test]
    fn test_derived_takes_worst_status() {
        let a = fresh_kpi(1.0, FreshnessStatus::Fresh);
        let b = fresh_kpi(2.0, FreshnessStatus::Stale);
        let derived = KpiValue::derived(KpiKind::Percent, Some(50.0), false, &[&a, &b]);
        assert_eq!(derived.status(), FreshnessStatus::Stale);
        assert_eq!(derived.usable(), Some(50.0));

        let missing = KpiValue::unavailable(KpiKind::Amount);
        let derived = KpiValue::derived(KpiKind::Percent, Some(50.0), false, &[&a, &missing]);
        assert_eq!(derived.value, None);
        assert_eq!(derived.status(), FreshnessStatus::Dead);
    }
}
