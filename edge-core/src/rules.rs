//! Data-driven rule tables
//!
//! Interpretive labels (regime, stance, pillar status) come from ordered
//! tables of `(conditions, label)` rules evaluated over a set of facts.
//! The first rule whose conditions all hold wins; otherwise the table's
//! default applies. Conditions on facts that are absent never hold, so a
//! request with too few inputs falls through to the default.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Numeric comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cmp {
    Lt,
    Le,
    Gt,
    Ge,
}

impl Cmp {
    pub fn holds(&self, lhs: f64, rhs: f64) -> bool {
        match self {
            Cmp::Lt => lhs < rhs,
            Cmp::Le => lhs <= rhs,
            Cmp::Gt => lhs > rhs,
            Cmp::Ge => lhs >= rhs,
        }
    }
}

/// One predicate over the facts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// Numeric fact compared to a threshold
    Metric { name: String, cmp: Cmp, value: f64 },
    /// Label fact is one of the listed labels
    Label { name: String, any_of: Vec<String> },
    /// At least one nested condition holds
    Any { conditions: Vec<Condition> },
    /// Nested condition does not hold
    Not { condition: Box<Condition> },
}

impl Condition {
    pub fn metric(name: impl Into<String>, cmp: Cmp, value: f64) -> Self {
        Condition::Metric {
            name: name.into(),
            cmp,
            value,
        }
    }

    pub fn label<I, S>(name: impl Into<String>, any_of: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Condition::Label {
            name: name.into(),
            any_of: any_of.into_iter().map(Into::into).collect(),
        }
    }

    pub fn any(conditions: Vec<Condition>) -> Self {
        Condition::Any { conditions }
    }

    pub fn not(condition: Condition) -> Self {
        Condition::Not {
            condition: Box::new(condition),
        }
    }

    pub fn holds(&self, facts: &Facts) -> bool {
        match self {
            Condition::Metric { name, cmp, value } => facts
                .metrics
                .get(name)
                .is_some_and(|actual| cmp.holds(*actual, *value)),
            Condition::Label { name, any_of } => facts
                .labels
                .get(name)
                .is_some_and(|actual| any_of.iter().any(|l| l == actual)),
            Condition::Any { conditions } => conditions.iter().any(|c| c.holds(facts)),
            Condition::Not { condition } => !condition.holds(facts),
        }
    }
}

/// Named metrics and labels a table is evaluated against
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Facts {
    metrics: HashMap<String, f64>,
    labels: HashMap<String, String>,
}

impl Facts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a metric; absent values are left out
    pub fn metric(mut self, name: impl Into<String>, value: Option<f64>) -> Self {
        if let Some(value) = value {
            self.metrics.insert(name.into(), value);
        }
        self
    }

    pub fn label(mut self, name: impl Into<String>, label: impl Into<String>) -> Self {
        self.labels.insert(name.into(), label.into());
        self
    }

    pub fn metric_count(&self) -> usize {
        self.metrics.len()
    }
}

/// A labelled conjunction of conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule<L> {
    pub label: L,
    #[serde(default)]
    pub when: Vec<Condition>,
}

impl<L> Rule<L> {
    pub fn new(label: L, when: Vec<Condition>) -> Self {
        Self { label, when }
    }

    pub fn matches(&self, facts: &Facts) -> bool {
        self.when.iter().all(|c| c.holds(facts))
    }
}

/// Ordered rules with a default
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleTable<L> {
    pub rules: Vec<Rule<L>>,
    pub default: L,
}

impl<L> RuleTable<L> {
    pub fn new(rules: Vec<Rule<L>>, default: L) -> Self {
        Self { rules, default }
    }

    /// First matching rule's label, or the default
    pub fn evaluate(&self, facts: &Facts) -> &L {
        self.rules
            .iter()
            .find(|rule| rule.matches(facts))
            .map(|rule| &rule.label)
            .unwrap_or(&self.default)
    }
}

/// Position of a value relative to a `(low, high)` band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BandLevel {
    Low,
    Mid,
    High,
}

/// Inclusive thresholds: `x <= low` is low, `x >= high` is high
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub low: f64,
    pub high: f64,
}

impl Band {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Missing values sit in the middle
    pub fn classify(&self, value: Option<f64>) -> BandLevel {
        match value {
            Some(x) if x <= self.low => BandLevel::Low,
            Some(x) if x >= self.high => BandLevel::High,
            _ => BandLevel::Mid,
        }
    }
}

/// Confidence from the number of inputs that resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceScale {
    pub high_at: usize,
    pub medium_at: usize,
}

impl ConfidenceScale {
    pub fn label(&self, resolved: usize) -> &'static str {
        if resolved >= self.high_at {
            "high"
        } else if resolved >= self.medium_at {
            "medium"
        } else {
            "low"
        }
    }
}
