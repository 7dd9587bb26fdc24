//! Dependency resolution shared by the composite builders
//!
//! A builder declares `(role, snapshot key, field)` dependencies. The
//! resolver reads each snapshot once per request, classifies its freshness
//! against the TTL policy, and extracts every field into a `KpiValue`.
//! Nothing here fails: unreadable inputs become unavailable values.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

use edge_core::{
    extract, EdgeResult, FieldSpec, Freshness, FreshnessStatus, KpiKind, KpiValue, PathExpr,
    Snapshot, TtlPolicy, TtlSource,
};

use crate::store::SnapshotStore;

/// One input of a builder
#[derive(Debug, Clone)]
pub struct Dependency {
    pub role: &'static str,
    pub key: String,
    pub field: FieldSpec,
}

impl Dependency {
    /// Parse `path` into a field of the given kind
    pub fn new(
        role: &'static str,
        key: impl Into<String>,
        path: &str,
        kind: KpiKind,
    ) -> EdgeResult<Self> {
        Ok(Self::with_field(role, key, FieldSpec::parse(path, kind)?))
    }

    pub fn with_field(role: &'static str, key: impl Into<String>, field: FieldSpec) -> Self {
        Self {
            role,
            key: key.into(),
            field,
        }
    }
}

/// A snapshot as read for this request, with its freshness
#[derive(Debug, Clone)]
pub struct Source {
    pub key: String,
    pub snapshot: Option<Snapshot>,
    /// `None` when the snapshot is absent
    pub freshness: Option<Freshness>,
    pub ttl_secs: u64,
    pub ttl_source: TtlSource,
}

impl Source {
    pub fn status(&self) -> FreshnessStatus {
        self.freshness
            .map(|f| f.status)
            .unwrap_or(FreshnessStatus::Dead)
    }

    pub fn payload(&self) -> Option<&Value> {
        self.snapshot.as_ref().map(|s| &s.payload)
    }

    /// Payload if it may be presented as current
    pub fn usable_payload(&self) -> Option<&Value> {
        match self.status() {
            FreshnessStatus::Dead => None,
            _ => self.payload(),
        }
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.snapshot.as_ref().and_then(|s| s.updated_at)
    }

    /// Wrap a value computed from this source with its provenance
    pub fn kpi(&self, kind: KpiKind, signed: bool, value: Option<f64>) -> KpiValue {
        KpiValue {
            kind,
            value: self.snapshot.as_ref().and(value),
            signed,
            freshness: self.freshness,
            source_ts: self.updated_at(),
        }
    }

    pub fn view(&self) -> SourceView {
        SourceView {
            key: self.key.clone(),
            status: self.status(),
            age_s: self.freshness.and_then(|f| f.age_secs),
            ttl_s: self.ttl_secs,
            updated_at: self.updated_at(),
        }
    }
}

/// Provenance entry carried in composite responses
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceView {
    pub key: String,
    pub status: FreshnessStatus,
    pub age_s: Option<f64>,
    pub ttl_s: u64,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Reads snapshots for one request
pub struct Resolver<'a> {
    store: &'a dyn SnapshotStore,
    ttl: &'a TtlPolicy,
    now: DateTime<Utc>,
}

impl<'a> Resolver<'a> {
    pub fn new(store: &'a dyn SnapshotStore, ttl: &'a TtlPolicy, now: DateTime<Utc>) -> Self {
        Self { store, ttl, now }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Read one snapshot; store errors are logged and treated as absent
    pub fn fetch(&self, key: &str) -> Source {
        let snapshot = match self.store.read(key) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Snapshot read failed for {}: {}", key, e);
                None
            }
        };

        let (ttl_secs, ttl_source) = self.ttl.lookup(key);
        let freshness = snapshot
            .as_ref()
            .map(|s| Freshness::evaluate(s.updated_at, ttl_secs, self.now));

        if let Some(f) = freshness.filter(|f| f.status == FreshnessStatus::Dead) {
            warn!(
                "Snapshot {} is dead (age {:?}s, ttl {}s)",
                key, f.age_secs, ttl_secs
            );
        }

        Source {
            key: key.to_string(),
            snapshot,
            freshness,
            ttl_secs,
            ttl_source,
        }
    }

    /// Resolve every dependency, reading each key at most once
    pub fn resolve_all(&self, deps: &[Dependency]) -> Resolved {
        let mut resolved = Resolved::default();

        for dep in deps {
            let source = resolved
                .sources
                .entry(dep.key.clone())
                .or_insert_with(|| self.fetch(&dep.key));

            let value = extract(source.payload(), &dep.field);
            let kpi = source.kpi(dep.field.kind, dep.field.is_signed(), value);
            resolved.values.insert(dep.role, kpi);
        }

        resolved
    }
}

/// Resolved values by role, plus the sources they came from
#[derive(Debug, Clone, Default)]
pub struct Resolved {
    values: HashMap<&'static str, KpiValue>,
    sources: BTreeMap<String, Source>,
}

impl Resolved {
    /// Value for a role; undeclared roles are unavailable
    pub fn kpi(&self, role: &str) -> KpiValue {
        self.values
            .get(role)
            .copied()
            .unwrap_or_else(|| KpiValue::unavailable(KpiKind::Amount))
    }

    /// Usable (non-dead) value for a role
    pub fn usable(&self, role: &str) -> Option<f64> {
        self.values.get(role).and_then(KpiValue::usable)
    }

    /// Number of roles with a usable value
    pub fn usable_count(&self, roles: &[&str]) -> usize {
        roles.iter().filter(|role| self.usable(role).is_some()).count()
    }

    pub fn source(&self, key: &str) -> Option<&Source> {
        self.sources.get(key)
    }

    /// String field from a usable snapshot
    pub fn text(&self, key: &str, path: &PathExpr) -> Option<String> {
        let payload = self.sources.get(key)?.usable_payload()?;
        match path.resolve(payload).found()? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        }
    }

    /// Provenance of every source, ordered by key
    pub fn source_views(&self) -> Vec<SourceView> {
        self.sources.values().map(Source::view).collect()
    }
}
