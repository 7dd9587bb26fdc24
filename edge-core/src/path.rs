//! Path expressions over semi-structured payloads
//!
//! A path is an ordered list of steps evaluated against a `serde_json::Value`.
//! The compact syntax is dot-separated keys with bracketed selectors:
//!
//! - `data.price`: object keys
//! - `data[0].value`: array index
//! - `raw[exchange=All].liquidation_usd`: first array element whose
//!   `exchange` field equals `All`
//!
//! Resolution never fails: anything that does not resolve is `NotFound`.

use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::{EdgeError, EdgeResult};

/// One navigation step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Object member
    Key(String),
    /// Array element
    Index(usize),
    /// First array element whose `field` renders as `equals`
    Find { field: String, equals: String },
}

/// Result of evaluating a path
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    Found(&'a Value),
    NotFound,
}

impl<'a> Lookup<'a> {
    pub fn found(self) -> Option<&'a Value> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }
}

/// A parsed path expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExpr {
    steps: Vec<Step>,
}

impl PathExpr {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Parse the compact syntax
    pub fn parse(expr: &str) -> EdgeResult<Self> {
        let trimmed = expr.trim();
        if trimmed.is_empty() {
            return Err(EdgeError::invalid_path(expr, "empty expression"));
        }

        let mut steps = Vec::new();
        for segment in trimmed.split('.') {
            let (name, mut rest) = match segment.find('[') {
                Some(i) => (&segment[..i], &segment[i..]),
                None => (segment, ""),
            };

            if name.is_empty() && rest.is_empty() {
                return Err(EdgeError::invalid_path(expr, "empty segment"));
            }
            if name.contains(']') {
                return Err(EdgeError::invalid_path(expr, "unexpected `]`"));
            }
            if !name.is_empty() {
                steps.push(Step::Key(name.to_string()));
            }

            while !rest.is_empty() {
                if !rest.starts_with('[') {
                    return Err(EdgeError::invalid_path(
                        expr,
                        format!("unexpected text `{}` after selector", rest),
                    ));
                }
                let close = rest
                    .find(']')
                    .ok_or_else(|| EdgeError::invalid_path(expr, "unclosed `[`"))?;
                steps.push(parse_selector(expr, &rest[1..close])?);
                rest = &rest[close + 1..];
            }
        }

        Ok(Self { steps })
    }

    /// Walk the path from `root`. A terminal `null` counts as not found.
    pub fn resolve<'a>(&self, root: &'a Value) -> Lookup<'a> {
        let mut current = root;
        for step in &self.steps {
            let next = match step {
                Step::Key(key) => current.as_object().and_then(|map| map.get(key)),
                Step::Index(index) => current.as_array().and_then(|items| items.get(*index)),
                Step::Find { field, equals } => current.as_array().and_then(|items| {
                    items
                        .iter()
                        .find(|item| item.get(field).is_some_and(|v| renders_as(v, equals)))
                }),
            };
            match next {
                Some(value) => current = value,
                None => return Lookup::NotFound,
            }
        }

        if current.is_null() {
            Lookup::NotFound
        } else {
            Lookup::Found(current)
        }
    }
}

fn parse_selector(expr: &str, inner: &str) -> EdgeResult<Step> {
    let inner = inner.trim();
    if inner.is_empty() {
        return Err(EdgeError::invalid_path(expr, "empty selector"));
    }

    if let Some((field, equals)) = inner.split_once('=') {
        let field = field.trim();
        if field.is_empty() {
            return Err(EdgeError::invalid_path(expr, "selector has no field name"));
        }
        return Ok(Step::Find {
            field: field.to_string(),
            equals: equals.trim().to_string(),
        });
    }

    inner
        .parse::<usize>()
        .map(Step::Index)
        .map_err(|_| EdgeError::invalid_path(expr, format!("`{}` is not an index", inner)))
}

fn renders_as(value: &Value, expected: &str) -> bool {
    match value {
        Value::String(s) => s == expected,
        Value::Number(n) => n.to_string() == expected,
        Value::Bool(b) => b.to_string() == expected,
        _ => false,
    }
}

impl FromStr for PathExpr {
    type Err = EdgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            match step {
                Step::Key(key) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", key)?;
                }
                Step::Index(index) => write!(f, "[{}]", index)?,
                Step::Find { field, equals } => write!(f, "[{}={}]", field, equals)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn liquidations() -> Value {
        json!({
            "raw": [
                {"exchange": "Binance", "liquidation_usd": 30_000_000.0},
                {"exchange": "All", "liquidation_usd": 63_000_000.0, "longLiquidation_usd": 51_000_000.0},
            ]
        })
    }

    #[test]
    fn test_parse_keys_and_selectors() {
        let path = PathExpr::parse("raw[exchange=All].liquidation_usd").unwrap();
        assert_eq!(
            path.steps(),
            &[
                Step::Key("raw".into()),
                Step::Find {
                    field: "exchange".into(),
                    equals: "All".into()
                },
                Step::Key("liquidation_usd".into()),
            ]
        );

        let path = PathExpr::parse("data[0][1]").unwrap();
        assert_eq!(
            path.steps(),
            &[Step::Key("data".into()), Step::Index(0), Step::Index(1)]
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "data..price", "data[0", "data[]", "data[-1]", "data[0]x", "a]b", "[=x]"] {
            assert!(
                matches!(PathExpr::parse(bad), Err(EdgeError::InvalidPath { .. })),
                "expected `{}` to be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_display_round_trips_syntax() {
        let text = "raw[exchange=All].rows[2].value";
        assert_eq!(PathExpr::parse(text).unwrap().to_string(), text);
    }

    #[test]
    fn test_resolve_find_selector() {
        let payload = liquidations();
        let path = PathExpr::parse("raw[exchange=All].liquidation_usd").unwrap();
        assert_eq!(path.resolve(&payload), Lookup::Found(&json!(63_000_000.0)));
    }

    #[test]
    fn test_resolve_not_found_cases() {
        let payload = json!({"data": {"price": 68819, "rows": [1, 2], "gone": null}});

        for expr in [
            "data.missing",
            "data.price.deeper",
            "data.rows[5]",
            "data[0]",
            "data.rows.key",
            "data.rows[k=v]",
            "data.gone",
        ] {
            let path = PathExpr::parse(expr).unwrap();
            assert_eq!(path.resolve(&payload), Lookup::NotFound, "path `{}`", expr);
        }
    }

    #[test]
    fn test_find_matches_numbers() {
        let payload = json!({"rows": [{"id": 7, "v": "a"}, {"id": 8, "v": "b"}]});
        let path = PathExpr::parse("rows[id=8].v").unwrap();
        assert_eq!(path.resolve(&payload).found(), Some(&json!("b")));
    }
}
