//! Display formatting for widget values
//!
//! Rounding happens here and nowhere else.

/// Rendered in place of a value that is absent or dead
pub const PLACEHOLDER: &str = "—";

/// Compact USD: `$1.2B`, `$43.8M`, `$68,819`, `$12.34`
pub fn fmt_usd(value: Option<f64>) -> String {
    let Some(n) = value.filter(|n| n.is_finite()) else {
        return PLACEHOLDER.to_string();
    };

    let sign = if n < 0.0 { "-" } else { "" };
    let abs = n.abs();
    let body = if abs >= 1_000_000_000.0 {
        format!("{:.1}B", abs / 1_000_000_000.0)
    } else if abs >= 1_000_000.0 {
        format!("{:.1}M", abs / 1_000_000.0)
    } else if abs >= 1_000.0 {
        group_thousands(abs, 0)
    } else {
        format!("{:.2}", abs)
    };

    format!("{}${}", sign, body)
}

/// Percentage with `digits` decimals; `signed` adds `+` to positive values
pub fn fmt_pct(value: Option<f64>, digits: usize, signed: bool) -> String {
    let Some(p) = value.filter(|p| p.is_finite()) else {
        return PLACEHOLDER.to_string();
    };

    let sign = if signed && p > 0.0 { "+" } else { "" };
    format!("{}{:.*}%", sign, digits, p)
}

/// Integer count with thousands separators
pub fn fmt_count(value: Option<f64>) -> String {
    match value.filter(|n| n.is_finite()) {
        Some(n) if n < 0.0 => format!("-{}", group_thousands(n.abs(), 0)),
        Some(n) => group_thousands(n, 0),
        None => PLACEHOLDER.to_string(),
    }
}

fn group_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value);
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{}.{}", grouped, frac),
        None => grouped,
    }
}
