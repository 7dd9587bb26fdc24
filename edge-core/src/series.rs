//! Time series reduction and drawdown

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A `(t, v)` point of a chronological series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub t: DateTime<Utc>,
    pub v: f64,
}

impl SeriesPoint {
    pub fn new(t: DateTime<Utc>, v: f64) -> Self {
        Self { t, v }
    }
}

/// Reduce `points` to at most `max_points` by even-stride selection.
///
/// The output is a subsequence of the input that keeps the first and last
/// points. Inputs already within the cap are returned unchanged.
pub fn downsample<T: Clone>(points: &[T], max_points: usize) -> Vec<T> {
    let len = points.len();
    if len <= max_points {
        return points.to_vec();
    }

    match max_points {
        0 => Vec::new(),
        1 => points[len - 1..].to_vec(),
        n => {
            let span = len - 1;
            let steps = n - 1;
            // Rounded even positions over [0, span]; distinct because span > steps.
            (0..n)
                .map(|i| (i * span + steps / 2) / steps)
                .map(|index| points[index].clone())
                .collect()
        }
    }
}

/// Location and depth of the worst peak-to-trough decline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drawdown {
    /// Decline as a percentage of the peak (75.0 = 75%)
    pub pct: f64,
    pub peak_index: usize,
    pub trough_index: usize,
}

/// Maximum drawdown over the full series.
///
/// The peak is a running maximum; equal values keep the earliest peak.
/// Non-positive peaks contribute no drawdown. Returns `None` for an empty
/// series.
pub fn max_drawdown(values: &[f64]) -> Option<Drawdown> {
    let first = *values.first()?;

    let mut peak = first;
    let mut peak_index = 0;
    let mut worst = Drawdown {
        pct: 0.0,
        peak_index: 0,
        trough_index: 0,
    };

    for (index, &value) in values.iter().enumerate() {
        if value > peak {
            peak = value;
            peak_index = index;
        }
        if peak > 0.0 {
            let dd = (peak - value) / peak;
            if dd > worst.pct {
                worst = Drawdown {
                    pct: dd,
                    peak_index,
                    trough_index: index,
                };
            }
        }
    }

    worst.pct *= 100.0;
    Some(worst)
}

/// Maximum drawdown as a percentage
pub fn max_drawdown_pct(values: &[f64]) -> Option<f64> {
    max_drawdown(values).map(|dd| dd.pct)
}
