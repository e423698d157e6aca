//! Aggregate clinical statistics for a filtered reading collection
//!
//! Statistics are derived on demand and never cached across filter
//! changes. `compute` is total: an empty collection yields the all-zero
//! [`Statistics`], never an error and never NaN.

use serde::{Deserialize, Serialize};

use crate::reading::GlucoseReading;
use crate::units::{GlucoseStatus, GlucoseUnit, TargetRange};

/// Summary metrics over a reading collection, expressed in a single
/// unit. In-range counts use the report-level [`TargetRange`] band.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Statistics {
    pub count: usize,
    /// Mean value, rounded half-up to the nearest integer in `unit`.
    pub average: i64,
    pub min: f64,
    pub max: f64,
    pub in_range_count: usize,
    pub above_range_count: usize,
    pub below_range_count: usize,
    /// `round(in_range_count / count * 100)`; 0 when count is 0.
    pub in_range_percentage: u8,
}

impl Statistics {
    /// The defined zero value returned for empty input.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compute statistics in `unit`. Readings tagged in the other unit
    /// are converted first so mixed collections stay consistent.
    pub fn compute(readings: &[GlucoseReading], unit: GlucoseUnit) -> Self {
        if readings.is_empty() {
            return Self::empty();
        }

        let values: Vec<f64> = readings.iter().map(|r| r.value_in(unit)).collect();
        let count = values.len();
        let sum: f64 = values.iter().sum();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let band = TargetRange::default();
        let mut in_range = 0usize;
        let mut above = 0usize;
        let mut below = 0usize;
        for &value in &values {
            match band.classify(value, unit) {
                GlucoseStatus::Normal => in_range += 1,
                GlucoseStatus::High => above += 1,
                GlucoseStatus::Low => below += 1,
            }
        }

        Self {
            count,
            average: round_half_up(sum / count as f64),
            min,
            max,
            in_range_count: in_range,
            above_range_count: above,
            below_range_count: below,
            in_range_percentage: round_half_up(in_range as f64 / count as f64 * 100.0) as u8,
        }
    }
}

/// Round to the nearest integer, halves up. Values here are always
/// non-negative.
pub(crate) fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}
