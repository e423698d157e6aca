//! Chart-ready trend series bucketed by calendar day
//!
//! Readings are capped to the most recent [`MAX_CHART_READINGS`]
//! *before* day bucketing, so a dense day can push earlier days out of
//! the chart entirely. That order matches the shipped app and is kept
//! for parity; see DESIGN.md for the flagged alternative.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::reading::GlucoseReading;
use crate::stats::round_half_up;

/// Raw readings kept per series before bucketing, to bound chart
/// density.
pub const MAX_CHART_READINGS: usize = 20;

/// Look-back window for a trend chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendPeriod {
    Week,
    Month,
    Quarter,
}

impl TrendPeriod {
    /// Length of the look-back window in days.
    pub fn days(self) -> i64 {
        match self {
            TrendPeriod::Week => 7,
            TrendPeriod::Month => 30,
            TrendPeriod::Quarter => 90,
        }
    }

    /// Maximum number of day buckets kept for this period, `None` for
    /// unlimited.
    pub fn bucket_cap(self) -> Option<usize> {
        match self {
            TrendPeriod::Week => Some(7),
            TrendPeriod::Month | TrendPeriod::Quarter => None,
        }
    }
}

/// A labeled series ready for a charting component. `labels` and
/// `points` always have the same length; buckets run oldest to newest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    /// `month/day` key per bucket, chronological.
    pub labels: Vec<String>,
    /// Day-averaged value per bucket, rounded to the nearest integer.
    pub points: Vec<f64>,
}

impl ChartSeries {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Build a series against the current clock.
    pub fn build(readings: &[GlucoseReading], period: TrendPeriod) -> Option<ChartSeries> {
        Self::build_at(readings, period, Utc::now())
    }

    /// Build a series for `[now - period, now]`.
    ///
    /// Returns `None` when no reading falls inside the window, so the
    /// renderer can show an empty state instead of a flat zero line.
    pub fn build_at(
        readings: &[GlucoseReading],
        period: TrendPeriod,
        now: DateTime<Utc>,
    ) -> Option<ChartSeries> {
        let start = now - Duration::days(period.days());
        let mut window: Vec<&GlucoseReading> = readings
            .iter()
            .filter(|r| r.timestamp >= start && r.timestamp <= now)
            .collect();
        if window.is_empty() {
            return None;
        }

        // Cap raw readings before bucketing, keeping the most recent.
        window.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        if window.len() > MAX_CHART_READINGS {
            window.drain(..window.len() - MAX_CHART_READINGS);
        }

        let mut buckets: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
        for r in &window {
            buckets
                .entry(r.timestamp.date_naive())
                .or_default()
                .push(r.value);
        }

        let mut days: Vec<(NaiveDate, f64)> = buckets
            .into_iter()
            .map(|(day, values)| {
                let mean = values.iter().sum::<f64>() / values.len() as f64;
                (day, round_half_up(mean) as f64)
            })
            .collect();

        if let Some(cap) = period.bucket_cap() {
            if days.len() > cap {
                days.drain(..days.len() - cap);
            }
        }

        let (labels, points) = days
            .into_iter()
            .map(|(day, point)| (format!("{}/{}", day.month(), day.day()), point))
            .unzip();
        Some(ChartSeries { labels, points })
    }
}

/// Coarse direction of a reading collection over time, from comparing
/// first-half and second-half means of the chronological values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Rising,
    Falling,
    Stable,
}

impl TrendDirection {
    /// Half-to-half mean shift below this is reported as stable.
    const STABLE_DELTA: f64 = 5.0;

    /// `None` when fewer than 3 readings are available.
    pub fn analyze(readings: &[GlucoseReading]) -> Option<TrendDirection> {
        if readings.len() < 3 {
            return None;
        }

        let mut ordered: Vec<&GlucoseReading> = readings.iter().collect();
        ordered.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        let values: Vec<f64> = ordered.iter().map(|r| r.value).collect();

        let mid = values.len() / 2;
        let first = values[..mid].iter().sum::<f64>() / mid as f64;
        let second = values[mid..].iter().sum::<f64>() / (values.len() - mid) as f64;
        let delta = second - first;

        Some(if delta.abs() < Self::STABLE_DELTA {
            TrendDirection::Stable
        } else if delta > 0.0 {
            TrendDirection::Rising
        } else {
            TrendDirection::Falling
        })
    }
}
