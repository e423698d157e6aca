//! Filtering and ordering of reading collections
//!
//! The date, reading-type, and value-range predicates act on disjoint
//! attributes, so they commute; the sort is always the final step.
//! Operations that depend on "now" take it explicitly in an `_at`
//! variant so callers and tests can pin the clock.

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::reading::{DateRange, GlucoseReading, ReadingType};

/// Relative or custom date window for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFilter {
    /// `[now - 7d, now]`.
    #[serde(rename = "last7days")]
    Last7Days,
    /// From the most recent Sunday 00:00 to now.
    Week,
    /// From the 1st of the current month 00:00 to now.
    Month,
    /// No date bound.
    All,
    /// An explicit range, validated before use.
    Custom(DateRange),
}

impl DateFilter {
    /// Resolve the filter to an inclusive `[start, end]` window at the
    /// given instant, or `None` for [`DateFilter::All`].
    ///
    /// An inverted custom range is an error, never a silently empty
    /// window.
    pub fn window_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Option<(DateTime<Utc>, DateTime<Utc>)>, PipelineError> {
        match self {
            DateFilter::Last7Days => Ok(Some((now - Duration::days(7), now))),
            DateFilter::Week => {
                let days_back = now.weekday().num_days_from_sunday() as i64;
                let sunday = (now.date_naive() - Duration::days(days_back))
                    .and_time(NaiveTime::MIN)
                    .and_utc();
                Ok(Some((sunday, now)))
            }
            DateFilter::Month => {
                let first = now
                    .date_naive()
                    .with_day(1)
                    .unwrap_or_else(|| now.date_naive())
                    .and_time(NaiveTime::MIN)
                    .and_utc();
                Ok(Some((first, now)))
            }
            DateFilter::All => Ok(None),
            DateFilter::Custom(range) => {
                range.validate()?;
                Ok(Some((range.start, range.end)))
            }
        }
    }
}

/// Optional numeric bounds on the reading value. Absent bounds pass
/// everything; both absent is a no-op, not an empty result.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl ValueRange {
    fn passes(&self, value: f64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

/// Ordering of the filtered output by timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

/// The full set of simultaneous filter criteria. Pure value object with
/// no hidden state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub date_filter: DateFilter,
    /// `None` passes every reading type.
    pub reading_type: Option<ReadingType>,
    pub value_range: Option<ValueRange>,
    pub sort_order: SortOrder,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            date_filter: DateFilter::All,
            reading_type: None,
            value_range: None,
            sort_order: SortOrder::Newest,
        }
    }
}

impl FilterCriteria {
    /// Apply the criteria against the current clock.
    pub fn apply(&self, readings: &[GlucoseReading]) -> Result<Vec<GlucoseReading>, PipelineError> {
        self.apply_at(readings, Utc::now())
    }

    /// Apply all predicates, then sort. Empty input yields an empty
    /// output, never an error. The sort is stable: readings with
    /// identical timestamps keep their relative input order.
    pub fn apply_at(
        &self,
        readings: &[GlucoseReading],
        now: DateTime<Utc>,
    ) -> Result<Vec<GlucoseReading>, PipelineError> {
        let window = self.date_filter.window_at(now)?;

        let mut out: Vec<GlucoseReading> = readings
            .iter()
            .filter(|r| match window {
                Some((start, end)) => r.timestamp >= start && r.timestamp <= end,
                None => true,
            })
            .filter(|r| self.reading_type.is_none_or(|t| r.reading_type == t))
            .filter(|r| {
                self.value_range
                    .as_ref()
                    .is_none_or(|range| range.passes(r.value))
            })
            .cloned()
            .collect();

        match self.sort_order {
            SortOrder::Newest => out.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
            SortOrder::Oldest => out.sort_by(|a, b| a.timestamp.cmp(&b.timestamp)),
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::GlucoseUnit;
    use chrono::TimeZone;

    // Wednesday.
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 17, 12, 0, 0).unwrap()
    }

    fn reading(id: &str, value: f64, rt: ReadingType, ts: DateTime<Utc>) -> GlucoseReading {
        GlucoseReading::new(id, value, GlucoseUnit::MgDl, rt, ts).unwrap()
    }

    fn sample() -> Vec<GlucoseReading> {
        vec![
            reading(
                "old",
                110.0,
                ReadingType::Fasting,
                Utc.with_ymd_and_hms(2023, 12, 20, 8, 0, 0).unwrap(),
            ),
            reading(
                "month",
                95.0,
                ReadingType::Bedtime,
                Utc.with_ymd_and_hms(2024, 1, 2, 22, 0, 0).unwrap(),
            ),
            reading(
                "sunday",
                200.0,
                ReadingType::AfterMeal,
                Utc.with_ymd_and_hms(2024, 1, 14, 0, 0, 0).unwrap(),
            ),
            reading(
                "recent",
                130.0,
                ReadingType::Fasting,
                Utc.with_ymd_and_hms(2024, 1, 16, 7, 30, 0).unwrap(),
            ),
        ]
    }

    #[test]
    fn test_last7days_window() {
        let criteria = FilterCriteria {
            date_filter: DateFilter::Last7Days,
            ..Default::default()
        };
        let out = criteria.apply_at(&sample(), now()).unwrap();
        let ids: Vec<&str> = out.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["recent", "sunday"]);
    }

    #[test]
    fn test_week_starts_most_recent_sunday_midnight() {
        let criteria = FilterCriteria {
            date_filter: DateFilter::Week,
            ..Default::default()
        };
        let out = criteria.apply_at(&sample(), now()).unwrap();
        // The Sunday 00:00:00 reading sits exactly on the boundary and
        // must be included.
        assert!(out.iter().any(|r| r.id == "sunday"));
        assert!(!out.iter().any(|r| r.id == "month"));
    }

    #[test]
    fn test_month_window() {
        let criteria = FilterCriteria {
            date_filter: DateFilter::Month,
            ..Default::default()
        };
        let out = criteria.apply_at(&sample(), now()).unwrap();
        assert_eq!(out.len(), 3);
        assert!(!out.iter().any(|r| r.id == "old"));
    }

    #[test]
    fn test_type_filter_exact_match() {
        let criteria = FilterCriteria {
            reading_type: Some(ReadingType::Fasting),
            ..Default::default()
        };
        let out = criteria.apply_at(&sample(), now()).unwrap();
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|r| r.reading_type == ReadingType::Fasting));
    }

    #[test]
    fn test_value_range_bounds() {
        let criteria = FilterCriteria {
            value_range: Some(ValueRange {
                min: Some(100.0),
                max: Some(150.0),
            }),
            ..Default::default()
        };
        let out = criteria.apply_at(&sample(), now()).unwrap();
        let ids: Vec<&str> = out.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["recent", "old"]);

        // Both bounds absent is a no-op.
        let noop = FilterCriteria {
            value_range: Some(ValueRange::default()),
            ..Default::default()
        };
        assert_eq!(noop.apply_at(&sample(), now()).unwrap().len(), 4);
    }

    #[test]
    fn test_sort_stability_with_identical_timestamps() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 16, 8, 0, 0).unwrap();
        let readings = vec![
            reading("a", 100.0, ReadingType::Random, ts),
            reading("b", 110.0, ReadingType::Random, ts),
            reading("c", 120.0, ReadingType::Random, ts),
        ];

        for order in [SortOrder::Newest, SortOrder::Oldest] {
            let criteria = FilterCriteria {
                sort_order: order,
                ..Default::default()
            };
            let out = criteria.apply_at(&readings, now()).unwrap();
            let ids: Vec<&str> = out.iter().map(|r| r.id.as_str()).collect();
            assert_eq!(ids, vec!["a", "b", "c"], "order {order:?} broke stability");
        }
    }

    #[test]
    fn test_invalid_custom_range_is_reported() {
        let criteria = FilterCriteria {
            date_filter: DateFilter::Custom(DateRange::new(
                now(),
                now() - Duration::days(1),
            )),
            ..Default::default()
        };
        let err = criteria.apply_at(&sample(), now()).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidRange { .. }));
    }

    #[test]
    fn test_empty_input_is_empty_output() {
        let criteria = FilterCriteria::default();
        assert!(criteria.apply_at(&[], now()).unwrap().is_empty());
    }

    #[test]
    fn test_predicates_commute() {
        // Applying the three predicates in any order yields the same
        // set; compare each single-predicate composition against the
        // canonical combined call.
        let combined = FilterCriteria {
            date_filter: DateFilter::Month,
            reading_type: Some(ReadingType::Fasting),
            value_range: Some(ValueRange {
                min: Some(100.0),
                max: None,
            }),
            sort_order: SortOrder::Oldest,
        };
        let expected = combined.apply_at(&sample(), now()).unwrap();

        let date_only = FilterCriteria {
            date_filter: DateFilter::Month,
            sort_order: SortOrder::Oldest,
            ..Default::default()
        };
        let type_only = FilterCriteria {
            reading_type: Some(ReadingType::Fasting),
            sort_order: SortOrder::Oldest,
            ..Default::default()
        };
        let value_only = FilterCriteria {
            value_range: Some(ValueRange {
                min: Some(100.0),
                max: None,
            }),
            sort_order: SortOrder::Oldest,
            ..Default::default()
        };

        let permutations: [[&FilterCriteria; 3]; 6] = [
            [&date_only, &type_only, &value_only],
            [&date_only, &value_only, &type_only],
            [&type_only, &date_only, &value_only],
            [&type_only, &value_only, &date_only],
            [&value_only, &date_only, &type_only],
            [&value_only, &type_only, &date_only],
        ];

        for perm in permutations {
            let mut set = sample();
            for criteria in perm {
                set = criteria.apply_at(&set, now()).unwrap();
            }
            assert_eq!(set, expected);
        }
    }
}
