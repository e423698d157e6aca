//! Report assembly and validation
//!
//! A [`Report`] is the single exportable snapshot handed to the PDF
//! rendering collaborator: identity, period, sorted logs, summary
//! statistics, and a deterministic filename. Assembly is the only
//! operation in the pipeline allowed to fail validation, and when it
//! does it reports every violated rule at once.

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, ValidationIssue};
use crate::reading::{DateRange, GlucoseReading};
use crate::stats::Statistics;
use crate::units::GlucoseUnit;

/// Identity block printed on the report header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub full_name: String,
    pub email: String,
    pub age: Option<u32>,
    pub gender: Option<String>,
}

impl UserInfo {
    pub fn new(full_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            email: email.into(),
            age: None,
            gender: None,
        }
    }
}

/// An assembled, immutable report snapshot. Later mutation of the
/// inputs it was built from is never observed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub user: UserInfo,
    pub date_range: DateRange,
    /// Readings within the range, newest first.
    pub logs: Vec<GlucoseReading>,
    pub unit: GlucoseUnit,
    pub generated_at: DateTime<Utc>,
    /// Summary over `logs`, using the report-level target band.
    pub statistics: Statistics,
    pub filename: String,
}

impl Report {
    /// Assemble against the current clock.
    pub fn assemble(
        readings: &[GlucoseReading],
        user: &UserInfo,
        date_range: DateRange,
        unit: GlucoseUnit,
    ) -> Result<Report, PipelineError> {
        Self::assemble_at(readings, user, date_range, unit, Utc::now())
    }

    /// Validate inputs, filter to the inclusive range, sort newest
    /// first, and derive statistics and filename.
    ///
    /// All violated rules are collected into a single
    /// [`PipelineError::Validation`]. When the range itself is
    /// inverted, the zero-readings rule is not evaluated — an undefined
    /// window must not masquerade as an empty one.
    pub fn assemble_at(
        readings: &[GlucoseReading],
        user: &UserInfo,
        date_range: DateRange,
        unit: GlucoseUnit,
        now: DateTime<Utc>,
    ) -> Result<Report, PipelineError> {
        let mut issues = Vec::new();

        if user.full_name.trim().is_empty() {
            issues.push(ValidationIssue::MissingFullName);
        }
        if user.email.trim().is_empty() {
            issues.push(ValidationIssue::MissingEmail);
        }

        let range_ok = date_range.validate().is_ok();
        if !range_ok {
            issues.push(ValidationIssue::InvalidDateRange);
        }

        let mut logs: Vec<GlucoseReading> = if range_ok {
            readings
                .iter()
                .filter(|r| date_range.contains(r.timestamp))
                .cloned()
                .collect()
        } else {
            Vec::new()
        };
        if range_ok && logs.is_empty() {
            issues.push(ValidationIssue::NoReadingsInRange);
        }

        if !issues.is_empty() {
            return Err(PipelineError::Validation(issues));
        }

        logs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        let statistics = Statistics::compute(&logs, unit);
        let filename = report_filename(&user.full_name, &date_range);
        debug!("assembled report {filename} with {} readings", logs.len());

        Ok(Report {
            user: user.clone(),
            date_range,
            logs,
            unit,
            generated_at: now,
            statistics,
            filename,
        })
    }
}

/// Deterministic export filename, e.g.
/// `Report_Jane_Doe_2024-01-01_to_2024-01-31.pdf`. Every
/// non-alphanumeric character of the name maps to `_`.
pub fn report_filename(full_name: &str, range: &DateRange) -> String {
    let sanitized: String = full_name
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    format!(
        "Report_{}_{}_to_{}.pdf",
        sanitized,
        range.start.format("%Y-%m-%d"),
        range.end.format("%Y-%m-%d")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::ReadingType;
    use chrono::TimeZone;

    fn ts(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()
    }

    fn reading(id: &str, value: f64, day: u32, hour: u32) -> GlucoseReading {
        GlucoseReading::new(id, value, GlucoseUnit::MgDl, ReadingType::Fasting, ts(day, hour))
            .unwrap()
    }

    fn january() -> DateRange {
        DateRange::new(ts(1, 0), ts(31, 23))
    }

    fn sample() -> Vec<GlucoseReading> {
        vec![
            reading("a", 95.0, 5, 8).with_notes("before breakfast"),
            reading("b", 125.0, 12, 8),
            reading("c", 150.0, 20, 8),
        ]
    }

    #[test]
    fn test_assembles_sorted_snapshot() {
        let user = UserInfo::new("Jane Doe", "jane@example.com");
        let report =
            Report::assemble_at(&sample(), &user, january(), GlucoseUnit::MgDl, ts(31, 23))
                .unwrap();

        let ids: Vec<&str> = report.logs.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
        assert_eq!(report.statistics.count, 3);
        // mean of 95/125/150 = 123.33 -> 123
        assert_eq!(report.statistics.average, 123);
        assert_eq!(
            report.filename,
            "Report_Jane_Doe_2024-01-01_to_2024-01-31.pdf"
        );
    }

    #[test]
    fn test_validation_collects_all_issues() {
        let user = UserInfo::new("", "  ");
        let inverted = DateRange::new(ts(31, 0), ts(1, 0));
        let err = Report::assemble_at(&sample(), &user, inverted, GlucoseUnit::MgDl, ts(31, 0))
            .unwrap_err();

        match err {
            PipelineError::Validation(issues) => {
                assert_eq!(
                    issues,
                    vec![
                        ValidationIssue::MissingFullName,
                        ValidationIssue::MissingEmail,
                        ValidationIssue::InvalidDateRange,
                    ]
                );
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_name_lists_rule() {
        let user = UserInfo::new("", "jane@example.com");
        let err = Report::assemble_at(&sample(), &user, january(), GlucoseUnit::MgDl, ts(31, 23))
            .unwrap_err();
        assert_eq!(
            err,
            PipelineError::Validation(vec![ValidationIssue::MissingFullName])
        );
        assert!(ValidationIssue::MissingFullName
            .to_string()
            .contains("full name"));
    }

    #[test]
    fn test_zero_readings_after_filtering_is_an_issue() {
        let user = UserInfo::new("Jane Doe", "jane@example.com");
        let february = DateRange::new(
            Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 2, 28, 0, 0, 0).unwrap(),
        );
        let err = Report::assemble_at(&sample(), &user, february, GlucoseUnit::MgDl, ts(31, 23))
            .unwrap_err();
        assert_eq!(
            err,
            PipelineError::Validation(vec![ValidationIssue::NoReadingsInRange])
        );
    }

    #[test]
    fn test_assembly_is_idempotent_except_generated_at() {
        let user = UserInfo::new("Jane Doe", "jane@example.com");
        let first =
            Report::assemble_at(&sample(), &user, january(), GlucoseUnit::MgDl, ts(31, 20))
                .unwrap();
        let second =
            Report::assemble_at(&sample(), &user, january(), GlucoseUnit::MgDl, ts(31, 22))
                .unwrap();

        assert_ne!(first.generated_at, second.generated_at);
        assert_eq!(first.user, second.user);
        assert_eq!(first.date_range, second.date_range);
        assert_eq!(first.logs, second.logs);
        assert_eq!(first.unit, second.unit);
        assert_eq!(first.statistics, second.statistics);
        assert_eq!(first.filename, second.filename);
    }

    #[test]
    fn test_snapshot_ignores_later_input_mutation() {
        let user = UserInfo::new("Jane Doe", "jane@example.com");
        let mut readings = sample();
        let report =
            Report::assemble_at(&readings, &user, january(), GlucoseUnit::MgDl, ts(31, 23))
                .unwrap();

        readings.clear();
        assert_eq!(report.logs.len(), 3);
    }

    #[test]
    fn test_filename_sanitization() {
        let range = january();
        assert_eq!(
            report_filename("Dr. Ana-María O'Neil", &range),
            "Report_Dr__Ana_María_O_Neil_2024-01-01_to_2024-01-31.pdf"
        );
        // Idempotent for identical inputs.
        assert_eq!(
            report_filename("Dr. Ana-María O'Neil", &range),
            report_filename("Dr. Ana-María O'Neil", &range)
        );
    }
}
