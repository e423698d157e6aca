//! Error types for the glucose analytics pipeline

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::units::GlucoseUnit;

/// Top-level error for all pipeline operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// A date range whose start lies after its end. Reported to the
    /// caller, never auto-corrected or turned into an empty result.
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// A glucose value outside the physiologically plausible bounds for
    /// its unit (20-600 mg/dL, 1.1-33.3 mmol/L).
    #[error("glucose value {value} is not plausible for {unit}")]
    ImplausibleValue { value: f64, unit: GlucoseUnit },

    /// Report inputs violated one or more validation rules. Every
    /// violated rule is listed, not just the first.
    #[error("report validation failed ({} issue(s))", .0.len())]
    Validation(Vec<ValidationIssue>),

    /// Filters matched zero rows. Filtering itself returns `Ok(vec![])`;
    /// this variant lets callers that need a hard distinction between
    /// "nothing matched" and "something broke" signal the former.
    #[error("no readings matched the requested filters")]
    EmptyResult,
}

/// A single violated report validation rule.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationIssue {
    #[error("full name is required")]
    MissingFullName,

    #[error("email is required")]
    MissingEmail,

    #[error("date range start is after end")]
    InvalidDateRange,

    #[error("no readings fall within the report period")]
    NoReadingsInRange,
}
