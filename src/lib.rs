//! Glucose analytics and reporting pipeline
//!
//! A pure, stateless transformation library for diabetes-management
//! apps: it takes an in-memory collection of glucose readings and
//! produces filtered views, clinical summary statistics, chart-ready
//! trend series, and validated report snapshots. A separate adapter
//! normalizes loosely-typed backend AI insight payloads into a stable
//! shape.
//!
//! Data flow:
//!
//! ```text
//! readings -> FilterCriteria::apply -> { Statistics::compute,
//!                                        ChartSeries::build }
//!                                   -> Report::assemble -> renderer
//! backend payload -> Insight::normalize -> UI / reminder scheduler
//! ```
//!
//! The pipeline performs no I/O and holds no shared mutable state;
//! every call takes its full input and returns fresh output, so
//! independent calls from multiple screens over the same collection are
//! always safe. Operations that depend on the clock take an explicit
//! `now` in their `_at` variants.

pub mod error;
pub mod filter;
pub mod insight;
pub mod reading;
pub mod report;
pub mod stats;
pub mod trend;
pub mod units;

pub use error::{PipelineError, ValidationIssue};
pub use filter::{DateFilter, FilterCriteria, SortOrder, ValueRange};
pub use insight::{Insight, ReminderDelay, Severity};
pub use reading::{DateRange, GlucoseReading, ReadingType};
pub use report::{Report, UserInfo};
pub use stats::Statistics;
pub use trend::{ChartSeries, TrendDirection, TrendPeriod};
pub use units::{ClinicalBand, GlucoseStatus, GlucoseUnit, TargetRange};
