//! Core value objects: glucose readings and date ranges
//!
//! Everything here is an immutable value object owned by the calling
//! screen or session. The pipeline is stateless and clones what it
//! keeps, so callers may reuse their collections freely.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::units::{ClinicalBand, GlucoseStatus, GlucoseUnit};

/// Clinical context tag of a glucose measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingType {
    Fasting,
    BeforeMeal,
    AfterMeal,
    Bedtime,
    Random,
    Other,
}

impl ReadingType {
    /// Get a display label for the reading type
    pub fn label(self) -> &'static str {
        match self {
            ReadingType::Fasting => "Fasting",
            ReadingType::BeforeMeal => "Before Meal",
            ReadingType::AfterMeal => "After Meal",
            ReadingType::Bedtime => "Bedtime",
            ReadingType::Random => "Random",
            ReadingType::Other => "Other",
        }
    }

    /// The clinical band used to label a single reading of this type.
    ///
    /// Note this is not the band the report summary uses; see the
    /// [`units`](crate::units) module docs for the dual policy.
    pub fn band(self) -> ClinicalBand {
        let (high_mgdl, high_mmol) = match self {
            ReadingType::Fasting => (100.0, 5.6),
            ReadingType::AfterMeal => (140.0, 7.8),
            _ => (180.0, 10.0),
        };
        ClinicalBand {
            low_mgdl: 70.0,
            high_mgdl,
            low_mmol: 3.9,
            high_mmol,
        }
    }
}

/// A single glucose measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlucoseReading {
    pub id: String,
    pub value: f64,
    pub unit: GlucoseUnit,
    pub reading_type: ReadingType,
    pub timestamp: DateTime<Utc>,
    pub notes: Option<String>,
}

impl GlucoseReading {
    /// Build a reading, rejecting values outside the plausible bounds
    /// for `unit`.
    pub fn new(
        id: impl Into<String>,
        value: f64,
        unit: GlucoseUnit,
        reading_type: ReadingType,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, PipelineError> {
        let value = unit.validate(value)?;
        Ok(Self {
            id: id.into(),
            value,
            unit,
            reading_type,
            timestamp,
            notes: None,
        })
    }

    /// Attach free-text notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// The value expressed in `unit`, converting when necessary.
    pub fn value_in(&self, unit: GlucoseUnit) -> f64 {
        self.unit.convert(self.value, unit)
    }

    /// Classify this reading against its type's clinical band.
    pub fn status(&self) -> GlucoseStatus {
        self.reading_type.band().classify(self.value, self.unit)
    }
}

/// A closed interval of instants, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Flag an inverted range. Callers are told, the range is never
    /// auto-corrected.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.start > self.end {
            Err(PipelineError::InvalidRange {
                start: self.start,
                end: self.end,
            })
        } else {
            Ok(())
        }
    }

    /// Inclusive containment check.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }
}
