//! Glucose units, plausibility bounds, and clinical band policies
//!
//! Thresholds are stored in both units independently rather than derived
//! on the fly, so each unit keeps its conventional clinical values
//! (70 mg/dL and 3.9 mmol/L, not 3.8888...).
//!
//! Two distinct "normal" band policies coexist on purpose:
//! - [`TargetRange`] is the single global band the report summary uses
//!   (70-180 mg/dL / 3.9-10.0 mmol/L);
//! - [`ClinicalBand`] carries the per-reading-type thresholds the log
//!   screens use to label an individual reading (see
//!   [`ReadingType::band`](crate::reading::ReadingType::band)).
//! The discrepancy between them is inherited from the product and is
//! kept as two named policies instead of being silently unified.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// mg/dL per mmol/L, the conventional rounded conversion factor.
pub const MGDL_PER_MMOL: f64 = 18.0;

/// Unit a glucose value is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GlucoseUnit {
    #[serde(rename = "mg/dL")]
    #[default]
    MgDl,
    #[serde(rename = "mmol/L")]
    MmolL,
}

impl GlucoseUnit {
    /// Get the unit label
    pub fn label(self) -> &'static str {
        match self {
            GlucoseUnit::MgDl => "mg/dL",
            GlucoseUnit::MmolL => "mmol/L",
        }
    }

    /// Physiologically plausible bounds for a reading in this unit.
    pub fn plausible_bounds(self) -> (f64, f64) {
        match self {
            GlucoseUnit::MgDl => (20.0, 600.0),
            GlucoseUnit::MmolL => (1.1, 33.3),
        }
    }

    /// Validate a raw value against the plausible bounds.
    ///
    /// Out-of-range values are rejected, never clamped.
    pub fn validate(self, value: f64) -> Result<f64, PipelineError> {
        let (low, high) = self.plausible_bounds();
        if value.is_finite() && value >= low && value <= high {
            Ok(value)
        } else {
            Err(PipelineError::ImplausibleValue { value, unit: self })
        }
    }

    /// Convert a value in this unit to `target`.
    pub fn convert(self, value: f64, target: GlucoseUnit) -> f64 {
        match (self, target) {
            (GlucoseUnit::MgDl, GlucoseUnit::MmolL) => value / MGDL_PER_MMOL,
            (GlucoseUnit::MmolL, GlucoseUnit::MgDl) => value * MGDL_PER_MMOL,
            _ => value,
        }
    }

    /// Format just the value without unit suffix
    pub fn format_value(self, value: f64) -> String {
        match self {
            GlucoseUnit::MgDl => format!("{:.0}", value),
            GlucoseUnit::MmolL => format!("{:.1}", value),
        }
    }

    /// Format the value with unit suffix
    pub fn format(self, value: f64) -> String {
        format!("{} {}", self.format_value(value), self.label())
    }
}

impl fmt::Display for GlucoseUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classification of a glucose value against a band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlucoseStatus {
    Low,
    Normal,
    High,
}

impl GlucoseStatus {
    /// Get a display label for the status
    pub fn label(self) -> &'static str {
        match self {
            GlucoseStatus::Low => "Low",
            GlucoseStatus::Normal => "Normal",
            GlucoseStatus::High => "High",
        }
    }
}

/// The single global target band used by the report-level summary
/// statistics. Bounds are inclusive: values equal to a threshold count
/// as in range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetRange {
    /// Low threshold in mg/dL - default 70
    pub low_mgdl: f64,
    /// High threshold in mg/dL - default 180
    pub high_mgdl: f64,
    /// Low threshold in mmol/L - default 3.9
    pub low_mmol: f64,
    /// High threshold in mmol/L - default 10.0
    pub high_mmol: f64,
}

impl Default for TargetRange {
    fn default() -> Self {
        Self {
            low_mgdl: 70.0,
            high_mgdl: 180.0,
            low_mmol: 3.9,
            high_mmol: 10.0,
        }
    }
}

impl TargetRange {
    /// Thresholds for the given unit as `(low, high)`.
    pub fn bounds(&self, unit: GlucoseUnit) -> (f64, f64) {
        match unit {
            GlucoseUnit::MgDl => (self.low_mgdl, self.high_mgdl),
            GlucoseUnit::MmolL => (self.low_mmol, self.high_mmol),
        }
    }

    /// Classify a value expressed in `unit`.
    pub fn classify(&self, value: f64, unit: GlucoseUnit) -> GlucoseStatus {
        let (low, high) = self.bounds(unit);
        if value < low {
            GlucoseStatus::Low
        } else if value > high {
            GlucoseStatus::High
        } else {
            GlucoseStatus::Normal
        }
    }

    /// Get threshold display string for the user's unit
    pub fn format_range(&self, unit: GlucoseUnit) -> String {
        let (low, high) = self.bounds(unit);
        format!(
            "{}-{} {}",
            unit.format_value(low),
            unit.format_value(high),
            unit.label()
        )
    }
}

/// A per-reading-type clinical band, used by screens to label a single
/// reading. The high threshold varies with the reading context; the low
/// threshold is 70 mg/dL (3.9 mmol/L) across the board.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClinicalBand {
    pub low_mgdl: f64,
    pub high_mgdl: f64,
    pub low_mmol: f64,
    pub high_mmol: f64,
}

impl ClinicalBand {
    /// Thresholds for the given unit as `(low, high)`.
    pub fn bounds(&self, unit: GlucoseUnit) -> (f64, f64) {
        match unit {
            GlucoseUnit::MgDl => (self.low_mgdl, self.high_mgdl),
            GlucoseUnit::MmolL => (self.low_mmol, self.high_mmol),
        }
    }

    /// Classify a value expressed in `unit`.
    pub fn classify(&self, value: f64, unit: GlucoseUnit) -> GlucoseStatus {
        let (low, high) = self.bounds(unit);
        if value < low {
            GlucoseStatus::Low
        } else if value > high {
            GlucoseStatus::High
        } else {
            GlucoseStatus::Normal
        }
    }
}
