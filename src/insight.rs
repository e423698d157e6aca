//! Normalization of loosely-typed upstream AI analysis payloads
//!
//! The backend insight schema varies across endpoint versions, so every
//! field read here has a fallback; a missing or mistyped field is never
//! a hard failure. The severity is not passed through verbatim — it is
//! derived from the payload's risk-assessment map.

use chrono::{DateTime, Duration, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Confidence assumed when the payload does not carry one.
const DEFAULT_CONFIDENCE: u8 = 85;

const DEFAULT_TITLE: &str = "Glucose Insight";
const DEFAULT_MESSAGE: &str =
    "Continue regular glucose monitoring to build more personalized insights.";

/// Derived severity of an insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Positive,
    #[default]
    Info,
    Warning,
    Critical,
}

/// A normalized backend insight in the stable shape the UI and the
/// reminder scheduler consume. Created fresh on every fetch and
/// superseded wholesale on refetch; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub id: String,
    pub title: String,
    pub message: String,
    /// 0-100.
    pub confidence: u8,
    pub severity: Severity,
    pub actionable: bool,
    pub recommendation: Option<String>,
    pub factors: Vec<String>,
    /// Early-morning rise flag, passed through opaquely from the
    /// backend time analysis.
    pub dawn_phenomenon: bool,
}

impl Insight {
    /// Reshape a raw backend payload into an [`Insight`], substituting
    /// defaults for anything absent or mistyped.
    pub fn normalize(payload: &Value) -> Insight {
        if !payload.is_object() {
            warn!("insight payload is not an object; using defaults");
        }

        let (high_risks, moderate_risks) = count_risks(payload);
        let improving = matches!(
            payload
                .pointer("/trends/direction")
                .and_then(Value::as_str),
            Some("improving" | "decreasing" | "downward")
        );

        let severity = if high_risks >= 2 {
            Severity::Critical
        } else if high_risks >= 1 || moderate_risks >= 2 {
            Severity::Warning
        } else if improving {
            Severity::Positive
        } else {
            Severity::Info
        };

        let confidence = payload
            .get("confidence")
            .and_then(Value::as_u64)
            .map(|c| c.min(100) as u8)
            .unwrap_or(DEFAULT_CONFIDENCE);

        let recommendation = top_recommendation(payload);

        let factors = payload
            .pointer("/risk_assessment/factors")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();

        let actionable = payload
            .get("actionable")
            .and_then(Value::as_bool)
            .unwrap_or(recommendation.is_some());

        Insight {
            id: string_field(payload, "id").unwrap_or_else(|| "insight".to_owned()),
            title: string_field(payload, "title").unwrap_or_else(|| DEFAULT_TITLE.to_owned()),
            message: string_field(payload, "message")
                .unwrap_or_else(|| DEFAULT_MESSAGE.to_owned()),
            confidence,
            severity,
            actionable,
            recommendation,
            factors,
            dawn_phenomenon: payload
                .pointer("/time_analysis/dawn_phenomenon_detected")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        }
    }
}

fn string_field(payload: &Value, field: &str) -> Option<String> {
    payload
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_owned)
}

/// Count high and moderate entries among the `*_risk` keys of the
/// payload's risk-assessment map (the backend emits hypoglycemia,
/// hyperglycemia, and variability risks as low/moderate/high strings).
fn count_risks(payload: &Value) -> (usize, usize) {
    match payload.get("risk_assessment").and_then(Value::as_object) {
        Some(map) => map
            .iter()
            .filter(|(key, _)| key.ends_with("_risk"))
            .fold((0, 0), |(high, moderate), (_, value)| {
                match value.as_str() {
                    Some("high") => (high + 1, moderate),
                    Some("moderate") => (high, moderate + 1),
                    _ => (high, moderate),
                }
            }),
        None => (0, 0),
    }
}

/// Message of the highest-priority entry in the payload's
/// recommendations array, when one exists.
fn top_recommendation(payload: &Value) -> Option<String> {
    let items = payload.get("recommendations").and_then(Value::as_array)?;
    items
        .iter()
        .min_by_key(|item| {
            match item.get("priority").and_then(Value::as_str) {
                Some("high") => 0,
                Some("medium") => 1,
                _ => 2,
            }
        })
        .and_then(|item| item.get("message"))
        .and_then(Value::as_str)
        .map(str::to_owned)
}

/// Requested delay for an insight reminder handed to the external
/// notification scheduler. The pipeline computes only the target
/// instant, never the OS-level notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderDelay {
    OneHour,
    OneDay,
    OneWeek,
}

impl ReminderDelay {
    pub fn duration(self) -> Duration {
        match self {
            ReminderDelay::OneHour => Duration::hours(1),
            ReminderDelay::OneDay => Duration::days(1),
            ReminderDelay::OneWeek => Duration::weeks(1),
        }
    }

    /// The instant the reminder should fire, relative to `now`.
    pub fn fire_at(self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + self.duration()
    }
}
