//! Field-presence validation for incoming conversation candidates

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::conversation::{Conversation, Emotion};

/// Top-level fields every conversation must carry, checked in this order
pub const REQUIRED_FIELDS: &[&str] = &[
    "id",
    "childId",
    "startedAt",
    "endedAt",
    "durationSeconds",
    "summary",
    "topics",
    "dominantEmotion",
    "sentimentScore",
    "conversationInsight",
    "learningInsight",
    "socialInsight",
    "wellbeingInsight",
];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("conversation must be a JSON object")]
    NotAnObject,

    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("invalid field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("malformed conversation: {0}")]
    Malformed(String),
}

/// Validate a candidate record and decode it into a [`Conversation`].
///
/// Validation never touches storage; a record either passes every check or is
/// rejected whole.
pub fn validate_conversation(candidate: &Value) -> Result<Conversation, ValidationError> {
    let obj = candidate.as_object().ok_or(ValidationError::NotAnObject)?;

    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| is_missing(obj, field))
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }

    let (duration, sentiment) = check_fields(obj)?;

    // Whole-number floats such as 300.0 decode as integers
    let mut record = candidate.clone();
    record["durationSeconds"] = Value::from(duration);
    record["sentimentScore"] = Value::from(sentiment);

    serde_json::from_value(record)
        .map_err(|e| ValidationError::Malformed(e.to_string()))
}

fn is_missing(obj: &Map<String, Value>, field: &str) -> bool {
    match obj.get(field) {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// A non-negative JSON number without a fractional part
fn whole_number(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    (f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f < u64::MAX as f64).then_some(f as u64)
}

/// Type and range checks; returns the normalized duration and sentiment
fn check_fields(obj: &Map<String, Value>) -> Result<(u64, u8), ValidationError> {
    let duration = whole_number(&obj["durationSeconds"]).ok_or_else(|| {
        invalid(
            "durationSeconds",
            "must be a non-negative whole number of seconds",
        )
    })?;

    let sentiment = match whole_number(&obj["sentimentScore"]) {
        Some(score) if score <= 100 => score as u8,
        _ => return Err(invalid("sentimentScore", "must be a whole number from 0 to 100")),
    };

    match obj["dominantEmotion"].as_str() {
        Some(label) if Emotion::parse(label).is_some() => {}
        Some(label) => return Err(invalid("dominantEmotion", format!("unknown emotion {label:?}"))),
        None => return Err(invalid("dominantEmotion", "must be a string")),
    }

    if !obj["topics"].is_array() {
        return Err(invalid("topics", "must be a list of strings"));
    }

    let started = timestamp(obj, "startedAt")?;
    let ended = timestamp(obj, "endedAt")?;
    if ended < started {
        return Err(invalid("endedAt", "must not precede startedAt"));
    }

    for field in [
        "conversationInsight",
        "learningInsight",
        "socialInsight",
        "wellbeingInsight",
    ] {
        if !obj[field].is_object() {
            return Err(invalid(field, "must be an object"));
        }
    }

    if let Some(timeline) = obj.get("emotionTimeline").and_then(Value::as_array) {
        let offsets: Vec<u64> = timeline
            .iter()
            .filter_map(|p| p.get("secondOffset").and_then(Value::as_u64))
            .collect();
        if offsets.windows(2).any(|w| w[1] < w[0]) {
            return Err(invalid("emotionTimeline", "offsets must be non-decreasing"));
        }
    }

    Ok((duration, sentiment))
}

fn timestamp(obj: &Map<String, Value>, field: &'static str) -> Result<DateTime<Utc>, ValidationError> {
    let raw = obj[field]
        .as_str()
        .ok_or_else(|| invalid(field, "must be an ISO 8601 timestamp string"))?;
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| invalid(field, format!("{raw:?}: {e}")))
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ValidationError {
    ValidationError::InvalidField {
        field,
        reason: reason.into(),
    }
}
