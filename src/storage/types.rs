//! Core data types for the glucose reading store
//!
//! This module defines the fundamental types used throughout the storage layer:
//! - `Reading`: A single blood-glucose measurement
//! - `ReadingId`: Opaque identifier assigned by the store
//! - `MealContext`: When the reading was taken relative to meals or sleep
//!
//! Readings are only built by the store (on add or seeding) or by
//! deserializing a persisted snapshot, so there is no public constructor.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque identifier of a reading
///
/// New readings get a UUID v4; any string is accepted from persisted data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReadingId(String);

impl ReadingId {
    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First characters of the id, used for compact display
    pub fn short(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(8)
            .map(|(idx, _)| idx)
            .unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl fmt::Display for ReadingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ReadingId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ReadingId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for ReadingId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// When a reading was taken relative to eating or sleeping
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MealContext {
    /// Before the first meal of the day
    Fasting,
    /// Shortly before a meal
    BeforeMeal,
    /// After a meal
    AfterMeal,
    /// Before going to sleep
    Bedtime,
    /// Anything else
    #[default]
    Other,
}

impl MealContext {
    /// Get all meal contexts for iteration
    pub fn all() -> &'static [MealContext] {
        &[
            MealContext::Fasting,
            MealContext::BeforeMeal,
            MealContext::AfterMeal,
            MealContext::Bedtime,
            MealContext::Other,
        ]
    }

    /// Persisted key (snake_case)
    pub fn key(&self) -> &'static str {
        match self {
            MealContext::Fasting => "fasting",
            MealContext::BeforeMeal => "before_meal",
            MealContext::AfterMeal => "after_meal",
            MealContext::Bedtime => "bedtime",
            MealContext::Other => "other",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            MealContext::Fasting => "Fasting",
            MealContext::BeforeMeal => "Before meal",
            MealContext::AfterMeal => "After meal",
            MealContext::Bedtime => "Bedtime",
            MealContext::Other => "Other",
        }
    }
}

impl fmt::Display for MealContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Unrecognized meal context string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown meal context {0:?} (expected one of: fasting, before_meal, after_meal, bedtime, other)")]
pub struct UnknownMealContext(pub String);

impl FromStr for MealContext {
    type Err = UnknownMealContext;

    /// Accepts the snake_case keys (case-insensitive, `-` or `_`) and the
    /// display labels written by older builds of the app.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let normalized = trimmed.to_lowercase().replace(['-', ' '], "_");

        let context = match normalized.as_str() {
            "fasting" | "jejum" => MealContext::Fasting,
            "before_meal" | "pre_meal" | "pré_refeição" => MealContext::BeforeMeal,
            "after_meal" | "post_meal" | "pós_refeição" => MealContext::AfterMeal,
            "bedtime" | "ao_dormir" => MealContext::Bedtime,
            "other" | "outro" => MealContext::Other,
            _ => return Err(UnknownMealContext(trimmed.to_string())),
        };
        Ok(context)
    }
}

impl<'de> Deserialize<'de> for MealContext {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or_else(|err: UnknownMealContext| {
            tracing::warn!(value = %err.0, "Unknown meal context in stored data, using 'other'");
            MealContext::Other
        }))
    }
}

/// A single blood-glucose measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredReading")]
pub struct Reading {
    id: ReadingId,
    /// mg/dL
    value: f64,
    #[serde(serialize_with = "serialize_timestamp")]
    timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    meal_context: MealContext,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<String>,
}

impl Reading {
    pub(crate) fn new(
        id: ReadingId,
        value: f64,
        timestamp: DateTime<Utc>,
        meal_context: MealContext,
        note: Option<String>,
    ) -> Self {
        Self {
            id,
            value,
            // Stored at millisecond precision; keep memory identical to disk
            timestamp: timestamp.trunc_subsecs(3),
            meal_context,
            note: normalize_note(note),
        }
    }

    pub fn id(&self) -> &ReadingId {
        &self.id
    }

    /// Measured value in mg/dL
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn meal_context(&self) -> MealContext {
        self.meal_context
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }
}

/// Blank notes are treated as absent
fn normalize_note(note: Option<String>) -> Option<String> {
    note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}

fn serialize_timestamp<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Persisted shape of a reading, tolerant of older field names and formats
#[derive(Deserialize)]
struct StoredReading {
    id: ReadingId,
    value: f64,
    timestamp: StoredTimestamp,
    #[serde(rename = "type", alias = "mealContext", alias = "mealTime", default)]
    meal_context: MealContext,
    #[serde(default, alias = "notes")]
    note: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredTimestamp {
    Iso(DateTime<Utc>),
    Millis(i64),
}

impl TryFrom<StoredReading> for Reading {
    type Error = String;

    fn try_from(stored: StoredReading) -> Result<Self, Self::Error> {
        let timestamp = match stored.timestamp {
            StoredTimestamp::Iso(ts) => ts,
            StoredTimestamp::Millis(ms) => DateTime::from_timestamp_millis(ms)
                .ok_or_else(|| format!("timestamp out of range: {}", ms))?,
        };

        Ok(Reading::new(
            stored.id,
            stored.value,
            timestamp,
            stored.meal_context,
            stored.note,
        ))
    }
}
