//! First-run example data

use crate::storage::types::{MealContext, Reading, ReadingId};
use chrono::{DateTime, Duration, Utc};

/// (hours before now, mg/dL, meal context, note), newest first
const SEED: &[(i64, f64, MealContext, Option<&str>)] = &[
    (2, 128.0, MealContext::AfterMeal, Some("Lunch")),
    (6, 95.0, MealContext::Fasting, None),
    (26, 142.0, MealContext::Bedtime, None),
    (30, 165.0, MealContext::AfterMeal, Some("Pasta dinner")),
    (50, 88.0, MealContext::BeforeMeal, None),
    (54, 102.0, MealContext::Fasting, Some("After morning walk")),
];

/// Build the seed set relative to `now`, newest first
pub(crate) fn seed_readings(now: DateTime<Utc>) -> Vec<Reading> {
    SEED.iter()
        .map(|&(hours_ago, value, context, note)| {
            Reading::new(
                ReadingId::generate(),
                value,
                now - Duration::hours(hours_ago),
                context,
                note.map(str::to_string),
            )
        })
        .collect()
}
