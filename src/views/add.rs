//! New-reading form and confirmation

use crate::stats::Thresholds;
use crate::storage::{MealContext, PersistStatus, Reading};
use chrono::TimeZone;
use std::fmt::Display;

/// Usage form shown when `add` is called without a value
pub fn render_form() -> String {
    let mut out = String::from("New reading\n===========\n\n");
    out.push_str("  glucose-log add <mg/dL> [--meal <context>] [--note <text>]\n\n");
    out.push_str("Meal contexts:\n");
    for context in MealContext::all() {
        out.push_str(&format!("  {:<12} {}\n", context.key(), context.label()));
    }
    out
}

/// One-line confirmation after a reading was saved
pub fn render_saved<Tz>(reading: &Reading, thresholds: &Thresholds, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!(
        "Saved {} mg/dL ({}, {}) at {} [{}]\n",
        super::format_value(reading.value()),
        reading.meal_context().label(),
        thresholds.classify(reading.value()).label(),
        reading.timestamp().with_timezone(tz).format("%H:%M %d/%m/%y"),
        reading.id().short()
    )
}

/// Machine-readable confirmation: the reading plus whether it reached storage
pub fn saved_json(reading: &Reading, status: &PersistStatus) -> serde_json::Value {
    serde_json::json!({
        "reading": reading,
        "durable": status.is_durable(),
    })
}
