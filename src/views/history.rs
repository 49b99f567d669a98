//! History view
//!
//! Every reading, newest first. The short id column is what `delete` takes.

use super::format_value;
use crate::config::DisplayConfig;
use crate::storage::{PersistStatus, Reading, ReadingId};
use chrono::TimeZone;
use std::fmt::Display;

pub fn render<Tz>(
    readings: &[Reading],
    display: &DisplayConfig,
    tz: &Tz,
    limit: Option<usize>,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut out = format!("History ({} readings)\n\n", readings.len());

    if readings.is_empty() {
        out.push_str("No readings recorded yet.\n");
        return out;
    }

    let thresholds = display.thresholds();

    out.push_str(&format!(
        "{:<9} {:<15} {:<12} {:>6}  {:<9} {}\n",
        "ID", "Time", "Context", "mg/dL", "Status", "Note"
    ));
    out.push_str(&format!("{}\n", "-".repeat(64)));

    let shown = limit.unwrap_or(readings.len());
    for reading in readings.iter().take(shown) {
        out.push_str(&format!(
            "{:<9} {:<15} {:<12} {:>6}  {:<9} {}\n",
            reading.id().short(),
            reading
                .timestamp()
                .with_timezone(tz)
                .format("%d/%m/%y %H:%M")
                .to_string(),
            reading.meal_context().label(),
            format_value(reading.value()),
            thresholds.classify(reading.value()).label(),
            reading.note().unwrap_or("")
        ));
    }

    if shown < readings.len() {
        out.push_str(&format!("... {} older readings\n", readings.len() - shown));
    }
    out
}

/// Reason an id prefix did not resolve to exactly one reading
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("no reading matches id {0:?}")]
    NotFound(String),

    #[error("id {prefix:?} is ambiguous ({matches} readings match)")]
    Ambiguous { prefix: String, matches: usize },
}

/// Resolve a full id or a unique prefix of one
pub fn resolve_id(readings: &[Reading], prefix: &str) -> Result<ReadingId, ResolveError> {
    let prefix = prefix.trim();
    if prefix.is_empty() {
        return Err(ResolveError::NotFound(prefix.to_string()));
    }

    if let Some(exact) = readings.iter().find(|r| r.id().as_str() == prefix) {
        return Ok(exact.id().clone());
    }

    let matches: Vec<&Reading> = readings
        .iter()
        .filter(|r| r.id().as_str().starts_with(prefix))
        .collect();

    match matches.as_slice() {
        [] => Err(ResolveError::NotFound(prefix.to_string())),
        [only] => Ok(only.id().clone()),
        many => Err(ResolveError::Ambiguous {
            prefix: prefix.to_string(),
            matches: many.len(),
        }),
    }
}

/// Machine-readable confirmation of a delete
pub fn deleted_json(id: &ReadingId, status: &PersistStatus) -> serde_json::Value {
    serde_json::json!({
        "deleted": id,
        "durable": status.is_durable(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MealContext, ReadingId as Id};
    use chrono::{DateTime, Utc};

    fn fixture() -> Vec<Reading> {
        let ts: DateTime<Utc> = "2024-03-01T12:30:00Z".parse().unwrap();
        vec![
            Reading::new(Id::from("aaaa1111-x"), 150.0, ts, MealContext::AfterMeal, Some("rice".into())),
            Reading::new(Id::from("aaaa2222-y"), 98.0, ts, MealContext::Fasting, None),
            Reading::new(Id::from("bbbb3333-z"), 65.5, ts, MealContext::Bedtime, None),
        ]
    }

    #[test]
    fn test_render_rows() {
        let out = render(&fixture(), &DisplayConfig::default(), &Utc, None);

        assert!(out.starts_with("History (3 readings)"));
        assert!(out.contains("aaaa1111"));
        assert!(out.contains("01/03/24 12:30"));
        assert!(out.contains("After meal"));
        assert!(out.contains("rice"));
        assert!(out.contains("65.5"));
        assert!(out.find("aaaa1111").unwrap() < out.find("bbbb3333").unwrap());
    }

    #[test]
    fn test_render_limit() {
        let out = render(&fixture(), &DisplayConfig::default(), &Utc, Some(1));
        assert!(out.contains("aaaa1111"));
        assert!(!out.contains("bbbb3333"));
        assert!(out.contains("... 2 older readings"));
    }

    #[test]
    fn test_render_empty() {
        let out = render(&[], &DisplayConfig::default(), &Utc, None);
        assert!(out.contains("No readings recorded yet."));
    }

    #[test]
    fn test_resolve_id() {
        let readings = fixture();

        assert_eq!(resolve_id(&readings, "bbbb").unwrap(), Id::from("bbbb3333-z"));
        assert_eq!(
            resolve_id(&readings, "aaaa1111-x").unwrap(),
            Id::from("aaaa1111-x")
        );
        assert_eq!(
            resolve_id(&readings, "aaaa"),
            Err(ResolveError::Ambiguous {
                prefix: "aaaa".to_string(),
                matches: 2
            })
        );
        assert!(matches!(resolve_id(&readings, "zzz"), Err(ResolveError::NotFound(_))));
        assert!(matches!(resolve_id(&readings, ""), Err(ResolveError::NotFound(_))));
    }

    #[test]
    fn test_deleted_json() {
        let id = Id::from("aaaa1111-x");

        let body = deleted_json(&id, &PersistStatus::Saved);
        assert_eq!(body, serde_json::json!({ "deleted": "aaaa1111-x", "durable": true }));

        let body = deleted_json(&id, &PersistStatus::Unsaved("disk full".into()));
        assert_eq!(body["durable"], false);
    }
}
