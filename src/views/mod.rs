//! Terminal views
//!
//! The three navigation targets of the app, rendered as plain text:
//!
//! - **dashboard**: latest reading, trend chart, daily statistics
//! - **add**: the new-reading form and its confirmation
//! - **history**: every reading, newest first, with ids for deletion
//!
//! Views only read the reading slice; mutations go through the store.

pub mod add;
pub mod chart;
pub mod dashboard;
pub mod history;

use crate::config::DisplayConfig;
use crate::storage::{ChangeKind, Reading, StoreEvent};
use chrono::Local;

/// Printed to stderr whenever a change did not reach storage
pub const UNSAVED_WARNING: &str = "Warning: changes may not be saved";

/// The warning to show for `event`, if its write failed
pub fn durability_warning(event: &StoreEvent) -> Option<&'static str> {
    (!event.durable).then_some(UNSAVED_WARNING)
}

/// Navigation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Dashboard,
    Add,
    History,
}

impl View {
    /// Where to navigate after a store change
    pub fn after(change: &ChangeKind) -> View {
        match change {
            ChangeKind::Added(_) | ChangeKind::Seeded(_) => View::Dashboard,
            ChangeKind::Deleted(_) => View::History,
        }
    }
}

/// Render `view` in the local time zone
pub fn render(view: View, readings: &[Reading], display: &DisplayConfig) -> String {
    match view {
        View::Dashboard => dashboard::render(readings, display, &Local),
        View::Add => add::render_form(),
        View::History => history::render(readings, display, &Local, None),
    }
}

/// Whole numbers without decimals, everything else with one
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e9 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{
        KeyValueStore, MealContext, ReadingId, ReadingStore, StorageError, StorageResult,
    };
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Backend that has nothing stored and refuses every write
    pub(super) struct FullDisk;

    impl KeyValueStore for FullDisk {
        fn get(&self, _key: &str) -> StorageResult<Option<String>> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
            Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "no space left on device",
            )))
        }
    }

    #[test]
    fn test_warning_covers_seed_and_add() {
        let mut store = ReadingStore::open(FullDisk);
        let warnings = Rc::new(RefCell::new(Vec::new()));
        let sink = warnings.clone();
        store.subscribe(move |event: &StoreEvent, _: &[Reading]| {
            if let Some(warning) = durability_warning(event) {
                sink.borrow_mut().push((event.kind.clone(), warning));
            }
        });

        let seeded = store.seed_if_empty().len();
        store.add(101.0, MealContext::Fasting, None).unwrap();

        let warnings = warnings.borrow();
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0], (ChangeKind::Seeded(seeded), UNSAVED_WARNING));
        assert!(matches!(warnings[1].0, ChangeKind::Added(_)));
    }

    #[test]
    fn test_no_warning_for_durable_change() {
        let event = StoreEvent {
            kind: ChangeKind::Seeded(6),
            durable: true,
        };
        assert_eq!(durability_warning(&event), None);
    }

    #[test]
    fn test_navigation_after_change() {
        assert_eq!(View::after(&ChangeKind::Added(ReadingId::from("a"))), View::Dashboard);
        assert_eq!(View::after(&ChangeKind::Deleted(ReadingId::from("a"))), View::History);
        assert_eq!(View::after(&ChangeKind::Seeded(3)), View::Dashboard);
        assert_eq!(View::default(), View::Dashboard);
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(120.0), "120");
        assert_eq!(format_value(98.6), "98.6");
        assert_eq!(format_value(-5.0), "-5");
    }

    #[test]
    fn test_render_dispatch() {
        let display = DisplayConfig::default();
        assert!(render(View::Add, &[], &display).contains("New reading"));
        assert!(render(View::History, &[], &display).contains("No readings"));
        assert!(render(View::Dashboard, &[], &display).contains("No readings"));
    }
}
