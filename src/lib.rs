//! # Glucose Log
//!
//! Personal blood-glucose tracking with local persistence.
//!
//! ## Modules
//!
//! - [`storage`]: Reading store and its key-value persistence
//! - [`stats`]: Per-day statistics, summaries and trend series
//! - [`views`]: Terminal rendering of the dashboard, add form and history
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust
//! use glucose_log::storage::{MealContext, MemoryStore, ReadingStore};
//! use glucose_log::stats::aggregate_by_day;
//!
//! let mut store = ReadingStore::open(MemoryStore::new());
//! store.add(104.0, MealContext::Fasting, None).unwrap();
//! store.add(151.0, MealContext::AfterMeal, Some("pasta".into())).unwrap();
//!
//! assert_eq!(store.latest().map(|r| r.value()), Some(151.0));
//!
//! let days = aggregate_by_day(store.list());
//! assert_eq!(days.iter().map(|d| d.count).sum::<usize>(), 2);
//! ```

pub mod config;
pub mod stats;
pub mod storage;
pub mod views;

// Re-export top-level types for convenience
pub use storage::{
    ChangeKind, FileStore, KeyValueStore, MealContext, MemoryStore, PersistStatus, Reading,
    ReadingId, ReadingStore, StorageError, StorageResult, StoreEvent, StoreListener,
};

pub use stats::{aggregate_by_day, aggregate_by_day_in, summarize, DailyStat, Summary, Thresholds};

pub use config::{Config, ConfigError, ConfigSource, DisplayConfig, LoggingConfig, StorageConfig};

pub use views::View;
