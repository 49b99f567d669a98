//! Statistics over readings
//!
//! Pure functions; nothing here reads or writes the store.
//!
//! - **daily**: per-calendar-day average/min/max/count
//! - **summary**: overall summary, target-range classification, trend series

pub mod daily;
pub mod summary;

pub use daily::{aggregate_by_day, aggregate_by_day_in, DailyStat};
pub use summary::{
    summarize, trend_series, GlucoseStatus, RangeBreakdown, Summary, Thresholds, TrendPoint,
    DEFAULT_HIGH_THRESHOLD, DEFAULT_LOW_THRESHOLD,
};
