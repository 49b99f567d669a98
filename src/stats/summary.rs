//! Whole-collection summaries for the dashboard
//!
//! - `summarize`: count/average/min/max over all readings
//! - `Thresholds`: low/high cut-offs used to color-code values
//! - `trend_series`: oldest-first points for the trend chart

use crate::stats::daily::Accumulator;
use crate::storage::Reading;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default lower bound of the target range (mg/dL)
pub const DEFAULT_LOW_THRESHOLD: f64 = 70.0;

/// Default upper bound of the target range (mg/dL)
pub const DEFAULT_HIGH_THRESHOLD: f64 = 140.0;

/// Summary over a set of readings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub average: f64,
    pub min: f64,
    pub max: f64,
}

/// Summarize readings, None when there are none
pub fn summarize(readings: &[Reading]) -> Option<Summary> {
    let mut acc = Accumulator::default();
    for reading in readings {
        acc.push(reading.value());
    }

    Some(Summary {
        average: acc.average()?,
        count: acc.count,
        min: acc.min,
        max: acc.max,
    })
}

/// Where a value falls relative to the target range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GlucoseStatus {
    Low,
    InRange,
    High,
}

impl GlucoseStatus {
    pub fn label(&self) -> &'static str {
        match self {
            GlucoseStatus::Low => "low",
            GlucoseStatus::InRange => "in range",
            GlucoseStatus::High => "high",
        }
    }
}

/// Target range cut-offs. Purely cosmetic: values outside are never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Values below this are low
    pub low: f64,
    /// Values above this are high
    pub high: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            low: DEFAULT_LOW_THRESHOLD,
            high: DEFAULT_HIGH_THRESHOLD,
        }
    }
}

impl Thresholds {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn classify(&self, value: f64) -> GlucoseStatus {
        if value < self.low {
            GlucoseStatus::Low
        } else if value > self.high {
            GlucoseStatus::High
        } else {
            GlucoseStatus::InRange
        }
    }

    /// Count readings per status
    pub fn breakdown(&self, readings: &[Reading]) -> RangeBreakdown {
        let mut breakdown = RangeBreakdown::default();
        for reading in readings {
            match self.classify(reading.value()) {
                GlucoseStatus::Low => breakdown.low += 1,
                GlucoseStatus::InRange => breakdown.in_range += 1,
                GlucoseStatus::High => breakdown.high += 1,
            }
        }
        breakdown
    }
}

/// Number of readings below, inside and above the target range
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RangeBreakdown {
    pub low: usize,
    pub in_range: usize,
    pub high: usize,
}

impl RangeBreakdown {
    pub fn total(&self) -> usize {
        self.low + self.in_range + self.high
    }

    /// Share of readings inside the target range, in percent
    pub fn in_range_percent(&self) -> Option<f64> {
        match self.total() {
            0 => None,
            total => Some(self.in_range as f64 * 100.0 / total as f64),
        }
    }
}

/// One point of the trend chart
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Chart series, oldest first (the reverse of the store's order)
pub fn trend_series(readings: &[Reading]) -> Vec<TrendPoint> {
    readings
        .iter()
        .rev()
        .map(|r| TrendPoint {
            timestamp: r.timestamp(),
            value: r.value(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MealContext, ReadingId};
    use chrono::{Duration, TimeZone};

    fn readings(values: &[f64]) -> Vec<Reading> {
        // Newest first, one hour apart
        let newest = Utc.with_ymd_and_hms(2024, 4, 2, 12, 0, 0).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                Reading::new(
                    ReadingId::generate(),
                    v,
                    newest - Duration::hours(i as i64),
                    MealContext::Other,
                    None,
                )
            })
            .collect()
    }

    #[test]
    fn test_summarize() {
        let summary = summarize(&readings(&[120.0, 80.0, 160.0])).unwrap();
        assert_eq!(summary.count, 3);
        assert_eq!(summary.average, 120.0);
        assert_eq!(summary.min, 80.0);
        assert_eq!(summary.max, 160.0);

        assert_eq!(summarize(&[]), None);
    }

    #[test]
    fn test_classify_boundaries() {
        let t = Thresholds::default();
        assert_eq!(t.classify(69.9), GlucoseStatus::Low);
        assert_eq!(t.classify(70.0), GlucoseStatus::InRange);
        assert_eq!(t.classify(140.0), GlucoseStatus::InRange);
        assert_eq!(t.classify(140.1), GlucoseStatus::High);

        let custom = Thresholds::new(80.0, 180.0);
        assert_eq!(custom.classify(75.0), GlucoseStatus::Low);
        assert_eq!(custom.classify(170.0), GlucoseStatus::InRange);
    }

    #[test]
    fn test_breakdown() {
        let b = Thresholds::default().breakdown(&readings(&[50.0, 100.0, 110.0, 200.0]));
        assert_eq!(
            b,
            RangeBreakdown {
                low: 1,
                in_range: 2,
                high: 1
            }
        );
        assert_eq!(b.in_range_percent(), Some(50.0));
        assert_eq!(RangeBreakdown::default().in_range_percent(), None);
    }

    #[test]
    fn test_trend_series_is_oldest_first() {
        let series = trend_series(&readings(&[3.0, 2.0, 1.0]));
        let values: Vec<f64> = series.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
        assert!(series[0].timestamp < series[2].timestamp);
    }
}
