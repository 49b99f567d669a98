//! Per-day aggregation
//!
//! Groups readings by calendar date and computes average, min, max and count
//! for each date. Output is sorted by ascending date.

use crate::storage::Reading;
use chrono::{NaiveDate, TimeZone, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Summary statistics for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyStat {
    pub date: NaiveDate,
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

/// Running count/sum/min/max over a stream of values
#[derive(Debug, Clone, Copy)]
pub(crate) struct Accumulator {
    pub count: usize,
    pub sum: f64,
    pub min: f64,
    pub max: f64,
}

impl Default for Accumulator {
    fn default() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl Accumulator {
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    /// Mean of the pushed values, None if nothing was pushed
    pub fn average(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}

/// Aggregate readings per UTC calendar date
pub fn aggregate_by_day(readings: &[Reading]) -> Vec<DailyStat> {
    aggregate_by_day_in(readings, &Utc)
}

/// Aggregate readings per calendar date as observed in `tz`
pub fn aggregate_by_day_in<Tz: TimeZone>(readings: &[Reading], tz: &Tz) -> Vec<DailyStat> {
    let mut days: BTreeMap<NaiveDate, Accumulator> = BTreeMap::new();

    for reading in readings {
        let date = reading.timestamp().with_timezone(tz).date_naive();
        days.entry(date).or_default().push(reading.value());
    }

    days.into_iter()
        .filter_map(|(date, acc)| {
            Some(DailyStat {
                date,
                average: acc.average()?,
                min: acc.min,
                max: acc.max,
                count: acc.count,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MealContext, ReadingId};
    use chrono::{DateTime, FixedOffset};

    fn reading(value: f64, ts: &str) -> Reading {
        let timestamp: DateTime<Utc> = ts.parse().unwrap();
        Reading::new(ReadingId::generate(), value, timestamp, MealContext::Other, None)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_two_days() {
        let readings = vec![
            reading(100.0, "2024-03-01T08:00:00Z"),
            reading(200.0, "2024-03-01T20:00:00Z"),
            reading(50.0, "2024-03-02T07:00:00Z"),
        ];

        let stats = aggregate_by_day(&readings);

        assert_eq!(
            stats,
            vec![
                DailyStat {
                    date: date(2024, 3, 1),
                    average: 150.0,
                    min: 100.0,
                    max: 200.0,
                    count: 2,
                },
                DailyStat {
                    date: date(2024, 3, 2),
                    average: 50.0,
                    min: 50.0,
                    max: 50.0,
                    count: 1,
                },
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate_by_day(&[]).is_empty());
    }

    #[test]
    fn test_output_sorted_ascending_for_newest_first_input() {
        let readings = vec![
            reading(90.0, "2024-03-05T08:00:00Z"),
            reading(110.0, "2024-03-03T08:00:00Z"),
            reading(130.0, "2024-03-04T08:00:00Z"),
        ];

        let dates: Vec<NaiveDate> = aggregate_by_day(&readings).iter().map(|s| s.date).collect();
        assert_eq!(dates, vec![date(2024, 3, 3), date(2024, 3, 4), date(2024, 3, 5)]);
    }

    #[test]
    fn test_grouping_follows_timezone() {
        // 01:30 UTC on the 2nd is still the 1st in UTC-3
        let readings = vec![
            reading(100.0, "2024-03-01T20:00:00Z"),
            reading(140.0, "2024-03-02T01:30:00Z"),
        ];

        assert_eq!(aggregate_by_day(&readings).len(), 2);

        let brt = FixedOffset::west_opt(3 * 3600).unwrap();
        let local = aggregate_by_day_in(&readings, &brt);
        assert_eq!(local.len(), 1);
        assert_eq!(local[0].date, date(2024, 3, 1));
        assert_eq!(local[0].average, 120.0);
        assert_eq!(local[0].count, 2);
    }

    #[test]
    fn test_deterministic() {
        let readings = vec![
            reading(101.0, "2024-03-01T08:00:00Z"),
            reading(99.0, "2024-03-01T09:00:00Z"),
        ];
        assert_eq!(aggregate_by_day(&readings), aggregate_by_day(&readings));
    }

    #[test]
    fn test_accumulator() {
        let mut acc = Accumulator::default();
        assert_eq!(acc.average(), None);

        for v in [3.0, 1.0, 2.0] {
            acc.push(v);
        }
        assert_eq!(acc.count, 3);
        assert_eq!(acc.average(), Some(2.0));
        assert_eq!(acc.min, 1.0);
        assert_eq!(acc.max, 3.0);
    }
}
