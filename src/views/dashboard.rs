//! Dashboard view
//!
//! Latest reading with its range status, the trend sparkline, the daily
//! statistics table for the most recent days and the time-in-range share.

use super::{chart, format_value};
use crate::config::DisplayConfig;
use crate::stats::{aggregate_by_day_in, trend_series, DailyStat};
use crate::storage::Reading;
use chrono::TimeZone;
use std::fmt::Display;

pub fn render<Tz>(readings: &[Reading], display: &DisplayConfig, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut out = String::from("Glucose Log\n===========\n\n");

    let Some(latest) = readings.first() else {
        out.push_str("No readings recorded yet.\n");
        out.push_str("Add one with: glucose-log add 110 --meal fasting\n");
        return out;
    };

    let thresholds = display.thresholds();

    out.push_str("Latest reading\n");
    out.push_str(&format!(
        "  {} mg/dL  ({})  {} · {}\n\n",
        format_value(latest.value()),
        thresholds.classify(latest.value()).label(),
        latest.meal_context().label(),
        latest.timestamp().with_timezone(tz).format("%H:%M %d/%m/%y"),
    ));

    let trend = chart::render_trend(&trend_series(readings), display.chart_points);
    if !trend.is_empty() {
        out.push_str(&trend);
        out.push('\n');
    }

    let days = aggregate_by_day_in(readings, tz);
    let start = days.len().saturating_sub(display.dashboard_days);
    out.push_str(&render_daily_table(&days[start..]));

    let breakdown = thresholds.breakdown(readings);
    if let Some(pct) = breakdown.in_range_percent() {
        out.push_str(&format!(
            "\nIn range: {}/{} ({:.1}%)  low: {}  high: {}\n",
            breakdown.in_range,
            breakdown.total(),
            pct,
            breakdown.low,
            breakdown.high
        ));
    }

    out
}

/// Daily statistics as a table, newest day first
pub fn render_daily_table(days: &[DailyStat]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<12} {:>7} {:>7} {:>7} {:>4}\n",
        "Date", "Avg", "Min", "Max", "N"
    ));
    out.push_str(&format!("{}\n", "-".repeat(41)));

    for day in days.iter().rev() {
        out.push_str(&format!(
            "{:<12} {:>7.1} {:>7} {:>7} {:>4}\n",
            day.date.format("%Y-%m-%d").to_string(),
            day.average,
            format_value(day.min),
            format_value(day.max),
            day.count
        ));
    }
    out
}
