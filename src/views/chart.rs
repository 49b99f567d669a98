//! Trend chart
//!
//! Renders the trend series as a one-line sparkline. The vertical domain is
//! padded by 20 mg/dL on both sides so small swings do not fill the range.

use crate::stats::TrendPoint;

const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Domain padding in mg/dL
const PADDING: f64 = 20.0;

/// Sparkline for a series of values
pub fn sparkline(values: &[f64]) -> String {
    let Some(min) = values.iter().copied().reduce(f64::min) else {
        return String::new();
    };
    let max = values.iter().copied().fold(min, f64::max);

    let lo = min - PADDING;
    let span = (max + PADDING) - lo;

    values
        .iter()
        .map(|v| {
            let level = ((v - lo) / span * (BARS.len() - 1) as f64).round() as usize;
            BARS[level.min(BARS.len() - 1)]
        })
        .collect()
}

/// Trend block for the dashboard: last `max_points` points, oldest first
pub fn render_trend(points: &[TrendPoint], max_points: usize) -> String {
    let start = points.len().saturating_sub(max_points);
    let recent: Vec<f64> = points[start..].iter().map(|p| p.value).collect();

    if recent.is_empty() {
        return String::new();
    }

    let min = recent.iter().copied().fold(f64::INFINITY, f64::min);
    let max = recent.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let mut out = String::new();
    out.push_str(&format!("Trend (last {})\n", recent.len()));
    out.push_str(&format!("  {}\n", sparkline(&recent)));
    out.push_str(&format!(
        "  min {}  max {}\n",
        super::format_value(min),
        super::format_value(max)
    ));
    out
}
