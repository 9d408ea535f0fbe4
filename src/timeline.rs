//! Gantt-style layout for a run's resource events.
//!
//! Bars are placed in percent of the chart width so the layout does not
//! depend on the terminal size; [`bar_columns`] maps them onto cells.

use crate::model::{Resource, ResourceAction};

/// Narrowest bar, in percent of the span, so short events stay visible.
pub const MIN_BAR_PCT: f64 = 0.5;

const TICK_INTERVALS_SECS: &[f64] = &[1.0, 2.0, 5.0, 10.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0];

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineBar {
    pub address: String,
    pub action: ResourceAction,
    pub duration_ms: u64,
    pub left_pct: f64,
    pub width_pct: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TimelineLayout {
    NoResources,
    NoTimingData,
    Chart { span_ms: u64, bars: Vec<TimelineBar> },
}

/// Only events with both a positive duration and a start time take part.
/// Rows keep the order of `resources`; time is encoded by position alone.
pub fn layout(resources: &[Resource]) -> TimelineLayout {
    if resources.is_empty() {
        return TimelineLayout::NoResources;
    }

    let timed: Vec<(&Resource, i64, u64)> = resources
        .iter()
        .filter_map(|r| {
            let duration = r.duration_ms.filter(|&d| d > 0)?;
            let start = r.start_time?.timestamp_millis();
            Some((r, start, duration))
        })
        .collect();

    let Some(min_start) = timed.iter().map(|&(_, start, _)| start).min() else {
        return TimelineLayout::NoTimingData;
    };
    let max_end = timed
        .iter()
        .map(|&(_, start, duration)| start.saturating_add(duration as i64))
        .max()
        .unwrap_or(min_start);
    let span_ms = (max_end - min_start).max(1) as u64;
    let span = span_ms as f64;

    let bars = timed
        .into_iter()
        .map(|(r, start, duration)| {
            let left_pct = (start - min_start) as f64 / span * 100.0;
            // max/min rather than clamp: the upper bound can fall below MIN_BAR_PCT
            let width_pct = (duration as f64 / span * 100.0)
                .max(MIN_BAR_PCT)
                .min(100.0 - left_pct);
            TimelineBar {
                address: r.address.clone(),
                action: r.action,
                duration_ms: duration,
                left_pct,
                width_pct,
            }
        })
        .collect();

    TimelineLayout::Chart { span_ms, bars }
}

/// Intermediate axis ticks in milliseconds, none past 90% of the span.
pub fn ticks(span_ms: u64, bar_width: u16) -> Vec<u64> {
    let total_secs = span_ms as f64 / 1000.0;
    if total_secs <= 0.0 {
        return Vec::new();
    }
    let target = f64::from((bar_width / 15).max(2));
    let interval = TICK_INTERVALS_SECS
        .iter()
        .copied()
        .find(|iv| total_secs / iv <= target)
        .unwrap_or(total_secs / target);

    let mut out = Vec::new();
    let mut t = interval;
    while t < total_secs * 0.9 {
        out.push((t * 1000.0).round() as u64);
        t += interval;
    }
    out
}

/// Maps a bar onto `width` cells as `(offset, length)`; every bar gets at
/// least one cell when there is room.
pub fn bar_columns(bar: &TimelineBar, width: u16) -> (u16, u16) {
    if width == 0 {
        return (0, 0);
    }
    let w = f64::from(width);
    let start = ((bar.left_pct / 100.0 * w).floor() as u16).min(width - 1);
    let len = ((bar.width_pct / 100.0 * w).round() as u16).max(1);
    (start, len.min(width - start))
}
