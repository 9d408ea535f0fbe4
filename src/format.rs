use crate::model::{Changes, SyncStatus};
use chrono::{DateTime, Local, TimeZone, Utc};
use std::fmt::Display;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// `None` and zero render as `-`; otherwise whole minutes and seconds.
pub fn duration(ms: Option<u64>) -> String {
    let Some(ms) = ms.filter(|&ms| ms > 0) else {
        return "-".to_string();
    };
    let seconds = ms / 1000;
    let minutes = seconds / 60;
    if minutes > 0 {
        format!("{}m {}s", minutes, seconds % 60)
    } else {
        format!("{seconds}s")
    }
}

pub fn timestamp(ts: DateTime<Utc>) -> String {
    timestamp_in(ts, &Local)
}

pub fn timestamp_in<Tz>(ts: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    ts.with_timezone(tz).format("%b %-d, %I:%M %p").to_string()
}

pub fn changes(changes: Option<&Changes>) -> String {
    let Some(c) = changes else {
        return String::new();
    };
    let mut parts = Vec::new();
    if c.add > 0 {
        parts.push(format!("+{}", c.add));
    }
    if c.change > 0 {
        parts.push(format!("~{}", c.change));
    }
    if c.destroy > 0 {
        parts.push(format!("-{}", c.destroy));
    }
    if parts.is_empty() {
        "+0".to_string()
    } else {
        parts.join(" ")
    }
}

/// Glyph and tooltip-style description for a sync badge.
pub fn sync_badge(status: SyncStatus) -> Option<(&'static str, &'static str)> {
    match status {
        SyncStatus::Local => Some(("↑", "Local only (not synced to S3)")),
        SyncStatus::Remote => Some(("↓", "Remote only (not downloaded)")),
        SyncStatus::Synced => Some(("✓", "Synced")),
        SyncStatus::None => None,
    }
}

pub fn truncate(s: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for c in s.chars() {
        let cw = UnicodeWidthChar::width(c).unwrap_or(0);
        if width + cw + 1 > max_width {
            break;
        }
        result.push(c);
        width += cw;
    }
    result.push('…');
    result
}
