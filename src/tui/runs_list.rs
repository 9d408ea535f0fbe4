use crate::app::{AppState, FocusContext, ListStatus};
use crate::format;
use crate::model::{Run, RunStatus};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

pub const LOADING: &str = "Loading runs...";
pub const FAILED: &str = "Failed to load runs";
pub const EMPTY: &str = "No runs found";

const CHANGES_WIDTH: usize = 12;
const DURATION_WIDTH: usize = 8;
const TIMESTAMP_WIDTH: usize = 17;
/// Narrower lists drop the timestamp column.
const TIMESTAMP_MIN_WIDTH: usize = 64;

pub fn render(f: &mut Frame, area: Rect, state: &AppState) {
    let focused = state.focus == FocusContext::RunsList;
    let block = Block::default()
        .title(format!(" Runs ({}) ", state.runs.len()))
        .borders(Borders::RIGHT)
        .border_style(Style::default().fg(if focused { Color::Cyan } else { Color::DarkGray }));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if let Some(msg) = placeholder(state) {
        let style = if matches!(state.list_status, ListStatus::Failed(_)) {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        f.render_widget(Paragraph::new(format!(" {msg}")).style(style), inner);
        return;
    }

    let width = inner.width as usize;
    let narrow = width < TIMESTAMP_MIN_WIDTH;
    let visible_height = inner.height as usize;
    let selected = state.selected_index();
    let cursor = selected.unwrap_or(0);
    let scroll_offset = if cursor >= visible_height {
        cursor - visible_height + 1
    } else {
        0
    };

    let lines: Vec<Line> = state
        .runs
        .iter()
        .enumerate()
        .skip(scroll_offset)
        .take(visible_height)
        .map(|(i, run)| run_line(run, selected == Some(i), narrow, width))
        .collect();

    f.render_widget(Paragraph::new(lines), inner);
}

/// Message shown instead of rows, if any. A failed or in-flight reload
/// only replaces rows that are not there yet.
pub fn placeholder(state: &AppState) -> Option<&'static str> {
    match &state.list_status {
        ListStatus::Failed(_) => Some(FAILED),
        ListStatus::Loading if state.runs.all().is_empty() => Some(LOADING),
        _ if state.runs.is_empty() => Some(EMPTY),
        _ => None,
    }
}

pub fn status_icon(status: RunStatus) -> (&'static str, Color) {
    match status {
        RunStatus::Success => ("✓", Color::Green),
        RunStatus::Failed => ("✗", Color::Red),
        RunStatus::Running => ("⟳", Color::Yellow),
        RunStatus::Canceled => ("⊘", Color::Yellow),
        RunStatus::Unknown => ("·", Color::DarkGray),
    }
}

fn run_line(run: &Run, is_selected: bool, narrow: bool, width: usize) -> Line<'static> {
    let (icon, icon_color) = status_icon(run.status);
    let changes = format::changes(run.changes.as_ref());
    let duration = format::duration(run.duration_ms);
    let badge = format::sync_badge(run.sync_status).map_or(" ", |(glyph, _)| glyph);

    // icon + spaces + badge
    let mut fixed = 2 + 2 + CHANGES_WIDTH + DURATION_WIDTH;
    if !narrow {
        fixed += TIMESTAMP_WIDTH;
    }
    let name_width = width.saturating_sub(fixed).max(8);
    let name = format::truncate(&run.workspace, name_width);

    let base = if is_selected {
        Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let mut spans = vec![
        Span::styled(format!("{icon} "), base.fg(icon_color)),
        Span::styled(format!("{name:<name_width$}"), base.fg(Color::White)),
        Span::styled(format!("{changes:>CHANGES_WIDTH$}"), base.fg(Color::Magenta)),
        Span::styled(format!("{duration:>DURATION_WIDTH$}"), base.fg(Color::Gray)),
    ];
    if !narrow {
        spans.push(Span::styled(
            format!("{:>TIMESTAMP_WIDTH$}", format::timestamp(run.timestamp)),
            base.fg(Color::DarkGray),
        ));
    }
    spans.push(Span::styled(format!(" {badge}"), base.fg(Color::Cyan)));
    Line::from(spans)
}
