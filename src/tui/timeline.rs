use crate::format;
use crate::model::ResourceAction;
use crate::timeline::{self, TimelineBar};
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

const MAX_LABEL_WIDTH: usize = 32;

pub fn action_color(action: ResourceAction) -> Color {
    match action {
        ResourceAction::Create => Color::Green,
        ResourceAction::Destroy => Color::Red,
        ResourceAction::Update | ResourceAction::Other => Color::Yellow,
    }
}

pub fn render(f: &mut Frame, area: Rect, span_ms: u64, bars: &[TimelineBar], scroll: u16) {
    let label_width = bars
        .iter()
        .map(|b| UnicodeWidthStr::width(b.address.as_str()))
        .max()
        .unwrap_or(0)
        .min(MAX_LABEL_WIDTH)
        .min(area.width as usize / 3);
    let bar_width = (area.width as usize).saturating_sub(label_width + 1) as u16;

    let mut lines = vec![Line::from(vec![
        Span::raw(" ".repeat(label_width + 1)),
        Span::styled(axis_line(span_ms, bar_width), Style::default().fg(Color::DarkGray)),
    ])];

    for bar in bars.iter().skip(scroll as usize) {
        let (offset, len) = timeline::bar_columns(bar, bar_width);
        let label = format::truncate(&bar.address, label_width);
        lines.push(Line::from(vec![
            Span::styled(format!("{label:<label_width$} "), Style::default().fg(Color::White)),
            Span::raw(" ".repeat(offset as usize)),
            Span::styled(
                "█".repeat(len as usize),
                Style::default().fg(action_color(bar.action)),
            ),
            Span::styled(
                format!(" {}", format::duration(Some(bar.duration_ms))),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
    }

    f.render_widget(Paragraph::new(lines), area);
}

/// `0s`, the intermediate ticks and the total span laid out over `width`
/// cells. Labels that would collide with an earlier one are dropped.
pub fn axis_line(span_ms: u64, width: u16) -> String {
    let width = width as usize;
    let mut cells = vec![' '; width];
    let total = format::duration(Some(span_ms));
    let total_len = total.chars().count();
    let total_pos = width.saturating_sub(total_len);

    let mut labels = vec![(0, "0s".to_string())];
    for tick in timeline::ticks(span_ms, width as u16) {
        let pos = (tick as f64 / span_ms as f64 * width as f64).round() as usize;
        labels.push((pos, format::duration(Some(tick))));
    }

    let mut next_free = 0;
    for (pos, label) in labels {
        let len = label.chars().count();
        if pos < next_free || pos + len >= total_pos {
            continue;
        }
        write_at(&mut cells, pos, &label);
        next_free = pos + len + 1;
    }
    if total_len <= width && total_pos >= next_free {
        write_at(&mut cells, total_pos, &total);
    }

    cells.into_iter().collect()
}

fn write_at(cells: &mut [char], pos: usize, label: &str) {
    for (cell, c) in cells.iter_mut().skip(pos).zip(label.chars()) {
        *cell = c;
    }
}
