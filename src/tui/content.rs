use crate::app::AppState;
use crate::format;
use crate::model::{Resource, ResourceStatus};
use crate::tui::timeline;
use crate::view::{self, ContentView, DetailSection, View};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

pub fn render(f: &mut Frame, area: Rect, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // tabs
            Constraint::Min(1),    // body
        ])
        .split(area);

    render_tabs(f, chunks[0], state.view);

    let body = chunks[1];
    let scroll = state.content_scroll;
    match view::describe(state) {
        ContentView::Placeholder(msg) => {
            let para = Paragraph::new(format!(" {msg}")).style(Style::default().fg(Color::DarkGray));
            f.render_widget(para, body);
        }
        ContentView::Details(sections) => {
            let lines = detail_lines(&sections, body.width as usize);
            f.render_widget(Paragraph::new(lines).scroll((scroll, 0)), body);
        }
        ContentView::Events(resources) => {
            let lines = event_lines(resources, body.width as usize);
            f.render_widget(Paragraph::new(lines).scroll((scroll, 0)), body);
        }
        ContentView::Timeline { span_ms, bars } => {
            timeline::render(f, body, span_ms, &bars, scroll);
        }
        ContentView::Output(text) => {
            let para = Paragraph::new(text)
                .style(Style::default().fg(Color::Gray))
                .scroll((scroll, 0));
            f.render_widget(para, body);
        }
    }
}

fn render_tabs(f: &mut Frame, area: Rect, current: View) {
    let mut spans = Vec::new();
    for v in View::ALL {
        let style = if v == current {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::raw(" "));
        spans.push(Span::styled(format!(" {} {} ", v.key(), v.title()), style));
    }
    let tabs = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(tabs, area);
}

fn detail_lines(sections: &[DetailSection], width: usize) -> Vec<Line<'static>> {
    let label_width = sections
        .iter()
        .flat_map(|s| s.fields.iter())
        .map(|(l, _)| UnicodeWidthStr::width(l.as_str()))
        .max()
        .unwrap_or(0);
    let value_max = width.saturating_sub(label_width + 3);

    let mut lines = Vec::new();
    for (i, section) in sections.iter().enumerate() {
        if i > 0 {
            lines.push(Line::raw(""));
        }
        lines.push(Line::styled(
            format!(" {}", section.title),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));
        for (label, value) in &section.fields {
            lines.push(Line::from(vec![
                Span::styled(
                    format!(" {label:>label_width$}  "),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    format::truncate(value, value_max),
                    Style::default().fg(Color::White),
                ),
            ]));
        }
    }
    lines
}

fn status_style(status: ResourceStatus) -> Style {
    match status {
        ResourceStatus::Success => Style::default().fg(Color::Green),
        ResourceStatus::Failed => Style::default().fg(Color::Red),
        ResourceStatus::Pending => Style::default().fg(Color::DarkGray),
    }
}

fn event_lines(resources: &[Resource], width: usize) -> Vec<Line<'static>> {
    const ACTION_W: usize = 8;
    const STATUS_W: usize = 8;
    const DURATION_W: usize = 8;
    let address_w = width.saturating_sub(ACTION_W + STATUS_W + DURATION_W + 4).max(10);

    let header_style = Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::BOLD);
    let mut lines = vec![Line::styled(
        format!(
            " {:<ACTION_W$} {:<address_w$} {:<STATUS_W$} {:>DURATION_W$}",
            "ACTION", "ADDRESS", "STATUS", "DURATION"
        ),
        header_style,
    )];

    for r in resources {
        let action = format!("{} {}", r.action.symbol(), r.action.as_str());
        let address = format::truncate(&r.address, address_w);
        let status = match r.status {
            ResourceStatus::Success => "success",
            ResourceStatus::Failed => "failed",
            ResourceStatus::Pending => "pending",
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!(" {action:<ACTION_W$} "),
                Style::default().fg(timeline::action_color(r.action)),
            ),
            Span::styled(format!("{address:<address_w$} "), Style::default().fg(Color::White)),
            Span::styled(format!("{status:<STATUS_W$} "), status_style(r.status)),
            Span::styled(
                format!("{:>DURATION_W$}", format::duration(r.duration_ms)),
                Style::default().fg(Color::Gray),
            ),
        ]));
    }
    lines
}
