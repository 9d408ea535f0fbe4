use crate::app::AppState;
use crate::input::Capture;
use crate::tui::NARROW_WIDTH_THRESHOLD;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

pub fn render(f: &mut Frame, area: Rect, state: &AppState) {
    let narrow = area.width < NARROW_WIDTH_THRESHOLD;

    let hints: &[(&str, &str)] = match state.capture {
        Capture::Search => &[("type", "search"), ("Enter/Esc", "done")],
        Capture::Filters => &[
            ("Tab", "field"),
            ("←→", "change"),
            ("Space", "toggle"),
            ("Del", "clear"),
            ("Esc", "close"),
        ],
        Capture::None if narrow => &[
            ("j/k", "nav"),
            ("d/e/t/o", "view"),
            ("/", "search"),
            ("?", "help"),
            ("q", "quit"),
        ],
        Capture::None => &[
            ("↑↓/jk", "navigate"),
            ("d/e/t/o", "view"),
            ("/", "search"),
            ("f", "filters"),
            ("r", "reload"),
            ("?", "help"),
            ("q", "quit"),
        ],
    };

    let mut spans: Vec<Span> = Vec::new();
    for (i, (key, desc)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(*key, Style::default().fg(Color::Cyan)));
        spans.push(Span::styled(
            format!(" {desc}"),
            Style::default().fg(Color::DarkGray),
        ));
    }

    // Server version, right-aligned when it fits
    if let Some(version) = &state.version {
        let label = format!("server {version}");
        let used: usize = spans.iter().map(Span::width).sum();
        let free = (area.width as usize).saturating_sub(used);
        if free > label.len() {
            spans.push(Span::raw(" ".repeat(free - label.len())));
            spans.push(Span::styled(label, Style::default().fg(Color::DarkGray)));
        }
    }

    let footer = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(footer, area);
}
