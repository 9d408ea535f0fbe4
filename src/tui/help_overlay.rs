use crate::tui::centered;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

const BINDINGS: &[(&str, &str)] = &[
    ("/", "Search workspace, user or id"),
    ("j / ↓", "Next run"),
    ("k / ↑", "Previous run"),
    ("g", "First run"),
    ("G", "Last run"),
    ("d", "Details view"),
    ("e", "Events view"),
    ("t", "Timeline view"),
    ("o", "Output view"),
    ("PgDn / PgUp", "Scroll content"),
    ("f", "Filters"),
    ("r", "Reload runs"),
    ("Esc", "Back to the run list"),
    ("?", "Toggle this help"),
    ("q", "Quit"),
];

pub fn render(f: &mut Frame) {
    let key_width = BINDINGS.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
    let lines: Vec<Line> = BINDINGS
        .iter()
        .map(|(key, desc)| {
            Line::from(vec![
                Span::styled(
                    format!(" {key:>key_width$}  "),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(*desc, Style::default().fg(Color::White)),
            ])
        })
        .collect();

    // +2 border
    let area = centered(f.area(), 52, BINDINGS.len() as u16 + 2);
    f.render_widget(Clear, area);
    let block = Block::default()
        .title(" Keyboard shortcuts ")
        .title_bottom(Line::from(" ?/Esc close ").centered())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .style(Style::default().bg(Color::Black));
    f.render_widget(Paragraph::new(lines).block(block), area);
}
