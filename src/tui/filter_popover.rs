use crate::filter::{FilterController, FilterField};
use crate::tui::centered;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

const WIDTH: u16 = 44;

pub fn render(f: &mut Frame, filters: &FilterController) {
    let label_width = FilterField::ALL
        .iter()
        .map(|field| field.title().len())
        .max()
        .unwrap_or(0);

    let lines: Vec<Line> = FilterField::ALL
        .iter()
        .map(|&field| {
            let focused = field == filters.focused();
            let mut value = filters.display_value(field);
            if value.is_empty() {
                value = "any".to_string();
            }
            let value = match field {
                FilterField::Branch if focused => format!("{value}▏"),
                FilterField::Branch => value,
                _ => format!("‹ {value} ›"),
            };
            let marker = if focused { "▸" } else { " " };
            let value_style = if focused {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            Line::from(vec![
                Span::styled(
                    format!("{marker} {:>label_width$}  ", field.title()),
                    Style::default().fg(Color::Cyan),
                ),
                Span::styled(value, value_style),
            ])
        })
        .collect();

    // +2 border
    let area = centered(f.area(), WIDTH, FilterField::ALL.len() as u16 + 2);
    f.render_widget(Clear, area);
    let block = Block::default()
        .title(" Filters ")
        .title_bottom(Line::from(" Tab ←→ Space Del  Esc close ").centered())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta))
        .style(Style::default().bg(Color::Black));
    f.render_widget(Paragraph::new(lines).block(block), area);
}
