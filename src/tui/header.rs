use crate::app::{AppState, FocusContext};
use crate::input::Capture;
use crate::tui::spinner;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

pub fn render(f: &mut Frame, area: Rect, state: &AppState) {
    let mut title = vec![
        Span::styled(
            format!(" {} ", state.config.version_string),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("│ "),
        Span::styled(
            state.config.base_url.as_str(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
    ];

    if state.is_loading() || state.filters.has_pending() {
        title.push(Span::raw(" "));
        title.push(spinner::span(state.spinner_frame));
    }

    if state.error_message().is_some() {
        title.push(Span::raw(" "));
        title.push(Span::styled(
            "!",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }

    let header = Paragraph::new(vec![Line::from(title), search_line(state)]).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(header, area);
}

fn search_line(state: &AppState) -> Line<'_> {
    let editing = state.capture == Capture::Search;
    let prompt_style = if editing || state.focus == FocusContext::SearchInput {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let mut spans = vec![Span::styled(" / ", prompt_style)];
    let query = state.runs.query();
    if query.is_empty() && !editing {
        spans.push(Span::styled(
            "search workspace, user or id",
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        spans.push(Span::styled(query, Style::default().fg(Color::White)));
    }
    if editing {
        spans.push(Span::styled("▏", Style::default().fg(Color::Yellow)));
    }

    let chips = state.filters.active_filters();
    if !chips.is_empty() {
        spans.push(Span::styled("  │ ", Style::default().fg(Color::DarkGray)));
        for chip in &chips {
            spans.push(Span::styled(
                format!("[{}]", chip.label),
                Style::default().fg(Color::Magenta),
            ));
            spans.push(Span::raw(" "));
        }
        let noun = if chips.len() == 1 { "filter" } else { "filters" };
        spans.push(Span::styled(
            format!("({} {noun})", chips.len()),
            Style::default().fg(Color::DarkGray),
        ));
    }

    Line::from(spans)
}
