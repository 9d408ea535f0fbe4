use crate::app::SPINNER_FRAME_COUNT;
use ratatui::style::{Color, Style};
use ratatui::text::Span;

const FRAMES: [char; SPINNER_FRAME_COUNT] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

pub fn frame(idx: usize) -> char {
    FRAMES[idx % FRAMES.len()]
}

pub fn span(idx: usize) -> Span<'static> {
    Span::styled(frame(idx).to_string(), Style::default().fg(Color::Yellow))
}
