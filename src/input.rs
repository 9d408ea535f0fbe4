use crate::view::View;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    CloseHelp,
    OpenHelp,
    BlurSearch,
    BlurControl,
    FocusSearch,
    MoveDown,
    MoveUp,
    First,
    Last,
    ShowView(View),
    ResetFocus,
    Reload,
    OpenFilters,
    ScrollDown,
    ScrollUp,
    /// Left to the focused text input or select control.
    PassThrough(KeyEvent),
    None,
}

impl Action {
    /// Whether the key was consumed by a binding.
    pub fn prevents_default(self) -> bool {
        !matches!(self, Action::PassThrough(_) | Action::None)
    }
}

/// Which surface is owning raw key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Capture {
    #[default]
    None,
    Search,
    Filters,
}

/// Captures the UI state needed to interpret a key press.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputContext {
    pub help_open: bool,
    pub capture: Capture,
}

pub fn map_key(key: KeyEvent, ctx: &InputContext) -> Action {
    if key.kind != KeyEventKind::Press {
        return Action::None;
    }

    // Ctrl+C always quits
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    if ctx.help_open {
        return match key.code {
            KeyCode::Char('?') | KeyCode::Esc => Action::CloseHelp,
            _ => Action::None,
        };
    }

    match ctx.capture {
        Capture::Search => {
            return match key.code {
                KeyCode::Esc => Action::BlurSearch,
                _ => Action::PassThrough(key),
            };
        }
        Capture::Filters => {
            return match key.code {
                KeyCode::Esc => Action::BlurControl,
                _ => Action::PassThrough(key),
            };
        }
        Capture::None => {}
    }

    match key.code {
        KeyCode::Char('/') => Action::FocusSearch,
        KeyCode::Char('j') | KeyCode::Down => Action::MoveDown,
        KeyCode::Char('k') | KeyCode::Up => Action::MoveUp,
        KeyCode::Char('g') if !key.modifiers.contains(KeyModifiers::SHIFT) => Action::First,
        KeyCode::Char('G') => Action::Last,
        KeyCode::Char('d') => Action::ShowView(View::Details),
        KeyCode::Char('e') => Action::ShowView(View::Events),
        KeyCode::Char('t') => Action::ShowView(View::Timeline),
        KeyCode::Char('o') => Action::ShowView(View::Output),
        KeyCode::Char('?') => Action::OpenHelp,
        KeyCode::Esc => Action::ResetFocus,
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('r') => Action::Reload,
        KeyCode::Char('f') => Action::OpenFilters,
        KeyCode::PageDown => Action::ScrollDown,
        KeyCode::PageUp => Action::ScrollUp,
        _ => Action::None,
    }
}
