//! Application state: the single owner of filters, the run collection,
//! selection, view and focus. Every mutation returns the fetches it needs as
//! [`Effect`]s; nothing in here touches the network or the terminal.

use crate::events::AppEvent;
use crate::filter::{FilterController, FilterField, FilterState, FilterValue};
use crate::input::{self, Action, Capture, InputContext};
use crate::model::Run;
use crate::request::{RequestSeq, RequestToken, Slot};
use crate::selection::{self, Reconcile, RunCollection, Selection};
use crate::view::{self, OutputSlot, View};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::{Duration, Instant};

pub const ERROR_TTL: Duration = Duration::from_secs(10);
pub const SPINNER_FRAME_COUNT: usize = 10;
/// Lines moved by PageDown / PageUp in the content pane.
pub const PAGE_SCROLL: u16 = 10;

/// Immutable configuration set at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub base_url: String,
    pub refresh_interval: Option<Duration>,
    pub version_string: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListStatus {
    Loading,
    Ready,
    Failed(String),
}

/// The fully hydrated selected run, fetched separately from the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunDetail {
    Empty,
    Ready(Box<Run>),
    Failed(String),
}

/// Logical focus, independent of which surface captures raw keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusContext {
    RunsList,
    SearchInput,
    SelectControl,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    LoadRuns {
        token: RequestToken,
        query: Vec<(&'static str, String)>,
    },
    LoadRun {
        token: RequestToken,
        id: String,
    },
    LoadOutput {
        token: RequestToken,
        id: String,
    },
    LoadVersion,
}

pub struct AppState {
    pub config: AppConfig,

    pub filters: FilterController,
    pub runs: RunCollection,
    pub list_status: ListStatus,
    selection: Selection,
    pub detail: RunDetail,
    pub output: OutputSlot,
    requests: RequestSeq,

    pub view: View,
    pub show_help: bool,
    pub show_filters: bool,
    pub capture: Capture,
    pub focus: FocusContext,
    pub content_scroll: u16,

    pub version: Option<String>,
    pub error: Option<(String, Instant)>,
    pub spinner_frame: usize,
    pub last_reload: Option<Instant>,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(config: AppConfig, filters: FilterState) -> Self {
        Self {
            config,
            filters: FilterController::new(filters),
            runs: RunCollection::default(),
            list_status: ListStatus::Loading,
            selection: Selection::default(),
            detail: RunDetail::Empty,
            output: OutputSlot::Idle,
            requests: RequestSeq::default(),
            view: View::Details,
            show_help: false,
            show_filters: false,
            capture: Capture::None,
            focus: FocusContext::RunsList,
            content_scroll: 0,
            version: None,
            error: None,
            spinner_frame: 0,
            last_reload: None,
            should_quit: false,
        }
    }

    /// Fetches issued once the event loop is running.
    pub fn start(&mut self, now: Instant) -> Vec<Effect> {
        vec![self.reload(now), Effect::LoadVersion]
    }

    // -- selection accessors --

    pub fn selected_id(&self) -> Option<&str> {
        self.selection.id()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selection.index()
    }

    /// Summary of the selected run, straight from the list.
    pub fn selected_run(&self) -> Option<&Run> {
        self.selection.index().and_then(|i| self.runs.get(i))
    }

    pub fn selection_is_consistent(&self) -> bool {
        self.selection.is_consistent(&self.runs)
    }

    pub fn is_loading(&self) -> bool {
        self.list_status == ListStatus::Loading
    }

    // -- collection --

    pub fn reload(&mut self, now: Instant) -> Effect {
        let token = self.requests.issue(Slot::List);
        let query = self.filters.query_pairs();
        tracing::debug!(?token, ?query, "loading runs");
        self.list_status = ListStatus::Loading;
        self.last_reload = Some(now);
        Effect::LoadRuns { token, query }
    }

    pub fn apply_runs(&mut self, token: RequestToken, result: Result<Vec<Run>, String>) -> Vec<Effect> {
        if !self.requests.is_current(Slot::List, token) {
            tracing::debug!(?token, "discarding stale run list");
            return Vec::new();
        }
        match result {
            Ok(runs) => {
                self.runs.replace(runs);
                self.list_status = ListStatus::Ready;
                self.reconcile_selection()
            }
            Err(e) => {
                tracing::warn!("failed to load runs: {e}");
                self.runs.clear();
                self.list_status = ListStatus::Failed(e);
                self.clear_selection();
                Vec::new()
            }
        }
    }

    fn reconcile_selection(&mut self) -> Vec<Effect> {
        match selection::reconcile(self.selection.id(), &self.runs) {
            Reconcile::Keep(index) => {
                self.selection.move_to(index);
                Vec::new()
            }
            Reconcile::SelectFirst => self.select_index(0),
            Reconcile::Clear => {
                self.clear_selection();
                Vec::new()
            }
        }
    }

    fn clear_selection(&mut self) {
        self.selection.clear();
        self.detail = RunDetail::Empty;
        self.output = OutputSlot::Idle;
        self.content_scroll = 0;
        self.requests.invalidate(Slot::Run);
        self.requests.invalidate(Slot::Output);
    }

    pub fn set_search_query(&mut self, query: &str) -> Vec<Effect> {
        self.runs.set_query(query);
        self.reconcile_selection()
    }

    // -- selection --

    /// Selects a run and fetches its full record. The previously hydrated
    /// run stays in `detail` until the new one arrives.
    pub fn select(&mut self, id: String, index: usize) -> Vec<Effect> {
        self.selection.set(id.clone(), index);
        self.content_scroll = 0;
        let token = self.requests.issue(Slot::Run);
        tracing::debug!(?token, %id, "loading run");
        let mut effects = vec![Effect::LoadRun { token, id }];
        if self.view == View::Output {
            effects.extend(self.load_output());
        } else {
            self.requests.invalidate(Slot::Output);
            self.output = OutputSlot::Idle;
        }
        effects
    }

    /// Out-of-range indices are ignored.
    pub fn select_index(&mut self, index: usize) -> Vec<Effect> {
        match self.runs.get(index) {
            Some(run) => {
                let id = run.id.clone();
                self.select(id, index)
            }
            None => Vec::new(),
        }
    }

    fn jump_to(&mut self, index: usize) -> Vec<Effect> {
        if self.selection.index() == Some(index) {
            return Vec::new();
        }
        self.select_index(index)
    }

    /// Moves the selection by `delta`, clamped to the visible runs.
    pub fn navigate(&mut self, delta: isize) -> Vec<Effect> {
        if self.runs.is_empty() {
            return Vec::new();
        }
        let last = self.runs.len() - 1;
        let target = match self.selection.index() {
            Some(i) => i.saturating_add_signed(delta).min(last),
            None => 0,
        };
        self.jump_to(target)
    }

    pub fn select_first(&mut self) -> Vec<Effect> {
        if self.runs.is_empty() {
            return Vec::new();
        }
        self.jump_to(0)
    }

    pub fn select_last(&mut self) -> Vec<Effect> {
        match self.runs.len() {
            0 => Vec::new(),
            len => self.jump_to(len - 1),
        }
    }

    pub fn apply_run(&mut self, token: RequestToken, id: &str, result: Result<Box<Run>, String>) {
        if !self.requests.is_current(Slot::Run, token) || self.selection.id() != Some(id) {
            tracing::debug!(?token, %id, "discarding stale run");
            return;
        }
        self.detail = match result {
            Ok(run) => RunDetail::Ready(run),
            Err(e) => {
                tracing::warn!("failed to load run {id}: {e}");
                RunDetail::Failed(e)
            }
        };
    }

    // -- views --

    pub fn set_view(&mut self, view: View) -> Vec<Effect> {
        self.view = view;
        self.content_scroll = 0;
        if view == View::Output {
            self.load_output()
        } else {
            self.requests.invalidate(Slot::Output);
            self.output = OutputSlot::Idle;
            Vec::new()
        }
    }

    fn load_output(&mut self) -> Vec<Effect> {
        let Some(id) = self.selection.id().map(str::to_string) else {
            self.output = OutputSlot::Idle;
            return Vec::new();
        };
        let token = self.requests.issue(Slot::Output);
        tracing::debug!(?token, %id, "loading output");
        self.output = OutputSlot::Loading;
        vec![Effect::LoadOutput { token, id }]
    }

    pub fn apply_output(&mut self, token: RequestToken, output: Option<String>) {
        if !self.requests.is_current(Slot::Output, token) {
            tracing::debug!(?token, "discarding stale output");
            return;
        }
        self.output = match output {
            Some(text) if !text.is_empty() => OutputSlot::Ready(text),
            _ => OutputSlot::Missing,
        };
    }

    pub fn apply_version(&mut self, version: Option<String>) {
        self.version = version;
    }

    // -- filters --

    pub fn set_filter(&mut self, field: FilterField, value: FilterValue, now: Instant) -> Vec<Effect> {
        if self.filters.set_filter(field, value, now) {
            vec![self.reload(now)]
        } else {
            Vec::new()
        }
    }

    /// Removes one chip: resets the value and its control, then reloads.
    pub fn clear_filter(&mut self, field: FilterField, now: Instant) -> Vec<Effect> {
        self.filters.clear(field);
        vec![self.reload(now)]
    }

    fn cycle_filter(&mut self, field: FilterField, forward: bool, now: Instant) -> Vec<Effect> {
        if self.filters.cycle(field, forward, now) {
            vec![self.reload(now)]
        } else {
            Vec::new()
        }
    }

    // -- transient UI --

    pub fn set_error(&mut self, msg: String) {
        self.error = Some((msg, Instant::now()));
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|(msg, _)| msg.as_str())
    }

    pub fn prune_error(&mut self, now: Instant) {
        if let Some((_, ts)) = &self.error {
            if now.saturating_duration_since(*ts) >= ERROR_TTL {
                self.error = None;
            }
        }
    }

    pub fn advance_spinner(&mut self) {
        self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAME_COUNT;
    }

    /// Settles the branch debounce and drives the periodic reload.
    pub fn tick(&mut self, now: Instant) -> Vec<Effect> {
        self.advance_spinner();
        self.prune_error(now);
        if self.filters.settle(now) {
            return vec![self.reload(now)];
        }
        let refresh_due = self.config.refresh_interval.is_some_and(|interval| {
            !self.is_loading()
                && self
                    .last_reload
                    .is_some_and(|t| now.saturating_duration_since(t) >= interval)
        });
        if refresh_due {
            vec![self.reload(now)]
        } else {
            Vec::new()
        }
    }

    // -- input --

    pub fn input_context(&self) -> InputContext {
        InputContext {
            help_open: self.show_help,
            capture: self.capture,
        }
    }

    pub fn handle_action(&mut self, action: Action, now: Instant) -> Vec<Effect> {
        match action {
            Action::Quit => self.should_quit = true,
            Action::CloseHelp => self.show_help = false,
            Action::OpenHelp => self.show_help = true,
            Action::BlurSearch => self.blur_search(),
            Action::BlurControl => {
                self.capture = Capture::None;
                self.show_filters = false;
                self.focus = FocusContext::None;
            }
            Action::FocusSearch => {
                self.capture = Capture::Search;
                self.show_filters = false;
                self.focus = FocusContext::SearchInput;
            }
            Action::MoveDown => return self.navigate(1),
            Action::MoveUp => return self.navigate(-1),
            Action::First => return self.select_first(),
            Action::Last => return self.select_last(),
            Action::ShowView(view) => return self.set_view(view),
            Action::ResetFocus => self.focus = FocusContext::RunsList,
            Action::Reload => return vec![self.reload(now)],
            Action::OpenFilters => {
                self.show_filters = true;
                self.capture = Capture::Filters;
                self.focus = FocusContext::SelectControl;
            }
            Action::ScrollDown => {
                let limit = view::max_scroll(&view::describe(self));
                self.content_scroll = self.content_scroll.saturating_add(PAGE_SCROLL).min(limit);
            }
            Action::ScrollUp => {
                self.content_scroll = self.content_scroll.saturating_sub(PAGE_SCROLL);
            }
            Action::PassThrough(key) => {
                return match self.capture {
                    Capture::Search => self.edit_search(key),
                    Capture::Filters => self.edit_filters(key, now),
                    Capture::None => Vec::new(),
                };
            }
            Action::None => {}
        }
        Vec::new()
    }

    /// Escape always releases the input; focus returns to the list only
    /// when there is no search text left.
    fn blur_search(&mut self) {
        self.capture = Capture::None;
        if self.runs.query().is_empty() {
            self.focus = FocusContext::RunsList;
        }
    }

    fn edit_search(&mut self, key: KeyEvent) -> Vec<Effect> {
        let mut query = self.runs.query().to_string();
        match key.code {
            KeyCode::Enter => {
                self.blur_search();
                return Vec::new();
            }
            KeyCode::Backspace => {
                if query.pop().is_none() {
                    return Vec::new();
                }
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => query.push(c),
            _ => return Vec::new(),
        }
        self.set_search_query(&query)
    }

    fn edit_filters(&mut self, key: KeyEvent, now: Instant) -> Vec<Effect> {
        let field = self.filters.focused();
        match key.code {
            KeyCode::Tab | KeyCode::Down => self.filters.focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.filters.focus_prev(),
            KeyCode::Delete => return self.clear_filter(field, now),
            KeyCode::Char(c) if field == FilterField::Branch => {
                let mut draft = self.filters.branch_draft().to_string();
                draft.push(c);
                return self.set_filter(field, FilterValue::Text(draft), now);
            }
            KeyCode::Backspace if field == FilterField::Branch => {
                let mut draft = self.filters.branch_draft().to_string();
                if draft.pop().is_some() {
                    return self.set_filter(field, FilterValue::Text(draft), now);
                }
            }
            KeyCode::Right | KeyCode::Char(' ') => return self.cycle_filter(field, true, now),
            KeyCode::Left => return self.cycle_filter(field, false, now),
            _ => {}
        }
        Vec::new()
    }

    /// Applies one event and returns the fetches it calls for.
    pub fn handle_event(&mut self, event: AppEvent, now: Instant) -> Vec<Effect> {
        match event {
            AppEvent::Key(key) => {
                let action = input::map_key(key, &self.input_context());
                if !action.prevents_default() {
                    tracing::trace!(code = ?key.code, capture = ?self.capture, "key left to the focused input");
                }
                self.handle_action(action, now)
            }
            AppEvent::Tick => self.tick(now),
            AppEvent::RunsLoaded { token, result } => self.apply_runs(token, result),
            AppEvent::RunLoaded { token, id, result } => {
                self.apply_run(token, &id, result);
                Vec::new()
            }
            AppEvent::OutputLoaded { token, output } => {
                self.apply_output(token, output);
                Vec::new()
            }
            AppEvent::VersionLoaded(version) => {
                self.apply_version(version);
                Vec::new()
            }
            AppEvent::Error(msg) => {
                self.set_error(msg);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::BRANCH_DEBOUNCE;
    use crate::model::{RunStatus, SyncStatus};
    use chrono::Utc;
    use crossterm::event::{KeyEventKind, KeyEventState};
    use pretty_assertions::assert_eq;

    fn make_run(id: &str, workspace: &str) -> Run {
        Run {
            id: id.to_string(),
            workspace: workspace.to_string(),
            status: RunStatus::Success,
            timestamp: Utc::now(),
            duration_ms: Some(1000),
            exit_code: 0,
            program: "terraform".to_string(),
            command: Vec::new(),
            user: Some("alice".to_string()),
            changes: None,
            sync_status: SyncStatus::Local,
            git: None,
            ci: None,
            resources: Vec::new(),
        }
    }

    fn make_runs(ids: &[&str]) -> Vec<Run> {
        ids.iter().map(|id| make_run(id, &format!("ws-{id}"))).collect()
    }

    fn state() -> AppState {
        AppState::new(
            AppConfig {
                base_url: "http://localhost:8080".to_string(),
                refresh_interval: None,
                version_string: "tfjb test".to_string(),
            },
            FilterState::default(),
        )
    }

    fn press(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn list_token(effects: &[Effect]) -> RequestToken {
        effects
            .iter()
            .find_map(|e| match e {
                Effect::LoadRuns { token, .. } => Some(*token),
                _ => None,
            })
            .expect("no LoadRuns effect")
    }

    fn run_token(effects: &[Effect]) -> RequestToken {
        effects
            .iter()
            .find_map(|e| match e {
                Effect::LoadRun { token, .. } => Some(*token),
                _ => None,
            })
            .expect("no LoadRun effect")
    }

    /// Starts the app and delivers `ids` as the first list response.
    fn loaded(ids: &[&str]) -> (AppState, Vec<Effect>) {
        let mut s = state();
        let now = Instant::now();
        let token = list_token(&s.start(now));
        let effects = s.apply_runs(token, Ok(make_runs(ids)));
        (s, effects)
    }

    #[test]
    fn start_loads_runs_and_version() {
        let mut s = state();
        let effects = s.start(Instant::now());
        assert_eq!(effects.len(), 2);
        match &effects[0] {
            Effect::LoadRuns { query, .. } => {
                assert_eq!(query, &vec![("limit", "20".to_string())]);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(effects[1], Effect::LoadVersion);
        assert!(s.is_loading());
    }

    #[test]
    fn first_load_selects_first_run() {
        let (s, effects) = loaded(&["a", "b", "c"]);
        assert_eq!(s.selected_id(), Some("a"));
        assert_eq!(s.selected_index(), Some(0));
        assert!(matches!(&effects[..], [Effect::LoadRun { id, .. }] if id == "a"));
        assert!(s.selection_is_consistent());
        assert_eq!(s.list_status, ListStatus::Ready);
    }

    #[test]
    fn reload_keeps_selected_id_at_new_index() {
        let (mut s, _) = loaded(&["a", "b", "c"]);
        s.select_index(2);
        let token = s.reload(Instant::now());
        let Effect::LoadRuns { token, .. } = token else { panic!() };
        let effects = s.apply_runs(token, Ok(make_runs(&["x", "c", "a"])));
        assert!(effects.is_empty());
        assert_eq!(s.selected_id(), Some("c"));
        assert_eq!(s.selected_index(), Some(1));
        assert!(s.selection_is_consistent());
    }

    #[test]
    fn reload_without_previous_selection_selects_first() {
        let (mut s, _) = loaded(&["a", "b"]);
        let Effect::LoadRuns { token, .. } = s.reload(Instant::now()) else { panic!() };
        s.apply_runs(token, Ok(make_runs(&["x", "y"])));
        assert_eq!(s.selected_id(), Some("x"));
        assert_eq!(s.selected_index(), Some(0));
    }

    #[test]
    fn empty_reload_clears_selection() {
        let (mut s, _) = loaded(&["a"]);
        let Effect::LoadRuns { token, .. } = s.reload(Instant::now()) else { panic!() };
        s.apply_runs(token, Ok(Vec::new()));
        assert_eq!(s.selected_id(), None);
        assert_eq!(s.selected_index(), None);
        assert_eq!(s.detail, RunDetail::Empty);
        assert!(s.selection_is_consistent());
    }

    #[test]
    fn list_failure_clears_collection() {
        let (mut s, _) = loaded(&["a", "b"]);
        let Effect::LoadRuns { token, .. } = s.reload(Instant::now()) else { panic!() };
        s.apply_runs(token, Err("connection refused".to_string()));
        assert!(s.runs.is_empty());
        assert_eq!(s.selected_id(), None);
        assert_eq!(s.list_status, ListStatus::Failed("connection refused".to_string()));
    }

    #[test]
    fn stale_list_response_is_discarded() {
        let (mut s, _) = loaded(&["a"]);
        let Effect::LoadRuns { token: first, .. } = s.reload(Instant::now()) else { panic!() };
        let Effect::LoadRuns { token: second, .. } = s.reload(Instant::now()) else { panic!() };
        s.apply_runs(second, Ok(make_runs(&["new"])));
        let effects = s.apply_runs(first, Ok(make_runs(&["old"])));
        assert!(effects.is_empty());
        assert_eq!(s.runs.get(0).map(|r| r.id.as_str()), Some("new"));
    }

    #[test]
    fn stale_run_response_is_discarded() {
        let (mut s, effects) = loaded(&["a", "b"]);
        let first = run_token(&effects);
        let second = run_token(&s.select_index(1));
        s.apply_run(second, "b", Ok(Box::new(make_run("b", "ws-b"))));
        s.apply_run(first, "a", Ok(Box::new(make_run("a", "ws-a"))));
        match &s.detail {
            RunDetail::Ready(run) => assert_eq!(run.id, "b"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn hydrated_run_stays_until_next_resolves() {
        let (mut s, effects) = loaded(&["a", "b"]);
        s.apply_run(run_token(&effects), "a", Ok(Box::new(make_run("a", "ws-a"))));
        s.select_index(1);
        assert_eq!(s.selected_id(), Some("b"));
        assert!(matches!(&s.detail, RunDetail::Ready(run) if run.id == "a"));
    }

    #[test]
    fn run_failure_keeps_list_and_selection() {
        let (mut s, effects) = loaded(&["a", "b"]);
        s.apply_run(run_token(&effects), "a", Err("HTTP 404".to_string()));
        assert_eq!(s.detail, RunDetail::Failed("HTTP 404".to_string()));
        assert_eq!(s.runs.len(), 2);
        assert_eq!(s.selected_id(), Some("a"));
    }

    #[test]
    fn out_of_range_select_is_noop() {
        let (mut s, _) = loaded(&["a", "b"]);
        assert!(s.select_index(7).is_empty());
        assert_eq!(s.selected_index(), Some(0));
    }

    #[test]
    fn shift_g_selects_last_and_j_stays() {
        let (mut s, _) = loaded(&["a", "b", "c", "d", "e"]);
        let now = Instant::now();
        s.handle_event(press(KeyCode::Char('j')), now);
        s.handle_event(press(KeyCode::Char('G')), now);
        assert_eq!(s.selected_index(), Some(4));
        let effects = s.handle_event(press(KeyCode::Char('j')), now);
        assert!(effects.is_empty());
        assert_eq!(s.selected_index(), Some(4));
        assert_eq!(s.selected_id(), Some("e"));
    }

    #[test]
    fn k_at_top_stays() {
        let (mut s, _) = loaded(&["a", "b"]);
        assert!(s.handle_event(press(KeyCode::Char('k')), Instant::now()).is_empty());
        assert_eq!(s.selected_index(), Some(0));
    }

    #[test]
    fn g_returns_to_first() {
        let (mut s, _) = loaded(&["a", "b", "c"]);
        let now = Instant::now();
        s.handle_event(press(KeyCode::Char('G')), now);
        let effects = s.handle_event(press(KeyCode::Char('g')), now);
        assert_eq!(s.selected_index(), Some(0));
        assert!(matches!(&effects[..], [Effect::LoadRun { id, .. }] if id == "a"));
    }

    #[test]
    fn navigation_on_empty_list_is_noop() {
        let (mut s, _) = loaded(&[]);
        assert!(s.navigate(1).is_empty());
        assert!(s.select_last().is_empty());
        assert_eq!(s.selected_index(), None);
    }

    #[test]
    fn escape_with_search_text_keeps_search_focus() {
        let (mut s, _) = loaded(&["a"]);
        let now = Instant::now();
        s.handle_event(press(KeyCode::Char('/')), now);
        s.handle_event(press(KeyCode::Char('a')), now);
        assert_eq!(s.runs.query(), "a");
        s.handle_event(press(KeyCode::Esc), now);
        assert_eq!(s.capture, Capture::None);
        assert_eq!(s.focus, FocusContext::SearchInput);
    }

    #[test]
    fn escape_with_empty_search_returns_to_list() {
        let (mut s, _) = loaded(&["a"]);
        let now = Instant::now();
        s.handle_event(press(KeyCode::Char('/')), now);
        assert_eq!(s.focus, FocusContext::SearchInput);
        s.handle_event(press(KeyCode::Esc), now);
        assert_eq!(s.capture, Capture::None);
        assert_eq!(s.focus, FocusContext::RunsList);
    }

    #[test]
    fn typing_search_reconciles_selection() {
        let mut s = state();
        let now = Instant::now();
        let token = list_token(&s.start(now));
        s.apply_runs(
            token,
            Ok(vec![
                make_run("r1", "prod-east"),
                make_run("r2", "prod-west"),
                make_run("r3", "staging"),
            ]),
        );
        s.handle_event(press(KeyCode::Char('/')), now);
        for c in "stag".chars() {
            s.handle_event(press(KeyCode::Char(c)), now);
        }
        assert_eq!(s.runs.len(), 1);
        assert_eq!(s.selected_id(), Some("r3"));
        assert_eq!(s.selected_index(), Some(0));
        assert!(s.selection_is_consistent());

        for _ in 0..4 {
            s.handle_event(press(KeyCode::Backspace), now);
        }
        assert_eq!(s.runs.len(), 3);
        assert_eq!(s.selected_index(), Some(2));
    }

    #[test]
    fn search_captures_binding_keys() {
        let (mut s, _) = loaded(&["a", "b"]);
        let now = Instant::now();
        s.handle_event(press(KeyCode::Char('/')), now);
        s.handle_event(press(KeyCode::Char('q')), now);
        assert!(!s.should_quit);
        assert_eq!(s.runs.query(), "q");
    }

    #[test]
    fn help_swallows_other_keys() {
        let (mut s, _) = loaded(&["a", "b"]);
        let now = Instant::now();
        s.handle_event(press(KeyCode::Char('?')), now);
        assert!(s.show_help);
        s.handle_event(press(KeyCode::Char('j')), now);
        assert_eq!(s.selected_index(), Some(0));
        s.handle_event(press(KeyCode::Esc), now);
        assert!(!s.show_help);
    }

    #[test]
    fn output_view_fetches_every_entry() {
        let (mut s, _) = loaded(&["a"]);
        let first = s.set_view(View::Output);
        let Some(Effect::LoadOutput { token: t1, id }) = first.first().cloned() else {
            panic!("expected LoadOutput");
        };
        assert_eq!(id, "a");
        assert_eq!(s.output, OutputSlot::Loading);

        s.set_view(View::Details);
        let second = s.set_view(View::Output);
        let Some(Effect::LoadOutput { token: t2, .. }) = second.first().cloned() else {
            panic!("expected LoadOutput");
        };
        assert_ne!(t1, t2);

        s.apply_output(t1, Some("stale".to_string()));
        assert_eq!(s.output, OutputSlot::Loading);
        s.apply_output(t2, Some(String::new()));
        assert_eq!(s.output, OutputSlot::Missing);
    }

    #[test]
    fn selection_change_refetches_output() {
        let (mut s, _) = loaded(&["a", "b"]);
        s.set_view(View::Output);
        let effects = s.navigate(1);
        assert!(effects.iter().any(|e| matches!(e, Effect::LoadOutput { id, .. } if id == "b")));
    }

    #[test]
    fn output_view_without_selection() {
        let (mut s, _) = loaded(&[]);
        assert!(s.set_view(View::Output).is_empty());
        assert_eq!(s.view, View::Output);
    }

    #[test]
    fn branch_typing_is_debounced() {
        let (mut s, _) = loaded(&["a"]);
        let now = Instant::now();
        s.handle_event(press(KeyCode::Char('f')), now);
        assert!(s.show_filters);
        // status -> since -> program -> branch
        for _ in 0..3 {
            s.handle_event(press(KeyCode::Tab), now);
        }
        assert_eq!(s.filters.focused(), FilterField::Branch);
        for c in "main".chars() {
            assert!(s.handle_event(press(KeyCode::Char(c)), now).is_empty());
        }
        assert!(s.tick(now + Duration::from_millis(100)).is_empty());
        let effects = s.tick(now + BRANCH_DEBOUNCE);
        assert!(matches!(&effects[..], [Effect::LoadRuns { query, .. }]
            if query.contains(&("branch", "main".to_string()))));
    }

    #[test]
    fn select_change_reloads_immediately() {
        let (mut s, _) = loaded(&["a"]);
        let now = Instant::now();
        s.handle_event(press(KeyCode::Char('f')), now);
        let effects = s.handle_event(press(KeyCode::Right), now);
        assert!(matches!(&effects[..], [Effect::LoadRuns { query, .. }]
            if query.contains(&("status", "success".to_string()))));
        assert_eq!(s.filters.active_filters().len(), 1);
    }

    #[test]
    fn delete_clears_chip_and_reloads() {
        let (mut s, _) = loaded(&["a"]);
        let now = Instant::now();
        s.set_filter(FilterField::Status, FilterValue::Text("failed".into()), now);
        s.handle_event(press(KeyCode::Char('f')), now);
        let effects = s.handle_event(press(KeyCode::Delete), now);
        assert_eq!(effects.len(), 1);
        assert!(s.filters.active_filters().is_empty());
        assert_eq!(s.filters.display_value(FilterField::Status), "");
    }

    #[test]
    fn escape_closes_filter_popover() {
        let (mut s, _) = loaded(&["a"]);
        let now = Instant::now();
        s.handle_event(press(KeyCode::Char('f')), now);
        assert_eq!(s.focus, FocusContext::SelectControl);
        s.handle_event(press(KeyCode::Esc), now);
        assert!(!s.show_filters);
        assert_eq!(s.capture, Capture::None);
        assert_eq!(s.focus, FocusContext::None);
        s.handle_event(press(KeyCode::Esc), now);
        assert_eq!(s.focus, FocusContext::RunsList);
    }

    #[test]
    fn periodic_refresh() {
        let mut s = state();
        s.config.refresh_interval = Some(Duration::from_secs(30));
        let now = Instant::now();
        let token = list_token(&s.start(now));
        assert!(s.tick(now + Duration::from_secs(40)).is_empty(), "still loading");
        s.apply_runs(token, Ok(make_runs(&["a"])));
        assert!(s.tick(now + Duration::from_secs(10)).is_empty());
        assert_eq!(s.tick(now + Duration::from_secs(30)).len(), 1);
    }

    #[test]
    fn errors_expire() {
        let mut s = state();
        s.handle_event(AppEvent::Error("boom".to_string()), Instant::now());
        assert_eq!(s.error_message(), Some("boom"));
        s.prune_error(Instant::now() + ERROR_TTL);
        assert_eq!(s.error_message(), None);
    }

    #[test]
    fn page_scroll_stops_at_last_line() {
        let (mut s, _) = loaded(&["a"]);
        let now = Instant::now();
        s.handle_event(press(KeyCode::PageDown), now);
        assert_eq!(s.content_scroll, 0, "placeholder does not scroll");

        let effects = s.set_view(View::Output);
        let Some(Effect::LoadOutput { token, .. }) = effects.first() else {
            panic!("expected LoadOutput, got {effects:?}");
        };
        let text: Vec<String> = (1..=25).map(|i| format!("line {i}")).collect();
        s.apply_output(*token, Some(text.join("\n")));

        s.handle_event(press(KeyCode::PageDown), now);
        assert_eq!(s.content_scroll, PAGE_SCROLL);
        s.handle_event(press(KeyCode::PageDown), now);
        s.handle_event(press(KeyCode::PageDown), now);
        s.handle_event(press(KeyCode::PageDown), now);
        assert_eq!(s.content_scroll, 24);
        s.handle_event(press(KeyCode::PageUp), now);
        assert_eq!(s.content_scroll, 14);
        s.handle_event(press(KeyCode::Char('e')), now);
        assert_eq!(s.content_scroll, 0);
        assert_eq!(s.view, View::Events);
    }

    #[test]
    fn version_is_recorded() {
        let mut s = state();
        s.handle_event(AppEvent::VersionLoaded(Some("1.4.0".into())), Instant::now());
        assert_eq!(s.version.as_deref(), Some("1.4.0"));
    }
}
