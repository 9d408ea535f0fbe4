//! Server-side filters for the run list.
//!
//! [`FilterController`] keeps two views of each field: the value applied to
//! the list query and the value shown in its input control. They only differ
//! for the branch field, whose keystrokes settle after [`BRANCH_DEBOUNCE`] of
//! inactivity so a burst of typing produces a single reload.

use std::time::{Duration, Instant};

pub const BRANCH_DEBOUNCE: Duration = Duration::from_millis(300);
pub const DEFAULT_LIMIT: u32 = 20;

pub const STATUS_OPTIONS: &[&str] = &["", "success", "failed", "running", "canceled"];
pub const SINCE_OPTIONS: &[&str] = &["", "1h", "24h", "7d", "30d"];
pub const PROGRAM_OPTIONS: &[&str] = &["", "terraform", "tofu"];
pub const LIMIT_OPTIONS: &[u32] = &[10, 20, 50, 100];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    Status,
    Since,
    Program,
    Branch,
    HasChanges,
    Limit,
}

impl FilterField {
    pub const ALL: [FilterField; 6] = [
        FilterField::Status,
        FilterField::Since,
        FilterField::Program,
        FilterField::Branch,
        FilterField::HasChanges,
        FilterField::Limit,
    ];

    /// Query parameter name understood by `GET /api/runs`.
    pub fn key(self) -> &'static str {
        match self {
            FilterField::Status => "status",
            FilterField::Since => "since",
            FilterField::Program => "program",
            FilterField::Branch => "branch",
            FilterField::HasChanges => "has-changes",
            FilterField::Limit => "limit",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            FilterField::Status => "Status",
            FilterField::Since => "Since",
            FilterField::Program => "Program",
            FilterField::Branch => "Branch",
            FilterField::HasChanges => "Has changes",
            FilterField::Limit => "Limit",
        }
    }

    pub fn next(self) -> FilterField {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> FilterField {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    Flag(bool),
    Count(u32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterChip {
    pub field: FilterField,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub status: String,
    pub since: String,
    pub program: String,
    pub branch: String,
    pub has_changes: bool,
    pub limit: u32,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            status: String::new(),
            since: String::new(),
            program: String::new(),
            branch: String::new(),
            has_changes: false,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl FilterState {
    /// Parameters for the list endpoint, in a stable order. Empty text fields
    /// and an unset has-changes flag are left out entirely.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        for (field, value) in [
            (FilterField::Status, &self.status),
            (FilterField::Since, &self.since),
            (FilterField::Program, &self.program),
            (FilterField::Branch, &self.branch),
        ] {
            if !value.is_empty() {
                pairs.push((field.key(), value.clone()));
            }
        }
        if self.has_changes {
            pairs.push((FilterField::HasChanges.key(), "true".to_string()));
        }
        if self.limit > 0 {
            pairs.push((FilterField::Limit.key(), self.limit.to_string()));
        }
        pairs
    }

    /// Removable chips for every active filter. The result limit is a page
    /// size rather than a filter and never shows up here.
    pub fn active_filters(&self) -> Vec<FilterChip> {
        let mut chips = Vec::new();
        for (field, value) in [
            (FilterField::Status, &self.status),
            (FilterField::Since, &self.since),
            (FilterField::Program, &self.program),
            (FilterField::Branch, &self.branch),
        ] {
            if !value.is_empty() {
                chips.push(FilterChip {
                    field,
                    label: format!("{}:{}", field.key(), value),
                });
            }
        }
        if self.has_changes {
            chips.push(FilterChip {
                field: FilterField::HasChanges,
                label: "has-changes".to_string(),
            });
        }
        chips
    }
}

#[derive(Debug)]
pub struct FilterController {
    applied: FilterState,
    branch_draft: String,
    branch_deadline: Option<Instant>,
    focused: FilterField,
}

impl FilterController {
    pub fn new(initial: FilterState) -> Self {
        Self {
            branch_draft: initial.branch.clone(),
            applied: initial,
            branch_deadline: None,
            focused: FilterField::Status,
        }
    }

    pub fn state(&self) -> &FilterState {
        &self.applied
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        self.applied.query_pairs()
    }

    pub fn active_filters(&self) -> Vec<FilterChip> {
        self.applied.active_filters()
    }

    /// Updates one field. Returns `true` when the change took effect now and
    /// the list must be reloaded; branch edits return `false` and settle later
    /// through [`FilterController::settle`].
    pub fn set_filter(&mut self, field: FilterField, value: FilterValue, now: Instant) -> bool {
        match (field, value) {
            (FilterField::Status, FilterValue::Text(v)) => self.applied.status = v,
            (FilterField::Since, FilterValue::Text(v)) => self.applied.since = v,
            (FilterField::Program, FilterValue::Text(v)) => self.applied.program = v,
            (FilterField::Branch, FilterValue::Text(v)) => {
                self.branch_draft = v;
                self.branch_deadline = Some(now + BRANCH_DEBOUNCE);
                return false;
            }
            (FilterField::HasChanges, FilterValue::Flag(v)) => self.applied.has_changes = v,
            (FilterField::Limit, FilterValue::Count(n)) => self.applied.limit = n.max(1),
            (field, value) => {
                tracing::warn!("ignoring {value:?} for filter {}", field.key());
                return false;
            }
        }
        true
    }

    /// Applies a pending branch edit once the input has been idle long
    /// enough. Returns `true` when a reload is due.
    pub fn settle(&mut self, now: Instant) -> bool {
        match self.branch_deadline {
            Some(deadline) if now >= deadline => {
                self.branch_deadline = None;
                self.applied.branch = self.branch_draft.clone();
                true
            }
            _ => false,
        }
    }

    pub fn has_pending(&self) -> bool {
        self.branch_deadline.is_some()
    }

    /// Resets both the applied value and the control's displayed value.
    pub fn clear(&mut self, field: FilterField) {
        match field {
            FilterField::Status => self.applied.status.clear(),
            FilterField::Since => self.applied.since.clear(),
            FilterField::Program => self.applied.program.clear(),
            FilterField::Branch => {
                self.applied.branch.clear();
                self.branch_draft.clear();
                self.branch_deadline = None;
            }
            FilterField::HasChanges => self.applied.has_changes = false,
            FilterField::Limit => self.applied.limit = DEFAULT_LIMIT,
        }
    }

    /// Steps a select control to its next or previous option.
    pub fn cycle(&mut self, field: FilterField, forward: bool, now: Instant) -> bool {
        let step = |options: &[&str], current: &str| -> String {
            let len = options.len();
            let next = match options.iter().position(|o| *o == current) {
                Some(i) if forward => (i + 1) % len,
                Some(i) => (i + len - 1) % len,
                None => 0,
            };
            options[next].to_string()
        };
        let value = match field {
            FilterField::Status => FilterValue::Text(step(STATUS_OPTIONS, &self.applied.status)),
            FilterField::Since => FilterValue::Text(step(SINCE_OPTIONS, &self.applied.since)),
            FilterField::Program => {
                FilterValue::Text(step(PROGRAM_OPTIONS, &self.applied.program))
            }
            FilterField::HasChanges => FilterValue::Flag(!self.applied.has_changes),
            FilterField::Limit => {
                let len = LIMIT_OPTIONS.len();
                let next = match LIMIT_OPTIONS.iter().position(|l| *l == self.applied.limit) {
                    Some(i) if forward => (i + 1) % len,
                    Some(i) => (i + len - 1) % len,
                    None => 0,
                };
                FilterValue::Count(LIMIT_OPTIONS[next])
            }
            FilterField::Branch => return false,
        };
        self.set_filter(field, value, now)
    }

    /// The value an input control currently displays.
    pub fn display_value(&self, field: FilterField) -> String {
        match field {
            FilterField::Status => self.applied.status.clone(),
            FilterField::Since => self.applied.since.clone(),
            FilterField::Program => self.applied.program.clone(),
            FilterField::Branch => self.branch_draft.clone(),
            FilterField::HasChanges => {
                let shown = if self.applied.has_changes { "yes" } else { "no" };
                shown.to_string()
            }
            FilterField::Limit => self.applied.limit.to_string(),
        }
    }

    pub fn branch_draft(&self) -> &str {
        &self.branch_draft
    }

    pub fn focused(&self) -> FilterField {
        self.focused
    }

    pub fn focus_next(&mut self) {
        self.focused = self.focused.next();
    }

    pub fn focus_prev(&mut self) {
        self.focused = self.focused.prev();
    }
}
