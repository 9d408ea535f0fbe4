//! Detail views and the pure description of what the content pane shows.

use crate::app::{AppState, RunDetail};
use crate::format;
use crate::model::{Resource, Run};
use crate::timeline::{self, TimelineLayout};

pub const SELECT_A_RUN: &str = "Select a run to view details";
pub const LOADING_RUN: &str = "Loading run...";
pub const RUN_FAILED: &str = "Failed to load run";
pub const NO_EVENTS: &str = "No resource events";
pub const NO_TIMELINE: &str = "No resource timeline";
pub const NO_TIMING: &str = "No timing data available";
pub const LOADING_OUTPUT: &str = "Loading output...";
pub const NO_OUTPUT: &str = "No output available";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum View {
    #[default]
    Details,
    Events,
    Timeline,
    Output,
}

impl View {
    pub const ALL: [View; 4] = [View::Details, View::Events, View::Timeline, View::Output];

    pub fn title(self) -> &'static str {
        match self {
            View::Details => "Details",
            View::Events => "Events",
            View::Timeline => "Timeline",
            View::Output => "Output",
        }
    }

    pub fn key(self) -> char {
        match self {
            View::Details => 'd',
            View::Events => 'e',
            View::Timeline => 't',
            View::Output => 'o',
        }
    }
}

/// Raw log text of the selected run. Never cached across visits.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OutputSlot {
    #[default]
    Idle,
    Loading,
    Ready(String),
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailSection {
    pub title: String,
    pub fields: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContentView<'a> {
    Placeholder(&'static str),
    Details(Vec<DetailSection>),
    Events(&'a [Resource]),
    Timeline { span_ms: u64, bars: Vec<timeline::TimelineBar> },
    Output(&'a str),
}

pub fn describe(state: &AppState) -> ContentView<'_> {
    if state.selected_id().is_none() {
        return ContentView::Placeholder(SELECT_A_RUN);
    }
    let run = match &state.detail {
        RunDetail::Ready(run) => run.as_ref(),
        RunDetail::Failed(_) => return ContentView::Placeholder(RUN_FAILED),
        RunDetail::Empty => return ContentView::Placeholder(LOADING_RUN),
    };

    match state.view {
        View::Details => ContentView::Details(detail_sections(run)),
        View::Events if run.resources.is_empty() => ContentView::Placeholder(NO_EVENTS),
        View::Events => ContentView::Events(&run.resources),
        View::Timeline => match timeline::layout(&run.resources) {
            TimelineLayout::NoResources => ContentView::Placeholder(NO_TIMELINE),
            TimelineLayout::NoTimingData => ContentView::Placeholder(NO_TIMING),
            TimelineLayout::Chart { span_ms, bars } => ContentView::Timeline { span_ms, bars },
        },
        View::Output => match &state.output {
            OutputSlot::Idle | OutputSlot::Loading => ContentView::Placeholder(LOADING_OUTPUT),
            OutputSlot::Ready(text) => ContentView::Output(text),
            OutputSlot::Missing => ContentView::Placeholder(NO_OUTPUT),
        },
    }
}

fn field(label: &str, value: impl Into<String>) -> (String, String) {
    (label.to_string(), value.into())
}

/// Largest useful scroll offset for `content`: the last line may reach the
/// top of the pane, never beyond. The timeline axis does not scroll.
pub fn max_scroll(content: &ContentView) -> u16 {
    let last = match content {
        ContentView::Placeholder(_) => 0,
        ContentView::Details(sections) => {
            let lines: usize = sections.iter().map(|s| s.fields.len() + 1).sum();
            (lines + sections.len().saturating_sub(1)).saturating_sub(1)
        }
        ContentView::Events(resources) => resources.len(),
        ContentView::Timeline { bars, .. } => bars.len().saturating_sub(1),
        ContentView::Output(text) => text.lines().count().saturating_sub(1),
    };
    u16::try_from(last).unwrap_or(u16::MAX)
}

pub fn detail_sections(run: &Run) -> Vec<DetailSection> {
    let mut sections = vec![DetailSection {
        title: "Run Info".to_string(),
        fields: vec![
            field("ID", run.id.as_str()),
            field("Status", run.status.as_str()),
            field("Workspace", run.workspace.as_str()),
            field("Duration", format::duration(run.duration_ms)),
            field("Program", run.program_name()),
            field("User", run.user_name()),
            field("Timestamp", format::timestamp(run.timestamp)),
            field("Changes", format::changes(run.changes.as_ref())),
        ],
    }];

    if let Some(git) = run.git.as_ref().filter(|g| !g.commit.is_empty()) {
        let mut fields = vec![
            field("Commit", git.commit.as_str()),
            field("Branch", if git.branch.is_empty() { "-" } else { git.branch.as_str() }),
            field("Dirty", if git.dirty { "Yes" } else { "No" }),
        ];
        if !git.message.is_empty() {
            fields.push(field("Message", git.message.as_str()));
        }
        sections.push(DetailSection { title: "Git".to_string(), fields });
    }

    if let Some(ci) = run.ci.as_ref().filter(|c| !c.provider.is_empty()) {
        let mut fields = vec![
            field("Provider", ci.provider.as_str()),
            field("Actor", if ci.actor.is_empty() { "-" } else { ci.actor.as_str() }),
        ];
        if !ci.workflow.is_empty() {
            fields.push(field("Workflow", ci.workflow.as_str()));
        }
        sections.push(DetailSection { title: "CI".to_string(), fields });
    }

    if !run.resources.is_empty() {
        sections.push(DetailSection {
            title: format!("Resources ({})", run.resources.len()),
            fields: run
                .resources
                .iter()
                .map(|r| field(r.action.symbol(), r.address.as_str()))
                .collect(),
        });
    }

    sections
}
