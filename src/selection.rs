//! The fetched run collection, its client-side search subset, and the
//! selection pointing into that subset.

use crate::model::Run;

/// Case-insensitive substring match on workspace, user and run id.
/// `query` must already be lowercased.
pub fn matches_search(run: &Run, query: &str) -> bool {
    query.is_empty()
        || run.workspace.to_lowercase().contains(query)
        || run
            .user
            .as_deref()
            .is_some_and(|u| u.to_lowercase().contains(query))
        || run.id.to_lowercase().contains(query)
}

#[derive(Debug, Default)]
pub struct RunCollection {
    runs: Vec<Run>,
    visible: Vec<usize>,
    query: String,
}

impl RunCollection {
    pub fn replace(&mut self, runs: Vec<Run>) {
        self.runs = runs;
        self.filter_runs();
    }

    pub fn clear(&mut self) {
        self.runs.clear();
        self.visible.clear();
    }

    pub fn set_query(&mut self, query: &str) {
        query.clone_into(&mut self.query);
        self.filter_runs();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    fn filter_runs(&mut self) {
        let query = self.query.to_lowercase();
        self.visible = self
            .runs
            .iter()
            .enumerate()
            .filter(|(_, run)| matches_search(run, &query))
            .map(|(i, _)| i)
            .collect();
    }

    /// Every run the server returned, ignoring the search query.
    pub fn all(&self) -> &[Run] {
        &self.runs
    }

    pub fn len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    /// `index` is a position in the filtered subset.
    pub fn get(&self, index: usize) -> Option<&Run> {
        self.visible.get(index).and_then(|&i| self.runs.get(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Run> {
        self.visible.iter().filter_map(|&i| self.runs.get(i))
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.iter().position(|run| run.id == id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    id: Option<String>,
    index: Option<usize>,
}

impl Selection {
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn set(&mut self, id: String, index: usize) {
        self.id = Some(id);
        self.index = Some(index);
    }

    pub fn move_to(&mut self, index: usize) {
        self.index = Some(index);
    }

    pub fn clear(&mut self) {
        self.id = None;
        self.index = None;
    }

    /// Whether the selection agrees with `runs`: either nothing is selected,
    /// or the id sits exactly at the selected index.
    pub fn is_consistent(&self, runs: &RunCollection) -> bool {
        match (&self.id, self.index) {
            (None, None) => true,
            (Some(id), Some(index)) => runs.get(index).is_some_and(|run| run.id == *id),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconcile {
    /// The selected run is still visible at this index.
    Keep(usize),
    SelectFirst,
    Clear,
}

pub fn reconcile(selected: Option<&str>, runs: &RunCollection) -> Reconcile {
    if let Some(index) = selected.and_then(|id| runs.position(id)) {
        Reconcile::Keep(index)
    } else if runs.is_empty() {
        Reconcile::Clear
    } else {
        Reconcile::SelectFirst
    }
}
