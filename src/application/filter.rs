use crate::domain::todo::{StatusFilter, Todo};

/// Search text plus status selection. Lives only in the view layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub search: String,
    pub status: StatusFilter,
}

fn matches_search(todo: &Todo, needle_lower: &str) -> bool {
    needle_lower.is_empty()
        || todo.title.to_lowercase().contains(needle_lower)
        || todo.description.to_lowercase().contains(needle_lower)
}

/// Filters `todos` by a case-insensitive substring of title or description,
/// then by completion status. Input order is kept.
pub fn apply<'a>(todos: &'a [Todo], search: &str, status: StatusFilter) -> Vec<&'a Todo> {
    let needle = search.to_lowercase();
    todos
        .iter()
        .filter(|t| matches_search(t, &needle))
        .filter(|t| status.matches(t))
        .collect()
}

/// Derived projection of the authoritative list: indices of the visible
/// todos plus a selection cursor. Never owns todo data.
#[derive(Debug, Default)]
pub struct TodoFilterView {
    state: FilterState,
    visible: Vec<usize>,
    selected: usize,
    synced_revision: Option<u64>,
}

impl TodoFilterView {
    pub fn new() -> Self { Self::default() }

    pub fn search(&self) -> &str { &self.state.search }

    pub fn status(&self) -> StatusFilter { self.state.status }

    pub fn set_search(&mut self, search: impl Into<String>, todos: &[Todo]) {
        self.state.search = search.into();
        self.recompute(todos);
    }

    pub fn push_search_char(&mut self, c: char, todos: &[Todo]) {
        self.state.search.push(c);
        self.recompute(todos);
    }

    pub fn pop_search_char(&mut self, todos: &[Todo]) {
        self.state.search.pop();
        self.recompute(todos);
    }

    pub fn set_status(&mut self, status: StatusFilter, todos: &[Todo]) {
        self.state.status = status;
        self.recompute(todos);
    }

    pub fn cycle_status(&mut self, todos: &[Todo]) {
        self.set_status(self.state.status.next(), todos);
    }

    /// Recomputes when the authoritative list has moved to a new revision.
    pub fn sync(&mut self, revision: u64, todos: &[Todo]) {
        if self.synced_revision != Some(revision) {
            self.synced_revision = Some(revision);
            self.recompute(todos);
        }
    }

    pub fn recompute(&mut self, todos: &[Todo]) {
        let needle = self.state.search.to_lowercase();
        self.visible = todos
            .iter()
            .enumerate()
            .filter(|(_, t)| matches_search(t, &needle) && self.state.status.matches(t))
            .map(|(i, _)| i)
            .collect();
        // Clamp selection within filtered bounds
        let len = self.visible.len();
        if len == 0 { self.selected = 0; } else if self.selected >= len { self.selected = len - 1; }
    }

    pub fn len(&self) -> usize { self.visible.len() }

    pub fn is_empty(&self) -> bool { self.visible.is_empty() }

    pub fn visible<'a>(&'a self, todos: &'a [Todo]) -> impl Iterator<Item = &'a Todo> + 'a {
        self.visible.iter().filter_map(move |&i| todos.get(i))
    }

    pub fn selected_index(&self) -> Option<usize> {
        if self.visible.is_empty() { None } else { Some(self.selected) }
    }

    pub fn selected<'a>(&self, todos: &'a [Todo]) -> Option<&'a Todo> {
        self.visible.get(self.selected).and_then(|&i| todos.get(i))
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.visible.len() { self.selected += 1; }
    }
}
