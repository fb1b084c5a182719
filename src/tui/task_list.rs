//! Navigable task lists.
//!
//! A `TaskList` is a cache of store rows plus a cursor and an optional
//! substring filter. It is never patched: after every mutation the controller
//! calls `TaskLists::reload`, which re-reads the store and replaces both
//! partitions wholesale.

use chrono::Local;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use crate::{
    db::{format_due_relative, Store},
    error::StoreError,
    task::Task,
    tui::{
        colors::{ACCENT, DESC_MUTED, DESC_SELECTED, TITLE_MUTED, TITLE_SELECTED},
        enums::ListPane,
        input::InputField,
    },
};

/// What a list row needs to know about the item it shows.
pub trait ListEntry {
    fn title(&self) -> &str;
    fn description(&self) -> &str;
    fn filter_value(&self) -> &str;
}

impl ListEntry for Task {
    fn title(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn filter_value(&self) -> &str {
        &self.name
    }
}

/// One ordered, cursor-addressable list of tasks.
#[derive(Debug, Default)]
pub struct TaskList {
    items: Vec<Task>,
    /// Indices into `items` that pass the filter.
    visible: Vec<usize>,
    state: ListState,
    pub filter: InputField,
}

impl TaskList {
    pub fn new() -> Self {
        Self {
            filter: InputField::new("filter"),
            ..Self::default()
        }
    }

    /// Replace every item. The cursor is kept where it was, clamped to the new length.
    pub fn set_items(&mut self, tasks: Vec<Task>) {
        self.items = tasks;
        self.refilter();
    }

    pub fn items(&self) -> &[Task] {
        &self.items
    }

    /// Number of rows currently shown (after filtering).
    pub fn len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.state.selected()
    }

    /// The task under the cursor, if the visible list is non-empty.
    pub fn current_selection(&self) -> Option<&Task> {
        let row = self.state.selected()?;
        self.visible.get(row).and_then(|&i| self.items.get(i))
    }

    pub fn move_up(&mut self) {
        if let Some(row) = self.state.selected() {
            self.state.select(Some(row.saturating_sub(1)));
        }
    }

    /// Move the cursor down. Returns `false` when it is already on the last
    /// row (or the list is empty) and could not move.
    pub fn move_down(&mut self) -> bool {
        match self.state.selected() {
            Some(row) if row + 1 < self.visible.len() => {
                self.state.select(Some(row + 1));
                true
            }
            _ => false,
        }
    }

    pub fn is_filtered(&self) -> bool {
        !self.filter.value.is_empty()
    }

    pub fn set_filter(&mut self, text: &str) {
        self.filter.set_value(text);
        self.refilter();
    }

    pub fn clear_filter(&mut self) {
        self.filter.clear();
        self.refilter();
    }

    /// Recompute the visible rows from the filter text.
    pub fn refilter(&mut self) {
        let needle = self.filter.value.to_lowercase();
        self.visible = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, t)| needle.is_empty() || t.filter_value().to_lowercase().contains(&needle))
            .map(|(i, _)| i)
            .collect();

        let selected = match self.state.selected() {
            _ if self.visible.is_empty() => None,
            Some(row) => Some(row.min(self.visible.len() - 1)),
            None => Some(0),
        };
        self.state.select(selected);
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect, title: &str, focused: bool) {
        let today = Local::now().date_naive();
        let selected = self.state.selected();
        let rows: Vec<ListItem> = self
            .visible
            .iter()
            .enumerate()
            .map(|(row, &i)| {
                let task = &self.items[i];
                let is_selected = focused && selected == Some(row);
                let (title_style, desc_style) = if is_selected {
                    (
                        Style::default().fg(TITLE_SELECTED).add_modifier(Modifier::BOLD),
                        Style::default().fg(DESC_SELECTED),
                    )
                } else {
                    (
                        Style::default().fg(TITLE_MUTED).add_modifier(Modifier::BOLD),
                        Style::default().fg(DESC_MUTED),
                    )
                };
                let mut first = vec![
                    Span::raw(if task.is_done { "[x] " } else { "[ ] " }),
                    Span::styled(task.title().to_string(), title_style),
                ];
                if task.due_date.is_some() {
                    first.push(Span::styled(
                        format!("  ({})", format_due_relative(task.due_date, today)),
                        desc_style,
                    ));
                }
                ListItem::new(vec![
                    Line::from(first),
                    Line::from(Span::styled(format!("    {}", task.description()), desc_style)),
                ])
            })
            .collect();

        let border = if focused { ACCENT } else { Color::Gray };
        let heading = if self.is_filtered() {
            format!("{} ({}/{}) filter: {}", title, self.visible.len(), self.items.len(), self.filter.value)
        } else {
            format!("{} ({})", title, self.items.len())
        };
        let list = List::new(rows)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border))
                    .title(heading),
            )
            .highlight_symbol(if focused { "> " } else { "  " });

        f.render_stateful_widget(list, area, &mut self.state);
    }
}

/// The in-progress and completed partitions plus which one is active.
#[derive(Debug)]
pub struct TaskLists {
    pub in_progress: TaskList,
    pub completed: TaskList,
    pub active: ListPane,
}

impl Default for TaskLists {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskLists {
    pub fn new() -> Self {
        Self {
            in_progress: TaskList::new(),
            completed: TaskList::new(),
            active: ListPane::InProgress,
        }
    }

    /// Split a full task listing by completion state.
    pub fn set_items(&mut self, tasks: Vec<Task>) {
        let (completed, in_progress): (Vec<Task>, Vec<Task>) =
            tasks.into_iter().partition(|t| t.is_done);
        self.in_progress.set_items(in_progress);
        self.completed.set_items(completed);
    }

    /// Re-read every task from the store. On failure both lists are emptied
    /// and the error is handed back for display.
    pub fn reload(&mut self, store: &Store) -> Result<usize, StoreError> {
        match store.list_tasks() {
            Ok(tasks) => {
                let count = tasks.len();
                self.set_items(tasks);
                Ok(count)
            }
            Err(e) => {
                self.set_items(Vec::new());
                Err(e)
            }
        }
    }

    pub fn pane(&self, pane: ListPane) -> &TaskList {
        match pane {
            ListPane::InProgress => &self.in_progress,
            ListPane::Completed => &self.completed,
        }
    }

    pub fn active(&self) -> &TaskList {
        self.pane(self.active)
    }

    pub fn active_mut(&mut self) -> &mut TaskList {
        match self.active {
            ListPane::InProgress => &mut self.in_progress,
            ListPane::Completed => &mut self.completed,
        }
    }

    pub fn switch_pane(&mut self) {
        self.active = self.active.other();
    }

    pub fn current_selection(&self) -> Option<&Task> {
        self.active().current_selection()
    }

    /// Whether either pane has filter text.
    pub fn is_filtered(&self) -> bool {
        self.in_progress.is_filtered() || self.completed.is_filtered()
    }

    pub fn clear_filters(&mut self) {
        self.in_progress.clear_filter();
        self.completed.clear_filter();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: i64, name: &str, done: bool) -> Task {
        Task { id, is_done: done, ..Task::draft(name, "") }
    }

    #[test]
    fn test_empty_list_has_no_selection() {
        let mut list = TaskList::new();
        list.set_items(Vec::new());
        assert!(list.is_empty());
        assert_eq!(list.current_selection(), None);
        assert!(!list.move_down());
        list.move_up();
        assert_eq!(list.cursor(), None);
    }

    #[test]
    fn test_navigation_stops_at_ends() {
        let mut list = TaskList::new();
        list.set_items(vec![task(1, "a", false), task(2, "b", false)]);
        assert_eq!(list.current_selection().map(|t| t.id), Some(1));

        list.move_up();
        assert_eq!(list.cursor(), Some(0));
        assert!(list.move_down());
        assert_eq!(list.current_selection().map(|t| t.id), Some(2));
        assert!(!list.move_down());
        assert_eq!(list.cursor(), Some(1));
    }

    #[test]
    fn test_set_items_clamps_cursor() {
        let mut list = TaskList::new();
        list.set_items(vec![task(1, "a", false), task(2, "b", false), task(3, "c", false)]);
        list.move_down();
        list.move_down();
        list.set_items(vec![task(1, "a", false)]);
        assert_eq!(list.cursor(), Some(0));
        list.set_items(Vec::new());
        assert_eq!(list.cursor(), None);
        list.set_items(vec![task(4, "d", false)]);
        assert_eq!(list.current_selection().map(|t| t.id), Some(4));
    }

    #[test]
    fn test_filter_matches_name_case_insensitively() {
        let mut list = TaskList::new();
        list.set_items(vec![
            task(1, "Buy milk", false),
            task(2, "Call mum", false),
            task(3, "Milk the cow", false),
        ]);
        list.set_filter("MILK");
        assert_eq!(list.len(), 2);
        assert_eq!(list.current_selection().map(|t| t.id), Some(1));
        assert!(list.move_down());
        assert_eq!(list.current_selection().map(|t| t.id), Some(3));

        list.set_filter("zzz");
        assert_eq!(list.current_selection(), None);
        list.clear_filter();
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_partition_by_done_flag() {
        let mut lists = TaskLists::new();
        lists.set_items(vec![task(1, "a", false), task(2, "b", true), task(3, "c", false)]);
        let open: Vec<i64> = lists.in_progress.items().iter().map(|t| t.id).collect();
        let done: Vec<i64> = lists.completed.items().iter().map(|t| t.id).collect();
        assert_eq!(open, vec![1, 3]);
        assert_eq!(done, vec![2]);

        lists.switch_pane();
        assert_eq!(lists.active, ListPane::Completed);
        assert_eq!(lists.current_selection().map(|t| t.id), Some(2));
    }

    #[test]
    fn test_reload_reads_store() {
        let store = Store::open_in_memory().unwrap();
        store.create_task(&Task::draft("open", "")).unwrap();
        store
            .create_task(&Task { is_done: true, ..Task::draft("closed", "") })
            .unwrap();

        let mut lists = TaskLists::new();
        assert_eq!(lists.reload(&store).unwrap(), 2);
        assert_eq!(lists.in_progress.len(), 1);
        assert_eq!(lists.completed.len(), 1);
    }

    #[test]
    fn test_reload_failure_empties_lists() {
        let store = Store::open_in_memory().unwrap();
        store.create_task(&Task::draft("open", "")).unwrap();
        let mut lists = TaskLists::new();
        lists.reload(&store).unwrap();

        store.connection().execute_batch("DROP TABLE task_tags; DROP TABLE tasks;").unwrap();
        assert!(lists.reload(&store).is_err());
        assert!(lists.in_progress.is_empty());
        assert!(lists.completed.is_empty());
    }

    #[test]
    fn test_task_is_a_list_entry() {
        let t = Task::draft("Title", "Body");
        assert_eq!(t.title(), "Title");
        assert_eq!(ListEntry::description(&t), "Body");
        assert_eq!(t.filter_value(), "Title");
    }
}
