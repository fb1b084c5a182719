//! Main application logic for the terminal user interface.
//!
//! `App` is the controller: it owns the store handle, the interaction mode,
//! the task lists and the entry form. Exactly one event is processed at a
//! time. Keys go to the lists while viewing and to the form while creating or
//! editing; quit and cancel are checked before that routing. Every store
//! mutation is followed by a full reload of the lists.

use std::io;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use tracing::{info, warn};

use crate::{
    db::Store,
    error::ValidationError,
    task::Task,
    tui::{
        colors::{mode_color, ACCENT},
        enums::{Focus, ListPane, Mode},
        task_form::{FormEvent, TaskForm},
        task_list::TaskLists,
        utils::centered_rect,
    },
};

/// Below this width the two lists are stacked instead of side by side.
const NARROW_WIDTH: u16 = 80;

/// One unit of input for the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize { width: u16, height: u16 },
    Form(FormEvent),
}

/// Application controller for the terminal user interface.
pub struct App {
    store: Store,
    mode: Mode,
    focus: Focus,
    lists: TaskLists,
    form: TaskForm,
    filtering: bool,
    show_help: bool,
    status_message: String,
    width: u16,
    height: u16,
}

impl App {
    /// Create the controller around an open store and load the task lists.
    pub fn new(store: Store) -> Self {
        let mut app = App {
            store,
            mode: Mode::Viewing,
            focus: Focus::List,
            lists: TaskLists::new(),
            form: TaskForm::new(),
            filtering: false,
            show_help: false,
            status_message: String::new(),
            width: 0,
            height: 0,
        };
        app.reload();
        app
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn lists(&self) -> &TaskLists {
        &self.lists
    }

    pub fn form(&self) -> &TaskForm {
        &self.form
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    fn set_status_message(&mut self, msg: String) {
        self.status_message = msg;
    }

    /// Rebuild both lists from the store.
    fn reload(&mut self) {
        if let Err(e) = self.lists.reload(&self.store) {
            warn!(error = %e, "failed to load tasks");
            self.set_status_message(format!("Error loading tasks: {}", e));
        }
    }

    /// Process one event. Returns true when the application should quit.
    pub fn handle_event(&mut self, event: AppEvent) -> bool {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Resize { width, height } => {
                self.width = width;
                self.height = height;
                false
            }
            AppEvent::Form(FormEvent::Submitted(draft)) => {
                self.apply_submission(draft);
                false
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if is_quit_key(key) {
            return true;
        }
        self.status_message.clear();

        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                self.show_help = false;
            }
            return false;
        }

        if key.code == KeyCode::Esc && self.cancel() {
            return false;
        }

        match (self.mode, self.focus) {
            (Mode::Viewing, Focus::List) => self.handle_list_input(key),
            _ => {
                self.handle_form_input(key);
                false
            }
        }
    }

    /// Handle the cancel key before mode routing. Returns true if it was consumed.
    fn cancel(&mut self) -> bool {
        if self.mode.uses_form() || self.focus == Focus::Form {
            self.form.cancel();
            if self.mode != Mode::Viewing {
                info!(from = self.mode.label(), "entry cancelled");
            }
            self.mode = Mode::Viewing;
            self.focus = Focus::List;
            return true;
        }
        if self.filtering || self.lists.is_filtered() {
            self.filtering = false;
            self.lists.clear_filters();
            return true;
        }
        false
    }

    /// Handle keyboard input while the task lists have focus.
    ///
    /// Returns true if the application should quit.
    fn handle_list_input(&mut self, key: KeyEvent) -> bool {
        if self.filtering {
            let list = self.lists.active_mut();
            match key.code {
                KeyCode::Enter => {
                    self.filtering = false;
                    let shown = self.lists.active().len();
                    self.set_status_message(format!("Filter applied ({} tasks)", shown));
                }
                KeyCode::Backspace => {
                    list.filter.handle_backspace();
                    list.refilter();
                }
                KeyCode::Char(c) => {
                    list.filter.handle_char(c);
                    list.refilter();
                }
                _ => {}
            }
            return false;
        }

        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Up | KeyCode::Char('k') => self.lists.active_mut().move_up(),
            KeyCode::Down | KeyCode::Char('j') => {
                if !self.lists.active_mut().move_down() {
                    // Quick-add: the form takes focus but the mode stays Viewing.
                    self.form.focus();
                    self.focus = Focus::Form;
                }
            }
            KeyCode::Tab | KeyCode::BackTab => self.lists.switch_pane(),
            KeyCode::Char('n') | KeyCode::Char('a') => self.start_create(),
            KeyCode::Char('e') | KeyCode::Enter => self.start_edit(),
            KeyCode::Char('d') | KeyCode::Delete => self.delete_selected(),
            KeyCode::Char(' ') | KeyCode::Char('x') => self.toggle_selected(),
            KeyCode::Char('/') => {
                self.filtering = true;
                self.set_status_message("Filter: type to match names, Enter to keep, Esc to clear".to_string());
            }
            KeyCode::Char('r') => {
                self.reload();
                if self.status_message.is_empty() {
                    self.set_status_message("Tasks reloaded".to_string());
                }
            }
            KeyCode::Char('?') => self.show_help = true,
            _ => {}
        }
        false
    }

    /// Forward keyboard input to the entry form.
    fn handle_form_input(&mut self, key: KeyEvent) {
        if self.mode == Mode::Viewing && key.code == KeyCode::Up {
            self.form.blur();
            self.focus = Focus::List;
            return;
        }
        if let Some(event) = self.form.handle_key(key) {
            self.handle_event(AppEvent::Form(event));
        }
    }

    fn start_create(&mut self) {
        self.form.cancel();
        self.form.focus();
        self.mode = Mode::Creating;
        self.focus = Focus::Form;
        info!("mode -> {}", self.mode.label());
    }

    fn start_edit(&mut self) {
        let Some(task) = self.lists.current_selection().cloned() else {
            self.set_status_message("No task selected".to_string());
            return;
        };
        self.form.cancel();
        self.form.load_task(&task);
        self.form.focus();
        self.mode = Mode::Editing;
        self.focus = Focus::Form;
        info!(id = task.id, "mode -> {}", self.mode.label());
    }

    /// Persist a submitted draft: insert when it has no ID, update otherwise.
    ///
    /// On failure the form is refilled and the mode is left as it was.
    fn apply_submission(&mut self, mut draft: Task) {
        if draft.name.trim().is_empty() {
            self.set_status_message(ValidationError::EmptyName.to_string());
            self.form.restore(&draft);
            self.focus = Focus::Form;
            return;
        }
        draft.name = draft.name.trim().to_string();

        let result = if draft.is_persisted() {
            self.store.update_task(&draft).map(|_| draft.id)
        } else {
            self.store.create_task(&draft)
        };

        match result {
            Ok(id) => {
                let verb = if draft.is_persisted() { "updated" } else { "created" };
                info!(id, "task {}", verb);
                self.mode = Mode::Viewing;
                self.focus = Focus::List;
                self.reload();
                if self.status_message.is_empty() {
                    self.set_status_message(format!("Task {}: {}", verb, draft.name));
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to save task");
                self.set_status_message(format!("Error saving task: {}", e));
                self.form.restore(&draft);
                self.focus = Focus::Form;
            }
        }
    }

    fn delete_selected(&mut self) {
        let Some(task) = self.lists.current_selection().cloned() else {
            return;
        };
        match self.store.delete_task(task.id) {
            Ok(()) => {
                info!(id = task.id, "task deleted");
                self.reload();
                if self.status_message.is_empty() {
                    self.set_status_message(format!("Deleted: {}", task.name));
                }
            }
            Err(e) => {
                warn!(id = task.id, error = %e, "failed to delete task");
                self.set_status_message(format!("Error deleting task: {}", e));
            }
        }
    }

    /// Flip `is_done` on the selected task (read, modify, write) and reload.
    fn toggle_selected(&mut self) {
        let Some(task) = self.lists.current_selection().cloned() else {
            return;
        };
        let updated = task.toggled();
        match self.store.update_task(&updated) {
            Ok(()) => {
                info!(id = task.id, done = updated.is_done, "task toggled");
                self.reload();
                if self.status_message.is_empty() {
                    let msg = if updated.is_done { "Marked done" } else { "Reopened" };
                    self.set_status_message(format!("{}: {}", msg, task.name));
                }
            }
            Err(e) => {
                warn!(id = task.id, error = %e, "failed to toggle task");
                self.set_status_message(format!("Error updating task: {}", e));
            }
        }
    }

    fn form_title(&self) -> String {
        match (self.mode, self.form.bound_id()) {
            (Mode::Editing, Some(id)) => format!("Edit task #{}", id),
            (Mode::Creating, _) => "New task".to_string(),
            _ => "Quick add".to_string(),
        }
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else if self.mode.uses_form() || self.focus == Focus::Form {
            "enter save  tab next field  esc cancel".to_string()
        } else {
            "n new  e edit  d delete  space toggle  / filter  tab switch list  ? help  ctrl+q quit"
                .to_string()
        };
        let line = Line::from(vec![
            Span::styled(
                format!(" {} ", self.mode.label()),
                Style::default()
                    .bg(mode_color(self.mode))
                    .fg(Color::Black)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::raw(text),
        ]);
        f.render_widget(Paragraph::new(line), area);
    }

    fn render_help(&self, f: &mut Frame, area: Rect) {
        let area = centered_rect(60, 60, area);
        f.render_widget(Clear, area);
        let bindings = [
            ("n / a", "new task"),
            ("e / enter", "edit selected task"),
            ("d / del", "delete selected task"),
            ("space / x", "toggle done"),
            ("up / down", "move; down on the last row opens quick add"),
            ("tab", "switch between in progress and completed"),
            ("/", "filter by name"),
            ("r", "reload from disk"),
            ("esc", "cancel form or clear filter"),
            ("ctrl+q", "quit"),
        ];
        let text: Vec<Line> = bindings
            .iter()
            .map(|(key, what)| {
                Line::from(vec![
                    Span::styled(format!("{:<12}", key), Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw(*what),
                ])
            })
            .collect();
        let help = Paragraph::new(text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(ACCENT))
                    .title("Help"),
            )
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        f.render_widget(help, area);
    }

    /// Draw the whole screen.
    pub fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(4), Constraint::Length(1)])
            .split(f.area());

        let direction = if f.area().width < NARROW_WIDTH {
            Direction::Vertical
        } else {
            Direction::Horizontal
        };
        let panes = Layout::default()
            .direction(direction)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[0]);

        let list_focused = self.mode == Mode::Viewing && self.focus == Focus::List;
        let active = self.lists.active;
        self.lists.in_progress.render(
            f,
            panes[0],
            ListPane::InProgress.title(),
            list_focused && active == ListPane::InProgress,
        );
        self.lists.completed.render(
            f,
            panes[1],
            ListPane::Completed.title(),
            list_focused && active == ListPane::Completed,
        );

        let title = self.form_title();
        self.form.render(f, chunks[1], &title);
        self.render_status_bar(f, chunks[2]);

        if self.show_help {
            self.render_help(f, f.area());
        }
    }

    /// Main event loop. Draws, then blocks for the next terminal event.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        let size = terminal.size()?;
        self.handle_event(AppEvent::Resize { width: size.width, height: size.height });

        loop {
            terminal.draw(|f| self.render(f))?;

            let event = match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => AppEvent::Key(key),
                Event::Resize(width, height) => AppEvent::Resize { width, height },
                _ => continue,
            };
            if self.handle_event(event) {
                break;
            }
        }
        Ok(())
    }
}

fn is_quit_key(key: KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    fn app() -> App {
        App::new(Store::open_in_memory().unwrap())
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        app.handle_event(AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn seed(app: &App, names: &[&str]) {
        for name in names {
            app.store().create_task(&Task::draft(name, "")).unwrap();
        }
    }

    fn reloaded(names: &[&str]) -> App {
        let mut app = app();
        seed(&app, names);
        press(&mut app, KeyCode::Char('r'));
        app
    }

    fn break_store(app: &App) {
        app.store()
            .connection()
            .execute_batch("DROP TABLE task_tags; DROP TABLE tasks;")
            .unwrap();
    }

    #[test]
    fn test_starts_viewing_with_list_focus() {
        let app = app();
        assert_eq!(app.mode(), Mode::Viewing);
        assert_eq!(app.focus(), Focus::List);
        assert!(app.lists().in_progress.is_empty());
    }

    #[test]
    fn test_create_buy_milk() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.mode(), Mode::Creating);
        assert_eq!(app.focus(), Focus::Form);

        type_str(&mut app, "Buy milk");
        press(&mut app, KeyCode::Tab);
        type_str(&mut app, "2%");
        press(&mut app, KeyCode::Enter);

        let tasks = app.store().list_tasks().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].name, "Buy milk");
        assert_eq!(tasks[0].description, "2%");
        assert!(!tasks[0].is_done);
        assert_eq!(app.mode(), Mode::Viewing);
        assert_eq!(app.focus(), Focus::List);
        assert_eq!(app.lists().in_progress.len(), 1);
        assert_eq!(app.form().name.value, "");
    }

    #[test]
    fn test_edit_updates_same_row() {
        let mut app = reloaded(&["first", "second"]);
        press(&mut app, KeyCode::Down);
        let target = app.lists().current_selection().unwrap().id;

        press(&mut app, KeyCode::Char('e'));
        assert_eq!(app.mode(), Mode::Editing);
        assert_eq!(app.form().name.value, "second");
        for _ in 0.."second".len() {
            press(&mut app, KeyCode::Backspace);
        }
        type_str(&mut app, "renamed");
        press(&mut app, KeyCode::Enter);

        let tasks = app.store().list_tasks().unwrap();
        assert_eq!(tasks.len(), 2);
        let edited = tasks.iter().find(|t| t.id == target).unwrap();
        assert_eq!(edited.name, "renamed");
        assert_eq!(app.mode(), Mode::Viewing);
    }

    #[test]
    fn test_edit_keeps_done_flag() {
        let mut app = app();
        app.store()
            .create_task(&Task { is_done: true, ..Task::draft("done already", "") })
            .unwrap();
        press(&mut app, KeyCode::Char('r'));
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('e'));
        type_str(&mut app, "!");
        press(&mut app, KeyCode::Enter);

        let task = &app.store().list_tasks().unwrap()[0];
        assert_eq!(task.name, "done already!");
        assert!(task.is_done);
        assert_eq!(app.lists().completed.len(), 1);
    }

    #[test]
    fn test_cancel_leaves_store_unchanged() {
        let mut app = reloaded(&["keep"]);
        let before = app.store().list_tasks().unwrap();

        press(&mut app, KeyCode::Char('n'));
        type_str(&mut app, "discard me");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode(), Mode::Viewing);
        assert_eq!(app.form().name.value, "");
        assert!(!app.form().is_focused());

        press(&mut app, KeyCode::Char('e'));
        type_str(&mut app, " more");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode(), Mode::Viewing);
        assert!(!app.form().is_editing());

        assert_eq!(app.store().list_tasks().unwrap(), before);
    }

    #[test]
    fn test_delete_selected_and_empty_noop() {
        let mut app = reloaded(&["only"]);
        press(&mut app, KeyCode::Char('d'));
        assert!(app.store().list_tasks().unwrap().is_empty());
        assert!(app.lists().in_progress.is_empty());

        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.mode(), Mode::Viewing);
        assert!(app.status_message().is_empty());
    }

    #[test]
    fn test_edit_and_toggle_on_empty_list_are_guarded() {
        let mut app = app();
        press(&mut app, KeyCode::Char('e'));
        assert_eq!(app.mode(), Mode::Viewing);
        assert_eq!(app.status_message(), "No task selected");
        press(&mut app, KeyCode::Char(' '));
        assert!(app.store().list_tasks().unwrap().is_empty());
    }

    #[test]
    fn test_toggle_moves_task_between_lists() {
        let mut app = reloaded(&["flip"]);
        press(&mut app, KeyCode::Char(' '));
        assert!(app.store().list_tasks().unwrap()[0].is_done);
        assert!(app.lists().in_progress.is_empty());
        assert_eq!(app.lists().completed.len(), 1);

        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('x'));
        assert!(!app.store().list_tasks().unwrap()[0].is_done);
        assert_eq!(app.lists().in_progress.len(), 1);
    }

    #[test]
    fn test_down_past_last_row_quick_adds_in_viewing_mode() {
        let mut app = reloaded(&["a", "b"]);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.focus(), Focus::List);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.focus(), Focus::Form);
        assert_eq!(app.mode(), Mode::Viewing);

        type_str(&mut app, "c");
        press(&mut app, KeyCode::Enter);
        let names: Vec<String> =
            app.store().list_tasks().unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(app.focus(), Focus::List);
        assert_eq!(app.mode(), Mode::Viewing);
    }

    #[test]
    fn test_up_leaves_quick_add() {
        let mut app = reloaded(&["a"]);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.focus(), Focus::Form);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.focus(), Focus::List);
        assert!(!app.form().is_focused());
    }

    #[test]
    fn test_empty_name_is_rejected_before_store() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        type_str(&mut app, "   ");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode(), Mode::Creating);
        assert_eq!(app.focus(), Focus::Form);
        assert_eq!(app.status_message(), "task name cannot be empty");
        assert_eq!(app.form().name.value, "   ");
        assert!(app.store().list_tasks().unwrap().is_empty());
    }

    #[test]
    fn test_failed_submit_keeps_mode_and_input() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        type_str(&mut app, "Buy milk");
        break_store(&app);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.mode(), Mode::Creating);
        assert_eq!(app.focus(), Focus::Form);
        assert_eq!(app.form().name.value, "Buy milk");
        assert!(app.status_message().starts_with("Error saving task"));
    }

    fn block_updates(app: &App) {
        app.store()
            .connection()
            .execute_batch(
                "CREATE TRIGGER block_updates BEFORE UPDATE ON tasks
                 BEGIN SELECT RAISE(ABORT, 'updates blocked'); END;",
            )
            .unwrap();
    }

    fn unblock_updates(app: &App) {
        app.store().connection().execute_batch("DROP TRIGGER block_updates;").unwrap();
    }

    #[test]
    fn test_failed_edit_can_be_retried() {
        let mut app = reloaded(&["draft"]);
        let id = app.lists().current_selection().unwrap().id;
        press(&mut app, KeyCode::Char('e'));
        type_str(&mut app, " v2");
        block_updates(&app);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.mode(), Mode::Editing);
        assert_eq!(app.focus(), Focus::Form);
        assert_eq!(app.form().bound_id(), Some(id));
        assert_eq!(app.form().name.value, "draft v2");
        assert!(app.status_message().starts_with("Error saving task"));
        assert_eq!(app.store().get_task(id).unwrap().unwrap().name, "draft");

        unblock_updates(&app);
        press(&mut app, KeyCode::Enter);
        let tasks = app.store().list_tasks().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, id);
        assert_eq!(tasks[0].name, "draft v2");
        assert_eq!(app.mode(), Mode::Viewing);
    }

    #[test]
    fn test_failed_toggle_leaves_lists_alone() {
        let mut app = reloaded(&["stay open"]);
        block_updates(&app);
        assert!(!press(&mut app, KeyCode::Char(' ')));

        assert_eq!(app.mode(), Mode::Viewing);
        assert!(app.status_message().starts_with("Error updating task"));
        assert_eq!(app.lists().in_progress.len(), 1);
        assert!(app.lists().completed.is_empty());
        assert!(!app.store().list_tasks().unwrap()[0].is_done);
    }

    #[test]
    fn test_esc_clears_filters_on_both_panes() {
        let mut app = app();
        app.store().create_task(&Task::draft("open milk", "")).unwrap();
        app.store()
            .create_task(&Task { is_done: true, ..Task::draft("done milk", "") })
            .unwrap();
        press(&mut app, KeyCode::Char('r'));

        press(&mut app, KeyCode::Char('/'));
        type_str(&mut app, "zzz");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Tab);
        assert!(app.lists().in_progress.is_filtered());
        assert!(!app.lists().completed.is_filtered());

        press(&mut app, KeyCode::Esc);
        assert!(!app.lists().is_filtered());
        assert_eq!(app.lists().in_progress.len(), 1);
    }

    #[test]
    fn test_failed_delete_is_reported_not_fatal() {
        let mut app = reloaded(&["stuck"]);
        break_store(&app);
        assert!(!press(&mut app, KeyCode::Char('d')));
        assert_eq!(app.mode(), Mode::Viewing);
        assert!(app.status_message().starts_with("Error deleting task"));
    }

    #[test]
    fn test_read_failure_degrades_to_empty_list() {
        let store = Store::open_in_memory().unwrap();
        store.connection().execute_batch("DROP TABLE task_tags; DROP TABLE tasks;").unwrap();
        let app = App::new(store);
        assert!(app.lists().in_progress.is_empty());
        assert!(app.status_message().starts_with("Error loading tasks"));
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        let ctrl_q = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(app.handle_event(AppEvent::Key(ctrl_q)));

        // Plain 'q' is text while the form has focus.
        let mut app = self::app();
        press(&mut app, KeyCode::Char('n'));
        assert!(!press(&mut app, KeyCode::Char('q')));
        assert_eq!(app.form().name.value, "q");
        press(&mut app, KeyCode::Esc);
        assert!(press(&mut app, KeyCode::Char('q')));
    }

    #[test]
    fn test_filter_limits_selection() {
        let mut app = reloaded(&["Buy milk", "Call mum", "Milk cow"]);
        press(&mut app, KeyCode::Char('/'));
        type_str(&mut app, "milk");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.lists().in_progress.len(), 2);

        // 'd' is a command again once the filter is applied.
        press(&mut app, KeyCode::Char('d'));
        let names: Vec<String> =
            app.store().list_tasks().unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Call mum", "Milk cow"]);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.lists().in_progress.len(), 2);
        assert!(!app.lists().in_progress.is_filtered());
    }

    #[test]
    fn test_resize_records_size_only() {
        let mut app = reloaded(&["a"]);
        let before = app.store().list_tasks().unwrap();
        assert!(!app.handle_event(AppEvent::Resize { width: 120, height: 40 }));
        assert_eq!(app.size(), (120, 40));
        assert_eq!(app.store().list_tasks().unwrap(), before);
    }

    #[test]
    fn test_help_overlay_swallows_keys() {
        let mut app = reloaded(&["a"]);
        press(&mut app, KeyCode::Char('?'));
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.store().list_tasks().unwrap().len(), 1);
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('d'));
        assert!(app.store().list_tasks().unwrap().is_empty());
    }

    #[test]
    fn test_render_shows_tasks_and_mode() {
        let mut app = reloaded(&["Write report"]);
        press(&mut app, KeyCode::Char('n'));

        let backend = TestBackend::new(100, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();

        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(screen.contains("Write report"));
        assert!(screen.contains("ADD"));
        assert!(screen.contains("New task"));
    }

    #[test]
    fn test_render_narrow_terminal() {
        let mut app = reloaded(&["a"]);
        press(&mut app, KeyCode::Char('?'));
        let mut terminal = Terminal::new(TestBackend::new(40, 30)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
    }
}
