//! Task entry form for the terminal user interface.
//!
//! The form collects a name and a description. It is either fresh (create)
//! or bound to an existing task (edit). It never talks to the store: on
//! submit it hands a draft back to the controller, which decides whether
//! that means insert or update by looking at the draft's ID.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::{
    task::Task,
    tui::{
        colors::{ACCENT, DESC_MUTED},
        enums::FormField,
        input::InputField,
    },
};

const NAME_LABEL: &str = "Name: ";
const DESC_LABEL: &str = "Desc: ";

/// Outcome of a key press handled by the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    /// The user pressed Enter. The draft's ID is 0 for a new task and the
    /// bound task's ID when editing.
    Submitted(Task),
}

/// Name/description entry form.
#[derive(Debug, Default)]
pub struct TaskForm {
    pub name: InputField,
    pub description: InputField,
    focused: Option<FormField>,
    bound: Option<Task>,
}

impl TaskForm {
    pub fn new() -> Self {
        Self {
            name: InputField::new("name of the task"),
            description: InputField::new("description"),
            focused: None,
            bound: None,
        }
    }

    /// Bind an existing task and pre-fill the fields from it.
    pub fn load_task(&mut self, task: &Task) {
        self.name.set_value(&task.name);
        self.description.set_value(&task.description);
        self.bound = Some(task.clone());
    }

    /// Refill the form with a draft that failed to persist so it can be retried.
    pub fn restore(&mut self, draft: &Task) {
        self.name.set_value(&draft.name);
        self.description.set_value(&draft.description);
        self.bound = draft.is_persisted().then(|| draft.clone());
        self.focus();
    }

    pub fn is_editing(&self) -> bool {
        self.bound.is_some()
    }

    pub fn bound_id(&self) -> Option<i64> {
        self.bound.as_ref().map(|t| t.id)
    }

    pub fn is_focused(&self) -> bool {
        self.focused.is_some()
    }

    pub fn focused_field(&self) -> Option<FormField> {
        self.focused
    }

    /// Give the form keyboard focus, starting at the name field.
    pub fn focus(&mut self) {
        if self.focused.is_none() {
            self.set_field(FormField::Name);
        }
    }

    pub fn blur(&mut self) {
        self.focused = None;
        self.name.active = false;
        self.description.active = false;
    }

    /// Move focus to the other text field.
    pub fn next_field(&mut self) {
        if let Some(field) = self.focused {
            self.set_field(field.next());
        }
    }

    fn set_field(&mut self, field: FormField) {
        self.focused = Some(field);
        self.name.active = field == FormField::Name;
        self.description.active = field == FormField::Description;
    }

    fn clear(&mut self) {
        self.name.clear();
        self.description.clear();
        self.bound = None;
    }

    /// Discard the input and drop focus. No event is produced.
    pub fn cancel(&mut self) {
        self.clear();
        self.blur();
    }

    /// Build the draft, then clear and unfocus the form.
    pub fn submit(&mut self) -> Task {
        let draft = match &self.bound {
            Some(task) => Task {
                name: self.name.value.clone(),
                description: self.description.value.clone(),
                ..task.clone()
            },
            None => Task::draft(&self.name.value, &self.description.value),
        };
        self.clear();
        self.blur();
        draft
    }

    fn active_input(&mut self) -> Option<&mut InputField> {
        match self.focused? {
            FormField::Name => Some(&mut self.name),
            FormField::Description => Some(&mut self.description),
        }
    }

    /// Handle a key press. Unfocused forms ignore all input.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<FormEvent> {
        if !self.is_focused() {
            return None;
        }
        match key.code {
            KeyCode::Enter => return Some(FormEvent::Submitted(self.submit())),
            KeyCode::Esc => self.cancel(),
            KeyCode::Tab | KeyCode::BackTab => self.next_field(),
            KeyCode::Char(c) => {
                if let Some(input) = self.active_input() {
                    input.handle_char(c);
                }
            }
            KeyCode::Backspace => {
                if let Some(input) = self.active_input() {
                    input.handle_backspace();
                }
            }
            KeyCode::Delete => {
                if let Some(input) = self.active_input() {
                    input.handle_delete();
                }
            }
            KeyCode::Left => {
                if let Some(input) = self.active_input() {
                    input.move_cursor_left();
                }
            }
            KeyCode::Right => {
                if let Some(input) = self.active_input() {
                    input.move_cursor_right();
                }
            }
            KeyCode::Home => {
                if let Some(input) = self.active_input() {
                    input.move_cursor_home();
                }
            }
            KeyCode::End => {
                if let Some(input) = self.active_input() {
                    input.move_cursor_end();
                }
            }
            _ => {}
        }
        None
    }

    /// Draw both fields inside a bordered box and place the terminal cursor
    /// in the focused one.
    pub fn render(&self, f: &mut Frame, area: Rect, title: &str) {
        let border = if self.is_focused() { ACCENT } else { Color::Gray };
        let line = |label: &'static str, field: &InputField| {
            let value = if field.value.is_empty() && !field.active {
                Span::styled(field.placeholder, Style::default().fg(DESC_MUTED))
            } else {
                Span::raw(field.value.clone())
            };
            Line::from(vec![Span::raw(label), value])
        };
        let form = Paragraph::new(vec![
            line(NAME_LABEL, &self.name),
            line(DESC_LABEL, &self.description),
        ])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(title.to_string()),
        );
        f.render_widget(form, area);

        let cursor = match self.focused {
            Some(FormField::Name) => Some((0, &self.name)),
            Some(FormField::Description) => Some((1, &self.description)),
            None => None,
        };
        if let Some((row, field)) = cursor {
            let max_offset = area.width.saturating_sub(3) as usize;
            let offset = (NAME_LABEL.len() + field.cursor).min(max_offset) as u16;
            f.set_cursor_position((area.x + 1 + offset, area.y + 1 + row));
        }
    }
}
