//! Enumerations for TUI state management.

/// Interaction mode of the application controller.
///
/// Only `Creating` and `Editing` route keys to the entry form; `Viewing`
/// routes them to the task lists (or to the form during a quick-add, see
/// [`Focus`]).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Mode {
    #[default]
    Viewing,
    Creating,
    Editing,
}

impl Mode {
    /// Label shown in the status bar.
    pub fn label(self) -> &'static str {
        match self {
            Mode::Viewing => "VIEW",
            Mode::Creating => "ADD",
            Mode::Editing => "EDIT",
        }
    }

    pub fn uses_form(self) -> bool {
        matches!(self, Mode::Creating | Mode::Editing)
    }
}

/// Which component currently receives keyboard input.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Focus {
    List,
    Form,
}

/// Text fields of the entry form.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FormField {
    Name,
    Description,
}

impl FormField {
    pub fn next(self) -> Self {
        match self {
            FormField::Name => FormField::Description,
            FormField::Description => FormField::Name,
        }
    }
}

/// The two partitions of the task list.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ListPane {
    InProgress,
    Completed,
}

impl ListPane {
    pub fn other(self) -> Self {
        match self {
            ListPane::InProgress => ListPane::Completed,
            ListPane::Completed => ListPane::InProgress,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ListPane::InProgress => "In progress",
            ListPane::Completed => "Completed",
        }
    }
}
