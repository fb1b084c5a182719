//! Color constants for the terminal user interface.

use ratatui::style::Color;

use crate::tui::enums::Mode;

/// Border of the focused component.
pub const ACCENT: Color = Color::Rgb(255, 87, 51);

pub const TITLE_SELECTED: Color = Color::Rgb(205, 214, 244);
pub const DESC_SELECTED: Color = Color::Rgb(186, 194, 222);
pub const TITLE_MUTED: Color = Color::Rgb(88, 91, 112);
pub const DESC_MUTED: Color = Color::Rgb(69, 71, 90);

/// Background of the status bar mode badge.
pub fn mode_color(mode: Mode) -> Color {
    match mode {
        Mode::Viewing => Color::Rgb(116, 199, 236),
        Mode::Creating => Color::Rgb(235, 160, 172),
        Mode::Editing => Color::Rgb(137, 180, 250),
    }
}
