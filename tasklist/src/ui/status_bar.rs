//! Status bar rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme;
use crate::app::{App, PanelFocus};

/// Render the status bar at the bottom of the screen.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let help_text = if app.edit.is_some() {
        "Enter: save | Tab/↑↓: field | Esc: cancel"
    } else {
        match app.focus {
            PanelFocus::Form => "Enter: add task | ↑↓: field | Tab: switch panel | Esc: quit",
            PanelFocus::Pending | PanelFocus::Completed => {
                "Tab: switch panel | ↑↓/jk: navigate | s: sort | r: refresh | Esc: quit"
            }
        }
    };

    let sort = app
        .sort
        .map_or_else(|| "default".to_string(), |key| key.to_string());

    let status_line = Line::from(vec![
        Span::styled(concat!("tasklist v", env!("CARGO_PKG_VERSION")), theme::bold()),
        Span::raw(" | "),
        Span::raw(format!("Sort: {sort}")),
        Span::raw(" | "),
        Span::styled(help_text, theme::dimmed()),
    ]);

    let paragraph = Paragraph::new(status_line).style(theme::status_bar_bg());
    frame.render_widget(paragraph, area);
}
