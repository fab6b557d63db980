//! Terminal UI rendering.

pub mod form;
pub mod status_bar;
pub mod task_panel;
pub mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};

use crate::app::App;

/// Main draw function for the entire UI.
pub fn draw(frame: &mut Frame, app: &App) {
    // Form on top, lists in the middle, status bar at the bottom
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(form::FORM_HEIGHT),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let list_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(main_chunks[1]);

    form::render(frame, main_chunks[0], app);
    task_panel::render_pending(frame, list_chunks[0], app);
    task_panel::render_completed(frame, list_chunks[1], app);
    status_bar::render(frame, main_chunks[2], app);

    if let Some(modal) = &app.edit {
        form::render_modal(frame, frame.area(), modal);
    }
}
