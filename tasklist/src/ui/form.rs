//! New-task form and edit modal rendering.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::theme;
use crate::app::{App, EditModal, FormField, PanelFocus, TaskForm};

const FIELDS: [(FormField, &str); 3] = [
    (FormField::Title, "Title      "),
    (FormField::Description, "Description"),
    (FormField::DueDate, "Due date   "),
];

/// Height of a bordered form, in rows.
pub const FORM_HEIGHT: u16 = 5;

/// Render the new-task form.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let is_focused = app.focus == PanelFocus::Form && app.edit.is_none();
    let block = Block::default()
        .title(Span::styled("New task", theme::bold()))
        .borders(Borders::ALL)
        .border_style(theme::border(is_focused));

    let paragraph = Paragraph::new(form_lines(&app.form, is_focused)).block(block);
    frame.render_widget(paragraph, area);
}

/// Render the edit modal centered over `area`.
pub fn render_modal(frame: &mut Frame, area: Rect, modal: &EditModal) {
    let popup = centered(area, 60, FORM_HEIGHT + 1);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .title(Span::styled("Edit task", theme::bold()))
        .title_bottom(Line::from(Span::styled(
            " Enter: save | Esc: cancel ",
            theme::dimmed(),
        )))
        .borders(Borders::ALL)
        .border_style(theme::highlighted());

    let paragraph = Paragraph::new(form_lines(&modal.form, true)).block(block);
    frame.render_widget(paragraph, popup);
}

fn form_lines(form: &TaskForm, is_focused: bool) -> Vec<Line<'_>> {
    FIELDS
        .iter()
        .map(|&(field, label)| {
            let active = is_focused && form.field == field;
            let label_style = if active {
                theme::highlighted()
            } else {
                theme::dimmed()
            };
            let mut spans = vec![
                Span::styled(label, label_style),
                Span::raw(" "),
                Span::styled(form.value(field), theme::normal()),
            ];
            if active {
                spans.push(Span::styled("_", theme::input_cursor()));
            } else if field == FormField::DueDate && form.due_date.is_empty() {
                spans.push(Span::styled("YYYY-MM-DD", theme::dimmed()));
            }
            Line::from(spans)
        })
        .collect()
}

/// A rect `width_percent` wide and `height` rows tall, centered in `area`.
fn centered(area: Rect, width_percent: u16, height: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height),
            Constraint::Fill(1),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - width_percent) / 2),
            Constraint::Percentage(width_percent),
            Constraint::Percentage((100 - width_percent) / 2),
        ])
        .split(vertical[1])[1]
}
