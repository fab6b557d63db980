//! Pending and completed task list rendering.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
};
use tasklist_proto::task::Task;

use super::theme;
use crate::app::{App, PanelFocus};

/// Render the pending list.
pub fn render_pending(frame: &mut Frame, area: Rect, app: &App) {
    render_list(
        frame,
        area,
        &ListView {
            title: "Pending",
            title_color: theme::PENDING_TITLE,
            tasks: &app.pending,
            selected: app.pending_selected,
            is_focused: app.focus == PanelFocus::Pending && app.edit.is_none(),
            done: false,
            loaded: app.loaded,
        },
    );
}

/// Render the completed list.
pub fn render_completed(frame: &mut Frame, area: Rect, app: &App) {
    render_list(
        frame,
        area,
        &ListView {
            title: "Completed",
            title_color: theme::COMPLETED_TITLE,
            tasks: &app.completed,
            selected: app.completed_selected,
            is_focused: app.focus == PanelFocus::Completed && app.edit.is_none(),
            done: true,
            loaded: app.loaded,
        },
    );
}

struct ListView<'a> {
    title: &'static str,
    title_color: Color,
    tasks: &'a [Task],
    selected: usize,
    is_focused: bool,
    done: bool,
    loaded: bool,
}

fn render_list(frame: &mut Frame, area: Rect, view: &ListView<'_>) {
    let text_style = if view.done {
        theme::completed()
    } else {
        theme::normal()
    };

    let items: Vec<ListItem> = if view.tasks.is_empty() {
        let placeholder = if view.loaded { "Nothing here" } else { "Loading..." };
        vec![ListItem::new(Span::styled(placeholder, theme::dimmed()))]
    } else {
        view.tasks
            .iter()
            .map(|task| task_item(task, text_style, view.done))
            .collect()
    };

    let block = Block::default()
        .title(Span::styled(
            format!("{} ({})", view.title, view.tasks.len()),
            theme::panel_title(view.title_color),
        ))
        .title_bottom(Line::from(Span::styled(
            action_hint(view.done),
            theme::dimmed(),
        )))
        .borders(Borders::ALL)
        .border_style(theme::border(view.is_focused));

    let highlight = if view.is_focused {
        theme::selected()
    } else {
        Style::default()
    };
    let list = List::new(items).block(block).highlight_style(highlight);

    let mut state = ListState::default();
    if !view.tasks.is_empty() {
        state.select(Some(view.selected));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn task_item(task: &Task, text_style: Style, done: bool) -> ListItem<'_> {
    let checkbox = if done { "[✓]" } else { "[ ]" };
    let title = Line::from(vec![
        Span::styled(checkbox, text_style),
        Span::raw(" "),
        Span::styled(task.title.as_str(), text_style.add_modifier(Modifier::BOLD)),
    ]);
    let description = Line::from(vec![
        Span::raw("    "),
        Span::styled(task.description.as_str(), text_style),
    ]);
    let due = Line::from(vec![
        Span::raw("    "),
        Span::styled(
            format!("Due: {}", task.due_date.format("%Y-%m-%d")),
            theme::normal().fg(theme::DUE),
        ),
        Span::styled(
            format!("  created {}", task.created_on.format("%Y-%m-%d %H:%M")),
            theme::dimmed(),
        ),
    ]);
    ListItem::new(vec![title, description, due])
}

const fn action_hint(done: bool) -> &'static str {
    if done {
        " n/Enter: not done | x: delete "
    } else {
        " d/Enter: done | e: edit | x: delete "
    }
}
