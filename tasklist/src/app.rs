//! Application state and event handling.
//!
//! [`App`] is the single state object the TUI loop owns and hands to the
//! renderer. It never caches tasks beyond the last snapshot: every change is
//! sent to the sync worker as a [`SyncCommand`], and the lists are replaced
//! wholesale when the worker reports the service's new state.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tasklist_proto::api::{SortKey, TaskDraft};
use tasklist_proto::task::{Task, TaskId};

use crate::net::{Mutation, MutationKind, SyncCommand, SyncEvent};

/// Which panel is currently focused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelFocus {
    /// New-task form (default).
    Form,
    /// Pending task list.
    Pending,
    /// Completed task list.
    Completed,
}

/// Field of a [`TaskForm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    /// Task title.
    Title,
    /// Task description.
    Description,
    /// Due date, typed as `YYYY-MM-DD`.
    DueDate,
}

impl FormField {
    const fn next(self) -> Self {
        match self {
            Self::Title => Self::Description,
            Self::Description => Self::DueDate,
            Self::DueDate => Self::Title,
        }
    }

    const fn prev(self) -> Self {
        match self {
            Self::Title => Self::DueDate,
            Self::Description => Self::Title,
            Self::DueDate => Self::Description,
        }
    }
}

/// Title / description / due date inputs, used by both the new-task form
/// and the edit modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskForm {
    /// Title input.
    pub title: String,
    /// Description input.
    pub description: String,
    /// Due date input.
    pub due_date: String,
    /// Field receiving keystrokes.
    pub field: FormField,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            due_date: String::new(),
            field: FormField::Title,
        }
    }
}

impl TaskForm {
    /// Pre-fills a form from an existing task, with the due date in
    /// `YYYY-MM-DD` form.
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            due_date: task.due_date_input(),
            field: FormField::Title,
        }
    }

    /// Returns the draft this form submits (text fields trimmed).
    #[must_use]
    pub fn to_draft(&self) -> TaskDraft {
        TaskDraft::from_form(&self.title, &self.description, &self.due_date)
    }

    /// Clears every input and returns to the title field.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Returns the value of the given field.
    #[must_use]
    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Title => &self.title,
            FormField::Description => &self.description,
            FormField::DueDate => &self.due_date,
        }
    }

    const fn active_mut(&mut self) -> &mut String {
        match self.field {
            FormField::Title => &mut self.title,
            FormField::Description => &mut self.description,
            FormField::DueDate => &mut self.due_date,
        }
    }

    /// Applies an editing key. Returns `true` if the key was consumed.
    fn edit(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char(c) => self.active_mut().push(c),
            KeyCode::Backspace => {
                self.active_mut().pop();
            }
            KeyCode::Down => self.field = self.field.next(),
            KeyCode::Up => self.field = self.field.prev(),
            _ => return false,
        }
        true
    }
}

/// The edit modal: which task is being edited and the working values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditModal {
    /// Task being edited.
    pub task_id: TaskId,
    /// Working values.
    pub form: TaskForm,
}

/// Main application state.
#[derive(Debug)]
pub struct App {
    /// Tasks with `completed == false`, in service order.
    pub pending: Vec<Task>,
    /// Tasks with `completed == true`, in service order.
    pub completed: Vec<Task>,
    /// Server-side ordering requested on every refresh.
    pub sort: Option<SortKey>,
    /// Which panel is focused.
    pub focus: PanelFocus,
    /// Selected index in the pending list.
    pub pending_selected: usize,
    /// Selected index in the completed list.
    pub completed_selected: usize,
    /// New-task form.
    pub form: TaskForm,
    /// Last draft sent for creation and not yet confirmed or rejected.
    pub submitted: Option<TaskDraft>,
    /// Open edit modal, if any.
    pub edit: Option<EditModal>,
    /// Whether a snapshot has been received yet.
    pub loaded: bool,
    /// Whether the app should quit.
    pub should_quit: bool,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    /// Create an empty application with the default sort.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            completed: Vec::new(),
            sort: None,
            focus: PanelFocus::Form,
            pending_selected: 0,
            completed_selected: 0,
            form: TaskForm::default(),
            submitted: None,
            edit: None,
            loaded: false,
            should_quit: false,
        }
    }

    /// The command that loads the lists for the current sort.
    #[must_use]
    pub const fn refresh_command(&self) -> SyncCommand {
        SyncCommand::Refresh { sort: self.sort }
    }

    /// Currently selected pending task.
    #[must_use]
    pub fn selected_pending(&self) -> Option<&Task> {
        self.pending.get(self.pending_selected)
    }

    /// Currently selected completed task.
    #[must_use]
    pub fn selected_completed(&self) -> Option<&Task> {
        self.completed.get(self.completed_selected)
    }

    /// Apply an event from the sync worker.
    pub fn apply_event(&mut self, event: SyncEvent) {
        match event {
            SyncEvent::Snapshot(tasks) => self.replace_lists(tasks),
            SyncEvent::Mutated {
                kind,
                task,
                message,
            } => {
                tracing::info!(%kind, task_id = %task.id, message = ?message, "task changed");
                // Only clear the form if it still holds what was sent; text
                // typed since the submit stays.
                if kind == MutationKind::Create
                    && self
                        .submitted
                        .take()
                        .is_some_and(|sent| sent == self.form.to_draft())
                {
                    self.form.reset();
                }
            }
            SyncEvent::Failed { action, error } => {
                if action == MutationKind::Create.to_string() {
                    self.submitted = None;
                }
                // Failures are only logged; the lists keep the last snapshot.
                tracing::error!(action = %action, error = %error, "task operation failed");
            }
        }
    }

    /// Replace both lists from a full snapshot.
    fn replace_lists(&mut self, tasks: Vec<Task>) {
        let (completed, pending): (Vec<Task>, Vec<Task>) =
            tasks.into_iter().partition(|t| t.completed);
        self.pending = pending;
        self.completed = completed;
        self.pending_selected = clamp_index(self.pending_selected, self.pending.len());
        self.completed_selected = clamp_index(self.completed_selected, self.completed.len());
        self.loaded = true;
    }

    /// Handle a key event, returning a command when the key requires the
    /// service.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Option<SyncCommand> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return None;
        }

        if self.edit.is_some() {
            return self.handle_edit_key(key);
        }

        match key.code {
            KeyCode::Esc => {
                self.should_quit = true;
                return None;
            }
            KeyCode::BackTab => {
                self.cycle_focus_backward();
                return None;
            }
            KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => {
                self.cycle_focus_backward();
                return None;
            }
            KeyCode::Tab => {
                self.cycle_focus_forward();
                return None;
            }
            _ => {}
        }

        match self.focus {
            PanelFocus::Form => self.handle_form_key(key),
            PanelFocus::Pending => self.handle_pending_key(key),
            PanelFocus::Completed => self.handle_completed_key(key),
        }
    }

    /// Handle key event when the new-task form is focused.
    fn handle_form_key(&mut self, key: KeyEvent) -> Option<SyncCommand> {
        if key.code == KeyCode::Enter {
            let draft = self.form.to_draft();
            self.submitted = Some(draft.clone());
            return Some(self.mutate(Mutation::Create(draft)));
        }
        self.form.edit(key);
        None
    }

    /// Handle key event when the pending list is focused.
    fn handle_pending_key(&mut self, key: KeyEvent) -> Option<SyncCommand> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.pending_selected = self.pending_selected.saturating_sub(1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.pending_selected = step_down(self.pending_selected, self.pending.len());
                None
            }
            KeyCode::Enter | KeyCode::Char('d') => {
                let id = self.selected_pending()?.id;
                Some(self.mutate(Mutation::Complete(id)))
            }
            KeyCode::Char('e') => {
                let task = self.selected_pending()?;
                self.edit = Some(EditModal {
                    task_id: task.id,
                    form: TaskForm::from_task(task),
                });
                None
            }
            KeyCode::Delete | KeyCode::Char('x') => {
                let id = self.selected_pending()?.id;
                Some(self.mutate(Mutation::Delete(id)))
            }
            _ => self.handle_list_key(key),
        }
    }

    /// Handle key event when the completed list is focused.
    fn handle_completed_key(&mut self, key: KeyEvent) -> Option<SyncCommand> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.completed_selected = self.completed_selected.saturating_sub(1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.completed_selected =
                    step_down(self.completed_selected, self.completed.len());
                None
            }
            KeyCode::Enter | KeyCode::Char('n') => {
                let id = self.selected_completed()?.id;
                Some(self.mutate(Mutation::NotComplete(id)))
            }
            KeyCode::Delete | KeyCode::Char('x') => {
                let id = self.selected_completed()?.id;
                Some(self.mutate(Mutation::Delete(id)))
            }
            _ => self.handle_list_key(key),
        }
    }

    /// Keys shared by both lists.
    fn handle_list_key(&mut self, key: KeyEvent) -> Option<SyncCommand> {
        match key.code {
            KeyCode::Char('s') => {
                self.sort = next_sort(self.sort);
                Some(self.refresh_command())
            }
            KeyCode::Char('r') => Some(self.refresh_command()),
            _ => None,
        }
    }

    /// Handle key event while the edit modal is open.
    fn handle_edit_key(&mut self, key: KeyEvent) -> Option<SyncCommand> {
        match key.code {
            KeyCode::Esc => {
                self.edit = None;
                None
            }
            KeyCode::Enter => {
                let modal = self.edit.take()?;
                Some(self.mutate(Mutation::Update(modal.task_id, modal.form.to_draft())))
            }
            KeyCode::Tab => {
                if let Some(modal) = self.edit.as_mut() {
                    modal.form.field = modal.form.field.next();
                }
                None
            }
            KeyCode::BackTab => {
                if let Some(modal) = self.edit.as_mut() {
                    modal.form.field = modal.form.field.prev();
                }
                None
            }
            _ => {
                if let Some(modal) = self.edit.as_mut() {
                    modal.form.edit(key);
                }
                None
            }
        }
    }

    const fn mutate(&self, mutation: Mutation) -> SyncCommand {
        SyncCommand::Mutate {
            mutation,
            sort: self.sort,
        }
    }

    /// Cycle focus forward: Form -> Pending -> Completed -> Form.
    const fn cycle_focus_forward(&mut self) {
        self.focus = match self.focus {
            PanelFocus::Form => PanelFocus::Pending,
            PanelFocus::Pending => PanelFocus::Completed,
            PanelFocus::Completed => PanelFocus::Form,
        };
    }

    /// Cycle focus backward: Form -> Completed -> Pending -> Form.
    const fn cycle_focus_backward(&mut self) {
        self.focus = match self.focus {
            PanelFocus::Form => PanelFocus::Completed,
            PanelFocus::Completed => PanelFocus::Pending,
            PanelFocus::Pending => PanelFocus::Form,
        };
    }
}

/// Default -> due date -> date created -> default.
const fn next_sort(current: Option<SortKey>) -> Option<SortKey> {
    match current {
        None => Some(SortKey::DueDate),
        Some(SortKey::DueDate) => Some(SortKey::CreatedOn),
        Some(SortKey::CreatedOn) => None,
    }
}

const fn clamp_index(index: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else if index >= len {
        len - 1
    } else {
        index
    }
}

const fn step_down(index: usize, len: usize) -> usize {
    if index + 1 < len { index + 1 } else { index }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            assert!(app.handle_key_event(key(KeyCode::Char(c))).is_none());
        }
    }

    fn task(title: &str, completed: bool) -> Task {
        let mut t = Task::new(title.into(), format!("{title} description"), Utc::now());
        t.completed = completed;
        t
    }

    fn app_with(tasks: Vec<Task>) -> App {
        let mut app = App::new();
        app.apply_event(SyncEvent::Snapshot(tasks));
        app
    }

    #[test]
    fn snapshot_partitions_preserving_order() {
        let a = task("a", false);
        let b = task("b", true);
        let c = task("c", false);
        let d = task("d", true);
        let app = app_with(vec![a.clone(), b.clone(), c.clone(), d.clone()]);

        assert_eq!(app.pending, vec![a, c]);
        assert_eq!(app.completed, vec![b, d]);
        assert!(app.loaded);
    }

    #[test]
    fn snapshot_clamps_selection() {
        let mut app = app_with(vec![task("a", false), task("b", false), task("c", false)]);
        app.pending_selected = 2;
        app.apply_event(SyncEvent::Snapshot(vec![task("a", false)]));
        assert_eq!(app.pending_selected, 0);

        app.apply_event(SyncEvent::Snapshot(Vec::new()));
        assert_eq!(app.pending_selected, 0);
        assert!(app.selected_pending().is_none());
    }

    #[test]
    fn form_submit_sends_trimmed_create() {
        let mut app = App::new();
        type_text(&mut app, "  Buy milk ");
        app.handle_key_event(key(KeyCode::Down));
        type_text(&mut app, "2% ");
        app.handle_key_event(key(KeyCode::Down));
        type_text(&mut app, "2025-08-01");

        let cmd = app.handle_key_event(key(KeyCode::Enter)).unwrap();
        assert_eq!(
            cmd,
            SyncCommand::Mutate {
                mutation: Mutation::Create(TaskDraft::from_form("Buy milk", "2%", "2025-08-01")),
                sort: None,
            }
        );
        // The form is kept until the service confirms the create.
        assert_eq!(app.form.title, "  Buy milk ");
    }

    #[test]
    fn successful_create_resets_form() {
        let mut app = App::new();
        type_text(&mut app, "title");
        app.handle_key_event(key(KeyCode::Enter));
        app.apply_event(SyncEvent::Mutated {
            kind: MutationKind::Create,
            task: task("title", false),
            message: Some("New task created successfully".into()),
        });
        assert_eq!(app.form, TaskForm::default());
        assert!(app.submitted.is_none());
    }

    #[test]
    fn create_confirmation_keeps_text_typed_after_submit() {
        let mut app = App::new();
        type_text(&mut app, "first");
        app.handle_key_event(key(KeyCode::Enter));
        type_text(&mut app, " and more");

        app.apply_event(SyncEvent::Mutated {
            kind: MutationKind::Create,
            task: task("first", false),
            message: Some("New task created successfully".into()),
        });
        assert_eq!(app.form.title, "first and more");
    }

    #[test]
    fn create_confirmation_without_submit_keeps_form() {
        let mut app = App::new();
        type_text(&mut app, "draft");
        app.apply_event(SyncEvent::Mutated {
            kind: MutationKind::Create,
            task: task("elsewhere", false),
            message: None,
        });
        assert_eq!(app.form.title, "draft");
    }

    #[test]
    fn failed_create_keeps_form_and_lists() {
        let mut app = app_with(vec![task("a", false)]);
        type_text(&mut app, "title");
        let before = app.pending.clone();

        app.handle_key_event(key(KeyCode::Enter));

        app.apply_event(SyncEvent::Failed {
            action: "create".into(),
            error: "service returned 400".into(),
        });
        assert_eq!(app.form.title, "title");
        assert_eq!(app.pending, before);
        assert!(app.submitted.is_none());
    }

    #[test]
    fn backspace_edits_active_field() {
        let mut app = App::new();
        type_text(&mut app, "abc");
        app.handle_key_event(key(KeyCode::Backspace));
        assert_eq!(app.form.title, "ab");
    }

    #[test]
    fn pending_actions_target_selected_task() {
        let a = task("a", false);
        let b = task("b", false);
        let mut app = app_with(vec![a, b.clone()]);
        app.handle_key_event(key(KeyCode::Tab));
        assert_eq!(app.focus, PanelFocus::Pending);

        app.handle_key_event(key(KeyCode::Char('j')));
        assert_eq!(
            app.handle_key_event(key(KeyCode::Char('d'))),
            Some(SyncCommand::Mutate {
                mutation: Mutation::Complete(b.id),
                sort: None
            })
        );
        assert_eq!(
            app.handle_key_event(key(KeyCode::Char('x'))),
            Some(SyncCommand::Mutate {
                mutation: Mutation::Delete(b.id),
                sort: None
            })
        );
    }

    #[test]
    fn completed_actions_target_selected_task() {
        let done = task("done", true);
        let mut app = app_with(vec![task("open", false), done.clone()]);
        app.handle_key_event(key(KeyCode::BackTab));
        assert_eq!(app.focus, PanelFocus::Completed);

        assert_eq!(
            app.handle_key_event(key(KeyCode::Char('n'))),
            Some(SyncCommand::Mutate {
                mutation: Mutation::NotComplete(done.id),
                sort: None
            })
        );
        // Completed tasks cannot be edited.
        assert!(app.handle_key_event(key(KeyCode::Char('e'))).is_none());
        assert!(app.edit.is_none());
    }

    #[test]
    fn actions_on_empty_list_do_nothing() {
        let mut app = App::new();
        app.focus = PanelFocus::Pending;
        assert!(app.handle_key_event(key(KeyCode::Char('d'))).is_none());
        assert!(app.handle_key_event(key(KeyCode::Char('x'))).is_none());
        assert!(app.handle_key_event(key(KeyCode::Char('e'))).is_none());
    }

    #[test]
    fn edit_modal_prefills_and_submits_update() {
        let mut original = task("old", false);
        original.due_date = tasklist_proto::task::parse_due_date("2025-08-01").unwrap();
        let mut app = app_with(vec![original.clone()]);
        app.focus = PanelFocus::Pending;

        assert!(app.handle_key_event(key(KeyCode::Char('e'))).is_none());
        let modal = app.edit.as_ref().unwrap();
        assert_eq!(modal.form.title, "old");
        assert_eq!(modal.form.description, "old description");
        assert_eq!(modal.form.due_date, "2025-08-01");

        // Keys go to the modal, not the list.
        type_text(&mut app, "er");
        let cmd = app.handle_key_event(key(KeyCode::Enter)).unwrap();
        assert_eq!(
            cmd,
            SyncCommand::Mutate {
                mutation: Mutation::Update(
                    original.id,
                    TaskDraft::from_form("older", "old description", "2025-08-01"),
                ),
                sort: None,
            }
        );
        assert!(app.edit.is_none());
    }

    #[test]
    fn edit_modal_escape_cancels_without_quitting() {
        let mut app = app_with(vec![task("a", false)]);
        app.focus = PanelFocus::Pending;
        app.handle_key_event(key(KeyCode::Char('e')));

        assert!(app.handle_key_event(key(KeyCode::Esc)).is_none());
        assert!(app.edit.is_none());
        assert!(!app.should_quit);
    }

    #[test]
    fn sort_cycles_and_refreshes() {
        let mut app = App::new();
        app.focus = PanelFocus::Pending;

        let expected = [Some(SortKey::DueDate), Some(SortKey::CreatedOn), None];
        for sort in expected {
            assert_eq!(
                app.handle_key_event(key(KeyCode::Char('s'))),
                Some(SyncCommand::Refresh { sort })
            );
            assert_eq!(app.sort, sort);
        }
    }

    #[test]
    fn mutations_carry_current_sort() {
        let a = task("a", false);
        let mut app = app_with(vec![a.clone()]);
        app.focus = PanelFocus::Pending;
        app.sort = Some(SortKey::DueDate);

        assert_eq!(
            app.handle_key_event(key(KeyCode::Char('d'))),
            Some(SyncCommand::Mutate {
                mutation: Mutation::Complete(a.id),
                sort: Some(SortKey::DueDate),
            })
        );
    }

    #[test]
    fn typing_s_in_form_is_text() {
        let mut app = App::new();
        assert!(app.handle_key_event(key(KeyCode::Char('s'))).is_none());
        assert_eq!(app.form.title, "s");
        assert_eq!(app.sort, None);
    }

    #[test]
    fn quit_keys() {
        let mut app = App::new();
        app.handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);

        let mut app = App::new();
        app.handle_key_event(key(KeyCode::Esc));
        assert!(app.should_quit);
    }
}
