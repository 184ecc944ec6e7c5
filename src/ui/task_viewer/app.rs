use std::io;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::config::UiConfig;
use crate::error::Result;
use crate::list::{Action, TaskList};
use crate::session::Session;
use crate::store::KeyValueStore;
use crate::task::{Filter, Task};

use super::editor::{InputAction, LineInput};
use super::view;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Focus {
    Input,
    List,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum StatusKind {
    Error,
    Info,
}

pub struct AppState<S: KeyValueStore> {
    session: Session<S>,
    pub(crate) ui: UiConfig,
    pub(crate) input: LineInput,
    pub(crate) draft: Option<LineInput>,
    pub(crate) focus: Focus,
    pub(crate) selected: usize,
    pub(crate) show_help: bool,
    status: Option<(String, StatusKind)>,
}

impl<S: KeyValueStore> AppState<S> {
    pub(crate) fn new(session: Session<S>, ui: UiConfig) -> Self {
        let focus = if session.list().is_empty() {
            Focus::Input
        } else {
            Focus::List
        };
        Self {
            session,
            ui,
            input: LineInput::new(),
            draft: None,
            focus,
            selected: 0,
            show_help: false,
            status: None,
        }
    }

    pub(crate) fn list(&self) -> &TaskList {
        self.session.list()
    }

    pub(crate) fn visible(&self) -> Vec<&Task> {
        self.session.list().visible()
    }

    pub(crate) fn selected_task(&self) -> Option<&Task> {
        self.visible().get(self.selected).copied()
    }

    fn selected_id(&self) -> Option<String> {
        self.selected_task().map(|task| task.id.clone())
    }

    pub(crate) fn is_editing(&self, task_id: &str) -> bool {
        self.list().editing_id() == Some(task_id)
    }

    pub(crate) fn status_line(&self) -> Option<(&str, StatusKind)> {
        self.status
            .as_ref()
            .map(|(message, kind)| (message.as_str(), *kind))
    }

    fn set_info(&mut self, message: impl Into<String>) {
        self.status = Some((message.into(), StatusKind::Info));
    }

    fn set_error(&mut self, message: impl Into<String>) {
        self.status = Some((message.into(), StatusKind::Error));
    }

    pub(crate) fn footer_hint(&self) -> String {
        if self.draft.is_some() {
            return "enter save  esc cancel  ↑/↓ save & move".to_string();
        }
        match self.focus {
            Focus::Input => "enter add  esc/↓ list  ctrl-u clear  ctrl-c quit".to_string(),
            Focus::List => {
                let clear = if self.list().counts().completed > 0 {
                    "  c clear completed"
                } else {
                    ""
                };
                format!("a add  space toggle  e edit  d delete  1/2/3 filter{clear}  ? help  q quit")
            }
        }
    }

    fn apply(&mut self, action: Action) -> bool {
        let changed = self.session.apply(action);
        self.clamp_selection();
        changed
    }

    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    fn select_id(&mut self, id: &str) {
        if let Some(pos) = self.visible().iter().position(|task| task.id == id) {
            self.selected = pos;
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.visible().len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        let next = (self.selected as isize + delta).clamp(0, len as isize - 1);
        self.selected = next as usize;
    }

    fn set_filter(&mut self, filter: Filter) {
        let previous = self.selected_id();
        self.apply(Action::SetFilter(filter));
        match previous {
            Some(id) => self.select_id(&id),
            None => self.selected = 0,
        }
        self.clamp_selection();
    }

    fn submit_new_task(&mut self) {
        if self.input.is_blank() {
            return;
        }
        let title = self.input.take();
        if self.apply(Action::Add(title)) {
            if let Some(id) = self.list().tasks().first().map(|task| task.id.clone()) {
                self.select_id(&id);
            }
            self.set_info("added");
        }
    }

    fn begin_edit(&mut self) {
        let Some(task) = self.selected_task() else {
            return;
        };
        let id = task.id.clone();
        let draft = LineInput::with_value(&task.title);
        self.apply(Action::BeginEdit(id));
        self.draft = Some(draft);
    }

    /// Commit the draft; used for enter and for blur (focus moving away).
    fn commit_edit(&mut self) {
        let Some(draft) = self.draft.take() else {
            return;
        };
        let Some(id) = self.list().editing_id().map(str::to_string) else {
            return;
        };
        let removing = draft.is_blank();
        if self.apply(Action::SaveEdit(id, draft.value().to_string())) {
            self.set_info(if removing { "deleted (empty title)" } else { "saved" });
        }
    }

    fn cancel_edit(&mut self) {
        self.draft = None;
        self.apply(Action::CancelEdit);
        self.set_info("edit cancelled");
    }

    fn toggle_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            self.apply(Action::Toggle(id));
        }
    }

    fn remove_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            if self.apply(Action::Remove(id)) {
                self.set_info("deleted");
            }
        }
    }

    fn clear_completed(&mut self) {
        let completed = self.list().counts().completed;
        if completed == 0 {
            self.set_error("no completed tasks to clear");
            return;
        }
        self.apply(Action::ClearCompleted);
        self.set_info(format!("cleared {completed} completed"));
    }
}

pub fn run<S: KeyValueStore>(session: Session<S>, ui: UiConfig) -> Result<()> {
    let mut app = AppState::new(session, ui);
    run_terminal(&mut app)
}

fn run_terminal<S: KeyValueStore>(app: &mut AppState<S>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_loop<S: KeyValueStore>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState<S>,
) -> Result<()> {
    let mut dirty = true;
    loop {
        if dirty {
            terminal.draw(|frame| view::render(frame, app))?;
            dirty = false;
        }

        match event::read()? {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                if handle_key(app, key) {
                    break;
                }
                dirty = true;
            }
            Event::Resize(_, _) => dirty = true,
            _ => {}
        }
    }
    tracing::debug!(total = app.list().counts().total, "task viewer closed");
    Ok(())
}

/// Route one key press. Returns true when the viewer should exit.
pub(crate) fn handle_key<S: KeyValueStore>(app: &mut AppState<S>, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    if app.show_help {
        app.show_help = false;
        return false;
    }

    if let Some(mut draft) = app.draft.take() {
        match key.code {
            KeyCode::Up | KeyCode::Down | KeyCode::Tab | KeyCode::BackTab => {
                app.draft = Some(draft);
                app.commit_edit();
                match key.code {
                    KeyCode::Up | KeyCode::BackTab => app.move_selection(-1),
                    _ => app.move_selection(1),
                }
            }
            _ => match draft.handle_key(key) {
                InputAction::None => app.draft = Some(draft),
                InputAction::Submit => {
                    app.draft = Some(draft);
                    app.commit_edit();
                }
                InputAction::Cancel => app.cancel_edit(),
            },
        }
        return false;
    }

    match app.focus {
        Focus::Input => handle_input_key(app, key),
        Focus::List => return handle_list_key(app, key),
    }
    false
}

fn handle_input_key<S: KeyValueStore>(app: &mut AppState<S>, key: KeyEvent) {
    match key.code {
        KeyCode::Down | KeyCode::Tab => {
            app.focus = Focus::List;
        }
        _ => match app.input.handle_key(key) {
            InputAction::None => {}
            InputAction::Submit => app.submit_new_task(),
            InputAction::Cancel => app.focus = Focus::List,
        },
    }
}

fn handle_list_key<S: KeyValueStore>(app: &mut AppState<S>, key: KeyEvent) -> bool {
    app.status = None;
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('a') | KeyCode::Char('i') | KeyCode::Char('n') => app.focus = Focus::Input,
        KeyCode::Up | KeyCode::Char('k') => {
            if app.selected == 0 {
                app.focus = Focus::Input;
            } else {
                app.move_selection(-1);
            }
        }
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(1),
        KeyCode::Home | KeyCode::Char('g') => app.selected = 0,
        KeyCode::End | KeyCode::Char('G') => {
            app.selected = app.visible().len().saturating_sub(1);
        }
        KeyCode::Char(' ') | KeyCode::Char('x') => app.toggle_selected(),
        KeyCode::Enter | KeyCode::Char('e') => app.begin_edit(),
        KeyCode::Delete | KeyCode::Char('d') => app.remove_selected(),
        KeyCode::Char('c') => app.clear_completed(),
        KeyCode::Char('1') => app.set_filter(Filter::All),
        KeyCode::Char('2') => app.set_filter(Filter::Active),
        KeyCode::Char('3') => app.set_filter(Filter::Completed),
        KeyCode::Tab | KeyCode::Char('f') => {
            let next = app.list().filter().next();
            app.set_filter(next);
        }
        KeyCode::Char('?') => app.show_help = true,
        _ => {}
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::TaskStorage;
    use crate::store::MemoryStore;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn new_app() -> AppState<MemoryStore> {
        let session = Session::open(TaskStorage::new(MemoryStore::new()));
        AppState::new(session, UiConfig::default())
    }

    fn type_line(app: &mut AppState<MemoryStore>, text: &str) {
        for ch in text.chars() {
            handle_key(app, key(KeyCode::Char(ch)));
        }
        handle_key(app, key(KeyCode::Enter));
    }

    fn titles(app: &AppState<MemoryStore>) -> Vec<String> {
        app.list()
            .tasks()
            .iter()
            .map(|task| task.title.clone())
            .collect()
    }

    fn seeded() -> AppState<MemoryStore> {
        let mut app = new_app();
        type_line(&mut app, "Buy milk");
        type_line(&mut app, "Walk dog");
        handle_key(&mut app, key(KeyCode::Esc));
        app
    }

    #[test]
    fn starts_in_input_when_empty() {
        let app = new_app();
        assert_eq!(app.focus, Focus::Input);
    }

    #[test]
    fn enter_adds_and_clears_input() {
        let mut app = new_app();
        type_line(&mut app, "  Buy milk ");
        assert_eq!(titles(&app), vec!["Buy milk"]);
        assert_eq!(app.input.value(), "");

        type_line(&mut app, "   ");
        assert_eq!(titles(&app), vec!["Buy milk"]);
    }

    #[test]
    fn added_tasks_are_persisted() {
        let app = seeded();
        assert_eq!(app.session.storage().load(), app.list().tasks());
        assert_eq!(app.focus, Focus::List);
    }

    #[test]
    fn space_toggles_selected_task() {
        let mut app = seeded();
        assert_eq!(app.selected_task().unwrap().title, "Walk dog");
        handle_key(&mut app, key(KeyCode::Down));
        handle_key(&mut app, key(KeyCode::Char(' ')));
        let counts = app.list().counts();
        assert_eq!((counts.active, counts.completed, counts.total), (1, 1, 2));
        assert!(app.footer_hint().contains("c clear completed"));
    }

    #[test]
    fn escape_cancels_edit_and_restores_title() {
        let mut app = seeded();
        handle_key(&mut app, key(KeyCode::Char('e')));
        assert!(app.draft.is_some());
        handle_key(&mut app, key(KeyCode::Backspace));
        handle_key(&mut app, key(KeyCode::Char('X')));
        handle_key(&mut app, key(KeyCode::Esc));
        assert!(app.draft.is_none());
        assert_eq!(app.list().editing_id(), None);
        assert_eq!(titles(&app), vec!["Walk dog", "Buy milk"]);
    }

    #[test]
    fn enter_saves_trimmed_edit() {
        let mut app = seeded();
        handle_key(&mut app, key(KeyCode::Enter));
        for _ in 0.."Walk dog".len() {
            handle_key(&mut app, key(KeyCode::Backspace));
        }
        type_line(&mut app, " Walk cat ");
        assert_eq!(titles(&app), vec!["Walk cat", "Buy milk"]);
        assert_eq!(app.list().editing_id(), None);
    }

    #[test]
    fn empty_edit_deletes_task() {
        let mut app = seeded();
        handle_key(&mut app, key(KeyCode::Char('e')));
        handle_key(
            &mut app,
            KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL),
        );
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(titles(&app), vec!["Buy milk"]);
    }

    #[test]
    fn moving_away_saves_draft() {
        let mut app = seeded();
        handle_key(&mut app, key(KeyCode::Char('e')));
        handle_key(&mut app, key(KeyCode::Char('!')));
        handle_key(&mut app, key(KeyCode::Down));
        assert!(app.draft.is_none());
        assert_eq!(titles(&app), vec!["Walk dog!", "Buy milk"]);
        assert_eq!(app.selected_task().unwrap().title, "Buy milk");
    }

    #[test]
    fn filter_keys_and_clear_completed() {
        let mut app = seeded();
        handle_key(&mut app, key(KeyCode::Down));
        handle_key(&mut app, key(KeyCode::Char('x')));
        handle_key(&mut app, key(KeyCode::Char('3')));
        let visible: Vec<String> = app.visible().iter().map(|t| t.title.clone()).collect();
        assert_eq!(visible, vec!["Buy milk"]);

        handle_key(&mut app, key(KeyCode::Char('c')));
        assert_eq!(titles(&app), vec!["Walk dog"]);
        assert!(app.visible().is_empty());
        assert_eq!(app.selected, 0);

        handle_key(&mut app, key(KeyCode::Char('c')));
        assert_eq!(
            app.status_line().map(|(_, kind)| kind),
            Some(StatusKind::Error)
        );
    }

    #[test]
    fn delete_removes_selected() {
        let mut app = seeded();
        handle_key(&mut app, key(KeyCode::Char('d')));
        assert_eq!(titles(&app), vec!["Buy milk"]);
        assert_eq!(app.selected_task().unwrap().title, "Buy milk");
    }

    #[test]
    fn quit_keys() {
        let mut app = seeded();
        assert!(handle_key(
            &mut app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)
        ));
        assert!(handle_key(&mut app, key(KeyCode::Char('q'))));

        let mut typing = new_app();
        assert!(!handle_key(&mut typing, key(KeyCode::Char('q'))));
        assert_eq!(typing.input.value(), "q");
    }
}
