use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{info, warn};

use crate::config::{Config, ConfigStore};
use crate::export::{live_export_filename, session_export_filename, to_csv, ExportSink};
use crate::goal::parse_secs;
use crate::session::{SessionStore, DEFAULT_SESSION_NAME};
use crate::summary::{summarize, SessionSummary};
use crate::timer::LapTimer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Timer,
    Sessions,
}

/// What the text prompt, if open, is collecting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    SessionName,
    GoalSecs,
    ToleranceSecs,
}

impl InputMode {
    pub fn prompt(&self) -> &'static str {
        match self {
            InputMode::Normal => "",
            InputMode::SessionName => "Session name",
            InputMode::GoalSecs => "Goal (s)",
            InputMode::ToleranceSecs => "Tolerance (s)",
        }
    }
}

pub struct App {
    pub timer: LapTimer,
    pub store: SessionStore,
    pub state: AppState,
    pub input_mode: InputMode,
    pub input: String,
    pub selected: usize,
    pub status: Option<String>,
    pub config: Config,
    config_store: Option<Box<dyn ConfigStore>>,
    export_sink: Box<dyn ExportSink>,
}

impl App {
    pub fn new(
        config: Config,
        timer: LapTimer,
        store: SessionStore,
        export_sink: Box<dyn ExportSink>,
    ) -> Self {
        Self {
            timer,
            store,
            state: AppState::Timer,
            input_mode: InputMode::Normal,
            input: String::new(),
            selected: 0,
            status: None,
            config,
            config_store: None,
            export_sink,
        }
    }

    /// Goal and tolerance edits are written back through `store`
    pub fn with_config_store(mut self, store: Box<dyn ConfigStore>) -> Self {
        self.config_store = Some(store);
        self
    }

    pub fn summary(&self) -> SessionSummary {
        summarize(self.timer.laps(), self.timer.goal().tolerance_ms)
    }

    pub fn on_tick(&mut self) {
        self.timer.on_tick();
    }

    pub fn toggle_start_pause(&mut self) {
        self.timer.toggle();
    }

    pub fn record_lap(&mut self) {
        if let Some(event) = self.timer.lap() {
            self.status = Some(event.announcement());
        }
    }

    pub fn reset(&mut self) {
        self.timer.reset();
        self.status = None;
    }

    pub fn begin_save(&mut self) {
        if self.timer.laps().is_empty() {
            return;
        }
        self.open_prompt(InputMode::SessionName, DEFAULT_SESSION_NAME.to_string());
    }

    /// Archives the live laps and resets the timer
    pub fn save_session(&mut self, name: &str) {
        let summary = self.summary();
        let laps = self.timer.laps().to_vec();
        if let Some(session) = self.store.save(name, &laps, summary) {
            self.status = Some(format!(
                "Saved \"{}\" ({} laps)",
                session.display_name(),
                session.laps.len()
            ));
            self.timer.reset();
        }
    }

    pub fn export_live(&mut self) {
        if self.timer.laps().is_empty() {
            return;
        }
        let content = to_csv(self.timer.laps(), self.timer.goal());
        let name = live_export_filename(Local::now());
        self.write_export(&name, &content);
    }

    pub fn export_selected(&mut self) {
        let Some(session) = self.store.get(self.selected) else {
            return;
        };
        let content = to_csv(&session.laps, self.timer.goal());
        let name = session_export_filename(session);
        self.write_export(&name, &content);
    }

    fn write_export(&mut self, name: &str, content: &str) {
        self.status = Some(match self.export_sink.write_file(name, content) {
            Ok(path) => format!("Exported {}", path.display()),
            Err(e) => {
                warn!("export of {} failed: {}", name, e);
                format!("Export failed: {e}")
            }
        });
    }

    pub fn delete_selected(&mut self) {
        if let Some(removed) = self.store.delete(self.selected) {
            self.status = Some(format!("Deleted \"{}\"", removed.display_name()));
        }
        self.selected = self.selected.min(self.store.len().saturating_sub(1));
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.store.len() {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn set_goal_secs(&mut self, input: &str) {
        let goal_ms = parse_secs(input);
        info!(goal_ms, "goal updated");
        self.timer.set_goal_ms(goal_ms);
        self.config.set_goal_ms(goal_ms);
        self.persist_config();
    }

    pub fn set_tolerance_secs(&mut self, input: &str) {
        let tolerance_ms = parse_secs(input);
        info!(tolerance_ms, "tolerance updated");
        self.timer.set_tolerance_ms(tolerance_ms);
        self.config.set_tolerance_ms(tolerance_ms);
        self.persist_config();
    }

    /// Writes back the stored config; only fields edited in the UI differ from disk
    fn persist_config(&self) {
        if let Some(store) = &self.config_store {
            if let Err(e) = store.save(&self.config) {
                warn!("failed to save config: {}", e);
            }
        }
    }

    fn open_prompt(&mut self, mode: InputMode, initial: String) {
        self.input_mode = mode;
        self.input = initial;
    }

    fn submit_prompt(&mut self) {
        let input = std::mem::take(&mut self.input);
        let mode = std::mem::replace(&mut self.input_mode, InputMode::Normal);
        match mode {
            InputMode::SessionName => self.save_session(input.trim()),
            InputMode::GoalSecs => self.set_goal_secs(&input),
            InputMode::ToleranceSecs => self.set_tolerance_secs(&input),
            InputMode::Normal => {}
        }
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.submit_prompt(),
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.input.clear();
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => self.input.push(c),
            _ => {}
        }
    }

    /// Applies one key press. Returns true when the app should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }

        if self.input_mode != InputMode::Normal {
            self.handle_prompt_key(key);
            return false;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return true,
            KeyCode::Tab => {
                self.state = match self.state {
                    AppState::Timer => AppState::Sessions,
                    AppState::Sessions => AppState::Timer,
                };
            }
            _ => match self.state {
                AppState::Timer => match key.code {
                    KeyCode::Char(' ') => self.toggle_start_pause(),
                    KeyCode::Char('l') | KeyCode::Enter => self.record_lap(),
                    KeyCode::Char('r') => self.reset(),
                    KeyCode::Char('s') => self.begin_save(),
                    KeyCode::Char('e') => self.export_live(),
                    KeyCode::Char('g') => self.open_prompt(
                        InputMode::GoalSecs,
                        format_secs_field(self.timer.goal().goal_ms),
                    ),
                    KeyCode::Char('t') => self.open_prompt(
                        InputMode::ToleranceSecs,
                        format_secs_field(self.timer.goal().tolerance_ms),
                    ),
                    _ => {}
                },
                AppState::Sessions => match key.code {
                    KeyCode::Up | KeyCode::Char('k') => self.select_previous(),
                    KeyCode::Down | KeyCode::Char('j') => self.select_next(),
                    KeyCode::Char('x') => self.export_selected(),
                    KeyCode::Char('d') | KeyCode::Delete => self.delete_selected(),
                    _ => {}
                },
            },
        }

        false
    }
}

fn format_secs_field(ms: u64) -> String {
    if ms == 0 {
        String::new()
    } else {
        format!("{}", ms as f64 / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileConfigStore;
    use crate::error::Result;
    use crate::goal::GoalConfig;
    use crate::storage::MemorySessionRepository;
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct CapturingSink(Rc<RefCell<Vec<(String, String)>>>);

    impl ExportSink for CapturingSink {
        fn write_file(&self, name: &str, content: &str) -> Result<PathBuf> {
            self.0
                .borrow_mut()
                .push((name.to_string(), content.to_string()));
            Ok(PathBuf::from(name))
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn test_app() -> (App, MemorySessionRepository, CapturingSink) {
        let repo = MemorySessionRepository::default();
        let sink = CapturingSink::default();
        let app = App::new(
            Config::default(),
            LapTimer::default(),
            SessionStore::load(Box::new(repo.clone())),
            Box::new(sink.clone()),
        );
        (app, repo, sink)
    }

    fn run_laps(app: &mut App, ticks_per_lap: &[usize]) {
        app.handle_key(key(KeyCode::Char(' ')));
        for &n in ticks_per_lap {
            for _ in 0..n {
                app.on_tick();
            }
            app.handle_key(key(KeyCode::Char('l')));
        }
    }

    #[test]
    fn test_app_starts_on_timer_view() {
        let (app, _, _) = test_app();
        assert_eq!(app.state, AppState::Timer);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(app.summary().is_empty());
    }

    #[test]
    fn test_keys_drive_timer() {
        let (mut app, _, _) = test_app();
        run_laps(&mut app, &[3, 5]);
        assert_eq!(app.timer.laps().len(), 2);
        assert_eq!(app.timer.laps()[1].lap_time, 500);
        assert_eq!(app.status.as_deref(), Some("Lap 2"));

        app.handle_key(key(KeyCode::Char('r')));
        assert!(app.timer.laps().is_empty());
        assert_eq!(app.timer.total_ms(), 0);
    }

    #[test]
    fn test_goal_prompt_sets_goal() {
        let (mut app, _, _) = test_app();
        app.handle_key(key(KeyCode::Char('g')));
        assert_eq!(app.input_mode, InputMode::GoalSecs);
        type_str(&mut app, "1.5");
        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Char('t')));
        type_str(&mut app, "0.2");
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.timer.goal(), GoalConfig::new(1_500, 200));
        assert_eq!(app.config.goal_secs, 1.5);

        run_laps(&mut app, &[12]);
        assert_eq!(app.status.as_deref(), Some("Lap 1: fast"));
    }

    #[test]
    fn test_bad_goal_input_disables_goal() {
        let (mut app, _, _) = test_app();
        app.set_goal_secs("90");
        app.handle_key(key(KeyCode::Char('g')));
        assert_eq!(app.input, "90");
        app.input.clear();
        type_str(&mut app, "fast");
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.timer.goal().goal_ms, 0);
    }

    #[test]
    fn test_tolerance_edit_keeps_stored_goal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let stored = Config {
            goal_secs: 60.0,
            ..Config::default()
        };

        // goal 90s comes from a command line override, not from the stored config
        let mut app = App::new(
            stored,
            LapTimer::new(GoalConfig::new(90_000, 0)),
            SessionStore::load(Box::new(MemorySessionRepository::default())),
            Box::new(CapturingSink::default()),
        )
        .with_config_store(Box::new(FileConfigStore::with_path(&path)));

        app.set_tolerance_secs("2");
        assert_eq!(app.timer.goal(), GoalConfig::new(90_000, 2_000));

        let saved = FileConfigStore::with_path(&path).load();
        assert_eq!(saved.goal_secs, 60.0);
        assert_eq!(saved.tolerance_secs, 2.0);

        app.set_goal_secs("75");
        let saved = FileConfigStore::with_path(&path).load();
        assert_eq!(saved.goal_secs, 75.0);
        assert_eq!(saved.tolerance_secs, 2.0);
    }

    #[test]
    fn test_save_session_flow() {
        let (mut app, repo, _) = test_app();
        run_laps(&mut app, &[10, 11]);

        app.handle_key(key(KeyCode::Char('s')));
        assert_eq!(app.input_mode, InputMode::SessionName);
        assert_eq!(app.input, DEFAULT_SESSION_NAME);
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.store.len(), 1);
        assert_eq!(repo.snapshot()[0].laps.len(), 2);
        assert_eq!(repo.snapshot()[0].summary.best, 1_000);
        assert!(app.timer.laps().is_empty());
    }

    #[test]
    fn test_save_without_laps_does_nothing() {
        let (mut app, _, _) = test_app();
        app.handle_key(key(KeyCode::Char('s')));
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(app.store.is_empty());
    }

    #[test]
    fn test_prompt_escape_cancels() {
        let (mut app, _, _) = test_app();
        run_laps(&mut app, &[2]);
        app.handle_key(key(KeyCode::Char('s')));
        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(app.store.is_empty());
        assert_eq!(app.timer.laps().len(), 1);
    }

    #[test]
    fn test_export_live() {
        let (mut app, _, sink) = test_app();
        app.handle_key(key(KeyCode::Char('e')));
        assert!(sink.0.borrow().is_empty());

        run_laps(&mut app, &[3]);
        app.handle_key(key(KeyCode::Char('e')));
        let exports = sink.0.borrow();
        assert_eq!(exports.len(), 1);
        assert!(exports[0].0.starts_with("lap_session_"));
        assert!(exports[0].1.ends_with("1,00:00.3,-,0.0,"));
    }

    #[test]
    fn test_sessions_view_export_and_delete() {
        let (mut app, repo, sink) = test_app();
        for name in ["one", "two"] {
            run_laps(&mut app, &[4]);
            app.save_session(name);
        }

        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.state, AppState::Sessions);
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.selected, 1);

        app.handle_key(key(KeyCode::Char('x')));
        assert!(sink.0.borrow()[0].0.starts_with("session_"));

        app.handle_key(key(KeyCode::Char('d')));
        assert_eq!(app.store.len(), 1);
        assert_eq!(app.selected, 0);
        assert_eq!(repo.snapshot()[0].name, "one");
    }

    #[test]
    fn test_quit_keys() {
        let (mut app, _, _) = test_app();
        assert!(app.handle_key(key(KeyCode::Char('q'))));
        assert!(app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));

        app.handle_key(key(KeyCode::Char('g')));
        assert!(!app.handle_key(key(KeyCode::Char('q'))));
        assert_eq!(app.input, "q");
    }
}
