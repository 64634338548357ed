use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use rusqlite::Connection;
use std::io::stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::settings::{Config, ContactConfig};
use crate::console::{CommandRegistry, ConsoleSession, Submission};
use crate::db::models::QuizRun;
use crate::db::queries::{self, QUIZ_SNAPSHOT};
use crate::quiz::{Industry, QuestionBank, QuizEngine, QuizSnapshot, Step};

use super::console;
use super::quiz;

const TICK: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum View {
    Console,
    Quiz,
}

pub struct App {
    pub view: View,
    pub console: ConsoleSession,
    pub input: String,
    pub quiz: QuizEngine,
    /// Highlighted row in the industry list or the current question's options.
    pub cursor: usize,
    /// Pending option values for the current question.
    pub selection: Vec<String>,
    pub name_input: String,
    pub notice: Option<String>,
    pub contact: ContactConfig,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: &Config, quiz: QuizEngine) -> Self {
        let console = ConsoleSession::new(
            Arc::new(CommandRegistry::standard()),
            config.console.latency(),
        );
        let mut app = Self {
            view: View::Console,
            console,
            input: String::new(),
            quiz,
            cursor: 0,
            selection: Vec::new(),
            name_input: String::new(),
            notice: None,
            contact: config.contact.clone(),
            should_quit: false,
        };
        app.sync_selection();
        app
    }

    /// Preselects whatever was answered before for the current question and puts
    /// the cursor on the first of those options.
    fn sync_selection(&mut self) {
        self.cursor = 0;
        self.selection = Vec::new();
        let Some(q) = self.quiz.current_question() else {
            return;
        };
        self.selection = self
            .quiz
            .previous_selection(&q.id)
            .into_iter()
            .map(str::to_string)
            .collect();
        if let Some(first) = self.selection.first() {
            self.cursor = q
                .options()
                .iter()
                .position(|o| o.value == *first)
                .unwrap_or(0);
        }
    }

    fn cursor_limit(&self) -> usize {
        match self.quiz.step() {
            Step::Unstarted => Industry::ALL.len(),
            Step::Answering(_) => self
                .quiz
                .current_question()
                .map_or(0, |q| q.options().len()),
            _ => 0,
        }
    }

    pub fn handle_key(&mut self, key: KeyCode, conn: &Connection, now: Instant) -> Result<()> {
        match key {
            KeyCode::Esc => {
                self.should_quit = true;
                return Ok(());
            }
            KeyCode::Tab => {
                self.view = match self.view {
                    View::Console => View::Quiz,
                    View::Quiz => View::Console,
                };
                return Ok(());
            }
            _ => {}
        }

        match self.view {
            View::Console => self.handle_console_key(key, now),
            View::Quiz => self.handle_quiz_key(key, conn)?,
        }
        Ok(())
    }

    fn handle_console_key(&mut self, key: KeyCode, now: Instant) {
        match key {
            KeyCode::Enter => match self.console.submit(&self.input, now) {
                Submission::Busy => {}
                _ => self.input.clear(),
            },
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => self.input.push(c),
            _ => {}
        }
    }

    fn handle_quiz_key(&mut self, key: KeyCode, conn: &Connection) -> Result<()> {
        self.notice = None;
        let limit = self.cursor_limit();

        match (self.quiz.step(), key) {
            (Step::Unstarted | Step::Answering(_), KeyCode::Up) => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            (Step::Unstarted | Step::Answering(_), KeyCode::Down) => {
                if self.cursor + 1 < limit {
                    self.cursor += 1;
                }
            }
            (Step::Unstarted, KeyCode::Enter) => {
                if let Some(&industry) = Industry::ALL.get(self.cursor) {
                    if let Err(d) = self.quiz.select_industry(industry) {
                        self.notice = Some(d.to_string());
                    }
                    self.sync_selection();
                }
            }
            (Step::Answering(_), KeyCode::Char(' ')) => self.toggle_highlighted(),
            (Step::Answering(_), KeyCode::Enter) => {
                // Single-select confirms the highlighted row; multi-select confirms the
                // checked rows, or the highlighted one when nothing is checked.
                let is_multi = self.quiz.current_question().is_some_and(|q| q.is_multi());
                if !is_multi || self.selection.is_empty() {
                    self.toggle_highlighted();
                }
                let values: Vec<&str> = self.selection.iter().map(String::as_str).collect();
                match self.quiz.answer(&values) {
                    Ok(_) => self.sync_selection(),
                    Err(d) => self.notice = Some(d.to_string()),
                }
            }
            (Step::Answering(_), KeyCode::Backspace | KeyCode::Left)
            | (Step::CollectingCompanyName, KeyCode::Left) => {
                match self.quiz.back() {
                    Ok(()) => self.sync_selection(),
                    Err(d) => self.notice = Some(d.to_string()),
                }
            }
            (Step::CollectingCompanyName, KeyCode::Char(c)) => self.name_input.push(c),
            (Step::CollectingCompanyName, KeyCode::Backspace) => {
                self.name_input.pop();
            }
            (Step::CollectingCompanyName, KeyCode::Enter) => {
                match self.quiz.submit_company_name(&self.name_input) {
                    Ok(()) => self.record_completion(conn)?,
                    Err(d) => self.notice = Some(d.to_string()),
                }
            }
            (Step::Unstarted | Step::Answering(_) | Step::Completed, KeyCode::Char('l')) => {
                self.quiz.set_language(self.quiz.language().toggled());
            }
            (Step::Completed, KeyCode::Char('r')) => {
                self.quiz.reset();
                self.name_input.clear();
                self.sync_selection();
                queries::delete_snapshot(conn, QUIZ_SNAPSHOT)?;
            }
            _ => {}
        }
        Ok(())
    }

    fn toggle_highlighted(&mut self) {
        let Some(question) = self.quiz.current_question() else {
            return;
        };
        let Some(option) = question.options().get(self.cursor) else {
            return;
        };
        let value = option.value.clone();
        if question.is_multi() {
            match self.selection.iter().position(|v| *v == value) {
                Some(idx) => {
                    self.selection.remove(idx);
                }
                None => self.selection.push(value),
            }
        } else {
            self.selection = vec![value];
        }
    }

    fn record_completion(&mut self, conn: &Connection) -> Result<()> {
        if let Some(run) = QuizRun::from_engine(&self.quiz)? {
            let id = queries::insert_quiz_run(conn, &run)?;
            log::info!("stored quiz run {} for {}", id, run.company_name);
        }
        queries::save_snapshot(conn, QUIZ_SNAPSHOT, &self.quiz.snapshot())
    }
}

pub fn ensure_visible(selected: usize, scroll: &mut usize, visible: usize) {
    if selected < *scroll {
        *scroll = selected;
    } else if selected >= *scroll + visible {
        *scroll = selected.saturating_sub(visible.saturating_sub(1));
    }
}

fn restore_quiz(conn: &Connection, bank: Arc<QuestionBank>) -> QuizEngine {
    let saved: Option<QuizSnapshot> = match queries::load_snapshot(conn, QUIZ_SNAPSHOT) {
        Ok(s) => s,
        Err(e) => {
            log::warn!("ignoring saved quiz: {:#}", e);
            None
        }
    };
    match saved {
        Some(snapshot) => QuizEngine::from_snapshot(Arc::clone(&bank), snapshot).unwrap_or_else(|e| {
            log::warn!("ignoring saved quiz: {}", e);
            QuizEngine::new(bank)
        }),
        None => QuizEngine::new(bank),
    }
}

pub fn run_tui(config: &Config) -> Result<()> {
    let conn = crate::db::schema::open_db()?;
    let bank = Arc::new(QuestionBank::standard()?);
    let mut app = App::new(config, restore_quiz(&conn, bank));

    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = event_loop(&mut terminal, &mut app, &conn);

    app.console.teardown();
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    queries::save_snapshot(&conn, QUIZ_SNAPSHOT, &app.quiz.snapshot())?;
    result
}

fn event_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut App, conn: &Connection) -> Result<()> {
    loop {
        app.console.poll(Instant::now());

        terminal.draw(|frame| match app.view {
            View::Console => console::render(frame, app),
            View::Quiz => quiz::render(frame, app),
        })?;

        // Wake early when a console completion falls due before the next tick.
        let now = Instant::now();
        let tick = app
            .console
            .due_at()
            .map_or(TICK, |due| due.saturating_duration_since(now).min(TICK));
        if !event::poll(tick)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                app.handle_key(key.code, conn, Instant::now())?;
                if app.should_quit {
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::initialize_db;
    use crate::quiz::Language;

    fn setup() -> (App, Connection) {
        let conn = Connection::open_in_memory().unwrap();
        initialize_db(&conn).unwrap();
        let mut config = Config::default();
        config.console.base_latency_ms = 0;
        config.console.jitter_ms = 0;
        config.console.unknown_delay_ms = 0;
        let engine = QuizEngine::new(Arc::new(QuestionBank::standard().unwrap()));
        (App::new(&config, engine), conn)
    }

    fn press(app: &mut App, conn: &Connection, keys: &[KeyCode]) {
        for &k in keys {
            app.handle_key(k, conn, Instant::now()).unwrap();
        }
    }

    fn type_text(app: &mut App, conn: &Connection, text: &str) {
        for c in text.chars() {
            press(app, conn, &[KeyCode::Char(c)]);
        }
    }

    #[test]
    fn test_console_input_runs_command() {
        let (mut app, conn) = setup();
        let start = app.console.history().len();
        type_text(&mut app, &conn, "help");
        press(&mut app, &conn, &[KeyCode::Enter]);
        assert!(app.input.is_empty());
        assert!(app.console.poll(Instant::now()));
        assert!(app.console.history().len() > start + 2);
    }

    #[test]
    fn test_quiz_flow_records_run() {
        let (mut app, conn) = setup();
        press(&mut app, &conn, &[KeyCode::Tab]);
        assert_eq!(app.view, View::Quiz);

        // Healthcare is the second industry.
        press(&mut app, &conn, &[KeyCode::Down, KeyCode::Enter]);
        assert_eq!(app.quiz.industry(), Some(Industry::Healthcare));

        // First option everywhere; channels picks whatsapp + email.
        press(&mut app, &conn, &[KeyCode::Enter, KeyCode::Enter]);
        press(
            &mut app,
            &conn,
            &[KeyCode::Char(' '), KeyCode::Down, KeyCode::Down, KeyCode::Char(' '), KeyCode::Enter],
        );
        for _ in 0..4 {
            press(&mut app, &conn, &[KeyCode::Enter]);
        }
        assert_eq!(app.quiz.step(), Step::CollectingCompanyName);

        press(&mut app, &conn, &[KeyCode::Enter]);
        assert!(app.notice.is_some());

        type_text(&mut app, &conn, "Acme");
        press(&mut app, &conn, &[KeyCode::Enter]);
        assert_eq!(app.quiz.step(), Step::Completed);
        // 5 + 5 + 8 + 20 + 5 + 5 + 5
        assert_eq!(app.quiz.results().total_score, 53);

        let runs = queries::recent_runs(&conn, 5).unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].company_name, "Acme");
    }

    #[test]
    fn test_back_preselects_previous_answer() {
        let (mut app, conn) = setup();
        press(&mut app, &conn, &[KeyCode::Tab, KeyCode::Enter]);
        press(&mut app, &conn, &[KeyCode::Down, KeyCode::Down, KeyCode::Enter]);
        assert_eq!(app.quiz.step(), Step::Answering(1));

        press(&mut app, &conn, &[KeyCode::Left]);
        assert_eq!(app.quiz.step(), Step::Answering(0));
        assert_eq!(app.selection, vec!["21-50".to_string()]);

        press(&mut app, &conn, &[KeyCode::Backspace]);
        assert!(app.notice.is_some());
    }

    #[test]
    fn test_back_then_move_reanswers_single_select() {
        let (mut app, conn) = setup();
        press(&mut app, &conn, &[KeyCode::Tab, KeyCode::Enter, KeyCode::Enter]);
        assert_eq!(app.quiz.previous_selection("team-size"), vec!["1-5"]);
        let before = app.quiz.results().total_score;

        press(&mut app, &conn, &[KeyCode::Left]);
        assert_eq!(app.cursor, 0);
        press(&mut app, &conn, &[KeyCode::Down, KeyCode::Down, KeyCode::Down, KeyCode::Enter]);

        assert_eq!(app.quiz.step(), Step::Answering(1));
        assert_eq!(app.quiz.previous_selection("team-size"), vec!["50+"]);
        assert_eq!(app.quiz.results().total_score, before + 15);
        assert_eq!(app.quiz.results().answers.len(), 1);
    }

    #[test]
    fn test_back_puts_cursor_on_previous_answer() {
        let (mut app, conn) = setup();
        press(&mut app, &conn, &[KeyCode::Tab, KeyCode::Enter]);
        press(&mut app, &conn, &[KeyCode::Down, KeyCode::Down, KeyCode::Enter]);
        press(&mut app, &conn, &[KeyCode::Left]);
        assert_eq!(app.cursor, 2);

        // Confirming without moving keeps the answer.
        press(&mut app, &conn, &[KeyCode::Enter]);
        assert_eq!(app.quiz.previous_selection("team-size"), vec!["21-50"]);
    }

    #[test]
    fn test_language_toggle_keeps_answers() {
        let (mut app, conn) = setup();
        press(&mut app, &conn, &[KeyCode::Tab, KeyCode::Char('l')]);
        assert_eq!(app.quiz.language(), Language::Ar);

        press(&mut app, &conn, &[KeyCode::Enter, KeyCode::Enter]);
        press(&mut app, &conn, &[KeyCode::Char('l')]);
        assert_eq!(app.quiz.language(), Language::En);
        assert_eq!(app.quiz.step(), Step::Answering(1));
        assert_eq!(app.quiz.previous_selection("team-size"), vec!["1-5"]);

        // On the name step `l` is just a letter.
        let rest = app.quiz.questions().len() - 1;
        for _ in 0..rest {
            press(&mut app, &conn, &[KeyCode::Enter]);
        }
        assert_eq!(app.quiz.step(), Step::CollectingCompanyName);
        type_text(&mut app, &conn, "Blue");
        assert_eq!(app.name_input, "Blue");
        assert_eq!(app.quiz.language(), Language::En);
    }

    #[test]
    fn test_ensure_visible() {
        let mut scroll = 0;
        ensure_visible(12, &mut scroll, 10);
        assert_eq!(scroll, 3);
        ensure_visible(1, &mut scroll, 10);
        assert_eq!(scroll, 1);
    }
}
