use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::history::{HistoryStore, HistorySummary, SessionRecord};
use crate::session::{RepAmount, SessionTracker};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Screen {
    Counter,
    History,
}

/// Pending yes/cancel question shown over the counter screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmPrompt {
    Submit { pullups: u32 },
    /// Quitting would drop an active session
    Discard { pullups: u32 },
}

impl ConfirmPrompt {
    pub fn title(&self) -> &'static str {
        match self {
            ConfirmPrompt::Submit { .. } => "Confirm Submission",
            ConfirmPrompt::Discard { .. } => "Discard Workout",
        }
    }

    pub fn message(&self) -> String {
        match self {
            ConfirmPrompt::Submit { pullups } => format!(
                "Are you sure you want to submit {pullups} pull-ups for this session?"
            ),
            ConfirmPrompt::Discard { pullups } => format!(
                "Quit and discard the running session with {pullups} pull-ups?"
            ),
        }
    }
}

#[derive(Debug, Default)]
pub struct HistoryView {
    pub records: Vec<SessionRecord>,
    pub summary: HistorySummary,
    pub scroll_offset: usize,
}

impl HistoryView {
    fn scroll_by(&mut self, delta: isize) {
        let max = self.records.len().saturating_sub(1);
        self.scroll_offset = self.scroll_offset.saturating_add_signed(delta).min(max);
    }
}

pub struct App {
    pub tracker: SessionTracker,
    pub store: HistoryStore,
    pub screen: Screen,
    pub confirm: Option<ConfirmPrompt>,
    pub history_view: HistoryView,
    pub status: Option<String>,
    should_quit: bool,
}

impl App {
    pub fn new(tracker: SessionTracker, store: HistoryStore) -> Self {
        Self {
            tracker,
            store,
            screen: Screen::Counter,
            confirm: None,
            history_view: HistoryView::default(),
            status: None,
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn navigate_to(&mut self, screen: Screen) {
        tracing::info!(%screen, "navigate");
        if screen == Screen::History {
            let records = self.store.load_all();
            self.history_view = HistoryView {
                summary: HistorySummary::from_records(&records),
                records,
                scroll_offset: 0,
            };
        }
        self.screen = screen;
    }

    /// Advance the stopwatches. Returns true if the screen should be redrawn.
    pub fn on_tick(&mut self) -> bool {
        let changed = self.tracker.tick();
        // keypad enablement flips when the cooldown runs out
        changed || self.tracker.is_active()
    }

    /// Open the confirmation dialog for the running session
    pub fn confirm_submit(&mut self) {
        if self.tracker.is_active() {
            self.confirm = Some(ConfirmPrompt::Submit {
                pullups: self.tracker.total(),
            });
        }
    }

    /// Close the confirmation dialog, acting on it only when `accepted`
    pub fn resolve_confirm(&mut self, accepted: bool) {
        let Some(prompt) = self.confirm.take() else {
            return;
        };
        if !accepted {
            return;
        }

        match prompt {
            ConfirmPrompt::Submit { .. } => match self.tracker.submit(&mut self.store) {
                Ok(Some(_)) => self.navigate_to(Screen::History),
                Ok(None) => {}
                Err(e) => self.status = Some(format!("Failed to save session: {e}")),
            },
            ConfirmPrompt::Discard { .. } => self.quit(),
        }
    }

    /// Quit right away when idle, otherwise ask before dropping the session
    pub fn request_quit(&mut self) {
        if !self.tracker.is_active() {
            self.quit();
            return;
        }
        // the dialog is drawn by the counter screen
        self.screen = Screen::Counter;
        self.confirm = Some(ConfirmPrompt::Discard {
            pullups: self.tracker.total(),
        });
    }

    /// Quit unconditionally, dropping any active session
    pub fn quit(&mut self) {
        self.tracker.reset();
        self.should_quit = true;
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit();
            return;
        }

        self.status = None;

        if self.confirm.is_some() {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    self.resolve_confirm(true)
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.resolve_confirm(false)
                }
                _ => {}
            }
            return;
        }

        match self.screen {
            Screen::Counter => self.on_counter_key(key),
            Screen::History => self.on_history_key(key),
        }
    }

    fn on_counter_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                if let Some(amount) = RepAmount::from_digit(c) {
                    self.tracker.add_repetitions(amount);
                }
            }
            KeyCode::Char('s') => {
                self.tracker.start_workout();
            }
            KeyCode::Char('u') => {
                self.tracker.undo();
            }
            KeyCode::Char('r') => {
                self.tracker.redo();
            }
            KeyCode::Char('x') | KeyCode::Enter => self.confirm_submit(),
            KeyCode::Char('h') => self.navigate_to(Screen::History),
            KeyCode::Char('q') | KeyCode::Esc => self.request_quit(),
            _ => {}
        }
    }

    fn on_history_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => self.history_view.scroll_by(-1),
            KeyCode::Down => self.history_view.scroll_by(1),
            KeyCode::PageUp => self.history_view.scroll_by(-10),
            KeyCode::PageDown => self.history_view.scroll_by(10),
            KeyCode::Home => self.history_view.scroll_offset = 0,
            KeyCode::Char('b') | KeyCode::Backspace | KeyCode::Esc => {
                self.navigate_to(Screen::Counter)
            }
            KeyCode::Char('q') => self.request_quit(),
            _ => {}
        }
    }
}
