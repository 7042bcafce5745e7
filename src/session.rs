use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::clock::{Clock, SystemClock};
use crate::error::{Error, StoreError};
use crate::history::{HistoryStore, SessionRecord};
use crate::stopwatch::Stopwatch;
use crate::util::ZERO_ELAPSED;

pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(1);

/// Number of repetitions logged by one key press
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RepAmount(u32);

impl RepAmount {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 9;

    pub fn from_digit(c: char) -> Option<Self> {
        c.to_digit(10).and_then(|d| Self::try_from(d).ok())
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for RepAmount {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::InvalidAmount(value))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub cooldown: Duration,
    /// Maximum undo entries kept; `None` keeps everything and `Some(0)` keeps
    /// none, which disables undo. Config and CLI input never produce `Some(0)`.
    pub undo_depth: Option<usize>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cooldown: DEFAULT_COOLDOWN,
            undo_depth: None,
        }
    }
}

/// The running part of a session. Dropping it stops both stopwatches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSession {
    pub workout: Stopwatch,
    pub rest: Stopwatch,
    pub cooldown_until: Option<Instant>,
}

impl ActiveSession {
    fn start(now: Instant) -> Self {
        Self {
            workout: Stopwatch::start(now),
            rest: Stopwatch::start(now),
            cooldown_until: None,
        }
    }

    fn accepts_input(&self, now: Instant) -> bool {
        self.cooldown_until.map_or(true, |until| now >= until)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Active(ActiveSession),
    Submitting,
}

/// State of the workout currently on screen
pub struct SessionTracker {
    total: u32,
    history: Vec<u32>,
    redo_stack: VecDeque<u32>,
    phase: Phase,
    config: SessionConfig,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for SessionTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTracker")
            .field("total", &self.total)
            .field("history", &self.history)
            .field("redo_stack", &self.redo_stack)
            .field("phase", &self.phase)
            .field("config", &self.config)
            .finish()
    }
}

impl Default for SessionTracker {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl SessionTracker {
    pub fn new(config: SessionConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: SessionConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            total: 0,
            history: Vec::new(),
            redo_stack: VecDeque::new(),
            phase: Phase::Idle,
            config,
            clock,
        }
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn history(&self) -> &[u32] {
        &self.history
    }

    pub fn redo_stack(&self) -> &VecDeque<u32> {
        &self.redo_stack
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, Phase::Active(_))
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Whether the rep keys are enabled right now
    pub fn accepts_reps(&self) -> bool {
        match &self.phase {
            Phase::Active(active) => active.accepts_input(self.clock.now()),
            _ => false,
        }
    }

    pub fn workout_display(&self) -> &str {
        match &self.phase {
            Phase::Active(active) => active.workout.display(),
            _ => ZERO_ELAPSED,
        }
    }

    pub fn rest_display(&self) -> &str {
        match &self.phase {
            Phase::Active(active) => active.rest.display(),
            _ => ZERO_ELAPSED,
        }
    }

    /// Begin a workout. Already active sessions are left untouched.
    pub fn start_workout(&mut self) -> bool {
        match self.phase {
            Phase::Idle => {
                self.phase = Phase::Active(ActiveSession::start(self.clock.now()));
                tracing::info!("workout started");
                true
            }
            Phase::Active(_) | Phase::Submitting => {
                tracing::debug!("start ignored, workout already running");
                false
            }
        }
    }

    /// Log `amount` reps. Ignored while idle or within the cooldown.
    pub fn add_repetitions(&mut self, amount: RepAmount) -> bool {
        let now = self.clock.now();
        let cooldown = self.config.cooldown;
        let Phase::Active(active) = &mut self.phase else {
            return false;
        };
        if !active.accepts_input(now) {
            tracing::debug!(amount = amount.get(), "reps ignored during cooldown");
            return false;
        }

        active.rest.restart(now);
        active.cooldown_until = Some(now + cooldown);

        self.push_history(self.total);
        self.redo_stack.clear();
        self.total += amount.get();
        tracing::debug!(amount = amount.get(), total = self.total, "reps added");
        true
    }

    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.history.pop() else {
            return false;
        };
        self.redo_stack.push_front(self.total);
        self.total = previous;
        tracing::debug!(total = self.total, "undo");
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo_stack.pop_front() else {
            return false;
        };
        self.push_history(self.total);
        self.total = next;
        tracing::debug!(total = self.total, "redo");
        true
    }

    /// Refresh both stopwatches. Returns true if either display changed.
    pub fn tick(&mut self) -> bool {
        let now = self.clock.now();
        match &mut self.phase {
            Phase::Active(active) => {
                let workout = active.workout.refresh(now);
                let rest = active.rest.refresh(now);
                workout || rest
            }
            _ => false,
        }
    }

    /// Persist the session and reset to idle.
    ///
    /// Returns `Ok(None)` when there is no active session. On a storage error
    /// the session is left active with its totals intact.
    pub fn submit(&mut self, store: &mut HistoryStore) -> Result<Option<SessionRecord>, StoreError> {
        let mut active = match std::mem::replace(&mut self.phase, Phase::Submitting) {
            Phase::Active(active) => active,
            other => {
                self.phase = other;
                return Ok(None);
            }
        };

        active.workout.refresh(self.clock.now());
        let record = SessionRecord::new(self.clock.wall(), self.total, active.workout.display());

        match store.append(record.clone()) {
            Ok(()) => {
                tracing::info!(pullups = record.pullups, time = %record.time, "session submitted");
                self.reset();
                Ok(Some(record))
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to persist session, keeping it active");
                self.phase = Phase::Active(active);
                Err(e)
            }
        }
    }

    /// Drop any in-progress session without saving it
    pub fn reset(&mut self) {
        if self.is_active() {
            tracing::info!(total = self.total, "discarding unsaved workout");
        }
        self.total = 0;
        self.history.clear();
        self.redo_stack.clear();
        self.phase = Phase::Idle;
    }

    fn push_history(&mut self, value: u32) {
        self.history.push(value);
        if let Some(depth) = self.config.undo_depth {
            if self.history.len() > depth {
                let excess = self.history.len() - depth;
                self.history.drain(..excess);
            }
        }
    }
}
