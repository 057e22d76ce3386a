//! One player's run of sessions
//!
//! Ties the state machine to its collaborators: the lives store (read once
//! here, written when the carry-over policy changes the baseline) and the
//! timer queue that turns state changes into deferred events.

use crate::error::ConfigError;
use crate::lives::{LivesStore, Outcome, carry_over};
use crate::settings::Settings;
use crate::sim::{GameEvent, GameState, TimerQueue, apply, follow_ups, image_pool};

pub struct Session<S: LivesStore> {
    settings: Settings,
    store: S,
    /// Lives each new session starts with until the policy changes it
    baseline: u32,
    state: GameState,
    timers: TimerQueue,
}

impl<S: LivesStore> Session<S> {
    /// Start with the default image pool for `settings.pair_count`
    pub fn new(settings: Settings, store: S, seed: u64) -> Result<Self, ConfigError> {
        let pool = image_pool(settings.pair_count);
        Self::with_pool(settings, pool, store, seed)
    }

    pub fn with_pool(
        settings: Settings,
        pool: Vec<String>,
        store: S,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        settings.validate()?;
        let baseline = store.load(settings.max_lives);
        let state = GameState::new(seed, settings.pair_count, pool, baseline)?;
        log::info!(
            "Session started: {} pairs, {} lives, seed {}",
            settings.pair_count,
            baseline,
            seed
        );

        let mut session = Self {
            settings,
            store,
            baseline,
            state,
            timers: TimerQueue::new(),
        };
        // A stored baseline of zero starts out already lost
        session.schedule_follow_ups();
        Ok(session)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Persisted starting lives; also the number of heart slots to draw
    pub fn baseline(&self) -> u32 {
        self.baseline
    }

    /// Virtual clock in milliseconds
    pub fn now_ms(&self) -> u64 {
        self.timers.now_ms()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Forward a card click
    pub fn select_card(&mut self, id: usize) -> bool {
        self.dispatch(GameEvent::CardSelected(id))
    }

    /// Deal a new session, applying the carry-over policy first
    pub fn request_reset(&mut self) -> Outcome {
        let outcome = if self.state.is_won {
            Outcome::Won
        } else if self.state.is_lost {
            Outcome::Lost
        } else {
            Outcome::Abandoned
        };

        let next = carry_over(outcome, self.baseline, self.settings.max_lives);
        if next != self.baseline {
            self.baseline = next;
            self.store.save(next);
        }
        log::info!("Reset after {:?}, next session has {} lives", outcome, next);

        self.timers.cancel_all();
        self.dispatch(GameEvent::ResetRequested(next));
        outcome
    }

    /// Advance the clock by `dt_ms`, firing every timer that comes due.
    /// Returns the number of timers fired.
    pub fn advance(&mut self, dt_ms: u64) -> usize {
        let target = self.timers.now_ms().saturating_add(dt_ms);
        let mut fired = 0;
        while let Some(event) = self.timers.pop_due(target, self.state.session) {
            self.dispatch(event);
            fired += 1;
        }
        self.timers.set_now(target);
        fired
    }

    fn dispatch(&mut self, event: GameEvent) -> bool {
        let changed = apply(&mut self.state, event);
        if changed {
            self.schedule_follow_ups();
        }
        changed
    }

    fn schedule_follow_ups(&mut self) {
        for (event, delay) in follow_ups(&self.state, &self.settings) {
            self.timers.schedule(event, delay, self.state.session);
        }
    }
}
