//! Deferred events
//!
//! The state machine never owns time. The caller asks [`follow_ups`] which
//! timed events the current state calls for, parks them in a [`TimerQueue`],
//! and feeds them back through `apply` once their delay has elapsed.

use super::events::GameEvent;
use super::state::{GameState, PendingResult};
use crate::settings::Settings;

/// A scheduled event, tagged with the session it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    pub due_ms: u64,
    pub session: u32,
    pub event: GameEvent,
}

/// Timed events the state is waiting on, paired with their delay
pub fn follow_ups(state: &GameState, settings: &Settings) -> Vec<(GameEvent, u32)> {
    let mut out = Vec::new();
    match state.pending_result {
        Some(PendingResult::Match) => {
            out.push((GameEvent::ResolutionTimerFired, settings.match_delay_ms))
        }
        Some(PendingResult::Mismatch) => {
            out.push((GameEvent::ResolutionTimerFired, settings.mismatch_delay_ms))
        }
        None => {}
    }
    if state.is_shaking {
        out.push((GameEvent::ShakeTimerFired, settings.shake_ms));
    }
    if state.win_pending() {
        out.push((GameEvent::WinCheckFired, settings.win_delay_ms));
    }
    if state.loss_pending() {
        out.push((GameEvent::LossCheckFired, settings.loss_delay_ms));
    }
    out
}

/// Virtual-clock queue of cancellable deferred events
#[derive(Debug, Clone, Default)]
pub struct TimerQueue {
    now_ms: u64,
    timers: Vec<Timer>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Schedule `event` to fire `delay_ms` from now. A timer for the same
    /// event and session that is already pending is kept as is.
    pub fn schedule(&mut self, event: GameEvent, delay_ms: u32, session: u32) -> bool {
        if self.is_scheduled(event, session) {
            return false;
        }
        self.timers.push(Timer {
            due_ms: self.now_ms.saturating_add(u64::from(delay_ms)),
            session,
            event,
        });
        true
    }

    pub fn is_scheduled(&self, event: GameEvent, session: u32) -> bool {
        self.timers
            .iter()
            .any(|t| t.event == event && t.session == session)
    }

    /// Drop every pending timer
    pub fn cancel_all(&mut self) {
        if !self.timers.is_empty() {
            log::debug!("Cancelled {} pending timers", self.timers.len());
        }
        self.timers.clear();
    }

    /// Pop the earliest timer due at or before `until_ms`, moving the clock to
    /// its due time. Timers from other sessions are discarded on the way.
    pub fn pop_due(&mut self, until_ms: u64, session: u32) -> Option<GameEvent> {
        self.timers.retain(|t| {
            let current = t.session == session;
            if !current {
                log::trace!("Dropped stale {:?} from session {}", t.event, t.session);
            }
            current
        });

        // Earliest first; ties keep scheduling order
        let (idx, timer) = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= until_ms)
            .min_by_key(|(_, t)| t.due_ms)?;
        let timer = *timer;
        self.timers.remove(idx);
        self.now_ms = self.now_ms.max(timer.due_ms);
        Some(timer.event)
    }

    /// Move the clock forward without firing anything
    pub fn set_now(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::deck::image_pool;
    use crate::sim::events::apply;

    #[test]
    fn test_follow_ups_by_outcome() {
        let settings = Settings::default();
        let mut state = GameState::new(3, 12, image_pool(12), 8).unwrap();
        assert!(follow_ups(&state, &settings).is_empty());

        let a = state.cards[0].clone();
        let b = state.cards.iter().find(|c| c.image != a.image).unwrap().id;
        apply(&mut state, GameEvent::CardSelected(a.id));
        apply(&mut state, GameEvent::CardSelected(b));
        assert_eq!(
            follow_ups(&state, &settings),
            vec![(GameEvent::ResolutionTimerFired, 900)]
        );

        apply(&mut state, GameEvent::ResolutionTimerFired);
        assert_eq!(
            follow_ups(&state, &settings),
            vec![(GameEvent::ShakeTimerFired, 500)]
        );

        let partner = state
            .cards
            .iter()
            .find(|c| c.image == a.image && c.id != a.id)
            .unwrap()
            .id;
        apply(&mut state, GameEvent::CardSelected(a.id));
        apply(&mut state, GameEvent::CardSelected(partner));
        assert!(follow_ups(&state, &settings).contains(&(GameEvent::ResolutionTimerFired, 600)));
    }

    #[test]
    fn test_follow_ups_terminal_checks() {
        let settings = Settings::default();
        let state = GameState::new(3, 12, image_pool(12), 0).unwrap();
        assert_eq!(
            follow_ups(&state, &settings),
            vec![(GameEvent::LossCheckFired, 600)]
        );
    }

    #[test]
    fn test_queue_orders_by_due_time() {
        let mut queue = TimerQueue::new();
        queue.schedule(GameEvent::ResolutionTimerFired, 900, 0);
        queue.schedule(GameEvent::ShakeTimerFired, 500, 0);
        assert_eq!(queue.len(), 2);

        assert_eq!(queue.pop_due(400, 0), None);
        assert_eq!(queue.pop_due(1000, 0), Some(GameEvent::ShakeTimerFired));
        assert_eq!(queue.now_ms(), 500);
        assert_eq!(queue.pop_due(1000, 0), Some(GameEvent::ResolutionTimerFired));
        assert_eq!(queue.now_ms(), 900);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_duplicate_schedule_keeps_first() {
        let mut queue = TimerQueue::new();
        assert!(queue.schedule(GameEvent::WinCheckFired, 700, 0));
        queue.set_now(300);
        assert!(!queue.schedule(GameEvent::WinCheckFired, 700, 0));
        assert_eq!(queue.pop_due(700, 0), Some(GameEvent::WinCheckFired));
    }

    #[test]
    fn test_schedule_near_clock_end_saturates() {
        let mut queue = TimerQueue::new();
        queue.set_now(u64::MAX - 10);
        queue.schedule(GameEvent::ResolutionTimerFired, 900, 0);
        assert_eq!(queue.pop_due(u64::MAX, 0), Some(GameEvent::ResolutionTimerFired));
        assert_eq!(queue.now_ms(), u64::MAX);
    }

    #[test]
    fn test_stale_session_timers_are_dropped() {
        let mut queue = TimerQueue::new();
        queue.schedule(GameEvent::ResolutionTimerFired, 100, 0);
        assert_eq!(queue.pop_due(1000, 1), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_cancel_all() {
        let mut queue = TimerQueue::new();
        queue.schedule(GameEvent::ResolutionTimerFired, 100, 0);
        queue.schedule(GameEvent::ShakeTimerFired, 100, 0);
        queue.cancel_all();
        assert_eq!(queue.pop_due(1000, 0), None);
    }
}
