//! Event-driven state transitions
//!
//! Every UI intent and every fired timer goes through [`apply`]. Events that
//! arrive in the wrong state (late clicks, stray timers, unknown card ids) are
//! ignored rather than treated as errors.

use serde::{Deserialize, Serialize};

use super::state::{GameState, PendingResult, Pick};

/// Input to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Player clicked the card at this grid position
    CardSelected(usize),
    /// The delay after a second pick elapsed
    ResolutionTimerFired,
    /// Mismatch feedback finished
    ShakeTimerFired,
    /// Celebration delay after the last pair elapsed
    WinCheckFired,
    /// Delay after the last life was lost elapsed
    LossCheckFired,
    /// Start a new session with the given lives
    ResetRequested(u32),
}

/// Apply one event. Returns `true` if the state changed.
pub fn apply(state: &mut GameState, event: GameEvent) -> bool {
    let changed = match event {
        GameEvent::CardSelected(id) => select_card(state, id),
        GameEvent::ResolutionTimerFired => resolve(state),
        GameEvent::ShakeTimerFired => {
            let was = state.is_shaking;
            state.is_shaking = false;
            was
        }
        GameEvent::WinCheckFired => {
            if state.win_pending() && !state.is_lost {
                state.is_won = true;
                log::info!("Session {} won in {} moves", state.session, state.move_count);
                true
            } else {
                false
            }
        }
        GameEvent::LossCheckFired => {
            if state.loss_pending() && !state.is_won {
                state.is_lost = true;
                log::info!(
                    "Session {} lost with {}/{} pairs",
                    state.session,
                    state.matched_pairs,
                    state.pair_count
                );
                true
            } else {
                false
            }
        }
        GameEvent::ResetRequested(lives) => {
            state.redeal(lives);
            log::info!("Session {} dealt with {} lives", state.session, lives);
            true
        }
    };

    if changed {
        log::debug!("{:?} -> {:?}", event, state.phase());
    } else {
        log::trace!("Ignored {:?} in {:?}", event, state.phase());
    }
    changed
}

fn select_card(state: &mut GameState, id: usize) -> bool {
    if !state.accepts_input() {
        return false;
    }
    let Some(card) = state.cards.get_mut(id) else {
        return false;
    };
    if card.is_face_up() {
        return false;
    }

    card.is_flipped = true;
    let pick = Pick {
        id: card.id,
        image: card.image.clone(),
    };

    // Matching is by image, never by card identity
    let result = state.first_pick.as_ref().map(|first| {
        if first.image == pick.image {
            PendingResult::Match
        } else {
            PendingResult::Mismatch
        }
    });
    match result {
        None => state.first_pick = Some(pick),
        Some(result) => {
            state.pending_result = Some(result);
            state.second_pick = Some(pick);
            state.move_count += 1;
            state.is_resolving = true;
        }
    }
    true
}

fn resolve(state: &mut GameState) -> bool {
    let (Some(result), Some(first), Some(second)) = (
        state.pending_result,
        state.first_pick.as_ref().map(|p| p.id),
        state.second_pick.as_ref().map(|p| p.id),
    ) else {
        return false;
    };

    for card in &mut state.cards {
        if card.id == first || card.id == second {
            match result {
                PendingResult::Match => card.is_matched = true,
                PendingResult::Mismatch => card.is_flipped = false,
            }
        }
    }

    match result {
        PendingResult::Match => {
            state.matched_pairs += 1;
        }
        PendingResult::Mismatch => {
            state.lives = state.lives.saturating_sub(1);
            state.is_shaking = true;
        }
    }
    state.first_pick = None;
    state.second_pick = None;
    state.pending_result = None;
    state.is_resolving = false;
    true
}
