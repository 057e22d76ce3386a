//! Game state and core types
//!
//! Everything the renderer needs to draw a frame lives in [`GameState`].

use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::deck::build_deck;
use crate::error::ConfigError;

/// Coarse phase of a session, derived from the state flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// No card waiting for a partner
    Idle,
    /// One card turned over
    Selecting,
    /// Two cards turned over, waiting for the resolution timer
    Resolving,
    /// All pairs matched
    Won,
    /// Out of lives
    Lost,
}

/// Outcome of comparing two picks, held until the resolution timer fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingResult {
    Match,
    Mismatch,
}

/// A single card slot on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Grid position, stable for the whole session
    pub id: usize,
    /// Token shared with exactly one other card
    pub image: String,
    pub is_flipped: bool,
    /// Implies `is_flipped`
    pub is_matched: bool,
}

impl Card {
    pub fn new(id: usize, image: String) -> Self {
        Self {
            id,
            image,
            is_flipped: false,
            is_matched: false,
        }
    }

    /// Whether the face is showing (turned over or already matched)
    pub fn is_face_up(&self) -> bool {
        self.is_flipped || self.is_matched
    }
}

/// A flipped card captured at the moment it was turned over
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pick {
    pub id: usize,
    pub image: String,
}

/// RNG state wrapper for serialization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::new(self.seed, self.stream)
    }
}

/// Complete state of one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// RNG state; the stream tracks the session so each reset deals a new deck
    pub rng_state: RngState,
    /// Session number, bumped on every reset
    pub session: u32,
    /// Number of pairs on the board
    pub pair_count: usize,
    /// Images the deck is dealt from
    pub pool: Vec<String>,
    /// Cards in grid order
    pub cards: Vec<Card>,
    pub lives: u32,
    pub matched_pairs: usize,
    pub first_pick: Option<Pick>,
    pub second_pick: Option<Pick>,
    pub pending_result: Option<PendingResult>,
    /// Input is locked while two cards wait to be resolved
    pub is_resolving: bool,
    /// Transient feedback after a mismatch
    pub is_shaking: bool,
    pub is_won: bool,
    pub is_lost: bool,
    /// Completed pair attempts
    pub move_count: u32,
}

impl GameState {
    /// Deal a fresh session
    pub fn new(
        seed: u64,
        pair_count: usize,
        pool: Vec<String>,
        lives: u32,
    ) -> Result<Self, ConfigError> {
        let rng_state = RngState::new(seed);
        let cards = build_deck(pair_count, &pool, &mut rng_state.to_rng())?;
        Ok(Self {
            rng_state,
            session: 0,
            pair_count,
            pool,
            cards,
            lives,
            matched_pairs: 0,
            first_pick: None,
            second_pick: None,
            pending_result: None,
            is_resolving: false,
            is_shaking: false,
            is_won: false,
            is_lost: false,
            move_count: 0,
        })
    }

    /// Start the next session: new deck, transient fields cleared
    pub(crate) fn redeal(&mut self, lives: u32) {
        self.session = self.session.wrapping_add(1);
        self.rng_state.stream = u64::from(self.session);
        self.cards = match build_deck(self.pair_count, &self.pool, &mut self.rng_state.to_rng()) {
            Ok(cards) => cards,
            Err(e) => {
                log::error!("Cannot deal session {}: {}", self.session, e);
                Vec::new()
            }
        };
        self.lives = lives;
        self.matched_pairs = 0;
        self.first_pick = None;
        self.second_pick = None;
        self.pending_result = None;
        self.is_resolving = false;
        self.is_shaking = false;
        self.is_won = false;
        self.is_lost = false;
        self.move_count = 0;
    }

    pub fn phase(&self) -> GamePhase {
        if self.is_won {
            GamePhase::Won
        } else if self.is_lost {
            GamePhase::Lost
        } else if self.is_resolving {
            GamePhase::Resolving
        } else if self.first_pick.is_some() {
            GamePhase::Selecting
        } else {
            GamePhase::Idle
        }
    }

    /// Whether card clicks are currently accepted at all
    pub fn accepts_input(&self) -> bool {
        !(self.is_resolving || self.is_won || self.is_lost)
    }

    pub fn card(&self, id: usize) -> Option<&Card> {
        self.cards.get(id)
    }

    /// All pairs matched, win not yet declared
    pub fn win_pending(&self) -> bool {
        self.matched_pairs == self.pair_count && !self.is_won
    }

    /// Lives exhausted, loss not yet declared
    pub fn loss_pending(&self) -> bool {
        self.lives == 0 && !self.is_lost
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::deck::image_pool;

    #[test]
    fn test_new_state() {
        let state = GameState::new(1, 12, image_pool(12), 8).unwrap();
        assert_eq!(state.cards.len(), 24);
        assert_eq!(state.lives, 8);
        assert_eq!(state.phase(), GamePhase::Idle);
        assert!(state.accepts_input());
        assert!(!state.win_pending());
        assert!(!state.loss_pending());
    }

    #[test]
    fn test_new_state_rejects_small_pool() {
        assert!(GameState::new(1, 12, image_pool(3), 8).is_err());
    }

    #[test]
    fn test_redeal_changes_deck_and_session() {
        let mut state = GameState::new(5, 12, image_pool(12), 8).unwrap();
        let first = state.cards.clone();
        state.cards[0].is_flipped = true;
        state.is_shaking = true;
        state.move_count = 4;
        state.lives = 2;

        state.redeal(9);
        assert_eq!(state.session, 1);
        assert_eq!(state.lives, 9);
        assert_eq!(state.move_count, 0);
        assert!(!state.is_shaking);
        assert!(state.cards.iter().all(|c| !c.is_face_up()));
        assert_ne!(state.cards, first);
    }

    #[test]
    fn test_redeal_with_broken_pool_leaves_empty_board() {
        let mut state = GameState::new(5, 12, image_pool(12), 8).unwrap();
        state.pool.truncate(3);
        state.redeal(8);
        assert!(state.cards.is_empty());
        assert_eq!(state.session, 1);
        assert_eq!(state.lives, 8);
    }

    #[test]
    fn test_deals_are_reproducible() {
        let mut a = GameState::new(77, 12, image_pool(12), 8).unwrap();
        let mut b = GameState::new(77, 12, image_pool(12), 8).unwrap();
        assert_eq!(a.cards, b.cards);
        a.redeal(8);
        b.redeal(8);
        assert_eq!(a.cards, b.cards);
    }
}
