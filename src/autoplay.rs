//! Demo player
//!
//! Plays a session the way a person would: remembers faces it has seen,
//! cashes in known pairs, and otherwise explores unseen cards. Memory is
//! bounded so weaker players can be simulated.

use std::collections::VecDeque;

use crate::lives::LivesStore;
use crate::session::Session;
use crate::sim::{GamePhase, GameState};

/// Upper bound on clock steps for one session, guards against stalls
const MAX_STEPS: usize = 100_000;

#[derive(Debug, Clone)]
pub struct Autoplayer {
    /// Most recent sightings, newest last
    memory: VecDeque<(usize, String)>,
    capacity: usize,
}

impl Autoplayer {
    /// Player remembering the last `capacity` faces it saw
    pub fn new(capacity: usize) -> Self {
        Self {
            memory: VecDeque::new(),
            capacity,
        }
    }

    /// Never forgets
    pub fn perfect() -> Self {
        Self::new(usize::MAX)
    }

    pub fn forget_all(&mut self) {
        self.memory.clear();
    }

    /// Record every face currently showing that isn't matched yet
    pub fn observe(&mut self, state: &GameState) {
        for card in &state.cards {
            if card.is_flipped && !card.is_matched && !self.remembers(card.id) {
                self.memory.push_back((card.id, card.image.clone()));
                if self.memory.len() > self.capacity {
                    self.memory.pop_front();
                }
            }
        }
    }

    fn remembers(&self, id: usize) -> bool {
        self.memory.iter().any(|(known, _)| *known == id)
    }

    /// Remembered face-down cards showing `image`, excluding `except`
    fn known(&self, state: &GameState, image: &str, except: Option<usize>) -> Option<usize> {
        self.memory
            .iter()
            .filter(|(id, img)| img == image && Some(*id) != except)
            .map(|(id, _)| *id)
            .find(|&id| state.card(id).is_some_and(|c| !c.is_face_up()))
    }

    /// Card to click next, `None` if the board doesn't accept input
    pub fn next_pick(&self, state: &GameState) -> Option<usize> {
        if !state.accepts_input() {
            return None;
        }
        let face_down = || state.cards.iter().filter(|c| !c.is_face_up());
        let unseen = face_down().find(|c| !self.remembers(c.id)).map(|c| c.id);

        match &state.first_pick {
            Some(first) => self
                .known(state, &first.image, Some(first.id))
                .or(unseen)
                .or_else(|| face_down().map(|c| c.id).next()),
            None => {
                let known_pair = self.memory.iter().find_map(|(id, img)| {
                    let card = state.card(*id)?;
                    if card.is_face_up() {
                        return None;
                    }
                    self.known(state, img, Some(*id)).map(|_| *id)
                });
                known_pair
                    .or(unseen)
                    .or_else(|| face_down().map(|c| c.id).next())
            }
        }
    }
}

/// Play the current session to a win or loss, advancing the clock by
/// `step_ms` whenever there is nothing to click.
pub fn play_to_end<S: LivesStore>(
    session: &mut Session<S>,
    player: &mut Autoplayer,
    step_ms: u64,
) -> GamePhase {
    for _ in 0..MAX_STEPS {
        player.observe(session.state());
        match session.state().phase() {
            phase @ (GamePhase::Won | GamePhase::Lost) => return phase,
            _ => {}
        }
        match player.next_pick(session.state()) {
            Some(id) => {
                session.select_card(id);
            }
            None => {
                session.advance(step_ms);
            }
        }
    }
    log::warn!("Autoplay gave up after {} steps", MAX_STEPS);
    session.state().phase()
}
