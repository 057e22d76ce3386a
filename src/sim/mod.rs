//! Game state machine
//!
//! All gameplay rules live here. This module must stay pure and deterministic:
//! - Seeded RNG only
//! - No clocks; timed events arrive from the caller
//! - No rendering or platform dependencies

pub mod deck;
pub mod events;
pub mod state;
pub mod timers;

pub use deck::{build_deck, image_pool};
pub use events::{GameEvent, apply};
pub use state::{Card, GamePhase, GameState, PendingResult, Pick, RngState};
pub use timers::{Timer, TimerQueue, follow_ups};
