//! Memory Match - a matching-card memory game
//!
//! Core modules:
//! - `sim`: Deterministic state machine (deck, events, deferred timers)
//! - `session`: Runs sessions back to back and applies the lives carry-over
//! - `lives`: Persistence for the lives baseline
//! - `settings`: Board size and timing
//! - `autoplay`: Demo player used by the native binary

pub mod autoplay;
pub mod error;
pub mod lives;
pub mod session;
pub mod settings;
pub mod sim;

pub use error::{ConfigError, LivesError};
pub use lives::{LivesStore, Outcome};
pub use session::Session;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Distinct images on the board
    pub const PAIR_COUNT: usize = 12;
    /// Canonical maximum lives: first launch and after every win
    pub const MAX_LIVES: u32 = 8;
}
