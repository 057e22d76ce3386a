//! Error types
//!
//! Only configuration problems are fatal. Out-of-order UI events are absorbed
//! by the state machine and storage failures fall back to defaults, so neither
//! ever reaches the player.

use thiserror::Error;

/// Invalid game configuration, raised before a session can start
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("pair count must be at least 1")]
    ZeroPairs,
    #[error("image pool has {available} distinct images, need {pair_count}")]
    PoolTooSmall { pair_count: usize, available: usize },
    #[error("delay `{0}` must be non-zero")]
    InvalidDelay(&'static str),
}

/// Failure talking to the lives backing store
#[derive(Debug, Error)]
pub enum LivesError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
