//! Game settings and tuning
//!
//! Board size, the canonical lives maximum and the delays the scheduler uses
//! between a state change and its follow-up event. Persisted separately from
//! the lives record in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Game settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Board ===
    /// Distinct images on the board (twice as many cards)
    pub pair_count: usize,
    /// Lives granted after a win and on first launch
    pub max_lives: u32,

    // === Timing (milliseconds) ===
    /// Both faces stay up this long before a match locks in
    pub match_delay_ms: u32,
    /// Both faces stay up this long before a mismatch flips back
    pub mismatch_delay_ms: u32,
    /// Lives bar shake after a mismatch
    pub shake_ms: u32,
    /// Pause between the last match and the win screen
    pub win_delay_ms: u32,
    /// Pause between the last life and the loss screen
    pub loss_delay_ms: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pair_count: crate::consts::PAIR_COUNT,
            max_lives: crate::consts::MAX_LIVES,

            match_delay_ms: 600,
            mismatch_delay_ms: 900,
            shake_ms: 500,
            win_delay_ms: 700,
            loss_delay_ms: 600,
        }
    }
}

impl Settings {
    /// Reject configurations a session can't start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pair_count == 0 {
            return Err(ConfigError::ZeroPairs);
        }
        // Zero resolution delay would hide the second card before it renders
        if self.match_delay_ms == 0 {
            return Err(ConfigError::InvalidDelay("match_delay_ms"));
        }
        if self.mismatch_delay_ms == 0 {
            return Err(ConfigError::InvalidDelay("mismatch_delay_ms"));
        }
        Ok(())
    }

    /// Parse settings JSON, falling back to defaults for anything unusable
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Settings>(json) {
            Ok(settings) if settings.validate().is_ok() => {
                log::info!("Loaded stored settings");
                settings
            }
            Ok(_) => {
                log::warn!("Stored settings are invalid, using defaults");
                Self::default()
            }
            Err(e) => {
                log::warn!("Could not parse stored settings: {}", e);
                Self::default()
            }
        }
    }

    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "memory_match_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                return Self::from_json(&json);
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}
