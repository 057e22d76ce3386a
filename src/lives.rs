//! Lives carried between sessions
//!
//! A single integer survives across sessions: the number of lives the next
//! session starts with. Persisted to LocalStorage on the web and to a small
//! text file natively. Unreadable values fall back to the canonical maximum.

use std::path::PathBuf;

use crate::error::LivesError;

/// How a session ended, as seen at reset time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost,
    /// Reset before reaching a terminal state
    Abandoned,
}

/// Lives the next session starts with, given how the last one ended.
///
/// A win restores the canonical maximum, a loss grants one life above the
/// baseline the lost session started from, and a voluntary reset keeps the
/// baseline. Growth after repeated losses is unbounded.
pub fn carry_over(outcome: Outcome, baseline: u32, max_lives: u32) -> u32 {
    match outcome {
        Outcome::Won => max_lives,
        Outcome::Lost => baseline.saturating_add(1),
        Outcome::Abandoned => baseline,
    }
}

/// Parse a stored lives value, `None` if missing or malformed
pub fn parse_lives(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok()
}

/// Durable storage for the lives baseline
pub trait LivesStore {
    /// Stored baseline, or `default` when nothing usable is stored
    fn load(&self, default: u32) -> u32;
    /// Overwrite the stored baseline
    fn save(&mut self, lives: u32);
}

/// In-process store, useful for tests and headless runs
#[derive(Debug, Default)]
pub struct MemoryLivesStore {
    value: Option<String>,
    writes: u32,
}

impl MemoryLivesStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with a raw stored value
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            value: Some(raw.into()),
            writes: 0,
        }
    }

    pub fn raw(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Number of `save` calls seen
    pub fn writes(&self) -> u32 {
        self.writes
    }
}

impl LivesStore for MemoryLivesStore {
    fn load(&self, default: u32) -> u32 {
        self.value
            .as_deref()
            .and_then(parse_lives)
            .unwrap_or(default)
    }

    fn save(&mut self, lives: u32) {
        self.value = Some(lives.to_string());
        self.writes += 1;
    }
}

/// Plain-text file holding the baseline
#[derive(Debug, Clone)]
pub struct FileLivesStore {
    path: PathBuf,
}

impl FileLivesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$MEMORY_MATCH_LIVES`, else `~/.memory_match_lives`
    pub fn default_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os("MEMORY_MATCH_LIVES") {
            return Some(PathBuf::from(path));
        }
        std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".memory_match_lives"))
    }

    fn read(&self) -> Result<Option<u32>, LivesError> {
        let raw = std::fs::read_to_string(&self.path)?;
        Ok(parse_lives(&raw))
    }

    fn write(&self, lives: u32) -> Result<(), LivesError> {
        std::fs::write(&self.path, lives.to_string())?;
        Ok(())
    }
}

impl LivesStore for FileLivesStore {
    fn load(&self, default: u32) -> u32 {
        match self.read() {
            Ok(Some(lives)) => {
                log::info!("Loaded {} lives from {}", lives, self.path.display());
                lives
            }
            Ok(None) => {
                log::warn!("Malformed lives in {}, using {}", self.path.display(), default);
                default
            }
            Err(LivesError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No stored lives, starting with {}", default);
                default
            }
            Err(e) => {
                log::warn!("Could not read {}: {}", self.path.display(), e);
                default
            }
        }
    }

    fn save(&mut self, lives: u32) {
        match self.write(lives) {
            Ok(()) => log::info!("Lives saved ({})", lives),
            Err(e) => log::warn!("Could not save lives to {}: {}", self.path.display(), e),
        }
    }
}

/// Browser LocalStorage under a single key
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone)]
pub struct LocalStorageLivesStore {
    key: &'static str,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorageLivesStore {
    pub const STORAGE_KEY: &'static str = "memoryGameLives";

    pub fn new() -> Self {
        Self {
            key: Self::STORAGE_KEY,
        }
    }

    fn storage() -> Result<web_sys::Storage, LivesError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| LivesError::Unavailable("no LocalStorage".to_string()))
    }
}

#[cfg(target_arch = "wasm32")]
impl Default for LocalStorageLivesStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_arch = "wasm32")]
impl LivesStore for LocalStorageLivesStore {
    fn load(&self, default: u32) -> u32 {
        let raw = Self::storage().map(|s| s.get_item(self.key).ok().flatten());
        match raw {
            Ok(Some(raw)) => match parse_lives(&raw) {
                Some(lives) => {
                    log::info!("Loaded {} lives from LocalStorage", lives);
                    lives
                }
                None => {
                    log::warn!("Malformed stored lives {:?}, using {}", raw, default);
                    default
                }
            },
            Ok(None) => {
                log::info!("No stored lives, starting with {}", default);
                default
            }
            Err(e) => {
                log::warn!("{}", e);
                default
            }
        }
    }

    fn save(&mut self, lives: u32) {
        match Self::storage() {
            Ok(storage) => match storage.set_item(self.key, &lives.to_string()) {
                Ok(()) => log::info!("Lives saved ({})", lives),
                Err(e) => log::warn!("Could not save lives to LocalStorage: {:?}", e),
            },
            Err(e) => log::warn!("{}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_carry_over() {
        assert_eq!(carry_over(Outcome::Won, 11, 8), 8);
        assert_eq!(carry_over(Outcome::Lost, 8, 8), 9);
        assert_eq!(carry_over(Outcome::Lost, 9, 8), 10);
        assert_eq!(carry_over(Outcome::Abandoned, 10, 8), 10);
    }

    #[test]
    fn test_parse_lives() {
        assert_eq!(parse_lives("9"), Some(9));
        assert_eq!(parse_lives(" 12\n"), Some(12));
        assert_eq!(parse_lives(""), None);
        assert_eq!(parse_lives("-3"), None);
        assert_eq!(parse_lives("lots"), None);
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryLivesStore::new();
        assert_eq!(store.load(8), 8);
        store.save(9);
        store.save(9);
        assert_eq!(store.load(8), 9);
        assert_eq!(store.raw(), Some("9"));
        assert_eq!(store.writes(), 2);

        assert_eq!(MemoryLivesStore::with_raw("garbage").load(8), 8);
    }

    #[test]
    fn test_file_store_roundtrip_and_fallbacks() {
        let dir = std::env::temp_dir().join(format!("memory_match_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("lives");
        let _ = std::fs::remove_file(&path);

        let mut store = FileLivesStore::new(&path);
        assert_eq!(store.load(8), 8);
        store.save(10);
        assert_eq!(store.load(8), 10);

        std::fs::write(&path, "not a number").unwrap();
        assert_eq!(store.load(8), 8);

        // A failed write is logged and absorbed
        let mut unwritable = FileLivesStore::new(&dir);
        unwritable.save(9);
        assert_eq!(unwritable.load(8), 8);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
