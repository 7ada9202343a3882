//! Persisted personal bests
//!
//! Two scalars kept in client-local storage as plain number strings:
//! `asteroidHighScore` (integer) and `asteroidBestAccuracy` (float). They are
//! read once at startup and written only when a finished session beats them.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Storage key for the best score
pub const HIGH_SCORE_KEY: &str = "asteroidHighScore";
/// Storage key for the best accuracy (percent)
pub const BEST_ACCURACY_KEY: &str = "asteroidBestAccuracy";

/// String key-value store the records live in
pub trait ScoreStorage {
    fn get(&self, key: &str) -> Option<String>;
    /// Returns false when the write could not be made
    fn set(&self, key: &str, value: &str) -> bool;
}

/// Best score and accuracy across sessions
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Records {
    pub high_score: u64,
    pub best_accuracy: f32,
}

impl Records {
    /// Read both records, falling back to zero for anything missing or unparsable
    pub fn load(storage: &dyn ScoreStorage) -> Self {
        let high_score = storage
            .get(HIGH_SCORE_KEY)
            .and_then(|raw| parse_or_warn::<u64>(HIGH_SCORE_KEY, &raw))
            .unwrap_or(0);
        let best_accuracy = storage
            .get(BEST_ACCURACY_KEY)
            .and_then(|raw| parse_or_warn::<f32>(BEST_ACCURACY_KEY, &raw))
            .filter(|a| a.is_finite())
            .unwrap_or(0.0);

        log::info!("Loaded records: score {}, accuracy {:.1}%", high_score, best_accuracy);
        Self {
            high_score,
            best_accuracy,
        }
    }

    /// Fold a finished session into the records.
    ///
    /// Returns the values that were strictly beaten.
    pub fn improve(&mut self, score: u64, accuracy: f32) -> (Option<u64>, Option<f32>) {
        let high_score = (score > self.high_score).then(|| {
            self.high_score = score;
            score
        });
        let best_accuracy = (accuracy > self.best_accuracy).then(|| {
            self.best_accuracy = accuracy;
            accuracy
        });
        (high_score, best_accuracy)
    }

    /// Write the given improvements out
    pub fn persist(storage: &dyn ScoreStorage, high_score: Option<u64>, best_accuracy: Option<f32>) {
        if let Some(score) = high_score {
            if !storage.set(HIGH_SCORE_KEY, &score.to_string()) {
                log::warn!("Could not persist high score {}", score);
            }
        }
        if let Some(accuracy) = best_accuracy {
            if !storage.set(BEST_ACCURACY_KEY, &accuracy.to_string()) {
                log::warn!("Could not persist best accuracy {}", accuracy);
            }
        }
    }
}

fn parse_or_warn<T: std::str::FromStr>(key: &str, raw: &str) -> Option<T> {
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("Ignoring unreadable {} value {:?}", key, raw);
            None
        }
    }
}

/// In-process storage for native builds and tests
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: RefCell<HashMap<String, String>>,
    writes: Cell<u32>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated store
    pub fn with(entries: &[(&str, &str)]) -> Self {
        let storage = Self::new();
        storage.values.borrow_mut().extend(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        );
        storage
    }

    /// Number of successful `set` calls so far
    pub fn writes(&self) -> u32 {
        self.writes.get()
    }
}

impl ScoreStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> bool {
        self.values.borrow_mut().insert(key.to_string(), value.to_string());
        self.writes.set(self.writes.get() + 1);
        true
    }
}

/// Browser LocalStorage; a sandboxed page without storage reads as empty
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default)]
pub struct LocalStorage;

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
    }
}

#[cfg(target_arch = "wasm32")]
impl ScoreStorage for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> bool {
        Self::storage().is_some_and(|s| s.set_item(key, value).is_ok())
    }
}
