//! Level progress
//!
//! A single "highest unlocked level" integer in LocalStorage. Every protected
//! page checks it on load and bounces back to the hub when it is too low.

use serde::{Deserialize, Serialize};

use crate::platform::{KeyValueStore, Page};

/// First level; always unlocked
pub const FIRST_LEVEL: u8 = 1;

/// Highest unlocked level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Progress {
    pub unlocked: u8,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            unlocked: FIRST_LEVEL,
        }
    }
}

impl Progress {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "unlockedLevel";

    /// Load progress; missing or unparseable values count as level 1
    pub fn load(store: &impl KeyValueStore) -> Self {
        let unlocked = store
            .get(Self::STORAGE_KEY)
            .and_then(|raw| raw.trim().parse::<u8>().ok())
            .filter(|&n| n >= FIRST_LEVEL)
            .unwrap_or(FIRST_LEVEL);
        Self { unlocked }
    }

    /// Overwrite the stored level
    fn store(store: &mut impl KeyValueStore, level: u8) {
        if let Err(e) = store.set(Self::STORAGE_KEY, &level.to_string()) {
            log::warn!("Progress not saved: {}", e);
        }
    }

    /// Whether `level` may be played
    pub fn is_unlocked(&self, level: u8) -> bool {
        self.unlocked >= level
    }

    /// Raise the stored level to `level`; never lowers it
    ///
    /// Returns the level stored afterwards.
    pub fn unlock(store: &mut impl KeyValueStore, level: u8) -> u8 {
        let current = Self::load(store).unlocked;
        if level > current {
            Self::store(store, level);
            log::info!("Unlocked level {}", level);
            level
        } else {
            current
        }
    }

    /// Back to level 1 (after finishing the game)
    pub fn reset(store: &mut impl KeyValueStore) {
        Self::store(store, FIRST_LEVEL);
        log::info!("Progress reset");
    }

    /// Entry guard for a page that needs `required`
    ///
    /// Returns the page to redirect to, or `None` when access is allowed.
    pub fn guard(store: &impl KeyValueStore, required: u8) -> Option<Page> {
        let progress = Self::load(store);
        if progress.is_unlocked(required) {
            None
        } else {
            log::info!(
                "Level {} locked (unlocked: {}), redirecting",
                required,
                progress.unlocked
            );
            Some(Page::Hub)
        }
    }
}
