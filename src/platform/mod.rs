//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Storage (LocalStorage on web)
//! - Executing effects against the page and scene
//! - Delayed callbacks
//! - Page navigation

pub mod recording;
pub mod storage;

pub use recording::{RecordedMusic, RecordingHost};
pub use storage::{KeyValueStore, MemoryStore};

#[cfg(target_arch = "wasm32")]
pub use storage::LocalStore;

use serde::{Deserialize, Serialize};

use crate::audio::MusicPlayer;
use crate::effect::Effect;

/// A static page of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Page {
    /// Level select / landing page
    Hub,
    Level(u8),
}

impl Page {
    /// Relative URL, as seen from a level page
    pub fn path(&self) -> String {
        match self {
            Page::Hub => crate::consts::HUB_PATH.to_string(),
            Page::Level(n) => format!("level{}.html", n),
        }
    }
}

/// Whatever executes effects: the DOM in the browser, a recorder elsewhere
pub trait Host {
    /// Perform a host-level effect immediately
    ///
    /// Effects naming an element the page doesn't have must be ignored.
    fn perform(&mut self, effect: Effect);

    /// Hand `effects` back to the runtime after `delay_ms`
    fn schedule(&mut self, delay_ms: u32, effects: Vec<Effect>);

    /// Whether the page contains an element with this id
    fn has_element(&self, id: &str) -> bool;

    /// Background music element, if the page has one
    fn music(&mut self) -> Option<&mut dyn MusicPlayer>;
}
