//! The four rooms
//!
//! Each room is a state struct with a behavior table keyed by scene object id.
//! Handlers mutate the room and return effects; they never touch the page.

pub mod candles;
pub mod keys;
pub mod terminal;
pub mod ultraviolet;

pub use candles::CandleRoom;
pub use keys::KeyRoom;
pub use terminal::TerminalRoom;
pub use ultraviolet::UvRoom;

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::config::LevelConfig;
use crate::effect::{Effect, Tone};
use crate::puzzle::{RayHit, Symbol};

/// Number of levels
pub const LEVEL_COUNT: u8 = 4;

/// Delay before a timeout reloads the page
pub const TIMEOUT_RELOAD_MS: u32 = 1500;

/// What a wrong step in an ordered puzzle costs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Undo progress in place and let the player retry
    #[default]
    Reset,
    /// Reload the whole level page
    Reload,
}

/// Effects for the level clock running out
pub fn timeout_effects() -> Vec<Effect> {
    vec![
        Effect::say("⏰ Time's up! Restarting the level...", Tone::Failure),
        Effect::after(TIMEOUT_RELOAD_MS, vec![Effect::Reload]),
    ]
}

/// Leave the room: stop the clock, record progress, go to `next` level
pub fn advance_to(next: u8) -> Vec<Effect> {
    vec![
        Effect::StopTimer,
        Effect::UnlockLevel(next),
        Effect::Navigate(crate::platform::Page::Level(next)),
    ]
}

/// The room on the current page
#[derive(Debug, Clone)]
pub enum LevelController {
    Keys(KeyRoom),
    Candles(CandleRoom),
    Terminal(TerminalRoom),
    Ultraviolet(UvRoom),
}

impl LevelController {
    /// Build the room for level `number`
    pub fn for_level(number: u8, config: &LevelConfig, seed: u64) -> Option<Self> {
        let mut rng = Pcg32::seed_from_u64(config.seed.unwrap_or(seed));
        let level = match number {
            1 => LevelController::Keys(KeyRoom::new()),
            2 => LevelController::Candles(CandleRoom::from_config(config)),
            3 => LevelController::Terminal(TerminalRoom::new(&mut rng)),
            4 => LevelController::Ultraviolet(UvRoom::new(&mut rng)),
            _ => return None,
        };
        Some(level)
    }

    pub fn number(&self) -> u8 {
        match self {
            LevelController::Keys(_) => 1,
            LevelController::Candles(_) => 2,
            LevelController::Terminal(_) => 3,
            LevelController::Ultraviolet(_) => 4,
        }
    }

    /// Default countdown length
    pub fn timer_seconds(&self) -> f64 {
        match self {
            LevelController::Keys(_) => 90.0,
            LevelController::Candles(_) => 120.0,
            LevelController::Terminal(_) => 150.0,
            LevelController::Ultraviolet(_) => 140.0,
        }
    }

    /// Only the first room opens with the wake-up intro
    pub fn has_intro(&self) -> bool {
        matches!(self, LevelController::Keys(_))
    }

    /// Scene object ids that take clicks
    pub fn bound_ids(&self) -> Vec<&str> {
        match self {
            LevelController::Keys(room) => room.behaviors().ids(),
            LevelController::Candles(room) => room.behaviors().ids(),
            LevelController::Terminal(room) => room.behaviors().ids(),
            LevelController::Ultraviolet(room) => room.behaviors().ids(),
        }
    }

    /// Initial scene state and greeting
    pub fn on_load(&mut self) -> Vec<Effect> {
        match self {
            LevelController::Keys(room) => room.on_load(),
            LevelController::Candles(room) => room.on_load(),
            LevelController::Terminal(room) => room.on_load(),
            LevelController::Ultraviolet(room) => room.on_load(),
        }
    }

    /// A scene object was clicked
    pub fn activate(&mut self, id: &str) -> Vec<Effect> {
        match self {
            LevelController::Keys(room) => room.activate(id),
            LevelController::Candles(room) => room.activate(id),
            LevelController::Terminal(room) => room.activate(id),
            LevelController::Ultraviolet(room) => room.activate(id),
        }
    }

    /// Level-specific keyboard shortcuts
    pub fn key(&mut self, key: &str) -> Vec<Effect> {
        match self {
            LevelController::Ultraviolet(room) if key.eq_ignore_ascii_case("u") => room.toggle_uv(),
            _ => Vec::new(),
        }
    }

    /// Per-frame work (UV scan)
    pub fn frame(
        &mut self,
        now_ms: f64,
        hit: Option<RayHit>,
        anchor: impl Fn(Symbol) -> Option<Vec3>,
    ) -> Vec<Effect> {
        match self {
            LevelController::Ultraviolet(room) => room.scan(now_ms, hit, anchor),
            _ => Vec::new(),
        }
    }

    /// Terminal code submitted (one field for level 3, four slots for level 4)
    pub fn submit_code(&mut self, entries: &[String]) -> Vec<Effect> {
        match self {
            LevelController::Terminal(room) => {
                let joined: String = entries.concat();
                room.submit(&joined)
            }
            LevelController::Ultraviolet(room) => room.submit(entries),
            _ => Vec::new(),
        }
    }

    /// Code overlay dismissed without submitting
    pub fn close_overlay(&mut self) -> Vec<Effect> {
        match self {
            LevelController::Terminal(room) => room.close_terminal(),
            LevelController::Ultraviolet(room) => room.close_terminal(),
            _ => Vec::new(),
        }
    }

    /// Input element ids read when the code is submitted
    pub fn code_inputs(&self) -> Vec<String> {
        match self {
            LevelController::Terminal(_) => vec![terminal::INPUT_ID.to_string()],
            LevelController::Ultraviolet(_) => {
                (0..ultraviolet::SLOT_ORDER.len()).map(ultraviolet::slot_id).collect()
            }
            _ => Vec::new(),
        }
    }

    /// A modal input is open; Escape must not pause
    pub fn blocks_pause(&self) -> bool {
        match self {
            LevelController::Terminal(room) => room.terminal_open(),
            LevelController::Ultraviolet(room) => room.terminal_open(),
            _ => false,
        }
    }
}
