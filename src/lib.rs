//! Escape Room - four browser puzzle rooms on an A-Frame scene
//!
//! Core modules:
//! - `levels`: One controller per room (keys, candles, terminal, UV)
//! - `puzzle`: Shared puzzle mechanisms (ordered sequences, secret codes, UV reveal)
//! - `game`: Runtime that routes input, owns the timer and applies effects
//! - `platform`: Browser/native abstraction (storage, effect host)
//! - `timer`, `pause`, `progress`, `settings`: Ambient page services

pub mod audio;
pub mod config;
pub mod effect;
pub mod error;
pub mod game;
pub mod levels;
pub mod pause;
pub mod platform;
pub mod progress;
pub mod puzzle;
pub mod settings;
pub mod timer;

pub use config::LevelConfig;
pub use effect::Effect;
pub use game::Game;
pub use levels::LevelController;
pub use progress::Progress;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Level timer poll interval
    pub const TIMER_POLL_MS: u32 = 250;
    /// Clock turns red at or below this many seconds
    pub const DEFAULT_WARNING_SECONDS: f64 = 15.0;
    /// Music volume percent when nothing is stored
    pub const DEFAULT_MUSIC_VOLUME: u8 = 40;

    /// Level select page, relative to a level page
    pub const HUB_PATH: &str = "../index.html";

    // Page element ids shared by every level
    pub const MUSIC_ELEMENT_ID: &str = "bg-music";
    pub const MESSAGE_ID: &str = "msg";
    pub const TIMER_ID: &str = "timer";
    pub const PAUSE_MENU_ID: &str = "pause-menu";
    pub const MUSIC_TOGGLE_ID: &str = "music-toggle";
    pub const VOLUME_SLIDER_ID: &str = "volume-control";
    pub const VOLUME_LABEL_ID: &str = "vol-display";
    pub const MUSIC_BUTTON_ID: &str = "music-control";
    pub const LEVEL_CONFIG_ID: &str = "level-config";

    /// Scene camera and the rig that carries it
    pub const CAMERA_ID: &str = "player-camera";
    pub const RIG_ID: &str = "rig";
}
