//! Game runtime
//!
//! Owns everything that lives for one level page: the room controller, the
//! level timer, the pause state, the music settings and the store. Input from
//! the platform is routed to the room; the effects the room returns are either
//! handled here (timer, progress) or passed to the [`Host`].

use glam::Vec3;

use crate::audio::Sfx;
use crate::config::LevelConfig;
use crate::consts::{CAMERA_ID, RIG_ID};
use crate::effect::{Animation, Effect};
use crate::levels::{LevelController, timeout_effects};
use crate::pause::{PauseController, settings_ui};
use crate::platform::{Host, KeyValueStore};
use crate::progress::Progress;
use crate::puzzle::{RayHit, Symbol};
use crate::settings::Settings;
use crate::timer::LevelTimer;

/// Wake-up overlay on the first level
pub const INTRO_OVERLAY_ID: &str = "intro-overlay";
/// From the first gesture until controls come back
pub const INTRO_DURATION_MS: u32 = 2600;

/// Level-1 wake-up sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intro {
    /// No intro on this page
    Off,
    /// Overlay shown, waiting for the first gesture
    Waiting,
    /// Camera is animating; the timer starts when it ends
    Waking,
}

pub struct Game<S: KeyValueStore> {
    level: LevelController,
    config: LevelConfig,
    timer: LevelTimer<Vec<Effect>>,
    pause: PauseController,
    settings: Settings,
    store: S,
    intro: Intro,
}

impl<S: KeyValueStore> Game<S> {
    pub fn new(level: LevelController, config: LevelConfig, store: S) -> Self {
        let settings = Settings::load(&store);
        Self {
            level,
            config,
            timer: LevelTimer::new(),
            pause: PauseController::new(),
            settings,
            store,
            intro: Intro::Off,
        }
    }

    /// Room for level `number`, or `None` for an unknown level
    pub fn for_level(number: u8, config: LevelConfig, store: S, seed: u64) -> Option<Self> {
        let level = LevelController::for_level(number, &config, seed)?;
        Some(Self::new(level, config, store))
    }

    pub fn level(&self) -> &LevelController {
        &self.level
    }

    pub fn timer(&self) -> &LevelTimer<Vec<Effect>> {
        &self.timer
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Hand the store back (moving on to the next page)
    pub fn into_store(self) -> S {
        self.store
    }

    pub fn intro(&self) -> Intro {
        self.intro
    }

    pub fn is_paused(&self) -> bool {
        self.pause.is_paused()
    }

    /// Page loaded: apply settings, set up the room, start the clock or intro
    pub fn start(&mut self, host: &mut impl Host, now_ms: f64) {
        log::info!("Level {} starting", self.level.number());
        host.perform(Effect::attribute(CAMERA_ID, "wasd-controls", "enabled: false"));
        for effect in settings_ui(&self.settings) {
            host.perform(effect);
        }
        self.pause.apply_music(&self.settings, host);

        let effects = self.level.on_load();
        self.apply(host, effects, now_ms);

        let wants_intro = self.level.has_intro() && self.config.intro.unwrap_or(true);
        if wants_intro && host.has_element(INTRO_OVERLAY_ID) {
            self.intro = Intro::Waiting;
            self.apply(host, intro_freeze(), now_ms);
        } else {
            self.start_timer(host, now_ms, None);
        }
    }

    /// (Re)start the level clock; `seconds` overrides the level duration
    pub fn start_timer(&mut self, host: &mut impl Host, now_ms: f64, seconds: Option<f64>) -> bool {
        let seconds = seconds
            .or(self.config.timer_seconds)
            .unwrap_or_else(|| self.level.timer_seconds());
        let started = self
            .timer
            .start(seconds, self.config.warning_seconds(), now_ms, timeout_effects());
        if started {
            host.perform(Effect::RenderTimer(self.timer.display()));
        }
        started
    }

    pub fn stop_timer(&mut self) {
        self.timer.stop();
    }

    /// Timer poll
    pub fn tick(&mut self, host: &mut impl Host, now_ms: f64) {
        if !self.timer.is_running() {
            return;
        }
        let fired = self.timer.tick(now_ms, self.pause.is_paused());
        host.perform(Effect::RenderTimer(self.timer.display()));
        if let Some(effects) = fired {
            log::info!("Level {} timed out", self.level.number());
            self.apply(host, effects, now_ms);
        }
    }

    /// First gesture ends the intro wait
    fn wake(&mut self, host: &mut impl Host, now_ms: f64) {
        if self.intro != Intro::Waiting {
            return;
        }
        self.intro = Intro::Waking;
        log::debug!("Intro: waking up");
        self.apply(host, intro_wake(), now_ms);
    }

    pub fn pointer_down(&mut self, host: &mut impl Host, now_ms: f64) {
        self.wake(host, now_ms);
    }

    /// A scene object was clicked
    pub fn activate(&mut self, host: &mut impl Host, id: &str, now_ms: f64) {
        if self.pause.is_paused() {
            return;
        }
        log::debug!("Activate {}", id);
        let effects = self.level.activate(id);
        self.apply(host, effects, now_ms);
    }

    pub fn key_down(&mut self, host: &mut impl Host, key: &str, now_ms: f64) {
        self.wake(host, now_ms);

        if key == "Escape" {
            if !self.level.blocks_pause() {
                self.pause.toggle(&self.settings, host);
            }
            return;
        }
        if self.pause.is_paused() {
            return;
        }
        let effects = self.level.key(key);
        self.apply(host, effects, now_ms);
    }

    /// Animation frame: pointer ray hit and clue world positions
    pub fn frame(
        &mut self,
        host: &mut impl Host,
        now_ms: f64,
        hit: Option<RayHit>,
        anchor: impl Fn(Symbol) -> Option<Vec3>,
    ) {
        if self.pause.is_paused() {
            return;
        }
        let effects = self.level.frame(now_ms, hit, anchor);
        self.apply(host, effects, now_ms);
    }

    pub fn submit_code(&mut self, host: &mut impl Host, entries: &[String], now_ms: f64) {
        let effects = self.level.submit_code(entries);
        self.apply(host, effects, now_ms);
    }

    pub fn close_overlay(&mut self, host: &mut impl Host, now_ms: f64) {
        let effects = self.level.close_overlay();
        self.apply(host, effects, now_ms);
    }

    pub fn toggle_pause(&mut self, host: &mut impl Host) {
        self.pause.toggle(&self.settings, host);
    }

    pub fn resume(&mut self, host: &mut impl Host) {
        self.pause.resume(&self.settings, host);
    }

    /// Flip the music setting and persist it
    pub fn toggle_music(&mut self, host: &mut impl Host) {
        self.settings.music_enabled = !self.settings.music_enabled;
        self.settings.save(&mut self.store);
        log::info!("Music {}", if self.settings.music_enabled { "on" } else { "off" });
        for effect in settings_ui(&self.settings) {
            host.perform(effect);
        }
        self.pause.apply_music(&self.settings, host);
    }

    /// Volume slider moved; garbage input is ignored
    pub fn set_volume(&mut self, host: &mut impl Host, raw: &str) -> bool {
        let Some(volume) = Settings::parse_volume(raw) else {
            log::debug!("Ignoring volume {:?}", raw);
            return false;
        };
        self.settings.music_volume = volume;
        self.settings.save(&mut self.store);
        for effect in settings_ui(&self.settings) {
            host.perform(effect);
        }
        if let Some(music) = host.music() {
            music.set_volume(self.settings.gain());
        }
        true
    }

    pub fn unlocked_level(&self) -> u8 {
        Progress::load(&self.store).unlocked
    }

    pub fn unlock_level(&mut self, level: u8) -> u8 {
        Progress::unlock(&mut self.store, level)
    }

    pub fn reset_progress(&mut self) {
        Progress::reset(&mut self.store);
    }

    /// Run effects: runtime ones here, delayed ones via the host's scheduler,
    /// the rest on the host
    pub fn apply(&mut self, host: &mut impl Host, effects: Vec<Effect>, now_ms: f64) {
        for effect in effects {
            match effect {
                Effect::StartTimer => {
                    self.intro = Intro::Off;
                    self.start_timer(host, now_ms, None);
                }
                Effect::StopTimer => self.timer.stop(),
                Effect::UnlockLevel(level) => {
                    Progress::unlock(&mut self.store, level);
                }
                Effect::ResetProgress => Progress::reset(&mut self.store),
                Effect::After { delay_ms, effects } => host.schedule(delay_ms, effects),
                other => host.perform(other),
            }
        }
    }
}

/// Freeze controls, look at the floor, show the overlay
fn intro_freeze() -> Vec<Effect> {
    vec![
        Effect::attribute(RIG_ID, "movement-controls", "enabled: false"),
        Effect::attribute(CAMERA_ID, "look-controls", "enabled: false; pointerLockEnabled: false"),
        Effect::attribute(CAMERA_ID, "rotation", "-60 0 0"),
        Effect::display(INTRO_OVERLAY_ID, true),
        Effect::class(INTRO_OVERLAY_ID, "play", false),
        Effect::class(INTRO_OVERLAY_ID, "wait", true),
    ]
}

/// Look up, then hand control back and start the clock
fn intro_wake() -> Vec<Effect> {
    vec![
        Effect::class(INTRO_OVERLAY_ID, "wait", false),
        Effect::class(INTRO_OVERLAY_ID, "play", true),
        Effect::sfx(Sfx::Wakeup),
        Effect::animate(
            CAMERA_ID,
            Animation::new("rotation", "0 0 0", 950)
                .named("animation__wakeup")
                .easing("easeOutCubic"),
        ),
        Effect::after(
            INTRO_DURATION_MS,
            vec![
                Effect::class(INTRO_OVERLAY_ID, "play", false),
                Effect::display(INTRO_OVERLAY_ID, false),
                Effect::attribute(CAMERA_ID, "look-controls", "enabled: true; pointerLockEnabled: false"),
                Effect::attribute(RIG_ID, "movement-controls", "enabled: true"),
                Effect::StartTimer,
            ],
        ),
    ]
}

/// Drive a game on a recording host's virtual clock
///
/// Delayed callbacks come due in small steps; the timer is polled at the
/// platform's interval.
pub fn run_for<S: KeyValueStore>(
    game: &mut Game<S>,
    host: &mut crate::platform::RecordingHost,
    ms: f64,
) {
    const STEP_MS: f64 = 50.0;
    let poll = crate::consts::TIMER_POLL_MS as f64;
    let end = host.now() + ms;
    while host.now() < end {
        let step = STEP_MS.min(end - host.now());
        for due in host.advance(step) {
            let now = host.now();
            game.apply(host, due, now);
        }
        let now = host.now();
        if now % poll == 0.0 {
            game.tick(host, now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::Tone;
    use crate::platform::{MemoryStore, Page, RecordingHost};
    use crate::timer::TimerDisplay;

    fn game(level: u8) -> Game<MemoryStore> {
        Game::for_level(level, LevelConfig::default(), MemoryStore::new(), 7).unwrap()
    }

    fn started(level: u8) -> (Game<MemoryStore>, RecordingHost) {
        let mut host = RecordingHost::new();
        let mut game = game(level);
        game.start(&mut host, 0.0);
        (game, host)
    }

    fn click(game: &mut Game<MemoryStore>, host: &mut RecordingHost, ids: &[&str]) {
        for id in ids {
            let now = host.now();
            game.activate(host, id, now);
        }
    }

    #[test]
    fn test_timer_starts_without_intro_overlay() {
        let mut host = RecordingHost::new().with_elements(["pause-menu", "timer"]);
        let mut game = game(1);
        game.start(&mut host, 0.0);
        assert_eq!(game.intro(), Intro::Off);
        assert!(game.timer().is_running());
        assert!(host.has_performed(&Effect::RenderTimer(TimerDisplay {
            text: "01:30".to_string(),
            warning: false,
        })));
    }

    #[test]
    fn test_intro_waits_for_gesture() {
        let (mut game, mut host) = started(1);
        assert_eq!(game.intro(), Intro::Waiting);
        assert!(!game.timer().is_running());
        assert!(host.has_performed(&Effect::display(INTRO_OVERLAY_ID, true)));

        run_for(&mut game, &mut host, 5_000.0);
        assert!(!game.timer().is_running());

        game.pointer_down(&mut host, 5_000.0);
        assert_eq!(game.intro(), Intro::Waking);
        assert!(host.has_performed(&Effect::sfx(Sfx::Wakeup)));

        run_for(&mut game, &mut host, 2_500.0);
        assert!(!game.timer().is_running());
        run_for(&mut game, &mut host, 200.0);
        assert!(game.timer().is_running());
        assert_eq!(game.intro(), Intro::Off);
        assert!(host.has_performed(&Effect::display(INTRO_OVERLAY_ID, false)));
    }

    #[test]
    fn test_intro_disabled_by_config() {
        let config = LevelConfig {
            intro: Some(false),
            timer_seconds: Some(30.0),
            ..Default::default()
        };
        let mut host = RecordingHost::new();
        let mut game = Game::for_level(1, config, MemoryStore::new(), 1).unwrap();
        game.start(&mut host, 0.0);
        assert!(game.timer().is_running());
        assert_eq!(game.timer().remaining_ms(), 30_000.0);
    }

    #[test]
    fn test_timeout_reloads_once() {
        let (mut game, mut host) = started(2);
        run_for(&mut game, &mut host, 120_000.0);
        assert!(!game.timer().is_running());
        assert_eq!(host.last_message(), Some("⏰ Time's up! Restarting the level..."));
        assert!(!host.has_performed(&Effect::Reload));
        run_for(&mut game, &mut host, 1_500.0);
        assert_eq!(host.performed.iter().filter(|e| **e == Effect::Reload).count(), 1);
    }

    #[test]
    fn test_paused_time_not_counted() {
        let (mut game, mut host) = started(2);
        run_for(&mut game, &mut host, 10_000.0);
        game.key_down(&mut host, "Escape", 10_000.0);
        assert!(game.is_paused());
        assert!(host.has_performed(&Effect::PauseMenu { shown: true }));
        run_for(&mut game, &mut host, 60_000.0);
        assert_eq!(game.timer().display_seconds(), 110);

        let now = host.now();
        game.key_down(&mut host, "Escape", now);
        assert!(!game.is_paused());
        run_for(&mut game, &mut host, 1_000.0);
        assert_eq!(game.timer().display_seconds(), 109);
    }

    #[test]
    fn test_clicks_ignored_while_paused() {
        let (mut game, mut host) = started(2);
        game.toggle_pause(&mut host);
        host.clear_log();
        click(&mut game, &mut host, &["lighter"]);
        assert!(host.performed.is_empty());
    }

    #[test]
    fn test_escape_blocked_by_code_overlay() {
        let (mut game, mut host) = started(4);
        click(&mut game, &mut host, &["uv-drawer", "uv-flashlight", "terminal"]);
        assert!(game.level().blocks_pause());
        game.key_down(&mut host, "Escape", 0.0);
        assert!(!game.is_paused());

        game.close_overlay(&mut host, 0.0);
        game.key_down(&mut host, "Escape", 0.0);
        assert!(game.is_paused());
    }

    #[test]
    fn test_key_room_completes_and_unlocks_level_two() {
        let mut host = RecordingHost::new().with_elements(["pause-menu"]);
        let mut game = game(1);
        game.start(&mut host, 0.0);
        click(
            &mut game,
            &mut host,
            &["drawer1", "key1", "boxLid", "key2", "picture1", "key3"],
        );
        run_for(&mut game, &mut host, 600.0);
        assert!(host.has_performed(&Effect::class("door", "unlocked", true)));

        click(&mut game, &mut host, &["door"]);
        run_for(&mut game, &mut host, 1_800.0);
        assert!(!game.timer().is_running());
        assert_eq!(game.unlocked_level(), 2);
        assert!(host.has_performed(&Effect::Navigate(Page::Level(2))));
    }

    #[test]
    fn test_final_room_resets_progress() {
        let mut host = RecordingHost::new();
        let store = MemoryStore::with_items([("unlockedLevel", "4")]);
        let mut game = Game::for_level(4, LevelConfig::default(), store, 3).unwrap();
        game.start(&mut host, 0.0);

        click(&mut game, &mut host, &["uv-drawer", "uv-flashlight", "terminal"]);
        let LevelController::Ultraviolet(room) = game.level() else {
            panic!("wrong room");
        };
        let code: Vec<String> = room.expected_code().iter().map(|d| d.to_string()).collect();
        game.submit_code(&mut host, &code, 0.0);
        click(&mut game, &mut host, &["door"]);

        run_for(&mut game, &mut host, 550.0);
        assert!(host.has_performed(&Effect::display("jumpscare", true)));
        run_for(&mut game, &mut host, 2_000.0);
        assert_eq!(game.unlocked_level(), 1);
        assert!(!game.timer().is_running());
        assert!(host.has_performed(&Effect::Navigate(Page::Hub)));
    }

    #[test]
    fn test_music_settings_persist() {
        let (mut game, mut host) = started(2);
        game.toggle_music(&mut host);
        assert!(!game.settings().music_enabled);
        assert_eq!(game.store().get("musicEnabled").as_deref(), Some("false"));
        assert!(host.has_performed(&Effect::display("music-control", true)));
        assert!(!host.music.as_ref().unwrap().playing);

        assert!(!game.set_volume(&mut host, "loud"));
        assert!(game.set_volume(&mut host, "150"));
        assert_eq!(game.store().get("musicVolume").as_deref(), Some("100"));
        assert!(host.has_performed(&Effect::text("vol-display", "100%")));
        assert_eq!(host.music.as_ref().unwrap().volume, 1.0);
    }

    #[test]
    fn test_unlock_never_lowers() {
        let mut game = game(2);
        assert_eq!(game.unlock_level(3), 3);
        assert_eq!(game.unlock_level(2), 3);
        game.reset_progress();
        assert_eq!(game.unlocked_level(), 1);
    }

    #[test]
    fn test_wrong_candle_feedback_reverts_message() {
        let (mut game, mut host) = started(2);
        click(&mut game, &mut host, &["lighter", "candle-2", "candle-3"]);
        assert_eq!(
            host.last_message(),
            Some("❌ Wrong order! You tried to light candle 3. The candles went out.")
        );
        run_for(&mut game, &mut host, 2_000.0);
        assert!(host.has_performed(&Effect::say("Follow the clue on the board.", Tone::Neutral)));
    }
}
