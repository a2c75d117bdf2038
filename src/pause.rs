//! Pause menu and background music
//!
//! Two states, Playing and Paused. Music follows both the pause state and the
//! player's music settings.

use serde::{Deserialize, Serialize};

use crate::consts::{MUSIC_BUTTON_ID, MUSIC_TOGGLE_ID, PAUSE_MENU_ID, VOLUME_LABEL_ID, VOLUME_SLIDER_ID};
use crate::effect::Effect;
use crate::platform::Host;
use crate::settings::Settings;

/// Whether the game is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunState {
    #[default]
    Playing,
    Paused,
}

/// Owns the paused flag and whether music is currently playing
#[derive(Debug, Clone, Default)]
pub struct PauseController {
    state: RunState,
    music_playing: bool,
}

impl PauseController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.state == RunState::Paused
    }

    pub fn music_playing(&self) -> bool {
        self.music_playing
    }

    /// Flip between Playing and Paused
    ///
    /// Pages without a pause menu don't pause at all.
    pub fn toggle(&mut self, settings: &Settings, host: &mut impl Host) {
        if !host.has_element(PAUSE_MENU_ID) {
            return;
        }
        match self.state {
            RunState::Playing => self.enter_pause(host),
            RunState::Paused => self.leave_pause(settings, host),
        }
    }

    /// Force Playing (pause menu "resume" button)
    pub fn resume(&mut self, settings: &Settings, host: &mut impl Host) {
        self.leave_pause(settings, host);
    }

    fn enter_pause(&mut self, host: &mut impl Host) {
        self.state = RunState::Paused;
        host.perform(Effect::PauseMenu { shown: true });
        host.perform(Effect::SceneRunning { running: false });

        if self.music_playing {
            if let Some(music) = host.music() {
                music.pause();
            }
            self.music_playing = false;
        }
        log::info!("Paused");
    }

    fn leave_pause(&mut self, settings: &Settings, host: &mut impl Host) {
        let was_paused = self.is_paused();
        self.state = RunState::Playing;
        host.perform(Effect::PauseMenu { shown: false });
        host.perform(Effect::SceneRunning { running: true });
        self.apply_music(settings, host);
        if was_paused {
            log::info!("Resumed");
        }
    }

    /// Push the music settings to the audio element
    ///
    /// Playback refused by the browser is expected before the first gesture
    /// and only logged.
    pub fn apply_music(&mut self, settings: &Settings, host: &mut impl Host) {
        let paused = self.is_paused();
        let Some(music) = host.music() else { return };

        music.set_volume(settings.gain());

        if settings.music_enabled && !paused {
            match music.play() {
                Ok(()) => self.music_playing = true,
                Err(e) => {
                    log::debug!("Background music: {}", e);
                    self.music_playing = music.is_playing();
                }
            }
        } else {
            music.pause();
            self.music_playing = false;
        }
    }
}

/// Effects that bring the music controls in line with the settings
pub fn settings_ui(settings: &Settings) -> Vec<Effect> {
    vec![
        Effect::class(MUSIC_TOGGLE_ID, "active", settings.music_enabled),
        Effect::attribute(VOLUME_SLIDER_ID, "value", settings.music_volume.to_string()),
        Effect::text(VOLUME_LABEL_ID, format!("{}%", settings.music_volume)),
        // The standalone music button is only offered while music is off
        Effect::display(MUSIC_BUTTON_ID, !settings.music_enabled),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::RecordingHost;

    fn music_playing(host: &RecordingHost) -> bool {
        host.music.as_ref().map(|m| m.playing).unwrap_or(false)
    }

    #[test]
    fn test_toggle_pauses_scene_and_music() {
        let settings = Settings::default();
        let mut host = RecordingHost::new();
        let mut pause = PauseController::new();

        pause.apply_music(&settings, &mut host);
        assert!(pause.music_playing());
        assert!(music_playing(&host));

        pause.toggle(&settings, &mut host);
        assert!(pause.is_paused());
        assert!(!music_playing(&host));
        assert!(host.has_performed(&Effect::PauseMenu { shown: true }));
        assert!(host.has_performed(&Effect::SceneRunning { running: false }));

        pause.toggle(&settings, &mut host);
        assert_eq!(pause.state(), RunState::Playing);
        assert!(music_playing(&host));
        assert!(host.has_performed(&Effect::SceneRunning { running: true }));
    }

    #[test]
    fn test_no_pause_menu_means_no_pause() {
        let settings = Settings::default();
        let mut host = RecordingHost::new().with_elements(["bg-music"]);
        let mut pause = PauseController::new();
        pause.toggle(&settings, &mut host);
        assert!(!pause.is_paused());
        assert!(host.performed.is_empty());
    }

    #[test]
    fn test_music_disabled_stays_silent_on_resume() {
        let settings = Settings {
            music_enabled: false,
            music_volume: 40,
        };
        let mut host = RecordingHost::new();
        let mut pause = PauseController::new();
        pause.toggle(&settings, &mut host);
        pause.resume(&settings, &mut host);
        assert!(!pause.music_playing());
        assert!(!music_playing(&host));
    }

    #[test]
    fn test_blocked_autoplay_is_swallowed() {
        let settings = Settings::default();
        let mut host = RecordingHost::new();
        if let Some(m) = host.music.as_mut() {
            m.blocked = true;
        }
        let mut pause = PauseController::new();
        pause.apply_music(&settings, &mut host);
        assert!(!pause.music_playing());
        assert_eq!(host.music.as_ref().map(|m| m.play_attempts), Some(1));
        assert!((host.music.as_ref().map(|m| m.volume).unwrap_or(0.0) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_no_music_element_is_fine() {
        let settings = Settings::default();
        let mut host = RecordingHost::new().without_music();
        let mut pause = PauseController::new();
        pause.apply_music(&settings, &mut host);
        assert!(!pause.music_playing());
    }

    #[test]
    fn test_settings_ui_effects() {
        let effects = settings_ui(&Settings {
            music_enabled: false,
            music_volume: 65,
        });
        assert!(effects.contains(&Effect::class("music-toggle", "active", false)));
        assert!(effects.contains(&Effect::text("vol-display", "65%")));
        assert!(effects.contains(&Effect::display("music-control", true)));
    }
}
