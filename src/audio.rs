//! Audio: sound effects and background music
//!
//! All sounds are `<audio>` elements already present in the page. Browsers
//! reject playback until the first user gesture; those rejections are expected
//! and swallowed.

use serde::{Deserialize, Serialize};

use crate::error::AudioError;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sfx {
    /// Key picked up
    Key,
    /// Door swings open
    DoorOpen,
    /// Door rattles, still locked
    DoorLocked,
    /// Drawer / picture slides
    DrawerOpen,
    /// Box lid opens
    BoxOpen,
    /// Waking up (level 1 intro, final jump scare)
    Wakeup,
    /// Lighter or UV lamp picked up
    FindLighter,
    /// "Hmm" - something is missing
    Hmm,
    /// UV lamp switch click
    Switch,
}

impl Sfx {
    /// DOM id of the `<audio>` element
    pub fn element_id(&self) -> &'static str {
        match self {
            Sfx::Key => "sfx-key",
            Sfx::DoorOpen => "sfx-door-open",
            Sfx::DoorLocked => "sfx-door-locked",
            Sfx::DrawerOpen => "sfx-drawer-open",
            Sfx::BoxOpen => "sfx-box-open",
            Sfx::Wakeup => "sfx-wakeup",
            Sfx::FindLighter => "sfx-find-lighter",
            Sfx::Hmm => "sfx-hmm-reflexion",
            Sfx::Switch => "sfx-keys",
        }
    }
}

/// Background music element
pub trait MusicPlayer {
    /// Volume in 0.0 - 1.0
    fn set_volume(&mut self, volume: f32);

    /// Start/continue playback. `Err(PlaybackBlocked)` is not a fault.
    fn play(&mut self) -> Result<(), AudioError>;

    fn pause(&mut self);

    fn is_playing(&self) -> bool;
}

/// Sound effect player backed by `<audio>` elements (WASM only)
#[cfg(target_arch = "wasm32")]
pub struct AudioManager {
    document: Option<web_sys::Document>,
}

#[cfg(target_arch = "wasm32")]
impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_arch = "wasm32")]
impl AudioManager {
    pub fn new() -> Self {
        let document = web_sys::window().and_then(|w| w.document());
        if document.is_none() {
            log::warn!("No document - sound effects disabled");
        }
        Self { document }
    }

    /// Play a sound effect from the start, optionally at a given volume
    pub fn play(&self, sfx: Sfx, volume: Option<f32>) {
        if let Err(e) = self.try_play(sfx, volume) {
            log::debug!("sfx {:?}: {}", sfx, e);
        }
    }

    fn try_play(&self, sfx: Sfx, volume: Option<f32>) -> Result<(), AudioError> {
        use wasm_bindgen::JsCast;

        let el = self
            .document
            .as_ref()
            .and_then(|d| d.get_element_by_id(sfx.element_id()))
            .and_then(|el| el.dyn_into::<web_sys::HtmlMediaElement>().ok())
            .ok_or_else(|| AudioError::MissingElement(sfx.element_id().to_string()))?;

        let _ = el.pause();
        // Some browsers refuse to seek in certain ready states; play anyway
        el.set_current_time(0.0);
        if let Some(v) = volume {
            el.set_volume(v.clamp(0.0, 1.0) as f64);
        }
        swallow_rejection(el.play());
        Ok(())
    }
}

/// `<audio id="bg-music">` (WASM only)
#[cfg(target_arch = "wasm32")]
pub struct BackgroundMusic {
    el: web_sys::HtmlMediaElement,
}

#[cfg(target_arch = "wasm32")]
impl BackgroundMusic {
    /// Look up the page's music element
    pub fn find() -> Option<Self> {
        use wasm_bindgen::JsCast;

        let el = web_sys::window()?
            .document()?
            .get_element_by_id(crate::consts::MUSIC_ELEMENT_ID)?
            .dyn_into::<web_sys::HtmlMediaElement>()
            .ok()?;
        Some(Self { el })
    }
}

#[cfg(target_arch = "wasm32")]
impl MusicPlayer for BackgroundMusic {
    fn set_volume(&mut self, volume: f32) {
        self.el.set_volume(volume.clamp(0.0, 1.0) as f64);
    }

    fn play(&mut self) -> Result<(), AudioError> {
        match self.el.play() {
            Ok(promise) => {
                swallow_rejection(Ok(promise));
                Ok(())
            }
            Err(_) => Err(AudioError::PlaybackBlocked),
        }
    }

    fn pause(&mut self) {
        let _ = self.el.pause();
    }

    fn is_playing(&self) -> bool {
        !self.el.paused()
    }
}

/// Await a `play()` promise and drop an autoplay rejection on the floor
#[cfg(target_arch = "wasm32")]
fn swallow_rejection(result: Result<js_sys::Promise, wasm_bindgen::JsValue>) {
    let Ok(promise) = result else { return };
    wasm_bindgen_futures::spawn_local(async move {
        if wasm_bindgen_futures::JsFuture::from(promise).await.is_err() {
            log::debug!("{}", AudioError::PlaybackBlocked);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sfx_element_ids_are_unique() {
        let all = [
            Sfx::Key,
            Sfx::DoorOpen,
            Sfx::DoorLocked,
            Sfx::DrawerOpen,
            Sfx::BoxOpen,
            Sfx::Wakeup,
            Sfx::FindLighter,
            Sfx::Hmm,
            Sfx::Switch,
        ];
        let ids: std::collections::HashSet<_> = all.iter().map(|s| s.element_id()).collect();
        assert_eq!(ids.len(), all.len());
        assert!(ids.iter().all(|id| id.starts_with("sfx-")));
    }
}
