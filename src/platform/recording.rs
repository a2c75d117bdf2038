//! Headless host
//!
//! Records every effect and keeps scheduled callbacks on a virtual clock. Used
//! by the native walkthrough driver and by the runtime tests.

use std::collections::HashSet;

use super::Host;
use crate::audio::MusicPlayer;
use crate::effect::Effect;
use crate::error::AudioError;

/// Fake `<audio id="bg-music">`
#[derive(Debug, Clone, Default)]
pub struct RecordedMusic {
    pub playing: bool,
    pub volume: f32,
    /// Simulate the browser autoplay block
    pub blocked: bool,
    pub play_attempts: u32,
}

impl MusicPlayer for RecordedMusic {
    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    fn play(&mut self) -> Result<(), AudioError> {
        self.play_attempts += 1;
        if self.blocked {
            return Err(AudioError::PlaybackBlocked);
        }
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}

/// A callback waiting on the virtual clock
#[derive(Debug, Clone)]
struct Pending {
    due_ms: f64,
    seq: u64,
    effects: Vec<Effect>,
}

/// Host that records instead of rendering
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    /// Everything performed so far, in order
    pub performed: Vec<Effect>,
    pub music: Option<RecordedMusic>,
    /// Element ids the fake page contains; empty means "every id exists"
    elements: HashSet<String>,
    pending: Vec<Pending>,
    now_ms: f64,
    seq: u64,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self {
            music: Some(RecordedMusic {
                volume: 1.0,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// Restrict the fake page to these element ids
    pub fn with_elements<'a>(mut self, ids: impl IntoIterator<Item = &'a str>) -> Self {
        self.elements = ids.into_iter().map(str::to_string).collect();
        self
    }

    pub fn without_music(mut self) -> Self {
        self.music = None;
        self
    }

    /// Current virtual time
    pub fn now(&self) -> f64 {
        self.now_ms
    }

    /// Move the virtual clock forward and return the callbacks that came due,
    /// oldest first
    pub fn advance(&mut self, ms: f64) -> Vec<Vec<Effect>> {
        self.now_ms += ms;
        let now = self.now_ms;
        let (mut due, rest): (Vec<Pending>, Vec<Pending>) =
            self.pending.drain(..).partition(|p| p.due_ms <= now);
        self.pending = rest;
        due.sort_by(|a, b| {
            a.due_ms
                .partial_cmp(&b.due_ms)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.seq.cmp(&b.seq))
        });
        due.into_iter().map(|p| p.effects).collect()
    }

    /// Drop the performed log (keeps pending callbacks)
    pub fn clear_log(&mut self) {
        self.performed.clear();
    }

    /// Latest HUD message text
    pub fn last_message(&self) -> Option<&str> {
        self.performed.iter().rev().find_map(|e| match e {
            Effect::Say(msg) => Some(msg.text.as_str()),
            _ => None,
        })
    }

    pub fn has_performed(&self, effect: &Effect) -> bool {
        self.performed.contains(effect)
    }
}

impl Host for RecordingHost {
    fn perform(&mut self, effect: Effect) {
        log::debug!("perform {:?}", effect);
        self.performed.push(effect);
    }

    fn schedule(&mut self, delay_ms: u32, effects: Vec<Effect>) {
        self.seq += 1;
        self.pending.push(Pending {
            due_ms: self.now_ms + delay_ms as f64,
            seq: self.seq,
            effects,
        });
    }

    fn has_element(&self, id: &str) -> bool {
        self.elements.is_empty() || self.elements.contains(id)
    }

    fn music(&mut self) -> Option<&mut dyn MusicPlayer> {
        self.music.as_mut().map(|m| m as &mut dyn MusicPlayer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::Tone;

    #[test]
    fn test_scheduled_effects_come_due_in_order() {
        let mut host = RecordingHost::new();
        host.schedule(1200, vec![Effect::say("second", Tone::Neutral)]);
        host.schedule(600, vec![Effect::say("first", Tone::Neutral)]);

        assert!(host.advance(500.0).is_empty());
        let due = host.advance(800.0);
        assert_eq!(due.len(), 2);
        assert_eq!(due[0], vec![Effect::say("first", Tone::Neutral)]);
        assert!(host.advance(10_000.0).is_empty());
    }

    #[test]
    fn test_restricted_elements() {
        let host = RecordingHost::new().with_elements(["pause-menu"]);
        assert!(host.has_element("pause-menu"));
        assert!(!host.has_element("timer"));
    }
}
