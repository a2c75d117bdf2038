//! Commands emitted by the game logic
//!
//! Level controllers never touch the page. They return `Effect` lists which the
//! runtime either handles itself (timer, progress) or hands to the platform
//! host (DOM, scene entities, audio, navigation).

use serde::{Deserialize, Serialize};

use crate::audio::Sfx;
use crate::platform::Page;
use crate::timer::TimerDisplay;

/// Colour of a HUD message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Tone {
    #[default]
    Neutral,
    Success,
    Failure,
    /// Softer failure used by the later levels
    Alarm,
    Hint,
    Discovery,
    Ultraviolet,
    Muted,
}

impl Tone {
    /// CSS colour for the message element
    pub fn css(&self) -> &'static str {
        match self {
            Tone::Neutral => "white",
            Tone::Success => "#00ff00",
            Tone::Failure => "#ff0000",
            Tone::Alarm => "#ff4444",
            Tone::Hint => "#ffff00",
            Tone::Discovery => "#ffaa00",
            Tone::Ultraviolet => "#d39bff",
            Tone::Muted => "#cccccc",
        }
    }
}

/// A HUD message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub tone: Tone,
    /// Font size in px (HUD default when `None`)
    pub font_px: Option<u32>,
}

impl Message {
    pub fn new(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
            font_px: None,
        }
    }

    pub fn large(mut self) -> Self {
        self.font_px = Some(24);
        self
    }
}

/// Declarative scene animation (A-Frame `animation` component)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    /// Component name, e.g. `animation` or `animation__open`
    pub name: String,
    pub property: String,
    pub from: Option<String>,
    pub to: String,
    pub dur_ms: u32,
    pub easing: Option<String>,
}

impl Animation {
    pub fn new(property: &str, to: impl Into<String>, dur_ms: u32) -> Self {
        Self {
            name: "animation".to_string(),
            property: property.to_string(),
            from: None,
            to: to.into(),
            dur_ms,
            easing: None,
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn easing(mut self, easing: &str) -> Self {
        self.easing = Some(easing.to_string());
        self
    }

    /// Attribute value in A-Frame property syntax
    pub fn to_attribute(&self) -> String {
        let mut out = format!("property: {}; to: {}; dur: {}", self.property, self.to, self.dur_ms);
        if let Some(from) = &self.from {
            out.push_str(&format!("; from: {}", from));
        }
        if let Some(easing) = &self.easing {
            out.push_str(&format!("; easing: {}", easing));
        }
        out
    }
}

/// Point light spawned next to a lit object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    pub color: String,
    pub intensity: f32,
    pub distance: f32,
}

impl PointLight {
    /// Warm candle glow
    pub fn candle() -> Self {
        Self {
            color: "#ff6600".to_string(),
            intensity: 0.8,
            distance: 3.0,
        }
    }
}

/// A single command for the runtime or the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    /// Replace the HUD message
    Say(Message),
    /// Scene entity `visible` attribute
    SetVisible { id: String, visible: bool },
    /// Arbitrary scene/DOM attribute
    SetAttribute { id: String, name: String, value: String },
    /// Add/remove a CSS class
    SetClass { id: String, class: String, on: bool },
    /// Text of a DOM element, or `value` of an `a-text` entity
    SetText { id: String, text: String },
    /// Show/hide a DOM element (CSS display)
    Display { id: String, shown: bool },
    Animate { id: String, animation: Animation },
    SpawnLight { id: String, parent: String, light: PointLight },
    Remove { id: String },
    PlaySfx { sfx: Sfx, volume: Option<f32> },
    /// Empty the given input fields
    ClearInputs { ids: Vec<String> },
    Focus { id: String },
    RenderTimer(TimerDisplay),
    /// Pause menu overlay
    PauseMenu { shown: bool },
    /// Scene update loop
    SceneRunning { running: bool },
    Navigate(Page),
    Reload,
    /// Run `effects` after a delay (fire-and-forget)
    After { delay_ms: u32, effects: Vec<Effect> },

    // Handled by the runtime, never by the host
    StartTimer,
    StopTimer,
    UnlockLevel(u8),
    ResetProgress,
}

impl Effect {
    pub fn say(text: impl Into<String>, tone: Tone) -> Self {
        Effect::Say(Message::new(text, tone))
    }

    pub fn visible(id: &str, visible: bool) -> Self {
        Effect::SetVisible {
            id: id.to_string(),
            visible,
        }
    }

    pub fn attribute(id: &str, name: &str, value: impl Into<String>) -> Self {
        Effect::SetAttribute {
            id: id.to_string(),
            name: name.to_string(),
            value: value.into(),
        }
    }

    pub fn class(id: &str, class: &str, on: bool) -> Self {
        Effect::SetClass {
            id: id.to_string(),
            class: class.to_string(),
            on,
        }
    }

    pub fn text(id: &str, text: impl Into<String>) -> Self {
        Effect::SetText {
            id: id.to_string(),
            text: text.into(),
        }
    }

    pub fn display(id: &str, shown: bool) -> Self {
        Effect::Display {
            id: id.to_string(),
            shown,
        }
    }

    pub fn animate(id: &str, animation: Animation) -> Self {
        Effect::Animate {
            id: id.to_string(),
            animation,
        }
    }

    pub fn sfx(sfx: Sfx) -> Self {
        Effect::PlaySfx { sfx, volume: None }
    }

    pub fn sfx_at(sfx: Sfx, volume: f32) -> Self {
        Effect::PlaySfx {
            sfx,
            volume: Some(volume),
        }
    }

    pub fn after(delay_ms: u32, effects: Vec<Effect>) -> Self {
        Effect::After { delay_ms, effects }
    }
}

/// Message now, then a neutral follow-up message after `ms`
pub fn say_then(
    text: impl Into<String>,
    tone: Tone,
    ms: u32,
    reset_text: impl Into<String>,
) -> Vec<Effect> {
    vec![
        Effect::say(text, tone),
        Effect::after(ms, vec![Effect::say(reset_text, Tone::Neutral)]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_animation_attribute_syntax() {
        let anim = Animation::new("rotation", "0 -95 0", 850).easing("easeOutQuad");
        assert_eq!(
            anim.to_attribute(),
            "property: rotation; to: 0 -95 0; dur: 850; easing: easeOutQuad"
        );

        let pop = Animation::new("position", "0.18 0.78 0.55", 650)
            .named("animation__pop")
            .from("0.18 0.72 0.12");
        assert_eq!(pop.name, "animation__pop");
        assert!(pop.to_attribute().contains("from: 0.18 0.72 0.12"));
    }

    #[test]
    fn test_say_then_schedules_neutral_reset() {
        let effects = say_then("Wrong!", Tone::Failure, 2000, "Try again.");
        assert_eq!(effects.len(), 2);
        match &effects[1] {
            Effect::After { delay_ms, effects } => {
                assert_eq!(*delay_ms, 2000);
                assert_eq!(effects[0], Effect::say("Try again.", Tone::Neutral));
            }
            other => panic!("unexpected effect {:?}", other),
        }
    }
}
