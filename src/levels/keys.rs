//! Level 1: find three keys
//!
//! Each key hides behind a container (drawer, box, picture). Keys can be taken
//! in any order once revealed; the door opens with all three.

use std::collections::HashSet;

use super::advance_to;
use crate::audio::Sfx;
use crate::effect::{Animation, Effect, Message, Tone};
use crate::puzzle::{Activation, Behavior, BehaviorTable, SequenceValidator};

pub const DOOR_ID: &str = "door";
const DOOR_PIVOT_ID: &str = "doorPivot";
const DOOR_TEXT_IDS: [&str; 2] = ["door-text", "door-text-bg"];
const COUNTER_ID: &str = "keys";
const KEY_IDS: [&str; 3] = ["key1", "key2", "key3"];

/// What a level-1 object does
#[derive(Debug, Clone, PartialEq)]
pub enum KeyAction {
    /// Open a container once, revealing a key
    Open { sfx: Sfx, animation: Animation, message: &'static str },
    /// Take a revealed key
    TakeKey,
    Door,
}

#[derive(Debug, Clone)]
pub struct KeyRoom {
    behaviors: BehaviorTable<KeyAction>,
    keys: SequenceValidator<String>,
    opened: HashSet<String>,
    revealed: HashSet<String>,
    door_opened: bool,
}

impl Default for KeyRoom {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyRoom {
    pub fn new() -> Self {
        let behaviors = BehaviorTable::new()
            .with(
                "drawer1",
                Behavior::new(KeyAction::Open {
                    sfx: Sfx::DrawerOpen,
                    animation: Animation::new("position", "3.9 0.55 2.45", 650).easing("easeOutQuad"),
                    message: "The drawer slid open... there's a key inside!",
                })
                .reveals("key1"),
            )
            .with(
                "boxLid",
                Behavior::new(KeyAction::Open {
                    sfx: Sfx::BoxOpen,
                    animation: Animation::new("rotation", "-80 0 0", 700).easing("easeOutQuad"),
                    message: "You opened the box... there's a key in it!",
                })
                .reveals("key2"),
            )
            .with(
                "picture1",
                Behavior::new(KeyAction::Open {
                    sfx: Sfx::DrawerOpen,
                    animation: Animation::new("position", "3.0 2 -6.85", 700).easing("easeOutQuad"),
                    message: "🖼️ The picture moved... a key was hidden behind it!",
                })
                .reveals("key3"),
            )
            .with("key1", Behavior::new(KeyAction::TakeKey))
            .with("key2", Behavior::new(KeyAction::TakeKey))
            .with("key3", Behavior::new(KeyAction::TakeKey))
            .with(DOOR_ID, Behavior::new(KeyAction::Door));

        Self {
            behaviors,
            keys: SequenceValidator::unordered(KEY_IDS.iter().map(|s| s.to_string()).collect()),
            opened: HashSet::new(),
            revealed: HashSet::new(),
            door_opened: false,
        }
    }

    pub fn behaviors(&self) -> &BehaviorTable<KeyAction> {
        &self.behaviors
    }

    pub fn keys_found(&self) -> usize {
        self.keys.progress()
    }

    pub fn on_load(&mut self) -> Vec<Effect> {
        let mut effects: Vec<Effect> = KEY_IDS.iter().map(|id| Effect::visible(id, false)).collect();
        effects.push(Effect::text(COUNTER_ID, "0"));
        effects
    }

    pub fn activate(&mut self, id: &str) -> Vec<Effect> {
        let Some(behavior) = self.behaviors.get(id) else {
            return Vec::new();
        };
        match behavior.action.clone() {
            KeyAction::Open {
                sfx,
                animation,
                message,
            } => {
                let reveals = behavior.reveals;
                self.open(id, sfx, animation, message, reveals)
            }
            KeyAction::TakeKey => self.take_key(id),
            KeyAction::Door => self.door(),
        }
    }

    fn open(
        &mut self,
        id: &str,
        sfx: Sfx,
        animation: Animation,
        message: &'static str,
        reveals: Option<&'static str>,
    ) -> Vec<Effect> {
        if !self.opened.insert(id.to_string()) {
            return Vec::new();
        }
        let mut effects = vec![Effect::sfx(sfx), Effect::animate(id, animation)];
        if let Some(key) = reveals {
            self.revealed.insert(key.to_string());
            effects.push(Effect::visible(key, true));
        }
        effects.push(Effect::say(message, Tone::Discovery));
        effects
    }

    fn take_key(&mut self, id: &str) -> Vec<Effect> {
        // Still hidden in its container
        if !self.revealed.contains(id) {
            return Vec::new();
        }
        let Activation::Accepted { progress, complete } = self.keys.activate(&id.to_string()) else {
            return Vec::new();
        };

        let mut effects = vec![
            Effect::text(COUNTER_ID, progress.to_string()),
            Effect::sfx(Sfx::Key),
            Effect::visible(id, false),
            Effect::say(
                format!("Key picked up! ({}/{})", progress, self.keys.required()),
                Tone::Success,
            ),
        ];
        if complete {
            effects.push(Effect::after(
                600,
                vec![
                    Effect::say("You have all 3 keys! Now open the door!", Tone::Success),
                    Effect::class(DOOR_ID, "unlocked", true),
                ],
            ));
        } else {
            effects.push(Effect::after(
                1200,
                vec![Effect::say("Keep looking...", Tone::Neutral)],
            ));
        }
        effects
    }

    fn door(&mut self) -> Vec<Effect> {
        if self.door_opened {
            return Vec::new();
        }

        if self.keys.is_complete() {
            self.door_opened = true;
            let mut effects = vec![Effect::Say(
                Message::new("🚪 Door unlocked! Moving on...", Tone::Success).large(),
            )];
            effects.extend(DOOR_TEXT_IDS.iter().map(|id| Effect::visible(id, false)));
            effects.push(Effect::sfx(Sfx::DoorOpen));
            effects.push(Effect::animate(
                DOOR_PIVOT_ID,
                Animation::new("rotation", "0 -95 0", 850).easing("easeOutQuad"),
            ));
            effects.push(Effect::after(1800, advance_to(2)));
            return effects;
        }

        let missing = self.keys.remaining();
        let mut effects = vec![Effect::sfx(Sfx::DoorLocked)];
        effects.extend(DOOR_TEXT_IDS.iter().map(|id| Effect::visible(id, true)));
        effects.push(Effect::after(
            1200,
            DOOR_TEXT_IDS.iter().map(|id| Effect::visible(id, false)).collect(),
        ));
        effects.push(Effect::say(
            format!("{} {} missing.", missing, if missing == 1 { "key" } else { "keys" }),
            Tone::Failure,
        ));
        effects.push(Effect::after(
            1200,
            vec![Effect::say("Keep looking...", Tone::Neutral)],
        ));
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Page;

    fn delayed(effects: &[Effect]) -> Vec<Effect> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::After { effects, .. } => Some(effects.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    #[test]
    fn test_hidden_key_cannot_be_taken() {
        let mut room = KeyRoom::new();
        assert!(room.activate("key1").is_empty());
        assert_eq!(room.keys_found(), 0);
    }

    #[test]
    fn test_container_opens_once_and_reveals() {
        let mut room = KeyRoom::new();
        let effects = room.activate("drawer1");
        assert!(effects.contains(&Effect::visible("key1", true)));
        assert!(effects.contains(&Effect::sfx(Sfx::DrawerOpen)));
        assert!(room.activate("drawer1").is_empty());
    }

    #[test]
    fn test_all_keys_unlock_door() {
        let mut room = KeyRoom::new();
        for container in ["picture1", "drawer1", "boxLid"] {
            room.activate(container);
        }
        room.activate("key3");
        room.activate("key1");
        assert!(room.activate("key1").is_empty());
        let last = room.activate("key2");
        assert_eq!(room.keys_found(), 3);
        assert!(delayed(&last).contains(&Effect::class(DOOR_ID, "unlocked", true)));

        let door = room.activate(DOOR_ID);
        let later = delayed(&door);
        assert!(later.contains(&Effect::UnlockLevel(2)));
        assert!(later.contains(&Effect::StopTimer));
        assert!(later.contains(&Effect::Navigate(Page::Level(2))));

        // The door only opens once
        assert!(room.activate(DOOR_ID).is_empty());
    }

    #[test]
    fn test_locked_door_reports_missing_keys() {
        let mut room = KeyRoom::new();
        room.activate("boxLid");
        room.activate("key2");
        let effects = room.activate(DOOR_ID);
        assert!(effects.contains(&Effect::sfx(Sfx::DoorLocked)));
        assert!(effects.contains(&Effect::say("2 keys missing.", Tone::Failure)));
        assert!(effects.contains(&Effect::visible("door-text", true)));
        assert!(delayed(&effects).contains(&Effect::visible("door-text", false)));
        assert!(!delayed(&effects).contains(&Effect::UnlockLevel(2)));
    }

    #[test]
    fn test_unknown_object_is_ignored() {
        let mut room = KeyRoom::new();
        assert!(room.activate("lamp").is_empty());
    }
}
