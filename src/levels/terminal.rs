//! Level 3: colour-count code terminal
//!
//! Each colour is bound to a digit and the room shows that many objects of the
//! colour. Four clue papers say which colour feeds which code slot. With all
//! clues found the terminal takes a 4-digit code; a wrong code reshuffles the
//! slot order so the clues must be read again.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::advance_to;
use crate::audio::Sfx;
use crate::effect::{Animation, Effect, Message, Tone, say_then};
use crate::error::CodeError;
use crate::puzzle::code::{MAX_DIGIT, shuffled_order};
use crate::puzzle::{Activation, Behavior, BehaviorTable, Hue, Label, SecretCode, SequenceValidator, parse_code};

pub const DOOR_ID: &str = "door";
pub const TERMINAL_ID: &str = "terminal";
const TERMINAL_STATUS_ID: &str = "terminal-status-text";
const OVERLAY_ID: &str = "code-input";
pub const INPUT_ID: &str = "code";
const CODE_MSG_ID: &str = "code-msg";
const COUNTER_ID: &str = "clues";
const CODE_LEN: usize = 4;
const SEARCH_HINT: &str = "Look for clues in the room.";

/// What a level-3 object does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalAction {
    /// Read clue paper `n` (slot number 1..=4)
    ReadClue(u8),
    OpenTerminal,
    Door,
}

/// Scene id of the `i`-th counted object of a colour
pub fn count_id(hue: Hue, i: u8) -> String {
    format!("count-{}-{}", hue.name().to_lowercase(), i)
}

fn clue_id(n: u8) -> String {
    format!("clue-{}", n)
}

fn clue_text_id(n: u8) -> String {
    format!("clue-{}-text", n)
}

#[derive(Debug, Clone)]
pub struct TerminalRoom {
    behaviors: BehaviorTable<TerminalAction>,
    secret: SecretCode<Hue>,
    order: Vec<Hue>,
    clues: SequenceValidator<u8>,
    rng: Pcg32,
    terminal_open: bool,
    solved: bool,
    door_opened: bool,
}

impl TerminalRoom {
    /// Random secret and slot order
    pub fn new(rng: &mut impl Rng) -> Self {
        let secret = SecretCode::generate(rng);
        let order = shuffled_order(rng);
        let reshuffle = Pcg32::seed_from_u64(rng.random());
        Self::with_secret(secret, order, reshuffle)
    }

    pub fn with_secret(secret: SecretCode<Hue>, order: Vec<Hue>, rng: Pcg32) -> Self {
        let mut behaviors = BehaviorTable::new()
            .with(TERMINAL_ID, Behavior::new(TerminalAction::OpenTerminal))
            .with(DOOR_ID, Behavior::new(TerminalAction::Door));
        for n in 1..=CODE_LEN as u8 {
            behaviors = behaviors.with(clue_id(n), Behavior::new(TerminalAction::ReadClue(n)));
        }

        Self {
            behaviors,
            secret,
            order,
            clues: SequenceValidator::unordered((1..=CODE_LEN as u8).collect()),
            rng,
            terminal_open: false,
            solved: false,
            door_opened: false,
        }
    }

    pub fn behaviors(&self) -> &BehaviorTable<TerminalAction> {
        &self.behaviors
    }

    pub fn secret(&self) -> &SecretCode<Hue> {
        &self.secret
    }

    /// Colour feeding each slot, in slot order
    pub fn order(&self) -> &[Hue] {
        &self.order
    }

    /// The code the terminal currently accepts
    pub fn expected_code(&self) -> Vec<u8> {
        self.secret.expected(&self.order)
    }

    pub fn terminal_open(&self) -> bool {
        self.terminal_open
    }

    pub fn is_solved(&self) -> bool {
        self.solved
    }

    pub fn on_load(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        for (hue, digit) in self.secret.pairs() {
            for i in 1..=MAX_DIGIT {
                effects.push(Effect::visible(&count_id(*hue, i), i <= *digit));
            }
        }
        effects.push(Effect::text(COUNTER_ID, "0"));
        effects.push(Effect::display(OVERLAY_ID, false));
        effects.push(Effect::say(
            "Count the colours. The clue papers tell you their order.",
            Tone::Neutral,
        ));
        effects
    }

    pub fn activate(&mut self, id: &str) -> Vec<Effect> {
        let Some(behavior) = self.behaviors.get(id) else {
            return Vec::new();
        };
        match behavior.action {
            TerminalAction::ReadClue(n) => self.read_clue(n),
            TerminalAction::OpenTerminal => self.open_terminal(),
            TerminalAction::Door => self.door(),
        }
    }

    fn clue_text(&self, n: u8) -> Vec<Effect> {
        let Some(hue) = self.order.get(n as usize - 1) else {
            return Vec::new();
        };
        let id = clue_text_id(n);
        vec![
            Effect::text(&id, format!("{}: {}", n, hue.name())),
            Effect::attribute(&id, "color", hue.css()),
        ]
    }

    fn read_clue(&mut self, n: u8) -> Vec<Effect> {
        let Activation::Accepted { progress, complete } = self.clues.activate(&n) else {
            return Vec::new();
        };
        let hue = self.order.get(n as usize - 1).map(|h| h.name()).unwrap_or("?");
        log::debug!("Clue {} read ({})", n, hue);

        let mut effects = vec![Effect::text(COUNTER_ID, progress.to_string())];
        effects.extend(self.clue_text(n));
        effects.push(Effect::attribute(&clue_id(n), "material", "color: #1b3a1b"));
        effects.extend(say_then(
            format!("📄 Slot {} takes the number of {} objects!", n, hue),
            Tone::Success,
            1200,
            "Find the remaining clues.",
        ));
        if complete {
            effects.push(Effect::after(
                600,
                vec![
                    Effect::class(TERMINAL_ID, "unlocked", true),
                    Effect::text(TERMINAL_STATUS_ID, "TERMINAL\n[CLICK HERE]"),
                    Effect::attribute(TERMINAL_STATUS_ID, "color", "#ffff00"),
                    Effect::say("✅ You have all 4 clues! Go to the terminal.", Tone::Hint),
                ],
            ));
        }
        effects
    }

    fn open_terminal(&mut self) -> Vec<Effect> {
        if self.solved {
            return say_then(
                "The terminal is done. Go to the door.",
                Tone::Success,
                1500,
                "Go to the door.",
            );
        }
        if !self.clues.is_complete() {
            return say_then(
                "❌ Terminal locked! Find the 4 clues first.",
                Tone::Failure,
                1500,
                SEARCH_HINT,
            );
        }
        self.terminal_open = true;
        vec![
            Effect::display(OVERLAY_ID, true),
            Effect::text(CODE_MSG_ID, ""),
            Effect::Focus {
                id: INPUT_ID.to_string(),
            },
            Effect::say("⌨️ Enter the code on the terminal.", Tone::Success),
        ]
    }

    /// Validate the typed code
    /// New slot order, never the one the player just saw
    fn reshuffle(&mut self) {
        let previous = self.order.clone();
        while self.order.len() > 1 && self.order == previous {
            self.order.shuffle(&mut self.rng);
        }
    }

    pub fn submit(&mut self, raw: &str) -> Vec<Effect> {
        if self.solved || !self.terminal_open {
            return Vec::new();
        }
        let digits = match parse_code(raw, CODE_LEN) {
            Ok(digits) => digits,
            Err(e) => {
                log::debug!("Rejected code entry: {}", e);
                return vec![
                    Effect::sfx_at(Sfx::Hmm, 0.75),
                    Effect::text(CODE_MSG_ID, invalid_text(&e)),
                ];
            }
        };

        if digits != self.expected_code() {
            self.reshuffle();
            log::info!("Wrong code, slot order now {:?}", self.order);
            let mut effects = vec![
                Effect::sfx_at(Sfx::DoorLocked, 0.85),
                Effect::ClearInputs {
                    ids: vec![INPUT_ID.to_string()],
                },
                Effect::text(CODE_MSG_ID, "✗ Wrong code! The clues have changed."),
            ];
            for n in self.clues.history().to_vec() {
                effects.extend(self.clue_text(n));
            }
            effects.extend(say_then(
                "❌ Wrong code. Read the clue papers again.",
                Tone::Alarm,
                1600,
                SEARCH_HINT,
            ));
            return effects;
        }

        self.solved = true;
        self.terminal_open = false;
        log::info!("Terminal solved");
        vec![
            Effect::sfx_at(Sfx::DoorOpen, 0.75),
            Effect::text(CODE_MSG_ID, "✓ CODE CORRECT!"),
            Effect::after(650, vec![Effect::display(OVERLAY_ID, false)]),
            Effect::class(DOOR_ID, "unlocked", true),
            Effect::say("✅ Door unlocked! Go to the door.", Tone::Success),
        ]
    }

    pub fn close_terminal(&mut self) -> Vec<Effect> {
        self.terminal_open = false;
        vec![Effect::display(OVERLAY_ID, false)]
    }

    fn door(&mut self) -> Vec<Effect> {
        if self.door_opened {
            return Vec::new();
        }
        if !self.solved {
            let mut effects = vec![Effect::sfx_at(Sfx::DoorLocked, 0.85)];
            effects.extend(say_then(
                "❌ The door is locked. Crack the terminal code first.",
                Tone::Failure,
                1400,
                SEARCH_HINT,
            ));
            return effects;
        }
        self.door_opened = true;
        vec![
            Effect::Say(Message::new("✅ LEVEL 3 COMPLETE!", Tone::Success).large()),
            Effect::sfx(Sfx::DoorOpen),
            Effect::animate(
                "doorPivot",
                Animation::new("rotation", "0 -95 0", 850).easing("easeOutQuad"),
            ),
            Effect::after(2000, advance_to(4)),
        ]
    }
}

/// Terminal message for a malformed entry
pub fn invalid_text(error: &CodeError) -> &'static str {
    match error {
        CodeError::Incomplete { .. } | CodeError::NotADigit { .. } => "Enter 4 digits (1–9)",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Page;

    fn room() -> TerminalRoom {
        let secret = SecretCode::from_pairs([
            (Hue::Red, 3),
            (Hue::Green, 7),
            (Hue::Blue, 1),
            (Hue::Yellow, 9),
        ]);
        let order = vec![Hue::Blue, Hue::Red, Hue::Yellow, Hue::Green];
        TerminalRoom::with_secret(secret, order, Pcg32::seed_from_u64(3))
    }

    fn find_clues(room: &mut TerminalRoom) -> Vec<Effect> {
        (1..=4).flat_map(|n| room.activate(&clue_id(n))).collect()
    }

    fn code(digits: &[u8]) -> String {
        digits.iter().map(|d| d.to_string()).collect()
    }

    #[test]
    fn test_counts_match_secret() {
        let mut room = room();
        let effects = room.on_load();
        assert!(effects.contains(&Effect::visible("count-red-3", true)));
        assert!(effects.contains(&Effect::visible("count-red-4", false)));
        assert!(effects.contains(&Effect::visible("count-yellow-9", true)));
        assert!(effects.contains(&Effect::visible("count-blue-2", false)));
    }

    #[test]
    fn test_terminal_locked_until_all_clues() {
        let mut room = room();
        room.activate("clue-1");
        let effects = room.activate(TERMINAL_ID);
        assert!(effects.contains(&Effect::say(
            "❌ Terminal locked! Find the 4 clues first.",
            Tone::Failure
        )));
        assert!(!room.terminal_open());

        room.activate("clue-1");
        let effects = find_clues(&mut room);
        assert!(effects.contains(&Effect::text("clue-2-text", "2: RED")));
        room.activate(TERMINAL_ID);
        assert!(room.terminal_open());
    }

    #[test]
    fn test_malformed_code_changes_nothing() {
        let mut room = room();
        find_clues(&mut room);
        room.activate(TERMINAL_ID);
        let before = room.order().to_vec();
        for raw in ["31", "31x9", ""] {
            let effects = room.submit(raw);
            assert!(effects.contains(&Effect::text(CODE_MSG_ID, "Enter 4 digits (1–9)")));
        }
        assert_eq!(room.order(), before.as_slice());
        assert!(!room.is_solved());
    }

    #[test]
    fn test_wrong_code_clears_and_reshuffles() {
        let mut room = room();
        find_clues(&mut room);
        room.activate(TERMINAL_ID);
        let effects = room.submit("1111");
        assert!(effects.contains(&Effect::ClearInputs {
            ids: vec!["code".to_string()]
        }));
        assert!(!room.is_solved());
        let mut hues = room.order().to_vec();
        hues.sort_by_key(|h| h.name());
        assert_eq!(hues.len(), 4);
        hues.dedup();
        assert_eq!(hues.len(), 4);
    }

    #[test]
    fn test_every_wrong_code_changes_order() {
        for seed in 0..32 {
            let secret = SecretCode::from_pairs([
                (Hue::Red, 3),
                (Hue::Green, 7),
                (Hue::Blue, 1),
                (Hue::Yellow, 9),
            ]);
            let order = vec![Hue::Blue, Hue::Red, Hue::Yellow, Hue::Green];
            let mut room = TerminalRoom::with_secret(secret, order, Pcg32::seed_from_u64(seed));
            find_clues(&mut room);
            room.activate(TERMINAL_ID);
            for _ in 0..8 {
                let before = room.order().to_vec();
                room.submit("1111");
                assert_ne!(room.order(), before.as_slice());
            }
        }
    }

    #[test]
    fn test_right_code_unlocks_door() {
        let mut room = room();
        assert_eq!(room.expected_code(), vec![1, 3, 9, 7]);
        find_clues(&mut room);

        // Locked door before the code
        let effects = room.activate(DOOR_ID);
        assert!(effects.contains(&Effect::sfx_at(Sfx::DoorLocked, 0.85)));

        room.activate(TERMINAL_ID);
        let expected = code(&room.expected_code());
        let effects = room.submit(&expected);
        assert!(room.is_solved());
        assert!(!room.terminal_open());
        assert!(effects.contains(&Effect::class(DOOR_ID, "unlocked", true)));

        let effects = room.activate(DOOR_ID);
        assert!(effects.iter().any(|e| matches!(
            e,
            Effect::After { delay_ms: 2000, effects }
                if effects.contains(&Effect::Navigate(Page::Level(4)))
        )));
    }

    #[test]
    fn test_code_after_reshuffle() {
        let mut room = room();
        find_clues(&mut room);
        room.activate(TERMINAL_ID);
        room.submit("2222");
        let expected = code(&room.expected_code());
        room.submit(&expected);
        assert!(room.is_solved());
    }

    #[test]
    fn test_close_terminal() {
        let mut room = room();
        find_clues(&mut room);
        room.activate(TERMINAL_ID);
        assert_eq!(room.close_terminal(), vec![Effect::display(OVERLAY_ID, false)]);
        assert!(!room.terminal_open());
        assert!(room.submit("1397").is_empty());
    }

    #[test]
    fn test_generated_room() {
        let mut rng = Pcg32::seed_from_u64(11);
        let room = TerminalRoom::new(&mut rng);
        let digits = room.expected_code();
        assert_eq!(digits.len(), 4);
        assert!(digits.iter().all(|d| (1..=9).contains(d)));
    }
}
