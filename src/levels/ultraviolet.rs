//! Level 4: UV symbol hunt (final room)
//!
//! Four symbols painted in UV ink carry the code digits. They only show while
//! the UV lamp is on and the pointer sweeps near them. The terminal takes one
//! digit per symbol in a fixed slot order. The exit ends the game.

use glam::Vec3;
use rand::Rng;

use crate::audio::Sfx;
use crate::effect::{Animation, Effect, Tone, say_then};
use crate::platform::Page;
use crate::puzzle::{
    Behavior, BehaviorTable, ClueFade, Item, Label, RayHit, SecretCode, Symbol, UvReveal,
    parse_slots,
};

pub const DOOR_ID: &str = "door";
pub const TERMINAL_ID: &str = "terminal";
const DOOR_PIVOT_ID: &str = "doorPivot";
const DRAWER_ID: &str = "uv-drawer";
const LAMP_ID: &str = "uv-flashlight";
const PEDESTAL_ID: &str = "uv-pedestal";
const SPOT_ID: &str = "uv-spot";
const OVERLAY_ID: &str = "code-overlay";
const CODE_MSG_ID: &str = "code-msg";
const ORDER_TEXT_ID: &str = "code-order-text";
const JUMPSCARE_ID: &str = "jumpscare";
const JUMPSCARE_TEXT_ID: &str = "jumpscare-text";

/// Drawer slid out by 0.28 along z from its resting spot
const DRAWER_OPEN_POSITION: &str = "0 0.45 0.28";
const SPOT_INTENSITY_ON: &str = "4.2";
const FIND_LAMP_HINT: &str = "Find the UV flashlight.";

/// Symbol feeding each terminal slot
pub const SLOT_ORDER: [Symbol; 4] = [Symbol::Tri, Symbol::X, Symbol::Cir, Symbol::Sqr];

/// What a level-4 object does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UvAction {
    OpenDrawer,
    TakeLamp,
    ToggleLamp,
    OpenTerminal,
    Door,
}

/// Scene id of a symbol's UV text
pub fn clue_id(symbol: Symbol) -> String {
    format!("uv-{}", symbol.name())
}

pub fn slot_id(i: usize) -> String {
    format!("term-slot-{}", i)
}

fn fade_effects(fade: &ClueFade) -> [Effect; 2] {
    let id = clue_id(fade.symbol);
    [
        Effect::visible(&id, fade.visible),
        Effect::attribute(
            &id,
            "material",
            format!("transparent: true; opacity: {:.2}", fade.opacity),
        ),
    ]
}

#[derive(Debug, Clone)]
pub struct UvRoom {
    behaviors: BehaviorTable<UvAction>,
    secret: SecretCode<Symbol>,
    reveal: UvReveal,
    drawer_opened: bool,
    has_lamp: bool,
    lamp_on: bool,
    terminal_open: bool,
    solved: bool,
    door_opened: bool,
}

impl UvRoom {
    pub fn new(rng: &mut impl Rng) -> Self {
        Self::with_secret(SecretCode::generate(rng))
    }

    pub fn with_secret(secret: SecretCode<Symbol>) -> Self {
        let behaviors = BehaviorTable::new()
            .with(DRAWER_ID, Behavior::new(UvAction::OpenDrawer).reveals(LAMP_ID))
            .with(LAMP_ID, Behavior::new(UvAction::TakeLamp))
            .with(PEDESTAL_ID, Behavior::new(UvAction::ToggleLamp))
            .with(
                TERMINAL_ID,
                Behavior::new(UvAction::OpenTerminal).requires(Item::UvLamp),
            )
            .with(DOOR_ID, Behavior::new(UvAction::Door));

        Self {
            behaviors,
            secret,
            reveal: UvReveal::new(),
            drawer_opened: false,
            has_lamp: false,
            lamp_on: false,
            terminal_open: false,
            solved: false,
            door_opened: false,
        }
    }

    pub fn behaviors(&self) -> &BehaviorTable<UvAction> {
        &self.behaviors
    }

    pub fn secret(&self) -> &SecretCode<Symbol> {
        &self.secret
    }

    pub fn expected_code(&self) -> Vec<u8> {
        self.secret.expected(&SLOT_ORDER)
    }

    pub fn lamp_on(&self) -> bool {
        self.lamp_on
    }

    pub fn has_lamp(&self) -> bool {
        self.has_lamp
    }

    pub fn terminal_open(&self) -> bool {
        self.terminal_open
    }

    pub fn is_solved(&self) -> bool {
        self.solved
    }

    pub fn opacity(&self, symbol: Symbol) -> f32 {
        self.reveal.opacity(symbol)
    }

    fn has(&self, item: Item) -> bool {
        match item {
            Item::UvLamp => self.has_lamp,
            Item::Lighter => false,
        }
    }

    pub fn on_load(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        for (symbol, digit) in self.secret.pairs() {
            effects.push(Effect::text(
                &clue_id(*symbol),
                format!("{}:{}", symbol.name(), digit),
            ));
        }
        for fade in self.reveal.hide_all() {
            effects.extend(fade_effects(&fade));
        }
        let names: Vec<&str> = SLOT_ORDER.iter().map(|s| s.name()).collect();
        effects.push(Effect::text(
            ORDER_TEXT_ID,
            format!("Fill in the digit of each symbol ({}).", names.join(", ")),
        ));
        effects.push(Effect::display(OVERLAY_ID, false));
        effects.push(Effect::visible(LAMP_ID, false));
        effects.push(Effect::attribute(SPOT_ID, "intensity", "0"));
        effects.push(Effect::say(
            "Find the UV flashlight. This room does not forgive.",
            Tone::Neutral,
        ));
        effects
    }

    pub fn activate(&mut self, id: &str) -> Vec<Effect> {
        let Some(behavior) = self.behaviors.get(id) else {
            return Vec::new();
        };
        let (action, requires, reveals) = (behavior.action, behavior.requires, behavior.reveals);

        if let Some(item) = requires {
            if !self.has(item) {
                let mut effects = vec![Effect::sfx_at(Sfx::Hmm, 0.75)];
                effects.extend(say_then(
                    "❌ You're missing something to read the clues...",
                    Tone::Alarm,
                    1400,
                    FIND_LAMP_HINT,
                ));
                return effects;
            }
        }

        match action {
            UvAction::OpenDrawer => self.open_drawer(reveals),
            UvAction::TakeLamp => self.take_lamp(),
            UvAction::ToggleLamp => self.toggle_uv(),
            UvAction::OpenTerminal => self.open_terminal(),
            UvAction::Door => self.door(),
        }
    }

    fn open_drawer(&mut self, reveals: Option<&'static str>) -> Vec<Effect> {
        if self.drawer_opened {
            return Vec::new();
        }
        self.drawer_opened = true;
        let mut effects = vec![
            Effect::sfx_at(Sfx::DrawerOpen, 0.75),
            Effect::animate(
                DRAWER_ID,
                Animation::new("position", DRAWER_OPEN_POSITION, 650)
                    .named("animation__open")
                    .easing("easeOutQuad"),
            ),
        ];
        if let Some(lamp) = reveals {
            effects.push(Effect::visible(lamp, true));
            effects.push(Effect::animate(
                lamp,
                Animation::new("position", "0.18 0.78 0.55", 650)
                    .named("animation__pop")
                    .from("0.18 0.72 0.12")
                    .easing("easeOutBack"),
            ));
        }
        effects.extend(say_then(
            "👀 The drawer opened... something glows inside.",
            Tone::Discovery,
            1400,
            FIND_LAMP_HINT,
        ));
        effects
    }

    fn take_lamp(&mut self) -> Vec<Effect> {
        // Still shut in the drawer
        if self.has_lamp || !self.drawer_opened {
            return Vec::new();
        }
        self.has_lamp = true;
        log::info!("UV lamp picked up");
        let mut effects = vec![
            Effect::visible(LAMP_ID, false),
            Effect::sfx_at(Sfx::FindLighter, 0.8),
        ];
        effects.extend(say_then(
            "✅ You picked up the UV flashlight! (U to switch it on/off)",
            Tone::Success,
            2200,
            "Switch on the UV and sweep the beam over the marks.",
        ));
        effects
    }

    /// `U` key or pedestal click
    pub fn toggle_uv(&mut self) -> Vec<Effect> {
        if !self.has_lamp {
            let mut effects = vec![Effect::sfx_at(Sfx::Hmm, 0.7)];
            effects.extend(say_then(
                "❌ You need to pick up the UV flashlight.",
                Tone::Alarm,
                1200,
                FIND_LAMP_HINT,
            ));
            return effects;
        }

        self.lamp_on = !self.lamp_on;
        log::debug!("UV lamp {}", if self.lamp_on { "on" } else { "off" });
        let mut effects = vec![
            Effect::attribute(
                SPOT_ID,
                "intensity",
                if self.lamp_on { SPOT_INTENSITY_ON } else { "0" },
            ),
            Effect::sfx_at(Sfx::Switch, 0.45),
        ];
        if self.lamp_on {
            effects.extend(say_then(
                "🟣 UV on: sweep the beam over the marks.",
                Tone::Ultraviolet,
                1400,
                "Point at the walls to reveal the code.",
            ));
        } else {
            for fade in self.reveal.hide_all() {
                effects.extend(fade_effects(&fade));
            }
            effects.extend(say_then("UV off.", Tone::Muted, 900, "Look for the solution."));
        }
        effects
    }

    /// Frame scan; only clues whose opacity moved are re-rendered
    pub fn scan(
        &mut self,
        now_ms: f64,
        hit: Option<RayHit>,
        anchor: impl Fn(Symbol) -> Option<Vec3>,
    ) -> Vec<Effect> {
        if !self.lamp_on {
            return Vec::new();
        }
        let before: Vec<f32> = Symbol::ALL.iter().map(|s| self.reveal.opacity(*s)).collect();
        let Some(fades) = self.reveal.scan(now_ms, hit, anchor) else {
            return Vec::new();
        };
        fades
            .iter()
            .zip(before)
            .filter(|(fade, old)| fade.opacity != *old)
            .flat_map(|(fade, _)| fade_effects(fade))
            .collect()
    }

    fn open_terminal(&mut self) -> Vec<Effect> {
        if self.solved {
            return say_then("✅ Door unlocked! Go to the door.", Tone::Success, 1200, "Go to the door.");
        }
        self.terminal_open = true;
        let mut effects = vec![
            Effect::display(OVERLAY_ID, true),
            Effect::attribute(OVERLAY_ID, "aria-hidden", "false"),
            Effect::text(CODE_MSG_ID, ""),
            Effect::Focus { id: slot_id(0) },
        ];
        effects.extend(say_then(
            "⌨️ Enter the code in symbol order.",
            Tone::Success,
            1200,
            "Use the UV clues to get the digits.",
        ));
        effects
    }

    /// Validate the four terminal slots
    pub fn submit(&mut self, entries: &[String]) -> Vec<Effect> {
        if self.solved || !self.terminal_open {
            return Vec::new();
        }
        let digits = match parse_slots(entries, SLOT_ORDER.len()) {
            Ok(digits) => digits,
            Err(e) => {
                log::debug!("Rejected terminal entry: {}", e);
                return vec![
                    Effect::sfx_at(Sfx::Hmm, 0.75),
                    Effect::text(CODE_MSG_ID, "Fill in all 4 digits (1–9)."),
                ];
            }
        };

        if digits != self.expected_code() {
            let mut effects = vec![
                Effect::sfx_at(Sfx::DoorLocked, 0.85),
                Effect::ClearInputs {
                    ids: (0..SLOT_ORDER.len()).map(slot_id).collect(),
                },
                Effect::text(CODE_MSG_ID, "✗ Wrong. Check the 4 symbols and try again."),
            ];
            effects.extend(say_then(
                "❌ Wrong code. Look at the symbols with UV again.",
                Tone::Alarm,
                1600,
                "Point the UV at the walls and open the terminal.",
            ));
            return effects;
        }

        self.solved = true;
        self.terminal_open = false;
        log::info!("Final terminal solved");
        vec![
            Effect::sfx_at(Sfx::DoorOpen, 0.75),
            Effect::text(CODE_MSG_ID, "✓ Access granted. Door unlocked."),
            Effect::class(DOOR_ID, "unlocked", true),
            Effect::say("✅ Door unlocked! Go to the door.", Tone::Success),
            Effect::after(650, self.hide_overlay()),
        ]
    }

    fn hide_overlay(&self) -> Vec<Effect> {
        vec![
            Effect::display(OVERLAY_ID, false),
            Effect::attribute(OVERLAY_ID, "aria-hidden", "true"),
        ]
    }

    pub fn close_terminal(&mut self) -> Vec<Effect> {
        self.terminal_open = false;
        self.hide_overlay()
    }

    fn door(&mut self) -> Vec<Effect> {
        if self.door_opened {
            return Vec::new();
        }
        if !self.solved {
            let mut effects = vec![Effect::sfx_at(Sfx::DoorLocked, 0.85)];
            effects.extend(say_then(
                "❌ Door locked. Solve the terminal.",
                Tone::Alarm,
                1400,
                "Switch on the UV, find the digits, open the terminal.",
            ));
            return effects;
        }

        self.door_opened = true;
        log::info!("Game finished");
        vec![
            Effect::animate(
                DOOR_PIVOT_ID,
                Animation::new("rotation", "0 -110 0", 900)
                    .named("animation__open")
                    .easing("easeOutQuad"),
            ),
            Effect::after(
                550,
                vec![
                    Effect::display(JUMPSCARE_ID, true),
                    Effect::class(JUMPSCARE_ID, "on", true),
                    Effect::sfx_at(Sfx::Wakeup, 1.0),
                    Effect::after(
                        700,
                        vec![Effect::text(JUMPSCARE_TEXT_ID, "🎉 YOU FINISHED THE GAME!")],
                    ),
                    Effect::after(
                        1900,
                        vec![Effect::StopTimer, Effect::ResetProgress, Effect::Navigate(Page::Hub)],
                    ),
                ],
            ),
        ]
    }
}
