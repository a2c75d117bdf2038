//! Level 2: light the candles in the right order
//!
//! The order is either written on the board (fixed) or implied by the dates
//! painted on the candles (oldest first). A lighter must be found first.

use std::collections::HashSet;

use super::{FailurePolicy, advance_to};
use crate::audio::Sfx;
use crate::config::{CandleDate, LevelConfig};
use crate::effect::{Animation, Effect, Message, PointLight, Tone, say_then};
use crate::puzzle::{Activation, Behavior, BehaviorTable, Item, SequenceValidator};

pub const DOOR_ID: &str = "door";
const LIGHTER_ID: &str = "lighter";
const BOARD_ID: &str = "order-board";
const ORDER_TEXT_ID: &str = "order-text";
const COUNTER_ID: &str = "candles";
const FOLLOW_HINT: &str = "Follow the clue on the board.";

/// Board order when the page doesn't configure one
pub const DEFAULT_ORDER: [u8; 4] = [2, 4, 1, 3];

/// What a level-2 object does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandleAction {
    TakeLighter,
    ShowHint,
    Light(u8),
    Door,
}

fn distinct(candles: impl Iterator<Item = u8>) -> bool {
    let mut seen = HashSet::new();
    let mut any = false;
    for n in candles {
        if !seen.insert(n) {
            return false;
        }
        any = true;
    }
    any
}

pub fn candle_id(n: u8) -> String {
    format!("candle-{}", n)
}

fn flame_id(n: u8) -> String {
    format!("flame-{}", n)
}

fn light_id(n: u8) -> String {
    format!("candle-light-{}", n)
}

#[derive(Debug, Clone)]
pub struct CandleRoom {
    behaviors: BehaviorTable<CandleAction>,
    candles: SequenceValidator<u8>,
    dates: Vec<CandleDate>,
    policy: FailurePolicy,
    has_lighter: bool,
    door_opened: bool,
}

impl CandleRoom {
    /// Fixed order
    pub fn with_order(order: Vec<u8>, policy: FailurePolicy) -> Self {
        Self::build(SequenceValidator::fixed(order), Vec::new(), policy)
    }

    /// Chronological order of the painted dates
    pub fn with_dates(dates: Vec<CandleDate>, policy: FailurePolicy) -> Self {
        let candles = SequenceValidator::derived(dates.iter().map(|d| (d.candle, d.date)));
        Self::build(candles, dates, policy)
    }

    /// Dates win over an explicit order; either falls back to the default
    /// order when empty or when a candle appears twice
    pub fn from_config(config: &LevelConfig) -> Self {
        let policy = config.failure_policy.unwrap_or_default();
        match (&config.candle_dates, &config.candle_order) {
            (Some(dates), _) if distinct(dates.iter().map(|d| d.candle)) => {
                Self::with_dates(dates.clone(), policy)
            }
            (_, Some(order)) if distinct(order.iter().copied()) => {
                Self::with_order(order.clone(), policy)
            }
            (dates, order) => {
                if dates.is_some() || order.is_some() {
                    log::warn!("Ignoring candle config with repeated or no candles; using default order");
                }
                Self::with_order(DEFAULT_ORDER.to_vec(), policy)
            }
        }
    }

    fn build(candles: SequenceValidator<u8>, dates: Vec<CandleDate>, policy: FailurePolicy) -> Self {
        let mut behaviors = BehaviorTable::new()
            .with(LIGHTER_ID, Behavior::new(CandleAction::TakeLighter))
            .with(BOARD_ID, Behavior::new(CandleAction::ShowHint).reveals(ORDER_TEXT_ID))
            .with(DOOR_ID, Behavior::new(CandleAction::Door));
        for &n in candles.order() {
            behaviors = behaviors.with(
                candle_id(n),
                Behavior::new(CandleAction::Light(n)).requires(Item::Lighter),
            );
        }

        Self {
            behaviors,
            candles,
            dates,
            policy,
            has_lighter: false,
            door_opened: false,
        }
    }

    pub fn behaviors(&self) -> &BehaviorTable<CandleAction> {
        &self.behaviors
    }

    pub fn candles_lit(&self) -> usize {
        self.candles.progress()
    }

    pub fn is_lit(&self, n: u8) -> bool {
        self.candles.is_resolved(&n)
    }

    /// Required lighting order
    pub fn order(&self) -> &[u8] {
        self.candles.order()
    }

    fn has(&self, item: Item) -> bool {
        match item {
            Item::Lighter => self.has_lighter,
            Item::UvLamp => false,
        }
    }

    pub fn on_load(&mut self) -> Vec<Effect> {
        let mut effects = vec![
            Effect::text(COUNTER_ID, "0"),
            Effect::visible(ORDER_TEXT_ID, false),
        ];
        for &n in self.candles.order() {
            effects.push(Effect::visible(&flame_id(n), false));
        }
        for d in &self.dates {
            effects.push(Effect::text(
                &format!("candle-label-{}", d.candle),
                d.date.format("%d/%m/%Y").to_string(),
            ));
        }
        effects.push(Effect::say(
            "Find the lighter and follow the clue on the board.",
            Tone::Neutral,
        ));
        effects
    }

    pub fn activate(&mut self, id: &str) -> Vec<Effect> {
        let Some(behavior) = self.behaviors.get(id) else {
            return Vec::new();
        };
        let (action, requires, reveals) = (behavior.action, behavior.requires, behavior.reveals);

        match action {
            CandleAction::TakeLighter => self.take_lighter(),
            CandleAction::ShowHint => {
                let mut effects = Vec::new();
                if let Some(target) = reveals {
                    effects.push(Effect::visible(target, true));
                }
                effects.extend(say_then("📜 Clue revealed on the board!", Tone::Hint, 2000, FOLLOW_HINT));
                effects
            }
            CandleAction::Light(n) => {
                if self.candles.is_resolved(&n) {
                    return Vec::new();
                }
                if let Some(item) = requires {
                    if !self.has(item) {
                        return say_then(
                            "❌ You need the lighter to light candles!",
                            Tone::Failure,
                            2000,
                            "Find the lighter first.",
                        );
                    }
                }
                self.light(n)
            }
            CandleAction::Door => self.door(),
        }
    }

    fn take_lighter(&mut self) -> Vec<Effect> {
        if self.has_lighter {
            return Vec::new();
        }
        self.has_lighter = true;
        let mut effects = vec![Effect::visible(LIGHTER_ID, false), Effect::sfx(Sfx::FindLighter)];
        effects.extend(say_then(
            "✅ You picked up the lighter! Now you can light candles.",
            Tone::Success,
            2000,
            FOLLOW_HINT,
        ));
        effects
    }

    fn light(&mut self, n: u8) -> Vec<Effect> {
        match self.candles.activate(&n) {
            Activation::Accepted { progress, complete } => {
                log::debug!("Candle {} lit ({}/{})", n, progress, self.candles.required());
                let mut effects = vec![
                    Effect::text(COUNTER_ID, progress.to_string()),
                    Effect::visible(&flame_id(n), true),
                    Effect::SpawnLight {
                        id: light_id(n),
                        parent: candle_id(n),
                        light: PointLight::candle(),
                    },
                    Effect::say(format!("✅ Candle {} lit!", n), Tone::Success),
                ];
                if complete {
                    effects.push(Effect::after(
                        600,
                        vec![
                            Effect::say("🔥 All lit! The door is unlocked, click it!", Tone::Success),
                            Effect::class(DOOR_ID, "unlocked", true),
                        ],
                    ));
                } else {
                    effects.push(Effect::after(
                        1200,
                        vec![Effect::say("Good! Keep following the clue on the board.", Tone::Neutral)],
                    ));
                }
                effects
            }
            Activation::OutOfOrder { expected } => {
                log::info!("Wrong candle {} (expected {})", n, expected);
                self.penalty(n)
            }
            Activation::AlreadyResolved | Activation::Unknown => Vec::new(),
        }
    }

    fn penalty(&mut self, n: u8) -> Vec<Effect> {
        let text = format!("❌ Wrong order! You tried to light candle {}.", n);
        let mut effects = Vec::new();
        for lit in self.candles.reset() {
            effects.push(Effect::visible(&flame_id(lit), false));
            effects.push(Effect::Remove { id: light_id(lit) });
        }
        effects.push(Effect::text(COUNTER_ID, "0"));
        effects.push(Effect::class(DOOR_ID, "unlocked", false));
        match self.policy {
            FailurePolicy::Reload => {
                effects.push(Effect::say(text, Tone::Failure));
                effects.push(Effect::after(1800, vec![Effect::Reload]));
                effects
            }
            FailurePolicy::Reset => {
                effects.extend(say_then(
                    format!("{} The candles went out.", text),
                    Tone::Failure,
                    2000,
                    FOLLOW_HINT,
                ));
                effects
            }
        }
    }

    fn door(&mut self) -> Vec<Effect> {
        if self.door_opened {
            return Vec::new();
        }
        if self.candles.is_complete() {
            self.door_opened = true;
            return vec![
                Effect::Say(Message::new("✅ LEVEL 2 COMPLETE!", Tone::Success).large()),
                Effect::animate(DOOR_ID, Animation::new("position", "0 5 -15", 1000)),
                Effect::after(2000, advance_to(3)),
            ];
        }
        let missing = self.candles.remaining();
        say_then(
            format!(
                "❌ Still {} {} to light. {}",
                missing,
                if missing == 1 { "candle" } else { "candles" },
                FOLLOW_HINT
            ),
            Tone::Failure,
            2000,
            FOLLOW_HINT,
        )
    }
}
