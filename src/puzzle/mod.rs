//! Puzzle mechanisms shared by the levels
//!
//! Pure state, no page access:
//! - `sequence`: N sub-goals in fixed, derived or free order
//! - `code`: label → digit secrets and terminal input parsing
//! - `reveal`: UV-lamp proximity fade

pub mod code;
pub mod reveal;
pub mod sequence;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub use code::{Hue, Label, SecretCode, Symbol, parse_code, parse_slot, parse_slots};
pub use reveal::{ClueFade, RayHit, UvReveal};
pub use sequence::{Activation, SequenceValidator};

/// Tools the player can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Item {
    Lighter,
    UvLamp,
}

/// What clicking a scene object does
#[derive(Debug, Clone, PartialEq)]
pub struct Behavior<A> {
    pub action: A,
    /// Tool needed before the action does anything
    pub requires: Option<Item>,
    /// Object made visible / available by the action
    pub reveals: Option<&'static str>,
}

impl<A> Behavior<A> {
    pub fn new(action: A) -> Self {
        Self {
            action,
            requires: None,
            reveals: None,
        }
    }

    pub fn requires(mut self, item: Item) -> Self {
        self.requires = Some(item);
        self
    }

    pub fn reveals(mut self, id: &'static str) -> Self {
        self.reveals = Some(id);
        self
    }
}

/// Scene object id → behavior
#[derive(Debug, Clone)]
pub struct BehaviorTable<A> {
    entries: HashMap<String, Behavior<A>>,
}

impl<A> Default for BehaviorTable<A> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<A> BehaviorTable<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: impl Into<String>, behavior: Behavior<A>) -> Self {
        self.entries.insert(id.into(), behavior);
        self
    }

    pub fn get(&self, id: &str) -> Option<&Behavior<A>> {
        self.entries.get(id)
    }

    /// Every bound id (sorted, for stable binding order)
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}
