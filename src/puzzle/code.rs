//! Secret digit codes
//!
//! Each level-3/4 room binds a small label set (colours, symbols) to random
//! digits at load time. The player finds the digits in the room and types them
//! into the terminal in a given label order.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::CodeError;

/// Lowest digit a label can be bound to
pub const MIN_DIGIT: u8 = 1;
/// Highest digit a label can be bound to
pub const MAX_DIGIT: u8 = 9;

/// A label the code is keyed by
pub trait Label: Copy + Eq + std::fmt::Debug + 'static {
    /// Every label, in canonical order
    const ALL: &'static [Self];

    /// Text shown in the room and in element ids
    fn name(&self) -> &'static str;
}

/// Colours counted in the terminal room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hue {
    Red,
    Green,
    Blue,
    Yellow,
}

impl Label for Hue {
    const ALL: &'static [Self] = &[Hue::Red, Hue::Green, Hue::Blue, Hue::Yellow];

    fn name(&self) -> &'static str {
        match self {
            Hue::Red => "RED",
            Hue::Green => "GREEN",
            Hue::Blue => "BLUE",
            Hue::Yellow => "YELLOW",
        }
    }
}

impl Hue {
    /// CSS colour of the counted objects and clue text
    pub fn css(&self) -> &'static str {
        match self {
            Hue::Red => "#e53935",
            Hue::Green => "#43a047",
            Hue::Blue => "#1e88e5",
            Hue::Yellow => "#fdd835",
        }
    }
}

/// Symbols painted in UV ink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    Tri,
    Cir,
    Sqr,
    X,
}

impl Label for Symbol {
    const ALL: &'static [Self] = &[Symbol::Tri, Symbol::Cir, Symbol::Sqr, Symbol::X];

    fn name(&self) -> &'static str {
        match self {
            Symbol::Tri => "TRI",
            Symbol::Cir => "CIR",
            Symbol::Sqr => "SQR",
            Symbol::X => "X",
        }
    }
}

/// Label → digit binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretCode<L> {
    digits: Vec<(L, u8)>,
}

impl<L: Label> SecretCode<L> {
    /// Bind every label to a distinct random digit in 1..=9
    pub fn generate(rng: &mut impl Rng) -> Self {
        let mut pool: Vec<u8> = (MIN_DIGIT..=MAX_DIGIT).collect();
        pool.shuffle(rng);
        let digits = L::ALL.iter().copied().zip(pool).collect();
        Self { digits }
    }

    /// Fixed binding (tests, configured rooms)
    pub fn from_pairs(pairs: impl IntoIterator<Item = (L, u8)>) -> Self {
        Self {
            digits: pairs.into_iter().collect(),
        }
    }

    pub fn digit(&self, label: L) -> Option<u8> {
        self.digits.iter().find(|(l, _)| *l == label).map(|(_, d)| *d)
    }

    /// Digits the terminal expects for the given slot order
    pub fn expected(&self, order: &[L]) -> Vec<u8> {
        order.iter().filter_map(|l| self.digit(*l)).collect()
    }

    pub fn pairs(&self) -> &[(L, u8)] {
        &self.digits
    }
}

/// Random slot order over every label
pub fn shuffled_order<L: Label>(rng: &mut impl Rng) -> Vec<L> {
    let mut order = L::ALL.to_vec();
    order.shuffle(rng);
    order
}

/// Parse one terminal slot: exactly one decimal digit
pub fn parse_slot(slot: usize, raw: &str) -> Result<u8, CodeError> {
    let trimmed = raw.trim();
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_digit() => Ok(c as u8 - b'0'),
        (None, _) => Err(CodeError::Incomplete {
            expected: 1,
            got: 0,
        }),
        _ => Err(CodeError::NotADigit {
            slot,
            value: trimmed.to_string(),
        }),
    }
}

/// Parse separate slot inputs; every slot must be filled
pub fn parse_slots(raw: &[String], len: usize) -> Result<Vec<u8>, CodeError> {
    let filled = raw.iter().filter(|s| !s.trim().is_empty()).count();
    if raw.len() != len || filled != len {
        return Err(CodeError::Incomplete {
            expected: len,
            got: filled.min(len),
        });
    }
    raw.iter()
        .enumerate()
        .map(|(i, s)| parse_slot(i, s))
        .collect()
}

/// Parse a single code field like `"3719"`
pub fn parse_code(raw: &str, len: usize) -> Result<Vec<u8>, CodeError> {
    let trimmed = raw.trim();
    let got = trimmed.chars().count();
    if got != len {
        return Err(CodeError::Incomplete { expected: len, got });
    }
    trimmed
        .chars()
        .enumerate()
        .map(|(i, c)| {
            c.to_digit(10).map(|d| d as u8).ok_or_else(|| CodeError::NotADigit {
                slot: i,
                value: c.to_string(),
            })
        })
        .collect()
}
