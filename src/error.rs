//! Error types
//!
//! Nothing in the game is fatal: these errors are either shown to the player
//! (bad code entry) or logged and replaced by a default (storage, audio).

use thiserror::Error;

/// Rejected code-terminal input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeError {
    /// Not every slot holds a value yet
    #[error("expected {expected} digits, got {got}")]
    Incomplete { expected: usize, got: usize },
    /// A slot holds something other than a single digit
    #[error("slot {slot} is not a single digit: {value:?}")]
    NotADigit { slot: usize, value: String },
}

/// LocalStorage access failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("local storage is unavailable")]
    Unavailable,
    #[error("failed to write key {0}")]
    Write(String),
}

/// Background music / sound effect failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AudioError {
    /// The browser refused playback (autoplay policy); expected until the
    /// first user gesture
    #[error("playback blocked by the browser")]
    PlaybackBlocked,
    #[error("audio element {0} not found")]
    MissingElement(String),
}
