//! Per-page level configuration
//!
//! A level page may embed `<script id="level-config" type="application/json">`
//! to override the defaults. Every field is optional; a malformed blob is
//! logged and ignored.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::levels::FailurePolicy;

/// A candle and the date painted on it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandleDate {
    pub candle: u8,
    pub date: NaiveDate,
}

/// Overrides for one level page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// Countdown length
    pub timer_seconds: Option<f64>,
    /// Clock turns to warning at or below this many seconds
    pub warning_seconds: Option<f64>,
    /// Level 1: wait for the wake-up intro before the timer starts
    pub intro: Option<bool>,
    /// Level 2: explicit candle order (candle numbers)
    pub candle_order: Option<Vec<u8>>,
    /// Level 2: light candles oldest date first (overrides `candle_order`)
    pub candle_dates: Option<Vec<CandleDate>>,
    /// Level 2: what a wrong candle does
    pub failure_policy: Option<FailurePolicy>,
    /// Fixed RNG seed for the secret codes
    pub seed: Option<u64>,
}

impl LevelConfig {
    /// Parse the JSON blob, falling back to defaults
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(config) => {
                log::info!("Loaded level config");
                config
            }
            Err(e) => {
                log::warn!("Ignoring malformed level config: {}", e);
                Self::default()
            }
        }
    }

    pub fn warning_seconds(&self) -> f64 {
        self.warning_seconds
            .unwrap_or(crate::consts::DEFAULT_WARNING_SECONDS)
    }
}
