//! Level countdown timer
//!
//! Polled on a fixed interval by the platform. Time spent paused is not
//! counted: a paused tick only moves the reference timestamp forward.

use serde::{Deserialize, Serialize};

/// What the HUD clock shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerDisplay {
    /// `MM:SS`
    pub text: String,
    /// Low-time warning state
    pub warning: bool,
}

/// Format whole seconds as `MM:SS`
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Countdown with a one-shot timeout payload
///
/// `T` is whatever should happen on timeout: a closure, or the list of effects
/// the runtime applies. It is handed back from [`LevelTimer::tick`] exactly once.
#[derive(Debug, Clone)]
pub struct LevelTimer<T> {
    remaining_ms: f64,
    running: bool,
    last_tick_ms: f64,
    warning_seconds: f64,
    on_timeout: Option<T>,
}

impl<T> Default for LevelTimer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LevelTimer<T> {
    pub fn new() -> Self {
        Self {
            remaining_ms: 0.0,
            running: false,
            last_tick_ms: 0.0,
            warning_seconds: crate::consts::DEFAULT_WARNING_SECONDS,
            on_timeout: None,
        }
    }

    /// Begin a new countdown, replacing any running one
    ///
    /// Non-positive (or non-finite) durations are ignored and leave the
    /// current timer untouched. Returns whether the timer was started.
    pub fn start(&mut self, seconds: f64, warning_seconds: f64, now_ms: f64, on_timeout: T) -> bool {
        if !seconds.is_finite() || seconds <= 0.0 {
            log::debug!("Ignoring timer start with {} seconds", seconds);
            return false;
        }
        self.remaining_ms = seconds * 1000.0;
        self.running = true;
        self.last_tick_ms = now_ms;
        self.warning_seconds = warning_seconds;
        self.on_timeout = Some(on_timeout);
        log::info!("Level timer started ({}s)", seconds);
        true
    }

    /// Halt the countdown and drop the timeout payload
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.on_timeout = None;
        log::info!("Level timer stopped at {}", format_clock(self.display_seconds()));
    }

    /// Advance by the wall-clock time since the previous tick
    ///
    /// Returns the timeout payload on the tick that reaches zero.
    pub fn tick(&mut self, now_ms: f64, paused: bool) -> Option<T> {
        if !self.running {
            return None;
        }
        if paused {
            self.last_tick_ms = now_ms;
            return None;
        }

        let elapsed = (now_ms - self.last_tick_ms).max(0.0);
        self.last_tick_ms = now_ms;
        self.remaining_ms = (self.remaining_ms - elapsed).max(0.0);

        if self.remaining_ms <= 0.0 {
            self.running = false;
            log::info!("Level timer expired");
            return self.on_timeout.take();
        }
        None
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining_ms(&self) -> f64 {
        self.remaining_ms
    }

    /// Whole seconds shown on the clock (rounded up)
    pub fn display_seconds(&self) -> u64 {
        (self.remaining_ms / 1000.0).ceil().max(0.0) as u64
    }

    pub fn display(&self) -> TimerDisplay {
        let seconds = self.display_seconds();
        TimerDisplay {
            text: format_clock(seconds),
            warning: seconds as f64 <= self.warning_seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::TIMER_POLL_MS;
    use proptest::prelude::*;
    use std::cell::Cell;
    use std::rc::Rc;

    type Callback = Box<dyn FnOnce()>;

    fn counting_timer(seconds: f64) -> (LevelTimer<Callback>, Rc<Cell<u32>>) {
        let fired = Rc::new(Cell::new(0));
        let counter = fired.clone();
        let mut timer: LevelTimer<Callback> = LevelTimer::new();
        assert!(timer.start(seconds, 15.0, 0.0, Box::new(move || counter.set(counter.get() + 1))));
        (timer, fired)
    }

    /// Poll like the platform does, firing any payload
    fn run(timer: &mut LevelTimer<Callback>, from_ms: f64, to_ms: f64, paused: bool) {
        let mut now = from_ms;
        while now < to_ms {
            now = (now + TIMER_POLL_MS as f64).min(to_ms);
            if let Some(cb) = timer.tick(now, paused) {
                cb();
            }
        }
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(90), "01:30");
        assert_eq!(format_clock(605), "10:05");
    }

    #[test]
    fn test_timeout_fires_exactly_once() {
        let (mut timer, fired) = counting_timer(90.0);
        run(&mut timer, 0.0, 90_000.0, false);
        assert_eq!(fired.get(), 1);
        assert_eq!(timer.remaining_ms(), 0.0);
        assert!(!timer.is_running());

        // Further ticks do nothing
        run(&mut timer, 90_000.0, 95_000.0, false);
        assert_eq!(fired.get(), 1);
        assert_eq!(timer.display().text, "00:00");
    }

    #[test]
    fn test_display_rounds_up() {
        let (mut timer, _) = counting_timer(90.0);
        run(&mut timer, 0.0, 250.0, false);
        assert_eq!(timer.display().text, "01:30");
        run(&mut timer, 250.0, 1_000.0, false);
        assert_eq!(timer.display().text, "01:29");
    }

    #[test]
    fn test_warning_threshold() {
        let (mut timer, _) = counting_timer(20.0);
        assert!(!timer.display().warning);
        run(&mut timer, 0.0, 5_000.0, false);
        assert_eq!(timer.display_seconds(), 15);
        assert!(timer.display().warning);
    }

    #[test]
    fn test_non_positive_duration_rejected() {
        let mut timer: LevelTimer<()> = LevelTimer::new();
        assert!(!timer.start(0.0, 15.0, 0.0, ()));
        assert!(!timer.start(-5.0, 15.0, 0.0, ()));
        assert!(!timer.start(f64::NAN, 15.0, 0.0, ()));
        assert!(!timer.is_running());

        // A rejected start leaves a running timer alone
        assert!(timer.start(30.0, 15.0, 0.0, ()));
        assert!(!timer.start(0.0, 15.0, 100.0, ()));
        assert!(timer.is_running());
        assert_eq!(timer.remaining_ms(), 30_000.0);
    }

    #[test]
    fn test_restart_replaces_previous() {
        let (mut timer, first) = counting_timer(10.0);
        let second = Rc::new(Cell::new(0));
        let counter = second.clone();
        timer.start(60.0, 15.0, 0.0, Box::new(move || counter.set(counter.get() + 1)));

        run(&mut timer, 0.0, 60_000.0, false);
        assert_eq!(first.get(), 0);
        assert_eq!(second.get(), 1);
    }

    #[test]
    fn test_stop_when_idle_is_noop() {
        let mut timer: LevelTimer<()> = LevelTimer::new();
        timer.stop();
        assert!(!timer.is_running());
    }

    proptest! {
        #[test]
        fn prop_start_then_stop_freezes(seconds in 1u32..600, later in 0u32..1_000_000) {
            let (mut timer, fired) = counting_timer(seconds as f64);
            timer.stop();
            let frozen = timer.remaining_ms();
            run(&mut timer, 0.0, later as f64, false);
            prop_assert_eq!(timer.remaining_ms(), frozen);
            prop_assert_eq!(frozen, seconds as f64 * 1000.0);
            prop_assert_eq!(fired.get(), 0);
        }

        #[test]
        fn prop_paused_time_not_counted(
            seconds in 10u32..600,
            before in 0u32..5_000,
            paused_for in 0u32..1_000_000,
        ) {
            let (mut timer, fired) = counting_timer(seconds as f64);
            run(&mut timer, 0.0, before as f64, false);
            let at_pause = timer.remaining_ms();

            let resume_at = before as f64 + paused_for as f64;
            run(&mut timer, before as f64, resume_at, true);
            prop_assert_eq!(timer.remaining_ms(), at_pause);

            // First unpaused tick right at resume counts nothing
            timer.tick(resume_at, false);
            prop_assert_eq!(timer.remaining_ms(), at_pause);
            prop_assert_eq!(fired.get(), 0);
        }
    }
}
