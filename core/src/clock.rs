//! Countdown clock. Owns remaining seconds, tick cadence and pause state.
//!
//! The clock never sleeps. It records when its next decrement is due
//! and the owner calls `fire` once that virtual time is reached. At most
//! one decrement schedule exists at a time: `start` always stops first.

use crate::types::Millis;
use serde::{Deserialize, Serialize};

pub const DEFAULT_INTERVAL_MS: Millis = 1000;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ClockState {
    Idle,
    Running,
    Paused,
    Expired,
}

/// Notifications produced by the clock, in emission order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClockSignal {
    Tick { remaining: u32 },
    Timeout,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CountdownClock {
    remaining:   u32,
    state:       ClockState,
    /// Virtual time of the next decrement. `None` when nothing is scheduled.
    next_due:    Option<Millis>,
    interval_ms: Millis,
}

impl Default for CountdownClock {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL_MS)
    }
}

impl CountdownClock {
    pub fn new(interval_ms: Millis) -> Self {
        Self {
            remaining: 0,
            state: ClockState::Idle,
            next_due: None,
            interval_ms,
        }
    }

    pub fn remaining(&self) -> u32 { self.remaining }
    pub fn state(&self) -> ClockState { self.state }
    pub fn next_due(&self) -> Option<Millis> { self.next_due }
    pub fn is_scheduled(&self) -> bool { self.next_due.is_some() }

    /// Begin counting down from `seconds`. Emits the starting value at once.
    pub fn start(&mut self, now: Millis, seconds: u32) -> Vec<ClockSignal> {
        self.stop();
        self.remaining = seconds;
        let mut signals = vec![ClockSignal::Tick { remaining: seconds }];

        if seconds == 0 {
            self.state = ClockState::Expired;
            signals.push(ClockSignal::Timeout);
        } else {
            self.state = ClockState::Running;
            self.next_due = Some(now.saturating_add(self.interval_ms));
        }
        signals
    }

    /// Run the decrement that was due at `next_due`.
    /// Does nothing if no decrement is scheduled.
    pub fn fire(&mut self) -> Vec<ClockSignal> {
        let Some(due) = self.next_due else {
            return Vec::new();
        };

        self.remaining = self.remaining.saturating_sub(1);
        let mut signals = vec![ClockSignal::Tick { remaining: self.remaining }];

        if self.remaining == 0 {
            self.next_due = None;
            self.state = ClockState::Expired;
            signals.push(ClockSignal::Timeout);
        } else {
            self.next_due = Some(due.saturating_add(self.interval_ms));
        }
        signals
    }

    pub fn pause(&mut self) {
        if self.next_due.take().is_some() {
            self.state = ClockState::Paused;
        }
    }

    /// Restart the cadence from the retained value. The next decrement
    /// lands one full interval after `now`.
    pub fn resume(&mut self, now: Millis) {
        if self.next_due.is_none() && self.remaining > 0 {
            self.next_due = Some(now.saturating_add(self.interval_ms));
            self.state = ClockState::Running;
        }
    }

    pub fn stop(&mut self) {
        self.next_due = None;
        if self.state != ClockState::Expired {
            self.state = ClockState::Idle;
        }
    }

    /// Extend the countdown without disturbing the decrement cadence.
    pub fn add_time(&mut self, seconds: u32) -> ClockSignal {
        self.remaining = self.remaining.saturating_add(seconds);
        ClockSignal::Tick { remaining: self.remaining }
    }

    /// `m:ss`, minutes unpadded.
    pub fn format(seconds: u32) -> String {
        format!("{}:{:02}", seconds / 60, seconds % 60)
    }
}
