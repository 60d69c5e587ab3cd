//! Digit keys: content, visual state and press/release sequencing.

use crate::animation::{Tween, PRESS_DURATION};
use std::time::Instant;

/// Digit and sub-label of every key, in keypad reading order (1-9, then 0).
pub const KEYPAD: [(char, &str); 10] = [
    ('1', ""),
    ('2', "ABC"),
    ('3', "DEF"),
    ('4', "GHI"),
    ('5', "JKL"),
    ('6', "MNO"),
    ('7', "PQRS"),
    ('8', "TUV"),
    ('9', "WXYZ"),
    ('0', ""),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Idle,
    Pressed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Press,
    Release,
}

#[derive(Debug, Clone, Copy)]
struct Running {
    phase: Phase,
    tween: Tween,
}

/// One tappable key.
///
/// A release that arrives while the press animation is still running is
/// queued and played after it, never cutting the press short.
#[derive(Debug, Clone)]
pub struct DigitKey {
    value: char,
    sub_label: String,
    state: KeyState,
    running: Option<Running>,
    release_queued: bool,
}

impl DigitKey {
    pub fn new(value: char, sub_label: impl Into<String>) -> Self {
        Self {
            value,
            sub_label: sub_label.into(),
            state: KeyState::Idle,
            running: None,
            release_queued: false,
        }
    }

    /// Replace displayed content.
    pub fn configure(&mut self, value: char, sub_label: impl Into<String>) {
        self.value = value;
        self.sub_label = sub_label.into();
    }

    pub fn value(&self) -> char {
        self.value
    }

    pub fn sub_label(&self) -> &str {
        &self.sub_label
    }

    pub fn state(&self) -> KeyState {
        self.state
    }

    pub fn is_animating(&self) -> bool {
        self.running.is_some()
    }

    /// Current blend between normal (0.0) and highlighted (1.0) colors.
    pub fn highlight(&self, now: Instant) -> f64 {
        match (self.running, self.state) {
            (Some(running), _) => running.tween.value_at(now),
            (None, KeyState::Pressed) => 1.0,
            (None, KeyState::Idle) => 0.0,
        }
    }

    /// Enter the pressed state and return the value to report as a tap.
    pub fn press_start(&mut self, now: Instant) -> char {
        let from = self.highlight(now);
        self.state = KeyState::Pressed;
        self.release_queued = false;
        self.running = Some(Running {
            phase: Phase::Press,
            tween: Tween::new(from, 1.0, now, PRESS_DURATION),
        });
        self.value
    }

    pub fn press_end(&mut self, now: Instant) {
        if self.state == KeyState::Idle {
            return;
        }
        match self.running {
            Some(Running {
                phase: Phase::Press,
                ..
            }) => self.release_queued = true,
            _ => self.start_release(now),
        }
    }

    /// Advance the animation sequence. Returns `true` while still animating.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(running) = self.running else {
            return false;
        };
        if !running.tween.is_finished(now) {
            return true;
        }

        self.running = None;
        if running.phase == Phase::Press && self.release_queued {
            self.start_release(now);
        }
        self.running.is_some()
    }

    fn start_release(&mut self, now: Instant) {
        let from = self.highlight(now);
        self.state = KeyState::Idle;
        self.release_queued = false;
        self.running = Some(Running {
            phase: Phase::Release,
            tween: Tween::new(from, 0.0, now, PRESS_DURATION),
        });
    }
}
