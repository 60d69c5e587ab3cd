//! Time-based interpolation for key feedback and the rejection shake.
//!
//! Animations are driven by the caller passing the current `Instant`, so the
//! same code runs under a GTK frame clock and in tests.

use std::f64::consts::TAU;
use std::time::{Duration, Instant};

/// Duration of a key press or release transition.
pub const PRESS_DURATION: Duration = Duration::from_millis(250);

/// Duration of the wrong-passcode shake.
pub const SHAKE_DURATION: Duration = Duration::from_millis(500);

/// Number of full left-right swings in one shake.
const SHAKE_SWINGS: f64 = 4.0;

fn progress(started: Instant, duration: Duration, now: Instant) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    let elapsed = now.saturating_duration_since(started);
    (elapsed.as_secs_f64() / duration.as_secs_f64()).min(1.0)
}

/// Linear transition of a scalar between two values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    from: f64,
    to: f64,
    started: Instant,
    duration: Duration,
}

impl Tween {
    pub fn new(from: f64, to: f64, started: Instant, duration: Duration) -> Self {
        Self {
            from,
            to,
            started,
            duration,
        }
    }

    pub fn value_at(&self, now: Instant) -> f64 {
        let t = progress(self.started, self.duration, now);
        self.from + (self.to - self.from) * t
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        progress(self.started, self.duration, now) >= 1.0
    }
}

/// Decaying horizontal oscillation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shake {
    started: Instant,
    duration: Duration,
    amplitude: f64,
}

impl Shake {
    pub fn new(started: Instant, amplitude: f64) -> Self {
        Self {
            started,
            duration: SHAKE_DURATION,
            amplitude,
        }
    }

    /// Horizontal offset in pixels; exactly zero once finished.
    pub fn offset_at(&self, now: Instant) -> f64 {
        let t = progress(self.started, self.duration, now);
        if t >= 1.0 {
            return 0.0;
        }
        self.amplitude * (1.0 - t) * (t * SHAKE_SWINGS * TAU).sin()
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        progress(self.started, self.duration, now) >= 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tween_interpolates() {
        let start = Instant::now();
        let tween = Tween::new(0.0, 1.0, start, Duration::from_millis(100));

        assert_eq!(tween.value_at(start), 0.0);
        assert!((tween.value_at(start + Duration::from_millis(50)) - 0.5).abs() < 1e-9);
        assert_eq!(tween.value_at(start + Duration::from_millis(400)), 1.0);
        assert!(!tween.is_finished(start + Duration::from_millis(99)));
        assert!(tween.is_finished(start + Duration::from_millis(100)));
    }

    #[test]
    fn test_tween_before_start_clamps() {
        let start = Instant::now() + Duration::from_secs(1);
        let tween = Tween::new(0.3, 1.0, start, PRESS_DURATION);
        assert_eq!(tween.value_at(Instant::now()), 0.3);
    }

    #[test]
    fn test_zero_duration_finishes_immediately() {
        let start = Instant::now();
        let tween = Tween::new(1.0, 0.0, start, Duration::ZERO);
        assert!(tween.is_finished(start));
        assert_eq!(tween.value_at(start), 0.0);
    }

    #[test]
    fn test_shake_settles() {
        let start = Instant::now();
        let shake = Shake::new(start, 12.0);

        assert_eq!(shake.offset_at(start), 0.0);
        let mid = shake.offset_at(start + Duration::from_millis(30));
        assert!(mid.abs() > 0.0 && mid.abs() <= 12.0);
        assert_eq!(shake.offset_at(start + SHAKE_DURATION), 0.0);
        assert!(shake.is_finished(start + SHAKE_DURATION));
    }
}
