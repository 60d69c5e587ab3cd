//! Accumulated passcode input and the indicator it drives.

use crate::listener::PanelEvent;
use log::debug;
use std::fmt;
use thiserror::Error;
use zeroize::{Zeroize, Zeroizing};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryError {
    #[error("passcode length must be at least 1")]
    ZeroLength,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Empty,
    PartiallyFilled,
    Full,
}

/// Input collected by a passcode panel.
///
/// `filled_count()` tracks `len()` except after [`fill_indicator`], which
/// shows every dot filled as confirmation of a biometric unlock. Once the
/// indicator is full the input is frozen until [`clear_input`].
///
/// [`fill_indicator`]: PasscodeEntry::fill_indicator
/// [`clear_input`]: PasscodeEntry::clear_input
pub struct PasscodeEntry {
    expected_len: usize,
    input: Zeroizing<String>,
    len: usize,
    filled: usize,
    rejecting: bool,
}

impl PasscodeEntry {
    pub fn new(expected_len: usize) -> Result<Self, EntryError> {
        if expected_len == 0 {
            return Err(EntryError::ZeroLength);
        }
        Ok(Self {
            expected_len,
            input: Zeroizing::new(String::with_capacity(expected_len)),
            len: 0,
            filled: 0,
            rejecting: false,
        })
    }

    pub fn expected_len(&self) -> usize {
        self.expected_len
    }

    /// Number of digits entered.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Number of indicator dots drawn filled.
    pub fn filled_count(&self) -> usize {
        self.filled
    }

    pub fn is_full(&self) -> bool {
        self.filled == self.expected_len
    }

    pub fn is_rejecting(&self) -> bool {
        self.rejecting
    }

    pub fn state(&self) -> EntryState {
        match self.filled {
            0 => EntryState::Empty,
            n if n < self.expected_len => EntryState::PartiallyFilled,
            _ => EntryState::Full,
        }
    }

    /// Append a digit. Returns the completion event when this digit fills the
    /// input; taps on a full or rejected input are ignored.
    pub fn digit_tapped(&mut self, digit: char) -> Option<PanelEvent> {
        if self.is_full() {
            debug!("Ignoring digit: input already full");
            return None;
        }
        if self.rejecting {
            debug!("Ignoring digit: input is being rejected");
            return None;
        }

        self.input.push(digit);
        self.len += 1;
        self.filled = self.len;
        debug!("Digit entered ({}/{})", self.len, self.expected_len);

        if self.len == self.expected_len {
            Some(PanelEvent::InputComplete(self.input.clone()))
        } else {
            None
        }
    }

    /// Remove the last digit. Returns whether anything changed.
    pub fn delete_pressed(&mut self) -> bool {
        if self.len == 0 || self.is_full() || self.rejecting {
            return false;
        }
        self.input.pop();
        self.len -= 1;
        self.filled = self.len;
        debug!("Digit deleted ({}/{})", self.len, self.expected_len);
        true
    }

    /// Drop all input regardless of state.
    pub fn clear_input(&mut self) {
        self.input.zeroize();
        self.len = 0;
        self.filled = 0;
        debug!("Input cleared");
    }

    /// Mark the start of the wrong-passcode animation. Input is frozen until
    /// [`finish_rejection`](Self::finish_rejection).
    pub fn begin_rejection(&mut self) {
        self.rejecting = true;
    }

    /// Wrong-passcode animation finished: input is cleared.
    pub fn finish_rejection(&mut self) {
        self.rejecting = false;
        self.clear_input();
    }

    /// Show every dot filled without touching the typed input.
    pub fn fill_indicator(&mut self) {
        self.filled = self.expected_len;
    }
}

impl fmt::Debug for PasscodeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasscodeEntry")
            .field("expected_len", &self.expected_len)
            .field("len", &self.len)
            .field("filled", &self.filled)
            .field("rejecting", &self.rejecting)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(n: usize) -> PasscodeEntry {
        PasscodeEntry::new(n).unwrap()
    }

    fn completed(event: Option<PanelEvent>) -> Option<String> {
        match event {
            Some(PanelEvent::InputComplete(input)) => Some(input.as_str().to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_zero_length_rejected() {
        assert_eq!(PasscodeEntry::new(0).unwrap_err(), EntryError::ZeroLength);
    }

    #[test]
    fn test_four_digit_scenario() {
        let mut e = entry(4);
        assert_eq!(e.state(), EntryState::Empty);

        for d in ['1', '2', '3'] {
            assert!(e.digit_tapped(d).is_none());
        }
        assert_eq!(e.filled_count(), 3);
        assert_eq!(e.state(), EntryState::PartiallyFilled);

        assert_eq!(completed(e.digit_tapped('4')), Some("1234".to_string()));
        assert_eq!(e.state(), EntryState::Full);

        e.clear_input();
        assert_eq!(e.filled_count(), 0);
        assert_eq!(e.input(), "");
        assert_eq!(e.state(), EntryState::Empty);
    }

    #[test]
    fn test_completion_fires_exactly_once() {
        for n in 1..=8 {
            let mut e = entry(n);
            let digits: Vec<char> = (0..n)
                .map(|i| char::from(b'0' + (i * 7 % 10) as u8))
                .collect();
            let mut events = Vec::new();
            for d in digits.iter().chain(['9', '9'].iter()) {
                if let Some(input) = completed(e.digit_tapped(*d)) {
                    events.push(input);
                }
                assert_eq!(e.filled_count(), e.len());
                assert!(e.len() <= n);
            }
            assert_eq!(events, vec![digits.iter().collect::<String>()]);
        }
    }

    #[test]
    fn test_taps_after_full_ignored_until_clear() {
        let mut e = entry(2);
        e.digit_tapped('1');
        e.digit_tapped('2');
        assert!(e.digit_tapped('3').is_none());
        assert_eq!(e.input(), "12");

        e.clear_input();
        e.digit_tapped('3');
        assert_eq!(e.input(), "3");
    }

    #[test]
    fn test_delete_rules() {
        let mut e = entry(3);
        assert!(!e.delete_pressed());
        assert_eq!(e.len(), 0);

        e.digit_tapped('1');
        e.digit_tapped('2');
        assert!(e.delete_pressed());
        assert_eq!(e.input(), "1");
        assert_eq!(e.filled_count(), 1);

        e.digit_tapped('5');
        e.digit_tapped('6');
        assert!(e.is_full());
        assert!(!e.delete_pressed());
        assert_eq!(e.input(), "156");
    }

    #[test]
    fn test_rejection_clears_from_any_state() {
        for typed in 0..=4 {
            let mut e = entry(4);
            for _ in 0..typed {
                e.digit_tapped('8');
            }
            e.begin_rejection();
            assert!(e.is_rejecting());
            e.finish_rejection();
            assert!(!e.is_rejecting());
            assert_eq!(e.len(), 0);
            assert_eq!(e.filled_count(), 0);
        }
    }

    #[test]
    fn test_input_frozen_while_rejecting() {
        let mut e = entry(4);
        e.digit_tapped('1');
        e.digit_tapped('2');
        e.begin_rejection();

        assert!(e.digit_tapped('3').is_none());
        assert!(!e.delete_pressed());
        assert_eq!(e.input(), "12");

        e.finish_rejection();
        e.digit_tapped('3');
        assert_eq!(e.input(), "3");
    }

    #[test]
    fn test_fill_indicator_freezes_input() {
        let mut e = entry(4);
        e.digit_tapped('1');
        e.fill_indicator();
        assert_eq!(e.filled_count(), 4);
        assert_eq!(e.state(), EntryState::Full);
        assert!(e.digit_tapped('2').is_none());
        assert!(!e.delete_pressed());

        e.clear_input();
        assert_eq!(e.filled_count(), 0);
    }

    #[test]
    fn test_debug_hides_input() {
        let mut e = entry(4);
        e.digit_tapped('7');
        assert!(!format!("{:?}", e).contains('7'));
    }
}
