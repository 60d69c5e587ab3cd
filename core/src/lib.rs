//! UI-agnostic core of the pinpad passcode panel.
//!
//! Nothing here touches a display server, so every rule of the panel can be
//! unit tested on its own:
//!
//! - [`entry`]: accumulated input, indicator count and rejection
//! - [`keypad`]: digit keys and their press/release sequencing
//! - [`animation`]: tweens and the wrong-passcode shake
//! - [`geometry`]: key circle and indicator dot sizing
//! - [`style`]: colors, palettes and the standard/vibrant presets
//! - [`biometric`]: service and session traits, the biometric gate
//! - [`listener`]: weakly held listener and the events it receives
//! - [`panel`]: the panel's behaviour behind a small view trait

pub mod animation;
pub mod biometric;
pub mod entry;
pub mod geometry;
pub mod keypad;
pub mod listener;
pub mod panel;
pub mod style;

pub use biometric::{
    AuthSession, Availability, BiometricAttempt, BiometricError, BiometricGate, BiometricService,
};
pub use entry::{EntryError, EntryState, PasscodeEntry};
pub use keypad::{DigitKey, KeyState, KEYPAD};
pub use listener::{ListenerSlot, PanelEvent, PasscodeListener};
pub use panel::{PanelModel, PanelView};
pub use style::{Color, Palette, Style, StyleError, StyleOverrides};
