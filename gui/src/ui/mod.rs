//! User Interface handling functionality.
//!
//! - `panel`: the passcode entry panel
//! - `digit_button`, `dot_row`: its keypad keys and indicator
//! - `paint`: style to cairo/pango/CSS conversions
//! - `app`: demo application window

pub mod app;
pub mod digit_button;
pub mod dot_row;
pub mod paint;
pub mod panel;

pub use app::setup_application_ui;
