//! GTK4 passcode entry panel with fprintd fingerprint unlock.
//!
//! [`PasscodePanel`] is the embeddable widget; [`FprintdService`] backs its
//! biometric control with the fprintd D-Bus service.

pub mod config;
pub mod platform;
pub mod ui;

pub use platform::FprintdService;
pub use ui::panel::{PanelError, PasscodePanel};
