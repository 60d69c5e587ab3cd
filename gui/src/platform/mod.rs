//! Platform services: fprintd over D-Bus.

pub mod auth;
pub mod fprintd;
pub mod reader;

pub use auth::FprintdService;
