//! Platform-agnostic biometric unlock.
//!
//! A [`BiometricService`] hands out short-lived [`AuthSession`]s. The
//! [`BiometricGate`] keeps one session at a time and replaces it after every
//! attempt so no authentication state outlives the attempt that produced it.

use crate::listener::PanelEvent;
use futures_util::future::BoxFuture;
use log::{debug, info, warn};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BiometricError {
    #[error("Biometric authentication not available on this device")]
    NotAvailable,

    #[error("No biometric credentials enrolled")]
    NotEnrolled,

    #[error("Biometric credentials did not match")]
    NoMatch,

    #[error("Biometric authentication was cancelled")]
    Cancelled,

    #[error("Biometric authentication timed out")]
    Timeout,

    #[error("Biometric device disconnected")]
    Disconnected,

    #[error("Platform error: {0}")]
    Platform(String),
}

/// One authentication context. Dropped after each attempt.
pub trait AuthSession: Send + Sync {
    /// Whether the device supports biometrics and has credentials enrolled.
    fn can_authenticate(&self) -> BoxFuture<'static, bool>;

    /// Run one authentication, showing `reason` where the platform allows it.
    fn authenticate(&self, reason: &str) -> BoxFuture<'static, Result<(), BiometricError>>;
}

/// Factory for authentication sessions.
pub trait BiometricService: Send + Sync {
    fn open_session(&self) -> Arc<dyn AuthSession>;
}

/// Result of one attempt, produced off the UI thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BiometricAttempt {
    /// Biometrics turned out to be unavailable; nothing was attempted.
    Unavailable,
    Succeeded,
    Failed(BiometricError),
}

/// What is known about biometric support on this device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// No probe or attempt has reported yet.
    Unknown,
    Available,
    Unavailable,
}

/// Availability, feature flag and in-flight tracking for the biometric control.
pub struct BiometricGate {
    service: Arc<dyn BiometricService>,
    session: Arc<dyn AuthSession>,
    enabled: bool,
    availability: Availability,
    in_flight: bool,
}

impl BiometricGate {
    /// Starts enabled with availability unknown.
    pub fn new(service: Arc<dyn BiometricService>) -> Self {
        let session = service.open_session();
        Self {
            service,
            session,
            enabled: true,
            availability: Availability::Unknown,
            in_flight: false,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Record a probe result.
    pub fn set_available(&mut self, available: bool) {
        self.availability = if available {
            Availability::Available
        } else {
            Availability::Unavailable
        };
    }

    pub fn availability(&self) -> Availability {
        self.availability
    }

    /// `true` only once a probe or attempt has confirmed support.
    pub fn is_available(&self) -> bool {
        self.availability == Availability::Available
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// The biometric control is shown and interactive only in this case.
    pub fn control_visible(&self) -> bool {
        self.enabled && self.is_available()
    }

    /// Requests are accepted until biometrics are known to be unavailable.
    /// The attempt itself re-checks support before authenticating.
    pub fn accepts_requests(&self) -> bool {
        self.enabled && self.availability != Availability::Unavailable
    }

    /// Availability query against the current session.
    pub fn probe(&self) -> BoxFuture<'static, bool> {
        self.session.can_authenticate()
    }

    /// Start an attempt. `None` when biometrics are disabled or known to be
    /// unavailable, or an attempt is already running.
    pub fn begin(&mut self, reason: &str) -> Option<BoxFuture<'static, BiometricAttempt>> {
        if !self.accepts_requests() {
            debug!(
                "Biometric request ignored (enabled={}, availability={:?})",
                self.enabled, self.availability
            );
            return None;
        }
        if self.in_flight {
            debug!("Biometric request ignored: attempt already in flight");
            return None;
        }

        info!("Starting biometric authentication attempt");
        self.in_flight = true;
        let session = Arc::clone(&self.session);
        let reason = reason.to_string();

        let attempt: BoxFuture<'static, BiometricAttempt> = Box::pin(async move {
            if !session.can_authenticate().await {
                return BiometricAttempt::Unavailable;
            }
            match session.authenticate(&reason).await {
                Ok(()) => BiometricAttempt::Succeeded,
                Err(e) => BiometricAttempt::Failed(e),
            }
        });
        Some(attempt)
    }

    /// Record the outcome, discard the used session and return the event for
    /// the listener, if any.
    pub fn finish(&mut self, attempt: BiometricAttempt) -> Option<PanelEvent> {
        self.in_flight = false;
        self.session = self.service.open_session();

        match attempt {
            BiometricAttempt::Unavailable => {
                warn!("Biometric authentication is unavailable");
                self.availability = Availability::Unavailable;
                None
            }
            BiometricAttempt::Succeeded => {
                info!("Biometric authentication succeeded");
                self.availability = Availability::Available;
                Some(PanelEvent::BiometricComplete {
                    success: true,
                    error: None,
                })
            }
            BiometricAttempt::Failed(e) => {
                warn!("Biometric authentication failed: {}", e);
                self.availability = Availability::Available;
                Some(PanelEvent::BiometricComplete {
                    success: false,
                    error: Some(e),
                })
            }
        }
    }
}
