//! Reader lookup and the exclusive claim held during verification.

use crate::platform::fprintd::{Fprintd, Reader};
use log::{error, info, warn};
use pinpad_core::BiometricError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReaderError {
    #[error("Cannot reach fprintd: {0}")]
    Connection(#[source] zbus::Error),

    #[error("No fingerprint reader attached")]
    NoReader,

    #[error("Failed to claim fingerprint reader: {0}")]
    Claim(#[source] zbus::Error),

    #[error("fprintd request failed: {0}")]
    Request(#[from] zbus::Error),
}

impl From<ReaderError> for BiometricError {
    fn from(e: ReaderError) -> Self {
        match e {
            ReaderError::NoReader => BiometricError::NotAvailable,
            other => BiometricError::Platform(other.to_string()),
        }
    }
}

pub async fn connect() -> Result<Fprintd, ReaderError> {
    Fprintd::connect().await.map_err(|e| {
        error!("Failed to connect to fprintd on the system bus: {}", e);
        ReaderError::Connection(e)
    })
}

pub async fn find_reader(fprintd: &Fprintd) -> Result<Reader, ReaderError> {
    match fprintd.reader().await? {
        Some(reader) => {
            info!("Using fingerprint reader {}", reader.path());
            Ok(reader)
        }
        None => {
            warn!("No fingerprint reader attached");
            Err(ReaderError::NoReader)
        }
    }
}

/// A reader claimed for the current user.
///
/// Dropping the guard stops any running verification and releases the claim
/// on the tokio runtime, so a timed-out or abandoned attempt never leaves the
/// reader locked.
pub struct ClaimedReader {
    reader: Reader,
}

impl ClaimedReader {
    pub async fn claim(reader: Reader) -> Result<Self, ReaderError> {
        reader.claim().await.map_err(|e| {
            error!("Failed to claim {}: {}", reader.path(), e);
            ReaderError::Claim(e)
        })?;
        info!("Claimed fingerprint reader");
        Ok(Self { reader })
    }

    pub fn reader(&self) -> &Reader {
        &self.reader
    }
}

impl Drop for ClaimedReader {
    fn drop(&mut self) {
        let reader = self.reader.clone();
        tokio::spawn(async move {
            // Fails harmlessly when no verification is running.
            let _ = reader.verify_stop().await;
            match reader.release().await {
                Ok(()) => info!("Released fingerprint reader"),
                Err(e) => warn!("Failed to release fingerprint reader: {}", e),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        assert_eq!(
            BiometricError::from(ReaderError::NoReader),
            BiometricError::NotAvailable
        );

        let busy = zbus::Error::Failure("busy".to_string());
        assert!(matches!(
            BiometricError::from(ReaderError::Claim(busy)),
            BiometricError::Platform(message) if message.starts_with("Failed to claim")
        ));
    }
}
