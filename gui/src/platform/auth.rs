//! fprintd-backed biometric service.

use crate::config::biometric::{ANY_FINGER, VERIFY_TIMEOUT};
use crate::platform::fprintd::{Fprintd, VerifyResult};
use crate::platform::reader::{self, ClaimedReader, ReaderError};
use futures_util::future::BoxFuture;
use log::{error, info, warn};
use pinpad_core::{AuthSession, BiometricError, BiometricService};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

/// Opens one [`FprintdSession`] per authentication attempt.
#[derive(Debug, Clone)]
pub struct FprintdService {
    timeout: Duration,
}

impl FprintdService {
    pub fn new() -> Self {
        Self {
            timeout: VERIFY_TIMEOUT,
        }
    }
}

impl Default for FprintdService {
    fn default() -> Self {
        Self::new()
    }
}

impl BiometricService for FprintdService {
    fn open_session(&self) -> Arc<dyn AuthSession> {
        Arc::new(FprintdSession {
            client: Arc::new(OnceCell::new()),
            timeout: self.timeout,
        })
    }
}

/// Authentication context owning a lazily opened system bus connection.
///
/// The connection closes when the last clone of the session's futures and the
/// session itself are dropped.
pub struct FprintdSession {
    client: Arc<OnceCell<Fprintd>>,
    timeout: Duration,
}

impl AuthSession for FprintdSession {
    fn can_authenticate(&self) -> BoxFuture<'static, bool> {
        let client = Arc::clone(&self.client);
        Box::pin(async move {
            match enrolled_fingers(client).await {
                Ok(fingers) if fingers.is_empty() => {
                    info!("Fingerprint reader present but no fingers enrolled");
                    false
                }
                Ok(fingers) => {
                    info!("{} enrolled finger(s) available for unlock", fingers.len());
                    true
                }
                Err(e) => {
                    warn!("Fingerprint unlock unavailable: {}", e);
                    false
                }
            }
        })
    }

    fn authenticate(&self, reason: &str) -> BoxFuture<'static, Result<(), BiometricError>> {
        info!("Fingerprint requested: {}", reason);
        Box::pin(verify_any_finger(Arc::clone(&self.client), self.timeout))
    }
}

async fn enrolled_fingers(client: Arc<OnceCell<Fprintd>>) -> Result<Vec<String>, ReaderError> {
    let fprintd = client.get_or_try_init(reader::connect).await?;
    let reader = reader::find_reader(fprintd).await?;
    match reader.enrolled_fingers().await {
        Ok(fingers) => Ok(fingers),
        // fprintd reports "no prints" as an error rather than an empty list
        Err(e) if is_no_enrolled_prints(&e) => Ok(Vec::new()),
        Err(e) => Err(ReaderError::Request(e)),
    }
}

async fn verify_any_finger(
    client: Arc<OnceCell<Fprintd>>,
    timeout: Duration,
) -> Result<(), BiometricError> {
    let fprintd = client.get_or_try_init(reader::connect).await?;
    let claimed = ClaimedReader::claim(reader::find_reader(fprintd).await?).await?;

    let status = match tokio::time::timeout(timeout, claimed.reader().verify(ANY_FINGER)).await {
        Ok(Ok(status)) => status,
        Ok(Err(e)) if is_no_enrolled_prints(&e) => return Err(BiometricError::NotEnrolled),
        Ok(Err(e)) => {
            error!("Fingerprint verification failed: {}", e);
            return Err(BiometricError::Platform(e.to_string()));
        }
        Err(_) => {
            warn!(
                "Fingerprint verification timed out after {}s",
                timeout.as_secs()
            );
            return Err(BiometricError::Timeout);
        }
    };

    info!("Fingerprint verification finished: '{}'", status.result);
    match status.verify_result() {
        VerifyResult::Match => Ok(()),
        VerifyResult::NoMatch => Err(BiometricError::NoMatch),
        VerifyResult::Disconnected => Err(BiometricError::Disconnected),
        VerifyResult::Retry | VerifyResult::Unknown => Err(BiometricError::Platform(status.result)),
    }
}

fn is_no_enrolled_prints(e: &zbus::Error) -> bool {
    e.to_string().contains("NoEnrolledPrints")
}
