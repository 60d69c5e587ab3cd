//! Minimal fprintd D-Bus client: reader lookup, enrolled fingers, verification.

use futures_util::StreamExt;
use log::debug;
use zbus::zvariant::OwnedObjectPath;
use zbus::{Connection, Proxy};

pub const SERVICE: &str = "net.reactivated.Fprint";
pub const MANAGER_PATH: &str = "/net/reactivated/Fprint/Manager";
pub const MANAGER_IFACE: &str = "net.reactivated.Fprint.Manager";
pub const DEVICE_IFACE: &str = "net.reactivated.Fprint.Device";

/// Meaning of a `VerifyStatus` result string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyResult {
    Match,
    NoMatch,
    Disconnected,
    /// Scan problem the user can correct by trying again.
    Retry,
    Unknown,
}

impl VerifyResult {
    pub fn from_status(status: &str) -> Self {
        match status {
            "verify-match" => VerifyResult::Match,
            "verify-no-match" => VerifyResult::NoMatch,
            "verify-disconnected" => VerifyResult::Disconnected,
            "verify-retry-scan"
            | "verify-too-fast"
            | "verify-swipe-too-short"
            | "verify-finger-not-centered"
            | "verify-remove-and-retry" => VerifyResult::Retry,
            _ => VerifyResult::Unknown,
        }
    }
}

/// One `VerifyStatus` signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyStatus {
    pub result: String,
    pub done: bool,
}

impl VerifyStatus {
    pub fn verify_result(&self) -> VerifyResult {
        VerifyResult::from_status(&self.result)
    }
}

/// System bus connection to fprintd.
#[derive(Debug, Clone)]
pub struct Fprintd {
    conn: Connection,
}

impl Fprintd {
    pub async fn connect() -> zbus::Result<Self> {
        Ok(Self {
            conn: Connection::system().await?,
        })
    }

    /// The default reader, or the first enumerated one when fprintd has no
    /// default. `None` when no reader is attached.
    pub async fn reader(&self) -> zbus::Result<Option<Reader>> {
        let manager = Proxy::new(&self.conn, SERVICE, MANAGER_PATH, MANAGER_IFACE).await?;

        let default: zbus::Result<(OwnedObjectPath,)> =
            manager.call("GetDefaultDevice", &()).await;
        let path = match default {
            Ok((path,)) => path,
            Err(e) => {
                debug!("No default reader ({}), enumerating", e);
                let (paths,): (Vec<OwnedObjectPath>,) = manager.call("GetDevices", &()).await?;
                match paths.into_iter().next() {
                    Some(path) => path,
                    None => return Ok(None),
                }
            }
        };

        let proxy = Proxy::new(&self.conn, SERVICE, path.as_str().to_owned(), DEVICE_IFACE).await?;
        Ok(Some(Reader { proxy }))
    }
}

/// A fingerprint reader. Verification calls require a claim.
#[derive(Debug, Clone)]
pub struct Reader {
    proxy: Proxy<'static>,
}

impl Reader {
    pub fn path(&self) -> &str {
        self.proxy.path().as_str()
    }

    /// Fingers enrolled by the calling user.
    pub async fn enrolled_fingers(&self) -> zbus::Result<Vec<String>> {
        let (fingers,): (Vec<String>,) = self.proxy.call("ListEnrolledFingers", &("",)).await?;
        Ok(fingers)
    }

    pub async fn claim(&self) -> zbus::Result<()> {
        self.proxy.call("Claim", &("",)).await
    }

    pub async fn release(&self) -> zbus::Result<()> {
        self.proxy.call("Release", &()).await
    }

    pub async fn verify_stop(&self) -> zbus::Result<()> {
        self.proxy.call("VerifyStop", &()).await
    }

    /// Start verifying `finger` and wait for the terminal status.
    ///
    /// Subscribes before `VerifyStart` so a fast match is never missed.
    pub async fn verify(&self, finger: &str) -> zbus::Result<VerifyStatus> {
        let mut statuses = self.proxy.receive_signal("VerifyStatus").await?;
        let _: () = self.proxy.call("VerifyStart", &(finger,)).await?;

        while let Some(msg) = statuses.next().await {
            let (result, done): (String, bool) = msg.body().deserialize()?;
            if done {
                return Ok(VerifyStatus { result, done });
            }
            debug!("Verification in progress: '{}'", result);
        }

        Err(zbus::Error::Failure(
            "VerifyStatus signal stream closed".to_string(),
        ))
    }
}
