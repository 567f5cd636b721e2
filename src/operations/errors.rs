// Error types shared by the ship cycles and session setup
use std::fmt;

use crate::client::RemoteError;
use crate::operations::provisioning::ProvisionError;
use crate::operations::targeting::TargetError;

/// Why a mining or maintenance cycle stopped before finishing
#[derive(Debug, Clone, PartialEq)]
pub enum CycleError {
    Remote(RemoteError),
    NoTarget(TargetError),
    Provision(ProvisionError),
    /// Ship still busy after the configured wait budget
    WaitExpired { ship_id: u64, waited_seconds: f64 },
    Stopped,
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleError::Remote(e) => write!(f, "{}", e),
            CycleError::NoTarget(e) => write!(f, "{}", e),
            CycleError::Provision(e) => write!(f, "provisioning failed: {}", e),
            CycleError::WaitExpired { ship_id, waited_seconds } => {
                write!(f, "ship {} still busy after {:.0}s", ship_id, waited_seconds)
            }
            CycleError::Stopped => write!(f, "stop requested"),
        }
    }
}

impl std::error::Error for CycleError {}

impl From<RemoteError> for CycleError {
    fn from(err: RemoteError) -> Self {
        CycleError::Remote(err)
    }
}

impl From<TargetError> for CycleError {
    fn from(err: TargetError) -> Self {
        CycleError::NoTarget(err)
    }
}

impl From<ProvisionError> for CycleError {
    fn from(err: ProvisionError) -> Self {
        match err {
            ProvisionError::Remote(remote) => CycleError::Remote(remote),
            other => CycleError::Provision(other),
        }
    }
}

/// Fatal problems while establishing the player session
#[derive(Debug)]
pub enum SetupError {
    /// `/ping` did not answer `pong`
    ServerDown(String),
    InvalidUsername(String),
    Storage(String),
    Remote(RemoteError),
    PlayerLost { money: f64 },
    NoStation,
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupError::ServerDown(reason) => write!(f, "server is not answering: {}", reason),
            SetupError::InvalidUsername(raw) => {
                write!(f, "username {:?} has no letters or digits", raw)
            }
            SetupError::Storage(reason) => write!(f, "session storage failed: {}", reason),
            SetupError::Remote(e) => write!(f, "{}", e),
            SetupError::PlayerLost { money } => {
                write!(f, "player already lost ({:.2} credits), restart the server or pick another name", money)
            }
            SetupError::NoStation => write!(f, "player owns no station"),
        }
    }
}

impl std::error::Error for SetupError {}

impl From<RemoteError> for SetupError {
    fn from(err: RemoteError) -> Self {
        SetupError::Remote(err)
    }
}
