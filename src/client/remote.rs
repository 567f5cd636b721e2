use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

/// Field every reply carries; anything but `STATUS_OK` is a rejection
pub const STATUS_FIELD: &str = "error";
pub const STATUS_OK: &str = "ok";

#[derive(Debug, Clone, PartialEq)]
pub enum RemoteError {
    /// The server answered and refused the action (insufficient funds,
    /// unknown player, ship not docked...). `code` is the server's status text.
    Rejected { code: String },
    /// No usable answer: timeout, refused connection, or an undecodable reply.
    Unreachable { reason: String },
}

impl RemoteError {
    pub fn rejected(code: impl Into<String>) -> Self {
        RemoteError::Rejected { code: code.into() }
    }

    pub fn unreachable(reason: impl Into<String>) -> Self {
        RemoteError::Unreachable { reason: reason.into() }
    }

    pub fn is_rejection(&self) -> bool {
        matches!(self, RemoteError::Rejected { .. })
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteError::Rejected { code } => write!(f, "server rejected request: {}", code),
            RemoteError::Unreachable { reason } => write!(f, "server unreachable: {}", reason),
        }
    }
}

impl std::error::Error for RemoteError {}

/// The single seam between the agent and the game server
#[async_trait]
pub trait GameRemote: Send + Sync {
    /// Query `endpoint` with ordered query parameters and return the reply
    /// body with its status field removed.
    async fn call(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Value, RemoteError>;

    /// Install the player key appended to every later request
    fn authenticate(&self, _key: &str) {}
}

/// Strip the status field from a raw reply, turning a non-ok status into a rejection
pub fn unwrap_status(reply: Value) -> Result<Value, RemoteError> {
    let Value::Object(mut body) = reply else {
        return Err(RemoteError::unreachable("reply is not a JSON object"));
    };

    // Keyed catalogs are ordered; the status must not disturb the other keys
    match body.shift_remove(STATUS_FIELD) {
        Some(Value::String(status)) if status == STATUS_OK => Ok(Value::Object(body)),
        Some(Value::String(status)) => Err(RemoteError::rejected(status)),
        Some(other) => Err(RemoteError::rejected(other.to_string())),
        None => Err(RemoteError::unreachable("reply has no status field")),
    }
}
