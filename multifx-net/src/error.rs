use std::fmt;
use std::io;

/// Failure modes of the protocol client.
///
/// `Timeout` and `Protocol` are command-level: the caller decides whether
/// to retry or move on. `Transport` and `ConnectionFailed` are
/// session-level and require a reconnect.
#[derive(Debug)]
pub enum NetError {
    /// All connection attempts were exhausted.
    ConnectionFailed { attempts: u32, last: io::Error },
    /// No response within the per-call deadline.
    Timeout,
    /// Socket-level I/O fault.
    Transport(io::Error),
    /// Response arrived but could not be parsed.
    Protocol(String),
}

impl fmt::Display for NetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetError::ConnectionFailed { attempts, last } => {
                write!(f, "connection failed after {} attempts: {}", attempts, last)
            }
            NetError::Timeout => write!(f, "no response from host within deadline"),
            NetError::Transport(e) => write!(f, "transport error: {}", e),
            NetError::Protocol(msg) => write!(f, "malformed host response: {}", msg),
        }
    }
}

impl std::error::Error for NetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NetError::Transport(e) | NetError::ConnectionFailed { last: e, .. } => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for NetError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => NetError::Timeout,
            _ => NetError::Transport(e),
        }
    }
}

impl NetError {
    /// Whether the session should reconnect rather than continue issuing
    /// commands on this connection.
    pub fn is_fatal(&self) -> bool {
        matches!(self, NetError::Transport(_) | NetError::ConnectionFailed { .. })
    }
}
