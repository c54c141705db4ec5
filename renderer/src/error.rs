use std::fmt;

/// Failures of the collaborators around the engine: document stores and
/// snapshot services. The engine itself has no failure modes.
#[derive(Debug)]
pub enum HostError {
    Io(String),
    NotFound(String),
    Decode(String),
    Snapshot(String),
    Custom(String),
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostError::Io(msg) => write!(f, "I/O error: {}", msg),
            HostError::NotFound(id) => write!(f, "no document with id '{}'", id),
            HostError::Decode(msg) => write!(f, "malformed document record: {}", msg),
            HostError::Snapshot(msg) => write!(f, "snapshot failed: {}", msg),
            HostError::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for HostError {}

impl From<std::io::Error> for HostError {
    fn from(error: std::io::Error) -> Self {
        HostError::Io(error.to_string())
    }
}
