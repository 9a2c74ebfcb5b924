use core::fmt::{Debug, Display, Formatter};

/// Failure reported by a motor link
#[derive(Clone, Debug, PartialEq)]
pub enum LinkError {
    /// A reply came back empty or garbled
    Malformed(String),
    /// The controller refused the command
    Rejected(String),
    Disconnected,
}

pub type LinkResult<T> = Result<T, LinkError>;

impl From<String> for LinkError {
    fn from(s: String) -> Self {
        Self::Malformed(s)
    }
}

impl From<&str> for LinkError {
    fn from(s: &str) -> Self {
        Self::Malformed(s.to_string())
    }
}

impl Display for LinkError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Malformed(s) => write!(f, "Malformed reply: {}", s),
            Self::Rejected(s) => write!(f, "Command rejected: {}", s),
            Self::Disconnected => Display::fmt("Disconnected", f),
        }
    }
}
