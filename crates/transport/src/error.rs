use std::fmt::{self, Display};

/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The backend could not be reached.
    Unavailable,
    /// The backend answered with a non-success status.
    Rejected,
    /// The connection dropped while the reply was streaming.
    Interrupted,
    /// The reply body could not be decoded.
    InvalidPayload,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Unavailable => write!(f, "Backend unavailable"),
            ErrorKind::Rejected => write!(f, "Request rejected"),
            ErrorKind::Interrupted => write!(f, "Stream interrupted"),
            ErrorKind::InvalidPayload => write!(f, "Invalid payload"),
        }
    }
}
