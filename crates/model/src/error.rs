use std::fmt::{self, Display};

/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The backend could not be reached at all (e.g. connection refused).
    Unreachable,
    /// The backend did not answer in time.
    Timeout,
    /// The backend answered with a non-success status.
    BadStatus,
    /// The backend answered, but the payload could not be understood.
    InvalidResponse,
    /// Any other errors.
    Other,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Unreachable => write!(f, "Backend unreachable"),
            ErrorKind::Timeout => write!(f, "Request timed out"),
            ErrorKind::BadStatus => write!(f, "Unexpected status"),
            ErrorKind::InvalidResponse => write!(f, "Invalid response"),
            ErrorKind::Other => write!(f, "Other error"),
        }
    }
}
