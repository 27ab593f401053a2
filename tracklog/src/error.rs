use std::{fmt, io};

/// Reasons a framed sentence is not turned into a [`DecodedFix`](crate::DecodedFix).
///
/// None of these are fatal: the fix wait loop skips the sentence and keeps listening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// First field is not `$GNRMC`
    WrongTalker,
    /// Status field is `V`, the receiver has no usable position yet
    FixNotAcquired { utc_time: String },
    /// Fewer fields than a position sentence needs, or an unknown status letter
    Malformed { fields: usize },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::WrongTalker => f.write_str("not a $GNRMC sentence"),
            DecodeError::FixNotAcquired { utc_time } => {
                write!(f, "positioning not obtained yet ({})", utc_time)
            },
            DecodeError::Malformed { fields } => {
                write!(f, "malformed $GNRMC sentence with {} fields", fields)
            },
        }
    }
}

impl std::error::Error for DecodeError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinateError {
    InvalidFormat { raw: String, reason: &'static str },
}

impl fmt::Display for CoordinateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordinateError::InvalidFormat { raw, reason } => {
                write!(f, "invalid coordinate {:?}: {}", raw, reason)
            },
        }
    }
}

impl std::error::Error for CoordinateError {}

#[derive(Debug)]
pub enum StoreError {
    Io(io::Error),
    /// Row file content does not match the `name,lat,lon` layout
    Format(String),
    IndexOutOfRange {
        index: usize,
        len: usize,
    },
}

impl StoreError {
    /// True when the row file simply does not exist yet.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::Io(e) if e.kind() == io::ErrorKind::NotFound)
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(err) => write!(f, "row file I/O error: {}", err),
            StoreError::Format(msg) => write!(f, "row file format error: {}", msg),
            StoreError::IndexOutOfRange { index, len } => write!(
                f,
                "point number {} is out of range, expect 1..={}",
                index, len
            ),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for StoreError {
    fn from(err: io::Error) -> Self {
        StoreError::Io(err)
    }
}

impl From<csv::Error> for StoreError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            match err.into_kind() {
                csv::ErrorKind::Io(io_err) => StoreError::Io(io_err),
                other => StoreError::Format(format!("{:?}", other)),
            }
        } else {
            StoreError::Format(err.to_string())
        }
    }
}

/// Failures that end a capture session.
#[derive(Debug)]
pub enum SessionError {
    Store(StoreError),
    /// The operator terminal could not be read or drawn
    Operator(io::Error),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Store(err) => write!(f, "{}", err),
            SessionError::Operator(err) => write!(f, "terminal error: {}", err),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Store(err) => Some(err),
            SessionError::Operator(err) => Some(err),
        }
    }
}

impl From<StoreError> for SessionError {
    fn from(err: StoreError) -> Self {
        SessionError::Store(err)
    }
}

impl From<io::Error> for SessionError {
    fn from(err: io::Error) -> Self {
        SessionError::Operator(err)
    }
}
