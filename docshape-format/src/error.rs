use core::fmt;
use std::io;

/// Error raised by a [`DocumentWriter`](crate::DocumentWriter).
#[derive(Debug)]
pub enum WriteError {
    /// The sink the writer feeds failed.
    Io(io::Error),

    /// The call is not valid at the writer's current position, e.g. a value
    /// without a name inside a document, or a name inside an array.
    InvalidState {
        /// the rejected operation
        operation: &'static str,
        /// why it was rejected
        reason: &'static str,
    },

    /// Any other failure reported by a writer implementation.
    Custom(String),
}

impl WriteError {
    /// A writer-specific failure.
    pub fn custom(message: impl fmt::Display) -> Self {
        WriteError::Custom(message.to_string())
    }

    pub(crate) const fn invalid_state(operation: &'static str, reason: &'static str) -> Self {
        WriteError::InvalidState { operation, reason }
    }
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteError::Io(err) => write!(f, "I/O error: {err}"),
            WriteError::InvalidState { operation, reason } => {
                write!(f, "cannot {operation}: {reason}")
            }
            WriteError::Custom(message) => f.write_str(message),
        }
    }
}

impl core::error::Error for WriteError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            WriteError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for WriteError {
    fn from(err: io::Error) -> Self {
        WriteError::Io(err)
    }
}
