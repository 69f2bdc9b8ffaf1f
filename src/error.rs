/// A rejected request argument.
///
/// Carries which argument was refused, the offending value and why,
/// so callers can render a precise message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvalidArgument {
    /// Name of the argument (`metric`, `window_hours`, `device_id`, ...)
    pub argument: &'static str,

    /// The value as it was supplied
    pub value: String,

    /// Why the value was refused
    pub reason: &'static str,
}

impl std::fmt::Display for InvalidArgument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={:?}: {}", self.argument, self.value, self.reason)
    }
}

/// Failure of the reading store.
#[derive(Debug)]
pub enum StorageError {
    /// An IO error.
    Io(std::io::Error),

    /// Error in storage engine.
    Engine(fjall::Error),

    /// Stored bytes could not be decoded.
    Corrupted(&'static str),

    /// Failure reported by a third-party store adapter.
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "{e}"),
            Self::Engine(e) => write!(f, "{e}"),
            Self::Corrupted(what) => write!(f, "corrupted {what}"),
            Self::Other(e) => write!(f, "{e}"),
        }
    }
}

/// Error type
#[derive(Debug)]
pub enum Error {
    /// A request argument was refused before touching the store.
    InvalidArgument(InvalidArgument),

    /// The reading store could not serve the request.
    StorageUnavailable(StorageError),
}

impl Error {
    pub(crate) fn invalid(argument: &'static str, value: impl ToString, reason: &'static str) -> Self {
        Self::InvalidArgument(InvalidArgument {
            argument,
            value: value.to_string(),
            reason,
        })
    }
}

impl From<fjall::Error> for Error {
    fn from(value: fjall::Error) -> Self {
        Self::StorageUnavailable(StorageError::Engine(value))
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::StorageUnavailable(StorageError::Io(value))
    }
}

impl From<StorageError> for Error {
    fn from(value: StorageError) -> Self {
        Self::StorageUnavailable(value)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(e) => {
                write!(f, "InvalidArgument: {e}")
            }
            Self::StorageUnavailable(e) => {
                write!(f, "StorageUnavailable: {e}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidArgument(_) | Self::StorageUnavailable(StorageError::Corrupted(_)) => None,
            Self::StorageUnavailable(StorageError::Io(e)) => Some(e),
            Self::StorageUnavailable(StorageError::Engine(e)) => Some(e),
            Self::StorageUnavailable(StorageError::Other(e)) => Some(e.as_ref()),
        }
    }
}

/// Result helper type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn display_names_argument_and_value() {
        let err = Error::invalid("window_hours", 200, "must be between 1 and 168");
        assert_eq!(
            "InvalidArgument: window_hours=\"200\": must be between 1 and 168",
            err.to_string(),
        );
    }

    #[test_log::test]
    fn io_maps_to_storage_unavailable() {
        let err = Error::from(std::io::Error::other("disk gone"));
        assert!(matches!(err, Error::StorageUnavailable(StorageError::Io(_))));
        assert!(std::error::Error::source(&err).is_some());
    }
}
