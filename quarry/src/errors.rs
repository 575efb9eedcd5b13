use backtrace::Backtrace;
use serde::ser;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;
use std::sync::Arc;

/// Error kinds for quarry's own failures.
///
/// Building expressions, stages and pipelines never fails. These kinds cover the
/// library-side surfaces around the core: the collection registry, value parsing
/// and JSON rendering. Errors raised by a [`crate::driver::Driver`] are never
/// converted into this type; triggers hand them back unchanged.
///
/// # Examples
///
/// ```rust,ignore
/// use quarry::errors::{QuarryError, ErrorKind, QuarryResult};
///
/// fn example() -> QuarryResult<()> {
///     Err(QuarryError::new("Collection not bound", ErrorKind::CollectionNotFound))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    // Registry Errors
    /// A collection name is empty or otherwise unusable
    InvalidCollectionName,
    /// The same collection name or schema marker was registered twice
    DuplicateCollection,
    /// No collection is bound for the requested name or schema marker
    CollectionNotFound,
    /// A collection is bound, but to a different schema marker
    SchemaMismatch,

    // Value Errors
    /// An object id string is not 24 hexadecimal characters
    InvalidObjectId,
    /// A value does not have the expected type
    InvalidDataType,

    // Encoding Errors
    /// Error rendering or parsing JSON
    EncodingError,

    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::InvalidCollectionName => write!(f, "Invalid collection name"),
            ErrorKind::DuplicateCollection => write!(f, "Duplicate collection"),
            ErrorKind::CollectionNotFound => write!(f, "Collection not found"),
            ErrorKind::SchemaMismatch => write!(f, "Schema mismatch"),
            ErrorKind::InvalidObjectId => write!(f, "Invalid object id"),
            ErrorKind::InvalidDataType => write!(f, "Invalid data type"),
            ErrorKind::EncodingError => write!(f, "Encoding error"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Custom quarry error type.
///
/// `QuarryError` carries a message, a kind and an optional cause, plus the
/// backtrace captured where it was created.
///
/// # Examples
///
/// ```rust,ignore
/// use quarry::errors::{QuarryError, ErrorKind};
///
/// let cause = QuarryError::new("trailing comma", ErrorKind::EncodingError);
/// let err = QuarryError::new_with_cause("Cannot render pipeline", ErrorKind::EncodingError, cause);
/// ```
#[derive(Clone)]
pub struct QuarryError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<QuarryError>>,
    backtrace: Arc<Backtrace>,
}

impl QuarryError {
    /// Creates a new `QuarryError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        QuarryError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: Arc::new(Backtrace::new()),
        }
    }

    /// Creates a new `QuarryError` with a cause error.
    ///
    /// The cause is preserved and reported through [`Error::source`].
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: QuarryError) -> Self {
        QuarryError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: Arc::new(Backtrace::new()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&QuarryError> {
        self.cause.as_deref()
    }
}

impl Display for QuarryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for QuarryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // message with stack trace, or the cause chain
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace),
        }
    }
}

impl Error for QuarryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for quarry operations.
pub type QuarryResult<T> = Result<T, QuarryError>;

impl ser::Error for QuarryError {
    fn custom<T: Display>(msg: T) -> Self {
        QuarryError::new(&msg.to_string(), ErrorKind::EncodingError)
    }
}

impl From<serde_json::Error> for QuarryError {
    fn from(err: serde_json::Error) -> Self {
        QuarryError::new(&format!("JSON error: {}", err), ErrorKind::EncodingError)
    }
}

impl From<std::fmt::Error> for QuarryError {
    fn from(err: std::fmt::Error) -> Self {
        QuarryError::new(
            &format!("Formatting error: {}", err),
            ErrorKind::InternalError,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarry_error_new_creates_error() {
        let error = QuarryError::new("No such collection", ErrorKind::CollectionNotFound);
        assert_eq!(error.message, "No such collection");
        assert_eq!(error.error_kind, ErrorKind::CollectionNotFound);
        assert!(error.cause.is_none());
    }

    #[test]
    fn quarry_error_new_with_cause_creates_error() {
        let cause = QuarryError::new("bad hex", ErrorKind::InvalidObjectId);
        let error = QuarryError::new_with_cause("Cannot parse", ErrorKind::InvalidDataType, cause);
        assert_eq!(error.kind(), &ErrorKind::InvalidDataType);
        assert_eq!(error.cause().map(|c| c.message()), Some("bad hex"));
    }

    #[test]
    fn quarry_error_source_follows_cause() {
        let cause = QuarryError::new("inner", ErrorKind::EncodingError);
        let error = QuarryError::new_with_cause("outer", ErrorKind::EncodingError, cause);
        assert_eq!(error.source().map(|e| e.to_string()), Some("inner".to_string()));

        let plain = QuarryError::new("plain", ErrorKind::InternalError);
        assert!(plain.source().is_none());
    }

    #[test]
    fn quarry_error_display_is_message() {
        let error = QuarryError::new("An error occurred", ErrorKind::InternalError);
        assert_eq!(format!("{}", error), "An error occurred");
    }

    #[test]
    fn quarry_error_debug_includes_cause() {
        let cause = QuarryError::new("inner", ErrorKind::EncodingError);
        let error = QuarryError::new_with_cause("outer", ErrorKind::EncodingError, cause);
        let debug = format!("{:?}", error);
        assert!(debug.contains("outer"));
        assert!(debug.contains("Caused by: inner"));
    }

    #[test]
    fn from_serde_json_error_is_encoding_error() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: QuarryError = err.into();
        assert_eq!(error.kind(), &ErrorKind::EncodingError);
        assert!(error.message().starts_with("JSON error"));
    }

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::CollectionNotFound.to_string(), "Collection not found");
        assert_eq!(ErrorKind::DuplicateCollection.to_string(), "Duplicate collection");
        assert_eq!(ErrorKind::EncodingError.to_string(), "Encoding error");
    }
}
