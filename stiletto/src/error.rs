use crate::inspect::{NotATypeProperty, NotATypeReason};

/// Result type used across the generator.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that abort the generation of a round.
///
/// Every error carries a context trace, innermost frame first, that the round
/// driver renders when reporting the failure.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    trace: Vec<String>,
}

/// The different kinds of failures the generator distinguishes.
#[derive(Debug)]
pub enum ErrorKind {
    /// A declaration violates a provisioning rule.
    Validation {
        message: String,
        element: Option<String>,
    },
    /// A type-valued annotation property could not be read.
    NotATypeProperty {
        annotation: String,
        property: String,
        reason: NotATypeReason,
        element: Option<String>,
    },
    /// A referenced type is absent from the symbol model.
    UnknownType(String),
    /// The output channel failed to accept a generated file.
    Io(std::io::Error),
    /// Any other unexpected fault.
    Internal(String),
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            trace: Vec::new(),
        }
    }

    /// Creates a terminal validation error attached to `element`.
    pub fn validation(message: impl Into<String>, element: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation {
            message: message.into(),
            element: Some(element.into()),
        })
    }

    pub fn unknown_type(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownType(name.into()))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Returns `true` for terminal errors caused by the processed declarations.
    pub fn is_validation(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Validation { .. } | ErrorKind::NotATypeProperty { .. }
        )
    }

    /// Element the error is reported against, if any.
    pub fn element(&self) -> Option<&str> {
        match &self.kind {
            ErrorKind::Validation { element, .. } => element.as_deref(),
            ErrorKind::NotATypeProperty { element, .. } => element.as_deref(),
            _ => None,
        }
    }

    /// Attaches the element a validation error is reported against.
    pub fn with_element(mut self, value: impl Into<String>) -> Self {
        match &mut self.kind {
            ErrorKind::Validation { element, .. } | ErrorKind::NotATypeProperty { element, .. } => {
                *element = Some(value.into());
            }
            _ => {}
        }
        self
    }

    /// Context frames, innermost first.
    pub fn trace(&self) -> &[String] {
        &self.trace
    }

    /// Appends an outer context frame.
    pub fn context(mut self, frame: impl Into<String>) -> Self {
        self.trace.push(frame.into());
        self
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ErrorKind::Validation { message, .. } => write!(f, "{message}"),
            ErrorKind::NotATypeProperty {
                annotation,
                property,
                reason,
                ..
            } => match reason {
                NotATypeReason::MissingAnnotation => {
                    write!(f, "Annotation @{annotation} is missing")
                }
                NotATypeReason::MissingValue => {
                    write!(f, "Property {property} of @{annotation} has no value")
                }
                NotATypeReason::WrongKind => {
                    write!(f, "Property {property} of @{annotation} is not a Class<?>")
                }
            },
            ErrorKind::UnknownType(name) => write!(f, "Unknown type {name}"),
            ErrorKind::Io(e) => write!(f, "Cannot write generated source: {e}"),
            ErrorKind::Internal(message) => write!(f, "Internal error: {message}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ErrorKind::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::new(ErrorKind::Io(value))
    }
}

impl From<NotATypeProperty> for Error {
    fn from(value: NotATypeProperty) -> Self {
        Self::new(ErrorKind::NotATypeProperty {
            annotation: value.annotation,
            property: value.property,
            reason: value.reason,
            element: None,
        })
    }
}

/// Extension for attaching context frames to fallible results.
pub trait ResultExt<T> {
    fn context<F, S>(self, frame: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn context<F, S>(self, frame: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| e.into().context(frame()))
    }
}
