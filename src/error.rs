//! Error types for record processing.

use std::fmt;
use std::io;

/// Where in a run an error happened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Position {
    /// Label of the fragment being executed (`BEGIN`, `arg1`, ..., `END`).
    pub fragment: Option<String>,
    /// Record index (`NR`) being processed.
    pub record: Option<u64>,
}

/// Classification of failures a run can hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad configuration, including fragments that fail to compile.
    Config,
    /// Reading input or writing output failed.
    Io,
    /// A fragment referenced a name nothing could resolve.
    UndefinedReference,
    /// A fragment raised an error of its own.
    Fragment,
    /// An execution context operation was called in the wrong state.
    Lifecycle,
}

/// Errors that can occur during a run.
#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    /// The error message.
    pub message: String,
    /// Position information for the error.
    pub position: Position,
}

impl Error {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            position: Position::default(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn io(err: io::Error) -> Self {
        Self::new(ErrorKind::Io, err.to_string())
    }

    /// Create an undefined-reference error for `name`.
    pub fn undefined(name: &str) -> Self {
        Self::new(
            ErrorKind::UndefinedReference,
            format!("undefined name '{}'", name),
        )
    }

    pub fn fragment(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Fragment, message)
    }

    pub fn lifecycle(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Lifecycle, message)
    }

    /// Attach the label of the fragment that failed.
    pub fn with_fragment(mut self, label: impl Into<String>) -> Self {
        self.position.fragment = Some(label.into());
        self
    }

    /// Attach the record index being processed.
    pub fn with_record(mut self, record: u64) -> Self {
        self.position.record = Some(record);
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        match (&self.position.fragment, self.position.record) {
            (Some(label), Some(record)) => write!(f, " (in {}, at record {})", label, record),
            (Some(label), None) => write!(f, " (in {})", label),
            (None, Some(record)) => write!(f, " (at record {})", record),
            (None, None) => Ok(()),
        }
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::io(err)
    }
}

/// Result type for record processing.
pub type Result<T> = std::result::Result<T, Error>;
