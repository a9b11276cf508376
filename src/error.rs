//! Error types for qtipack
//!
//! This module defines the error types used throughout the library.
//! Validation outcomes are values (see [`ErrorKind`]); everything that aborts
//! a conversion run is an [`Error`].

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::validator::ValidationResult;

/// Result type alias using qtipack Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for qtipack operations
#[derive(Error, Debug)]
pub enum Error {
    /// Schema loading error
    #[error("schema error: {0}")]
    Parse(#[from] ParseError),

    /// One or more inputs failed validation
    #[error("{} input(s) failed validation", .0.len())]
    Validation(Vec<ValidationResult>),

    /// Question element with an unknown tag
    #[error("unsupported question type: {0}")]
    UnsupportedQuestionType(String),

    /// A question is missing required structure
    #[error("malformed question: {0}")]
    Structure(String),

    /// Template rendering failure
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    /// Archive writing failure
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Text decoding failure
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Classification of a single validation complaint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// The input path does not exist
    FileNotFound,
    /// The input path does not carry the `.xml` extension
    ExtensionMismatch,
    /// No supported text encoding could decode and parse the input
    EncodingFailure,
    /// The input is not well-formed XML
    #[serde(rename = "MalformedXML")]
    MalformedXml,
    /// The document does not conform to the schema
    SchemaViolation,
    /// The input could not be read for lack of permissions
    PermissionDenied,
    /// Anything else
    Unknown,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::FileNotFound => "file not found",
            Self::ExtensionMismatch => "extension mismatch",
            Self::EncodingFailure => "encoding failure",
            Self::MalformedXml => "malformed XML",
            Self::SchemaViolation => "schema violation",
            Self::PermissionDenied => "permission denied",
            Self::Unknown => "unknown error",
        };
        f.write_str(label)
    }
}

/// XML Schema parsing error
#[derive(Debug, Clone)]
pub struct ParseError {
    /// Error message
    pub message: String,
    /// Location in the schema file
    pub location: Option<String>,
    /// Schema source that caused the error
    pub source: Option<String>,
}

impl ParseError {
    /// Create a new parse error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
            source: None,
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the source
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref loc) = self.location {
            write!(f, " (at {})", loc)?;
        }

        if let Some(ref src) = self.source {
            write!(f, "\n\nSource:\n{}", src)?;
        }

        Ok(())
    }
}

impl std::error::Error for ParseError {}
