//! Error types shared by the fill pipeline.

use std::fmt;
use thiserror::Error;

/// Raised by a [`crate::source::DataSource`] lookup.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    #[error("Member not found: {0}")]
    MissingMember(String),
}

/// Capacity violations of the document model. These always point at a broken
/// template or a programming error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    #[error("Page {page} is full")]
    PageFull { page: usize },
    #[error("Position {position} is out of range for page {page}")]
    PageOverflow { page: usize, position: usize },
}

/// Which step of the placeholder pipeline failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderErrorKind {
    MissingMember,
    EvaluationError,
    AggregateTypeMismatch,
    FormatError,
    Syntax,
}

impl fmt::Display for PlaceholderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaceholderErrorKind::MissingMember => "missing member",
            PlaceholderErrorKind::EvaluationError => "evaluation error",
            PlaceholderErrorKind::AggregateTypeMismatch => "aggregate type mismatch",
            PlaceholderErrorKind::FormatError => "format error",
            PlaceholderErrorKind::Syntax => "syntax error",
        };
        f.write_str(name)
    }
}

/// Failure of a placeholder before it is tied to its expression text.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind}: {detail}")]
pub struct PlaceholderError {
    pub kind: PlaceholderErrorKind,
    pub detail: String,
}

impl PlaceholderError {
    pub fn new(kind: PlaceholderErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    /// Attaches the offending expression text.
    pub fn at(self, expression: &str) -> FillError {
        FillError::InvalidPlaceholder {
            kind: self.kind,
            expression: expression.to_string(),
            detail: self.detail,
        }
    }
}

impl From<SourceError> for PlaceholderError {
    fn from(err: SourceError) -> Self {
        PlaceholderError::new(PlaceholderErrorKind::MissingMember, err.to_string())
    }
}

/// Everything a fill call can fail with. A failed fill produces no output.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FillError {
    #[error("Invalid placeholder '{expression}' ({kind}): {detail}")]
    InvalidPlaceholder {
        kind: PlaceholderErrorKind,
        expression: String,
        detail: String,
    },
    #[error("Insufficient page space on page {page}: {detail}")]
    InsufficientPageSpace { page: usize, detail: String },
    #[error(transparent)]
    Document(#[from] DocumentError),
}

impl FillError {
    /// Discriminant of an `InvalidPlaceholder` failure.
    pub fn placeholder_kind(&self) -> Option<PlaceholderErrorKind> {
        match self {
            FillError::InvalidPlaceholder { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_error_carries_expression() {
        let err = PlaceholderError::new(PlaceholderErrorKind::FormatError, "not a number")
            .at("name:currency");
        assert_eq!(err.placeholder_kind(), Some(PlaceholderErrorKind::FormatError));
        assert_eq!(
            err.to_string(),
            "Invalid placeholder 'name:currency' (format error): not a number"
        );
    }

    #[test]
    fn test_source_error_maps_to_missing_member() {
        let err: PlaceholderError = SourceError::MissingMember("age".into()).into();
        assert_eq!(err.kind, PlaceholderErrorKind::MissingMember);
    }
}
