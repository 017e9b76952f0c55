//! Core diagnostic type for structured error reporting.
//!
//! Every diagnostic carries a stable [`ErrorCode`], a severity, a
//! human-readable message and the source position it points at. Parser
//! diagnostics additionally record the token kinds that would have been
//! accepted, so callers can render "expected one of ..." hints.

use crate::ErrorCode;
use phpdoc_ir::{DocTokenKind, SourcePosition};
use std::fmt;

/// Severity level for diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A single reported problem.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub severity: Severity,
    pub message: String,
    pub position: SourcePosition,
    /// Token kinds that would have been accepted at `position`.
    /// Empty for non-parser diagnostics.
    pub expected: Vec<DocTokenKind>,
}

impl Diagnostic {
    pub fn error(code: ErrorCode, message: impl Into<String>, position: SourcePosition) -> Self {
        Diagnostic {
            code,
            severity: Severity::Error,
            message: message.into(),
            position,
            expected: Vec::new(),
        }
    }

    pub fn warning(code: ErrorCode, message: impl Into<String>, position: SourcePosition) -> Self {
        Diagnostic {
            code,
            severity: Severity::Warning,
            message: message.into(),
            position,
            expected: Vec::new(),
        }
    }

    /// Attach the accepted token kinds.
    #[must_use]
    pub fn with_expected(mut self, expected: Vec<DocTokenKind>) -> Self {
        self.expected = expected;
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}]: {} at {}",
            self.severity, self.code, self.message, self.position
        )?;
        if !self.expected.is_empty() {
            let names: Vec<&str> = self.expected.iter().map(|k| k.describe()).collect();
            write!(f, " (expected {})", names.join(", "))?;
        }
        Ok(())
    }
}

/// Unexpected token at `position`; `expected` lists acceptable kinds.
pub fn unexpected_token(
    found: DocTokenKind,
    position: SourcePosition,
    expected: Vec<DocTokenKind>,
) -> Diagnostic {
    Diagnostic::error(
        ErrorCode::E1001,
        format!("unexpected {}", found.describe()),
        position,
    )
    .with_expected(expected)
}

/// `/**` opener without a matching `*/`.
pub fn unterminated_comment(position: SourcePosition) -> Diagnostic {
    Diagnostic::warning(
        ErrorCode::E0001,
        "doc comment is missing its closing '*/'",
        position,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn display_format() {
        let diag = unexpected_token(
            DocTokenKind::Bar,
            SourcePosition::INITIAL,
            vec![DocTokenKind::Identifier, DocTokenKind::Array],
        );
        assert_eq!(
            diag.to_string(),
            "error[E1001]: unexpected '|' at line 1, column 0 (expected identifier, 'array')"
        );
    }

    #[test]
    fn unterminated_is_a_warning() {
        let diag = unterminated_comment(SourcePosition::INITIAL);
        assert_eq!(diag.severity, Severity::Warning);
        assert_eq!(diag.code, ErrorCode::E0001);
        assert!(diag.expected.is_empty());
    }
}
