//! Diagnostic types for the expression evaluator.
//!
//! Every failure mode in the evaluator is non-fatal: grammar functions
//! always return a value, and diagnostics accumulate on the session to
//! be drained by the host after each evaluation. There is no unwinding
//! inside the evaluator.

use std::fmt;

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Informational message (e.g. unset confirmations).
    Info,
    /// Warning (evaluation continues with a defined fallback value).
    Warning,
    /// Error (evaluation continues; the affected sub-expression
    /// yields 0).
    Error,
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// A diagnostic produced during evaluation.
#[derive(Debug, Clone)]
pub struct EvalError {
    /// Machine-readable category.
    pub kind: ErrorKind,
    /// Human-readable message.
    pub message: String,
    /// Severity.
    pub severity: Severity,
}

impl EvalError {
    /// Create a new error-severity diagnostic.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            severity: Severity::Error,
        }
    }

    /// Set severity.
    #[must_use]
    pub const fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for EvalError {}

// ---------------------------------------------------------------------------
// Error kinds
// ---------------------------------------------------------------------------

/// Categories of diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    // -- Arithmetic domain --
    /// Result exceeded the 64-bit range (value wraps).
    Overflow,
    /// Result fell below the 64-bit range (value wraps).
    Underflow,
    /// Division by zero (result forced to 0).
    DivisionByZero,
    /// Modulo by zero (result forced to 0).
    ModuloByZero,
    /// Shift amount at or above the word width (count is masked).
    ShiftOutOfRange,

    // -- Variables --
    /// Read of an undefined name (auto-created at 0).
    UnknownVariable,
    /// Assignment or unset of a read-only or reserved name.
    ReadOnlyVariable,
    /// Attempt to unset a register.
    RegisterUnset,

    // -- Parsing --
    /// Unterminated `(`, `{`, or `[`.
    MismatchedGrouping,
    /// Bare `=` after a non-identifier left-hand side.
    NotAssignable,
    /// Unrecognized character where an operator was expected.
    UnknownOperator,
    /// Malformed or oversized character constant.
    BadCharConstant,
    /// Expected a primary expression and found something else.
    BadExpression,

    // -- Limits --
    /// Expression nesting exceeded the recursion limit.
    RecursionLimit,

    // -- Informational --
    /// A session notification (e.g. a variable was unset).
    Note,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overflow => write!(f, "overflow"),
            Self::Underflow => write!(f, "underflow"),
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::ModuloByZero => write!(f, "modulo by zero"),
            Self::ShiftOutOfRange => write!(f, "shift out of range"),
            Self::UnknownVariable => write!(f, "unknown variable"),
            Self::ReadOnlyVariable => write!(f, "read-only variable"),
            Self::RegisterUnset => write!(f, "register unset"),
            Self::MismatchedGrouping => write!(f, "mismatched grouping"),
            Self::NotAssignable => write!(f, "not assignable"),
            Self::UnknownOperator => write!(f, "unknown operator"),
            Self::BadCharConstant => write!(f, "bad character constant"),
            Self::BadExpression => write!(f, "bad expression"),
            Self::RecursionLimit => write!(f, "recursion limit"),
            Self::Note => write!(f, "note"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_is_the_message() {
        let err = EvalError::new(ErrorKind::DivisionByZero, "division by zero");
        assert_eq!(format!("{err}"), "division by zero");
        assert_eq!(err.severity, Severity::Error);
    }

    #[test]
    fn with_severity_builder() {
        let err = EvalError::new(ErrorKind::Overflow, "overflow").with_severity(Severity::Warning);
        assert_eq!(err.severity, Severity::Warning);
    }
}
