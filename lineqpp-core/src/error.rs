//! Error types for the equation preprocessor.

use std::fmt;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// An error produced while scanning, parsing, or solving equations.
#[derive(Debug, Clone)]
pub struct LineqError {
    /// What went wrong.
    pub kind: ErrorKind,
    /// Human-readable message.
    pub message: String,
    /// Source line number (1-based), if known.
    pub line: Option<usize>,
    /// The token being processed when the error occurred, if any.
    pub lexeme: Option<String>,
}

impl LineqError {
    /// Create a new error.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            line: None,
            lexeme: None,
        }
    }

    /// Attach a source line number.
    #[must_use]
    pub const fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Attach the offending token's lexeme.
    #[must_use]
    pub fn with_lexeme(mut self, lexeme: impl Into<String>) -> Self {
        self.lexeme = Some(lexeme.into());
        self
    }
}

impl fmt::Display for LineqError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(lexeme) = &self.lexeme {
            write!(f, " at token {lexeme}")?;
        }
        Ok(())
    }
}

impl std::error::Error for LineqError {}

impl From<std::io::Error> for LineqError {
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorKind::Io, err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Error kinds
// ---------------------------------------------------------------------------

/// Categories of errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed equation input.
    Parse,
    /// Product or quotient of two non-constant polynomials.
    NonLinear,
    /// Divisor is zero under tolerance.
    DivByZero,
    /// Built-in function applied to a non-constant argument.
    NonConstantArg,
    /// Identifier in function position is not a built-in.
    NotAFunction,
    /// Real-only operation applied to a complex value.
    Domain,
    /// Equation reduces to `0 = 0`.
    RedundantEquation,
    /// Equation reduces to `c = 0` for non-zero `c`.
    InconsistentEquation,
    /// Built-in function used where a value is required.
    TypeError,
    /// File or stream I/O failure.
    Io,
    /// Internal error (should not happen).
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse => write!(f, "parse error"),
            Self::NonLinear => write!(f, "nonlinear expression"),
            Self::DivByZero => write!(f, "division by zero"),
            Self::NonConstantArg => write!(f, "non-constant argument"),
            Self::NotAFunction => write!(f, "not a function"),
            Self::Domain => write!(f, "domain error"),
            Self::RedundantEquation => write!(f, "redundant equation"),
            Self::InconsistentEquation => write!(f, "inconsistent equation"),
            Self::TypeError => write!(f, "type error"),
            Self::Io => write!(f, "I/O error"),
            Self::Internal => write!(f, "internal error"),
        }
    }
}

/// Convenience type alias for results using [`LineqError`].
pub type LineqResult<T> = Result<T, LineqError>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
