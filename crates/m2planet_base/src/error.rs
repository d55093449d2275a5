//! Errors with source provenance, printed as `file:line: message`.
//!
//! Every error the compiler can raise — lexical, syntactic, or semantic —
//! carries the [`Provenance`] of the token or construct that triggered it.
//! There is no recovery (spec.md §7): a `CompileError` propagates with `?`
//! all the way out of the parse, and the driver is the only place that
//! prints it and sets the process exit status.

use std::fmt;

use crate::intern::Interner;
use crate::provenance::Provenance;

/// A fatal compile error, annotated with the file and line it occurred at.
#[derive(Debug, Clone)]
pub struct CompileError {
    pub message: String,
    pub at: Provenance,
}

impl CompileError {
    pub fn new(message: impl Into<String>, at: Provenance) -> Self {
        CompileError {
            message: message.into(),
            at,
        }
    }

    /// Renders the `file:line: message` form, resolving the filename symbol
    /// through the interner that produced it.
    pub fn display(&self, interner: &Interner) -> String {
        format!(
            "{}:{}: {}",
            interner.resolve(self.at.file),
            self.at.line,
            self.message
        )
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<file>:{}: {}", self.at.line, self.message)
    }
}

impl std::error::Error for CompileError {}

/// Alias for `std::result::Result<T, CompileError>`.
pub type Result<T> = std::result::Result<T, CompileError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intern::Interner;

    #[test]
    fn display_resolves_filename_through_interner() {
        let mut interner = Interner::new();
        let file = interner.intern("lib.c");
        let err = CompileError::new("undefined symbol 'foo'", Provenance::new(file, 7));
        assert_eq!(err.display(&interner), "lib.c:7: undefined symbol 'foo'");
    }
}
