//! # m2planet_compiler
//!
//! The recursive-descent parser and incremental emitter: everything
//! downstream of the token stream. [`state`] gathers the process-scope
//! parser state into `ParserState`; [`decl`], [`stmt`], [`expr`] are the
//! grammar productions; [`function`] and [`control`] hold the per-function
//! and per-loop bookkeeping they share. [`compile`] wires a source string
//! to rendered assembly text, the one entry point the driver binary calls.

pub mod control;
pub mod decl;
pub mod expr;
pub mod function;
pub mod state;
pub mod stmt;

use m2planet_base::Interner;
use m2planet_codegen::Architecture;
use m2planet_lexer::tokenize;

pub use control::{BreakFrame, CaseList};
pub use function::{FunctionRecord, SymbolEntry};
pub use state::{FunctionSignature, ParserState};

/// Compile one preprocessed translation unit to assembly text for `arch`.
///
/// `filename` seeds the provenance of tokens before the source's own
/// `#FILENAME` directives (if any) take over; callers concatenating
/// several files should inject one such directive per file boundary
/// before calling this, rather than calling it once per file, so that
/// globals and functions across files share one `ParserState`.
///
/// `bootstrap_mode` relaxes the checks the original M2-Planet CI didn't
/// rely on (see [`ParserState`]); it does not change what gets emitted.
pub fn compile(source: &str, filename: &str, arch: Architecture, bootstrap_mode: bool) -> Result<String, String> {
    let mut interner = Interner::new();
    let tokens = tokenize(source, filename, &mut interner).map_err(|e| e.display(&interner))?;
    log::debug!("{filename}: lexed {} tokens for {arch}", tokens.len());

    let mut state = ParserState::new(tokens, interner, arch, bootstrap_mode);
    decl::program(&mut state).map_err(|e| e.display(&state.interner))?;
    Ok(state.out.render())
}
