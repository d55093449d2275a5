//! # m2planet_lexer
//!
//! Turns a preprocessed C-subset source string into the flat token stream
//! consumed by the parser: identifiers, numbers, operators, string/char
//! literals, and label definitions, each carrying the `(file, line)`
//! [`m2planet_base::Provenance`] that later diagnostics quote back.

pub mod escape;
pub mod lexer;
pub mod token;

pub use lexer::tokenize;
pub use token::{Token, TokenKind};
