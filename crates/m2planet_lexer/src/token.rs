//! The token produced by [`crate::lexer::tokenize`].
//!
//! spec.md §3 describes a doubly linked list of tokens carrying `text`,
//! `filename`, `linenumber`, and a `kind` that is "implicit (classified by
//! first-character rules at parse time)". The index-arena deviation from
//! §9 turns the list into a plain `Vec<Token>`; `kind` is still classified
//! once at lex time rather than re-derived by the parser on every match,
//! since nothing about the grammar needs it re-classified later.

use m2planet_base::{Provenance, Symbol};

/// The lexical category a token's first byte dispatched to (spec.md §4.1's
/// dispatch table). Kept coarse — the parser re-examines `text` for the
/// exact operator spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Number,
    Operator,
    String,
    Char,
    /// A single `\n` byte, preserved so directive processing can see line
    /// boundaries before the comment/directive post-passes run.
    Newline,
    /// Anything else: single punctuation bytes such as `(`, `)`, `{`, `}`,
    /// `;`, `,`, `[`, `]`.
    Other,
}

/// One token: its exact source spelling, its coarse kind, and where it
/// came from.
#[derive(Debug, Clone)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
    pub at: Provenance,
}

impl Token {
    pub fn new(text: impl Into<String>, kind: TokenKind, at: Provenance) -> Self {
        Token {
            text: text.into(),
            kind,
            at,
        }
    }

    /// True for a token whose text begins with `:` — a label definition
    /// produced by the trailing-colon rewrite of spec.md §4.1.
    pub fn is_label(&self) -> bool {
        self.text.starts_with(':') && self.kind == TokenKind::Identifier
    }
}

/// The file a [`Token`]'s [`Provenance`] names, resolved back to a string.
pub fn filename<'a>(interner: &'a m2planet_base::Interner, file: Symbol) -> &'a str {
    interner.resolve(file)
}
