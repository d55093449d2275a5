//! # m2planet_base
//!
//! Shared low-level plumbing for the m2planet compiler: index-based arena
//! storage, string interning, and provenance-tagged errors. Everything in
//! this crate is pure data structure — no lexing, parsing, or codegen logic
//! lives here, so it can be depended on by every other crate in the
//! workspace without creating cycles.

pub mod arena;
pub mod error;
pub mod intern;
pub mod provenance;

pub use arena::{Arena, Id};
pub use error::{CompileError, Result};
pub use intern::{Interner, Symbol, SymbolEq};
pub use provenance::Provenance;
