//! # m2planet_codegen
//!
//! Per-architecture assembly emission templates (spec.md §4.6, §9) and the
//! three-section output model (spec.md §6) they write into. This crate
//! has no parsing logic: it is the portability layer the parser calls
//! into once it has decided *what* to emit, never *how*.

pub mod architecture;
pub mod backend;
pub mod backends;
pub mod dispatch;
pub mod ops;
pub mod output;

pub use architecture::{Architecture, StackDirection};
pub use backend::{check_size, Backend};
pub use dispatch::backend;
pub use ops::{ArithOp, CompareOp};
pub use output::OutputSections;
