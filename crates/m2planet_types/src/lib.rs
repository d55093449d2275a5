//! # m2planet_types
//!
//! The type registry underlying declaration parsing: primitives (`void`,
//! `char`, `int`), pointer chains built by `&`/`*`, and the struct/union
//! member lists consulted by `.` and `->` member access (spec.md §3, §4.2).

pub mod registry;

pub use registry::{Type, TypeId, TypeRegistry, WORD_32, WORD_64};
