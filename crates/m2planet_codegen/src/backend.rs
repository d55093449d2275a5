//! The `Backend` trait: one implementation per [`Architecture`] variant,
//! replacing the source compiler's repeated if/else chains on a global
//! architecture flag with the dispatch table spec.md §9's Design Notes
//! call for.
//!
//! Every method corresponds to one of the "closed set of templates"
//! enumerated in spec.md §4.6: load, store, push, pop, binary-op family,
//! comparison family, call prologue, call epilogue, return.

use m2planet_base::{CompileError, Provenance, Result};

use crate::architecture::{Architecture, StackDirection};
use crate::ops::{ArithOp, CompareOp};

/// Checks that `size` is one of the sizes the accepted subset supports
/// (1, 2, 4, or 8 bytes, with 8 only on a 64-bit target) — spec.md §4.6:
/// "Unsupported size … aborts the compile with the offending size
/// printed."
pub fn check_size(arch: Architecture, size: u32, at: Provenance) -> Result<()> {
    let supported = match size {
        1 | 2 | 4 => true,
        8 => arch.is_64bit(),
        _ => false,
    };
    if supported {
        Ok(())
    } else {
        Err(CompileError::new(
            format!("unsupported load/store size {size} for architecture {arch}"),
            at,
        ))
    }
}

/// One architecture's complete set of emission templates.
pub trait Backend {
    fn architecture(&self) -> Architecture;

    fn word_size(&self) -> u32 {
        self.architecture().word_size()
    }

    /// `(primary, secondary)` register names, per the glossary's
    /// Primary/secondary register entry.
    fn registers(&self) -> (&'static str, &'static str);

    // -- local-frame offset policy (spec.md §4.4) -----------------------
    fn first_local_depth(&self) -> i32;
    fn local_depth_delta(&self) -> i32;
    fn stack_direction(&self) -> StackDirection;

    // -- push/pop (spec.md §8 property 4: stack balance) -----------------
    fn push_primary(&self) -> String;
    fn pop_primary(&self) -> String;
    fn pop_secondary(&self) -> String;

    // -- load/store (spec.md §4.6) ---------------------------------------
    fn load_value(&self, size: u32, is_signed: bool, at: Provenance) -> Result<String>;
    fn store_value(&self, size: u32, at: Provenance) -> Result<String>;

    // -- addressing -------------------------------------------------------
    fn load_immediate(&self, value: i64) -> String;
    fn load_local_address(&self, depth: i32) -> String;
    fn load_global_address(&self, label: &str) -> String;
    fn load_label_address(&self, label: &str) -> String;

    // -- arithmetic/bitwise & compound assignment (spec.md §4.3, §4.6) ---
    fn binary_op(&self, op: ArithOp, is_signed: bool) -> String;
    fn compound_operation(&self, op: ArithOp, is_signed: bool, at: Provenance) -> Result<String> {
        if matches!(op, ArithOp::LogAnd | ArithOp::LogOr) {
            return Err(CompileError::new(
                "'&&=' and '||=' are not in the accepted grammar",
                at,
            ));
        }
        Ok(self.binary_op(op, is_signed))
    }

    // -- comparisons (spec.md §4.3) ---------------------------------------
    fn comparison(&self, op: CompareOp, is_signed: bool) -> String;

    // -- unary operators (spec.md §4.3 primary_expr) -----------------------
    fn unary_negate(&self) -> String;
    /// Logical not: primary becomes `1` if it was zero, else `0`.
    fn unary_not(&self) -> String;
    fn bitwise_not(&self) -> String;

    // -- control flow -------------------------------------------------------
    fn jump(&self, label: &str) -> String;
    fn jump_if_zero(&self, label: &str) -> String;
    fn jump_if_not_zero(&self, label: &str) -> String;

    // -- calls & function framing (spec.md §4.5, §4.6) ---------------------
    fn call(&self, label: &str) -> String;
    fn call_prologue(&self, stack_arg_words: u32) -> String;
    fn call_epilogue(&self, stack_arg_words: u32) -> String;
    fn function_label(&self, name: &str) -> String {
        format!(":FUNCTION_{name}")
    }
    fn return_instruction(&self) -> String;
}
