//! Knight-tape virtual machine backend, covering both the POSIX and
//! native variants. The two differ only in which driver/syscall
//! convention wraps the emitted code (out of scope here, per spec.md §1);
//! the instruction templates this module emits are identical.

use m2planet_base::{Provenance, Result};

use crate::architecture::{Architecture, StackDirection};
use crate::backend::{check_size, Backend};
use crate::ops::{ArithOp, CompareOp};

pub struct KnightBackend {
    pub native: bool,
}

impl Backend for KnightBackend {
    fn architecture(&self) -> Architecture {
        if self.native {
            Architecture::KnightNative
        } else {
            Architecture::KnightPosix
        }
    }

    fn registers(&self) -> (&'static str, &'static str) {
        ("R0", "R1")
    }

    fn first_local_depth(&self) -> i32 {
        self.word_size() as i32
    }

    fn local_depth_delta(&self) -> i32 {
        self.word_size() as i32
    }

    fn stack_direction(&self) -> StackDirection {
        StackDirection::Upward
    }

    fn push_primary(&self) -> String {
        "PUSHR R0 R15".to_string()
    }

    fn pop_primary(&self) -> String {
        "POPR R0 R15".to_string()
    }

    fn pop_secondary(&self) -> String {
        "POPR R1 R15".to_string()
    }

    fn load_value(&self, size: u32, is_signed: bool, at: Provenance) -> Result<String> {
        check_size(self.architecture(), size, at)?;
        Ok(match (size, is_signed) {
            (1, true) => "LOAD R0 R0 0".to_string(),
            (1, false) => "LOADU R0 R0 0".to_string(),
            (2, _) => "LOAD16 R0 R0 0".to_string(),
            _ => "LOAD R0 R0 0".to_string(),
        })
    }

    fn store_value(&self, size: u32, at: Provenance) -> Result<String> {
        check_size(self.architecture(), size, at)?;
        Ok(match size {
            1 => "STORE R0 R1 0".to_string(),
            2 => "STORE16 R0 R1 0".to_string(),
            _ => "STORE R0 R1 0".to_string(),
        })
    }

    fn load_immediate(&self, value: i64) -> String {
        format!("LOADI R0 {value}")
    }

    fn load_local_address(&self, depth: i32) -> String {
        format!("LOAD R0 R14 {depth}")
    }

    fn load_global_address(&self, label: &str) -> String {
        format!("LOADI R0 &GLOBAL_{label}")
    }

    fn load_label_address(&self, label: &str) -> String {
        format!("LOADI R0 &{label}")
    }

    fn binary_op(&self, op: ArithOp, is_signed: bool) -> String {
        let mnemonic = match (op, is_signed) {
            (ArithOp::Add, _) => "ADD",
            (ArithOp::Sub, _) => "SUB",
            (ArithOp::Mul, true) => "MUL",
            (ArithOp::Mul, false) => "MULU",
            (ArithOp::Div, true) => "DIV",
            (ArithOp::Div, false) => "DIVU",
            (ArithOp::Mod, true) => "MOD",
            (ArithOp::Mod, false) => "MODU",
            (ArithOp::Shl, _) => "SAL",
            (ArithOp::Shr, true) => "SAR",
            (ArithOp::Shr, false) => "SL0",
            (ArithOp::BitAnd, _) | (ArithOp::LogAnd, _) => "AND",
            (ArithOp::BitOr, _) | (ArithOp::LogOr, _) => "OR",
            (ArithOp::BitXor, _) => "XOR",
        };
        format!("{mnemonic} R0 R0 R1")
    }

    /// Preserves the source's documented Knight comparison quirk (spec.md
    /// §9 Open Questions): signed relational comparisons use `CMP`, but
    /// equality/inequality always use `CMPU`, regardless of signedness.
    fn comparison(&self, op: CompareOp, is_signed: bool) -> String {
        let mnemonic = match op {
            CompareOp::Eq | CompareOp::Ne => "CMPU",
            _ if is_signed => "CMP",
            _ => "CMPU",
        };
        format!("{mnemonic} R0 R0 R1")
    }

    fn unary_negate(&self) -> String {
        "LOADI R1 0\nSUB R0 R1 R0".to_string()
    }

    fn unary_not(&self) -> String {
        "CMPI.E R0 R0 0".to_string()
    }

    fn bitwise_not(&self) -> String {
        "NOT R0 R0".to_string()
    }

    fn jump(&self, label: &str) -> String {
        format!("JUMP %{label}")
    }

    fn jump_if_zero(&self, label: &str) -> String {
        format!("JUMP.Z R0 %{label}")
    }

    fn jump_if_not_zero(&self, label: &str) -> String {
        format!("JUMP.NZ R0 %{label}")
    }

    fn call(&self, label: &str) -> String {
        format!("CALLI &{label}")
    }

    fn call_prologue(&self, _stack_arg_words: u32) -> String {
        "PUSHR R14 R15".to_string()
    }

    fn call_epilogue(&self, _stack_arg_words: u32) -> String {
        "POPR R14 R15".to_string()
    }

    fn return_instruction(&self) -> String {
        "RET".to_string()
    }
}
