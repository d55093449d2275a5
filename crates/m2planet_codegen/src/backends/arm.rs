//! 32-bit ARMv7-L backend. Upward-growing stack; `r0`/`r1`
//! primary/secondary.
//!
//! spec.md §9's Open Questions note that `&&`/`||` fold to bitwise
//! `AND`/`OR` without short-circuiting "on every architecture" — on ARM as
//! everywhere else, [`Backend::binary_op`] for `LogAnd`/`LogOr` is
//! identical to `BitAnd`/`BitOr`.

use m2planet_base::{Provenance, Result};

use crate::architecture::{Architecture, StackDirection};
use crate::backend::{check_size, Backend};
use crate::ops::{ArithOp, CompareOp};

pub struct Armv7LBackend;

impl Backend for Armv7LBackend {
    fn architecture(&self) -> Architecture {
        Architecture::Armv7L
    }

    fn registers(&self) -> (&'static str, &'static str) {
        ("r0", "r1")
    }

    fn first_local_depth(&self) -> i32 {
        8
    }

    fn local_depth_delta(&self) -> i32 {
        self.word_size() as i32
    }

    fn stack_direction(&self) -> StackDirection {
        StackDirection::Upward
    }

    fn push_primary(&self) -> String {
        "push_{r0}".to_string()
    }

    fn pop_primary(&self) -> String {
        "pop_{r0}".to_string()
    }

    fn pop_secondary(&self) -> String {
        "pop_{r1}".to_string()
    }

    fn load_value(&self, size: u32, is_signed: bool, at: Provenance) -> Result<String> {
        check_size(self.architecture(), size, at)?;
        Ok(match (size, is_signed) {
            (1, true) => "ldrsb_r0,_[r0]".to_string(),
            (1, false) => "ldrb_r0,_[r0]".to_string(),
            (2, true) => "ldrsh_r0,_[r0]".to_string(),
            (2, false) => "ldrh_r0,_[r0]".to_string(),
            _ => "ldr_r0,_[r0]".to_string(),
        })
    }

    fn store_value(&self, size: u32, at: Provenance) -> Result<String> {
        check_size(self.architecture(), size, at)?;
        Ok(match size {
            1 => "strb_r0,_[r1]".to_string(),
            2 => "strh_r0,_[r1]".to_string(),
            _ => "str_r0,_[r1]".to_string(),
        })
    }

    fn load_immediate(&self, value: i64) -> String {
        format!("ldr_r0,_={value}")
    }

    fn load_local_address(&self, depth: i32) -> String {
        format!("add_r0,_fp,_#{depth}")
    }

    fn load_global_address(&self, label: &str) -> String {
        format!("ldr_r0,_=GLOBAL_{label}")
    }

    fn load_label_address(&self, label: &str) -> String {
        format!("ldr_r0,_={label}")
    }

    fn binary_op(&self, op: ArithOp, is_signed: bool) -> String {
        match (op, is_signed) {
            (ArithOp::Add, _) => "add_r0,_r0,_r1".to_string(),
            (ArithOp::Sub, _) => "sub_r0,_r0,_r1".to_string(),
            (ArithOp::Mul, _) => "mul_r0,_r0,_r1".to_string(),
            (ArithOp::Div, true) => "bl___aeabi_idiv".to_string(),
            (ArithOp::Div, false) => "bl___aeabi_uidiv".to_string(),
            (ArithOp::Mod, true) => "bl___aeabi_idivmod".to_string(),
            (ArithOp::Mod, false) => "bl___aeabi_uidivmod".to_string(),
            (ArithOp::Shl, _) => "lsl_r0,_r0,_r1".to_string(),
            (ArithOp::Shr, true) => "asr_r0,_r0,_r1".to_string(),
            (ArithOp::Shr, false) => "lsr_r0,_r0,_r1".to_string(),
            (ArithOp::BitAnd, _) | (ArithOp::LogAnd, _) => "and_r0,_r0,_r1".to_string(),
            (ArithOp::BitOr, _) | (ArithOp::LogOr, _) => "orr_r0,_r0,_r1".to_string(),
            (ArithOp::BitXor, _) => "eor_r0,_r0,_r1".to_string(),
        }
    }

    fn comparison(&self, op: CompareOp, _is_signed: bool) -> String {
        let cond = match op {
            CompareOp::Lt => "lt",
            CompareOp::Le => "le",
            CompareOp::Gt => "gt",
            CompareOp::Ge => "ge",
            CompareOp::Eq => "eq",
            CompareOp::Ne => "ne",
        };
        format!("cmp_r0,_r1\nmovw{cond}_r0,_#1\nmovw_ne_r0,_#0")
    }

    fn unary_negate(&self) -> String {
        "neg_r0,_r0".to_string()
    }

    fn unary_not(&self) -> String {
        "cmp_r0,_#0\nmoveq_r0,_#1\nmovne_r0,_#0".to_string()
    }

    fn bitwise_not(&self) -> String {
        "mvn_r0,_r0".to_string()
    }

    fn jump(&self, label: &str) -> String {
        format!("b_{label}")
    }

    fn jump_if_zero(&self, label: &str) -> String {
        format!("cmp_r0,_#0\nbeq_{label}")
    }

    fn jump_if_not_zero(&self, label: &str) -> String {
        format!("cmp_r0,_#0\nbne_{label}")
    }

    fn call(&self, label: &str) -> String {
        format!("bl_{label}")
    }

    fn call_prologue(&self, _stack_arg_words: u32) -> String {
        "push_{fp,_lr}\nmov_fp,_sp".to_string()
    }

    fn call_epilogue(&self, _stack_arg_words: u32) -> String {
        "mov_sp,_fp\npop_{fp,_lr}".to_string()
    }

    fn return_instruction(&self) -> String {
        "bx_lr".to_string()
    }
}
