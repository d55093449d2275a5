//! 64-bit AArch64 backend. Upward-growing stack; `x0`/`x1`
//! primary/secondary.

use m2planet_base::{Provenance, Result};

use crate::architecture::{Architecture, StackDirection};
use crate::backend::{check_size, Backend};
use crate::ops::{ArithOp, CompareOp};

pub struct Aarch64Backend;

impl Backend for Aarch64Backend {
    fn architecture(&self) -> Architecture {
        Architecture::Aarch64
    }

    fn registers(&self) -> (&'static str, &'static str) {
        ("x0", "x1")
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
        "str_x0,_[sp,_#-16]!".to_string()
    }

    fn pop_primary(&self) -> String {
        "ldr_x0,_[sp],_#16".to_string()
    }

    fn pop_secondary(&self) -> String {
        "ldr_x1,_[sp],_#16".to_string()
    }

    fn load_value(&self, size: u32, is_signed: bool, at: Provenance) -> Result<String> {
        check_size(self.architecture(), size, at)?;
        Ok(match (size, is_signed) {
            (1, true) => "ldrsb_x0,_[x0]".to_string(),
            (1, false) => "ldrb_w0,_[x0]".to_string(),
            (2, true) => "ldrsh_x0,_[x0]".to_string(),
            (2, false) => "ldrh_w0,_[x0]".to_string(),
            (4, true) => "ldrsw_x0,_[x0]".to_string(),
            (4, false) => "ldr_w0,_[x0]".to_string(),
            _ => "ldr_x0,_[x0]".to_string(),
        })
    }

    fn store_value(&self, size: u32, at: Provenance) -> Result<String> {
        check_size(self.architecture(), size, at)?;
        Ok(match size {
            1 => "strb_w0,_[x1]".to_string(),
            2 => "strh_w0,_[x1]".to_string(),
            4 => "str_w0,_[x1]".to_string(),
            _ => "str_x0,_[x1]".to_string(),
        })
    }

    fn load_immediate(&self, value: i64) -> String {
        format!("mov_x0,_#{value}")
    }

    fn load_local_address(&self, depth: i32) -> String {
        format!("add_x0,_x29,_#{depth}")
    }

    fn load_global_address(&self, label: &str) -> String {
        format!("adr_x0,_GLOBAL_{label}")
    }

    fn load_label_address(&self, label: &str) -> String {
        format!("adr_x0,_{label}")
    }

    fn binary_op(&self, op: ArithOp, is_signed: bool) -> String {
        match (op, is_signed) {
            (ArithOp::Add, _) => "add_x0,_x0,_x1".to_string(),
            (ArithOp::Sub, _) => "sub_x0,_x0,_x1".to_string(),
            (ArithOp::Mul, _) => "mul_x0,_x0,_x1".to_string(),
            (ArithOp::Div, true) => "sdiv_x0,_x0,_x1".to_string(),
            (ArithOp::Div, false) => "udiv_x0,_x0,_x1".to_string(),
            (ArithOp::Mod, true) => "sdiv_x2,_x0,_x1\nmsub_x0,_x2,_x1,_x0".to_string(),
            (ArithOp::Mod, false) => "udiv_x2,_x0,_x1\nmsub_x0,_x2,_x1,_x0".to_string(),
            (ArithOp::Shl, _) => "lsl_x0,_x0,_x1".to_string(),
            (ArithOp::Shr, true) => "asr_x0,_x0,_x1".to_string(),
            (ArithOp::Shr, false) => "lsr_x0,_x0,_x1".to_string(),
            (ArithOp::BitAnd, _) | (ArithOp::LogAnd, _) => "and_x0,_x0,_x1".to_string(),
            (ArithOp::BitOr, _) | (ArithOp::LogOr, _) => "orr_x0,_x0,_x1".to_string(),
            (ArithOp::BitXor, _) => "eor_x0,_x0,_x1".to_string(),
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
        format!("cmp_x0,_x1\ncset_x0,_{cond}")
    }

    fn unary_negate(&self) -> String {
        "neg_x0,_x0".to_string()
    }

    fn unary_not(&self) -> String {
        "cmp_x0,_#0\ncset_x0,_eq".to_string()
    }

    fn bitwise_not(&self) -> String {
        "mvn_x0,_x0".to_string()
    }

    fn jump(&self, label: &str) -> String {
        format!("b_{label}")
    }

    fn jump_if_zero(&self, label: &str) -> String {
        format!("cbz_x0,_{label}")
    }

    fn jump_if_not_zero(&self, label: &str) -> String {
        format!("cbnz_x0,_{label}")
    }

    fn call(&self, label: &str) -> String {
        format!("bl_{label}")
    }

    fn call_prologue(&self, _stack_arg_words: u32) -> String {
        "stp_x29,_x30,_[sp,_#-16]!\nmov_x29,_sp".to_string()
    }

    fn call_epilogue(&self, _stack_arg_words: u32) -> String {
        "ldp_x29,_x30,_[sp],_#16".to_string()
    }

    fn return_instruction(&self) -> String {
        "ret".to_string()
    }
}
