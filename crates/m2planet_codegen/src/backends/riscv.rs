//! 32- and 64-bit RISC-V backends. Downward-growing stack; `a0`/`a1`
//! primary/secondary. The two widths share every template except the word
//! size and the handful of instructions RISC-V spells differently across
//! `rv32i`/`rv64i` (`div`/`divw`, etc.).

use m2planet_base::{Provenance, Result};

use crate::architecture::{Architecture, StackDirection};
use crate::backend::{check_size, Backend};
use crate::ops::{ArithOp, CompareOp};

pub struct RiscvBackend {
    pub is_64: bool,
}

impl RiscvBackend {
    fn word_suffix(&self) -> &'static str {
        if self.is_64 {
            "w"
        } else {
            ""
        }
    }
}

impl Backend for RiscvBackend {
    fn architecture(&self) -> Architecture {
        if self.is_64 {
            Architecture::Riscv64
        } else {
            Architecture::Riscv32
        }
    }

    fn registers(&self) -> (&'static str, &'static str) {
        ("a0", "a1")
    }

    fn first_local_depth(&self) -> i32 {
        -(self.word_size() as i32)
    }

    fn local_depth_delta(&self) -> i32 {
        -(self.word_size() as i32)
    }

    fn stack_direction(&self) -> StackDirection {
        StackDirection::Downward
    }

    fn push_primary(&self) -> String {
        if self.is_64 {
            "sd_a0,_0(sp)\naddi_sp,_sp,_-8".to_string()
        } else {
            "sw_a0,_0(sp)\naddi_sp,_sp,_-4".to_string()
        }
    }

    fn pop_primary(&self) -> String {
        if self.is_64 {
            "addi_sp,_sp,_8\nld_a0,_-8(sp)".to_string()
        } else {
            "addi_sp,_sp,_4\nlw_a0,_-4(sp)".to_string()
        }
    }

    fn pop_secondary(&self) -> String {
        if self.is_64 {
            "addi_sp,_sp,_8\nld_a1,_-8(sp)".to_string()
        } else {
            "addi_sp,_sp,_4\nlw_a1,_-4(sp)".to_string()
        }
    }

    fn load_value(&self, size: u32, is_signed: bool, at: Provenance) -> Result<String> {
        check_size(self.architecture(), size, at)?;
        let reg = if self.is_64 { "a0" } else { "a0" };
        Ok(match (size, is_signed) {
            (1, true) => format!("lb_{reg},_0({reg})"),
            (1, false) => format!("lbu_{reg},_0({reg})"),
            (2, true) => format!("lh_{reg},_0({reg})"),
            (2, false) => format!("lhu_{reg},_0({reg})"),
            (4, true) if self.is_64 => format!("lw_{reg},_0({reg})"),
            (4, false) if self.is_64 => format!("lwu_{reg},_0({reg})"),
            _ => format!("l{}_{reg},_0({reg})", if self.is_64 { "d" } else { "w" }),
        })
    }

    fn store_value(&self, size: u32, at: Provenance) -> Result<String> {
        check_size(self.architecture(), size, at)?;
        Ok(match size {
            1 => "sb_a0,_0(a1)".to_string(),
            2 => "sh_a0,_0(a1)".to_string(),
            4 if self.is_64 => "sw_a0,_0(a1)".to_string(),
            _ => format!("s{}_a0,_0(a1)", if self.is_64 { "d" } else { "w" }),
        })
    }

    fn load_immediate(&self, value: i64) -> String {
        format!("li_a0,_{value}")
    }

    fn load_local_address(&self, depth: i32) -> String {
        format!("addi_a0,_s0,_{depth}")
    }

    fn load_global_address(&self, label: &str) -> String {
        format!("la_a0,_GLOBAL_{label}")
    }

    fn load_label_address(&self, label: &str) -> String {
        format!("la_a0,_{label}")
    }

    fn binary_op(&self, op: ArithOp, is_signed: bool) -> String {
        let w = self.word_suffix();
        match (op, is_signed) {
            (ArithOp::Add, _) => format!("add{w}_a0,_a0,_a1"),
            (ArithOp::Sub, _) => format!("sub{w}_a0,_a0,_a1"),
            (ArithOp::Mul, _) => format!("mul{w}_a0,_a0,_a1"),
            (ArithOp::Div, true) => format!("div{w}_a0,_a0,_a1"),
            (ArithOp::Div, false) => format!("divu{w}_a0,_a0,_a1"),
            (ArithOp::Mod, true) => format!("rem{w}_a0,_a0,_a1"),
            (ArithOp::Mod, false) => format!("remu{w}_a0,_a0,_a1"),
            (ArithOp::Shl, _) => format!("sll{w}_a0,_a0,_a1"),
            (ArithOp::Shr, true) => format!("sra{w}_a0,_a0,_a1"),
            (ArithOp::Shr, false) => format!("srl{w}_a0,_a0,_a1"),
            (ArithOp::BitAnd, _) | (ArithOp::LogAnd, _) => "and_a0,_a0,_a1".to_string(),
            (ArithOp::BitOr, _) | (ArithOp::LogOr, _) => "or_a0,_a0,_a1".to_string(),
            (ArithOp::BitXor, _) => "xor_a0,_a0,_a1".to_string(),
        }
    }

    fn comparison(&self, op: CompareOp, is_signed: bool) -> String {
        match op {
            CompareOp::Lt if is_signed => "slt_a0,_a0,_a1".to_string(),
            CompareOp::Lt => "sltu_a0,_a0,_a1".to_string(),
            CompareOp::Gt if is_signed => "slt_a0,_a1,_a0".to_string(),
            CompareOp::Gt => "sltu_a0,_a1,_a0".to_string(),
            CompareOp::Le if is_signed => "slt_a0,_a1,_a0\nxori_a0,_a0,_1".to_string(),
            CompareOp::Le => "sltu_a0,_a1,_a0\nxori_a0,_a0,_1".to_string(),
            CompareOp::Ge if is_signed => "slt_a0,_a0,_a1\nxori_a0,_a0,_1".to_string(),
            CompareOp::Ge => "sltu_a0,_a0,_a1\nxori_a0,_a0,_1".to_string(),
            CompareOp::Eq => "xor_a0,_a0,_a1\nsltiu_a0,_a0,_1".to_string(),
            CompareOp::Ne => "xor_a0,_a0,_a1\nsltu_a0,_zero,_a0".to_string(),
        }
    }

    fn unary_negate(&self) -> String {
        "neg_a0,_a0".to_string()
    }

    fn unary_not(&self) -> String {
        "seqz_a0,_a0".to_string()
    }

    fn bitwise_not(&self) -> String {
        "not_a0,_a0".to_string()
    }

    fn jump(&self, label: &str) -> String {
        format!("j_{label}")
    }

    fn jump_if_zero(&self, label: &str) -> String {
        format!("beqz_a0,_{label}")
    }

    fn jump_if_not_zero(&self, label: &str) -> String {
        format!("bnez_a0,_{label}")
    }

    fn call(&self, label: &str) -> String {
        format!("call_{label}")
    }

    fn call_prologue(&self, _stack_arg_words: u32) -> String {
        let w = self.word_size() as i32;
        if self.is_64 {
            format!("addi_sp,_sp,_-16\nsd_ra,_8(sp)\nsd_s0,_0(sp)\naddi_s0,_sp,_{}", w * 2)
        } else {
            format!("addi_sp,_sp,_-8\nsw_ra,_4(sp)\nsw_s0,_0(sp)\naddi_s0,_sp,_{}", w * 2)
        }
    }

    fn call_epilogue(&self, _stack_arg_words: u32) -> String {
        if self.is_64 {
            "ld_ra,_8(sp)\nld_s0,_0(sp)\naddi_sp,_sp,_16".to_string()
        } else {
            "lw_ra,_4(sp)\nlw_s0,_0(sp)\naddi_sp,_sp,_8".to_string()
        }
    }

    fn return_instruction(&self) -> String {
        "ret".to_string()
    }
}
