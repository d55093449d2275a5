//! 64-bit AMD64 backend. Downward-growing stack; `rax`/`rbx`
//! primary/secondary.

use m2planet_base::{Provenance, Result};

use crate::architecture::{Architecture, StackDirection};
use crate::backend::{check_size, Backend};
use crate::ops::{ArithOp, CompareOp};

pub struct Amd64Backend;

impl Backend for Amd64Backend {
    fn architecture(&self) -> Architecture {
        Architecture::Amd64
    }

    fn registers(&self) -> (&'static str, &'static str) {
        ("rax", "rbx")
    }

    fn first_local_depth(&self) -> i32 {
        -16
    }

    fn local_depth_delta(&self) -> i32 {
        -(self.word_size() as i32)
    }

    fn stack_direction(&self) -> StackDirection {
        StackDirection::Downward
    }

    fn push_primary(&self) -> String {
        "push_rax".to_string()
    }

    fn pop_primary(&self) -> String {
        "pop_rax".to_string()
    }

    fn pop_secondary(&self) -> String {
        "pop_rbx".to_string()
    }

    fn load_value(&self, size: u32, is_signed: bool, at: Provenance) -> Result<String> {
        check_size(self.architecture(), size, at)?;
        Ok(match (size, is_signed) {
            (1, true) => "movsbq_(%rax),%rax".to_string(),
            (1, false) => "movzbq_(%rax),%rax".to_string(),
            (2, true) => "movswq_(%rax),%rax".to_string(),
            (2, false) => "movzwq_(%rax),%rax".to_string(),
            (4, true) => "movslq_(%rax),%rax".to_string(),
            (4, false) => "mov_(%eax),%eax".to_string(),
            _ => "mov_(%rax),%rax".to_string(),
        })
    }

    fn store_value(&self, size: u32, at: Provenance) -> Result<String> {
        check_size(self.architecture(), size, at)?;
        Ok(match size {
            1 => "mov_%al,(%rbx)".to_string(),
            2 => "mov_%ax,(%rbx)".to_string(),
            4 => "mov_%eax,(%rbx)".to_string(),
            _ => "mov_%rax,(%rbx)".to_string(),
        })
    }

    fn load_immediate(&self, value: i64) -> String {
        format!("mov_${value},%rax")
    }

    fn load_local_address(&self, depth: i32) -> String {
        format!("lea_{depth}(%rbp),%rax")
    }

    fn load_global_address(&self, label: &str) -> String {
        format!("lea_GLOBAL_{label}(%rip),%rax")
    }

    fn load_label_address(&self, label: &str) -> String {
        format!("lea_{label}(%rip),%rax")
    }

    fn binary_op(&self, op: ArithOp, is_signed: bool) -> String {
        match (op, is_signed) {
            (ArithOp::Add, _) => "add_%rbx,%rax".to_string(),
            (ArithOp::Sub, _) => "sub_%rbx,%rax".to_string(),
            (ArithOp::Mul, true) => "imul_%rbx,%rax".to_string(),
            (ArithOp::Mul, false) => "mul_%rbx".to_string(),
            (ArithOp::Div, true) => "cqto\nidiv_%rbx".to_string(),
            (ArithOp::Div, false) => "xor_%rdx,%rdx\ndiv_%rbx".to_string(),
            (ArithOp::Mod, true) => "cqto\nidiv_%rbx\nmov_%rdx,%rax".to_string(),
            (ArithOp::Mod, false) => "xor_%rdx,%rdx\ndiv_%rbx\nmov_%rdx,%rax".to_string(),
            (ArithOp::Shl, _) => "mov_%rbx,%rcx\nsal_%cl,%rax".to_string(),
            (ArithOp::Shr, true) => "mov_%rbx,%rcx\nsar_%cl,%rax".to_string(),
            (ArithOp::Shr, false) => "mov_%rbx,%rcx\nshr_%cl,%rax".to_string(),
            (ArithOp::BitAnd, _) | (ArithOp::LogAnd, _) => "and_%rbx,%rax".to_string(),
            (ArithOp::BitOr, _) | (ArithOp::LogOr, _) => "or_%rbx,%rax".to_string(),
            (ArithOp::BitXor, _) => "xor_%rbx,%rax".to_string(),
        }
    }

    fn comparison(&self, op: CompareOp, _is_signed: bool) -> String {
        let set = match op {
            CompareOp::Lt => "setl",
            CompareOp::Le => "setle",
            CompareOp::Gt => "setg",
            CompareOp::Ge => "setge",
            CompareOp::Eq => "sete",
            CompareOp::Ne => "setne",
        };
        format!("cmp_%rbx,%rax\n{set}_%al\nmovzbq_%al,%rax")
    }

    fn unary_negate(&self) -> String {
        "neg_%rax".to_string()
    }

    fn unary_not(&self) -> String {
        "test_%rax,%rax\nsete_%al\nmovzbq_%al,%rax".to_string()
    }

    fn bitwise_not(&self) -> String {
        "not_%rax".to_string()
    }

    fn jump(&self, label: &str) -> String {
        format!("jmp_%{label}")
    }

    fn jump_if_zero(&self, label: &str) -> String {
        format!("test_%rax,%rax\nje_%{label}")
    }

    fn jump_if_not_zero(&self, label: &str) -> String {
        format!("test_%rax,%rax\njne_%{label}")
    }

    fn call(&self, label: &str) -> String {
        format!("call_%{label}")
    }

    fn call_prologue(&self, _stack_arg_words: u32) -> String {
        "push_%rbp\nmov_%rsp,%rbp".to_string()
    }

    fn call_epilogue(&self, _stack_arg_words: u32) -> String {
        "mov_%rbp,%rsp\npop_%rbp".to_string()
    }

    fn return_instruction(&self) -> String {
        "ret".to_string()
    }
}
