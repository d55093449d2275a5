//! 32-bit x86 backend. Downward-growing stack; `eax`/`ebx` primary/secondary.

use m2planet_base::{Provenance, Result};

use crate::architecture::{Architecture, StackDirection};
use crate::backend::{check_size, Backend};
use crate::ops::{ArithOp, CompareOp};

pub struct X86Backend;

impl Backend for X86Backend {
    fn architecture(&self) -> Architecture {
        Architecture::X86
    }

    fn registers(&self) -> (&'static str, &'static str) {
        ("eax", "ebx")
    }

    fn first_local_depth(&self) -> i32 {
        -8
    }

    fn local_depth_delta(&self) -> i32 {
        -(self.word_size() as i32)
    }

    fn stack_direction(&self) -> StackDirection {
        StackDirection::Downward
    }

    fn push_primary(&self) -> String {
        "push_eax".to_string()
    }

    fn pop_primary(&self) -> String {
        "pop_eax".to_string()
    }

    fn pop_secondary(&self) -> String {
        "pop_ebx".to_string()
    }

    fn load_value(&self, size: u32, is_signed: bool, at: Provenance) -> Result<String> {
        check_size(self.architecture(), size, at)?;
        Ok(match (size, is_signed) {
            (1, true) => "movsbl_(%eax),%eax".to_string(),
            (1, false) => "movzbl_(%eax),%eax".to_string(),
            (2, true) => "movswl_(%eax),%eax".to_string(),
            (2, false) => "movzwl_(%eax),%eax".to_string(),
            _ => "mov_(%eax),%eax".to_string(),
        })
    }

    fn store_value(&self, size: u32, at: Provenance) -> Result<String> {
        check_size(self.architecture(), size, at)?;
        Ok(match size {
            1 => "mov_%al,(%ebx)".to_string(),
            2 => "mov_%ax,(%ebx)".to_string(),
            _ => "mov_%eax,(%ebx)".to_string(),
        })
    }

    fn load_immediate(&self, value: i64) -> String {
        format!("mov_${value},%eax")
    }

    fn load_local_address(&self, depth: i32) -> String {
        format!("lea_{depth}(%ebp),%eax")
    }

    fn load_global_address(&self, label: &str) -> String {
        format!("mov_$GLOBAL_{label},%eax")
    }

    fn load_label_address(&self, label: &str) -> String {
        format!("mov_${label},%eax")
    }

    fn binary_op(&self, op: ArithOp, is_signed: bool) -> String {
        match (op, is_signed) {
            (ArithOp::Add, _) => "add_%ebx,%eax".to_string(),
            (ArithOp::Sub, _) => "sub_%ebx,%eax".to_string(),
            (ArithOp::Mul, true) => "imul_%ebx,%eax".to_string(),
            (ArithOp::Mul, false) => "mul_%ebx".to_string(),
            (ArithOp::Div, true) => "cdq\nidiv_%ebx".to_string(),
            (ArithOp::Div, false) => "xor_%edx,%edx\ndiv_%ebx".to_string(),
            (ArithOp::Mod, true) => "cdq\nidiv_%ebx\nmov_%edx,%eax".to_string(),
            (ArithOp::Mod, false) => "xor_%edx,%edx\ndiv_%ebx\nmov_%edx,%eax".to_string(),
            (ArithOp::Shl, _) => "mov_%ebx,%ecx\nsal_%cl,%eax".to_string(),
            (ArithOp::Shr, true) => "mov_%ebx,%ecx\nsar_%cl,%eax".to_string(),
            (ArithOp::Shr, false) => "mov_%ebx,%ecx\nshr_%cl,%eax".to_string(),
            (ArithOp::BitAnd, _) | (ArithOp::LogAnd, _) => "and_%ebx,%eax".to_string(),
            (ArithOp::BitOr, _) | (ArithOp::LogOr, _) => "or_%ebx,%eax".to_string(),
            (ArithOp::BitXor, _) => "xor_%ebx,%eax".to_string(),
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
        format!("cmp_%ebx,%eax\n{set}_%al\nmovzbl_%al,%eax")
    }

    fn unary_negate(&self) -> String {
        "neg_%eax".to_string()
    }

    fn unary_not(&self) -> String {
        "test_%eax,%eax\nsete_%al\nmovzbl_%al,%eax".to_string()
    }

    fn bitwise_not(&self) -> String {
        "not_%eax".to_string()
    }

    fn jump(&self, label: &str) -> String {
        format!("jmp_%{label}")
    }

    fn jump_if_zero(&self, label: &str) -> String {
        format!("test_%eax,%eax\nje_%{label}")
    }

    fn jump_if_not_zero(&self, label: &str) -> String {
        format!("test_%eax,%eax\njne_%{label}")
    }

    fn call(&self, label: &str) -> String {
        format!("call_%{label}")
    }

    fn call_prologue(&self, _stack_arg_words: u32) -> String {
        "push_%ebp\nmov_%esp,%ebp".to_string()
    }

    fn call_epilogue(&self, stack_arg_words: u32) -> String {
        format!("mov_%ebp,%esp\npop_%ebp\nadd_${},%esp", stack_arg_words * self.word_size())
    }

    fn return_instruction(&self) -> String {
        "ret".to_string()
    }
}
