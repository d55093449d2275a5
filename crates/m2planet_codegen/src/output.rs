//! The three-section output model (spec.md §3, §6, §9): code, globals, and
//! strings, assembled in that order and terminated by `:STACK`.
//!
//! The source compiler cons-es each section onto a head-first linked list
//! and reverses it once at the end. Per spec.md §9's Design Notes, an
//! append-only buffer is equivalent and simpler; what must be preserved is
//! the section order and the terminal label, not the intermediate
//! representation.

use std::fmt::Write as _;

/// Accumulates the program's three output sections as parsing proceeds.
#[derive(Debug, Default)]
pub struct OutputSections {
    code: String,
    globals: String,
    strings: String,
}

impl OutputSections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one line of emitted instruction or label text to the code
    /// section.
    pub fn push_code(&mut self, line: &str) {
        let _ = writeln!(self.code, "{line}");
    }

    /// Appends one line (a `GLOBAL_name:` label or a data directive) to
    /// the globals section.
    pub fn push_global(&mut self, line: &str) {
        let _ = writeln!(self.globals, "{line}");
    }

    /// Appends one line (a `STRING_func_n:` label or a quoted byte run) to
    /// the strings section.
    pub fn push_string(&mut self, line: &str) {
        let _ = writeln!(self.strings, "{line}");
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn globals(&self) -> &str {
        &self.globals
    }

    pub fn strings(&self) -> &str {
        &self.strings
    }

    /// Renders the final output file: the three labeled sections in order,
    /// followed by the terminal `:STACK` label (spec.md §6).
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# Core program");
        out.push_str(&self.code);
        let _ = writeln!(out, "\n# Program global variables");
        out.push_str(&self.globals);
        let _ = writeln!(out, "\n# Program strings");
        out.push_str(&self.strings);
        let _ = writeln!(out, "\n:STACK");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_sections_in_order_terminated_by_stack() {
        let mut out = OutputSections::new();
        out.push_code(":FUNCTION_main");
        out.push_global("GLOBAL_g:");
        out.push_string("STRING_main_0:");

        let rendered = out.render();
        let code_pos = rendered.find("# Core program").unwrap();
        let globals_pos = rendered.find("# Program global variables").unwrap();
        let strings_pos = rendered.find("# Program strings").unwrap();
        let stack_pos = rendered.find(":STACK").unwrap();

        assert!(code_pos < globals_pos);
        assert!(globals_pos < strings_pos);
        assert!(strings_pos < stack_pos);
        assert!(rendered.contains(":FUNCTION_main"));
        assert!(rendered.contains("GLOBAL_g:"));
        assert!(rendered.contains("STRING_main_0:"));
    }

    #[test]
    fn empty_sections_still_render_the_skeleton() {
        let out = OutputSections::new();
        let rendered = out.render();
        assert!(rendered.ends_with(":STACK\n"));
    }
}
