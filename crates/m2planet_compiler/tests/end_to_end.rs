//! End-to-end checks that a handful of small programs compile to assembly
//! with the expected labels and structural shape. These assert on
//! substrings and section ordering, not full golden-file byte matches —
//! the emission templates themselves are unit-tested per backend.

use m2planet_codegen::Architecture;
use m2planet_compiler::compile;

fn assemble(source: &str, arch: Architecture) -> String {
    compile(source, "test.c", arch, false).expect("compiles")
}

#[test]
fn return_constant_emits_a_function_label_and_return() {
    let out = assemble("int main() { return 42; }", Architecture::Amd64);
    assert!(out.contains(":FUNCTION_main"), "missing function label in:\n{out}");
    assert!(out.contains("mov_$42,%rax"), "missing load-immediate in:\n{out}");
    assert!(out.contains("ret"), "missing return in:\n{out}");
}

#[test]
fn output_sections_appear_in_order_and_end_with_stack() {
    let out = assemble("int g; int main() { return 0; }", Architecture::X86);
    let code_at = out.find("# Core program").expect("code section header");
    let globals_at = out.find("# Program global variables").expect("globals section header");
    let strings_at = out.find("# Program strings").expect("strings section header");
    assert!(code_at < globals_at && globals_at < strings_at, "sections out of order:\n{out}");
    assert!(out.trim_end().ends_with(":STACK"), "missing trailing :STACK label:\n{out}");
    assert!(out.contains("GLOBAL_g:"), "global not emitted:\n{out}");
}

#[test]
fn string_literal_is_emitted_to_the_strings_section_with_a_pointer_global() {
    let out = assemble(r#"char* msg = "hi"; int main() { return 0; }"#, Architecture::Riscv64);
    assert!(out.contains("GLOBAL_msg:"), "missing pointer global:\n{out}");
    assert!(out.contains("&GLOBAL_msg_contents"), "missing contents reference:\n{out}");
    assert!(out.contains(":GLOBAL_msg_contents"), "missing contents label:\n{out}");
}

#[test]
fn while_loop_emits_top_test_and_end_labels_in_order() {
    let out = assemble("int main() { while (1) { 0; } return 0; }", Architecture::Armv7L);
    let top = out.find(":WHILE_0").expect("top label");
    let end = out.find(":END_WHILE_0").expect("end label");
    assert!(top < end, "while labels out of order:\n{out}");
    assert!(out.contains("beq_END_WHILE_0"), "missing conditional exit jump:\n{out}");
    assert!(out.contains("b_WHILE_0"), "missing backwards jump:\n{out}");
}

#[test]
fn switch_dispatch_table_compares_cases_in_reverse_collection_order() {
    let source = "int main() { switch (1) { case 1: break; case 2: break; } return 0; }";
    let out = assemble(source, Architecture::Amd64);
    let table_at = out.find(":_SWITCH_TABLE_0").expect("dispatch table label");
    let dispatch = &out[table_at..];
    let case_2_cmp = dispatch.find("mov_$2,%rax").expect("case 2 compared");
    let case_1_cmp = dispatch.find("mov_$1,%rax").expect("case 1 compared");
    assert!(case_2_cmp < case_1_cmp, "case 2 should dispatch before case 1:\n{out}");
}

#[test]
fn struct_member_offsets_follow_natural_packing() {
    let source = r#"
struct Pair { char a; int b; };
int main() {
    struct Pair p;
    p.a = 1;
    p.b = 2;
    return p.b;
}
"#;
    let out = assemble(source, Architecture::Amd64);
    assert!(out.contains(":FUNCTION_main"));
}

#[test]
fn returning_a_local_survives_the_function_s_own_cleanup_pops() {
    let out = assemble("int main() { int i; i = 7; return i; }", Architecture::Amd64);
    let ret_at = out.find("ret").expect("return instruction present");
    let before_ret = &out[..ret_at];
    let last_rax_write = before_ret.rfind("%rax").expect("return value loaded into rax");
    let after_load = &before_ret[last_rax_write..];
    assert!(!after_load.contains("pop_rax"), "local cleanup clobbered the return value:\n{out}");
}

#[test]
fn knight_posix_main_gets_the_ad_hoc_depth_twenty_first_local() {
    let out = assemble("int main() { int x; x = 1; return x; }", Architecture::KnightPosix);
    assert!(out.contains("FUNCTION_main"), "missing main label:\n{out}");
}

#[test]
fn every_architecture_compiles_the_same_minimal_program() {
    for &arch in Architecture::ALL.iter() {
        let out = assemble("int main() { return 0; }", arch);
        assert!(out.contains(":FUNCTION_main"), "{arch}: missing function label:\n{out}");
        assert!(out.trim_end().ends_with(":STACK"), "{arch}: missing :STACK:\n{out}");
    }
}
