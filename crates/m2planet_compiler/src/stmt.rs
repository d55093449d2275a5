//! The statement grammar (spec.md §4.4): blocks, local declarations, and
//! the control-flow constructs' label/jump state machines.

use m2planet_base::{CompileError, Result};
use m2planet_codegen::CompareOp;
use m2planet_lexer::TokenKind;

use crate::control::{BreakFrame, CaseList};
use crate::decl::{emit_return_sequence, type_name, word_count};
use crate::expr::{expression, parse_integer_literal};
use crate::function::SymbolEntry;
use crate::state::ParserState;

/// `{ ... }` (spec.md §4.4): snapshots the locals list and the depth
/// allocator on entry; on a normal (non-`return`) exit, reclaims the
/// block's own locals' stack words with one pop each and restores both
/// snapshots, so a sibling block's locals can reuse the same depths.
pub fn block(state: &mut ParserState) -> Result<()> {
    state.expect("{")?;
    let (locals_start, depth_start) = {
        let f = state.current_function_mut()?;
        (f.locals.len(), f.depth_snapshot())
    };
    while !state.eat("}") {
        statement(state)?;
    }
    close_scope(state, locals_start, depth_start)
}

fn close_scope(state: &mut ParserState, locals_start: usize, depth_start: i32) -> Result<()> {
    if !state.last_statement_returned {
        let pop_words: u32 = state
            .current_function
            .as_ref()
            .map(|f| f.locals[locals_start..].iter().map(|(_, e)| word_count(state, e.ty)).sum())
            .unwrap_or(0);
        for _ in 0..pop_words {
            state.out.push_code(&state.backend.pop_primary());
        }
    }
    let f = state.current_function_mut()?;
    f.locals.truncate(locals_start);
    f.restore_depth(depth_start);
    Ok(())
}

/// `statement` (spec.md §4.4): dispatches on the next token.
pub fn statement(state: &mut ParserState) -> Result<()> {
    state.last_statement_returned = false;
    match state.peek_text() {
        "{" => return block(state),
        "if" => return if_statement(state),
        "while" => return while_statement(state),
        "do" => return do_statement(state),
        "for" => return for_statement(state),
        "switch" => return switch_statement(state),
        "asm" => return asm_statement(state),
        "goto" => return goto_statement(state),
        "return" => return return_statement(state),
        "break" => return break_statement(state),
        "continue" => return continue_statement(state),
        _ => {}
    }
    if let Some(tok) = state.peek() {
        if tok.kind == TokenKind::Identifier && tok.text.starts_with(':') {
            let label = tok.text[1..].to_string();
            state.advance();
            state.out.push_code(&format!(":{label}"));
            return Ok(());
        }
    }
    if starts_type(state) {
        return local_declaration(state);
    }
    expression(state)?;
    state.expect(";")?;
    Ok(())
}

/// Whether the upcoming token could only begin a `type_name` — used to
/// tell a local declaration apart from an expression statement, both of
/// which can start with a bare identifier.
fn starts_type(state: &mut ParserState) -> bool {
    if state.at("struct") || state.at("union") {
        return true;
    }
    let text = match state.peek() {
        Some(tok) if tok.kind == TokenKind::Identifier => tok.text.clone(),
        _ => return false,
    };
    let sym = state.interner.intern(&text);
    state.types.lookup_type(sym).is_some()
}

/// A local declaration (spec.md §4.4): reserves `ceil(size/word)` stack
/// slots by pushing the primary register that many times, then records
/// the symbol at the depth `FunctionRecord::reserve_local` hands back.
fn local_declaration(state: &mut ParserState) -> Result<()> {
    let ty = type_name(state)?;
    let (name, at) = state.expect_identifier()?;
    state.expect(";")?;
    if state.loop_depth > 0 {
        return Err(CompileError::new(
            "local declarations are not allowed inside a loop body",
            at,
        ));
    }
    let is_aggregate = state.types.get(ty).is_aggregate;
    let words = word_count(state, ty);
    let depth = state.current_function_mut()?.reserve_local(words, is_aggregate);
    for _ in 0..words {
        state.out.push_code(&state.backend.push_primary());
    }
    state.current_function_mut()?.locals.push((name, SymbolEntry { ty, depth }));
    Ok(())
}

fn next_label(state: &mut ParserState) -> Result<u32> {
    Ok(state.current_function_mut()?.next_label())
}

fn push_break_frame(state: &mut ParserState, break_label: String, continue_label: Option<String>) -> Result<()> {
    let (owning_function, locals_snapshot) = {
        let f = state
            .current_function
            .as_ref()
            .ok_or_else(|| CompileError::new("control-flow statement outside a function", state.current_provenance()))?;
        (f.name, f.locals.len())
    };
    state.break_stack.push(BreakFrame {
        break_label,
        continue_label,
        owning_function,
        locals_snapshot,
    });
    Ok(())
}

fn pop_break_frame(state: &mut ParserState) {
    state.break_stack.pop();
}

/// Parses one statement as a loop body with `loop_depth` raised, so a
/// local declaration anywhere inside it (however deeply nested under
/// further `if`/blocks) is rejected (spec.md §7).
fn loop_body(state: &mut ParserState) -> Result<()> {
    state.loop_depth += 1;
    let result = statement(state);
    state.loop_depth -= 1;
    result
}

/// **if**: unique-id N; test → jump to `ELSE_N` on zero; then-block;
/// jump to `_END_IF_N`; `:ELSE_N`; optional else-block; `:_END_IF_N`.
fn if_statement(state: &mut ParserState) -> Result<()> {
    state.advance();
    let n = next_label(state)?;
    state.expect("(")?;
    expression(state)?;
    state.expect(")")?;
    let else_label = format!("ELSE_{n}");
    let end_label = format!("_END_IF_{n}");
    state.out.push_code(&state.backend.jump_if_zero(&else_label));
    statement(state)?;
    state.out.push_code(&state.backend.jump(&end_label));
    state.out.push_code(&format!(":{else_label}"));
    if state.eat("else") {
        statement(state)?;
    }
    state.out.push_code(&format!(":{end_label}"));
    state.last_statement_returned = false;
    Ok(())
}

/// **while**: `:WHILE_N`; test → jump to `END_WHILE_N` on zero; body;
/// jump to `WHILE_N`; `:END_WHILE_N`.
fn while_statement(state: &mut ParserState) -> Result<()> {
    state.advance();
    let n = next_label(state)?;
    let top = format!("WHILE_{n}");
    let end = format!("END_WHILE_{n}");
    push_break_frame(state, end.clone(), Some(top.clone()))?;
    state.out.push_code(&format!(":{top}"));
    state.expect("(")?;
    expression(state)?;
    state.expect(")")?;
    state.out.push_code(&state.backend.jump_if_zero(&end));
    statement(state)?;
    state.out.push_code(&state.backend.jump(&top));
    state.out.push_code(&format!(":{end}"));
    pop_break_frame(state);
    state.last_statement_returned = false;
    Ok(())
}

/// **do**: `:DO_N`; body; `:DO_TEST_N`; test → jump to `DO_N` on
/// non-zero; `:DO_END_N`.
fn do_statement(state: &mut ParserState) -> Result<()> {
    state.advance();
    let n = next_label(state)?;
    let top = format!("DO_{n}");
    let test = format!("DO_TEST_{n}");
    let end = format!("DO_END_{n}");
    push_break_frame(state, end.clone(), Some(test.clone()))?;
    state.out.push_code(&format!(":{top}"));
    statement(state)?;
    state.out.push_code(&format!(":{test}"));
    state.expect("while")?;
    state.expect("(")?;
    expression(state)?;
    state.expect(")")?;
    state.expect(";")?;
    state.out.push_code(&state.backend.jump_if_not_zero(&top));
    state.out.push_code(&format!(":{end}"));
    pop_break_frame(state);
    state.last_statement_returned = false;
    Ok(())
}

/// **for**: init; `:FOR_N`; cond → jump to `FOR_END_N` on zero; jump to
/// `FOR_THEN_N`; `:FOR_ITER_N`; step; jump to `FOR_N`; `:FOR_THEN_N`;
/// body; jump to `FOR_ITER_N`; `:FOR_END_N`.
fn for_statement(state: &mut ParserState) -> Result<()> {
    state.advance();
    state.expect("(")?;
    let n = next_label(state)?;
    if !state.at(";") {
        expression(state)?;
    }
    state.expect(";")?;
    let top = format!("FOR_{n}");
    let end = format!("FOR_END_{n}");
    let iter = format!("FOR_ITER_{n}");
    let then = format!("FOR_THEN_{n}");
    push_break_frame(state, end.clone(), Some(iter.clone()))?;
    state.out.push_code(&format!(":{top}"));
    if !state.at(";") {
        expression(state)?;
        state.out.push_code(&state.backend.jump_if_zero(&end));
    }
    state.expect(";")?;
    state.out.push_code(&state.backend.jump(&then));
    state.out.push_code(&format!(":{iter}"));
    if !state.at(")") {
        expression(state)?;
    }
    state.expect(")")?;
    state.out.push_code(&state.backend.jump(&top));
    state.out.push_code(&format!(":{then}"));
    statement(state)?;
    state.out.push_code(&state.backend.jump(&iter));
    state.out.push_code(&format!(":{end}"));
    pop_break_frame(state);
    state.last_statement_returned = false;
    Ok(())
}

/// **switch** (spec.md §4.4): the scrutinee moves to the secondary
/// register; an unconditional jump skips the body and lands on the
/// dispatch table. Each `case V:`/`default:` inside the body becomes a
/// label at its own textual position, falling through to whatever
/// follows until an explicit `break`. The table, emitted after the whole
/// body, compares each collected case **in reverse collection order**
/// and falls back to `default:` (or straight to the end, if there wasn't
/// one) otherwise. `continue` has no meaning here, so the pushed break
/// frame carries no continue target.
fn switch_statement(state: &mut ParserState) -> Result<()> {
    state.advance();
    let n = next_label(state)?;
    state.expect("(")?;
    expression(state)?;
    state.expect(")")?;
    state.out.push_code(&state.backend.push_primary());
    state.out.push_code(&state.backend.pop_secondary());

    let table = format!("_SWITCH_TABLE_{n}");
    let end = format!("_SWITCH_END_{n}");
    let default = format!("_SWITCH_DEFAULT_{n}");
    state.out.push_code(&state.backend.jump(&table));

    push_break_frame(state, end.clone(), None)?;
    state.case_stack.push(CaseList::new());

    let mut saw_default = false;
    state.expect("{")?;
    while !state.eat("}") {
        if state.eat("case") {
            let at = state.current_provenance();
            let tok = state.advance().ok_or_else(|| CompileError::new("expected case value", at))?;
            let value = parse_integer_literal(&tok.text)
                .ok_or_else(|| CompileError::new(format!("malformed case value '{}'", tok.text), at))?;
            state.expect(":")?;
            let case_label = format!("_SWITCH_CASE_{value}_{n}");
            state.out.push_code(&format!(":{case_label}"));
            state.case_stack.last_mut().expect("pushed above").push(value, case_label);
        } else if state.eat("default") {
            state.expect(":")?;
            state.out.push_code(&format!(":{default}"));
            saw_default = true;
        } else {
            statement(state)?;
        }
    }

    state.out.push_code(&format!(":{table}"));
    let cases = state.case_stack.pop().expect("pushed above");
    for entry in cases.in_dispatch_order() {
        state.out.push_code(&state.backend.load_immediate(entry.value));
        state.out.push_code(&state.backend.comparison(CompareOp::Eq, true));
        state.out.push_code(&state.backend.jump_if_not_zero(&entry.label));
    }
    let fallback = if saw_default { default } else { end.clone() };
    state.out.push_code(&state.backend.jump(&fallback));
    state.out.push_code(&format!(":{end}"));
    pop_break_frame(state);
    state.last_statement_returned = false;
    Ok(())
}

/// `asm("..." , "...")`: each string operand's verbatim text (no escape
/// decoding, since it is raw target assembly, not a data byte string) is
/// emitted as its own code line.
fn asm_statement(state: &mut ParserState) -> Result<()> {
    state.advance();
    state.expect("(")?;
    loop {
        let at = state.current_provenance();
        let tok = state.advance().ok_or_else(|| CompileError::new("expected string literal in asm", at))?;
        if tok.kind != TokenKind::String {
            return Err(CompileError::new("asm(...) requires string literal operands", at));
        }
        state.out.push_code(&tok.text);
        if state.eat(",") {
            continue;
        }
        break;
    }
    state.expect(")")?;
    state.expect(";")?;
    Ok(())
}

fn goto_statement(state: &mut ParserState) -> Result<()> {
    state.advance();
    let (name, _) = state.expect_identifier()?;
    state.expect(";")?;
    let label = state.symbol_name(name).to_string();
    state.out.push_code(&state.backend.jump(&label));
    Ok(())
}

/// `return` walks the entire current function's locals, emits one pop
/// per word, then the architecture's return instruction (spec.md §4.4).
fn return_statement(state: &mut ParserState) -> Result<()> {
    state.advance();
    if !state.at(";") {
        expression(state)?;
    }
    state.expect(";")?;
    emit_return_sequence(state)?;
    state.last_statement_returned = true;
    Ok(())
}

fn break_statement(state: &mut ParserState) -> Result<()> {
    let at = state.current_provenance();
    state.advance();
    state.expect(";")?;
    let frame = state
        .break_stack
        .last()
        .cloned()
        .ok_or_else(|| CompileError::new("'break' outside a loop or switch", at))?;
    unwind_to(state, frame.locals_snapshot)?;
    state.out.push_code(&state.backend.jump(&frame.break_label));
    Ok(())
}

fn continue_statement(state: &mut ParserState) -> Result<()> {
    let at = state.current_provenance();
    state.advance();
    state.expect(";")?;
    let frame = state
        .break_stack
        .last()
        .cloned()
        .ok_or_else(|| CompileError::new("'continue' outside a loop", at))?;
    let continue_label = frame
        .continue_label
        .clone()
        .ok_or_else(|| CompileError::new("'continue' is not valid inside a switch", at))?;
    unwind_to(state, frame.locals_snapshot)?;
    state.out.push_code(&state.backend.jump(&continue_label));
    Ok(())
}

/// `break`/`continue` walk the locals list until reaching the
/// snapshotted break frame, emitting one pop per intervening local
/// (spec.md §4.4).
fn unwind_to(state: &mut ParserState, locals_snapshot: usize) -> Result<()> {
    let pop_count: u32 = {
        let f = state
            .current_function
            .as_ref()
            .ok_or_else(|| CompileError::new("control-flow statement outside a function", state.current_provenance()))?;
        f.locals[locals_snapshot..].iter().map(|(_, e)| word_count(state, e.ty)).sum()
    };
    for _ in 0..pop_count {
        state.out.push_code(&state.backend.pop_primary());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use m2planet_base::Interner;
    use m2planet_codegen::Architecture;
    use m2planet_lexer::tokenize;

    use super::*;

    fn ready_state(source: &str) -> ParserState {
        let mut interner = Interner::new();
        let tokens = tokenize(source, "t.c", &mut interner).expect("lex");
        let mut state = ParserState::new(tokens, interner, Architecture::Amd64, false);
        let main_sym = state.interner.intern("main");
        state.current_function = Some(state.new_function_record(main_sym));
        state
    }

    #[test]
    fn while_loop_emits_matching_labels() {
        let mut state = ready_state("while (1) { break; }");
        statement(&mut state).expect("while parses");
        let code = state.out.code().to_string();
        assert!(code.contains(":WHILE_0"));
        assert!(code.contains(":END_WHILE_0"));
        assert!(code.contains("END_WHILE_0"));
    }

    #[test]
    fn switch_dispatches_cases_in_reverse_order() {
        let mut state = ready_state("switch (1) { case 1: break; case 2: break; }");
        statement(&mut state).expect("switch parses");
        let code = state.out.code().to_string();
        let pos2 = code.find("_SWITCH_CASE_2_0").expect("case 2 label present");
        let pos1 = code.find("_SWITCH_CASE_1_0").expect("case 1 label present");
        let table_pos = code.find("_SWITCH_TABLE_0").expect("table present");
        // the table's own comparisons reference case 2 before case 1
        let dispatch_region = &code[table_pos..];
        assert!(dispatch_region.find("_SWITCH_CASE_2_0").unwrap() < dispatch_region.find("_SWITCH_CASE_1_0").unwrap());
        let _ = (pos1, pos2);
    }

    #[test]
    fn continue_inside_switch_is_rejected() {
        let mut state = ready_state("switch (1) { case 1: continue; }");
        let err = statement(&mut state).unwrap_err();
        assert!(err.message.contains("not valid inside a switch"));
    }

    #[test]
    fn block_reclaims_local_stack_words() {
        let mut state = ready_state("{ int x; }");
        statement(&mut state).expect("block parses");
        let code = state.out.code().to_string();
        assert_eq!(code.matches("push").count(), code.matches("pop").count());
        assert!(state.current_function.as_ref().unwrap().locals.is_empty());
    }
}
