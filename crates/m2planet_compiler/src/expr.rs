//! The expression grammar (spec.md §4.3): primary/postfix/tier recursion,
//! the common-recursion two-operand protocol, and assignment lowering.
//!
//! ## Address vs. value
//!
//! Every sub-expression that can be an lvalue (a plain identifier, `*p`,
//! `a[i]`, `a.m`, `a->m`) is parsed down to an [`Operand::Address`]: its
//! address sits in the primary register, but the final size/sign-aware
//! load has been *deferred*, not emitted. Every tier that sees an operator
//! it must act on calls [`materialize`] first, which emits the load and
//! turns the operand into a plain [`Operand::Value`]. If nothing ever
//! forces a materialization, the deferred address surfaces all the way up
//! to [`expression`], which is exactly the case that matters: `a = 5`
//! never loads `a`'s current value, `&a` never loads it either, and `a[i]
//! += 1` loads it exactly once, after checking whether what follows `[i]`
//! is a compound-assignment operator.
//!
//! ## Primary/secondary pairing
//!
//! [`m2planet_codegen::Backend::binary_op`]/`comparison`/`compound_operation`
//! are all written assuming the primary register holds the *left* operand
//! and the secondary register holds the *right* one (visible e.g. in the
//! RISC-V backend's asymmetric `Gt`/`Le`/`Ge` templates, which only make
//! sense under that assumption). A left-to-right single-pass emitter
//! naturally produces the opposite pairing after one push/pop (the most
//! recently evaluated operand ends up in primary). [`pair_left_right`]
//! fixes this with one extra stack round-trip — push, evaluate, push,
//! pop/pop — using only the three stack primitives every backend already
//! exposes, rather than adding a fourth "move" primitive to the trait.

use m2planet_base::{CompileError, Provenance, Result, Symbol};
use m2planet_codegen::{ArithOp, CompareOp};
use m2planet_lexer::escape;
use m2planet_types::TypeId;

use crate::decl::type_name;
use crate::state::{ParserState, ResolvedIdentifier};

/// A parsed sub-expression: a deferred lvalue address, an already-computed
/// value, or a bare function name awaiting a call's `(args)` (this
/// restricted grammar has no function pointers, so a function name that
/// never gets called is simply unrepresentable past this point).
enum Operand {
    Address(TypeId),
    Value(TypeId),
    Callable(Symbol, TypeId),
}

/// Emits the deferred load for `operand` if it is still an address,
/// turning it into a value. A no-op if it already is one.
fn materialize(state: &mut ParserState, operand: Operand, at: Provenance) -> Result<TypeId> {
    match operand {
        Operand::Value(ty) => Ok(ty),
        Operand::Address(ty) => {
            let t = state.types.get(ty);
            let (size, is_signed) = (t.size, t.is_signed);
            let line = state.backend.load_value(size, is_signed, at)?;
            state.out.push_code(&line);
            Ok(ty)
        }
        Operand::Callable(name, return_ty) => {
            let label = format!("FUNCTION_{}", state.symbol_name(name));
            state.out.push_code(&state.backend.load_label_address(&label));
            Ok(state.types.pointer_to(return_ty, state.word_size()))
        }
    }
}

/// After this call, primary holds `first`'s value and secondary holds
/// whatever `compute_second` leaves in primary when it returns. See the
/// module doc for why this needs two pushes, not one.
fn pair_left_right(state: &mut ParserState, compute_second: impl FnOnce(&mut ParserState) -> Result<TypeId>) -> Result<TypeId> {
    state.out.push_code(&state.backend.push_primary());
    let second_ty = compute_second(state)?;
    state.out.push_code(&state.backend.push_primary());
    state.out.push_code(&state.backend.pop_secondary());
    state.out.push_code(&state.backend.pop_primary());
    Ok(second_ty)
}

/// Widens/selects the result type of a binary operation the way spec.md
/// §4.3 describes: "scanning for either operand's name (or its `indirect`
/// or `indirect->indirect`)". Pointer arithmetic keeps the pointer type;
/// otherwise the wider (or, on a tie, the left) operand's type wins.
fn promote(state: &ParserState, left: TypeId, right: TypeId) -> TypeId {
    let l = state.types.get(left);
    let r = state.types.get(right);
    if l.indirect.is_some() {
        left
    } else if r.indirect.is_some() {
        right
    } else if r.size > l.size {
        right
    } else {
        left
    }
}

fn int_type(state: &mut ParserState) -> TypeId {
    let sym = state.interner.intern("int");
    state.types.lookup_type(sym).expect("int is always registered")
}

fn char_type(state: &mut ParserState) -> TypeId {
    let sym = state.interner.intern("char");
    state.types.lookup_type(sym).expect("char is always registered")
}

// ---------------------------------------------------------------------
// primary_expr
// ---------------------------------------------------------------------

/// `primary_expr` (spec.md §4.3): literals, parenthesized sub-expressions,
/// `sizeof`, the unary operators, and identifier/dereference forms. Hands
/// off to [`postfix_expr`] once a base operand is in hand, since postfix
/// chaining applies uniformly to every primary form.
fn primary_expr(state: &mut ParserState) -> Result<Operand> {
    let at = state.current_provenance();
    match state.peek_text() {
        "&" => {
            state.advance();
            let inner = primary_expr(state)?;
            match inner {
                Operand::Address(ty) => {
                    let ptr = state.types.pointer_to(ty, state.word_size());
                    Ok(Operand::Value(ptr))
                }
                Operand::Value(_) | Operand::Callable(..) => {
                    Err(CompileError::new("cannot take the address of a non-lvalue expression", at))
                }
            }
        }
        "-" => {
            state.advance();
            let inner = primary_expr(state)?;
            let ty = materialize(state, inner, at)?;
            state.out.push_code(&state.backend.unary_negate());
            Ok(Operand::Value(ty))
        }
        "!" => {
            state.advance();
            let inner = primary_expr(state)?;
            materialize(state, inner, at)?;
            state.out.push_code(&state.backend.unary_not());
            Ok(Operand::Value(int_type(state)))
        }
        "~" => {
            state.advance();
            let inner = primary_expr(state)?;
            let ty = materialize(state, inner, at)?;
            state.out.push_code(&state.backend.bitwise_not());
            Ok(Operand::Value(ty))
        }
        "*" => {
            state.advance();
            let inner = primary_expr(state)?;
            let ptr_ty = materialize(state, inner, at)?;
            let pointee = state.types.get(ptr_ty).indirect.unwrap_or(ptr_ty);
            Ok(Operand::Address(pointee))
        }
        "sizeof" => {
            state.advance();
            state.expect("(")?;
            let ty = type_name(state)?;
            state.expect(")")?;
            let size = state.types.get(ty).size as i64;
            state.out.push_code(&state.backend.load_immediate(size));
            Ok(Operand::Value(int_type(state)))
        }
        "(" => {
            state.advance();
            let inner = expression(state)?;
            state.expect(")")?;
            Ok(Operand::Value(inner))
        }
        _ => primary_literal_or_identifier(state, at),
    }
}

/// Parses a numeric token's text as decimal, `0x`-hex, or `0`-octal,
/// matching the integer literal forms a restricted-C lexer hands the
/// parser as one undifferentiated `Number` token.
pub(crate) fn parse_integer_literal(text: &str) -> Option<i64> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()
    } else if text.len() > 1 && text.starts_with('0') {
        i64::from_str_radix(&text[1..], 8).ok()
    } else {
        text.parse().ok()
    }
}

fn primary_literal_or_identifier(state: &mut ParserState, at: Provenance) -> Result<Operand> {
    use m2planet_lexer::TokenKind;

    let tok = state.peek().cloned().ok_or_else(|| state.error("unexpected end of input in expression"))?;
    match tok.kind {
        TokenKind::Number => {
            state.advance();
            let value = parse_integer_literal(&tok.text)
                .ok_or_else(|| CompileError::new(format!("malformed integer literal '{}'", tok.text), at))?;
            state.out.push_code(&state.backend.load_immediate(value));
            Ok(Operand::Value(int_type(state)))
        }
        TokenKind::Char => {
            state.advance();
            let value = escape::decode_char_literal(&tok.text);
            state.out.push_code(&state.backend.load_immediate(value));
            Ok(Operand::Value(char_type(state)))
        }
        TokenKind::String => {
            state.advance();
            let mut raw = tok.text.clone();
            while state.peek().map(|t| t.kind == TokenKind::String).unwrap_or(false) {
                raw.push_str(&state.advance().unwrap().text);
            }
            let bytes = escape::decode_escapes(&raw);
            let label = emit_string_literal(state, &bytes)?;
            state.out.push_code(&state.backend.load_label_address(&label));
            let char_ty = char_type(state);
            let ptr = state.types.pointer_to(char_ty, state.word_size());
            Ok(Operand::Value(ptr))
        }
        TokenKind::Identifier if tok.text.starts_with(':') => Err(CompileError::new("unexpected label in expression context", at)),
        TokenKind::Identifier => {
            let (name, at) = state.expect_identifier()?;
            load_identifier(state, name, at)
        }
        _ => Err(CompileError::new(format!("unexpected token '{}' in expression", tok.text), at)),
    }
}

/// Registers `bytes` as `STRING_<funcname>_<n>` in the strings section and
/// returns the label (spec.md §4.1's string-adjacency/label rule).
fn emit_string_literal(state: &mut ParserState, bytes: &[u8]) -> Result<String> {
    let func_name = state
        .current_function
        .as_ref()
        .map(|f| state.interner.resolve(f.name).to_string())
        .unwrap_or_else(|| "global".to_string());
    let n = state.current_function_mut().map(|f| f.next_string_counter()).unwrap_or(0);
    let label = format!("STRING_{func_name}_{n}");
    state.out.push_string(&format!(":{label}"));
    let mut quoted = String::from("\"");
    for &b in bytes {
        if b == b'"' || b == b'\\' {
            quoted.push('\\');
            quoted.push(b as char);
        } else if (0x20..0x7f).contains(&b) {
            quoted.push(b as char);
        } else {
            quoted.push_str(&format!("\\x{b:02x}"));
        }
    }
    quoted.push('"');
    state.out.push_string(&quoted);
    Ok(label)
}

/// `primary_expr`'s identifier lookup order (spec.md §4.3): constants,
/// locals, arguments, global functions, global symbols.
fn load_identifier(state: &mut ParserState, name: Symbol, at: Provenance) -> Result<Operand> {
    match state.resolve_identifier(name) {
        Some(ResolvedIdentifier::Constant(value)) => {
            state.out.push_code(&state.backend.load_immediate(value));
            Ok(Operand::Value(int_type(state)))
        }
        Some(ResolvedIdentifier::Local(entry)) | Some(ResolvedIdentifier::Argument(entry)) => {
            state.out.push_code(&state.backend.load_local_address(entry.depth));
            Ok(Operand::Address(entry.ty))
        }
        Some(ResolvedIdentifier::Function(sig)) => Ok(Operand::Callable(name, sig.return_type)),
        Some(ResolvedIdentifier::Global(ty)) => {
            let label = state.symbol_name(name).to_string();
            state.out.push_code(&state.backend.load_global_address(&label));
            if state.array_globals.contains(&name) {
                // `GLOBAL_name` already addresses the array's own storage,
                // so the identifier decays straight to that address rather
                // than being read as a pointer stored there.
                Ok(Operand::Value(ty))
            } else {
                Ok(Operand::Address(ty))
            }
        }
        None => Err(CompileError::new(format!("undefined symbol '{}'", state.symbol_name(name)), at)),
    }
}

// ---------------------------------------------------------------------
// postfix_expr
// ---------------------------------------------------------------------

/// `postfix_expr` / `postfix_expr_stub` (spec.md §4.3): `[expr]`,
/// `->member`, `.member`, and `(args)`, each re-examining the next token
/// once applied so the chain keeps extending (`a.b[i]->c(x)`).
fn postfix_expr(state: &mut ParserState) -> Result<Operand> {
    let mut operand = primary_expr(state)?;
    loop {
        match state.peek_text() {
            "[" => {
                let at = state.current_provenance();
                state.advance();
                let ptr_ty = materialize(state, operand, at)?;
                let elem_ty = state.types.get(ptr_ty).indirect.unwrap_or(ptr_ty);
                let elem_size = state.types.get(elem_ty).size as i64;
                // pair_left_right leaves primary=ptr, secondary=scaled index; the
                // scaling happens inside compute_second, before the second push, so
                // the multiply never touches the pointer sitting in secondary.
                pair_left_right(state, |state| {
                    expression(state)?; // primary = raw index
                    state.out.push_code(&state.backend.push_primary());
                    state.out.push_code(&state.backend.load_immediate(elem_size));
                    state.out.push_code(&state.backend.pop_secondary()); // secondary = raw index
                    state.out.push_code(&state.backend.binary_op(ArithOp::Mul, true)); // primary = index * elem_size
                    Ok(elem_ty)
                })?;
                state.expect("]")?;
                state.out.push_code(&state.backend.binary_op(ArithOp::Add, true));
                operand = Operand::Address(elem_ty);
            }
            "." => {
                let at = state.current_provenance();
                if state.bootstrap_mode {
                    return Err(CompileError::new("'.' member access is not accepted in --bootstrap-mode", at));
                }
                state.advance();
                let (member_name, _) = state.expect_identifier()?;
                let base_ty = match operand {
                    Operand::Address(ty) => ty,
                    Operand::Value(_) | Operand::Callable(..) => {
                        return Err(CompileError::new("'.' requires an addressable struct/union value", at))
                    }
                };
                let member = state
                    .types
                    .lookup_member(base_ty, member_name)
                    .ok_or_else(|| CompileError::new(format!("struct has no member '{}'", state.symbol_name(member_name)), at))?;
                let offset = state.types.get(member).offset as i64;
                if offset != 0 {
                    // primary already holds the struct's own address (never
                    // materialized, since a struct value is addressed, not loaded).
                    pair_left_right(state, |state| {
                        state.out.push_code(&state.backend.load_immediate(offset));
                        Ok(member)
                    })?;
                    state.out.push_code(&state.backend.binary_op(ArithOp::Add, false));
                }
                operand = Operand::Address(member);
            }
            "->" => {
                let at = state.current_provenance();
                state.advance();
                let (member_name, _) = state.expect_identifier()?;
                let ptr_ty = materialize(state, operand, at)?;
                let base_ty = state.types.get(ptr_ty).indirect.unwrap_or(ptr_ty);
                let member = state
                    .types
                    .lookup_member(base_ty, member_name)
                    .ok_or_else(|| CompileError::new(format!("struct has no member '{}'", state.symbol_name(member_name)), at))?;
                let offset = state.types.get(member).offset as i64;
                if offset != 0 {
                    pair_left_right(state, |state| {
                        state.out.push_code(&state.backend.load_immediate(offset));
                        Ok(member)
                    })?;
                    state.out.push_code(&state.backend.binary_op(ArithOp::Add, false));
                }
                operand = Operand::Address(member);
            }
            "(" => {
                operand = Operand::Value(call_expr(state, operand)?);
            }
            _ => break,
        }
    }
    Ok(operand)
}

/// `(args)` (spec.md §4.3/§4.5): only a bare function name can be called —
/// this grammar's `Backend::call` takes a label, not a register, so there
/// is no way to express an indirect call through a computed address.
/// Arguments are pushed left to right and popped back off by the caller
/// once the call returns (see DESIGN.md's calling-convention note); the
/// callee's own frame layout expects them in that same pushed order,
/// closest-to-return-address last.
fn call_expr(state: &mut ParserState, callee: Operand) -> Result<TypeId> {
    let at = state.current_provenance();
    let (name, return_ty) = match callee {
        Operand::Callable(name, return_ty) => (name, return_ty),
        _ => return Err(CompileError::new("only a plain function name can be called", at)),
    };
    state.expect("(")?;
    let mut arg_count = 0u32;
    if !state.at(")") {
        loop {
            expression(state)?;
            state.out.push_code(&state.backend.push_primary());
            arg_count += 1;
            if state.eat(",") {
                continue;
            }
            break;
        }
    }
    state.expect(")")?;
    let label = format!("FUNCTION_{}", state.symbol_name(name));
    state.out.push_code(&state.backend.call(&label));
    // The call result is sitting in primary; discard the pushed arguments
    // through secondary so cleanup never clobbers it.
    for _ in 0..arg_count {
        state.out.push_code(&state.backend.pop_secondary());
    }
    Ok(return_ty)
}

// ---------------------------------------------------------------------
// arithmetic / relational / bitwise tiers
// ---------------------------------------------------------------------

/// Generic left-associative tier: parses one higher-precedence operand,
/// then loops consuming same-tier operators, combining each with
/// [`pair_left_right`] before calling `combine`.
fn binary_tier(
    state: &mut ParserState,
    ops: &[&str],
    higher: fn(&mut ParserState) -> Result<Operand>,
    combine: fn(&mut ParserState, TypeId, TypeId, &str) -> Result<TypeId>,
) -> Result<Operand> {
    let first = higher(state)?;
    let mut left_ty = None;
    let mut left_operand = Some(first);
    loop {
        let op = match ops.iter().find(|&&o| state.at(o)) {
            Some(&o) => o,
            None => break,
        };
        let at = state.current_provenance();
        let ty = materialize(state, left_operand.take().unwrap(), at)?;
        left_ty = Some(ty);
        state.advance();
        let right_ty = pair_left_right(state, |state| {
            let rhs = higher(state)?;
            materialize(state, rhs, at)
        })?;
        let result_ty = combine(state, left_ty.unwrap(), right_ty, op)?;
        left_operand = Some(Operand::Value(result_ty));
    }
    Ok(left_operand.unwrap())
}

fn arith_combine(state: &mut ParserState, left: TypeId, right: TypeId, op_text: &str) -> Result<TypeId> {
    let op = ArithOp::from_operator(op_text).expect("tier only calls with its own operator set");
    let result_ty = promote(state, left, right);
    let signed = state.types.get(result_ty).is_signed;
    state.out.push_code(&state.backend.binary_op(op, signed));
    Ok(result_ty)
}

fn compare_combine(state: &mut ParserState, left: TypeId, right: TypeId, op_text: &str) -> Result<TypeId> {
    let op = CompareOp::from_operator(op_text).expect("tier only calls with its own operator set");
    let operand_ty = promote(state, left, right);
    let signed = state.types.get(operand_ty).is_signed;
    state.out.push_code(&state.backend.comparison(op, signed));
    Ok(int_type(state))
}

fn tier_mul(state: &mut ParserState) -> Result<Operand> {
    binary_tier(state, &["*", "/", "%"], unary_as_operand, arith_combine)
}

fn unary_as_operand(state: &mut ParserState) -> Result<Operand> {
    postfix_expr(state)
}

fn tier_add(state: &mut ParserState) -> Result<Operand> {
    binary_tier(state, &["+", "-"], tier_mul, arith_combine)
}

fn tier_shift(state: &mut ParserState) -> Result<Operand> {
    binary_tier(state, &["<<", ">>"], tier_add, arith_combine)
}

fn tier_relational(state: &mut ParserState) -> Result<Operand> {
    binary_tier(state, &["<=", ">=", "<", ">", "==", "!="], tier_shift, compare_combine)
}

fn tier_bitwise(state: &mut ParserState) -> Result<Operand> {
    binary_tier(state, &["&&", "||", "&", "|", "^"], tier_relational, arith_combine)
}

// ---------------------------------------------------------------------
// expression = bitwise_expr (assign_op expression)?
// ---------------------------------------------------------------------

const COMPOUND_OPS: &[&str] = &["+=", "-=", "*=", "/=", "%=", "<<=", ">>=", "&=", "^=", "|="];

/// Top-level `expression` (spec.md §4.3): a bitwise_expr that may be
/// followed by `=` or one of the ten compound-assignment operators. This
/// is the only place assignment can appear in the grammar, which is what
/// makes the deferred-address `Operand` scheme sound: nothing below this
/// function ever needs to *un*-load a value it already materialized.
pub fn expression(state: &mut ParserState) -> Result<TypeId> {
    let operand = tier_bitwise(state)?;
    if state.at("=") {
        let at = state.current_provenance();
        let ty = match operand {
            Operand::Address(ty) => ty,
            Operand::Value(_) | Operand::Callable(..) => return Err(CompileError::new("left side of '=' is not assignable", at)),
        };
        state.advance();
        lower_simple_assignment(state, ty, at)
    } else if let Some(&op) = COMPOUND_OPS.iter().find(|&&o| state.at(o)) {
        let at = state.current_provenance();
        let ty = match operand {
            Operand::Address(ty) => ty,
            Operand::Value(_) | Operand::Callable(..) => {
                return Err(CompileError::new(format!("left side of '{op}' is not assignable"), at))
            }
        };
        if state.bootstrap_mode {
            return Err(CompileError::new("compound assignment is not accepted in --bootstrap-mode", at));
        }
        state.advance();
        lower_compound_assignment(state, ty, op, at)
    } else {
        materialize(state, operand, state.current_provenance())
    }
}

/// Simple `lhs = rhs`: the lhs address is already in primary (deferred);
/// stash it, evaluate the rhs into primary, pop the address into
/// secondary, and store (spec.md §4.3 "Assignment lowering").
fn lower_simple_assignment(state: &mut ParserState, ty: TypeId, at: Provenance) -> Result<TypeId> {
    state.out.push_code(&state.backend.push_primary());
    expression(state)?;
    state.out.push_code(&state.backend.pop_secondary());
    let size = state.types.get(ty).size;
    let line = state.backend.store_value(size, at)?;
    state.out.push_code(&line);
    Ok(ty)
}

/// `lhs OP= rhs` (spec.md §4.3/§9): push address, load current value,
/// evaluate rhs, pair them so primary=current/secondary=rhs (matching the
/// backends' left/right convention), combine, then store through the
/// address popped back off the stack.
fn lower_compound_assignment(state: &mut ParserState, ty: TypeId, op_text: &str, at: Provenance) -> Result<TypeId> {
    let op = ArithOp::from_compound_operator(op_text)
        .ok_or_else(|| CompileError::new(format!("'{op_text}' is not a valid compound-assignment operator"), at))?;
    let (size, is_signed) = {
        let t = state.types.get(ty);
        (t.size, t.is_signed)
    };
    state.out.push_code(&state.backend.push_primary()); // stash address
    let line = state.backend.load_value(size, is_signed, at)?;
    state.out.push_code(&line); // primary = current value
    pair_left_right(state, |state| expression(state))?; // primary=current, secondary=rhs
    let line = state.backend.compound_operation(op, is_signed, at)?;
    state.out.push_code(&line);
    state.out.push_code(&state.backend.pop_secondary()); // secondary = address
    let line = state.backend.store_value(size, at)?;
    state.out.push_code(&line);
    Ok(ty)
}

#[cfg(test)]
mod tests {
    use m2planet_base::Interner;
    use m2planet_codegen::Architecture;
    use m2planet_lexer::tokenize;

    use super::*;
    use crate::state::ParserState;

    fn eval(source: &str) -> (String, ParserState) {
        let mut interner = Interner::new();
        let tokens = tokenize(source, "t.c", &mut interner).expect("lex");
        let mut state = ParserState::new(tokens, interner, Architecture::Amd64, false);
        expression(&mut state).expect("expr parses");
        (state.out.code().to_string(), state)
    }

    #[test]
    fn number_literal_loads_immediate() {
        let (code, _) = eval("42");
        assert!(code.contains("$42"));
    }

    #[test]
    fn addition_pushes_and_pops_around_rhs() {
        let (code, _) = eval("1 + 2");
        assert!(code.contains("push"));
        assert!(code.contains("add"));
    }

    #[test]
    fn assignment_to_number_is_rejected() {
        let mut interner = Interner::new();
        let tokens = tokenize("1 = 2", "t.c", &mut interner).expect("lex");
        let mut state = ParserState::new(tokens, interner, Architecture::Amd64, false);
        let err = expression(&mut state).unwrap_err();
        assert!(err.message.contains("not assignable"));
    }

    #[test]
    fn global_array_indexing_decays_the_name_to_an_address_without_an_extra_load() {
        let mut interner = Interner::new();
        let tokens = tokenize("a[0]", "t.c", &mut interner).expect("lex");
        let mut state = ParserState::new(tokens, interner, Architecture::Amd64, false);
        let int_ty = int_type(&mut state);
        let ptr_ty = state.types.pointer_to(int_ty, state.word_size());
        let a_sym = state.interner.intern("a");
        state.globals.insert(a_sym, ptr_ty);
        state.array_globals.insert(a_sym);

        expression(&mut state).expect("expr parses");
        let code = state.out.code().to_string();
        // Exactly one load: the final read of a[0] itself. A second
        // occurrence would mean the array's own address was read as if it
        // were a pointer variable's stored value first.
        let loads = code.matches("movslq_(%rax),%rax").count();
        assert_eq!(loads, 1, "expected exactly one element load in:\n{code}");
    }

    #[test]
    fn dot_member_access_is_rejected_in_bootstrap_mode() {
        let mut interner = Interner::new();
        let tokens = tokenize("p.x", "t.c", &mut interner).expect("lex");
        let mut state = ParserState::new(tokens, interner, Architecture::Amd64, true);

        let int_ty = int_type(&mut state);
        let point_sym = state.interner.intern("struct Point");
        let point_ty = state.types.add_aggregate(point_sym);
        let x_sym = state.interner.intern("x");
        state.types.add_member(point_ty, x_sym, int_ty);

        let main_sym = state.interner.intern("main");
        let mut record = state.new_function_record(main_sym);
        let p_sym = state.interner.intern("p");
        record.locals.push((p_sym, crate::function::SymbolEntry { ty: point_ty, depth: record.depth_snapshot() }));
        state.current_function = Some(record);

        let err = expression(&mut state).unwrap_err();
        assert!(err.message.contains("--bootstrap-mode"));
    }
}
