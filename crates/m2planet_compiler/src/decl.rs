//! `type_name` and the top-level `program` loop (spec.md §4.2, §4.5):
//! struct/union/typedef declarations, global variables, and function
//! prototypes/definitions.

use m2planet_base::{CompileError, Provenance, Result, Symbol};
use m2planet_codegen::StackDirection;
use m2planet_lexer::escape;
use m2planet_types::TypeId;

use crate::function::SymbolEntry;
use crate::state::{FunctionSignature, ParserState};
use crate::stmt::block;

/// 1 MiB, the cap spec.md §4.5/§7 places on a global array's byte size.
const MAX_ARRAY_BYTES: i64 = 1 << 20;

/// `type_name` (spec.md §4.2): optional `struct`/`union`/type-name
/// identifier, `*` repetitions, and (in this context only) an array form
/// that decays to a pointer of the element type.
pub fn type_name(state: &mut ParserState) -> Result<TypeId> {
    let base = base_type_name(state)?;
    let mut ty = base;
    while state.eat("*") {
        ty = state.types.pointer_to(ty, state.word_size());
    }
    if state.eat("[") {
        let at = state.current_provenance();
        // An array spelled in a type-name position decays to a pointer, per
        // spec.md §4.2; the element count (if present) is irrelevant here.
        if !state.at("]") {
            parse_array_length(state, at)?;
        }
        state.expect("]")?;
        ty = state.types.pointer_to(ty, state.word_size());
    }
    Ok(ty)
}

/// The `struct`/`union`/plain-identifier head of a `type_name`, without
/// the trailing `*`/`[]` forms. An unknown name is registered as a
/// forward-declared aggregate shell (spec.md §4.2: "an unknown name
/// triggers a typedef / struct forward").
fn base_type_name(state: &mut ParserState) -> Result<TypeId> {
    if state.eat("struct") || state.eat("union") {
        let (name, _) = state.expect_identifier()?;
        let id = state.types.lookup_type(name).unwrap_or_else(|| state.types.add_aggregate(name));
        if state.at("{") {
            parse_aggregate_body(state, id)?;
        }
        Ok(id)
    } else {
        let (name, ident_at) = state.expect_identifier()?;
        state
            .types
            .lookup_type(name)
            .ok_or_else(|| CompileError::new(format!("unknown type '{}'", state.symbol_name(name)), ident_at))
    }
}

/// `{ <type> member ; ... }` immediately following a `struct`/`union` tag.
fn parse_aggregate_body(state: &mut ParserState, aggregate: TypeId) -> Result<()> {
    state.expect("{")?;
    while !state.eat("}") {
        let field_ty = type_name(state)?;
        let (field_name, _) = state.expect_identifier()?;
        state.types.add_member(aggregate, field_name, field_ty);
        state.expect(";")?;
    }
    Ok(())
}

fn parse_array_length(state: &mut ParserState, at: Provenance) -> Result<i64> {
    let tok = state.advance().ok_or_else(|| CompileError::new("expected array length", at))?;
    let n: i64 = tok
        .text
        .parse()
        .map_err(|_| CompileError::new(format!("malformed array length '{}'", tok.text), at))?;
    if n < 0 {
        return Err(CompileError::new("array length cannot be negative", at));
    }
    Ok(n)
}

/// `program` (spec.md §4.5): the top-level declaration loop.
pub fn program(state: &mut ParserState) -> Result<()> {
    while !state.at_eof() {
        top_level_declaration(state)?;
    }
    Ok(())
}

fn top_level_declaration(state: &mut ParserState) -> Result<()> {
    if state.eat("CONSTANT") {
        return parse_constant(state);
    }
    if state.eat("typedef") {
        return parse_typedef(state);
    }
    if state.at("enum") {
        return parse_enum(state);
    }
    let ty = type_name(state)?;
    let (name, at) = state.expect_identifier()?;

    if state.at("(") {
        return parse_function(state, ty, name);
    }
    if state.eat("[") {
        return parse_global_array(state, ty, name, at);
    }
    if state.eat("=") {
        return parse_global_initialized(state, ty, name, at);
    }
    state.expect(";")?;
    state.globals.insert(name, ty);
    state.out.push_global(&format!("GLOBAL_{}:", state.symbol_name(name)));
    for _ in 0..word_count(state, ty) {
        state.out.push_global("NULL");
    }
    Ok(())
}

/// `CONSTANT name value` or `CONSTANT name sizeof(type)` (spec.md §4.5).
fn parse_constant(state: &mut ParserState) -> Result<()> {
    let (name, at) = state.expect_identifier()?;
    let value = if state.eat("sizeof") {
        state.expect("(")?;
        let ty = type_name(state)?;
        state.expect(")")?;
        state.types.get(ty).size as i64
    } else {
        let tok = state.advance().ok_or_else(|| CompileError::new("expected constant value", at))?;
        tok.text
            .parse()
            .map_err(|_| CompileError::new(format!("malformed constant value '{}'", tok.text), at))?
    };
    state.constants.insert(name, value);
    Ok(())
}

/// `typedef src dst ;` (spec.md §4.5): `mirror_type` shallow-aliases.
fn parse_typedef(state: &mut ParserState) -> Result<()> {
    let src = type_name(state)?;
    let (dst_name, _) = state.expect_identifier()?;
    state.expect(";")?;
    state.types.mirror_type(src, dst_name);
    Ok(())
}

/// `enum [tag] { name [= value] , ... } ;` (spec.md §6: "enum as integer
/// constants"). The restricted grammar has no enum *type*, only the
/// members: each one is registered exactly like a `CONSTANT`, its value
/// defaulting to one past the previous member's (starting at zero), or
/// to an explicit `= value` override that also re-bases the members that
/// follow it. A bare tag identifier before `{`, if present, is consumed
/// and discarded — nothing downstream ever names the enum itself.
fn parse_enum(state: &mut ParserState) -> Result<()> {
    state.expect("enum")?;
    if !state.at("{") {
        state.expect_identifier()?;
    }
    state.expect("{")?;
    let mut next_value: i64 = 0;
    loop {
        let (name, at) = state.expect_identifier()?;
        let value = if state.eat("=") {
            let tok = state.advance().ok_or_else(|| CompileError::new("expected enum value", at))?;
            tok.text
                .parse()
                .map_err(|_| CompileError::new(format!("malformed enum value '{}'", tok.text), at))?
        } else {
            next_value
        };
        state.constants.insert(name, value);
        next_value = value + 1;
        if state.eat(",") {
            if state.at("}") {
                break;
            }
            continue;
        }
        break;
    }
    state.expect("}")?;
    state.expect(";")?;
    Ok(())
}

pub(crate) fn word_count(state: &ParserState, ty: TypeId) -> u32 {
    let size = state.types.get(ty).size.max(1);
    let word = state.word_size();
    (size + word - 1) / word
}

/// `<type> name [count] ;`: a global static array, capped at 1 MiB
/// (spec.md §4.5/§7).
fn parse_global_array(state: &mut ParserState, ty: TypeId, name: Symbol, at: Provenance) -> Result<()> {
    let count = parse_array_length(state, at)?;
    state.expect("]")?;
    state.expect(";")?;
    let elem_size = state.types.get(ty).size as i64;
    let total_bytes = count * elem_size;
    if total_bytes > MAX_ARRAY_BYTES {
        return Err(CompileError::new(format!("array length {total_bytes} exceeds the 1 MiB limit"), at));
    }
    let array_ty = state.types.pointer_to(ty, state.word_size());
    state.globals.insert(name, array_ty);
    state.array_globals.insert(name);
    state.out.push_global(&format!("GLOBAL_{}:", state.symbol_name(name)));
    for _ in 0..total_bytes {
        state.out.push_global("00");
    }
    Ok(())
}

/// `<type> name = value ;`: an initialized global, either an integer
/// literal (padded to word width) or a string literal (emitted under
/// `GLOBAL_name_contents`, with `GLOBAL_name` holding its address).
fn parse_global_initialized(state: &mut ParserState, ty: TypeId, name: Symbol, at: Provenance) -> Result<()> {
    use m2planet_lexer::TokenKind;

    let tok = state.peek().cloned().ok_or_else(|| CompileError::new("expected initializer", at))?;
    match tok.kind {
        TokenKind::String => {
            state.advance();
            let bytes = escape::decode_escapes(&tok.text);
            state.expect(";")?;
            let contents_label = format!("GLOBAL_{}_contents", state.symbol_name(name));
            state.out.push_global(&format!("GLOBAL_{}:", state.symbol_name(name)));
            state.out.push_global(&format!("&{contents_label}"));
            state.out.push_string(&format!(":{contents_label}"));
            state.out.push_string(&quote_bytes(&bytes));
            let char_ty = lookup_primitive(state, "char");
            let ptr = state.types.pointer_to(char_ty, state.word_size());
            state.globals.insert(name, ptr);
            Ok(())
        }
        _ => {
            let value_tok = state.advance().ok_or_else(|| CompileError::new("expected initializer", at))?;
            let value: i64 = value_tok
                .text
                .parse()
                .map_err(|_| CompileError::new(format!("malformed initializer '{}'", value_tok.text), at))?;
            state.expect(";")?;
            state.globals.insert(name, ty);
            state.out.push_global(&format!("GLOBAL_{}:", state.symbol_name(name)));
            state.out.push_global(&value.to_string());
            for _ in 1..word_count(state, ty) {
                state.out.push_global("NULL");
            }
            Ok(())
        }
    }
}

fn quote_bytes(bytes: &[u8]) -> String {
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
    quoted
}

fn lookup_primitive(state: &mut ParserState, name: &str) -> TypeId {
    let sym = state.interner.intern(name);
    state.types.lookup_type(sym).expect("primitive types are always registered")
}

/// `<type> name ( args ) ;` or `{ body }` (spec.md §4.5): prototype or
/// definition. A definition emits `FUNCTION_name:`, binds arguments to
/// frame offsets mirroring the locals policy from the opposite side of
/// the frame, parses the body, then emits a trailing return if needed.
fn parse_function(state: &mut ParserState, return_ty: TypeId, name: Symbol) -> Result<()> {
    state.expect("(")?;
    let mut arg_types = Vec::new();
    let mut arg_names = Vec::new();
    if !state.at(")") {
        loop {
            let ty = type_name(state)?;
            let (arg_name, _) = state.expect_identifier()?;
            arg_types.push(ty);
            arg_names.push(arg_name);
            if state.eat(",") {
                continue;
            }
            break;
        }
    }
    state.expect(")")?;

    state.functions.insert(
        name,
        FunctionSignature {
            return_type: return_ty,
            arg_types: arg_types.clone(),
        },
    );

    if state.eat(";") {
        return Ok(());
    }

    if state.is_main(name) && state.arch == m2planet_codegen::Architecture::KnightNative && !arg_names.is_empty() {
        return Err(CompileError::new("main takes no arguments on knight-native", state.current_provenance()));
    }

    let mut record = state.new_function_record(name);
    bind_arguments(state, &mut record, &arg_types, &arg_names);
    state.current_function = Some(record);
    state.last_statement_returned = false;

    let label = state.backend.function_label(state.symbol_name(name));
    log::debug!("emitting function {} as label {label:?}", state.symbol_name(name));
    state.out.push_code(&label);
    state.out.push_code(&state.backend.call_prologue(arg_names.len() as u32));

    block(state)?;

    if !state.last_statement_returned {
        emit_return_sequence(state)?;
    }

    state.current_function = None;
    Ok(())
}

/// Arguments sit on the opposite side of the frame pointer from locals,
/// above the saved frame pointer and return address pushed by the
/// callee's own prologue. The last-declared argument (pushed last by the
/// caller, per spec.md §3's "reverse declaration order") sits closest to
/// the frame; earlier arguments sit progressively farther out.
fn bind_arguments(state: &ParserState, record: &mut crate::function::FunctionRecord, arg_types: &[TypeId], arg_names: &[Symbol]) {
    let word = state.word_size() as i32;
    let (base, delta) = match state.backend.stack_direction() {
        StackDirection::Downward => (2 * word, word),
        StackDirection::Upward => (-2 * word, -word),
    };
    let n = arg_names.len();
    for (i, (&name, &ty)) in arg_names.iter().zip(arg_types.iter()).enumerate() {
        let depth = base + delta * (n - 1 - i) as i32;
        record.arguments.push((name, SymbolEntry { ty, depth }));
    }
}

/// `return` walks the entire current function's locals and pops one word
/// each before the architecture's return instruction (spec.md §4.4); this
/// is the function trailer's version of that same sequence, used when the
/// body doesn't already end with an explicit `return`.
pub fn emit_return_sequence(state: &mut ParserState) -> Result<()> {
    let local_words = state
        .current_function
        .as_ref()
        .map(|f| f.locals.iter().map(|(_, e)| word_count(state, e.ty)).sum::<u32>())
        .unwrap_or(0);
    // Cleanup pops must not land in primary — it already holds the return
    // value expression() just computed.
    for _ in 0..local_words {
        state.out.push_code(&state.backend.pop_secondary());
    }
    state.out.push_code(&state.backend.call_epilogue(0));
    state.out.push_code(&state.backend.return_instruction());
    Ok(())
}

#[cfg(test)]
mod tests {
    use m2planet_base::Interner;
    use m2planet_codegen::Architecture;
    use m2planet_lexer::tokenize;

    use super::*;

    #[test]
    fn type_name_resolves_pointer_chain() {
        let mut interner = Interner::new();
        let tokens = tokenize("int * *", "t.c", &mut interner).expect("lex");
        let mut state = ParserState::new(tokens, interner, Architecture::Amd64, false);
        let ty = type_name(&mut state).expect("type_name parses");
        let once = state.types.get(ty).indirect.expect("pointer to pointer");
        let twice = state.types.get(once).indirect.expect("pointer to int");
        let int_sym = state.interner.intern("int");
        assert_eq!(state.types.get(twice).name, int_sym);
    }

    #[test]
    fn constant_sizeof_registers_value() {
        let mut interner = Interner::new();
        let tokens = tokenize("CONSTANT WORD sizeof(int) int x;", "t.c", &mut interner).expect("lex");
        let mut state = ParserState::new(tokens, interner, Architecture::Amd64, false);
        program(&mut state).expect("program parses");
        let sym = state.interner.intern("WORD");
        assert_eq!(state.constants.get(&sym), Some(&4));
    }

    #[test]
    fn enum_members_default_to_sequential_values() {
        let mut interner = Interner::new();
        let tokens = tokenize("enum { RED, GREEN, BLUE }; int x;", "t.c", &mut interner).expect("lex");
        let mut state = ParserState::new(tokens, interner, Architecture::Amd64, false);
        program(&mut state).expect("program parses");
        let red = state.interner.intern("RED");
        let green = state.interner.intern("GREEN");
        let blue = state.interner.intern("BLUE");
        assert_eq!(state.constants.get(&red), Some(&0));
        assert_eq!(state.constants.get(&green), Some(&1));
        assert_eq!(state.constants.get(&blue), Some(&2));
    }

    #[test]
    fn enum_explicit_value_rebases_following_members() {
        let mut interner = Interner::new();
        let tokens = tokenize("enum Color { RED = 5, GREEN, BLUE = 10, YELLOW }; int x;", "t.c", &mut interner).expect("lex");
        let mut state = ParserState::new(tokens, interner, Architecture::Amd64, false);
        program(&mut state).expect("program parses");
        let get = |state: &ParserState, name: &str| *state.constants.get(&state.interner.lookup(name).unwrap()).unwrap();
        assert_eq!(get(&state, "RED"), 5);
        assert_eq!(get(&state, "GREEN"), 6);
        assert_eq!(get(&state, "BLUE"), 10);
        assert_eq!(get(&state, "YELLOW"), 11);
    }
}
