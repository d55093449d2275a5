//! `ParserState`: the single mutable-reference state bag spec.md §9's
//! Design Notes asks for, gathering what the source keeps as process-scope
//! globals (`global_token`, `function`, `output_list`, `current_count`,
//! `break_*`, `continue_*`, …) into one struct threaded through every
//! parse function.

use std::collections::HashMap;

use m2planet_base::{CompileError, Interner, Provenance, Result, Symbol};
use m2planet_codegen::{backend, Architecture, Backend, OutputSections};
use m2planet_lexer::Token;
use m2planet_types::{TypeId, TypeRegistry, WORD_32, WORD_64};

use crate::control::{BreakFrame, CaseList};
use crate::function::{FunctionRecord, SymbolEntry};

/// A global function's declared signature, used to typecheck calls and to
/// resolve identifiers that name functions rather than variables (spec.md
/// §4.3 primary_expr's lookup order).
#[derive(Debug, Clone)]
pub struct FunctionSignature {
    pub return_type: TypeId,
    pub arg_types: Vec<TypeId>,
}

/// All parser/emitter state for one compilation, gathered into a single
/// struct per spec.md §9's "Global mutable state" Design Note. There are
/// no reentrant entry points and no concurrency (spec.md §5), so a plain
/// `&mut ParserState` threaded through recursive-descent calls is the
/// whole story.
pub struct ParserState {
    pub tokens: Vec<Token>,
    pub pos: usize,

    pub interner: Interner,
    pub types: TypeRegistry,
    pub arch: Architecture,
    pub backend: Box<dyn Backend>,
    pub out: OutputSections,
    pub bootstrap_mode: bool,

    pub constants: HashMap<Symbol, i64>,
    pub globals: HashMap<Symbol, TypeId>,
    /// Globals declared `<type> name[count];` (decl::parse_global_array).
    /// Its `GLOBAL_name` label already addresses the array's own storage,
    /// unlike an ordinary `<type>*` global whose label addresses a slot
    /// that *holds* a pointer — so loading an array identifier must yield
    /// its address directly rather than the value stored there.
    pub array_globals: std::collections::HashSet<Symbol>,
    pub functions: HashMap<Symbol, FunctionSignature>,

    pub current_function: Option<FunctionRecord>,
    pub break_stack: Vec<BreakFrame>,
    pub case_stack: Vec<CaseList>,

    /// Incremented around a `while`/`do`/`for` body, decremented on exit;
    /// a local declaration while this is nonzero is a semantic error
    /// (spec.md §7: the compiler cannot re-reserve stack per iteration).
    pub loop_depth: u32,

    /// Set by `stmt::statement` whenever the statement it just parsed was
    /// a `return`, cleared otherwise; `decl::parse_function` reads this
    /// after the body to decide whether a trailing return still needs to
    /// be synthesized.
    pub last_statement_returned: bool,

    main_symbol: Symbol,
}

impl ParserState {
    pub fn new(tokens: Vec<Token>, mut interner: Interner, arch: Architecture, bootstrap_mode: bool) -> Self {
        let word = if arch.is_64bit() { WORD_64 } else { WORD_32 };
        let types = TypeRegistry::with_primitives(&mut interner, word);
        let main_symbol = interner.intern("main");
        ParserState {
            tokens,
            pos: 0,
            interner,
            types,
            arch,
            backend: backend(arch),
            out: OutputSections::new(),
            bootstrap_mode,
            constants: HashMap::new(),
            globals: HashMap::new(),
            array_globals: std::collections::HashSet::new(),
            functions: HashMap::new(),
            current_function: None,
            break_stack: Vec::new(),
            case_stack: Vec::new(),
            loop_depth: 0,
            last_statement_returned: false,
            main_symbol,
        }
    }

    pub fn word_size(&self) -> u32 {
        self.arch.word_size()
    }

    // -- token cursor ------------------------------------------------------
    // "The token cursor is the sole shared resource among productions. It
    // advances monotonically ... every caller is expected to leave the
    // cursor positioned on the first token following its production"
    // (spec.md §5).

    pub fn at_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    pub fn peek_text(&self) -> &str {
        self.peek().map(|t| t.text.as_str()).unwrap_or("")
    }

    pub fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    pub fn current_provenance(&self) -> Provenance {
        self.peek()
            .map(|t| t.at)
            .or_else(|| self.tokens.last().map(|t| t.at))
            .unwrap_or_else(|| Provenance::new(Symbol::EMPTY, 0))
    }

    pub fn error(&self, message: impl Into<String>) -> CompileError {
        CompileError::new(message, self.current_provenance())
    }

    /// The "require match" helper of spec.md §5: advances past a required
    /// literal token or aborts. There is no rollback; the grammar is
    /// LL(1).
    pub fn expect(&mut self, literal: &str) -> Result<Token> {
        match self.peek() {
            Some(t) if t.text == literal => Ok(self.advance().unwrap()),
            Some(t) => Err(CompileError::new(
                format!("expected '{literal}', found '{}'", t.text),
                t.at,
            )),
            None => Err(self.error(format!("expected '{literal}', found end of input"))),
        }
    }

    pub fn at(&self, literal: &str) -> bool {
        self.peek().map(|t| t.text == literal).unwrap_or(false)
    }

    /// Consumes `literal` if present, reporting whether it matched.
    pub fn eat(&mut self, literal: &str) -> bool {
        if self.at(literal) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn expect_identifier(&mut self) -> Result<(Symbol, Provenance)> {
        match self.peek() {
            Some(t) if is_plain_identifier(&t.text) => {
                let at = t.at;
                let sym = self.interner.intern(&t.text);
                self.advance();
                Ok((sym, at))
            }
            Some(t) => Err(CompileError::new(format!("expected identifier, found '{}'", t.text), t.at)),
            None => Err(self.error("expected identifier, found end of input")),
        }
    }

    // -- identifier resolution (spec.md §4.3 primary_expr lookup order) --

    pub fn is_main(&self, name: Symbol) -> bool {
        name == self.main_symbol
    }

    /// `primary_expr`'s identifier lookup order: constants, function
    /// locals, function arguments, global functions, global symbols;
    /// unknown aborts (spec.md §4.3).
    pub fn resolve_identifier(&self, name: Symbol) -> Option<ResolvedIdentifier> {
        if let Some(&value) = self.constants.get(&name) {
            return Some(ResolvedIdentifier::Constant(value));
        }
        if let Some(func) = &self.current_function {
            if let Some(entry) = func.lookup_local(name) {
                return Some(ResolvedIdentifier::Local(entry));
            }
            if let Some(entry) = func.lookup_argument(name) {
                return Some(ResolvedIdentifier::Argument(entry));
            }
        }
        if let Some(sig) = self.functions.get(&name) {
            return Some(ResolvedIdentifier::Function(sig.clone()));
        }
        if let Some(&ty) = self.globals.get(&name) {
            return Some(ResolvedIdentifier::Global(ty));
        }
        None
    }

    pub fn current_function_mut(&mut self) -> Result<&mut FunctionRecord> {
        self.current_function
            .as_mut()
            .ok_or_else(|| CompileError::new("no active function", self.current_provenance()))
    }

    pub fn symbol_name(&self, sym: Symbol) -> &str {
        self.interner.resolve(sym)
    }

    pub fn new_function_record(&mut self, name: Symbol) -> FunctionRecord {
        let is_main_on_knight_posix = self.arch == Architecture::KnightPosix && self.is_main(name);
        FunctionRecord::new(name, self.arch, is_main_on_knight_posix)
    }
}

fn is_plain_identifier(text: &str) -> bool {
    match text.as_bytes().first() {
        Some(b) => b.is_ascii_alphabetic() || *b == b'_',
        None => false,
    }
}

/// What an identifier named in an expression turned out to be, per the
/// lookup order in spec.md §4.3.
pub enum ResolvedIdentifier {
    Constant(i64),
    Local(SymbolEntry),
    Argument(SymbolEntry),
    Function(FunctionSignature),
    Global(TypeId),
}
