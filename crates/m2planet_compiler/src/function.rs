//! The active function record and per-architecture local-frame offset
//! policy (spec.md §3 "Function record", §4.4's depth table).

use m2planet_base::Symbol;
use m2planet_codegen::{Architecture, Backend, StackDirection};
use m2planet_types::TypeId;

/// One declared local or argument: its type and its frame offset.
#[derive(Debug, Clone, Copy)]
pub struct SymbolEntry {
    pub ty: TypeId,
    pub depth: i32,
}

/// `{ name; arguments; locals; label-counter }` (spec.md §3). Exactly one
/// of these is "current" while statements are being parsed.
pub struct FunctionRecord {
    pub name: Symbol,
    pub arguments: Vec<(Symbol, SymbolEntry)>,
    pub locals: Vec<(Symbol, SymbolEntry)>,
    pub label_counter: u32,
    string_counter: u32,
    next_local_depth: i32,
    delta: i32,
}

impl FunctionRecord {
    /// `is_main_on_knight_posix` special-cases the one documented
    /// ad-hoc depth in spec.md §9 Open Questions: `main`'s first local is
    /// given depth 20 on Knight-POSIX to skip past the argc/argv/envp
    /// placement left by the startup stub, rather than the architecture's
    /// ordinary first-local depth. The caller (which holds the interner)
    /// decides this; this module doesn't need to know what "main" is
    /// spelled as.
    pub fn new(name: Symbol, arch: Architecture, is_main_on_knight_posix: bool) -> Self {
        let backend = m2planet_codegen::backend(arch);
        let first_depth = if is_main_on_knight_posix {
            20
        } else {
            backend.first_local_depth()
        };
        FunctionRecord {
            name,
            arguments: Vec::new(),
            locals: Vec::new(),
            label_counter: 0,
            string_counter: 0,
            next_local_depth: first_depth,
            delta: backend.local_depth_delta(),
        }
    }

    /// Allocates the next unique label suffix for this function (spec.md
    /// §8 property 5: unique, strictly increasing per function).
    pub fn next_label(&mut self) -> u32 {
        let n = self.label_counter;
        self.label_counter += 1;
        n
    }

    /// Allocates the next `STRING_<funcname>_<counter>` suffix (spec.md
    /// §4.1).
    pub fn next_string_counter(&mut self) -> u32 {
        let n = self.string_counter;
        self.string_counter += 1;
        n
    }

    /// Reserves frame slots for a new local of `word_count` words,
    /// returning its `depth` and advancing the allocator by one `delta`
    /// per word (spec.md §4.4). Struct locals are additionally biased by
    /// `(word_count - 1) * word` towards the far end of the reservation,
    /// inverted (subtracted rather than added) on a downward-growing
    /// stack — spec.md §9 Open Questions notes this inversion "appears
    /// intentional but is not documented".
    pub fn reserve_local(&mut self, word_count: u32, is_aggregate: bool) -> i32 {
        let base_depth = self.next_local_depth;
        let depth = if is_aggregate && word_count > 0 {
            let bias = (word_count as i32 - 1) * self.delta;
            base_depth + bias
        } else {
            base_depth
        };
        self.next_local_depth += self.delta * word_count as i32;
        depth
    }

    /// The current depth allocator position, saved before entering a
    /// nested `{ }` block so its locals' stack words can be reclaimed
    /// (and the depth counter rewound) once the block closes normally.
    pub fn depth_snapshot(&self) -> i32 {
        self.next_local_depth
    }

    pub fn restore_depth(&mut self, snapshot: i32) {
        self.next_local_depth = snapshot;
    }

    pub fn lookup_local(&self, name: Symbol) -> Option<SymbolEntry> {
        self.locals.iter().rev().find(|(n, _)| *n == name).map(|(_, e)| *e)
    }

    pub fn lookup_argument(&self, name: Symbol) -> Option<SymbolEntry> {
        self.arguments.iter().rev().find(|(n, _)| *n == name).map(|(_, e)| *e)
    }
}

pub fn stack_direction_delta(arch: Architecture) -> (i32, StackDirection) {
    let backend = m2planet_codegen::backend(arch);
    (backend.local_depth_delta(), backend.stack_direction())
}
