//! Validation State (C1) and Symbol Table (C2).
//!
//! A single, process-scope-but-call-local record: created at coordinator
//! entry, mutated only by the reference resolver (registration) and the
//! coordinator (scope push/pop, dependency-edge insertion), and discarded
//! on coordinator exit (§3.4). Nothing here is shared across concurrent
//! validations — each `validate()` call owns its own `ValidationState`,
//! one state per call, the same discipline a code generator applies to
//! one `Config` per generation run.

use std::collections::{HashMap, HashSet};

use crate::ast;
use crate::fqn::Fqn;

/// A Symbol Table entry: a definition keyed by its fully qualified,
/// dotless name (§3.2).
#[derive(Debug, Clone, Copy)]
pub enum Definition<'a> {
    Message(&'a ast::Message),
    Enum(&'a ast::Enum),
}

impl<'a> Definition<'a> {
    pub fn is_message(&self) -> bool {
        matches!(self, Definition::Message(_))
    }

    pub fn is_enum(&self) -> bool {
        matches!(self, Definition::Enum(_))
    }
}

/// Authoritative mapping from fully qualified name to definition node
/// (§2, C2). Answers "is this a message / enum" and backs every reference
/// lookup the resolver performs.
#[derive(Debug, Default)]
pub struct SymbolTable<'a> {
    symbols: HashMap<Fqn, Definition<'a>>,
    /// Insertion order, preserved so the dependency analyzer's cycle
    /// detection traverses symbols in the deterministic order §4.5 asks for.
    order: Vec<Fqn>,
}

impl<'a> SymbolTable<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `fqn`, returning `false` if the name is already taken
    /// (invariant 1, §3.3) — the caller turns that into `DuplicateTypeName`.
    #[must_use]
    pub fn insert(&mut self, fqn: Fqn, def: Definition<'a>) -> bool {
        if self.symbols.contains_key(&fqn) {
            return false;
        }
        self.order.push(fqn.clone());
        self.symbols.insert(fqn, def);
        true
    }

    pub fn get(&self, fqn: &Fqn) -> Option<Definition<'a>> {
        self.symbols.get(fqn).copied()
    }

    pub fn contains(&self, fqn: &Fqn) -> bool {
        self.symbols.contains_key(fqn)
    }

    /// Iterates registered keys in the order they were inserted — the
    /// traversal order §4.5 requires for cycle detection.
    pub fn keys_in_order(&self) -> impl Iterator<Item = &Fqn> {
        self.order.iter()
    }
}

/// Mapping from a simple (unqualified) type name to the import path it was
/// found under (§3.2). Populated by the external import resolver before
/// `validate()` is called (§6); the core only ever reads it.
#[derive(Debug, Default, Clone)]
pub struct ImportedTypes {
    by_name: HashMap<String, String>,
}

impl ImportedTypes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, simple_name: impl Into<String>, import_path: impl Into<String>) {
        self.by_name.insert(simple_name.into(), import_path.into());
    }

    pub fn get(&self, simple_name: &str) -> Option<&str> {
        self.by_name.get(simple_name).map(String::as_str)
    }

    pub fn contains(&self, simple_name: &str) -> bool {
        self.by_name.contains_key(simple_name)
    }
}

/// The outgoing edges of the message→message dependency graph (§3.2, §4.5):
/// FQN of the declaring message -> set of FQNs of `Named` field types.
#[derive(Debug, Default)]
pub struct DependencySet {
    edges: HashMap<Fqn, HashSet<Fqn>>,
}

impl DependencySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_edge(&mut self, from: Fqn, to: Fqn) {
        self.edges.entry(from).or_default().insert(to);
    }

    pub fn edges_from(&self, from: &Fqn) -> impl Iterator<Item = &Fqn> {
        self.edges.get(from).into_iter().flatten()
    }
}

/// The full validation-call state (§3.2): current package, symbol table,
/// scope stack, imported-type table, and dependency edge set.
pub struct ValidationState<'a> {
    pub package: String,
    pub symbols: SymbolTable<'a>,
    /// Dotless FQNs of enclosing message scopes, innermost last.
    scope_stack: Vec<Fqn>,
    pub imported_types: ImportedTypes,
    pub dependencies: DependencySet,
}

impl<'a> ValidationState<'a> {
    pub fn new(package: String, imported_types: ImportedTypes) -> Self {
        ValidationState {
            package,
            symbols: SymbolTable::new(),
            scope_stack: Vec::new(),
            imported_types,
            dependencies: DependencySet::new(),
        }
    }

    pub fn push_scope(&mut self, fqn: Fqn) {
        log::trace!("entering scope {fqn}");
        self.scope_stack.push(fqn);
    }

    pub fn pop_scope(&mut self) {
        let popped = self.scope_stack.pop();
        log::trace!("leaving scope {:?}", popped.map(|f| f.as_str().to_owned()));
    }

    /// Enclosing message scopes, innermost first — the order §4.2 step 4a
    /// requires for bare-name resolution.
    pub fn scopes_innermost_first(&self) -> impl Iterator<Item = &Fqn> {
        self.scope_stack.iter().rev()
    }

    pub fn current_scope(&self) -> Option<&Fqn> {
        self.scope_stack.last()
    }
}
