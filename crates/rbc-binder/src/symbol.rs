//! Symbol storage.

use rbc_ast::{Modifiers, SymbolId, TypeRef};
use rbc_common::SourceLoc;

use crate::namespace::NamespaceId;

/// Lexical scope id within a namespace.
///
/// Assigned monotonically by `ModuleEnv` during traversal; scope 0 is
/// the namespace-global scope. The counter is reset at the start of each
/// pass, so a scope keeps the same id in Pass 1 and Pass 2.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub u32);

impl ScopeId {
    pub const GLOBAL: ScopeId = ScopeId(0);
}

/// A namespace/scope pair: where a declaration lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NsScope {
    pub ns: NamespaceId,
    pub scope: ScopeId,
}

impl NsScope {
    #[must_use]
    pub const fn new(ns: NamespaceId, scope: ScopeId) -> Self {
        NsScope { ns, scope }
    }

    #[must_use]
    pub const fn global(ns: NamespaceId) -> Self {
        NsScope {
            ns,
            scope: ScopeId::GLOBAL,
        }
    }
}

/// What kind of thing a symbol names.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymbolKind {
    Field,
    Function,
}

/// A resolved declaration.
#[derive(Clone, Debug)]
pub struct SymbolData {
    pub name: String,
    pub modifiers: Modifiers,
    /// Declared or eagerly inferred type; finalized by Pass 2.
    pub type_ref: TypeRef,
    pub kind: SymbolKind,
    pub loc: SourceLoc,
    pub ns_scope: NsScope,
}

/// One-shot cell linking a name to its declaration.
///
/// `Stub` entries exist for forward references taken before the
/// declaration was seen; `define` collapses them in place. Resolution is
/// monotonic: a `Resolved` entry never becomes a stub again.
#[derive(Clone, Debug)]
pub enum SymbolRef {
    Stub,
    Resolved(SymbolData),
}

impl SymbolRef {
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, SymbolRef::Resolved(_))
    }

    #[must_use]
    pub const fn data(&self) -> Option<&SymbolData> {
        match self {
            SymbolRef::Resolved(data) => Some(data),
            SymbolRef::Stub => None,
        }
    }
}

/// Arena slot: the name and table key are fixed at allocation even while
/// the entry is still a stub.
#[derive(Clone, Debug)]
pub struct SymbolEntry {
    pub name: String,
    pub ns_scope: NsScope,
    pub sym_ref: SymbolRef,
}

/// Flat storage for all symbols, addressed by `SymbolId`.
#[derive(Debug, Default)]
pub struct SymbolArena {
    symbols: Vec<SymbolEntry>,
}

impl SymbolArena {
    #[must_use]
    pub fn new() -> Self {
        Self {
            symbols: Vec::new(),
        }
    }

    pub fn alloc(&mut self, entry: SymbolEntry) -> SymbolId {
        let id = SymbolId(u32::try_from(self.symbols.len()).unwrap_or(u32::MAX));
        self.symbols.push(entry);
        id
    }

    #[must_use]
    pub fn get(&self, id: SymbolId) -> Option<&SymbolEntry> {
        self.symbols.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: SymbolId) -> Option<&mut SymbolEntry> {
        self.symbols.get_mut(id.0 as usize)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &SymbolEntry)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(i, e)| (SymbolId(u32::try_from(i).unwrap_or(u32::MAX)), e))
    }
}
