//! The symbol table.
//!
//! Declarations are keyed by `(namespace, scope, identifier)`. The table
//! owns the `SymbolArena`; map values are arena ids, so reference-site
//! metadata can hold a `SymbolId` that stays valid for the process
//! lifetime. Monotonicity (stub -> resolved, never back) is enforced
//! here, not by callers.

use rbc_ast::{SymbolId, TypeRef};
use rbc_common::CompileError;
use rbc_solver::TypeId;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::namespace::NamespaceId;
use crate::symbol::{NsScope, ScopeId, SymbolArena, SymbolData, SymbolEntry, SymbolRef};

/// Structural issues found by `validate`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// A scope-map value points at a missing arena slot.
    BrokenSymbolLink { name: String, symbol_id: u32 },
    /// A stub was created (forward reference) but never collapsed by a
    /// `define`.
    UnresolvedStub { name: String, symbol_id: u32 },
}

/// Declaration storage for every namespace.
#[derive(Debug, Default)]
pub struct SymbolTable {
    arena: SymbolArena,
    scopes: FxHashMap<NsScope, FxHashMap<String, SymbolId>>,
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: SymbolId) -> Option<&SymbolEntry> {
        self.arena.get(id)
    }

    /// Resolved data for a symbol, `None` while it is still a stub.
    #[must_use]
    pub fn data(&self, id: SymbolId) -> Option<&SymbolData> {
        self.arena.get(id).and_then(|e| e.sym_ref.data())
    }

    /// Declare a symbol at its `ns_scope`.
    ///
    /// - a stub under the same key collapses in place (monotonic write);
    /// - re-declaring the same source declaration (same key, same
    ///   location) is a no-op returning the existing id, so repeated
    ///   Pass 1 runs are idempotent;
    /// - any other resolved entry under the key is `DuplicateSymbol`.
    pub fn define(&mut self, data: SymbolData) -> Result<SymbolId, CompileError> {
        let key = data.ns_scope;
        if let Some(&existing) = self.scopes.get(&key).and_then(|names| names.get(&data.name)) {
            let entry = self
                .arena
                .get_mut(existing)
                .ok_or_else(|| CompileError::internal("scope map points at a missing symbol"))?;
            return match &entry.sym_ref {
                SymbolRef::Resolved(prior) if prior.loc == data.loc => Ok(existing),
                SymbolRef::Resolved(_) => Err(CompileError::duplicate_symbol(data.name, data.loc)),
                SymbolRef::Stub => {
                    debug!(name = %data.name, id = existing.0, "collapsing forward-reference stub");
                    entry.sym_ref = SymbolRef::Resolved(data);
                    Ok(existing)
                }
            };
        }

        let name = data.name.clone();
        let id = self.arena.alloc(SymbolEntry {
            name: name.clone(),
            ns_scope: key,
            sym_ref: SymbolRef::Resolved(data),
        });
        self.scopes.entry(key).or_default().insert(name.clone(), id);
        debug!(name = %name, id = id.0, ns = key.ns.0, scope = key.scope.0, "declared symbol");
        Ok(id)
    }

    /// Fetch (creating if absent) an unresolved entry for `name` — a
    /// forward reference whose later `define` will fill it in place.
    pub fn get_stub(&mut self, ns_scope: NsScope, name: &str) -> SymbolId {
        if let Some(&id) = self.scopes.get(&ns_scope).and_then(|names| names.get(name)) {
            return id;
        }
        let id = self.arena.alloc(SymbolEntry {
            name: name.to_string(),
            ns_scope,
            sym_ref: SymbolRef::Stub,
        });
        self.scopes
            .entry(ns_scope)
            .or_default()
            .insert(name.to_string(), id);
        debug!(name, id = id.0, "created forward-reference stub");
        id
    }

    /// Look up `name` in a single scope.
    #[must_use]
    pub fn lookup_in(&self, ns_scope: NsScope, name: &str) -> Option<SymbolId> {
        self.scopes.get(&ns_scope).and_then(|names| names.get(name)).copied()
    }

    /// Walk a scope chain innermost to outermost, returning the first
    /// hit (resolved or stub).
    #[must_use]
    pub fn lookup<'a, I>(&self, ns: NamespaceId, chain: I, name: &str) -> Option<SymbolId>
    where
        I: IntoIterator<Item = &'a ScopeId>,
    {
        for &scope in chain {
            if let Some(id) = self.lookup_in(NsScope::new(ns, scope), name) {
                debug!(name, scope = scope.0, id = id.0, "lookup hit");
                return Some(id);
            }
        }
        debug!(name, ns = ns.0, "lookup miss");
        None
    }

    /// Complete a symbol's type once Pass 2 has resolved it.
    ///
    /// Monotonic: finishing with the same id twice is a no-op; changing
    /// a finalized type or finalizing a stub is an internal-invariant
    /// error.
    pub fn finalize_type(&mut self, id: SymbolId, ty: TypeId) -> Result<(), CompileError> {
        let entry = self
            .arena
            .get_mut(id)
            .ok_or_else(|| CompileError::internal("finalize_type on a missing symbol"))?;
        match &mut entry.sym_ref {
            SymbolRef::Stub => Err(CompileError::internal("finalize_type on an unresolved stub")),
            SymbolRef::Resolved(data) => match &data.type_ref {
                TypeRef::Resolved(existing) if *existing == ty => Ok(()),
                TypeRef::Resolved(_) => Err(CompileError::internal(
                    "symbol type re-finalized to a different type",
                )),
                TypeRef::Unresolved(_) => {
                    data.type_ref = TypeRef::Resolved(ty);
                    Ok(())
                }
            },
        }
    }

    /// Structural self-check, for tests and debug assertions.
    #[must_use]
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for (_, names) in &self.scopes {
            for (name, &id) in names {
                match self.arena.get(id) {
                    None => errors.push(ValidationError::BrokenSymbolLink {
                        name: name.clone(),
                        symbol_id: id.0,
                    }),
                    Some(entry) if !entry.sym_ref.is_resolved() => {
                        errors.push(ValidationError::UnresolvedStub {
                            name: name.clone(),
                            symbol_id: id.0,
                        });
                    }
                    Some(_) => {}
                }
            }
        }
        errors
    }
}

#[cfg(test)]
#[path = "../tests/table_unit_tests.rs"]
mod tests;
