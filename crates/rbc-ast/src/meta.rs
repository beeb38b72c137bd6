//! Per-node resolution metadata.
//!
//! The AST itself is shape-immutable. Everything the resolver learns
//! about a node — its type, the declaration an identifier refers to, a
//! widening conversion — lives in a `MetaArena` slot addressed by the
//! node's `MetaId`. Slots are written only during Pass 2, and only
//! unresolved -> resolved; the arena enforces the monotonic transitions
//! so callers cannot regress a node.

use rbc_common::{CompileError, SourceLoc};
use rbc_solver::{LangType, TypeId};

/// Index of a node's metadata slot within its unit's `MetaArena`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MetaId(pub u32);

/// Index of a declaration in the symbol arena.
///
/// Allocated by the binder; stored here so reference-site metadata can
/// link to its declaration without a dependency cycle between crates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SymbolId(pub u32);

/// A monotonic cell linking an expression to its type.
///
/// `Unresolved` carries the best-known structural type (possibly
/// containing `Undefined` leaves); `Resolved` carries the interned id.
/// The only legal transition is `Unresolved` -> `Resolved`.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeRef {
    Unresolved(LangType),
    Resolved(TypeId),
}

impl TypeRef {
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, TypeRef::Resolved(_))
    }

    #[must_use]
    pub const fn type_id(&self) -> Option<TypeId> {
        match self {
            TypeRef::Resolved(id) => Some(*id),
            TypeRef::Unresolved(_) => None,
        }
    }
}

/// A widening conversion recorded on the converted node's metadata.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Conversion {
    Primitive(TypeId),
    Composite(TypeId),
}

impl Conversion {
    #[must_use]
    pub const fn target(&self) -> TypeId {
        match self {
            Conversion::Primitive(id) | Conversion::Composite(id) => *id,
        }
    }
}

/// One node's resolution state.
#[derive(Clone, Debug, Default)]
pub struct MetaData {
    pub loc: SourceLoc,
    type_ref: Option<TypeRef>,
    symbol: Option<SymbolId>,
    conversion: Option<Conversion>,
}

impl MetaData {
    #[must_use]
    pub const fn type_ref(&self) -> Option<&TypeRef> {
        self.type_ref.as_ref()
    }

    #[must_use]
    pub const fn symbol(&self) -> Option<SymbolId> {
        self.symbol
    }

    #[must_use]
    pub const fn conversion(&self) -> Option<Conversion> {
        self.conversion
    }
}

/// Arena of metadata slots for one unit's AST.
#[derive(Clone, Debug, Default)]
pub struct MetaArena {
    slots: Vec<MetaData>,
}

impl MetaArena {
    #[must_use]
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Allocate a fresh slot for a node at `loc`.
    pub fn alloc(&mut self, loc: SourceLoc) -> MetaId {
        let id = MetaId(u32::try_from(self.slots.len()).unwrap_or(u32::MAX));
        self.slots.push(MetaData {
            loc,
            ..MetaData::default()
        });
        id
    }

    #[must_use]
    pub fn get(&self, id: MetaId) -> &MetaData {
        &self.slots[id.0 as usize]
    }

    #[must_use]
    pub fn loc(&self, id: MetaId) -> SourceLoc {
        self.slots[id.0 as usize].loc
    }

    #[must_use]
    pub fn resolved_type(&self, id: MetaId) -> Option<TypeId> {
        self.get(id).type_ref().and_then(TypeRef::type_id)
    }

    /// Whether the slot holds a resolved type.
    #[must_use]
    pub fn is_resolved(&self, id: MetaId) -> bool {
        self.get(id).type_ref().is_some_and(TypeRef::is_resolved)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Record the best-known structural type for a not-yet-resolved node.
    ///
    /// Replacing one unresolved guess with another is legal (later
    /// attempts refine `Undefined` leaves); downgrading a resolved slot
    /// is an internal-invariant error.
    pub fn note_unresolved_type(&mut self, id: MetaId, ty: LangType) -> Result<(), CompileError> {
        let slot = &mut self.slots[id.0 as usize];
        match &slot.type_ref {
            Some(TypeRef::Resolved(_)) => Err(CompileError::internal(
                "attempted to downgrade a resolved type ref",
            )),
            _ => {
                slot.type_ref = Some(TypeRef::Unresolved(ty));
                Ok(())
            }
        }
    }

    /// Resolve the slot's type. Idempotent for the same id; resolving to
    /// a different id is an internal-invariant error.
    pub fn resolve_type(&mut self, id: MetaId, ty: TypeId) -> Result<(), CompileError> {
        let slot = &mut self.slots[id.0 as usize];
        match &slot.type_ref {
            Some(TypeRef::Resolved(existing)) if *existing == ty => Ok(()),
            Some(TypeRef::Resolved(_)) => Err(CompileError::internal(
                "metadata re-resolved to a different type",
            )),
            _ => {
                slot.type_ref = Some(TypeRef::Resolved(ty));
                Ok(())
            }
        }
    }

    /// Link a reference site to its declaration. Idempotent for the same
    /// symbol; relinking to a different declaration is an
    /// internal-invariant error.
    pub fn link_symbol(&mut self, id: MetaId, symbol: SymbolId) -> Result<(), CompileError> {
        let slot = &mut self.slots[id.0 as usize];
        match slot.symbol {
            Some(existing) if existing == symbol => Ok(()),
            Some(_) => Err(CompileError::internal(
                "metadata relinked to a different symbol",
            )),
            None => {
                slot.symbol = Some(symbol);
                Ok(())
            }
        }
    }

    /// Record a widening conversion on the node.
    pub fn set_conversion(&mut self, id: MetaId, conversion: Conversion) -> Result<(), CompileError> {
        let slot = &mut self.slots[id.0 as usize];
        match slot.conversion {
            Some(existing) if existing == conversion => Ok(()),
            Some(_) => Err(CompileError::internal(
                "metadata conversion annotation changed",
            )),
            None => {
                slot.conversion = Some(conversion);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/meta_tests.rs"]
mod tests;
