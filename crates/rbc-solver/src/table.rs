//! Type interning and compatibility queries.

use crate::types::{CompositeType, LangType, Primitive, TypeFlags};
use indexmap::IndexSet;
use rustc_hash::{FxBuildHasher, FxHashSet};
use tracing::debug;

/// Stable integer identifier for an interned `LangType`.
///
/// Ids are indices into the table's insertion-ordered store, so a type
/// keeps its id for the process lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

impl TypeId {
    // Primitives and the nullary composites occupy fixed low ids,
    // interned at table construction in this order.
    pub const NIL: TypeId = TypeId(0);
    pub const BOOL: TypeId = TypeId(1);
    pub const I32: TypeId = TypeId(2);
    pub const I64: TypeId = TypeId(3);
    pub const F32: TypeId = TypeId(4);
    pub const F64: TypeId = TypeId(5);
    pub const STR: TypeId = TypeId(6);
    pub const QUOTE: TypeId = TypeId(7);

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// An interned type: id, structural value, and classification flags.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeEntry {
    pub id: TypeId,
    pub ty: LangType,
    pub flags: TypeFlags,
}

/// Widening conversion required to pass a value of the source type where
/// the target type is expected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WideningConversion {
    None,
    Primitive(TypeId),
    Composite(TypeId),
}

/// Result of a compatibility query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Compatibility {
    pub compatible: bool,
    pub conversion: WideningConversion,
}

impl Compatibility {
    const INCOMPATIBLE: Compatibility = Compatibility {
        compatible: false,
        conversion: WideningConversion::None,
    };

    const EQUAL: Compatibility = Compatibility {
        compatible: true,
        conversion: WideningConversion::None,
    };
}

/// Interning table for `LangType` values.
///
/// Append-only: entries are created on first encounter and never mutated
/// or destroyed. The `entries` set and the parallel `flags` vector are
/// kept mutually consistent (one flags word per interned type).
#[derive(Debug)]
pub struct TypeTable {
    entries: IndexSet<LangType, FxBuildHasher>,
    flags: Vec<TypeFlags>,
    /// Names registered through `declare_user`.
    users: FxHashSet<String>,
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeTable {
    #[must_use]
    pub fn new() -> Self {
        let mut table = Self {
            entries: IndexSet::with_hasher(FxBuildHasher),
            flags: Vec::new(),
            users: FxHashSet::default(),
        };

        // Fixed low ids, in TypeId constant order.
        for ty in [
            LangType::NIL,
            LangType::BOOL,
            LangType::I32,
            LangType::I64,
            LangType::F32,
            LangType::F64,
            LangType::STR,
            LangType::QUOTE,
        ] {
            table.intern(ty);
        }

        table
    }

    fn intern(&mut self, ty: LangType) -> TypeId {
        let flags = ty.flags();
        let (index, inserted) = self.entries.insert_full(ty);
        if inserted {
            self.flags.push(flags);
            debug!(id = index, "interned new type entry");
        }
        TypeId(u32::try_from(index).unwrap_or(u32::MAX))
    }

    /// Number of interned entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Structural value of an interned id.
    #[must_use]
    pub fn lang_type(&self, id: TypeId) -> Option<&LangType> {
        self.entries.get_index(id.index())
    }

    /// Full entry for an interned id.
    #[must_use]
    pub fn entry(&self, id: TypeId) -> Option<TypeEntry> {
        let ty = self.entries.get_index(id.index())?;
        Some(TypeEntry {
            id,
            ty: ty.clone(),
            flags: self.flags[id.index()],
        })
    }

    /// Look up an already-interned type without inserting.
    #[must_use]
    pub fn lookup(&self, ty: &LangType) -> Option<TypeEntry> {
        let index = self.entries.get_index_of(ty)?;
        let id = TypeId(u32::try_from(index).unwrap_or(u32::MAX));
        self.entry(id)
    }

    /// Register a user type name so `User(name)` references resolve.
    pub fn declare_user(&mut self, name: impl Into<String>) -> TypeEntry {
        let name = name.into();
        self.users.insert(name.clone());
        let id = self.intern(LangType::User(name));
        self.entry(id).unwrap_or_else(|| unreachable!("just interned"))
    }

    /// Resolve a structural type to its interned entry.
    ///
    /// Idempotent; recursively resolves composites, registering entries
    /// for structurally-new ones. Returns `None` iff any leaf is
    /// `Undefined` or an undeclared user type.
    pub fn resolve(&mut self, ty: &LangType) -> Option<TypeEntry> {
        let id = self.resolve_id(ty)?;
        self.entry(id)
    }

    /// `resolve` returning just the id.
    pub fn resolve_id(&mut self, ty: &LangType) -> Option<TypeId> {
        match ty {
            LangType::Undefined => None,
            LangType::User(name) => {
                if self.users.contains(name) {
                    Some(self.intern(ty.clone()))
                } else {
                    None
                }
            }
            LangType::Primitive(_) => Some(self.intern(ty.clone())),
            LangType::Composite(c) => {
                let leaves_resolve = match c {
                    CompositeType::Function { params, ret } => {
                        params.iter().all(|p| self.resolve_id(p).is_some())
                            && self.resolve_id(ret).is_some()
                    }
                    CompositeType::Array(elem) => self.resolve_id(elem).is_some(),
                    CompositeType::Tuple(members) => {
                        members.iter().all(|m| self.resolve_id(m).is_some())
                    }
                    CompositeType::Optional(inner) => self.resolve_id(inner).is_some(),
                    CompositeType::Str | CompositeType::Quote => true,
                };
                leaves_resolve.then(|| self.intern(ty.clone()))
            }
        }
    }

    /// Primitive payload of an interned id, if it is a primitive.
    #[must_use]
    pub fn primitive_of(&self, id: TypeId) -> Option<Primitive> {
        self.lang_type(id).and_then(LangType::as_primitive)
    }

    // =========================================================================
    // Compatibility & widening
    // =========================================================================

    /// Can a value of `src` be used where `tgt` is expected, and with
    /// what conversion?
    ///
    /// Equal ids are compatible with no conversion (interning makes
    /// structural equality id equality). Distinct primitives widen when
    /// both are numeric and `src` precedence <= `tgt` precedence.
    /// Everything else is incompatible.
    #[must_use]
    pub fn check_compatibility(&self, src: TypeId, tgt: TypeId) -> Compatibility {
        if src == tgt {
            return Compatibility::EQUAL;
        }

        match (self.primitive_of(src), self.primitive_of(tgt)) {
            (Some(s), Some(t)) => {
                if s.is_numeric() && t.is_numeric() && s.precedence() <= t.precedence() {
                    Compatibility {
                        compatible: true,
                        conversion: WideningConversion::Primitive(tgt),
                    }
                } else {
                    Compatibility::INCOMPATIBLE
                }
            }
            _ => Compatibility::INCOMPATIBLE,
        }
    }

    /// Compatibility for a value whose type is still structural (not
    /// interned) because it contains `Undefined` leaves — the empty-list
    /// case. `Undefined` leaves in `src` adopt the corresponding part of
    /// `tgt`; everything else must match structurally.
    #[must_use]
    pub fn check_deferred(&self, src: &LangType, tgt: TypeId) -> Compatibility {
        let Some(tgt_ty) = self.lang_type(tgt) else {
            return Compatibility::INCOMPATIBLE;
        };
        if deferred_match(src, tgt_ty) {
            Compatibility {
                compatible: true,
                conversion: WideningConversion::Composite(tgt),
            }
        } else {
            Compatibility::INCOMPATIBLE
        }
    }

    /// Widest numeric primitive among `candidates`, filtering out `Nil`
    /// and `Bool`. `None` when no numeric primitive is present.
    #[must_use]
    pub fn widest_primitive<I>(candidates: I) -> Option<Primitive>
    where
        I: IntoIterator<Item = Primitive>,
    {
        candidates
            .into_iter()
            .filter(Primitive::is_numeric)
            .max_by_key(Primitive::precedence)
    }
}

/// Structural match where `Undefined` leaves in `src` accept anything.
fn deferred_match(src: &LangType, tgt: &LangType) -> bool {
    match (src, tgt) {
        (LangType::Undefined, _) => true,
        (LangType::Composite(s), LangType::Composite(t)) => match (s, t) {
            (
                CompositeType::Function { params: sp, ret: sr },
                CompositeType::Function { params: tp, ret: tr },
            ) => {
                sp.len() == tp.len()
                    && sp.iter().zip(tp).all(|(a, b)| deferred_match(a, b))
                    && deferred_match(sr, tr)
            }
            (CompositeType::Array(se), CompositeType::Array(te)) => deferred_match(se, te),
            (CompositeType::Tuple(sm), CompositeType::Tuple(tm)) => {
                sm.len() == tm.len() && sm.iter().zip(tm).all(|(a, b)| deferred_match(a, b))
            }
            (CompositeType::Optional(si), CompositeType::Optional(ti)) => deferred_match(si, ti),
            (CompositeType::Str, CompositeType::Str)
            | (CompositeType::Quote, CompositeType::Quote) => true,
            _ => false,
        },
        _ => src == tgt,
    }
}

#[cfg(test)]
#[path = "tests/table_tests.rs"]
mod tests;
