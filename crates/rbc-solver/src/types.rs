//! The structural type language.

use bitflags::bitflags;

/// Primitive types, ordered by widening precedence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    Nil,
    Bool,
    I32,
    I64,
    F32,
    F64,
}

impl Primitive {
    /// Widening precedence. `Nil` and `Bool` never widen; the value 2 is
    /// intentionally unused so the numeric tier starts at 3.
    #[must_use]
    pub const fn precedence(&self) -> u8 {
        match self {
            Primitive::Nil => 0,
            Primitive::Bool => 1,
            Primitive::I32 => 3,
            Primitive::I64 => 4,
            Primitive::F32 => 5,
            Primitive::F64 => 6,
        }
    }

    /// Whether the primitive participates in arithmetic widening.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        self.precedence() > 1
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Primitive::Nil => "Nil",
            Primitive::Bool => "Bool",
            Primitive::I32 => "I32",
            Primitive::I64 => "I64",
            Primitive::F32 => "F32",
            Primitive::F64 => "F64",
        }
    }
}

impl std::fmt::Display for Primitive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Composite type constructors.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CompositeType {
    Function { params: Vec<LangType>, ret: Box<LangType> },
    Array(Box<LangType>),
    Tuple(Vec<LangType>),
    /// Result of a match (then-only) predicate: the branch type or `Nil`.
    Optional(Box<LangType>),
    Str,
    Quote,
}

/// A structural type as written or inferred, prior to interning.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LangType {
    /// Not-yet-known; never interned.
    Undefined,
    /// Named user type; resolves only once declared.
    User(String),
    Primitive(Primitive),
    Composite(CompositeType),
}

impl LangType {
    pub const NIL: LangType = LangType::Primitive(Primitive::Nil);
    pub const BOOL: LangType = LangType::Primitive(Primitive::Bool);
    pub const I32: LangType = LangType::Primitive(Primitive::I32);
    pub const I64: LangType = LangType::Primitive(Primitive::I64);
    pub const F32: LangType = LangType::Primitive(Primitive::F32);
    pub const F64: LangType = LangType::Primitive(Primitive::F64);
    pub const STR: LangType = LangType::Composite(CompositeType::Str);
    pub const QUOTE: LangType = LangType::Composite(CompositeType::Quote);

    #[must_use]
    pub fn user(name: impl Into<String>) -> Self {
        LangType::User(name.into())
    }

    #[must_use]
    pub fn array(elem: LangType) -> Self {
        LangType::Composite(CompositeType::Array(Box::new(elem)))
    }

    #[must_use]
    pub fn tuple(members: Vec<LangType>) -> Self {
        LangType::Composite(CompositeType::Tuple(members))
    }

    #[must_use]
    pub fn function(params: Vec<LangType>, ret: LangType) -> Self {
        LangType::Composite(CompositeType::Function {
            params,
            ret: Box::new(ret),
        })
    }

    #[must_use]
    pub fn optional(inner: LangType) -> Self {
        LangType::Composite(CompositeType::Optional(Box::new(inner)))
    }

    #[must_use]
    pub const fn as_primitive(&self) -> Option<Primitive> {
        match self {
            LangType::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    /// Whether any leaf of this type is `Undefined`.
    #[must_use]
    pub fn contains_undefined(&self) -> bool {
        match self {
            LangType::Undefined => true,
            LangType::User(_) | LangType::Primitive(_) => false,
            LangType::Composite(c) => match c {
                CompositeType::Function { params, ret } => {
                    params.iter().any(LangType::contains_undefined) || ret.contains_undefined()
                }
                CompositeType::Array(elem) => elem.contains_undefined(),
                CompositeType::Tuple(members) => members.iter().any(LangType::contains_undefined),
                CompositeType::Optional(inner) => inner.contains_undefined(),
                CompositeType::Str | CompositeType::Quote => false,
            },
        }
    }

    /// Classification flags for the interned entry.
    #[must_use]
    pub fn flags(&self) -> TypeFlags {
        let mut flags = match self {
            LangType::Undefined => TypeFlags::empty(),
            LangType::User(_) => TypeFlags::USER,
            LangType::Primitive(p) => {
                if p.is_numeric() {
                    TypeFlags::PRIMITIVE | TypeFlags::NUMERIC
                } else {
                    TypeFlags::PRIMITIVE
                }
            }
            LangType::Composite(_) => TypeFlags::COMPOSITE,
        };
        if self.contains_undefined() {
            flags |= TypeFlags::CONTAINS_UNDEFINED;
        }
        flags
    }
}

impl std::fmt::Display for LangType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LangType::Undefined => f.write_str("Undefined"),
            LangType::User(name) => f.write_str(name),
            LangType::Primitive(p) => write!(f, "{p}"),
            LangType::Composite(c) => match c {
                CompositeType::Function { params, ret } => {
                    f.write_str("Fn<")?;
                    for (i, p) in params.iter().enumerate() {
                        if i > 0 {
                            f.write_str(",")?;
                        }
                        write!(f, "{p}")?;
                    }
                    write!(f, ";{ret}>")
                }
                CompositeType::Array(elem) => write!(f, "Array<{elem}>"),
                CompositeType::Tuple(members) => {
                    f.write_str("Tuple<")?;
                    for (i, m) in members.iter().enumerate() {
                        if i > 0 {
                            f.write_str(",")?;
                        }
                        write!(f, "{m}")?;
                    }
                    f.write_str(">")
                }
                CompositeType::Optional(inner) => write!(f, "Optional<{inner}>"),
                CompositeType::Str => f.write_str("Str"),
                CompositeType::Quote => f.write_str("Quote"),
            },
        }
    }
}

bitflags! {
    /// Cheap classification of an interned type.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct TypeFlags: u8 {
        const PRIMITIVE          = 1 << 0;
        const COMPOSITE          = 1 << 1;
        const USER               = 1 << 2;
        const NUMERIC            = 1 << 3;
        const CONTAINS_UNDEFINED = 1 << 4;
    }
}

#[cfg(test)]
#[path = "tests/types_tests.rs"]
mod tests;
