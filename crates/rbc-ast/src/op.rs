//! Built-in operations.

/// The closed set of built-in operators an `O` expression can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Op {
    List,
    And,
    Or,
    Nor,
    Xor,
    Xnor,
    Nand,
    Negate,
    Plus,
    Minus,
    Asterisk,
    Slash,
    Caret,
    Percent,
    PlusPlus,
    MinusMinus,
    Greater,
    Less,
    GreaterEqual,
    LessEqual,
    Equals,
    BangEqual,
    EqualEqual,
    ReAssign,
}

/// Typing category of an operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpCategory {
    /// Builds an array from its operands.
    List,
    /// Numeric operands, result widened across them.
    Arithmetic,
    /// Mutually widenable operands, `Bool` result.
    Comparison,
    /// `Bool` operands, `Bool` result.
    Logical,
    /// Mutable-lvalue target, `Nil` result.
    Reassign,
}

impl Op {
    #[must_use]
    pub const fn category(&self) -> OpCategory {
        match self {
            Op::List => OpCategory::List,
            Op::And | Op::Or | Op::Nor | Op::Xor | Op::Xnor | Op::Nand => OpCategory::Logical,
            Op::Negate
            | Op::Plus
            | Op::Minus
            | Op::Asterisk
            | Op::Slash
            | Op::Caret
            | Op::Percent
            | Op::PlusPlus
            | Op::MinusMinus => OpCategory::Arithmetic,
            Op::Greater
            | Op::Less
            | Op::GreaterEqual
            | Op::LessEqual
            | Op::Equals
            | Op::BangEqual
            | Op::EqualEqual => OpCategory::Comparison,
            Op::ReAssign => OpCategory::Reassign,
        }
    }

    /// Source-level spelling, for diagnostics.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Op::List => "list",
            Op::And => "and",
            Op::Or => "or",
            Op::Nor => "nor",
            Op::Xor => "xor",
            Op::Xnor => "xnor",
            Op::Nand => "nand",
            Op::Negate => "negate",
            Op::Plus => "+",
            Op::Minus => "-",
            Op::Asterisk => "*",
            Op::Slash => "/",
            Op::Caret => "^",
            Op::Percent => "%",
            Op::PlusPlus => "++",
            Op::MinusMinus => "--",
            Op::Greater => ">",
            Op::Less => "<",
            Op::GreaterEqual => ">=",
            Op::LessEqual => "<=",
            Op::Equals => "=",
            Op::BangEqual => "!=",
            Op::EqualEqual => "==",
            Op::ReAssign => ":=",
        }
    }
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}
