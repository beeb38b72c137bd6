//! AST node sum types.
//!
//! Nodes form a closed sum over two categories, expressions and
//! statements, each holding a `MetaId` into the unit's `MetaArena`.
//! Variants are added only by coordinated edit; every consumer matches
//! exhaustively.

use crate::meta::MetaId;
use crate::modifier::Modifiers;
use crate::op::Op;
use crate::value::Value;
use rbc_common::SourceLoc;
use rbc_solver::LangType;

/// Any AST node.
#[derive(Clone, Debug)]
pub enum Node {
    Expr(Expr),
    Stmt(Stmt),
}

impl Node {
    #[must_use]
    pub fn meta(&self) -> MetaId {
        match self {
            Node::Expr(e) => e.meta(),
            Node::Stmt(s) => s.meta(),
        }
    }

    #[must_use]
    pub const fn as_expr(&self) -> Option<&Expr> {
        match self {
            Node::Expr(e) => Some(e),
            Node::Stmt(_) => None,
        }
    }
}

impl From<Expr> for Node {
    fn from(expr: Expr) -> Self {
        Node::Expr(expr)
    }
}

impl From<Stmt> for Node {
    fn from(stmt: Stmt) -> Self {
        Node::Stmt(stmt)
    }
}

/// An expression.
#[derive(Clone, Debug)]
pub enum Expr {
    /// S-expression call: computed callee + operands.
    S(SExpr),
    /// Member/namespace access chain.
    M(MemberChain),
    /// Built-in operation.
    O(OpExpr),
    /// Block; result is the last expression.
    B(Block),
    /// Literal value.
    V(ValueExpr),
    /// Predicate (then/else, match, coalesce).
    P(Predicate),
    /// Lambda.
    L(Lambda),
}

impl Expr {
    #[must_use]
    pub const fn meta(&self) -> MetaId {
        match self {
            Expr::S(e) => e.meta,
            Expr::M(e) => e.meta,
            Expr::O(e) => e.meta,
            Expr::B(e) => e.meta,
            Expr::V(e) => e.meta,
            Expr::P(e) => e.meta,
            Expr::L(e) => e.meta,
        }
    }
}

/// A statement. Member assignment is not a statement; it is an `O` with
/// op `ReAssign`.
#[derive(Clone, Debug)]
pub enum Stmt {
    Let(LetStmt),
    Assign(AssignStmt),
}

impl Stmt {
    #[must_use]
    pub const fn meta(&self) -> MetaId {
        match self {
            Stmt::Let(s) => s.meta,
            Stmt::Assign(s) => s.meta,
        }
    }
}

/// S-expression call: `(<callee> <arg>…)`.
#[derive(Clone, Debug)]
pub struct SExpr {
    pub meta: MetaId,
    pub callee: Box<Expr>,
    pub operands: Vec<Expr>,
}

/// One step of a member/namespace chain.
#[derive(Clone, Debug)]
pub enum Accessor {
    /// Switches the lookup root to a child namespace.
    Namespace { name: String },
    /// Symbol lookup in the current context.
    Identifier { name: String },
    /// Function lookup + call in the current context.
    Call { name: String, args: Vec<Expr> },
}

impl Accessor {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Accessor::Namespace { name } | Accessor::Identifier { name } | Accessor::Call { name, .. } => {
                name
            }
        }
    }
}

/// Member/namespace access chain, resolved left to right.
#[derive(Clone, Debug)]
pub struct MemberChain {
    pub meta: MetaId,
    pub accessors: Vec<Accessor>,
}

/// Built-in operation with enumerated op code.
#[derive(Clone, Debug)]
pub struct OpExpr {
    pub meta: MetaId,
    pub op: Op,
    pub operands: Vec<Expr>,
}

/// Block: ordered statements/expressions; result = last expression.
#[derive(Clone, Debug)]
pub struct Block {
    pub meta: MetaId,
    pub items: Vec<Node>,
}

/// Literal value expression.
#[derive(Clone, Debug)]
pub struct ValueExpr {
    pub meta: MetaId,
    pub value: Value,
}

/// The branch structure of a predicate.
#[derive(Clone, Debug)]
pub struct PredicateForm {
    pub then_branch: Option<Box<Expr>>,
    pub else_branch: Option<Box<Expr>>,
}

/// Which predicate form the branch structure encodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PredicateKind {
    /// `(<cond> -> <then> : <else>)`
    ThenElse,
    /// `(<cond> -> <then>)`
    Match,
    /// `(<cond> : <else>)`
    Coalesce,
}

impl PredicateForm {
    /// `None` when both branches are absent (a parser would not emit
    /// such a form; builders reject it).
    #[must_use]
    pub const fn kind(&self) -> Option<PredicateKind> {
        match (&self.then_branch, &self.else_branch) {
            (Some(_), Some(_)) => Some(PredicateKind::ThenElse),
            (Some(_), None) => Some(PredicateKind::Match),
            (None, Some(_)) => Some(PredicateKind::Coalesce),
            (None, None) => None,
        }
    }
}

/// Predicate: condition + form.
#[derive(Clone, Debug)]
pub struct Predicate {
    pub meta: MetaId,
    pub condition: Box<Expr>,
    pub form: PredicateForm,
}

/// Lambda parameter.
#[derive(Clone, Debug)]
pub struct Parameter {
    pub modifiers: Modifiers,
    pub name: String,
    /// Declared type; `LangType::Undefined` when the source omits it.
    pub ty: LangType,
    pub loc: SourceLoc,
}

/// Lambda: `(=> [: <ret>] |<params>| <body>)` or the bare form
/// `(|<params>| <body>)`.
#[derive(Clone, Debug)]
pub struct Lambda {
    pub meta: MetaId,
    pub params: Vec<Parameter>,
    /// Declared return type, if any.
    pub ret: Option<LangType>,
    pub body: Box<Expr>,
    /// `true` for the bare form (no `=>` arrow).
    pub is_form: bool,
}

/// `let <id> [: <type>] = <expr>`.
#[derive(Clone, Debug)]
pub struct LetStmt {
    pub meta: MetaId,
    pub name: String,
    pub modifiers: Modifiers,
    pub declared_ty: Option<LangType>,
    pub value: Box<Expr>,
}

/// `<id> := <expr>` as a statement — local rebinding only.
#[derive(Clone, Debug)]
pub struct AssignStmt {
    pub meta: MetaId,
    pub target: String,
    pub value: Box<Expr>,
}
