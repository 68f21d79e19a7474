// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Statement nodes.

use crate::expr::{BinOp, Expr, TypeRef};
use crate::{NodeId, Span};

/// A statement inside a function body.
#[derive(Debug, Clone)]
pub struct Stmt {
    pub id: NodeId,
    pub kind: StmtKind,
    pub span: Span,
}

/// The kind of statement.
#[derive(Debug, Clone)]
pub enum StmtKind {
    /// `{ ... }`
    Block(Block),
    /// `if (cond) { } else ...`; the else branch is a block or another if.
    If {
        condition: Expr,
        then_block: Block,
        else_branch: Option<Box<Stmt>>,
    },
    Switch {
        selector: Expr,
        cases: Vec<SwitchCase>,
        default: Option<Block>,
    },
    For {
        init: Option<Box<Stmt>>,
        condition: Option<Expr>,
        update: Option<Box<Stmt>>,
        body: Block,
    },
    While { condition: Expr, body: Block },
    DoWhile { body: Block, condition: Expr },
    Break,
    Continue,
    Return(Option<Expr>),
    Discard,
    Assignment {
        target: Expr,
        op: AssignOp,
        value: Expr,
    },
    IncrementDecrement { target: Expr, increment: bool },
    /// A call evaluated for its side effects. Always holds a call expression.
    Call(Expr),
    Variable(LocalVariable),
}

/// A brace-delimited statement list. Opens a new scope.
#[derive(Debug, Clone)]
pub struct Block {
    pub id: NodeId,
    pub statements: Vec<Stmt>,
    pub span: Span,
}

/// `case a, b { ... }`
#[derive(Debug, Clone)]
pub struct SwitchCase {
    pub id: NodeId,
    pub values: Vec<Expr>,
    pub body: Block,
    pub span: Span,
}

/// Assignment operators. Compound forms carry the binary operator they apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Compound(BinOp),
}

impl AssignOp {
    pub fn symbol(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Compound(BinOp::Add) => "+=",
            AssignOp::Compound(BinOp::Sub) => "-=",
            AssignOp::Compound(BinOp::Mul) => "*=",
            AssignOp::Compound(BinOp::Div) => "/=",
            AssignOp::Compound(BinOp::Rem) => "%=",
            AssignOp::Compound(BinOp::BitAnd) => "&=",
            AssignOp::Compound(BinOp::BitOr) => "|=",
            AssignOp::Compound(BinOp::BitXor) => "^=",
            AssignOp::Compound(BinOp::Shl) => "<<=",
            AssignOp::Compound(BinOp::Shr) => ">>=",
            AssignOp::Compound(_) => "=",
        }
    }
}

/// Function-scope declaration kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocalKind {
    /// Immutable, evaluated once per scope entry.
    Const,
    /// Mutable storage.
    Let,
}

impl LocalKind {
    pub fn keyword(self) -> &'static str {
        match self {
            LocalKind::Const => "const",
            LocalKind::Let => "let",
        }
    }
}

/// `let x: T = e;` or `const x: T = e;` inside a function.
#[derive(Debug, Clone)]
pub struct LocalVariable {
    pub kind: LocalKind,
    pub name: String,
    pub ty: TypeRef,
    pub init: Option<Expr>,
}
