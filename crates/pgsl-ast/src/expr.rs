// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Expression nodes.

use std::fmt;

use crate::token::NumberSuffix;
use crate::{NodeId, Span, TypeId};

/// An expression in the syntax tree.
#[derive(Debug, Clone)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
    pub span: Span,
}

/// The kind of expression.
#[derive(Debug, Clone)]
pub enum ExprKind {
    /// Numeric or boolean literal
    Literal(Literal),
    /// String literal
    String(String),
    /// Reference to a variable by name
    Variable(String),
    /// `EnumName.Value`
    EnumValue { enum_name: String, value: String },
    /// Unary operation
    Unary { op: UnaryOp, operand: Box<Expr> },
    /// Binary operation
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `value[index]`
    Index { value: Box<Expr>, index: Box<Expr> },
    /// Struct property access or vector swizzle
    Decomposition { value: Box<Expr>, property: String },
    /// `&value`
    AddressOf(Box<Expr>),
    /// `*pointer`
    Deref(Box<Expr>),
    /// Function call
    Call { name: String, args: Vec<Expr> },
    /// `new T(args)`
    New { ty: TypeRef, args: Vec<Expr> },
    /// `(inner)`
    Parenthesized(Box<Expr>),
}

/// Literal values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal {
    Int { value: u64, suffix: Option<NumberSuffix> },
    Float { value: f64, suffix: Option<NumberSuffix> },
    Bool(bool),
}

/// A type written in source, already generated by the type factory.
///
/// Expressions used as template arguments (array lengths) are kept here so
/// analysis can resolve and validate them like any other expression.
#[derive(Debug, Clone)]
pub struct TypeRef {
    pub ty: TypeId,
    pub name: String,
    pub template_exprs: Vec<Expr>,
    pub span: Span,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    // Comparison
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    // Logical
    And,
    Or,
    // Bitwise
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

/// Operator families sharing one typing rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOpCategory {
    Arithmetic,
    Bitwise,
    Shift,
    Comparison,
    Logical,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
        }
    }

    pub fn category(self) -> BinOpCategory {
        match self {
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Rem => BinOpCategory::Arithmetic,
            BinOp::BitAnd | BinOp::BitOr | BinOp::BitXor => BinOpCategory::Bitwise,
            BinOp::Shl | BinOp::Shr => BinOpCategory::Shift,
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => {
                BinOpCategory::Comparison
            }
            BinOp::And | BinOp::Or => BinOpCategory::Logical,
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Negation (-)
    Neg,
    /// Logical not (!)
    Not,
    /// Bitwise not (~)
    BitNot,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
        }
    }
}

impl Expr {
    /// Literal integer value, looking through parentheses.
    pub fn as_int_literal(&self) -> Option<u64> {
        match &self.kind {
            ExprKind::Literal(Literal::Int { value, .. }) => Some(*value),
            ExprKind::Parenthesized(inner) => inner.as_int_literal(),
            _ => None,
        }
    }

    /// Integer literal value with any leading negations applied.
    pub fn as_signed_int_literal(&self) -> Option<i128> {
        match &self.kind {
            ExprKind::Unary { op: UnaryOp::Neg, operand } => operand.as_signed_int_literal().map(|v| -v),
            ExprKind::Parenthesized(inner) => inner.as_signed_int_literal(),
            _ => self.as_int_literal().map(i128::from),
        }
    }

    /// Whether an `Enum.Value` appears anywhere in this expression.
    pub fn mentions_enum_value(&self) -> bool {
        match &self.kind {
            ExprKind::EnumValue { .. } => true,
            ExprKind::Literal(_) | ExprKind::String(_) | ExprKind::Variable(_) => false,
            ExprKind::Unary { operand: e, .. }
            | ExprKind::Decomposition { value: e, .. }
            | ExprKind::AddressOf(e)
            | ExprKind::Deref(e)
            | ExprKind::Parenthesized(e) => e.mentions_enum_value(),
            ExprKind::Binary { left, right, .. } => left.mentions_enum_value() || right.mentions_enum_value(),
            ExprKind::Index { value, index } => value.mentions_enum_value() || index.mentions_enum_value(),
            ExprKind::Call { args, .. } => args.iter().any(Expr::mentions_enum_value),
            ExprKind::New { ty, args } => {
                ty.template_exprs.iter().chain(args).any(Expr::mentions_enum_value)
            }
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int { value, suffix } => {
                write!(f, "{}{}", value, suffix.map_or("", NumberSuffix::as_str))
            }
            Literal::Float { value, suffix } => {
                // Debug keeps a decimal point or exponent on every finite value.
                write!(f, "{:?}{}", value, suffix.map_or("", NumberSuffix::as_str))
            }
            Literal::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Source-like rendering, used for array length identities and messages.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Literal(lit) => write!(f, "{}", lit),
            ExprKind::String(s) => write!(f, "\"{}\"", s),
            ExprKind::Variable(name) => write!(f, "{}", name),
            ExprKind::EnumValue { enum_name, value } => write!(f, "{}.{}", enum_name, value),
            ExprKind::Unary { op, operand } => {
                write!(f, "{}", op.symbol())?;
                write_prefix_operand(f, operand)
            }
            ExprKind::Binary { op, left, right } => write!(f, "{} {} {}", left, op.symbol(), right),
            ExprKind::Index { value, index } => write!(f, "{}[{}]", value, index),
            ExprKind::Decomposition { value, property } => write!(f, "{}.{}", value, property),
            ExprKind::AddressOf(inner) => {
                write!(f, "&")?;
                write_prefix_operand(f, inner)
            }
            ExprKind::Deref(inner) => {
                write!(f, "*")?;
                write_prefix_operand(f, inner)
            }
            ExprKind::Call { name, args } => {
                write!(f, "{}(", name)?;
                write_args(f, args)?;
                write!(f, ")")
            }
            ExprKind::New { ty, args } => {
                write!(f, "new {}(", ty.name)?;
                write_args(f, args)?;
                write!(f, ")")
            }
            ExprKind::Parenthesized(inner) => write!(f, "({})", inner),
        }
    }
}

/// Stacked prefix operators are parenthesized so `- -x` never reads as `--x`.
fn write_prefix_operand(f: &mut fmt::Formatter<'_>, operand: &Expr) -> fmt::Result {
    match operand.kind {
        ExprKind::Unary { .. } | ExprKind::AddressOf(_) | ExprKind::Deref(_) => write!(f, "({})", operand),
        _ => write!(f, "{}", operand),
    }
}

fn write_args(f: &mut fmt::Formatter<'_>, args: &[Expr]) -> fmt::Result {
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", arg)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(kind: ExprKind) -> Expr {
        Expr { id: NodeId::DUMMY, kind, span: Span::default() }
    }

    #[test]
    fn renders_nested_expression() {
        let sum = expr(ExprKind::Binary {
            op: BinOp::Add,
            left: Box::new(expr(ExprKind::Variable("SIZE".into()))),
            right: Box::new(expr(ExprKind::Literal(Literal::Int {
                value: 2,
                suffix: Some(NumberSuffix::Uint),
            }))),
        });
        let wrapped = expr(ExprKind::Parenthesized(Box::new(sum)));
        assert_eq!(wrapped.to_string(), "(SIZE + 2u)");
    }

    #[test]
    fn stacked_negations_stay_apart() {
        let x = expr(ExprKind::Variable("x".into()));
        let inner = expr(ExprKind::Unary { op: UnaryOp::Neg, operand: Box::new(x) });
        let outer = expr(ExprKind::Unary { op: UnaryOp::Neg, operand: Box::new(inner) });
        assert_eq!(outer.to_string(), "-(-x)");
        assert_eq!(outer.as_signed_int_literal(), None);

        let four = expr(ExprKind::Literal(Literal::Int { value: 4, suffix: None }));
        let negated = expr(ExprKind::Unary { op: UnaryOp::Neg, operand: Box::new(four) });
        assert_eq!(negated.as_signed_int_literal(), Some(-4));
        assert!(!negated.mentions_enum_value());
    }

    #[test]
    fn float_literals_keep_decimal_point() {
        let lit = Literal::Float { value: 1.0, suffix: None };
        assert_eq!(lit.to_string(), "1.0");
        let half = Literal::Float { value: 0.5, suffix: Some(NumberSuffix::Half) };
        assert_eq!(half.to_string(), "0.5h");
    }

    #[test]
    fn operator_categories() {
        assert_eq!(BinOp::Shl.category(), BinOpCategory::Shift);
        assert_eq!(BinOp::Le.category(), BinOpCategory::Comparison);
        assert_eq!(BinOp::Rem.category(), BinOpCategory::Arithmetic);
    }
}
