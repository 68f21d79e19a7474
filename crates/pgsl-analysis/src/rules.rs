// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Typing rules: the record of an expression from the records of its
//! operands.

use pgsl_ast::expr::{BinOp, BinOpCategory, Literal, UnaryOp};
use pgsl_ast::token::NumberSuffix;
use pgsl_ast::TypeId;
use pgsl_types::{ArrayLength, NumericKind, Shape, TypeKind, TypeTable};

use crate::buildin::{numeric_shape, BuildInFunction};
use crate::error::ValidationErrorKind;
use crate::model::{ExpressionRecord, Fixedness, FunctionInfo};

type RuleResult = Result<ExpressionRecord, ValidationErrorKind>;

/// Least fixed of all operands. No operands means a literal.
pub(crate) fn min_fixedness<'a>(records: impl IntoIterator<Item = &'a ExpressionRecord>) -> Fixedness {
    records
        .into_iter()
        .map(|r| r.fixedness)
        .min()
        .unwrap_or(Fixedness::Constant)
}

fn all_constant(records: &[ExpressionRecord]) -> bool {
    records.iter().all(|r| r.is_constant)
}

pub(crate) fn literal(table: &TypeTable, literal: &Literal) -> ExpressionRecord {
    let p = table.primitives();
    let ty = match literal {
        Literal::Bool(_) => p.boolean,
        Literal::Int { suffix: Some(NumberSuffix::Int), .. } => p.integer,
        Literal::Int { suffix: Some(NumberSuffix::Uint), .. } => p.unsigned_integer,
        Literal::Int { .. } => p.abstract_integer,
        Literal::Float { suffix: Some(NumberSuffix::Half), .. } => p.float16,
        Literal::Float { suffix: Some(_), .. } => p.float,
        Literal::Float { suffix: None, .. } => p.abstract_float,
    };
    ExpressionRecord::literal(ty)
}

pub(crate) fn unary(table: &TypeTable, op: UnaryOp, operand: &ExpressionRecord) -> RuleResult {
    let shape = table.shape(operand.ty);
    let kind = shape.and_then(|s| table.numeric_kind(s.scalar));
    let ok = match op {
        UnaryOp::Neg => kind.is_some_and(NumericKind::is_signed),
        UnaryOp::Not => shape.is_some_and(|s| table.is_boolean(s.scalar)),
        UnaryOp::BitNot => kind.is_some_and(NumericKind::is_integer),
    };
    if !ok {
        return Err(ValidationErrorKind::InvalidOperand {
            op: op.symbol(),
            operand: table.name(operand.ty),
        });
    }
    Ok(ExpressionRecord::value(operand.ty, operand.is_constant, operand.fixedness))
}

pub(crate) fn binary(
    table: &mut TypeTable,
    op: BinOp,
    left: &ExpressionRecord,
    right: &ExpressionRecord,
) -> RuleResult {
    let ty = match op.category() {
        BinOpCategory::Arithmetic => arithmetic(table, op, left.ty, right.ty),
        BinOpCategory::Comparison => comparison(table, op, left.ty, right.ty),
        BinOpCategory::Logical => (table.is_boolean(left.ty) && table.is_boolean(right.ty))
            .then(|| table.primitives().boolean),
        BinOpCategory::Bitwise => table
            .unify(left.ty, right.ty)
            .filter(|&ty| integer_shape(table, ty).is_some()),
        BinOpCategory::Shift => shift(table, left.ty, right.ty),
    };

    match ty {
        Some(ty) => Ok(ExpressionRecord::value(
            ty,
            left.is_constant && right.is_constant,
            left.fixedness.min(right.fixedness),
        )),
        None => Err(ValidationErrorKind::InvalidOperands {
            op: op.symbol(),
            left: table.name(left.ty),
            right: table.name(right.ty),
        }),
    }
}

fn integer_shape(table: &TypeTable, ty: TypeId) -> Option<Shape> {
    numeric_shape(table, ty).filter(|s| table.numeric_kind(s.scalar).is_some_and(NumericKind::is_integer))
}

fn arithmetic(table: &mut TypeTable, op: BinOp, left: TypeId, right: TypeId) -> Option<TypeId> {
    let (left, right) = (table.resolve(left), table.resolve(right));
    if let Some(ty) = table.unify(left, right) {
        if numeric_shape(table, ty).is_some() {
            return Some(ty);
        }
        if matches!(table.kind(ty), TypeKind::Matrix { .. }) && matches!(op, BinOp::Add | BinOp::Sub) {
            return Some(ty);
        }
    }

    let is_mul = op == BinOp::Mul;
    match (table.kind(left).clone(), table.kind(right).clone()) {
        (TypeKind::Matrix { columns, rows, inner }, TypeKind::Vector { dimension, inner: v }) if is_mul && dimension == columns => {
            let scalar = table.unify(inner, v)?;
            Some(table.vector(rows, scalar))
        }
        (TypeKind::Vector { dimension, inner: v }, TypeKind::Matrix { columns, rows, inner }) if is_mul && dimension == rows => {
            let scalar = table.unify(inner, v)?;
            Some(table.vector(columns, scalar))
        }
        (
            TypeKind::Matrix { columns: k, rows, inner: a },
            TypeKind::Matrix { columns, rows: k2, inner: b },
        ) if is_mul && k == k2 => {
            let scalar = table.unify(a, b)?;
            Some(table.matrix(columns, rows, scalar))
        }
        (TypeKind::Matrix { columns, rows, inner }, TypeKind::Numeric(_)) if is_mul => {
            let scalar = table.unify(inner, right)?;
            Some(table.matrix(columns, rows, scalar))
        }
        (TypeKind::Numeric(_), TypeKind::Matrix { columns, rows, inner }) if is_mul => {
            let scalar = table.unify(left, inner)?;
            Some(table.matrix(columns, rows, scalar))
        }
        _ => {
            // Scalar with vector applies to every component.
            let (l, r) = (numeric_shape(table, left)?, numeric_shape(table, right)?);
            match (l.dimension, r.dimension) {
                (None, Some(dimension)) | (Some(dimension), None) => {
                    let scalar = table.unify(l.scalar, r.scalar)?;
                    Some(table.vector(dimension, scalar))
                }
                _ => None,
            }
        }
    }
}

fn comparison(table: &mut TypeTable, op: BinOp, left: TypeId, right: TypeId) -> Option<TypeId> {
    let shape = table.shape(table.unify(left, right)?)?;
    if table.is_boolean(shape.scalar) && !matches!(op, BinOp::Eq | BinOp::Ne) {
        return None;
    }
    let boolean = table.primitives().boolean;
    Some(table.from_shape(Shape { scalar: boolean, dimension: shape.dimension }))
}

fn shift(table: &TypeTable, left: TypeId, right: TypeId) -> Option<TypeId> {
    let value = integer_shape(table, left)?;
    let amount = integer_shape(table, right)?;
    let unsigned = matches!(
        table.numeric_kind(amount.scalar)?,
        NumericKind::UnsignedInteger | NumericKind::AbstractInteger
    );
    (unsigned && value.dimension == amount.dimension).then(|| table.resolve(left))
}

/// `value[index]`. A literal index, negated or not, is bounds-checked
/// against fixed lengths.
pub(crate) fn index(
    table: &mut TypeTable,
    value: &ExpressionRecord,
    index: &ExpressionRecord,
    literal: Option<i128>,
) -> RuleResult {
    let (element, length) = match table.kind(table.resolve(value.ty)).clone() {
        TypeKind::Array { inner, length } => {
            let length = match length {
                Some(ArrayLength::Literal(n)) => Some(n),
                _ => None,
            };
            (inner, length)
        }
        TypeKind::Vector { dimension, inner } => (inner, Some(u64::from(dimension))),
        TypeKind::Matrix { columns, rows, inner } => (table.vector(rows, inner), Some(u64::from(columns))),
        _ => return Err(ValidationErrorKind::NotIndexable { ty: table.name(value.ty) }),
    };
    let unsigned = table.primitives().unsigned_integer;
    if !table.is_assignable(index.ty, unsigned) {
        return Err(ValidationErrorKind::InvalidIndex { found: table.name(index.ty) });
    }
    if let Some(i) = literal {
        let beyond = length.is_some_and(|n| i >= i128::from(n));
        if i < 0 || beyond {
            return Err(ValidationErrorKind::IndexOutOfRange { index: i, length });
        }
    }
    Ok(ExpressionRecord {
        ty: element,
        is_storage: value.is_storage,
        is_constant: value.is_constant,
        fixedness: value.fixedness.min(index.fixedness),
    })
}

/// Length of a swizzle over a vector of `dimension` components.
fn swizzle_len(swizzle: &str, dimension: u8) -> Option<u8> {
    let set = ["xyzw", "rgba"]
        .into_iter()
        .find(|set| swizzle.chars().all(|c| set.contains(c)))?;
    let len = swizzle.chars().count();
    let in_range = swizzle
        .chars()
        .all(|c| set.find(c).is_some_and(|i| i < dimension as usize));
    ((1..=4).contains(&len) && in_range).then_some(len as u8)
}

pub(crate) fn decomposition(table: &mut TypeTable, value: &ExpressionRecord, property: &str) -> RuleResult {
    let resolved = table.resolve(value.ty);
    match table.kind(resolved).clone() {
        TypeKind::Struct { .. } => match table.property(resolved, property) {
            Some(ty) => Ok(ExpressionRecord { ty, ..*value }),
            None => Err(ValidationErrorKind::UnknownProperty {
                ty: table.name(value.ty),
                property: property.to_string(),
            }),
        },
        TypeKind::Vector { dimension, inner } => match swizzle_len(property, dimension) {
            Some(1) => Ok(ExpressionRecord { ty: inner, ..*value }),
            Some(len) => Ok(ExpressionRecord {
                ty: table.vector(len, inner),
                // Multi-component swizzles are values, not references.
                is_storage: false,
                ..*value
            }),
            None => Err(ValidationErrorKind::InvalidSwizzle {
                swizzle: property.to_string(),
                ty: table.name(value.ty),
            }),
        },
        _ => Err(ValidationErrorKind::UnknownProperty {
            ty: table.name(value.ty),
            property: property.to_string(),
        }),
    }
}

/// `&operand`. Vector components cannot be addressed.
pub(crate) fn address_of(table: &mut TypeTable, operand: &ExpressionRecord, is_component: bool) -> RuleResult {
    if !operand.is_storage || is_component || !table.attributes(operand.ty).storable {
        return Err(ValidationErrorKind::NotAddressable);
    }
    let pointer = table.pointer(operand.ty);
    Ok(ExpressionRecord::value(pointer, false, Fixedness::ScopeFixed))
}

pub(crate) fn deref(table: &TypeTable, operand: &ExpressionRecord) -> RuleResult {
    match table.kind(table.resolve(operand.ty)) {
        TypeKind::Pointer { inner } => Ok(ExpressionRecord {
            ty: *inner,
            is_storage: true,
            is_constant: false,
            fixedness: Fixedness::Variable,
        }),
        _ => Err(ValidationErrorKind::NotAPointer { ty: table.name(operand.ty) }),
    }
}

pub(crate) fn user_call(table: &TypeTable, function: &FunctionInfo, args: &[ExpressionRecord]) -> RuleResult {
    if args.len() != function.params.len() {
        return Err(ValidationErrorKind::ArgumentCount {
            name: function.name.clone(),
            expected: function.params.len(),
            found: args.len(),
        });
    }
    for (i, (arg, &param)) in args.iter().zip(&function.params).enumerate() {
        if !table.is_assignable(arg.ty, param) {
            return Err(ValidationErrorKind::ArgumentType {
                name: function.name.clone(),
                position: i + 1,
                expected: table.name(param),
                found: table.name(arg.ty),
            });
        }
    }
    Ok(ExpressionRecord::value(function.return_type, false, Fixedness::Variable))
}

pub(crate) fn build_in_call(table: &mut TypeTable, function: &BuildInFunction, args: &[ExpressionRecord]) -> RuleResult {
    let types: Vec<TypeId> = args.iter().map(|a| a.ty).collect();
    let ty = function.check(table, &types)?;
    Ok(if function.const_eligible {
        ExpressionRecord::value(ty, all_constant(args), min_fixedness(args))
    } else {
        ExpressionRecord::value(ty, false, Fixedness::Variable)
    })
}

/// `new ty(args)`
pub(crate) fn construct(table: &mut TypeTable, ty: TypeId, args: &[ExpressionRecord]) -> RuleResult {
    let attributes = table.attributes(ty);
    if !attributes.constructable || !attributes.fixed {
        return Err(ValidationErrorKind::NotConstructable { ty: table.name(ty) });
    }

    let resolved = table.resolve(ty);
    let checked = match table.kind(resolved).clone() {
        TypeKind::Numeric(_) | TypeKind::Boolean => match args {
            [] => Ok(()),
            [arg] if convertible(table, arg.ty, resolved) => Ok(()),
            [_] => Err("argument cannot be converted"),
            _ => Err("expected at most one argument"),
        },
        TypeKind::Vector { dimension, inner } => vector_args(table, dimension, inner, args),
        TypeKind::Matrix { columns, rows, inner } => matrix_args(table, columns, rows, inner, args),
        TypeKind::Array { inner, length } => {
            let count_ok = match length {
                Some(ArrayLength::Literal(n)) => args.is_empty() || args.len() as u64 == n,
                _ => true,
            };
            if !count_ok {
                Err("wrong number of elements")
            } else if args.iter().all(|a| table.is_assignable(a.ty, inner)) {
                Ok(())
            } else {
                Err("element type mismatch")
            }
        }
        TypeKind::Struct { name } => {
            let properties: Vec<TypeId> = table
                .struct_properties(&name)
                .map(|props| props.iter().map(|p| p.ty).collect())
                .unwrap_or_default();
            if args.is_empty() {
                Ok(())
            } else if args.len() != properties.len() {
                Err("expected one argument per property")
            } else if args.iter().zip(&properties).all(|(a, &p)| table.is_assignable(a.ty, p)) {
                Ok(())
            } else {
                Err("property type mismatch")
            }
        }
        _ => return Err(ValidationErrorKind::NotConstructable { ty: table.name(ty) }),
    };

    match checked {
        Ok(()) => Ok(ExpressionRecord::value(ty, all_constant(args), min_fixedness(args))),
        Err(reason) => Err(ValidationErrorKind::InvalidConstructor { ty: table.name(ty), reason }),
    }
}

fn convertible(table: &TypeTable, from: TypeId, to: TypeId) -> bool {
    table.is_assignable(from, to) || table.is_explicit_castable(from, to)
}

fn vector_args(table: &mut TypeTable, dimension: u8, inner: TypeId, args: &[ExpressionRecord]) -> Result<(), &'static str> {
    let vector = table.vector(dimension, inner);
    match args {
        [] => Ok(()),
        // Splat or conversion.
        [arg] if convertible(table, arg.ty, inner) || convertible(table, arg.ty, vector) => Ok(()),
        _ => {
            let mut total = 0;
            for arg in args {
                let shape = table.shape(arg.ty).ok_or("components must be scalars or vectors")?;
                if !table.is_assignable(shape.scalar, inner) {
                    return Err("component type mismatch");
                }
                total += shape.dimension.unwrap_or(1);
            }
            if total == dimension {
                Ok(())
            } else {
                Err("component count does not match")
            }
        }
    }
}

fn matrix_args(
    table: &mut TypeTable,
    columns: u8,
    rows: u8,
    inner: TypeId,
    args: &[ExpressionRecord],
) -> Result<(), &'static str> {
    let matrix = table.matrix(columns, rows, inner);
    let column = table.vector(rows, inner);
    match args.len() {
        0 => Ok(()),
        1 if table.is_explicit_castable(args[0].ty, matrix) => Ok(()),
        n if n == columns as usize && args.iter().all(|a| table.is_assignable(a.ty, column)) => Ok(()),
        n if n == (columns * rows) as usize && args.iter().all(|a| table.is_assignable(a.ty, inner)) => Ok(()),
        _ => Err("expected column vectors or one scalar per component"),
    }
}
