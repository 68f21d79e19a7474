// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Castability predicates.

use pgsl_ast::TypeId;

use crate::table::TypeTable;
use crate::types::{NumericKind, TypeKind};

fn numeric_implicit(from: NumericKind, to: NumericKind) -> bool {
    from == to
        || from == NumericKind::AbstractInteger
        || (from == NumericKind::AbstractFloat && to.is_float())
}

impl TypeTable {
    /// `new T(value)` conversions: any numeric to any numeric, and vectors
    /// or matrices of the same shape whose scalars convert.
    ///
    /// Aliases, enums and build-ins answer for their underlying type.
    pub fn is_explicit_castable(&self, from: TypeId, to: TypeId) -> bool {
        let (from, to) = (self.resolve(from), self.resolve(to));
        match (self.kind(from), self.kind(to)) {
            (TypeKind::Numeric(_), TypeKind::Numeric(_)) => true,
            (
                TypeKind::Vector { dimension: a, inner: x },
                TypeKind::Vector { dimension: b, inner: y },
            ) => a == b && self.is_explicit_castable(*x, *y),
            (
                TypeKind::Matrix { columns: c1, rows: r1, inner: x },
                TypeKind::Matrix { columns: c2, rows: r2, inner: y },
            ) => c1 == c2 && r1 == r2 && self.is_explicit_castable(*x, *y),
            _ => false,
        }
    }

    /// Conversions applied without being written: abstract literals to
    /// concrete numerics of the matching family.
    pub fn is_implicit_castable(&self, from: TypeId, to: TypeId) -> bool {
        let (from, to) = (self.resolve(from), self.resolve(to));
        match (self.kind(from), self.kind(to)) {
            (TypeKind::Numeric(a), TypeKind::Numeric(b)) => numeric_implicit(*a, *b),
            (
                TypeKind::Vector { dimension: a, inner: x },
                TypeKind::Vector { dimension: b, inner: y },
            ) => a == b && self.is_implicit_castable(*x, *y),
            (
                TypeKind::Matrix { columns: c1, rows: r1, inner: x },
                TypeKind::Matrix { columns: c2, rows: r2, inner: y },
            ) => c1 == c2 && r1 == r2 && self.is_implicit_castable(*x, *y),
            _ => false,
        }
    }

    /// A value of `from` can be stored where `to` is expected.
    pub fn is_assignable(&self, from: TypeId, to: TypeId) -> bool {
        self.resolve(from) == self.resolve(to) || self.is_implicit_castable(from, to)
    }

    /// Common type of two operands, converting abstract literals toward
    /// the concrete side.
    pub fn unify(&self, a: TypeId, b: TypeId) -> Option<TypeId> {
        let (a, b) = (self.resolve(a), self.resolve(b));
        if a == b {
            Some(a)
        } else if self.is_implicit_castable(a, b) {
            Some(b)
        } else if self.is_implicit_castable(b, a) {
            Some(a)
        } else {
            None
        }
    }
}
