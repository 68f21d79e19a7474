// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Build-in functions and their signatures.

use pgsl_ast::TypeId;
use pgsl_types::{NumericKind, Shape, TextureKind, TypeKind, TypeTable};

use crate::error::ValidationErrorKind;

/// Argument and result shapes a build-in function accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signature {
    /// `(T) -> T`, float scalar or vector.
    Float,
    /// `(T) -> T`, any numeric scalar or vector.
    Numeric,
    /// `(T) -> T`, signed numeric scalar or vector.
    Signed,
    /// `(T, T) -> T`, numeric.
    NumericPair,
    /// `(T, T) -> T`, float.
    FloatPair,
    /// `(T, T, T) -> T`, numeric.
    NumericTriple,
    /// `(T, T, T) -> T`, float.
    FloatTriple,
    /// `(VecN<T>, VecN<T>) -> T`
    Dot,
    /// `(Vec3<F>, Vec3<F>) -> Vec3<F>`
    Cross,
    /// `(T) -> scalar of T`, float.
    Length,
    /// `(T, T) -> scalar of T`, float.
    Distance,
    /// `(VecN<F>) -> VecN<F>`
    Normalize,
    /// `(T, T, Boolean) -> T`
    Select,
    /// `(Boolean or VecN<Boolean>) -> Boolean`
    BoolReduce,
    /// `(texture, Sampler, coords[, array index])`
    TextureSample,
}

/// A function every module can call without declaring it.
#[derive(Debug)]
pub struct BuildInFunction {
    pub name: &'static str,
    /// Calls with fixed arguments are as fixed as their arguments.
    pub const_eligible: bool,
    signature: Signature,
}

const fn function(name: &'static str, signature: Signature) -> BuildInFunction {
    BuildInFunction { name, const_eligible: true, signature }
}

static FUNCTIONS: &[BuildInFunction] = &[
    function("abs", Signature::Numeric),
    function("min", Signature::NumericPair),
    function("max", Signature::NumericPair),
    function("clamp", Signature::NumericTriple),
    function("sign", Signature::Signed),
    function("floor", Signature::Float),
    function("ceil", Signature::Float),
    function("round", Signature::Float),
    function("fract", Signature::Float),
    function("sqrt", Signature::Float),
    function("inverseSqrt", Signature::Float),
    function("exp", Signature::Float),
    function("exp2", Signature::Float),
    function("log", Signature::Float),
    function("log2", Signature::Float),
    function("pow", Signature::FloatPair),
    function("sin", Signature::Float),
    function("cos", Signature::Float),
    function("tan", Signature::Float),
    function("asin", Signature::Float),
    function("acos", Signature::Float),
    function("atan", Signature::Float),
    function("atan2", Signature::FloatPair),
    function("step", Signature::FloatPair),
    function("smoothstep", Signature::FloatTriple),
    function("mix", Signature::FloatTriple),
    function("dot", Signature::Dot),
    function("cross", Signature::Cross),
    function("length", Signature::Length),
    function("distance", Signature::Distance),
    function("normalize", Signature::Normalize),
    function("select", Signature::Select),
    function("any", Signature::BoolReduce),
    function("all", Signature::BoolReduce),
    BuildInFunction {
        name: "textureSample",
        const_eligible: false,
        signature: Signature::TextureSample,
    },
];

/// Find a build-in function by name.
pub fn lookup(name: &str) -> Option<&'static BuildInFunction> {
    FUNCTIONS.iter().find(|f| f.name == name)
}

/// Names of all build-in functions.
pub fn names() -> impl Iterator<Item = &'static str> {
    FUNCTIONS.iter().map(|f| f.name)
}

impl BuildInFunction {
    /// Check argument types and compute the result type.
    pub(crate) fn check(&self, table: &mut TypeTable, args: &[TypeId]) -> Result<TypeId, ValidationErrorKind> {
        let expected = match self.signature {
            Signature::Float
            | Signature::Numeric
            | Signature::Signed
            | Signature::Length
            | Signature::Normalize
            | Signature::BoolReduce => 1,
            Signature::NumericPair | Signature::FloatPair | Signature::Dot | Signature::Cross | Signature::Distance => 2,
            Signature::NumericTriple | Signature::FloatTriple | Signature::Select | Signature::TextureSample => 3,
        };
        let arity_ok = args.len() == expected
            || (self.signature == Signature::TextureSample && args.len() == expected + 1);
        if !arity_ok {
            return Err(ValidationErrorKind::ArgumentCount {
                name: self.name.to_string(),
                expected,
                found: args.len(),
            });
        }

        let result = match self.signature {
            Signature::Float => float_shape(table, args[0]).map(|s| table.from_shape(s)),
            Signature::Numeric => numeric_shape(table, args[0]).map(|_| args[0]),
            Signature::Signed => numeric_shape(table, args[0])
                .filter(|s| table.numeric_kind(s.scalar).is_some_and(NumericKind::is_signed))
                .map(|_| args[0]),
            Signature::NumericPair | Signature::NumericTriple => {
                unify_all(table, args).filter(|&ty| numeric_shape(table, ty).is_some())
            }
            Signature::FloatPair | Signature::FloatTriple => unify_all(table, args)
                .and_then(|ty| float_shape(table, ty))
                .map(|s| table.from_shape(s)),
            Signature::Dot => unify_all(table, args)
                .and_then(|ty| numeric_shape(table, ty))
                .filter(|s| s.dimension.is_some())
                .map(|s| s.scalar),
            Signature::Cross => unify_all(table, args)
                .and_then(|ty| float_shape(table, ty))
                .filter(|s| s.dimension == Some(3))
                .map(|s| table.from_shape(s)),
            Signature::Length => float_shape(table, args[0]).map(|s| s.scalar),
            Signature::Distance => unify_all(table, args)
                .and_then(|ty| float_shape(table, ty))
                .map(|s| s.scalar),
            Signature::Normalize => float_shape(table, args[0])
                .filter(|s| s.dimension.is_some())
                .map(|s| table.from_shape(s)),
            Signature::Select => select(table, args),
            Signature::BoolReduce => table
                .shape(args[0])
                .filter(|s| table.is_boolean(s.scalar))
                .map(|_| table.primitives().boolean),
            Signature::TextureSample => texture_sample(table, args),
        };

        result.ok_or_else(|| ValidationErrorKind::NoMatchingOverload {
            name: self.name.to_string(),
            found: args.iter().map(|&a| table.name(a)).collect::<Vec<_>>().join(", "),
        })
    }
}

fn unify_all(table: &TypeTable, args: &[TypeId]) -> Option<TypeId> {
    let (first, rest) = args.split_first()?;
    rest.iter().try_fold(*first, |acc, &ty| table.unify(acc, ty))
}

pub(crate) fn numeric_shape(table: &TypeTable, ty: TypeId) -> Option<Shape> {
    table.shape(ty).filter(|s| table.numeric_kind(s.scalar).is_some())
}

/// Float scalar or vector shape. Abstract integers become abstract floats.
fn float_shape(table: &TypeTable, ty: TypeId) -> Option<Shape> {
    let shape = numeric_shape(table, ty)?;
    match table.numeric_kind(shape.scalar)? {
        kind if kind.is_float() => Some(shape),
        NumericKind::AbstractInteger => Some(Shape {
            scalar: table.primitives().abstract_float,
            dimension: shape.dimension,
        }),
        _ => None,
    }
}

fn select(table: &mut TypeTable, args: &[TypeId]) -> Option<TypeId> {
    let value = unify_all(table, &args[..2])?;
    let shape = table.shape(value)?;
    let condition = table.shape(args[2])?;
    let condition_ok = table.is_boolean(condition.scalar)
        && (condition.dimension.is_none() || condition.dimension == shape.dimension);
    condition_ok.then_some(value)
}

fn texture_sample(table: &mut TypeTable, args: &[TypeId]) -> Option<TypeId> {
    let p = table.primitives();
    let kind = match table.kind(table.resolve(args[0])) {
        TypeKind::Texture { kind, .. } => *kind,
        _ => return None,
    };
    let (dimension, arrayed, depth) = match kind {
        TextureKind::Texture1d => (None, false, false),
        TextureKind::Texture2d => (Some(2), false, false),
        TextureKind::Texture2dArray => (Some(2), true, false),
        TextureKind::Texture3d | TextureKind::TextureCube => (Some(3), false, false),
        TextureKind::TextureCubeArray => (Some(3), true, false),
        TextureKind::TextureDepth2d => (Some(2), false, true),
        TextureKind::TextureDepth2dArray => (Some(2), true, true),
        TextureKind::TextureDepthCube => (Some(3), false, true),
        TextureKind::TextureDepthCubeArray => (Some(3), true, true),
        _ => return None,
    };

    let sampler_ok = matches!(table.kind(table.resolve(args[1])), TypeKind::Sampler { comparison: false });
    let coords = table.from_shape(Shape { scalar: p.float, dimension });
    if !sampler_ok || !table.is_assignable(args[2], coords) || (args.len() == 4) != arrayed {
        return None;
    }
    if arrayed && !(table.is_assignable(args[3], p.integer) || table.is_assignable(args[3], p.unsigned_integer)) {
        return None;
    }

    Some(if depth { p.float } else { table.vector(4, p.float) })
}
