// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Semantic error types.

use pgsl_ast::{NodeId, Span};
use thiserror::Error;

use crate::model::Fixedness;

/// A semantic error found by setup or validate.
#[derive(Debug, Clone, Error)]
#[error("{kind}")]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    pub span: Span,
    /// The node the error is reported on.
    pub node: NodeId,
}

impl ValidationError {
    pub fn new(kind: ValidationErrorKind, span: Span, node: NodeId) -> Self {
        Self { kind, span, node }
    }

    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }
}

/// Broad families of semantic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    NameResolution,
    Type,
    Constant,
    ControlFlow,
    Attribute,
}

/// The kind of semantic error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationErrorKind {
    // Name resolution
    #[error("`{name}` is already declared in this module")]
    DuplicateDeclaration { name: String },

    #[error("cannot declare `{name}` because it is a built-in type name")]
    ShadowsBuiltinType { name: String },

    #[error("cannot declare `{name}` because it is a built-in function")]
    ShadowsBuiltinFunction { name: String },

    #[error("`{name}` is already declared in this scope")]
    DuplicateVariable { name: String },

    #[error("undefined variable: {name}")]
    UndefinedVariable { name: String, suggestion: Option<String> },

    #[error("undefined function: {name}")]
    UndefinedFunction { name: String, suggestion: Option<String> },

    #[error("enum `{enum_name}` has no value `{value}`")]
    UnknownEnumValue { enum_name: String, value: String },

    #[error("duplicate struct property `{name}`")]
    DuplicateProperty { name: String },

    #[error("duplicate enum value `{name}`")]
    DuplicateEnumValue { name: String },

    #[error("type `{ty}` has no property `{property}`")]
    UnknownProperty { ty: String, property: String },

    // Types
    #[error("mismatched types: expected `{expected}`, found `{found}`")]
    TypeMismatch { expected: String, found: String },

    #[error("operator `{op}` cannot be applied to `{left}` and `{right}`")]
    InvalidOperands { op: &'static str, left: String, right: String },

    #[error("operator `{op}` cannot be applied to `{operand}`")]
    InvalidOperand { op: &'static str, operand: String },

    #[error("type `{ty}` cannot be indexed")]
    NotIndexable { ty: String },

    #[error("index must be an unsigned integer, found `{found}`")]
    InvalidIndex { found: String },

    #[error("invalid swizzle `{swizzle}` on `{ty}`")]
    InvalidSwizzle { swizzle: String, ty: String },

    #[error("cannot take the address of this expression")]
    NotAddressable,

    #[error("cannot dereference `{ty}`, which is not a pointer")]
    NotAPointer { ty: String },

    #[error("`{name}` takes {expected} arguments, found {found}")]
    ArgumentCount { name: String, expected: usize, found: usize },

    #[error("argument {position} of `{name}`: expected `{expected}`, found `{found}`")]
    ArgumentType { name: String, position: usize, expected: String, found: String },

    #[error("no overload of `{name}` accepts ({found})")]
    NoMatchingOverload { name: String, found: String },

    #[error("type `{ty}` cannot be constructed")]
    NotConstructable { ty: String },

    #[error("invalid arguments for `new {ty}`: {reason}")]
    InvalidConstructor { ty: String, reason: &'static str },

    #[error("condition must be `Boolean`, found `{found}`")]
    ConditionNotBoolean { found: String },

    #[error("switch selector must be an unsigned integer, found `{found}`")]
    SwitchSelector { found: String },

    #[error("case value must be an unsigned integer, found `{found}`")]
    CaseValue { found: String },

    #[error("`{name}` cannot have type `{ty}`: {reason}")]
    InvalidVariableType { name: String, ty: String, reason: &'static str },

    #[error("value of `{name}` must be `{expected}`, found `{found}`")]
    EnumValueType { name: String, expected: String, found: String },

    #[error("array element type `{ty}` must have a fixed size")]
    ArrayElementNotFixed { ty: String },

    #[error("array length must be an unsigned integer, found `{found}`")]
    ArrayLengthType { found: String },

    #[error("only the last property may be runtime-sized, `{property}` is not last")]
    RuntimeSizedNotLast { property: String },

    #[error("struct `{name}` contains itself")]
    RecursiveStruct { name: String },

    #[error("index {index} is out of range{}", .length.map(|n| format!(" for length {}", n)).unwrap_or_default())]
    IndexOutOfRange { index: i128, length: Option<u64> },

    #[error("literal `{literal}` does not fit in `{ty}`")]
    LiteralOutOfRange { literal: String, ty: String },

    // Fixedness and constness
    #[error("expression must be {required}, found {found}")]
    NotFixed { required: Fixedness, found: Fixedness },

    #[error("cannot assign to a constant")]
    AssignToConstant,

    #[error("left side of assignment is not assignable")]
    NotAssignable,

    #[error("`{name}` needs an initializer")]
    MissingInitializer { name: String },

    #[error("`{declaration}` variable `{name}` cannot have an initializer")]
    UnexpectedInitializer { name: String, declaration: &'static str },

    // Control flow
    #[error("break outside of loop or switch")]
    InvalidBreak,

    #[error("continue outside of loop")]
    InvalidContinue,

    #[error("function `{name}` does not return a value on every path")]
    MissingReturn { name: String },

    #[error("return with a value in a function returning void")]
    UnexpectedReturnValue,

    #[error("return without a value in a function returning `{expected}`")]
    MissingReturnValue { expected: String },

    #[error("for-loop initializer must be a `let` declaration")]
    ForInitNotLet,

    // Attributes
    #[error("unknown attribute `{name}`")]
    UnknownAttribute { name: String },

    #[error("attribute `{name}` is not allowed on {target}")]
    AttributeNotAllowed { name: String, target: &'static str },

    #[error("attribute `{name}` takes {expected} arguments, found {found}")]
    AttributeArity { name: String, expected: &'static str, found: usize },

    #[error("argument {position} of attribute `{name}` must be {expected}")]
    AttributeArgument { name: String, position: usize, expected: &'static str },

    #[error("duplicate attribute `{name}`")]
    DuplicateAttribute { name: String },

    #[error("`{name}` needs a GroupBinding attribute")]
    MissingGroupBinding { name: String },

    #[error("function `{name}` has more than one entry point attribute")]
    ConflictingEntry { name: String },

    #[error("`{name}` has build-in type `{ty}` outside an entry point")]
    BuildInOutsideEntry { name: String, ty: String },
}

impl ValidationErrorKind {
    pub fn category(&self) -> ErrorCategory {
        use ValidationErrorKind::*;
        match self {
            DuplicateDeclaration { .. }
            | ShadowsBuiltinType { .. }
            | ShadowsBuiltinFunction { .. }
            | DuplicateVariable { .. }
            | UndefinedVariable { .. }
            | UndefinedFunction { .. }
            | UnknownEnumValue { .. }
            | DuplicateProperty { .. }
            | DuplicateEnumValue { .. }
            | UnknownProperty { .. } => ErrorCategory::NameResolution,

            NotFixed { .. }
            | AssignToConstant
            | NotAssignable
            | MissingInitializer { .. }
            | UnexpectedInitializer { .. } => ErrorCategory::Constant,

            InvalidBreak
            | InvalidContinue
            | MissingReturn { .. }
            | UnexpectedReturnValue
            | MissingReturnValue { .. }
            | ForInitNotLet => ErrorCategory::ControlFlow,

            UnknownAttribute { .. }
            | AttributeNotAllowed { .. }
            | AttributeArity { .. }
            | AttributeArgument { .. }
            | DuplicateAttribute { .. }
            | MissingGroupBinding { .. }
            | ConflictingEntry { .. }
            | BuildInOutsideEntry { .. } => ErrorCategory::Attribute,

            _ => ErrorCategory::Type,
        }
    }
}
