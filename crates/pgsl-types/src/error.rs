// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Type factory errors.

use pgsl_ast::Span;

/// A type name that could not be turned into a type definition.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind}")]
pub struct TypeFactoryError {
    pub kind: TypeFactoryErrorKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TypeFactoryErrorKind {
    #[error("unknown type `{name}`")]
    UnknownType { name: String },
    #[error("`{name}` takes {expected} template arguments, found {found}")]
    TemplateCount {
        name: String,
        expected: &'static str,
        found: usize,
    },
    #[error("template argument {position} of `{name}` must be {expected}")]
    TemplateKind {
        name: String,
        position: usize,
        expected: &'static str,
    },
    #[error("`{name}` needs {expected} as inner type, found `{inner}`")]
    InnerType {
        name: String,
        inner: String,
        expected: &'static str,
    },
    #[error("unknown texel format \"{format}\"")]
    UnknownTexelFormat { format: String },
    #[error("unknown access mode \"{access}\"")]
    UnknownAccessMode { access: String },
}

impl TypeFactoryError {
    pub(crate) fn new(kind: TypeFactoryErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Wrong number or kind of template arguments.
    pub fn is_template_arity(&self) -> bool {
        matches!(
            self.kind,
            TypeFactoryErrorKind::TemplateCount { .. } | TypeFactoryErrorKind::TemplateKind { .. }
        )
    }
}
