// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Error hints - suggestions for fixing common mistakes.

use pgsl_ast::token::TokenKind;
use pgsl_types::TypeFactoryErrorKind;

/// Get a hint for an "expected X" error based on context.
pub fn for_expected(expected: &str, found: &TokenKind) -> Option<&'static str> {
    match (expected, found) {
        ("':'", TokenKind::Eq) => Some("declarations need a type: name: Type = value"),
        ("':'", _) => Some("syntax: name: Type"),

        ("';'", TokenKind::RBrace) => Some("the last statement in a block still needs ';'"),
        ("';'", _) => Some("end statements with ';'"),

        ("'{'", _) => Some("blocks start with '{'"),
        ("'}'", _) => Some("every '{' needs a matching '}'"),

        ("'('", _) => Some("conditions are written in parentheses: if (x) { }"),
        ("')'", TokenKind::Eof) => Some("add ')' to close the parenthesis"),
        ("']'", TokenKind::Eof) => Some("add ']' to close the bracket"),

        ("'>'", _) => Some("close the template list with '>'"),

        ("operator like '+' or '-'", _) => Some("expected a binary operator"),

        ("expression", TokenKind::Eq) => Some("put the value after '='"),
        ("expression", TokenKind::Semi) => Some("statement is incomplete"),
        ("expression", _) => Some("try a value, variable, or function call"),

        ("a name", TokenKind::Int { .. }) => Some("names can't start with a number"),
        ("a name", _) => Some("names start with a letter or '_'"),

        ("type", TokenKind::Ident(_)) => None,
        ("type", _) => Some("try a type like 'Float', 'Vector3<Float>', or a struct name"),

        ("assignment, '++', '--' or a function call", _) => {
            Some("expressions can't stand alone as statements")
        }

        (s, _) if s.starts_with("declaration (") => {
            Some("start with 'function', 'struct', 'enum', 'const', etc.")
        }

        _ => None,
    }
}

/// Get a hint for a type that could not be generated.
pub fn for_type_error(kind: &TypeFactoryErrorKind) -> Option<&'static str> {
    match kind {
        TypeFactoryErrorKind::UnknownType { .. } => {
            Some("types must be declared before they are used")
        }
        TypeFactoryErrorKind::TemplateCount { .. } => None,
        TypeFactoryErrorKind::TemplateKind { .. } => None,
        TypeFactoryErrorKind::InnerType { .. } => None,
        TypeFactoryErrorKind::UnknownTexelFormat { .. } => {
            Some("texel formats are strings like \"rgba8unorm\"")
        }
        TypeFactoryErrorKind::UnknownAccessMode { .. } => {
            Some("access modes are \"read\", \"write\" or \"read_write\"")
        }
    }
}
