// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Conversions from phase errors to `Diagnostic`.

use pgsl_analysis::{Fixedness, ValidationError, ValidationErrorKind};
use pgsl_lexer::LexError;
use pgsl_parser::{ParseError, ParseErrorKind};

use crate::codes::validation_code;
use crate::{Diagnostic, ToDiagnostic};

impl ToDiagnostic for LexError {
    fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(&self.message)
            .with_code("E0001")
            .with_primary(self.span, "here");
        match &self.hint {
            Some(hint) => diag.with_help(hint),
            None => diag,
        }
    }
}

impl ToDiagnostic for ParseError {
    fn to_diagnostic(&self) -> Diagnostic {
        let (code, label) = match self.kind {
            ParseErrorKind::Syntax => ("E0100", "unexpected here"),
            ParseErrorKind::UnknownType => ("E0101", "not a declared type"),
            ParseErrorKind::TemplateArity => ("E0102", "wrong template arguments"),
            ParseErrorKind::InvalidTemplate => ("E0103", "invalid template argument"),
        };
        let mut diag = Diagnostic::error(&self.message)
            .with_code(code)
            .with_primary(self.span, label);
        if self.kind == ParseErrorKind::UnknownType {
            diag = diag.with_note("types must be declared before they are used");
        }
        match &self.hint {
            Some(hint) => diag.with_help(hint),
            None => diag,
        }
    }
}

impl ToDiagnostic for ValidationError {
    fn to_diagnostic(&self) -> Diagnostic {
        use ValidationErrorKind::*;

        let diag = Diagnostic::error(self.kind.to_string()).with_code(validation_code(&self.kind));

        match &self.kind {
            UndefinedVariable { suggestion, .. } | UndefinedFunction { suggestion, .. } => {
                let diag = diag.with_primary(self.span, "not found in this scope");
                match suggestion {
                    Some(name) => diag.with_suggestion(
                        format!("a similar name exists: `{}`", name),
                        self.span,
                        name.clone(),
                    ),
                    None => diag,
                }
            }
            DuplicateDeclaration { .. } | DuplicateVariable { .. } => {
                diag.with_primary(self.span, "declared again here")
            }
            ShadowsBuiltinType { .. } | ShadowsBuiltinFunction { .. } => diag
                .with_primary(self.span, "built-in name")
                .with_help("choose a different name"),
            TypeMismatch { expected, found } => diag
                .with_primary(self.span, format!("expected `{}`, found `{}`", expected, found))
                .with_note("PGSL has no implicit conversions; use `new` to convert"),
            NotFixed { required, found } => diag
                .with_primary(self.span, format!("this is {}", found))
                .with_note(fixedness_note(*required)),
            AssignToConstant => diag
                .with_primary(self.span, "assigned here")
                .with_help("declare the variable with `let` to make it mutable"),
            MissingGroupBinding { .. } => diag
                .with_primary(self.span, "declared here")
                .with_help("add `[GroupBinding(\"group\", \"binding\")]`"),
            UnknownEnumValue { enum_name, .. } => diag
                .with_primary(self.span, "unknown value")
                .with_note(format!("values are written `{}.Value`", enum_name)),
            RecursiveStruct { .. } => diag
                .with_primary(self.span, "recursive without indirection")
                .with_note("a struct cannot contain itself directly or through its properties"),
            BuildInOutsideEntry { .. } => diag
                .with_primary(self.span, "build-in type")
                .with_help("add an entry point attribute, or use the underlying type"),
            LiteralOutOfRange { .. } => diag
                .with_primary(self.span, "out of range")
                .with_note("`Integer` holds -2147483648 to 2147483647, `UnsignedInteger` 0 to 4294967295"),
            ForInitNotLet => diag
                .with_primary(self.span, "not a `let` declaration")
                .with_help("write `for (let i: UnsignedInteger = 0u; ...)`"),
            InvalidBreak | InvalidContinue => diag.with_primary(self.span, "not inside a loop"),
            MissingReturn { .. } => diag.with_primary(self.span, "this function"),
            _ => diag.with_primary(self.span, "here"),
        }
    }
}

fn fixedness_note(required: Fixedness) -> &'static str {
    match required {
        Fixedness::Constant => "only literals and constants are allowed here",
        Fixedness::ShaderCreationFixed => {
            "values must be known when the shader is created; use `const` instead of `let` or `param`"
        }
        Fixedness::PipelineCreationFixed => {
            "values must be known when the pipeline is created; `param` and `const` qualify"
        }
        Fixedness::ScopeFixed | Fixedness::Variable => {
            "the value must not change inside the current scope"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgsl_ast::{NodeId, Span};

    fn validation(kind: ValidationErrorKind) -> Diagnostic {
        ValidationError::new(kind, Span::new(6, 11), NodeId(0)).to_diagnostic()
    }

    #[test]
    fn undefined_variable_suggests_a_replacement() {
        let diag = validation(ValidationErrorKind::UndefinedVariable {
            name: "valeu".into(),
            suggestion: Some("value".into()),
        });
        assert_eq!(diag.code.as_ref().map(|c| c.0.as_str()), Some("E0204"));
        assert_eq!(diag.message, "undefined variable: valeu");
        let suggestion = diag.help.and_then(|h| h.suggestion).expect("suggestion");
        assert_eq!(suggestion.span, Span::new(6, 11));
        assert_eq!(suggestion.replacement, "value");
    }

    #[test]
    fn not_fixed_explains_requirement() {
        let diag = validation(ValidationErrorKind::NotFixed {
            required: Fixedness::ShaderCreationFixed,
            found: Fixedness::Variable,
        });
        assert_eq!(diag.code.as_ref().map(|c| c.0.as_str()), Some("E0400"));
        assert_eq!(diag.notes.len(), 1);
        assert_eq!(diag.primary_span(), Some(Span::new(6, 11)));
    }

    #[test]
    fn new_rules_have_codes_and_help() {
        let diag = validation(ValidationErrorKind::BuildInOutsideEntry { name: "id".into(), ty: "GlobalInvocationId".into() });
        assert_eq!(diag.code.as_ref().map(|c| c.0.as_str()), Some("E0607"));
        assert!(diag.help.is_some());

        let diag = validation(ValidationErrorKind::IndexOutOfRange { index: -1, length: Some(4) });
        assert_eq!(diag.code.as_ref().map(|c| c.0.as_str()), Some("E0322"));
        assert_eq!(diag.message, "index -1 is out of range for length 4");

        let diag = validation(ValidationErrorKind::IndexOutOfRange { index: -2, length: None });
        assert_eq!(diag.message, "index -2 is out of range");
    }

    #[test]
    fn every_validation_error_gets_a_primary_label() {
        let diag = validation(ValidationErrorKind::NotAddressable);
        assert_eq!(diag.labels.len(), 1);
        assert!(diag.is_error());
    }

    #[test]
    fn parse_errors_map_by_kind() {
        let tokens = pgsl_lexer::Lexer::new("const a: Flaot = 1.0;")
            .tokenize()
            .expect("tokens");
        let err = pgsl_parser::Parser::new(tokens).parse().expect_err("unknown type");
        let diag = err.to_diagnostic();
        assert_eq!(diag.code.as_ref().map(|c| c.0.as_str()), Some("E0101"));
        assert!(!diag.notes.is_empty());
    }

    #[test]
    fn lex_errors_use_lexer_code() {
        let err = pgsl_lexer::Lexer::new("const a: Float = 1.0; /* open")
            .tokenize()
            .expect_err("unterminated");
        let diag = err.to_diagnostic();
        assert_eq!(diag.code.as_ref().map(|c| c.0.as_str()), Some("E0001"));
        assert!(diag.help.is_some());
    }
}
