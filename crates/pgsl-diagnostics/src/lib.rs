// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! PGSL compiler diagnostics.
//!
//! Every phase keeps its own error type. `ToDiagnostic` turns them into one
//! `Diagnostic` shape that the terminal formatter and the JSON report share.

pub mod codes;
pub mod convert;
pub mod formatter;
pub mod json;

use pgsl_ast::Span;
use serde::Serialize;

/// A compiler diagnostic with rich context for display.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: Option<ErrorCode>,
    pub message: String,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
    pub help: Option<Help>,
}

/// A labeled source span within a diagnostic.
#[derive(Debug, Clone, Serialize)]
pub struct Label {
    pub span: Span,
    pub style: LabelStyle,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelStyle {
    /// Where the error is (`^^^`).
    Primary,
    /// Related location (`---`).
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Note,
}

/// An error code like E0300.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorCode(pub String);

/// A help message, optionally carrying a replacement.
#[derive(Debug, Clone, Serialize)]
pub struct Help {
    pub message: String,
    pub suggestion: Option<CodeSuggestion>,
}

/// Replace `span` with `replacement`.
#[derive(Debug, Clone, Serialize)]
pub struct CodeSuggestion {
    pub span: Span,
    pub replacement: String,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn with_code(mut self, code: &str) -> Self {
        self.code = Some(ErrorCode(code.to_string()));
        self
    }

    pub fn with_label(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    pub fn with_primary(self, span: Span, message: impl Into<String>) -> Self {
        self.with_label(Label {
            span,
            style: LabelStyle::Primary,
            message: Some(message.into()),
        })
    }

    pub fn with_secondary(self, span: Span, message: impl Into<String>) -> Self {
        self.with_label(Label {
            span,
            style: LabelStyle::Secondary,
            message: Some(message.into()),
        })
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_help(mut self, message: impl Into<String>) -> Self {
        self.help = Some(Help {
            message: message.into(),
            suggestion: None,
        });
        self
    }

    pub fn with_suggestion(
        mut self,
        message: impl Into<String>,
        span: Span,
        replacement: impl Into<String>,
    ) -> Self {
        self.help = Some(Help {
            message: message.into(),
            suggestion: Some(CodeSuggestion {
                span,
                replacement: replacement.into(),
            }),
        });
        self
    }

    /// Span of the first primary label.
    pub fn primary_span(&self) -> Option<Span> {
        self.labels
            .iter()
            .find(|l| l.style == LabelStyle::Primary)
            .map(|l| l.span)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Conversion from a phase error into a `Diagnostic`.
pub trait ToDiagnostic {
    fn to_diagnostic(&self) -> Diagnostic;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_parts() {
        let diag = Diagnostic::error("mismatched types")
            .with_code("E0300")
            .with_secondary(Span::new(0, 3), "declared here")
            .with_primary(Span::new(10, 14), "expected `Float`")
            .with_note("no implicit conversion")
            .with_help("write `10.0`");

        assert!(diag.is_error());
        assert_eq!(diag.code, Some(ErrorCode("E0300".to_string())));
        assert_eq!(diag.primary_span(), Some(Span::new(10, 14)));
        assert_eq!(diag.labels.len(), 2);
        assert_eq!(diag.notes.len(), 1);
        assert!(diag.help.as_ref().is_some_and(|h| h.suggestion.is_none()));
    }

    #[test]
    fn suggestion_replaces_help() {
        let diag = Diagnostic::error("undefined variable: valeu")
            .with_help("check the name")
            .with_suggestion("a similar name exists", Span::new(4, 9), "value");
        let help = diag.help.expect("help");
        assert_eq!(help.message, "a similar name exists");
        assert_eq!(help.suggestion.map(|s| s.replacement), Some("value".to_string()));
    }
}
