// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Compilation errors.

use pgsl_analysis::ValidationError;
use pgsl_ast::{LineMap, SourceRange};
use pgsl_diagnostics::{Diagnostic, ToDiagnostic};
use pgsl_lexer::LexError;
use pgsl_parser::ParseError;
use thiserror::Error;

/// Why a source file could not be compiled.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("{range}: {error}")]
    Lex { error: LexError, range: SourceRange },

    #[error("{range}: {error}")]
    Parse { error: ParseError, range: SourceRange },

    #[error("module has {} validation error(s)", .0.len())]
    Invalid(Vec<ValidationError>),
}

impl CompileError {
    pub(crate) fn lex(error: LexError, line_map: &LineMap) -> Self {
        let range = line_map.range(error.span);
        CompileError::Lex { error, range }
    }

    pub(crate) fn parse(error: ParseError, line_map: &LineMap) -> Self {
        let range = line_map.range(error.span);
        CompileError::Parse { error, range }
    }

    /// Start and end of the failing token, for lexer and parser errors.
    pub fn range(&self) -> Option<SourceRange> {
        match self {
            CompileError::Lex { range, .. } | CompileError::Parse { range, .. } => Some(*range),
            CompileError::Invalid(_) => None,
        }
    }

    /// The pipeline phase that failed.
    pub fn phase(&self) -> &'static str {
        match self {
            CompileError::Lex { .. } => "lex",
            CompileError::Parse { .. } => "parse",
            CompileError::Invalid(_) => "validate",
        }
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            CompileError::Lex { error, .. } => vec![error.to_diagnostic()],
            CompileError::Parse { error, .. } => vec![error.to_diagnostic()],
            CompileError::Invalid(errors) => errors.iter().map(|e| e.to_diagnostic()).collect(),
        }
    }
}
