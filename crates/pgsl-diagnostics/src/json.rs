// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! JSON diagnostic output for tools and editors.

use serde::Serialize;

use pgsl_ast::LineMap;

use crate::codes::ErrorCodeRegistry;
use crate::{Diagnostic, LabelStyle, Severity};

/// A complete report for one compilation.
#[derive(Debug, Serialize)]
pub struct DiagnosticReport {
    /// Schema version.
    pub version: u32,
    pub file: String,
    /// No errors were reported.
    pub success: bool,
    /// The phase that produced the diagnostics: `lex`, `parse` or `validate`.
    pub phase: String,
    pub diagnostics: Vec<JsonDiagnostic>,
    pub error_count: usize,
    pub warning_count: usize,
}

#[derive(Debug, Serialize)]
pub struct JsonDiagnostic {
    pub severity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Registry category, e.g. "Type" or "Fixedness".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
    pub labels: Vec<JsonLabel>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<JsonSuggestion>,
}

/// Primary location, 1-based.
#[derive(Debug, Serialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
    pub byte_offset: usize,
    pub source_line: String,
}

#[derive(Debug, Serialize)]
pub struct JsonLabel {
    /// "primary" or "secondary".
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub start: LineCol,
    pub end: LineCol,
    pub source_line: String,
}

#[derive(Debug, Serialize)]
pub struct LineCol {
    pub line: usize,
    pub column: usize,
    pub byte_offset: usize,
}

#[derive(Debug, Serialize)]
pub struct JsonSuggestion {
    pub span: JsonSpan,
    pub replacement: String,
    /// The line after applying the replacement.
    pub result_line: String,
}

#[derive(Debug, Serialize)]
pub struct JsonSpan {
    pub start: usize,
    pub end: usize,
}

struct SourceIndex<'a> {
    source: &'a str,
    line_map: LineMap,
}

impl<'a> SourceIndex<'a> {
    fn new(source: &'a str) -> Self {
        Self { source, line_map: LineMap::new(source) }
    }

    fn line_col(&self, offset: usize) -> LineCol {
        let (line, column) = self.line_map.offset_to_line_col(offset);
        LineCol { line: line as usize, column: column as usize, byte_offset: offset }
    }

    fn line(&self, line: usize) -> &'a str {
        self.line_map.line_text(self.source, line as u32).unwrap_or("")
    }
}

/// Build a report from diagnostics of one phase.
pub fn to_json_report(
    diagnostics: &[Diagnostic],
    source: &str,
    file: &str,
    phase: &str,
) -> DiagnosticReport {
    let registry = ErrorCodeRegistry::default();
    let index = SourceIndex::new(source);

    let error_count = diagnostics.iter().filter(|d| d.severity == Severity::Error).count();
    let warning_count = diagnostics.iter().filter(|d| d.severity == Severity::Warning).count();

    DiagnosticReport {
        version: 1,
        file: file.to_string(),
        success: error_count == 0,
        phase: phase.to_string(),
        diagnostics: diagnostics
            .iter()
            .map(|d| to_json_diagnostic(d, &index, &registry))
            .collect(),
        error_count,
        warning_count,
    }
}

/// Pretty-printed JSON report.
pub fn to_json_string(
    diagnostics: &[Diagnostic],
    source: &str,
    file: &str,
    phase: &str,
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&to_json_report(diagnostics, source, file, phase))
}

fn to_json_diagnostic(
    diag: &Diagnostic,
    index: &SourceIndex<'_>,
    registry: &ErrorCodeRegistry,
) -> JsonDiagnostic {
    let severity = match diag.severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Note => "note",
    };
    let code = diag.code.as_ref().map(|c| c.0.clone());
    let category = code
        .as_deref()
        .and_then(|c| registry.get(c))
        .map(|info| info.category.to_string());

    let location = diag
        .labels
        .iter()
        .find(|l| l.style == LabelStyle::Primary)
        .or(diag.labels.first())
        .map(|l| {
            let at = index.line_col(l.span.start);
            SourceLocation {
                line: at.line,
                column: at.column,
                byte_offset: at.byte_offset,
                source_line: index.line(at.line).to_string(),
            }
        });

    let labels = diag
        .labels
        .iter()
        .map(|l| {
            let start = index.line_col(l.span.start);
            let source_line = index.line(start.line).to_string();
            JsonLabel {
                role: match l.style {
                    LabelStyle::Primary => "primary".to_string(),
                    LabelStyle::Secondary => "secondary".to_string(),
                },
                message: l.message.clone(),
                start,
                end: index.line_col(l.span.end),
                source_line,
            }
        })
        .collect();

    let suggestion = diag.help.as_ref().and_then(|h| h.suggestion.as_ref()).map(|s| {
        let at = index.line_col(s.span.start);
        let line = index.line(at.line);
        let prefix_end = (at.column - 1).min(line.len());
        let suffix_start = (prefix_end + s.span.end.saturating_sub(s.span.start)).min(line.len());
        JsonSuggestion {
            span: JsonSpan { start: s.span.start, end: s.span.end },
            replacement: s.replacement.clone(),
            result_line: format!("{}{}{}", &line[..prefix_end], s.replacement, &line[suffix_start..]),
        }
    });

    JsonDiagnostic {
        severity: severity.to_string(),
        code,
        category,
        message: diag.message.clone(),
        location,
        labels,
        notes: diag.notes.clone(),
        help: diag.help.as_ref().map(|h| h.message.clone()),
        suggestion,
    }
}
