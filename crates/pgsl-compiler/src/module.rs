// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! A parsed and analyzed PGSL module.

use pgsl_analysis::{SemanticModel, ValidationError, VariableInfo};
use pgsl_ast::decl::{AliasDecl, Document, EnumDecl, FunctionDecl, StructDecl};
use pgsl_ast::{LineMap, SourceRange, Span};
use pgsl_diagnostics::formatter::DiagnosticFormatter;
use pgsl_diagnostics::json;
use pgsl_diagnostics::{Diagnostic, ToDiagnostic};
use pgsl_transpile::TranspileConfig;
use pgsl_types::TypeTable;

/// The result of [`crate::parse`]: the syntax tree, its types, the semantic
/// model, and every validation error found.
#[derive(Debug)]
pub struct Module {
    source: String,
    line_map: LineMap,
    document: Document,
    types: TypeTable,
    model: SemanticModel,
    diagnostics: Vec<ValidationError>,
    transpile_config: TranspileConfig,
}

impl Module {
    pub(crate) fn new(
        source: &str,
        line_map: LineMap,
        document: Document,
        types: TypeTable,
        model: SemanticModel,
        diagnostics: Vec<ValidationError>,
        transpile_config: TranspileConfig,
    ) -> Self {
        Self {
            source: source.to_string(),
            line_map,
            document,
            types,
            model,
            diagnostics,
            transpile_config,
        }
    }

    pub fn resolve_alias(&self, name: &str) -> Option<&AliasDecl> {
        self.document.resolve_alias(name)
    }

    pub fn resolve_enum(&self, name: &str) -> Option<&EnumDecl> {
        self.document.resolve_enum(name)
    }

    pub fn resolve_struct(&self, name: &str) -> Option<&StructDecl> {
        self.document.resolve_struct(name)
    }

    pub fn resolve_function(&self, name: &str) -> Option<&FunctionDecl> {
        self.document.resolve_function(name)
    }

    /// A module-scope variable by name.
    pub fn variable(&self, name: &str) -> Option<&VariableInfo> {
        self.model.module_variable(name)
    }

    /// Every variable named `name`, module-scope, local or parameter.
    pub fn variables_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a VariableInfo> {
        self.model.variables.values().filter(move |v| v.name == name)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn types(&self) -> &TypeTable {
        &self.types
    }

    pub fn model(&self) -> &SemanticModel {
        &self.model
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn diagnostics(&self) -> &[ValidationError] {
        &self.diagnostics
    }

    pub fn is_valid(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Line/column range of a span in this module's source.
    pub fn range(&self, span: Span) -> SourceRange {
        self.line_map.range(span)
    }

    /// WGSL for this module with the options it was parsed with.
    pub fn transpile(&self) -> String {
        self.transpile_with(&self.transpile_config)
    }

    pub fn transpile_with(&self, config: &TranspileConfig) -> String {
        pgsl_transpile::transpile_with(&self.document, &self.types, &self.model, config)
    }

    pub fn to_diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.iter().map(|e| e.to_diagnostic()).collect()
    }

    /// Validation errors rendered for a terminal.
    pub fn render_diagnostics(&self, file_name: &str) -> String {
        DiagnosticFormatter::new(&self.source)
            .with_file_name(file_name)
            .format_all(&self.to_diagnostics())
    }

    /// Validation errors as a JSON report.
    pub fn json_report(&self, file_name: &str) -> Result<String, serde_json::Error> {
        json::to_json_string(&self.to_diagnostics(), &self.source, file_name, "validate")
    }
}
