// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! WGSL output for analyzed PGSL documents.

mod config;
mod printer;

pub use config::TranspileConfig;

use pgsl_analysis::SemanticModel;
use pgsl_ast::decl::Document;
use pgsl_types::TypeTable;

/// Transpile with the default configuration.
pub fn transpile(document: &Document, types: &TypeTable, model: &SemanticModel) -> String {
    transpile_with(document, types, model, &TranspileConfig::default())
}

/// Emit every user declaration of `document` as WGSL, in order.
///
/// The document is expected to have passed validation; build-in
/// declarations and enums produce no output.
pub fn transpile_with(
    document: &Document,
    types: &TypeTable,
    model: &SemanticModel,
    config: &TranspileConfig,
) -> String {
    let mut p = printer::Printer::new(document, types, model, config);
    p.format_document();
    let output = p.finish();
    log::debug!("transpiled {} declarations into {} bytes", document.declarations.len(), output.len());
    output
}
