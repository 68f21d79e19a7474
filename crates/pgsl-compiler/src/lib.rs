// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! PGSL compiler front-end.
//!
//! `parse` runs the lexer, the parser (prelude first), setup and validate
//! and returns a [`Module`] even when validation found errors. `compile`
//! goes one step further and returns WGSL for valid modules only.
//!
//! ```no_run
//! let wgsl = pgsl_compiler::compile("const scale: Float = 2.0;").unwrap();
//! assert_eq!(wgsl, "const scale: f32 = 2.0;\n");
//! ```

mod error;
mod module;
mod options;

pub use error::CompileError;
pub use module::Module;
pub use options::CompileOptions;

pub use pgsl_analysis::{Fixedness, ValidationError, ValidationErrorKind, VariableInfo};
pub use pgsl_transpile::TranspileConfig;

use pgsl_ast::LineMap;
use pgsl_lexer::Lexer;
use pgsl_parser::Parser;

/// Parse and analyze `source` with default options.
pub fn parse(source: &str) -> Result<Module, CompileError> {
    parse_with(source, &CompileOptions::default())
}

pub fn parse_with(source: &str, options: &CompileOptions) -> Result<Module, CompileError> {
    let line_map = LineMap::new(source);

    let tokens = Lexer::new(source)
        .tokenize()
        .map_err(|e| CompileError::lex(e, &line_map))?;

    let mut parser = Parser::new(tokens);
    if options.include_prelude {
        let prelude = pgsl_parser::prelude_tokens()
            .map_err(|e| CompileError::lex(e, &LineMap::new(pgsl_parser::PRELUDE)))?;
        parser = parser.with_prelude(prelude);
    }
    let mut parsed = parser.parse().map_err(|e| CompileError::parse(e, &line_map))?;

    let (model, diagnostics) = pgsl_analysis::analyze(&parsed.document, &mut parsed.types);
    log::debug!(
        "analyzed {} declarations, {} diagnostics",
        parsed.document.declarations.len(),
        diagnostics.len()
    );

    Ok(Module::new(
        source,
        line_map,
        parsed.document,
        parsed.types,
        model,
        diagnostics,
        options.transpile.clone(),
    ))
}

/// Compile `source` to WGSL with default options.
pub fn compile(source: &str) -> Result<String, CompileError> {
    compile_with(source, &CompileOptions::default())
}

pub fn compile_with(source: &str, options: &CompileOptions) -> Result<String, CompileError> {
    let module = parse_with(source, options)?;
    if !module.is_valid() {
        return Err(CompileError::Invalid(module.diagnostics().to_vec()));
    }
    let output = module.transpile();
    log::debug!("emitted {} bytes of WGSL", output.len());
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_valid_module() {
        let wgsl = compile("const scale: Float = 2.0;").expect("valid");
        assert_eq!(wgsl, "const scale: f32 = 2.0;\n");
    }

    #[test]
    fn lex_error_carries_range() {
        let err = parse("const a: Float = 1.0;\n  @").expect_err("lex error");
        assert_eq!(err.phase(), "lex");
        let range = err.range().expect("range");
        assert_eq!((range.start_line, range.start_column), (2, 3));
        assert!(err.to_string().starts_with("2:3-2:3: "), "{}", err);
    }

    #[test]
    fn parse_error_carries_range() {
        let err = parse("const a: Float = ;").expect_err("parse error");
        assert_eq!(err.phase(), "parse");
        let range = err.range().expect("range");
        assert_eq!((range.start_line, range.start_column), (1, 18));
        assert_eq!(err.diagnostics().len(), 1);
    }

    #[test]
    fn invalid_module_is_still_returned() {
        let module = parse("const a: Integer = 1.5;").expect("parses");
        assert!(!module.is_valid());
        assert_eq!(module.diagnostics().len(), 1);
        let err = compile("const a: Integer = 1.5;").expect_err("invalid");
        assert!(matches!(&err, CompileError::Invalid(errors) if errors.len() == 1));
        assert_eq!(err.to_string(), "module has 1 validation error(s)");
    }

    #[test]
    fn prelude_can_be_disabled() {
        let options = CompileOptions { include_prelude: false, ..CompileOptions::default() };
        let module = parse_with("const a: Float = 1.0;", &options).expect("parses");
        assert!(module.is_valid());
        assert!(module.resolve_enum("InterpolationType").is_none());
        assert!(parse("const a: Float = 1.0;")
            .expect("parses")
            .resolve_enum("InterpolationType")
            .is_some());
    }

    #[test]
    fn options_control_output() {
        let options = CompileOptions {
            transpile: TranspileConfig { indent_width: 2, blank_line_between_declarations: false },
            ..CompileOptions::default()
        };
        let wgsl = compile_with(
            "const a: Float = 1.0; function f(): Float { return a; }",
            &options,
        )
        .expect("valid");
        assert_eq!(wgsl, "const a: f32 = 1.0;\nfn f() -> f32 {\n  return a;\n}\n");
    }
}
