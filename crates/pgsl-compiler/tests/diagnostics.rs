// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Rendering compiler errors through the facade.

use pgsl_compiler::{compile, parse};

fn plain() {
    colored::control::set_override(false);
}

#[test]
fn terminal_rendering_points_at_the_error() {
    plain();
    let module = parse("const X: Integer = 10f;").expect("parses");
    let out = module.render_diagnostics("shader.pgsl");
    assert!(out.starts_with("error[E0300]: mismatched types"), "{}", out);
    assert!(out.contains("--> shader.pgsl:1:20"), "{}", out);
    assert!(out.contains("^^^"), "{}", out);
}

#[test]
fn suggestion_for_misspelled_variable() {
    plain();
    let module = parse(
        "function f(value: Float): Float {
             return valeu;
         }",
    )
    .expect("parses");
    let out = module.render_diagnostics("shader.pgsl");
    assert!(out.contains("error[E0204]: undefined variable: valeu"), "{}", out);
    assert!(out.contains("help: a similar name exists: `value`"), "{}", out);
    assert!(out.contains("return value;"), "{}", out);
}

#[test]
fn json_report_lists_every_error() {
    let module = parse(
        "const a: Integer = 1.5;
         function f(): Integer { break; }",
    )
    .expect("parses");
    let json = module.json_report("shader.pgsl").expect("json");
    let report: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(report["success"], false);
    assert_eq!(report["phase"], "validate");
    let codes: Vec<&str> = report["diagnostics"]
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|d| d["code"].as_str())
        .collect();
    assert!(codes.contains(&"E0300"), "{:?}", codes);
    assert!(codes.contains(&"E0500"), "{:?}", codes);
    assert!(codes.contains(&"E0502"), "{:?}", codes);
}

#[test]
fn syntax_errors_convert_to_diagnostics() {
    let err = compile("function f(: void {}").expect_err("syntax error");
    let diagnostics = err.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code.as_ref().map(|c| c.0.as_str()), Some("E0100"));
    assert!(diagnostics[0].primary_span().is_some());
}
