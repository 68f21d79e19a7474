// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Semantic analysis for PGSL.
//!
//! Two passes over a parsed document. [`setup`] builds scopes, resolves
//! names and records the type, storage, constness and fixedness of every
//! expression. [`validate`] then checks the context rules against those
//! records and returns every error it finds.

mod attributes;
mod buildin;
mod error;
mod model;
mod rules;
mod scope;
mod setup;
mod suggest;
mod validate;

pub use attributes::is_entry_attribute;
pub use buildin::{lookup as lookup_build_in, names as build_in_names, BuildInFunction};
pub use error::{ErrorCategory, ValidationError, ValidationErrorKind};
pub use model::{CallTarget, ExpressionRecord, Fixedness, FunctionInfo, SemanticModel, VariableInfo, VariableKind};
pub use scope::{Scope, ScopeId, ScopeKind, ScopeTree};
pub use setup::setup;
pub use validate::validate;

use pgsl_ast::decl::Document;
use pgsl_types::TypeTable;

/// Run both passes.
pub fn analyze(document: &Document, types: &mut TypeTable) -> (SemanticModel, Vec<ValidationError>) {
    let model = setup(document, types);
    let errors = validate(document, types, &model);
    (model, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgsl_ast::decl::{AddressSpace, DeclKind, DeclarationType};
    use pgsl_ast::expr::ExprKind;
    use pgsl_ast::stmt::StmtKind;
    use pgsl_parser::ParsedModule;

    fn parse(src: &str) -> ParsedModule {
        let tokens = pgsl_lexer::Lexer::new(src).tokenize().expect("lex error");
        let prelude = pgsl_parser::prelude_tokens().expect("prelude lex error");
        match pgsl_parser::Parser::new(tokens).with_prelude(prelude).parse() {
            Ok(module) => module,
            Err(e) => panic!("Parse error: {} at {:?}", e, e.span),
        }
    }

    fn analyze_src(src: &str) -> (ParsedModule, SemanticModel, Vec<ValidationError>) {
        let mut module = parse(src);
        let (model, errors) = analyze(&module.document, &mut module.types);
        (module, model, errors)
    }

    fn errors(src: &str) -> Vec<ValidationErrorKind> {
        analyze_src(src).2.into_iter().map(|e| e.kind).collect()
    }

    fn assert_valid(src: &str) {
        let errors = self::errors(src);
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
    }

    fn has(errors: &[ValidationErrorKind], pred: impl Fn(&ValidationErrorKind) -> bool) -> bool {
        errors.iter().any(pred)
    }

    #[test]
    fn valid_module() {
        assert_valid(
            "struct Light { position: Vector3<Float>, intensity: Float }
             [GroupBinding(\"scene\", \"light\")]
             uniform light: Light;
             const scale: Float = 2.0;
             function brightness(factor: Float): Float {
                 let total: Float = light.intensity * factor * scale;
                 if (total > 1.0) {
                     return 1.0;
                 }
                 return total;
             }",
        );
    }

    #[test]
    fn const_variable_record() {
        let (module, model, errors) = analyze_src("const X: Integer = 10;");
        assert!(errors.is_empty(), "{:?}", errors);
        let info = model.module_variable("X").expect("X is registered");
        assert!(info.is_constant());
        assert_eq!(info.declaration_type(), Some(DeclarationType::Const));
        assert_eq!(info.fixedness(), Fixedness::ShaderCreationFixed);
        assert_eq!(module.types.name(info.ty), "Integer");
    }

    #[test]
    fn float_literal_for_integer_const() {
        let errors = self::errors("const X: Integer = 10f;");
        assert!(
            matches!(&errors[..], [ValidationErrorKind::TypeMismatch { expected, found }] if expected == "Integer" && found == "Float"),
            "{:?}",
            errors
        );
    }

    #[test]
    fn const_from_private_is_not_fixed() {
        let errors = self::errors("private notConst: Integer = 10; const X: Integer = notConst;");
        assert_eq!(
            errors,
            vec![ValidationErrorKind::NotFixed {
                required: Fixedness::ShaderCreationFixed,
                found: Fixedness::Variable,
            }]
        );
    }

    #[test]
    fn runtime_array_is_not_fixed() {
        let (module, model, errors) = analyze_src("private v: Array<Integer>;");
        assert!(errors.is_empty(), "{:?}", errors);
        let info = model.module_variable("v").expect("v is registered");
        assert!(!module.types.attributes(info.ty).fixed);
    }

    #[test]
    fn address_spaces() {
        let (module, model, errors) = analyze_src(
            "[GroupBinding(\"g\", \"s\")] uniform smp: Sampler;
             [GroupBinding(\"g\", \"u\")] uniform scale: Float;
             [GroupBinding(\"g\", \"d\")] storage data: Array<Float>;
             workgroup tile: Array<Float, 8>;
             param quality: UnsignedInteger = 1u;
             function f(x: Float): Float { let y: Float = x; const z: Float = y; return z; }",
        );
        assert!(errors.is_empty(), "{:?}", errors);
        let space = |name: &str| {
            let info = model.variables.values().find(|v| v.name == name).expect("declared");
            info.address_space(&module.types)
        };
        assert_eq!(space("smp"), AddressSpace::Handle);
        assert_eq!(space("scale"), AddressSpace::Uniform);
        assert_eq!(space("data"), AddressSpace::Storage);
        assert_eq!(space("tile"), AddressSpace::Workgroup);
        assert_eq!(space("quality"), AddressSpace::None);
        assert_eq!(space("y"), AddressSpace::Function);
        assert_eq!(space("z"), AddressSpace::None);
        assert_eq!(space("x"), AddressSpace::None);
        assert_eq!(DeclarationType::Uniform.address_space(), AddressSpace::Uniform);
    }

    #[test]
    fn struct_property_read() {
        let (module, model, errors) = analyze_src(
            "struct S { prop: Integer }
             function f(s: S): Integer { return s.prop; }",
        );
        assert!(errors.is_empty(), "{:?}", errors);
        let DeclKind::Function(f) = &module.document.user_declarations().last().expect("function").kind else {
            panic!("expected function");
        };
        let StmtKind::Return(Some(value)) = &f.body.statements[0].kind else {
            panic!("expected return");
        };
        assert!(matches!(value.kind, ExprKind::Decomposition { .. }));
        let record = model.record(value.id).expect("recorded");
        assert_eq!(module.types.name(record.ty), "Integer");
        assert!(!record.is_storage);
    }

    #[test]
    fn float_switch_selector() {
        let errors = self::errors("function f(x: Float): void { switch (x) { default { } } }");
        assert_eq!(errors, vec![ValidationErrorKind::SwitchSelector { found: "Float".to_string() }]);
    }

    #[test]
    fn switch_cases_need_constants() {
        let errors = self::errors(
            "function f(x: UnsignedInteger, y: UnsignedInteger): void {
                 switch (x) { case 1u, y { } case 2.5 { } default { } }
             }",
        );
        assert!(has(&errors, |e| matches!(e, ValidationErrorKind::NotFixed { .. })), "{:?}", errors);
        assert!(has(&errors, |e| matches!(e, ValidationErrorKind::CaseValue { .. })), "{:?}", errors);
    }

    #[test]
    fn shadowing_in_nested_block() {
        let (module, model, errors) = analyze_src(
            "function f(): Float {
                 let x: Float = 1.0;
                 {
                     let x: Integer = 2;
                     x = 3;
                 }
                 return x;
             }",
        );
        assert!(errors.is_empty(), "{:?}", errors);
        let DeclKind::Function(f) = &module.document.user_declarations().last().expect("function").kind else {
            panic!("expected function");
        };
        let StmtKind::Return(Some(value)) = &f.body.statements[2].kind else {
            panic!("expected return");
        };
        let outer = f.body.statements[0].id;
        assert_eq!(model.resolved_variable(value.id).map(|v| v.node), Some(outer));
    }

    #[test]
    fn redeclaration_in_same_scope() {
        let errors = self::errors("function f(a: Float): void { let a: Float = 1.0; }");
        assert_eq!(errors, vec![ValidationErrorKind::DuplicateVariable { name: "a".to_string() }]);
    }

    #[test]
    fn duplicate_module_names() {
        let errors = self::errors("const a: Float = 1.0; function a(): void { }");
        assert_eq!(errors, vec![ValidationErrorKind::DuplicateDeclaration { name: "a".to_string() }]);
    }

    #[test]
    fn shadowing_build_in_function() {
        let errors = self::errors("function abs(x: Float): Float { return x; }");
        assert_eq!(errors, vec![ValidationErrorKind::ShadowsBuiltinFunction { name: "abs".to_string() }]);
    }

    #[test]
    fn undefined_variable_suggestion() {
        let errors = self::errors("function f(): Float { let value: Float = 1.0; return valeu; }");
        assert_eq!(
            errors,
            vec![ValidationErrorKind::UndefinedVariable {
                name: "valeu".to_string(),
                suggestion: Some("value".to_string()),
            }]
        );
    }

    #[test]
    fn initializer_cannot_see_itself() {
        let errors = self::errors("function f(): void { let x: Float = x; }");
        assert!(has(&errors, |e| matches!(e, ValidationErrorKind::UndefinedVariable { name, .. } if name == "x")));
    }

    #[test]
    fn undefined_function_suggestion() {
        let errors = self::errors("function f(): Float { return sqr(4.0); }");
        assert!(
            has(&errors, |e| matches!(
                e,
                ValidationErrorKind::UndefinedFunction { name, suggestion: Some(s) } if name == "sqr" && s == "sqrt"
            )),
            "{:?}",
            errors
        );
    }

    #[test]
    fn functions_are_visible_before_declaration() {
        assert_valid(
            "function a(): Float { return b(1.0); }
             function b(x: Float): Float { return x * 2.0; }",
        );
    }

    #[test]
    fn break_and_continue_placement() {
        let errors = self::errors("function f(): void { break; }");
        assert_eq!(errors, vec![ValidationErrorKind::InvalidBreak]);

        let errors = self::errors("function f(x: UnsignedInteger): void { switch (x) { default { continue; } } }");
        assert_eq!(errors, vec![ValidationErrorKind::InvalidContinue]);

        assert_valid(
            "function f(x: UnsignedInteger): void {
                 while (true) {
                     switch (x) { case 1u { break; } default { continue; } }
                 }
             }",
        );
    }

    #[test]
    fn missing_return() {
        let errors = self::errors("function f(x: Boolean): Float { if (x) { return 1.0; } }");
        assert_eq!(errors, vec![ValidationErrorKind::MissingReturn { name: "f".to_string() }]);

        assert_valid("function f(x: Boolean): Float { if (x) { return 1.0; } else { return 2.0; } }");
    }

    #[test]
    fn return_values() {
        let errors = self::errors("function f(): void { return 1.0; }");
        assert_eq!(errors, vec![ValidationErrorKind::UnexpectedReturnValue]);

        let errors = self::errors("function f(): Float { return; }");
        assert!(has(&errors, |e| matches!(e, ValidationErrorKind::MissingReturnValue { .. })));
    }

    #[test]
    fn conditions_must_be_boolean() {
        let errors = self::errors("function f(x: Float): void { while (x) { } }");
        assert_eq!(errors, vec![ValidationErrorKind::ConditionNotBoolean { found: "Float".to_string() }]);
    }

    #[test]
    fn assignments() {
        let errors = self::errors("const c: Float = 1.0; function f(): void { c = 2.0; }");
        assert_eq!(errors, vec![ValidationErrorKind::NotAssignable]);

        let errors = self::errors("function f(p: Float): void { p += 1.0; }");
        assert_eq!(errors, vec![ValidationErrorKind::NotAssignable]);

        let errors = self::errors(
            "[GroupBinding(\"g\", \"b\")] [AccessMode(AccessMode.Read)]
             storage data: Array<Float>;
             function f(): void { data[0u] = 1.0; }",
        );
        assert_eq!(errors, vec![ValidationErrorKind::AssignToConstant]);

        let errors = self::errors("function f(): void { let x: Integer = 1; x = 1.5; }");
        assert!(has(&errors, |e| matches!(e, ValidationErrorKind::TypeMismatch { .. })), "{:?}", errors);

        assert_valid("function f(): void { let x: Integer = 1; x += 2; x++; }");
    }

    #[test]
    fn increment_needs_integer() {
        let errors = self::errors("function f(): void { let x: Float = 1.0; x++; }");
        assert_eq!(
            errors,
            vec![ValidationErrorKind::InvalidOperand { op: "++", operand: "Float".to_string() }]
        );
    }

    #[test]
    fn for_init_must_be_let() {
        let errors = self::errors("function f(): void { for (const i: Integer = 0; i < 4; ) { } }");
        assert_eq!(errors, vec![ValidationErrorKind::ForInitNotLet]);
    }

    #[test]
    fn initializer_rules() {
        let errors = self::errors("const c: Float;");
        assert_eq!(errors, vec![ValidationErrorKind::MissingInitializer { name: "c".to_string() }]);

        let errors = self::errors("workgroup w: Float = 1.0;");
        assert_eq!(
            errors,
            vec![ValidationErrorKind::UnexpectedInitializer { name: "w".to_string(), declaration: "workgroup" }]
        );
    }

    #[test]
    fn buffers_need_group_binding() {
        let errors = self::errors("uniform u: Float;");
        assert_eq!(errors, vec![ValidationErrorKind::MissingGroupBinding { name: "u".to_string() }]);
    }

    #[test]
    fn attribute_rules() {
        let errors = self::errors("[VertexEntry()] [FragmentEntry()] function f(): void { }");
        assert_eq!(errors, vec![ValidationErrorKind::ConflictingEntry { name: "f".to_string() }]);

        let errors = self::errors("[Location(\"x\")] function f(): void { }");
        assert!(has(&errors, |e| matches!(e, ValidationErrorKind::AttributeNotAllowed { .. })), "{:?}", errors);

        let errors = self::errors("[Shiny()] function f(): void { }");
        assert_eq!(errors, vec![ValidationErrorKind::UnknownAttribute { name: "Shiny".to_string() }]);

        let errors = self::errors("[ComputeEntry(8, 8, 1, 1)] function f(): void { }");
        assert!(has(&errors, |e| matches!(e, ValidationErrorKind::AttributeArity { .. })), "{:?}", errors);

        let errors = self::errors("[ComputeEntry(1.5)] function f(): void { }");
        assert!(
            has(&errors, |e| matches!(e, ValidationErrorKind::AttributeArgument { position: 1, .. })),
            "{:?}",
            errors
        );

        assert_valid(
            "const size: UnsignedInteger = 8u;
             [ComputeEntry(size, size)] function f(): void { }",
        );
    }

    #[test]
    fn io_attributes() {
        assert_valid(
            "struct VertexOut {
                 [Location(\"color\")] [Interpolate(InterpolationType.Flat)] color: Vector4<Float>,
                 position: Position
             }
             [VertexEntry()]
             function main([Location(\"uv\")] uv: Vector2<Float>, index: VertexIndex): VertexOut {
                 return new VertexOut(new Vector4<Float>(uv, 0.0, 1.0), new Vector4<Float>(1.0));
             }",
        );
    }

    #[test]
    fn enum_rules() {
        let errors = self::errors("enum Mode { A = 1, A = 2 }");
        assert_eq!(errors, vec![ValidationErrorKind::DuplicateEnumValue { name: "A".to_string() }]);

        let errors = self::errors("enum Mode { A = 1, B = 2.5 }");
        assert!(has(&errors, |e| matches!(e, ValidationErrorKind::EnumValueType { .. })), "{:?}", errors);

        assert_valid(
            "enum Mode { Near = 1u, Far = 2u }
             function f(): UnsignedInteger { return Mode.Far + 1u; }",
        );

        let errors = self::errors("enum Mode { Near = 1 } function f(): void { let m: Mode = Mode.Middle; }");
        assert!(has(&errors, |e| matches!(e, ValidationErrorKind::UnknownEnumValue { .. })), "{:?}", errors);
    }

    #[test]
    fn struct_rules() {
        let errors = self::errors("struct S { a: Float, a: Integer }");
        assert_eq!(errors, vec![ValidationErrorKind::DuplicateProperty { name: "a".to_string() }]);

        let errors = self::errors("struct S { data: Array<Float>, count: UnsignedInteger }");
        assert_eq!(errors, vec![ValidationErrorKind::RuntimeSizedNotLast { property: "data".to_string() }]);

        let errors = self::errors("struct S { inner: Array<S, 2> }");
        assert!(has(&errors, |e| matches!(e, ValidationErrorKind::RecursiveStruct { .. })), "{:?}", errors);

        let errors = self::errors(
            "struct Particles { count: UnsignedInteger, data: Array<Float> }
             private many: Array<Particles, 2>;",
        );
        assert!(has(&errors, |e| matches!(e, ValidationErrorKind::ArrayElementNotFixed { .. })), "{:?}", errors);

        let errors = self::errors("struct Particles { data: Array<Float> } struct Outer { inner: Particles, last: Float }");
        assert_eq!(errors, vec![ValidationErrorKind::RuntimeSizedNotLast { property: "inner".to_string() }]);
    }

    #[test]
    fn array_lengths() {
        assert_valid("const n: UnsignedInteger = 4u; private v: Array<Float, n>;");

        let errors = self::errors("private n: UnsignedInteger = 4u; private v: Array<Float, n>;");
        assert!(has(&errors, |e| matches!(e, ValidationErrorKind::NotFixed { .. })), "{:?}", errors);

        let errors = self::errors("const n: Float = 4.0; private v: Array<Float, n>;");
        assert!(has(&errors, |e| matches!(e, ValidationErrorKind::ArrayLengthType { .. })), "{:?}", errors);

        let errors = self::errors("private v: Array<Array<Float>, 2>;");
        assert!(has(&errors, |e| matches!(e, ValidationErrorKind::ArrayElementNotFixed { .. })), "{:?}", errors);
    }

    #[test]
    fn variable_types() {
        let errors = self::errors("param p: Vector2<Float> = new Vector2<Float>(1.0);");
        assert!(has(&errors, |e| matches!(e, ValidationErrorKind::InvalidVariableType { .. })), "{:?}", errors);

        assert_valid(
            "[GroupBinding(\"g\", \"s\")] uniform smp: Sampler;
             [GroupBinding(\"g\", \"t\")] uniform tex: Texture2d<Float>;
             function f(uv: Vector2<Float>): Vector4<Float> { return textureSample(tex, smp, uv); }",
        );
    }

    #[test]
    fn logical_operators_need_booleans() {
        let errors = self::errors("function f(): Boolean { return 1 && true; }");
        assert!(
            has(&errors, |e| matches!(e, ValidationErrorKind::InvalidOperands { op: "&&", .. })),
            "{:?}",
            errors
        );

        assert_valid("function f(a: Float, b: Float, c: Boolean): Boolean { return a < b || c; }");
    }

    #[test]
    fn literal_indices_are_bounds_checked() {
        let errors = self::errors("function f(v: Array<Float, 3>): Float { return v[-1]; }");
        assert_eq!(errors, vec![ValidationErrorKind::IndexOutOfRange { index: -1, length: Some(3) }]);

        let errors = self::errors("function f(v: Vector4<Float>): Float { return v[4u]; }");
        assert_eq!(errors, vec![ValidationErrorKind::IndexOutOfRange { index: 4, length: Some(4) }]);

        let errors = self::errors("storage data: Array<Float>; function f(): Float { return data[-(2)]; }");
        assert!(
            has(&errors, |e| matches!(e, ValidationErrorKind::IndexOutOfRange { index: -2, length: None })),
            "{:?}",
            errors
        );

        assert_valid(
            "function f(v: Array<Float, 3>, m: Matrix33<Float>, i: UnsignedInteger): Float {
                 return v[2] + v[i] + m[2u].x;
             }",
        );
    }

    #[test]
    fn build_ins_only_in_entry_points() {
        let errors = self::errors("function f(id: GlobalInvocationId): UnsignedInteger { return id.x; }");
        assert_eq!(
            errors,
            vec![ValidationErrorKind::BuildInOutsideEntry {
                name: "id".to_string(),
                ty: "GlobalInvocationId".to_string()
            }]
        );

        let errors = self::errors("function depth(): FragDepth { return 0.5; }");
        assert!(
            has(&errors, |e| matches!(e, ValidationErrorKind::BuildInOutsideEntry { name, .. } if name == "depth")),
            "{:?}",
            errors
        );

        let errors = self::errors("function f([Location(\"uv\")] uv: Vector2<Float>): void { }");
        assert!(
            has(&errors, |e| matches!(e, ValidationErrorKind::AttributeNotAllowed { name, .. } if name == "Location")),
            "{:?}",
            errors
        );

        assert_valid(
            "[FragmentEntry()]
             function main([Location(\"uv\")] uv: Vector2<Float>): FragDepth { return uv.x; }",
        );
    }

    #[test]
    fn abstract_literals_must_fit_their_target() {
        let errors = self::errors("function f(): void { let x: Integer = 3000000000; }");
        assert_eq!(
            errors,
            vec![ValidationErrorKind::LiteralOutOfRange {
                literal: "3000000000".to_string(),
                ty: "Integer".to_string()
            }]
        );

        let errors = self::errors("function f(): UnsignedInteger { return -1; }");
        assert!(has(&errors, |e| matches!(e, ValidationErrorKind::LiteralOutOfRange { .. })), "{:?}", errors);

        let errors = self::errors("enum Big { A = 5000000000 }");
        assert!(has(&errors, |e| matches!(e, ValidationErrorKind::LiteralOutOfRange { .. })), "{:?}", errors);

        let errors = self::errors("private x: Integer; function f(): void { x = -2147483649; }");
        assert!(has(&errors, |e| matches!(e, ValidationErrorKind::LiteralOutOfRange { .. })), "{:?}", errors);

        assert_valid(
            "const big: UnsignedInteger = 4294967295;
             const low: Integer = -2147483648;
             const wide: Float = 3000000000;",
        );
    }

    #[test]
    fn errors_do_not_cascade() {
        let errors = self::errors("function f(): Float { return (missing + 1.0) * 2.0; }");
        assert_eq!(errors.len(), 1, "{:?}", errors);
    }

    #[test]
    fn build_ins_resolve() {
        let (_, model, _) = analyze_src("function f(x: Float): Float { return abs(x); }");
        assert!(model.calls.values().any(|target| matches!(target, CallTarget::BuildIn(f) if f.name == "abs")));
        assert!(lookup_build_in("textureSample").is_some_and(|f| !f.const_eligible));
    }

    #[test]
    fn pointers() {
        assert_valid(
            "function f(): Float {
                 let x: Float = 1.0;
                 const p: *Float = &x;
                 *p = 2.0;
                 return *p;
             }",
        );
    }

    #[test]
    fn parents_are_recorded() {
        let (module, model, _) = analyze_src("function f(): Float { return 1.0 + 2.0; }");
        let DeclKind::Function(f) = &module.document.user_declarations().last().expect("function").kind else {
            panic!("expected function");
        };
        let ret = &f.body.statements[0];
        let StmtKind::Return(Some(value)) = &ret.kind else {
            panic!("expected return");
        };
        assert_eq!(model.parent(value.id), Some(ret.id));
        assert_eq!(model.parent(ret.id), Some(f.body.id));
    }
}
