// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Parser for PGSL.
//!
//! Transforms a token stream into a document tree, generating every written
//! type through the type factory as it goes.

mod hints;
mod parser;
mod prelude;

pub use parser::{ParseError, ParseErrorKind, ParsedModule, Parser};
pub use prelude::{prelude_tokens, PRELUDE};

#[cfg(test)]
mod tests {
    use super::*;
    use pgsl_ast::decl::{DeclKind, DeclarationType};
    use pgsl_ast::expr::{BinOp, ExprKind, UnaryOp};
    use pgsl_ast::stmt::{AssignOp, StmtKind};
    use pgsl_ast::token::TokenKind;
    use pgsl_types::TypeKind;

    fn parse(src: &str) -> Result<ParsedModule, ParseError> {
        let tokens = pgsl_lexer::Lexer::new(src).tokenize().expect("lex error");
        Parser::new(tokens).parse()
    }

    fn parse_ok(src: &str) -> ParsedModule {
        match parse(src) {
            Ok(module) => module,
            Err(e) => panic!("Parse error: {} at {:?}", e, e.span),
        }
    }

    /// Statements of the first function in `src`.
    fn body(src: &str) -> Vec<StmtKind> {
        let module = parse_ok(src);
        for decl in module.document.declarations {
            if let DeclKind::Function(f) = decl.kind {
                return f.body.statements.into_iter().map(|s| s.kind).collect();
            }
        }
        panic!("no function in source");
    }

    fn init_of(stmt: &StmtKind) -> &ExprKind {
        match stmt {
            StmtKind::Variable(v) => &v.init.as_ref().expect("no initializer").kind,
            other => panic!("expected variable, got {:?}", other),
        }
    }

    #[test]
    fn parse_declarations() {
        let module = parse_ok(
            "alias Point = Vector3<Float>;
             struct Light { position: Point, intensity: Float }
             const scale: Float = 2.0;
             uniform light: Light;
             function main(): void { }",
        );
        let decls = &module.document.declarations;
        assert_eq!(decls.len(), 5);
        assert!(matches!(decls[0].kind, DeclKind::Alias(_)));
        assert!(matches!(decls[1].kind, DeclKind::Struct(_)));
        match &decls[3].kind {
            DeclKind::Variable(v) => {
                assert_eq!(v.declaration_type, DeclarationType::Uniform);
                assert!(matches!(module.types.kind(v.ty.ty), TypeKind::Struct { name } if name == "Light"));
            }
            other => panic!("expected variable, got {:?}", other),
        }
        assert!(decls.iter().all(|d| !d.build_in));
    }

    #[test]
    fn identical_types_share_one_definition() {
        let module = parse_ok(
            "private a: Array<Integer, 3>;
             private b: Array<Integer, 3u>;
             private c: Array<Integer, 4>;",
        );
        let ids: Vec<_> = module
            .document
            .declarations
            .iter()
            .map(|d| match &d.kind {
                DeclKind::Variable(v) => v.ty.ty,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(ids[0], ids[1]);
        assert_ne!(ids[0], ids[2]);
    }

    #[test]
    fn enum_array_length_shares_literal_identity() {
        let module = parse_ok(
            "enum Size { Small = 4u }
             private a: Array<Float, Size.Small>;
             private b: Array<Float, 4>;",
        );
        let ids: Vec<_> = module
            .document
            .declarations
            .iter()
            .filter_map(|d| match &d.kind {
                DeclKind::Variable(v) => Some(v.ty.ty),
                _ => None,
            })
            .collect();
        assert_eq!(ids[0], ids[1]);
        assert_eq!(module.types.identifier(ids[0]), "Array<Float,4>");
    }

    #[test]
    fn error_enum_array_length_without_integer_literal() {
        let err = parse("enum Size { Small = -4i } private a: Array<Float, Size.Small>;").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidTemplate);
        let err = parse("enum Size { Small = 4u } private a: Array<Float, Size.Small + 1u>;").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidTemplate);
        assert!(err.message.contains("Size.Small + 1u"), "message: {}", err.message);
    }

    #[test]
    fn parse_nested_template_with_shift_token() {
        let module = parse_ok("private grid: Array<Vector3<Float>, 4>; private rows: Array<Array<Float, 2>>;");
        match &module.document.declarations[1].kind {
            DeclKind::Variable(v) => {
                assert!(matches!(module.types.kind(v.ty.ty), TypeKind::Array { length: None, .. }))
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn parse_comparison_not_template() {
        let stmts = body("function f(): void { let x: Boolean = a < b; }");
        assert!(matches!(init_of(&stmts[0]), ExprKind::Binary { op: BinOp::Lt, .. }));
    }

    #[test]
    fn parse_two_comparisons() {
        let stmts = body("function f(): void { let x: Boolean = a < b && c > d; }");
        match init_of(&stmts[0]) {
            ExprKind::Binary { op: BinOp::And, left, right } => {
                assert!(matches!(left.kind, ExprKind::Binary { op: BinOp::Lt, .. }));
                assert!(matches!(right.kind, ExprKind::Binary { op: BinOp::Gt, .. }));
            }
            other => panic!("expected &&, got {:?}", other),
        }
    }

    #[test]
    fn parse_precedence() {
        let stmts = body("function f(): void { let x: Integer = 1 + 2 * 3; }");
        match init_of(&stmts[0]) {
            ExprKind::Binary { op: BinOp::Add, right, .. } => {
                assert!(matches!(right.kind, ExprKind::Binary { op: BinOp::Mul, .. }));
            }
            other => panic!("expected +, got {:?}", other),
        }
    }

    #[test]
    fn parse_unary_binds_looser_than_postfix() {
        let stmts = body("function f(): void { let x: Float = -v.x; }");
        match init_of(&stmts[0]) {
            ExprKind::Unary { op: UnaryOp::Neg, operand } => {
                assert!(matches!(operand.kind, ExprKind::Decomposition { .. }));
            }
            other => panic!("expected negation, got {:?}", other),
        }
    }

    #[test]
    fn parse_new_and_calls() {
        let stmts = body("function f(): void { let v: Vector2<Float> = new Vector2<Float>(1.0, max(a, b)); }");
        match init_of(&stmts[0]) {
            ExprKind::New { args, .. } => {
                assert_eq!(args.len(), 2);
                assert!(matches!(&args[1].kind, ExprKind::Call { name, .. } if name == "max"));
            }
            other => panic!("expected new, got {:?}", other),
        }
    }

    #[test]
    fn parse_enum_values() {
        let module = parse_ok(
            "enum Mode { Fast = 1, Slow = 2, }
             function f(): void { let m: UnsignedInteger = Mode.Slow; }",
        );
        let p = module.types.primitives();
        assert_eq!(module.types.enum_underlying("Mode"), Some(p.unsigned_integer));
        match &module.document.declarations[1].kind {
            DeclKind::Function(f) => match &f.body.statements[0].kind {
                StmtKind::Variable(v) => assert!(matches!(
                    &v.init.as_ref().map(|e| &e.kind),
                    Some(ExprKind::EnumValue { enum_name, value }) if enum_name == "Mode" && value == "Slow"
                )),
                other => panic!("expected variable, got {:?}", other),
            },
            _ => unreachable!(),
        }
    }

    #[test]
    fn enum_underlying_follows_first_value() {
        let module = parse_ok(
            "enum A { X = 1i } enum B { X = 1.5 } enum C { X = \"x\" } enum D { X = 1.0h }",
        );
        let p = module.types.primitives();
        assert_eq!(module.types.enum_underlying("A"), Some(p.integer));
        assert_eq!(module.types.enum_underlying("B"), Some(p.float));
        assert_eq!(module.types.enum_underlying("C"), Some(p.string));
        assert_eq!(module.types.enum_underlying("D"), Some(p.float16));
    }

    #[test]
    fn parse_control_flow() {
        let stmts = body(
            "function f(): void {
                if (a) { } else if (b) { } else { }
                for (let i: Integer = 0; i < 4; i++) { continue; }
                while (true) { break; }
                do { x += 1; } while (x < 10);
                switch (m) { case 1, 2 { } default { } }
                return;
            }",
        );
        assert_eq!(stmts.len(), 6);
        match &stmts[0] {
            StmtKind::If { else_branch: Some(else_if), .. } => {
                assert!(matches!(else_if.kind, StmtKind::If { else_branch: Some(_), .. }));
            }
            other => panic!("expected if, got {:?}", other),
        }
        match &stmts[1] {
            StmtKind::For { init, condition, update, .. } => {
                assert!(init.is_some() && condition.is_some());
                assert!(matches!(
                    update.as_ref().map(|s| &s.kind),
                    Some(StmtKind::IncrementDecrement { increment: true, .. })
                ));
            }
            other => panic!("expected for, got {:?}", other),
        }
        match &stmts[3] {
            StmtKind::DoWhile { body, .. } => assert!(matches!(
                body.statements[0].kind,
                StmtKind::Assignment { op: AssignOp::Compound(BinOp::Add), .. }
            )),
            other => panic!("expected do-while, got {:?}", other),
        }
        match &stmts[4] {
            StmtKind::Switch { cases, default, .. } => {
                assert_eq!(cases[0].values.len(), 2);
                assert!(default.is_some());
            }
            other => panic!("expected switch, got {:?}", other),
        }
    }

    #[test]
    fn parse_attributes() {
        let module = parse_ok(
            "struct VertexOut { position: Position, [Location(\"uv\")] uv: Vector2<Float> }
             [ComputeEntry(8, 8, 1)]
             function main([Interpolate(InterpolationType.Flat)] id: GlobalInvocationId): void { }",
        );
        let main = &module.document.declarations[1];
        let entry = main.attribute("ComputeEntry").expect("attribute");
        assert_eq!(entry.args.len(), 3);
        match &main.kind {
            DeclKind::Function(f) => assert_eq!(f.params[0].attributes[0].name, "Interpolate"),
            _ => unreachable!(),
        }
    }

    #[test]
    fn prelude_declarations_are_build_in() {
        let tokens = pgsl_lexer::Lexer::new("storage data: Array<Float>;").tokenize().expect("lex");
        let module = Parser::new(tokens)
            .with_prelude(prelude_tokens().expect("prelude"))
            .parse()
            .expect("parse");
        let decls = &module.document.declarations;
        assert_eq!(decls.len(), 4);
        assert!(decls[..3].iter().all(|d| d.build_in));
        assert!(!decls[3].build_in);
        assert_eq!(module.types.enum_underlying("AccessMode"), Some(module.types.primitives().string));
    }

    #[test]
    fn node_ids_are_unique() {
        let module = parse_ok("function f(a: Float): Float { return a * 2.0 + 1.0; }");
        let mut ids = vec![module.document.declarations[0].id];
        if let DeclKind::Function(f) = &module.document.declarations[0].kind {
            ids.push(f.params[0].id);
            ids.push(f.body.id);
            ids.push(f.body.statements[0].id);
        }
        let mut sorted = ids.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), ids.len());
    }

    #[test]
    fn error_unknown_type() {
        let err = parse("private x: Foo;").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnknownType);
    }

    #[test]
    fn error_type_used_before_declaration() {
        let err = parse("private x: Light; struct Light { a: Float }").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnknownType);
    }

    #[test]
    fn error_template_arity() {
        let err = parse("private x: Vector3<Float, Float>;").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::TemplateArity);
        let err = parse("private y: Float<Integer>;").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::TemplateArity);
    }

    #[test]
    fn error_invalid_texel_format() {
        let err = parse("uniform t: TextureStorage2d<\"nope\", \"write\">;").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidTemplate);
    }

    #[test]
    fn error_missing_semicolon() {
        let err = parse("function f(): void { let x: Float = 1.0 }").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Syntax);
        assert!(err.message.contains("';'"), "message: {}", err.message);
    }

    #[test]
    fn error_expression_statement() {
        let err = parse("function f(): void { a + b; }").unwrap_err();
        assert!(err.hint.is_some());
    }

    #[test]
    fn error_duplicate_default() {
        let err = parse("function f(): void { switch (x) { default { } default { } } }").unwrap_err();
        assert!(err.message.contains("default"));
    }

    #[test]
    fn error_at_end_of_input() {
        let err = parse("function f(): void {").unwrap_err();
        assert!(err.message.contains("'}'"), "message: {}", err.message);
        let tokens = pgsl_lexer::Lexer::new("").tokenize().expect("lex");
        assert!(matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Eof)));
        assert!(Parser::new(tokens).parse().expect("empty").document.declarations.is_empty());
    }
}
