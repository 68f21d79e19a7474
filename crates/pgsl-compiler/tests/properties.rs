// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Type identity, the cast lattice, template disambiguation, scoping and
//! transpiler output over whole modules.

use pgsl_ast::decl::DeclKind;
use pgsl_ast::expr::{BinOp, ExprKind};
use pgsl_compiler::{compile, parse, CompileError, Module};
use pgsl_types::NumericKind;

fn valid(src: &str) -> Module {
    let module = match parse(src) {
        Ok(module) => module,
        Err(e) => panic!("parse failed: {}", e),
    };
    assert!(module.is_valid(), "{:?}", module.diagnostics());
    module
}

#[test]
fn identical_types_share_one_id() {
    let module = valid(
        "private a: Array<Integer, 3>;
         private b: Array<Integer, 3>;
         private c: Array<Integer, 4>;",
    );
    let a = module.variable("a").expect("a").ty;
    let b = module.variable("b").expect("b").ty;
    let c = module.variable("c").expect("c").ty;
    assert_eq!(a, b);
    assert_eq!(module.types().identifier(a), module.types().identifier(b));
    assert_ne!(a, c);
}

#[test]
fn cast_lattice() {
    let module = valid("const a: Float = 1.0;");
    let types = module.types();
    let p = types.primitives();

    for kind in NumericKind::CONCRETE {
        let ty = p.numeric(kind);
        assert!(types.is_explicit_castable(ty, ty), "{}", kind.name());
    }
    for target in [p.integer, p.unsigned_integer, p.float] {
        assert!(types.is_implicit_castable(p.abstract_integer, target));
    }
    for other in [p.integer, p.unsigned_integer, p.float, p.float16] {
        assert!(!types.is_explicit_castable(p.boolean, other));
        assert!(!types.is_explicit_castable(other, p.boolean));
        assert!(!types.is_implicit_castable(p.boolean, other));
    }
}

fn init_op(module: &Module, name: &str) -> ExprKind {
    let decl = module.document().resolve_variable(name).expect("declared");
    decl.init.as_ref().expect("initializer").kind.clone()
}

#[test]
fn comparisons_are_not_template_lists() {
    let module = valid(
        "const a: Integer = 1; const b: Integer = 2;
         const c: Integer = 3; const d: Integer = 4;
         const less: Boolean = a < b;
         const both: Boolean = a < b && c > d;",
    );

    assert!(matches!(init_op(&module, "less"), ExprKind::Binary { op: BinOp::Lt, .. }));

    match init_op(&module, "both") {
        ExprKind::Binary { op: BinOp::And, left, right } => {
            assert!(matches!(left.kind, ExprKind::Binary { op: BinOp::Lt, .. }));
            assert!(matches!(right.kind, ExprKind::Binary { op: BinOp::Gt, .. }));
        }
        other => panic!("expected `&&`, found {:?}", other),
    }
}

#[test]
fn template_list_in_type_position() {
    let module = valid("private v: Array<Integer, 3>;");
    let v = module.variable("v").expect("v");
    assert_eq!(module.types().name(v.ty), "Array<Integer,3>");
}

#[test]
fn inner_let_shadows_until_block_ends() {
    // Each initializer only type-checks against the intended `x`.
    valid(
        "function f(): void {
             let x: Integer = 1;
             {
                 let x: Float = 2.0;
                 let inner: Float = x;
             }
             let outer: Integer = x;
         }",
    );
    let module = parse(
        "function f(): void {
             let x: Integer = 1;
             {
                 let x: Float = 2.0;
             }
             let outer: Float = x;
         }",
    )
    .expect("parses");
    assert_eq!(module.diagnostics().len(), 1);
}

const PROGRAMS: &[&str] = &[
    "const scale: Float = 2.0;",
    "struct Light { color: Vector3<Float>, intensity: Float }
     [GroupBinding(\"scene\", \"light\")] uniform light: Light;
     function shade(n: Vector3<Float>): Vector3<Float> {
         return light.color * light.intensity * max(n.z, 0.0);
     }",
    "[GroupBinding(\"data\", \"values\")] storage values: Array<Float>;
     [ComputeEntry(64)]
     function main(id: GlobalInvocationId): void {
         let i: UnsignedInteger = id.x;
         values[i] = values[i] * 2.0;
     }",
    "enum Mode { Add = 1u, Scale = 2u }
     function apply(mode: UnsignedInteger, v: Float): Float {
         let result: Float = v;
         switch (mode) {
             case 1u { result += 1.0; }
             default { result *= 2.0; }
         }
         for (let i: Integer = 0; i < 4; i++) {
             if (result > 10.0) { break; }
             result = result + 1.0;
         }
         return result;
     }",
    "function negate(x: Integer, b: Boolean): Integer {
         let flag: Boolean = !!b;
         if (flag) { return - -x; }
         return ~-x - -(-x);
     }",
    "enum Size { Lanes = 4u }
     workgroup tile: Array<Float, Size.Lanes>;
     [ComputeEntry(4)]
     function main(local: LocalInvocationIndex): void {
         tile[local] = 1.0;
         tile[Size.Lanes - 1u] = tile[0];
     }",
    "struct VertexOut {
         position: Position,
         [Location(\"uv\")] uv: Vector2<Float>
     }
     [VertexEntry()]
     function vs(index: VertexIndex): VertexOut {
         let x: Float = new Float(index) - 1.0;
         return new VertexOut(new Vector4<Float>(x, 0.0, 0.0, 1.0), new Vector2<Float>(x, 1.0));
     }
     [FragmentEntry()]
     function fs([Location(\"uv\")] uv: Vector2<Float>): FragDepth {
         return uv.x;
     }",
    "const big: UnsignedInteger = 4294967295;
     const top: UnsignedInteger = 0xffffffffu;
     const low: Integer = -2147483648;
     const high: Integer = 2147483647i;
     function edges(): UnsignedInteger {
         return big / 4u + top / 4u + new UnsignedInteger(high / 4i - low / 4i);
     }",
];

/// Parse and validate generated WGSL with naga.
fn check_wgsl(wgsl: &str) -> Result<(), String> {
    let module = naga::front::wgsl::parse_str(wgsl).map_err(|e| e.emit_to_string(wgsl))?;
    naga::valid::Validator::new(naga::valid::ValidationFlags::all(), naga::valid::Capabilities::all())
        .validate(&module)
        .map_err(|e| e.emit_to_string(wgsl))?;
    Ok(())
}

#[test]
fn accepted_programs_produce_valid_wgsl() {
    for src in PROGRAMS {
        let wgsl = match compile(src) {
            Ok(wgsl) => wgsl,
            Err(e) => panic!("{}\n{:?}", e, e.diagnostics()),
        };
        assert!(!wgsl.trim().is_empty(), "{}", src);
        assert!(wgsl.ends_with('\n'));
        if let Err(message) = check_wgsl(&wgsl) {
            panic!("naga rejected the output of\n{}\n---\n{}\n---\n{}", src, wgsl, message);
        }
    }
}

#[test]
fn rejected_programs_never_reach_output() {
    assert!(matches!(compile("const a: Integer = 2147483648i;"), Err(CompileError::Lex { .. })));
    assert!(matches!(
        compile("enum E { A = -4i } private v: Array<Float, E.A>;"),
        Err(CompileError::Parse { .. })
    ));
    for src in [
        "const a: Integer = 3000000000;",
        "function f(v: Array<Float, 4>): Float { return v[-1]; }",
        "function f(id: GlobalInvocationId): UnsignedInteger { return id.x; }",
    ] {
        assert!(matches!(compile(src), Err(CompileError::Invalid(_))), "{}", src);
    }
}

#[test]
fn user_declarations_exclude_prelude() {
    let module = valid("const a: Float = 1.0;");
    let user: Vec<_> = module.document().user_declarations().collect();
    assert_eq!(user.len(), 1);
    assert!(matches!(user[0].kind, DeclKind::Variable(_)));
}
