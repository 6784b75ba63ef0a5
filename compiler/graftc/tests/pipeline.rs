//! End-to-end pipeline tests: source text through lexing, parsing,
//! declaration collection, sealing, and elaboration.

use graft_diagnostic::ErrorCode;
use graftc::{compile, CancelFlag, CompileOutput, SourceUnit};

fn compile_one(source: &str) -> CompileOutput {
    compile(
        vec![SourceUnit::new("test.gr", source)],
        &CancelFlag::new(),
    )
    .expect("not cancelled")
}

fn codes(output: &CompileOutput) -> Vec<ErrorCode> {
    output
        .units
        .iter()
        .flat_map(|u| u.diagnostics.iter().map(|d| d.code))
        .collect()
}

#[test]
fn test_clean_program_compiles() {
    let output = compile_one(
        "newtype Meters = f64;\n\
         subtype Altitude = Meters;\n\
         sum Option { Some(i32) | None }\n\
         struct Point { x: f32, y: f32 }\n\
         fn up(m: Meters) -> f64 { m # f64 }\n\
         fn climb(a: Altitude) -> Meters { a # Meters }\n\
         fn origin() -> Point { Point { x: 0.0, y: 0.0 } }\n\
         fn pick(o: Option) -> i32 {\n\
             if let Some(v) = o { v } else { 0 }\n\
         }\n",
    );
    assert!(!output.has_errors(), "diagnostics: {:?}", codes(&output));
    assert_eq!(output.units[0].typed.len(), 4);
}

#[test]
fn test_every_expression_is_typed() {
    let output = compile_one("fn f(a: i64, b: i64) -> i64 { a + b * 2 }");
    assert!(!output.has_errors());
    let typed = &output.units[0].typed[0];
    // a, b, 2, b * 2, a + b * 2, and the body block all carry a type.
    assert!(typed.expr_types.len() >= 6);
}

#[test]
fn test_cast_nodes_recorded() {
    let output = compile_one("fn f(x: i8) -> i64 { x # i64 }");
    assert!(!output.has_errors(), "diagnostics: {:?}", codes(&output));
    let typed = &output.units[0].typed[0];
    assert_eq!(typed.casts.len(), 1);
    let node = typed.casts.values().next().expect("one cast node");
    assert_eq!(node.kind, graft_types::CastKind::Reliable);
}

#[test]
fn test_cast_destination_inferred_from_annotation() {
    let output = compile_one("fn f(x: i8) -> i64 { let y: i64 = x #; y }");
    assert!(!output.has_errors(), "diagnostics: {:?}", codes(&output));
}

#[test]
fn test_unresolved_cast_target() {
    let output = compile_one("fn f(x: i8) { x #; }");
    assert!(codes(&output).contains(&ErrorCode::E4003));
}

#[test]
fn test_reliable_roundtrip_fails_with_suggestion() {
    // Widening is reliable; the way back is not.
    let output = compile_one("fn f(x: i16) -> i8 { x # i8 }");
    assert!(codes(&output).contains(&ErrorCode::E4001));
    let diag = output.units[0]
        .diagnostics
        .iter()
        .find(|d| d.code == ErrorCode::E4001)
        .expect("NoReliableCast diagnostic");
    assert!(!diag.suggestions.is_empty(), "suggests a checked operator");

    let output = compile_one("fn f(x: i16) -> i8 { x #? i8 }");
    assert!(!output.has_errors(), "diagnostics: {:?}", codes(&output));
}

#[test]
fn test_unsafe_rawptr_and_bitcast_always_typecheck() {
    let output = compile_one(
        "struct Node { next: rawptr }\n\
         fn down(p: rawptr) -> *Node { p #~ *Node }\n\
         fn bits(x: f32) -> u32 { x bitcast u32 }\n",
    );
    assert!(!output.has_errors(), "diagnostics: {:?}", codes(&output));
}

#[test]
fn test_bitcast_width_mismatch_rejected() {
    let output = compile_one("fn f(x: f64) -> u32 { x bitcast u32 }");
    assert!(codes(&output).contains(&ErrorCode::E4004));
}

#[test]
fn test_sibling_subtypes_not_castable() {
    let output = compile_one(
        "newtype Base = i32;\n\
         subtype Left = Base;\n\
         subtype Right = Base;\n\
         fn cross(l: Left) -> Right { l # Right }\n",
    );
    assert!(codes(&output).contains(&ErrorCode::E4001));
}

#[test]
fn test_let_else_fallthrough_is_compile_error() {
    let output = compile_one(
        "sum Option { Some(i32) | None }\n\
         fn f(o: Option) -> i32 {\n\
             let Some(x) = o else { };\n\
             x\n\
         }\n",
    );
    assert!(codes(&output).contains(&ErrorCode::E3003));
}

#[test]
fn test_let_else_with_divergent_terminal_compiles() {
    let output = compile_one(
        "sum Option { Some(i32) | None }\n\
         fn f(o: Option) -> i32 {\n\
             let Some(x) = o else { return 0; };\n\
             x\n\
         }\n",
    );
    assert!(!output.has_errors(), "diagnostics: {:?}", codes(&output));
}

#[test]
fn test_let_else_chain_attempts_in_order() {
    let output = compile_one(
        "sum Option { Some(i32) | None }\n\
         fn f(a: Option, b: Option) -> i32 {\n\
             let Some(x) = a else Some(x) = b else { return 0; };\n\
             x\n\
         }\n",
    );
    assert!(!output.has_errors(), "diagnostics: {:?}", codes(&output));
}

#[test]
fn test_refutable_let_without_else_rejected() {
    let output = compile_one(
        "sum Option { Some(i32) | None }\n\
         fn f(o: Option) -> i32 { let Some(x) = o; x }\n",
    );
    assert!(codes(&output).contains(&ErrorCode::E3001));
}

#[test]
fn test_ambiguous_binding_union_rejected() {
    let output = compile_one(
        "sum Option { Some(i32) | None }\n\
         fn f(a: Option, b: Option) -> i32 {\n\
             if let Some(x) = a || let Some(x) = b { x } else { 0 }\n\
         }\n",
    );
    assert!(codes(&output).contains(&ErrorCode::E3005));
}

#[test]
fn test_conjunctive_if_let_binding_visibility() {
    // `x` from the first clause is visible in the boolean clause and the
    // body; `y` from the later clause is visible in the body.
    let output = compile_one(
        "sum Option { Some(i32) | None }\n\
         fn f(a: Option, b: Option) -> i32 {\n\
             if let Some(x) = a && x > 0 && let Some(y) = b { x + y } else { 0 }\n\
         }\n",
    );
    assert!(!output.has_errors(), "diagnostics: {:?}", codes(&output));
}

#[test]
fn test_if_let_value_fallback() {
    let output = compile_one(
        "sum Option { Some(i32) | None }\n\
         fn f(a: Option, b: Option) -> i32 {\n\
             if let Some(x) = a else b { x } else { 0 }\n\
         }\n",
    );
    assert!(!output.has_errors(), "diagnostics: {:?}", codes(&output));
}

#[test]
fn test_pattern_annotation_mismatch() {
    let output = compile_one(
        "sum Option { Some(i32) | None }\n\
         fn f(o: Option) -> i32 {\n\
             if let Some(x: bool) = o { 1 } else { 0 }\n\
         }\n",
    );
    assert!(codes(&output).contains(&ErrorCode::E3002));
}

#[test]
fn test_match_expression_elaborates() {
    let output = compile_one(
        "sum Shape { Circle(f64) | Dot }\n\
         fn area(s: Shape) -> f64 {\n\
             match s { Circle(r) => r * r, Dot => 0.0 }\n\
         }\n",
    );
    // `Dot` parses as a binding covering the remaining cases.
    assert!(!output.has_errors(), "diagnostics: {:?}", codes(&output));
}

#[test]
fn test_cross_unit_type_references() {
    // Declaration collection spans all units before the barrier; unit
    // order must not matter.
    let output = compile(
        vec![
            SourceUnit::new(
                "use.gr",
                "fn up(a: Altitude) -> Meters { a # Meters }\n",
            ),
            SourceUnit::new(
                "def.gr",
                "newtype Meters = f64;\nsubtype Altitude = Meters;\n",
            ),
        ],
        &CancelFlag::new(),
    )
    .expect("not cancelled");
    assert!(!output.has_errors(), "diagnostics: {:?}", codes(&output));
}

#[test]
fn test_errors_batch_per_unit() {
    // The failing unit reports; the independent unit still elaborates.
    let output = compile(
        vec![
            SourceUnit::new("bad.gr", "fn bad() -> i32 { missing }\n"),
            SourceUnit::new("good.gr", "fn good() -> i32 { 1 + 2 }\n"),
        ],
        &CancelFlag::new(),
    )
    .expect("not cancelled");

    let bad = &output.units[0];
    let good = &output.units[1];
    assert!(bad.diagnostics.has_errors());
    assert!(!good.diagnostics.has_errors());
    assert_eq!(good.typed.len(), 1);
}

#[test]
fn test_cancellation_at_phase_boundary() {
    let cancel = CancelFlag::new();
    cancel.cancel();
    let result = compile(
        vec![SourceUnit::new("x.gr", "fn f() -> i32 { 1 }")],
        &cancel,
    );
    assert!(result.is_err());
}

#[test]
fn test_duplicate_type_name_across_units() {
    let output = compile(
        vec![
            SourceUnit::new("a.gr", "newtype Meters = f64;\n"),
            SourceUnit::new("b.gr", "newtype Meters = f32;\n"),
        ],
        &CancelFlag::new(),
    )
    .expect("not cancelled");
    assert!(codes(&output).contains(&ErrorCode::E2002));
}

#[test]
fn test_forward_references_within_unit() {
    let output = compile_one(
        "struct Outer { inner: Inner }\n\
         struct Inner { value: i32 }\n",
    );
    assert!(!output.has_errors(), "diagnostics: {:?}", codes(&output));
}

#[test]
fn test_generic_function_signature() {
    let output = compile_one("fn id<T>(x: T) -> T { x }\nfn use_it() -> i32 { id::<i32>(7) }\n");
    // Generic calls are accepted with opaque parameter types; the call
    // result carries the declared (parametric) return.
    assert!(!output
        .units
        .iter()
        .any(|u| u.diagnostics.iter().any(|d| d.code == ErrorCode::E2003)));
}

#[test]
fn test_while_let_and_assignment() {
    let output = compile_one(
        "sum Option { Some(i32) | None }\n\
         fn drain(o: Option) -> i32 {\n\
             let mut total: i32 = 0;\n\
             while let Some(x) = o { total = total + x; }\n\
             total\n\
         }\n",
    );
    assert!(!output.has_errors(), "diagnostics: {:?}", codes(&output));
}

#[test]
fn test_assignment_to_immutable_rejected() {
    let output = compile_one("fn f(x: i32) -> i32 { x = 1; x }");
    assert!(codes(&output).contains(&ErrorCode::E2004));
}
