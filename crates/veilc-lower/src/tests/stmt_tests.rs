use crate::session::Session;
use crate::stmt::lower_method;
use crate::tests::loc;
use crate::LowerError;
use veilc_ast::{DeclRegistry, Expr, ExternSpec, Formal, MethodDecl, Stmt, Type};
use veilc_emit::CodeSink;

fn method(name: &str) -> MethodDecl {
    MethodDecl {
        name: name.to_string(),
        type_params: vec![],
        ins: vec![],
        outs: vec![],
        body: vec![],
        is_tail_recursive: false,
        external: None,
        loc: loc(),
    }
}

fn lower(m: &MethodDecl) -> String {
    let registry = DeclRegistry::new();
    let sess = Session::new(&registry);
    let mut sink = CodeSink::new();
    lower_method(&sess, m, &mut sink).unwrap();
    sink.finish()
}

fn lower_err(m: &MethodDecl) -> LowerError {
    let registry = DeclRegistry::new();
    let sess = Session::new(&registry);
    let mut sink = CodeSink::new();
    lower_method(&sess, m, &mut sink).unwrap_err()
}

#[test]
fn test_signature_and_out_parameter_defaults() {
    let mut m = method("Find");
    m.ins = vec![Formal::new("key", Type::Int)];
    m.outs = vec![
        Formal::new("found", Type::Bool),
        Formal::new("where", Type::Int),
    ];
    let out = lower(&m);
    assert!(out.contains(
        "public static void Find(BigInteger key, out bool found, out BigInteger where)"
    ));
    // Every out-parameter is definitely assigned before any body statement.
    assert!(out.contains("found = false;"));
    assert!(out.contains("where = BigInteger.Zero;"));
}

#[test]
fn test_generic_method_signature() {
    let mut m = method("Pick");
    m.type_params = vec!["T".to_string()];
    m.ins = vec![Formal::new("x", Type::TypeParam("T".to_string()))];
    let out = lower(&m);
    assert!(out.contains("public static void Pick<T>(T x)"));
}

#[test]
fn test_return_assigns_outs_in_order() {
    let mut m = method("Two");
    m.outs = vec![Formal::new("a", Type::Int), Formal::new("b", Type::Bool)];
    m.body = vec![Stmt::Return {
        values: vec![Expr::int(1), Expr::bool(true)],
    }];
    let out = lower(&m);
    let a = out.find("a = new BigInteger(1);").unwrap();
    let b = out.find("b = true;").unwrap();
    let ret = out.rfind("return;").unwrap();
    assert!(a < b && b < ret);
}

#[test]
fn test_tail_recursion_label_and_jump() {
    let mut m = method("Sum");
    m.ins = vec![
        Formal::new("n", Type::Int),
        Formal::new("acc", Type::Int),
    ];
    m.is_tail_recursive = true;
    m.body = vec![Stmt::TailCall {
        args: vec![Expr::var("n"), Expr::var("acc")],
    }];
    let out = lower(&m);
    assert!(out.contains("TAIL_CALL_START: ;"));
    assert!(out.contains("goto TAIL_CALL_START;"));
}

#[test]
fn test_tail_call_evaluates_all_arguments_before_reassigning() {
    let mut m = method("Step");
    m.ins = vec![
        Formal::new("a", Type::Int),
        Formal::new("b", Type::Int),
    ];
    m.is_tail_recursive = true;
    // Step(b, a): naive in-place assignment would clobber `a` before the
    // second argument reads it.
    m.body = vec![Stmt::TailCall {
        args: vec![Expr::var("b"), Expr::var("a")],
    }];
    let out = lower(&m);
    assert!(out.contains("var _in0 = b;"));
    assert!(out.contains("var _in1 = a;"));
    let last_temp = out.find("var _in1").unwrap();
    let first_write = out.find("a = _in0;").unwrap();
    assert!(last_temp < first_write);
    assert!(out.contains("b = _in1;"));
}

#[test]
fn test_labeled_break_jumps_past_the_statement() {
    let mut m = method("Scan");
    m.body = vec![Stmt::Labeled {
        label: "outer".to_string(),
        body: vec![Stmt::While {
            cond: None,
            body: vec![Stmt::Break {
                label: Some("outer".to_string()),
            }],
        }],
    }];
    let out = lower(&m);
    assert!(out.contains("while (true)"));
    assert!(out.contains("goto after_outer;"));
    // The landing label follows the labeled statement.
    let jump = out.find("goto after_outer;").unwrap();
    let land = out.find("after_outer: ;").unwrap();
    assert!(jump < land);
}

#[test]
fn test_unlabeled_break_stays_native() {
    let mut m = method("Loop");
    m.body = vec![Stmt::While {
        cond: Some(Expr::var("going")),
        body: vec![Stmt::Break { label: None }],
    }];
    let out = lower(&m);
    assert!(out.contains("while (going)"));
    assert!(out.contains("break;"));
    assert!(!out.contains("goto"));
}

#[test]
fn test_var_decl_without_initializer_takes_default() {
    let mut m = method("Init");
    m.body = vec![
        Stmt::VarDecl {
            name: "s".to_string(),
            ty: Type::seq(Type::Char),
            init: None,
        },
        Stmt::VarDecl {
            name: "n".to_string(),
            ty: Type::Int,
            init: Some(Expr::int(3)),
        },
    ];
    let out = lower(&m);
    assert!(out.contains("Veil.Sequence<char> s = Veil.Sequence<char>.Empty;"));
    assert!(out.contains("BigInteger n = new BigInteger(3);"));
}

#[test]
fn test_if_else_renders_cuddled() {
    let mut m = method("Choose");
    m.body = vec![Stmt::If {
        cond: Expr::var("b"),
        then_branch: vec![Stmt::Print {
            args: vec![Expr::int(1)],
        }],
        else_branch: vec![Stmt::Print {
            args: vec![Expr::int(2)],
        }],
    }];
    let out = lower(&m);
    assert!(out.contains("if (b)"));
    assert!(out.contains("} else {"));
    assert!(out.contains("Veil.Helpers.Print(new BigInteger(1));"));
}

#[test]
fn test_witness_search_doubles_without_bound() {
    let mut m = method("Search");
    m.body = vec![Stmt::WitnessSearch {
        index: "_bound".to_string(),
        body: vec![Stmt::Unreachable],
    }];
    let out = lower(&m);
    assert!(out.contains("for (BigInteger _bound = BigInteger.One; ; _bound = _bound * 2)"));
    assert!(out.contains("throw new System.Exception(\"unexpected control point\");"));
}

#[test]
fn test_call_statement_threads_out_arguments() {
    let mut m = method("Caller");
    m.body = vec![Stmt::Call {
        outs: vec!["r".to_string()],
        callee: "_Module.Find".to_string(),
        args: vec![Expr::var("k")],
    }];
    let out = lower(&m);
    assert!(out.contains("_Module.Find(k, out r);"));
}

#[test]
fn test_extern_method_emits_only_a_note() {
    let mut m = method("ReadByte");
    m.external = Some(ExternSpec {
        args: vec!["IO".to_string(), "ReadByte".to_string()],
    });
    let out = lower(&m);
    assert_eq!(out.trim(), "// extern method ReadByte");
}

#[test]
fn test_extern_with_too_many_arguments_is_rejected() {
    let mut m = method("Bad");
    m.external = Some(ExternSpec {
        args: vec!["a".to_string(), "b".to_string(), "c".to_string()],
    });
    match lower_err(&m) {
        LowerError::MalformedExtern { name, count, .. } => {
            assert_eq!(name, "Bad");
            assert_eq!(count, 3);
        }
        other => panic!("expected MalformedExtern, got {:?}", other),
    }
}

#[test]
fn test_extern_with_body_is_rejected() {
    let mut m = method("Worse");
    m.external = Some(ExternSpec { args: vec![] });
    m.body = vec![Stmt::Unreachable];
    match lower_err(&m) {
        LowerError::ExternHasBody { name, .. } => assert_eq!(name, "Worse"),
        other => panic!("expected ExternHasBody, got {:?}", other),
    }
}
