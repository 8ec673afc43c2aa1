use std::path::Path;

use opera::{
    Session,
    driver::{Config, run_file},
    error::{Error, ParseError, RuntimeError},
    evaluate_source,
    interpreter::{lexer::lex, parser::core::Parser, value::core::Value},
};
use walkdir::WalkDir;

#[test]
fn demo_scripts_run() {
    let mut count = 0;

    for entry in
        WalkDir::new("demos").into_iter()
                             .filter_map(Result::ok)
                             .filter(|e| e.path().extension().is_some_and(|ext| ext == "op"))
    {
        count += 1;
        let path = entry.path();
        match run_file(path, &Config::default()) {
            Ok(Some(Value::Bool(false))) => panic!("Demo {path:?} evaluated to false"),
            Ok(_) => {},
            Err(e) => panic!("Demo {path:?} failed:\n{e}"),
        }
    }

    assert!(count > 0, "No demo scripts found in demos/");
}

#[test]
fn demo_results() {
    let run = |name: &str| run_file(&Path::new("demos").join(name), &Config::default()).unwrap();

    assert_eq!(run("arithmetic.op"), Some(Value::from("hello, world")));
    assert_eq!(run("operators.op"), Some(Value::Bool(true)));
    assert_eq!(run("closures.op"), Some(Value::Bool(true)));
    assert_eq!(run("includes.op"),
               Some(Value::from("TAU is only replaced outside strings: TAU")));
}

fn eval(src: &str) -> Value {
    match evaluate_source(src) {
        Ok(Some(value)) => value,
        Ok(None) => panic!("Script produced no value"),
        Err(e) => panic!("Script failed: {e}"),
    }
}

fn assert_success(src: &str) {
    if let Err(e) = evaluate_source(src) {
        panic!("Script failed: {e}");
    }
}

fn assert_failure(src: &str) {
    if evaluate_source(src).is_ok() {
        panic!("Script succeeded but was expected to fail")
    }
}

fn assert_true(src: &str) {
    assert_eq!(eval(src), Value::Bool(true), "{src}");
}

#[test]
fn left_associative_operators_group_left() {
    assert_eq!(eval("2 - 3 - 4"), Value::Number(-5.0));
    assert_eq!(eval("100 / 10 / 5"), Value::Number(2.0));
}

#[test]
fn assignment_is_right_associative() {
    assert_true("a = b = 5; a == 5 && b == 5");
    assert_eq!(eval("a = b = 5"), Value::Number(5.0));
}

#[test]
fn declared_operators_are_usable_in_the_same_session() {
    let mut session = Session::new();
    assert!(matches!(session.run("1 @ 2"),
                     Err(Error::Parse(ParseError::UnknownOperator { .. }))));

    session.run("infixl 6 @ (a, b) = a * b + 1").unwrap();
    assert_eq!(session.run("2 @ 3 @ 4").unwrap(), Some(Value::Number(29.0)));
}

#[test]
fn overriding_a_builtin_affects_only_later_evaluations() {
    let mut session = Session::new();
    assert_eq!(session.run("let before = 1 + 1").unwrap(),
               Some(Value::Number(2.0)));
    session.run("infixl 6 + (a, b) = a * b").unwrap();
    assert_eq!(session.run("before").unwrap(), Some(Value::Number(2.0)));
    assert_eq!(session.run("3 + 3").unwrap(), Some(Value::Number(9.0)));
}

#[test]
fn rendering_and_reparsing_preserves_shape() {
    let source = "infixr 7 <> (a, b) = a - b; let v = -(1 <> 2 <> 3)! ^ 2; f(v)(1, fn(x) { x; })";
    let first = Parser::new().parse(&lex(source).unwrap()).unwrap();
    let rendered = first.exprs
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(";\n");

    let second = Parser::new().parse(&lex(&rendered).unwrap()).unwrap();
    let rerendered = second.exprs
                           .iter()
                           .map(ToString::to_string)
                           .collect::<Vec<_>>()
                           .join(";\n");
    assert_eq!(rendered, rerendered);
    assert_eq!(first.operators, second.operators);
}

#[test]
fn rendered_programs_evaluate_like_their_source() {
    let sources = ["let g = if true then (fn(x) if x then 1) else 2; g(false)",
                   "let h = if true then (y = fn(x) if x then 1) else 2; h(false)",
                   "if false then (fn(x) if x then 1) else 2"];
    for source in sources {
        let parsed = Parser::new().parse(&lex(source).unwrap()).unwrap();
        let rendered = parsed.exprs
                             .iter()
                             .map(ToString::to_string)
                             .collect::<Vec<_>>()
                             .join(";\n");
        assert_eq!(evaluate_source(&rendered).unwrap(),
                   evaluate_source(source).unwrap(),
                   "{rendered}");
    }
    let open_if = "let g = if true then (fn(x) if x then 1) else 2; g(false)";
    assert_eq!(evaluate_source(open_if).unwrap(), Some(Value::Unit));
}

#[test]
fn out_of_range_literals_are_parse_errors() {
    assert!(matches!(evaluate_source("let big = 1e400"),
                     Err(Error::Parse(ParseError::InvalidNumber { .. }))));
    assert_eq!(evaluate_source("1e300 * 1").unwrap(), Some(Value::Number(1e300)));
}

#[test]
fn deeply_nested_programs_fail_cleanly() {
    let negations = format!("{}1", "- ".repeat(200_000));
    assert!(matches!(evaluate_source(&negations),
                     Err(Error::Parse(ParseError::NestingTooDeep { .. }))));

    let sum = format!("0{}", " + 1".repeat(300));
    assert_eq!(evaluate_source(&sum).unwrap(), Some(Value::Number(300.0)));

    let mut session = Session::new();
    let chain = format!("let f = fn() f; f{}", "()".repeat(100_000));
    assert!(matches!(session.run(&chain),
                     Err(Error::Parse(ParseError::NestingTooDeep { .. }))));
    assert_eq!(session.run("1 + 1").unwrap(), Some(Value::Number(2.0)));
}

#[test]
fn unbound_names_leave_the_environment_alone() {
    let mut session = Session::new();
    assert!(matches!(session.run("let y = x + 1"),
                     Err(Error::Runtime(RuntimeError::UnboundName { .. }))));
    assert!(matches!(session.run("y"),
                     Err(Error::Runtime(RuntimeError::UnboundName { .. }))));
}

#[test]
fn wrong_arity_leaves_the_environment_alone() {
    let mut session = Session::new();
    session.run("let n = 1; let set = fn(v) n = v").unwrap();
    assert!(matches!(session.run("set(2, 3)"),
                     Err(Error::Runtime(RuntimeError::Arity { expected: 1, found: 2, .. }))));
    assert_eq!(session.run("n").unwrap(), Some(Value::Number(1.0)));
    session.run("set(4)").unwrap();
    assert_eq!(session.run("n").unwrap(), Some(Value::Number(4.0)));
}

#[test]
fn empty_programs_have_no_value() {
    assert_eq!(evaluate_source("").unwrap(), None);
    assert_eq!(evaluate_source("  # nothing here\n;;").unwrap(), None);
}

#[test]
fn scoping() {
    assert_true("let x = 1; { let x = 2; x } == 2 && x == 1");
    assert_true("let x = 1; { x = 2 }; x == 2");
    assert_true("{ let hidden = 1 }; let hidden = 3; hidden == 3");
    assert_failure("{ let inner = 1 }; inner");
    assert_true("let k = 2; let add_k = fn(x) x + k; k = 10; add_k(1) == 11");
}

#[test]
fn conditionals() {
    assert_eq!(eval("if 1 < 2 then \"yes\" else \"no\""), Value::from("yes"));
    assert_eq!(eval("if false then 1"), Value::Unit);
    assert_eq!(eval("if false then 1 else if true then 2 else 3"),
               Value::Number(2.0));
    assert_failure("if 1 then 2 else 3");
    assert_success("if true then 1 else undefined_name");
}

#[test]
fn values_render_as_program_output() {
    let render = |src: &str| eval(src).to_string();
    assert_eq!(render("6 / 3"), "2");
    assert_eq!(render("1 / 4"), "0.25");
    assert_eq!(render("0 - 0"), "0");
    assert_eq!(render("\"a\" + \"b\""), "ab");
    assert_eq!(render("1 == 1"), "true");
    assert_eq!(render("()"), "()");
    assert_eq!(render("(+)"), "<operator +>");
    assert_eq!(render("fn(a, b) a"), "<fn/2>");
}

#[test]
fn runtime_errors() {
    assert!(matches!(evaluate_source("1 / 0"),
                     Err(Error::Runtime(RuntimeError::Domain { .. }))));
    assert!(matches!(evaluate_source("(0 - 3)!"),
                     Err(Error::Runtime(RuntimeError::Domain { .. }))));
    assert!(matches!(evaluate_source("1 + true"),
                     Err(Error::Runtime(RuntimeError::TypeError { .. }))));
    assert!(matches!(evaluate_source("let f = fn(n) f(n + 1); f(0)"),
                     Err(Error::Runtime(RuntimeError::RecursionLimit { .. }))));
    assert!(matches!(evaluate_source("undefined_fn(1)"),
                     Err(Error::Runtime(RuntimeError::UnboundName { .. }))));
}

#[test]
fn operators_must_be_declared_before_they_are_read() {
    let err = evaluate_source("let early = fn() ~ 1; early(); prefix 9 ~ (x) = 0 - x");
    assert!(matches!(err,
                     Err(Error::Parse(ParseError::UnknownOperator { .. }))));

    let value = evaluate_source("prefix 9 ~ (x) = 0 - x; ~ 1").unwrap();
    assert_eq!(value, Some(Value::Number(-1.0)));
}

#[test]
fn declarations_that_never_ran_have_no_implementation() {
    let src = "let unused = fn() { infixl 6 <+> (a, b) = a; 0 }; 1 <+> 2";
    assert!(matches!(evaluate_source(src),
                     Err(Error::Runtime(RuntimeError::UndefinedOperator { .. }))));
    assert_true("let used = fn() { infixl 6 <+> (a, b) = a; 0 }; used(); 1 <+> 2 == 1");
}

#[test]
fn syntax_errors_carry_positions() {
    let Err(Error::Parse(err)) = evaluate_source("let x = 1;\nx +* 2") else {
        panic!("expected a parse error");
    };
    assert_eq!((err.position().line, err.position().column), (2, 3));
}
