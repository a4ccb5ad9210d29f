//! End-to-end language tests: tokenize, parse, evaluate and run `main`.

use pretty_assertions::assert_eq;
use rhovas::interp::{Config, Failure, Interpreter, RuntimeError};
use rhovas::lexer::tokenize;
use rhovas::parser::parse;
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

/// Output sink shared with the interpreter
#[derive(Clone, Default)]
struct Captured(Rc<RefCell<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
    }
}

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn interpreter(config: Config) -> (Interpreter, Captured) {
    let out = Captured::default();
    let interp = Interpreter::with_config(config).with_output(Box::new(out.clone()));
    (interp, out)
}

fn load(interp: &mut Interpreter, module: &str, source: &str) -> Result<Vec<rhovas::interp::TypeRef>, Failure> {
    let tokens = tokenize(source).unwrap();
    let ast = parse(&format!("{module}.rho"), source, tokens).unwrap();
    interp.evaluate(module, &ast)
}

/// Runs `main` of `source`, returning printed output and the outcome
fn run_with(config: Config, source: &str) -> (String, Result<String, Failure>) {
    let (mut interp, out) = interpreter(config);
    let result = load(&mut interp, "Main", source)
        .and_then(|types| interp.invoke_main(&types))
        .map(|value| interp.stringify(&value).unwrap());
    (out.text(), result)
}

fn run(source: &str) -> (String, Result<String, Failure>) {
    run_with(Config::default(), source)
}

/// Printed output of a program that must succeed
fn output(source: &str) -> String {
    let (out, result) = run(source);
    if let Err(err) = result {
        panic!("program failed: {err}\noutput so far:\n{out}");
    }
    out
}

#[test]
fn test_hello_world() {
    insta::assert_snapshot!(output(r#"func main() { print("Hello, World!"); }"#), @"Hello, World!");
}

#[test]
fn test_block_variables_are_not_visible_after_block() {
    let source = r#"
        func main() {
            {
                var inner = 1;
                inner = inner + 1;
                print(inner);
            }
            print(inner);
        }"#;
    let (out, result) = run(source);
    assert_eq!(out, "2\n");
    match result {
        Err(Failure::Runtime(RuntimeError::UndefinedVariable { name, .. })) => assert_eq!(name, "inner"),
        other => panic!("expected undefined variable, got {other:?}"),
    }
}

#[test]
fn test_lambdas_capture_per_iteration_variable() {
    let source = r#"
        func main() {
            val lambdas = [];
            for (i in range(0, 3)) {
                lambdas.add(|| i * 10);
            }
            for (f in lambdas) {
                print(f());
            }
        }"#;
    insta::assert_snapshot!(output(source), @r"
    0
    10
    20
    ");
}

#[test]
fn test_operator_override_returns_fixed_object() {
    let source = r#"
        class Money {
            val cents;
            ctor(cents) { this.cents = cents; }
            func +(other) { return :fixed; }
        }
        func main() {
            print(Money(1) + Money(2));
            print(Money(-500) + Money(0));
        }"#;
    insta::assert_snapshot!(output(source), @r"
    :fixed
    :fixed
    ");
}

#[test]
fn test_catch_by_supertype() {
    let source = r#"
        class Problem {}
        class NotFound : Problem {}
        class Unrelated {}
        func attempt(thrown) {
            try {
                throw thrown;
            } catch (e: Problem) {
                return "caught";
            }
        }
        func main() {
            print(attempt(NotFound()));
            print(attempt(Problem()));
            attempt(Unrelated());
            print("unreachable");
        }"#;
    let (out, result) = run(source);
    assert_eq!(out, "caught\ncaught\n");
    assert!(matches!(result, Err(Failure::Uncaught { .. })));
}

#[test]
fn test_exception_prelude() {
    let source = r#"
        class NotFound : Exception {
            ctor(name) { this.message = name + " not found"; }
        }
        func main() {
            try {
                throw NotFound("key");
            } catch (e: Exception) {
                print(e.message);
                print(e);
            }
            throw Exception("boom");
        }"#;
    let (out, result) = run(source);
    insta::assert_snapshot!(out, @r"
    key not found
    Exception: key not found
    ");
    match result {
        Err(Failure::Uncaught { rendered, .. }) => assert_eq!(rendered, "Exception: boom"),
        other => panic!("expected uncaught exception, got {other:?}"),
    }
}

#[test]
fn test_match_with_else_and_exhaustiveness() {
    let with_else = |x: i64| {
        output(&format!(
            r#"func main() {{ match ({x}) {{ 1: print("a"); else: print("b"); }} }}"#
        ))
    };
    assert_eq!(with_else(1), "a\n");
    assert_eq!(with_else(2), "b\n");

    let (_, result) = run(r#"func main() { match (2) { 1: print("a"); } }"#);
    assert!(matches!(
        result,
        Err(Failure::Runtime(RuntimeError::NonExhaustiveMatch { .. }))
    ));
}

#[test]
fn test_list_pattern_rest_capture() {
    let source = r#"
        func describe(list) {
            match (list) {
                [head, tail..]: return head.toString() + " then " + tail.toString();
                else: return "no match";
            }
        }
        func main() {
            print(describe([1, 2, 3]));
            print(describe([]));
        }"#;
    insta::assert_snapshot!(output(source), @r"
    1 then [2, 3]
    no match
    ");
}

#[test]
fn test_labeled_break_exits_outer_loop() {
    let source = r#"
        func main() {
            var iterations = 0;
            outer: while (true) {
                iterations = iterations + 1;
                while (true) {
                    break outer;
                }
            }
            print(iterations);
        }"#;
    assert_eq!(output(source), "1\n");
}

#[test]
fn test_struct_fields_round_trip() {
    let source = r#"
        struct Point { val x; val y; }
        func main() {
            val p = Point(1, 2);
            print(p.fields == {x: 1, y: 2});
            print(p.fields.keys);
            print(p);
        }"#;
    insta::assert_snapshot!(output(source), @r"
    true
    [x, y]
    Point {x: 1, y: 2}
    ");
}

#[test]
fn test_struct_constructor_arity_mismatch() {
    let (_, result) = run("struct Point { val x; val y; } func main() { Point(1, 2, 3); }");
    match result {
        Err(Failure::Runtime(err @ RuntimeError::ArityMismatch { .. })) => {
            assert_eq!(err.to_string(), "`Point` cannot be called with 3 argument(s) (expected 1 or 2)");
        }
        other => panic!("expected arity mismatch, got {other:?}"),
    }
}

#[test]
fn test_integer_mod_and_rem() {
    let source = r#"
        func main() {
            print((-7).mod(3));
            print((-7).rem(3));
            print(-7 / 2);
        }"#;
    insta::assert_snapshot!(output(source), @r"
    2
    -1
    -3
    ");
}

#[test]
fn test_finally_runs_for_internal_error() {
    let source = r#"
        func main() {
            try {
                print("body");
                missing();
            } catch (e: Exception) {
                print("caught");
            } finally {
                print("finally");
            }
        }"#;
    let (out, result) = run(source);
    assert_eq!(out, "body\nfinally\n");
    assert!(matches!(
        result,
        Err(Failure::Runtime(RuntimeError::UndefinedFunction { .. }))
    ));
}

#[test]
fn test_throwing_finally_supersedes_return() {
    let source = r#"
        func attempt() {
            try {
                return "from body";
            } finally {
                throw Exception("from finally");
            }
        }
        func main() {
            try {
                print(attempt());
            } catch (e: Exception) {
                print(e.message);
            }
        }"#;
    assert_eq!(output(source), "from finally\n");
}

#[test]
fn test_finally_runs_when_catch_throws() {
    let source = r#"
        class First {}
        class Second {}
        func main() {
            try {
                throw First();
            } catch (e: First) {
                print("catch");
                throw Second();
            } finally {
                print("finally");
            }
        }"#;
    let (out, result) = run(source);
    assert_eq!(out, "catch\nfinally\n");
    match result {
        Err(Failure::Uncaught { object, .. }) => assert_eq!(object.ty.short_name(), "Second"),
        other => panic!("expected uncaught Second, got {other:?}"),
    }
}

#[test]
fn test_inherited_members_resolve_in_defining_module() {
    let (mut interp, out) = interpreter(Config::default());
    load(
        &mut interp,
        "Lib",
        r#"
        func helper() { return 42; }
        class Base {
            val tag = helper();
            class Inner { func value() { return 7; } }
            func viaHelper() { return helper(); }
            func viaInner() { return Inner().value(); }
            func describe() { return tag; }
        }
        "#,
    )
    .unwrap();
    let types = load(
        &mut interp,
        "Main",
        r#"
        import Lib.Base;
        class Derived : Base {
            val extra = 1;
            ctor() { tag = tag + extra; }
        }
        func main() {
            val d = Derived();
            print(d.viaHelper());
            print(d.viaInner());
            print(d.tag);
            print(d.describe());
        }"#,
    )
    .unwrap();
    interp.invoke_main(&types).unwrap();
    insta::assert_snapshot!(out.text(), @r"
    42
    7
    43
    43
    ");
}

#[test]
fn test_field_initializers_cannot_see_later_fields() {
    let (_, result) = run("class A { val first = second; val second = 2; } func main() { A(); }");
    match result {
        Err(Failure::Runtime(RuntimeError::UndefinedVariable { name, .. })) => assert_eq!(name, "second"),
        other => panic!("expected undefined variable, got {other:?}"),
    }

    let source = "class A { val first = 1; val second = first + 1; } func main() { print(A().second); }";
    assert_eq!(output(source), "2\n");
}

#[test]
fn test_import_exposes_static_members() {
    let (mut interp, out) = interpreter(Config::default());
    load(
        &mut interp,
        "Util",
        r#"
        val greeting = "hi";
        func double(x) { return x * 2; }
        struct Pair { val left; val right; }
        "#,
    )
    .unwrap();
    let types = load(
        &mut interp,
        "Main",
        r#"
        import Util;
        import Util.Pair as P;
        func main() {
            print(Util.double(21));
            print(Util.greeting);
            print(P(1, 2));
        }"#,
    )
    .unwrap();
    interp.invoke_main(&types).unwrap();
    insta::assert_snapshot!(out.text(), @r"
    42
    hi
    Pair {left: 1, right: 2}
    ");
}

#[test]
fn test_interface_default_methods_and_first_match() {
    let source = r#"
        interface Named {
            func greet() { return "hello " + this.name(); }
            func kind() { return "named"; }
        }
        interface Tagged {
            func kind() { return "tagged"; }
        }
        class Robot : Named, Tagged {
            func name() { return "robot"; }
        }
        func main() {
            val robot = Robot();
            print(robot.greet());
            print(robot.kind());
        }"#;
    insta::assert_snapshot!(output(source), @r"
    hello robot
    named
    ");
}

#[test]
fn test_interface_properties_are_rejected() {
    let (_, result) = run("interface Shape { val sides; } func main() {}");
    assert!(matches!(
        result,
        Err(Failure::Runtime(RuntimeError::InvalidDefinition(_)))
    ));
}

#[test]
fn test_static_properties_initialize_in_order() {
    let source = r#"
        val base = 20;
        val derived = base + 1;
        func main() { print(derived); }"#;
    assert_eq!(output(source), "21\n");
}

#[test]
fn test_dsl_calls_function_with_raw_text() {
    let source = r#"
        func shout(text) { return text + "!"; }
        func main() { print(#shout { hi there }); }"#;
    assert_eq!(output(source), "hi there!\n");
}

#[test]
fn test_contracts() {
    let (_, result) = run("func main() { require 1 < 2; ensure 2 > 3; }");
    match result {
        Err(Failure::Runtime(err @ RuntimeError::AssertionFailed { .. })) => {
            assert_eq!(err.to_string(), "ensure failed");
        }
        other => panic!("expected assertion failure, got {other:?}"),
    }
}

#[test]
fn test_recursion_depth_limit() {
    let source = "func down(n) { return down(n + 1); } func main() { down(0); }";
    let (_, result) = run_with(Config { max_depth: 64 }, source);
    assert!(matches!(
        result,
        Err(Failure::Runtime(RuntimeError::StackOverflow(64)))
    ));
}

#[test]
fn test_deep_recursion_within_limit() {
    let source = r#"
        func sum(n) {
            if (n == 0) { return 0; }
            return n + sum(n - 1);
        }
        func main() { print(sum(5000)); }"#;
    assert_eq!(output(source), "12502500\n");
}

#[test]
fn test_main_resolution() {
    let (_, result) = run("func helper() {}");
    assert!(matches!(result, Err(Failure::NoMain)));

    let (mut interp, _) = interpreter(Config::default());
    let mut types = load(&mut interp, "First", "func main() {}").unwrap();
    types.extend(load(&mut interp, "Second", "func main() {} class Other { func main() {} }").unwrap());
    match interp.invoke_main(&types) {
        Err(failure @ Failure::MultipleMain(_)) => {
            assert_eq!(
                failure.to_string(),
                "Found multiple main/0 functions in types [First, Second]."
            );
        }
        other => panic!("expected multiple mains, got {other:?}"),
    }
}

#[test]
fn test_undefined_function_hint() {
    let (_, result) = run("func main() { pritn(1); }");
    match result {
        Err(failure) => assert_eq!(
            failure.to_string(),
            "undefined function `pritn/1`\n  hint: did you mean `print`?"
        ),
        Ok(value) => panic!("expected failure, got {value}"),
    }
}
