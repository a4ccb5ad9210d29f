//! Parser tests for Rhovas syntax

use crate::ast::{BinaryOp, ComponentKind, Expr, Literal, Member, Pattern, Source, Stmt, UnaryOp};
use crate::lexer::tokenize;
use crate::parser::{parse, parse_repl, parse_statement, ReplInput};

fn parse_source(source: &str) -> crate::Result<Source> {
    let tokens = tokenize(source)?;
    parse("test.rho", source, tokens)
}

fn parse_ok(source: &str) -> Source {
    parse_source(source).expect("Parse should succeed")
}

fn stmt(source: &str) -> Stmt {
    let tokens = tokenize(source).expect("Tokenize should succeed");
    parse_statement(source, tokens).expect("Parse should succeed")
}

fn expr(source: &str) -> Expr {
    match stmt(&format!("return {source};")) {
        Stmt::Return(Some(expr)) => expr,
        other => panic!("expected return statement, got {other:?}"),
    }
}

// ============================================
// Members
// ============================================

#[test]
fn test_parse_imports() {
    let source = parse_ok("import Kernel; import lib.Math as M;");
    assert_eq!(source.imports.len(), 2);
    assert_eq!(source.imports[0].binding(), "Kernel");
    assert_eq!(source.imports[1].qualified_name(), "lib.Math");
    assert_eq!(source.imports[1].binding(), "M");
}

#[test]
fn test_parse_class_with_members() {
    let source = parse_ok(
        "class Point : Equatable, Printable {
            var x: Integer = 0;
            val y;
            ctor(x, y) { this.x = x; }
            func +(other) { return other; }
            func [](i) { return i; }
            func []=(i, v) {}
            func norm(): Integer { return 0; }
        }",
    );
    let Member::Component(class) = &source.members[0] else {
        panic!("expected component");
    };
    assert_eq!(class.kind, ComponentKind::Class);
    assert_eq!(class.name, "Point");
    let extends: Vec<_> = class.extends.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(extends, ["Equatable", "Printable"]);
    let names: Vec<String> = class
        .members
        .iter()
        .map(|m| match m {
            Member::Property(p) => format!("{} {}", if p.mutable { "var" } else { "val" }, p.name),
            Member::Constructor(c) => format!("ctor/{}", c.params.len()),
            Member::Function(f) => format!("func {}/{}", f.name, f.arity()),
            Member::Component(c) => c.name.clone(),
        })
        .collect();
    assert_eq!(
        names,
        ["var x", "val y", "ctor/2", "func +/1", "func []/1", "func []=/2", "func norm/0"]
    );
}

#[test]
fn test_parse_struct_and_interface() {
    let source = parse_ok("interface Shape { func area(); } struct Square : Shape { val side; }");
    let kinds: Vec<_> = source
        .members
        .iter()
        .map(|m| match m {
            Member::Component(c) => c.kind,
            _ => panic!("expected component"),
        })
        .collect();
    assert_eq!(kinds, [ComponentKind::Interface, ComponentKind::Struct]);
}

#[test]
fn test_parse_generic_component_and_types() {
    let source = parse_ok("class Box<T> { val item: List<Integer>; }");
    let Member::Component(class) = &source.members[0] else {
        panic!("expected component");
    };
    let Member::Property(item) = &class.members[0] else {
        panic!("expected property");
    };
    let ty = item.ty.as_ref().unwrap();
    assert_eq!(ty.name, "List");
    assert_eq!(ty.generics[0].name, "Integer");
}

#[test]
fn test_parse_bodiless_function() {
    let source = parse_ok("interface Shape { func area(); }");
    let Member::Component(shape) = &source.members[0] else {
        panic!("expected component");
    };
    assert!(matches!(&shape.members[0], Member::Function(f) if f.body.is_none()));
}

#[test]
fn test_parse_member_error() {
    let err = parse_source("print(1);").unwrap_err();
    assert!(err.message().contains("expected member declaration"));
}

// ============================================
// Statements
// ============================================

#[test]
fn test_parse_label_and_break() {
    let Stmt::Label { label, stmt } = stmt("outer: while (true) { break outer; }") else {
        panic!("expected label");
    };
    assert_eq!(label, "outer");
    let Stmt::While { body, .. } = *stmt else {
        panic!("expected while");
    };
    let Stmt::Block(stmts) = *body else {
        panic!("expected block");
    };
    assert!(matches!(&stmts[0], Stmt::Break(Some(l)) if l == "outer"));
}

#[test]
fn test_parse_declaration_vs_val_expression() {
    assert!(matches!(stmt("val x = 1;"), Stmt::Declaration { mutable: false, .. }));
    assert!(matches!(stmt("var x;"), Stmt::Declaration { mutable: true, value: None, .. }));
    assert!(matches!(
        stmt("val.print();"),
        Stmt::Expression(Expr::Call { name, .. }) if name == "print"
    ));
}

#[test]
fn test_parse_assignment_targets() {
    assert!(matches!(stmt("x = 1;"), Stmt::Assignment { receiver: Expr::Access { .. }, .. }));
    assert!(matches!(stmt("a.b = 1;"), Stmt::Assignment { receiver: Expr::Access { .. }, .. }));
    assert!(matches!(stmt("a[0] = 1;"), Stmt::Assignment { receiver: Expr::Index { .. }, .. }));
    assert!(matches!(stmt("f() = 1;"), Stmt::Assignment { receiver: Expr::Call { .. }, .. }));
}

#[test]
fn test_parse_try_catch_finally() {
    let Stmt::Try { catches, finally, .. } =
        stmt("try { throw Exception(\"x\"); } catch (e: Exception) {} catch (e: Any) {} finally {}")
    else {
        panic!("expected try");
    };
    let types: Vec<_> = catches.iter().map(|c| c.ty.name.as_str()).collect();
    assert_eq!(types, ["Exception", "Any"]);
    assert!(finally.is_some());
}

#[test]
fn test_parse_return_without_value() {
    assert!(matches!(stmt("return;"), Stmt::Return(None)));
    assert!(matches!(stmt("return 1;"), Stmt::Return(Some(_))));
}

#[test]
fn test_parse_contracts() {
    assert!(matches!(stmt("assert x;"), Stmt::Assert(_)));
    assert!(matches!(stmt("require x;"), Stmt::Require(_)));
    assert!(matches!(stmt("ensure x;"), Stmt::Ensure(_)));
}

#[test]
fn test_parse_missing_semicolon() {
    let tokens = tokenize("x = 1").unwrap();
    let err = parse_statement("x = 1", tokens).unwrap_err();
    assert!(err.message().contains("expected `;`"));
    assert!(err.message().contains("end of input"));
}

// ============================================
// Match and patterns
// ============================================

#[test]
fn test_parse_match_patterns() {
    let Stmt::Match { args, cases } = stmt(
        "match (x) {
            1, 2: print(1);
            [head, tail..]: print(head);
            {name: n, age, rest..}: print(n);
            :atom: print(2);
            _: print(3);
            else y: print(y);
            else: print(4);
        }",
    ) else {
        panic!("expected match");
    };
    assert_eq!(args.len(), 1);
    assert_eq!(cases.len(), 7);
    assert_eq!(cases[0].patterns.len(), 2);
    assert!(matches!(
        &cases[1].patterns[0],
        Pattern::List { elements, rest: Some(rest) } if elements.len() == 1 && rest == "tail"
    ));
    let Pattern::Map { entries, rest } = &cases[2].patterns[0] else {
        panic!("expected map pattern");
    };
    assert_eq!(entries[0].0, "name");
    assert!(matches!(&entries[1].1, Pattern::Variable(Some(n)) if n == "age"));
    assert_eq!(rest.as_deref(), Some("rest"));
    assert!(matches!(
        &cases[3].patterns[0],
        Pattern::Expression(Expr::Literal(Literal::Atom(a))) if a == "atom"
    ));
    assert!(matches!(&cases[4].patterns[0], Pattern::Variable(None)));
    assert!(matches!(&cases[5].patterns[0], Pattern::Else(Some(_))));
    assert!(matches!(&cases[6].patterns[0], Pattern::Else(None)));
}

#[test]
fn test_parse_conditional_match() {
    let Stmt::Match { args, cases } = stmt("match { x < 1: print(1); else: print(2); }") else {
        panic!("expected match");
    };
    assert!(args.is_empty());
    assert!(matches!(&cases[0].patterns[0], Pattern::Expression(Expr::Binary { op: BinaryOp::Lt, .. })));
    assert!(matches!(&cases[1].patterns[0], Pattern::Else(None)));
}

// ============================================
// Expressions
// ============================================

#[test]
fn test_parse_precedence() {
    let Expr::Binary { op: BinaryOp::Or, right, .. } = expr("a || b && c == d + e * f") else {
        panic!("expected ||");
    };
    let Expr::Binary { op: BinaryOp::And, right, .. } = *right else {
        panic!("expected &&");
    };
    let Expr::Binary { op: BinaryOp::Eq, right, .. } = *right else {
        panic!("expected ==");
    };
    let Expr::Binary { op: BinaryOp::Add, right, .. } = *right else {
        panic!("expected +");
    };
    assert!(matches!(*right, Expr::Binary { op: BinaryOp::Mul, .. }));
}

#[test]
fn test_parse_negative_literal_folds() {
    assert!(matches!(expr("-7"), Expr::Literal(Literal::Integer(-7))));
    assert!(matches!(expr("-x"), Expr::Unary { op: UnaryOp::Neg, .. }));
    assert!(matches!(expr("!flag"), Expr::Unary { op: UnaryOp::Not, .. }));
}

#[test]
fn test_parse_literals() {
    assert!(matches!(expr("null"), Expr::Literal(Literal::Null)));
    assert!(matches!(expr("'c'"), Expr::Literal(Literal::Character('c'))));
    assert!(matches!(expr("1.5"), Expr::Literal(Literal::Decimal(_))));
    assert!(matches!(expr(":ok"), Expr::Literal(Literal::Atom(a)) if a == "ok"));
    assert!(matches!(expr("[1, 2, 3,]"), Expr::Literal(Literal::List(items)) if items.len() == 3));
    assert!(matches!(
        expr("{x: 1, \"y z\": 2}"),
        Expr::Literal(Literal::Map(entries)) if entries[1].0 == "y z"
    ));
}

#[test]
fn test_parse_calls_and_access_chain() {
    let Expr::Index { receiver, args } = expr("obj.items(1).first[0]") else {
        panic!("expected index");
    };
    assert_eq!(args.len(), 1);
    let Expr::Access { receiver: Some(call), name } = *receiver else {
        panic!("expected access");
    };
    assert_eq!(name, "first");
    assert!(matches!(*call, Expr::Call { receiver: Some(_), ref name, ref args } if name == "items" && args.len() == 1));
}

#[test]
fn test_parse_trailing_lambdas() {
    let Expr::Call { name, args, .. } = expr("list.map |x| x * 2") else {
        panic!("expected call");
    };
    assert_eq!(name, "map");
    let Expr::Lambda(lambda) = &args[0] else {
        panic!("expected lambda");
    };
    assert_eq!(lambda.params.len(), 1);
    assert!(matches!(lambda.body, Stmt::Return(Some(_))));

    let Expr::Call { args, .. } = expr("range(1, 3).iterate { print(val); }") else {
        panic!("expected call");
    };
    assert!(matches!(&args[0], Expr::Lambda(l) if l.params.is_empty()));

    let Expr::Call { args, .. } = expr("apply(1) |a| { return a; }") else {
        panic!("expected call");
    };
    assert_eq!(args.len(), 2);
}

#[test]
fn test_parse_keyword_member_names() {
    let Expr::Call { name, args, .. } = expr("list.for { print(val); }") else {
        panic!("expected call");
    };
    assert_eq!(name, "for");
    assert_eq!(args.len(), 1);
    assert!(matches!(expr("x.match"), Expr::Access { ref name, .. } if name == "match"));
}

#[test]
fn test_parse_lambda_literals() {
    assert!(matches!(expr("|| 1"), Expr::Lambda(l) if l.params.is_empty()));
    assert!(matches!(expr("|a, b| { return a; }"), Expr::Lambda(l) if l.params.len() == 2));
}

#[test]
fn test_parse_dsl() {
    let Expr::Dsl { name, source } = expr("#regex { /abc/i }") else {
        panic!("expected dsl");
    };
    assert_eq!(name, "regex");
    assert_eq!(source, "/abc/i");
}

#[test]
fn test_parse_repl_input_kinds() {
    let decl = "func f() { return 1; }";
    assert!(matches!(parse_repl(decl, tokenize(decl).unwrap()), Ok(ReplInput::Source(_))));
    let line = "print(1);";
    assert!(matches!(parse_repl(line, tokenize(line).unwrap()), Ok(ReplInput::Statement(_))));
}
