use dieter::ast::Program;
use dieter::ast::expression::Expression;
use dieter::ast::statement::Statement;
use dieter::ast::type_expr::{BareTypeExpr, PrimitiveType};
use dieter::lexer::lex;
use dieter::parser::{ParseState, parse};

fn parse_program(input: &str) -> Program {
    let tokens = lex(input).expect("lexing failed");
    let mut state = ParseState::new(tokens);
    let (program, errors) = parse(&mut state);
    if !errors.is_empty() {
        panic!("parsing failed: {}", errors[0]);
    }
    program.expect("parsing failed: no program")
}

#[test]
fn parse_empty_program() {
    let program = parse_program(".");
    assert!(program.forwards.is_empty());
    assert!(program.orderings.is_empty());
    assert!(program.modules.is_empty());
}

#[test]
fn parse_empty_module() {
    let program = parse_program("module m end .");
    assert_eq!(program.modules.len(), 1);
    assert_eq!(program.modules[0].name.value, "m");
    assert!(!program.modules[0].fails);
}

#[test]
fn parse_module_fails_marker() {
    let program = parse_program("module broken fails end .");
    assert!(program.modules[0].fails);
}

#[test]
fn parse_ordering() {
    let program = parse_program("order beefy < gnarly .");
    assert_eq!(program.orderings.len(), 1);
    assert_eq!(program.orderings[0].before.value, "beefy");
    assert_eq!(program.orderings[0].after.value, "gnarly");
}

#[test]
fn parse_forward() {
    let program = parse_program("forward equal(♥t, ♥t): bool .");
    assert_eq!(program.forwards.len(), 1);
    let fwd = &program.forwards[0];
    assert_eq!(fwd.name.value, "equal");
    assert_eq!(fwd.params.len(), 2);
    assert!(matches!(&fwd.params[0].base, BareTypeExpr::Var(name) if name.value == "t"));
    assert!(matches!(
        fwd.return_type.base,
        BareTypeExpr::Primitive(PrimitiveType::Bool)
    ));
}

#[test]
fn parse_forward_no_params() {
    let program = parse_program("forward new_ref(): ref .");
    assert!(program.forwards[0].params.is_empty());
}

#[test]
fn parse_qualifiers_canonicalized() {
    let program = parse_program("forward f(gnarly beefy gnarly int): void .");
    let quals: Vec<&str> = program.forwards[0].params[0]
        .qualifiers
        .iter()
        .map(|q| q.value.as_str())
        .collect();
    assert_eq!(quals, vec!["beefy", "gnarly"]);
}

#[test]
fn parse_map_types() {
    let program = parse_program("forward f(map from person ref to string, map to int): void .");
    let keyed = &program.forwards[0].params[0];
    match &keyed.base {
        BareTypeExpr::Map { key, value } => {
            let key = key.as_ref().expect("expected a key type");
            assert_eq!(key.qualifiers.len(), 1);
            assert_eq!(key.qualifiers[0].value, "person");
            assert!(matches!(
                value.base,
                BareTypeExpr::Primitive(PrimitiveType::String)
            ));
        }
        other => panic!("expected map type, got {:?}", other),
    }

    let mixin = &program.forwards[0].params[1];
    assert!(matches!(&mixin.base, BareTypeExpr::Map { key: None, .. }));
}

#[test]
fn parse_procedure_with_locals() {
    let program = parse_program(
        r#"
        module m
            procedure p(x: int, y: string): void
            var z: bool
            var w: rat
                begin end
        end
        .
        "#,
    );
    let proc = &program.modules[0].procs[0];
    assert_eq!(proc.name.value, "p");
    assert_eq!(proc.params.len(), 2);
    assert_eq!(proc.locals.len(), 2);
    assert!(matches!(&proc.body, Statement::Compound(c) if c.steps.is_empty()));
}

#[test]
fn parse_statement_forms() {
    let program = parse_program(
        r#"
        module m
            procedure p(x: int, b: bool): void
                begin
                    if b then x := 1 else x := 2
                    while b do x := 3
                    p(x, b)
                    return final x
                end
        end
        .
        "#,
    );
    let Statement::Compound(body) = &program.modules[0].procs[0].body else {
        panic!("expected compound body");
    };
    assert_eq!(body.steps.len(), 4);
    assert!(matches!(&body.steps[0], Statement::If(s) if s.else_stmt.is_some()));
    assert!(matches!(&body.steps[1], Statement::While(_)));
    assert!(matches!(&body.steps[2], Statement::Call(c) if c.args.len() == 2));
    assert!(matches!(&body.steps[3], Statement::Return(r) if r.is_final));
}

#[test]
fn parse_indexed_assignment() {
    let program = parse_program(
        r#"
        module m
            procedure p(k: ref, v: int): void
                names[k] := v
        end
        .
        "#,
    );
    let Statement::Assign(assign) = &program.modules[0].procs[0].body else {
        panic!("expected assignment body");
    };
    assert_eq!(assign.name.value, "names");
    assert!(assign.index.is_some());
}

#[test]
fn parse_bestow_and_super() {
    let program = parse_program(
        r#"
        module person
            procedure person_new(): person ref
                return bestow person new_ref()
            procedure fallback(): person ref
                return super
        end
        .
        "#,
    );
    let Statement::Return(ret) = &program.modules[0].procs[0].body else {
        panic!("expected return body");
    };
    match &ret.expr {
        Expression::Bestow(bestow) => {
            assert_eq!(bestow.qualifier.value, "person");
            assert!(matches!(bestow.expr.as_ref(), Expression::Call(_)));
        }
        other => panic!("expected bestow, got {:?}", other),
    }

    let Statement::Return(ret) = &program.modules[0].procs[1].body else {
        panic!("expected return body");
    };
    assert!(matches!(&ret.expr, Expression::Super(_)));
}

#[test]
fn parse_parenthesized_expression() {
    let program = parse_program(
        r#"
        module m
            procedure p(x: int): void
                y := (x)
        end
        .
        "#,
    );
    let Statement::Assign(assign) = &program.modules[0].procs[0].body else {
        panic!("expected assignment body");
    };
    assert!(matches!(&assign.value, Expression::VarRef(v) if v.name.value == "x"));
}

#[test]
fn parse_literals_in_expressions() {
    let program = parse_program(
        r#"
        module m
            procedure p(): void
                begin
                    x := 42
                    s := "hello"
                end
        end
        .
        "#,
    );
    let Statement::Compound(body) = &program.modules[0].procs[0].body else {
        panic!("expected compound body");
    };
    let Statement::Assign(first) = &body.steps[0] else {
        panic!("expected assignment");
    };
    assert!(matches!(&first.value, Expression::Integer(i) if i.value == 42));
    let Statement::Assign(second) = &body.steps[1] else {
        panic!("expected assignment");
    };
    assert!(matches!(&second.value, Expression::String(s) if s.value == "hello"));
}

#[test]
fn parse_missing_terminator_is_an_error() {
    let tokens = lex("module m end").expect("lexing failed");
    let mut state = ParseState::new(tokens);
    let (program, errors) = parse(&mut state);
    assert!(program.is_none());
    assert!(!errors.is_empty());
}

#[test]
fn parse_recovers_at_next_declaration() {
    // the first module is malformed; the second should still parse
    let tokens = lex("module 42 end module ok end .").expect("lexing failed");
    let mut state = ParseState::new(tokens);
    let (program, errors) = parse(&mut state);

    assert!(!errors.is_empty());
    let program = program.expect("expected a recovered program");
    assert_eq!(program.modules.len(), 1);
    assert_eq!(program.modules[0].name.value, "ok");
}
