use dieter::lexer::lex;
use dieter::parser::{ParseState, parse};
use dieter::types::CheckReport;
use dieter::types::check_program;
use dieter::types::error::{NameKind, TypeError};

/// Lex, parse and check a program.
fn check(input: &str) -> Result<CheckReport, Vec<TypeError>> {
    let tokens = lex(input).expect("lexing failed");
    let mut state = ParseState::new(tokens);
    let (program, errors) = parse(&mut state);
    if !errors.is_empty() {
        panic!("parsing failed: {}", errors[0]);
    }
    let program = program.expect("parsing failed: no program");
    check_program(&program)
}

fn check_ok(input: &str) -> CheckReport {
    match check(input) {
        Ok(report) => report,
        Err(errors) => panic!("expected OK, got: {}", errors[0]),
    }
}

fn check_err(input: &str) -> Vec<TypeError> {
    match check(input) {
        Ok(_) => panic!("expected diagnostics, program checked OK"),
        Err(errors) => errors,
    }
}

#[test]
fn person_module_typechecks() {
    let report = check_ok(
        r#"
        forward new_ref(): ref

        module person
            var names: map from person ref to string
            var ages: map from person ref to int

            procedure person_new(name: string, age: int): person ref
            var p: person ref
                begin
                    p := bestow person new_ref()
                    names[p] := name
                    ages[p] := age
                    return p
                end

            procedure person_get_name(p: person ref): string
                return names[p]

            procedure person_get_age(p: person ref): int
                return ages[p]
        end
        .
        "#,
    );
    assert_eq!(report.qualifiers, vec![("person".to_string(), "person".to_string())]);
    // new_ref plus the three person procedures
    assert_eq!(report.procedures.len(), 4);
}

#[test]
fn rebinding_toward_less_qualified_succeeds() {
    // glunt(i) yields gnarly int; the second equal argument is a plain int,
    // so ♥t is re-bound from gnarly int down to int
    check_ok(
        r#"
        forward equal(♥t, ♥t): bool
        forward glunt(beefy gnarly ♥t): gnarly ♥t

        module beefy end
        module gnarly end

        module client
            procedure probe(): bool
            var i: beefy gnarly int
            var b: bool
                begin
                    b := equal(glunt(i), 4)
                    return b
                end
        end
        .
        "#,
    );
}

#[test]
fn missing_qualifier_is_a_violation() {
    let errors = check_err(
        r#"
        forward traub(beefy gnarly ♥t): bool

        module beefy end
        module gnarly end

        module client
            procedure attempt(x: beefy ♥s): bool
                return traub(x)
        end
        .
        "#,
    );
    match &errors[0] {
        TypeError::QualifierViolation { missing, .. } => {
            let missing: Vec<&str> = missing.iter().collect();
            assert_eq!(missing, vec!["gnarly"]);
        }
        other => panic!("expected qualifier violation, got: {:?}", other),
    }
}

#[test]
fn bestow_outside_defining_module_rejected() {
    let errors = check_err(
        r#"
        module alpha
            procedure mk(x: int): beta int
                return bestow beta x
        end
        module beta end
        .
        "#,
    );
    match &errors[0] {
        TypeError::QualifierMismatch {
            qualifier, module, ..
        } => {
            assert_eq!(qualifier, "beta");
            assert_eq!(module, "alpha");
        }
        other => panic!("expected qualifier/module mismatch, got: {:?}", other),
    }
}

#[test]
fn ambiguous_dispatch_without_ordering() {
    let errors = check_err(
        r#"
        forward grind(gnarly ♥t): void
        forward grind(beefy ♥t): void

        module beefy end
        module gnarly end

        module client
            procedure run(x: beefy gnarly int): void
                grind(x)
        end
        .
        "#,
    );
    assert!(matches!(&errors[0], TypeError::AmbiguousDispatch { name, .. } if name == "grind"));
}

#[test]
fn ordering_linearizes_dispatch_chain() {
    let report = check_ok(
        r#"
        order beefy < gnarly

        forward grind(♥t): void
        forward grind(gnarly ♥t): void
        forward grind(beefy ♥t): void

        module beefy end
        module gnarly end

        module client
            procedure run(x: beefy gnarly int): void
                grind(x)
        end
        .
        "#,
    );
    let call = report
        .calls
        .iter()
        .find(|call| call.name == "grind")
        .expect("grind call site not resolved");
    // most general first: grind(♥t), then grind(gnarly ♥t), then grind(beefy ♥t)
    assert_eq!(call.chain, vec![0, 1, 2]);
}

#[test]
fn return_type_divergence_rejected() {
    let errors = check_err(
        r#"
        forward foo(int): int
        forward foo(int): bool
        .
        "#,
    );
    assert!(matches!(&errors[0], TypeError::ReturnTypeDivergence { name, .. } if name == "foo"));
}

#[test]
fn failing_module_swallows_its_diagnostics() {
    check_ok(
        r#"
        module broken fails
            procedure bad(x: int): bool
                return x
        end
        .
        "#,
    );
}

#[test]
fn failing_module_that_checks_cleanly_is_an_error() {
    let errors = check_err(
        r#"
        module fine fails
            procedure ok(x: int): int
                return x
        end
        .
        "#,
    );
    assert!(matches!(&errors[0], TypeError::ModuleDidNotFail { name, .. } if name == "fine"));
}

#[test]
fn undefined_qualifier_rejected() {
    let errors = check_err(
        r#"
        module m
            var x: sparkly int
        end
        .
        "#,
    );
    assert!(matches!(
        &errors[0],
        TypeError::UndefinedName {
            kind: NameKind::Qualifier,
            name,
            ..
        } if name == "sparkly"
    ));
}

#[test]
fn undefined_procedure_rejected() {
    let errors = check_err(
        r#"
        module m
            procedure p(): void
                q(3)
        end
        .
        "#,
    );
    assert!(matches!(
        &errors[0],
        TypeError::UndefinedName {
            kind: NameKind::Procedure,
            name,
            ..
        } if name == "q"
    ));
}

#[test]
fn undefined_variable_rejected() {
    let errors = check_err(
        r#"
        module m
            procedure p(): void
                x := 1
        end
        .
        "#,
    );
    assert!(matches!(
        &errors[0],
        TypeError::UndefinedName {
            kind: NameKind::Variable,
            name,
            ..
        } if name == "x"
    ));
}

#[test]
fn arity_mismatch_rejected() {
    let errors = check_err(
        r#"
        forward f(int): void
        module m
            procedure p(): void
                f(1, 2)
        end
        .
        "#,
    );
    match &errors[0] {
        TypeError::ArityMismatch {
            expected, found, ..
        } => {
            assert_eq!((*expected, *found), (1, 2));
        }
        other => panic!("expected arity mismatch, got: {:?}", other),
    }
}

#[test]
fn ordering_cycle_rejected() {
    let errors = check_err(
        r#"
        order a < b
        order b < a
        .
        "#,
    );
    assert!(matches!(&errors[0], TypeError::OrderingCycle { .. }));
}

#[test]
fn condition_must_be_bool() {
    let errors = check_err(
        r#"
        module m
            procedure p(x: int): void
                if x then begin end
        end
        .
        "#,
    );
    assert!(matches!(&errors[0], TypeError::TypeMismatch { .. }));
}

#[test]
fn qualified_bool_is_a_valid_condition() {
    check_ok(
        r#"
        module gnarly end
        module m
            procedure p(b: gnarly bool): void
                while b do begin end
        end
        .
        "#,
    );
}

#[test]
fn super_without_other_candidate_rejected() {
    let errors = check_err(
        r#"
        module m
            procedure solo(x: int): int
                return super
        end
        .
        "#,
    );
    assert!(matches!(&errors[0], TypeError::SuperWithoutChain { name, .. } if name == "solo"));
}

#[test]
fn super_with_forward_candidate_accepted() {
    check_ok(
        r#"
        forward wump(♥t): int

        module beefy end
        module m
            procedure wump(x: beefy int): int
                return super
        end
        .
        "#,
    );
}

#[test]
fn duplicate_module_rejected() {
    let errors = check_err("module m end module m end .");
    assert!(matches!(
        &errors[0],
        TypeError::DuplicateName {
            kind: NameKind::Module,
            ..
        }
    ));
}

#[test]
fn duplicate_variable_rejected() {
    let errors = check_err(
        r#"
        module m
            procedure p(x: int): void
            var x: int
                begin end
        end
        .
        "#,
    );
    assert!(matches!(
        &errors[0],
        TypeError::DuplicateName {
            kind: NameKind::Variable,
            ..
        }
    ));
}

#[test]
fn map_key_qualifier_enforced() {
    let errors = check_err(
        r#"
        module person
            var names: map from person ref to string
            procedure lookup(r: ref): string
                return names[r]
        end
        .
        "#,
    );
    assert!(matches!(&errors[0], TypeError::QualifierViolation { .. }));
}

#[test]
fn unspecified_key_map_accepts_any_index() {
    check_ok(
        r#"
        module m
            var bag: map to int
            procedure by_name(s: string): int
                return bag[s]
            procedure by_number(n: int): int
                return bag[n]
        end
        .
        "#,
    );
}

#[test]
fn indexing_a_non_map_rejected() {
    let errors = check_err(
        r#"
        module m
            procedure p(x: int): int
                return x[1]
        end
        .
        "#,
    );
    assert!(matches!(&errors[0], TypeError::TypeMismatch { .. }));
}

#[test]
fn sibling_procedures_keep_reporting() {
    let errors = check_err(
        r#"
        module m
            procedure p(): void
                q(1)
            procedure r(): void
                s(2)
        end
        .
        "#,
    );
    assert_eq!(errors.len(), 2);
}

#[test]
fn assignment_requires_provider_superset() {
    // a plain int cannot flow into a gnarly int variable...
    let errors = check_err(
        r#"
        module gnarly end
        module m
            procedure p(x: int): void
            var g: gnarly int
                g := x
        end
        .
        "#,
    );
    assert!(matches!(&errors[0], TypeError::QualifierViolation { .. }));
}

#[test]
fn assignment_accepts_more_qualified_provider() {
    // ...but a gnarly int flows into a plain int variable
    check_ok(
        r#"
        module gnarly end
        module m
            procedure p(g: gnarly int): void
            var x: int
                x := g
        end
        .
        "#,
    );
}

#[test]
fn bestow_adds_qualifier_for_assignment() {
    check_ok(
        r#"
        module gnarly
            procedure wrap(x: int): gnarly int
            var g: gnarly int
                begin
                    g := bestow gnarly x
                    return g
                end
        end
        .
        "#,
    );
}
