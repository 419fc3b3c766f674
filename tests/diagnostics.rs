use rocket_lang::diagnostics::RocketError;
use rocket_lang::Rocket;

#[test]
fn lexical_errors_are_reported_for_every_unrecognized_character() {
    let rocket = Rocket::new("statement_list");
    let err = rocket.lex("a = 1 $ 2;").unwrap_err();
    match err {
        RocketError::Lexical(errors) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].text, "$");
        }
        other => panic!("expected a lexical error, got {other:?}"),
    }
}

#[test]
fn stray_assignment_inside_a_condition_reports_the_dedicated_message() {
    let rocket = Rocket::new("statement_list");
    let err = rocket.parse("if a = 1 then { write 1; } else { write 2; };").unwrap_err();
    match err {
        RocketError::Syntax(d) => {
            assert_eq!(d.lexeme_text, "=");
            assert!(d.message.contains("assignment"));
        }
        other => panic!("expected a syntax error, got {other:?}"),
    }
}

#[test]
fn unbalanced_closing_paren_names_the_offending_lexeme() {
    let rocket = Rocket::new("expression");
    let err = rocket.parse("(1 + 2))").unwrap_err();
    match err {
        RocketError::Syntax(d) => assert_eq!(d.lexeme_text, ")"),
        other => panic!("expected a syntax error, got {other:?}"),
    }
}

#[test]
fn trailing_operator_is_reported_as_unexpected_end() {
    let rocket = Rocket::new("expression");
    let err = rocket.parse("1 +").unwrap_err();
    match err {
        RocketError::Syntax(d) => assert!(d.message.contains("Unexpected end")),
        other => panic!("expected a syntax error, got {other:?}"),
    }
}

#[test]
fn undeclared_identifier_raises_a_name_error_at_run_time() {
    let mut rocket = Rocket::new("statement_list");
    rocket.compile("write b;").unwrap();
    let mut sink = |_: &str| {};
    let err = rocket.run(&mut sink).unwrap_err();
    match err {
        RocketError::Name(d) => assert_eq!(d.lexeme_text, "b"),
        other => panic!("expected a name error, got {other:?}"),
    }
}

#[test]
fn division_by_zero_raises_a_value_error_at_run_time() {
    let mut rocket = Rocket::new("statement_list");
    rocket.compile("write 1 / 0;").unwrap();
    let mut sink = |_: &str| {};
    let err = rocket.run(&mut sink).unwrap_err();
    assert!(matches!(err, RocketError::Value(_)));
}
