use rocket_lang::lexeme::Number;
use rocket_lang::Rocket;

fn run(source: &str) -> Vec<String> {
    let mut rocket = Rocket::new("statement_list");
    rocket.compile(source).unwrap();
    let mut output = Vec::new();
    {
        let mut sink = |text: &str| output.push(text.to_string());
        rocket.run(&mut sink).unwrap();
    }
    output
}

#[test]
fn reassigns_a_variable_across_statements() {
    let mut rocket = Rocket::new("statement_list");
    rocket.compile("a = 3 + 1; a = a + 2;").unwrap();
    let mut sink = |_: &str| {};
    rocket.run(&mut sink).unwrap();
    assert_eq!(rocket.variables().get("a"), Some(&Number::Int(6)));
}

#[test]
fn if_then_branch_runs_when_condition_is_true() {
    let output = run("a = 1; if a == 1 then { write 10; } else { write 20; };");
    assert_eq!(output, vec!["10"]);
}

#[test]
fn if_else_branch_runs_when_condition_is_false() {
    let output = run("a = 0; if a == 1 then { write 10; } else { write 20; };");
    assert_eq!(output, vec!["20"]);
}

#[test]
fn while_loop_runs_until_condition_is_false() {
    let output = run("a = 0; while a < 3 do { write a; a = a + 1; } enddo;");
    assert_eq!(output, vec!["0", "1", "2"]);
}

#[test]
fn while_loop_never_runs_when_condition_starts_false() {
    let output = run("a = 5; while a < 3 do { write a; a = a + 1; } enddo;");
    assert!(output.is_empty());
}

#[test]
fn nested_if_inside_while_body() {
    let output = run(
        "a = 0; while a < 4 do { if a == 2 then { write 99; } else { write a; }; a = a + 1; } enddo;",
    );
    assert_eq!(output, vec!["0", "1", "99", "3"]);
}

#[test]
fn read_suspends_a_full_program_and_resumes_with_a_supplied_value() {
    let mut rocket = Rocket::new("statement_list");
    rocket.compile("read a; write a + 1;").unwrap();
    let mut output = Vec::new();
    let resume_pc = {
        let mut sink = |text: &str| output.push(text.to_string());
        match rocket.run(&mut sink).unwrap() {
            rocket_lang::executor::Outcome::NeedsInput { resume_pc } => resume_pc,
            other => panic!("expected NeedsInput, got {other:?}"),
        }
    };
    let mut sink = |text: &str| output.push(text.to_string());
    rocket.resume(&mut sink, Number::Int(9), resume_pc).unwrap();
    assert_eq!(output, vec!["10"]);
}
