//! Stack-based execution of a postfix stream, with cooperative suspension on
//! `read` instead of coroutines: [`Executor::run`] and [`Executor::resume`]
//! both return an [`Outcome`] the caller drives to completion.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;

use log::{debug, trace};

use crate::lexeme::{Lexeme, Number};
use crate::postfix::{JumpKind, Marks, Op};

/// A value on the operand stack: either a resolved constant or a deferred
/// reference into the variables map, resolved lazily at use.
#[derive(Debug, Clone)]
enum Operand {
    Constant(Number),
    Identifier(Lexeme),
}

impl Operand {
    fn identifier_name(&self) -> Option<&str> {
        match self {
            Operand::Identifier(lexeme) => Some(lexeme.text.as_str()),
            Operand::Constant(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExecutorError {
    NameError { identifier: Lexeme },
    ZeroDivision { at: Lexeme },
}

impl fmt::Display for ExecutorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutorError::NameError { identifier } => write!(f, "Name Error: undeclared identifier '{}'", identifier.text),
            ExecutorError::ZeroDivision { at } => write!(f, "Value Error: zero division at '{}'", at.text),
        }
    }
}

impl Error for ExecutorError {}

/// What happened after driving the postfix stream as far as it would go
/// without more input.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Execution ran to the end of the stream. Carries the top-of-stack
    /// value when exactly one operand remains (a bare expression result).
    Done(Option<Number>),
    /// Execution hit a `read`; the collaborator must supply a value and call
    /// [`Executor::resume`] with it.
    NeedsInput { resume_pc: usize },
}

/// Executes a postfix stream against a persistent variables map and operand
/// stack, so that a suspended `read` can be resumed without re-running
/// anything already executed.
pub struct Executor {
    variables: HashMap<String, Number>,
    operands: Vec<Operand>,
}

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor {
    pub fn new() -> Self {
        Executor { variables: HashMap::new(), operands: Vec::new() }
    }

    pub fn variables(&self) -> &HashMap<String, Number> {
        &self.variables
    }

    pub fn variables_table(&self) -> Vec<Vec<String>> {
        let mut rows = vec![vec!["variable".to_string(), "value".to_string()]];
        let mut names: Vec<&String> = self.variables.keys().collect();
        names.sort();
        for name in names {
            rows.push(vec![name.clone(), self.variables[name].to_string()]);
        }
        rows
    }

    pub fn run(
        &mut self,
        postfix: &[Op],
        marks: &Marks,
        sink: &mut dyn FnMut(&str),
    ) -> Result<Outcome, ExecutorError> {
        self.step(postfix, marks, sink, 0)
    }

    /// Resumes after a [`Outcome::NeedsInput`]: assigns `value` to the
    /// identifier operand left on the stack by the `read` that suspended,
    /// then continues from `resume_pc`.
    pub fn resume(
        &mut self,
        postfix: &[Op],
        marks: &Marks,
        sink: &mut dyn FnMut(&str),
        value: Number,
        resume_pc: usize,
    ) -> Result<Outcome, ExecutorError> {
        if let Some(Operand::Identifier(lexeme)) = self.operands.pop() {
            self.variables.insert(lexeme.text, value);
        }
        self.step(postfix, marks, sink, resume_pc)
    }

    fn resolve(&self, operand: &Operand) -> Result<Number, ExecutorError> {
        match operand {
            Operand::Constant(n) => Ok(*n),
            Operand::Identifier(lexeme) => self
                .variables
                .get(&lexeme.text)
                .copied()
                .ok_or_else(|| ExecutorError::NameError { identifier: lexeme.clone() }),
        }
    }

    fn step(
        &mut self,
        postfix: &[Op],
        marks: &Marks,
        sink: &mut dyn FnMut(&str),
        mut pc: usize,
    ) -> Result<Outcome, ExecutorError> {
        while pc < postfix.len() {
            match &postfix[pc] {
                Op::Mark(_) => {}
                Op::Jump(JumpKind::Unconditional, target) => {
                    pc = marks.position(*target);
                    continue;
                }
                Op::Jump(JumpKind::OnFalse, target) => {
                    let condition = self.operands.pop().expect("jump_on_False requires a condition operand");
                    let value = self.resolve(&condition)?;
                    if !value.is_truthy() {
                        pc = marks.position(*target);
                        continue;
                    }
                }
                Op::Terminal(t) => {
                    trace!("execute pc={pc} {}", t.lexeme.text);
                    match t.symbol_name.as_str() {
                        "constant" => self.operands.push(Operand::Constant(t.lexeme.value())),
                        "identifier" => self.operands.push(Operand::Identifier(t.lexeme.clone())),
                        "write" => self.execute_write(postfix, pc, sink)?,
                        "read" => {
                            debug!("suspending for read at pc={pc}");
                            return Ok(Outcome::NeedsInput { resume_pc: pc + 1 });
                        }
                        "assignment_operator" => {
                            let value = self.operands.pop().expect("assignment requires a value operand");
                            let identifier = self.operands.pop().expect("assignment requires an identifier operand");
                            let value = self.resolve(&value)?;
                            if let Some(name) = identifier.identifier_name() {
                                self.variables.insert(name.to_string(), value);
                            }
                        }
                        _ => self.execute_operator(t)?,
                    }
                }
            }
            pc += 1;
        }

        debug!("executed {} variables bound", self.variables.len());
        let result = if self.operands.len() == 1 { Some(self.resolve(&self.operands[0])?) } else { None };
        Ok(Outcome::Done(result))
    }

    fn execute_write(&mut self, postfix: &[Op], pc: usize, sink: &mut dyn FnMut(&str)) -> Result<(), ExecutorError> {
        let previous = pc.checked_sub(1).and_then(|i| postfix.get(i));
        let bare_text = match previous {
            Some(Op::Terminal(t)) if t.symbol_name == "identifier" => {
                let value = self.variables.get(&t.lexeme.text).copied().ok_or_else(|| ExecutorError::NameError { identifier: t.lexeme.clone() })?;
                Some(value.to_string())
            }
            Some(Op::Terminal(t)) if t.symbol_name == "constant" => Some(t.lexeme.text.clone()),
            _ => None,
        };
        let operand = self.operands.pop().expect("write requires an operand to have been pushed by the preceding expression");
        match bare_text {
            Some(text) => sink(&text),
            None => sink(&self.resolve(&operand)?.to_string()),
        }
        Ok(())
    }

    fn execute_operator(&mut self, t: &crate::parser::TerminalMatch) -> Result<(), ExecutorError> {
        let text = t.lexeme.text.as_str();
        if text == "@" {
            let operand = self.operands.pop().expect("unary '-' requires an operand");
            let value = self.resolve(&operand)?;
            self.operands.push(Operand::Constant(negate(value)));
            return Ok(());
        }
        if text == "+_" {
            // unary '+' is a no-op: the operand is already on the stack.
            return Ok(());
        }

        let b = self.operands.pop().expect("binary operator requires a right operand");
        let a = self.operands.pop().expect("binary operator requires a left operand");
        let a_value = self.resolve(&a)?;
        let b_value = self.resolve(&b)?;

        if text == "/" && b_value.as_f64() == 0.0 {
            return Err(ExecutorError::ZeroDivision { at: t.lexeme.clone() });
        }

        let result = apply(text, a_value, b_value);
        self.operands.push(Operand::Constant(result));
        Ok(())
    }
}

fn negate(n: Number) -> Number {
    match n {
        Number::Int(i) => Number::Int(-i),
        Number::Float(f) => Number::Float(-f),
    }
}

/// Applies a binary operator the way the host language's arithmetic would:
/// `+ - * ^` stay integral when both operands are integers, `/` always
/// performs true (floating-point) division, and comparisons yield `1`/`0`.
fn apply(operator: &str, a: Number, b: Number) -> Number {
    use Number::{Float, Int};

    match operator {
        "/" => Float(a.as_f64() / b.as_f64()),
        "+" => match (a, b) {
            (Int(x), Int(y)) => Int(x + y),
            _ => Float(a.as_f64() + b.as_f64()),
        },
        "-" => match (a, b) {
            (Int(x), Int(y)) => Int(x - y),
            _ => Float(a.as_f64() - b.as_f64()),
        },
        "*" => match (a, b) {
            (Int(x), Int(y)) => Int(x * y),
            _ => Float(a.as_f64() * b.as_f64()),
        },
        "^" => match (a, b) {
            (Int(x), Int(y)) if y >= 0 => Int(x.pow(y as u32)),
            _ => Float(a.as_f64().powf(b.as_f64())),
        },
        "==" => Int((a.as_f64() == b.as_f64()) as i64),
        "!=" | "<>" => Int((a.as_f64() != b.as_f64()) as i64),
        ">" => Int((a.as_f64() > b.as_f64()) as i64),
        "<" => Int((a.as_f64() < b.as_f64()) as i64),
        ">=" => Int((a.as_f64() >= b.as_f64()) as i64),
        "<=" => Int((a.as_f64() <= b.as_f64()) as i64),
        other => unreachable!("unhandled operator '{other}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::rocket_grammar;
    use crate::lexer::Lexer;
    use crate::parser::{Match, ParseOutcome, Parser};
    use crate::postfix::Transformer;

    fn run_program(source: &str) -> (Executor, Vec<String>) {
        let lexer = Lexer::new();
        let (lexemes, errors) = lexer.scan(source);
        assert!(errors.is_empty());
        let grammar = rocket_grammar();
        let mut parser = Parser::new(&grammar);
        let outcome = parser.parse("statement_list", &lexemes).unwrap();
        let m: Match = match outcome {
            ParseOutcome::Matched(m) => m,
            other => panic!("expected a match, got {other:?}"),
        };
        let terminals = m.terminal_matches();
        let (postfix, marks, _history) = Transformer::new().transform(&terminals);
        let mut executor = Executor::new();
        let mut output = Vec::new();
        {
            let mut sink = |text: &str| output.push(text.to_string());
            executor.run(&postfix, &marks, &mut sink).unwrap();
        }
        (executor, output)
    }

    #[test]
    fn assigns_and_rebinds_a_variable() {
        let (executor, _) = run_program("a = 3 + 1; a = a + 2;");
        assert_eq!(executor.variables().get("a"), Some(&Number::Int(6)));
    }

    #[test]
    fn write_outputs_variable_value() {
        let (_, output) = run_program("a = 5; write a;");
        assert_eq!(output, vec!["5"]);
    }

    #[test]
    fn write_outputs_constant_literal_text_verbatim() {
        let (_, output) = run_program("write 007;");
        assert_eq!(output, vec!["007"]);
    }

    #[test]
    fn division_always_promotes_to_float() {
        let (_, output) = run_program("write (3+4)/(10-7)+2-12*(13*169);");
        assert_eq!(output, vec!["-26359.666666666668"]);
    }

    #[test]
    fn division_by_zero_is_reported() {
        let lexer = Lexer::new();
        let (lexemes, _) = lexer.scan("write 1/0;");
        let grammar = rocket_grammar();
        let mut parser = Parser::new(&grammar);
        let outcome = parser.parse("statement_list", &lexemes).unwrap();
        let m = match outcome { ParseOutcome::Matched(m) => m, other => panic!("{other:?}") };
        let terminals = m.terminal_matches();
        let (postfix, marks, _h) = Transformer::new().transform(&terminals);
        let mut executor = Executor::new();
        let mut sink = |_: &str| {};
        let err = executor.run(&postfix, &marks, &mut sink).unwrap_err();
        assert!(matches!(err, ExecutorError::ZeroDivision { .. }));
    }

    #[test]
    fn read_suspends_and_resumes() {
        let lexer = Lexer::new();
        let (lexemes, _) = lexer.scan("read a; write a;");
        let grammar = rocket_grammar();
        let mut parser = Parser::new(&grammar);
        let outcome = parser.parse("statement_list", &lexemes).unwrap();
        let m = match outcome { ParseOutcome::Matched(m) => m, other => panic!("{other:?}") };
        let terminals = m.terminal_matches();
        let (postfix, marks, _h) = Transformer::new().transform(&terminals);
        let mut executor = Executor::new();
        let mut output = Vec::new();
        let resume_pc = {
            let mut sink = |text: &str| output.push(text.to_string());
            match executor.run(&postfix, &marks, &mut sink).unwrap() {
                Outcome::NeedsInput { resume_pc } => resume_pc,
                other => panic!("expected NeedsInput, got {other:?}"),
            }
        };
        let mut sink = |text: &str| output.push(text.to_string());
        let outcome = executor.resume(&postfix, &marks, &mut sink, Number::Int(42), resume_pc).unwrap();
        assert!(matches!(outcome, Outcome::Done(_)));
        assert_eq!(output, vec!["42"]);
    }
}
