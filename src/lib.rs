//! Lexer, grammar-driven parser, infix-to-postfix transformer, and
//! stack-based executor for the Rocket expression language.

pub mod diagnostics;
pub mod executor;
pub mod grammar;
pub mod lexeme;
pub mod lexer;
pub mod parser;
pub mod postfix;

use diagnostics::{Diagnostic, RocketError};
use executor::{Executor, ExecutorError, Outcome};
use grammar::{rocket_grammar, Grammar};
use lexeme::{Lexeme, Number};
use lexer::Lexer;
use parser::{Match, ParseOutcome, Parser};
use postfix::{HistoryRow, Marks, Op, Transformer};

/// Bundles a lexer, a parser rooted at a chosen grammar symbol, a postfix
/// transformer, and a persistent executor behind one convenience surface.
pub struct Rocket {
    lexer: Lexer,
    grammar: Grammar,
    root: String,
    executor: Executor,
    postfix: Vec<Op>,
    marks: Marks,
    source_lines: Vec<String>,
}

impl Rocket {
    pub fn new(root: impl Into<String>) -> Self {
        Rocket {
            lexer: Lexer::new(),
            grammar: rocket_grammar(),
            root: root.into(),
            executor: Executor::new(),
            postfix: Vec::new(),
            marks: Marks::default(),
            source_lines: Vec::new(),
        }
    }

    pub fn variables(&self) -> &std::collections::HashMap<String, Number> {
        self.executor.variables()
    }

    pub fn variables_table(&self) -> Vec<Vec<String>> {
        self.executor.variables_table()
    }

    pub fn lex(&self, source: &str) -> Result<Vec<Lexeme>, RocketError> {
        let (lexemes, errors) = self.lexer.scan(source);
        if !errors.is_empty() {
            return Err(RocketError::Lexical(errors));
        }
        Ok(lexemes)
    }

    pub fn parse(&self, source: &str) -> Result<Match, RocketError> {
        let lexemes = self.lex(source)?;
        let lines: Vec<&str> = source.lines().collect();
        let mut parser = Parser::new(&self.grammar);
        let outcome = parser.parse(&self.root, &lexemes).map_err(RocketError::Grammar)?;
        match outcome {
            ParseOutcome::Matched(m) => Ok(m),
            ParseOutcome::UnexpectedSymbol(lexeme) => {
                let message = if lexeme.text == "=" {
                    "Wrong structure in assignment statement after symbol:"
                } else {
                    "Wrong structure! Unexpected symbol:"
                };
                Err(RocketError::Syntax(Diagnostic::new("Syntax Error", message, &lexeme, &lines)))
            }
            ParseOutcome::UnexpectedEnd => {
                let last = lexemes.last().cloned().unwrap_or_else(|| Lexeme::new("", lexeme::LexemeKind::Error, 0, 0, 0));
                Err(RocketError::Syntax(Diagnostic::new("Syntax Error", "Unexpected end of the program after", &last, &lines)))
            }
        }
    }

    /// Lexes, parses, and transforms `source` into a postfix stream, storing
    /// it so a suspended `read` can resume against the same program.
    pub fn compile(&mut self, source: &str) -> Result<(), RocketError> {
        let m = self.parse(source)?;
        let terminals = m.terminal_matches();
        let (postfix, marks, _history) = Transformer::new().transform(&terminals);
        self.postfix = postfix;
        self.marks = marks;
        self.source_lines = source.lines().map(str::to_string).collect();
        Ok(())
    }

    pub fn postfix_text(&self) -> String {
        self.postfix.iter().map(|op| op.display(&self.marks)).collect::<Vec<_>>().join(", ")
    }

    pub fn marks_table(&self) -> Vec<Vec<String>> {
        self.marks.table()
    }

    pub fn history(&self, source: &str) -> Result<Vec<HistoryRow>, RocketError> {
        let m = self.parse(source)?;
        let terminals = m.terminal_matches();
        let (_postfix, _marks, history) = Transformer::new().transform(&terminals);
        Ok(history)
    }

    /// Runs the compiled program from the start. Call [`Rocket::compile`]
    /// first.
    pub fn run(&mut self, sink: &mut dyn FnMut(&str)) -> Result<Outcome, RocketError> {
        let postfix = self.postfix.clone();
        let marks = self.marks.clone();
        self.executor.run(&postfix, &marks, sink).map_err(|e| self.to_rocket_error(e))
    }

    /// Resumes after [`Outcome::NeedsInput`] with the collaborator-supplied
    /// value.
    pub fn resume(&mut self, sink: &mut dyn FnMut(&str), value: Number, resume_pc: usize) -> Result<Outcome, RocketError> {
        let postfix = self.postfix.clone();
        let marks = self.marks.clone();
        self.executor.resume(&postfix, &marks, sink, value, resume_pc).map_err(|e| self.to_rocket_error(e))
    }

    fn to_rocket_error(&self, error: ExecutorError) -> RocketError {
        let lines: Vec<&str> = self.source_lines.iter().map(String::as_str).collect();
        match error {
            ExecutorError::NameError { identifier } => {
                RocketError::Name(Diagnostic::new("Name Error", "Undeclared identifier", &identifier, &lines))
            }
            ExecutorError::ZeroDivision { at } => {
                RocketError::Value(Diagnostic::new("Value Error", "Zero Division", &at, &lines))
            }
        }
    }
}
