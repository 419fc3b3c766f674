//! Unifies the error types of every pipeline stage into a single
//! [`RocketError`], and builds the rectangular diagnostic tables a shell can
//! choose to display or persist.

use std::error::Error;
use std::fmt;

use crate::grammar::GrammarError;
use crate::lexeme::{Lexeme, LexemeKind};
use crate::lexer::LexicalError;

/// A positioned diagnostic message, formatted the way every stage reports
/// a failure: location, offending source line, category, and the lexeme.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub error_type: &'static str,
    pub message: String,
    pub line: usize,
    pub column: usize,
    pub row: String,
    pub lexeme_text: String,
}

impl Diagnostic {
    pub fn new(error_type: &'static str, message: impl Into<String>, lexeme: &Lexeme, source_lines: &[&str]) -> Self {
        let row = source_lines.get(lexeme.line).copied().unwrap_or("").to_string();
        Diagnostic { error_type, message: message.into(), line: lexeme.line, column: lexeme.column, row, lexeme_text: lexeme.text.clone() }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Line {}, column {}\n{}\n{}: {} '{}'",
            self.line, self.column, self.row, self.error_type, self.message, self.lexeme_text
        )
    }
}

#[derive(Debug, Clone)]
pub enum RocketError {
    Lexical(Vec<LexicalError>),
    Syntax(Diagnostic),
    Grammar(GrammarError),
    Name(Diagnostic),
    Value(Diagnostic),
}

impl fmt::Display for RocketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RocketError::Lexical(errors) => {
                let rendered: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
                write!(f, "{}", rendered.join(&format!("\n{}\n", "*".repeat(60))))
            }
            RocketError::Syntax(d) | RocketError::Name(d) | RocketError::Value(d) => write!(f, "{d}"),
            RocketError::Grammar(e) => write!(f, "{e}"),
        }
    }
}

impl Error for RocketError {}

/// `[[line, column, name, type, number], ...]`.
pub fn lexeme_table(lexemes: &[Lexeme]) -> Vec<Vec<String>> {
    let mut rows = vec![vec!["line".to_string(), "column".to_string(), "name".to_string(), "type".to_string(), "number".to_string()]];
    for lexeme in lexemes {
        rows.push(lexeme.to_row());
    }
    rows
}

fn dedup_table(lexemes: &[Lexeme], kind: LexemeKind, header: &str) -> Vec<Vec<String>> {
    let mut rows = vec![vec!["index".to_string(), header.to_string()]];
    let mut seen = std::collections::HashSet::new();
    let mut index = 0;
    for lexeme in lexemes {
        if lexeme.kind == kind && seen.insert(lexeme.text.clone()) {
            rows.push(vec![index.to_string(), lexeme.text.clone()]);
            index += 1;
        }
    }
    rows
}

pub fn identifier_table(lexemes: &[Lexeme]) -> Vec<Vec<String>> {
    dedup_table(lexemes, LexemeKind::Identifier, "identifier")
}

pub fn constant_table(lexemes: &[Lexeme]) -> Vec<Vec<String>> {
    dedup_table(lexemes, LexemeKind::Constant, "constant")
}
